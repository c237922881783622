//! Tag groups shared by the derivation rules.

// Expression fallbacks
pub const ELEMENTAL_ENERGY: &[&str] = &[
    "energy", "light", "heat", "electricity", "fire", "ice", "water", "earth", "air", "shadow",
    "dark", "darkness",
];
pub const CONTROL_MAGIC: &[&str] = &[
    "control", "manipulation", "change", "absorb", "magic", "reality", "time",
];

// Costs
pub const MIND: &[&str] = &["mind", "psychic", "mental"];

// Signatures
pub const VISUAL: &[&str] = &[
    "light", "dark", "darkness", "shadow", "invisibility", "illusion", "vision", "sight", "eyes",
];
pub const ELECTROMAGNETIC: &[&str] =
    &["electricity", "electric", "energy", "technology", "tech", "nanotech"];
pub const THERMAL: &[&str] = &["fire", "heat", "ice", "cool", "water"];
pub const ACOUSTIC: &[&str] = &["sound", "sonic"];
pub const CHEMICAL: &[&str] = &["acid", "poison", "toxin", "chemical"];
pub const BIOLOGICAL: &[&str] = &[
    "blood", "biological", "bio", "body", "healing", "regeneration", "animal",
];
pub const PSYCHIC: &[&str] = &[
    "mind", "mental", "psychic", "emotion", "memory", "telepathy", "dream", "dreams",
];
pub const DIMENSIONAL: &[&str] = &["teleport", "teleportation", "portal", "space", "summoning"];
pub const GRAVITIC: &[&str] = &["gravity"];
pub const ARCANE: &[&str] = &["magic", "demon", "demonic", "curse", "arcane"];
pub const CAUSAL: &[&str] = &["time", "reality"];
pub const KINETIC: &[&str] = &["strength", "powerful", "earth", "pain"];
pub const RADIATION: &[&str] = &["radiation"];

// Acquisition hints
pub const SPATIAL: &[&str] = &["space", "teleport", "portal"];
pub const ARCANE_ORIGIN: &[&str] = &["magic", "demon", "curse"];
pub const DESTRUCTIVE: &[&str] = &["explosion", "earthquake"];
