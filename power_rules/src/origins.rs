//! Origin rules - how a power may have been acquired.

use crate::mechanics::vocabulary;

vocabulary! {
    /// Broad origin family.
    pub enum OriginClass {
        Forged => "FORGED",
        Bound => "BOUND",
        Ascendant => "ASCENDANT",
        Altered => "ALTERED",
    }
}

vocabulary! {
    /// Specific origin within a family.
    pub enum OriginSubtype {
        Technological => "TECHNOLOGICAL",
        Covenant => "COVENANT",
        Artefact => "ARTEFACT",
        Genetic => "GENETIC",
        Xenobiological => "XENOBIOLOGICAL",
        Exposure => "EXPOSURE",
        Infestation => "INFESTATION",
    }
}

vocabulary! {
    /// What carries the power to its holder.
    pub enum DeliveryChannel {
        Device => "DEVICE",
        Contract => "CONTRACT",
        Item => "ITEM",
        Biology => "BIOLOGY",
        Accident => "ACCIDENT",
    }
}

vocabulary! {
    /// The event in which the power is acquired.
    pub enum AcquisitionEventKind {
        Crafting => "CRAFTING",
        Ritual => "RITUAL",
        Discovery => "DISCOVERY",
        Puberty => "PUBERTY",
        Birth => "BIRTH",
        LabAccident => "LAB_ACCIDENT",
        Infection => "INFECTION",
        CosmicContact => "COSMIC_CONTACT",
        StressAwakening => "STRESS_AWAKENING",
    }
}

vocabulary! {
    /// Expected collateral damage when the power is used.
    pub enum CollateralProfile {
        Low => "LOW",
        High => "HIGH",
    }
}

vocabulary! {
    /// How the power behaves over time.
    pub enum StabilityProfile {
        Stable => "STABLE",
        Drifting => "DRIFTING",
        Dependent => "DEPENDENT",
        Corrupting => "CORRUPTING",
    }
}

/// A tag trigger mapped to an origin classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginRule {
    /// Matches when a power carries any of these tags. Empty for fallbacks.
    pub triggers: &'static [&'static str],
    pub origin_class: OriginClass,
    pub origin_subtype: OriginSubtype,
    pub delivery_channel: DeliveryChannel,
    pub event_kind: AcquisitionEventKind,
    pub requires_entity_kind: Option<&'static str>,
    pub rarity_weight: u32,
}

impl OriginRule {
    /// Check whether a power's tags trigger this rule.
    pub fn matches<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        tags.into_iter()
            .any(|tag| self.triggers.contains(&tag.as_str()))
    }

    /// Whether the rule was produced by the kind fallback rather than a trigger.
    pub fn is_fallback(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Copy of this rule with another weight.
    pub const fn weighted(self, rarity_weight: u32) -> Self {
        Self {
            rarity_weight,
            ..self
        }
    }
}

const fn rule(
    triggers: &'static [&'static str],
    origin_class: OriginClass,
    origin_subtype: OriginSubtype,
    delivery_channel: DeliveryChannel,
    event_kind: AcquisitionEventKind,
    requires_entity_kind: Option<&'static str>,
    rarity_weight: u32,
) -> OriginRule {
    OriginRule {
        triggers,
        origin_class,
        origin_subtype,
        delivery_channel,
        event_kind,
        requires_entity_kind,
        rarity_weight,
    }
}

/// Authored origin rules, in evaluation order.
pub const ORIGIN_RULES: &[OriginRule] = &[
    rule(
        &["tech", "technology", "robot", "cyber", "armour", "armor", "ai", "nanotech"],
        OriginClass::Forged,
        OriginSubtype::Technological,
        DeliveryChannel::Device,
        AcquisitionEventKind::Crafting,
        Some("DEVICE_BLUEPRINT"),
        70,
    ),
    rule(
        &["magic", "occult", "curse", "demon", "spell", "ritual"],
        OriginClass::Bound,
        OriginSubtype::Covenant,
        DeliveryChannel::Contract,
        AcquisitionEventKind::Ritual,
        Some("PATRON"),
        60,
    ),
    rule(
        &["artifact", "artefact", "relic", "ring", "weapon", "amulet"],
        OriginClass::Bound,
        OriginSubtype::Artefact,
        DeliveryChannel::Item,
        AcquisitionEventKind::Discovery,
        Some("ARTEFACT"),
        60,
    ),
    rule(
        &["mutation", "genetic", "dna"],
        OriginClass::Ascendant,
        OriginSubtype::Genetic,
        DeliveryChannel::Biology,
        AcquisitionEventKind::Puberty,
        None,
        60,
    ),
    rule(
        &["alien", "extraterrestrial", "space"],
        OriginClass::Ascendant,
        OriginSubtype::Xenobiological,
        DeliveryChannel::Biology,
        AcquisitionEventKind::Birth,
        Some("SPECIES"),
        40,
    ),
    rule(
        &["radiation", "chemical", "experiment", "serum"],
        OriginClass::Altered,
        OriginSubtype::Exposure,
        DeliveryChannel::Accident,
        AcquisitionEventKind::LabAccident,
        Some("LAB"),
        60,
    ),
    rule(
        &["symbiote", "parasite", "infection"],
        OriginClass::Altered,
        OriginSubtype::Infestation,
        DeliveryChannel::Accident,
        AcquisitionEventKind::Infection,
        Some("SYMBIOTE"),
        55,
    ),
];

// Kind fallbacks carry no triggers; weights are assigned by the profiler.
pub const FALLBACK_DEVICE: OriginRule = rule(
    &[],
    OriginClass::Forged,
    OriginSubtype::Technological,
    DeliveryChannel::Device,
    AcquisitionEventKind::Crafting,
    Some("DEVICE_BLUEPRINT"),
    0,
);
pub const FALLBACK_COSMIC_EXPOSURE: OriginRule = rule(
    &[],
    OriginClass::Altered,
    OriginSubtype::Exposure,
    DeliveryChannel::Accident,
    AcquisitionEventKind::CosmicContact,
    Some("PORTAL"),
    0,
);
pub const FALLBACK_GENETIC_AWAKENING: OriginRule = rule(
    &[],
    OriginClass::Ascendant,
    OriginSubtype::Genetic,
    DeliveryChannel::Biology,
    AcquisitionEventKind::StressAwakening,
    None,
    0,
);
pub const FALLBACK_COVENANT: OriginRule = rule(
    &[],
    OriginClass::Bound,
    OriginSubtype::Covenant,
    DeliveryChannel::Contract,
    AcquisitionEventKind::Ritual,
    Some("PATRON"),
    0,
);
pub const FALLBACK_LAB_ACCIDENT: OriginRule = rule(
    &[],
    OriginClass::Altered,
    OriginSubtype::Exposure,
    DeliveryChannel::Accident,
    AcquisitionEventKind::LabAccident,
    Some("LAB"),
    0,
);
pub const FALLBACK_GENETIC_PUBERTY: OriginRule = rule(
    &[],
    OriginClass::Ascendant,
    OriginSubtype::Genetic,
    DeliveryChannel::Biology,
    AcquisitionEventKind::Puberty,
    None,
    0,
);
