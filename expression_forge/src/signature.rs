//! Signature aggregation - the detectable traces an expression leaves behind.
//!
//! Contributions come from three steps (form base, tag extras, hard fallback)
//! and are merged per signature type by element-wise maximum, never summed.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use power_rules::tag_groups;
use power_rules::{Form, SignatureType};

/// Maximum number of tag-driven extra signatures per expression.
pub const MAX_EXTRA_SIGNATURES: usize = 2;

/// Strength and persistence of one signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEmission {
    /// Detectability, 1..=100.
    pub strength: u8,
    /// Turns the trace lingers.
    pub persistence_turns: u32,
}

impl SignatureEmission {
    /// Create an emission, clamping strength into 1..=100.
    pub fn new(strength: i64, persistence_turns: i64) -> Self {
        Self {
            strength: strength.clamp(1, 100) as u8,
            persistence_turns: persistence_turns.clamp(0, i64::from(u32::MAX)) as u32,
        }
    }

    /// Element-wise maximum of two emissions.
    pub fn max(self, other: Self) -> Self {
        Self {
            strength: self.strength.max(other.strength),
            persistence_turns: self.persistence_turns.max(other.persistence_turns),
        }
    }

    /// Default magnitude of a form.
    pub fn form_default(form: Form) -> Self {
        let (strength, persistence) = match form {
            Form::Touch => (15, 2),
            Form::Projectile => (35, 3),
            Form::Beam => (40, 3),
            Form::Zone => (50, 6),
            Form::Aura => (45, 6),
            Form::Summon => (70, 10),
            Form::Sense => (10, 8),
            Form::Movement => (25, 4),
            Form::Passive | Form::Construct => (20, 2),
        };
        Self::new(strength, persistence)
    }
}

/// Ordered (tag group, signature) pairs checked for extra emissions.
pub const EXTRA_SIGNATURE_GROUPS: &[(&[&str], SignatureType)] = &[
    (tag_groups::VISUAL, SignatureType::VisualAnomaly),
    (tag_groups::ELECTROMAGNETIC, SignatureType::EmSpike),
    (tag_groups::THERMAL, SignatureType::ThermalBloom),
    (tag_groups::ACOUSTIC, SignatureType::AcousticShock),
    (tag_groups::CHEMICAL, SignatureType::ChemicalResidue),
    (tag_groups::BIOLOGICAL, SignatureType::BioMarker),
    (tag_groups::PSYCHIC, SignatureType::PsychicEcho),
    (tag_groups::DIMENSIONAL, SignatureType::DimensionalResidue),
    (tag_groups::GRAVITIC, SignatureType::GraviticDisturbance),
    (tag_groups::ARCANE, SignatureType::ArcaneResonance),
    (tag_groups::CAUSAL, SignatureType::CausalImprint),
    (tag_groups::KINETIC, SignatureType::KineticStress),
    (tag_groups::RADIATION, SignatureType::RadiationTrace),
];

/// Signatures of one expression, keyed by type so each type appears once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureSet {
    emissions: BTreeMap<SignatureType, SignatureEmission>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an emission, keeping the maximum of any existing one.
    pub fn add(&mut self, signature: SignatureType, emission: SignatureEmission) {
        match self.emissions.entry(signature) {
            Entry::Occupied(mut slot) => {
                let merged = slot.get().max(emission);
                slot.insert(merged);
            }
            Entry::Vacant(slot) => {
                slot.insert(emission);
            }
        }
    }

    pub fn get(&self, signature: SignatureType) -> Option<SignatureEmission> {
        self.emissions.get(&signature).copied()
    }

    pub fn contains(&self, signature: SignatureType) -> bool {
        self.emissions.contains_key(&signature)
    }

    pub fn len(&self) -> usize {
        self.emissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }

    /// Emissions in signature-type order.
    pub fn iter(&self) -> impl Iterator<Item = (SignatureType, SignatureEmission)> + '_ {
        self.emissions.iter().map(|(k, v)| (*k, *v))
    }
}

fn intersects(tags: &BTreeSet<String>, group: &[&str]) -> bool {
    group.iter().any(|tag| tags.contains(*tag))
}

/// Derive the merged signatures of an expression from its form and its power's tags.
pub fn derive_signatures(form: Form, tags: &BTreeSet<String>) -> SignatureSet {
    use SignatureType::*;

    let mut set = SignatureSet::new();
    if form == Form::Passive {
        return set;
    }

    let base = SignatureEmission::form_default(form);
    let fixed = SignatureEmission::new;

    match form {
        Form::Projectile | Form::Beam => {
            set.add(VisualAnomaly, base);
            if intersects(tags, tag_groups::ELECTROMAGNETIC) {
                set.add(EmSpike, base);
            }
            if intersects(tags, tag_groups::THERMAL) {
                set.add(ThermalBloom, base);
            }
        }
        Form::Zone | Form::Aura => set.add(VisualAnomaly, base),
        Form::Touch => {
            if intersects(tags, tag_groups::BIOLOGICAL) {
                set.add(BioMarker, fixed(12, 2));
            } else {
                set.add(VisualAnomaly, fixed(10, 1));
            }
        }
        Form::Movement => {
            if intersects(tags, tag_groups::DIMENSIONAL) {
                set.add(DimensionalResidue, fixed(25, 4));
            } else {
                set.add(VisualAnomaly, fixed(20, 3));
            }
        }
        Form::Sense => set.add(PsychicEcho, fixed(10, 8)),
        Form::Summon => {
            set.add(DimensionalResidue, fixed(70, 10));
            if intersects(tags, tag_groups::ARCANE) {
                set.add(ArcaneResonance, fixed(65, 8));
            }
        }
        Form::Passive | Form::Construct => {}
    }

    let mut extras = 0;
    for (group, signature) in EXTRA_SIGNATURE_GROUPS {
        if extras >= MAX_EXTRA_SIGNATURES {
            break;
        }
        if intersects(tags, group) && !set.contains(*signature) {
            set.add(*signature, base);
            extras += 1;
        }
    }

    if set.is_empty() {
        set.add(VisualAnomaly, fixed(5, 1));
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use power_rules::normalize_tags;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        normalize_tags(list)
    }

    #[test]
    fn test_passive_is_silent() {
        assert!(derive_signatures(Form::Passive, &tags(&["fire", "radiation"])).is_empty());
    }

    #[test]
    fn test_beam_with_em_and_thermal() {
        let set = derive_signatures(Form::Beam, &tags(&["electricity", "fire"]));
        let beam = SignatureEmission::new(40, 3);

        assert_eq!(set.len(), 3);
        assert_eq!(set.get(SignatureType::VisualAnomaly), Some(beam));
        assert_eq!(set.get(SignatureType::EmSpike), Some(beam));
        assert_eq!(set.get(SignatureType::ThermalBloom), Some(beam));
    }

    #[test]
    fn test_extras_do_not_repeat_base_types() {
        // Both tags are already covered by the base step.
        let set = derive_signatures(Form::Beam, &tags(&["light", "energy"]));
        assert_eq!(set.len(), 2);
        assert!(set.contains(SignatureType::VisualAnomaly));
        assert!(set.contains(SignatureType::EmSpike));
    }

    #[test]
    fn test_extras_capped_at_two() {
        let set = derive_signatures(
            Form::Zone,
            &tags(&["sound", "acid", "blood", "mind", "gravity"]),
        );
        // Base VISUAL plus ACOUSTIC and CHEMICAL, in list order.
        let types: Vec<_> = set.iter().map(|(t, _)| t).collect();
        assert_eq!(
            types,
            vec![
                SignatureType::VisualAnomaly,
                SignatureType::AcousticShock,
                SignatureType::ChemicalResidue,
            ]
        );
        assert_eq!(
            set.get(SignatureType::AcousticShock),
            Some(SignatureEmission::new(50, 6))
        );
    }

    #[test]
    fn test_touch_biological_shift() {
        let bio = derive_signatures(Form::Touch, &tags(&["healing"]));
        assert_eq!(bio.get(SignatureType::BioMarker), Some(SignatureEmission::new(12, 2)));
        assert!(!bio.contains(SignatureType::VisualAnomaly));

        let plain = derive_signatures(Form::Touch, &tags(&["unmapped"]));
        assert_eq!(plain.len(), 1);
        assert_eq!(
            plain.get(SignatureType::VisualAnomaly),
            Some(SignatureEmission::new(10, 1))
        );
    }

    #[test]
    fn test_summon_keeps_strongest_dimensional() {
        // The extra DIMENSIONAL at 70/10 must not duplicate or lower the base.
        let set = derive_signatures(Form::Summon, &tags(&["summoning", "demon"]));
        assert_eq!(
            set.get(SignatureType::DimensionalResidue),
            Some(SignatureEmission::new(70, 10))
        );
        assert_eq!(
            set.get(SignatureType::ArcaneResonance),
            Some(SignatureEmission::new(65, 8))
        );
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_merge_takes_maximum() {
        let mut set = SignatureSet::new();
        set.add(SignatureType::EmSpike, SignatureEmission::new(30, 9));
        set.add(SignatureType::EmSpike, SignatureEmission::new(60, 2));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(SignatureType::EmSpike), Some(SignatureEmission::new(60, 9)));
    }

    #[test]
    fn test_strength_is_clamped() {
        assert_eq!(SignatureEmission::new(0, -3), SignatureEmission::new(1, 0));
        assert_eq!(SignatureEmission::new(250, 1).strength, 100);
    }

    #[test]
    fn test_construct_uses_generic_default() {
        let set = derive_signatures(Form::Construct, &tags(&["earth"]));
        // No base step for CONSTRUCT; "earth" only reaches the kinetic extra.
        assert_eq!(
            set.get(SignatureType::KineticStress),
            Some(SignatureEmission::new(20, 2))
        );
    }
}
