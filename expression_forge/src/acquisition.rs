//! Acquisition profiles - plausible origins of each power.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

use power_rules::tag_groups;
use power_rules::{
    stable_id, AcquisitionEventKind, CollateralProfile, DeliveryChannel, OriginClass,
    OriginRule, OriginSubtype, Power, PowerId, SignatureType, StabilityProfile,
    FALLBACK_COSMIC_EXPOSURE, FALLBACK_COVENANT, FALLBACK_DEVICE, FALLBACK_GENETIC_AWAKENING,
    FALLBACK_GENETIC_PUBERTY, FALLBACK_LAB_ACCIDENT, ORIGIN_RULES,
};

/// Weights of the primary and secondary kind fallback.
pub const FALLBACK_PRIMARY_WEIGHT: u32 = 30;
pub const FALLBACK_SECONDARY_WEIGHT: u32 = 20;

/// A signature an origin tends to leave, stored as `{"type": ..., "strength": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHint {
    #[serde(rename = "type")]
    pub signature_type: SignatureType,
    pub strength: u8,
}

impl SignatureHint {
    pub fn new(signature_type: SignatureType, strength: u8) -> Self {
        Self {
            signature_type,
            strength,
        }
    }
}

/// One origin classification of a power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionProfile {
    pub acq_id: String,
    pub power_id: PowerId,
    pub origin_class: OriginClass,
    pub origin_subtype: OriginSubtype,
    pub delivery_channel: DeliveryChannel,
    pub event_kind: AcquisitionEventKind,
    pub rarity_weight: u32,
    pub requires_entity_kind: Option<String>,
    /// Sorted trigger tags of the rule; `None` for kind fallbacks.
    pub requires_tags_any: Option<Vec<String>>,
    pub counterplay_tags: Vec<String>,
    pub default_signatures: Vec<SignatureHint>,
    pub collateral: CollateralProfile,
    pub stability: StabilityProfile,
}

/// Maps powers to acquisition profiles through the origin rule table.
#[derive(Debug, Clone)]
pub struct AcquisitionProfiler {
    rules: &'static [OriginRule],
    max_per_power: usize,
}

impl AcquisitionProfiler {
    /// Profiler over the authored origin rules.
    pub fn new(max_per_power: usize) -> Self {
        Self::with_rules(ORIGIN_RULES, max_per_power)
    }

    pub fn with_rules(rules: &'static [OriginRule], max_per_power: usize) -> Self {
        Self {
            rules,
            max_per_power,
        }
    }

    /// Origin rules selected for a power, strongest first.
    pub fn select(&self, power: &Power) -> Vec<OriginRule> {
        let mut matched: Vec<OriginRule> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(&power.tags))
            .copied()
            .collect();

        if matched.is_empty() {
            debug!(power_id = %power.id, kind = %power.kind, "no origin rule matched, using kind fallback");
            matched = kind_fallback(&power.kind).to_vec();
        }

        matched.sort_by_key(|rule| Reverse(rule.rarity_weight));
        matched.truncate(self.max_per_power);
        matched
    }

    /// Build the profiles of one power.
    pub fn profile(&self, power: &Power) -> Vec<AcquisitionProfile> {
        self.select(power)
            .into_iter()
            .map(|rule| build_profile(power, &rule))
            .collect()
    }

    /// Build the profiles of every power, in catalog order.
    pub fn profile_all(&self, powers: &[Power]) -> Vec<AcquisitionProfile> {
        powers.iter().flat_map(|power| self.profile(power)).collect()
    }
}

/// The two fallback origins for a power kind.
pub fn kind_fallback(kind: &str) -> [OriginRule; 2] {
    let kind = kind.to_lowercase();
    let (primary, secondary) = if kind.contains("mob") || kind.contains("move") {
        (FALLBACK_DEVICE, FALLBACK_COSMIC_EXPOSURE)
    } else if kind.contains("mind") || kind.contains("psy") || kind.contains("info") {
        (FALLBACK_GENETIC_AWAKENING, FALLBACK_COVENANT)
    } else {
        (FALLBACK_LAB_ACCIDENT, FALLBACK_GENETIC_PUBERTY)
    };
    [
        primary.weighted(FALLBACK_PRIMARY_WEIGHT),
        secondary.weighted(FALLBACK_SECONDARY_WEIGHT),
    ]
}

/// Identifier of a power's acquisition profile.
pub fn acquisition_id(power_id: &PowerId, rule: &OriginRule) -> String {
    stable_id(&[
        power_id.as_str(),
        rule.origin_class.as_str(),
        rule.origin_subtype.as_str(),
        rule.delivery_channel.as_str(),
        rule.event_kind.as_str(),
    ])
}

fn build_profile(power: &Power, rule: &OriginRule) -> AcquisitionProfile {
    let requires_tags_any = (!rule.is_fallback()).then(|| {
        let mut tags: Vec<String> = rule.triggers.iter().map(|t| t.to_string()).collect();
        tags.sort();
        tags
    });

    AcquisitionProfile {
        acq_id: acquisition_id(&power.id, rule),
        power_id: power.id.clone(),
        origin_class: rule.origin_class,
        origin_subtype: rule.origin_subtype,
        delivery_channel: rule.delivery_channel,
        event_kind: rule.event_kind,
        rarity_weight: rule.rarity_weight,
        requires_entity_kind: rule.requires_entity_kind.map(str::to_string),
        requires_tags_any,
        counterplay_tags: counterplay(rule),
        default_signatures: signature_hints(power, rule),
        collateral: collateral(power),
        stability: stability(rule),
    }
}

fn signature_hints(power: &Power, rule: &OriginRule) -> Vec<SignatureHint> {
    let mut hints = Vec::new();
    if rule.origin_class == OriginClass::Forged {
        hints.push(SignatureHint::new(SignatureType::EmSpike, 35));
    }
    if power.has_tag("gravity") {
        hints.push(SignatureHint::new(SignatureType::GraviticDisturbance, 25));
    }
    if power.has_any(tag_groups::SPATIAL) {
        hints.push(SignatureHint::new(SignatureType::DimensionalResidue, 25));
    }
    if power.has_any(tag_groups::ARCANE_ORIGIN) {
        hints.push(SignatureHint::new(SignatureType::ArcaneResonance, 25));
    }
    if power.has_tag("radiation") {
        hints.push(SignatureHint::new(SignatureType::RadiationTrace, 45));
    }
    hints
}

fn collateral(power: &Power) -> CollateralProfile {
    if power.has_any(tag_groups::DESTRUCTIVE) {
        CollateralProfile::High
    } else {
        CollateralProfile::Low
    }
}

fn stability(rule: &OriginRule) -> StabilityProfile {
    match (rule.origin_class, rule.origin_subtype) {
        (OriginClass::Altered, _) => StabilityProfile::Drifting,
        (OriginClass::Bound, OriginSubtype::Artefact) => StabilityProfile::Dependent,
        (OriginClass::Bound, OriginSubtype::Covenant) => StabilityProfile::Corrupting,
        _ => StabilityProfile::Stable,
    }
}

fn counterplay(rule: &OriginRule) -> Vec<String> {
    let tag = match (rule.origin_class, rule.origin_subtype) {
        (OriginClass::Forged, _) => Some("emp"),
        (OriginClass::Bound, OriginSubtype::Artefact) => Some("disarm"),
        (OriginClass::Ascendant, OriginSubtype::Genetic) => Some("suppressor"),
        _ => None,
    };
    tag.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(rules: &[OriginRule]) -> Vec<(OriginClass, OriginSubtype, u32)> {
        rules
            .iter()
            .map(|r| (r.origin_class, r.origin_subtype, r.rarity_weight))
            .collect()
    }

    #[test]
    fn test_rules_sorted_by_weight() {
        let profiler = AcquisitionProfiler::new(3);
        let power = Power::new("1", "Voidwalker", ["space", "tech", "dna"]);

        assert_eq!(
            classes(&profiler.select(&power)),
            vec![
                (OriginClass::Forged, OriginSubtype::Technological, 70),
                (OriginClass::Ascendant, OriginSubtype::Genetic, 60),
                (OriginClass::Ascendant, OriginSubtype::Xenobiological, 40),
            ]
        );
    }

    #[test]
    fn test_truncation_keeps_strongest() {
        let profiler = AcquisitionProfiler::new(1);
        let power = Power::new("1", "Cursed Relic", ["curse", "relic"]);
        let selected = profiler.select(&power);
        // Equal weights keep rule table order.
        assert_eq!(
            classes(&selected),
            vec![(OriginClass::Bound, OriginSubtype::Covenant, 60)]
        );
    }

    #[test]
    fn test_kind_fallbacks() {
        let profiler = AcquisitionProfiler::new(3);

        let mobile = Power::new("1", "Dash", ["kind:Mobility"]);
        let selected = profiler.select(&mobile);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].event_kind, AcquisitionEventKind::Crafting);
        assert_eq!(selected[0].rarity_weight, 30);
        assert_eq!(selected[1].event_kind, AcquisitionEventKind::CosmicContact);
        assert_eq!(selected[1].rarity_weight, 20);

        let mental = Power::new("2", "Insight", ["kind:psionic"]);
        assert_eq!(
            profiler.select(&mental)[0].event_kind,
            AcquisitionEventKind::StressAwakening
        );

        let other = Power::new("3", "Oddity", ["unmapped"]);
        let selected = profiler.select(&other);
        assert_eq!(selected[0].event_kind, AcquisitionEventKind::LabAccident);
        assert_eq!(selected[1].event_kind, AcquisitionEventKind::Puberty);
    }

    #[test]
    fn test_forged_profile_details() {
        let profiler = AcquisitionProfiler::new(3);
        let power = Power::new("9", "Gravitron", ["tech", "gravity", "explosion"]);
        let profiles = profiler.profile(&power);

        assert_eq!(profiles.len(), 1);
        let profile = &profiles[0];
        assert_eq!(profile.requires_entity_kind.as_deref(), Some("DEVICE_BLUEPRINT"));
        assert_eq!(
            profile.requires_tags_any.as_deref().map(|t| t.first().cloned()),
            Some(Some("ai".to_string()))
        );
        assert_eq!(profile.counterplay_tags, vec!["emp"]);
        assert_eq!(profile.collateral, CollateralProfile::High);
        assert_eq!(profile.stability, StabilityProfile::Stable);
        assert_eq!(
            profile.default_signatures,
            vec![
                SignatureHint::new(SignatureType::EmSpike, 35),
                SignatureHint::new(SignatureType::GraviticDisturbance, 25),
            ]
        );
        assert_eq!(
            profile.acq_id,
            stable_id(&["9", "FORGED", "TECHNOLOGICAL", "DEVICE", "CRAFTING"])
        );
    }

    #[test]
    fn test_fallback_profile_has_no_trigger_tags() {
        let profiler = AcquisitionProfiler::new(3);
        let power = Power::new("4", "Oddity", ["radiation"]);
        // "radiation" is a real trigger, so this one is not a fallback.
        assert!(profiler.profile(&power)[0].requires_tags_any.is_some());

        let plain = Power::new("5", "Plain", ["unmapped"]);
        let profiles = profiler.profile(&plain);
        assert!(profiles.iter().all(|p| p.requires_tags_any.is_none()));
        assert_eq!(profiles[0].stability, StabilityProfile::Drifting);
        assert_eq!(profiles[1].counterplay_tags, vec!["suppressor"]);
    }

    #[test]
    fn test_stability_and_counterplay_by_origin() {
        let profiler = AcquisitionProfiler::new(3);
        let relic = profiler.profile(&Power::new("1", "Ring", ["ring"]));
        assert_eq!(relic[0].stability, StabilityProfile::Dependent);
        assert_eq!(relic[0].counterplay_tags, vec!["disarm"]);

        let pact = profiler.profile(&Power::new("2", "Pact", ["demon"]));
        assert_eq!(pact[0].stability, StabilityProfile::Corrupting);
        assert!(pact[0].counterplay_tags.is_empty());
        assert_eq!(
            pact[0].default_signatures,
            vec![SignatureHint::new(SignatureType::ArcaneResonance, 25)]
        );
    }

    #[test]
    fn test_hint_serializes_with_type_key() {
        let hint = SignatureHint::new(SignatureType::RadiationTrace, 45);
        assert_eq!(
            serde_json::to_string(&hint).unwrap(),
            r#"{"type":"RADIATION_TRACE","strength":45}"#
        );
    }
}
