//! Expression templates - the authored catalog expressions are derived from.

mod constraints;

pub use constraints::*;

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;

use crate::entities::Power;
use crate::mechanics::{Delivery, Form, Scale};

/// A predicate (kind/tag match) plus the payload of an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionTemplate {
    pub template_id: String,
    /// Only powers of this kind match; `None` or empty matches every kind.
    pub kind_match: Option<String>,
    /// Powers must carry one of these tags; empty matches every power.
    pub tags_any: BTreeSet<String>,
    pub form: Form,
    pub delivery: Delivery,
    pub scale: Scale,
    pub constraints: Constraints,
    /// Higher weights are selected first.
    pub rarity_weight: u32,
}

impl ExpressionTemplate {
    /// Create a template that matches every power.
    pub fn new(template_id: impl Into<String>, form: Form, delivery: Delivery) -> Self {
        Self {
            template_id: template_id.into(),
            kind_match: None,
            tags_any: BTreeSet::new(),
            form,
            delivery,
            scale: Scale::Street,
            constraints: Constraints::new(),
            rarity_weight: 1,
        }
    }

    /// Restrict the template to powers carrying any of the given tags.
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags_any = tags.iter().map(|t| t.trim().to_lowercase()).collect();
        self
    }

    /// Restrict the template to a power kind.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind_match = Some(kind.into());
        self
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    /// Set the default constraints from a JSON object literal.
    pub fn with_constraints(mut self, value: serde_json::Value) -> Self {
        self.constraints = Constraints::from_value(value).unwrap_or_default();
        self
    }

    pub fn with_weight(mut self, rarity_weight: u32) -> Self {
        self.rarity_weight = rarity_weight;
        self
    }

    /// Check whether a power satisfies this template's kind and tag predicate.
    pub fn matches(&self, power: &Power) -> bool {
        if let Some(kind) = self.kind_match.as_deref().filter(|k| !k.is_empty()) {
            if kind != power.kind {
                return false;
            }
        }
        self.tags_any.is_empty() || self.tags_any.iter().any(|tag| power.tags.contains(tag))
    }
}

/// Ordered collection of expression templates.
///
/// Catalog order is significant: it breaks ties between equal rarity weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateCatalog {
    templates: Vec<ExpressionTemplate>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<ExpressionTemplate>) -> Self {
        Self { templates }
    }

    /// The authored catalog seeded on every run.
    pub fn authored() -> Self {
        Self::new(authored_templates())
    }

    pub fn templates(&self) -> &[ExpressionTemplate] {
        &self.templates
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExpressionTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, template_id: &str) -> Option<&ExpressionTemplate> {
        self.templates.iter().find(|t| t.template_id == template_id)
    }

    /// Templates matching a power, with their catalog positions.
    pub fn matching<'a>(
        &'a self,
        power: &'a Power,
    ) -> impl Iterator<Item = (usize, &'a ExpressionTemplate)> + 'a {
        self.templates
            .iter()
            .enumerate()
            .filter(move |(_, template)| template.matches(power))
    }
}

fn authored_templates() -> Vec<ExpressionTemplate> {
    use Delivery::*;
    use Form::*;

    vec![
        // Touch
        ExpressionTemplate::new("tmpl_touch_direct", Touch, Instant)
            .with_tags(&["touch", "absorb", "copy", "change", "pain", "control", "manipulation"])
            .with_constraints(json!({"requires_contact": true, "cooldown": 1}))
            .with_weight(85),
        ExpressionTemplate::new("tmpl_touch_psychic", Touch, Instant)
            .with_tags(&["mind", "mental", "psychic"])
            .with_constraints(json!({"requires_contact": true, "cooldown": 2, "cost": {"focus": 2}}))
            .with_weight(70),
        ExpressionTemplate::new("tmpl_touch_soul", Touch, Instant)
            .with_tags(&["death", "life", "soul", "ghost"])
            .with_constraints(json!({"requires_contact": true, "cooldown": 2, "cost": {"focus": 2}}))
            .with_weight(60),
        // Energy and elemental projection
        ExpressionTemplate::new("tmpl_beam_energy", Beam, Instant)
            .with_tags(&["energy", "light", "heat", "electricity", "fire"])
            .with_constraints(json!({
                "range_m": 25, "requires_los": true, "cooldown": 2, "cost": {"stamina": 2}
            }))
            .with_weight(85),
        ExpressionTemplate::new("tmpl_proj_element", Projectile, Instant)
            .with_tags(&["ice", "water", "earth", "air", "shadow", "dark", "darkness"])
            .with_constraints(json!({"range_m": 20, "cooldown": 2, "cost": {"stamina": 2}}))
            .with_weight(70),
        ExpressionTemplate::new("tmpl_zone_element", Zone, Toggled)
            .with_tags(&["fire", "ice", "water", "shadow", "darkness", "electricity"])
            .with_constraints(json!({"radius_m": 6, "cost_per_tick": {"stamina": 2}}))
            .with_weight(45),
        // Control
        ExpressionTemplate::new("tmpl_zone_control", Zone, Toggled)
            .with_tags(&["control", "manipulation", "change", "pain"])
            .with_constraints(json!({"radius_m": 7, "cost_per_tick": {"focus": 2}}))
            .with_weight(80),
        ExpressionTemplate::new("tmpl_aura_control", Aura, Toggled)
            .with_tags(&["control", "manipulation", "absorb"])
            .with_constraints(json!({"cost_per_tick": {"focus": 1}}))
            .with_weight(55),
        // Movement
        ExpressionTemplate::new("tmpl_move_speed", Movement, Toggled)
            .with_tags(&["speed", "air"])
            .with_constraints(json!({"cost_per_tick": {"stamina": 1}}))
            .with_weight(55),
        ExpressionTemplate::new("tmpl_move_space", Movement, Triggered)
            .with_tags(&["space"])
            .with_constraints(json!({"range_m": 15, "cooldown": 3}))
            .with_weight(45),
        // Summoning
        ExpressionTemplate::new("tmpl_summon", Summon, Instant)
            .with_tags(&["summoning", "ghost", "death", "soul"])
            .with_constraints(json!({"cooldown": 4, "cost": {"focus": 3}}))
            .with_weight(65),
        // Magic, reality, time
        ExpressionTemplate::new("tmpl_zone_magic", Zone, Channeled)
            .with_tags(&["magic", "reality", "time"])
            .with_constraints(json!({"radius_m": 5, "cost_per_tick": {"focus": 3}, "cooldown": 3}))
            .with_weight(55),
        ExpressionTemplate::new("tmpl_aura_magic", Aura, Toggled)
            .with_tags(&["magic", "god", "reality"])
            .with_constraints(json!({"cost_per_tick": {"focus": 2}}))
            .with_weight(45),
        // Senses
        ExpressionTemplate::new("tmpl_sense_visual", Sense, Channeled)
            .with_tags(&["vision", "sight", "eyes"])
            .with_constraints(json!({"always_on": true}))
            .with_weight(85),
        ExpressionTemplate::new("tmpl_sense_knowledge", Sense, Channeled)
            .with_tags(&["knowledge"])
            .with_constraints(json!({"always_on": true}))
            .with_weight(70),
        ExpressionTemplate::new("tmpl_sense_psychic", Sense, Channeled)
            .with_tags(&["psychic", "mind"])
            .with_constraints(json!({"always_on": true}))
            .with_weight(35),
        // Traits
        ExpressionTemplate::new("tmpl_trait_body", Passive, Channeled)
            .with_tags(&[
                "body", "strength", "speed", "durability", "regeneration", "animal", "ghost", "god",
                "life", "death",
            ])
            .with_constraints(json!({"always_on": true}))
            .with_weight(80),
    ]
}

/// Fallback template ids, lowest priority last.
pub const FALLBACK_TOUCH_NEUTRAL: &str = "fallback_touch_neutral";
pub const FALLBACK_PROJECTILE_ELEMENT: &str = "fallback_projectile_element";
pub const FALLBACK_AURA_CONTROL: &str = "fallback_aura_control";
pub const FALLBACK_TOUCH_FOLLOWUP: &str = "fallback_touch_followup";

/// Neutral contact expression every power can fall back to.
pub fn fallback_touch_neutral() -> ExpressionTemplate {
    ExpressionTemplate::new(FALLBACK_TOUCH_NEUTRAL, Form::Touch, Delivery::Instant)
        .with_constraints(json!({"requires_contact": true, "cooldown": 2}))
        .with_weight(12)
}

/// Elemental/energy projectile fallback.
pub fn fallback_projectile_element() -> ExpressionTemplate {
    ExpressionTemplate::new(FALLBACK_PROJECTILE_ELEMENT, Form::Projectile, Delivery::Instant)
        .with_constraints(json!({"range_m": 15, "cooldown": 2}))
        .with_weight(10)
}

/// Control/aura fallback.
pub fn fallback_aura_control() -> ExpressionTemplate {
    ExpressionTemplate::new(FALLBACK_AURA_CONTROL, Form::Aura, Delivery::Toggled)
        .with_constraints(json!({"cost_per_tick": {"focus": 1}}))
        .with_weight(9)
}

/// Delayed-contact fallback.
pub fn fallback_touch_followup() -> ExpressionTemplate {
    ExpressionTemplate::new(FALLBACK_TOUCH_FOLLOWUP, Form::Touch, Delivery::Triggered)
        .with_constraints(json!({"requires_contact": true, "cooldown": 3}))
        .with_weight(8)
}
