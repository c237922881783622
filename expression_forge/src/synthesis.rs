//! Expression synthesis - template matching, fallback policy, ranking and text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Reverse;
use tracing::debug;

use power_rules::tag_groups;
use power_rules::{
    fallback_aura_control, fallback_projectile_element, fallback_touch_followup,
    fallback_touch_neutral, stable_id, Constraints, Delivery, ExpressionTemplate, Form, Power,
    PowerId, Scale, TemplateCatalog, TextSource,
};

/// Rules text used when a template carries no displayable constraint.
pub const STANDARD_RULES_TEXT: &str = "Standard rules.";

/// Generated display text for an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionText {
    pub ui_name: String,
    pub tooltip_short: String,
    pub tooltip_rules: String,
    pub text_source: TextSource,
}

/// One derived expression of a power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionRecord {
    pub expression_id: String,
    pub power_id: PowerId,
    pub template_id: String,
    pub form: Form,
    pub delivery: Delivery,
    pub scale: Scale,
    pub constraints: Constraints,
    pub text: ExpressionText,
}

/// A template considered for a power, with the position used to break ties.
#[derive(Debug, Clone)]
struct Candidate {
    template: ExpressionTemplate,
    position: usize,
}

/// Matches powers against a template catalog and emits ranked expressions.
#[derive(Debug, Clone)]
pub struct ExpressionSynthesizer {
    catalog: TemplateCatalog,
    max_per_power: usize,
}

impl ExpressionSynthesizer {
    /// Create a synthesizer keeping at most `max_per_power` expressions per power.
    pub fn new(catalog: TemplateCatalog, max_per_power: usize) -> Self {
        Self {
            catalog,
            max_per_power,
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Templates selected for a power, best first.
    ///
    /// # Algorithm
    ///
    /// 1. Collect every catalog template matching the power's kind and tags
    /// 2. With no match, use the fallback set; with a single candidate, append
    ///    fallbacks not already present
    /// 3. Stable sort by rarity weight descending, ties by catalog position
    /// 4. Keep the first `max_per_power`
    pub fn select(&self, power: &Power) -> Vec<ExpressionTemplate> {
        let mut candidates: Vec<Candidate> = self
            .catalog
            .matching(power)
            .map(|(position, template)| Candidate {
                template: template.clone(),
                position,
            })
            .collect();

        if candidates.len() < 2 {
            debug!(
                power_id = %power.id,
                matched = candidates.len(),
                "topping up with fallback templates"
            );
            let offset = self.catalog.len();
            for (i, template) in fallback_templates(power).into_iter().enumerate() {
                if candidates
                    .iter()
                    .all(|c| c.template.template_id != template.template_id)
                {
                    candidates.push(Candidate {
                        template,
                        position: offset + i,
                    });
                }
            }
        }

        candidates.sort_by_key(|c| (Reverse(c.template.rarity_weight), c.position));
        candidates.truncate(self.max_per_power);
        candidates.into_iter().map(|c| c.template).collect()
    }

    /// Emit the expressions of one power.
    pub fn synthesize(&self, power: &Power) -> Vec<ExpressionRecord> {
        self.select(power)
            .into_iter()
            .map(|template| emit(power, template))
            .collect()
    }

    /// Emit the expressions of every power, in catalog order.
    pub fn synthesize_all(&self, powers: &[Power]) -> Vec<ExpressionRecord> {
        powers.iter().flat_map(|power| self.synthesize(power)).collect()
    }
}

/// Fallback templates for a power: a neutral touch plus one tag-driven extra.
pub fn fallback_templates(power: &Power) -> Vec<ExpressionTemplate> {
    let extra = if power.has_any(tag_groups::ELEMENTAL_ENERGY) {
        fallback_projectile_element()
    } else if power.has_any(tag_groups::CONTROL_MAGIC) {
        fallback_aura_control()
    } else {
        fallback_touch_followup()
    };
    vec![fallback_touch_neutral(), extra]
}

/// Identifier of the expression a template yields for a power.
pub fn expression_id(power_id: &PowerId, template_id: &str, form: Form, delivery: Delivery) -> String {
    stable_id(&[power_id.as_str(), template_id, form.as_str(), delivery.as_str()])
}

fn emit(power: &Power, template: ExpressionTemplate) -> ExpressionRecord {
    let ui_name = display_name(&power.name, template.form);
    ExpressionRecord {
        expression_id: expression_id(
            &power.id,
            &template.template_id,
            template.form,
            template.delivery,
        ),
        power_id: power.id.clone(),
        form: template.form,
        delivery: template.delivery,
        scale: template.scale,
        text: ExpressionText {
            ui_name,
            tooltip_short: tooltip_short(&power.name, template.form),
            tooltip_rules: tooltip_rules(&template.constraints),
            text_source: TextSource::Generated,
        },
        constraints: template.constraints,
        template_id: template.template_id,
    }
}

/// "<power name> <form noun>", e.g. "Pyrokinesis Lance".
pub fn display_name(power_name: &str, form: Form) -> String {
    format!("{} {}", power_name, form.name_suffix())
}

/// One-sentence description naming the form.
pub fn tooltip_short(power_name: &str, form: Form) -> String {
    format!("{} expression of {}.", form.title(), power_name)
}

/// Rules sentence built from the constraint fields that are present.
pub fn tooltip_rules(constraints: &Constraints) -> String {
    let mut bits = Vec::new();
    let field = |key: &str| constraints.get(key).map(render_value);

    if let Some(range) = field("range_m") {
        bits.push(format!("Range {}m", range));
    }
    if constraints.is_truthy("radius_m") {
        if let Some(radius) = field("radius_m") {
            bits.push(format!("Radius {}m", radius));
        }
    }
    if constraints.is_truthy("requires_los") {
        bits.push("Requires line of sight".to_string());
    }
    if constraints.is_truthy("requires_contact") {
        bits.push("Requires contact".to_string());
    }
    for (key, label) in [
        ("cooldown", "Cooldown"),
        ("duration_turns", "Duration"),
        ("cost_per_tick", "Upkeep"),
        ("cost", "Cost"),
    ] {
        if let Some(value) = field(key) {
            bits.push(format!("{} {}", label, value));
        }
    }

    if bits.is_empty() {
        STANDARD_RULES_TEXT.to_string()
    } else {
        format!("{}.", bits.join(". "))
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "none".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{} {}", k, render_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
