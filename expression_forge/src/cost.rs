//! Resource costs of an expression.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use power_rules::tag_groups;
use power_rules::{Constraints, CostType, Form};

/// One cost row of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionCost {
    pub cost_type: CostType,
    pub value: i64,
}

impl ExpressionCost {
    pub fn new(cost_type: CostType, value: i64) -> Self {
        Self { cost_type, value }
    }
}

/// Derive the ordered cost rows of an expression.
///
/// Cooldowns come from the expression's own constraints when readable and
/// fall back to a per-form default otherwise. PASSIVE and CONSTRUCT are free.
pub fn derive_costs(
    form: Form,
    tags: &BTreeSet<String>,
    constraints: &Constraints,
) -> Vec<ExpressionCost> {
    use CostType::*;

    let cooldown = |default: i64| ExpressionCost::new(Cooldown, constraints.cooldown_or(default));

    match form {
        Form::Touch => {
            let mental = tag_groups::MIND.iter().any(|t| tags.contains(*t));
            let primary = if mental { Focus } else { Stamina };
            vec![ExpressionCost::new(primary, 1), cooldown(1)]
        }
        Form::Projectile | Form::Beam => vec![ExpressionCost::new(Stamina, 2), cooldown(2)],
        Form::Zone | Form::Aura => vec![
            ExpressionCost::new(Focus, 2),
            ExpressionCost::new(Stamina, 1),
            cooldown(2),
        ],
        Form::Movement => vec![ExpressionCost::new(Stamina, 1), cooldown(2)],
        Form::Summon => vec![ExpressionCost::new(Focus, 3), cooldown(4)],
        Form::Sense => vec![ExpressionCost::new(Focus, 1)],
        Form::Passive | Form::Construct => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use power_rules::normalize_tags;
    use serde_json::json;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        normalize_tags(list)
    }

    fn pairs(costs: &[ExpressionCost]) -> Vec<(CostType, i64)> {
        costs.iter().map(|c| (c.cost_type, c.value)).collect()
    }

    #[test]
    fn test_touch_costs() {
        let none = Constraints::new();
        assert_eq!(
            pairs(&derive_costs(Form::Touch, &tags(&["fire"]), &none)),
            vec![(CostType::Stamina, 1), (CostType::Cooldown, 1)]
        );
        assert_eq!(
            pairs(&derive_costs(Form::Touch, &tags(&["Psychic"]), &none)),
            vec![(CostType::Focus, 1), (CostType::Cooldown, 1)]
        );
    }

    #[test]
    fn test_cooldown_read_from_constraints() {
        let constraints = Constraints::new().with("cooldown", 3);
        let costs = derive_costs(Form::Beam, &tags(&[]), &constraints);
        assert_eq!(pairs(&costs), vec![(CostType::Stamina, 2), (CostType::Cooldown, 3)]);
    }

    #[test]
    fn test_malformed_cooldown_uses_form_default() {
        // Summon default is 4
        for raw in [json!("soon"), json!(null), json!({"turns": 2}), json!([1])] {
            let constraints = Constraints::new().with("cooldown", raw);
            let costs = derive_costs(Form::Summon, &tags(&[]), &constraints);
            assert_eq!(pairs(&costs), vec![(CostType::Focus, 3), (CostType::Cooldown, 4)]);
        }
    }

    #[test]
    fn test_coerced_cooldowns() {
        let float = Constraints::new().with("cooldown", 2.7);
        assert_eq!(derive_costs(Form::Movement, &tags(&[]), &float)[1].value, 2);

        let text = Constraints::new().with("cooldown", "5");
        assert_eq!(derive_costs(Form::Movement, &tags(&[]), &text)[1].value, 5);
    }

    #[test]
    fn test_area_forms() {
        let costs = derive_costs(Form::Zone, &tags(&[]), &Constraints::new());
        assert_eq!(
            pairs(&costs),
            vec![(CostType::Focus, 2), (CostType::Stamina, 1), (CostType::Cooldown, 2)]
        );
        assert_eq!(derive_costs(Form::Aura, &tags(&[]), &Constraints::new()).len(), 3);
    }

    #[test]
    fn test_free_and_focus_only_forms() {
        let none = Constraints::new().with("cooldown", 9);
        assert!(derive_costs(Form::Passive, &tags(&["body"]), &none).is_empty());
        assert!(derive_costs(Form::Construct, &tags(&[]), &none).is_empty());
        assert_eq!(
            pairs(&derive_costs(Form::Sense, &tags(&[]), &none)),
            vec![(CostType::Focus, 1)]
        );
    }
}
