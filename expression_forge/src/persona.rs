//! Persona bindings - which expressions a persona has unlocked.
//!
//! The database itself guards the binding: triggers on `persona_power` abort
//! any row whose expression belongs to a different power.

use rusqlite::params;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use power_rules::PowerId;

use crate::error::{ForgeError, ForgeResult};
use crate::store::schema::{self, OWNERSHIP_VIOLATION};
use crate::store::{power_key, ContentStore};

/// Parse a modifiers payload; it must be a JSON object.
pub fn parse_modifiers(raw: &str) -> ForgeResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ForgeError::InvalidConfig(format!(
            "modifiers must be a JSON object, got {}",
            other
        ))),
        Err(err) => Err(ForgeError::InvalidConfig(format!("invalid modifiers JSON: {}", err))),
    }
}

/// Request to bind a persona to stored expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaBinding {
    pub persona_id: String,
    /// Expressions taken per power, in expression-id order.
    pub take_per_power: usize,
    /// 1..=100
    pub mastery_level: u8,
    pub modifiers: Map<String, Value>,
    /// Drop the persona's existing bindings first.
    pub replace: bool,
}

impl PersonaBinding {
    pub fn new(persona_id: impl Into<String>) -> Self {
        Self {
            persona_id: persona_id.into(),
            take_per_power: 1,
            mastery_level: 1,
            modifiers: Map::new(),
            replace: false,
        }
    }

    pub fn with_take_per_power(mut self, take_per_power: usize) -> Self {
        self.take_per_power = take_per_power;
        self
    }

    pub fn with_mastery(mut self, mastery_level: u8) -> Self {
        self.mastery_level = mastery_level;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Map<String, Value>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn validate(&self) -> ForgeResult<()> {
        if self.persona_id.trim().is_empty() {
            return Err(ForgeError::InvalidConfig("persona id must not be empty".to_string()));
        }
        if self.take_per_power == 0 {
            return Err(ForgeError::InvalidConfig(
                "take_per_power must be at least 1".to_string(),
            ));
        }
        if !(1..=100).contains(&self.mastery_level) {
            return Err(ForgeError::InvalidConfig(format!(
                "mastery level {} is outside 1..=100",
                self.mastery_level
            )));
        }
        Ok(())
    }
}

/// One stored persona binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaPower {
    pub persona_id: String,
    pub power_id: PowerId,
    pub expression_id: String,
    pub mastery_level: u8,
    pub modifiers: Map<String, Value>,
    pub is_unlocked: bool,
}

const UPSERT_BINDING: &str = "
INSERT INTO persona_power (persona_id, power_id, expression_id, mastery_level, modifiers, is_unlocked)
VALUES (?1, ?2, ?3, ?4, ?5, 1)
ON CONFLICT(persona_id, expression_id) DO UPDATE SET
    power_id = excluded.power_id,
    mastery_level = excluded.mastery_level,
    modifiers = excluded.modifiers,
    is_unlocked = 1";

fn ownership_error(err: rusqlite::Error, expression_id: &str, power_id: &PowerId) -> ForgeError {
    let violated = matches!(
        &err,
        rusqlite::Error::SqliteFailure(_, Some(message)) if message.contains(OWNERSHIP_VIOLATION)
    );
    if violated {
        ForgeError::IntegrityViolation {
            expression_id: expression_id.to_string(),
            power_id: power_id.to_string(),
        }
    } else {
        ForgeError::Sqlite(err)
    }
}

impl ContentStore {
    /// Create `persona_power` and its ownership triggers if absent.
    pub fn ensure_persona_schema(&self) -> ForgeResult<()> {
        self.conn.execute_batch(schema::PERSONA_SCHEMA)?;
        Ok(())
    }

    /// Bind a persona to the first expressions of every power.
    ///
    /// Runs in one transaction; an ownership violation rolls back every row.
    pub fn bind_persona(&mut self, binding: &PersonaBinding) -> ForgeResult<usize> {
        binding.validate()?;
        self.require_tables(&[schema::EXPRESSION_TABLE, schema::PERSONA_TABLE])?;

        let grouped = self.expressions_by_power()?;
        let modifiers = Value::Object(binding.modifiers.clone()).to_string();

        let tx = self.conn.transaction()?;
        if binding.replace {
            tx.execute(
                "DELETE FROM persona_power WHERE persona_id = ?1",
                params![binding.persona_id],
            )?;
        }

        let mut bound = 0;
        {
            let mut upsert = tx.prepare(UPSERT_BINDING)?;
            for (power_id, expression_ids) in &grouped {
                for expression_id in expression_ids.iter().take(binding.take_per_power) {
                    upsert
                        .execute(params![
                            binding.persona_id,
                            power_key(power_id),
                            expression_id,
                            i64::from(binding.mastery_level),
                            modifiers,
                        ])
                        .map_err(|err| ownership_error(err, expression_id, power_id))?;
                    bound += 1;
                }
            }
        }
        tx.commit()?;

        info!(persona = %binding.persona_id, bound, "persona bindings written");
        Ok(bound)
    }

    /// Bind a single expression, checked against its stated power.
    pub fn bind_expression(
        &self,
        persona_id: &str,
        power_id: &PowerId,
        expression_id: &str,
        mastery_level: u8,
        modifiers: &Map<String, Value>,
    ) -> ForgeResult<()> {
        PersonaBinding::new(persona_id)
            .with_mastery(mastery_level)
            .validate()?;

        self.conn
            .execute(
                UPSERT_BINDING,
                params![
                    persona_id,
                    power_key(power_id),
                    expression_id,
                    i64::from(mastery_level),
                    Value::Object(modifiers.clone()).to_string(),
                ],
            )
            .map_err(|err| ownership_error(err, expression_id, power_id))?;
        Ok(())
    }

    /// Bindings of a persona, ordered by power then expression.
    pub fn persona_powers(&self, persona_id: &str) -> ForgeResult<Vec<PersonaPower>> {
        let mut stmt = self.conn.prepare(
            "SELECT CAST(power_id AS TEXT), expression_id, mastery_level, modifiers, is_unlocked
             FROM persona_power
             WHERE persona_id = ?1
             ORDER BY power_id, expression_id",
        )?;
        let rows = stmt
            .query_map(params![persona_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(power_id, expression_id, mastery, modifiers, unlocked)| -> ForgeResult<PersonaPower> {
                Ok(PersonaPower {
                    persona_id: persona_id.to_string(),
                    power_id: PowerId::new(power_id),
                    expression_id,
                    mastery_level: u8::try_from(mastery.clamp(1, 100)).unwrap_or(1),
                    modifiers: serde_json::from_str(&modifiers)?,
                    is_unlocked: unlocked != 0,
                })
            })
            .collect()
    }

    fn expressions_by_power(&self) -> ForgeResult<Vec<(PowerId, Vec<String>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT CAST(power_id AS TEXT), expression_id
             FROM power_expression
             WHERE is_enabled = 1
             ORDER BY power_id, expression_id",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut grouped: Vec<(PowerId, Vec<String>)> = Vec::new();
        for (power_id, expression_id) in rows {
            let same_power = grouped
                .last()
                .is_some_and(|(last, _)| last.as_str() == power_id);
            if same_power {
                if let Some((_, ids)) = grouped.last_mut() {
                    ids.push(expression_id);
                }
            } else {
                grouped.push((PowerId::new(power_id), vec![expression_id]));
            }
        }
        Ok(grouped)
    }
}
