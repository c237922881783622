//! SQLite content store.
//!
//! Loads the power catalog and swaps whole derived tables. Every `replace_*`
//! runs in one transaction: delete all, insert all, commit. An error drops the
//! transaction, which rolls the phase back and leaves prior rows intact.

pub mod schema;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use power_rules::{
    CatalogRow, Constraints, Delivery, ExpressionTemplate, Form, ParseEnumError, Power, PowerId,
    Scale, TagIndex, TemplateCatalog,
};

use crate::acquisition::AcquisitionProfile;
use crate::config::ForgeConfig;
use crate::cost::ExpressionCost;
use crate::coverage::CoverageReport;
use crate::error::{ForgeError, ForgeResult};
use crate::signature::SignatureSet;
use crate::synthesis::ExpressionRecord;

/// An expression as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredExpression {
    pub expression_id: String,
    pub power_id: PowerId,
    pub form: Form,
    pub delivery: Delivery,
    pub scale: Scale,
    pub constraints: Constraints,
}

/// Handle on the content database.
#[derive(Debug)]
pub struct ContentStore {
    pub(crate) conn: Connection,
}

impl ContentStore {
    /// Open an existing database file.
    pub fn open(path: impl AsRef<Path>) -> ForgeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForgeError::DatabaseNotFound(path.to_path_buf()));
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> ForgeResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> ForgeResult<Self> {
        let store = Self { conn };
        store.configure()?;
        Ok(store)
    }

    fn configure(&self) -> ForgeResult<()> {
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    /// Raw connection, for fixtures and ad-hoc queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn table_exists(&self, name: &str) -> ForgeResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Fail with every absent table name if any is missing.
    pub fn require_tables(&self, names: &[&str]) -> ForgeResult<()> {
        let mut missing = Vec::new();
        for name in names {
            if !self.table_exists(name)? {
                missing.push(name.to_string());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ForgeError::MissingTables(missing))
        }
    }

    /// Create the derived tables that do not exist yet.
    pub fn ensure_output_schema(&self) -> ForgeResult<()> {
        self.conn.execute_batch(schema::OUTPUT_SCHEMA)?;
        Ok(())
    }

    /// Create the catalog tables that do not exist yet.
    pub fn ensure_catalog_schema(&self) -> ForgeResult<()> {
        self.conn.execute_batch(schema::CATALOG_SCHEMA)?;
        Ok(())
    }

    /// Load every power in catalog order with its resolved tags and kind.
    pub fn load_powers(&self) -> ForgeResult<Vec<Power>> {
        let mut stmt = self.conn.prepare(
            "SELECT CAST(rowid AS TEXT), name, tags FROM Superpower4 ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CatalogRow {
                    id: PowerId::new(row.get::<_, String>(0)?),
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    inline_tags: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let index = self.load_tag_index()?;
        Ok(index.resolve_all(&rows))
    }

    fn load_tag_index(&self) -> ForgeResult<TagIndex> {
        let mut stmt = self
            .conn
            .prepare("SELECT CAST(power_id AS TEXT), tag FROM power_tag")?;
        let pairs = stmt
            .query_map([], |row| {
                Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pairs
            .into_iter()
            .filter_map(|(id, tag)| Some((PowerId::new(id?), tag?)))
            .collect())
    }

    /// Replace every template row with the given catalog.
    pub fn seed_templates(&mut self, catalog: &TemplateCatalog) -> ForgeResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM expression_template", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO expression_template (
                    template_id, kind_match, tags_any, form, delivery, scale,
                    default_constraints, rarity_weight, is_enabled
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1)",
            )?;
            for template in catalog.iter() {
                insert.execute(params![
                    template.template_id,
                    template.kind_match,
                    serde_json::to_string(&template.tags_any)?,
                    template.form.as_str(),
                    template.delivery.as_str(),
                    template.scale.as_str(),
                    template.constraints.to_json(),
                    i64::from(template.rarity_weight),
                ])?;
            }
        }
        tx.commit()?;
        Ok(catalog.len())
    }

    /// Load enabled templates in insertion order.
    pub fn load_templates(&self) -> ForgeResult<TemplateCatalog> {
        let mut stmt = self.conn.prepare(
            "SELECT template_id, kind_match, tags_any, form, delivery, scale,
                    default_constraints, rarity_weight
             FROM expression_template
             WHERE is_enabled = 1
             ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TemplateRow {
                    template_id: row.get(0)?,
                    kind_match: row.get(1)?,
                    tags_any: row.get(2)?,
                    form: row.get(3)?,
                    delivery: row.get(4)?,
                    scale: row.get(5)?,
                    constraints: row.get(6)?,
                    rarity_weight: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TemplateCatalog::new(
            rows.into_iter().filter_map(TemplateRow::into_template).collect(),
        ))
    }

    /// Replace every expression and its display text.
    pub fn replace_expressions(
        &mut self,
        records: &[ExpressionRecord],
        config: &ForgeConfig,
    ) -> ForgeResult<usize> {
        let updated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM power_expression_text", [])?;
        tx.execute("DELETE FROM power_expression", [])?;
        {
            let mut insert_expression = tx.prepare(
                "INSERT INTO power_expression (
                    expression_id, power_id, expression_name, form, delivery, scale,
                    constraints, tags_override, is_enabled
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, 1)",
            )?;
            let mut insert_text = tx.prepare(
                "INSERT INTO power_expression_text (
                    expression_id, locale, ui_name, tooltip_short, tooltip_rules,
                    text_source, text_version, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for record in records {
                insert_expression.execute(params![
                    record.expression_id,
                    power_key(&record.power_id),
                    record.text.ui_name,
                    record.form.as_str(),
                    record.delivery.as_str(),
                    record.scale.as_str(),
                    record.constraints.to_json(),
                ])?;
                insert_text.execute(params![
                    record.expression_id,
                    config.locale,
                    record.text.ui_name,
                    record.text.tooltip_short,
                    record.text.tooltip_rules,
                    record.text.text_source.as_str(),
                    i64::from(config.text_version),
                    updated_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Load enabled expressions ordered by power, then expression id.
    ///
    /// Malformed constraints are logged and read as empty; rows with an
    /// unknown form, delivery or scale are skipped.
    pub fn load_expressions(&self) -> ForgeResult<Vec<StoredExpression>> {
        let mut stmt = self.conn.prepare(
            "SELECT expression_id, CAST(power_id AS TEXT), form, delivery, scale, constraints
             FROM power_expression
             WHERE is_enabled = 1
             ORDER BY power_id, expression_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut expressions = Vec::with_capacity(rows.len());
        for (expression_id, power_id, form, delivery, scale, constraints) in rows {
            let (Some(form), Some(delivery), Some(scale)) = (
                parse_stored::<Form>(&expression_id, &form),
                parse_stored::<Delivery>(&expression_id, &delivery),
                parse_stored::<Scale>(&expression_id, &scale),
            ) else {
                continue;
            };
            let constraints = read_constraints(&expression_id, constraints.as_deref());
            expressions.push(StoredExpression {
                expression_id,
                power_id: PowerId::new(power_id),
                form,
                delivery,
                scale,
                constraints,
            });
        }
        Ok(expressions)
    }

    /// Replace every cost row.
    pub fn replace_costs(&mut self, costs: &[(String, Vec<ExpressionCost>)]) -> ForgeResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM power_expression_cost", [])?;
        let mut written = 0;
        {
            let mut insert = tx.prepare(
                "INSERT INTO power_expression_cost (expression_id, cost_type, value)
                 VALUES (?1, ?2, ?3)",
            )?;
            for (expression_id, rows) in costs {
                for cost in rows {
                    insert.execute(params![expression_id, cost.cost_type.as_str(), cost.value])?;
                    written += 1;
                }
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Replace every signature row.
    pub fn replace_signatures(
        &mut self,
        signatures: &[(String, SignatureSet)],
    ) -> ForgeResult<usize> {
        let tx = self.conn.transaction()?;
        let written = write_signatures(&tx, signatures)?;
        tx.commit()?;
        Ok(written)
    }

    /// Replace every acquisition profile.
    pub fn replace_acquisition_profiles(
        &mut self,
        profiles: &[AcquisitionProfile],
    ) -> ForgeResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM power_acquisition_profile", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO power_acquisition_profile (
                    acq_id, power_id, origin_class, origin_subtype, delivery_channel,
                    acquisition_event_kind, rarity_weight, requires_entity_kind,
                    requires_tags_any, requires_tags_all, counterplay_tags, default_costs,
                    default_limits, default_signatures, collateral_profile, stability_profile,
                    notes, is_enabled
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, ?10, '{}', '{}', ?11, ?12, ?13, NULL, 1)",
            )?;
            for profile in profiles {
                let requires_tags_any = profile
                    .requires_tags_any
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?;
                insert.execute(params![
                    profile.acq_id,
                    power_key(&profile.power_id),
                    profile.origin_class.as_str(),
                    profile.origin_subtype.as_str(),
                    profile.delivery_channel.as_str(),
                    profile.event_kind.as_str(),
                    i64::from(profile.rarity_weight),
                    profile.requires_entity_kind,
                    requires_tags_any,
                    serde_json::to_string(&profile.counterplay_tags)?,
                    serde_json::to_string(&profile.default_signatures)?,
                    profile.collateral.as_str(),
                    profile.stability.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(profiles.len())
    }

    /// Count powers lacking enabled expressions or acquisition profiles.
    pub fn coverage(&self) -> ForgeResult<CoverageReport> {
        let count = |sql: &str| -> ForgeResult<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or(0))
        };

        Ok(CoverageReport {
            total_powers: count("SELECT COUNT(*) FROM Superpower4")?,
            without_expressions: count(
                "SELECT COUNT(*) FROM Superpower4 p
                 WHERE NOT EXISTS (
                    SELECT 1 FROM power_expression e
                    WHERE e.power_id = p.rowid AND e.is_enabled = 1
                 )",
            )?,
            without_profiles: count(
                "SELECT COUNT(*) FROM Superpower4 p
                 WHERE NOT EXISTS (
                    SELECT 1 FROM power_acquisition_profile a
                    WHERE a.power_id = p.rowid AND a.is_enabled = 1
                 )",
            )?,
        })
    }
}

/// Bind a power id the way the catalog stores it: numeric ids as INTEGER.
pub(crate) fn power_key(power_id: &PowerId) -> SqlValue {
    match power_id.as_str().parse::<i64>() {
        Ok(n) => SqlValue::Integer(n),
        Err(_) => SqlValue::Text(power_id.as_str().to_string()),
    }
}

fn write_signatures(tx: &Transaction<'_>, signatures: &[(String, SignatureSet)]) -> ForgeResult<usize> {
    tx.execute("DELETE FROM power_expression_signature", [])?;
    let mut insert = tx.prepare(
        "INSERT INTO power_expression_signature
            (expression_id, signature_type, strength, persistence_turns)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut written = 0;
    for (expression_id, set) in signatures {
        for (signature, emission) in set.iter() {
            insert.execute(params![
                expression_id,
                signature.as_str(),
                i64::from(emission.strength),
                i64::from(emission.persistence_turns),
            ])?;
            written += 1;
        }
    }
    Ok(written)
}

struct TemplateRow {
    template_id: String,
    kind_match: Option<String>,
    tags_any: Option<String>,
    form: String,
    delivery: String,
    scale: String,
    constraints: Option<String>,
    rarity_weight: i64,
}

impl TemplateRow {
    fn into_template(self) -> Option<ExpressionTemplate> {
        let id = self.template_id;
        let form = parse_stored::<Form>(&id, &self.form)?;
        let delivery = parse_stored::<Delivery>(&id, &self.delivery)?;
        let scale = parse_stored::<Scale>(&id, &self.scale)?;

        let tags_any = match self.tags_any.as_deref().filter(|raw| !raw.trim().is_empty()) {
            None => BTreeSet::new(),
            Some(raw) => match serde_json::from_str::<Vec<String>>(raw) {
                Ok(tags) => power_rules::normalize_tags(tags),
                Err(err) => {
                    warn!(template_id = %id, error = %err, "skipping template with malformed tags_any");
                    return None;
                }
            },
        };
        let Ok(rarity_weight) = u32::try_from(self.rarity_weight) else {
            warn!(template_id = %id, rarity_weight = self.rarity_weight, "skipping template with negative weight");
            return None;
        };

        Some(ExpressionTemplate {
            constraints: read_constraints(&id, self.constraints.as_deref()),
            kind_match: self.kind_match.map(|k| k.trim().to_lowercase()),
            tags_any,
            form,
            delivery,
            scale,
            rarity_weight,
            template_id: id,
        })
    }
}

fn parse_stored<T>(row_id: &str, raw: &str) -> Option<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    match raw.parse() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(row_id, error = %err, "skipping row with unknown value");
            None
        }
    }
}

fn read_constraints(row_id: &str, raw: Option<&str>) -> Constraints {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Constraints::new();
    };
    match Constraints::parse(raw) {
        Ok(constraints) => constraints,
        Err(err) => {
            warn!(row_id, error = %err, "malformed constraints, using empty object");
            Constraints::new()
        }
    }
}
