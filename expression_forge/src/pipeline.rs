//! The forge pipeline - runs every phase in dependency order.
//!
//! Templates → expressions → costs → signatures → acquisition profiles →
//! coverage. Each write phase is its own transaction, so a failure leaves the
//! phases already committed in place and the failing phase untouched.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use tracing::info;

use power_rules::{Power, PowerId, TemplateCatalog};

use crate::acquisition::AcquisitionProfiler;
use crate::config::ForgeConfig;
use crate::cost::{derive_costs, ExpressionCost};
use crate::coverage::CoverageReport;
use crate::error::ForgeResult;
use crate::signature::{derive_signatures, SignatureSet};
use crate::store::schema::{
    self, ACQUISITION_TABLE, EXPRESSION_TABLE, POWER_TABLE, POWER_TAG_TABLE, SIGNATURE_TABLE,
};
use crate::store::{ContentStore, StoredExpression};
use crate::synthesis::ExpressionSynthesizer;

/// Row counts written by a full run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub templates: usize,
    pub expressions: usize,
    pub costs: usize,
    pub signatures: usize,
    pub acquisition_profiles: usize,
    pub coverage: CoverageReport,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Templates seeded: {}", self.templates)?;
        writeln!(f, "Expressions created: {}", self.expressions)?;
        writeln!(f, "Expression costs created: {}", self.costs)?;
        writeln!(f, "Expression signatures created: {}", self.signatures)?;
        writeln!(f, "Acquisition profiles created: {}", self.acquisition_profiles)?;
        write!(f, "{}", self.coverage)
    }
}

/// Tag sets by power, for phases that work from stored expressions.
struct TagLookup<'a> {
    by_power: BTreeMap<&'a PowerId, &'a BTreeSet<String>>,
    empty: BTreeSet<String>,
}

impl<'a> TagLookup<'a> {
    fn new(powers: &'a [Power]) -> Self {
        Self {
            by_power: powers.iter().map(|p| (&p.id, &p.tags)).collect(),
            empty: BTreeSet::new(),
        }
    }

    fn tags(&self, power_id: &PowerId) -> &BTreeSet<String> {
        self.by_power.get(power_id).copied().unwrap_or(&self.empty)
    }
}

/// Owns the store and the run configuration.
#[derive(Debug)]
pub struct Forge {
    config: ForgeConfig,
    store: ContentStore,
}

impl Forge {
    pub fn new(store: ContentStore, config: ForgeConfig) -> Self {
        Self { config, store }
    }

    /// Open an existing database.
    pub fn open(path: impl AsRef<Path>, config: ForgeConfig) -> ForgeResult<Self> {
        Ok(Self::new(ContentStore::open(path)?, config))
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ContentStore {
        &mut self.store
    }

    pub fn into_store(self) -> ContentStore {
        self.store
    }

    /// Regenerate every derived table.
    pub fn run(&mut self) -> ForgeResult<RunReport> {
        self.config.validate()?;
        let required: Vec<&str> = schema::INPUT_TABLES
            .iter()
            .chain(schema::OUTPUT_TABLES)
            .copied()
            .collect();
        self.store.require_tables(&required)?;

        let templates = self.store.seed_templates(&TemplateCatalog::authored())?;
        info!(templates, "templates seeded");

        let catalog = self.store.load_templates()?;
        let powers = self.store.load_powers()?;
        info!(powers = powers.len(), templates = catalog.len(), "catalog loaded");

        let synthesizer = ExpressionSynthesizer::new(catalog, self.config.max_expressions_per_power);
        let records = synthesizer.synthesize_all(&powers);
        let expressions = self.store.replace_expressions(&records, &self.config)?;
        info!(expressions, "expressions created");

        let stored = self.store.load_expressions()?;
        let lookup = TagLookup::new(&powers);

        let costs = self.store.replace_costs(&cost_rows(&stored, &lookup))?;
        info!(costs, "expression costs created");

        let signatures = self.store.replace_signatures(&signature_rows(&stored, &lookup))?;
        info!(signatures, "expression signatures created");

        let profiler = AcquisitionProfiler::new(self.config.max_profiles_per_power);
        let acquisition_profiles = self
            .store
            .replace_acquisition_profiles(&profiler.profile_all(&powers))?;
        info!(acquisition_profiles, "acquisition profiles created");

        let coverage = self.validate()?;

        Ok(RunReport {
            templates,
            expressions,
            costs,
            signatures,
            acquisition_profiles,
            coverage,
        })
    }

    /// Regenerate only the signature rows from the stored expressions.
    pub fn refresh_signatures(&mut self) -> ForgeResult<usize> {
        self.store.require_tables(&[
            POWER_TABLE,
            POWER_TAG_TABLE,
            EXPRESSION_TABLE,
            SIGNATURE_TABLE,
        ])?;

        let powers = self.store.load_powers()?;
        let stored = self.store.load_expressions()?;
        let lookup = TagLookup::new(&powers);

        let signatures = self.store.replace_signatures(&signature_rows(&stored, &lookup))?;
        info!(signatures, "expression signatures refreshed");
        Ok(signatures)
    }

    /// Read-only coverage check.
    pub fn validate(&self) -> ForgeResult<CoverageReport> {
        self.store
            .require_tables(&[POWER_TABLE, EXPRESSION_TABLE, ACQUISITION_TABLE])?;
        let coverage = self.store.coverage()?;
        coverage.log();
        Ok(coverage)
    }
}

fn cost_rows(
    expressions: &[StoredExpression],
    lookup: &TagLookup<'_>,
) -> Vec<(String, Vec<ExpressionCost>)> {
    expressions
        .iter()
        .map(|e| {
            let costs = derive_costs(e.form, lookup.tags(&e.power_id), &e.constraints);
            (e.expression_id.clone(), costs)
        })
        .collect()
}

fn signature_rows(
    expressions: &[StoredExpression],
    lookup: &TagLookup<'_>,
) -> Vec<(String, SignatureSet)> {
    expressions
        .iter()
        .map(|e| (e.expression_id.clone(), derive_signatures(e.form, lookup.tags(&e.power_id))))
        .collect()
}
