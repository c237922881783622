//! Table names and DDL of the content database.

/// Catalog table holding one row per power (`rowid`, `name`, `tags`).
pub const POWER_TABLE: &str = "Superpower4";
pub const POWER_TAG_TABLE: &str = "power_tag";
pub const POWER_TEXT_TABLE: &str = "power_text";

pub const TEMPLATE_TABLE: &str = "expression_template";
pub const EXPRESSION_TABLE: &str = "power_expression";
pub const EXPRESSION_TEXT_TABLE: &str = "power_expression_text";
pub const COST_TABLE: &str = "power_expression_cost";
pub const SIGNATURE_TABLE: &str = "power_expression_signature";
pub const ACQUISITION_TABLE: &str = "power_acquisition_profile";
pub const PERSONA_TABLE: &str = "persona_power";

/// Catalog tables a run reads from.
pub const INPUT_TABLES: &[&str] = &[POWER_TABLE, POWER_TAG_TABLE, POWER_TEXT_TABLE];

/// Tables a run regenerates.
pub const OUTPUT_TABLES: &[&str] = &[
    TEMPLATE_TABLE,
    EXPRESSION_TABLE,
    EXPRESSION_TEXT_TABLE,
    COST_TABLE,
    SIGNATURE_TABLE,
    ACQUISITION_TABLE,
];

/// Minimal catalog tables, for fixtures and fresh databases.
pub const CATALOG_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS Superpower4 (
    name TEXT NOT NULL,
    tags TEXT
);

CREATE TABLE IF NOT EXISTS power_tag (
    power_id INTEGER NOT NULL,
    tag TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS power_text (
    power_id INTEGER NOT NULL,
    locale TEXT NOT NULL DEFAULT 'en-GB',
    description TEXT
);
";

/// Derived tables. Never alters a table that already exists.
pub const OUTPUT_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS expression_template (
    template_id TEXT PRIMARY KEY,
    kind_match TEXT,
    tags_any TEXT NOT NULL DEFAULT '[]',
    form TEXT NOT NULL,
    delivery TEXT NOT NULL,
    scale TEXT NOT NULL DEFAULT 'STREET',
    default_constraints TEXT NOT NULL DEFAULT '{}',
    rarity_weight INTEGER NOT NULL DEFAULT 1,
    is_enabled INTEGER NOT NULL DEFAULT 1 CHECK (is_enabled IN (0,1))
);

CREATE TABLE IF NOT EXISTS power_expression (
    expression_id TEXT PRIMARY KEY,
    power_id INTEGER NOT NULL,
    expression_name TEXT NOT NULL,
    form TEXT NOT NULL,
    delivery TEXT NOT NULL,
    scale TEXT NOT NULL,
    constraints TEXT NOT NULL DEFAULT '{}' CHECK (json_valid(constraints)),
    tags_override TEXT,
    is_enabled INTEGER NOT NULL DEFAULT 1 CHECK (is_enabled IN (0,1))
);

CREATE INDEX IF NOT EXISTS idx_power_expression_power ON power_expression (power_id);

CREATE TABLE IF NOT EXISTS power_expression_text (
    expression_id TEXT NOT NULL,
    locale TEXT NOT NULL,
    ui_name TEXT NOT NULL,
    tooltip_short TEXT NOT NULL,
    tooltip_rules TEXT NOT NULL,
    text_source TEXT NOT NULL DEFAULT 'GENERATED',
    text_version INTEGER NOT NULL DEFAULT 1,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (expression_id, locale),
    FOREIGN KEY (expression_id) REFERENCES power_expression(expression_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS power_expression_cost (
    cost_id INTEGER PRIMARY KEY AUTOINCREMENT,
    expression_id TEXT NOT NULL,
    cost_type TEXT NOT NULL CHECK (cost_type IN ('STAMINA','FOCUS','COOLDOWN')),
    value INTEGER NOT NULL,
    FOREIGN KEY (expression_id) REFERENCES power_expression(expression_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS power_expression_signature (
    signature_id INTEGER PRIMARY KEY AUTOINCREMENT,
    expression_id TEXT NOT NULL,
    signature_type TEXT NOT NULL CHECK (signature_type IN (
        'VISUAL_ANOMALY','EM_SPIKE','THERMAL_BLOOM','ACOUSTIC_SHOCK','CHEMICAL_RESIDUE',
        'BIO_MARKER','PSYCHIC_ECHO','DIMENSIONAL_RESIDUE','GRAVITIC_DISTURBANCE',
        'ARCANE_RESONANCE','CAUSAL_IMPRINT','KINETIC_STRESS','RADIATION_TRACE'
    )),
    strength INTEGER NOT NULL CHECK (strength BETWEEN 1 AND 100),
    persistence_turns INTEGER NOT NULL DEFAULT 0 CHECK (persistence_turns >= 0),
    FOREIGN KEY (expression_id) REFERENCES power_expression(expression_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS power_acquisition_profile (
    acq_id TEXT PRIMARY KEY,
    power_id INTEGER NOT NULL,
    origin_class TEXT NOT NULL,
    origin_subtype TEXT NOT NULL,
    delivery_channel TEXT NOT NULL,
    acquisition_event_kind TEXT NOT NULL,
    rarity_weight INTEGER NOT NULL DEFAULT 1,
    requires_entity_kind TEXT,
    requires_tags_any TEXT,
    requires_tags_all TEXT,
    counterplay_tags TEXT NOT NULL DEFAULT '[]',
    default_costs TEXT NOT NULL DEFAULT '{}',
    default_limits TEXT NOT NULL DEFAULT '{}',
    default_signatures TEXT NOT NULL DEFAULT '[]',
    collateral_profile TEXT NOT NULL DEFAULT 'LOW',
    stability_profile TEXT NOT NULL DEFAULT 'STABLE',
    notes TEXT,
    is_enabled INTEGER NOT NULL DEFAULT 1 CHECK (is_enabled IN (0,1))
);

CREATE INDEX IF NOT EXISTS idx_acquisition_power ON power_acquisition_profile (power_id);
";

/// Persona bindings plus the triggers tying each expression to its power.
pub const PERSONA_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS persona_power (
    persona_id TEXT NOT NULL,
    power_id INTEGER NOT NULL,
    expression_id TEXT NOT NULL,
    mastery_level INTEGER NOT NULL DEFAULT 1 CHECK (mastery_level BETWEEN 1 AND 100),
    modifiers TEXT NOT NULL DEFAULT '{}' CHECK (json_valid(modifiers)),
    is_unlocked INTEGER NOT NULL DEFAULT 1 CHECK (is_unlocked IN (0,1)),
    PRIMARY KEY (persona_id, expression_id),
    FOREIGN KEY (expression_id) REFERENCES power_expression(expression_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_persona_power_persona ON persona_power (persona_id);
CREATE INDEX IF NOT EXISTS idx_persona_power_power ON persona_power (power_id);

CREATE TRIGGER IF NOT EXISTS persona_power_check_insert
BEFORE INSERT ON persona_power
BEGIN
    SELECT CASE
        WHEN NOT EXISTS (
            SELECT 1 FROM power_expression pe
            WHERE pe.expression_id = NEW.expression_id
              AND pe.power_id = NEW.power_id
        ) THEN RAISE(ABORT, 'expression does not belong to power')
    END;
END;

CREATE TRIGGER IF NOT EXISTS persona_power_check_update
BEFORE UPDATE ON persona_power
BEGIN
    SELECT CASE
        WHEN NOT EXISTS (
            SELECT 1 FROM power_expression pe
            WHERE pe.expression_id = NEW.expression_id
              AND pe.power_id = NEW.power_id
        ) THEN RAISE(ABORT, 'expression does not belong to power')
    END;
END;
";

/// Message raised by the persona triggers.
pub const OWNERSHIP_VIOLATION: &str = "expression does not belong to power";
