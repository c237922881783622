use std::path::{Path, PathBuf};

use expression_forge::{
    ContentStore, Forge, ForgeConfig, ForgeError, PersonaBinding, RunReport,
};
use power_rules::PowerId;
use rusqlite::Connection;
use tempfile::TempDir;

const CATALOG_ROWS: &str = "
INSERT INTO Superpower4 (rowid, name, tags) VALUES
    (1, 'Pyrokinesis', 'kind:elemental'),
    (2, 'Blink', 'kind:mobility'),
    (3, 'Mindreader', 'kind:psychic'),
    (4, 'Oddity', NULL),
    (5, 'Gadgeteer', 'tech,gravity'),
    (42, 'Grasp', 'touch');
INSERT INTO power_tag (power_id, tag) VALUES
    (1, 'fire'), (1, 'heat'),
    (2, 'space'), (2, 'teleport'),
    (3, 'mind'), (3, 'telepathy'),
    (4, 'unmapped_tag');
";

/// On-disk database with the catalog and derived tables.
fn catalog_db() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("content.db");
    let store = ContentStore::from_connection(Connection::open(&path).unwrap()).unwrap();
    store.ensure_catalog_schema().unwrap();
    store.ensure_output_schema().unwrap();
    store.connection().execute_batch(CATALOG_ROWS).unwrap();
    (dir, path)
}

fn run(path: &Path, config: ForgeConfig) -> RunReport {
    Forge::open(path, config).unwrap().run().unwrap()
}

fn dump(store: &ContentStore, sql: &str) -> Vec<String> {
    let mut stmt = store.connection().prepare(sql).unwrap();
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    rows
}

/// Every derived row except timestamps and surrogate keys.
fn derived_snapshot(path: &Path) -> Vec<Vec<String>> {
    let store = ContentStore::open(path).unwrap();
    [
        "SELECT json_array(expression_id, power_id, expression_name, form, delivery, scale, constraints)
         FROM power_expression ORDER BY expression_id",
        "SELECT json_array(expression_id, locale, ui_name, tooltip_short, tooltip_rules, text_source, text_version)
         FROM power_expression_text ORDER BY expression_id",
        "SELECT json_array(expression_id, cost_type, value)
         FROM power_expression_cost ORDER BY expression_id, cost_id",
        "SELECT json_array(expression_id, signature_type, strength, persistence_turns)
         FROM power_expression_signature ORDER BY expression_id, signature_type",
        "SELECT json_array(acq_id, power_id, origin_class, origin_subtype, delivery_channel,
                acquisition_event_kind, rarity_weight, requires_entity_kind, requires_tags_any,
                counterplay_tags, default_signatures, collateral_profile, stability_profile)
         FROM power_acquisition_profile ORDER BY acq_id",
    ]
    .iter()
    .map(|sql| dump(&store, sql))
    .collect()
}

fn count(path: &Path, sql: &str) -> i64 {
    let store = ContentStore::open(path).unwrap();
    let n = store.connection().query_row(sql, [], |row| row.get(0)).unwrap();
    n
}

#[test]
fn test_rerun_is_idempotent() {
    let (_dir, path) = catalog_db();

    let first = run(&path, ForgeConfig::default());
    let before = derived_snapshot(&path);
    let second = run(&path, ForgeConfig::default());
    let after = derived_snapshot(&path);

    assert_eq!(first, second);
    assert_eq!(before, after);
    assert!(!before[0].is_empty());
}

#[test]
fn test_every_power_is_covered() {
    let (_dir, path) = catalog_db();
    let report = run(&path, ForgeConfig::default());

    assert_eq!(report.coverage.total_powers, 6);
    assert!(report.coverage.is_complete());
    assert_eq!(
        count(
            &path,
            "SELECT COUNT(*) FROM (SELECT power_id FROM power_expression
             GROUP BY power_id HAVING COUNT(*) > 3)"
        ),
        0
    );
}

#[test]
fn test_signature_rows_are_unique() {
    let (_dir, path) = catalog_db();
    run(&path, ForgeConfig::default());

    assert_eq!(
        count(
            &path,
            "SELECT COUNT(*) FROM (SELECT expression_id, signature_type
             FROM power_expression_signature
             GROUP BY expression_id, signature_type HAVING COUNT(*) > 1)"
        ),
        0
    );
    // Only PASSIVE expressions may be silent.
    assert_eq!(
        count(
            &path,
            "SELECT COUNT(*) FROM power_expression e
             WHERE e.form <> 'PASSIVE' AND NOT EXISTS (
                SELECT 1 FROM power_expression_signature s WHERE s.expression_id = e.expression_id
             )"
        ),
        0
    );
}

#[test]
fn test_known_expression_id() {
    let (_dir, path) = catalog_db();
    run(&path, ForgeConfig::default());

    let store = ContentStore::open(&path).unwrap();
    let name: String = store
        .connection()
        .query_row(
            "SELECT expression_name FROM power_expression
             WHERE expression_id = '0727867fa6a6d12d07a5cf64f8376b07972fed5b'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(name, "Grasp Touch");
}

#[test]
fn test_unmapped_power_gets_fallbacks() {
    let (_dir, path) = catalog_db();
    run(&path, ForgeConfig::default());

    let store = ContentStore::open(&path).unwrap();
    let rows = dump(
        &store,
        "SELECT form || ' ' || delivery FROM power_expression WHERE power_id = 4 ORDER BY form, delivery",
    );
    assert_eq!(rows, vec!["TOUCH INSTANT", "TOUCH TRIGGERED"]);

    let rules = dump(
        &store,
        "SELECT t.tooltip_rules FROM power_expression_text t
         JOIN power_expression e ON e.expression_id = t.expression_id
         WHERE e.power_id = 4 AND e.delivery = 'INSTANT'",
    );
    assert_eq!(rules, vec!["Requires contact. Cooldown 2."]);
}

#[test]
fn test_stale_templates_are_dropped_by_run() {
    let (_dir, path) = catalog_db();
    {
        let store = ContentStore::open(&path).unwrap();
        store
            .connection()
            .execute(
                "INSERT INTO expression_template (template_id, tags_any, form, delivery, rarity_weight)
                 VALUES ('tmpl_legacy_removed', '[]', 'ZONE', 'TOGGLED', 99)",
                [],
            )
            .unwrap();
    }
    run(&path, ForgeConfig::default());

    assert_eq!(count(&path, "SELECT COUNT(*) FROM expression_template"), 17);
    assert_eq!(
        count(
            &path,
            "SELECT COUNT(*) FROM power_expression WHERE power_id = 4 AND form <> 'TOUCH'"
        ),
        0
    );
}

#[test]
fn test_acquisition_profiles_follow_rules() {
    let (_dir, path) = catalog_db();
    run(&path, ForgeConfig::default());

    let store = ContentStore::open(&path).unwrap();
    // Gadgeteer triggers the device rule.
    let gadget = dump(
        &store,
        "SELECT origin_class || '/' || counterplay_tags || '/' || default_signatures
         FROM power_acquisition_profile WHERE power_id = 5",
    );
    assert_eq!(
        gadget,
        vec![r#"FORGED/["emp"]/[{"type":"EM_SPIKE","strength":35},{"type":"GRAVITIC_DISTURBANCE","strength":25}]"#]
    );

    // Mindreader matches no rule and falls back by kind.
    let mind = dump(
        &store,
        "SELECT acquisition_event_kind FROM power_acquisition_profile
         WHERE power_id = 3 ORDER BY rarity_weight DESC",
    );
    assert_eq!(mind, vec!["STRESS_AWAKENING", "RITUAL"]);
}

#[test]
fn test_caps_from_config() {
    let (_dir, path) = catalog_db();
    let config = ForgeConfig {
        max_expressions_per_power: 1,
        max_profiles_per_power: 1,
        ..ForgeConfig::default()
    };
    let report = run(&path, config);

    assert_eq!(report.expressions, 6);
    assert_eq!(report.acquisition_profiles, 6);
}

#[test]
fn test_zero_cap_is_rejected_before_writing() {
    let (_dir, path) = catalog_db();
    let config = ForgeConfig {
        max_expressions_per_power: 0,
        ..ForgeConfig::default()
    };
    let err = Forge::open(&path, config).unwrap().run().unwrap_err();

    assert!(matches!(err, ForgeError::InvalidConfig(_)));
    assert_eq!(count(&path, "SELECT COUNT(*) FROM expression_template"), 0);
}

#[test]
fn test_missing_tables_abort_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bare.db");
    let store = ContentStore::from_connection(Connection::open(&path).unwrap()).unwrap();
    store.ensure_catalog_schema().unwrap();
    drop(store);

    match Forge::open(&path, ForgeConfig::default()).unwrap().run() {
        Err(ForgeError::MissingTables(names)) => assert_eq!(names.len(), 6),
        other => panic!("expected MissingTables, got {:?}", other),
    }
}

#[test]
fn test_missing_database_file() {
    let dir = TempDir::new().unwrap();
    let err = Forge::open(dir.path().join("absent.db"), ForgeConfig::default()).unwrap_err();
    assert!(matches!(err, ForgeError::DatabaseNotFound(_)));
}

#[test]
fn test_signature_refresh_restores_rows() {
    let (_dir, path) = catalog_db();
    let report = run(&path, ForgeConfig::default());
    let before = derived_snapshot(&path);

    {
        let store = ContentStore::open(&path).unwrap();
        store
            .connection()
            .execute("DELETE FROM power_expression_signature", [])
            .unwrap();
    }

    let mut forge = Forge::open(&path, ForgeConfig::default()).unwrap();
    assert_eq!(forge.refresh_signatures().unwrap(), report.signatures);
    assert_eq!(derived_snapshot(&path)[3], before[3]);
}

#[test]
fn test_persona_binding_integrity() {
    let (_dir, path) = catalog_db();
    run(&path, ForgeConfig::default());

    let mut store = ContentStore::open(&path).unwrap();
    store.ensure_persona_schema().unwrap();
    let bound = store
        .bind_persona(&PersonaBinding::new("hero").with_mastery(10))
        .unwrap();
    assert_eq!(bound, 6);

    let err = store
        .bind_expression(
            "villain",
            &PowerId::new("1"),
            "0727867fa6a6d12d07a5cf64f8376b07972fed5b",
            1,
            &Default::default(),
        )
        .unwrap_err();
    assert!(matches!(err, ForgeError::IntegrityViolation { .. }));
    assert!(store.persona_powers("villain").unwrap().is_empty());
    drop(store);

    // Regenerated expressions take their bindings with them.
    run(&path, ForgeConfig::default());
    assert_eq!(count(&path, "SELECT COUNT(*) FROM persona_power"), 0);
}
