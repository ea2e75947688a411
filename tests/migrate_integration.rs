//! Integration tests for DDL generation and the migration engine.
//!
//! The engine runs against an in-memory driver that records every batch it
//! is asked to execute.

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use relforge::migrate::{
    CatalogEnum, MigrateResult, MigrationConfig, MigrationDriver, MigrationEngine,
    MigrationError, MigrationPlan, Phase,
};
use relforge::schema::{Schema, parse_schema};

const SHOP_SCHEMA: &str = r#"
connection:
  provider: postgresql
  url: postgres://localhost/shop
models:
  - name: Customer
    properties:
      - { name: id, type: int, id: true, default: autoincrement() }
      - { name: email, type: string, unique: true }
      - { name: nickname, type: "string?", default: "it's me" }
      - { name: tier, type: Tier, default: FREE }
      - { name: profile, type: Profile }
      - { name: orders, type: "Order[]" }
  - name: Profile
    properties:
      - { name: id, type: int, id: true }
      - { name: customerId, type: int, unique: true }
      - { name: customer, type: Customer, relationField: customerId, referenceField: id }
  - name: Order
    properties:
      - { name: id, type: string, id: true, default: uuid() }
      - { name: total, type: float, default: 0 }
      - { name: placedAt, type: dateTime, default: now() }
      - { name: customerId, type: int }
      - { name: customer, type: Customer, relationField: customerId, referenceField: id }
enums:
  - name: Tier
    values: [FREE, PRO]
"#;

/// Driver that records batches and can reject one containing a marker.
#[derive(Default)]
struct RecordingDriver {
    tables: Vec<String>,
    enums: Vec<CatalogEnum>,
    reject: Option<&'static str>,
    unreachable: bool,
    log: Mutex<Vec<String>>,
    closed: Mutex<bool>,
}

impl RecordingDriver {
    fn with_existing_objects() -> Self {
        Self {
            tables: vec!["Customer".to_string(), "Order".to_string()],
            enums: vec![CatalogEnum::new(16390, "public", "Tier")],
            ..Default::default()
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

#[async_trait::async_trait]
impl MigrationDriver for RecordingDriver {
    async fn ping(&self) -> MigrateResult<()> {
        if self.unreachable {
            return Err(MigrationError::connection("connection refused"));
        }
        Ok(())
    }

    async fn list_tables(&self, _schema: &str) -> MigrateResult<Vec<String>> {
        Ok(self.tables.clone())
    }

    async fn list_enums(&self) -> MigrateResult<Vec<CatalogEnum>> {
        Ok(self.enums.clone())
    }

    async fn execute(&self, sql: &str) -> MigrateResult<()> {
        self.log.lock().push(sql.to_string());
        match self.reject {
            Some(marker) if sql.contains(marker) => {
                Err(MigrationError::transaction(format!("syntax error near {marker}")))
            }
            _ => Ok(()),
        }
    }

    async fn close(&self) -> MigrateResult<()> {
        *self.closed.lock() = true;
        Ok(())
    }
}

fn shop() -> Schema {
    parse_schema(SHOP_SCHEMA).unwrap()
}

#[test]
fn test_shop_plan() {
    let plan = MigrationPlan::from_schema(&shop()).unwrap();

    assert_eq!(
        plan.create_enums,
        vec!["CREATE TYPE \"Tier\" AS ENUM ('FREE','PRO');"]
    );
    assert_eq!(
        plan.create_tables[0],
        "CREATE TABLE \"Customer\" (\n    \"id\" SERIAL PRIMARY KEY,\n    \"email\" text NOT NULL UNIQUE,\n    \"nickname\" text DEFAULT('it''s me'),\n    \"tier\" \"Tier\" NOT NULL DEFAULT('FREE')\n);"
    );
    assert_eq!(
        plan.create_tables[2],
        "CREATE TABLE \"Order\" (\n    \"id\" uuid NOT NULL PRIMARY KEY DEFAULT(gen_random_uuid()),\n    \"total\" double precision NOT NULL DEFAULT(0),\n    \"placedAt\" timestamptz NOT NULL DEFAULT(now()),\n    \"customerId\" int NOT NULL\n);"
    );
    assert_eq!(
        plan.create_relations,
        vec![
            "ALTER TABLE \"Profile\" ADD CONSTRAINT \"fk_Customer\" FOREIGN KEY (\"customerId\") REFERENCES \"Customer\" (\"id\") DEFERRABLE INITIALLY IMMEDIATE;",
            "ALTER TABLE \"Order\" ADD CONSTRAINT \"fk_Customer\" FOREIGN KEY (\"customerId\") REFERENCES \"Customer\" (\"id\");",
        ]
    );
}

#[test]
fn test_plan_is_deterministic() {
    let a = MigrationPlan::from_schema(&shop()).unwrap();
    let b = MigrationPlan::from_schema(&shop()).unwrap();
    assert_eq!(a.to_sql(), b.to_sql());
}

#[tokio::test]
async fn test_full_migration_phase_order() {
    let engine = MigrationEngine::new(
        MigrationConfig::new().atomic(false),
        RecordingDriver::with_existing_objects(),
    );
    let result = engine.run(&shop()).await.unwrap();

    let log = engine.driver().log();
    assert_eq!(
        log[0],
        "BEGIN;\nDROP TABLE \"public\".\"Customer\" CASCADE;\nDROP TABLE \"public\".\"Order\" CASCADE;\nCOMMIT;"
    );
    assert_eq!(log[1], "BEGIN;\nDROP TYPE \"public\".\"Tier\";\nCOMMIT;");
    assert!(log[2].contains("CREATE TYPE"));
    assert!(log[3].contains("CREATE TABLE \"Profile\""));
    assert!(log[4].contains("FOREIGN KEY"));
    assert_eq!(log.len(), 5);

    let phases: Vec<Phase> = result.phases.iter().map(|p| p.phase).collect();
    assert_eq!(phases, Phase::ALL.to_vec());
    assert!(*engine.driver().closed.lock());
}

#[tokio::test]
async fn test_atomic_migration_rolls_back() {
    let driver = RecordingDriver {
        reject: Some("FOREIGN KEY"),
        ..RecordingDriver::with_existing_objects()
    };
    let engine = MigrationEngine::new(MigrationConfig::new(), driver);
    let err = engine.run(&shop()).await.unwrap_err();

    assert_eq!(err.phase(), Some(Phase::CreateRelations));
    assert!(err.to_string().contains("during create relations"));

    let log = engine.driver().log();
    assert_eq!(log.first().map(String::as_str), Some("BEGIN;"));
    assert_eq!(log.last().map(String::as_str), Some("ROLLBACK;"));
    assert!(!log.iter().any(|sql| sql == "COMMIT;"));
}

#[tokio::test]
async fn test_non_atomic_failure_keeps_earlier_phases() {
    let driver = RecordingDriver {
        reject: Some("CREATE TABLE"),
        ..RecordingDriver::with_existing_objects()
    };
    let engine = MigrationEngine::new(MigrationConfig::new().atomic(false), driver);
    let err = engine.run(&shop()).await.unwrap_err();

    assert_eq!(err.phase(), Some(Phase::CreateTables));
    let log = engine.driver().log();
    assert!(log[0].contains("DROP TABLE"));
    assert!(log[1].contains("DROP TYPE"));
    assert!(log[2].contains("CREATE TYPE"));
    assert!(!log.iter().any(|sql| sql.contains("ALTER TABLE")));
}

#[tokio::test]
async fn test_unreachable_database() {
    let driver = RecordingDriver {
        unreachable: true,
        ..Default::default()
    };
    let engine = MigrationEngine::new(MigrationConfig::new(), driver);
    let err = engine.run(&shop()).await.unwrap_err();

    assert!(matches!(err, MigrationError::Connection(_)));
    assert!(err.is_database());
    assert!(engine.driver().log().is_empty());
    assert!(*engine.driver().closed.lock());
}

#[tokio::test]
async fn test_array_owner_fails_generation() {
    let mut schema = shop();
    // Order.customer becomes an array while Customer.orders becomes scalar.
    schema.models[0].properties[5].property_type = "Order".into();
    schema.models[2].properties[4].property_type = "Customer[]".into();

    let engine = MigrationEngine::new(MigrationConfig::new(), RecordingDriver::default());
    let err = engine.run(&schema).await.unwrap_err();
    assert!(matches!(err, MigrationError::SqlGeneration(_)), "{err}");
    assert!(engine.driver().log().is_empty());
}
