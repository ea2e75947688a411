//! SQL generation for PostgreSQL.
//!
//! Table and relation statements are produced as two separate batches. Every
//! foreign key is deferred to the relation batch so it only runs after every
//! table exists, without ordering tables by dependency.

use indexmap::IndexSet;
use relforge_schema::{
    DefaultValue, Enum, Model, Property, Relation, SchemaIndex, TypeModifier, TypeToken,
    resolve_column_type, validate_default,
};
use tracing::debug;

use crate::error::{MigrateResult, MigrationError};
use crate::relation::infer_relation;

/// Wrap a batch of statements in a single transaction.
pub fn wrap_transaction<S: AsRef<str>>(statements: &[S]) -> String {
    let mut sql = String::from("BEGIN;\n");
    for stmt in statements {
        sql.push_str(stmt.as_ref());
        sql.push('\n');
    }
    sql.push_str("COMMIT;");
    sql
}

/// Quote a string as an SQL literal.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Generated table DDL, split into the two execution batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDdl {
    /// `CREATE TABLE` statements.
    pub tables: Vec<String>,
    /// `ALTER TABLE ... ADD CONSTRAINT` statements.
    pub relations: Vec<String>,
}

/// A property's default after type-directed parsing.
#[derive(Debug, Clone, PartialEq)]
enum ColumnDefault {
    Scalar(DefaultValue),
    EnumValue(String),
}

/// Everything a column decorator needs to know about one property.
#[derive(Debug)]
struct Column<'a> {
    property: &'a Property,
    token: TypeToken<'a>,
    is_enum: bool,
    default: Option<ColumnDefault>,
}

type ColumnDecorator = fn(&Column<'_>, &mut Vec<String>) -> MigrateResult<()>;

/// Column clause builders, applied in this order.
const COLUMN_DECORATORS: [ColumnDecorator; 4] = [
    type_clause,
    primary_key_clause,
    unique_clause,
    default_clause,
];

fn type_clause(column: &Column<'_>, parts: &mut Vec<String>) -> MigrateResult<()> {
    let required = column.token.modifier == TypeModifier::Required;
    let clause = match &column.default {
        Some(ColumnDefault::Scalar(DefaultValue::AutoIncrement)) => "SERIAL".to_string(),
        Some(ColumnDefault::Scalar(DefaultValue::Uuid)) if required => "uuid NOT NULL".to_string(),
        Some(ColumnDefault::Scalar(DefaultValue::Uuid)) => "uuid".to_string(),
        _ if column.is_enum => {
            let name = format!("\"{}\"", column.token.name);
            if column.token.is_list() {
                format!("{name}[]")
            } else if required {
                format!("{name} NOT NULL")
            } else {
                name
            }
        }
        _ => resolve_column_type(&column.property.property_type)
            .ok_or_else(|| {
                MigrationError::sql_generation(format!(
                    "type {} of property {} has no column type",
                    column.property.property_type, column.property.name
                ))
            })?
            .to_string(),
    };
    parts.push(clause);
    Ok(())
}

fn primary_key_clause(column: &Column<'_>, parts: &mut Vec<String>) -> MigrateResult<()> {
    if column.property.id {
        parts.push("PRIMARY KEY".to_string());
    }
    Ok(())
}

fn unique_clause(column: &Column<'_>, parts: &mut Vec<String>) -> MigrateResult<()> {
    if column.property.unique {
        parts.push("UNIQUE".to_string());
    }
    Ok(())
}

fn default_clause(column: &Column<'_>, parts: &mut Vec<String>) -> MigrateResult<()> {
    let expr = match &column.default {
        None | Some(ColumnDefault::Scalar(DefaultValue::AutoIncrement)) => return Ok(()),
        Some(ColumnDefault::Scalar(DefaultValue::Uuid)) => "gen_random_uuid()".to_string(),
        Some(ColumnDefault::Scalar(DefaultValue::Now)) => "now()".to_string(),
        Some(ColumnDefault::Scalar(DefaultValue::Int(v))) => v.to_string(),
        Some(ColumnDefault::Scalar(DefaultValue::Float(v))) => v.to_string(),
        Some(ColumnDefault::Scalar(DefaultValue::Boolean(v))) => v.to_string(),
        Some(ColumnDefault::Scalar(DefaultValue::String(v))) => quote_literal(v),
        Some(ColumnDefault::EnumValue(v)) => quote_literal(v),
    };
    parts.push(format!("DEFAULT({expr})"));
    Ok(())
}

/// Fail unless `model.field` is emitted as a column by `create_table`.
fn require_column(
    models: &[Model],
    index: &SchemaIndex,
    model: &str,
    field: &str,
) -> MigrateResult<()> {
    let is_column = models
        .iter()
        .find(|m| m.name == model)
        .and_then(|m| m.get_property(field))
        .is_some_and(|p| index.is_column(p));
    if is_column {
        Ok(())
    } else {
        Err(MigrationError::sql_generation(format!(
            "foreign key field {model}.{field} is not a column"
        )))
    }
}

/// SQL generator for PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresSqlGenerator;

impl PostgresSqlGenerator {
    /// Generate `CREATE TYPE` statements for every enum.
    pub fn generate_enum_ddl(&self, enums: &[Enum]) -> Vec<String> {
        enums.iter().map(|e| self.create_enum(e)).collect()
    }

    /// Generate table and relation statements for every model.
    pub fn generate_table_ddl(
        &self,
        models: &[Model],
        index: &SchemaIndex,
    ) -> MigrateResult<TableDdl> {
        let mut ddl = TableDdl::default();

        for model in models {
            ddl.tables.push(self.create_table(model, index)?);

            let mut constraint_names = IndexSet::new();
            for (i, property) in model.properties.iter().enumerate() {
                if !property.is_relation() {
                    continue;
                }
                let relation = infer_relation(model, models, i)?;
                for (owner, field) in [
                    (&relation.relation_model, &relation.relation_field),
                    (&relation.reference_model, &relation.reference_field),
                ] {
                    require_column(models, index, owner, field)?;
                }
                let mut name = format!("fk_{}", relation.reference_model);
                if constraint_names.contains(&name) {
                    name = format!("{}_{}", name, relation.relation_field);
                }
                ddl.relations.push(self.add_foreign_key(&name, &relation));
                constraint_names.insert(name);
            }
        }

        debug!(
            tables = ddl.tables.len(),
            relations = ddl.relations.len(),
            "generated table ddl"
        );
        Ok(ddl)
    }

    /// Generate CREATE TYPE for an enum.
    pub fn create_enum(&self, e: &Enum) -> String {
        let values: Vec<String> = e.values.iter().map(|v| quote_literal(v)).collect();
        format!("CREATE TYPE \"{}\" AS ENUM ({});", e.name, values.join(","))
    }

    /// Generate DROP TYPE for an enum in a database schema.
    pub fn drop_enum(&self, schema: &str, name: &str) -> String {
        format!("DROP TYPE \"{}\".\"{}\";", schema, name)
    }

    /// Generate DROP TABLE for a table in a database schema.
    pub fn drop_table(&self, schema: &str, name: &str) -> String {
        format!("DROP TABLE \"{}\".\"{}\" CASCADE;", schema, name)
    }

    /// Generate CREATE TABLE for a model.
    ///
    /// Relation properties and properties typed as another model are not
    /// columns and are left out of the body.
    pub fn create_table(&self, model: &Model, index: &SchemaIndex) -> MigrateResult<String> {
        let mut columns = Vec::new();

        for property in &model.properties {
            if !index.is_column(property) {
                continue;
            }
            columns.push(self.column_definition(property, index)?);
        }

        Ok(format!(
            "CREATE TABLE \"{}\" (\n    {}\n);",
            model.name,
            columns.join(",\n    ")
        ))
    }

    /// Generate a column definition.
    fn column_definition(&self, property: &Property, index: &SchemaIndex) -> MigrateResult<String> {
        let token = TypeToken::parse(&property.property_type);
        let is_enum = index.is_enum(token.name);
        let default = match property.default_value() {
            None => None,
            Some(value) if is_enum => Some(ColumnDefault::EnumValue(value.to_string())),
            Some(_) => validate_default(property)?.map(ColumnDefault::Scalar),
        };

        let column = Column {
            property,
            token,
            is_enum,
            default,
        };

        let mut parts = vec![format!("\"{}\"", property.name)];
        for decorate in COLUMN_DECORATORS {
            decorate(&column, &mut parts)?;
        }
        Ok(parts.join(" "))
    }

    /// Generate a foreign key constraint for a relation.
    pub fn add_foreign_key(&self, name: &str, relation: &Relation) -> String {
        let mut sql = format!(
            "ALTER TABLE \"{}\" ADD CONSTRAINT \"{}\" FOREIGN KEY (\"{}\") REFERENCES \"{}\" (\"{}\")",
            relation.relation_model,
            name,
            relation.relation_field,
            relation.reference_model,
            relation.reference_field
        );
        if relation.cardinality.is_deferrable() {
            sql.push_str(" DEFERRABLE INITIALLY IMMEDIATE");
        }
        sql.push(';');
        sql
    }
}
