//! Declarative description of the stored record types.
//!
//! The registry is plain `'static` data: table layouts, the secondary indexes
//! and the full-text search index over court names. Engines use it to reject
//! malformed writes, the RPC layer uses it to validate incoming arguments, and
//! the list router consults it to decide which filters a search may carry.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

pub const COURTS_TABLE: &str = "courts";
pub const USERS_TABLE: &str = "users";

pub const BY_STATUS_INDEX: &str = "by_status";
pub const BY_LOCATION_INDEX: &str = "by_location";
pub const BY_COURT_TYPE_INDEX: &str = "by_court_type";
pub const SEARCH_COURTS_INDEX: &str = "search_courts";

pub const COURT_TYPE_LITERALS: &[&str] = &["indoor", "outdoor", "mixed", "unknown"];
pub const COST_LITERALS: &[&str] = &["free", "paid", "unknown"];
pub const STATUS_LITERALS: &[&str] = &["approved", "pending", "rejected"];

/// Keys every stored record carries that are assigned by the store itself.
pub const SYSTEM_FIELDS: &[&str] = &["id"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Boolean,
    /// Non-negative integer that fits in 32 bits
    Count,
    /// Epoch milliseconds
    Timestamp,
    Literal(&'static [&'static str]),
    /// Reference to a record in another table
    Id(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub optional: bool,
    /// Set by the operations, never supplied by callers
    pub managed: bool,
    /// Accepted by partial updates
    pub mutable: bool,
}

impl FieldDef {
    const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            optional: false,
            managed: false,
            mutable: true,
        }
    }

    const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            optional: true,
            ..Self::required(name, ty)
        }
    }

    const fn managed(name: &'static str, ty: FieldType) -> Self {
        Self {
            managed: true,
            mutable: false,
            ..Self::required(name, ty)
        }
    }

    const fn immutable(self) -> Self {
        Self {
            mutable: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchIndexDef {
    pub name: &'static str,
    pub search_field: &'static str,
    pub filter_fields: &'static [&'static str],
}

impl SearchIndexDef {
    /// Whether an equality filter on `field` can be attached to a search.
    pub fn is_filterable(&self, field: &str) -> bool {
        self.filter_fields.contains(&field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
    pub indexes: &'static [IndexDef],
    pub search_indexes: &'static [SearchIndexDef],
}

impl TableDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&IndexDef> {
        self.indexes.iter().find(|i| i.name == name)
    }

    pub fn search_index(&self, name: &str) -> Option<&SearchIndexDef> {
        self.search_indexes.iter().find(|i| i.name == name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub tables: &'static [TableDef],
}

pub const COURTS: TableDef = TableDef {
    name: COURTS_TABLE,
    fields: &[
        FieldDef::required("name", FieldType::String),
        FieldDef::required("addressStreet", FieldType::String),
        FieldDef::required("addressCity", FieldType::String),
        FieldDef::required("addressState", FieldType::String),
        FieldDef::required("addressZip", FieldType::String),
        FieldDef::required("numCourts", FieldType::Count),
        FieldDef::required("courtType", FieldType::Literal(COURT_TYPE_LITERALS)),
        FieldDef::required("cost", FieldType::Literal(COST_LITERALS)),
        FieldDef::optional("costNotes", FieldType::String),
        FieldDef::optional("adminNotes", FieldType::String),
        FieldDef::required("status", FieldType::Literal(STATUS_LITERALS)),
        FieldDef::optional("submittedBy", FieldType::Id(USERS_TABLE)).immutable(),
        FieldDef::managed("lastVerifiedAt", FieldType::Timestamp),
        FieldDef::managed("createdAt", FieldType::Timestamp),
        FieldDef::managed("updatedAt", FieldType::Timestamp),
    ],
    indexes: &[
        IndexDef {
            name: BY_STATUS_INDEX,
            fields: &["status"],
        },
        IndexDef {
            name: BY_LOCATION_INDEX,
            fields: &["addressState", "addressCity"],
        },
        IndexDef {
            name: BY_COURT_TYPE_INDEX,
            fields: &["courtType"],
        },
    ],
    search_indexes: &[SearchIndexDef {
        name: SEARCH_COURTS_INDEX,
        search_field: "name",
        filter_fields: &["status", "courtType", "cost"],
    }],
};

pub const USERS: TableDef = TableDef {
    name: USERS_TABLE,
    fields: &[
        FieldDef::required("email", FieldType::String),
        FieldDef::optional("isAdmin", FieldType::Boolean),
    ],
    indexes: &[],
    search_indexes: &[],
};

pub static SCHEMA: Schema = Schema {
    tables: &[COURTS, USERS],
};

static SCHEMA_CHECKED: OnceLock<Result<(), SchemaError>> = OnceLock::new();

/// Runs [`Schema::check`] on [`SCHEMA`] the first time it is called; later
/// calls return the same outcome.
pub fn ensure_checked() -> Result<(), SchemaError> {
    SCHEMA_CHECKED.get_or_init(|| SCHEMA.check()).clone()
}

/// The search index `list` uses for free-text queries.
pub fn courts_search_index() -> &'static SearchIndexDef {
    &COURTS.search_indexes[0]
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown table `{0}`")]
    UnknownTable(String),

    #[error("`{table}` value must be an object")]
    NotAnObject { table: String },

    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("unexpected field `{field}`")]
    UnexpectedField { field: String },

    #[error("field `{field}` must be {expected}")]
    WrongType { field: String, expected: String },

    #[error("field `{field}` must be one of {allowed}, got {value}")]
    InvalidLiteral {
        field: String,
        allowed: String,
        value: String,
    },

    #[error("invalid schema declaration: {0}")]
    Declaration(String),
}

/// Which argument set of a table is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgsKind {
    /// Every caller-supplied field; optional fields may be omitted
    Create,
    /// Every mutable field, all optional
    Patch,
}

impl Schema {
    pub fn table(&self, name: &str) -> Result<&TableDef, SchemaError> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))
    }

    /// Checks the declarations themselves.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut table_names = HashSet::new();
        for table in self.tables {
            if !table_names.insert(table.name) {
                return Err(SchemaError::Declaration(format!(
                    "table `{}` declared twice",
                    table.name
                )));
            }
        }

        for table in self.tables {
            let mut field_names = HashSet::new();
            for field in table.fields {
                if SYSTEM_FIELDS.contains(&field.name) || !field_names.insert(field.name) {
                    return Err(SchemaError::Declaration(format!(
                        "field `{}.{}` declared twice or shadows a system field",
                        table.name, field.name
                    )));
                }
                if let FieldType::Id(target) = field.ty {
                    if !table_names.contains(target) {
                        return Err(SchemaError::Declaration(format!(
                            "field `{}.{}` references unknown table `{}`",
                            table.name, field.name, target
                        )));
                    }
                }
                if let FieldType::Literal(values) = field.ty {
                    if values.is_empty() {
                        return Err(SchemaError::Declaration(format!(
                            "field `{}.{}` has an empty literal set",
                            table.name, field.name
                        )));
                    }
                }
            }

            for index in table.indexes {
                if index.fields.is_empty() {
                    return Err(SchemaError::Declaration(format!(
                        "index `{}.{}` has no fields",
                        table.name, index.name
                    )));
                }
                for field in index.fields {
                    if !field_names.contains(field) {
                        return Err(SchemaError::Declaration(format!(
                            "index `{}.{}` uses unknown field `{}`",
                            table.name, index.name, field
                        )));
                    }
                }
            }

            for search in table.search_indexes {
                match table.field(search.search_field) {
                    Some(field) if field.ty == FieldType::String => {}
                    _ => {
                        return Err(SchemaError::Declaration(format!(
                            "search index `{}.{}` must target a string field",
                            table.name, search.name
                        )))
                    }
                }
                for field in search.filter_fields {
                    if !field_names.contains(field) {
                        return Err(SchemaError::Declaration(format!(
                            "search index `{}.{}` filters on unknown field `{}`",
                            table.name, search.name, field
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Validates a full stored record, system fields included.
    pub fn validate_document(&self, table: &str, value: &Value) -> Result<(), SchemaError> {
        let def = self.table(table)?;
        let object = as_object(def, value)?;

        for key in object.keys() {
            if def.field(key).is_none() && !SYSTEM_FIELDS.contains(&key.as_str()) {
                return Err(SchemaError::UnexpectedField { field: key.clone() });
            }
        }

        for field in def.fields {
            check_field(field, object.get(field.name), field.optional)?;
        }

        Ok(())
    }

    /// Validates caller-supplied operation arguments against a table.
    pub fn validate_args(
        &self,
        table: &str,
        kind: ArgsKind,
        value: &Value,
    ) -> Result<(), SchemaError> {
        let def = self.table(table)?;
        let object = as_object(def, value)?;

        let accepts = |field: &FieldDef| match kind {
            ArgsKind::Create => !field.managed,
            ArgsKind::Patch => !field.managed && field.mutable,
        };

        for key in object.keys() {
            match def.field(key) {
                Some(field) if accepts(field) => {}
                _ => return Err(SchemaError::UnexpectedField { field: key.clone() }),
            }
        }

        for field in def.fields.iter().filter(|f| accepts(f)) {
            let optional = kind == ArgsKind::Patch || field.optional;
            check_field(field, object.get(field.name), optional)?;
        }

        Ok(())
    }
}

fn as_object<'a>(def: &TableDef, value: &'a Value) -> Result<&'a Map<String, Value>, SchemaError> {
    value.as_object().ok_or_else(|| SchemaError::NotAnObject {
        table: def.name.to_string(),
    })
}

fn check_field(field: &FieldDef, value: Option<&Value>, optional: bool) -> Result<(), SchemaError> {
    let value = match value {
        None | Some(Value::Null) if optional => return Ok(()),
        None | Some(Value::Null) => {
            return Err(SchemaError::MissingField {
                field: field.name.to_string(),
            })
        }
        Some(value) => value,
    };

    let wrong_type = |expected: &str| SchemaError::WrongType {
        field: field.name.to_string(),
        expected: expected.to_string(),
    };

    match field.ty {
        FieldType::String => {
            value.as_str().ok_or_else(|| wrong_type("a string"))?;
        }
        FieldType::Boolean => {
            value.as_bool().ok_or_else(|| wrong_type("a boolean"))?;
        }
        FieldType::Count => {
            value
                .as_u64()
                .filter(|n| *n <= u64::from(u32::MAX))
                .ok_or_else(|| wrong_type("a non-negative integer"))?;
        }
        FieldType::Timestamp => {
            value
                .as_i64()
                .ok_or_else(|| wrong_type("an integer timestamp in milliseconds"))?;
        }
        FieldType::Literal(allowed) => {
            let literal = value.as_str().ok_or_else(|| wrong_type("a string literal"))?;
            if !allowed.contains(&literal) {
                return Err(SchemaError::InvalidLiteral {
                    field: field.name.to_string(),
                    allowed: allowed.join(", "),
                    value: literal.to_string(),
                });
            }
        }
        FieldType::Id(table) => {
            let raw = value
                .as_str()
                .ok_or_else(|| wrong_type(&format!("an id of table `{}`", table)))?;
            uuid::Uuid::parse_str(raw)
                .map_err(|_| wrong_type(&format!("an id of table `{}`", table)))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cost, CourtStatus, CourtType};
    use serde_json::json;

    fn court_args() -> Value {
        json!({
            "name": "Central Park Courts",
            "addressStreet": "1 Park Ave",
            "addressCity": "New York",
            "addressState": "NY",
            "addressZip": "10001",
            "numCourts": 4,
            "courtType": "outdoor",
            "cost": "free",
            "status": "approved"
        })
    }

    #[test]
    fn declared_schema_is_consistent() {
        SCHEMA.check().unwrap();
    }

    #[test]
    fn schema_is_checked_once_and_the_outcome_reused() {
        assert_eq!(ensure_checked(), Ok(()));
        assert_eq!(SCHEMA_CHECKED.get(), Some(&Ok(())));
        assert_eq!(ensure_checked(), Ok(()));
    }

    #[test]
    fn literal_sets_match_model_enums() {
        let court_types: Vec<_> = CourtType::ALL.iter().map(|t| t.as_str()).collect();
        let costs: Vec<_> = Cost::ALL.iter().map(|c| c.as_str()).collect();
        let statuses: Vec<_> = CourtStatus::ALL.iter().map(|s| s.as_str()).collect();

        assert_eq!(court_types, COURT_TYPE_LITERALS);
        assert_eq!(costs, COST_LITERALS);
        assert_eq!(statuses, STATUS_LITERALS);
    }

    #[test]
    fn courts_declare_expected_indexes() {
        assert_eq!(COURTS.index(BY_STATUS_INDEX).unwrap().fields, &["status"]);
        assert_eq!(
            COURTS.index(BY_LOCATION_INDEX).unwrap().fields,
            &["addressState", "addressCity"]
        );
        assert_eq!(COURTS.index(BY_COURT_TYPE_INDEX).unwrap().fields, &["courtType"]);

        let search = courts_search_index();
        assert_eq!(search.name, SEARCH_COURTS_INDEX);
        assert_eq!(search.search_field, "name");
        assert!(search.is_filterable("status"));
        assert!(search.is_filterable("courtType"));
        assert!(search.is_filterable("cost"));
        assert!(!search.is_filterable("addressCity"));
    }

    #[test]
    fn broken_declarations_are_reported() {
        static BROKEN: Schema = Schema {
            tables: &[TableDef {
                name: "broken",
                fields: &[FieldDef::required("name", FieldType::String)],
                indexes: &[IndexDef {
                    name: "by_missing",
                    fields: &["missing"],
                }],
                search_indexes: &[],
            }],
        };

        assert!(matches!(BROKEN.check(), Err(SchemaError::Declaration(_))));
    }

    #[test]
    fn create_args_accept_valid_payload() {
        SCHEMA
            .validate_args(COURTS_TABLE, ArgsKind::Create, &court_args())
            .unwrap();
    }

    #[test]
    fn create_args_reject_out_of_set_literal() {
        let mut args = court_args();
        args["courtType"] = json!("grass");

        let err = SCHEMA
            .validate_args(COURTS_TABLE, ArgsKind::Create, &args)
            .unwrap_err();

        assert_eq!(
            err,
            SchemaError::InvalidLiteral {
                field: "courtType".to_string(),
                allowed: "indoor, outdoor, mixed, unknown".to_string(),
                value: "grass".to_string(),
            }
        );
    }

    #[test]
    fn create_args_reject_missing_and_managed_fields() {
        let mut args = court_args();
        args.as_object_mut().unwrap().remove("status");
        assert_eq!(
            SCHEMA.validate_args(COURTS_TABLE, ArgsKind::Create, &args),
            Err(SchemaError::MissingField {
                field: "status".to_string()
            })
        );

        let mut args = court_args();
        args["createdAt"] = json!(1);
        assert_eq!(
            SCHEMA.validate_args(COURTS_TABLE, ArgsKind::Create, &args),
            Err(SchemaError::UnexpectedField {
                field: "createdAt".to_string()
            })
        );
    }

    #[test]
    fn num_courts_must_be_a_non_negative_integer() {
        for bad in [json!(-1), json!(2.5), json!("4")] {
            let mut args = court_args();
            args["numCourts"] = bad;
            assert!(matches!(
                SCHEMA.validate_args(COURTS_TABLE, ArgsKind::Create, &args),
                Err(SchemaError::WrongType { .. })
            ));
        }
    }

    #[test]
    fn patch_args_are_all_optional_but_exclude_submitter() {
        SCHEMA
            .validate_args(COURTS_TABLE, ArgsKind::Patch, &json!({}))
            .unwrap();
        SCHEMA
            .validate_args(COURTS_TABLE, ArgsKind::Patch, &json!({"status": "rejected"}))
            .unwrap();

        let err = SCHEMA
            .validate_args(
                COURTS_TABLE,
                ArgsKind::Patch,
                &json!({"submittedBy": uuid::Uuid::new_v4().to_string()}),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnexpectedField { .. }));
    }

    #[test]
    fn documents_require_managed_timestamps() {
        let mut doc = court_args();
        doc["id"] = json!(uuid::Uuid::new_v4().to_string());
        assert!(matches!(
            SCHEMA.validate_document(COURTS_TABLE, &doc),
            Err(SchemaError::MissingField { .. })
        ));

        doc["lastVerifiedAt"] = json!(1);
        doc["createdAt"] = json!(1);
        doc["updatedAt"] = json!(1);
        SCHEMA.validate_document(COURTS_TABLE, &doc).unwrap();
    }

    #[test]
    fn unknown_table_is_an_error() {
        assert_eq!(
            SCHEMA.validate_document("players", &json!({})),
            Err(SchemaError::UnknownTable("players".to_string()))
        );
    }
}
