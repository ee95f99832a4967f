//! Response-shape contract for the analysis service.
//!
//! A single field table drives both the `responseSchema` sent with each
//! request and [`validate`], which checks a parsed response against the same
//! table before it is trusted as a [`DocumentAnalysis`](crate::DocumentAnalysis).

use std::fmt;

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::analysis::LEVELS;

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Flag,
    TextList,
    /// A [`RiskLevel`](crate::RiskLevel) string.
    Level,
    /// Array of objects described by the nested table.
    Records(&'static [Field]),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    pub description: Option<&'static str>,
}

impl Field {
    const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            nullable: false,
            description: Some(description),
        }
    }

    const fn bare(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            nullable: false,
            description: None,
        }
    }
}

// ── Field tables ──

pub const RISK_FIELDS: &[Field] = &[
    Field::required(
        "clause",
        FieldKind::Text,
        "The specific text or section title of the clause.",
    ),
    Field::required(
        "issue",
        FieldKind::Text,
        "Why this is a risk or requires attention.",
    ),
    Field::bare("severity", FieldKind::Level),
    Field::required(
        "recommendation",
        FieldKind::Text,
        "Actionable advice for mitigation.",
    ),
];

pub const CHECKLIST_FIELDS: &[Field] = &[
    Field::required("id", FieldKind::Text, "A unique short ID (e.g. TASK-01)"),
    Field::required("action", FieldKind::Text, "Short action title."),
    Field::required("description", FieldKind::Text, "Detailed instruction."),
    Field::bare("priority", FieldKind::Level),
    Field::required(
        "role",
        FieldKind::Text,
        "Who should perform this action (e.g., Attorney, Client).",
    ),
    Field::required("isCompleted", FieldKind::Flag, "Always false initially."),
];

pub const ANALYSIS_FIELDS: &[Field] = &[
    Field::required(
        "documentType",
        FieldKind::Text,
        "The type of legal document (e.g., NDA, Lease, Service Agreement)",
    ),
    Field::required(
        "summary",
        FieldKind::Text,
        "A concise executive summary of the document (max 3 sentences)",
    ),
    Field::required(
        "extractedText",
        FieldKind::Text,
        "The full OCR text extracted from the document image.",
    ),
    Field::required(
        "partiesInvolved",
        FieldKind::TextList,
        "List of names of people or entities involved.",
    ),
    Field {
        name: "executionDate",
        kind: FieldKind::Text,
        required: false,
        nullable: true,
        description: Some("Date of the agreement or null if not found."),
    },
    Field::required(
        "risks",
        FieldKind::Records(RISK_FIELDS),
        "A list of identified risks or notable clauses.",
    ),
    Field::required(
        "checklist",
        FieldKind::Records(CHECKLIST_FIELDS),
        "An actionable checklist for the legal team based on this document.",
    ),
];

// ── Contract generation ──

/// The contract in the service's `responseSchema` dialect.
pub fn response_schema() -> Value {
    object_schema(ANALYSIS_FIELDS)
}

fn object_schema(fields: &[Field]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        properties.insert(field.name.to_string(), field_schema(field));
    }
    let required: Vec<&str> = fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name)
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

fn field_schema(field: &Field) -> Value {
    let mut schema = match field.kind {
        FieldKind::Text => json!({ "type": "STRING" }),
        FieldKind::Flag => json!({ "type": "BOOLEAN" }),
        FieldKind::TextList => json!({ "type": "ARRAY", "items": { "type": "STRING" } }),
        FieldKind::Level => json!({ "type": "STRING", "enum": LEVELS }),
        FieldKind::Records(inner) => json!({ "type": "ARRAY", "items": object_schema(inner) }),
    };
    if let Some(description) = field.description {
        schema["description"] = description.into();
    }
    if field.nullable {
        schema["nullable"] = true.into();
    }
    schema
}

// ── Validation ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Missing,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
}

/// One contract breach, located by JSON path (e.g. `risks[2].severity`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub problem: Problem,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            Problem::Missing => write!(f, "{}: missing", self.path),
            Problem::WrongType { expected, found } => {
                write!(f, "{}: expected {expected}, found {found}", self.path)
            }
        }
    }
}

#[derive(Debug, Error)]
#[error("response does not match the analysis contract: {}", join_violations(.0))]
pub struct SchemaError(pub Vec<Violation>);

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check a parsed response against [`ANALYSIS_FIELDS`], reporting every breach.
///
/// Unknown extra fields are ignored. Level fields only need to be strings;
/// values off the scale are accepted and displayed as given.
pub fn validate(value: &Value) -> Result<(), SchemaError> {
    let mut violations = Vec::new();
    validate_object(ANALYSIS_FIELDS, value, "", &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaError(violations))
    }
}

fn validate_object(fields: &[Field], value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(object) = value.as_object() else {
        out.push(wrong_type(path_or_root(path), "object", value));
        return;
    };
    for field in fields {
        let field_path = join_path(path, field.name);
        match object.get(field.name) {
            None if field.required => out.push(Violation {
                path: field_path,
                problem: Problem::Missing,
            }),
            None => {}
            Some(Value::Null) if field.nullable || !field.required => {}
            Some(v) => check_kind(field.kind, v, field_path, out),
        }
    }
}

fn check_kind(kind: FieldKind, value: &Value, path: String, out: &mut Vec<Violation>) {
    match kind {
        FieldKind::Text | FieldKind::Level => {
            if !value.is_string() {
                out.push(wrong_type(path, "string", value));
            }
        }
        FieldKind::Flag => {
            if !value.is_boolean() {
                out.push(wrong_type(path, "boolean", value));
            }
        }
        FieldKind::TextList => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        out.push(wrong_type(format!("{path}[{i}]"), "string", item));
                    }
                }
            }
            None => out.push(wrong_type(path, "array", value)),
        },
        FieldKind::Records(inner) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    validate_object(inner, item, &format!("{path}[{i}]"), out);
                }
            }
            None => out.push(wrong_type(path, "array", value)),
        },
    }
}

fn wrong_type(path: String, expected: &'static str, found: &Value) -> Violation {
    Violation {
        path,
        problem: Problem::WrongType {
            expected,
            found: type_name(found),
        },
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn path_or_root(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Value {
        json!({
            "documentType": "Lease",
            "summary": "Residential lease.",
            "extractedText": "THIS LEASE...",
            "partiesInvolved": ["Landlord LLC", "Tenant"],
            "risks": [{
                "clause": "Tenant shall indemnify",
                "issue": "Broad indemnity",
                "severity": "HIGH",
                "recommendation": "Narrow scope"
            }],
            "checklist": [{
                "id": "TASK-01",
                "action": "Negotiate indemnity",
                "description": "Limit to negligence.",
                "priority": "HIGH",
                "role": "Attorney",
                "isCompleted": false
            }]
        })
    }

    #[test]
    fn contract_lists_required_top_level_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec![
                "documentType",
                "summary",
                "extractedText",
                "partiesInvolved",
                "risks",
                "checklist"
            ]
        );
        assert_eq!(schema["properties"]["executionDate"]["nullable"], true);
    }

    #[test]
    fn contract_nested_items() {
        let schema = response_schema();
        let risk = &schema["properties"]["risks"]["items"];
        assert_eq!(risk["type"], "OBJECT");
        assert_eq!(
            risk["properties"]["severity"]["enum"],
            json!(["LOW", "MEDIUM", "HIGH", "CRITICAL"])
        );
        assert_eq!(risk["required"].as_array().unwrap().len(), 4);
        let item = &schema["properties"]["checklist"]["items"];
        assert_eq!(item["properties"]["isCompleted"]["type"], "BOOLEAN");
        assert_eq!(item["required"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn accepts_valid_response() {
        assert!(validate(&valid()).is_ok());
    }

    #[test]
    fn accepts_null_or_absent_execution_date() {
        let mut v = valid();
        v["executionDate"] = Value::Null;
        assert!(validate(&v).is_ok());
        v["executionDate"] = "2024-01-15".into();
        assert!(validate(&v).is_ok());
    }

    #[test]
    fn accepts_unrecognized_severity() {
        let mut v = valid();
        v["risks"][0]["severity"] = "SEVERE".into();
        assert!(validate(&v).is_ok());
    }

    #[test]
    fn reports_missing_top_level_field() {
        let mut v = valid();
        v.as_object_mut().unwrap().remove("summary");
        let err = validate(&v).unwrap_err();
        assert_eq!(
            err.0,
            vec![Violation {
                path: "summary".into(),
                problem: Problem::Missing
            }]
        );
    }

    #[test]
    fn reports_nested_violations_by_path() {
        let mut v = valid();
        v["risks"][0].as_object_mut().unwrap().remove("clause");
        v["checklist"][0]["isCompleted"] = "no".into();
        v["partiesInvolved"][1] = json!(7);
        let err = validate(&v).unwrap_err();
        let paths: Vec<&str> = err.0.iter().map(|x| x.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["partiesInvolved[1]", "risks[0].clause", "checklist[0].isCompleted"]
        );
        assert!(
            err.to_string()
                .contains("checklist[0].isCompleted: expected boolean, found string")
        );
    }

    #[test]
    fn rejects_non_object_root() {
        let err = validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err.0[0].path, "$");
    }

    #[test]
    fn rejects_null_required_field() {
        let mut v = valid();
        v["risks"] = Value::Null;
        let err = validate(&v).unwrap_err();
        assert_eq!(
            err.0[0].problem,
            Problem::WrongType {
                expected: "array",
                found: "null"
            }
        );
    }
}
