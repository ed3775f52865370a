//! Check an extracted candidate against an [`IntentSchema`].

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::chain::amount::decimal_from_json;
use crate::intent::schema::{FieldKind, FieldSpec, IntentSchema};

/// What is wrong with one field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum FieldProblem {
    Missing,
    WrongType { expected: String, found: String },
    Empty,
    OutOfRange { reason: String },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    #[serde(flatten)]
    pub problem: FieldProblem,
}

/// Every shape violation found in one candidate.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub schema: String,
    /// Set when the candidate was not a JSON object at all.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub not_an_object: bool,
    pub issues: Vec<FieldIssue>,
}

impl ValidationReport {
    fn new(schema: &IntentSchema) -> Self {
        Self {
            schema: schema.name.to_string(),
            ..Self::default()
        }
    }

    fn push(&mut self, field: &str, problem: FieldProblem) {
        self.issues.push(FieldIssue {
            field: field.to_string(),
            problem,
        });
    }

    pub fn is_empty(&self) -> bool {
        !self.not_an_object && self.issues.is_empty()
    }

    /// Names of fields the candidate did not carry.
    pub fn missing(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|i| i.problem == FieldProblem::Missing)
            .map(|i| i.field.as_str())
            .collect()
    }

    pub(crate) fn single(schema: &str, field: &str, problem: FieldProblem) -> Self {
        Self {
            schema: schema.to_string(),
            not_an_object: false,
            issues: vec![FieldIssue {
                field: field.to_string(),
                problem,
            }],
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.not_an_object {
            return write!(f, "{} parameters are not a JSON object", self.schema);
        }
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|issue| match &issue.problem {
                FieldProblem::Missing => format!("{} is missing", issue.field),
                FieldProblem::WrongType { expected, found } => {
                    format!("{} must be {}, got {}", issue.field, expected, found)
                }
                FieldProblem::Empty => format!("{} must not be empty", issue.field),
                FieldProblem::OutOfRange { reason } => format!("{} {}", issue.field, reason),
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// A field value that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Null,
}

/// Candidate whose every schema field is present with the right type.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIntent {
    schema: &'static str,
    fields: BTreeMap<&'static str, FieldValue>,
    /// Candidate after defaults were applied, with unknown keys dropped.
    normalized: serde_json::Value,
}

impl ValidatedIntent {
    pub fn schema(&self) -> &'static str {
        self.schema
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// String field, or a report naming it missing.
    pub fn text(&self, name: &str) -> Result<&str, ValidationReport> {
        match self.fields.get(name) {
            Some(FieldValue::Text(s)) => Ok(s),
            _ => Err(ValidationReport::single(
                self.schema,
                name,
                FieldProblem::Missing,
            )),
        }
    }

    /// Numeric field; `Ok(None)` for an explicit null.
    pub fn number(&self, name: &str) -> Result<Option<Decimal>, ValidationReport> {
        match self.fields.get(name) {
            Some(FieldValue::Number(n)) => Ok(Some(*n)),
            Some(FieldValue::Null) => Ok(None),
            _ => Err(ValidationReport::single(
                self.schema,
                name,
                FieldProblem::Missing,
            )),
        }
    }

    pub fn to_json(&self) -> &serde_json::Value {
        &self.normalized
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn check_field(
    field: &FieldSpec,
    value: &serde_json::Value,
) -> Result<FieldValue, FieldProblem> {
    let wrong_type = || FieldProblem::WrongType {
        expected: field.kind.as_str().to_string(),
        found: json_type_name(value).to_string(),
    };

    match (field.kind, value) {
        (FieldKind::String, serde_json::Value::String(s)) => {
            if s.trim().is_empty() {
                Err(FieldProblem::Empty)
            } else {
                Ok(FieldValue::Text(s.trim().to_string()))
            }
        }
        (FieldKind::Number | FieldKind::NullableNumber, serde_json::Value::Number(n)) => {
            let number = decimal_from_json(n).map_err(|e| FieldProblem::OutOfRange {
                reason: e.to_string(),
            })?;
            if let Some(min) = field.min
                && number < min
            {
                return Err(FieldProblem::OutOfRange {
                    reason: format!("must be at least {min}"),
                });
            }
            if let Some(max) = field.max
                && number > max
            {
                return Err(FieldProblem::OutOfRange {
                    reason: format!("must be at most {max}"),
                });
            }
            Ok(FieldValue::Number(number))
        }
        (kind, serde_json::Value::Null) if kind.allows_null() => Ok(FieldValue::Null),
        _ => Err(wrong_type()),
    }
}

/// Validate `candidate` against `schema`.
///
/// Absent fields with a default get the default; an explicit `null` is
/// accepted only by nullable fields and is never replaced. Keys the schema
/// does not name are dropped. All problems are collected before returning.
pub fn validate(
    schema: &IntentSchema,
    candidate: &serde_json::Value,
) -> Result<ValidatedIntent, ValidationReport> {
    let mut report = ValidationReport::new(schema);
    let Some(object) = candidate.as_object() else {
        report.not_an_object = true;
        return Err(report);
    };

    let mut fields = BTreeMap::new();
    let mut normalized = serde_json::Map::new();

    for field in &schema.fields {
        let value = match (object.get(field.name), &field.default) {
            (Some(value), _) => value,
            (None, Some(default)) => default,
            (None, None) => {
                report.push(field.name, FieldProblem::Missing);
                continue;
            }
        };

        match check_field(field, value) {
            Ok(checked) => {
                let json = match &checked {
                    FieldValue::Text(s) => serde_json::Value::String(s.clone()),
                    _ => value.clone(),
                };
                normalized.insert(field.name.to_string(), json);
                fields.insert(field.name, checked);
            }
            Err(problem) => report.push(field.name, problem),
        }
    }

    if !report.is_empty() {
        return Err(report);
    }

    Ok(ValidatedIntent {
        schema: schema.name,
        fields,
        normalized: serde_json::Value::Object(normalized),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn schema() -> IntentSchema {
        IntentSchema::new("swap")
            .string("from_token", "token to sell")
            .string("destination_token", "token to buy")
            .number("amount", "amount to sell")
            .nullable_number("min_amount_out", "floor", Some(Decimal::ZERO))
            .nullable_number("slippage", "tolerance", Some(dec!(0.01)))
            .at_most(dec!(1))
    }

    #[test]
    fn applies_defaults_only_to_absent_fields() {
        let intent = validate(
            &schema(),
            &json!({
                "from_token": "SUI",
                "destination_token": "USDC",
                "amount": 10,
                "min_amount_out": null
            }),
        )
        .unwrap();

        assert_eq!(intent.number("min_amount_out").unwrap(), None);
        assert_eq!(intent.number("slippage").unwrap(), Some(dec!(0.01)));
        assert_eq!(intent.number("amount").unwrap(), Some(dec!(10)));
        assert_eq!(intent.to_json()["slippage"], json!(0.01));
        assert!(intent.to_json()["min_amount_out"].is_null());
    }

    #[test]
    fn collects_every_problem() {
        let report = validate(
            &schema(),
            &json!({
                "from_token": "",
                "amount": "ten",
                "slippage": 2
            }),
        )
        .unwrap_err();

        assert_eq!(
            report.issues,
            vec![
                FieldIssue {
                    field: "from_token".into(),
                    problem: FieldProblem::Empty
                },
                FieldIssue {
                    field: "destination_token".into(),
                    problem: FieldProblem::Missing
                },
                FieldIssue {
                    field: "amount".into(),
                    problem: FieldProblem::WrongType {
                        expected: "number".into(),
                        found: "string".into()
                    }
                },
                FieldIssue {
                    field: "slippage".into(),
                    problem: FieldProblem::OutOfRange {
                        reason: "must be at most 1".into()
                    }
                },
            ]
        );
        assert_eq!(report.missing(), vec!["destination_token"]);
        assert!(report.to_string().contains("amount must be number, got string"));
    }

    #[test]
    fn null_is_rejected_for_required_fields() {
        let report = validate(
            &schema(),
            &json!({"from_token": "SUI", "destination_token": "USDC", "amount": null}),
        )
        .unwrap_err();
        assert!(matches!(
            report.issues[0].problem,
            FieldProblem::WrongType { .. }
        ));
    }

    #[test]
    fn negative_amounts_are_out_of_range() {
        let report = validate(
            &schema(),
            &json!({"from_token": "SUI", "destination_token": "USDC", "amount": -1}),
        )
        .unwrap_err();
        assert_eq!(report.issues[0].field, "amount");
        assert!(report.to_string().contains("must be at least 0"));
    }

    #[test]
    fn non_objects_are_reported_as_such() {
        let report = validate(&schema(), &json!(["SUI"])).unwrap_err();
        assert!(report.not_an_object);
        assert_eq!(report.to_string(), "swap parameters are not a JSON object");
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let intent = validate(
            &schema(),
            &json!({
                "from_token": " SUI ",
                "destination_token": "USDC",
                "amount": 1,
                "comment": "please hurry"
            }),
        )
        .unwrap();
        assert!(intent.to_json().get("comment").is_none());
        assert_eq!(intent.text("from_token").unwrap(), "SUI");
    }
}
