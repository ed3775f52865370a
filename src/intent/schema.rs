//! Declarative shape of the parameters one action expects.

use rust_decimal::Decimal;
use serde::Serialize;

/// Primitive type of a schema field.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    NullableNumber,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::NullableNumber => "number or null",
        }
    }

    pub fn allows_null(self) -> bool {
        matches!(self, Self::NullableNumber)
    }
}

/// One named field.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
    /// Substituted when the field is absent. An explicit `null` is kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            default: None,
            min: None,
            max: None,
        }
    }
}

/// Schema for one action's intent.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IntentSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl IntentSchema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Required, non-empty string.
    pub fn string(mut self, name: &'static str, description: &'static str) -> Self {
        self.fields
            .push(FieldSpec::new(name, FieldKind::String, description));
        self
    }

    /// Required number, bounded below by zero.
    pub fn number(mut self, name: &'static str, description: &'static str) -> Self {
        let mut field = FieldSpec::new(name, FieldKind::Number, description);
        field.min = Some(Decimal::ZERO);
        self.fields.push(field);
        self
    }

    /// Number or `null`, bounded below by zero, with a default used when
    /// the field is absent.
    pub fn nullable_number(
        mut self,
        name: &'static str,
        description: &'static str,
        default: Option<Decimal>,
    ) -> Self {
        let mut field = FieldSpec::new(name, FieldKind::NullableNumber, description);
        field.min = Some(Decimal::ZERO);
        field.default = default.map(decimal_to_json);
        self.fields.push(field);
        self
    }

    /// Cap the most recently added field.
    pub fn at_most(mut self, max: Decimal) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.max = Some(max);
        }
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Plain-text field list embedded into prompts.
    pub fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("- {} ({}): {}", f.name, f.kind.as_str(), f.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// JSON Schema descriptor handed to the completion service.
    pub fn to_json_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let ty = match field.kind {
                FieldKind::String => serde_json::json!("string"),
                FieldKind::Number => serde_json::json!("number"),
                FieldKind::NullableNumber => serde_json::json!(["number", "null"]),
            };
            let mut prop = serde_json::json!({
                "type": ty,
                "description": field.description,
            });
            if let Some(default) = &field.default {
                prop["default"] = default.clone();
            }
            properties.insert(field.name.to_string(), prop);
            if field.default.is_none() {
                required.push(field.name);
            }
        }
        serde_json::json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn decimal_to_json(value: Decimal) -> serde_json::Value {
    value
        .normalize()
        .to_string()
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
