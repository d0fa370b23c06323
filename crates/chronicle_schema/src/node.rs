//! Validator AST - a closed set of node types evaluated recursively.
//!
//! A tagged-variant tree rather than reflection: object/array/string/
//! number/boolean/any, each with its own constraints. Validation walks the
//! payload and accumulates field errors with their paths instead of
//! failing at the first problem.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending value, e.g. `$.actor.type`
    pub path: String,
    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn default_true() -> bool {
    true
}

/// A schema node - one validation rule in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    /// JSON object with per-property schemas
    Object {
        /// Property name to schema, order-preserving
        #[serde(default)]
        properties: IndexMap<String, SchemaNode>,
        /// Properties that must be present
        #[serde(default)]
        required: Vec<String>,
        /// Whether properties outside `properties` are allowed
        #[serde(default = "default_true")]
        additional_properties: bool,
    },
    /// JSON array with an optional item schema
    Array {
        /// Schema every item must satisfy
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Box<SchemaNode>>,
        /// Minimum item count
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        /// Maximum item count
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    /// JSON string with length and enumeration constraints
    String {
        /// Minimum length in chars
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        /// Maximum length in chars
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        /// Closed set of allowed values
        #[serde(default, skip_serializing_if = "Option::is_none", rename = "enum")]
        allowed: Option<Vec<String>>,
    },
    /// JSON number with range constraints
    Number {
        /// Inclusive lower bound
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Inclusive upper bound
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
        /// Restrict to integral values
        #[serde(default)]
        integer: bool,
    },
    /// JSON boolean
    Boolean,
    /// Anything goes (used for opaque sub-objects, never for a whole payload)
    Any,
}

impl SchemaNode {
    /// A bare object node accepting any properties
    #[must_use]
    pub fn object() -> Self {
        Self::Object {
            properties: IndexMap::new(),
            required: Vec::new(),
            additional_properties: true,
        }
    }

    /// Validate a payload against this node
    ///
    /// Returns every field error found, empty when the payload conforms.
    #[must_use]
    pub fn validate(&self, value: &Value) -> Vec<FieldError> {
        let mut errors = Vec::new();
        self.check("$", value, &mut errors);
        errors
    }

    fn check(&self, path: &str, value: &Value, errors: &mut Vec<FieldError>) {
        match self {
            Self::Any => {}
            Self::Boolean => {
                if !value.is_boolean() {
                    errors.push(FieldError::new(path, "expected boolean"));
                }
            }
            Self::String {
                min_length,
                max_length,
                allowed,
            } => match value.as_str() {
                None => errors.push(FieldError::new(path, "expected string")),
                Some(s) => {
                    let len = s.chars().count();
                    if let Some(min) = min_length {
                        if len < *min {
                            errors.push(FieldError::new(
                                path,
                                format!("length {} below minimum {}", len, min),
                            ));
                        }
                    }
                    if let Some(max) = max_length {
                        if len > *max {
                            errors.push(FieldError::new(
                                path,
                                format!("length {} above maximum {}", len, max),
                            ));
                        }
                    }
                    if let Some(values) = allowed {
                        if !values.iter().any(|v| v == s) {
                            errors.push(FieldError::new(
                                path,
                                format!("'{}' is not one of the allowed values", s),
                            ));
                        }
                    }
                }
            },
            Self::Number {
                minimum,
                maximum,
                integer,
            } => match value.as_f64() {
                None => errors.push(FieldError::new(path, "expected number")),
                Some(n) => {
                    if *integer && value.as_i64().is_none() && value.as_u64().is_none() {
                        errors.push(FieldError::new(path, "expected integer"));
                    }
                    if let Some(min) = minimum {
                        if n < *min {
                            errors.push(FieldError::new(
                                path,
                                format!("{} below minimum {}", n, min),
                            ));
                        }
                    }
                    if let Some(max) = maximum {
                        if n > *max {
                            errors.push(FieldError::new(
                                path,
                                format!("{} above maximum {}", n, max),
                            ));
                        }
                    }
                }
            },
            Self::Array {
                items,
                min_items,
                max_items,
            } => match value.as_array() {
                None => errors.push(FieldError::new(path, "expected array")),
                Some(arr) => {
                    if let Some(min) = min_items {
                        if arr.len() < *min {
                            errors.push(FieldError::new(
                                path,
                                format!("{} items, minimum is {}", arr.len(), min),
                            ));
                        }
                    }
                    if let Some(max) = max_items {
                        if arr.len() > *max {
                            errors.push(FieldError::new(
                                path,
                                format!("{} items, maximum is {}", arr.len(), max),
                            ));
                        }
                    }
                    if let Some(item_schema) = items {
                        for (i, item) in arr.iter().enumerate() {
                            let item_path = format!("{}[{}]", path, i);
                            item_schema.check(&item_path, item, errors);
                        }
                    }
                }
            },
            Self::Object {
                properties,
                required,
                additional_properties,
            } => match value.as_object() {
                None => errors.push(FieldError::new(path, "expected object")),
                Some(map) => {
                    for name in required {
                        if !map.contains_key(name) {
                            errors.push(FieldError::new(
                                path,
                                format!("missing required property '{}'", name),
                            ));
                        }
                    }
                    for (name, prop_value) in map {
                        let prop_path = format!("{}.{}", path, name);
                        match properties.get(name) {
                            Some(prop_schema) => {
                                prop_schema.check(&prop_path, prop_value, errors);
                            }
                            None => {
                                if !additional_properties {
                                    errors.push(FieldError::new(
                                        &prop_path,
                                        "property not allowed",
                                    ));
                                }
                            }
                        }
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn payment_schema() -> SchemaNode {
        SchemaNode::Object {
            properties: IndexMap::from([
                (
                    "amount".to_string(),
                    SchemaNode::Number {
                        minimum: Some(0.0),
                        maximum: None,
                        integer: false,
                    },
                ),
                (
                    "currency".to_string(),
                    SchemaNode::String {
                        min_length: Some(3),
                        max_length: Some(3),
                        allowed: None,
                    },
                ),
            ]),
            required: vec!["amount".to_string()],
            additional_properties: true,
        }
    }

    #[test]
    fn test_valid_payload() {
        let errors = payment_schema().validate(&json!({"amount": 100, "currency": "USD"}));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let errors = payment_schema().validate(&json!({"amount": -5}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.amount");
        assert!(errors[0].message.contains("below minimum"));
    }

    #[test]
    fn test_missing_required() {
        let errors = payment_schema().validate(&json!({"currency": "USD"}));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("amount"));
    }

    #[test]
    fn test_errors_accumulate() {
        let errors = payment_schema().validate(&json!({"amount": -1, "currency": "x"}));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_additional_properties_closed() {
        let schema = SchemaNode::Object {
            properties: IndexMap::from([("a".to_string(), SchemaNode::Boolean)]),
            required: vec![],
            additional_properties: false,
        };
        let errors = schema.validate(&json!({"a": true, "extra": 1}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.extra");
    }

    #[test]
    fn test_string_enum() {
        let schema = SchemaNode::String {
            min_length: None,
            max_length: None,
            allowed: Some(vec!["created".to_string(), "deleted".to_string()]),
        };
        assert!(schema.validate(&json!("created")).is_empty());
        let errors = schema.validate(&json!("exploded"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_integer_constraint() {
        let schema = SchemaNode::Number {
            minimum: None,
            maximum: None,
            integer: true,
        };
        assert!(schema.validate(&json!(7)).is_empty());
        assert_eq!(schema.validate(&json!(7.5)).len(), 1);
    }

    #[test]
    fn test_array_items_and_bounds() {
        let schema = SchemaNode::Array {
            items: Some(Box::new(SchemaNode::Number {
                minimum: Some(0.0),
                maximum: None,
                integer: false,
            })),
            min_items: Some(1),
            max_items: Some(3),
        };
        assert!(schema.validate(&json!([1, 2])).is_empty());
        assert_eq!(schema.validate(&json!([])).len(), 1);
        let errors = schema.validate(&json!([1, -2, 3]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$[1]");
    }

    #[test]
    fn test_nested_paths() {
        let schema = SchemaNode::Object {
            properties: IndexMap::from([(
                "actor".to_string(),
                SchemaNode::Object {
                    properties: IndexMap::from([(
                        "type".to_string(),
                        SchemaNode::String {
                            min_length: None,
                            max_length: None,
                            allowed: Some(vec!["user".to_string()]),
                        },
                    )]),
                    required: vec!["type".to_string()],
                    additional_properties: true,
                },
            )]),
            required: vec![],
            additional_properties: true,
        };
        let errors = schema.validate(&json!({"actor": {"type": "robot"}}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.actor.type");
    }

    // Validation is total: any payload yields a (possibly empty) error
    // list with rooted paths, and a schema that round-trips through its
    // wire form judges every payload identically.
    proptest::proptest! {
        #[test]
        fn prop_validate_never_panics_and_paths_rooted(
            keys in proptest::collection::vec("[a-z]{1,6}", 0..6),
            nums in proptest::collection::vec(any::<i64>(), 0..6),
            flag in any::<bool>(),
        ) {
            let mut map = serde_json::Map::new();
            for (k, v) in keys.iter().zip(nums.iter()) {
                map.insert(k.clone(), json!(v));
            }
            map.insert("flag".to_string(), json!(flag));
            let errors = payment_schema().validate(&serde_json::Value::Object(map));
            for e in &errors {
                prop_assert!(e.path.starts_with('$'));
                prop_assert!(!e.message.is_empty());
            }
        }

        #[test]
        fn prop_wire_roundtrip_validates_identically(amount in any::<i64>()) {
            let schema = payment_schema();
            let wire = serde_json::to_string(&schema).unwrap();
            let back: SchemaNode = serde_json::from_str(&wire).unwrap();
            let payload = json!({"amount": amount});
            prop_assert_eq!(schema.validate(&payload), back.validate(&payload));
        }
    }

    #[test]
    fn test_node_serde_roundtrip() {
        let schema = payment_schema();
        let json = serde_json::to_string(&schema).unwrap();
        let back: SchemaNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_enum_keyword_in_wire_form() {
        let schema = SchemaNode::String {
            min_length: None,
            max_length: None,
            allowed: Some(vec!["a".to_string()]),
        };
        let json = serde_json::to_value(&schema).unwrap();
        assert!(json.get("enum").is_some());
    }
}
