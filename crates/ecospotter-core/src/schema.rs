//! Input/output contracts for the AI capabilities.
//!
//! A [`Shape`] is a static list of field descriptors. [`Shape::validate`] is the
//! only piece of logic here: it checks a JSON value against the descriptors and
//! reports every violation it finds.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{FieldViolation, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// `data:<mimetype>;base64,<payload>` with a payload that decodes.
    DataUri,
}

impl FieldKind {
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::DataUri => "a base64 data URI",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::String, Value::String(_)) => true,
            (FieldKind::DataUri, Value::String(s)) => parse_data_uri(s).is_some(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSpec {
    const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Shape {
    /// Check `value` against the descriptors.
    ///
    /// Unknown keys are ignored. An optional field set to `null` counts as not
    /// provided; a required one does not.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(object) = value.as_object() else {
            return Err(ValidationError::new(
                self.name,
                vec![FieldViolation::NotAnObject],
            ));
        };

        let violations: Vec<FieldViolation> = self
            .fields
            .iter()
            .filter_map(|field| check_field(field, object))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.name, violations))
        }
    }

    /// Human-readable field list, used to tell a model what JSON to return.
    pub fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|field| {
                format!(
                    "- \"{}\" ({}, {}): {}",
                    field.name,
                    field.kind.expected(),
                    if field.required { "wymagane" } else { "opcjonalne" },
                    field.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn check_field(field: &FieldSpec, object: &Map<String, Value>) -> Option<FieldViolation> {
    match object.get(field.name) {
        None | Some(Value::Null) if field.required => {
            Some(FieldViolation::Missing { field: field.name })
        }
        None | Some(Value::Null) => None,
        Some(value) if field.kind.accepts(value) => None,
        Some(_) => Some(FieldViolation::WrongKind {
            field: field.name,
            expected: field.kind.expected(),
        }),
    }
}

/// Split a base64 data URI into its MIME type and payload.
pub fn parse_data_uri(uri: &str) -> Option<(&str, &str)> {
    static DATA_URI: OnceLock<Regex> = OnceLock::new();
    let re = DATA_URI.get_or_init(|| {
        Regex::new(r"^data:([a-zA-Z0-9.+-]+/[a-zA-Z0-9.+-]+);base64,([A-Za-z0-9+/=\r\n]+)$")
            .expect("data URI pattern is valid")
    });
    let caps = re.captures(uri)?;
    let mime = caps.get(1)?.as_str();
    let payload = caps.get(2)?.as_str();
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64.decode(compact.as_bytes()).ok()?;
    Some((mime, payload))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySchema {
    pub input: Shape,
    pub output: Shape,
}

pub const ECOLOGICAL_ADVICE: CapabilitySchema = CapabilitySchema {
    input: Shape {
        name: "EcologicalAdviceInput",
        fields: &[
            FieldSpec::required(
                "query",
                FieldKind::String,
                "The user's question or request for ecological advice.",
            ),
            FieldSpec::optional(
                "currentPath",
                FieldKind::String,
                "The current page the user is on in the application.",
            ),
        ],
    },
    output: Shape {
        name: "EcologicalAdviceOutput",
        fields: &[FieldSpec::required(
            "advice",
            FieldKind::String,
            "Ecological advice and tips.",
        )],
    },
};

pub const SUBMISSION_ASSISTANT: CapabilitySchema = CapabilitySchema {
    input: Shape {
        name: "SubmissionAssistantInput",
        fields: &[
            FieldSpec::optional(
                "photoDataUri",
                FieldKind::DataUri,
                "A photo of the tree as a data URI: 'data:<mimetype>;base64,<encoded_data>'.",
            ),
            FieldSpec::optional(
                "description",
                FieldKind::String,
                "The description of the tree.",
            ),
        ],
    },
    output: Shape {
        name: "SubmissionAssistantOutput",
        fields: &[
            FieldSpec::required("species", FieldKind::String, "The species of the tree."),
            FieldSpec::required(
                "characteristics",
                FieldKind::String,
                "Notable characteristics of the tree.",
            ),
        ],
    },
};

pub const NEARBY_TREE_FINDER: CapabilitySchema = CapabilitySchema {
    input: Shape {
        name: "FindTreesNearMeInput",
        fields: &[
            FieldSpec::required(
                "userLocation",
                FieldKind::String,
                "The user's current location, as a string.",
            ),
            FieldSpec::optional(
                "treeSpeciesPreference",
                FieldKind::String,
                "The user preference for type of trees, if any.",
            ),
        ],
    },
    output: Shape {
        name: "FindTreesNearMeOutput",
        fields: &[
            FieldSpec::required(
                "treeLocations",
                FieldKind::String,
                "A list of locations of trees near the user.",
            ),
            FieldSpec::optional(
                "additionalNotes",
                FieldKind::String,
                "Any additional notes or information.",
            ),
        ],
    },
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_required_and_ignores_unknown_fields() {
        let value = json!({ "query": "co tu widzę?", "extra": 1 });
        assert!(ECOLOGICAL_ADVICE.input.validate(&value).is_ok());
    }

    #[test]
    fn reports_missing_and_mistyped_fields_together() {
        let value = json!({ "treeSpeciesPreference": 5 });
        let err = NEARBY_TREE_FINDER.input.validate(&value).unwrap_err();
        assert_eq!(
            err.violations,
            vec![
                FieldViolation::Missing { field: "userLocation" },
                FieldViolation::WrongKind {
                    field: "treeSpeciesPreference",
                    expected: "a string"
                },
            ]
        );
    }

    #[test]
    fn null_optional_counts_as_absent() {
        let value = json!({ "treeLocations": "Park X", "additionalNotes": null });
        assert!(NEARBY_TREE_FINDER.output.validate(&value).is_ok());
    }

    #[test]
    fn null_required_is_missing() {
        let value = json!({ "advice": null });
        let err = ECOLOGICAL_ADVICE.output.validate(&value).unwrap_err();
        assert_eq!(err.violations, vec![FieldViolation::Missing { field: "advice" }]);
    }

    #[test]
    fn rejects_non_objects() {
        let err = SUBMISSION_ASSISTANT.output.validate(&json!("Dąb")).unwrap_err();
        assert_eq!(err.violations, vec![FieldViolation::NotAnObject]);
    }

    #[test]
    fn photo_must_be_a_decodable_data_uri() {
        let good = json!({ "photoDataUri": "data:image/png;base64,aGVsbG8=" });
        assert!(SUBMISSION_ASSISTANT.input.validate(&good).is_ok());

        for bad in ["https://example.com/tree.jpg", "data:image/png;base64,@@@", ""] {
            let value = json!({ "photoDataUri": bad });
            assert!(
                SUBMISSION_ASSISTANT.input.validate(&value).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_data_uri_splits_mime_and_payload() {
        assert_eq!(
            parse_data_uri("data:image/jpeg;base64,aGVsbG8="),
            Some(("image/jpeg", "aGVsbG8="))
        );
    }

    #[test]
    fn describe_marks_optionality() {
        let text = NEARBY_TREE_FINDER.output.describe();
        assert!(text.contains("\"treeLocations\" (a string, wymagane)"));
        assert!(text.contains("\"additionalNotes\" (a string, opcjonalne)"));
    }
}
