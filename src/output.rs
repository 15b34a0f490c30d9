use crate::schema::RegulationSection;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFlag {
    #[schemars(description = "The scenario supplied a value for this field that is not a number. It was not coerced.")]
    NonNumericValue,

    #[schemars(description = "The template marks the field as required but no value could be derived.")]
    MissingRequiredValue,

    #[schemars(description = "A total field could not be computed because a component is absent or non-numeric.")]
    TotalUnavailable,

    #[schemars(description = "A total field differs from the exact sum of its component fields.")]
    TotalMismatch,
}

impl ValidationFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonNumericValue => "non_numeric_value",
            Self::MissingRequiredValue => "missing_required_value",
            Self::TotalUnavailable => "total_unavailable",
            Self::TotalMismatch => "total_mismatch",
        }
    }
}

impl fmt::Display for ValidationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldOutput {
    pub field_code: String,
    pub line: String,
    pub label: String,
    /// Absent when no value could be derived; never defaulted to zero.
    pub value: Option<Number>,
    pub units: String,
    pub rule_refs: Vec<String>,
    pub validation_flags: Vec<ValidationFlag>,
}

impl FieldOutput {
    /// Returns a copy of this field with `flag` appended.
    pub fn with_flag(mut self, flag: ValidationFlag) -> Self {
        self.validation_flags.push(flag);
        self
    }

    pub fn has_flag(&self, flag: ValidationFlag) -> bool {
        self.validation_flags.contains(&flag)
    }
}

/// Field code to the rule references that justify it.
/// Serialized in schema field order.
pub type RuleAuditLog = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructuredOutput {
    pub template_id: String,
    pub template_name: String,
    pub entity_id: String,
    pub reporting_date: String,
    pub currency: String,
    pub fields: Vec<FieldOutput>,
    pub audit_log: RuleAuditLog,
}

impl StructuredOutput {
    pub fn field(&self, field_code: &str) -> Option<&FieldOutput> {
        self.fields.iter().find(|f| f.field_code == field_code)
    }

    pub fn count_flags(&self, flag: ValidationFlag) -> usize {
        self.fields
            .iter()
            .flat_map(|f| f.validation_flags.iter())
            .filter(|&&f| f == flag)
            .count()
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(StructuredOutput)
    }
}

/// Retrieved regulatory text keyed by section id, in retrieval order.
///
/// Separate from [`StructuredOutput::audit_log`], which records static rule references per
/// field rather than retrieved text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionAudit(IndexMap<String, String>);

impl SectionAudit {
    pub fn from_sections(sections: &[&RegulationSection]) -> Self {
        let mut entries = IndexMap::new();
        for section in sections {
            entries.insert(
                section.id.clone(),
                format!("{}: {}", section.title, section.text),
            );
        }
        Self(entries)
    }

    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
