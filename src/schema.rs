use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct RegulationSection {
    #[schemars(description = "Stable identifier of the regulatory section (e.g., 'PRA_OF_010')")]
    pub id: String,

    #[schemars(description = "Heading of the section as published by the regulator")]
    pub title: String,

    #[schemars(description = "Full text of the section. Used for lexical retrieval.")]
    pub text: String,

    #[serde(default)]
    #[schemars(description = "Optional keywords that also count towards retrieval matches. Defaults to empty.")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct FieldDefinition {
    #[schemars(description = "Template field code (e.g., 'CA1.010'). Keys into the mapping table.")]
    pub field_code: String,

    #[schemars(description = "Row number as printed on the template (e.g., '010')")]
    pub line: String,

    #[schemars(description = "Human readable row label")]
    pub label: String,

    #[serde(default)]
    #[schemars(description = "If true, an absent value is flagged as missing_required_value. Defaults to false.")]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct TemplateSchema {
    #[schemars(description = "Template identifier (e.g., 'CA1')")]
    pub template_id: String,

    #[schemars(description = "Template title (e.g., 'Own Funds')")]
    pub template_name: String,

    #[schemars(description = "ISO currency code applied as the units of every field")]
    pub currency: String,

    #[schemars(description = "Ordered list of template rows. Output preserves this order.")]
    pub fields: Vec<FieldDefinition>,
}

/// Flat key/value description of a reporting scenario.
///
/// Keys are kept sorted so the serialized form is canonical.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(transparent)]
pub struct Scenario(BTreeMap<String, Value>);

impl Scenario {
    pub const ENTITY_ID_KEY: &'static str = "entity_id";
    pub const REPORTING_DATE_KEY: &'static str = "reporting_date";

    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text form of a value: strings verbatim, anything else as its JSON text.
    pub fn text_value(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn to_canonical_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

impl FromIterator<(String, Value)> for Scenario {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TemplateSchema {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(TemplateSchema)
    }
}
