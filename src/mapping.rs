use crate::amount::{as_amount, sum};
use crate::error::{CorepError, Result};
use crate::output::{FieldOutput, RuleAuditLog, ValidationFlag};
use crate::schema::{Scenario, TemplateSchema};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ValueSource {
    #[schemars(description = "Value is read verbatim from the scenario under `scenario_key`.")]
    Scenario {
        #[schemars(description = "Scenario key holding the value (e.g., 'cet1_gbp_thousands')")]
        scenario_key: String,
    },

    #[schemars(
        description = "Value is the sum of the scenario values of the listed component fields. Absent if any component is absent or non-numeric."
    )]
    Total {
        #[schemars(description = "Field codes of scenario-sourced fields in this table")]
        components: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct FieldMapping {
    #[schemars(description = "Template field code this descriptor applies to")]
    pub field_code: String,

    #[serde(flatten)]
    pub source: ValueSource,

    #[serde(default)]
    #[schemars(description = "Regulatory rule identifiers justifying the field")]
    pub rule_refs: Vec<String>,
}

/// Static lookup from field code to how its value is derived and which rules justify it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MappingTable {
    #[schemars(description = "Template the table was written for (e.g., 'CA1')")]
    pub template_id: String,

    #[schemars(description = "One descriptor per mapped field code")]
    pub fields: Vec<FieldMapping>,
}

impl MappingTable {
    /// COREP CA1 (own funds) mapping.
    pub fn corep_ca1() -> Self {
        let scenario = |code: &str, key: &str, rule: &str| FieldMapping {
            field_code: code.to_string(),
            source: ValueSource::Scenario {
                scenario_key: key.to_string(),
            },
            rule_refs: vec![rule.to_string(), "EBA_CA1_001".to_string()],
        };

        Self {
            template_id: "CA1".to_string(),
            fields: vec![
                scenario("CA1.010", "cet1_gbp_thousands", "PRA_OF_010"),
                scenario("CA1.020", "at1_gbp_thousands", "PRA_OF_020"),
                scenario("CA1.030", "t2_gbp_thousands", "PRA_OF_030"),
                FieldMapping {
                    field_code: "CA1.060".to_string(),
                    source: ValueSource::Total {
                        components: vec![
                            "CA1.010".to_string(),
                            "CA1.020".to_string(),
                            "CA1.030".to_string(),
                        ],
                    },
                    rule_refs: vec!["PRA_OF_001".to_string(), "EBA_CA1_001".to_string()],
                },
            ],
        }
    }

    /// Rejects duplicate field codes and total rules whose components are not
    /// scenario-sourced entries of this table.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for mapping in &self.fields {
            if !seen.insert(mapping.field_code.as_str()) {
                return Err(CorepError::InvalidMapping(format!(
                    "field code '{}' is mapped more than once",
                    mapping.field_code
                )));
            }
        }

        for (field_code, components) in self.total_rules() {
            if components.is_empty() {
                return Err(CorepError::InvalidMapping(format!(
                    "total field '{}' has no components",
                    field_code
                )));
            }
            for component in components {
                match self.get(component).map(|m| &m.source) {
                    Some(ValueSource::Scenario { .. }) => {}
                    Some(ValueSource::Total { .. }) => {
                        return Err(CorepError::InvalidMapping(format!(
                            "total field '{}' lists total field '{}' as a component",
                            field_code, component
                        )))
                    }
                    None => {
                        return Err(CorepError::InvalidMapping(format!(
                            "total field '{}' lists unmapped component '{}'",
                            field_code, component
                        )))
                    }
                }
            }
        }

        Ok(())
    }

    pub fn get(&self, field_code: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|m| m.field_code == field_code)
    }

    pub fn scenario_key(&self, field_code: &str) -> Option<&str> {
        match self.get(field_code).map(|m| &m.source) {
            Some(ValueSource::Scenario { scenario_key }) => Some(scenario_key.as_str()),
            _ => None,
        }
    }

    pub fn total_rules(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().filter_map(|m| match &m.source {
            ValueSource::Total { components } => Some((m.field_code.as_str(), components.as_slice())),
            ValueSource::Scenario { .. } => None,
        })
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(MappingTable)
    }
}

impl Default for MappingTable {
    fn default() -> Self {
        Self::corep_ca1()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedFields {
    pub fields: Vec<FieldOutput>,
    pub audit_log: RuleAuditLog,
}

/// Derives template field values from a scenario using a [`MappingTable`].
pub struct FieldMapper<'a> {
    table: &'a MappingTable,
}

impl<'a> FieldMapper<'a> {
    pub fn new(table: &'a MappingTable) -> Self {
        Self { table }
    }

    /// Sum of the component scenario values, or `None` if any is absent or non-numeric.
    pub fn compute_total(&self, components: &[String], scenario: &Scenario) -> Option<Number> {
        let parts: Option<Vec<&Number>> = components
            .iter()
            .map(|code| {
                self.table
                    .scenario_key(code)
                    .and_then(|key| scenario.get(key))
                    .and_then(as_amount)
            })
            .collect();
        parts.and_then(|parts| sum(&parts))
    }

    pub fn map_fields(&self, schema: &TemplateSchema, scenario: &Scenario) -> MappedFields {
        let totals: BTreeMap<&str, Option<Number>> = self
            .table
            .total_rules()
            .map(|(code, components)| (code, self.compute_total(components, scenario)))
            .collect();

        let mut fields = Vec::with_capacity(schema.fields.len());
        let mut audit_log = RuleAuditLog::new();

        for definition in &schema.fields {
            let mapping = self.table.get(&definition.field_code);
            let rule_refs = mapping.map(|m| m.rule_refs.clone()).unwrap_or_default();
            let mut flags = Vec::new();

            let value = match mapping.map(|m| &m.source) {
                Some(ValueSource::Total { .. }) => {
                    totals.get(definition.field_code.as_str()).cloned().flatten()
                }
                Some(ValueSource::Scenario { scenario_key }) => match scenario.get(scenario_key) {
                    None | Some(Value::Null) => None,
                    Some(raw) => match as_amount(raw) {
                        Some(n) => Some(n.clone()),
                        None => {
                            warn!(
                                "Scenario value for '{}' is not numeric ({}); leaving {} empty",
                                scenario_key, raw, definition.field_code
                            );
                            flags.push(ValidationFlag::NonNumericValue);
                            None
                        }
                    },
                },
                None => None,
            };

            if definition.required && value.is_none() {
                flags.push(ValidationFlag::MissingRequiredValue);
            }
            if matches!(mapping.map(|m| &m.source), Some(ValueSource::Total { .. }))
                && value.is_none()
            {
                flags.push(ValidationFlag::TotalUnavailable);
            }

            debug!(
                "Mapped {} -> {:?} (flags: {:?})",
                definition.field_code, value, flags
            );

            audit_log.insert(definition.field_code.clone(), rule_refs.clone());
            fields.push(FieldOutput {
                field_code: definition.field_code.clone(),
                line: definition.line.clone(),
                label: definition.label.clone(),
                value,
                units: schema.currency.clone(),
                rule_refs,
                validation_flags: flags,
            });
        }

        MappedFields { fields, audit_log }
    }
}

pub fn map_fields(schema: &TemplateSchema, scenario: &Scenario) -> MappedFields {
    FieldMapper::new(&MappingTable::corep_ca1()).map_fields(schema, scenario)
}
