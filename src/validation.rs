use crate::amount::{amounts_equal, sum};
use crate::mapping::MappingTable;
use crate::output::{FieldOutput, ValidationFlag};
use log::{debug, info};
use serde_json::Number;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct TotalCheck {
    pub field_code: String,
    pub expected: Number,
    pub reported: Number,
}

impl TotalCheck {
    pub fn is_consistent(&self) -> bool {
        amounts_equal(&self.expected, &self.reported)
    }
}

/// Cross-checks total fields against the sum of their component fields.
pub struct TotalsValidator<'a> {
    table: &'a MappingTable,
}

impl<'a> TotalsValidator<'a> {
    pub fn new(table: &'a MappingTable) -> Self {
        Self { table }
    }

    /// One check per total rule whose total and component fields all carry a value.
    pub fn checks(&self, fields: &[FieldOutput]) -> Vec<TotalCheck> {
        let values: HashMap<&str, Option<&Number>> = fields
            .iter()
            .map(|f| (f.field_code.as_str(), f.value.as_ref()))
            .collect();
        let value_of = |code: &str| values.get(code).copied().flatten();

        self.table
            .total_rules()
            .filter_map(|(total_code, components)| {
                let reported = value_of(total_code)?;
                let parts: Option<Vec<&Number>> =
                    components.iter().map(|c| value_of(c.as_str())).collect();
                let expected = sum(&parts?)?;
                Some(TotalCheck {
                    field_code: total_code.to_string(),
                    expected,
                    reported: reported.clone(),
                })
            })
            .collect()
    }

    /// Returns `fields` with `total_mismatch` appended to every inconsistent total field.
    ///
    /// Flags already present are kept; other fields are returned unchanged.
    pub fn validate(&self, fields: Vec<FieldOutput>) -> Vec<FieldOutput> {
        let mismatched: Vec<String> = self
            .checks(&fields)
            .into_iter()
            .filter_map(|check| {
                debug!(
                    "Total {}: expected {}, reported {}",
                    check.field_code, check.expected, check.reported
                );
                (!check.is_consistent()).then_some(check.field_code)
            })
            .collect();

        if !mismatched.is_empty() {
            info!("Total mismatch on {}", mismatched.join(", "));
        }

        fields
            .into_iter()
            .map(|field| {
                if mismatched.contains(&field.field_code) {
                    field.with_flag(ValidationFlag::TotalMismatch)
                } else {
                    field
                }
            })
            .collect()
    }
}

pub fn validate_totals(fields: Vec<FieldOutput>) -> Vec<FieldOutput> {
    TotalsValidator::new(&MappingTable::corep_ca1()).validate(fields)
}
