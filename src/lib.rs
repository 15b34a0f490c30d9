//! # COREP Assistant
//!
//! Prepares a regulatory capital-reporting extract from a scenario: finds the regulatory
//! passages relevant to an analyst's question, maps scenario values onto a COREP template,
//! cross-checks totals and records which rules justify each field.
//!
//! ## Pipeline
//!
//! - **Retrieval**: regulation sections are ranked by the number of distinct tokens they
//!   share with the question and the scenario ([`retrieval`])
//! - **Mapping**: each template field is filled from the scenario via a static
//!   [`MappingTable`]; total fields are computed from their components ([`mapping`])
//! - **Validation**: totals are compared exactly against the sum of their component fields
//!   ([`validation`])
//! - **Rendering**: structured JSON, a Markdown extract and the retrieved-section audit log
//!   ([`render`], [`writer`])
//!
//! Data-quality problems never fail a run; they are recorded as
//! [`ValidationFlag`]s on the affected field.
//!
//! The bundled binary exposes the pipeline as `corep-assistant generate`; the question,
//! scenario and output flags are not accepted at the top level.
//!
//! ## Example
//!
//! ```rust,ignore
//! use corep_assistant::*;
//! use chrono::NaiveDate;
//! use std::path::Path;
//!
//! let regulations = load_regulations(Path::new("data/regulations.json"))?;
//! let schema = load_template_schema(Path::new("data/template_schema.json"))?;
//! let scenario = load_scenario(Path::new("data/scenario_example.json"))?;
//! let mapping = MappingTable::corep_ca1();
//!
//! let report = ReportingAssistant::new(&regulations, &schema, &mapping).process(&ReportRequest {
//!     question: "How is total own funds calculated?",
//!     scenario: &scenario,
//!     retrieval_limit: DEFAULT_RETRIEVAL_LIMIT,
//!     fallback_reporting_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
//! });
//!
//! let artifacts = render_all(&report.structured, &report.section_audit)?;
//! write_artifacts(Path::new("out"), &artifacts)?;
//! ```

pub mod amount;
pub mod error;
pub mod ingestion;
pub mod mapping;
pub mod output;
pub mod render;
pub mod retrieval;
pub mod schema;
pub mod utils;
pub mod validation;
pub mod writer;

pub use error::{CorepError, Result};
pub use ingestion::*;
pub use mapping::{map_fields, FieldMapper, FieldMapping, MappedFields, MappingTable, ValueSource};
pub use output::*;
pub use render::*;
pub use retrieval::{retrieve_sections, ScoredSection, SectionRetriever, DEFAULT_RETRIEVAL_LIMIT};
pub use schema::*;
pub use utils::*;
pub use validation::{validate_totals, TotalCheck, TotalsValidator};
pub use writer::{write_artifacts, ArtifactPaths};

use chrono::NaiveDate;
use log::{debug, info, warn};

pub const UNKNOWN_ENTITY: &str = "UNKNOWN";

/// Per-run inputs.
#[derive(Debug, Clone)]
pub struct ReportRequest<'a> {
    pub question: &'a str,
    pub scenario: &'a Scenario,
    pub retrieval_limit: usize,
    /// Used when the scenario carries no `reporting_date`.
    pub fallback_reporting_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub structured: StructuredOutput,
    pub section_audit: SectionAudit,
}

pub struct ReportingAssistant<'a> {
    regulations: &'a [RegulationSection],
    schema: &'a TemplateSchema,
    mapping: &'a MappingTable,
}

impl<'a> ReportingAssistant<'a> {
    pub fn new(
        regulations: &'a [RegulationSection],
        schema: &'a TemplateSchema,
        mapping: &'a MappingTable,
    ) -> Self {
        if mapping.template_id != schema.template_id {
            warn!(
                "Mapping table targets template {} but schema is {}",
                mapping.template_id, schema.template_id
            );
        }
        Self {
            regulations,
            schema,
            mapping,
        }
    }

    /// Retrieve, map and validate. Pure given its inputs.
    pub fn process(&self, request: &ReportRequest) -> Report {
        info!(
            "Preparing {} for entity {}",
            self.schema.template_id,
            request
                .scenario
                .text_value(Scenario::ENTITY_ID_KEY)
                .as_deref()
                .unwrap_or(UNKNOWN_ENTITY)
        );

        let retrieved = SectionRetriever::new(self.regulations)
            .with_limit(request.retrieval_limit)
            .retrieve(request.question, request.scenario);
        info!(
            "Retrieved {} of {} regulation sections",
            retrieved.len(),
            self.regulations.len()
        );
        let section_audit = SectionAudit::from_sections(&retrieved);

        let MappedFields { fields, audit_log } =
            FieldMapper::new(self.mapping).map_fields(self.schema, request.scenario);
        let fields = TotalsValidator::new(self.mapping).validate(fields);

        let flagged = fields
            .iter()
            .filter(|f| !f.validation_flags.is_empty())
            .count();
        debug!("{} of {} fields carry validation flags", flagged, fields.len());

        let structured = StructuredOutput {
            template_id: self.schema.template_id.clone(),
            template_name: self.schema.template_name.clone(),
            entity_id: request
                .scenario
                .text_value(Scenario::ENTITY_ID_KEY)
                .unwrap_or_else(|| UNKNOWN_ENTITY.to_string()),
            reporting_date: request
                .scenario
                .text_value(Scenario::REPORTING_DATE_KEY)
                .unwrap_or_else(|| request.fallback_reporting_date.format("%Y-%m-%d").to_string()),
            currency: self.schema.currency.clone(),
            fields,
            audit_log,
        };

        Report {
            structured,
            section_audit,
        }
    }
}

/// Parses a `YYYY-MM-DD` reporting date.
pub fn parse_reporting_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CorepError::InvalidDate(raw.to_string()))
}
