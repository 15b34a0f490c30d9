use crate::error::Result;
use crate::output::{SectionAudit, StructuredOutput};
use crate::utils::format_thousands;

pub const STRUCTURED_OUTPUT_FILE: &str = "structured_output.json";
pub const TEMPLATE_EXTRACT_FILE: &str = "template_extract.md";
pub const AUDIT_LOG_FILE: &str = "audit_log.json";

/// The three artifacts of a run, rendered and ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifacts {
    pub structured_json: String,
    pub template_markdown: String,
    pub audit_json: String,
}

pub fn render_structured_json(output: &StructuredOutput) -> Result<String> {
    Ok(serde_json::to_string_pretty(output)?)
}

pub fn render_template_markdown(output: &StructuredOutput) -> String {
    let mut lines = vec![
        format!("# COREP {} - {}", output.template_id, output.template_name),
        String::new(),
        format!("Entity: {}", output.entity_id),
        format!("Reporting date: {}", output.reporting_date),
        format!("Currency: {}", output.currency),
        String::new(),
        "| Line | Field | Value | Units | Validation flags | Rule refs |".to_string(),
        "| --- | --- | --- | --- | --- | --- |".to_string(),
    ];

    for field in &output.fields {
        let value = field
            .value
            .as_ref()
            .map(format_thousands)
            .unwrap_or_default();
        let flags = field
            .validation_flags
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let refs = field.rule_refs.join(", ");

        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} |",
            field.line, field.label, value, field.units, flags, refs
        ));
    }

    lines.join("\n")
}

pub fn render_audit_json(audit: &SectionAudit) -> Result<String> {
    Ok(serde_json::to_string_pretty(audit)?)
}

pub fn render_all(output: &StructuredOutput, audit: &SectionAudit) -> Result<RenderedArtifacts> {
    Ok(RenderedArtifacts {
        structured_json: render_structured_json(output)?,
        template_markdown: render_template_markdown(output),
        audit_json: render_audit_json(audit)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{FieldOutput, RuleAuditLog, ValidationFlag};
    use crate::schema::RegulationSection;
    use serde_json::Number;

    fn sample_output() -> StructuredOutput {
        let field = |code: &str, line: &str, label: &str, value: Option<Number>| FieldOutput {
            field_code: code.to_string(),
            line: line.to_string(),
            label: label.to_string(),
            value,
            units: "GBP".to_string(),
            rule_refs: vec!["PRA_OF_010".to_string(), "EBA_CA1_001".to_string()],
            validation_flags: vec![],
        };

        StructuredOutput {
            template_id: "CA1".to_string(),
            template_name: "Own Funds".to_string(),
            entity_id: "BANK-1".to_string(),
            reporting_date: "2024-12-31".to_string(),
            currency: "GBP".to_string(),
            fields: vec![
                field("CA1.010", "010", "CET1", Some(Number::from(125))),
                field("CA1.020", "020", "AT1", Some(Number::from(1_250_000))),
                field("CA1.060", "060", "Total", None)
                    .with_flag(ValidationFlag::MissingRequiredValue)
                    .with_flag(ValidationFlag::TotalUnavailable),
            ],
            audit_log: RuleAuditLog::new(),
        }
    }

    #[test]
    fn test_markdown_header_and_rows() {
        let markdown = render_template_markdown(&sample_output());
        let lines: Vec<&str> = markdown.lines().collect();

        assert_eq!(lines[0], "# COREP CA1 - Own Funds");
        assert_eq!(lines[2], "Entity: BANK-1");
        assert_eq!(lines[3], "Reporting date: 2024-12-31");
        assert_eq!(lines[4], "Currency: GBP");
        assert_eq!(
            lines[8],
            "| 010 | CET1 | 125 | GBP |  | PRA_OF_010, EBA_CA1_001 |"
        );
        assert_eq!(
            lines[9],
            "| 020 | AT1 | 1,250,000 | GBP |  | PRA_OF_010, EBA_CA1_001 |"
        );
        assert_eq!(
            lines[10],
            "| 060 | Total |  | GBP | missing_required_value, total_unavailable | PRA_OF_010, EBA_CA1_001 |"
        );
        assert!(!markdown.ends_with('\n'));
    }

    #[test]
    fn test_structured_json_keeps_nulls() {
        let json = render_structured_json(&sample_output()).unwrap();
        assert!(json.contains("\"value\": null"));
        assert!(json.contains("\"audit_log\": {}"));
    }

    #[test]
    fn test_audit_json_in_retrieval_order() {
        let b = RegulationSection {
            id: "B".to_string(),
            title: "Second".to_string(),
            text: "beta".to_string(),
            tags: vec![],
        };
        let a = RegulationSection {
            id: "A".to_string(),
            title: "First".to_string(),
            text: "alpha".to_string(),
            tags: vec![],
        };
        let json = render_audit_json(&SectionAudit::from_sections(&[&b, &a])).unwrap();
        assert_eq!(json, "{\n  \"B\": \"Second: beta\",\n  \"A\": \"First: alpha\"\n}");
    }
}
