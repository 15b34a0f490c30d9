//! # corep-assistant CLI
//!
//! `generate` runs the full pipeline and writes the three artifacts; `schema` prints the
//! JSON Schema of an input or output document.
//!
//! The pipeline flags live on the `generate` subcommand rather than at the top level:
//!
//! ```text
//! corep-assistant generate --question "..." --scenario scenario.json --output out/
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use corep_assistant::{
    load_mapping_table, load_regulations, load_scenario, load_template_schema,
    parse_reporting_date, render_all, write_artifacts, MappingTable, RegulationSection,
    ReportRequest, ReportingAssistant, Scenario, StructuredOutput, TemplateSchema,
    DEFAULT_RETRIEVAL_LIMIT,
};
use std::path::PathBuf;

/// Regulatory capital-reporting assistant.
///
/// Run `corep-assistant generate --question <Q> --scenario <FILE> --output <DIR>` to produce
/// the structured output, template extract and audit log.
#[derive(Parser, Debug)]
#[command(name = "corep-assistant", version, about, long_about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Retrieve sections, map the scenario onto the template and write the artifacts.
    Generate(GenerateArgs),
    /// Print the JSON Schema of a document shape.
    Schema {
        #[arg(value_enum)]
        document: SchemaDocument,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long, help = "Natural-language question from the analyst")]
    question: String,
    #[arg(long, help = "Path to JSON scenario input")]
    scenario: PathBuf,
    #[arg(long, help = "Output directory for generated artifacts")]
    output: PathBuf,
    #[arg(long, default_value = "data/regulations.json", help = "Path to regulations JSON")]
    regulations: PathBuf,
    #[arg(long, default_value = "data/template_schema.json", help = "Path to template schema JSON")]
    schema: PathBuf,
    #[arg(long, help = "Path to a field mapping table JSON (defaults to the built-in CA1 table)")]
    mapping: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_RETRIEVAL_LIMIT, help = "Maximum number of sections to retrieve")]
    limit: usize,
    #[arg(long, help = "Reporting date (YYYY-MM-DD) used when the scenario has none; defaults to today (UTC)")]
    reporting_date: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemaDocument {
    Template,
    Scenario,
    Regulations,
    Mapping,
    Output,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("corep_assistant=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(args),
        Commands::Schema { document } => print_schema(document),
    }
}

fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let fallback_reporting_date = match &args.reporting_date {
        Some(raw) => parse_reporting_date(raw)?,
        None => chrono::Utc::now().date_naive(),
    };

    let scenario = load_scenario(&args.scenario).context("loading scenario")?;
    let regulations = load_regulations(&args.regulations).context("loading regulations")?;
    let schema = load_template_schema(&args.schema).context("loading template schema")?;
    let mapping = match &args.mapping {
        Some(path) => load_mapping_table(path).context("loading mapping table")?,
        None => MappingTable::corep_ca1(),
    };

    let report = ReportingAssistant::new(&regulations, &schema, &mapping).process(&ReportRequest {
        question: &args.question,
        scenario: &scenario,
        retrieval_limit: args.limit,
        fallback_reporting_date,
    });

    let artifacts = render_all(&report.structured, &report.section_audit)?;
    let paths = write_artifacts(&args.output, &artifacts)
        .with_context(|| format!("writing artifacts to {}", args.output.display()))?;

    println!("Wrote structured output to {}", paths.structured.display());
    println!("Wrote template extract to {}", paths.template.display());
    println!("Wrote audit log to {}", paths.audit.display());
    Ok(())
}

fn print_schema(document: SchemaDocument) -> anyhow::Result<()> {
    let schema = match document {
        SchemaDocument::Template => TemplateSchema::generate_json_schema(),
        SchemaDocument::Scenario => schemars::schema_for!(Scenario),
        SchemaDocument::Regulations => schemars::schema_for!(Vec<RegulationSection>),
        SchemaDocument::Mapping => MappingTable::generate_json_schema(),
        SchemaDocument::Output => StructuredOutput::generate_json_schema(),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
