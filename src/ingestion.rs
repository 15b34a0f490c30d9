use crate::error::{CorepError, Result};
use crate::mapping::MappingTable;
use crate::schema::{RegulationSection, Scenario, TemplateSchema};
use log::info;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;

fn parse_json<T: DeserializeOwned>(source_name: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| CorepError::invalid_input(source_name, e.to_string()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let source_name = path.display().to_string();
    let raw = fs::read_to_string(path)
        .map_err(|e| CorepError::invalid_input(&source_name, e.to_string()))?;
    parse_json(&source_name, &raw)
}

pub fn parse_regulations(source_name: &str, raw: &str) -> Result<Vec<RegulationSection>> {
    parse_json(source_name, raw)
}

pub fn parse_template_schema(source_name: &str, raw: &str) -> Result<TemplateSchema> {
    parse_json(source_name, raw)
}

/// Parses a scenario document, which must be a JSON object.
pub fn parse_scenario(source_name: &str, raw: &str) -> Result<Scenario> {
    let value: Value = parse_json(source_name, raw)?;
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(CorepError::invalid_input(
            source_name,
            format!("scenario must be a JSON object, found {}", json_kind(&other)),
        )),
    }
}

pub fn parse_mapping_table(source_name: &str, raw: &str) -> Result<MappingTable> {
    let table: MappingTable = parse_json(source_name, raw)?;
    table.validate()?;
    Ok(table)
}

pub fn load_regulations(path: &Path) -> Result<Vec<RegulationSection>> {
    let sections: Vec<RegulationSection> = read_json(path)?;
    info!(
        "Loaded {} regulation sections from {}",
        sections.len(),
        path.display()
    );
    Ok(sections)
}

pub fn load_template_schema(path: &Path) -> Result<TemplateSchema> {
    let schema: TemplateSchema = read_json(path)?;
    info!(
        "Loaded template {} ({} fields) from {}",
        schema.template_id,
        schema.fields.len(),
        path.display()
    );
    Ok(schema)
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CorepError::invalid_input(path.display().to_string(), e.to_string()))?;
    parse_scenario(&path.display().to_string(), &raw)
}

pub fn load_mapping_table(path: &Path) -> Result<MappingTable> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CorepError::invalid_input(path.display().to_string(), e.to_string()))?;
    let table = parse_mapping_table(&path.display().to_string(), &raw)?;
    info!(
        "Loaded mapping table for {} ({} fields) from {}",
        table.template_id,
        table.fields.len(),
        path.display()
    );
    Ok(table)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
