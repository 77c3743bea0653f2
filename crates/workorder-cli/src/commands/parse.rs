use std::path::PathBuf;
use tracing::debug;
use workorder_core::config::{load_options, PipelineOptions};
use workorder_core::error::WorkOrderError;
use workorder_core::extraction::poppler::PopplerExtractor;

use super::glossary_or_builtin;
use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    glossary_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<(), WorkOrderError> {
    let options = match config_file {
        Some(path) => {
            debug!(path = %path.display(), "loading pipeline options");
            load_options(&path)?
        }
        None => PipelineOptions::default(),
    };
    let glossary = glossary_or_builtin(glossary_file)?;

    let pdf_bytes = std::fs::read(&pdf_file)?;
    debug!(path = %pdf_file.display(), bytes = pdf_bytes.len(), "read input");
    let extractor = PopplerExtractor::new();
    let work_order =
        workorder_core::build_workorder_with(&pdf_bytes, &extractor, &options, &glossary)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&work_order)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} header field(s) and {} line item(s), written to {}",
                work_order.header.len(),
                work_order.items.len(),
                path.display()
            );
            if !work_order.skipped_lines.is_empty() {
                eprintln!(
                    "  {} table line(s) skipped during parsing",
                    work_order.skipped_lines.len()
                );
            }
        }
        None => match output_format {
            "json" => output::json::print(&work_order)?,
            _ => println!("{}", output::table::format_work_order(&work_order)),
        },
    }

    Ok(())
}
