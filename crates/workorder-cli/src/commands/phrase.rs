use std::path::PathBuf;
use workorder_core::error::WorkOrderError;
use workorder_core::phrase::{plain_english, spanish_with};

use super::glossary_or_builtin;

pub fn run(
    operation: &str,
    description: &str,
    glossary_file: Option<PathBuf>,
) -> Result<(), WorkOrderError> {
    let glossary = glossary_or_builtin(glossary_file)?;

    println!("English: {}", plain_english(operation, description));
    println!("Spanish: {}", spanish_with(&glossary, operation, description));

    Ok(())
}
