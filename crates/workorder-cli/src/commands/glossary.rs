use std::path::Path;
use workorder_core::error::WorkOrderError;
use workorder_core::phrase::glossary::{load_glossary, Glossary};

pub fn list() -> Result<(), WorkOrderError> {
    let glossary = Glossary::builtin();
    let width = glossary
        .entries()
        .iter()
        .map(|e| e.english.chars().count())
        .max()
        .unwrap_or(10);

    println!("Built-in glossary ({} terms, first match wins):\n", glossary.len());
    for entry in glossary.entries() {
        println!("  {:<width$}  {}", entry.english, entry.spanish, width = width);
    }

    Ok(())
}

pub fn validate(file: &Path) -> Result<(), WorkOrderError> {
    let glossary = load_glossary(file)?;

    println!("Glossary '{}' is valid.", file.display());
    println!("  Terms: {}", glossary.len());

    // Check for potential issues (warnings, not errors)
    let mut warnings = Vec::new();
    let entries = glossary.entries();
    for (i, later) in entries.iter().enumerate() {
        if let Some(earlier) = entries[..i]
            .iter()
            .find(|e| later.english.contains(e.english.as_str()))
        {
            warnings.push(format!(
                "term '{}' is never used: the earlier term '{}' always matches first",
                later.english, earlier.english
            ));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
