pub mod glossary;
pub mod parse;
pub mod phrase;

use std::borrow::Cow;
use std::path::PathBuf;
use workorder_core::error::WorkOrderError;
use workorder_core::phrase::glossary::{load_glossary, Glossary};

/// The glossary named on the command line, or the built-in one.
pub fn glossary_or_builtin(path: Option<PathBuf>) -> Result<Cow<'static, Glossary>, WorkOrderError> {
    match path {
        Some(path) => Ok(Cow::Owned(load_glossary(&path)?)),
        None => Ok(Cow::Borrowed(Glossary::builtin())),
    }
}
