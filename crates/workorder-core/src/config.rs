use crate::error::WorkOrderError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometric tolerances used while recovering document structure.
///
/// All distances are in PDF points. Every field has a default, so an options
/// file only needs to name the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub header: HeaderOptions,
    pub grid: GridOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderOptions {
    /// Cells whose tops differ by at most this much belong to one grid row.
    pub row_tolerance: f32,
    /// Padding added around a value cell before re-reading its tokens.
    pub cell_padding: f32,
    /// Tokens whose tops differ by at most this much share a visual line.
    pub line_tolerance: f32,
    /// Header region cutoff when no "Line" column heading is found.
    pub fallback_cutoff: f32,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        HeaderOptions {
            row_tolerance: 3.5,
            cell_padding: 2.5,
            line_tolerance: 2.0,
            fallback_cutoff: 250.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Parallel rulings closer than this are snapped onto one line.
    pub snap_tolerance: f32,
    /// Collinear rulings with gaps up to this are merged.
    pub join_tolerance: f32,
    /// Slack when testing whether two rulings cross.
    pub intersection_tolerance: f32,
    /// Rulings shorter than this are ignored.
    pub min_edge_length: f32,
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions {
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            intersection_tolerance: 3.0,
            min_edge_length: 3.0,
        }
    }
}

/// Load pipeline options from a JSON file.
pub fn load_options(path: &Path) -> Result<PipelineOptions, WorkOrderError> {
    let content = std::fs::read_to_string(path).map_err(|e| WorkOrderError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let options: PipelineOptions =
        serde_json::from_str(&content).map_err(|e| WorkOrderError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_options(&options)?;
    Ok(options)
}

/// Parse pipeline options from a JSON string (no file path context).
pub fn parse_options_str(json: &str) -> Result<PipelineOptions, WorkOrderError> {
    let options: PipelineOptions = serde_json::from_str(json).map_err(WorkOrderError::Json)?;
    validate_options(&options)?;
    Ok(options)
}

/// Validate that every tolerance is a finite, non-negative distance.
pub fn validate_options(options: &PipelineOptions) -> Result<(), WorkOrderError> {
    let values = [
        ("header.row_tolerance", options.header.row_tolerance),
        ("header.cell_padding", options.header.cell_padding),
        ("header.line_tolerance", options.header.line_tolerance),
        ("header.fallback_cutoff", options.header.fallback_cutoff),
        ("grid.snap_tolerance", options.grid.snap_tolerance),
        ("grid.join_tolerance", options.grid.join_tolerance),
        ("grid.intersection_tolerance", options.grid.intersection_tolerance),
        ("grid.min_edge_length", options.grid.min_edge_length),
    ];

    for (name, value) in values {
        if !value.is_finite() || value < 0.0 {
            return Err(WorkOrderError::ConfigInvalid(format!(
                "'{}' must be a non-negative number, got {}",
                name, value
            )));
        }
    }

    Ok(())
}
