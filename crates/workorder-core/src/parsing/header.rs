use crate::config::PipelineOptions;
use crate::extraction::{group_lines, BBox, PageModel, TableGrid, Token};
use crate::model::{HeaderRecord, HeaderStrategy};
use crate::parsing::inline::{scan, split_inline, PlainValues};
use crate::parsing::is_table_header;
use crate::parsing::normalize::{collapse_whitespace, normalize_header};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

type Strategy = fn(&PageModel, &PipelineOptions) -> Option<HeaderRecord>;

/// Header strategies in the order they are tried. The first one that
/// yields at least one canonical field wins.
const STRATEGIES: &[(HeaderStrategy, Strategy)] = &[
    (HeaderStrategy::TableGrid, from_table_grid),
    (HeaderStrategy::BoldRun, from_bold_runs),
    (HeaderStrategy::Regex, from_regex),
];

/// Extract the vehicle/RO/owner header from the first page of a work order.
pub fn extract_header(page: &PageModel, options: &PipelineOptions) -> HeaderRecord {
    extract_header_traced(page, options).0
}

/// Like [`extract_header`], also reporting which strategy produced the
/// record. `None` means every strategy came up empty.
pub fn extract_header_traced(
    page: &PageModel,
    options: &PipelineOptions,
) -> (HeaderRecord, Option<HeaderStrategy>) {
    for &(strategy, run) in STRATEGIES {
        let record = run(page, options)
            .map(|raw| normalize_header(&raw))
            .filter(|record| !record.is_empty());
        match record {
            Some(record) => {
                info!(%strategy, fields = record.len(), "extracted header");
                return (record, Some(strategy));
            }
            None => debug!(%strategy, "header strategy found no fields"),
        }
    }
    info!("no header fields found");
    (HeaderRecord::new(), None)
}

// --- table grid ---

fn from_table_grid(page: &PageModel, options: &PipelineOptions) -> Option<HeaderRecord> {
    let tables = page.find_table_grids(&options.grid);
    debug!(tables = tables.len(), "detected ruled tables");

    let table = tables
        .iter()
        .find(|t| table_text(page, t).to_lowercase().contains("ro number"))
        .or_else(|| tables.first())?;

    let pad = options.header.cell_padding;
    let mut record = HeaderRecord::new();
    for row in cluster_rows(&table.cells, options.header.row_tolerance) {
        for pair in row.chunks(2).take(2) {
            let [label_cell, value_cell] = pair else {
                continue;
            };
            let label = page.crop(label_cell.padded(pad)).text();
            let label = label.trim().trim_end_matches(':').trim_end();
            if label.is_empty() {
                continue;
            }

            let view = page.crop(value_cell.padded(pad));
            let ordered: Vec<&Token> =
                group_lines(view.extract_tokens(), options.header.line_tolerance)
                    .into_iter()
                    .flatten()
                    .collect();
            let split = split_inline(&ordered);

            if !split.main_value.is_empty() {
                record.insert_first(label, split.main_value);
            }
            for (key, value) in split.pairs {
                record.insert_first(key, value);
            }
        }
    }

    (!record.is_empty()).then_some(record)
}

fn table_text(page: &PageModel, table: &TableGrid) -> String {
    table
        .cells
        .iter()
        .map(|cell| page.crop(*cell).text())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Group cells into rows by their tops, each row ordered left-to-right.
fn cluster_rows(cells: &[BBox], tolerance: f32) -> Vec<Vec<BBox>> {
    let mut sorted = cells.to_vec();
    sorted.sort_by(|a, b| a.y_min.total_cmp(&b.y_min).then(a.x_min.total_cmp(&b.x_min)));

    let mut rows: Vec<Vec<BBox>> = Vec::new();
    let mut row_top = f32::NEG_INFINITY;
    for cell in sorted {
        match rows.last_mut() {
            Some(row) if (cell.y_min - row_top).abs() <= tolerance => row.push(cell),
            _ => {
                row_top = cell.y_min;
                rows.push(vec![cell]);
            }
        }
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.x_min.total_cmp(&b.x_min));
    }
    rows
}

// --- bold runs ---

fn from_bold_runs(page: &PageModel, options: &PipelineOptions) -> Option<HeaderRecord> {
    let tokens = page.extract_tokens();
    let cutoff = tokens
        .iter()
        .filter(|t| t.text == "Line")
        .map(|t| t.bbox.y_min)
        .min_by(f32::total_cmp)
        .unwrap_or(options.header.fallback_cutoff);

    let above: Vec<&Token> = tokens.iter().filter(|t| t.bbox.y_min < cutoff).collect();
    if !above.iter().any(|t| t.is_bold()) {
        debug!("no bold tokens above the item table");
        return None;
    }

    let mut record = HeaderRecord::new();
    for line in group_lines(&above, options.header.line_tolerance) {
        for (key, value) in scan(&line, PlainValues::Deny).pairs {
            record.insert_first(key, value);
        }
    }

    (!record.is_empty()).then_some(record)
}

// --- regex ---

struct FieldPattern {
    field: &'static str,
    label: Regex,
    value: Option<Regex>,
}

/// (field, label pattern, optional value shape)
const FIELD_LABELS: &[(&str, &str, Option<&str>)] = &[
    ("RO Number", r"RO\s*(?:Number|No\.?|#)", None),
    ("Owner", r"Owner", None),
    ("Year", r"Year", Some(r"^\d{4}")),
    ("Exterior Color", r"Exterior\s+Colou?r", None),
    ("Make", r"Make", Some(r"^[A-Za-z]+")),
    ("Model", r"Model", None),
    ("Mileage In", r"Mileage\s+In", None),
    ("Vehicle In", r"Vehicle\s+In", None),
    ("Vehicle Out", r"Vehicle\s+Out", None),
    ("Estimator", r"Estimator", None),
    ("Body Style", r"Body\s+Style", None),
    ("Insurance", r"Insurance", None),
    ("VIN", r"VIN", None),
    ("Job Number", r"Job\s*(?:Number|No\.?|#)", None),
];

static FIELD_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    FIELD_LABELS
        .iter()
        .filter_map(|(field, label, value)| {
            Some(FieldPattern {
                field: *field,
                label: Regex::new(&format!(r"\b{}\s*:", label)).ok()?,
                value: match value {
                    Some(v) => Some(Regex::new(v).ok()?),
                    None => None,
                },
            })
        })
        .collect()
});

fn from_regex(page: &PageModel, _options: &PipelineOptions) -> Option<HeaderRecord> {
    let mut record = HeaderRecord::new();

    for line in page.extract_plain_text().lines() {
        let line = collapse_whitespace(line);
        if line.is_empty() {
            continue;
        }
        if line.starts_with("Work Order") || is_table_header(&line) {
            break;
        }
        for (field, value) in match_labels(&line) {
            record.insert_first(field, value);
        }
    }

    (!record.is_empty()).then_some(record)
}

/// Every `Label: value` pair on one line. A value runs until the next
/// recognized label or the end of the line.
fn match_labels(line: &str) -> Vec<(&'static str, String)> {
    let mut hits: Vec<(usize, usize, &FieldPattern)> = FIELD_PATTERNS
        .iter()
        .flat_map(|p| p.label.find_iter(line).map(move |m| (m.start(), m.end(), p)))
        .collect();
    hits.sort_by_key(|&(start, end, _)| (start, std::cmp::Reverse(end)));

    // Drop labels nested inside an earlier, longer one.
    let mut kept: Vec<(usize, usize, &FieldPattern)> = Vec::new();
    for hit in hits {
        if kept.last().map_or(true, |last| hit.0 >= last.1) {
            kept.push(hit);
        }
    }

    let mut out = Vec::new();
    for (i, &(_, end, pattern)) in kept.iter().enumerate() {
        let stop = kept.get(i + 1).map_or(line.len(), |next| next.0);
        let raw = line[end..stop].trim();
        let value = match &pattern.value {
            Some(shape) => shape.find(raw).map(|m| m.as_str()),
            None => Some(raw),
        };
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            out.push((pattern.field, value.to_string()));
        }
    }
    out
}
