pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod phrase;

use config::PipelineOptions;
use error::WorkOrderError;
use extraction::{PageModel, PdfExtractor};
use model::{HeaderRecord, WorkOrder};
use parsing::{extract_header_traced, parse_items_detailed, ParsedItems};
use phrase::glossary::Glossary;
use phrase::translate_item;
use tracing::info;

/// Main API entry point: recover the header and line items of a work order
/// PDF, with English and Spanish phrases for every item.
///
/// Fails only when the document cannot be decoded. Missing header fields
/// and unreadable table rows are simply absent from the result.
pub fn build_workorder(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
) -> Result<WorkOrder, WorkOrderError> {
    build_workorder_with(
        pdf_bytes,
        extractor,
        &PipelineOptions::default(),
        Glossary::builtin(),
    )
}

/// [`build_workorder`] with explicit tolerances and glossary.
pub fn build_workorder_with(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    options: &PipelineOptions,
    glossary: &Glossary,
) -> Result<WorkOrder, WorkOrderError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    info!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "decoded work order"
    );
    Ok(assemble(&pages, options, glossary))
}

/// Build a work order from already decoded pages.
///
/// The header comes from the first page; items come from the text of all
/// pages in order.
pub fn assemble(pages: &[PageModel], options: &PipelineOptions, glossary: &Glossary) -> WorkOrder {
    let (header, header_strategy) = match pages.first() {
        Some(first) => extract_header_traced(first, options),
        None => (HeaderRecord::new(), None),
    };

    let full_text = pages
        .iter()
        .map(|p| p.extract_plain_text())
        .collect::<Vec<_>>()
        .join("\n");
    let ParsedItems {
        mut items,
        skipped_lines,
    } = parse_items_detailed(&full_text);

    for item in &mut items {
        translate_item(item, glossary);
    }

    info!(
        header_fields = header.len(),
        items = items.len(),
        skipped = skipped_lines.len(),
        "assembled work order"
    );

    WorkOrder {
        header,
        header_strategy,
        items,
        skipped_lines,
    }
}
