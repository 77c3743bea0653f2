use crate::error::WorkOrderError;
use crate::extraction::pdftohtml::{parse_pdftohtml_xml, XmlPage};
use crate::extraction::rulings::{load_document, page_geometry};
use crate::extraction::{PageModel, PdfExtractor, Token};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// PDF extraction backend built on poppler-utils and lopdf.
///
/// - `lopdf` validates the document and reads ruling lines from the page
///   content streams.
/// - `pdftotext -layout` supplies reading-order text per page.
/// - `pdftohtml -xml` supplies positioned text runs with full font names.
pub struct PopplerExtractor;

impl PopplerExtractor {
    pub fn new() -> Self {
        PopplerExtractor
    }
}

impl Default for PopplerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PopplerExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageModel>, WorkOrderError> {
        let document = load_document(pdf_bytes)?;
        let geometry = page_geometry(&document);

        // Write PDF bytes to a temp file for the command-line tools
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| WorkOrderError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| WorkOrderError::Extraction(e.to_string()))?;
        let tmp_path = tmpfile.path().to_path_buf();

        let text = run_tool("pdftotext", &["-layout"], &tmp_path, &["-"])?;
        let xml = run_tool(
            "pdftohtml",
            &["-xml", "-i", "-q", "-stdout", "-zoom", "1", "-fontfullname"],
            &tmp_path,
            &[],
        )?;
        let mut xml_pages = parse_pdftohtml_xml(&xml)?;

        // pdftotext separates pages with form feeds
        let texts: Vec<&str> = text.split('\x0c').collect();

        let pages: Vec<PageModel> = geometry
            .into_iter()
            .enumerate()
            .map(|(i, geo)| {
                let tokens = take_page_tokens(&mut xml_pages, geo.page_number);
                PageModel {
                    page_number: geo.page_number,
                    width: geo.width,
                    height: geo.height,
                    text: texts.get(i).map(|t| t.to_string()).unwrap_or_default(),
                    tokens,
                    rulings: geo.rulings,
                }
            })
            .collect();

        debug!(
            backend = self.backend_name(),
            pages = pages.len(),
            tokens = pages.iter().map(|p| p.tokens.len()).sum::<usize>(),
            rulings = pages.iter().map(|p| p.rulings.len()).sum::<usize>(),
            "decoded document"
        );

        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "poppler"
    }
}

fn take_page_tokens(xml_pages: &mut [XmlPage], page_number: usize) -> Vec<Token> {
    xml_pages
        .iter_mut()
        .find(|p| p.page_number == page_number)
        .map(|p| std::mem::take(&mut p.tokens))
        .unwrap_or_default()
}

fn run_tool(
    tool: &str,
    args: &[&str],
    input: &Path,
    trailing: &[&str],
) -> Result<String, WorkOrderError> {
    let output = Command::new(tool)
        .args(args)
        .arg(input)
        .args(trailing)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WorkOrderError::ToolNotFound {
                    tool: tool.to_string(),
                }
            } else {
                WorkOrderError::Extraction(format!("{} failed: {}", tool, e))
            }
        })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(WorkOrderError::ToolFailed {
            tool: tool.to_string(),
            code,
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
