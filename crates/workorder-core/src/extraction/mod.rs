pub mod grid;
pub mod pdftohtml;
pub mod poppler;
pub mod rulings;

use crate::config::GridOptions;
use crate::error::WorkOrderError;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in page space, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BBox {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        BBox {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Grow the box by `pad` on every side.
    pub fn padded(&self, pad: f32) -> BBox {
        BBox {
            x_min: self.x_min - pad,
            y_min: self.y_min - pad,
            x_max: self.x_max + pad,
            y_max: self.y_max + pad,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

/// A positioned word on a page, with the font it was drawn in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub bbox: BBox,
    pub font_name: String,
    pub font_size: f32,
}

impl Token {
    /// Font-name heuristic: "bold", "demi" or "black" anywhere in the name.
    pub fn is_bold(&self) -> bool {
        is_bold_font(&self.font_name)
    }
}

pub fn is_bold_font(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    ["bold", "demi", "black"].iter().any(|w| lower.contains(w))
}

/// A straight ruling line drawn on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Ruling {
    Horizontal { y: f32, x0: f32, x1: f32 },
    Vertical { x: f32, y0: f32, y1: f32 },
}

/// A table detected from ruling lines: the bounding boxes of its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    pub cells: Vec<BBox>,
}

impl TableGrid {
    pub fn bbox(&self) -> Option<BBox> {
        let first = *self.cells.first()?;
        Some(self.cells.iter().fold(first, |acc, c| acc.union(c)))
    }
}

/// Content decoded from a single page of a PDF.
#[derive(Debug, Clone, Default)]
pub struct PageModel {
    pub page_number: usize,
    pub width: f32,
    pub height: f32,
    /// Reading-order text of the page.
    pub text: String,
    pub tokens: Vec<Token>,
    pub rulings: Vec<Ruling>,
}

impl PageModel {
    pub fn extract_plain_text(&self) -> &str {
        &self.text
    }

    pub fn extract_tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn find_table_grids(&self, options: &GridOptions) -> Vec<TableGrid> {
        grid::find_table_grids(&self.rulings, options)
    }

    /// View of the tokens whose center falls inside `bbox`.
    pub fn crop(&self, bbox: BBox) -> CroppedPage<'_> {
        let tokens = self
            .tokens
            .iter()
            .filter(|t| {
                let (x, y) = t.bbox.center();
                bbox.contains_point(x, y)
            })
            .collect();
        CroppedPage { bbox, tokens }
    }
}

#[derive(Debug, Clone)]
pub struct CroppedPage<'a> {
    pub bbox: BBox,
    tokens: Vec<&'a Token>,
}

impl<'a> CroppedPage<'a> {
    pub fn extract_tokens(&self) -> &[&'a Token] {
        &self.tokens
    }

    /// Tokens joined with single spaces in reading order.
    pub fn text(&self) -> String {
        group_lines(&self.tokens, CELL_LINE_TOLERANCE)
            .iter()
            .flatten()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

const CELL_LINE_TOLERANCE: f32 = 2.0;

/// Group tokens into visual lines: tops within `tolerance` of the first
/// token of a line share that line. Lines come out top-to-bottom, tokens
/// within a line left-to-right.
pub fn group_lines<'a>(tokens: &[&'a Token], tolerance: f32) -> Vec<Vec<&'a Token>> {
    let mut sorted = tokens.to_vec();
    sorted.sort_by(|a, b| {
        a.bbox
            .y_min
            .total_cmp(&b.bbox.y_min)
            .then(a.bbox.x_min.total_cmp(&b.bbox.x_min))
    });

    let mut lines: Vec<Vec<&Token>> = Vec::new();
    let mut line_top = f32::NEG_INFINITY;
    for token in sorted {
        match lines.last_mut() {
            Some(line) if (token.bbox.y_min - line_top).abs() <= tolerance => line.push(token),
            _ => {
                line_top = token.bbox.y_min;
                lines.push(vec![token]);
            }
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.bbox.x_min.total_cmp(&b.bbox.x_min));
    }
    lines
}

/// Trait for PDF decoding backends.
pub trait PdfExtractor: Send + Sync {
    /// Decode PDF bytes into one PageModel per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageModel>, WorkOrderError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, x: f32, y: f32, font: &str) -> Token {
        Token {
            text: text.to_string(),
            bbox: BBox::new(x, y, x + 20.0, y + 8.0),
            font_name: font.to_string(),
            font_size: 8.0,
        }
    }

    #[test]
    fn test_bold_font_heuristic() {
        assert!(is_bold_font("ABCDEF+Arial-BoldMT"));
        assert!(is_bold_font("Helvetica-Black"));
        assert!(is_bold_font("FranklinGothic-Demi"));
        assert!(!is_bold_font("Helvetica"));
        assert!(!is_bold_font("Arial-ItalicMT"));
    }

    #[test]
    fn test_crop_keeps_tokens_by_center() {
        let page = PageModel {
            page_number: 1,
            tokens: vec![
                token("inside", 10.0, 10.0, "Helvetica"),
                token("edge", 38.0, 10.0, "Helvetica"),
                token("outside", 100.0, 10.0, "Helvetica"),
            ],
            ..Default::default()
        };
        let view = page.crop(BBox::new(0.0, 0.0, 50.0, 30.0));
        let texts: Vec<&str> = view.extract_tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["inside", "edge"]);
        assert_eq!(view.text(), "inside edge");
    }

    #[test]
    fn test_group_lines_by_top() {
        let a = token("Owner:", 50.0, 100.0, "Helvetica");
        let b = token("RO", 10.0, 101.5, "Helvetica");
        let c = token("Year:", 10.0, 120.0, "Helvetica");
        let lines = group_lines(&[&a, &b, &c], 2.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0].text, "RO");
        assert_eq!(lines[0][1].text, "Owner:");
        assert_eq!(lines[1][0].text, "Year:");
    }

    #[test]
    fn test_table_grid_bbox() {
        let grid = TableGrid {
            cells: vec![
                BBox::new(0.0, 0.0, 10.0, 10.0),
                BBox::new(10.0, 0.0, 30.0, 10.0),
                BBox::new(0.0, 10.0, 10.0, 25.0),
            ],
        };
        assert_eq!(grid.bbox(), Some(BBox::new(0.0, 0.0, 30.0, 25.0)));
        assert_eq!(TableGrid { cells: vec![] }.bbox(), None);
    }
}
