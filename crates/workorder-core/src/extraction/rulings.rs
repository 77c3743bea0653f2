use super::Ruling;
use crate::error::WorkOrderError;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::warn;

/// US Letter, used when a page has no readable MediaBox or CropBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Segments thinner than this are treated as straight lines.
const LINE_THICKNESS: f32 = 2.0;

/// Size and ruling lines of one page, in top-left-origin coordinates.
#[derive(Debug, Clone)]
pub struct PageGeometry {
    pub page_number: usize,
    pub width: f32,
    pub height: f32,
    pub rulings: Vec<Ruling>,
}

/// Parse PDF bytes, failing with a decode error when they are not a PDF.
pub fn load_document(pdf_bytes: &[u8]) -> Result<Document, WorkOrderError> {
    Document::load_mem(pdf_bytes).map_err(|e| WorkOrderError::Decode(e.to_string()))
}

/// Collect page sizes and axis-aligned ruling lines for every page.
///
/// A page whose content stream cannot be decoded still gets an entry, just
/// without rulings.
pub fn page_geometry(doc: &Document) -> Vec<PageGeometry> {
    doc.get_pages()
        .into_iter()
        .map(|(page_number, page_id)| {
            if let Some(rotate) = inherited(doc, page_id, b"Rotate").and_then(number) {
                if rotate.rem_euclid(360.0) != 0.0 {
                    warn!(page = page_number, rotate, "rotated page; rulings are read unrotated");
                }
            }
            let (x0, y0, x1, y1) = visible_box(doc, page_id).unwrap_or((
                0.0,
                0.0,
                DEFAULT_PAGE_SIZE.0,
                DEFAULT_PAGE_SIZE.1,
            ));
            let rulings = match page_rulings(doc, page_id, x0, y1) {
                Ok(r) => r,
                Err(e) => {
                    warn!(page = page_number, error = %e, "could not read page graphics");
                    Vec::new()
                }
            };
            PageGeometry {
                page_number: page_number as usize,
                width: x1 - x0,
                height: y1 - y0,
                rulings,
            }
        })
        .collect()
}

type Rect = (f32, f32, f32, f32);

/// The page area poppler lays text out in: the CropBox clipped to the
/// MediaBox, or the MediaBox when there is no usable CropBox.
fn visible_box(doc: &Document, page_id: ObjectId) -> Option<Rect> {
    let media = page_box(doc, page_id, b"MediaBox");
    let crop = page_box(doc, page_id, b"CropBox");
    match (crop, media) {
        (Some(c), Some(m)) => {
            let clipped = (c.0.max(m.0), c.1.max(m.1), c.2.min(m.2), c.3.min(m.3));
            if clipped.0 < clipped.2 && clipped.1 < clipped.3 {
                Some(clipped)
            } else {
                Some(m)
            }
        }
        (crop, media) => media.or(crop),
    }
}

fn page_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Rect> {
    let values: Vec<f32> = inherited(doc, page_id, key)?
        .as_array()
        .ok()?
        .iter()
        .filter_map(|v| doc.dereference(v).ok().and_then(|(_, v)| number(v)))
        .collect();
    match values[..] {
        [a, b, c, d] => Some((a.min(c), b.min(d), a.max(c), b.max(d))),
        _ => None,
    }
}

/// Look up an inheritable page attribute, walking up the page tree.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut id = page_id;
    for _ in 0..32 {
        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(obj) = dict.get(key) {
            return doc.dereference(obj).ok().map(|(_, obj)| obj);
        }
        id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// `self` applied first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

type Point = (f32, f32);

/// Path construction state between painting operators.
#[derive(Default)]
struct PathBuilder {
    segments: Vec<(Point, Point)>,
    rects: Vec<[Point; 4]>,
    current: Option<Point>,
    start: Option<Point>,
}

impl PathBuilder {
    fn move_to(&mut self, p: Point) {
        self.current = Some(p);
        self.start = Some(p);
    }

    fn line_to(&mut self, p: Point) {
        if let Some(from) = self.current {
            self.segments.push((from, p));
        }
        self.current = Some(p);
    }

    fn close(&mut self) {
        if let (Some(from), Some(to)) = (self.current, self.start) {
            if from != to {
                self.segments.push((from, to));
            }
            self.current = Some(to);
        }
    }

    fn clear(&mut self) {
        *self = PathBuilder::default();
    }
}

fn page_rulings(
    doc: &Document,
    page_id: ObjectId,
    x_origin: f32,
    top: f32,
) -> Result<Vec<Ruling>, WorkOrderError> {
    let data = doc
        .get_page_content(page_id)
        .map_err(|e| WorkOrderError::Extraction(e.to_string()))?;
    let content = Content::decode(&data).map_err(|e| WorkOrderError::Extraction(e.to_string()))?;

    let mut rulings = Vec::new();
    let mut ctm = Matrix::IDENTITY;
    let mut stack: Vec<Matrix> = Vec::new();
    let mut path = PathBuilder::default();

    for op in &content.operations {
        let nums: Vec<f32> = op.operands.iter().filter_map(number).collect();
        match op.operator.as_str() {
            "q" => stack.push(ctm),
            "Q" => ctm = stack.pop().unwrap_or(Matrix::IDENTITY),
            "cm" if nums.len() == 6 => {
                let m = Matrix([nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]]);
                ctm = m.then(&ctm);
            }
            "m" if nums.len() == 2 => path.move_to(ctm.apply(nums[0], nums[1])),
            "l" if nums.len() == 2 => path.line_to(ctm.apply(nums[0], nums[1])),
            "c" if nums.len() == 6 => path.move_to(ctm.apply(nums[4], nums[5])),
            "v" | "y" if nums.len() == 4 => path.move_to(ctm.apply(nums[2], nums[3])),
            "re" if nums.len() == 4 => {
                let (x, y, w, h) = (nums[0], nums[1], nums[2], nums[3]);
                path.rects.push([
                    ctm.apply(x, y),
                    ctm.apply(x + w, y),
                    ctm.apply(x + w, y + h),
                    ctm.apply(x, y + h),
                ]);
                path.move_to(ctm.apply(x, y));
            }
            "h" => path.close(),
            "s" | "b" | "b*" => {
                path.close();
                flush_path(&path, x_origin, top, &mut rulings);
                path.clear();
            }
            "S" | "f" | "F" | "f*" | "B" | "B*" => {
                flush_path(&path, x_origin, top, &mut rulings);
                path.clear();
            }
            "n" => path.clear(),
            _ => {}
        }
    }

    Ok(rulings)
}

fn flush_path(path: &PathBuilder, x_origin: f32, top: f32, out: &mut Vec<Ruling>) {
    let flip = |(x, y): Point| (x - x_origin, top - y);

    for &(a, b) in &path.segments {
        if let Some(r) = segment_ruling(flip(a), flip(b)) {
            out.push(r);
        }
    }

    for &corners in &path.rects {
        let pts = corners.map(flip);
        let x0 = pts.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
        let x1 = pts.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
        let y0 = pts.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let y1 = pts.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);

        if y1 - y0 <= LINE_THICKNESS {
            out.push(Ruling::Horizontal {
                y: (y0 + y1) / 2.0,
                x0,
                x1,
            });
        } else if x1 - x0 <= LINE_THICKNESS {
            out.push(Ruling::Vertical {
                x: (x0 + x1) / 2.0,
                y0,
                y1,
            });
        } else {
            out.push(Ruling::Horizontal { y: y0, x0, x1 });
            out.push(Ruling::Horizontal { y: y1, x0, x1 });
            out.push(Ruling::Vertical { x: x0, y0, y1 });
            out.push(Ruling::Vertical { x: x1, y0, y1 });
        }
    }
}

/// Axis-aligned segments become rulings; diagonals are ignored.
fn segment_ruling(a: Point, b: Point) -> Option<Ruling> {
    if (a.1 - b.1).abs() <= 1.0 {
        Some(Ruling::Horizontal {
            y: (a.1 + b.1) / 2.0,
            x0: a.0.min(b.0),
            x1: a.0.max(b.0),
        })
    } else if (a.0 - b.0).abs() <= 1.0 {
        Some(Ruling::Vertical {
            x: (a.0 + b.0) / 2.0,
            y0: a.1.min(b.1),
            y1: a.1.max(b.1),
        })
    } else {
        None
    }
}
