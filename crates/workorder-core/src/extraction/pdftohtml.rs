use super::{BBox, Token};
use crate::error::WorkOrderError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// Tokens of one page as reported by `pdftohtml -xml`.
#[derive(Debug, Clone, Default)]
pub struct XmlPage {
    pub page_number: usize,
    pub width: f32,
    pub height: f32,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone)]
struct FontSpec {
    family: String,
    size: f32,
}

#[derive(Debug, Clone)]
struct TextRun {
    top: f32,
    left: f32,
    width: f32,
    height: f32,
    font: String,
    text: String,
}

/// Parse `pdftohtml -xml -zoom 1` output into positioned word tokens.
///
/// Each `<text>` element is one run in a single font. Runs are split into
/// words, with horizontal extents apportioned by character count.
pub fn parse_pdftohtml_xml(xml: &str) -> Result<Vec<XmlPage>, WorkOrderError> {
    let mut reader = Reader::from_str(xml);

    let mut fonts: HashMap<String, FontSpec> = HashMap::new();
    let mut pages: Vec<(XmlPage, Vec<TextRun>)> = Vec::new();
    let mut current_run: Option<TextRun> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            WorkOrderError::Extraction(format!(
                "pdftohtml XML error at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"page" => pages.push((page_from(&e), Vec::new())),
                b"fontspec" => insert_font(&e, &mut fonts),
                b"text" => current_run = Some(run_from(&e)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"fontspec" => insert_font(&e, &mut fonts),
                b"page" => pages.push((page_from(&e), Vec::new())),
                _ => {}
            },
            Event::Text(t) => {
                if let Some(run) = current_run.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| WorkOrderError::Extraction(e.to_string()))?;
                    run.text.push_str(&text);
                }
            }
            Event::End(e) if e.name().as_ref() == b"text" => {
                if let (Some(run), Some((_, runs))) = (current_run.take(), pages.last_mut()) {
                    runs.push(run);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // Font specs may be declared after the first run that uses them.
    Ok(pages
        .into_iter()
        .map(|(mut page, runs)| {
            page.tokens = runs
                .iter()
                .flat_map(|run| split_run(run, fonts.get(&run.font)))
                .collect();
            page
        })
        .collect())
}

fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn attr_f32(e: &BytesStart<'_>, name: &str) -> f32 {
    attr(e, name).and_then(|v| v.parse().ok()).unwrap_or(0.0)
}

fn page_from(e: &BytesStart<'_>) -> XmlPage {
    XmlPage {
        page_number: attr(e, "number").and_then(|v| v.parse().ok()).unwrap_or(0),
        width: attr_f32(e, "width"),
        height: attr_f32(e, "height"),
        tokens: Vec::new(),
    }
}

fn insert_font(e: &BytesStart<'_>, fonts: &mut HashMap<String, FontSpec>) {
    if let Some(id) = attr(e, "id") {
        fonts.insert(
            id,
            FontSpec {
                family: attr(e, "family").unwrap_or_default(),
                size: attr_f32(e, "size"),
            },
        );
    }
}

fn run_from(e: &BytesStart<'_>) -> TextRun {
    TextRun {
        top: attr_f32(e, "top"),
        left: attr_f32(e, "left"),
        width: attr_f32(e, "width"),
        height: attr_f32(e, "height"),
        font: attr(e, "font").unwrap_or_default(),
        text: String::new(),
    }
}

fn split_run(run: &TextRun, font: Option<&FontSpec>) -> Vec<Token> {
    let chars: Vec<char> = run.text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    let char_width = run.width / chars.len() as f32;
    let (font_name, font_size) = match font {
        Some(f) => (f.family.clone(), f.size),
        None => (String::new(), run.height),
    };

    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for i in 0..=chars.len() {
        let is_space = chars.get(i).map_or(true, |c| c.is_whitespace());
        match (start, is_space) {
            (None, false) => start = Some(i),
            (Some(s), true) => {
                tokens.push(Token {
                    text: chars[s..i].iter().collect(),
                    bbox: BBox::new(
                        run.left + s as f32 * char_width,
                        run.top,
                        run.left + i as f32 * char_width,
                        run.top + run.height,
                    ),
                    font_name: font_name.clone(),
                    font_size,
                });
                start = None;
            }
            _ => {}
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE pdf2xml SYSTEM "pdf2xml.dtd">
<pdf2xml producer="poppler" version="22.02.0">
<page number="1" position="absolute" top="0" left="0" height="792" width="612">
	<fontspec id="0" size="9" family="ABCDEF+Arial" color="#000000"/>
	<fontspec id="1" size="9" family="ABCDEF+Arial-BoldMT" color="#000000"/>
<text top="40" left="30" width="60" height="10" font="0">RO Number:</text>
<text top="40" left="95" width="30" height="10" font="1"><b>12345</b></text>
<text top="55" left="30" width="70" height="10" font="0">Smith &amp; Sons</text>
</page>
<page number="2" position="absolute" top="0" left="0" height="792" width="612">
<text top="10" left="10" width="20" height="10" font="1">Line</text>
</page>
</pdf2xml>
"##;

    #[test]
    fn test_parse_pages_and_fonts() {
        let pages = parse_pdftohtml_xml(SAMPLE).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].height, 792.0);

        let texts: Vec<&str> = pages[0].tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["RO", "Number:", "12345", "Smith", "&", "Sons"]);

        let value = &pages[0].tokens[2];
        assert_eq!(value.font_name, "ABCDEF+Arial-BoldMT");
        assert!(value.is_bold());
        assert!(!pages[0].tokens[0].is_bold());
        assert_eq!(pages[1].tokens[0].text, "Line");
    }

    #[test]
    fn test_split_run_apportions_width() {
        let run = TextRun {
            top: 40.0,
            left: 30.0,
            width: 100.0,
            height: 10.0,
            font: "0".into(),
            text: "RO Number:".into(),
        };
        let tokens = split_run(&run, None);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].bbox, BBox::new(30.0, 40.0, 50.0, 50.0));
        assert_eq!(tokens[1].bbox, BBox::new(60.0, 40.0, 130.0, 50.0));
    }

    #[test]
    fn test_malformed_xml_is_extraction_error() {
        let err = parse_pdftohtml_xml("<pdf2xml><page number=\"1\"></text>").unwrap_err();
        assert!(matches!(err, WorkOrderError::Extraction(_)));
    }
}
