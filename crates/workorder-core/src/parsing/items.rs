use crate::model::{is_upper, LineItem, SkippedLine};
use crate::parsing::normalize::collapse_whitespace;
use crate::parsing::values::{parse_hours, parse_quantity};
use crate::parsing::{is_table_end, is_table_header};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

// Literal patterns; `None` only if one fails to compile.
static SECTION_ROW: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d+) ([A-Z0-9 ,&'/.\-]+)$").ok());

static OPERATION_ROW: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(\d+) ([A-Za-z ]+?(?:\s*/\s*[A-Za-z]+)?) (\d+) ([A-Za-z0-9]+) (.+)$").ok()
});

static TRAILING_HOURS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)$").ok());

/// Rows recovered from the item table, plus the table lines that matched
/// neither row grammar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedItems {
    pub items: Vec<LineItem>,
    pub skipped_lines: Vec<SkippedLine>,
}

/// Parse the repair table out of the full document text.
///
/// Items come back sorted by line number without phrases filled in.
/// Lines that match no row grammar are dropped.
pub fn parse_items(full_text: &str) -> Vec<LineItem> {
    parse_items_detailed(full_text).items
}

/// Like [`parse_items`], also returning the table lines that were dropped.
pub fn parse_items_detailed(full_text: &str) -> ParsedItems {
    let lines: Vec<String> = full_text
        .lines()
        .map(collapse_whitespace)
        .filter(|l| !l.is_empty())
        .collect();

    let Some(start) = lines.iter().position(|l| is_table_header(l)) else {
        warn!("no item table header found");
        return ParsedItems::default();
    };

    let mut parsed = ParsedItems::default();
    for line in lines[start + 1..].iter().take_while(|l| !is_table_end(l)) {
        match parse_row(line) {
            Ok(item) => parsed.items.push(item),
            Err(reason) => {
                debug!(line = line.as_str(), reason, "skipping table line");
                parsed.skipped_lines.push(SkippedLine {
                    line_text: line.clone(),
                    reason: reason.to_string(),
                });
            }
        }
    }

    parsed.items.sort_by_key(|item| item.line_number);
    debug!(
        items = parsed.items.len(),
        skipped = parsed.skipped_lines.len(),
        "parsed item table"
    );
    parsed
}

fn parse_row(line: &str) -> Result<LineItem, &'static str> {
    if let Some(item) = parse_section_row(line) {
        return Ok(item);
    }
    if let Some(item) = parse_operation_row(line) {
        return Ok(item);
    }
    let digits: String = line.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        Err("no line number")
    } else if parse_line_number(&digits).is_none() {
        Err("line number must be positive")
    } else {
        Err("line number without a recognized row layout")
    }
}

fn parse_line_number(s: &str) -> Option<u32> {
    s.parse().ok().filter(|&n| n > 0)
}

fn parse_section_row(line: &str) -> Option<LineItem> {
    if line.contains("Repair") || line.contains("Remove") {
        return None;
    }
    let caps = SECTION_ROW.as_ref()?.captures(line)?;
    let description = &caps[2];
    if !is_upper(description) {
        return None;
    }
    let line_number = parse_line_number(&caps[1])?;
    Some(LineItem::section(line_number, description))
}

fn parse_operation_row(line: &str) -> Option<LineItem> {
    let caps = OPERATION_ROW.as_ref()?.captures(line)?;
    let line_number = parse_line_number(&caps[1])?;
    let rest = &caps[5];

    let trailing = TRAILING_HOURS.as_ref().and_then(|re| re.captures(rest));
    let (raw_description, hours) = match trailing {
        Some(h) => {
            let m = h.get(1)?;
            (&rest[..m.start()], parse_hours(m.as_str()))
        }
        None => (rest, None),
    };

    Some(LineItem {
        line_number,
        quantity: parse_quantity(&caps[3]),
        operation: caps[2].trim().to_string(),
        description: clean_description(raw_description),
        hours,
        plain_english: String::new(),
        spanish: String::new(),
    })
}

/// Drop the labor-type column (" Body " onward) and a trailing "OEM" part
/// source.
fn clean_description(raw: &str) -> String {
    let mut d = raw.trim();
    if let Some(idx) = d.find(" Body ") {
        d = &d[..idx];
    }
    if d == "OEM" {
        return String::new();
    }
    if let Some(stripped) = d.strip_suffix(" OEM") {
        d = stripped;
    }
    d.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TABLE: &str = "\
Acme Collision Center
RO Number: 4471
12 Repair 1 XX1 Looks Like A Row 1.00
Line  Qty  Operation   Part         Description          Labor  Source  Assigned
3 FRONT DOOR
14 Repair 1 DP5Z16227 LT Door Shell Body OEM 1.50
5 Remove / Replace 1 FL3Z5420 LT Belt Molding Body OEM 0.30
    continued description text
22 R&I 1 ABC Something
9 PILLARS, ROCKER & FLOOR
Subtotals
30 Repair 1 ZZ9 After Subtotals 2.00
";

    #[test]
    fn test_operation_row_with_body_and_oem() {
        let item = parse_operation_row("14 Repair 1 DP5Z16227 LT Door Shell Body OEM 1.50").unwrap();
        assert_eq!(item.line_number, 14);
        assert_eq!(item.operation, "Repair");
        assert_eq!(item.quantity, Some(1));
        assert_eq!(item.hours, Some(dec!(1.50)));
        assert_eq!(item.description, "LT Door Shell");
    }

    #[test]
    fn test_operation_with_slash_suffix() {
        let item = parse_operation_row("5 Remove / Replace 2 FL3Z5420 RT Mirror 0.40").unwrap();
        assert_eq!(item.operation, "Remove / Replace");
        assert_eq!(item.quantity, Some(2));
        assert_eq!(item.description, "RT Mirror");
        assert_eq!(item.hours, Some(dec!(0.40)));
    }

    #[test]
    fn test_operation_row_without_hours() {
        let item = parse_operation_row("7 Refinish 1 PNT01 Hood Clear Coat OEM").unwrap();
        assert_eq!(item.hours, None);
        assert_eq!(item.description, "Hood Clear Coat");
    }

    #[test]
    fn test_section_row() {
        let item = parse_section_row("9 PILLARS, ROCKER & FLOOR").unwrap();
        assert_eq!(item.line_number, 9);
        assert_eq!(item.description, "PILLARS, ROCKER & FLOOR");
        assert!(item.is_section_heading());
        assert!(parse_section_row("9 Front Door").is_none());
        assert!(parse_section_row("9 2020").is_none());
    }

    #[test]
    fn test_table_bounds_and_sorting() {
        let parsed = parse_items_detailed(TABLE);
        let numbers: Vec<u32> = parsed.items.iter().map(|i| i.line_number).collect();
        assert_eq!(numbers, vec![3, 5, 9, 14]);
        assert!(parsed.items.iter().all(|i| i.line_number != 12 && i.line_number != 30));

        let skipped: Vec<&str> = parsed.skipped_lines.iter().map(|s| s.line_text.as_str()).collect();
        assert_eq!(skipped, vec!["continued description text", "22 R&I 1 ABC Something"]);
    }

    #[test]
    fn test_heading_iff_no_operation() {
        let text = TABLE.replacen("Subtotals", "14 Repair 1 X1 LT DOOR 1.00\nSubtotals", 1);
        let items = parse_items(&text);
        assert!(items.iter().any(|i| i.description == "LT DOOR"));
        for item in items {
            assert_eq!(item.is_section_heading(), item.operation.is_empty());
        }
    }

    #[test]
    fn test_no_table_header_means_no_items() {
        assert!(parse_items("14 Repair 1 DP5Z16227 LT Door Shell Body OEM 1.50").is_empty());
        assert!(parse_items("").is_empty());
    }

    #[test]
    fn test_grand_total_stops_table() {
        let text = "Line Qty Op Assigned\n1 Repair 1 A1 Hood 1.00\nGrand Total 1.00\n2 Repair 1 A2 Roof 2.00";
        let items = parse_items(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Hood");
    }

    #[test]
    fn test_zero_line_number_is_skipped() {
        assert!(parse_section_row("0 FRONT DOOR").is_none());
        assert!(parse_operation_row("0 Repair 1 DP5Z16227 LT Door Shell 1.50").is_none());

        let text = "Line Qty Operation Part Description Assigned\n\
                    0 Repair 1 DP5Z16227 LT Door Shell 1.50\n\
                    4 Repair 1 DP5Z16227 RT Door Shell 1.00\n";
        let parsed = parse_items_detailed(text);
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].line_number, 4);
        assert_eq!(parsed.skipped_lines.len(), 1);
        assert_eq!(parsed.skipped_lines[0].reason, "line number must be positive");
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(clean_description("LT Door Shell Body OEM"), "LT Door Shell");
        assert_eq!(clean_description("Bumper Cover OEM"), "Bumper Cover");
        assert_eq!(clean_description("OEM Emblem"), "OEM Emblem");
        assert_eq!(clean_description("Body Side Molding"), "Body Side Molding");
    }
}
