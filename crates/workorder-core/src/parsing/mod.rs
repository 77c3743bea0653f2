pub mod header;
pub mod inline;
pub mod items;
pub mod normalize;
pub mod values;

pub use header::{extract_header, extract_header_traced};
pub use inline::split_inline;
pub use items::{parse_items, parse_items_detailed, ParsedItems};

/// The item table's column heading row, e.g.
/// "Line Qty Operation Part Description ... Assigned".
pub fn is_table_header(line: &str) -> bool {
    line.starts_with("Line") && line.contains("Assigned")
}

/// First line past the end of the item table.
pub fn is_table_end(line: &str) -> bool {
    line.starts_with("Subtotals") || line.starts_with("Grand Total")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_header() {
        assert!(is_table_header("Line Qty Operation Part Description Assigned"));
        assert!(!is_table_header("Line Qty Operation"));
        assert!(!is_table_header("  Line Assigned"));
    }

    #[test]
    fn test_table_end() {
        assert!(is_table_end("Subtotals 12.50"));
        assert!(is_table_end("Grand Total $1,204.00"));
        assert!(!is_table_end("Total"));
    }
}
