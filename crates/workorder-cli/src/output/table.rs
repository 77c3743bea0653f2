use std::fmt::Write;
use workorder_core::model::{LineItem, WorkOrder, HEADER_LAYOUT};

const ITEM_COLUMNS: &[&str] = &[
    "Line",
    "Qty",
    "Operation",
    "Description",
    "Hours",
    "Plain English",
    "Spanish",
];

/// Render a work order as the header box followed by the item table.
pub fn format_work_order(work_order: &WorkOrder) -> String {
    let mut out = String::new();

    match work_order.header_strategy {
        Some(strategy) => {
            let _ = writeln!(out, "=== Header (from {}) ===\n", strategy);
        }
        None => {
            let _ = writeln!(out, "=== Header (not found) ===\n");
        }
    }
    out.push_str(&format_header(work_order));

    let _ = writeln!(out, "\n=== Line items ({}) ===\n", work_order.items.len());
    if work_order.items.is_empty() {
        out.push_str("  (no line items found)\n");
    } else {
        out.push_str(&format_items(&work_order.items));
    }

    if !work_order.skipped_lines.is_empty() {
        let _ = writeln!(
            out,
            "\n  {} table line(s) skipped:",
            work_order.skipped_lines.len()
        );
        for skipped in &work_order.skipped_lines {
            let _ = writeln!(out, "    {}  ({})", skipped.line_text, skipped.reason);
        }
    }

    out
}

/// The fixed Label | Value | Label | Value header grid.
fn format_header(work_order: &WorkOrder) -> String {
    let header = &work_order.header;
    let rows: Vec<[&str; 4]> = HEADER_LAYOUT
        .iter()
        .map(|(left, right)| {
            [
                *left,
                header.display_value(left),
                *right,
                header.display_value(right),
            ]
        })
        .collect();

    let mut widths = [0usize; 4];
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let _ = writeln!(
            out,
            "  {:<w0$}  {:<w1$}  |  {:<w2$}  {}",
            format!("{}:", row[0]),
            row[1],
            format!("{}:", row[2]),
            row[3],
            w0 = widths[0] + 1,
            w1 = widths[1],
            w2 = widths[2] + 1,
        );
    }
    out
}

fn format_items(items: &[LineItem]) -> String {
    let rows: Vec<Vec<String>> = items.iter().map(item_cells).collect();

    let mut widths: Vec<usize> = ITEM_COLUMNS.iter().map(|c| c.chars().count()).collect();
    for (row, item) in rows.iter().zip(items) {
        if item.is_section_heading() {
            continue;
        }
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = ITEM_COLUMNS.iter().map(|c| c.to_string()).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);

    for (row, item) in rows.iter().zip(items) {
        if item.is_section_heading() {
            // Headings span the table rather than filling its columns.
            let _ = writeln!(
                out,
                "  {:>w$}  == {} ==  {} / {}",
                item.line_number,
                item.description,
                item.plain_english,
                item.spanish,
                w = widths[0]
            );
        } else {
            push_row(&mut out, row, &widths);
        }
    }
    out
}

fn item_cells(item: &LineItem) -> Vec<String> {
    vec![
        item.line_number.to_string(),
        item.quantity.map(|q| q.to_string()).unwrap_or_default(),
        item.operation.clone(),
        item.description.clone(),
        item.hours.map(|h| h.to_string()).unwrap_or_default(),
        item.plain_english.clone(),
        item.spanish.clone(),
    ]
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, w))| {
            // Numeric columns are right-aligned.
            if i == 0 || i == 1 || i == 4 {
                format!("{:>w$}", cell, w = *w)
            } else {
                format!("{:<w$}", cell, w = *w)
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "  {}", line.trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use workorder_core::model::{HeaderRecord, HeaderStrategy};

    fn sample() -> WorkOrder {
        let mut header = HeaderRecord::new();
        header.insert_first("RO Number", "4471");
        header.insert_first("Owner", "John Smith");

        let mut heading = LineItem::section(3, "FRONT DOOR");
        heading.plain_english = "Section: Front Door".into();
        heading.spanish = "Sección: Front Door".into();

        WorkOrder {
            header,
            header_strategy: Some(HeaderStrategy::TableGrid),
            items: vec![
                heading,
                LineItem {
                    line_number: 14,
                    quantity: Some(1),
                    operation: "Repair".into(),
                    description: "LT Door Shell".into(),
                    hours: Some("1.50".parse().unwrap()),
                    plain_english: "Repair the left door shell.".into(),
                    spanish: "Reparar estructura de la puerta izquierda.".into(),
                },
            ],
            skipped_lines: vec![],
        }
    }

    #[test]
    fn test_header_grid_follows_layout() {
        let text = format_work_order(&sample());
        assert!(text.contains("(from table grid)"));
        let ro_line = text.lines().find(|l| l.contains("RO Number:")).unwrap();
        assert!(ro_line.contains("4471"));
        assert!(ro_line.contains("Owner:"));
        assert!(ro_line.contains("John Smith"));
        // Every layout row is printed, even when empty.
        assert!(text.lines().any(|l| l.contains("VIN:") && l.contains("Job Number:")));
    }

    #[test]
    fn test_section_heading_marked() {
        let text = format_work_order(&sample());
        assert!(text.contains("== FRONT DOOR ==  Section: Front Door / Sección: Front Door"));
        let row = text.lines().find(|l| l.contains("LT Door Shell")).unwrap();
        assert!(row.contains("1.50"));
        assert!(row.contains("Reparar estructura de la puerta izquierda."));
    }

    #[test]
    fn test_empty_work_order() {
        let text = format_work_order(&WorkOrder::default());
        assert!(text.contains("(not found)"));
        assert!(text.contains("(no line items found)"));
    }
}
