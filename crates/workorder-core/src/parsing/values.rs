use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// Parse a labor-hours figure as printed in the item table.
///
/// Handles formats like:
/// - "1.50" -> 1.50
/// - "0.3" -> 0.3
/// - "" or "-" -> None
pub fn parse_hours(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    match Decimal::from_str(s) {
        Ok(hours) => Some(hours),
        Err(e) => {
            debug!(value = s, error = %e, "unreadable hours");
            None
        }
    }
}

/// Parse a part quantity. Anything that is not a plain count is absent.
pub fn parse_quantity(s: &str) -> Option<u32> {
    s.trim().parse().ok()
}
