use crate::model::HeaderRecord;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Resolve a header label as printed on a work order to its canonical field.
///
/// Steps:
/// 1. Collapse whitespace and drop a trailing colon
/// 2. Fold: lowercase, keep only letters, digits and '#'
/// 3. Look up in alias map
pub fn canonical_key(raw: &str) -> Option<&'static str> {
    let collapsed = collapse_whitespace(raw);
    let label = collapsed.trim_end_matches(':').trim_end();
    ALIASES.get(fold(label).as_str()).copied()
}

/// Map every key of `raw` onto its canonical field name.
///
/// Keys without a canonical field are dropped; when two labels resolve to
/// the same field the first one wins. Values get their whitespace collapsed.
/// Like [`canonical_key`], but for a label read off the tail of a longer
/// word run: bare aliases such as "Color" are refused there, since
/// "Interior Color" ends in one too.
pub(crate) fn canonical_suffix_key(raw: &str) -> Option<&'static str> {
    let collapsed = collapse_whitespace(raw);
    let label = collapsed.trim_end_matches(':').trim_end();
    let folded = fold(label);
    if BARE_ALIASES.contains(&folded.as_str()) {
        return None;
    }
    ALIASES.get(folded.as_str()).copied()
}

pub fn normalize_header(raw: &HeaderRecord) -> HeaderRecord {
    let mut out = HeaderRecord::new();
    for (key, value) in raw.iter() {
        match canonical_key(key) {
            Some(canonical) => {
                out.insert_first(canonical, collapse_whitespace(value));
            }
            None => debug!(label = key, "dropping unrecognized header label"),
        }
    }
    out
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '#')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Single-word aliases that only count when they are the whole label.
const BARE_ALIASES: &[&str] = &["ro", "color", "body"];

static ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    m.insert("ronumber", "RO Number");
    m.insert("ro#", "RO Number");
    m.insert("ro", "RO Number");
    m.insert("rono", "RO Number");
    m.insert("repairorder", "RO Number");
    m.insert("repairorder#", "RO Number");
    m.insert("repairordernumber", "RO Number");

    m.insert("owner", "Owner");
    m.insert("ownername", "Owner");
    m.insert("customer", "Owner");

    m.insert("year", "Year");
    m.insert("yr", "Year");

    m.insert("exteriorcolor", "Exterior Color");
    m.insert("extcolor", "Exterior Color");
    m.insert("exteriorcolour", "Exterior Color");
    m.insert("color", "Exterior Color");

    m.insert("make", "Make");

    m.insert("model", "Model");

    m.insert("mileagein", "Mileage In");
    m.insert("milesin", "Mileage In");
    m.insert("odometerin", "Mileage In");
    m.insert("mileage", "Mileage In");

    m.insert("vehiclein", "Vehicle In");
    m.insert("vehin", "Vehicle In");
    m.insert("datein", "Vehicle In");

    m.insert("vehicleout", "Vehicle Out");
    m.insert("vehout", "Vehicle Out");
    m.insert("dateout", "Vehicle Out");

    m.insert("estimator", "Estimator");

    m.insert("bodystyle", "Body Style");
    m.insert("body", "Body Style");

    m.insert("insurance", "Insurance");
    m.insert("insurancecompany", "Insurance");
    m.insert("insurer", "Insurance");

    m.insert("vin", "VIN");
    m.insert("vin#", "VIN");
    m.insert("vinnumber", "VIN");

    m.insert("jobnumber", "Job Number");
    m.insert("job#", "Job Number");
    m.insert("jobno", "Job Number");

    m
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CANONICAL_FIELDS;

    #[test]
    fn test_canonical_names_resolve_to_themselves() {
        for field in CANONICAL_FIELDS {
            assert_eq!(canonical_key(field), Some(*field), "{field}");
        }
    }

    #[test]
    fn test_spelling_variants() {
        assert_eq!(canonical_key("RO#"), Some("RO Number"));
        assert_eq!(canonical_key("RO #:"), Some("RO Number"));
        assert_eq!(canonical_key("VehicleIn"), Some("Vehicle In"));
        assert_eq!(canonical_key("Vehicle  Out:"), Some("Vehicle Out"));
        assert_eq!(canonical_key("Ext. Color"), Some("Exterior Color"));
        assert_eq!(canonical_key("MILEAGE IN"), Some("Mileage In"));
    }

    #[test]
    fn test_bare_aliases_refused_as_suffix() {
        assert_eq!(canonical_key("Color:"), Some("Exterior Color"));
        assert_eq!(canonical_suffix_key("Color:"), None);
        assert_eq!(canonical_suffix_key("Body"), None);
        assert_eq!(canonical_suffix_key("RO:"), None);
        assert_eq!(canonical_suffix_key("Exterior Color:"), Some("Exterior Color"));
        assert_eq!(canonical_suffix_key("Year:"), Some("Year"));
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(canonical_key("Estimate Date"), None);
        assert_eq!(canonical_key(""), None);
    }

    #[test]
    fn test_normalize_header_drops_unknown_and_keeps_first() {
        let raw: HeaderRecord = vec![
            ("RO#".to_string(), "  4471 ".to_string()),
            ("Printed".to_string(), "today".to_string()),
            ("RO Number".to_string(), "9999".to_string()),
            ("Owner".to_string(), "Jane   Doe".to_string()),
        ]
        .into_iter()
        .collect();
        let h = normalize_header(&raw);
        assert_eq!(h.keys().collect::<Vec<_>>(), vec!["RO Number", "Owner"]);
        assert_eq!(h.get("RO Number"), Some("4471"));
        assert_eq!(h.get("Owner"), Some("Jane Doe"));
    }
}
