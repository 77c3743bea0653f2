use crate::error::WorkOrderError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

/// English part name → Spanish noun phrase, in lookup order.
const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    ("belt molding", "moldura de la ventana"),
    ("side molding", "moldura lateral"),
    ("run channel", "canal de la ventana"),
    ("trim panel", "panel interior"),
    ("door shell", "estructura de la puerta"),
    ("door glass", "vidrio de la puerta"),
    ("mirror", "espejo lateral"),
    ("weatherstrip", "sello de la puerta"),
    ("applique", "moldura decorativa"),
    ("door assembly", "ensamble de la puerta"),
    ("aperture panel", "panel de apertura"),
];

static BUILTIN: LazyLock<Glossary> = LazyLock::new(|| Glossary {
    entries: BUILTIN_ENTRIES
        .iter()
        .map(|(english, spanish)| GlossaryEntry {
            english: english.to_string(),
            spanish: spanish.to_string(),
        })
        .collect(),
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub english: String,
    pub spanish: String,
}

/// Ordered part-name glossary. Earlier entries take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
}

impl Glossary {
    /// The glossary shipped with the crate.
    pub fn builtin() -> &'static Glossary {
        &BUILTIN
    }

    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spanish phrase of the first entry whose English key occurs anywhere
    /// in `text`. No word-boundary check: "mirror" matches "mirrors".
    pub fn lookup(&self, text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| text.contains(e.english.as_str()))
            .map(|e| e.spanish.as_str())
    }
}

impl Default for Glossary {
    fn default() -> Self {
        Glossary::builtin().clone()
    }
}

/// Load a glossary from a JSON file.
pub fn load_glossary(path: &Path) -> Result<Glossary, WorkOrderError> {
    let content = std::fs::read_to_string(path).map_err(|e| WorkOrderError::GlossaryLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_glossary(&content, path)
}

/// Parse a glossary from a JSON string.
pub fn parse_glossary(json: &str, source: &Path) -> Result<Glossary, WorkOrderError> {
    let glossary: Glossary =
        serde_json::from_str(json).map_err(|e| WorkOrderError::GlossaryLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_glossary(&glossary)?;
    Ok(glossary)
}

/// Parse a glossary from a JSON string (no file path context).
pub fn parse_glossary_str(json: &str) -> Result<Glossary, WorkOrderError> {
    let glossary: Glossary = serde_json::from_str(json).map_err(WorkOrderError::Json)?;
    validate_glossary(&glossary)?;
    Ok(glossary)
}

/// Validate that a glossary is well-formed.
///
/// Keys are matched against lower-cased descriptions, so a key with
/// upper-case letters could never match.
pub fn validate_glossary(glossary: &Glossary) -> Result<(), WorkOrderError> {
    if glossary.is_empty() {
        return Err(WorkOrderError::GlossaryInvalid(
            "glossary must not be empty".into(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in glossary.entries() {
        if entry.english.trim().is_empty() {
            return Err(WorkOrderError::GlossaryInvalid(
                "english term must not be empty".into(),
            ));
        }
        if entry.spanish.trim().is_empty() {
            return Err(WorkOrderError::GlossaryInvalid(format!(
                "term '{}' has no spanish translation",
                entry.english
            )));
        }
        if entry.english != entry.english.to_lowercase() {
            return Err(WorkOrderError::GlossaryInvalid(format!(
                "term '{}' must be lower-case",
                entry.english
            )));
        }
        if !seen.insert(entry.english.as_str()) {
            return Err(WorkOrderError::GlossaryInvalid(format!(
                "duplicate term '{}'",
                entry.english
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let g = Glossary::builtin();
        assert_eq!(g.len(), 11);
        validate_glossary(g).unwrap();
        assert_eq!(g.entries()[0].english, "belt molding");
    }

    #[test]
    fn test_lookup_first_match_in_order() {
        let g = Glossary::builtin();
        assert_eq!(g.lookup("door shell"), Some("estructura de la puerta"));
        // "door glass" precedes "mirror"; the earlier entry wins.
        assert_eq!(g.lookup("mirror door glass"), Some("vidrio de la puerta"));
        assert_eq!(g.lookup("outside mirrors"), Some("espejo lateral"));
        assert_eq!(g.lookup("hood"), None);
    }

    #[test]
    fn test_parse_custom_glossary_keeps_order() {
        let g = parse_glossary_str(
            r#"[
                {"english": "hood", "spanish": "cofre"},
                {"english": "fender", "spanish": "salpicadera"}
            ]"#,
        )
        .unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.lookup("front fender"), Some("salpicadera"));
        assert_eq!(g.lookup("door shell"), None);
    }

    #[test]
    fn test_empty_glossary_rejected() {
        let err = parse_glossary_str("[]").unwrap_err();
        assert!(matches!(err, WorkOrderError::GlossaryInvalid(_)));
    }

    #[test]
    fn test_duplicate_term_rejected() {
        let err = parse_glossary_str(
            r#"[{"english": "hood", "spanish": "cofre"}, {"english": "hood", "spanish": "capó"}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate term 'hood'"));
    }

    #[test]
    fn test_upper_case_term_rejected() {
        let err = parse_glossary_str(r#"[{"english": "Hood", "spanish": "cofre"}]"#).unwrap_err();
        assert!(err.to_string().contains("lower-case"));
    }

    #[test]
    fn test_blank_translation_rejected() {
        assert!(parse_glossary_str(r#"[{"english": "hood", "spanish": " "}]"#).is_err());
    }

    #[test]
    fn test_parse_with_source_reports_path() {
        let err = parse_glossary("not json", Path::new("terms.json")).unwrap_err();
        assert!(err.to_string().contains("terms.json"));
    }
}
