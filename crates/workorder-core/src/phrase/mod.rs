pub mod glossary;

use crate::model::{is_section_heading, LineItem};
use glossary::Glossary;

/// What an operation column asks the technician to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Repair,
    RemoveReplace,
    RemoveReinstall,
    Other,
}

impl Action {
    fn of(operation: &str) -> Action {
        let op = operation.to_lowercase();
        if op.contains("repair") {
            Action::Repair
        } else if op.contains("remove") && op.contains("replace") {
            Action::RemoveReplace
        } else if op.contains("remove") && op.contains("install") {
            Action::RemoveReinstall
        } else {
            Action::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    /// Split a leading "LT "/"RT " marker off a description.
    fn strip(description: &str) -> (Option<Side>, &str) {
        if let Some(rest) = description.strip_prefix("LT ") {
            (Some(Side::Left), rest)
        } else if let Some(rest) = description.strip_prefix("RT ") {
            (Some(Side::Right), rest)
        } else {
            (None, description)
        }
    }

    /// Spanish adjective agreeing with `noun`. Gender is guessed from the
    /// head nouns this glossary uses; other nouns read as masculine.
    fn spanish_adjective(self, noun: &str) -> String {
        let stem = match self {
            Side::Left => "izquierd",
            Side::Right => "derech",
        };
        let feminine = ["puerta", "moldura", "estructura"]
            .iter()
            .any(|w| noun.contains(w));
        format!("{}{}", stem, if feminine { "a" } else { "o" })
    }
}

/// English instruction for one line item.
pub fn plain_english(operation: &str, description: &str) -> String {
    if is_section_heading(operation, description) {
        return format!("Section: {}", titlecase(description));
    }

    let d = description
        .replace("LT ", "Left ")
        .replace("RT ", "Right ")
        .replace("w'strip", "weatherstrip")
        .replace("assy", "assembly");

    match Action::of(operation) {
        Action::Repair => format!("Repair the {}.", d.to_lowercase()),
        Action::RemoveReplace => format!("Remove and replace the {}.", d.to_lowercase()),
        Action::RemoveReinstall => format!("Remove and reinstall the {}.", d.to_lowercase()),
        Action::Other => d,
    }
}

/// Spanish instruction for one line item, using the built-in glossary.
pub fn spanish(operation: &str, description: &str) -> String {
    spanish_with(Glossary::builtin(), operation, description)
}

/// Spanish instruction for one line item.
///
/// Part names come from the first glossary entry found in the description;
/// unknown parts keep the English description.
pub fn spanish_with(glossary: &Glossary, operation: &str, description: &str) -> String {
    if is_section_heading(operation, description) {
        return format!("Sección: {}", titlecase(description).replace(" & ", " y "));
    }

    let (side, rest) = Side::strip(description);
    let d_low = rest
        .to_lowercase()
        .replace("w'strip", "weatherstrip")
        .replace("assy", "door assembly");

    let mut base = glossary.lookup(&d_low).unwrap_or(rest).to_string();
    if let Some(side) = side {
        let adjective = side.spanish_adjective(&base);
        base = format!("{} {}", base, adjective);
    }

    match Action::of(operation) {
        Action::Repair => format!("Reparar {}.", base),
        Action::RemoveReplace => format!("Retirar y reemplazar {}.", base),
        Action::RemoveReinstall => format!("Retirar y reinstalar {}.", base),
        Action::Other => base,
    }
}

/// Fill in both phrases of `item`.
pub fn translate_item(item: &mut LineItem, glossary: &Glossary) {
    item.plain_english = plain_english(&item.operation, &item.description);
    item.spanish = spanish_with(glossary, &item.operation, &item.description);
}

/// Title-case each word: a cased letter following another cased letter is
/// lowered, any other cased letter is raised. Apostrophes and digits break
/// words, so "DON'T" becomes "Don'T".
pub fn titlecase(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        let cased = c.is_uppercase() || c.is_lowercase();
        if cased && prev_cased {
            out.extend(c.to_lowercase());
        } else if cased {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_cased = cased;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_replace_left_belt_molding() {
        assert_eq!(
            plain_english("Remove / Replace", "LT Belt Molding"),
            "Remove and replace the left belt molding."
        );
        assert_eq!(
            spanish("Remove / Replace", "LT Belt Molding"),
            "Retirar y reemplazar moldura de la ventana izquierda."
        );
    }

    #[test]
    fn test_section_heading_phrases() {
        assert_eq!(
            plain_english("", "PILLARS, ROCKER & FLOOR"),
            "Section: Pillars, Rocker & Floor"
        );
        assert_eq!(
            spanish("", "PILLARS, ROCKER & FLOOR"),
            "Sección: Pillars, Rocker y Floor"
        );
    }

    #[test]
    fn test_repair_door_shell() {
        assert_eq!(plain_english("Repair", "LT Door Shell"), "Repair the left door shell.");
        assert_eq!(
            spanish("Repair", "LT Door Shell"),
            "Reparar estructura de la puerta izquierda."
        );
    }

    #[test]
    fn test_masculine_side_agreement() {
        assert_eq!(
            spanish("Remove / Install", "RT Mirror"),
            "Retirar y reinstalar espejo lateral derecho."
        );
        assert_eq!(
            plain_english("Remove / Install", "RT Mirror"),
            "Remove and reinstall the right mirror."
        );
    }

    #[test]
    fn test_abbreviations_expand() {
        assert_eq!(
            plain_english("R&I", "RT Front Door w'strip"),
            "Right Front Door weatherstrip"
        );
        assert_eq!(spanish("R&I", "RT Front Door w'strip"), "sello de la puerta derecha");
        assert_eq!(
            spanish("Repair", "Front door assy"),
            "Reparar ensamble de la puerta."
        );
    }

    #[test]
    fn test_unknown_part_keeps_description() {
        assert_eq!(spanish("Refinish", "Hood Panel"), "Hood Panel");
        assert_eq!(spanish("Repair", "LT Quarter Panel"), "Reparar Quarter Panel izquierdo.");
        assert_eq!(plain_english("Refinish", "Hood Panel"), "Hood Panel");
    }

    #[test]
    fn test_substitutions_are_not_word_bounded() {
        // "assy" inside "chassy" still expands.
        assert_eq!(plain_english("Blend", "chassy"), "chassembly");
    }

    #[test]
    fn test_upper_case_operation_row_is_not_a_heading() {
        // Non-empty operation never yields a section phrase.
        assert_eq!(plain_english("Repair", "HOOD"), "Repair the hood.");
    }

    #[test]
    fn test_custom_glossary() {
        let g = glossary::parse_glossary_str(r#"[{"english": "hood", "spanish": "cofre"}]"#).unwrap();
        assert_eq!(spanish_with(&g, "Repair", "Hood"), "Reparar cofre.");
        assert_eq!(spanish_with(&g, "Repair", "LT Mirror"), "Reparar Mirror izquierdo.");
    }

    #[test]
    fn test_translate_item() {
        let mut item = LineItem::section(3, "FRONT DOOR");
        translate_item(&mut item, Glossary::builtin());
        assert_eq!(item.plain_english, "Section: Front Door");
        assert_eq!(item.spanish, "Sección: Front Door");
    }

    #[test]
    fn test_titlecase() {
        assert_eq!(titlecase("PILLARS, ROCKER & FLOOR"), "Pillars, Rocker & Floor");
        assert_eq!(titlecase("B-PILLAR 2ND"), "B-Pillar 2Nd");
        assert_eq!(titlecase("DON'T"), "Don'T");
    }
}
