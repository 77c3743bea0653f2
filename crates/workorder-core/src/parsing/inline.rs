use crate::extraction::Token;
use crate::parsing::normalize::{canonical_key, canonical_suffix_key};

/// Longest label, in words, that is matched against the alias table.
const MAX_LABEL_WORDS: usize = 3;

/// Whether a label may take non-bold tokens as its value when no bold
/// tokens follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlainValues {
    Allow,
    Deny,
}

/// A token stream split into its leading value and embedded label/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineSplit {
    pub main_value: String,
    pub pairs: Vec<(String, String)>,
}

/// Split a left-to-right token stream into a main value plus any embedded
/// `Label: value` pairs, e.g. a name cell that also carries "Year: 2020".
///
/// A run of non-bold tokens ending in a ":"-terminated token is a label and
/// the bold tokens right after it are its value; without bold tokens the
/// value is the plain text up to the next label. Bold tokens before the
/// first label form the main value, or every token before it when nothing
/// in the stream is bold. A label naming no known field still ends the
/// value before it but yields no pair.
pub fn split_inline(tokens: &[&Token]) -> InlineSplit {
    scan(tokens, PlainValues::Allow)
}

pub(crate) fn scan(tokens: &[&Token], plain: PlainValues) -> InlineSplit {
    let any_bold = tokens.iter().any(|t| t.is_bold());
    let labels = find_labels(tokens, any_bold);

    let leading_end = labels.first().map_or(tokens.len(), |l| l.start);
    let leading = &tokens[..leading_end];
    let main_value = if any_bold {
        join(leading.iter().filter(|t| t.is_bold()))
    } else {
        join(leading.iter())
    };

    let mut pairs = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        let region_end = labels.get(i + 1).map_or(tokens.len(), |next| next.start);
        let region = &tokens[label.end + 1..region_end];

        let bold_len = region.iter().take_while(|t| t.is_bold()).count();
        let value = if bold_len > 0 {
            join(region[..bold_len].iter())
        } else if plain == PlainValues::Allow {
            join(region.iter())
        } else {
            String::new()
        };

        if !label.known {
            continue;
        }
        let name = join(tokens[label.start..=label.end].iter());
        let name = name.trim_end_matches(':').trim_end();
        if !name.is_empty() && !value.is_empty() {
            pairs.push((name.to_string(), value));
        }
    }

    InlineSplit { main_value, pairs }
}

#[derive(Debug, Clone, Copy)]
struct LabelSpan {
    start: usize,
    /// Index of the ":"-terminated token.
    end: usize,
    /// Whether the label resolved to a canonical field.
    known: bool,
}

fn find_labels(tokens: &[&Token], any_bold: bool) -> Vec<LabelSpan> {
    let mut labels = Vec::new();
    let mut run_start = 0;

    for (i, token) in tokens.iter().enumerate() {
        if token.is_bold() {
            run_start = i + 1;
            continue;
        }
        if token.text.ends_with(':') {
            let (start, known) = label_start(tokens, run_start, i, any_bold);
            labels.push(LabelSpan {
                start,
                end: i,
                known,
            });
            run_start = i + 1;
        }
    }

    labels
}

/// Where a label ending at `end` begins within the non-bold run starting at
/// `run_start`, and whether it names a known field: the longest suffix that
/// resolves, otherwise the whole run when bold tokens delimit it, otherwise
/// just the colon token.
fn label_start(tokens: &[&Token], run_start: usize, end: usize, any_bold: bool) -> (usize, bool) {
    let earliest = run_start.max((end + 1).saturating_sub(MAX_LABEL_WORDS));
    for start in earliest..=end {
        let label = join(tokens[start..=end].iter());
        let resolved = if start == run_start {
            canonical_key(&label)
        } else {
            canonical_suffix_key(&label)
        };
        if resolved.is_some() {
            return (start, true);
        }
    }
    if any_bold {
        (run_start, false)
    } else {
        (end, false)
    }
}

fn join<'a: 'b, 'b, I>(tokens: I) -> String
where
    I: Iterator<Item = &'b &'a Token>,
{
    tokens
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
