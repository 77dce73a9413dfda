//! Word-form helpers used when deriving method names from field names.
//!
//! `classify`/`camelize` mirror the casing rules used by the ORM's
//! inflector; singularization is a pluggable lexical heuristic tested
//! against a fixed dictionary, not a linguistic algorithm.

use once_cell::sync::Lazy;

/// Convert a field name to PascalCase (e.g., `created_at` -> `CreatedAt`).
pub fn classify(word: &str) -> String {
    let mut result = String::with_capacity(word.len());
    let mut upper_next = true;

    for c in word.chars() {
        if c == '_' || c == ' ' || c == '-' {
            upper_next = true;
            continue;
        }
        if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Convert a field name to camelCase (e.g., `created_at` -> `createdAt`).
pub fn camelize(word: &str) -> String {
    let classified = classify(word);
    let mut chars = classified.chars();

    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => classified,
    }
}

/// Pluralization-inverse transform for collection member names.
///
/// Implementations receive a full camelCase method name (e.g., `addTags`)
/// and singularize its trailing word (`addTag`).
pub trait Singularize {
    fn singularize(&self, word: &str) -> String;
}

/// Irregular plural forms, matched on the trailing word.
static IRREGULAR: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("children", "child"),
        ("people", "person"),
        ("men", "man"),
        ("women", "woman"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("mice", "mouse"),
        ("indices", "index"),
        ("matrices", "matrix"),
    ]
});

/// Words that are the same in singular and plural.
static UNCOUNTABLE: &[&str] = &[
    "data",
    "metadata",
    "media",
    "information",
    "equipment",
    "series",
    "species",
    "news",
];

/// Default rule-table singularizer.
///
/// Rules are tried in order on the trailing camelCase word; the first
/// match wins. Non-plural-looking words pass through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleSingularizer;

impl Singularize for RuleSingularizer {
    fn singularize(&self, word: &str) -> String {
        let split = trailing_word_start(word);
        let (prefix, last) = word.split_at(split);
        let lower = last.to_lowercase();

        if UNCOUNTABLE.contains(&lower.as_str()) {
            return word.to_string();
        }

        for (plural, singular) in IRREGULAR.iter() {
            if lower == *plural {
                return format!("{prefix}{}", match_case(singular, last));
            }
        }

        let singular = apply_suffix_rules(&lower);
        format!("{prefix}{}", match_case(&singular, last))
    }
}

fn apply_suffix_rules(word: &str) -> String {
    // "ies" -> "y" (entries -> entry), but not for short words like "ties"
    if word.len() > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }

    // sibilant plurals drop "es" (statuses -> status, boxes -> box)
    for suffix in ["ses", "xes", "zes", "ches", "shes", "oes"] {
        if word.len() > suffix.len() && word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }

    // words already ending in a sibilant or latinate singular stay put
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }

    if word.len() > 1 && word.ends_with('s') {
        return word[..word.len() - 1].to_string();
    }

    word.to_string()
}

/// Byte offset where the trailing camelCase word begins.
fn trailing_word_start(word: &str) -> usize {
    word.char_indices()
        .filter(|(_, c)| c.is_uppercase())
        .map(|(i, _)| i)
        .next_back()
        .unwrap_or(0)
}

/// Re-apply the original first-character case to a transformed word.
fn match_case(transformed: &str, original: &str) -> String {
    let upper = original.chars().next().is_some_and(|c| c.is_uppercase());
    if !upper {
        return transformed.to_string();
    }

    let mut chars = transformed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => transformed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("created_at"), "CreatedAt");
        assert_eq!(classify("name"), "Name");
        assert_eq!(classify("orderItems"), "OrderItems");
    }

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("created_at"), "createdAt");
        assert_eq!(camelize("Name"), "name");
    }

    #[test]
    fn test_singularize_dictionary() {
        let s = RuleSingularizer;
        let pairs = [
            ("tags", "tag"),
            ("entries", "entry"),
            ("statuses", "status"),
            ("boxes", "box"),
            ("branches", "branch"),
            ("wishes", "wish"),
            ("heroes", "hero"),
            ("children", "child"),
            ("people", "person"),
            ("data", "data"),
            ("series", "series"),
            ("address", "address"),
            ("status", "status"),
            ("analysis", "analysis"),
        ];
        for (plural, singular) in pairs {
            assert_eq!(s.singularize(plural), singular, "for {plural}");
        }
    }

    #[test]
    fn test_singularize_method_names() {
        let s = RuleSingularizer;
        assert_eq!(s.singularize("addTags"), "addTag");
        assert_eq!(s.singularize("removeEntries"), "removeEntry");
        assert_eq!(s.singularize("addChildren"), "addChild");
        assert_eq!(s.singularize("addStatuses"), "addStatus");
        assert_eq!(s.singularize("addData"), "addData");
    }
}
