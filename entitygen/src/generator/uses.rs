//! Use-statement resolution for generated code.
//!
//! Tracks alias -> fully-qualified-symbol bindings for one file: existing
//! imports are read from the header, symbols referenced by generated code
//! are added with collision-free aliases, the import block is re-rendered,
//! and fully qualified references inside the generated body are rewritten
//! to their aliases. Existing bindings are never overwritten.

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered alias table: alias (short name) -> fully qualified symbol.
#[derive(Debug, Default, Clone)]
pub struct UseTable {
    entries: Vec<(String, String)>,
}

impl UseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        self.entries.iter().any(|(a, _)| a == alias)
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.entries.iter().any(|(_, s)| s == symbol)
    }

    /// Bind `symbol` under `alias`, suffixing the alias with a counter if
    /// it is already taken. Returns the alias actually used.
    pub fn bind(&mut self, alias: &str, symbol: &str) -> String {
        let mut candidate = alias.to_string();
        let mut counter = 1;
        while self.contains_alias(&candidate) {
            candidate = format!("{alias}_{counter}");
            counter += 1;
        }
        self.entries.push((candidate.clone(), symbol.to_string()));
        candidate
    }

    /// Append every entry of `other`, preserving the never-overwrite
    /// collision policy.
    pub fn extend(&mut self, other: UseTable) {
        for (alias, symbol) in other.entries {
            if !self.contains_symbol(&symbol) {
                self.bind(&alias, &symbol);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, s)| (a.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `use Foo\Bar;` / `use Foo\Bar as Baz;` statements in the file header.
static USE_STATEMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*use\s+([^;]+);").expect("valid use-statement regex"));

/// A fully qualified reference in generated code: leading separator, then
/// a namespaced identifier terminated by whitespace, `(`, or `;`.
static QUALIFIED_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([A-Za-z_][A-Za-z0-9_]*(?:\\[A-Za-z_][A-Za-z0-9_]*)*)").expect("valid reference regex"));

/// First class-like declaration line; only the header before it is
/// scanned for imports.
static CLASS_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:(?:final|abstract)\s+)*class\s+[A-Za-z_]")
        .expect("valid class declaration regex")
});

fn last_segment(symbol: &str) -> &str {
    symbol.rsplit('\\').next().unwrap_or(symbol)
}

/// Extract the existing import table from the header region preceding the
/// class declaration.
pub fn current_uses(source: &str) -> UseTable {
    let header_end = CLASS_DECL_RE.find(source).map_or(source.len(), |m| m.start());
    let header = &source[..header_end];

    let mut table = UseTable::new();
    for capture in USE_STATEMENT_RE.captures_iter(header) {
        let statement = capture[1].trim();

        // `use function` / `use const` imports are not class symbols
        if statement.starts_with("function ") || statement.starts_with("const ") {
            continue;
        }

        let (symbol, alias) = match split_alias(statement) {
            Some((symbol, alias)) => (symbol, alias.to_string()),
            None => (statement, last_segment(statement).to_string()),
        };
        let symbol = symbol.trim().trim_start_matches('\\');
        if !table.contains_symbol(symbol) {
            table.bind(alias.trim(), symbol);
        }
    }
    table
}

/// Split `Foo\Bar as Baz` on a case-insensitive ` as `.
fn split_alias(statement: &str) -> Option<(&str, &str)> {
    let lower = statement.to_lowercase();
    let pos = lower.find(" as ")?;
    Some((&statement[..pos], statement[pos + 4..].trim()))
}

/// Collect symbols referenced by `generated` that are missing from
/// `existing`. Returns only the additions; aliases never collide with
/// `existing` or with each other.
pub fn new_uses(existing: &UseTable, generated: &str) -> UseTable {
    let mut additions = UseTable::new();

    for capture in QUALIFIED_REF_RE.captures_iter(generated) {
        let symbol = &capture[1];
        if existing.contains_symbol(symbol) || additions.contains_symbol(symbol) {
            continue;
        }

        let mut alias = last_segment(symbol).to_string();
        let mut counter = 1;
        while existing.contains_alias(&alias) || additions.contains_alias(&alias) {
            alias = format!("{}_{counter}", last_segment(symbol));
            counter += 1;
        }
        additions.bind(&alias, symbol);
    }

    additions
}

/// Render one `use` line per entry in insertion order. Symbols living in
/// `current_namespace` need no import and are omitted; an `as` clause is
/// emitted only when the alias differs from the symbol's last segment.
pub fn render_uses_block(table: &UseTable, current_namespace: &str) -> String {
    let mut lines = Vec::new();

    for (alias, symbol) in table.iter() {
        let namespace = match symbol.rfind('\\') {
            Some(pos) => &symbol[..pos],
            None => "",
        };
        if namespace == current_namespace {
            continue;
        }

        if alias == last_segment(symbol) {
            lines.push(format!("use {symbol};"));
        } else {
            lines.push(format!("use {symbol} as {alias};"));
        }
    }

    lines.join("\n")
}

/// Replace every bound symbol (with and without leading separator) by its
/// alias. Applied to generated text only, never to existing code. Longer
/// symbols are substituted first, and a match must sit on identifier
/// boundaries so a binding never clobbers a longer name it prefixes or
/// suffixes.
pub fn rewrite_references(table: &UseTable, text: &str) -> String {
    let mut entries: Vec<(&str, &str)> = table.iter().collect();
    entries.sort_by_key(|(_, symbol)| std::cmp::Reverse(symbol.len()));

    let mut out = text.to_string();
    for (alias, symbol) in entries {
        out = replace_symbol(&out, symbol, alias);
    }
    out
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\\'
}

/// Substitute whole-symbol occurrences of `symbol` by `alias`, consuming a
/// leading separator when present. Occurrences embedded in a longer
/// identifier or qualified name are left alone.
fn replace_symbol(text: &str, symbol: &str, alias: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(found) = rest.find(symbol) {
        out.push_str(&rest[..found]);
        rest = &rest[found + symbol.len()..];

        let followed = rest.chars().next().is_some_and(is_symbol_char);
        let lead_sep = out.ends_with('\\');
        let preceded = if lead_sep {
            out[..out.len() - 1]
                .chars()
                .next_back()
                .is_some_and(is_symbol_char)
        } else {
            out.chars().next_back().is_some_and(is_symbol_char)
        };

        if followed || preceded {
            out.push_str(symbol);
        } else {
            if lead_sep {
                out.pop();
            }
            out.push_str(alias);
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r"<?php

namespace App\Entity;

use Doctrine\Common\Collections\ArrayCollection;
use App\Service\Tagger as TagService;

class Order
{
    // use of the word use in a body should not matter
}
";

    #[test]
    fn test_current_uses() {
        let table = current_uses(HEADER);
        assert_eq!(table.len(), 2);
        assert!(table.contains_symbol("Doctrine\\Common\\Collections\\ArrayCollection"));
        assert!(table.contains_alias("ArrayCollection"));
        assert!(table.contains_alias("TagService"));
    }

    #[test]
    fn test_current_uses_ignores_body_region() {
        let src = "<?php\nclass A {\n}\nuse After\\TheClass;\n";
        let table = current_uses(src);
        assert!(table.is_empty());
    }

    #[test]
    fn test_new_uses_collects_missing_symbols() {
        let existing = current_uses(HEADER);
        let body = "    public function getTags(): \\Doctrine\\Common\\Collections\\ArrayCollection\n    {\n        return new \\App\\Entity\\Tag();\n    }\n";
        let additions = new_uses(&existing, body);

        assert_eq!(additions.len(), 1);
        assert!(additions.contains_symbol("App\\Entity\\Tag"));
        assert!(additions.contains_alias("Tag"));
    }

    #[test]
    fn test_new_uses_alias_collision_gets_suffix() {
        let mut existing = UseTable::new();
        existing.bind("Tag", "Vendor\\Tag");

        let additions = new_uses(&existing, "new \\App\\Entity\\Tag();");
        assert_eq!(additions.len(), 1);
        assert!(additions.contains_alias("Tag_1"));
        assert!(!additions.contains_alias("Tag"));
    }

    #[test]
    fn test_new_uses_never_duplicates_aliases_within_additions() {
        let existing = UseTable::new();
        let body = "new \\A\\Thing(); new \\B\\Thing(); new \\A\\Thing();";
        let additions = new_uses(&existing, body);

        assert_eq!(additions.len(), 2);
        assert!(additions.contains_alias("Thing"));
        assert!(additions.contains_alias("Thing_1"));
    }

    #[test]
    fn test_render_uses_block_skips_current_namespace() {
        let mut table = UseTable::new();
        table.bind("ArrayCollection", "Doctrine\\Common\\Collections\\ArrayCollection");
        table.bind("Tag", "App\\Entity\\Tag");
        table.bind("TagService", "App\\Service\\Tagger");

        let block = render_uses_block(&table, "App\\Entity");
        assert_eq!(
            block,
            "use Doctrine\\Common\\Collections\\ArrayCollection;\nuse App\\Service\\Tagger as TagService;"
        );
    }

    #[test]
    fn test_rewrite_references() {
        let mut table = UseTable::new();
        table.bind("ArrayCollection", "Doctrine\\Common\\Collections\\ArrayCollection");

        let body = "return new \\Doctrine\\Common\\Collections\\ArrayCollection();";
        assert_eq!(
            rewrite_references(&table, body),
            "return new ArrayCollection();"
        );
    }

    #[test]
    fn test_rewrite_prefers_longer_symbols() {
        let mut table = UseTable::new();
        table.bind("Tag", "App\\Entity\\Tag");
        table.bind("TagGroup", "App\\Entity\\TagGroup");

        let body = "new \\App\\Entity\\TagGroup(); new \\App\\Entity\\Tag();";
        assert_eq!(
            rewrite_references(&table, body),
            "new TagGroup(); new Tag();"
        );
    }

    #[test]
    fn test_rewrite_respects_identifier_boundaries() {
        // suffixed alias must not leak into identifiers the symbol prefixes
        let mut table = UseTable::new();
        table.bind("DateTime_1", "DateTime");

        let body = "@param \\DateTime $at\nreturn new \\DateTimeImmutable();";
        let rewritten = rewrite_references(&table, body);
        assert!(rewritten.contains("@param DateTime_1 $at"));
        assert!(rewritten.contains("return new \\DateTimeImmutable();"));
    }

    #[test]
    fn test_rewrite_leaves_longer_qualified_names_alone() {
        let mut table = UseTable::new();
        table.bind("Tag", "App\\Entity\\Tag");

        let body = "new \\App\\Entity\\Tag(); new \\Legacy\\App\\Entity\\Tag();";
        assert_eq!(
            rewrite_references(&table, body),
            "new Tag(); new \\Legacy\\App\\Entity\\Tag();"
        );
    }

    #[test]
    fn test_roundtrip_does_not_duplicate_import() {
        // existing alias already covers the generated reference
        let mut existing = UseTable::new();
        existing.bind("Collection", "Vendor\\Collections\\Collection");

        let body = "return new \\Vendor\\Collections\\Collection();";
        let additions = new_uses(&existing, body);
        assert!(additions.is_empty());

        assert_eq!(
            rewrite_references(&existing, body),
            "return new Collection();"
        );

        existing.extend(additions);
        let block = render_uses_block(&existing, "App\\Entity");
        assert_eq!(block, "use Vendor\\Collections\\Collection;");
    }
}
