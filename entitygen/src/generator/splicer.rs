//! File splicing: merge a rewritten import block and a generated body
//! into the original source without touching hand-written code.
//!
//! The file is decomposed once into sections; everything outside the
//! import block and the insertion point before the final closing brace
//! is copied verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:(?:final|abstract)\s+)*class\s+[A-Za-z_]")
        .expect("valid class declaration regex")
});

/// Decomposed view of a class source file.
#[derive(Debug, Clone)]
pub struct FileSections {
    /// Header text before the first use block (or the whole header when
    /// no use block exists)
    before_uses: String,
    /// Whether the header contained a use block to replace
    had_uses: bool,
    /// Header text after the use block, up to the class declaration
    after_uses: String,
    /// Class declaration through the last line before the final `}`
    class_body: String,
}

impl FileSections {
    /// Split source text into header, import block, and class body. Never
    /// fails; a file without a recognizable class declaration is treated
    /// as all-header.
    pub fn split(source: &str) -> Self {
        let class_start = CLASS_DECL_RE.find(source).map_or(source.len(), |m| m.start());
        let header = &source[..class_start];
        let rest = &source[class_start..];

        let (before_uses, had_uses, after_uses) = split_header(header);

        // everything after the final closing brace is dropped on merge;
        // the close itself is re-emitted as `}\n`
        let class_body = match rest.rfind('}') {
            Some(pos) => rest[..pos].to_string(),
            None => rest.to_string(),
        };

        Self {
            before_uses,
            had_uses,
            after_uses,
            class_body,
        }
    }

    /// Reassemble the file with `uses_block` in place of the original
    /// import block and `body` spliced before the final closing brace,
    /// preceded by a blank line when non-empty.
    pub fn merge(&self, uses_block: &str, body: &str) -> String {
        let mut out = String::new();
        out.push_str(&self.before_uses);

        if !uses_block.is_empty() {
            out.push_str(uses_block);
            out.push('\n');
            if !self.had_uses {
                // freshly inserted before the class declaration
                out.push('\n');
            }
        }

        out.push_str(&self.after_uses);
        out.push_str(&self.class_body);

        if !body.is_empty() {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(body);
            out.push('\n');
        }

        out.push_str("}\n");
        out
    }
}

/// Locate the first contiguous run of `use` lines in the header. Stray
/// use lines outside that run are dropped (they are re-rendered as part
/// of the block).
fn split_header(header: &str) -> (String, bool, String) {
    let mut before = String::new();
    let mut after = String::new();
    let mut seen_uses = false;
    let mut in_block = false;

    for line in header.split_inclusive('\n') {
        let trimmed = line.trim_start();
        // function/const imports are not class symbols and stay verbatim
        let is_use = trimmed.starts_with("use ")
            && !trimmed.starts_with("use function ")
            && !trimmed.starts_with("use const ");

        if is_use {
            if !seen_uses {
                seen_uses = true;
                in_block = true;
            }
            // all use lines collapse into the rendered block
            continue;
        }

        if in_block {
            in_block = false;
        }

        if seen_uses {
            after.push_str(line);
        } else {
            before.push_str(line);
        }
    }

    (before, seen_uses, after)
}
