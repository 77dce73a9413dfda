//! Stub method rendering.
//!
//! Rendering is a pure function from a [`StubKind`] and a replacement set
//! to method text. The default [`PhpStubRenderer`] reproduces the classic
//! accessor skeletons; callers may plug in their own renderer.

use std::fmt::Write;

/// The kind of member being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubKind {
    Getter,
    Setter,
    Adder,
    Remover,
    CollectionGetter,
    Constructor,
}

impl StubKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Getter => "getter",
            Self::Setter => "setter",
            Self::Adder => "adder",
            Self::Remover => "remover",
            Self::CollectionGetter => "collection-getter",
            Self::Constructor => "constructor",
        }
    }
}

/// Replacement values handed to the renderer.
///
/// `update_owning_side` is a pre-indented statement block (with trailing
/// newline) inserted at the top of add/remove bodies on the inverse side
/// of a bidirectional association; empty otherwise. `annotation_prefix`
/// is passed through for renderers that emit metadata annotations; the
/// default renderer does not interpret it.
#[derive(Debug, Clone, Default)]
pub struct Replacements {
    pub method_name: String,
    pub field_name: String,
    pub variable_name: String,
    pub variable_type: String,
    pub method_type_hint: String,
    pub variable_default: String,
    pub entity: String,
    pub update_owning_side: String,
    pub indent: String,
    pub annotation_prefix: String,
    /// Collection initializer statements, used only by the constructor
    pub collections: Vec<String>,
}

/// Pure template function producing one member's text, unindented.
pub trait StubRenderer {
    fn render(&self, kind: StubKind, replacements: &Replacements) -> String;
}

/// Default renderer emitting classic PHP accessor stubs with docblocks
/// and fluent setters.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhpStubRenderer;

impl StubRenderer for PhpStubRenderer {
    fn render(&self, kind: StubKind, r: &Replacements) -> String {
        match kind {
            StubKind::Setter => render_setter(r),
            StubKind::Getter | StubKind::CollectionGetter => render_getter(r),
            StubKind::Adder => render_adder(r),
            StubKind::Remover => render_remover(r),
            StubKind::Constructor => render_constructor(r),
        }
    }
}

fn render_setter(r: &Replacements) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "/**");
    let _ = writeln!(out, " * Set {}.", r.field_name);
    let _ = writeln!(out, " *");
    let _ = writeln!(out, " * @param {} ${}", r.variable_type, r.variable_name);
    let _ = writeln!(out, " *");
    let _ = writeln!(out, " * @return {}", r.entity);
    let _ = writeln!(out, " */");
    let _ = writeln!(
        out,
        "public function {}({}${}{})",
        r.method_name, r.method_type_hint, r.variable_name, r.variable_default
    );
    let _ = writeln!(out, "{{");
    let _ = writeln!(out, "{}$this->{} = ${};", r.indent, r.field_name, r.variable_name);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}return $this;", r.indent);
    let _ = write!(out, "}}");
    out
}

fn render_getter(r: &Replacements) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "/**");
    let _ = writeln!(out, " * Get {}.", r.field_name);
    let _ = writeln!(out, " *");
    let _ = writeln!(out, " * @return {}", r.variable_type);
    let _ = writeln!(out, " */");
    let _ = writeln!(out, "public function {}()", r.method_name);
    let _ = writeln!(out, "{{");
    let _ = writeln!(out, "{}return $this->{};", r.indent, r.field_name);
    let _ = write!(out, "}}");
    out
}

fn render_adder(r: &Replacements) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "/**");
    let _ = writeln!(out, " * Add {}.", r.variable_name);
    let _ = writeln!(out, " *");
    let _ = writeln!(out, " * @param {} ${}", r.variable_type, r.variable_name);
    let _ = writeln!(out, " *");
    let _ = writeln!(out, " * @return {}", r.entity);
    let _ = writeln!(out, " */");
    let _ = writeln!(
        out,
        "public function {}({}${})",
        r.method_name, r.method_type_hint, r.variable_name
    );
    let _ = writeln!(out, "{{");
    let _ = write!(out, "{}", r.update_owning_side);
    let _ = writeln!(out, "{}$this->{}[] = ${};", r.indent, r.field_name, r.variable_name);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}return $this;", r.indent);
    let _ = write!(out, "}}");
    out
}

fn render_remover(r: &Replacements) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "/**");
    let _ = writeln!(out, " * Remove {}.", r.variable_name);
    let _ = writeln!(out, " *");
    let _ = writeln!(out, " * @param {} ${}", r.variable_type, r.variable_name);
    let _ = writeln!(out, " *");
    let _ = writeln!(out, " * @return bool TRUE if the element was removed, FALSE otherwise");
    let _ = writeln!(out, " */");
    let _ = writeln!(
        out,
        "public function {}({}${})",
        r.method_name, r.method_type_hint, r.variable_name
    );
    let _ = writeln!(out, "{{");
    let _ = write!(out, "{}", r.update_owning_side);
    let _ = writeln!(
        out,
        "{}return $this->{}->removeElement(${});",
        r.indent, r.field_name, r.variable_name
    );
    let _ = write!(out, "}}");
    out
}

fn render_constructor(r: &Replacements) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "/**");
    let _ = writeln!(out, " * Constructor.");
    let _ = writeln!(out, " */");
    let _ = writeln!(out, "public function __construct()");
    let _ = writeln!(out, "{{");
    for statement in &r.collections {
        let _ = writeln!(out, "{}{statement}", r.indent);
    }
    let _ = write!(out, "}}");
    out
}
