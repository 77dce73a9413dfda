//! Stub synthesis: decide which members are missing and render them.
//!
//! The synthesizer compares a [`ClassSchema`] against the declaration
//! index built from the existing file and emits fragments only for
//! accessors, mutators, and the constructor that are not already
//! declared. Schema members whose backing property is missing from the
//! file are dropped silently; drift between schema and file is expected
//! during iterative development, not an error.

use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::inflector::{Singularize, camelize, classify};
use crate::scanner::DeclarationIndex;
use crate::schema::{AssociationMapping, ClassSchema, FieldMapping, IdGenerator};

use super::stubs::{Replacements, StubKind, StubRenderer};

/// Fully qualified collection class used for to-many associations.
pub const COLLECTION_CLASS: &str = "Doctrine\\Common\\Collections\\ArrayCollection";

/// One synthesized member, already indented to class-body depth.
#[derive(Debug, Clone)]
pub struct GeneratedFragment {
    pub kind: StubKind,
    /// Field or association the fragment belongs to (empty for the constructor)
    pub member: String,
    pub code: String,
}

/// Shared synthesis configuration.
pub struct SynthesisContext<'a> {
    pub renderer: &'a dyn StubRenderer,
    pub singularizer: &'a dyn Singularize,
    /// One indentation unit
    pub indent: String,
    pub annotation_prefix: String,
}

/// Scalar type tags resolved to their PHP representation.
static TYPE_ALIAS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("datetimetz", "\\DateTime"),
        ("datetime", "\\DateTime"),
        ("date", "\\DateTime"),
        ("time", "\\DateTime"),
        ("object", "\\stdClass"),
        ("bigint", "integer"),
        ("smallint", "integer"),
        ("text", "string"),
        ("blob", "string"),
        ("decimal", "float"),
        ("json_array", "array"),
        ("simple_array", "array"),
    ])
});

/// Type tags the mapping layer knows about; anything else is treated as a
/// class reference and emitted fully qualified.
static KNOWN_TYPES: &[&str] = &[
    "array",
    "simple_array",
    "json_array",
    "object",
    "boolean",
    "integer",
    "smallint",
    "bigint",
    "string",
    "text",
    "datetime",
    "datetimetz",
    "date",
    "time",
    "decimal",
    "float",
    "binary",
    "blob",
    "guid",
];

fn resolve_type(type_tag: &str) -> &str {
    TYPE_ALIAS.get(type_tag).copied().unwrap_or(type_tag)
}

/// Normalize a resolved type to its language-level hint.
fn normalize_hint(resolved: &str) -> &str {
    match resolved {
        "boolean" => "bool",
        "integer" => "int",
        "uuid" | "guid" => "string",
        other => other,
    }
}

/// Synthesize all missing members for one class.
///
/// Emits, in order: the constructor (when needed), field accessors,
/// to-one association accessors, then to-many collection mutators.
/// Every synthesized method name is recorded back into `index` so the
/// same name is never produced twice within one run.
pub fn synthesize(
    schema: &ClassSchema,
    index: &mut DeclarationIndex,
    ctx: &SynthesisContext<'_>,
) -> Vec<GeneratedFragment> {
    let class = &schema.name;

    // Tolerate schema/file drift: members with no backing property in the
    // file are excluded from generation entirely.
    let fields: Vec<&FieldMapping> = schema
        .fields
        .iter()
        .filter(|f| {
            let declared = index.has_property(class, &f.name);
            if !declared {
                debug!("{class}: field `{}` has no declared property, skipping", f.name);
            }
            declared
        })
        .collect();

    let associations: Vec<&AssociationMapping> = schema
        .associations
        .iter()
        .filter(|a| {
            let declared = index.has_property(class, &a.name);
            if !declared {
                debug!(
                    "{class}: association `{}` has no declared property, skipping",
                    a.name
                );
            }
            declared
        })
        .collect();

    let mut fragments = Vec::new();

    synthesize_constructor(schema, &associations, index, ctx, &mut fragments);

    for field in &fields {
        let skip_setter = field.id && schema.id_generator == IdGenerator::Auto;
        if !skip_setter {
            synthesize_field_method(schema, field, StubKind::Setter, index, ctx, &mut fragments);
        }
        synthesize_field_method(schema, field, StubKind::Getter, index, ctx, &mut fragments);
    }

    for assoc in associations.iter().filter(|a| !a.kind.is_to_many()) {
        synthesize_to_one(schema, assoc, index, ctx, &mut fragments);
    }

    for assoc in associations.iter().filter(|a| a.kind.is_to_many()) {
        synthesize_to_many(schema, assoc, index, ctx, &mut fragments);
    }

    debug!("{class}: synthesized {} fragment(s)", fragments.len());
    fragments
}

fn synthesize_constructor(
    schema: &ClassSchema,
    associations: &[&AssociationMapping],
    index: &mut DeclarationIndex,
    ctx: &SynthesisContext<'_>,
    fragments: &mut Vec<GeneratedFragment>,
) {
    if index.has_method(&schema.name, "__construct") {
        return;
    }

    let collections: Vec<String> = associations
        .iter()
        .filter(|a| a.kind.is_to_many())
        .map(|a| format!("$this->{} = new \\{COLLECTION_CLASS}();", a.name))
        .collect();

    if collections.is_empty() {
        return;
    }

    index.record_method(&schema.name, "__construct");

    let replacements = Replacements {
        entity: schema.short_name().to_string(),
        indent: ctx.indent.clone(),
        annotation_prefix: ctx.annotation_prefix.clone(),
        collections,
        ..Replacements::default()
    };
    let code = ctx.renderer.render(StubKind::Constructor, &replacements);

    fragments.push(GeneratedFragment {
        kind: StubKind::Constructor,
        member: String::new(),
        code: prefix_with_indent(&code, &ctx.indent),
    });
}

fn synthesize_field_method(
    schema: &ClassSchema,
    field: &FieldMapping,
    kind: StubKind,
    index: &mut DeclarationIndex,
    ctx: &SynthesisContext<'_>,
    fragments: &mut Vec<GeneratedFragment>,
) {
    let verb = if kind == StubKind::Setter { "set" } else { "get" };
    let method_name = format!("{verb}{}", classify(&field.name));
    if !claim_method(index, &schema.name, &method_name) {
        return;
    }

    let resolved = resolve_type(&field.field_type);
    let (variable_type, method_type_hint) = if KNOWN_TYPES.contains(&field.field_type.as_str()) {
        let hint = normalize_hint(resolved);
        (hint.to_string(), format!("{hint} "))
    } else {
        qualified_types(&field.field_type)
    };

    let replacements = Replacements {
        method_name,
        field_name: field.name.clone(),
        variable_name: camelize(&field.name),
        variable_type,
        method_type_hint,
        entity: schema.short_name().to_string(),
        indent: ctx.indent.clone(),
        annotation_prefix: ctx.annotation_prefix.clone(),
        ..Replacements::default()
    };

    push_fragment(fragments, kind, &field.name, ctx, &replacements);
}

fn synthesize_to_one(
    schema: &ClassSchema,
    assoc: &AssociationMapping,
    index: &mut DeclarationIndex,
    ctx: &SynthesisContext<'_>,
    fragments: &mut Vec<GeneratedFragment>,
) {
    let (variable_type, method_type_hint) = qualified_types(&assoc.target);
    let entity = schema.short_name().to_string();

    let setter_name = format!("set{}", classify(&assoc.name));
    if claim_method(index, &schema.name, &setter_name) {
        let replacements = Replacements {
            method_name: setter_name,
            field_name: assoc.name.clone(),
            variable_name: camelize(&assoc.name),
            variable_type: variable_type.clone(),
            method_type_hint: method_type_hint.clone(),
            variable_default: if assoc.is_nullable() {
                " = null".to_string()
            } else {
                String::new()
            },
            entity: entity.clone(),
            indent: ctx.indent.clone(),
            annotation_prefix: ctx.annotation_prefix.clone(),
            ..Replacements::default()
        };
        push_fragment(fragments, StubKind::Setter, &assoc.name, ctx, &replacements);
    }

    let getter_name = format!("get{}", classify(&assoc.name));
    if claim_method(index, &schema.name, &getter_name) {
        let replacements = Replacements {
            method_name: getter_name,
            field_name: assoc.name.clone(),
            variable_name: camelize(&assoc.name),
            variable_type,
            entity,
            indent: ctx.indent.clone(),
            annotation_prefix: ctx.annotation_prefix.clone(),
            ..Replacements::default()
        };
        push_fragment(fragments, StubKind::Getter, &assoc.name, ctx, &replacements);
    }
}

fn synthesize_to_many(
    schema: &ClassSchema,
    assoc: &AssociationMapping,
    index: &mut DeclarationIndex,
    ctx: &SynthesisContext<'_>,
    fragments: &mut Vec<GeneratedFragment>,
) {
    let (variable_type, method_type_hint) = qualified_types(&assoc.target);
    let entity = schema.short_name().to_string();
    let variable_name = camelize(assoc.target_short_name());

    for (verb, kind) in [("add", StubKind::Adder), ("remove", StubKind::Remover)] {
        let plural_name = format!("{verb}{}", classify(&assoc.name));
        let method_name = ctx.singularizer.singularize(&plural_name);
        if !claim_method(index, &schema.name, &method_name) {
            continue;
        }

        let replacements = Replacements {
            method_name,
            field_name: assoc.name.clone(),
            variable_name: variable_name.clone(),
            variable_type: variable_type.clone(),
            method_type_hint: method_type_hint.clone(),
            entity: entity.clone(),
            update_owning_side: owning_side_update(schema, assoc, &variable_name, verb, ctx),
            indent: ctx.indent.clone(),
            annotation_prefix: ctx.annotation_prefix.clone(),
            ..Replacements::default()
        };
        push_fragment(fragments, kind, &assoc.name, ctx, &replacements);
    }

    let getter_name = format!("get{}", classify(&assoc.name));
    if claim_method(index, &schema.name, &getter_name) {
        let (collection_type, _) = qualified_types(COLLECTION_CLASS);
        let replacements = Replacements {
            method_name: getter_name,
            field_name: assoc.name.clone(),
            variable_name: camelize(&assoc.name),
            variable_type: collection_type,
            entity,
            indent: ctx.indent.clone(),
            annotation_prefix: ctx.annotation_prefix.clone(),
            ..Replacements::default()
        };
        push_fragment(fragments, StubKind::CollectionGetter, &assoc.name, ctx, &replacements);
    }
}

/// Statement updating the owning side, emitted inside inverse-side
/// add/remove bodies so both directions of the relation stay consistent.
fn owning_side_update(
    schema: &ClassSchema,
    assoc: &AssociationMapping,
    variable_name: &str,
    verb: &str,
    ctx: &SynthesisContext<'_>,
) -> String {
    if assoc.owning_side {
        return String::new();
    }

    let owner_property = assoc.mapped_by.as_deref().unwrap_or(schema.short_name());
    let owner = classify(owner_property);

    let (func, arg) = if assoc.kind.is_many_to_many() {
        (verb, "$this")
    } else if verb == "add" {
        ("set", "$this")
    } else {
        ("set", "null")
    };

    format!("{}${variable_name}->{func}{owner}({arg});\n", ctx.indent)
}

/// Register `method` for the class unless already declared or already
/// synthesized this run. Returns whether the caller owns the name.
fn claim_method(index: &mut DeclarationIndex, class: &str, method: &str) -> bool {
    if index.has_method(class, method) {
        return false;
    }
    index.record_method(class, method);
    true
}

fn qualified_types(class: &str) -> (String, String) {
    let fqn = format!("\\{}", class.trim_start_matches('\\'));
    let hint = format!("{fqn} ");
    (fqn, hint)
}

fn push_fragment(
    fragments: &mut Vec<GeneratedFragment>,
    kind: StubKind,
    member: &str,
    ctx: &SynthesisContext<'_>,
    replacements: &Replacements,
) {
    let code = ctx.renderer.render(kind, replacements);
    fragments.push(GeneratedFragment {
        kind,
        member: member.to_string(),
        code: prefix_with_indent(&code, &ctx.indent),
    });
}

/// Indent every non-empty line by one unit (class-body depth).
fn prefix_with_indent(code: &str, indent: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for (i, line) in code.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if !line.is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::stubs::PhpStubRenderer;
    use crate::inflector::RuleSingularizer;
    use crate::scanner::scan;
    use crate::schema::{AssociationKind, JoinColumn};

    fn ctx<'a>(renderer: &'a PhpStubRenderer, singularizer: &'a RuleSingularizer) -> SynthesisContext<'a> {
        SynthesisContext {
            renderer,
            singularizer,
            indent: "    ".to_string(),
            annotation_prefix: String::new(),
        }
    }

    fn sample_schema() -> ClassSchema {
        let mut schema = ClassSchema::new("App\\Entity\\Post", "Post.php");
        let mut id = FieldMapping::new("id", "integer");
        id.id = true;
        schema.fields.push(id);
        let mut name = FieldMapping::new("name", "string");
        name.nullable = true;
        schema.fields.push(name);
        schema.associations.push(AssociationMapping::new(
            "tags",
            "App\\Entity\\Tag",
            AssociationKind::ManyToMany,
        ));
        schema
    }

    fn sample_source() -> &'static str {
        r"<?php
namespace App\Entity;

class Post
{
    private $id;
    private $name;
    private $tags;
}
"
    }

    #[test]
    fn test_example_generation_order() {
        let schema = sample_schema();
        let mut index = scan(sample_source());
        let renderer = PhpStubRenderer;
        let singularizer = RuleSingularizer;
        let fragments = synthesize(&schema, &mut index, &ctx(&renderer, &singularizer));

        let names: Vec<(StubKind, &str)> =
            fragments.iter().map(|f| (f.kind, f.member.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (StubKind::Constructor, ""),
                (StubKind::Getter, "id"),
                (StubKind::Setter, "name"),
                (StubKind::Getter, "name"),
                (StubKind::Adder, "tags"),
                (StubKind::Remover, "tags"),
                (StubKind::CollectionGetter, "tags"),
            ]
        );

        let all = fragments.iter().map(|f| f.code.as_str()).collect::<Vec<_>>().join("\n");
        assert!(all.contains("public function getId()"));
        assert!(!all.contains("public function setId("));
        assert!(all.contains("public function addTag("));
        assert!(all.contains("public function removeTag("));
        assert!(all.contains("public function getTags()"));
        assert!(all.contains("$this->tags = new \\Doctrine\\Common\\Collections\\ArrayCollection();"));
    }

    #[test]
    fn test_id_setter_generated_without_auto_strategy() {
        let mut schema = sample_schema();
        schema.id_generator = IdGenerator::None;
        let mut index = scan(sample_source());
        let renderer = PhpStubRenderer;
        let singularizer = RuleSingularizer;
        let fragments = synthesize(&schema, &mut index, &ctx(&renderer, &singularizer));
        assert!(fragments
            .iter()
            .any(|f| f.kind == StubKind::Setter && f.member == "id"));
    }

    #[test]
    fn test_constructor_guard() {
        let schema = sample_schema();
        let src = r"<?php
namespace App\Entity;

class Post
{
    private $id;
    private $name;
    private $tags;

    public function __construct()
    {
        $this->tags = [];
    }
}
";
        let mut index = scan(src);
        let renderer = PhpStubRenderer;
        let singularizer = RuleSingularizer;
        let fragments = synthesize(&schema, &mut index, &ctx(&renderer, &singularizer));
        assert!(!fragments.iter().any(|f| f.kind == StubKind::Constructor));
    }

    #[test]
    fn test_declared_methods_are_not_regenerated() {
        let schema = sample_schema();
        let src = r"<?php
namespace App\Entity;

class Post
{
    private $id;
    private $name;
    private $tags;

    public function getName()
    {
        return strtoupper($this->name);
    }
}
";
        let mut index = scan(src);
        let renderer = PhpStubRenderer;
        let singularizer = RuleSingularizer;
        let fragments = synthesize(&schema, &mut index, &ctx(&renderer, &singularizer));
        assert!(!fragments
            .iter()
            .any(|f| f.kind == StubKind::Getter && f.member == "name"));
        assert!(fragments
            .iter()
            .any(|f| f.kind == StubKind::Setter && f.member == "name"));
    }

    #[test]
    fn test_undeclared_schema_member_is_dropped_silently() {
        let mut schema = sample_schema();
        schema.fields.push(FieldMapping::new("phantom", "string"));
        let mut index = scan(sample_source());
        let renderer = PhpStubRenderer;
        let singularizer = RuleSingularizer;
        let fragments = synthesize(&schema, &mut index, &ctx(&renderer, &singularizer));
        assert!(!fragments.iter().any(|f| f.member == "phantom"));
    }

    #[test]
    fn test_inverse_side_one_to_many_updates_owner_via_setter() {
        let mut schema = ClassSchema::new("App\\Entity\\Order", "Order.php");
        let mut assoc =
            AssociationMapping::new("items", "App\\Entity\\Item", AssociationKind::OneToMany);
        assoc.owning_side = false;
        assoc.mapped_by = Some("order".to_string());
        schema.associations.push(assoc);

        let src = "<?php namespace App\\Entity; class Order { private $items; }";
        let mut index = scan(src);
        let renderer = PhpStubRenderer;
        let singularizer = RuleSingularizer;
        let fragments = synthesize(&schema, &mut index, &ctx(&renderer, &singularizer));

        let adder = fragments.iter().find(|f| f.kind == StubKind::Adder).unwrap();
        assert!(adder.code.contains("$item->setOrder($this);"));

        let remover = fragments.iter().find(|f| f.kind == StubKind::Remover).unwrap();
        assert!(remover.code.contains("$item->setOrder(null);"));
    }

    #[test]
    fn test_inverse_side_many_to_many_updates_owner_via_add_remove() {
        let mut schema = ClassSchema::new("App\\Entity\\Order", "Order.php");
        let mut assoc =
            AssociationMapping::new("tags", "App\\Entity\\Tag", AssociationKind::ManyToMany);
        assoc.owning_side = false;
        schema.associations.push(assoc);

        let src = "<?php namespace App\\Entity; class Order { private $tags; }";
        let mut index = scan(src);
        let renderer = PhpStubRenderer;
        let singularizer = RuleSingularizer;
        let fragments = synthesize(&schema, &mut index, &ctx(&renderer, &singularizer));

        let adder = fragments.iter().find(|f| f.kind == StubKind::Adder).unwrap();
        assert!(adder.code.contains("$tag->addOrder($this);"));

        let remover = fragments.iter().find(|f| f.kind == StubKind::Remover).unwrap();
        assert!(remover.code.contains("$tag->removeOrder($this);"));
    }

    #[test]
    fn test_to_one_nullable_setter_default() {
        let mut schema = ClassSchema::new("App\\Entity\\Order", "Order.php");
        schema.associations.push(AssociationMapping::new(
            "owner",
            "App\\Entity\\User",
            AssociationKind::ManyToOne,
        ));
        let mut required =
            AssociationMapping::new("shop", "App\\Entity\\Shop", AssociationKind::ManyToOne);
        required.join_columns.push(JoinColumn { nullable: false });
        schema.associations.push(required);

        let src = "<?php namespace App\\Entity; class Order { private $owner; private $shop; }";
        let mut index = scan(src);
        let renderer = PhpStubRenderer;
        let singularizer = RuleSingularizer;
        let fragments = synthesize(&schema, &mut index, &ctx(&renderer, &singularizer));

        let all = fragments.iter().map(|f| f.code.as_str()).collect::<Vec<_>>().join("\n");
        assert!(all.contains("public function setOwner(\\App\\Entity\\User $owner = null)"));
        assert!(all.contains("public function setShop(\\App\\Entity\\Shop $shop)"));
    }

    #[test]
    fn test_scalar_type_aliases() {
        let mut schema = ClassSchema::new("App\\Entity\\Post", "Post.php");
        schema.fields.push(FieldMapping::new("createdAt", "datetime"));
        schema.fields.push(FieldMapping::new("views", "bigint"));
        schema.fields.push(FieldMapping::new("active", "boolean"));

        let src =
            "<?php namespace App\\Entity; class Post { private $createdAt; private $views; private $active; }";
        let mut index = scan(src);
        let renderer = PhpStubRenderer;
        let singularizer = RuleSingularizer;
        let fragments = synthesize(&schema, &mut index, &ctx(&renderer, &singularizer));

        let all = fragments.iter().map(|f| f.code.as_str()).collect::<Vec<_>>().join("\n");
        assert!(all.contains("public function setCreatedAt(\\DateTime $createdAt)"));
        assert!(all.contains("public function setViews(int $views)"));
        assert!(all.contains("public function setActive(bool $active)"));
    }
}
