//! Lexical scanner that builds a [`DeclarationIndex`] from PHP source.
//!
//! The scanner is diagnostic, not validating: it classifies tokens into
//! namespace/class/method/property declaration sites in a single pass and
//! returns a best-effort partial index on malformed input rather than
//! failing. No runtime class loading, no full grammar.

mod index;
mod lexer;

pub use index::{ClassDeclarations, DeclarationIndex};
pub use lexer::{Token, tokenize};

use log::debug;

/// Scan source text for declared properties and methods, keyed by fully
/// qualified class name.
pub fn scan(source: &str) -> DeclarationIndex {
    let tokens = tokenize(source);
    let mut index = DeclarationIndex::default();

    let mut namespace = String::new();
    let mut in_namespace = false;
    let mut awaiting_class_name = false;
    let mut current_class: Option<String> = None;
    let mut prev: Option<&Token> = None;

    for (i, token) in tokens.iter().enumerate() {
        if in_namespace {
            match token {
                Token::Identifier(part) => namespace.push_str(part),
                Token::NsSeparator => namespace.push('\\'),
                _ => in_namespace = false,
            }
        }

        if awaiting_class_name {
            awaiting_class_name = false;
            if let Token::Identifier(name) = token {
                let qualified = if namespace.is_empty() {
                    name.clone()
                } else {
                    format!("{namespace}\\{name}")
                };
                index.declare_class(&qualified);
                current_class = Some(qualified);
            }
        }

        match token {
            Token::Namespace => {
                namespace.clear();
                in_namespace = true;
            }
            Token::Class => {
                // `Foo::class` constants and anonymous `new class` bodies
                // must not open a new index entry
                let constant_ref = matches!(prev, Some(Token::Punct(':')));
                let anonymous = matches!(prev, Some(Token::Identifier(w))
                    if w.eq_ignore_ascii_case("new"));
                if !constant_ref && !anonymous {
                    awaiting_class_name = true;
                }
            }
            Token::Function => {
                if let Some(class) = &current_class {
                    match tokens.get(i + 1) {
                        Some(Token::Identifier(name)) => index.record_method(class, name),
                        Some(Token::Ampersand) => {
                            if let Some(Token::Identifier(name)) = tokens.get(i + 2) {
                                index.record_method(class, name);
                            }
                        }
                        _ => {}
                    }
                }
            }
            Token::Visibility | Token::Var => {
                if let Some(class) = &current_class
                    && let Some(name) = property_after_modifier(&tokens[i + 1..])
                {
                    index.record_property(class, name);
                }
            }
            _ => {}
        }

        prev = Some(token);
    }

    debug!("scanned {} class(es) from source", index.len());
    index
}

/// Find the property name declared after a visibility or `var` keyword.
///
/// Skips modifier and type tokens (`static`, `?Foo\Bar`, union pipes); a
/// `function` keyword means the visibility belonged to a method, and
/// anything else ends the declaration without a property.
fn property_after_modifier(rest: &[Token]) -> Option<&str> {
    for token in rest {
        match token {
            Token::Variable(name) => return Some(name),
            Token::Function => return None,
            Token::Identifier(_)
            | Token::NsSeparator
            | Token::Static
            | Token::Const
            | Token::Punct('?')
            | Token::Punct('|') => continue,
            _ => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?php

declare(strict_types=1);

namespace App\Entity;

use Doctrine\Common\Collections\ArrayCollection;

class Order
{
    private $id;

    private ?string $reference;

    protected \DateTime $createdAt;

    public static $shared;

    public const STATUS_OPEN = 'open';

    public function getId()
    {
        return $this->id;
    }

    public function &refToReference()
    {
        return $this->reference;
    }

    private function helper(): void
    {
        $closure = function () {
            return Order::class;
        };
    }
}
"#;

    #[test]
    fn test_scan_properties_and_methods() {
        let index = scan(SAMPLE);
        let class = "App\\Entity\\Order";

        assert!(index.has_property(class, "id"));
        assert!(index.has_property(class, "reference"));
        assert!(index.has_property(class, "createdAt"));
        assert!(index.has_property(class, "shared"));
        assert!(!index.has_property(class, "STATUS_OPEN"));

        assert!(index.has_method(class, "getId"));
        assert!(index.has_method(class, "refToReference"));
        assert!(index.has_method(class, "helper"));
    }

    #[test]
    fn test_visibility_on_method_is_not_a_property() {
        let index = scan("<?php class A { public function b() {} }");
        assert!(index.has_method("A", "b"));
        assert_eq!(index.get("A").unwrap().properties.len(), 0);
    }

    #[test]
    fn test_class_constant_reference_is_not_a_declaration() {
        let src = "<?php namespace App; class A { public function b() { return A::class; } }";
        let index = scan(src);
        assert_eq!(index.len(), 1);
        assert!(index.has_method("App\\A", "b"));
    }

    #[test]
    fn test_multiple_classes_keep_separate_entries() {
        let src = r"<?php
namespace App;
class A { private $x; }
class B { private $y; public function getY() {} }
";
        let index = scan(src);
        assert!(index.has_property("App\\A", "x"));
        assert!(!index.has_property("App\\A", "y"));
        assert!(index.has_property("App\\B", "y"));
        assert!(index.has_method("App\\B", "getY"));
    }

    #[test]
    fn test_malformed_input_is_best_effort() {
        let index = scan("<?php class Broken { private $kept; public function ok(");
        assert!(index.has_property("Broken", "kept"));
        assert!(index.has_method("Broken", "ok"));
    }

    #[test]
    fn test_global_namespace() {
        let index = scan("<?php class Plain { var $legacy; }");
        assert!(index.has_property("Plain", "legacy"));
    }

    #[test]
    fn test_promoted_constructor_parameters_count_as_properties() {
        let src = "<?php class A { public function __construct(private string $name) {} }";
        let index = scan(src);
        assert!(index.has_method("A", "__construct"));
        assert!(index.has_property("A", "name"));
    }
}
