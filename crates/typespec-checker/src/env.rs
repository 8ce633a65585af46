//! Binding table for one check pass.
//!
//! Fixtures are a single flat scope, but a name may be declared more than
//! once. Every declaration appends a new [`Binding`]; lookups see the most
//! recent one, so a redeclaration shadows the earlier binding for every
//! later statement while the earlier one stays on record.

use typespec_types::Span;

use crate::ty::Type;

/// A declared name. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub ty: Type,
    /// Index of the declaring statement.
    pub position: usize,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, ty: Type, position: usize, span: Span) {
        self.bindings.push(Binding {
            name: name.into(),
            ty,
            position,
            span,
        });
    }

    /// The binding currently in effect for `name`.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().rev().find(|b| b.name == name)
    }

    /// Every binding ever made for `name`, oldest first.
    pub fn history<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Binding> + 'a {
        self.bindings.iter().filter(move |b| b.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
