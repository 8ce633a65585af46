//! Semantic type representation.
//!
//! [`Type`] is the canonical form the checker works with. It is distinct
//! from [`typespec_types::ast::TypeExpr`], the annotation exactly as the
//! parser saw it; [`crate::normalize`] converts one into the other.
//!
//! Canonical form:
//! - a [`Type::Union`] never directly contains another union or
//!   [`Type::Never`], has no duplicate members, and has at least two members;
//! - `Optional[T]` is not a variant, it is `Union{T, None}`.

use std::fmt;

use serde::{Deserialize, Serialize};

// ══════════════════════════════════════════════════════════════════════════════
// Primitives & Literals
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Int,
    Float,
    Str,
    Bool,
    Bytes,
    /// The type of `None`.
    NoneType,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 6] = [
        PrimitiveKind::Int,
        PrimitiveKind::Float,
        PrimitiveKind::Str,
        PrimitiveKind::Bool,
        PrimitiveKind::Bytes,
        PrimitiveKind::NoneType,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Str => "str",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Bytes => "bytes",
            PrimitiveKind::NoneType => "None",
        }
    }

    /// Resolves a bare builtin name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(PrimitiveKind::Int),
            "float" => Some(PrimitiveKind::Float),
            "str" => Some(PrimitiveKind::Str),
            "bool" => Some(PrimitiveKind::Bool),
            "bytes" => Some(PrimitiveKind::Bytes),
            "None" | "NoneType" => Some(PrimitiveKind::NoneType),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value of a literal type. The base kind is derived from the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl LiteralValue {
    pub fn base_kind(&self) -> PrimitiveKind {
        match self {
            LiteralValue::Int(_) => PrimitiveKind::Int,
            LiteralValue::Str(_) => PrimitiveKind::Str,
            LiteralValue::Bool(_) => PrimitiveKind::Bool,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(v) => write!(f, "{v}"),
            LiteralValue::Str(s) => write!(f, "{s:?}"),
            LiteralValue::Bool(true) => f.write_str("True"),
            LiteralValue::Bool(false) => f.write_str("False"),
        }
    }
}

/// How a container's element type relates to the container's subtyping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variance {
    /// `C[A] <: C[B]` whenever `A <: B` (read-only containers).
    Covariant,
    /// `C[A] <: C[B]` only when `A` and `B` are mutually subtypes.
    Invariant,
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::Covariant => f.write_str("covariant"),
            Variance::Invariant => f.write_str("invariant"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Type
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    Literal(LiteralValue),
    /// Ordered, duplicate-free, flat. Build with [`Type::union`].
    Union(Vec<Type>),
    /// `ctor[element]`, e.g. `list[int]` or `Iterable[str]`.
    Container {
        ctor: String,
        element: Box<Type>,
        variance: Variance,
    },
    /// `Callable[[params...], ret]`
    Callable { params: Vec<Type>, ret: Box<Type> },
    /// The empty union. Element type of `[]`; a subtype of everything.
    Never,
}

impl Type {
    pub const INT: Type = Type::Primitive(PrimitiveKind::Int);
    pub const FLOAT: Type = Type::Primitive(PrimitiveKind::Float);
    pub const STR: Type = Type::Primitive(PrimitiveKind::Str);
    pub const BOOL: Type = Type::Primitive(PrimitiveKind::Bool);
    pub const BYTES: Type = Type::Primitive(PrimitiveKind::Bytes);
    pub const NONE: Type = Type::Primitive(PrimitiveKind::NoneType);

    pub fn literal_int(v: i64) -> Type {
        Type::Literal(LiteralValue::Int(v))
    }

    pub fn literal_str(s: impl Into<String>) -> Type {
        Type::Literal(LiteralValue::Str(s.into()))
    }

    pub fn literal_bool(b: bool) -> Type {
        Type::Literal(LiteralValue::Bool(b))
    }

    /// Build a canonical union: nested unions are flattened, `Never` members
    /// vanish, structural duplicates keep their first occurrence, and a
    /// single survivor stands for itself.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Type {
        let mut flat: Vec<Type> = Vec::new();
        for member in members {
            match member {
                Type::Union(inner) => {
                    for m in inner {
                        push_unique(&mut flat, m);
                    }
                }
                Type::Never => {}
                other => push_unique(&mut flat, other),
            }
        }
        match flat.len() {
            0 => Type::Never,
            1 => flat.pop().unwrap_or(Type::Never),
            _ => Type::Union(flat),
        }
    }

    /// `Optional[T]` is `Union{T, None}`.
    pub fn optional(inner: Type) -> Type {
        Type::union([inner, Type::NONE])
    }

    pub fn container(ctor: impl Into<String>, element: Type, variance: Variance) -> Type {
        Type::Container {
            ctor: ctor.into(),
            element: Box::new(element),
            variance,
        }
    }

    pub fn callable(params: Vec<Type>, ret: Type) -> Type {
        Type::Callable {
            params,
            ret: Box::new(ret),
        }
    }

    /// Union members, or the type itself as a one-element slice.
    pub fn members(&self) -> &[Type] {
        match self {
            Type::Union(members) => members,
            Type::Never => &[],
            other => std::slice::from_ref(other),
        }
    }

    /// Replace every literal with its base primitive.
    pub fn widen(&self) -> Type {
        match self {
            Type::Literal(v) => Type::Primitive(v.base_kind()),
            Type::Union(members) => Type::union(members.iter().map(Type::widen)),
            other => other.clone(),
        }
    }

    /// Rebuild the type through the canonical constructors.
    ///
    /// For a type that is already canonical this is the identity.
    pub fn normalized(&self) -> Type {
        match self {
            Type::Union(members) => Type::union(members.iter().map(Type::normalized)),
            Type::Container {
                ctor,
                element,
                variance,
            } => Type::container(ctor.clone(), element.normalized(), *variance),
            Type::Callable { params, ret } => Type::callable(
                params.iter().map(Type::normalized).collect(),
                ret.normalized(),
            ),
            other => other.clone(),
        }
    }

    /// The literal members of this type (the type itself when it is a literal).
    pub fn literals(&self) -> impl Iterator<Item = &LiteralValue> {
        self.members().iter().filter_map(|m| match m {
            Type::Literal(v) => Some(v),
            _ => None,
        })
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Type::Union(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Type::Callable { .. })
    }
}

fn push_unique(members: &mut Vec<Type>, ty: Type) {
    if !members.contains(&ty) {
        members.push(ty);
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Display
// ══════════════════════════════════════════════════════════════════════════════

/// Python-style rendering. Adjacent literal members of one kind are grouped
/// into a single `Literal[...]`.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => write!(f, "{kind}"),
            Type::Literal(v) => write!(f, "Literal[{v}]"),
            Type::Union(members) => {
                let mut i = 0;
                let mut first = true;
                while i < members.len() {
                    if !first {
                        f.write_str(" | ")?;
                    }
                    first = false;
                    if let Type::Literal(head) = &members[i] {
                        let kind = head.base_kind();
                        f.write_str("Literal[")?;
                        let mut sep = "";
                        while let Some(Type::Literal(v)) = members.get(i) {
                            if v.base_kind() != kind {
                                break;
                            }
                            write!(f, "{sep}{v}")?;
                            sep = ", ";
                            i += 1;
                        }
                        f.write_str("]")?;
                    } else {
                        write!(f, "{}", members[i])?;
                        i += 1;
                    }
                }
                Ok(())
            }
            Type::Container { ctor, element, .. } => write!(f, "{ctor}[{element}]"),
            Type::Callable { params, ret } => {
                f.write_str("Callable[[")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, "], {ret}]")
            }
            Type::Never => f.write_str("Never"),
        }
    }
}
