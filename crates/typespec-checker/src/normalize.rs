//! Literal/union normalizer: annotation syntax → canonical [`Type`].
//!
//! Accepted annotation surface:
//!
//! | Written                          | Canonical form                   |
//! |----------------------------------|----------------------------------|
//! | `int`, `str`, `None`, ...        | `Primitive`                      |
//! | `Union[A, B]`, `A \| B`          | flattened, deduplicated `Union`  |
//! | `Optional[T]`                    | `Union{T, None}`                 |
//! | `Literal[v1, ..., vn]`           | union of `Literal(vi)`           |
//! | `Callable[[P...], R]`            | `Callable`                       |
//! | `list[T]`, `Iterable[T]`, ...    | `Container` (registry decides)   |
//!
//! `typing.`, `collections.abc.` and `builtins.` prefixes are ignored.

use thiserror::Error;
use typespec_types::ast::{Const, TypeExpr, TypeExprKind};
use typespec_types::ErrorCode;

use crate::config::CheckerConfig;
use crate::ty::{LiteralValue, PrimitiveKind, Type};

const MODULE_PREFIXES: &[&str] = &["typing.", "collections.abc.", "builtins."];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// A `Literal[...]` member that cannot be a literal type, or members of
    /// different kinds.
    #[error("invalid literal: {0}")]
    InvalidLiteralKind(String),
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("'{name}' expects {expected} type argument(s), found {found}")]
    WrongTypeArity {
        name: String,
        expected: String,
        found: usize,
    },
    #[error("malformed annotation: {0}")]
    MalformedAnnotation(String),
}

impl NormalizeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            NormalizeError::InvalidLiteralKind(_) => ErrorCode::INVALID_LITERAL_KIND,
            NormalizeError::UnknownType(_) => ErrorCode::UNKNOWN_TYPE,
            NormalizeError::WrongTypeArity { .. } => ErrorCode::WRONG_TYPE_ARITY,
            NormalizeError::MalformedAnnotation(_) => ErrorCode::MALFORMED_ANNOTATION,
        }
    }

    fn arity(name: &str, expected: &str, found: usize) -> Self {
        NormalizeError::WrongTypeArity {
            name: name.to_string(),
            expected: expected.to_string(),
            found,
        }
    }
}

/// Converts annotations to canonical types using a container registry.
pub struct Normalizer<'c> {
    config: &'c CheckerConfig,
}

impl<'c> Normalizer<'c> {
    pub fn new(config: &'c CheckerConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, ann: &TypeExpr) -> Result<Type, NormalizeError> {
        match &ann.kind {
            TypeExprKind::Name(name) => self.named(strip_module(name)),
            TypeExprKind::Subscript { base, args } => self.subscript(strip_module(base), args),
            TypeExprKind::Or(left, right) => {
                Ok(Type::union([self.normalize(left)?, self.normalize(right)?]))
            }
            TypeExprKind::Const(Const::None) => Ok(Type::NONE),
            TypeExprKind::Const(Const::Str(text)) => Err(NormalizeError::MalformedAnnotation(
                format!("string annotation {text:?} is not supported"),
            )),
            TypeExprKind::Const(c) => Err(NormalizeError::MalformedAnnotation(format!(
                "'{c}' is not a type; did you mean Literal[{c}]?"
            ))),
            TypeExprKind::List(_) => Err(NormalizeError::MalformedAnnotation(format!(
                "parameter list '{ann}' is only valid as the first argument of Callable"
            ))),
        }
    }

    fn named(&self, name: &str) -> Result<Type, NormalizeError> {
        if let Some(kind) = PrimitiveKind::from_name(name) {
            return Ok(Type::Primitive(kind));
        }
        match name {
            "Never" | "NoReturn" => Ok(Type::Never),
            "Union" | "Literal" => Err(NormalizeError::arity(name, "at least 1", 0)),
            "Optional" => Err(NormalizeError::arity(name, "1", 0)),
            "Callable" => Err(NormalizeError::arity(name, "2", 0)),
            _ if self.config.resolve(name).is_some() => Err(NormalizeError::arity(name, "1", 0)),
            _ => Err(NormalizeError::UnknownType(name.to_string())),
        }
    }

    fn subscript(&self, base: &str, args: &[TypeExpr]) -> Result<Type, NormalizeError> {
        match base {
            "Union" => {
                let members = args
                    .iter()
                    .map(|a| self.normalize(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Type::union(members))
            }
            "Optional" => match args {
                [inner] => Ok(Type::optional(self.normalize(inner)?)),
                _ => Err(NormalizeError::arity(base, "1", args.len())),
            },
            "Literal" => self.literal(args),
            "Callable" => self.callable(args),
            _ => {
                if let Some((ctor, spec)) = self.config.resolve(base) {
                    return match args {
                        [element] => Ok(Type::container(
                            ctor,
                            self.normalize(element)?,
                            spec.variance,
                        )),
                        _ => Err(NormalizeError::arity(base, "1", args.len())),
                    };
                }
                if PrimitiveKind::from_name(base).is_some() {
                    return Err(NormalizeError::MalformedAnnotation(format!(
                        "'{base}' is not generic"
                    )));
                }
                Err(NormalizeError::UnknownType(base.to_string()))
            }
        }
    }

    /// `Literal[...]`: every member shares the kind of the first non-`None`
    /// value. Nested `Literal[...]` members are spliced in.
    fn literal(&self, args: &[TypeExpr]) -> Result<Type, NormalizeError> {
        let mut values = Vec::new();
        collect_literals(args, &mut values)?;

        let mut kind: Option<PrimitiveKind> = None;
        let mut members = Vec::with_capacity(values.len());
        for value in values {
            let Some(value) = value else {
                members.push(Type::NONE);
                continue;
            };
            let found = value.base_kind();
            match kind {
                None => kind = Some(found),
                Some(expected) if expected != found => {
                    return Err(NormalizeError::InvalidLiteralKind(format!(
                        "'{value}' is {found}, but this Literal holds {expected} values"
                    )));
                }
                Some(_) => {}
            }
            members.push(Type::Literal(value));
        }
        Ok(Type::union(members))
    }

    fn callable(&self, args: &[TypeExpr]) -> Result<Type, NormalizeError> {
        let [params, ret] = args else {
            return Err(NormalizeError::arity("Callable", "2", args.len()));
        };
        let TypeExprKind::List(params) = &params.kind else {
            return Err(NormalizeError::MalformedAnnotation(format!(
                "Callable parameters must be a list such as [int, str], found '{params}'"
            )));
        };
        let params = params
            .iter()
            .map(|p| self.normalize(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Type::callable(params, self.normalize(ret)?))
    }
}

/// Normalize with a throwaway [`Normalizer`].
pub fn normalize(ann: &TypeExpr, config: &CheckerConfig) -> Result<Type, NormalizeError> {
    Normalizer::new(config).normalize(ann)
}

/// `None` entries stand for `Literal[None]`.
fn collect_literals(
    args: &[TypeExpr],
    out: &mut Vec<Option<LiteralValue>>,
) -> Result<(), NormalizeError> {
    for arg in args {
        match &arg.kind {
            TypeExprKind::Const(Const::Int(v)) => out.push(Some(LiteralValue::Int(*v))),
            TypeExprKind::Const(Const::Str(s)) => out.push(Some(LiteralValue::Str(s.clone()))),
            TypeExprKind::Const(Const::Bool(b)) => out.push(Some(LiteralValue::Bool(*b))),
            TypeExprKind::Const(Const::None) => out.push(None),
            TypeExprKind::Const(Const::Float(v)) => {
                return Err(NormalizeError::InvalidLiteralKind(format!(
                    "float value '{v:?}' cannot be a literal type"
                )));
            }
            TypeExprKind::Subscript { base, args } if strip_module(base) == "Literal" => {
                collect_literals(args, out)?;
            }
            _ => {
                return Err(NormalizeError::MalformedAnnotation(format!(
                    "Literal[...] accepts only constants, found '{arg}'"
                )));
            }
        }
    }
    Ok(())
}

fn strip_module(name: &str) -> &str {
    MODULE_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}
