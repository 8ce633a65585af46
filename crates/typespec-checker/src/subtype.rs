//! The subtype relation `A <: B`.
//!
//! Rules, first match wins:
//!
//! 1. `A == B` (structural).
//! 2. `Never <: B`.
//! 3. `Literal(v, k) <: Primitive(k)`.
//! 4. `Union{a..} <: B` iff every arm `ai <: B`.
//! 5. `A <: Union{b..}` iff some `A <: bj`.
//! 6. `ca[ea] <: cb[eb]` iff `ca` conforms to `cb` and the elements satisfy
//!    `cb`'s variance (covariant: `ea <: eb`; invariant: both directions).
//! 7. `Callable[[pa..], ra] <: Callable[[pb..], rb]` iff the arities match,
//!    every `pb_i <: pa_i` and `ra <: rb`.
//! 8. Otherwise false.
//!
//! Union-to-union goes through rule 4 first, so each source arm is matched
//! against the whole target with rule 5.

use tracing::trace;

use crate::config::CheckerConfig;
use crate::ty::{Type, Variance};

/// Decides `A <: B` against a container registry. Pure and total.
#[derive(Clone, Copy)]
pub struct SubtypeRelation<'c> {
    config: &'c CheckerConfig,
}

impl<'c> SubtypeRelation<'c> {
    pub fn new(config: &'c CheckerConfig) -> Self {
        Self { config }
    }

    pub fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        let result = self.decide(sub, sup);
        trace!(%sub, %sup, result, "subtype");
        result
    }

    fn decide(&self, sub: &Type, sup: &Type) -> bool {
        if sub == sup || matches!(sub, Type::Never) {
            return true;
        }
        match (sub, sup) {
            (Type::Literal(v), Type::Primitive(k)) if v.base_kind() == *k => true,
            (Type::Union(arms), _) => arms.iter().all(|arm| self.is_subtype(arm, sup)),
            (_, Type::Union(arms)) => arms.iter().any(|arm| self.is_subtype(sub, arm)),
            (
                Type::Container {
                    ctor: ca,
                    element: ea,
                    ..
                },
                Type::Container {
                    ctor: cb,
                    element: eb,
                    variance,
                },
            ) => {
                self.config.conforms(ca, cb)
                    && match variance {
                        Variance::Covariant => self.is_subtype(ea, eb),
                        Variance::Invariant => self.is_subtype(ea, eb) && self.is_subtype(eb, ea),
                    }
            }
            (
                Type::Callable {
                    params: pa,
                    ret: ra,
                },
                Type::Callable {
                    params: pb,
                    ret: rb,
                },
            ) => {
                pa.len() == pb.len()
                    && pa.iter().zip(pb).all(|(a, b)| self.is_subtype(b, a))
                    && self.is_subtype(ra, rb)
            }
            _ => false,
        }
    }

    /// `A` and `B` are each a subtype of the other.
    pub fn is_equivalent(&self, a: &Type, b: &Type) -> bool {
        self.is_subtype(a, b) && self.is_subtype(b, a)
    }
}

/// Decide `sub <: sup` with a throwaway [`SubtypeRelation`].
pub fn is_subtype(sub: &Type, sup: &Type, config: &CheckerConfig) -> bool {
    SubtypeRelation::new(config).is_subtype(sub, sup)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: &Type, b: &Type) -> bool {
        is_subtype(a, b, &CheckerConfig::default())
    }

    fn list(element: Type) -> Type {
        Type::container("list", element, Variance::Invariant)
    }

    fn iterable(element: Type) -> Type {
        Type::container("Iterable", element, Variance::Covariant)
    }

    fn int_or_str() -> Type {
        Type::union([Type::INT, Type::STR])
    }

    #[test]
    fn test_identity() {
        assert!(sub(&Type::INT, &Type::INT));
        assert!(sub(&list(Type::INT), &list(Type::INT)));
        assert!(!sub(&Type::INT, &Type::STR));
    }

    #[test]
    fn test_literal_to_base() {
        assert!(sub(&Type::literal_int(1), &Type::INT));
        assert!(!sub(&Type::literal_int(1), &Type::STR));
        assert!(!sub(&Type::INT, &Type::literal_int(1)));
        assert!(!sub(&Type::literal_bool(true), &Type::INT));
        assert!(!sub(&Type::literal_int(1), &Type::literal_int(2)));
    }

    #[test]
    fn test_union_source_needs_every_arm() {
        assert!(sub(&int_or_str(), &Type::union([Type::STR, Type::NONE, Type::INT])));
        assert!(!sub(&int_or_str(), &Type::INT));
        let weekdays = Type::union((1..=7).map(Type::literal_int));
        assert!(sub(&weekdays, &Type::INT));
    }

    #[test]
    fn test_union_target_needs_some_arm() {
        assert!(sub(&Type::literal_int(1), &int_or_str()));
        assert!(sub(&Type::NONE, &Type::optional(Type::INT)));
        assert!(!sub(&Type::STR, &Type::optional(Type::INT)));
        assert!(!sub(&Type::literal_int(8), &Type::union((1..=7).map(Type::literal_int))));
    }

    #[test]
    fn test_list_against_union_with_list_arm() {
        let target = Type::union([list(Type::INT), Type::STR]);
        assert!(sub(&list(Type::INT), &target));
        assert!(!sub(&Type::literal_int(1), &target));
        assert!(!sub(&list(Type::INT), &Type::STR));
    }

    #[test]
    fn test_invariant_list() {
        assert!(!sub(&list(Type::INT), &list(int_or_str())));
        assert!(!sub(&list(int_or_str()), &list(Type::INT)));
        // Same members in a different order are equivalent.
        assert!(sub(
            &list(int_or_str()),
            &list(Type::union([Type::STR, Type::INT]))
        ));
    }

    #[test]
    fn test_covariant_iterable() {
        assert!(sub(&list(Type::INT), &iterable(Type::INT)));
        assert!(sub(&list(Type::INT), &iterable(int_or_str())));
        assert!(!sub(&list(Type::STR), &iterable(Type::INT)));
        assert!(!sub(&iterable(Type::INT), &list(Type::INT)));
    }

    #[test]
    fn test_unrelated_containers() {
        let set = Type::container("set", Type::INT, Variance::Invariant);
        let seq = Type::container("Sequence", Type::INT, Variance::Covariant);
        assert!(!sub(&set, &seq));
        assert!(sub(&list(Type::INT), &seq));
    }

    #[test]
    fn test_never_is_bottom() {
        assert!(sub(&Type::Never, &Type::INT));
        assert!(sub(&list(Type::Never), &iterable(Type::STR)));
        assert!(!sub(&list(Type::Never), &list(Type::STR)));
        assert!(!sub(&Type::INT, &Type::Never));
    }

    #[test]
    fn test_callable_variance() {
        let expected = Type::callable(vec![int_or_str()], Type::NONE);
        let f = Type::callable(vec![int_or_str()], Type::NONE);
        let g = Type::callable(vec![Type::INT], Type::INT);
        assert!(sub(&f, &expected));
        assert!(!sub(&g, &expected));

        // Wider parameter, narrower return is fine.
        let wide = Type::callable(vec![int_or_str()], Type::literal_int(0));
        assert!(sub(&wide, &Type::callable(vec![Type::INT], Type::INT)));
    }

    #[test]
    fn test_callable_arity() {
        let one = Type::callable(vec![Type::INT], Type::NONE);
        let two = Type::callable(vec![Type::INT, Type::INT], Type::NONE);
        assert!(!sub(&one, &two));
        assert!(!sub(&two, &one));
    }

    #[test]
    fn test_equivalence() {
        let config = CheckerConfig::default();
        let rel = SubtypeRelation::new(&config);
        assert!(rel.is_equivalent(&int_or_str(), &Type::union([Type::STR, Type::INT])));
        assert!(!rel.is_equivalent(&Type::INT, &int_or_str()));
    }
}
