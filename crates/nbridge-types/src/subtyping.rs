//! Subtyping rules for the bridge type universe
//!
//! Implements the subtyping relation T <: U (T is a subtype of U) and the
//! weaker assignability relation used for constructor matching.

use crate::context::TypeContext;
use crate::ty::{Type, TypeId, WildcardType};

/// Context for checking subtyping relationships
#[derive(Debug, Clone, Copy)]
pub struct SubtypingContext<'a> {
    /// Type context for resolving types
    type_ctx: &'a TypeContext,
}

impl<'a> SubtypingContext<'a> {
    /// Create a new subtyping context
    pub fn new(type_ctx: &'a TypeContext) -> Self {
        SubtypingContext { type_ctx }
    }

    /// Check if two types are the same type
    ///
    /// Types are interned, so this is an id comparison.
    pub fn is_same_type(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    /// Check if `sub` is a subtype of `sup` (sub <: sup)
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        // Reflexivity: T <: T
        if sub == sup {
            return true;
        }

        let sub_ty = self.type_ctx.get(sub);
        let sup_ty = self.type_ctx.get(sup);

        match (&*sub_ty, &*sup_ty) {
            // Primitive subtyping is widening
            (Type::Primitive(p1), Type::Primitive(p2)) => p1.widens_to(*p2),
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,

            (Type::Void | Type::NoType, _) | (_, Type::Void | Type::NoType) => false,

            // T <: A & B if T <: A and T <: B
            (_, Type::Intersection(i)) => i.bounds.iter().all(|&b| self.is_subtype(sub, b)),

            // A & B <: T if A <: T or B <: T
            (Type::Intersection(i), _) => i.bounds.iter().any(|&b| self.is_subtype(b, sup)),

            // A type variable is a subtype of its bound
            (Type::TypeVar(_), _) => self.is_subtype(self.type_ctx.type_var_bound(sub), sup),
            (_, Type::TypeVar(_)) => false,

            (Type::Wildcard(w), _) => self.is_subtype(self.upper_bound(w), sup),
            (_, Type::Wildcard(_)) => false,

            // Every reference type is a subtype of the root type
            (_, Type::Declared(d)) if d.decl == self.type_ctx.core().object => true,

            // Arrays are covariant in reference components
            (Type::Array(a1), Type::Array(a2)) => {
                let c1 = self.type_ctx.get(a1.component);
                let c2 = self.type_ctx.get(a2.component);
                if c1.is_primitive() || c2.is_primitive() {
                    a1.component == a2.component
                } else {
                    self.is_subtype(a1.component, a2.component)
                }
            }

            (Type::Declared(_), Type::Declared(d2)) => {
                let Some(found) = self.type_ctx.as_super(sub, d2.decl) else {
                    return false;
                };
                // Raw supertype
                if d2.args.is_empty() {
                    return true;
                }
                let found_ty = self.type_ctx.get(found);
                let found_args = match found_ty.as_declared() {
                    Some(d) => &d.args,
                    None => return false,
                };
                if found_args.len() != d2.args.len() {
                    return false;
                }
                d2.args
                    .iter()
                    .zip(found_args)
                    .all(|(&sup_arg, &sub_arg)| self.contains(sup_arg, sub_arg))
            }

            _ => false,
        }
    }

    /// Type argument containment: `sub_arg` fits where `sup_arg` is declared
    ///
    /// `? extends T` contains every subtype of `T`, `? super T` every
    /// supertype, `?` everything; other arguments contain only themselves.
    pub fn contains(&self, sup_arg: TypeId, sub_arg: TypeId) -> bool {
        if sup_arg == sub_arg {
            return true;
        }
        let sup_ty = self.type_ctx.get(sup_arg);
        let Type::Wildcard(sup_w) = &*sup_ty else {
            return false;
        };
        let sub_ty = self.type_ctx.get(sub_arg);
        match (sup_w.extends_bound, sup_w.super_bound) {
            (None, None) => true,
            (Some(bound), _) => match &*sub_ty {
                Type::Wildcard(sub_w) if sub_w.super_bound.is_some() => {
                    bound == self.type_ctx.object_type()
                }
                Type::Wildcard(sub_w) => self.is_subtype(self.upper_bound(sub_w), bound),
                _ => self.is_subtype(sub_arg, bound),
            },
            (None, Some(bound)) => match &*sub_ty {
                Type::Wildcard(sub_w) => match sub_w.super_bound {
                    Some(sub_bound) => self.is_subtype(bound, sub_bound),
                    None => false,
                },
                _ => self.is_subtype(bound, sub_arg),
            },
        }
    }

    /// Check if a value of type `from` can be assigned to `to`
    ///
    /// Adds boxing, unboxing and unchecked raw conversion to subtyping.
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        if self.is_subtype(from, to) {
            return true;
        }
        let from_ty = self.type_ctx.get(from);
        let to_ty = self.type_ctx.get(to);

        // Boxing: int -> Integer -> Object
        if let Type::Primitive(p) = &*from_ty {
            return !to_ty.is_primitive() && self.is_subtype(self.type_ctx.boxed_type(*p), to);
        }

        // Unboxing: Integer -> int -> long
        if let Type::Primitive(target) = &*to_ty {
            return self
                .type_ctx
                .unboxed(from)
                .is_some_and(|p| p.widens_to(*target));
        }

        // Unchecked conversion from a raw type
        if let (Type::Declared(from_d), Type::Declared(_)) = (&*from_ty, &*to_ty) {
            let generic = !self.type_ctx.decl(from_d.decl).type_params.is_empty();
            if from_d.args.is_empty() && generic {
                return self.is_subtype(from, self.type_ctx.erasure(to));
            }
        }
        false
    }

    fn upper_bound(&self, wildcard: &WildcardType) -> TypeId {
        wildcard
            .extends_bound
            .unwrap_or_else(|| self.type_ctx.object_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::TypeDecl;
    use crate::ty::PrimitiveType;

    fn list_universe() -> (TypeContext, crate::ty::DeclId, crate::ty::DeclId) {
        let mut ctx = TypeContext::new();
        let e = ctx.type_variable("E");
        let collection = ctx
            .declare(TypeDecl::interface("demo", "Collection").with_type_params(vec![e]))
            .unwrap();
        let f = ctx.type_variable("F");
        let collection_of_f = ctx.declared_type(collection, vec![f]);
        let list = ctx
            .declare(
                TypeDecl::interface("demo", "List")
                    .with_type_params(vec![f])
                    .implements(collection_of_f),
            )
            .unwrap();
        (ctx, collection, list)
    }

    #[test]
    fn test_reflexive_and_object() {
        let ctx = TypeContext::new();
        let sub = SubtypingContext::new(&ctx);
        let string = ctx.string_type();
        assert!(sub.is_subtype(string, string));
        assert!(sub.is_subtype(string, ctx.object_type()));
        assert!(!sub.is_subtype(ctx.object_type(), string));
        assert!(!sub.is_subtype(ctx.primitive(PrimitiveType::Int), ctx.object_type()));
    }

    #[test]
    fn test_generic_supertype() {
        let (ctx, collection, list) = list_universe();
        let sub = SubtypingContext::new(&ctx);
        let string = ctx.string_type();
        let list_of_string = ctx.declared_type(list, vec![string]);
        let collection_of_string = ctx.declared_type(collection, vec![string]);
        let collection_of_object = ctx.declared_type(collection, vec![ctx.object_type()]);
        assert!(sub.is_subtype(list_of_string, collection_of_string));
        assert!(!sub.is_subtype(list_of_string, collection_of_object));
        assert!(sub.is_subtype(list_of_string, ctx.declared_type(collection, Vec::new())));
    }

    #[test]
    fn test_wildcard_containment() {
        let (ctx, collection, list) = list_universe();
        let sub = SubtypingContext::new(&ctx);
        let string = ctx.string_type();
        let list_of_string = ctx.declared_type(list, vec![string]);
        let extends_object = ctx.wildcard(Some(ctx.object_type()), None);
        let collection_of_extends = ctx.declared_type(collection, vec![extends_object]);
        assert!(sub.is_subtype(list_of_string, collection_of_extends));

        let super_string = ctx.wildcard(None, Some(string));
        let collection_of_super = ctx.declared_type(collection, vec![super_string]);
        let list_of_object = ctx.declared_type(list, vec![ctx.object_type()]);
        assert!(sub.is_subtype(list_of_object, collection_of_super));
    }

    #[test]
    fn test_array_covariance() {
        let ctx = TypeContext::new();
        let sub = SubtypingContext::new(&ctx);
        let strings = ctx.array_type(ctx.string_type());
        let objects = ctx.array_type(ctx.object_type());
        let ints = ctx.array_type(ctx.primitive(PrimitiveType::Int));
        let longs = ctx.array_type(ctx.primitive(PrimitiveType::Long));
        assert!(sub.is_subtype(strings, objects));
        assert!(sub.is_subtype(ints, ctx.object_type()));
        assert!(!sub.is_subtype(ints, longs));
    }

    #[test]
    fn test_assignable_boxing() {
        let ctx = TypeContext::new();
        let sub = SubtypingContext::new(&ctx);
        let int = ctx.primitive(PrimitiveType::Int);
        let long = ctx.primitive(PrimitiveType::Long);
        let integer = ctx.boxed_type(PrimitiveType::Int);
        assert!(sub.is_assignable(int, integer));
        assert!(sub.is_assignable(int, ctx.object_type()));
        assert!(sub.is_assignable(integer, long));
        assert!(!sub.is_assignable(ctx.boxed_type(PrimitiveType::Long), int));
    }

    #[test]
    fn test_raw_assignable_but_not_subtype() {
        let (ctx, _, list) = list_universe();
        let sub = SubtypingContext::new(&ctx);
        let raw = ctx.declared_type(list, Vec::new());
        let list_of_string = ctx.declared_type(list, vec![ctx.string_type()]);
        assert!(!sub.is_subtype(raw, list_of_string));
        assert!(sub.is_assignable(raw, list_of_string));
    }

    #[test]
    fn test_type_variable_bound() {
        let mut ctx = TypeContext::new();
        let t = ctx.type_variable("T");
        let string = ctx.string_type();
        ctx.set_type_var_bound(t, string).unwrap();
        let sub = SubtypingContext::new(&ctx);
        assert!(sub.is_subtype(t, string));
        assert!(!sub.is_subtype(string, t));
    }
}
