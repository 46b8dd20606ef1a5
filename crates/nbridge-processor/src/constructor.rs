//! Constructor selection
//!
//! A bridge class either declares a single constructor (explicit receiver)
//! or one constructor matching a configured parameter shape.

use crate::error::BridgeErrorKind;
use crate::parser::BridgeParser;
use crate::signature::{print_method_with_types, signature};
use nbridge_types::{AnnotationUse, ConstructorId, DeclId, ElementRef, Modifiers, TypeId, TypeInfo};
use tracing::debug;

/// How constructors are matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorPolicy<'s> {
    /// Any constructor, but only one
    Single,
    /// A constructor whose leading parameters match one of the shapes
    Shapes {
        /// Required parameter sequences, most specific first
        shapes: &'s [Vec<TypeId>],
        /// Reject constructors with extra trailing parameters
        same_arity: bool,
    },
}

/// Outcome of scanning the constructors of a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorSelection {
    /// The first acceptable constructor
    pub accepted: Option<ConstructorId>,
    /// Acceptable constructors after the first one
    pub conflicts: usize,
}

impl<'s> ConstructorPolicy<'s> {
    /// Check a single constructor
    pub fn matches<T: TypeInfo + ?Sized>(&self, types: &T, constructor: ConstructorId) -> bool {
        match self {
            ConstructorPolicy::Single => true,
            ConstructorPolicy::Shapes { shapes, same_arity } => {
                let params = &types.constructor(constructor).params;
                shapes.iter().any(|shape| {
                    if params.len() < shape.len() || (*same_arity && params.len() != shape.len()) {
                        return false;
                    }
                    shape.iter().zip(params).all(|(&required, param)| {
                        if types.get(required).is_primitive() {
                            types.is_same_type(param.ty, required)
                        } else {
                            types.is_assignable(param.ty, required)
                        }
                    })
                })
            }
        }
    }

    /// Scan constructors in declaration order
    pub fn select<T: TypeInfo + ?Sized>(
        &self,
        types: &T,
        constructors: &[ConstructorId],
    ) -> ConstructorSelection {
        let mut selection = ConstructorSelection {
            accepted: None,
            conflicts: 0,
        };
        for &constructor in constructors {
            if !self.matches(types, constructor) {
                continue;
            }
            if selection.accepted.is_none() {
                selection.accepted = Some(constructor);
            } else {
                selection.conflicts += 1;
            }
        }
        selection
    }
}

impl<'a, T: TypeInfo + ?Sized> BridgeParser<'a, T> {
    /// Select the constructor of `owner`, reporting problems against `element`
    pub(crate) fn select_constructor(
        &mut self,
        policy: ConstructorPolicy<'_>,
        owner: DeclId,
        element: ElementRef,
        annotation: Option<&AnnotationUse>,
    ) -> Option<ConstructorId> {
        let types = self.types;
        let constructors = &types.decl(owner).constructors;
        let selection = policy.select(types, constructors);
        match policy {
            ConstructorPolicy::Single => {
                for _ in 0..selection.conflicts {
                    self.sink.emit(BridgeErrorKind::MultipleConstructors, element, annotation);
                }
            }
            ConstructorPolicy::Shapes { shapes, same_arity } => {
                let missing = usize::from(selection.accepted.is_none());
                for _ in 0..selection.conflicts + missing {
                    let kind = invalid_constructor(types, owner, shapes, same_arity);
                    self.sink.emit(kind, element, annotation);
                }
            }
        }
        debug!(
            owner = types.simple_name(owner),
            accepted = ?selection.accepted,
            "constructor selected"
        );
        selection.accepted
    }
}

fn invalid_constructor<T: TypeInfo + ?Sized>(
    types: &T,
    owner: DeclId,
    shapes: &[Vec<TypeId>],
    same_arity: bool,
) -> BridgeErrorKind {
    let name = types.simple_name(owner).to_string();
    let signatures = shapes
        .iter()
        .map(|shape| signature(types, shape, false, !same_arity))
        .collect();
    let first = shapes.first().map(Vec::as_slice).unwrap_or_default();
    let add = print_method_with_types(types, &Modifiers::package(), &name, types.no_type(), first);
    BridgeErrorKind::InvalidConstructor {
        signatures,
        add,
        name,
    }
}
