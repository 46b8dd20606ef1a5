//! Runtime marshaller registry
//!
//! Generated code looks marshallers up by the value type and the retained
//! marshaller annotations of a position. Registrations keyed by annotation
//! are ordered so that a subtype registration shadows its supertypes.

use crate::well_known::WellKnownTypes;
use nbridge_types::{AnnotationUse, DeclId, TypeId, TypeInfo};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Registry failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("The {annotation} in not a valid marshaller annotation. The marshaller annotation must be annotated by the {meta} meta-annotation.")]
    InvalidAnnotation { annotation: String, meta: String },

    #[error("Marshalling of {ty} is not supported")]
    Unsupported { ty: String },
}

/// Marshallers by type and by marshaller annotation
#[derive(Debug, Clone)]
pub struct MarshallerRegistry<M> {
    by_type: FxHashMap<TypeId, M>,
    by_annotation: FxHashMap<DeclId, Vec<(TypeId, M)>>,
}

impl<M> Default for MarshallerRegistry<M> {
    fn default() -> Self {
        MarshallerRegistry {
            by_type: FxHashMap::default(),
            by_annotation: FxHashMap::default(),
        }
    }
}

impl<M> MarshallerRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a marshaller for an exact type, replacing any previous one
    pub fn register(&mut self, ty: TypeId, marshaller: M) {
        self.by_type.insert(ty, marshaller);
    }

    /// Register a marshaller for a raw type under a marshaller annotation
    pub fn register_annotated<T: TypeInfo + ?Sized>(
        &mut self,
        types: &T,
        known: &WellKnownTypes,
        ty: TypeId,
        annotation: DeclId,
        marshaller: M,
    ) -> Result<(), RegistryError> {
        verify_annotation(types, known, annotation)?;
        let entries = self.by_annotation.entry(annotation).or_default();
        let position = entries
            .iter()
            .position(|(registered, _)| types.is_assignable(ty, *registered));
        match position {
            Some(index) => entries.insert(index, (ty, marshaller)),
            None => entries.push((ty, marshaller)),
        }
        Ok(())
    }

    /// Find the marshaller for a type and its marshaller annotations
    ///
    /// Each annotation is tried in order against its registrations, then the
    /// exact type.
    pub fn lookup<T: TypeInfo + ?Sized>(
        &self,
        types: &T,
        known: &WellKnownTypes,
        ty: TypeId,
        annotations: &[AnnotationUse],
    ) -> Result<&M, RegistryError> {
        let raw = types.erasure(ty);
        for annotation in annotations {
            verify_annotation(types, known, annotation.annotation)?;
            let found = self.by_annotation.get(&annotation.annotation).and_then(|entries| {
                entries
                    .iter()
                    .find(|(registered, _)| types.is_assignable(raw, *registered))
                    .map(|(_, marshaller)| marshaller)
            });
            if let Some(marshaller) = found {
                return Ok(marshaller);
            }
        }
        self.by_type.get(&ty).ok_or_else(|| RegistryError::Unsupported {
            ty: types.type_name(ty),
        })
    }
}

fn verify_annotation<T: TypeInfo + ?Sized>(
    types: &T,
    known: &WellKnownTypes,
    annotation: DeclId,
) -> Result<(), RegistryError> {
    if types.decl(annotation).annotation_of(known.marshaller_annotation).is_some() {
        return Ok(());
    }
    Err(RegistryError::InvalidAnnotation {
        annotation: types.simple_name(annotation).to_string(),
        meta: types.simple_name(known.marshaller_annotation).to_string(),
    })
}
