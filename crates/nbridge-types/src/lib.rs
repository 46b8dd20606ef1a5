//! nbridge type universe
//!
//! Type representation, declarations and the queries the bridge processor
//! runs against a host type system.

#![warn(missing_docs)]

pub mod context;
pub mod decl;
pub mod error;
pub mod manifest;
pub mod provider;
pub mod subtyping;
pub mod ty;

pub use context::{CoreDecls, TypeContext, CORE_PACKAGE};
pub use decl::{
    find_annotation, AnnotationAttribute, AnnotationUse, AnnotationValue, ConstructorDecl, DeclKind,
    ElementRef, FieldDecl, MethodDecl, Modifiers, Parameter, Signature, TypeDecl, Visibility,
};
pub use error::TypeError;
pub use manifest::{ManifestError, UniverseManifest};
pub use provider::TypeInfo;
pub use subtyping::SubtypingContext;
pub use ty::{ConstructorId, DeclId, FieldId, MethodId, PrimitiveType, Type, TypeId};
