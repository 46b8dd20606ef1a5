//! Type universe errors

use thiserror::Error;

/// Errors raised while building or querying a type universe
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// Undefined type reference
    #[error("Undefined type: {name}")]
    UndefinedType {
        /// Type name that was not found
        name: String,
    },

    /// A simple name that matches several declarations
    #[error("Ambiguous type name `{name}`: candidates are {candidates}")]
    AmbiguousType {
        /// The simple name
        name: String,
        /// Comma separated qualified candidates
        candidates: String,
    },

    /// Declaration registered twice
    #[error("Duplicate declaration: {name}")]
    DuplicateDeclaration {
        /// Qualified name
        name: String,
    },

    /// Malformed type expression
    #[error("Malformed type `{text}`: {reason}")]
    MalformedType {
        /// Source text
        text: String,
        /// What went wrong
        reason: String,
    },

    /// Bound set on something that is not a type variable
    #[error("Not a type variable: {name}")]
    NotTypeVariable {
        /// Type name
        name: String,
    },

    /// Unknown modifier keyword
    #[error("Unknown modifier `{modifier}`")]
    UnknownModifier {
        /// The keyword
        modifier: String,
    },

    /// Annotation value that cannot be represented
    #[error("Invalid value for `{annotation}.{attribute}`: {reason}")]
    InvalidAnnotationValue {
        /// Annotation type name
        annotation: String,
        /// Attribute name
        attribute: String,
        /// What went wrong
        reason: String,
    },

    /// Attribute not declared by the annotation type
    #[error("Annotation `{annotation}` has no attribute `{attribute}`")]
    UnknownAttribute {
        /// Annotation type name
        annotation: String,
        /// Attribute name
        attribute: String,
    },
}
