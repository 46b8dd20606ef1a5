//! Error types for bridge processing
//!
//! [`BridgeError`] is what the resolvers report for a bridge declaration;
//! [`ConfigError`] covers building direction configurations.

use crate::config::Direction;
use nbridge_types::{AnnotationUse, ElementRef};
use std::fmt;
use thiserror::Error;

/// Where an error is reported: the offending element and the annotation
/// occurrence that triggered the check, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Offending element
    pub element: ElementRef,
    /// Triggering annotation occurrence
    pub annotation: Option<AnnotationUse>,
}

impl Origin {
    /// Origin without a triggering annotation
    pub fn element(element: ElementRef) -> Self {
        Origin {
            element,
            annotation: None,
        }
    }

    /// Origin with an optional triggering annotation
    pub fn new(element: ElementRef, annotation: Option<&AnnotationUse>) -> Self {
        Origin {
            element,
            annotation: annotation.cloned(),
        }
    }
}

/// Suggested fix attached to a missing service type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceTypeFix {
    /// Both a bridged super class and interfaces are present
    IntroduceBaseClass {
        /// Super class simple name
        superclass: String,
        /// Interface simple names
        interfaces: Vec<String>,
    },
    /// Neither a bridged super class nor an interface
    ImplementService,
    /// Several interfaces
    IntroduceInterface {
        /// Interface simple names
        interfaces: Vec<String>,
    },
    /// The declaration has no super class at all
    MissingSuperclass,
}

impl fmt::Display for ServiceTypeFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceTypeFix::IntroduceBaseClass {
                superclass,
                interfaces,
            } => write!(
                f,
                "Introduce a new bridged base class extending `{}` and implementing {} and extend it.",
                superclass,
                quoted(interfaces)
            ),
            ServiceTypeFix::ImplementService => {
                f.write_str("Implement the bridged interface or extend the bridged class.")
            }
            ServiceTypeFix::IntroduceInterface { interfaces } => write!(
                f,
                "Introduce a new bridged interface extending {} and implement it.",
                quoted(interfaces)
            ),
            ServiceTypeFix::MissingSuperclass => {
                f.write_str(
                    "Extend the bridged class or `Object` and implement the bridged interface.",
                )
            }
        }
    }
}

/// Member kind named in duplicate-marker errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A method
    Method,
    /// A field
    Field,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method => f.write_str("method"),
            MemberKind::Field => f.write_str("field"),
        }
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{}`", n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn constructor_signatures(signatures: &[String]) -> String {
    match signatures {
        [single] => format!(
            "The annotated type must have a single constructor with `{}` signature.",
            single
        ),
        _ => format!(
            "The annotated type must have a single constructor with one of the following signatures {}.",
            quoted(signatures)
        ),
    }
}

/// What went wrong with a bridge declaration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeErrorKind {
    // Structural
    /// The marker is on something other than a class
    #[error("Annotation is supported only on type declarations.")]
    NotTypeDeclaration,

    /// The marked class is nested
    #[error("Annotation is supported only on top level types.")]
    NotTopLevel {
        /// Simple name of the class
        name: String,
    },

    /// Neither a bridged super class nor a single interface
    #[error("The annotated type must have a non `Object` super class or implement a single interface.")]
    NoServiceType {
        /// Suggested restructuring
        fix: ServiceTypeFix,
    },

    /// The marshaller config type lacks a usable `getInstance()`
    #[error("Marshaller config must have a non private static `getInstance()` method returning `MarshallerConfig`.")]
    InvalidMarshallerConfig {
        /// Simple name of the config type
        config: String,
    },

    /// An annotation action names an annotation that is already handled
    #[error("The annotation `{annotation}` is already configured to be {action}.")]
    DuplicateAnnotationAction {
        /// Simple name of the annotation
        annotation: String,
        /// Display name of the existing action
        action: &'static str,
        /// Simple name of the action annotation
        action_annotation: String,
    },

    /// The declaration does not carry the direction's marker
    #[error("The type is not annotated by `{annotation}`.")]
    MissingHandledAnnotation {
        /// Simple name of the marker
        annotation: String,
    },

    // Accessors
    /// A marker that may occur once occurs twice
    #[error("Only single {kind} can be annotated by `{marker}`.")]
    DuplicateMarker {
        /// Simple name of the marker
        marker: String,
        /// Method or field
        kind: MemberKind,
        /// First annotated member, printed
        first: String,
        /// Second annotated member, printed
        second: String,
    },

    /// Dispatch resolver with the wrong shape
    #[error("Method annotated by `{marker}` must be a non private static method with a single parameter and `{service}` return type.")]
    InvalidDispatchResolver {
        /// Simple name of the marker
        marker: String,
        /// Service type name
        service: String,
        /// Expected method, printed
        expected: String,
    },

    /// Receiver resolver with the wrong shape
    #[error("Method annotated by `{marker}` must be a non private non void static method with a single parameter.")]
    InvalidReceiverResolver {
        /// Simple name of the marker
        marker: String,
        /// Expected method, printed
        expected: String,
    },

    /// Receiver resolver without dispatch resolver
    #[error("Class with a receiver resolver method must also provide dispatch resolver method.")]
    MissingDispatchResolver {
        /// Simple name of the missing marker
        marker: String,
        /// Method to add, printed
        expected: String,
    },

    /// Dispatch resolver without receiver resolver
    #[error("Class with a dispatch resolver method must also provide receiver resolver method.")]
    MissingReceiverResolver {
        /// Simple name of the missing marker
        marker: String,
        /// Method to add, printed
        expected: String,
    },

    /// Dispatch and receiver resolvers take different parameter types
    #[error("Receiver resolver method must have the same parameter type as the dispatch resolver method.")]
    ResolverParameterMismatch,

    /// Exception handler with the wrong shape
    #[error("Method annotated by `{marker}` must be a non private static boolean method with {params} parameter(s).")]
    InvalidExceptionHandler {
        /// Simple name of the marker
        marker: String,
        /// Required parameter types, quoted
        params: String,
        /// Expected method, printed
        expected: String,
    },

    /// Endpoint handle field with the wrong shape
    #[error("Field annotated by `{marker}` must be a non private field of `{base}` type.")]
    InvalidEndPointHandle {
        /// Simple name of the marker
        marker: String,
        /// Proxy base type name
        base: String,
        /// Expected field, printed
        expected: String,
    },

    /// Factory on a class without explicit receiver
    #[error("Method annotated by `{marker}` is allowed only for classes with an explicit receiver.")]
    FactoryRequiresExplicitReceiver {
        /// Simple name of the factory marker
        marker: String,
        /// Simple name of the dispatch resolver marker
        dispatch_marker: String,
        /// Simple name of the receiver resolver marker
        receiver_marker: String,
    },

    /// No way to reach the bridged instance
    #[error("The annotated type must extend `{base}`, have a field annotated by `{handle_marker}` or an explicit receiver.")]
    MissingStrategy {
        /// Proxy base type name
        base: String,
        /// Simple name of the endpoint handle marker
        handle_marker: String,
        /// Example handle field, printed
        handle_field: String,
        /// Simple name of the dispatch resolver marker
        dispatch_marker: String,
        /// Example dispatch resolver, printed
        dispatch_method: String,
        /// Simple name of the receiver resolver marker
        receiver_marker: String,
        /// Example receiver resolver, printed
        receiver_method: String,
    },

    /// Factory with the wrong shape
    #[error("Method annotated by `{marker}` must be a non private static method with a single object parameter and `{returns}` return type.")]
    InvalidFactory {
        /// Simple name of the marker
        marker: String,
        /// Required return type name
        returns: String,
        /// Expected method, printed
        expected: String,
    },

    // Constructors
    /// Explicit-receiver class with several constructors
    #[error("Annotated type must have a single constructor.")]
    MultipleConstructors,

    /// No constructor, or several, matching the required shapes
    #[error("{}", constructor_signatures(.signatures))]
    InvalidConstructor {
        /// Acceptable signatures, printed
        signatures: Vec<String>,
        /// Constructor to add, printed
        add: String,
        /// Simple name of the class
        name: String,
    },

    // Methods
    /// Concrete method that would be overridden by the generated class
    #[error("Should be `final` to prevent override in the generated class or `abstract` to be generated.")]
    NonFinalConcreteMethod {
        /// Annotated type name
        annotated: String,
    },

    /// Explicit receiver mode with a method lacking a receiver parameter
    #[error("In a class with an explicit receiver the first method parameter must be a receiver.")]
    MissingReceiverParameter {
        /// Simple name of the dispatch resolver marker
        dispatch_marker: String,
        /// Simple name of the receiver resolver marker
        receiver_marker: String,
    },

    /// Cached method without a result
    #[error("Method with cached return value must have non void return type.")]
    IdempotentVoid {
        /// Simple name of the idempotent marker
        marker: String,
    },

    /// Receiver method absent from the service type
    #[error("Method `{name}{signature}` is not found in `{service}`.")]
    ReceiverMethodNotFound {
        /// Receiver method name
        name: String,
        /// Parameter signature, printed
        signature: String,
        /// Service type name
        service: String,
    },

    /// Receiver method that is static or private
    #[error("Receiver method `{name}` must be a non private instance method.")]
    ReceiverMethodNotInstance {
        /// Receiver method name
        name: String,
    },

    // Marshallers
    /// `useReceiverResolver` without explicit receiver
    #[error("UseReceiverResolver can be used only for types with explicit receiver.")]
    ReceiverResolverNotAllowed,

    /// By-reference target with a factory but no direction marker
    #[error("The `{reference}` must be an explicit receiver class annotated by `{mine}` or `{other}`.")]
    UnannotatedFactoryReference {
        /// Referenced type name
        reference: String,
        /// This direction's marker
        mine: String,
        /// The other direction's marker
        other: String,
    },

    /// By-reference target with no usable endpoint handle
    #[error("Cannot lookup `{marker}` annotated field in `{reference}`.")]
    MissingEndPointHandleField {
        /// Simple name of the endpoint handle marker
        marker: String,
        /// Referenced type name
        reference: String,
    },

    /// By-reference value that is not a declared type
    #[error("The `{marker}` value must be a declared type.")]
    InvalidReferenceType {
        /// Simple name of the by-reference marker
        marker: String,
    },

    // Self-test
    /// Expected errors that were never reported
    #[error("Expected errors were not reported: {}.", quoted(.expected))]
    ExpectedErrorNotReported {
        /// Expected error texts
        expected: Vec<String>,
    },
}

impl BridgeErrorKind {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        use BridgeErrorKind::*;

        match self {
            NotTypeDeclaration => "NB1001",
            NotTopLevel { .. } => "NB1002",
            NoServiceType { .. } => "NB1003",
            InvalidMarshallerConfig { .. } => "NB1004",
            DuplicateAnnotationAction { .. } => "NB1005",
            MissingHandledAnnotation { .. } => "NB1006",
            DuplicateMarker { .. } => "NB2001",
            InvalidDispatchResolver { .. } => "NB2002",
            InvalidReceiverResolver { .. } => "NB2003",
            MissingDispatchResolver { .. } => "NB2004",
            MissingReceiverResolver { .. } => "NB2005",
            ResolverParameterMismatch => "NB2006",
            InvalidExceptionHandler { .. } => "NB2007",
            InvalidEndPointHandle { .. } => "NB2008",
            FactoryRequiresExplicitReceiver { .. } => "NB2009",
            MissingStrategy { .. } => "NB2010",
            InvalidFactory { .. } => "NB2011",
            MultipleConstructors => "NB3001",
            InvalidConstructor { .. } => "NB3002",
            NonFinalConcreteMethod { .. } => "NB4001",
            MissingReceiverParameter { .. } => "NB4002",
            IdempotentVoid { .. } => "NB4003",
            ReceiverMethodNotFound { .. } => "NB4004",
            ReceiverMethodNotInstance { .. } => "NB4005",
            ReceiverResolverNotAllowed => "NB5001",
            UnannotatedFactoryReference { .. } => "NB5002",
            MissingEndPointHandleField { .. } => "NB5003",
            InvalidReferenceType { .. } => "NB5004",
            ExpectedErrorNotReported { .. } => "NB9001",
        }
    }

    /// Suggested fix, if there is one
    pub fn help(&self) -> Option<String> {
        use BridgeErrorKind::*;

        let help = match self {
            NotTopLevel { name } => format!("Make the `{}` a top level class.", name),
            NoServiceType { fix } => fix.to_string(),
            InvalidMarshallerConfig { config } => format!(
                "Add the `static MarshallerConfig getInstance() {{ return INSTANCE;}}` into `{}`.",
                config
            ),
            DuplicateAnnotationAction {
                annotation,
                action_annotation,
                ..
            } => format!("Remove repeating `{}` for `{}`.", action_annotation, annotation),
            MissingHandledAnnotation { annotation } => {
                format!("Annotate the type with `{}`.", annotation)
            }
            DuplicateMarker {
                kind, first, second, ..
            } => format!("Remove `{}` or `{}` {}.", first, second, kind),
            InvalidDispatchResolver { expected, .. }
            | InvalidReceiverResolver { expected, .. }
            | InvalidExceptionHandler { expected, .. }
            | InvalidEndPointHandle { expected, .. }
            | InvalidFactory { expected, .. } => format!("Change signature to `{}`.", expected),
            MissingDispatchResolver { marker, expected }
            | MissingReceiverResolver { marker, expected } => {
                format!("Add `@{} {}` method.", marker, expected)
            }
            FactoryRequiresExplicitReceiver {
                dispatch_marker,
                receiver_marker,
                ..
            } => format!(
                "Add dispatch resolver method annotated by `{}` and receiver resolver method annotated by `{}`.",
                dispatch_marker, receiver_marker
            ),
            MissingStrategy {
                base,
                handle_marker,
                handle_field,
                dispatch_marker,
                dispatch_method,
                receiver_marker,
                receiver_method,
            } => format!(
                "To bridge an interface extend `{}` and implement the interface.\n\
                 To bridge a class extend the class, add `@{} {}` field and initialize it in the constructor.\n\
                 To bridge a class with an explicit receiver add `@{} {}` and `@{} {}` methods.",
                base,
                handle_marker,
                handle_field,
                dispatch_marker,
                dispatch_method,
                receiver_marker,
                receiver_method
            ),
            InvalidConstructor { add, name, .. } => {
                format!("Add `{}` constructor into `{}`.", add, name)
            }
            NonFinalConcreteMethod { annotated } => format!(
                "Add a `final` modifier or remove implementation in the `{}`.",
                annotated
            ),
            MissingReceiverParameter {
                dispatch_marker,
                receiver_marker,
            } => format!(
                "For class with an explicit receiver make the method `final` to prevent its generation.\n\
                 For class which has no explicit receiver remove methods annotated by `{}` and `{}`.",
                dispatch_marker, receiver_marker
            ),
            IdempotentVoid { marker } => format!("Remove `{}` annotation.", marker),
            ReceiverMethodNotFound { .. } => "Receiver method must have the same arguments as the \
                 annotated method and must exist in the bridged type."
                .to_string(),
            UnannotatedFactoryReference {
                reference,
                mine,
                other,
            } => format!("Annotate the `{}` with `{}` or `{}`.", reference, mine, other),
            ExpectedErrorNotReported { .. } => {
                "Remove the `ExpectError` annotation or fix the expected texts.".to_string()
            }
            NotTypeDeclaration
            | ResolverParameterMismatch
            | MultipleConstructors
            | ReceiverMethodNotInstance { .. }
            | ReceiverResolverNotAllowed
            | MissingEndPointHandleField { .. }
            | InvalidReferenceType { .. } => return None,
        };
        Some(help)
    }

    /// Structural errors abort the declaration
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BridgeErrorKind::NotTypeDeclaration
                | BridgeErrorKind::NotTopLevel { .. }
                | BridgeErrorKind::NoServiceType { .. }
                | BridgeErrorKind::InvalidMarshallerConfig { .. }
                | BridgeErrorKind::MissingHandledAnnotation { .. }
        )
    }
}

/// An error reported against a bridge declaration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct BridgeError {
    /// What went wrong
    pub kind: BridgeErrorKind,
    /// Where it went wrong
    pub origin: Origin,
}

impl BridgeError {
    /// Create an error
    pub fn new(kind: BridgeErrorKind, origin: Origin) -> Self {
        BridgeError { kind, origin }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Suggested fix
    pub fn help(&self) -> Option<String> {
        self.kind.help()
    }

    /// Full message: the error line followed by the suggested fix
    pub fn message(&self) -> String {
        match self.help() {
            Some(help) => format!("{}\n{}", self.kind, help),
            None => self.kind.to_string(),
        }
    }
}

/// Errors building a direction configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),

    /// Config file is not valid TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A configured type does not exist in the universe
    #[error("Unknown type `{name}` in {direction} configuration")]
    UnknownType {
        /// Direction being configured
        direction: Direction,
        /// Type name as written
        name: String,
    },

    /// A constructor shape list is empty
    #[error("The {direction} configuration needs at least one {kind} constructor shape")]
    EmptyShapes {
        /// Direction being configured
        direction: Direction,
        /// Which shape list
        kind: &'static str,
    },

    /// The configured marker is not an annotation type
    #[error("`{name}` is not an annotation type")]
    NotAnnotation {
        /// Type name as written
        name: String,
    },

    /// The configured proxy base is not a declared type
    #[error("Proxy base `{name}` of the {direction} configuration must be a class")]
    InvalidProxyBase {
        /// Direction being configured
        direction: Direction,
        /// Type name as written
        name: String,
    },
}
