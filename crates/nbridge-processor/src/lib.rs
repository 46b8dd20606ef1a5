//! nbridge bridge processor
//!
//! Resolves and validates bridge declarations: types marked to have
//! cross-context call glue generated for a service contract.
//!
//! This crate provides:
//! - Direction configurations and the well-known bridge annotations
//! - Service type, accessor and constructor resolution
//! - Marshaller selection for every bridged value
//! - Method data with overload ids, receiver methods and result caches
//! - Accumulated diagnostics with codespan rendering
//!
//! # Usage
//!
//! ```ignore
//! use nbridge_processor::{BridgeProcessor, DirectionConfigs, WellKnownTypes};
//! use nbridge_types::TypeContext;
//!
//! let mut ctx = TypeContext::new();
//! let known = WellKnownTypes::install(&mut ctx)?;
//! // declare the bridge classes ...
//! let configs = DirectionConfigs::presets(&ctx, &known);
//! for processed in BridgeProcessor::new(&ctx, &known, &configs).process(None) {
//!     match processed.result {
//!         Ok(definition) => println!("{}", definition.target_class_simple_name(&ctx)),
//!         Err(errors) => eprintln!("{} error(s)", errors.len()),
//!     }
//! }
//! ```

pub mod accessor;
pub mod actions;
pub mod config;
pub mod constructor;
pub mod definition;
pub mod diagnostic;
pub mod error;
pub mod marshaller;
pub mod method;
pub mod parser;
pub mod processor;
pub mod registry;
pub mod service;
pub mod signature;
pub mod sink;
pub mod well_known;

// Re-export main types
pub use actions::{Action, AnnotationActions};
pub use config::{ConfigManifest, Configuration, Direction, DirectionConfigs, DirectionSection};
pub use constructor::{ConstructorPolicy, ConstructorSelection};
pub use definition::{CacheData, DefinitionData, MethodData, ReceiverStrategy};
pub use diagnostic::{create_files, error_code, Diagnostic, ErrorCode, SourceOutline};
pub use error::{BridgeError, BridgeErrorKind, ConfigError, MemberKind, Origin, ServiceTypeFix};
pub use marshaller::{
    marshaller_name, MarshallerData, MarshallerKind, ReferenceMarshaller, ReferenceTarget,
};
pub use parser::{parse, BridgeParser};
pub use processor::{BridgeProcessor, ProcessedDecl};
pub use registry::{MarshallerRegistry, RegistryError};
pub use sink::ErrorSink;
pub use well_known::{WellKnownTypes, BRIDGE_PACKAGE};
