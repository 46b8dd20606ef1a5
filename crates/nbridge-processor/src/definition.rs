//! Resolved bridge definitions
//!
//! A [`DefinitionData`] is everything a code generator needs to emit the
//! bridge class for one annotated declaration.

use crate::config::Direction;
use crate::marshaller::{MarshallerData, ReferenceMarshaller};
use nbridge_types::{DeclId, FieldId, MethodId, Parameter, Signature, TypeId, TypeInfo};
use std::sync::Arc;

/// Cached result of an idempotent method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheData {
    /// Generated field name, e.g. `getCache` or `getCache2`
    pub field_name: String,
    /// Cached type; primitives are boxed
    pub entry_type: TypeId,
}

/// One method to generate
#[derive(Debug, Clone)]
pub struct MethodData {
    /// The bridged method
    pub method: MethodId,
    /// Signature as a member of the annotated type
    pub signature: Signature,
    /// 1-based index among same-named methods, 0 when the name is unique
    pub overload_id: usize,
    /// Receiver method name, when it differs from the method name
    pub receiver_method: Option<String>,
    /// Marshaller of the return value
    pub return_marshaller: Arc<MarshallerData>,
    /// Marshaller of each parameter
    pub parameter_marshallers: Vec<Arc<MarshallerData>>,
    /// Cache of an idempotent result
    pub cache: Option<CacheData>,
}

impl MethodData {
    /// True when another generated method shares this name
    pub fn has_overload(&self) -> bool {
        self.overload_id > 0
    }

    /// Name the generated call targets
    pub fn receiver_method_name<'t, T: TypeInfo + ?Sized>(&'t self, types: &'t T) -> &'t str {
        self.receiver_method
            .as_deref()
            .unwrap_or_else(|| types.method(self.method).name.as_str())
    }
}

/// How the generated class reaches the foreign object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverStrategy {
    /// Dispatch and receiver resolver methods
    Explicit {
        dispatch: MethodId,
        receiver: MethodId,
    },
    /// A field holding the foreign object
    EndPointHandle(FieldId),
    /// The annotated type extends the proxy base type
    Subclass,
}

/// Everything resolved for one bridge declaration
#[derive(Debug, Clone)]
pub struct DefinitionData {
    /// The annotated type
    pub annotated_type: TypeId,
    /// Its declaration
    pub annotated_decl: DeclId,
    /// Direction the bridge is generated for
    pub direction: Direction,
    /// Bridged service
    pub service_type: TypeId,
    /// Parameters of the selected constructor
    pub constructor_params: Vec<Parameter>,
    /// Static method mapping a receiver to the service instance
    pub dispatch_accessor: Option<MethodId>,
    /// Static method mapping a receiver to the foreign object
    pub receiver_accessor: Option<MethodId>,
    /// Static method consulted when a foreign call throws
    pub exception_handler: Option<MethodId>,
    /// Field holding the foreign object
    pub end_point_handle: Option<FieldId>,
    /// Class providing the marshaller configuration
    pub marshaller_config: TypeId,
    /// Methods to generate, in declaration order
    pub methods: Vec<MethodData>,
    /// Annotations copied to the generated methods
    pub copy_annotations: Vec<DeclId>,
}

impl DefinitionData {
    /// Both resolvers are present, so every method takes its receiver first
    pub fn has_explicit_receiver(&self) -> bool {
        self.dispatch_accessor.is_some() && self.receiver_accessor.is_some()
    }

    /// How generated code reaches the foreign object
    pub fn receiver_strategy(&self) -> ReceiverStrategy {
        match (self.dispatch_accessor, self.receiver_accessor, self.end_point_handle) {
            (Some(dispatch), Some(receiver), _) => {
                ReceiverStrategy::Explicit { dispatch, receiver }
            }
            (_, _, Some(field)) => ReceiverStrategy::EndPointHandle(field),
            _ => ReceiverStrategy::Subclass,
        }
    }

    /// Simple name of the generated class: `<Simple>Gen`
    pub fn target_class_simple_name<T: TypeInfo + ?Sized>(&self, types: &T) -> String {
        format!("{}Gen", types.simple_name(self.annotated_decl))
    }

    fn marshallers(&self) -> impl Iterator<Item = &Arc<MarshallerData>> {
        self.methods.iter().flat_map(|m| {
            std::iter::once(&m.return_marshaller).chain(m.parameter_marshallers.iter())
        })
    }

    /// Distinct custom marshallers, sorted by name
    pub fn custom_marshallers(&self) -> Vec<Arc<MarshallerData>> {
        let mut custom: Vec<Arc<MarshallerData>> = Vec::new();
        for marshaller in self.marshallers() {
            if marshaller.name().is_some()
                && !custom.iter().any(|c| c.name() == marshaller.name())
            {
                custom.push(marshaller.clone());
            }
        }
        custom.sort_by(|a, b| a.name().cmp(&b.name()));
        custom
    }

    /// Distinct reference marshallers, in first-seen order
    pub fn reference_marshallers(&self) -> Vec<ReferenceMarshaller> {
        let mut references: Vec<ReferenceMarshaller> = Vec::new();
        for reference in self.marshallers().filter_map(|m| m.as_reference()) {
            if !references.contains(reference) {
                references.push(reference.clone());
            }
        }
        references
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbridge_types::{MethodDecl, PrimitiveType, TypeContext, TypeDecl};

    fn method_data(
        ctx: &mut TypeContext,
        owner: DeclId,
        name: &str,
        marshaller: Arc<MarshallerData>,
    ) -> MethodData {
        let int = ctx.primitive(PrimitiveType::Int);
        let method = ctx.add_method(owner, MethodDecl::new(name, int));
        MethodData {
            method,
            signature: Signature {
                params: vec![],
                return_type: int,
            },
            overload_id: 0,
            receiver_method: None,
            return_marshaller: marshaller,
            parameter_marshallers: vec![],
            cache: None,
        }
    }

    #[test]
    fn test_custom_marshallers_are_distinct_and_sorted() {
        let mut ctx = TypeContext::new();
        let foo = ctx.declare(TypeDecl::class("demo", "Foo")).unwrap();
        let foo_type = ctx.decl_type(foo);
        let custom = |name: &str| {
            Arc::new(MarshallerData::Custom {
                ty: foo_type,
                name: name.to_string(),
                annotations: vec![],
            })
        };
        let zed = custom("zedMarshaller");
        let alpha = custom("alphaMarshaller");
        let methods = vec![
            method_data(&mut ctx, foo, "a", zed.clone()),
            method_data(&mut ctx, foo, "b", alpha),
            method_data(&mut ctx, foo, "c", zed),
        ];
        let definition = DefinitionData {
            annotated_type: foo_type,
            annotated_decl: foo,
            direction: Direction::HostToNative,
            service_type: ctx.object_type(),
            constructor_params: vec![],
            dispatch_accessor: None,
            receiver_accessor: None,
            exception_handler: None,
            end_point_handle: None,
            marshaller_config: foo_type,
            methods,
            copy_annotations: vec![],
        };
        let names: Vec<String> = definition
            .custom_marshallers()
            .iter()
            .filter_map(|m| m.name().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["alphaMarshaller", "zedMarshaller"]);
        assert_eq!(definition.target_class_simple_name(&ctx), "FooGen");
        assert_eq!(definition.receiver_strategy(), ReceiverStrategy::Subclass);
        assert!(definition.reference_marshallers().is_empty());
    }
}
