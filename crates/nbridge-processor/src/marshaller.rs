//! Marshaller resolution
//!
//! Every return value and parameter of a bridged method is assigned a
//! [`MarshallerData`]: passed by value, converted by a generated custom
//! marshaller, or passed by reference as another bridge endpoint.

use crate::config::Configuration;
use crate::constructor::ConstructorPolicy;
use crate::error::BridgeErrorKind;
use crate::parser::BridgeParser;
use crate::well_known::WellKnownTypes;
use nbridge_types::{
    find_annotation, AnnotationUse, ElementRef, FieldId, MethodId, Type, TypeId, TypeInfo,
};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Kind of a marshaller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarshallerKind {
    /// Passed as is
    Value,
    /// Converted by a generated marshaller
    Custom,
    /// Passed as a bridge endpoint
    Reference,
}

/// How a value crosses the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshallerData {
    /// No runtime marshaller; primitive arrays may carry `In`/`Out` modifiers
    Value {
        /// Direction modifiers of a primitive array
        directions: Vec<AnnotationUse>,
    },
    /// Generated marshaller, shared by every position with the same type and
    /// retained annotations
    Custom {
        /// Marshalled type
        ty: TypeId,
        /// Generated field name, e.g. `listOfIntegerMarshaller`
        name: String,
        /// Annotations used as lookup keys
        annotations: Vec<AnnotationUse>,
    },
    /// The value is itself a bridge endpoint
    Reference(ReferenceMarshaller),
}

/// By-reference marshalling details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMarshaller {
    /// Type the reference is created as
    pub reference_type: TypeId,
    /// Direction marker found on the referenced type
    pub marker: Option<AnnotationUse>,
    /// Unwrap through the receiver resolver
    pub use_receiver_resolver: bool,
    /// The referenced type bridges in this parse's direction
    pub same_direction: bool,
    /// Endpoint handle field of the referenced type
    pub end_point_handle: Option<FieldId>,
    /// Factory method of the referenced type
    pub factory: Option<MethodId>,
}

impl MarshallerData {
    /// The shared "pass as is" entry
    pub fn no_marshaller() -> Self {
        MarshallerData::Value {
            directions: Vec::new(),
        }
    }

    /// Kind of this marshaller
    pub fn kind(&self) -> MarshallerKind {
        match self {
            MarshallerData::Value { .. } => MarshallerKind::Value,
            MarshallerData::Custom { .. } => MarshallerKind::Custom,
            MarshallerData::Reference(_) => MarshallerKind::Reference,
        }
    }

    /// Name of a custom marshaller
    pub fn name(&self) -> Option<&str> {
        match self {
            MarshallerData::Custom { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Reference details
    pub fn as_reference(&self) -> Option<&ReferenceMarshaller> {
        match self {
            MarshallerData::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// `In`/`Out` modifiers of a value
    pub fn directions(&self) -> &[AnnotationUse] {
        match self {
            MarshallerData::Value { directions } => directions,
            _ => &[],
        }
    }
}

/// How a by-reference target is reached, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTarget {
    /// Extends this direction's proxy base type
    SubclassOfMine,
    /// Extends the other direction's proxy base type
    SubclassOfOther,
    /// Declares a factory method
    Factory(MethodId),
    /// Declares an endpoint handle field
    HandleField(FieldId),
    /// None of the above
    Unresolved,
}

/// Classify a by-reference target
pub fn classify_reference<T: TypeInfo + ?Sized>(
    types: &T,
    known: &WellKnownTypes,
    mine: &Configuration,
    other: &Configuration,
    reference_type: TypeId,
) -> ReferenceTarget {
    if types.is_subtype(reference_type, mine.proxy_base_type()) {
        return ReferenceTarget::SubclassOfMine;
    }
    if types.is_subtype(reference_type, other.proxy_base_type()) {
        return ReferenceTarget::SubclassOfOther;
    }
    let Some(target) = types.decl_of(reference_type) else {
        return ReferenceTarget::Unresolved;
    };
    let decl = types.decl(target);
    if let Some(factory) = find_factory(types, known, &decl.methods) {
        return ReferenceTarget::Factory(factory);
    }
    decl.fields
        .iter()
        .copied()
        .find(|&f| types.field(f).annotation_of(known.end_point_handle).is_some())
        .map_or(ReferenceTarget::Unresolved, ReferenceTarget::HandleField)
}

/// Last method carrying the factory marker, without shape checks
pub fn find_factory<T: TypeInfo + ?Sized>(
    types: &T,
    known: &WellKnownTypes,
    methods: &[MethodId],
) -> Option<MethodId> {
    methods
        .iter()
        .copied()
        .filter(|&m| types.method(m).annotation_of(known.factory).is_some())
        .last()
}

/// `In`/`Out` modifiers of a primitive array; a lone default `In` is dropped
pub fn direction_modifiers(
    known: &WellKnownTypes,
    annotations: &[AnnotationUse],
) -> Vec<AnnotationUse> {
    let found: Vec<AnnotationUse> = annotations
        .iter()
        .filter(|a| known.is_direction_modifier(a.annotation))
        .cloned()
        .collect();
    if let [single] = found.as_slice() {
        if single.annotation == known.in_
            && single.value("arrayOffsetParameter").is_none()
            && single.value("arrayLengthParameter").is_none()
        {
            return Vec::new();
        }
    }
    found
}

/// Name of the generated marshaller for a type and its retained annotations
///
/// `List<Integer>` with no annotations is `listOfIntegerMarshaller`,
/// `String[]` annotated by `Utf8` is `stringArrayWithUtf8Marshaller`.
pub fn marshaller_name<T: TypeInfo + ?Sized>(
    types: &T,
    ty: TypeId,
    annotations: &[AnnotationUse],
) -> String {
    let mut name = String::new();
    let mut visiting = FxHashSet::default();
    name_from_type(types, &mut name, ty, &mut visiting);
    if !annotations.is_empty() {
        name.push_str("With");
        for annotation in annotations {
            name.push_str(types.simple_name(annotation.annotation));
        }
    }
    name.push_str("Marshaller");
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => name,
    }
}

fn name_from_type<T: TypeInfo + ?Sized>(
    types: &T,
    out: &mut String,
    ty: TypeId,
    visiting: &mut FxHashSet<TypeId>,
) {
    match &*types.get(ty) {
        Type::Primitive(p) => out.push_str(p.name()),
        Type::Declared(declared) => {
            out.push_str(types.simple_name(declared.decl));
            if !declared.args.is_empty() {
                out.push_str("Of");
                for &arg in &declared.args {
                    name_from_type(types, out, arg, visiting);
                }
            }
        }
        Type::Array(array) => {
            name_from_type(types, out, array.component, visiting);
            out.push_str("Array");
        }
        Type::Wildcard(_) => out.push_str("Object"),
        Type::TypeVar(_) => {
            // Recursive bounds (`T extends Comparable<T>`) use the raw bound
            let bound = types.type_var_bound(ty);
            if visiting.insert(ty) {
                name_from_type(types, out, bound, visiting);
                visiting.remove(&ty);
            } else {
                name_from_type(types, out, types.erasure(bound), visiting);
            }
        }
        Type::Intersection(intersection) => {
            for (i, &bound) in intersection.bounds.iter().enumerate() {
                if i > 0 {
                    out.push_str("And");
                }
                name_from_type(types, out, bound, visiting);
            }
        }
        Type::Void | Type::NoType => {
            unreachable!("no marshaller name for {}", types.type_name(ty))
        }
    }
}

impl<'a, T: TypeInfo + ?Sized> BridgeParser<'a, T> {
    /// Resolve the marshaller of a return value or parameter of `method`
    pub(crate) fn lookup_marshaller(
        &mut self,
        method: MethodId,
        ty: TypeId,
        annotations: &[AnnotationUse],
        explicit_receiver: bool,
    ) -> Arc<MarshallerData> {
        let types = self.types;
        let known = self.known;
        let retained: Vec<AnnotationUse> = annotations
            .iter()
            .filter(|a| !self.actions.is_ignored(a.annotation))
            .cloned()
            .collect();

        let resolved = types.get(ty);
        if resolved.is_primitive()
            || resolved.is_void()
            || types.is_same_type(ty, types.string_type())
        {
            return self.no_marshaller.clone();
        }
        if let Some(array) = resolved.as_array() {
            if types.get(array.component).is_primitive() {
                let directions = direction_modifiers(known, &retained);
                if directions.is_empty() {
                    return self.no_marshaller.clone();
                }
                return Arc::new(MarshallerData::Value { directions });
            }
        }
        if let Some(by_reference) = find_annotation(&retained, known.by_reference) {
            return Arc::new(self.reference_marshaller(method, by_reference, explicit_receiver));
        }

        let marshaller = self
            .marshallers
            .entry((ty, retained))
            .or_insert_with_key(|(ty, retained)| {
                let name = marshaller_name(types, *ty, retained);
                trace!(%name, "custom marshaller");
                Arc::new(MarshallerData::Custom {
                    ty: *ty,
                    name,
                    annotations: retained.clone(),
                })
            });
        marshaller.clone()
    }

    fn reference_marshaller(
        &mut self,
        method: MethodId,
        by_reference: &AnnotationUse,
        explicit_receiver: bool,
    ) -> MarshallerData {
        let types = self.types;
        let known = self.known;
        let (mine, other) = (self.mine, self.other);
        let element = ElementRef::Method(method);

        let use_receiver_resolver = types
            .annotation_value_with_defaults(by_reference, "useReceiverResolver")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if use_receiver_resolver && !explicit_receiver {
            self.sink
                .emit(BridgeErrorKind::ReceiverResolverNotAllowed, element, Some(by_reference));
        }

        let target = by_reference
            .value("value")
            .and_then(|v| v.as_type())
            .and_then(|ty| types.decl_of(ty).map(|decl| (ty, decl)));
        let Some((reference_type, target)) = target else {
            self.sink.emit(
                BridgeErrorKind::InvalidReferenceType {
                    marker: types.simple_name(known.by_reference).to_string(),
                },
                element,
                Some(by_reference),
            );
            return MarshallerData::no_marshaller();
        };

        let mut data = ReferenceMarshaller {
            reference_type,
            marker: None,
            use_receiver_resolver,
            same_direction: true,
            end_point_handle: None,
            factory: None,
        };
        let classification = classify_reference(types, known, mine, other, reference_type);
        let mut policy = None;
        match classification {
            ReferenceTarget::SubclassOfMine => {
                policy = Some(ConstructorPolicy::Shapes {
                    shapes: mine.subclass_constructor_shapes(),
                    same_arity: true,
                });
            }
            ReferenceTarget::SubclassOfOther => {
                data.same_direction = false;
                policy = Some(ConstructorPolicy::Shapes {
                    shapes: other.subclass_constructor_shapes(),
                    same_arity: true,
                });
            }
            ReferenceTarget::Factory(factory) => {
                data.factory = Some(factory);
                let decl = types.decl(target);
                let my_marker = decl.annotation_of(mine.handled_annotation());
                let other_marker = decl.annotation_of(other.handled_annotation());
                match (my_marker, other_marker) {
                    (Some(_), None) => data.reference_type = mine.proxy_base_type(),
                    (None, Some(_)) => {
                        data.same_direction = false;
                        data.reference_type = other.proxy_base_type();
                    }
                    _ => self.sink.emit(
                        BridgeErrorKind::UnannotatedFactoryReference {
                            reference: types.type_name(reference_type),
                            mine: types.simple_name(mine.handled_annotation()).to_string(),
                            other: types.simple_name(other.handled_annotation()).to_string(),
                        },
                        element,
                        Some(by_reference),
                    ),
                }
            }
            ReferenceTarget::HandleField(field) => {
                data.end_point_handle = Some(field);
                let field_type = types.field(field).ty;
                if types.is_subtype(field_type, mine.proxy_base_type()) {
                    policy = Some(ConstructorPolicy::Shapes {
                        shapes: mine.handle_constructor_shapes(),
                        same_arity: true,
                    });
                } else if types.is_subtype(field_type, other.proxy_base_type()) {
                    data.same_direction = false;
                    policy = Some(ConstructorPolicy::Shapes {
                        shapes: other.handle_constructor_shapes(),
                        same_arity: true,
                    });
                } else {
                    self.missing_handle_field(element, by_reference, reference_type);
                }
            }
            ReferenceTarget::Unresolved => {
                self.missing_handle_field(element, by_reference, reference_type)
            }
        }
        if let Some(policy) = policy {
            self.select_constructor(policy, target, element, Some(by_reference));
        }

        let marker = if data.same_direction {
            mine.handled_annotation()
        } else {
            other.handled_annotation()
        };
        data.marker = types.decl(target).annotation_of(marker).cloned();
        debug!(
            reference = %types.type_name(reference_type),
            ?classification,
            same_direction = data.same_direction,
            "reference marshaller"
        );
        MarshallerData::Reference(data)
    }

    fn missing_handle_field(
        &mut self,
        element: ElementRef,
        by_reference: &AnnotationUse,
        reference_type: TypeId,
    ) {
        self.sink.emit(
            BridgeErrorKind::MissingEndPointHandleField {
                marker: self.types.simple_name(self.known.end_point_handle).to_string(),
                reference: self.types.type_name(reference_type),
            },
            element,
            Some(by_reference),
        );
    }
}
