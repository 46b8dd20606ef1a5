//! Marker-annotated members of a bridge declaration
//!
//! Dispatch and receiver resolvers, the exception handler, the endpoint
//! handle field and the factory method are found by their marker
//! annotations. Each is shape-checked here; the returned member is used
//! even when its shape is wrong so later checks still run.

use crate::error::{BridgeErrorKind, MemberKind};
use crate::parser::BridgeParser;
use crate::signature::{print_field, print_method, print_method_decl, static_non_private};
use nbridge_types::{
    AnnotationUse, DeclId, ElementRef, FieldId, MethodId, Modifiers, PrimitiveType, TypeId,
    TypeInfo, Visibility,
};
use tracing::trace;

impl<'a, T: TypeInfo + ?Sized> BridgeParser<'a, T> {
    fn marked_method(
        &mut self,
        methods: &[MethodId],
        marker: DeclId,
    ) -> Option<(MethodId, AnnotationUse)> {
        let types = self.types;
        let mut found: Option<(MethodId, AnnotationUse)> = None;
        for &method in methods {
            let Some(annotation) = types.method(method).annotation_of(marker) else {
                continue;
            };
            match &found {
                Some((first, _)) => {
                    self.sink.emit(
                        BridgeErrorKind::DuplicateMarker {
                            marker: types.simple_name(marker).to_string(),
                            kind: MemberKind::Method,
                            first: print_method_decl(types, *first),
                            second: print_method_decl(types, method),
                        },
                        ElementRef::Method(method),
                        Some(annotation),
                    );
                    break;
                }
                None => {
                    trace!(
                        marker = types.simple_name(marker),
                        method = %types.method(method).name,
                        "marked method"
                    );
                    found = Some((method, annotation.clone()));
                }
            }
        }
        found
    }

    fn marked_field(
        &mut self,
        fields: &[FieldId],
        marker: DeclId,
    ) -> Option<(FieldId, AnnotationUse)> {
        let types = self.types;
        let mut found: Option<(FieldId, AnnotationUse)> = None;
        for &field in fields {
            let Some(annotation) = types.field(field).annotation_of(marker) else {
                continue;
            };
            match &found {
                Some((first, _)) => {
                    self.sink.emit(
                        BridgeErrorKind::DuplicateMarker {
                            marker: types.simple_name(marker).to_string(),
                            kind: MemberKind::Field,
                            first: types.field(*first).name.clone(),
                            second: types.field(field).name.clone(),
                        },
                        ElementRef::Field(field),
                        Some(annotation),
                    );
                    break;
                }
                None => found = Some((field, annotation.clone())),
            }
        }
        found
    }

    /// Static method returning the service for a receiver
    pub(crate) fn dispatch_accessor_in(
        &mut self,
        methods: &[MethodId],
        service_type: TypeId,
    ) -> Option<MethodId> {
        let types = self.types;
        let marker = self.known.dispatch_resolver;
        let (method, annotation) = self.marked_method(methods, marker)?;
        let decl = types.method(method);
        let valid = decl.modifiers.is_static
            && !decl.modifiers.is_private()
            && decl.params.len() == 1
            && types.is_same_type(decl.return_type, service_type);
        if !valid {
            let param = match decl.params.as_slice() {
                [single] => (single.ty, single.name.clone()),
                _ => (types.object_type(), "receiver".to_string()),
            };
            let expected = print_method(
                types,
                &static_non_private(&decl.modifiers),
                &decl.name,
                service_type,
                &[param],
            );
            self.sink.emit(
                BridgeErrorKind::InvalidDispatchResolver {
                    marker: types.simple_name(marker).to_string(),
                    service: types.type_name(service_type),
                    expected,
                },
                ElementRef::Method(method),
                Some(&annotation),
            );
        }
        Some(method)
    }

    /// Static method unwrapping a receiver; must pair with the dispatch resolver
    pub(crate) fn receiver_accessor_in(
        &mut self,
        methods: &[MethodId],
        dispatch: Option<MethodId>,
        service_type: TypeId,
    ) -> Option<MethodId> {
        let types = self.types;
        let known = self.known;
        let object = types.object_type();
        let Some((method, annotation)) = self.marked_method(methods, known.receiver_resolver) else {
            if let Some(dispatch) = dispatch {
                let decl = types.method(dispatch);
                let params: Vec<(TypeId, String)> =
                    decl.params.iter().map(|p| (p.ty, p.name.clone())).collect();
                let expected = print_method(
                    types,
                    &static_non_private(&Modifiers::package()),
                    "resolveReceiver",
                    object,
                    &params,
                );
                let dispatch_annotation = decl.annotation_of(known.dispatch_resolver);
                self.sink.emit(
                    BridgeErrorKind::MissingReceiverResolver {
                        marker: types.simple_name(known.receiver_resolver).to_string(),
                        expected,
                    },
                    ElementRef::Method(dispatch),
                    dispatch_annotation,
                );
            }
            return None;
        };

        let decl = types.method(method);
        let return_type = types.get(decl.return_type);
        let valid = decl.modifiers.is_static
            && !decl.modifiers.is_private()
            && decl.params.len() == 1
            && return_type.is_reference()
            && types.is_subtype(types.erasure(decl.return_type), object);
        if !valid {
            let param = match decl.params.as_slice() {
                [single] => (single.ty, single.name.clone()),
                _ => (object, "receiver".to_string()),
            };
            let modifiers = static_non_private(&decl.modifiers);
            let expected = print_method(types, &modifiers, &decl.name, object, &[param]);
            self.sink.emit(
                BridgeErrorKind::InvalidReceiverResolver {
                    marker: types.simple_name(known.receiver_resolver).to_string(),
                    expected,
                },
                ElementRef::Method(method),
                Some(&annotation),
            );
        }

        match dispatch {
            None => {
                let params: Vec<(TypeId, String)> =
                    decl.params.iter().map(|p| (p.ty, p.name.clone())).collect();
                let expected = print_method(
                    types,
                    &static_non_private(&Modifiers::package()),
                    "resolveDispatch",
                    service_type,
                    &params,
                );
                self.sink.emit(
                    BridgeErrorKind::MissingDispatchResolver {
                        marker: types.simple_name(known.dispatch_resolver).to_string(),
                        expected,
                    },
                    ElementRef::Method(method),
                    Some(&annotation),
                );
            }
            Some(dispatch) => {
                let dispatch_params = &types.method(dispatch).params;
                if let ([d], [r]) = (dispatch_params.as_slice(), decl.params.as_slice()) {
                    if !types.is_same_type(d.ty, r.ty) {
                        self.sink.emit(
                            BridgeErrorKind::ResolverParameterMismatch,
                            ElementRef::Method(method),
                            Some(&annotation),
                        );
                    }
                }
            }
        }
        Some(method)
    }

    /// Static boolean method taking the configured exception handler parameters
    pub(crate) fn exception_handler_in(&mut self, methods: &[MethodId]) -> Option<MethodId> {
        let types = self.types;
        let marker = self.known.exception_handler;
        let mine = self.mine;
        let (method, annotation) = self.marked_method(methods, marker)?;
        let required = mine.exception_handler_types();
        let decl = types.method(method);
        let params_match = decl.params.len() == required.len()
            && decl
                .params
                .iter()
                .zip(required)
                .all(|(param, &ty)| types.is_same_type(param.ty, ty));
        let boolean = types.primitive(PrimitiveType::Boolean);
        let valid = decl.modifiers.is_static
            && !decl.modifiers.is_private()
            && types.is_same_type(decl.return_type, boolean)
            && params_match;
        if !valid {
            let params: Vec<(TypeId, String)> = if params_match {
                decl.params.iter().map(|p| (p.ty, p.name.clone())).collect()
            } else {
                required
                    .iter()
                    .enumerate()
                    .map(|(i, &ty)| (ty, format!("p{}", i)))
                    .collect()
            };
            let modifiers = static_non_private(&decl.modifiers);
            let expected = print_method(types, &modifiers, &decl.name, boolean, &params);
            let names: Vec<String> = required
                .iter()
                .map(|&ty| format!("`{}`", types.type_name(ty)))
                .collect();
            self.sink.emit(
                BridgeErrorKind::InvalidExceptionHandler {
                    marker: types.simple_name(marker).to_string(),
                    params: names.join(", "),
                    expected,
                },
                ElementRef::Method(method),
                Some(&annotation),
            );
        }
        Some(method)
    }

    /// Non-private field holding the foreign object
    pub(crate) fn end_point_handle_in(
        &mut self,
        fields: &[FieldId],
        base: TypeId,
    ) -> Option<FieldId> {
        let types = self.types;
        let marker = self.known.end_point_handle;
        let (field, annotation) = self.marked_field(fields, marker)?;
        let decl = types.field(field);
        if decl.modifiers.is_private() || !types.is_subtype(decl.ty, base) {
            let mut modifiers = decl.modifiers;
            if modifiers.is_private() {
                modifiers.visibility = Visibility::Package;
            }
            self.sink.emit(
                BridgeErrorKind::InvalidEndPointHandle {
                    marker: types.simple_name(marker).to_string(),
                    base: types.type_name(base),
                    expected: print_field(types, &modifiers, &decl.name, base),
                },
                ElementRef::Field(field),
                Some(&annotation),
            );
        }
        Some(field)
    }

    /// Static method wrapping a receiver into a bridge instance
    pub(crate) fn factory_method_in(
        &mut self,
        methods: &[MethodId],
        dispatch: Option<MethodId>,
    ) -> Option<MethodId> {
        let types = self.types;
        let known = self.known;
        let (method, annotation) = self.marked_method(methods, known.factory)?;
        let Some(dispatch) = dispatch else {
            self.sink.emit(
                BridgeErrorKind::FactoryRequiresExplicitReceiver {
                    marker: types.simple_name(known.factory).to_string(),
                    dispatch_marker: types.simple_name(known.dispatch_resolver).to_string(),
                    receiver_marker: types.simple_name(known.receiver_resolver).to_string(),
                },
                ElementRef::Method(method),
                Some(&annotation),
            );
            return Some(method);
        };

        let object = types.object_type();
        let returns = match types.method(dispatch).params.as_slice() {
            [single] => single.ty,
            _ => object,
        };
        let decl = types.method(method);
        let valid = decl.modifiers.is_static
            && !decl.modifiers.is_private()
            && decl.params.len() == 1
            && types.is_subtype(decl.return_type, returns);
        if !valid {
            let expected = print_method(
                types,
                &static_non_private(&decl.modifiers),
                &decl.name,
                returns,
                &[(object, "receiver")],
            );
            self.sink.emit(
                BridgeErrorKind::InvalidFactory {
                    marker: types.simple_name(known.factory).to_string(),
                    returns: types.type_name(returns),
                    expected,
                },
                ElementRef::Method(method),
                Some(&annotation),
            );
        }
        Some(method)
    }
}
