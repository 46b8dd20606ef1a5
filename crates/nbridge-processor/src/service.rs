//! Annotated type checks and service type resolution

use crate::error::{BridgeErrorKind, ServiceTypeFix};
use crate::parser::BridgeParser;
use crate::signature::element_annotations;
use nbridge_types::{find_annotation, AnnotationUse, DeclId, ElementRef, TypeId, TypeInfo};
use tracing::debug;

impl<'a, T: TypeInfo + ?Sized> BridgeParser<'a, T> {
    /// The element must be a top-level class carrying this direction's marker
    pub(crate) fn check_annotated_type(
        &mut self,
        element: ElementRef,
    ) -> Option<(DeclId, AnnotationUse)> {
        let types = self.types;
        let handled = self.mine.handled_annotation();
        let annotation = find_annotation(element_annotations(types, element), handled);
        let ElementRef::Type(decl) = element else {
            self.sink.emit(BridgeErrorKind::NotTypeDeclaration, element, annotation);
            return None;
        };
        let type_decl = types.decl(decl);
        let mut valid = true;
        if !type_decl.kind.is_class() {
            self.sink.emit(BridgeErrorKind::NotTypeDeclaration, element, annotation);
            valid = false;
        }
        if type_decl.enclosing.is_some() {
            self.sink.emit(
                BridgeErrorKind::NotTopLevel {
                    name: type_decl.name.clone(),
                },
                element,
                annotation,
            );
            valid = false;
        }
        if !valid {
            return None;
        }
        match annotation {
            Some(annotation) => Some((decl, annotation.clone())),
            None => {
                self.sink.emit(
                    BridgeErrorKind::MissingHandledAnnotation {
                        annotation: types.simple_name(handled).to_string(),
                    },
                    element,
                    None,
                );
                None
            }
        }
    }

    /// The bridged service: a non-root superclass, or the single interface
    pub(crate) fn find_service_type(
        &mut self,
        decl: DeclId,
        handled: &AnnotationUse,
    ) -> Option<TypeId> {
        let types = self.types;
        let type_decl = types.decl(decl);
        let interfaces = &type_decl.interfaces;
        let interface_names = || -> Vec<String> {
            interfaces
                .iter()
                .filter_map(|&i| types.decl_of(i))
                .map(|i| types.simple_name(i).to_string())
                .collect()
        };

        let fix = match type_decl.superclass.filter(|&s| types.decl_of(s).is_some()) {
            None => ServiceTypeFix::MissingSuperclass,
            Some(superclass) => {
                let is_base = types.is_subtype(superclass, self.mine.proxy_base_type());
                let is_root = types.is_same_type(superclass, types.object_type());
                if !is_base && !is_root {
                    if interfaces.is_empty() {
                        debug!(
                            service = %types.type_name(superclass),
                            "service type from superclass"
                        );
                        return Some(superclass);
                    }
                    let superclass_decl = types.decl_of(superclass);
                    ServiceTypeFix::IntroduceBaseClass {
                        superclass: superclass_decl
                            .map(|d| types.simple_name(d).to_string())
                            .unwrap_or_else(|| types.type_name(superclass)),
                        interfaces: interface_names(),
                    }
                } else {
                    match interfaces.as_slice() {
                        [] => ServiceTypeFix::ImplementService,
                        [single] => {
                            debug!(
                                service = %types.type_name(*single),
                                "service type from interface"
                            );
                            return Some(*single);
                        }
                        _ => ServiceTypeFix::IntroduceInterface {
                            interfaces: interface_names(),
                        },
                    }
                }
            }
        };
        self.sink
            .emit(BridgeErrorKind::NoServiceType { fix }, ElementRef::Type(decl), Some(handled));
        None
    }

    /// The `marshallerConfig` class must offer a static `getInstance()`
    pub(crate) fn find_marshaller_config(
        &mut self,
        decl: DeclId,
        handled: &AnnotationUse,
    ) -> Option<TypeId> {
        let types = self.types;
        let expected_return = types.decl_type(self.known.marshaller_config);
        let config_type = types
            .annotation_value_with_defaults(handled, "marshallerConfig")
            .and_then(|v| v.as_type());
        let valid = config_type.and_then(|ty| types.decl_of(ty)).is_some_and(|config| {
            types.decl(config).methods.iter().any(|&m| {
                let method = types.method(m);
                method.modifiers.is_static
                    && !method.modifiers.is_private()
                    && method.name == "getInstance"
                    && method.params.is_empty()
                    && types.is_same_type(method.return_type, expected_return)
            })
        });
        match config_type {
            Some(config_type) if valid => Some(config_type),
            _ => {
                let config = config_type
                    .and_then(|ty| types.decl_of(ty))
                    .map(|d| types.simple_name(d).to_string())
                    .unwrap_or_else(|| "<unset>".to_string());
                self.sink.emit(
                    BridgeErrorKind::InvalidMarshallerConfig { config },
                    ElementRef::Type(decl),
                    Some(handled),
                );
                None
            }
        }
    }
}
