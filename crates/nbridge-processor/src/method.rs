//! Method data for the generated class

use crate::definition::{CacheData, MethodData};
use crate::error::BridgeErrorKind;
use crate::parser::BridgeParser;
use crate::signature::signature;
use nbridge_types::{AnnotationUse, DeclId, ElementRef, MethodId, Type, TypeId, TypeInfo};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

/// Methods the generated class overrides, in declaration order
pub fn methods_to_generate<T: TypeInfo + ?Sized>(
    types: &T,
    annotated: DeclId,
    proxy_base: TypeId,
    methods: &[MethodId],
) -> Vec<MethodId> {
    let package = &types.decl(annotated).package;
    let object = types.object_type();
    methods
        .iter()
        .copied()
        .filter(|&m| {
            let method = types.method(m);
            let modifiers = &method.modifiers;
            if modifiers.is_static
                || modifiers.is_native
                || modifiers.is_final
                || modifiers.is_private()
            {
                return false;
            }
            let owner_type = types.decl_type(method.owner);
            if types.is_same_type(owner_type, object)
                || types.decl_of(proxy_base) == Some(method.owner)
            {
                return false;
            }
            modifiers.is_public() || types.decl(method.owner).package == *package
        })
        .collect()
}

/// Overload index per method: 1-based for repeated names, 0 otherwise
pub fn overload_ids<T: TypeInfo + ?Sized>(types: &T, methods: &[MethodId]) -> Vec<usize> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for &m in methods {
        *counts.entry(types.method(m).name.as_str()).or_default() += 1;
    }
    let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
    methods
        .iter()
        .map(|&m| {
            let name = types.method(m).name.as_str();
            if counts.get(name).copied().unwrap_or(0) > 1 {
                let id = seen.entry(name).or_default();
                *id += 1;
                *id
            } else {
                0
            }
        })
        .collect()
}

/// `<name>Cache`, then `<name>Cache2`, `<name>Cache3`, ...
pub fn cache_field_name(name: &str, used: &mut FxHashSet<String>) -> String {
    let base = format!("{}Cache", name);
    let mut candidate = base.clone();
    let mut index = 2;
    while used.contains(&candidate) {
        candidate = format!("{}{}", base, index);
        index += 1;
    }
    used.insert(candidate.clone());
    candidate
}

impl<'a, T: TypeInfo + ?Sized> BridgeParser<'a, T> {
    /// Build method data for every generated method
    pub(crate) fn create_method_data(
        &mut self,
        annotated_type: TypeId,
        annotated: DeclId,
        service_type: TypeId,
        methods: &[MethodId],
        explicit_receiver: bool,
        enforce_idempotent: bool,
    ) -> Vec<MethodData> {
        let types = self.types;
        let known = self.known;
        let candidates =
            methods_to_generate(types, annotated, self.mine.proxy_base_type(), methods);
        let overloads = overload_ids(types, &candidates);
        let mut cache_names = FxHashSet::default();
        let mut result = Vec::with_capacity(candidates.len());

        for (&method, overload_id) in candidates.iter().zip(overloads) {
            let decl = types.method(method);
            let element = ElementRef::Method(method);
            trace!(method = %decl.name, overload_id, "method candidate");
            if decl.owner == annotated && !decl.modifiers.is_abstract {
                self.sink.emit(
                    BridgeErrorKind::NonFinalConcreteMethod {
                        annotated: types.simple_name(annotated).to_string(),
                    },
                    element,
                    None,
                );
            }

            let signature = types.as_member_of(annotated_type, method);
            let mut parameter_marshallers = Vec::with_capacity(signature.params.len());
            for (index, (&ty, param)) in signature.params.iter().zip(&decl.params).enumerate() {
                if explicit_receiver && index == 0 {
                    if !types.get(types.erasure(ty)).is_declared() {
                        self.sink.emit(
                            BridgeErrorKind::MissingReceiverParameter {
                                dispatch_marker: types
                                    .simple_name(known.dispatch_resolver)
                                    .to_string(),
                                receiver_marker: types
                                    .simple_name(known.receiver_resolver)
                                    .to_string(),
                            },
                            element,
                            None,
                        );
                    }
                    parameter_marshallers.push(self.no_marshaller.clone());
                    continue;
                }
                let marshaller =
                    self.lookup_marshaller(method, ty, &param.annotations, explicit_receiver);
                parameter_marshallers.push(marshaller);
            }
            if explicit_receiver && signature.params.is_empty() {
                self.sink.emit(
                    BridgeErrorKind::MissingReceiverParameter {
                        dispatch_marker: types.simple_name(known.dispatch_resolver).to_string(),
                        receiver_marker: types.simple_name(known.receiver_resolver).to_string(),
                    },
                    element,
                    None,
                );
            }
            let return_type = signature.return_type;
            let return_marshaller =
                self.lookup_marshaller(method, return_type, &decl.annotations, explicit_receiver);

            let cache = self.cache_data(method, return_type, enforce_idempotent, &mut cache_names);
            let receiver_method =
                self.receiver_method(method, &signature.params, return_type, service_type);

            result.push(MethodData {
                method,
                signature,
                overload_id,
                receiver_method,
                return_marshaller,
                parameter_marshallers,
                cache,
            });
        }
        debug!(count = result.len(), "method data created");
        result
    }

    fn cache_data(
        &mut self,
        method: MethodId,
        return_type: TypeId,
        enforce_idempotent: bool,
        used: &mut FxHashSet<String>,
    ) -> Option<CacheData> {
        let types = self.types;
        let known = self.known;
        let decl = types.method(method);
        let idempotent = decl.annotation_of(known.idempotent);
        let returns_void = types.get(return_type).is_void();
        if let Some(annotation) = idempotent {
            if returns_void {
                self.sink.emit(
                    BridgeErrorKind::IdempotentVoid {
                        marker: types.simple_name(known.idempotent).to_string(),
                    },
                    ElementRef::Method(method),
                    Some(annotation),
                );
                return None;
            }
        }
        if idempotent.is_none() && !(enforce_idempotent && !returns_void) {
            return None;
        }
        let entry_type = match *types.get(return_type) {
            Type::Primitive(primitive) => types.boxed(primitive),
            _ => return_type,
        };
        Some(CacheData {
            field_name: cache_field_name(&decl.name, used),
            entry_type,
        })
    }

    fn receiver_method(
        &mut self,
        method: MethodId,
        params: &[TypeId],
        return_type: TypeId,
        service_type: TypeId,
    ) -> Option<String> {
        let types = self.types;
        let marker = self.known.receiver_method;
        let annotation = types.method(method).annotation_of(marker)?;
        let name = annotation.value("value")?.as_str()?.to_string();
        let Some(service) = types.decl_of(service_type) else {
            return Some(name);
        };
        let found = types.all_methods(service).into_iter().find(|&candidate| {
            if types.method(candidate).name != name {
                return false;
            }
            let resolved = types.as_member_of(service_type, candidate);
            resolved.params.len() == params.len()
                && resolved
                    .params
                    .iter()
                    .zip(params)
                    .all(|(&a, &b)| types.is_same_type(a, b))
                && types.is_subtype(resolved.return_type, return_type)
        });
        self.check_receiver_method(method, annotation, found, &name, params, service_type);
        Some(name)
    }

    fn check_receiver_method(
        &mut self,
        method: MethodId,
        annotation: &AnnotationUse,
        found: Option<MethodId>,
        name: &str,
        params: &[TypeId],
        service_type: TypeId,
    ) {
        let types = self.types;
        let kind = match found {
            None => BridgeErrorKind::ReceiverMethodNotFound {
                name: name.to_string(),
                signature: signature(types, params, false, false),
                service: types.type_name(service_type),
            },
            Some(found) => {
                let modifiers = &types.method(found).modifiers;
                if !modifiers.is_static && !modifiers.is_private() {
                    return;
                }
                BridgeErrorKind::ReceiverMethodNotInstance { name: name.to_string() }
            }
        };
        self.sink.emit(kind, ElementRef::Method(method), Some(annotation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbridge_types::{MethodDecl, Modifiers, PrimitiveType, TypeContext, TypeDecl};

    #[test]
    fn test_overload_ids() {
        let mut ctx = TypeContext::new();
        let foo = ctx.declare(TypeDecl::class("demo", "Foo")).unwrap();
        let int = ctx.primitive(PrimitiveType::Int);
        let string = ctx.string_type();
        let void = ctx.void_type();
        let f1 = ctx.add_method(foo, MethodDecl::new("f", void).param("x", int));
        let f2 = ctx.add_method(foo, MethodDecl::new("f", void).param("s", string));
        let g = ctx.add_method(foo, MethodDecl::new("g", void));
        assert_eq!(overload_ids(&ctx, &[f1, f2, g]), vec![1, 2, 0]);
    }

    #[test]
    fn test_cache_field_names() {
        let mut used = FxHashSet::default();
        assert_eq!(cache_field_name("get", &mut used), "getCache");
        assert_eq!(cache_field_name("get", &mut used), "getCache2");
        assert_eq!(cache_field_name("get", &mut used), "getCache3");
        assert_eq!(cache_field_name("size", &mut used), "sizeCache");
    }

    #[test]
    fn test_methods_to_generate_filters() {
        let mut ctx = TypeContext::new();
        let base = ctx.declare(TypeDecl::class("nbridge", "NativeObject")).unwrap();
        let base_type = ctx.decl_type(base);
        let service = ctx.declare(TypeDecl::class("other", "Service")).unwrap();
        let service_type = ctx.decl_type(service);
        let foo = ctx.declare(TypeDecl::class("demo", "Foo").extends(service_type)).unwrap();
        let void = ctx.void_type();

        let public = ctx.add_method(service, MethodDecl::new("run", void));
        let hidden = ctx.add_method(
            service,
            MethodDecl::new("hidden", void).with_modifiers(Modifiers::package()),
        );
        let fixed = ctx.add_method(
            service,
            MethodDecl::new("fixed", void).with_modifiers(Modifiers::public().with_final()),
        );
        let helper = ctx.add_method(
            foo,
            MethodDecl::new("helper", void).with_modifiers(Modifiers::public().with_static()),
        );
        let local = ctx.add_method(
            foo,
            MethodDecl::new("local", void).with_modifiers(Modifiers::package().with_abstract()),
        );
        let on_base = ctx.add_method(base, MethodDecl::new("release", void));

        let methods = [public, hidden, fixed, helper, local, on_base];
        assert_eq!(methods_to_generate(&ctx, foo, base_type, &methods), vec![public, local]);
    }
}
