//! End-to-end parsing of bridge declarations built with the `TypeContext`
//! builder API

use nbridge_processor::{
    parse, BridgeError, BridgeProcessor, DefinitionData, Direction, DirectionConfigs,
    MarshallerData, MarshallerKind, ReceiverStrategy, WellKnownTypes,
};
use nbridge_types::{
    AnnotationUse, AnnotationValue, ConstructorDecl, DeclId, FieldDecl, MethodDecl, Modifiers,
    Parameter, PrimitiveType, TypeContext, TypeDecl, TypeId,
};
use std::sync::Arc;

struct Fixture {
    ctx: TypeContext,
    known: WellKnownTypes,
    config: TypeId,
}

impl Fixture {
    fn new() -> Self {
        let mut ctx = TypeContext::new();
        let known = WellKnownTypes::install(&mut ctx).unwrap();
        let config_decl = ctx.declare(TypeDecl::class("demo", "DemoConfig")).unwrap();
        let marshaller_config = ctx.decl_type(known.marshaller_config);
        ctx.add_method(
            config_decl,
            MethodDecl::new("getInstance", marshaller_config)
                .with_modifiers(Modifiers::public().with_static()),
        );
        let config = ctx.decl_type(config_decl);
        Fixture { ctx, known, config }
    }

    fn marker(&self) -> AnnotationUse {
        AnnotationUse::marker(self.known.generate_host_to_native)
            .with("marshallerConfig", AnnotationValue::Type(self.config))
    }

    fn native_object(&self) -> TypeId {
        self.ctx.decl_type(self.known.native_object)
    }

    /// `Foo extends NativeObject implements Service` with the subclass constructor
    fn subclass_bridge(&mut self, service: DeclId) -> DeclId {
        let service_type = self.ctx.decl_type(service);
        let decl = TypeDecl::class("demo", "Foo")
            .extends(self.native_object())
            .implements(service_type)
            .with_modifiers(Modifiers::public().with_abstract())
            .annotated(self.marker());
        let foo = self.ctx.declare(decl).unwrap();
        let isolate = self.ctx.decl_type(self.known.native_isolate);
        let long = self.ctx.primitive(PrimitiveType::Long);
        let constructor = ConstructorDecl::new().param("isolate", isolate).param("handle", long);
        self.ctx.add_constructor(foo, constructor);
        foo
    }

    fn parse(&self, decl: DeclId) -> Result<DefinitionData, Vec<BridgeError>> {
        let configs = DirectionConfigs::presets(&self.ctx, &self.known);
        let (mine, other) = configs.pair(Direction::HostToNative);
        parse(&self.ctx, &self.known, mine, other, decl)
    }
}

fn codes(errors: &[BridgeError]) -> Vec<&'static str> {
    errors.iter().map(|e| e.code()).collect()
}

#[test]
fn test_missing_service_type_is_fatal() {
    let mut fx = Fixture::new();
    let foo = fx
        .ctx
        .declare(TypeDecl::class("demo", "Foo").annotated(fx.marker()))
        .unwrap();

    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB1003"]);
    assert_eq!(
        errors[0].help().unwrap(),
        "Implement the bridged interface or extend the bridged class."
    );
}

#[test]
fn test_nested_declaration_is_rejected() {
    let mut fx = Fixture::new();
    let outer = fx.ctx.declare(TypeDecl::class("demo", "Outer")).unwrap();
    let inner = fx
        .ctx
        .declare(TypeDecl::class("demo", "Inner").nested_in(outer).annotated(fx.marker()))
        .unwrap();
    assert_eq!(codes(&fx.parse(inner).unwrap_err()), vec!["NB1002"]);
}

#[test]
fn test_overload_ids() {
    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let int = fx.ctx.primitive(PrimitiveType::Int);
    let string = fx.ctx.string_type();
    let void = fx.ctx.void_type();
    fx.ctx.add_method(service, MethodDecl::new("f", void).param("x", int));
    fx.ctx.add_method(service, MethodDecl::new("f", void).param("s", string));
    fx.ctx.add_method(service, MethodDecl::new("g", void));
    let foo = fx.subclass_bridge(service);

    let definition = fx.parse(foo).unwrap();
    let ids: Vec<(String, usize)> = definition
        .methods
        .iter()
        .map(|m| (fx.ctx.method(m.method).name.clone(), m.overload_id))
        .collect();
    assert_eq!(
        ids,
        vec![("f".to_string(), 1), ("f".to_string(), 2), ("g".to_string(), 0)]
    );
    assert_eq!(definition.receiver_strategy(), ReceiverStrategy::Subclass);
    assert_eq!(definition.target_class_simple_name(&fx.ctx), "FooGen");
    assert_eq!(definition.constructor_params.len(), 2);
}

#[test]
fn test_equal_custom_marshallers_are_shared() {
    let mut fx = Fixture::new();
    let e = fx.ctx.type_variable("E");
    let list = fx
        .ctx
        .declare(TypeDecl::interface("demo", "List").with_type_params(vec![e]))
        .unwrap();
    let integer = fx.ctx.boxed_type(PrimitiveType::Int);
    let list_of_integer = fx.ctx.declared_type(list, vec![integer]);
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let void = fx.ctx.void_type();
    fx.ctx.add_method(
        service,
        MethodDecl::new("merge", void)
            .param("a", list_of_integer)
            .param("b", list_of_integer),
    );
    let foo = fx.subclass_bridge(service);

    let definition = fx.parse(foo).unwrap();
    let merge = &definition.methods[0];
    let (a, b) = (&merge.parameter_marshallers[0], &merge.parameter_marshallers[1]);
    assert!(Arc::ptr_eq(a, b));
    assert_eq!(a.name(), Some("listOfIntegerMarshaller"));
    assert_eq!(definition.custom_marshallers().len(), 1);
}

#[test]
fn test_missing_receiver_resolver() {
    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let service_type = fx.ctx.decl_type(service);
    let foo = fx
        .ctx
        .declare(TypeDecl::class("demo", "Foo").implements(service_type).annotated(fx.marker()))
        .unwrap();
    let object = fx.ctx.object_type();
    fx.ctx.add_method(
        foo,
        MethodDecl::new("resolveDispatch", service_type)
            .param("receiver", object)
            .with_modifiers(Modifiers::package().with_static())
            .annotated(AnnotationUse::marker(fx.known.dispatch_resolver)),
    );

    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB2005"]);
    assert_eq!(
        errors[0].help().unwrap(),
        "Add `@ReceiverResolver static Object resolveReceiver(Object receiver)` method."
    );
}

#[test]
fn test_explicit_receiver_skips_other_strategies() {
    let mut fx = Fixture::new();
    let object = fx.ctx.object_type();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let int = fx.ctx.primitive(PrimitiveType::Int);
    fx.ctx
        .add_method(service, MethodDecl::new("size", int).param("receiver", object));
    let service_type = fx.ctx.decl_type(service);
    let foo = fx
        .ctx
        .declare(TypeDecl::class("demo", "Foo").implements(service_type).annotated(fx.marker()))
        .unwrap();
    let dispatch = fx.ctx.add_method(
        foo,
        MethodDecl::new("resolveDispatch", service_type)
            .param("receiver", object)
            .with_modifiers(Modifiers::package().with_static())
            .annotated(AnnotationUse::marker(fx.known.dispatch_resolver)),
    );
    let receiver = fx.ctx.add_method(
        foo,
        MethodDecl::new("resolveReceiver", object)
            .param("receiver", object)
            .with_modifiers(Modifiers::package().with_static())
            .annotated(AnnotationUse::marker(fx.known.receiver_resolver)),
    );

    let definition = fx.parse(foo).unwrap();
    assert!(definition.has_explicit_receiver());
    assert_eq!(
        definition.receiver_strategy(),
        ReceiverStrategy::Explicit { dispatch, receiver }
    );
    assert!(definition.constructor_params.is_empty());
    let size = &definition.methods[0];
    assert_eq!(size.parameter_marshallers[0].kind(), MarshallerKind::Value);
}

#[test]
fn test_reference_to_proxy_subclass_ignores_factory() {
    let mut fx = Fixture::new();
    let isolate = fx.ctx.decl_type(fx.known.native_isolate);
    let long = fx.ctx.primitive(PrimitiveType::Long);
    let object = fx.ctx.object_type();
    let peer = fx
        .ctx
        .declare(TypeDecl::class("demo", "Peer").extends(fx.native_object()))
        .unwrap();
    let peer_type = fx.ctx.decl_type(peer);
    let constructor = ConstructorDecl::new().param("isolate", isolate).param("handle", long);
    fx.ctx.add_constructor(peer, constructor);
    fx.ctx.add_method(
        peer,
        MethodDecl::new("create", peer_type)
            .param("receiver", object)
            .with_modifiers(Modifiers::package().with_static())
            .annotated(AnnotationUse::marker(fx.known.factory)),
    );

    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let by_reference = AnnotationUse::marker(fx.known.by_reference)
        .with("value", AnnotationValue::Type(peer_type));
    fx.ctx
        .add_method(service, MethodDecl::new("peer", peer_type).annotated(by_reference));
    let foo = fx.subclass_bridge(service);

    let definition = fx.parse(foo).unwrap();
    let reference = definition.methods[0].return_marshaller.as_reference().unwrap().clone();
    assert_eq!(reference.reference_type, peer_type);
    assert_eq!(reference.factory, None);
    assert_eq!(reference.end_point_handle, None);
    assert!(reference.same_direction);
    assert_eq!(definition.reference_marshallers(), vec![reference]);
}

#[test]
fn test_reference_constructor_needs_same_arity() {
    let mut fx = Fixture::new();
    let isolate = fx.ctx.decl_type(fx.known.native_isolate);
    let long = fx.ctx.primitive(PrimitiveType::Long);
    let int = fx.ctx.primitive(PrimitiveType::Int);
    let peer = fx
        .ctx
        .declare(TypeDecl::class("demo", "Peer").extends(fx.native_object()))
        .unwrap();
    let peer_type = fx.ctx.decl_type(peer);
    fx.ctx.add_constructor(
        peer,
        ConstructorDecl::new()
            .param("isolate", isolate)
            .param("handle", long)
            .param("extra", int),
    );

    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let void = fx.ctx.void_type();
    let by_reference = AnnotationUse::marker(fx.known.by_reference)
        .with("value", AnnotationValue::Type(peer_type));
    fx.ctx.add_method(
        service,
        MethodDecl::new("accept", void)
            .with_param(Parameter::new("peer", peer_type).annotated(by_reference)),
    );
    let foo = fx.subclass_bridge(service);

    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB3002"]);
    assert_eq!(
        errors[0].to_string(),
        "The annotated type must have a single constructor with `(NativeIsolate, long)` signature."
    );
}

#[test]
fn test_reference_through_handle_field() {
    let mut fx = Fixture::new();
    let native_object = fx.native_object();
    let peer = fx.ctx.declare(TypeDecl::class("demo", "Peer")).unwrap();
    let peer_type = fx.ctx.decl_type(peer);
    fx.ctx.add_field(
        peer,
        FieldDecl::new("delegate", native_object)
            .with_modifiers(Modifiers::package().with_final())
            .annotated(AnnotationUse::marker(fx.known.end_point_handle)),
    );
    fx.ctx
        .add_constructor(peer, ConstructorDecl::new().param("delegate", native_object));

    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let by_reference = AnnotationUse::marker(fx.known.by_reference)
        .with("value", AnnotationValue::Type(peer_type));
    fx.ctx
        .add_method(service, MethodDecl::new("peer", peer_type).annotated(by_reference));
    let foo = fx.subclass_bridge(service);

    let definition = fx.parse(foo).unwrap();
    let reference = definition.methods[0].return_marshaller.as_reference().unwrap();
    assert!(reference.end_point_handle.is_some());
    assert!(reference.same_direction);
}

#[test]
fn test_idempotent_overloads_get_distinct_caches() {
    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let int = fx.ctx.primitive(PrimitiveType::Int);
    let idempotent = AnnotationUse::marker(fx.known.idempotent);
    fx.ctx
        .add_method(service, MethodDecl::new("get", int).annotated(idempotent.clone()));
    fx.ctx.add_method(
        service,
        MethodDecl::new("get", int).param("index", int).annotated(idempotent),
    );
    let foo = fx.subclass_bridge(service);

    let definition = fx.parse(foo).unwrap();
    let integer = fx.ctx.boxed_type(PrimitiveType::Int);
    let caches: Vec<(String, TypeId)> = definition
        .methods
        .iter()
        .filter_map(|m| m.cache.as_ref())
        .map(|c| (c.field_name.clone(), c.entry_type))
        .collect();
    assert_eq!(
        caches,
        vec![("getCache".to_string(), integer), ("getCache2".to_string(), integer)]
    );
}

#[test]
fn test_idempotent_void_is_rejected() {
    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let void = fx.ctx.void_type();
    fx.ctx.add_method(
        service,
        MethodDecl::new("reset", void).annotated(AnnotationUse::marker(fx.known.idempotent)),
    );
    let foo = fx.subclass_bridge(service);

    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB4003"]);
}

#[test]
fn test_primitive_array_directions() {
    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let void = fx.ctx.void_type();
    let bytes = fx.ctx.array_type(fx.ctx.primitive(PrimitiveType::Byte));
    fx.ctx.add_method(
        service,
        MethodDecl::new("read", void)
            .with_param(
                Parameter::new("input", bytes).annotated(AnnotationUse::marker(fx.known.in_)),
            )
            .with_param(
                Parameter::new("output", bytes).annotated(AnnotationUse::marker(fx.known.out)),
            ),
    );
    let foo = fx.subclass_bridge(service);

    let definition = fx.parse(foo).unwrap();
    let read = &definition.methods[0];
    assert_eq!(*read.parameter_marshallers[0], MarshallerData::no_marshaller());
    assert_eq!(read.parameter_marshallers[1].directions().len(), 1);
}

#[test]
fn test_expected_errors_are_swallowed() {
    let mut fx = Fixture::new();
    let expect = AnnotationUse::marker(fx.known.expect_error.unwrap()).with(
        "value",
        AnnotationValue::Str(
            "The annotated type must have a non `Object` super class or implement a single interface.".to_string(),
        ),
    );
    let foo = fx
        .ctx
        .declare(TypeDecl::class("demo", "Foo").annotated(fx.marker()).annotated(expect))
        .unwrap();

    let errors = fx.parse(foo).unwrap_err();
    assert!(errors.is_empty());
}

#[test]
fn test_processor_parses_every_marked_declaration() {
    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let foo = fx.subclass_bridge(service);
    let broken = fx
        .ctx
        .declare(TypeDecl::class("demo", "Broken").annotated(fx.marker()))
        .unwrap();

    let configs = DirectionConfigs::presets(&fx.ctx, &fx.known);
    let processor = BridgeProcessor::new(&fx.ctx, &fx.known, &configs);
    let results = processor.process(None);
    assert_eq!(results.len(), 2);
    let outcome: Vec<(DeclId, bool)> = results.iter().map(|r| (r.decl, r.is_ok())).collect();
    assert!(outcome.contains(&(foo, true)));
    assert!(outcome.contains(&(broken, false)));

    let filtered = processor.process(Some("demo.Broken"));
    assert_eq!(filtered.len(), 1);
    assert_eq!(codes(filtered[0].errors()), vec!["NB1003"]);
}

#[test]
fn test_receiver_resolver_without_dispatch_resolver() {
    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let service_type = fx.ctx.decl_type(service);
    let foo = fx
        .ctx
        .declare(TypeDecl::class("demo", "Foo").implements(service_type).annotated(fx.marker()))
        .unwrap();
    let object = fx.ctx.object_type();
    fx.ctx.add_method(
        foo,
        MethodDecl::new("resolveReceiver", object)
            .param("receiver", object)
            .with_modifiers(Modifiers::package().with_static())
            .annotated(AnnotationUse::marker(fx.known.receiver_resolver)),
    );

    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB2004"]);
    assert_eq!(
        errors[0].help().unwrap(),
        "Add `@DispatchResolver static Service resolveDispatch(Object receiver)` method."
    );
}

/// `Peer` with a factory method and the given bridge markers, referenced from `Service.peer()`
fn factory_reference(fx: &mut Fixture, markers: &[DeclId]) -> (TypeId, DeclId) {
    let object = fx.ctx.object_type();
    let mut decl = TypeDecl::class("demo", "Peer");
    for &marker in markers {
        let config = AnnotationValue::Type(fx.config);
        decl = decl.annotated(AnnotationUse::marker(marker).with("marshallerConfig", config));
    }
    let peer = fx.ctx.declare(decl).unwrap();
    let peer_type = fx.ctx.decl_type(peer);
    fx.ctx.add_method(
        peer,
        MethodDecl::new("create", peer_type)
            .param("receiver", object)
            .with_modifiers(Modifiers::package().with_static())
            .annotated(AnnotationUse::marker(fx.known.factory)),
    );

    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let by_reference = AnnotationUse::marker(fx.known.by_reference)
        .with("value", AnnotationValue::Type(peer_type));
    fx.ctx
        .add_method(service, MethodDecl::new("peer", peer_type).annotated(by_reference));
    (peer_type, fx.subclass_bridge(service))
}

#[test]
fn test_factory_reference_takes_direction_from_marker() {
    let mut fx = Fixture::new();
    let same = fx.known.generate_host_to_native;
    let (_, foo) = factory_reference(&mut fx, &[same]);
    let definition = fx.parse(foo).unwrap();
    let reference = definition.methods[0].return_marshaller.as_reference().unwrap();
    assert!(reference.same_direction);
    assert!(reference.factory.is_some());
    assert_eq!(reference.reference_type, fx.native_object());

    let mut fx = Fixture::new();
    let opposite = fx.known.generate_native_to_host;
    let (_, foo) = factory_reference(&mut fx, &[opposite]);
    let definition = fx.parse(foo).unwrap();
    let reference = definition.methods[0].return_marshaller.as_reference().unwrap();
    assert!(!reference.same_direction);
    assert!(reference.factory.is_some());
    assert_eq!(reference.reference_type, fx.ctx.decl_type(fx.known.host_object));
}

#[test]
fn test_factory_reference_needs_exactly_one_marker() {
    let mut fx = Fixture::new();
    let (_, foo) = factory_reference(&mut fx, &[]);
    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB5002"]);
    assert_eq!(
        errors[0].to_string(),
        "The `Peer` must be an explicit receiver class annotated by `GenerateHostToNativeBridge` or \
         `GenerateNativeToHostBridge`."
    );

    let mut fx = Fixture::new();
    let both = [fx.known.generate_host_to_native, fx.known.generate_native_to_host];
    let (_, foo) = factory_reference(&mut fx, &both);
    assert_eq!(codes(&fx.parse(foo).unwrap_err()), vec!["NB5002"]);
}

#[test]
fn test_use_receiver_resolver_needs_explicit_receiver() {
    let mut fx = Fixture::new();
    let isolate = fx.ctx.decl_type(fx.known.native_isolate);
    let long = fx.ctx.primitive(PrimitiveType::Long);
    let peer = fx
        .ctx
        .declare(TypeDecl::class("demo", "Peer").extends(fx.native_object()))
        .unwrap();
    let peer_type = fx.ctx.decl_type(peer);
    let constructor = ConstructorDecl::new().param("isolate", isolate).param("handle", long);
    fx.ctx.add_constructor(peer, constructor);

    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let by_reference = AnnotationUse::marker(fx.known.by_reference)
        .with("value", AnnotationValue::Type(peer_type))
        .with("useReceiverResolver", AnnotationValue::Bool(true));
    fx.ctx
        .add_method(service, MethodDecl::new("peer", peer_type).annotated(by_reference));
    let foo = fx.subclass_bridge(service);

    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB5001"]);
    assert_eq!(
        errors[0].to_string(),
        "UseReceiverResolver can be used only for types with explicit receiver."
    );
}

#[test]
fn test_receiver_method_lookup() {
    let receiver_method = |fx: &Fixture| {
        AnnotationUse::marker(fx.known.receiver_method)
            .with("value", AnnotationValue::Str("length".into()))
    };

    let mut fx = Fixture::new();
    let int = fx.ctx.primitive(PrimitiveType::Int);
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let annotation = receiver_method(&fx);
    fx.ctx
        .add_method(service, MethodDecl::new("size", int).annotated(annotation));
    fx.ctx.add_method(service, MethodDecl::new("length", int));
    let foo = fx.subclass_bridge(service);
    let definition = fx.parse(foo).unwrap();
    let size = definition
        .methods
        .iter()
        .find(|m| fx.ctx.method(m.method).name == "size")
        .unwrap();
    assert_eq!(size.receiver_method.as_deref(), Some("length"));

    let mut fx = Fixture::new();
    let int = fx.ctx.primitive(PrimitiveType::Int);
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let annotation = receiver_method(&fx);
    fx.ctx
        .add_method(service, MethodDecl::new("size", int).annotated(annotation));
    let foo = fx.subclass_bridge(service);
    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB4004"]);
    assert_eq!(errors[0].to_string(), "Method `length()` is not found in `Service`.");

    let mut fx = Fixture::new();
    let int = fx.ctx.primitive(PrimitiveType::Int);
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let annotation = receiver_method(&fx);
    fx.ctx
        .add_method(service, MethodDecl::new("size", int).annotated(annotation));
    fx.ctx.add_method(
        service,
        MethodDecl::new("length", int).with_modifiers(Modifiers::public().with_static()),
    );
    let foo = fx.subclass_bridge(service);
    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB4005"]);
    assert_eq!(
        errors[0].to_string(),
        "Receiver method `length` must be a non private instance method."
    );
}

#[test]
fn test_exception_handler_shape() {
    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let foo = fx.subclass_bridge(service);
    let boolean = fx.ctx.primitive(PrimitiveType::Boolean);
    let context = fx.ctx.decl_type(fx.known.exception_handler_context);
    let handler = fx.ctx.add_method(
        foo,
        MethodDecl::new("handle", boolean)
            .param("context", context)
            .with_modifiers(Modifiers::package().with_static())
            .annotated(AnnotationUse::marker(fx.known.exception_handler)),
    );
    assert_eq!(fx.parse(foo).unwrap().exception_handler, Some(handler));

    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let foo = fx.subclass_bridge(service);
    let boolean = fx.ctx.primitive(PrimitiveType::Boolean);
    let object = fx.ctx.object_type();
    fx.ctx.add_method(
        foo,
        MethodDecl::new("handle", boolean)
            .param("error", object)
            .with_modifiers(Modifiers::package().with_static())
            .annotated(AnnotationUse::marker(fx.known.exception_handler)),
    );
    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB2007"]);
    assert!(errors[0].to_string().contains("`ExceptionHandlerContext`"));
}

#[test]
fn test_private_end_point_handle_is_rejected() {
    let mut fx = Fixture::new();
    let native_object = fx.native_object();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let service_type = fx.ctx.decl_type(service);
    let foo = fx
        .ctx
        .declare(TypeDecl::class("demo", "Foo").implements(service_type).annotated(fx.marker()))
        .unwrap();
    fx.ctx.add_field(
        foo,
        FieldDecl::new("delegate", native_object)
            .with_modifiers(Modifiers::private().with_final())
            .annotated(AnnotationUse::marker(fx.known.end_point_handle)),
    );
    fx.ctx
        .add_constructor(foo, ConstructorDecl::new().param("delegate", native_object));

    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB2008"]);
    assert!(errors[0].to_string().contains("`NativeObject`"));
}

#[test]
fn test_concrete_method_on_bridge_must_be_final() {
    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let foo = fx.subclass_bridge(service);
    let int = fx.ctx.primitive(PrimitiveType::Int);
    fx.ctx
        .add_method(foo, MethodDecl::new("helper", int).with_modifiers(Modifiers::public()));

    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB4001"]);

    let mut fx = Fixture::new();
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let foo = fx.subclass_bridge(service);
    let int = fx.ctx.primitive(PrimitiveType::Int);
    fx.ctx.add_method(
        foo,
        MethodDecl::new("helper", int).with_modifiers(Modifiers::public().with_final()),
    );
    assert!(fx.parse(foo).unwrap().methods.is_empty());
}

#[test]
fn test_service_type_fixes() {
    let mut fx = Fixture::new();
    let base = fx.ctx.declare(TypeDecl::class("demo", "Base")).unwrap();
    let base_type = fx.ctx.decl_type(base);
    let service = fx.ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
    let service_type = fx.ctx.decl_type(service);
    let foo = fx
        .ctx
        .declare(
            TypeDecl::class("demo", "Foo")
                .extends(base_type)
                .implements(service_type)
                .annotated(fx.marker()),
        )
        .unwrap();
    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB1003"]);
    assert_eq!(
        errors[0].help().unwrap(),
        "Introduce a new bridged base class extending `Base` and implementing `Service` and extend it."
    );

    let mut fx = Fixture::new();
    let first = fx.ctx.declare(TypeDecl::interface("demo", "First")).unwrap();
    let second = fx.ctx.declare(TypeDecl::interface("demo", "Second")).unwrap();
    let first_type = fx.ctx.decl_type(first);
    let second_type = fx.ctx.decl_type(second);
    let foo = fx
        .ctx
        .declare(
            TypeDecl::class("demo", "Foo")
                .implements(first_type)
                .implements(second_type)
                .annotated(fx.marker()),
        )
        .unwrap();
    let errors = fx.parse(foo).unwrap_err();
    assert_eq!(codes(&errors), vec!["NB1003"]);
    assert_eq!(
        errors[0].help().unwrap(),
        "Introduce a new bridged interface extending `First`, `Second` and implement it."
    );
}
