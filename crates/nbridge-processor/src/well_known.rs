//! Well-known bridge declarations
//!
//! Marker annotations and runtime base types live in the `nbridge` package.
//! Their ids are resolved once per universe and cached here for fast
//! comparison while scanning members.

use nbridge_types::{
    AnnotationValue, ConstructorDecl, DeclId, MethodDecl, Modifiers, PrimitiveType, TypeContext,
    TypeDecl, TypeError, TypeInfo,
};

/// Package holding the bridge annotations and runtime types
pub const BRIDGE_PACKAGE: &str = "nbridge";

/// Cached ids of the bridge annotations and runtime types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownTypes {
    /// nbridge.ByReference
    pub by_reference: DeclId,
    /// nbridge.DispatchResolver
    pub dispatch_resolver: DeclId,
    /// nbridge.ReceiverResolver
    pub receiver_resolver: DeclId,
    /// nbridge.ExceptionHandler
    pub exception_handler: DeclId,
    /// nbridge.EndPointHandle
    pub end_point_handle: DeclId,
    /// nbridge.Factory
    pub factory: DeclId,
    /// nbridge.Idempotent
    pub idempotent: DeclId,
    /// nbridge.In
    pub in_: DeclId,
    /// nbridge.Out
    pub out: DeclId,
    /// nbridge.ReceiverMethod
    pub receiver_method: DeclId,
    /// nbridge.AnnotationAction
    pub annotation_action: DeclId,
    /// nbridge.AnnotationActionRepeated
    pub annotation_action_repeated: DeclId,
    /// nbridge.MarshallerAnnotation
    pub marshaller_annotation: DeclId,
    /// nbridge.GenerateHostToNativeBridge
    pub generate_host_to_native: DeclId,
    /// nbridge.GenerateNativeToHostBridge
    pub generate_native_to_host: DeclId,
    /// nbridge.MarshallerConfig
    pub marshaller_config: DeclId,
    /// nbridge.NativeObject
    pub native_object: DeclId,
    /// nbridge.NativeIsolate
    pub native_isolate: DeclId,
    /// nbridge.HostObject
    pub host_object: DeclId,
    /// nbridge.JniEnv
    pub jni_env: DeclId,
    /// nbridge.JObject
    pub j_object: DeclId,
    /// nbridge.ExceptionHandlerContext
    pub exception_handler_context: DeclId,
    /// nbridge.ExpectError, only present in self-testing universes
    pub expect_error: Option<DeclId>,
}

fn ensure(ctx: &mut TypeContext, decl: TypeDecl) -> Result<(DeclId, bool), TypeError> {
    match ctx.lookup_decl(&decl.qualified_name()) {
        Some(id) => Ok((id, false)),
        None => Ok((ctx.declare(decl)?, true)),
    }
}

fn marker(ctx: &mut TypeContext, name: &str) -> Result<DeclId, TypeError> {
    Ok(ensure(ctx, TypeDecl::annotation(BRIDGE_PACKAGE, name))?.0)
}

fn class(ctx: &mut TypeContext, name: &str) -> Result<(DeclId, bool), TypeError> {
    ensure(ctx, TypeDecl::class(BRIDGE_PACKAGE, name))
}

fn lookup<T: TypeInfo + ?Sized>(types: &T, name: &str) -> Result<DeclId, TypeError> {
    let qualified = format!("{}.{}", BRIDGE_PACKAGE, name);
    types
        .lookup_decl(&qualified)
        .ok_or(TypeError::UndefinedType { name: qualified })
}

impl WellKnownTypes {
    /// Declare the bridge package in a synthetic universe
    ///
    /// Declarations that already exist (for example loaded from a manifest)
    /// are reused; missing ones are created with their attributes and
    /// runtime members.
    pub fn install(ctx: &mut TypeContext) -> Result<Self, TypeError> {
        let empty = || Some(AnnotationValue::Str(String::new()));

        let by_reference = ensure(
            ctx,
            TypeDecl::annotation(BRIDGE_PACKAGE, "ByReference")
                .attribute("value", None)
                .attribute("useReceiverResolver", Some(AnnotationValue::Bool(false))),
        )?
        .0;
        let dispatch_resolver = marker(ctx, "DispatchResolver")?;
        let receiver_resolver = marker(ctx, "ReceiverResolver")?;
        let exception_handler = marker(ctx, "ExceptionHandler")?;
        let end_point_handle = marker(ctx, "EndPointHandle")?;
        let factory = marker(ctx, "Factory")?;
        let idempotent = marker(ctx, "Idempotent")?;
        let in_ = ensure(
            ctx,
            TypeDecl::annotation(BRIDGE_PACKAGE, "In")
                .attribute("arrayOffsetParameter", empty())
                .attribute("arrayLengthParameter", empty()),
        )?
        .0;
        let out = ensure(
            ctx,
            TypeDecl::annotation(BRIDGE_PACKAGE, "Out")
                .attribute("arrayOffsetParameter", empty())
                .attribute("arrayLengthParameter", empty())
                .attribute("trimToResult", Some(AnnotationValue::Bool(false))),
        )?
        .0;
        let receiver_method = ensure(
            ctx,
            TypeDecl::annotation(BRIDGE_PACKAGE, "ReceiverMethod").attribute("value", None),
        )?
        .0;
        let (annotation_action, created) = ensure(
            ctx,
            TypeDecl::annotation(BRIDGE_PACKAGE, "AnnotationAction")
                .attribute("value", None)
                .attribute("action", None),
        )?;
        if created {
            ctx.declare(
                TypeDecl::enumeration(BRIDGE_PACKAGE, "Action").nested_in(annotation_action),
            )?;
        }
        let annotation_action_repeated = ensure(
            ctx,
            TypeDecl::annotation(BRIDGE_PACKAGE, "AnnotationActionRepeated")
                .attribute("value", None),
        )?
        .0;
        let marshaller_annotation = marker(ctx, "MarshallerAnnotation")?;
        let generate_host_to_native = ensure(
            ctx,
            TypeDecl::annotation(BRIDGE_PACKAGE, "GenerateHostToNativeBridge")
                .attribute("marshallerConfig", None),
        )?
        .0;
        let generate_native_to_host = ensure(
            ctx,
            TypeDecl::annotation(BRIDGE_PACKAGE, "GenerateNativeToHostBridge")
                .attribute("marshallerConfig", None),
        )?
        .0;
        let expect_error = Some(
            ensure(
                ctx,
                TypeDecl::annotation(BRIDGE_PACKAGE, "ExpectError").attribute("value", None),
            )?
            .0,
        );

        let (marshaller_config, _) = class(ctx, "MarshallerConfig")?;
        let (native_isolate, _) = class(ctx, "NativeIsolate")?;
        let (jni_env, _) = class(ctx, "JniEnv")?;
        let (j_object, _) = class(ctx, "JObject")?;
        let (exception_handler_context, _) = class(ctx, "ExceptionHandlerContext")?;

        let (native_object, created) = class(ctx, "NativeObject")?;
        if created {
            let isolate = ctx.decl_type(native_isolate);
            let long = ctx.primitive(PrimitiveType::Long);
            ctx.add_constructor(
                native_object,
                ConstructorDecl::new()
                    .param("isolate", isolate)
                    .param("handle", long),
            );
            let isolate_getter = MethodDecl::new("getIsolate", isolate)
                .with_modifiers(Modifiers::public().with_final());
            ctx.add_method(native_object, isolate_getter);
            ctx.add_method(
                native_object,
                MethodDecl::new("getHandle", long).with_modifiers(Modifiers::public().with_final()),
            );
        }

        let (host_object, created) = class(ctx, "HostObject")?;
        if created {
            let env = ctx.decl_type(jni_env);
            let object = ctx.decl_type(j_object);
            ctx.add_constructor(
                host_object,
                ConstructorDecl::new().param("env", env).param("handle", object),
            );
            ctx.add_method(
                host_object,
                MethodDecl::new("getHandle", object)
                    .with_modifiers(Modifiers::public().with_final()),
            );
        }

        Ok(WellKnownTypes {
            by_reference,
            dispatch_resolver,
            receiver_resolver,
            exception_handler,
            end_point_handle,
            factory,
            idempotent,
            in_,
            out,
            receiver_method,
            annotation_action,
            annotation_action_repeated,
            marshaller_annotation,
            generate_host_to_native,
            generate_native_to_host,
            marshaller_config,
            native_object,
            native_isolate,
            host_object,
            jni_env,
            j_object,
            exception_handler_context,
            expect_error,
        })
    }

    /// Look up the bridge package in an existing universe
    pub fn resolve<T: TypeInfo + ?Sized>(types: &T) -> Result<Self, TypeError> {
        Ok(WellKnownTypes {
            by_reference: lookup(types, "ByReference")?,
            dispatch_resolver: lookup(types, "DispatchResolver")?,
            receiver_resolver: lookup(types, "ReceiverResolver")?,
            exception_handler: lookup(types, "ExceptionHandler")?,
            end_point_handle: lookup(types, "EndPointHandle")?,
            factory: lookup(types, "Factory")?,
            idempotent: lookup(types, "Idempotent")?,
            in_: lookup(types, "In")?,
            out: lookup(types, "Out")?,
            receiver_method: lookup(types, "ReceiverMethod")?,
            annotation_action: lookup(types, "AnnotationAction")?,
            annotation_action_repeated: lookup(types, "AnnotationActionRepeated")?,
            marshaller_annotation: lookup(types, "MarshallerAnnotation")?,
            generate_host_to_native: lookup(types, "GenerateHostToNativeBridge")?,
            generate_native_to_host: lookup(types, "GenerateNativeToHostBridge")?,
            marshaller_config: lookup(types, "MarshallerConfig")?,
            native_object: lookup(types, "NativeObject")?,
            native_isolate: lookup(types, "NativeIsolate")?,
            host_object: lookup(types, "HostObject")?,
            jni_env: lookup(types, "JniEnv")?,
            j_object: lookup(types, "JObject")?,
            exception_handler_context: lookup(types, "ExceptionHandlerContext")?,
            expect_error: lookup(types, "ExpectError").ok(),
        })
    }

    /// Check if an annotation is one of the two direction markers
    pub fn is_bridge_marker(&self, annotation: DeclId) -> bool {
        annotation == self.generate_host_to_native || annotation == self.generate_native_to_host
    }

    /// Check if an annotation is an array direction modifier (`In`/`Out`)
    pub fn is_direction_modifier(&self, annotation: DeclId) -> bool {
        annotation == self.in_ || annotation == self.out
    }

    /// Check if an annotation is the self-test marker
    pub fn is_expect_error(&self, annotation: DeclId) -> bool {
        self.expect_error == Some(annotation)
    }
}
