//! Bridge declaration parser
//!
//! [`BridgeParser`] resolves one annotated declaration into a
//! [`DefinitionData`]. Resolution runs top-down: the annotated type, the
//! service type, annotation actions, the marshaller config, marker members,
//! the constructor and finally per-method data. Structural problems abort
//! immediately; everything else is accumulated so a single run reports as
//! much as possible.

use crate::actions::AnnotationActions;
use crate::config::Configuration;
use crate::constructor::ConstructorPolicy;
use crate::definition::DefinitionData;
use crate::error::{BridgeError, BridgeErrorKind};
use crate::marshaller::MarshallerData;
use crate::sink::ErrorSink;
use crate::signature::{print_field, print_method};
use crate::well_known::WellKnownTypes;
use nbridge_types::{AnnotationUse, DeclId, ElementRef, Modifiers, TypeId, TypeInfo};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, info_span};

/// Per-declaration parser state
pub struct BridgeParser<'a, T: TypeInfo + ?Sized> {
    pub(crate) types: &'a T,
    pub(crate) known: &'a WellKnownTypes,
    pub(crate) mine: &'a Configuration,
    pub(crate) other: &'a Configuration,
    pub(crate) sink: ErrorSink<'a, T>,
    pub(crate) actions: AnnotationActions,
    pub(crate) marshallers: FxHashMap<(TypeId, Vec<AnnotationUse>), Arc<MarshallerData>>,
    pub(crate) no_marshaller: Arc<MarshallerData>,
}

impl<'a, T: TypeInfo + ?Sized> BridgeParser<'a, T> {
    /// Create a parser for the direction described by `mine`
    pub fn new(
        types: &'a T,
        known: &'a WellKnownTypes,
        mine: &'a Configuration,
        other: &'a Configuration,
    ) -> Self {
        BridgeParser {
            types,
            known,
            mine,
            other,
            sink: ErrorSink::new(types, known),
            actions: AnnotationActions::with_defaults(types, known),
            marshallers: FxHashMap::default(),
            no_marshaller: Arc::new(MarshallerData::no_marshaller()),
        }
    }

    /// Resolve a bridge declaration
    ///
    /// Returns the reported errors when anything went wrong, including
    /// errors swallowed by `ExpectError`; the list may then be empty.
    pub fn parse(mut self, element: ElementRef) -> Result<DefinitionData, Vec<BridgeError>> {
        let span = info_span!("parse", element = ?element, direction = %self.mine.direction());
        let _guard = span.enter();
        match self.resolve(element) {
            Some(definition) if !self.sink.has_errors() => {
                self.check_expectations(&definition);
                if self.sink.has_errors() {
                    Err(self.sink.into_errors())
                } else {
                    Ok(definition)
                }
            }
            _ => Err(self.sink.into_errors()),
        }
    }

    fn resolve(&mut self, element: ElementRef) -> Option<DefinitionData> {
        let types = self.types;
        let known = self.known;
        let mine = self.mine;
        let (decl, handled) = self.check_annotated_type(element)?;
        let service_type = self.find_service_type(decl, &handled)?;
        self.actions.read(types, known, decl, &mut self.sink);
        let marshaller_config = self.find_marshaller_config(decl, &handled)?;

        let annotated_type = types.decl_type(decl);
        let methods = types.all_methods(decl);
        let base = mine.proxy_base_type();
        let dispatch = self.dispatch_accessor_in(&methods, service_type);
        let receiver = self.receiver_accessor_in(&methods, dispatch, service_type);
        let explicit_receiver = dispatch.is_some() || receiver.is_some();
        // Only checked for its diagnostics on the declaration itself
        self.factory_method_in(&methods, dispatch);
        let exception_handler = self.exception_handler_in(&methods);
        let end_point_handle = self.end_point_handle_in(&types.all_fields(decl), base);

        let superclass = types.decl(decl).superclass;
        let extends_base = superclass.is_some_and(|s| types.is_subtype(s, base));
        if !explicit_receiver && end_point_handle.is_none() && !extends_base {
            self.missing_strategy(decl, &handled, base, service_type);
        }

        let policy = if explicit_receiver {
            ConstructorPolicy::Single
        } else if end_point_handle.is_some() {
            ConstructorPolicy::Shapes {
                shapes: mine.handle_constructor_shapes(),
                same_arity: false,
            }
        } else {
            ConstructorPolicy::Shapes {
                shapes: mine.subclass_constructor_shapes(),
                same_arity: false,
            }
        };
        let constructor =
            self.select_constructor(policy, decl, ElementRef::Type(decl), Some(&handled));
        debug!(
            explicit_receiver,
            end_point_handle = end_point_handle.is_some(),
            service = %types.type_name(service_type),
            "receiver strategy"
        );

        let enforce_idempotent = types.decl(decl).annotation_of(known.idempotent).is_some();
        let methods = self.create_method_data(
            annotated_type,
            decl,
            service_type,
            &methods,
            explicit_receiver,
            enforce_idempotent,
        );

        Some(DefinitionData {
            annotated_type,
            annotated_decl: decl,
            direction: mine.direction(),
            service_type,
            constructor_params: constructor
                .map(|c| types.constructor(c).params.clone())
                .unwrap_or_default(),
            dispatch_accessor: dispatch,
            receiver_accessor: receiver,
            exception_handler,
            end_point_handle,
            marshaller_config,
            methods,
            copy_annotations: self.actions.copied().to_vec(),
        })
    }

    fn missing_strategy(
        &mut self,
        decl: DeclId,
        handled: &AnnotationUse,
        base: TypeId,
        service_type: TypeId,
    ) {
        let types = self.types;
        let known = self.known;
        let object = types.object_type();
        let static_mods = Modifiers::package().with_static();
        self.sink.emit(
            BridgeErrorKind::MissingStrategy {
                base: types.type_name(base),
                handle_marker: types.simple_name(known.end_point_handle).to_string(),
                handle_field: print_field(
                    types,
                    &Modifiers::package().with_final(),
                    "delegate",
                    base,
                ),
                dispatch_marker: types.simple_name(known.dispatch_resolver).to_string(),
                dispatch_method: print_method(
                    types,
                    &static_mods,
                    "resolveDispatch",
                    service_type,
                    &[(object, "receiver")],
                ),
                receiver_marker: types.simple_name(known.receiver_resolver).to_string(),
                receiver_method: print_method(
                    types,
                    &static_mods,
                    "resolveReceiver",
                    object,
                    &[(object, "receiver")],
                ),
            },
            ElementRef::Type(decl),
            Some(handled),
        );
    }

    fn check_expectations(&mut self, definition: &DefinitionData) {
        let mut elements = vec![ElementRef::Type(definition.annotated_decl)];
        elements.extend(definition.dispatch_accessor.map(ElementRef::Method));
        elements.extend(definition.receiver_accessor.map(ElementRef::Method));
        elements.extend(definition.exception_handler.map(ElementRef::Method));
        elements.extend(definition.end_point_handle.map(ElementRef::Field));
        elements.extend(definition.methods.iter().map(|m| ElementRef::Method(m.method)));
        for element in elements {
            self.sink.assert_no_expected_errors(element);
        }
    }
}

/// Parse `decl` for the direction `mine`
pub fn parse<T: TypeInfo + ?Sized>(
    types: &T,
    known: &WellKnownTypes,
    mine: &Configuration,
    other: &Configuration,
    decl: DeclId,
) -> Result<DefinitionData, Vec<BridgeError>> {
    BridgeParser::new(types, known, mine, other).parse(ElementRef::Type(decl))
}
