//! Annotation actions
//!
//! A bridge declaration decides what happens to annotations found on the
//! bridged methods and parameters: ignored for marshaller lookup, copied
//! verbatim to the generated code, or kept as a marshaller lookup key.

use crate::error::BridgeErrorKind;
use crate::sink::ErrorSink;
use crate::well_known::WellKnownTypes;
use nbridge_types::{AnnotationUse, AnnotationValue, DeclId, ElementRef, TypeInfo};
use rustc_hash::FxHashSet;
use tracing::trace;

/// What to do with an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Not used for marshaller lookup
    Ignore,
    /// Ignored for lookup and copied to the generated code
    Copy,
    /// Used as a marshaller lookup key
    Lookup,
}

impl Action {
    /// Parse an enum constant name
    pub fn from_constant(name: &str) -> Option<Action> {
        match name {
            "IGNORE" => Some(Action::Ignore),
            "COPY" => Some(Action::Copy),
            "LOOKUP" => Some(Action::Lookup),
            _ => None,
        }
    }
}

/// Annotation handling for one bridge declaration
#[derive(Debug, Clone)]
pub struct AnnotationActions {
    ignore: FxHashSet<DeclId>,
    copy: Vec<DeclId>,
    handled: FxHashSet<DeclId>,
}

impl AnnotationActions {
    /// Start with annotations that are always ignored
    pub fn new(defaults: impl IntoIterator<Item = DeclId>) -> Self {
        let ignore: FxHashSet<DeclId> = defaults.into_iter().collect();
        AnnotationActions {
            handled: ignore.clone(),
            ignore,
            copy: Vec::new(),
        }
    }

    /// Defaults for a universe: `Override`, `SuppressWarnings` and `Idempotent`
    pub fn with_defaults<T: TypeInfo + ?Sized>(types: &T, known: &WellKnownTypes) -> Self {
        let mut defaults = vec![known.idempotent];
        for name in ["core.Override", "core.SuppressWarnings"] {
            if let Some(id) = types.lookup_decl(name) {
                defaults.push(id);
            }
        }
        Self::new(defaults)
    }

    /// Record an action
    ///
    /// Fails with the display name of the existing action when the
    /// annotation is already handled.
    pub fn apply(&mut self, annotation: DeclId, action: Action) -> Result<(), &'static str> {
        if self.handled.contains(&annotation) {
            return Err(self.display_name(annotation));
        }
        self.handled.insert(annotation);
        match action {
            Action::Ignore => {
                self.ignore.insert(annotation);
            }
            Action::Copy => {
                self.ignore.insert(annotation);
                self.copy.push(annotation);
            }
            Action::Lookup => {}
        }
        Ok(())
    }

    /// Read `AnnotationAction` and `AnnotationActionRepeated` from a declaration
    pub fn read<T: TypeInfo + ?Sized>(
        &mut self,
        types: &T,
        known: &WellKnownTypes,
        decl: DeclId,
        sink: &mut ErrorSink<'_, T>,
    ) {
        for (source, annotation, action) in action_entries(types, known, decl) {
            trace!(annotation = types.simple_name(annotation), ?action, "annotation action");
            if let Err(existing) = self.apply(annotation, action) {
                sink.emit(
                    BridgeErrorKind::DuplicateAnnotationAction {
                        annotation: types.simple_name(annotation).to_string(),
                        action: existing,
                        action_annotation: types.simple_name(known.annotation_action).to_string(),
                    },
                    ElementRef::Type(decl),
                    Some(&source),
                );
            }
        }
    }

    /// Whether an annotation is left out of marshaller lookup
    pub fn is_ignored(&self, annotation: DeclId) -> bool {
        self.ignore.contains(&annotation)
    }

    /// Annotations copied to the generated code, in declaration order
    pub fn copied(&self) -> &[DeclId] {
        &self.copy
    }

    fn display_name(&self, annotation: DeclId) -> &'static str {
        if self.copy.contains(&annotation) {
            "copied"
        } else if self.ignore.contains(&annotation) {
            "ignored"
        } else {
            "used for marshaller lookup"
        }
    }
}

fn action_entries<T: TypeInfo + ?Sized>(
    types: &T,
    known: &WellKnownTypes,
    decl: DeclId,
) -> Vec<(AnnotationUse, DeclId, Action)> {
    let mut entries = Vec::new();
    for annotation in &types.decl(decl).annotations {
        if annotation.annotation == known.annotation_action {
            entries.extend(action_entry(types, annotation));
        } else if annotation.annotation == known.annotation_action_repeated {
            let nested = annotation
                .value("value")
                .and_then(AnnotationValue::as_list)
                .unwrap_or_default();
            entries.extend(
                nested
                    .iter()
                    .filter_map(AnnotationValue::as_annotation)
                    .filter_map(|a| action_entry(types, a)),
            );
        }
    }
    entries
}

fn action_entry<T: TypeInfo + ?Sized>(
    types: &T,
    annotation: &AnnotationUse,
) -> Option<(AnnotationUse, DeclId, Action)> {
    let target = annotation.value("value")?.as_type()?;
    let target = types.decl_of(target)?;
    let action = Action::from_constant(annotation.value("action")?.as_enum()?)?;
    Some((annotation.clone(), target, action))
}
