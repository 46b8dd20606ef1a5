//! Error collection for one parse
//!
//! Errors are accumulated rather than returned early. An element may carry
//! an `ExpectError` annotation listing error texts it is known to produce;
//! those are swallowed (but still mark the parse as failed), which lets test
//! universes assert on diagnostics.

use crate::error::{BridgeError, BridgeErrorKind, Origin};
use crate::signature::element_annotations;
use crate::well_known::WellKnownTypes;
use nbridge_types::{find_annotation, AnnotationUse, AnnotationValue, ElementRef, TypeInfo};
use tracing::{debug, trace};

/// Collects the errors of a single parse
pub struct ErrorSink<'a, T: TypeInfo + ?Sized> {
    types: &'a T,
    known: &'a WellKnownTypes,
    errors: Vec<BridgeError>,
    suppressed: usize,
}

impl<'a, T: TypeInfo + ?Sized> ErrorSink<'a, T> {
    /// Create an empty sink
    pub fn new(types: &'a T, known: &'a WellKnownTypes) -> Self {
        ErrorSink {
            types,
            known,
            errors: Vec::new(),
            suppressed: 0,
        }
    }

    /// Report an error against an element
    pub fn emit(
        &mut self,
        kind: BridgeErrorKind,
        element: ElementRef,
        annotation: Option<&AnnotationUse>,
    ) {
        let error = BridgeError::new(kind, Origin::new(element, annotation));
        if self.is_expected(&error) {
            trace!(code = error.code(), "expected error suppressed");
            self.suppressed += 1;
            return;
        }
        debug!(code = error.code(), message = %error, "bridge error");
        self.errors.push(error);
    }

    /// Whether anything was reported, suppressed errors included
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.suppressed > 0
    }

    /// Number of errors swallowed by `ExpectError`
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    /// Reported errors
    pub fn errors(&self) -> &[BridgeError] {
        &self.errors
    }

    /// Consume the sink
    pub fn into_errors(self) -> Vec<BridgeError> {
        self.errors
    }

    /// Report elements that still expect errors after a successful parse
    pub fn assert_no_expected_errors(&mut self, element: ElementRef) {
        let expected = self.expected_texts(element);
        if !expected.is_empty() {
            self.emit(BridgeErrorKind::ExpectedErrorNotReported { expected }, element, None);
        }
    }

    fn expected_texts(&self, element: ElementRef) -> Vec<String> {
        let Some(expect_error) = self.known.expect_error else {
            return Vec::new();
        };
        let annotations = element_annotations(self.types, element);
        let Some(annotation) = find_annotation(annotations, expect_error) else {
            return Vec::new();
        };
        match annotation.value("value") {
            Some(AnnotationValue::Str(text)) => vec![text.clone()],
            Some(AnnotationValue::List(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    // Matches the full message or just its first line
    fn is_expected(&self, error: &BridgeError) -> bool {
        if matches!(error.kind, BridgeErrorKind::ExpectedErrorNotReported { .. }) {
            return false;
        }
        let expected = self.expected_texts(error.origin.element);
        if expected.is_empty() {
            return false;
        }
        let message = error.message();
        let first_line = error.kind.to_string();
        expected.iter().any(|text| *text == message || *text == first_line)
    }
}
