//! Diagnostic infrastructure for error reporting
//!
//! Bridge declarations come from a type universe, not from source text, so
//! each reported declaration is rendered as a source outline: the class head
//! followed by one line per member. Labels point at the offending member's
//! line in that outline.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use nbridge_types::{AnnotationUse, DeclId, ElementRef, TypeInfo};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use termcolor::WriteColor;

use crate::error::BridgeError;
use crate::signature::{
    describe_element, print_field_decl, print_method_decl, print_method_with_types,
};

/// Error code for a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

/// A diagnostic message with outline context
pub struct Diagnostic {
    /// The underlying codespan diagnostic
    inner: CsDiagnostic<usize>,
    /// Error code (e.g., "NB2001")
    code: Option<ErrorCode>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code.clone());
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(
        mut self,
        file_id: usize,
        range: Range<usize>,
        message: impl Into<String>,
    ) -> Self {
        let label = Label::primary(file_id, range).with_message(message);
        self.inner.labels.push(label);
        self
    }

    /// Add a secondary label (related location)
    pub fn with_secondary_label(
        mut self,
        file_id: usize,
        range: Range<usize>,
        message: impl Into<String>,
    ) -> Self {
        let label = Label::secondary(file_id, range).with_message(message);
        self.inner.labels.push(label);
        self
    }

    /// Add a note (additional context)
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Add a help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Create diagnostic from a BridgeError
    ///
    /// The primary label sits on the offending element when the outline
    /// shows it; the triggering annotation, when its line is in the outline,
    /// gets a secondary label.
    pub fn from_bridge_error<T: TypeInfo + ?Sized>(
        error: &BridgeError,
        types: &T,
        outline: &SourceOutline,
    ) -> Self {
        let mut diag = Diagnostic::error(error.kind.to_string()).with_code(error_code(error));

        let element = error.origin.element;
        let trigger = error.origin.annotation.as_ref();
        match outline.span_of(element) {
            Some(range) => {
                let message = match trigger {
                    Some(annotation) => {
                        format!("triggered by `@{}`", types.simple_name(annotation.annotation))
                    }
                    None => "declared here".to_string(),
                };
                diag = diag.with_primary_label(outline.file_id(), range, message);
            }
            None => diag = diag.with_note(format!("in {}", describe_element(types, element))),
        }
        if let Some(range) = trigger.and_then(|a| outline.annotation_span(element, a)) {
            diag = diag.with_secondary_label(outline.file_id(), range, "annotation found here");
        }
        if let Some(help) = error.help() {
            for line in help.lines() {
                diag = diag.with_help(line);
            }
        }
        diag
    }

    /// Emit the diagnostic to a writer
    pub fn emit_to(
        &self,
        writer: &mut dyn WriteColor,
        files: &SimpleFiles<String, String>,
    ) -> Result<(), codespan_reporting::files::Error> {
        let config = term::Config::default();
        term::emit(writer, &config, files, &self.inner)
    }

    /// Get the underlying codespan diagnostic
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON format (for IDE integration)
    pub fn to_json(
        &self,
        files: &SimpleFiles<String, String>,
    ) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonDiagnostic::from_diagnostic(self, files))
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Error code
    pub code: Option<String>,
    /// Severity level
    pub severity: String,
    /// Main message
    pub message: String,
    /// Labels (locations)
    pub labels: Vec<JsonLabel>,
    /// Additional notes
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    /// Outline name
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// End line (1-indexed)
    pub end_line: usize,
    /// End column (1-indexed)
    pub end_column: usize,
    /// Label message
    pub message: Option<String>,
    /// Label style (primary or secondary)
    pub style: String,
}

impl JsonDiagnostic {
    /// Convert a Diagnostic to JSON representation
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let start = files.location(label.file_id, label.range.start).ok()?;
                let end = files.location(label.file_id, label.range.end).ok()?;

                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: Some(label.message.clone()),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Get error code for a BridgeError
pub fn error_code(error: &BridgeError) -> ErrorCode {
    ErrorCode(error.code())
}

/// Rendered outline of one bridge declaration
#[derive(Debug, Clone)]
pub struct SourceOutline {
    file_id: usize,
    elements: FxHashMap<ElementRef, Range<usize>>,
    annotations: FxHashMap<(ElementRef, DeclId), Range<usize>>,
}

impl SourceOutline {
    /// Render `decl` and add the outline to `files`
    ///
    /// Inherited members are listed after the declared ones, each under a
    /// comment naming its owner.
    pub fn build<T: TypeInfo + ?Sized>(
        types: &T,
        decl: DeclId,
        files: &mut SimpleFiles<String, String>,
    ) -> Self {
        let mut writer = OutlineWriter::default();
        let type_decl = types.decl(decl);

        writer.annotations(types, ElementRef::Type(decl), &type_decl.annotations, "");
        let mut head = type_decl.modifiers.to_string();
        if !head.is_empty() {
            head.push(' ');
        }
        head.push_str(if type_decl.kind.is_class() { "class " } else { "interface " });
        head.push_str(&type_decl.name);
        if let Some(superclass) = type_decl.superclass {
            head.push_str(&format!(" extends {}", types.type_name(superclass)));
        }
        if !type_decl.interfaces.is_empty() {
            let names: Vec<String> =
                type_decl.interfaces.iter().map(|&i| types.type_name(i)).collect();
            head.push_str(&format!(" implements {}", names.join(", ")));
        }
        head.push_str(" {");
        writer.element(ElementRef::Type(decl), &head, "");

        for &field in &type_decl.fields {
            let annotations = &types.field(field).annotations;
            writer.annotations(types, ElementRef::Field(field), annotations, "    ");
            let line = format!("{};", print_field_decl(types, field));
            writer.element(ElementRef::Field(field), &line, "    ");
        }
        for &constructor in &type_decl.constructors {
            let c = types.constructor(constructor);
            let params: Vec<_> = c.params.iter().map(|p| p.ty).collect();
            let name = &type_decl.name;
            let head = print_method_with_types(types, &c.modifiers, name, types.no_type(), &params);
            writer.annotations(types, ElementRef::Constructor(constructor), &c.annotations, "    ");
            writer.element(ElementRef::Constructor(constructor), &format!("{};", head), "    ");
        }
        for &method in &type_decl.methods {
            writer.method(types, method);
        }

        let mut owner = decl;
        for method in types.all_methods(decl) {
            let method_owner = types.method(method).owner;
            if method_owner == decl {
                continue;
            }
            if method_owner != owner {
                owner = method_owner;
                writer.line(&format!("    // from {}", types.qualified_name(owner)));
            }
            writer.method(types, method);
        }
        writer.line("}");

        let file_id = files.add(format!("{}.bridge", types.qualified_name(decl)), writer.text);
        SourceOutline {
            file_id,
            elements: writer.elements,
            annotations: writer.annotation_spans,
        }
    }

    /// File id of the outline
    pub fn file_id(&self) -> usize {
        self.file_id
    }

    /// Span of an element's line
    pub fn span_of(&self, element: ElementRef) -> Option<Range<usize>> {
        self.elements.get(&element).cloned()
    }

    /// Span of an annotation occurrence on an element
    pub fn annotation_span(
        &self,
        element: ElementRef,
        annotation: &AnnotationUse,
    ) -> Option<Range<usize>> {
        self.annotations.get(&(element, annotation.annotation)).cloned()
    }
}

#[derive(Default)]
struct OutlineWriter {
    text: String,
    elements: FxHashMap<ElementRef, Range<usize>>,
    annotation_spans: FxHashMap<(ElementRef, DeclId), Range<usize>>,
}

impl OutlineWriter {
    fn line(&mut self, content: &str) -> Range<usize> {
        let start = self.text.len();
        self.text.push_str(content);
        let end = self.text.len();
        self.text.push('\n');
        start..end
    }

    fn element(&mut self, element: ElementRef, content: &str, indent: &str) {
        let range = self.line(&format!("{}{}", indent, content));
        let range = range.start + indent.len()..range.end;
        self.elements.entry(element).or_insert(range);
    }

    fn annotations<T: TypeInfo + ?Sized>(
        &mut self,
        types: &T,
        element: ElementRef,
        annotations: &[AnnotationUse],
        indent: &str,
    ) {
        for annotation in annotations {
            let text = format!("{}@{}", indent, types.simple_name(annotation.annotation));
            let range = self.line(&text);
            let range = range.start + indent.len()..range.end;
            self.annotation_spans
                .entry((element, annotation.annotation))
                .or_insert(range);
        }
    }

    fn method<T: TypeInfo + ?Sized>(&mut self, types: &T, method: nbridge_types::MethodId) {
        let element = ElementRef::Method(method);
        self.annotations(types, element, &types.method(method).annotations, "    ");
        self.element(element, &format!("{};", print_method_decl(types, method)), "    ");
    }
}

/// Helper to create a SimpleFiles instance holding one outline
pub fn create_files<T: TypeInfo + ?Sized>(
    types: &T,
    decl: DeclId) -> (SimpleFiles<String,
    String>, SourceOutline,
) {
    let mut files = SimpleFiles::new();
    let outline = SourceOutline::build(types, decl, &mut files);
    (files, outline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BridgeErrorKind, Origin};
    use nbridge_types::{MethodDecl, Modifiers, PrimitiveType, TypeContext, TypeDecl};

    fn universe() -> (TypeContext, DeclId, nbridge_types::MethodId, DeclId) {
        let mut ctx = TypeContext::new();
        let marker = ctx.declare(TypeDecl::annotation("demo", "Idempotent")).unwrap();
        let svc = ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
        let int = ctx.primitive(PrimitiveType::Int);
        ctx.add_method(
            svc,
            MethodDecl::new("size", int).with_modifiers(Modifiers::public().with_abstract()),
        );
        let svc_type = ctx.decl_type(svc);
        let foo = ctx
            .declare(TypeDecl::class("demo", "Foo").implements(svc_type))
            .unwrap();
        let m = ctx.add_method(
            foo,
            MethodDecl::new("get", int).annotated(AnnotationUse::marker(marker)),
        );
        (ctx, foo, m, marker)
    }

    #[test]
    fn test_create_error_diagnostic() {
        let diag = Diagnostic::error("Test error");
        assert_eq!(diag.inner().severity, Severity::Error);
        assert_eq!(diag.inner().message, "Test error");
    }

    #[test]
    fn test_diagnostic_with_code() {
        let diag = Diagnostic::error("Test error").with_code(ErrorCode("NB3001"));
        assert_eq!(diag.code, Some(ErrorCode("NB3001")));
    }

    #[test]
    fn test_outline_lists_inherited_members() {
        let (ctx, foo, m, _) = universe();
        let (files, outline) = create_files(&ctx, foo);
        let source = files.get(outline.file_id()).unwrap().source().clone();
        assert!(source.contains("public class Foo extends Object implements Service {"));
        assert!(source.contains("    // from demo.Service"));
        let range = outline.span_of(ElementRef::Method(m)).unwrap();
        assert_eq!(&source[range], "public int get();");
    }

    #[test]
    fn test_from_bridge_error_labels() {
        let (ctx, foo, m, marker) = universe();
        let (files, outline) = create_files(&ctx, foo);
        let error = BridgeError::new(
            BridgeErrorKind::IdempotentVoid {
                marker: "Idempotent".to_string(),
            },
            Origin::new(ElementRef::Method(m), Some(&AnnotationUse::marker(marker))),
        );
        let diag = Diagnostic::from_bridge_error(&error, &ctx, &outline);
        assert_eq!(diag.inner().labels.len(), 2);
        assert_eq!(diag.inner().notes, vec!["help: Remove `Idempotent` annotation.".to_string()]);

        let json = diag.to_json(&files).unwrap();
        assert!(json.contains("\"code\""));
        assert!(json.contains("\"NB4003\""));
        assert!(json.contains("\"labels\""));
        assert!(json.contains("\"start_line\""));
        assert!(json.contains("\"triggered by `@Idempotent`\""));
    }

    #[test]
    fn test_element_outside_outline_becomes_note() {
        let (ctx, foo, _, _) = universe();
        let (_, outline) = create_files(&ctx, foo);
        let object = ctx.core().object;
        let error = BridgeError::new(
            BridgeErrorKind::MultipleConstructors,
            Origin::element(ElementRef::Type(object)),
        );
        let diag = Diagnostic::from_bridge_error(&error, &ctx, &outline);
        assert!(diag.inner().labels.is_empty());
        assert_eq!(diag.inner().notes, vec!["in type `core.Object`".to_string()]);
    }

    #[test]
    fn test_emit_to_renders_outline_line() {
        let (ctx, foo, m, marker) = universe();
        let (files, outline) = create_files(&ctx, foo);
        let error = BridgeError::new(
            BridgeErrorKind::IdempotentVoid {
                marker: "Idempotent".to_string(),
            },
            Origin::new(ElementRef::Method(m), Some(&AnnotationUse::marker(marker))),
        );
        let mut out = termcolor::Buffer::no_color();
        Diagnostic::from_bridge_error(&error, &ctx, &outline)
            .emit_to(&mut out, &files)
            .unwrap();
        let rendered = String::from_utf8(out.into_inner()).unwrap();
        assert!(rendered.starts_with("error[NB4003]"), "{}", rendered);
        assert!(rendered.contains("demo.Foo.bridge"));
        assert!(rendered.contains("public int get();"));
    }
}
