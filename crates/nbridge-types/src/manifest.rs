//! Universe manifests
//!
//! A universe manifest is a JSON description of packages, type declarations,
//! their members and annotations. Loading resolves every type expression
//! against the target [`TypeContext`], so declarations may refer to each
//! other in any order.
//!
//! ```json
//! {
//!   "packages": [{
//!     "name": "demo",
//!     "types": [{
//!       "name": "Calculator",
//!       "kind": "interface",
//!       "methods": [{ "name": "add", "modifiers": ["public", "abstract"],
//!                     "params": [{ "name": "a", "type": "int" }], "returns": "int" }]
//!     }]
//!   }]
//! }
//! ```

use crate::context::{TypeContext, CORE_PACKAGE};
use crate::decl::{
    AnnotationAttribute, AnnotationUse, AnnotationValue, ConstructorDecl, DeclKind, ElementRef,
    FieldDecl, MethodDecl, Modifiers, Parameter, TypeDecl,
};
use crate::error::TypeError;
use crate::ty::{DeclId, PrimitiveType, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    /// IO error reading the manifest file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parse error
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Type resolution error
    #[error("{0}")]
    TypeError(#[from] TypeError),
}

/// Root of a universe manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniverseManifest {
    /// Packages, each holding top-level declarations
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

/// A package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Dotted package name
    pub name: String,
    /// Top-level declarations
    #[serde(default)]
    pub types: Vec<TypeEntry>,
}

/// Declaration kind as written in manifests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindEntry {
    /// `class`
    #[default]
    Class,
    /// `interface`
    Interface,
    /// `annotation`
    Annotation,
    /// `enum`
    Enum,
}

impl From<KindEntry> for DeclKind {
    fn from(kind: KindEntry) -> Self {
        match kind {
            KindEntry::Class => DeclKind::Class,
            KindEntry::Interface => DeclKind::Interface,
            KindEntry::Annotation => DeclKind::Annotation,
            KindEntry::Enum => DeclKind::Enum,
        }
    }
}

/// A type declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeEntry {
    /// Simple name
    pub name: String,
    /// Declaration kind, `class` when omitted
    #[serde(default)]
    pub kind: KindEntry,
    /// Modifier keywords; `["public"]` when omitted
    #[serde(default)]
    pub modifiers: Option<Vec<String>>,
    /// Type parameters
    #[serde(default)]
    pub type_params: Vec<TypeParamEntry>,
    /// Superclass type expression
    #[serde(default)]
    pub extends: Option<String>,
    /// Implemented interface type expressions
    #[serde(default)]
    pub implements: Vec<String>,
    /// Annotations on the declaration
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
    /// Attributes, for annotation types
    #[serde(default)]
    pub attributes: Vec<AttributeEntry>,
    /// Methods
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
    /// Fields
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    /// Constructors
    #[serde(default)]
    pub constructors: Vec<ConstructorEntry>,
    /// Member types
    #[serde(default)]
    pub nested: Vec<TypeEntry>,
}

/// A type parameter with an optional bound (`A & B` for intersections)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeParamEntry {
    /// Variable name
    pub name: String,
    /// Upper bound type expression
    #[serde(default)]
    pub bound: Option<String>,
}

/// An annotation occurrence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationEntry {
    /// Annotation type name
    #[serde(rename = "type")]
    pub ty: String,
    /// Attribute values
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// An annotation type attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeEntry {
    /// Attribute name
    pub name: String,
    /// Default value
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

/// A method
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodEntry {
    /// Simple name
    pub name: String,
    /// Modifier keywords; `["public"]` when omitted
    #[serde(default)]
    pub modifiers: Option<Vec<String>>,
    /// Method type parameters
    #[serde(default)]
    pub type_params: Vec<TypeParamEntry>,
    /// Parameters
    #[serde(default)]
    pub params: Vec<ParamEntry>,
    /// Result type expression, `void` when omitted
    #[serde(default = "default_return")]
    pub returns: String,
    /// Annotations on the method
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
}

fn default_return() -> String {
    "void".to_string()
}

/// A method or constructor parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamEntry {
    /// Parameter name
    pub name: String,
    /// Type expression
    #[serde(rename = "type")]
    pub ty: String,
    /// Annotations on the parameter
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
}

/// A field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Simple name
    pub name: String,
    /// Type expression
    #[serde(rename = "type")]
    pub ty: String,
    /// Modifier keywords; package-private when omitted
    #[serde(default)]
    pub modifiers: Option<Vec<String>>,
    /// Annotations on the field
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
}

/// A constructor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorEntry {
    /// Modifier keywords; `["public"]` when omitted
    #[serde(default)]
    pub modifiers: Option<Vec<String>>,
    /// Parameters
    #[serde(default)]
    pub params: Vec<ParamEntry>,
    /// Annotations on the constructor
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
}

impl UniverseManifest {
    /// Load a manifest from a file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(content.as_str())
    }

    /// Parse a manifest from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Declare everything in the manifest inside `ctx`
    ///
    /// Returns the declared ids in manifest order (member types follow their
    /// enclosing type).
    pub fn load_into(&self, ctx: &mut TypeContext) -> Result<Vec<DeclId>, ManifestError> {
        // Pass 1: declarations and type variables
        let mut declared: Vec<Declared<'_>> = Vec::new();
        for package in &self.packages {
            for entry in &package.types {
                declare_entry(ctx, &package.name, entry, None, Vec::new(), &mut declared)?;
            }
        }

        // Pass 2: bounds, supertypes and annotation attributes
        for item in &declared {
            let scope = Scope::new(&item.package, item.type_vars.clone());
            for (param, (_, var)) in item.entry.type_params.iter().zip(&item.own_vars) {
                if let Some(bound) = &param.bound {
                    let bound = parse_type(ctx, &scope, bound)?;
                    ctx.set_type_var_bound(*var, bound)?;
                }
            }
            if let Some(extends) = &item.entry.extends {
                let superclass = parse_type(ctx, &scope, extends)?;
                ctx.decl_mut(item.id).superclass = Some(superclass);
            }
            for interface in &item.entry.implements {
                let interface = parse_type(ctx, &scope, interface)?;
                ctx.decl_mut(item.id).interfaces.push(interface);
            }
            for attribute in &item.entry.attributes {
                let default = match &attribute.default {
                    Some(value) => {
                        let entry = &item.entry.name;
                        Some(convert_value(ctx, &scope, entry, &attribute.name, value)?)
                    }
                    None => None,
                };
                ctx.decl_mut(item.id).attributes.push(AnnotationAttribute {
                    name: attribute.name.clone(),
                    default,
                });
            }
        }

        // Pass 3: annotations and members
        for item in &declared {
            let scope = Scope::new(&item.package, item.type_vars.clone());
            for annotation in &item.entry.annotations {
                let annotation = convert_annotation(ctx, &scope, annotation)?;
                ctx.annotate(ElementRef::Type(item.id), annotation);
            }
            for method in &item.entry.methods {
                load_method(ctx, &scope, item.id, method)?;
            }
            for field in &item.entry.fields {
                let mut decl = FieldDecl::new(&field.name, parse_type(ctx, &scope, &field.ty)?)
                    .with_modifiers(modifiers(&field.modifiers, Modifiers::package())?);
                for annotation in &field.annotations {
                    decl = decl.annotated(convert_annotation(ctx, &scope, annotation)?);
                }
                ctx.add_field(item.id, decl);
            }
            for constructor in &item.entry.constructors {
                let mut decl = ConstructorDecl::new()
                    .with_modifiers(modifiers(&constructor.modifiers, Modifiers::public())?);
                for param in &constructor.params {
                    decl.params.push(convert_param(ctx, &scope, param)?);
                }
                for annotation in &constructor.annotations {
                    decl.annotations.push(convert_annotation(ctx, &scope, annotation)?);
                }
                ctx.add_constructor(item.id, decl);
            }
        }

        Ok(declared.into_iter().map(|item| item.id).collect())
    }
}

/// A declaration created in pass 1
struct Declared<'m> {
    entry: &'m TypeEntry,
    id: DeclId,
    package: String,
    /// Type variables visible in the declaration (enclosing ones first)
    type_vars: Vec<(String, TypeId)>,
    /// Type variables declared by the declaration itself
    own_vars: Vec<(String, TypeId)>,
}

fn declare_entry<'m>(
    ctx: &mut TypeContext,
    package: &str,
    entry: &'m TypeEntry,
    enclosing: Option<DeclId>,
    mut type_vars: Vec<(String, TypeId)>,
    declared: &mut Vec<Declared<'m>>,
) -> Result<(), ManifestError> {
    let own_vars: Vec<(String, TypeId)> = entry
        .type_params
        .iter()
        .map(|p| (p.name.clone(), ctx.type_variable(&p.name)))
        .collect();
    type_vars.extend(own_vars.iter().cloned());

    let mut decl = match entry.kind {
        KindEntry::Class => TypeDecl::class(package, &entry.name),
        KindEntry::Interface => TypeDecl::interface(package, &entry.name),
        KindEntry::Annotation => TypeDecl::annotation(package, &entry.name),
        KindEntry::Enum => TypeDecl::enumeration(package, &entry.name),
    };
    let mut mods = modifiers(&entry.modifiers, Modifiers::public())?;
    if entry.kind == KindEntry::Interface {
        mods.is_abstract = true;
    }
    decl = decl
        .with_modifiers(mods)
        .with_type_params(own_vars.iter().map(|(_, v)| *v).collect());
    if let Some(enclosing) = enclosing {
        decl = decl.nested_in(enclosing);
    }
    let id = ctx.declare(decl)?;

    declared.push(Declared {
        entry,
        id,
        package: package.to_string(),
        type_vars: type_vars.clone(),
        own_vars,
    });
    for nested in &entry.nested {
        declare_entry(ctx, package, nested, Some(id), type_vars.clone(), declared)?;
    }
    Ok(())
}

fn load_method(
    ctx: &mut TypeContext,
    scope: &Scope<'_>,
    owner: DeclId,
    entry: &MethodEntry,
) -> Result<(), ManifestError> {
    let mut scope = scope.clone();
    let mut own_vars = Vec::new();
    for param in &entry.type_params {
        let var = ctx.type_variable(&param.name);
        scope.type_vars.push((param.name.clone(), var));
        own_vars.push(var);
    }
    for (param, &var) in entry.type_params.iter().zip(&own_vars) {
        if let Some(bound) = &param.bound {
            let bound = parse_type(ctx, &scope, bound)?;
            ctx.set_type_var_bound(var, bound)?;
        }
    }

    let return_type = parse_return_type(ctx, &scope, &entry.returns)?;
    let mut method = MethodDecl::new(&entry.name, return_type)
        .with_modifiers(modifiers(&entry.modifiers, Modifiers::public())?);
    for var in own_vars {
        method = method.type_param(var);
    }
    for param in &entry.params {
        method = method.with_param(convert_param(ctx, &scope, param)?);
    }
    for annotation in &entry.annotations {
        method = method.annotated(convert_annotation(ctx, &scope, annotation)?);
    }
    ctx.add_method(owner, method);
    Ok(())
}

fn modifiers(keywords: &Option<Vec<String>>, default: Modifiers) -> Result<Modifiers, TypeError> {
    let Some(keywords) = keywords else {
        return Ok(default);
    };
    let mut mods = Modifiers::package();
    for keyword in keywords {
        if !mods.apply_keyword(keyword) {
            return Err(TypeError::UnknownModifier {
                modifier: keyword.clone(),
            });
        }
    }
    Ok(mods)
}

fn convert_param(
    ctx: &TypeContext,
    scope: &Scope<'_>,
    entry: &ParamEntry,
) -> Result<Parameter, TypeError> {
    let mut param = Parameter::new(&entry.name, parse_type(ctx, scope, &entry.ty)?);
    for annotation in &entry.annotations {
        param = param.annotated(convert_annotation(ctx, scope, annotation)?);
    }
    Ok(param)
}

fn convert_annotation(
    ctx: &TypeContext,
    scope: &Scope<'_>,
    entry: &AnnotationEntry,
) -> Result<AnnotationUse, TypeError> {
    let annotation = scope.resolve_decl(ctx, &entry.ty)?;
    let decl = ctx.decl(annotation);
    let mut result = AnnotationUse::marker(annotation);
    for (name, value) in &entry.values {
        if !decl.attributes.iter().any(|a| &a.name == name) {
            return Err(TypeError::UnknownAttribute {
                annotation: decl.name.clone(),
                attribute: name.clone(),
            });
        }
        let value = convert_value(ctx, scope, &decl.name, name, value)?;
        result.values.insert(name.clone(), value);
    }
    Ok(result)
}

fn convert_value(
    ctx: &TypeContext,
    scope: &Scope<'_>,
    annotation: &str,
    attribute: &str,
    value: &serde_json::Value,
) -> Result<AnnotationValue, TypeError> {
    use serde_json::Value;

    let invalid = |reason: &str| TypeError::InvalidAnnotationValue {
        annotation: annotation.to_string(),
        attribute: attribute.to_string(),
        reason: reason.to_string(),
    };

    match value {
        Value::Bool(b) => Ok(AnnotationValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(AnnotationValue::Int)
            .ok_or_else(|| invalid("only integer numbers are supported")),
        Value::String(s) => Ok(AnnotationValue::Str(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| convert_value(ctx, scope, annotation, attribute, item))
            .collect::<Result<Vec<_>, _>>()
            .map(AnnotationValue::List),
        Value::Object(map) => {
            if let Some(Value::String(ty)) = map.get("type") {
                Ok(AnnotationValue::Type(parse_type(ctx, scope, ty)?))
            } else if let Some(Value::String(constant)) = map.get("enum") {
                Ok(AnnotationValue::Enum(constant.clone()))
            } else if let Some(nested) = map.get("annotation") {
                let entry: AnnotationEntry =
                    serde_json::from_value(nested.clone()).map_err(|e| invalid(&e.to_string()))?;
                Ok(AnnotationValue::Annotation(convert_annotation(ctx, scope, &entry)?))
            } else {
                Err(invalid("expected one of `type`, `enum` or `annotation`"))
            }
        }
        Value::Null => Err(invalid("null is not a valid annotation value")),
    }
}

/// Name resolution scope for type expressions
#[derive(Debug, Clone)]
struct Scope<'p> {
    package: &'p str,
    type_vars: Vec<(String, TypeId)>,
}

impl<'p> Scope<'p> {
    fn new(package: &'p str, type_vars: Vec<(String, TypeId)>) -> Self {
        Scope { package, type_vars }
    }

    fn type_var(&self, name: &str) -> Option<TypeId> {
        self.type_vars
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Resolve a declaration name: qualified, same package, `core`, then unique simple name
    fn resolve_decl(&self, ctx: &TypeContext, name: &str) -> Result<DeclId, TypeError> {
        if let Some(id) = ctx.lookup_decl(name) {
            return Ok(id);
        }
        if !self.package.is_empty() {
            if let Some(id) = ctx.lookup_decl(&format!("{}.{}", self.package, name)) {
                return Ok(id);
            }
        }
        if let Some(id) = ctx.lookup_decl(&format!("{}.{}", CORE_PACKAGE, name)) {
            return Ok(id);
        }
        if !name.contains('.') {
            match ctx.decls_named(name) {
                [single] => return Ok(*single),
                [] => {}
                candidates => {
                    let names: Vec<String> =
                        candidates.iter().map(|&c| ctx.qualified_name(c)).collect();
                    return Err(TypeError::AmbiguousType {
                        name: name.to_string(),
                        candidates: names.join(", "),
                    });
                }
            }
        }
        Err(TypeError::UndefinedType {
            name: name.to_string(),
        })
    }
}

/// Parse a type expression: `int`, `pkg.Map<K, List<? extends V>>`, `byte[][]`, `A & B`
fn parse_type(ctx: &TypeContext, scope: &Scope<'_>, text: &str) -> Result<TypeId, TypeError> {
    let mut parser = TypeParser {
        ctx,
        scope,
        text,
        pos: 0,
    };
    let first = parser.parse_type()?;
    let mut bounds = vec![first];
    while parser.eat('&') {
        bounds.push(parser.parse_type()?);
    }
    parser.skip_ws();
    if parser.pos != text.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    if bounds.len() == 1 {
        Ok(first)
    } else {
        Ok(ctx.intersection(bounds))
    }
}

/// A method result: bare `void` or any type expression
fn parse_return_type(
    ctx: &TypeContext,
    scope: &Scope<'_>,
    text: &str,
) -> Result<TypeId, TypeError> {
    if text.trim() == "void" {
        return Ok(ctx.void_type());
    }
    parse_type(ctx, scope, text)
}

struct TypeParser<'a> {
    ctx: &'a TypeContext,
    scope: &'a Scope<'a>,
    text: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn error(&self, reason: &str) -> TypeError {
        TypeError::MalformedType {
            text: self.text.to_string(),
            reason: format!("{} at offset {}", reason, self.pos),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.text[self.pos..].chars().next() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.text[self.pos..].starts_with(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&'a str, TypeError> {
        self.skip_ws();
        let start = self.pos;
        for c in self.text[start..].chars() {
            if c.is_alphanumeric() || c == '_' || c == '$' || c == '.' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error("expected a type name"));
        }
        Ok(&self.text[start..self.pos])
    }

    fn parse_type(&mut self) -> Result<TypeId, TypeError> {
        let mut ty = if self.eat('?') {
            self.parse_wildcard()?
        } else {
            let name = self.ident()?;
            if let Some(primitive) = PrimitiveType::from_name(name) {
                self.ctx.primitive(primitive)
            } else if name == "void" {
                return Err(self.error("`void` is only allowed as a method result"));
            } else if let Some(var) = self.scope.type_var(name) {
                var
            } else {
                let decl = self.scope.resolve_decl(self.ctx, name)?;
                let mut args = Vec::new();
                if self.eat('<') {
                    loop {
                        args.push(self.parse_type()?);
                        if self.eat('>') {
                            break;
                        }
                        if !self.eat(',') {
                            return Err(self.error("expected `,` or `>`"));
                        }
                    }
                }
                self.ctx.declared_type(decl, args)
            }
        };
        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.error("expected `]`"));
            }
            ty = self.ctx.array_type(ty);
        }
        Ok(ty)
    }

    fn parse_wildcard(&mut self) -> Result<TypeId, TypeError> {
        self.skip_ws();
        let rest = &self.text[self.pos..];
        if rest.starts_with("extends ") {
            self.pos += "extends ".len();
            let bound = self.parse_type()?;
            Ok(self.ctx.wildcard(Some(bound), None))
        } else if rest.starts_with("super ") {
            self.pos += "super ".len();
            let bound = self.parse_type()?;
            Ok(self.ctx.wildcard(None, Some(bound)))
        } else {
            Ok(self.ctx.wildcard(None, None))
        }
    }
}
