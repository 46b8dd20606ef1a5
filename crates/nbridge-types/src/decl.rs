//! Declarations (elements) of the type universe
//!
//! Declarations are plain data. They are created with the builder helpers in
//! this module and registered in a [`TypeContext`](crate::TypeContext), which
//! assigns their identifiers and links members to their owners.

use crate::ty::{ConstructorId, DeclId, FieldId, MethodId, TypeId};
use std::collections::BTreeMap;
use std::fmt;

/// Access level of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Visible everywhere
    Public,
    /// Visible to subclasses and the package
    Protected,
    /// Visible inside the package only
    #[default]
    Package,
    /// Visible inside the declaring type only
    Private,
}

/// Declaration modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Access level
    pub visibility: Visibility,
    /// `static`
    pub is_static: bool,
    /// `final`
    pub is_final: bool,
    /// `abstract`
    pub is_abstract: bool,
    /// `native`
    pub is_native: bool,
}

impl Modifiers {
    /// Package-private, no other modifiers
    pub fn package() -> Self {
        Self::default()
    }

    /// `public`
    pub fn public() -> Self {
        Modifiers {
            visibility: Visibility::Public,
            ..Self::default()
        }
    }

    /// `protected`
    pub fn protected() -> Self {
        Modifiers {
            visibility: Visibility::Protected,
            ..Self::default()
        }
    }

    /// `private`
    pub fn private() -> Self {
        Modifiers {
            visibility: Visibility::Private,
            ..Self::default()
        }
    }

    /// Add `static`
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Add `final`
    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Add `abstract`
    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Add `native`
    pub fn with_native(mut self) -> Self {
        self.is_native = true;
        self
    }

    /// Is the access level `private`?
    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// Is the access level `public`?
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Parse a modifier keyword into this set
    pub fn apply_keyword(&mut self, keyword: &str) -> bool {
        match keyword {
            "public" => self.visibility = Visibility::Public,
            "protected" => self.visibility = Visibility::Protected,
            "private" => self.visibility = Visibility::Private,
            "static" => self.is_static = true,
            "final" => self.is_final = true,
            "abstract" => self.is_abstract = true,
            "native" => self.is_native = true,
            _ => return false,
        }
        true
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = Vec::new();
        match self.visibility {
            Visibility::Public => words.push("public"),
            Visibility::Protected => words.push("protected"),
            Visibility::Private => words.push("private"),
            Visibility::Package => {}
        }
        if self.is_abstract {
            words.push("abstract");
        }
        if self.is_static {
            words.push("static");
        }
        if self.is_final {
            words.push("final");
        }
        if self.is_native {
            words.push("native");
        }
        f.write_str(&words.join(" "))
    }
}

/// Value of an annotation attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationValue {
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// String literal
    Str(String),
    /// Class literal
    Type(TypeId),
    /// Enum constant, by simple name
    Enum(String),
    /// Nested annotation
    Annotation(AnnotationUse),
    /// Array of values
    List(Vec<AnnotationValue>),
}

impl AnnotationValue {
    /// The boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The class literal payload, if any
    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            AnnotationValue::Type(t) => Some(*t),
            _ => None,
        }
    }

    /// The enum constant name, if any
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AnnotationValue::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// The nested annotation, if any
    pub fn as_annotation(&self) -> Option<&AnnotationUse> {
        match self {
            AnnotationValue::Annotation(a) => Some(a),
            _ => None,
        }
    }

    /// The array elements, if any
    pub fn as_list(&self) -> Option<&[AnnotationValue]> {
        match self {
            AnnotationValue::List(values) => Some(values),
            _ => None,
        }
    }
}

/// An annotation occurrence on an element: `@ByReference(Foo.class)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationUse {
    /// The annotation type declaration
    pub annotation: DeclId,
    /// Explicitly given attribute values
    pub values: BTreeMap<String, AnnotationValue>,
}

impl AnnotationUse {
    /// Marker use without attribute values
    pub fn marker(annotation: DeclId) -> Self {
        AnnotationUse {
            annotation,
            values: BTreeMap::new(),
        }
    }

    /// Add an explicit attribute value
    pub fn with(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Explicitly given value of an attribute (no defaults)
    pub fn value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values.get(name)
    }
}

/// Attribute declared by an annotation type, with its default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationAttribute {
    /// Attribute name
    pub name: String,
    /// Default value, if the attribute is optional
    pub default: Option<AnnotationValue>,
}

/// Kind of a type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// Class
    Class,
    /// Interface
    Interface,
    /// Annotation type
    Annotation,
    /// Enum
    Enum,
}

impl DeclKind {
    /// Class-like kinds: classes and enums
    pub fn is_class(self) -> bool {
        matches!(self, DeclKind::Class | DeclKind::Enum)
    }
}

/// A type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    /// Simple name
    pub name: String,
    /// Package the declaration lives in (dotted)
    pub package: String,
    /// Declaration kind
    pub kind: DeclKind,
    /// Enclosing type for member types
    pub enclosing: Option<DeclId>,
    /// Modifiers
    pub modifiers: Modifiers,
    /// Type parameters (type variables)
    pub type_params: Vec<TypeId>,
    /// Direct superclass; `None` for interfaces, annotations and the root type
    pub superclass: Option<TypeId>,
    /// Directly implemented (or, for interfaces, extended) interfaces
    pub interfaces: Vec<TypeId>,
    /// Annotations on the declaration
    pub annotations: Vec<AnnotationUse>,
    /// Attributes, for annotation types
    pub attributes: Vec<AnnotationAttribute>,
    /// Declared methods, in declaration order
    pub methods: Vec<MethodId>,
    /// Declared fields, in declaration order
    pub fields: Vec<FieldId>,
    /// Declared constructors, in declaration order
    pub constructors: Vec<ConstructorId>,
}

impl TypeDecl {
    fn new(kind: DeclKind, package: &str, name: &str) -> Self {
        TypeDecl {
            name: name.to_string(),
            package: package.to_string(),
            kind,
            enclosing: None,
            modifiers: Modifiers::public(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            attributes: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// A public top-level class; the context defaults its superclass to the root type
    pub fn class(package: &str, name: &str) -> Self {
        Self::new(DeclKind::Class, package, name)
    }

    /// A public top-level interface
    pub fn interface(package: &str, name: &str) -> Self {
        let mut decl = Self::new(DeclKind::Interface, package, name);
        decl.modifiers.is_abstract = true;
        decl
    }

    /// A public top-level annotation type
    pub fn annotation(package: &str, name: &str) -> Self {
        Self::new(DeclKind::Annotation, package, name)
    }

    /// A public top-level enum
    pub fn enumeration(package: &str, name: &str) -> Self {
        Self::new(DeclKind::Enum, package, name)
    }

    /// Set the superclass
    pub fn extends(mut self, superclass: TypeId) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Set the type parameters (type variables created by the context)
    pub fn with_type_params(mut self, type_params: Vec<TypeId>) -> Self {
        self.type_params = type_params;
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, interface: TypeId) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Add an annotation
    pub fn annotated(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Replace the modifiers
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Declare an annotation attribute
    pub fn attribute(mut self, name: &str, default: Option<AnnotationValue>) -> Self {
        self.attributes.push(AnnotationAttribute {
            name: name.to_string(),
            default,
        });
        self
    }

    /// Mark as a member type of `enclosing`
    pub fn nested_in(mut self, enclosing: DeclId) -> Self {
        self.enclosing = Some(enclosing);
        self
    }

    /// Fully qualified name (`pkg.Outer.Inner` for member types is built by the context)
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    /// First annotation of the given type
    pub fn annotation_of(&self, annotation: DeclId) -> Option<&AnnotationUse> {
        find_annotation(&self.annotations, annotation)
    }
}

/// A method or constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: TypeId,
    /// Annotations on the parameter
    pub annotations: Vec<AnnotationUse>,
}

impl Parameter {
    /// Create an unannotated parameter
    pub fn new(name: &str, ty: TypeId) -> Self {
        Parameter {
            name: name.to_string(),
            ty,
            annotations: Vec::new(),
        }
    }

    /// Add an annotation
    pub fn annotated(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A method declaration
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    /// Simple name
    pub name: String,
    /// Declaring type; set by the context on registration
    pub owner: DeclId,
    /// Modifiers
    pub modifiers: Modifiers,
    /// Method type parameters
    pub type_params: Vec<TypeId>,
    /// Parameters
    pub params: Vec<Parameter>,
    /// Declared result type (`void` allowed)
    pub return_type: TypeId,
    /// Annotations on the method
    pub annotations: Vec<AnnotationUse>,
}

impl MethodDecl {
    /// A public method with the given result type
    pub fn new(name: &str, return_type: TypeId) -> Self {
        MethodDecl {
            name: name.to_string(),
            owner: DeclId(u32::MAX),
            modifiers: Modifiers::public(),
            type_params: Vec::new(),
            params: Vec::new(),
            return_type,
            annotations: Vec::new(),
        }
    }

    /// Add a parameter
    pub fn param(mut self, name: &str, ty: TypeId) -> Self {
        self.params.push(Parameter::new(name, ty));
        self
    }

    /// Add a prepared parameter
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Replace the modifiers
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Add an annotation
    pub fn annotated(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Add a method type parameter
    pub fn type_param(mut self, type_var: TypeId) -> Self {
        self.type_params.push(type_var);
        self
    }

    /// First annotation of the given type
    pub fn annotation_of(&self, annotation: DeclId) -> Option<&AnnotationUse> {
        find_annotation(&self.annotations, annotation)
    }
}

/// A field declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Simple name
    pub name: String,
    /// Declaring type; set by the context on registration
    pub owner: DeclId,
    /// Modifiers
    pub modifiers: Modifiers,
    /// Declared type
    pub ty: TypeId,
    /// Annotations on the field
    pub annotations: Vec<AnnotationUse>,
}

impl FieldDecl {
    /// A package-private field
    pub fn new(name: &str, ty: TypeId) -> Self {
        FieldDecl {
            name: name.to_string(),
            owner: DeclId(u32::MAX),
            modifiers: Modifiers::package(),
            ty,
            annotations: Vec::new(),
        }
    }

    /// Replace the modifiers
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Add an annotation
    pub fn annotated(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// First annotation of the given type
    pub fn annotation_of(&self, annotation: DeclId) -> Option<&AnnotationUse> {
        find_annotation(&self.annotations, annotation)
    }
}

/// A constructor declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    /// Declaring type; set by the context on registration
    pub owner: DeclId,
    /// Modifiers
    pub modifiers: Modifiers,
    /// Parameters
    pub params: Vec<Parameter>,
    /// Annotations on the constructor
    pub annotations: Vec<AnnotationUse>,
}

impl ConstructorDecl {
    /// A public constructor without parameters
    pub fn new() -> Self {
        ConstructorDecl {
            owner: DeclId(u32::MAX),
            modifiers: Modifiers::public(),
            params: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Add a parameter
    pub fn param(mut self, name: &str, ty: TypeId) -> Self {
        self.params.push(Parameter::new(name, ty));
        self
    }

    /// Replace the modifiers
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl Default for ConstructorDecl {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference to any element that can carry annotations and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRef {
    /// A type declaration
    Type(DeclId),
    /// A method
    Method(MethodId),
    /// A field
    Field(FieldId),
    /// A constructor
    Constructor(ConstructorId),
}

/// A method type as seen from a particular site: parameter and result types
/// after type-argument substitution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Parameter types
    pub params: Vec<TypeId>,
    /// Result type
    pub return_type: TypeId,
}

/// Find the first annotation of the given type in a list
pub fn find_annotation(
    annotations: &[AnnotationUse],
    annotation: DeclId,
) -> Option<&AnnotationUse> {
    annotations.iter().find(|a| a.annotation == annotation)
}
