//! Type context for managing types and declarations
//!
//! Types are interned so that identical types share one [`TypeId`], which
//! makes same-type checks an id comparison. Interning happens behind a
//! `RefCell` so that queries producing new types (substitution, erasure)
//! only need a shared reference.

use crate::decl::{
    AnnotationUse, AnnotationValue, ConstructorDecl, ElementRef, FieldDecl, MethodDecl, Modifiers,
    Signature, TypeDecl,
};
use crate::error::TypeError;
use crate::ty::{
    ArrayType, ConstructorId, DeclId, DeclaredType, FieldId, IntersectionType, MethodId,
    PrimitiveType, Type, TypeId, TypeVar, WildcardType,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::sync::Arc;

/// Package holding the built-in declarations
pub const CORE_PACKAGE: &str = "core";

/// Built-in declarations every context starts with
#[derive(Debug, Clone, Copy)]
pub struct CoreDecls {
    /// `core.Object`, the root of the class hierarchy
    pub object: DeclId,
    /// `core.String`
    pub string: DeclId,
    /// `core.Throwable`
    pub throwable: DeclId,
    /// `core.Override`
    pub override_: DeclId,
    /// `core.SuppressWarnings`
    pub suppress_warnings: DeclId,
    boxes: [DeclId; 8],
}

impl CoreDecls {
    /// Box declaration for a primitive
    pub fn boxed(&self, primitive: PrimitiveType) -> DeclId {
        self.boxes[primitive as usize]
    }

    /// Primitive unboxed from a box declaration
    pub fn unboxed(&self, decl: DeclId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|&p| self.boxes[p as usize] == decl)
    }
}

/// Type context that owns the type universe
#[derive(Debug)]
pub struct TypeContext {
    /// Storage for all types, indexed by TypeId
    types: RefCell<Vec<Arc<Type>>>,

    /// Reverse mapping from Type to TypeId for interning
    type_to_id: RefCell<FxHashMap<Type, TypeId>>,

    /// Upper bounds of type variables, indexed by `TypeVar::index`
    type_var_bounds: Vec<TypeId>,

    decls: Vec<TypeDecl>,
    methods: Vec<MethodDecl>,
    fields: Vec<FieldDecl>,
    constructors: Vec<ConstructorDecl>,

    /// Qualified name to declaration
    decl_names: FxHashMap<String, DeclId>,

    /// Simple name to declarations, for unqualified lookups
    simple_names: FxHashMap<String, Vec<DeclId>>,

    core: CoreDecls,
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeContext {
    /// Create a context containing the `core` package
    pub fn new() -> Self {
        let placeholder = DeclId(0);
        let mut ctx = TypeContext {
            types: RefCell::new(Vec::new()),
            type_to_id: RefCell::new(FxHashMap::default()),
            type_var_bounds: Vec::new(),
            decls: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            decl_names: FxHashMap::default(),
            simple_names: FxHashMap::default(),
            core: CoreDecls {
                object: placeholder,
                string: placeholder,
                throwable: placeholder,
                override_: placeholder,
                suppress_warnings: placeholder,
                boxes: [placeholder; 8],
            },
        };

        // Pre-intern the non-declared types
        for primitive in PrimitiveType::ALL {
            ctx.intern(Type::Primitive(primitive));
        }
        ctx.intern(Type::Void);
        ctx.intern(Type::NoType);

        let object = ctx.push_decl(TypeDecl::class(CORE_PACKAGE, "Object"));
        ctx.core.object = object;
        let object_ty = ctx.object_type();

        let string = ctx.push_decl(
            TypeDecl::class(CORE_PACKAGE, "String")
                .extends(object_ty)
                .with_modifiers(Modifiers::public().with_final()),
        );
        ctx.core.string = string;
        let string_ty = ctx.string_type();

        let boolean = ctx.primitive(PrimitiveType::Boolean);
        let int = ctx.primitive(PrimitiveType::Int);
        ctx.add_method(object, MethodDecl::new("equals", boolean).param("other", object_ty));
        ctx.add_method(object, MethodDecl::new("hashCode", int));
        ctx.add_method(object, MethodDecl::new("toString", string_ty));
        ctx.add_constructor(object, ConstructorDecl::new());

        for primitive in PrimitiveType::ALL {
            let decl = ctx.push_decl(
                TypeDecl::class(CORE_PACKAGE, primitive.boxed_name())
                    .extends(object_ty)
                    .with_modifiers(Modifiers::public().with_final()),
            );
            ctx.core.boxes[primitive as usize] = decl;
        }

        ctx.core.throwable =
            ctx.push_decl(TypeDecl::class(CORE_PACKAGE, "Throwable").extends(object_ty));
        ctx.core.override_ = ctx.push_decl(TypeDecl::annotation(CORE_PACKAGE, "Override"));
        ctx.core.suppress_warnings = ctx.push_decl(
            TypeDecl::annotation(CORE_PACKAGE, "SuppressWarnings").attribute("value", None),
        );

        ctx
    }

    /// Built-in declarations
    pub fn core(&self) -> &CoreDecls {
        &self.core
    }

    // Interning

    /// Intern a type, returning its TypeId
    ///
    /// If the type already exists, returns the existing TypeId.
    /// Otherwise, allocates a new TypeId and stores the type.
    pub fn intern(&self, ty: Type) -> TypeId {
        let existing = self.type_to_id.borrow().get(&ty).copied();
        if let Some(id) = existing {
            return id;
        }

        let mut types = self.types.borrow_mut();
        let id = TypeId(types.len() as u32);
        types.push(Arc::new(ty.clone()));
        self.type_to_id.borrow_mut().insert(ty, id);
        id
    }

    /// Get a type by its TypeId
    ///
    /// # Panics
    ///
    /// Panics if the TypeId does not belong to this context
    pub fn get(&self, id: TypeId) -> Arc<Type> {
        Arc::clone(&self.types.borrow()[id.0 as usize])
    }

    /// Get a type by its TypeId, if it exists
    pub fn try_get(&self, id: TypeId) -> Option<Arc<Type>> {
        self.types.borrow().get(id.0 as usize).cloned()
    }

    /// Number of interned types
    pub fn type_count(&self) -> usize {
        self.types.borrow().len()
    }

    // Convenience methods for creating common types

    /// Get a primitive type
    pub fn primitive(&self, primitive: PrimitiveType) -> TypeId {
        self.intern(Type::Primitive(primitive))
    }

    /// Get the void type
    pub fn void_type(&self) -> TypeId {
        self.intern(Type::Void)
    }

    /// Get the "no type" marker used as constructor result
    pub fn no_type(&self) -> TypeId {
        self.intern(Type::NoType)
    }

    /// Get the root object type
    pub fn object_type(&self) -> TypeId {
        self.declared_type(self.core.object, Vec::new())
    }

    /// Get the built-in string type
    pub fn string_type(&self) -> TypeId {
        self.declared_type(self.core.string, Vec::new())
    }

    /// Get the boxed counterpart of a primitive
    pub fn boxed_type(&self, primitive: PrimitiveType) -> TypeId {
        self.declared_type(self.core.boxed(primitive), Vec::new())
    }

    /// Create a declared type with explicit type arguments
    pub fn declared_type(&self, decl: DeclId, args: Vec<TypeId>) -> TypeId {
        self.intern(Type::Declared(DeclaredType { decl, args }))
    }

    /// The type of a declaration as seen from inside it: `Foo<T>` for `class Foo<T>`
    pub fn decl_type(&self, decl: DeclId) -> TypeId {
        let args = self.decl(decl).type_params.clone();
        self.declared_type(decl, args)
    }

    /// Create an array type
    pub fn array_type(&self, component: TypeId) -> TypeId {
        self.intern(Type::Array(ArrayType { component }))
    }

    /// Create a wildcard type argument
    pub fn wildcard(&self, extends_bound: Option<TypeId>, super_bound: Option<TypeId>) -> TypeId {
        self.intern(Type::Wildcard(WildcardType {
            extends_bound,
            super_bound,
        }))
    }

    /// Create an intersection type
    pub fn intersection(&self, bounds: Vec<TypeId>) -> TypeId {
        self.intern(Type::Intersection(IntersectionType { bounds }))
    }

    // Declarations

    fn push_decl(&mut self, decl: TypeDecl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        let qualified = match decl.enclosing {
            Some(enclosing) => format!("{}.{}", self.qualified_name(enclosing), decl.name),
            None => decl.qualified_name(),
        };
        self.decl_names.insert(qualified, id);
        self.simple_names.entry(decl.name.clone()).or_default().push(id);
        self.decls.push(decl);
        id
    }

    /// Register a type declaration
    ///
    /// Class-like declarations without a superclass extend the root object type.
    /// Member types inherit the package of their enclosing type.
    pub fn declare(&mut self, mut decl: TypeDecl) -> Result<DeclId, TypeError> {
        if let Some(enclosing) = decl.enclosing {
            decl.package = self.decl(enclosing).package.clone();
        }
        let qualified = match decl.enclosing {
            Some(enclosing) => format!("{}.{}", self.qualified_name(enclosing), decl.name),
            None => decl.qualified_name(),
        };
        if self.decl_names.contains_key(&qualified) {
            return Err(TypeError::DuplicateDeclaration { name: qualified });
        }
        if decl.kind.is_class() && decl.superclass.is_none() {
            decl.superclass = Some(self.object_type());
        }
        Ok(self.push_decl(decl))
    }

    /// Add a method to a declaration
    pub fn add_method(&mut self, owner: DeclId, mut method: MethodDecl) -> MethodId {
        method.owner = owner;
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(method);
        self.decls[owner.0 as usize].methods.push(id);
        id
    }

    /// Add a field to a declaration
    pub fn add_field(&mut self, owner: DeclId, mut field: FieldDecl) -> FieldId {
        field.owner = owner;
        let id = FieldId(self.fields.len() as u32);
        self.fields.push(field);
        self.decls[owner.0 as usize].fields.push(id);
        id
    }

    /// Add a constructor to a declaration
    pub fn add_constructor(
        &mut self,
        owner: DeclId,
        mut constructor: ConstructorDecl,
    ) -> ConstructorId {
        constructor.owner = owner;
        let id = ConstructorId(self.constructors.len() as u32);
        self.constructors.push(constructor);
        self.decls[owner.0 as usize].constructors.push(id);
        id
    }

    /// Attach an annotation to an element after registration
    pub fn annotate(&mut self, element: ElementRef, annotation: AnnotationUse) {
        match element {
            ElementRef::Type(id) => self.decls[id.0 as usize].annotations.push(annotation),
            ElementRef::Method(id) => self.methods[id.0 as usize].annotations.push(annotation),
            ElementRef::Field(id) => self.fields[id.0 as usize].annotations.push(annotation),
            ElementRef::Constructor(id) => {
                self.constructors[id.0 as usize].annotations.push(annotation)
            }
        }
    }

    /// Mutable access to a declaration, for multi-pass construction
    pub fn decl_mut(&mut self, id: DeclId) -> &mut TypeDecl {
        &mut self.decls[id.0 as usize]
    }

    /// Mutable access to a method, for multi-pass construction
    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodDecl {
        &mut self.methods[id.0 as usize]
    }

    /// Create a fresh type variable bounded by the root object type
    pub fn type_variable(&mut self, name: &str) -> TypeId {
        let index = self.type_var_bounds.len() as u32;
        let object = self.object_type();
        self.type_var_bounds.push(object);
        self.intern(Type::TypeVar(TypeVar {
            name: name.to_string(),
            index,
        }))
    }

    /// Set the upper bound of a type variable
    pub fn set_type_var_bound(&mut self, var: TypeId, bound: TypeId) -> Result<(), TypeError> {
        match &*self.get(var) {
            Type::TypeVar(tv) => {
                self.type_var_bounds[tv.index as usize] = bound;
                Ok(())
            }
            _ => Err(TypeError::NotTypeVariable {
                name: self.type_name(var),
            }),
        }
    }

    /// Get a declaration
    pub fn decl(&self, id: DeclId) -> &TypeDecl {
        &self.decls[id.0 as usize]
    }

    /// Get a method
    pub fn method(&self, id: MethodId) -> &MethodDecl {
        &self.methods[id.0 as usize]
    }

    /// Get a field
    pub fn field(&self, id: FieldId) -> &FieldDecl {
        &self.fields[id.0 as usize]
    }

    /// Get a constructor
    pub fn constructor(&self, id: ConstructorId) -> &ConstructorDecl {
        &self.constructors[id.0 as usize]
    }

    /// All declarations, in registration order
    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        (0..self.decls.len() as u32).map(DeclId)
    }

    /// Look up a declaration by qualified name
    pub fn lookup_decl(&self, qualified_name: &str) -> Option<DeclId> {
        self.decl_names.get(qualified_name).copied()
    }

    /// Resolve a declaration by qualified name, returning an error if not found
    pub fn resolve_decl(&self, qualified_name: &str) -> Result<DeclId, TypeError> {
        self.lookup_decl(qualified_name)
            .ok_or_else(|| TypeError::UndefinedType {
                name: qualified_name.to_string(),
            })
    }

    /// Declarations with the given simple name
    pub fn decls_named(&self, simple_name: &str) -> &[DeclId] {
        self.simple_names
            .get(simple_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Fully qualified name of a declaration
    pub fn qualified_name(&self, id: DeclId) -> String {
        let decl = self.decl(id);
        match decl.enclosing {
            Some(enclosing) => format!("{}.{}", self.qualified_name(enclosing), decl.name),
            None => decl.qualified_name(),
        }
    }

    // Queries

    /// Upper bound of a type variable; other types are returned unchanged
    pub fn type_var_bound(&self, ty: TypeId) -> TypeId {
        match &*self.get(ty) {
            Type::TypeVar(tv) => self.type_var_bounds[tv.index as usize],
            _ => ty,
        }
    }

    /// Primitive a declared box type unboxes to
    pub fn unboxed(&self, ty: TypeId) -> Option<PrimitiveType> {
        self.get(ty)
            .as_declared()
            .and_then(|d| self.core.unboxed(d.decl))
    }

    fn type_arg_map(&self, decl: DeclId, args: &[TypeId]) -> FxHashMap<TypeId, TypeId> {
        self.decl(decl)
            .type_params
            .iter()
            .copied()
            .zip(args.iter().copied())
            .collect()
    }

    /// Replace type variables according to `map`
    pub fn substitute(&self, ty: TypeId, map: &FxHashMap<TypeId, TypeId>) -> TypeId {
        if map.is_empty() {
            return ty;
        }
        match &*self.get(ty) {
            Type::TypeVar(_) => map.get(&ty).copied().unwrap_or(ty),
            Type::Declared(d) if !d.args.is_empty() => {
                let args = d.args.iter().map(|&a| self.substitute(a, map)).collect();
                self.declared_type(d.decl, args)
            }
            Type::Array(a) => self.array_type(self.substitute(a.component, map)),
            Type::Wildcard(w) => self.wildcard(
                w.extends_bound.map(|b| self.substitute(b, map)),
                w.super_bound.map(|b| self.substitute(b, map)),
            ),
            Type::Intersection(i) => {
                let bounds = i.bounds.iter().map(|&b| self.substitute(b, map)).collect();
                self.intersection(bounds)
            }
            _ => ty,
        }
    }

    /// Direct supertypes of a declared type, with type arguments substituted
    ///
    /// Raw uses of generic declarations have erased supertypes.
    pub fn direct_supertypes(&self, ty: TypeId) -> Vec<TypeId> {
        let t = self.get(ty);
        let Some(declared) = t.as_declared() else {
            return Vec::new();
        };
        let decl = self.decl(declared.decl);
        let supers = decl.superclass.iter().chain(decl.interfaces.iter()).copied();
        if declared.args.is_empty() && !decl.type_params.is_empty() {
            return supers.map(|s| self.erasure(s)).collect();
        }
        let map = self.type_arg_map(declared.decl, &declared.args);
        supers.map(|s| self.substitute(s, &map)).collect()
    }

    /// Find the supertype of `ty` declared by `target`.
    ///
    /// `as_super(ArrayList<String>, List)` is `List<String>`.
    pub fn as_super(&self, ty: TypeId, target: DeclId) -> Option<TypeId> {
        if target == self.core.object && self.get(ty).is_reference() {
            return Some(self.object_type());
        }
        let mut stack = vec![ty];
        let mut seen = FxHashSet::default();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            match &*self.get(current) {
                Type::Declared(d) if d.decl == target => return Some(current),
                Type::Declared(_) => stack.extend(self.direct_supertypes(current)),
                Type::TypeVar(_) => stack.push(self.type_var_bound(current)),
                Type::Intersection(i) => stack.extend(i.bounds.iter().copied()),
                _ => {}
            }
        }
        None
    }

    /// Type erasure
    pub fn erasure(&self, ty: TypeId) -> TypeId {
        match &*self.get(ty) {
            Type::Declared(d) if !d.args.is_empty() => self.declared_type(d.decl, Vec::new()),
            Type::Array(a) => self.array_type(self.erasure(a.component)),
            Type::TypeVar(_) => self.erasure(self.type_var_bound(ty)),
            Type::Intersection(i) => match i.bounds.first() {
                Some(&first) => self.erasure(first),
                None => self.object_type(),
            },
            Type::Wildcard(w) => match w.extends_bound {
                Some(bound) => self.erasure(bound),
                None => self.object_type(),
            },
            _ => ty,
        }
    }

    /// Method type as a member of `site`, with the owner's type arguments substituted
    pub fn as_member_of(&self, site: TypeId, method: MethodId) -> Signature {
        let m = self.method(method);
        let owner_generic = !self.decl(m.owner).type_params.is_empty();
        let owner_args = self
            .as_super(site, m.owner)
            .and_then(|owner_ty| self.get(owner_ty).as_declared().map(|d| d.args.clone()))
            .unwrap_or_default();

        if !owner_args.is_empty() {
            let map = self.type_arg_map(m.owner, &owner_args);
            Signature {
                params: m.params.iter().map(|p| self.substitute(p.ty, &map)).collect(),
                return_type: self.substitute(m.return_type, &map),
            }
        } else if owner_generic {
            // Raw site
            Signature {
                params: m.params.iter().map(|p| self.erasure(p.ty)).collect(),
                return_type: self.erasure(m.return_type),
            }
        } else {
            Signature {
                params: m.params.iter().map(|p| p.ty).collect(),
                return_type: m.return_type,
            }
        }
    }

    /// All methods of a declaration including inherited ones
    ///
    /// Own methods come first, then those of the superclass chain, then those
    /// of the interfaces. Private supertype members and overridden methods
    /// (same name and erased parameter types as seen from the declaration)
    /// are left out.
    pub fn all_methods(&self, decl: DeclId) -> Vec<MethodId> {
        let site = self.decl_type(decl);
        let mut result = Vec::new();
        let mut signatures: FxHashSet<(String, Vec<TypeId>)> = FxHashSet::default();
        let mut visited = FxHashSet::default();
        self.collect_methods(decl, decl, site, &mut result, &mut signatures, &mut visited);
        result
    }

    fn collect_methods(
        &self,
        origin: DeclId,
        current: DeclId,
        site: TypeId,
        result: &mut Vec<MethodId>,
        signatures: &mut FxHashSet<(String, Vec<TypeId>)>,
        visited: &mut FxHashSet<DeclId>,
    ) {
        if !visited.insert(current) {
            return;
        }
        let decl = self.decl(current);
        for &id in &decl.methods {
            let method = self.method(id);
            if current != origin && method.modifiers.is_private() {
                continue;
            }
            let signature = self.as_member_of(site, id);
            let erased = signature.params.iter().map(|&p| self.erasure(p)).collect();
            if signatures.insert((method.name.clone(), erased)) {
                result.push(id);
            }
        }
        for sup in decl.superclass.iter().chain(decl.interfaces.iter()) {
            let sup_decl = self.get(*sup).as_declared().map(|d| d.decl);
            if let Some(sup_decl) = sup_decl {
                self.collect_methods(origin, sup_decl, site, result, signatures, visited);
            }
        }
    }

    /// All fields of a declaration including inherited ones
    ///
    /// Hidden fields (same name as an already collected one) and private
    /// supertype fields are left out.
    pub fn all_fields(&self, decl: DeclId) -> Vec<FieldId> {
        let mut result = Vec::new();
        let mut names = FxHashSet::default();
        let mut visited = FxHashSet::default();
        let mut stack = vec![decl];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let d = self.decl(current);
            for &id in &d.fields {
                let field = self.field(id);
                if current != decl && field.modifiers.is_private() {
                    continue;
                }
                if names.insert(field.name.clone()) {
                    result.push(id);
                }
            }
            // Reverse so the superclass is visited before the interfaces
            for sup in d.interfaces.iter().rev().chain(d.superclass.iter()) {
                if let Some(sup_decl) = self.get(*sup).as_declared().map(|t| t.decl) {
                    stack.push(sup_decl);
                }
            }
        }
        result
    }

    /// Attribute value including the annotation type's declared default
    pub fn annotation_value_with_defaults(
        &self,
        annotation: &AnnotationUse,
        name: &str,
    ) -> Option<AnnotationValue> {
        if let Some(value) = annotation.values.get(name) {
            return Some(value.clone());
        }
        self.decl(annotation.annotation)
            .attributes
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.default.clone())
    }

    /// Human readable name of a type, using simple declaration names
    pub fn type_name(&self, ty: TypeId) -> String {
        match &*self.get(ty) {
            Type::Primitive(p) => p.name().to_string(),
            Type::Void => "void".to_string(),
            Type::NoType => "none".to_string(),
            Type::Declared(d) => {
                let name = self.decl(d.decl).name.clone();
                if d.args.is_empty() {
                    name
                } else {
                    let args: Vec<String> = d.args.iter().map(|&a| self.type_name(a)).collect();
                    format!("{}<{}>", name, args.join(", "))
                }
            }
            Type::Array(a) => format!("{}[]", self.type_name(a.component)),
            Type::TypeVar(tv) => tv.name.clone(),
            Type::Intersection(i) => {
                let bounds: Vec<String> = i.bounds.iter().map(|&b| self.type_name(b)).collect();
                bounds.join(" & ")
            }
            Type::Wildcard(w) => match (w.extends_bound, w.super_bound) {
                (Some(bound), _) => format!("? extends {}", self.type_name(bound)),
                (None, Some(bound)) => format!("? super {}", self.type_name(bound)),
                (None, None) => "?".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::TypeDecl;

    #[test]
    fn test_type_interning() {
        let ctx = TypeContext::new();
        let a = ctx.array_type(ctx.primitive(PrimitiveType::Int));
        let b = ctx.array_type(ctx.primitive(PrimitiveType::Int));
        assert_eq!(a, b);
        assert_ne!(a, ctx.array_type(ctx.primitive(PrimitiveType::Long)));
    }

    #[test]
    fn test_core_prelude() {
        let ctx = TypeContext::new();
        assert_eq!(ctx.lookup_decl("core.Object"), Some(ctx.core().object));
        assert_eq!(ctx.type_name(ctx.boxed_type(PrimitiveType::Char)), "Character");
        assert_eq!(ctx.unboxed(ctx.boxed_type(PrimitiveType::Int)), Some(PrimitiveType::Int));
        assert!(ctx.decl(ctx.core().object).superclass.is_none());
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut ctx = TypeContext::new();
        ctx.declare(TypeDecl::class("demo", "Foo")).unwrap();
        let err = ctx.declare(TypeDecl::class("demo", "Foo")).unwrap_err();
        assert_eq!(err, TypeError::DuplicateDeclaration { name: "demo.Foo".into() });
    }

    #[test]
    fn test_class_defaults_to_object_superclass() {
        let mut ctx = TypeContext::new();
        let foo = ctx.declare(TypeDecl::class("demo", "Foo")).unwrap();
        assert_eq!(ctx.decl(foo).superclass, Some(ctx.object_type()));
        let iface = ctx.declare(TypeDecl::interface("demo", "Bar")).unwrap();
        assert_eq!(ctx.decl(iface).superclass, None);
    }

    #[test]
    fn test_nested_qualified_name() {
        let mut ctx = TypeContext::new();
        let outer = ctx.declare(TypeDecl::class("demo", "Outer")).unwrap();
        let inner = ctx
            .declare(TypeDecl::class("", "Inner").nested_in(outer))
            .unwrap();
        assert_eq!(ctx.qualified_name(inner), "demo.Outer.Inner");
        assert_eq!(ctx.decl(inner).package, "demo");
    }

    #[test]
    fn test_as_member_of_substitutes_type_arguments() {
        let mut ctx = TypeContext::new();
        let t = ctx.type_variable("T");
        let holder = ctx
            .declare(TypeDecl::interface("demo", "Holder").with_type_params(vec![t]))
            .unwrap();
        let get = ctx.add_method(holder, MethodDecl::new("get", t).param("key", t));

        let string = ctx.string_type();
        let holder_of_string = ctx.declared_type(holder, vec![string]);
        let impl_decl = ctx
            .declare(TypeDecl::class("demo", "StringHolder").implements(holder_of_string))
            .unwrap();

        let sig = ctx.as_member_of(ctx.decl_type(impl_decl), get);
        assert_eq!(sig.params, vec![string]);
        assert_eq!(sig.return_type, string);

        let raw = ctx.declared_type(holder, Vec::new());
        let raw_sig = ctx.as_member_of(raw, get);
        assert_eq!(raw_sig.return_type, ctx.object_type());
    }

    #[test]
    fn test_all_methods_skips_overridden() {
        let mut ctx = TypeContext::new();
        let void = ctx.void_type();
        let iface = ctx.declare(TypeDecl::interface("demo", "Service")).unwrap();
        let iface_run = ctx.add_method(
            iface,
            MethodDecl::new("run", void).with_modifiers(Modifiers::public().with_abstract()),
        );
        let iface_ty = ctx.decl_type(iface);
        let class = ctx
            .declare(TypeDecl::class("demo", "Impl").implements(iface_ty))
            .unwrap();
        let own_run = ctx.add_method(class, MethodDecl::new("run", void));

        let all = ctx.all_methods(class);
        assert!(all.contains(&own_run));
        assert!(!all.contains(&iface_run));
        // Object members are inherited
        assert!(all.iter().any(|&m| ctx.method(m).name == "hashCode"));
    }

    #[test]
    fn test_erasure() {
        let mut ctx = TypeContext::new();
        let t = ctx.type_variable("T");
        let list = ctx
            .declare(TypeDecl::interface("demo", "List").with_type_params(vec![t]))
            .unwrap();
        let list_of_string = ctx.declared_type(list, vec![ctx.string_type()]);
        assert_eq!(ctx.erasure(list_of_string), ctx.declared_type(list, Vec::new()));
        assert_eq!(ctx.erasure(t), ctx.object_type());
        assert_eq!(ctx.type_name(list_of_string), "List<String>");
    }
}
