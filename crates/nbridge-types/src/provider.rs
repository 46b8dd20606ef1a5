//! Type information queries
//!
//! [`TypeInfo`] is the only way the processor looks at the host type
//! system. [`TypeContext`] implements it over a synthetic universe; a
//! compiler front end can implement it over its own symbol tables.

use crate::context::TypeContext;
use crate::decl::{
    AnnotationUse, AnnotationValue, ConstructorDecl, FieldDecl, MethodDecl, Signature, TypeDecl,
};
use crate::subtyping::SubtypingContext;
use crate::ty::{ConstructorId, DeclId, FieldId, MethodId, PrimitiveType, Type, TypeId};
use std::sync::Arc;

/// Queries over a type universe
pub trait TypeInfo {
    /// Resolve a type id
    fn get(&self, ty: TypeId) -> Arc<Type>;

    /// A type declaration
    fn decl(&self, id: DeclId) -> &TypeDecl;

    /// A method declaration
    fn method(&self, id: MethodId) -> &MethodDecl;

    /// A field declaration
    fn field(&self, id: FieldId) -> &FieldDecl;

    /// A constructor declaration
    fn constructor(&self, id: ConstructorId) -> &ConstructorDecl;

    /// Every declaration of the universe, in declaration order
    fn decls(&self) -> Vec<DeclId>;

    /// Find a declaration by qualified name
    fn lookup_decl(&self, qualified_name: &str) -> Option<DeclId>;

    /// Qualified name of a declaration
    fn qualified_name(&self, id: DeclId) -> String;

    /// The root object type
    fn object_type(&self) -> TypeId;

    /// The built-in string type
    fn string_type(&self) -> TypeId;

    /// A primitive type
    fn primitive(&self, primitive: PrimitiveType) -> TypeId;

    /// The `void` pseudo type
    fn void_type(&self) -> TypeId;

    /// The "no type" marker (constructor results)
    fn no_type(&self) -> TypeId;

    /// A declared type with explicit type arguments
    fn declared_type(&self, decl: DeclId, args: Vec<TypeId>) -> TypeId;

    /// The type of a declaration as seen from inside it
    fn decl_type(&self, decl: DeclId) -> TypeId;

    /// An array type
    fn array_type(&self, component: TypeId) -> TypeId;

    /// Boxed counterpart of a primitive
    fn boxed(&self, primitive: PrimitiveType) -> TypeId;

    /// Same-type check
    fn is_same_type(&self, a: TypeId, b: TypeId) -> bool;

    /// Subtype check: `sub <: sup`
    fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool;

    /// Assignability check, including boxing and raw conversion
    fn is_assignable(&self, from: TypeId, to: TypeId) -> bool;

    /// Type erasure
    fn erasure(&self, ty: TypeId) -> TypeId;

    /// Upper bound of a type variable
    fn type_var_bound(&self, ty: TypeId) -> TypeId;

    /// All methods of a declaration, inherited ones included
    fn all_methods(&self, decl: DeclId) -> Vec<MethodId>;

    /// All fields of a declaration, inherited ones included
    fn all_fields(&self, decl: DeclId) -> Vec<FieldId>;

    /// Method type as a member of `site`
    fn as_member_of(&self, site: TypeId, method: MethodId) -> Signature;

    /// Attribute value including the annotation type's default
    fn annotation_value_with_defaults(
        &self,
        annotation: &AnnotationUse,
        name: &str,
    ) -> Option<AnnotationValue>;

    /// Human readable type name
    fn type_name(&self, ty: TypeId) -> String;

    /// Simple name of a declaration
    fn simple_name(&self, id: DeclId) -> &str {
        &self.decl(id).name
    }

    /// Declaration of a declared type
    fn decl_of(&self, ty: TypeId) -> Option<DeclId> {
        self.get(ty).as_declared().map(|d| d.decl)
    }
}

impl TypeInfo for TypeContext {
    fn get(&self, ty: TypeId) -> Arc<Type> {
        TypeContext::get(self, ty)
    }

    fn decl(&self, id: DeclId) -> &TypeDecl {
        TypeContext::decl(self, id)
    }

    fn method(&self, id: MethodId) -> &MethodDecl {
        TypeContext::method(self, id)
    }

    fn field(&self, id: FieldId) -> &FieldDecl {
        TypeContext::field(self, id)
    }

    fn constructor(&self, id: ConstructorId) -> &ConstructorDecl {
        TypeContext::constructor(self, id)
    }

    fn decls(&self) -> Vec<DeclId> {
        self.decl_ids().collect()
    }

    fn lookup_decl(&self, qualified_name: &str) -> Option<DeclId> {
        TypeContext::lookup_decl(self, qualified_name)
    }

    fn qualified_name(&self, id: DeclId) -> String {
        TypeContext::qualified_name(self, id)
    }

    fn object_type(&self) -> TypeId {
        TypeContext::object_type(self)
    }

    fn string_type(&self) -> TypeId {
        TypeContext::string_type(self)
    }

    fn primitive(&self, primitive: PrimitiveType) -> TypeId {
        TypeContext::primitive(self, primitive)
    }

    fn void_type(&self) -> TypeId {
        TypeContext::void_type(self)
    }

    fn no_type(&self) -> TypeId {
        TypeContext::no_type(self)
    }

    fn declared_type(&self, decl: DeclId, args: Vec<TypeId>) -> TypeId {
        TypeContext::declared_type(self, decl, args)
    }

    fn decl_type(&self, decl: DeclId) -> TypeId {
        TypeContext::decl_type(self, decl)
    }

    fn array_type(&self, component: TypeId) -> TypeId {
        TypeContext::array_type(self, component)
    }

    fn boxed(&self, primitive: PrimitiveType) -> TypeId {
        self.boxed_type(primitive)
    }

    fn is_same_type(&self, a: TypeId, b: TypeId) -> bool {
        SubtypingContext::new(self).is_same_type(a, b)
    }

    fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        SubtypingContext::new(self).is_subtype(sub, sup)
    }

    fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        SubtypingContext::new(self).is_assignable(from, to)
    }

    fn erasure(&self, ty: TypeId) -> TypeId {
        TypeContext::erasure(self, ty)
    }

    fn type_var_bound(&self, ty: TypeId) -> TypeId {
        TypeContext::type_var_bound(self, ty)
    }

    fn all_methods(&self, decl: DeclId) -> Vec<MethodId> {
        TypeContext::all_methods(self, decl)
    }

    fn all_fields(&self, decl: DeclId) -> Vec<FieldId> {
        TypeContext::all_fields(self, decl)
    }

    fn as_member_of(&self, site: TypeId, method: MethodId) -> Signature {
        TypeContext::as_member_of(self, site, method)
    }

    fn annotation_value_with_defaults(
        &self,
        annotation: &AnnotationUse,
        name: &str,
    ) -> Option<AnnotationValue> {
        TypeContext::annotation_value_with_defaults(self, annotation, name)
    }

    fn type_name(&self, ty: TypeId) -> String {
        TypeContext::type_name(self, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::TypeDecl;

    fn simple_names<T: TypeInfo + ?Sized>(types: &T, ids: &[DeclId]) -> Vec<String> {
        ids.iter().map(|&id| types.simple_name(id).to_string()).collect()
    }

    #[test]
    fn test_context_as_dyn_provider() {
        let mut ctx = TypeContext::new();
        let foo = ctx.declare(TypeDecl::class("demo", "Foo")).unwrap();
        let types: &dyn TypeInfo = &ctx;
        assert_eq!(types.decl_of(types.decl_type(foo)), Some(foo));
        assert!(types.is_subtype(types.decl_type(foo), types.object_type()));
        assert_eq!(simple_names(types, &[foo]), vec!["Foo".to_string()]);
        assert!(types.decls().contains(&foo));
    }
}
