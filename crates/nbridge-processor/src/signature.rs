//! Printing members for messages and outlines

use nbridge_types::{
    AnnotationUse, ElementRef, FieldId, MethodId, Modifiers, Type, TypeId, TypeInfo, Visibility,
};

/// Print a method head: `static Service resolveDispatch(Object receiver)`
///
/// A `NoType` result prints a constructor head.
pub fn print_method<T, S>(
    types: &T,
    modifiers: &Modifiers,
    name: &str,
    return_type: TypeId,
    params: &[(TypeId, S)],
) -> String
where
    T: TypeInfo + ?Sized,
    S: AsRef<str>,
{
    let mut out = String::new();
    let mods = modifiers.to_string();
    if !mods.is_empty() {
        out.push_str(&mods);
        out.push(' ');
    }
    if !matches!(*types.get(return_type), Type::NoType) {
        out.push_str(&types.type_name(return_type));
        out.push(' ');
    }
    out.push_str(name);
    out.push('(');
    let params: Vec<String> = params
        .iter()
        .map(|(ty, name)| format!("{} {}", types.type_name(*ty), name.as_ref()))
        .collect();
    out.push_str(&params.join(", "));
    out.push(')');
    out
}

/// Print a declared method as written
pub fn print_method_decl<T: TypeInfo + ?Sized>(types: &T, method: MethodId) -> String {
    let decl = types.method(method);
    let params: Vec<(TypeId, &str)> = decl.params.iter().map(|p| (p.ty, p.name.as_str())).collect();
    print_method(types, &decl.modifiers, &decl.name, decl.return_type, &params)
}

/// Print a method head with generated parameter names `p0`, `p1`, ...
pub fn print_method_with_types<T: TypeInfo + ?Sized>(
    types: &T,
    modifiers: &Modifiers,
    name: &str,
    return_type: TypeId,
    param_types: &[TypeId],
) -> String {
    let params: Vec<(TypeId, String)> = param_types
        .iter()
        .enumerate()
        .map(|(i, &ty)| (ty, format!("p{}", i)))
        .collect();
    print_method(types, modifiers, name, return_type, &params)
}

/// Print a field: `final NativeObject delegate`
pub fn print_field<T: TypeInfo + ?Sized>(
    types: &T,
    modifiers: &Modifiers,
    name: &str,
    ty: TypeId,
) -> String {
    let mods = modifiers.to_string();
    if mods.is_empty() {
        format!("{} {}", types.type_name(ty), name)
    } else {
        format!("{} {} {}", mods, types.type_name(ty), name)
    }
}

/// Print a declared field as written
pub fn print_field_decl<T: TypeInfo + ?Sized>(types: &T, field: FieldId) -> String {
    let decl = types.field(field);
    print_field(types, &decl.modifiers, &decl.name, decl.ty)
}

/// Print a parameter type list: `(A, B)`, with `,...)` when more may follow
pub fn signature<T: TypeInfo + ?Sized>(
    types: &T,
    params: &[TypeId],
    any_before: bool,
    any_after: bool,
) -> String {
    let names: Vec<String> = params.iter().map(|&ty| types.type_name(ty)).collect();
    format!(
        "{}{}{}",
        if any_before { "(...," } else { "(" },
        names.join(", "),
        if any_after { ",...)" } else { ")" }
    )
}

/// The given modifiers made static and at least package visible
pub fn static_non_private(modifiers: &Modifiers) -> Modifiers {
    let mut result = *modifiers;
    if result.is_private() {
        result.visibility = Visibility::Package;
    }
    result.is_static = true;
    result
}

/// Annotations carried by an element
pub fn element_annotations<T: TypeInfo + ?Sized>(
    types: &T,
    element: ElementRef,
) -> &[AnnotationUse] {
    match element {
        ElementRef::Type(id) => &types.decl(id).annotations,
        ElementRef::Method(id) => &types.method(id).annotations,
        ElementRef::Field(id) => &types.field(id).annotations,
        ElementRef::Constructor(id) => &types.constructor(id).annotations,
    }
}

/// Short description of an element: `method Foo.bar(int)`
pub fn describe_element<T: TypeInfo + ?Sized>(types: &T, element: ElementRef) -> String {
    match element {
        ElementRef::Type(id) => format!("type `{}`", types.qualified_name(id)),
        ElementRef::Method(id) => {
            let method = types.method(id);
            let params: Vec<TypeId> = method.params.iter().map(|p| p.ty).collect();
            format!(
                "method `{}.{}{}`",
                types.simple_name(method.owner),
                method.name,
                signature(types, &params, false, false)
            )
        }
        ElementRef::Field(id) => {
            let field = types.field(id);
            format!("field `{}.{}`", types.simple_name(field.owner), field.name)
        }
        ElementRef::Constructor(id) => {
            let constructor = types.constructor(id);
            let params: Vec<TypeId> = constructor.params.iter().map(|p| p.ty).collect();
            let owner = types.simple_name(constructor.owner);
            format!("constructor `{}{}`", owner, signature(types, &params, false, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbridge_types::{FieldDecl, MethodDecl, PrimitiveType, TypeContext, TypeDecl};

    #[test]
    fn test_print_method_and_field() {
        let mut ctx = TypeContext::new();
        let foo = ctx.declare(TypeDecl::class("demo", "Foo")).unwrap();
        let int = ctx.primitive(PrimitiveType::Int);
        let m = ctx.add_method(
            foo,
            MethodDecl::new("add", int)
                .param("a", int)
                .param("b", int)
                .with_modifiers(Modifiers::public().with_abstract()),
        );
        assert_eq!(print_method_decl(&ctx, m), "public abstract int add(int a, int b)");

        let f = ctx.add_field(foo, FieldDecl::new("delegate", ctx.object_type()));
        assert_eq!(print_field_decl(&ctx, f), "Object delegate");
        assert_eq!(describe_element(&ctx, ElementRef::Method(m)), "method `Foo.add(int, int)`");
    }

    #[test]
    fn test_constructor_head() {
        let ctx = TypeContext::new();
        let long = ctx.primitive(PrimitiveType::Long);
        let params = [ctx.string_type(), long];
        let modifiers = Modifiers::package();
        let text = print_method_with_types(&ctx, &modifiers, "Foo", ctx.no_type(), &params);
        assert_eq!(text, "Foo(String p0, long p1)");
    }

    #[test]
    fn test_signature_and_modifiers() {
        let ctx = TypeContext::new();
        let sig = signature(&ctx, &[ctx.string_type()], false, true);
        assert_eq!(sig, "(String,...)");
        let mods = static_non_private(&Modifiers::private().with_final());
        assert_eq!(mods.to_string(), "static final");
    }
}
