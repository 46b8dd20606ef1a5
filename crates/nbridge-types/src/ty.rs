//! Core type definitions for the bridge type universe

use std::fmt;

/// Unique identifier for an interned type in the type context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Identifier of a type declaration (class, interface, annotation, enum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub(crate) u32);

/// Identifier of a method declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub(crate) u32);

/// Identifier of a field declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub(crate) u32);

/// Identifier of a constructor declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstructorId(pub(crate) u32);

/// Primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `char`
    Char,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl PrimitiveType {
    /// All primitive types, in declaration order
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    /// Source-level keyword of the primitive
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Simple name of the boxed counterpart in the `core` package
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Byte => "Byte",
            PrimitiveType::Short => "Short",
            PrimitiveType::Char => "Character",
            PrimitiveType::Int => "Integer",
            PrimitiveType::Long => "Long",
            PrimitiveType::Float => "Float",
            PrimitiveType::Double => "Double",
        }
    }

    /// Parse a primitive keyword
    pub fn from_name(name: &str) -> Option<PrimitiveType> {
        PrimitiveType::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Primitive subtyping: `self <: other` via widening
    ///
    /// byte <: short <: int <: long <: float <: double, and char <: int.
    pub fn widens_to(self, other: PrimitiveType) -> bool {
        use PrimitiveType::*;
        if self == other {
            return true;
        }
        match self {
            Byte => matches!(other, Short | Int | Long | Float | Double),
            Short | Char => matches!(other, Int | Long | Float | Double),
            Int => matches!(other, Long | Float | Double),
            Long => matches!(other, Float | Double),
            Float => matches!(other, Double),
            Boolean | Double => false,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to a declared type with its type arguments: `List<Integer>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    /// The declaration
    pub decl: DeclId,
    /// Type arguments (empty for non-generic or raw uses)
    pub args: Vec<TypeId>,
}

/// Array type: `T[]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    /// Component type
    pub component: TypeId,
}

/// Type variable: `T`
///
/// Type variables are nominal; two variables with the same name declared by
/// different owners are distinct. The upper bound is stored in the type
/// context because bounds may refer back to the variable itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVar {
    /// Variable name
    pub name: String,
    /// Unique index assigned by the type context
    pub index: u32,
}

/// Intersection type: `A & B`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntersectionType {
    /// Bounds, in declaration order
    pub bounds: Vec<TypeId>,
}

/// Wildcard type argument: `?`, `? extends T`, `? super T`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WildcardType {
    /// Upper bound (`? extends T`)
    pub extends_bound: Option<TypeId>,
    /// Lower bound (`? super T`)
    pub super_bound: Option<TypeId>,
}

/// The core type representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Primitive type
    Primitive(PrimitiveType),

    /// The `void` pseudo type (method results only)
    Void,

    /// Class, interface, annotation or enum type
    Declared(DeclaredType),

    /// Array type
    Array(ArrayType),

    /// Type variable
    TypeVar(TypeVar),

    /// Intersection of bounds
    Intersection(IntersectionType),

    /// Wildcard type argument
    Wildcard(WildcardType),

    /// Absence of a type (constructor results)
    NoType,
}

impl Type {
    /// Check if this type is a primitive type
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Check if this type is `void`
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Check if this type is a declared type
    pub fn is_declared(&self) -> bool {
        matches!(self, Type::Declared(_))
    }

    /// Check if this type is a reference type (can be stored in an object slot)
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Declared(_) | Type::Array(_) | Type::TypeVar(_) | Type::Intersection(_)
        )
    }

    /// Get the primitive type if this is a primitive
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Get the declared type if this is one
    pub fn as_declared(&self) -> Option<&DeclaredType> {
        match self {
            Type::Declared(d) => Some(d),
            _ => None,
        }
    }

    /// Get the array type if this is one
    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            Type::Array(a) => Some(a),
            _ => None,
        }
    }
}
