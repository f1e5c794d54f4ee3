use std::fmt;

use serde::Serialize;

/// A source type expression. Every shape the declaration parser can produce
/// has exactly one variant, so type mapping is a total `match`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeExpr {
    /// `Name` or `pkg.Name`.
    Named {
        package: Option<String>,
        name:    String,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array {
        len:  String,
        elem: Box<TypeExpr>,
    },
    Map {
        key:   Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// Function, channel, interface and anonymous struct types, kept as source text.
    Opaque(String),
}

impl TypeExpr {
    pub fn local(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            package: None,
            name:    name.into(),
        }
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Named {
            package: Some(package.into()),
            name:    name.into(),
        }
    }

    /// The named type at the bottom of pointers, slices and arrays.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named { name, .. } => Some(name),
            TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) => inner.base_name(),
            TypeExpr::Array { elem, .. } => elem.base_name(),
            TypeExpr::Map { .. } | TypeExpr::Opaque(_) => None,
        }
    }

    pub fn is_named(&self, package: Option<&str>, name: &str) -> bool {
        matches!(self, TypeExpr::Named { package: p, name: n } if p.as_deref() == package && n == name)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { package: Some(package), name } => write!(f, "{}.{}", package, name),
            TypeExpr::Named { package: None, name } => write!(f, "{}", name),
            TypeExpr::Pointer(inner) => write!(f, "*{}", inner),
            TypeExpr::Slice(inner) => write!(f, "[]{}", inner),
            TypeExpr::Array { len, elem } => write!(f, "[{}]{}", len, elem),
            TypeExpr::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Opaque(text) => write!(f, "{}", text),
        }
    }
}

/// Struct tag annotations in source order, e.g. `json:"name,omitempty" db:"name"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldMetadata {
    pub entries: Vec<(String, String)>,
}

impl FieldMetadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    /// `None` for embedded fields.
    pub name:     Option<String>,
    pub type_:    TypeExpr,
    pub metadata: FieldMetadata,
    pub docs:     String,
    pub line:     usize,
    pub column:   usize,
}

impl FieldDecl {
    pub fn new(name: Option<String>, type_: TypeExpr) -> Self {
        FieldDecl {
            name,
            type_,
            metadata: FieldMetadata::default(),
            docs:     String::new(),
            line:     0,
            column:   0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name:  Option<String>,
    pub type_: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDecl {
    /// `None` for an embedded contract.
    pub name:     Option<String>,
    /// The embedded contract's type when `name` is `None`.
    pub embedded: Option<TypeExpr>,
    pub params:   Vec<Param>,
    pub results:  Vec<Param>,
    pub docs:     String,
    pub line:     usize,
    pub column:   usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DeclarationKind {
    Record(Vec<FieldDecl>),
    Contract(Vec<MethodDecl>),
    /// `type Status string`: a named type defined over another type.
    Defined(TypeExpr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDeclaration {
    pub name:   String,
    pub docs:   String,
    pub file:   String,
    pub line:   usize,
    pub column: usize,
    pub kind:   DeclarationKind,
}

impl SourceDeclaration {
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

/// One package's worth of declarations, in file then source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceModule {
    pub name:         String,
    pub declarations: Vec<SourceDeclaration>,
}

/// Go visibility: an identifier is exported when it starts with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
