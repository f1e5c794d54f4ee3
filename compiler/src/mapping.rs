use std::{collections::BTreeMap, fs, path::Path};

use brine_protogen_schema::FieldType;
use tracing::warn;

use crate::{
    error::ProtogenError,
    types::{is_exported, DeclarationKind, SourceDeclaration, TypeExpr},
};

/// Prefix of the placeholder type emitted for source types with no mapping.
/// Search the output for it to find the fields that still need an override.
pub const UNRESOLVED_PREFIX: &str = "UNRESOLVED.";

/// Defined types may refer to each other; deeper chains are treated as unmapped.
const MAX_DEFINED_DEPTH: usize = 16;

/// Go primitive → (proto scalar, cast type for widths proto lacks).
fn primitive(name: &str) -> Option<(&'static str, Option<&'static str>)> {
    let mapped = match name {
        "bool"    => ("bool", None),
        "string"  => ("string", None),
        "int64"   => ("int64", None),
        "int32"   => ("int32", None),
        "rune"    => ("int32", None),
        "uint64"  => ("uint64", None),
        "uint32"  => ("uint32", None),
        "float64" => ("double", None),
        "float32" => ("float", None),
        "int"     => ("int64", Some("int")),
        "int16"   => ("int32", Some("int16")),
        "int8"    => ("int32", Some("int8")),
        "uint"    => ("uint64", Some("uint")),
        "uintptr" => ("uint64", Some("uintptr")),
        "uint16"  => ("uint32", Some("uint16")),
        "uint8"   => ("uint32", Some("uint8")),
        "byte"    => ("uint32", Some("byte")),
        _ => return None,
    };
    Some(mapped)
}

fn is_byte(expr: &TypeExpr) -> bool {
    expr.is_named(None, "byte") || expr.is_named(None, "uint8")
}

/// Literal field types for source types that have no structural mapping,
/// keyed by qualified name (`time.Time`, `shop.money`, `map[string]string`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeOverrides {
    entries: BTreeMap<String, FieldType>,
}

impl TypeOverrides {
    pub fn new() -> Self {
        TypeOverrides::default()
    }

    /// Mappings for standard library types every Go module tends to use.
    pub fn well_known() -> Self {
        let mut overrides = TypeOverrides::new();
        overrides.insert(
            "time.Time",
            FieldType::message("google.protobuf.Timestamp").with_origin("google/protobuf/timestamp.proto"),
        );
        overrides.insert(
            "time.Duration",
            FieldType::scalar("int64").with_cast_type("time.Duration"),
        );
        overrides
    }

    /// Parses a JSON object of qualified name → field type.
    pub fn from_json(text: &str) -> Result<Self, ProtogenError> {
        let entries: BTreeMap<String, FieldType> = serde_json::from_str(text)?;
        Ok(TypeOverrides { entries })
    }

    pub fn load(path: &Path) -> Result<Self, ProtogenError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn insert(&mut self, qualified_name: impl Into<String>, field_type: FieldType) {
        self.entries.insert(qualified_name.into(), field_type);
    }

    pub fn get(&self, qualified_name: &str) -> Option<&FieldType> {
        self.entries.get(qualified_name)
    }

    /// Entries of `other` replace entries of the same name.
    pub fn merge(&mut self, other: TypeOverrides) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

enum LocalType<'a> {
    Record,
    /// Interfaces have no message form; only an override can map them.
    Contract,
    Defined(&'a TypeExpr),
}

/// Resolves source type expressions to schema field types for one module.
pub struct TypeMapper<'a> {
    module:    &'a str,
    locals:    BTreeMap<&'a str, LocalType<'a>>,
    origins:   BTreeMap<String, String>,
    overrides: &'a TypeOverrides,
}

impl<'a> TypeMapper<'a> {
    pub fn new(module: &'a str, declarations: &'a [SourceDeclaration], overrides: &'a TypeOverrides) -> Self {
        let locals = declarations
            .iter()
            .map(|decl| {
                let local = match &decl.kind {
                    DeclarationKind::Defined(underlying) => LocalType::Defined(underlying),
                    DeclarationKind::Record(_) => LocalType::Record,
                    DeclarationKind::Contract(_) => LocalType::Contract,
                };
                (decl.name.as_str(), local)
            })
            .collect();

        TypeMapper {
            module,
            locals,
            origins: BTreeMap::new(),
            overrides,
        }
    }

    /// Records which output document declares each local type, so references
    /// from other documents can import it.
    pub fn with_origins(mut self, origins: BTreeMap<String, String>) -> Self {
        self.origins = origins;
        self
    }

    /// The override-table key for `expr`. Names declared in the module are
    /// prefixed with it; builtins such as `any` or `complex128` are not.
    pub fn qualified_name(&self, expr: &TypeExpr) -> String {
        match expr {
            TypeExpr::Named { package: None, name } if self.locals.contains_key(name.as_str()) => {
                format!("{}.{}", self.module, name)
            }
            other => other.to_string(),
        }
    }

    pub fn resolve(&self, expr: &TypeExpr) -> FieldType {
        self.resolve_at(expr, 0)
    }

    fn resolve_at(&self, expr: &TypeExpr, depth: usize) -> FieldType {
        match expr {
            TypeExpr::Named { package: None, name } => self.resolve_local(expr, name, depth),
            TypeExpr::Named { package: Some(_), .. } => self.resolve_override(expr),
            TypeExpr::Pointer(inner) => {
                let mut field_type = self.resolve_at(inner, depth);
                field_type.non_nullable = false;
                if field_type.is_message() && !field_type.repeated {
                    field_type.optional = true;
                }
                field_type
            }
            TypeExpr::Slice(elem) | TypeExpr::Array { elem, .. } => {
                if is_byte(elem) {
                    return FieldType::scalar("bytes");
                }
                let mut field_type = self.resolve_at(elem, depth);
                if field_type.repeated {
                    // Nested sequences have no schema equivalent
                    return self.resolve_override(expr);
                }
                field_type.repeated = true;
                field_type.optional = false;
                field_type
            }
            TypeExpr::Map { .. } | TypeExpr::Opaque(_) => self.resolve_override(expr),
        }
    }

    fn resolve_local(&self, expr: &TypeExpr, name: &str, depth: usize) -> FieldType {
        if let Some((scalar, cast_type)) = primitive(name) {
            let field_type = FieldType::scalar(scalar);
            return match cast_type {
                Some(cast_type) => field_type.with_cast_type(cast_type),
                None => field_type,
            };
        }
        if let Some(field_type) = self.overrides.get(&self.qualified_name(expr)) {
            return field_type.clone();
        }

        match self.locals.get(name) {
            Some(LocalType::Record) if is_exported(name) => {
                let field_type = FieldType::message(name);
                match self.origins.get(name) {
                    Some(origin) => field_type.with_origin(origin.clone()),
                    None => field_type,
                }
            }
            Some(LocalType::Defined(underlying)) if depth < MAX_DEFINED_DEPTH => {
                let mut field_type = self.resolve_at(underlying, depth + 1);
                if !field_type.is_message() && !field_type.repeated && !field_type.name.starts_with(UNRESOLVED_PREFIX) {
                    field_type.cast_type = Some(name.to_string());
                }
                field_type
            }
            _ => self.unresolved(expr),
        }
    }

    fn resolve_override(&self, expr: &TypeExpr) -> FieldType {
        match self.overrides.get(&self.qualified_name(expr)) {
            Some(field_type) => field_type.clone(),
            None => self.unresolved(expr),
        }
    }

    fn unresolved(&self, expr: &TypeExpr) -> FieldType {
        let qualified = self.qualified_name(expr);
        warn!(
            source_type = %qualified,
            "no schema mapping for type; add an override entry for it"
        );
        FieldType::scalar(format!("{}{}", UNRESOLVED_PREFIX, qualified))
    }
}
