use std::path::Path;

use regex::Regex;

use crate::types::{DeclarationKind, SourceDeclaration};

/// Names starting with one of these are error values, never messages.
pub const ERROR_PREFIXES: [&str; 1] = ["Err"];
pub const ERROR_SUFFIXES: [&str; 1] = ["Error"];

/// Names starting with one of these are test doubles.
pub const TEST_DOUBLE_PREFIXES: [&str; 3] = ["Mock", "Fake", "Stub"];

/// Selects the records and contracts to translate, in input order.
///
/// A declaration is kept when it matches `filter`, is exported, is not an
/// error type and is not a test double. The error and test-double rules
/// apply whatever the filter says.
pub fn extract<'a>(declarations: &'a [SourceDeclaration], filter: &Regex) -> Vec<&'a SourceDeclaration> {
    declarations
        .iter()
        .filter(|decl| !matches!(decl.kind, DeclarationKind::Defined(_)))
        .filter(|decl| filter.is_match(&decl.name))
        .filter(|decl| decl.is_exported())
        .filter(|decl| !is_error_type(&decl.name))
        .filter(|decl| !is_test_double(decl))
        .collect()
}

pub fn is_error_type(name: &str) -> bool {
    ERROR_PREFIXES.iter().any(|p| name.starts_with(p))
        || ERROR_SUFFIXES.iter().any(|s| name.ends_with(s))
}

pub fn is_test_double(decl: &SourceDeclaration) -> bool {
    let in_test_file = Path::new(&decl.file)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with("_test"));
    in_test_file || TEST_DOUBLE_PREFIXES.iter().any(|p| decl.name.starts_with(p))
}
