use std::{collections::BTreeMap, path::Path};

use brine_protogen_schema::{emit, SchemaDocument};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{
    error::ProtogenError,
    extractor::extract,
    mapping::{TypeMapper, TypeOverrides},
    message::build_message,
    service::build_service,
    source::DeclarationSource,
    types::{DeclarationKind, SourceDeclaration, SourceModule},
};

/// File extension of every generated document.
pub const OUTPUT_EXTENSION: &str = "proto";

lazy_static! {
    static ref MATCH_ALL: Regex = Regex::new(".*").unwrap();
}

/// How selected declarations are distributed over output documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Grouping {
    /// Everything in one `<module>.proto`.
    #[default]
    Single,
    /// One `<stem>.proto` per source file.
    PerFile,
}

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Schema package; the module name when unset.
    pub package:      Option<String>,
    pub filter:       Regex,
    pub overrides:    TypeOverrides,
    pub grouping:     Grouping,
    /// File-level `option key = value;` lines for every document.
    pub file_options: BTreeMap<String, String>,
    /// Document name under [`Grouping::Single`]; `<module>.proto` when unset.
    pub output_name:  Option<String>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        TranslateOptions {
            package:      None,
            filter:       MATCH_ALL.clone(),
            overrides:    TypeOverrides::well_known(),
            grouping:     Grouping::Single,
            file_options: BTreeMap::new(),
            output_name:  None,
        }
    }
}

impl TranslateOptions {
    /// Options selecting declarations whose name matches `filter`.
    pub fn new(filter: &str) -> Result<Self, ProtogenError> {
        Ok(TranslateOptions {
            filter: Regex::new(filter)?,
            ..TranslateOptions::default()
        })
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Layers `overrides` over the built-in well-known mappings.
    pub fn with_overrides(mut self, overrides: TypeOverrides) -> Self {
        self.overrides.merge(overrides);
        self
    }

    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.file_options.insert(key.into(), value.into());
        self
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    fn document_name(&self, module: &str, decl: &SourceDeclaration) -> String {
        match self.grouping {
            Grouping::Single => self
                .output_name
                .clone()
                .unwrap_or_else(|| format!("{}.{}", module, OUTPUT_EXTENSION)),
            Grouping::PerFile => {
                let stem = Path::new(&decl.file)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| module.to_string());
                format!("{}.{}", stem, OUTPUT_EXTENSION)
            }
        }
    }
}

/// Output documents keyed by file name; iteration order is emission order.
pub type Translation = BTreeMap<String, SchemaDocument>;

/// Translates the selected declarations of `module` into schema documents.
///
/// Records become messages and contracts become services, each in the
/// document its grouping assigns it to. The first fatal error stops the
/// whole translation.
pub fn translate_module(module: &SourceModule, options: &TranslateOptions) -> Result<Translation, ProtogenError> {
    let selected = extract(&module.declarations, &options.filter);
    debug!(
        module = %module.name,
        selected = selected.len(),
        total = module.declarations.len(),
        "selected declarations"
    );

    let placement: Vec<(&SourceDeclaration, String)> = selected
        .into_iter()
        .map(|decl| (decl, options.document_name(&module.name, decl)))
        .collect();

    // Where each translated record lives, so other documents can import it
    let origins: BTreeMap<String, String> = placement
        .iter()
        .filter(|(decl, _)| matches!(decl.kind, DeclarationKind::Record(_)))
        .map(|(decl, document)| (decl.name.clone(), document.clone()))
        .collect();

    let mapper = TypeMapper::new(&module.name, &module.declarations, &options.overrides).with_origins(origins);
    let package = options.package.as_deref().unwrap_or(&module.name);

    let mut documents = Translation::new();
    for (decl, document) in placement {
        let doc = documents.entry(document).or_insert_with_key(|file_name| {
            let mut doc = SchemaDocument::new(file_name.clone(), package);
            for (key, value) in &options.file_options {
                doc.set_option(key.clone(), value.clone());
            }
            doc
        });

        match &decl.kind {
            DeclarationKind::Record(fields) => {
                build_message(doc, &mapper, &decl.name, &decl.docs, fields)?;
            }
            DeclarationKind::Contract(methods) => {
                build_service(doc, &mapper, &decl.name, &decl.docs, methods)?;
            }
            DeclarationKind::Defined(_) => {}
        }
    }
    Ok(documents)
}

/// Emits every document, in file-name order. Nothing is returned unless all
/// documents verified.
pub fn render_translation(translation: &Translation) -> Result<Vec<(String, String)>, ProtogenError> {
    translation
        .iter()
        .map(|(file_name, doc)| {
            let text = emit(doc).map_err(|e| ProtogenError::schema(file_name.clone(), e))?;
            Ok((file_name.clone(), text))
        })
        .collect()
}

/// Loads `source`, translates it and renders the result as `(file name, text)` pairs.
pub fn compile_module(
    source: &dyn DeclarationSource,
    options: &TranslateOptions,
) -> Result<Vec<(String, String)>, ProtogenError> {
    let module = source.load()?;
    let translation = translate_module(&module, options)?;
    render_translation(&translation)
}
