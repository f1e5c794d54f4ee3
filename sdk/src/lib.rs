//! brine-protogen
//!
//! This crate is the library entry point for turning a Go package into
//! Protocol Buffers schema files.
//!
//! - `translate_path` / `translate_documents` (read Go sources from disk and translate them)
//! - `write_outputs` (write rendered documents, only after all of them rendered)
//! - `document_to_json` (dump a document model for inspection)

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

pub use brine_protogen_compiler::{
    compile_module, render_translation, translate_module, DeclarationSource, GoSource, Grouping, ProtogenError,
    StringSource, TranslateOptions, Translation, TypeOverrides, UNRESOLVED_PREFIX,
};
pub use brine_protogen_schema::{emit, SchemaDocument, SchemaError};

/// Loads the Go package at `paths` (one directory, or files from one
/// directory) and translates it into documents.
pub fn translate_documents(paths: &[PathBuf], options: &TranslateOptions) -> Result<Translation, ProtogenError> {
    let source = GoSource::from_paths(paths)?;
    let module = source.load()?;
    translate_module(&module, options)
}

/// Like [`translate_documents`], rendered to `(file name, text)` pairs in file-name order.
pub fn translate_path(paths: &[PathBuf], options: &TranslateOptions) -> Result<Vec<(String, String)>, ProtogenError> {
    let translation = translate_documents(paths, options)?;
    render_translation(&translation)
}

/// Writes each `(file name, text)` pair under `dir`, creating it if needed.
/// Returns the written paths.
pub fn write_outputs(dir: &Path, outputs: &[(String, String)]) -> Result<Vec<PathBuf>, ProtogenError> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).map_err(|source| ProtogenError::Output {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (file_name, text) in outputs {
        let path = dir.join(file_name);
        write_file(&path, text).map_err(|source| ProtogenError::Output {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = text.len(), "wrote schema document");
        written.push(path);
    }
    Ok(written)
}

fn write_file(path: &Path, text: &str) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()
}

/// Pretty-printed JSON of a document model.
pub fn document_to_json(doc: &SchemaDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

pub mod error {
    pub use brine_protogen_compiler::error::ProtogenError;
    pub use brine_protogen_schema::error::SchemaError;
}

pub mod schema {
    pub use brine_protogen_schema::{
        Extensions, FieldType, SchemaField, SchemaMessage, SchemaMethod, SchemaService, TypeKind,
    };
}
