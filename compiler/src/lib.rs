//! brine-protogen-compiler
//!
//! This crate implements:
//!  1) A tokenizer + parser for the declaration subset of Go source files,
//!  2) A declaration extractor (name filter, visibility, error types, test doubles),
//!  3) A type mapper from Go type expressions to schema field types, with overrides,
//!  4) Message and service synthesis into `SchemaDocument`s,
//!  5) The `translate_module` orchestrator and error types (`ProtogenError`).

pub mod error;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod source;
pub mod naming;
pub mod extractor;
pub mod mapping;
pub mod message;
pub mod service;
pub mod compiler;

pub use compiler::{compile_module, render_translation, translate_module, Grouping, TranslateOptions, Translation};
pub use error::ProtogenError;
pub use mapping::{TypeMapper, TypeOverrides, UNRESOLVED_PREFIX};
pub use source::{DeclarationSource, GoSource, StringSource};
