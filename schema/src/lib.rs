//! The Protocol Buffers side of brine-protogen: an in-memory document model
//! (messages, fields, services, methods) and a deterministic text emitter.
//!
//! ```
//! use brine_protogen_schema::*;
//!
//! let mut doc = SchemaDocument::new("shop.proto", "shop");
//! doc.add_message(SchemaMessage {
//!     name:   "Item".to_owned(),
//!     docs:   String::new(),
//!     fields: vec![SchemaField {
//!         name:       "name".to_owned(),
//!         docs:       String::new(),
//!         tag:        1,
//!         type_:      FieldType::scalar("string"),
//!         extensions: Extensions::default(),
//!     }],
//! }).unwrap();
//!
//! let text = emit(&doc).unwrap();
//! assert!(text.contains("message Item {\n  string name = 1;\n}\n"));
//! ```

pub mod document;
pub mod emitter;
pub mod error;
pub mod field;
pub mod verifier;

pub use document::*;
pub use emitter::{emit, WRAP_COLUMN};
pub use error::SchemaError;
pub use field::*;
pub use verifier::verify_document;

pub const SYNTAX: &str = "proto3";

/// Package under which the field extension options are declared.
pub const EXTENSION_PACKAGE: &str = "ext";

/// The file declaring the `ext` options, imported by any document that uses them.
pub const EXTENSIONS_IMPORT: &str = "ext/ext.proto";

/// Quotes `text` as a double-quoted string literal.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}
