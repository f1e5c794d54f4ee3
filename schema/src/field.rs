use serde::{Deserialize, Serialize};

use crate::EXTENSION_PACKAGE;

/// Whether a field type names a scalar or a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Scalar,
    Message,
}

/// The schema-side type of a field.
///
/// Override files deserialize straight into this struct, so every flag
/// defaults to `false` and only `name` is required:
///
/// ```json
/// { "name": "google.protobuf.Timestamp", "kind": "message",
///   "origin": "google/protobuf/timestamp.proto", "non_nullable": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    pub name:         String,
    #[serde(default)]
    pub kind:         TypeKind,
    #[serde(default)]
    pub repeated:     bool,
    #[serde(default)]
    pub optional:     bool,
    #[serde(default)]
    pub non_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast_type:    Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin:       Option<String>,
}

impl FieldType {
    pub fn scalar(name: impl Into<String>) -> Self {
        FieldType {
            name:         name.into(),
            kind:         TypeKind::Scalar,
            repeated:     false,
            optional:     false,
            non_nullable: false,
            cast_type:    None,
            origin:       None,
        }
    }

    /// A by-value message reference. Pointers clear `non_nullable` later.
    pub fn message(name: impl Into<String>) -> Self {
        FieldType {
            kind:         TypeKind::Message,
            non_nullable: true,
            ..FieldType::scalar(name)
        }
    }

    pub fn with_cast_type(mut self, cast_type: impl Into<String>) -> Self {
        self.cast_type = Some(cast_type.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn is_message(&self) -> bool {
        self.kind == TypeKind::Message
    }

    /// The last dotted segment of the type name (`google.protobuf.Timestamp` → `Timestamp`).
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Per-field extension options rendered in the `ext` namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extensions {
    /// Original source field name, present when snake-case folding is lossy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customname: Option<String>,
    /// The source field was embedded (anonymous).
    pub embed:      bool,
    /// Extra source annotations that differ from the inferred name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moretags:   Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    pub name:       String,
    pub docs:       String,
    pub tag:        u32,
    pub type_:      FieldType,
    pub extensions: Extensions,
}

impl SchemaField {
    /// Rendered `(ext.key) = value` pairs in their fixed order.
    pub fn options(&self) -> Vec<(String, String)> {
        let mut options = Vec::new();
        let key = |name: &str| format!("({}.{})", EXTENSION_PACKAGE, name);

        if self.extensions.embed {
            options.push((key("embed"), "true".to_string()));
        }
        if let Some(ref customname) = self.extensions.customname {
            options.push((key("customname"), crate::quote(customname)));
        }
        if self.type_.is_message() && self.type_.non_nullable {
            options.push((key("nullable"), "false".to_string()));
        }
        if let Some(ref cast_type) = self.type_.cast_type {
            options.push((key("casttype"), crate::quote(cast_type)));
        }
        if let Some(ref moretags) = self.extensions.moretags {
            options.push((key("moretags"), crate::quote(moretags)));
        }
        options
    }

    /// True when rendering this field needs the extension definitions imported.
    pub fn uses_extensions(&self) -> bool {
        !self.options().is_empty()
    }

    /// `optional Widget ref = 2 [(ext.nullable) = false]`, without the trailing `;`.
    pub fn declaration(&self) -> String {
        let label = if self.type_.repeated {
            "repeated "
        } else if self.type_.optional {
            "optional "
        } else {
            ""
        };
        let mut text = format!("{}{} {} = {}", label, self.type_.name, self.name, self.tag);
        let options = self.options();
        if !options.is_empty() {
            let rendered: Vec<String> = options
                .iter()
                .map(|(key, value)| format!("{} = {}", key, value))
                .collect();
            text.push_str(&format!(" [{}]", rendered.join(", ")));
        }
        text
    }
}
