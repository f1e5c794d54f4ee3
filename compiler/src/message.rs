use brine_protogen_schema::{
    Extensions, SchemaDocument, SchemaError, SchemaField, SchemaMessage, EXTENSIONS_IMPORT,
};
use tracing::{debug, warn};

use crate::{
    error::ProtogenError,
    mapping::TypeMapper,
    naming::{to_go_name, to_snake_case},
    types::{is_exported, FieldDecl, FieldMetadata},
};

/// Translates one record into a message and registers it in `doc`.
///
/// Fields are tagged 1..N in declaration order; unexported fields are not
/// eligible and take no tag. Registering a message whose name already exists
/// succeeds only if the existing fields are identical.
pub fn build_message<'d>(
    doc: &'d mut SchemaDocument,
    mapper: &TypeMapper,
    name: &str,
    docs: &str,
    fields: &[FieldDecl],
) -> Result<&'d SchemaMessage, ProtogenError> {
    let mut schema_fields = Vec::with_capacity(fields.len());

    for field in fields {
        let (source_name, embedded) = match (&field.name, field.type_.base_name()) {
            (Some(field_name), _) => (field_name.as_str(), false),
            (None, Some(type_name)) => (type_name, true),
            (None, None) => {
                warn!(record = name, line = field.line, "skipping embedded field without a type name");
                continue;
            }
        };
        if !is_exported(source_name) {
            debug!(record = name, field = source_name, "skipping unexported field");
            continue;
        }

        let field_name = to_snake_case(source_name);
        let type_ = mapper.resolve(&field.type_);
        if type_.repeated && type_.optional {
            return Err(ProtogenError::schema(
                name,
                SchemaError::OptionalRepeated {
                    message: name.to_string(),
                    field:   field_name,
                },
            ));
        }

        let customname = if to_go_name(&field_name) != source_name {
            Some(source_name.to_string())
        } else {
            None
        };
        let extensions = Extensions {
            customname,
            embed: embedded,
            moretags: more_tags(&field.metadata, &field_name),
        };

        schema_fields.push(SchemaField {
            name: field_name,
            docs: field.docs.clone(),
            tag: schema_fields.len() as u32 + 1,
            type_,
            extensions,
        });
    }

    let mut imports: Vec<String> = schema_fields
        .iter()
        .filter_map(|f| f.type_.origin.clone())
        .collect();
    if schema_fields.iter().any(SchemaField::uses_extensions) {
        imports.push(EXTENSIONS_IMPORT.to_string());
    }

    let message = SchemaMessage {
        name:   name.to_string(),
        docs:   docs.to_string(),
        fields: schema_fields,
    };
    // Imports are only added once the message is known not to conflict
    if let Some(existing) = doc.message(name) {
        debug!(record = name, document = %doc.file_name, "message already registered");
        if existing.fields != message.fields {
            return Err(ProtogenError::schema(
                name,
                SchemaError::ConflictingMessage {
                    name:     name.to_string(),
                    document: doc.file_name.clone(),
                },
            ));
        }
    }
    for import in imports {
        doc.add_import(import);
    }
    doc.add_message(message).map_err(|e| ProtogenError::schema(name, e))
}

/// Struct tag entries whose name differs from the schema field name, as one
/// `key:"value"` string. `None` when every entry matches.
fn more_tags(metadata: &FieldMetadata, field_name: &str) -> Option<String> {
    let differing: Vec<String> = metadata
        .entries
        .iter()
        .filter(|(_, value)| value.split(',').next().unwrap_or("") != field_name)
        .map(|(key, value)| format!("{}:\"{}\"", key, value))
        .collect();
    if differing.is_empty() {
        None
    } else {
        Some(differing.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mapping::TypeOverrides,
        types::{DeclarationKind, SourceDeclaration, TypeExpr},
    };

    fn field(name: Option<&str>, type_: TypeExpr) -> FieldDecl {
        FieldDecl::new(name.map(str::to_string), type_)
    }

    fn widget_module() -> Vec<SourceDeclaration> {
        vec![SourceDeclaration {
            name:   "Widget".to_string(),
            docs:   String::new(),
            file:   "shop.go".to_string(),
            line:   1,
            column: 1,
            kind:   DeclarationKind::Record(Vec::new()),
        }]
    }

    #[test]
    fn tags_follow_declaration_order_including_embedded() {
        let decls = widget_module();
        let overrides = TypeOverrides::new();
        let mapper = TypeMapper::new("shop", &decls, &overrides);
        let mut doc = SchemaDocument::new("shop.proto", "shop");

        let fields = vec![
            field(Some("Name"), TypeExpr::local("string")),
            field(None, TypeExpr::local("Widget")),
            field(Some("internal"), TypeExpr::local("string")),
            field(Some("Count"), TypeExpr::local("int64")),
        ];
        let message = build_message(&mut doc, &mapper, "Order", "", &fields).unwrap();

        let summary: Vec<(&str, u32, bool)> = message
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.tag, f.extensions.embed))
            .collect();
        assert_eq!(
            summary,
            vec![("name", 1, false), ("widget", 2, true), ("count", 3, false)]
        );
        assert!(doc.imports.contains(EXTENSIONS_IMPORT));
    }

    #[test]
    fn customname_only_when_round_trip_fails() {
        let decls = widget_module();
        let overrides = TypeOverrides::new();
        let mapper = TypeMapper::new("shop", &decls, &overrides);
        let mut doc = SchemaDocument::new("shop.proto", "shop");

        let fields = vec![
            field(Some("UserID"), TypeExpr::local("string")),
            field(Some("XMLHttp"), TypeExpr::local("string")),
        ];
        let message = build_message(&mut doc, &mapper, "Session", "", &fields).unwrap();

        assert_eq!(message.fields[0].name, "user_id");
        assert_eq!(message.fields[0].extensions.customname, None);
        assert_eq!(message.fields[1].name, "xml_http");
        assert_eq!(message.fields[1].extensions.customname.as_deref(), Some("XMLHttp"));
    }

    #[test]
    fn more_tags_only_for_differing_names() {
        let decls = widget_module();
        let overrides = TypeOverrides::new();
        let mapper = TypeMapper::new("shop", &decls, &overrides);
        let mut doc = SchemaDocument::new("shop.proto", "shop");

        let mut same = field(Some("UserName"), TypeExpr::local("string"));
        same.metadata.entries.push(("json".to_string(), "user_name,omitempty".to_string()));
        let mut different = field(Some("Email"), TypeExpr::local("string"));
        different.metadata.entries.push(("json".to_string(), "email".to_string()));
        different.metadata.entries.push(("db".to_string(), "email_address".to_string()));

        let message = build_message(&mut doc, &mapper, "User", "", &[same, different]).unwrap();
        assert_eq!(message.fields[0].extensions.moretags, None);
        assert_eq!(
            message.fields[1].extensions.moretags.as_deref(),
            Some("db:\"email_address\"")
        );
    }

    #[test]
    fn plain_message_needs_no_extension_import() {
        let decls = widget_module();
        let overrides = TypeOverrides::new();
        let mapper = TypeMapper::new("shop", &decls, &overrides);
        let mut doc = SchemaDocument::new("shop.proto", "shop");

        let fields = vec![
            field(Some("Name"), TypeExpr::local("string")),
            field(Some("Ref"), TypeExpr::Pointer(Box::new(TypeExpr::local("Widget")))),
        ];
        let message = build_message(&mut doc, &mapper, "X", "", &fields).unwrap();
        assert!(message.fields[1].type_.optional);
        assert!(doc.imports.is_empty());
    }

    #[test]
    fn optional_repeated_override_is_fatal() {
        let decls = widget_module();
        let mut overrides = TypeOverrides::new();
        let mut bad = brine_protogen_schema::FieldType::message("Tags");
        bad.repeated = true;
        bad.optional = true;
        overrides.insert("labels.Set", bad);
        let mapper = TypeMapper::new("shop", &decls, &overrides);
        let mut doc = SchemaDocument::new("shop.proto", "shop");

        let fields = vec![field(Some("Labels"), TypeExpr::qualified("labels", "Set"))];
        let err = build_message(&mut doc, &mapper, "Item", "", &fields).unwrap_err();
        assert!(matches!(
            err,
            ProtogenError::Schema { source: SchemaError::OptionalRepeated { .. }, .. }
        ));
        assert!(doc.messages.is_empty());
    }

    #[test]
    fn same_shape_twice_is_a_no_op_and_different_shape_conflicts() {
        let decls = widget_module();
        let overrides = TypeOverrides::new();
        let mapper = TypeMapper::new("shop", &decls, &overrides);
        let mut doc = SchemaDocument::new("shop.proto", "shop");

        let fields = vec![field(Some("Name"), TypeExpr::local("string"))];
        build_message(&mut doc, &mapper, "Tag", "", &fields).unwrap();
        build_message(&mut doc, &mapper, "Tag", "", &fields).unwrap();
        assert_eq!(doc.messages.len(), 1);

        let other = vec![field(Some("Name"), TypeExpr::local("int64"))];
        let err = build_message(&mut doc, &mapper, "Tag", "", &other).unwrap_err();
        assert!(matches!(
            err,
            ProtogenError::Schema { source: SchemaError::ConflictingMessage { .. }, .. }
        ));
    }
}
