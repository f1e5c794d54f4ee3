use brine_protogen_schema::{SchemaDocument, SchemaMethod, SchemaService};
use tracing::warn;

use crate::{
    error::ProtogenError,
    mapping::TypeMapper,
    message::build_message,
    naming::{exported_name, pluralize, to_snake_case},
    types::{FieldDecl, MethodDecl, Param, TypeExpr},
};

/// Trailing contract-name suffixes dropped from the service name.
pub const SERVICE_SUFFIXES: [&str; 2] = ["Service", "Server"];

const ARGUMENT_SUFFIX: &str = "Op";
const RETURN_SUFFIX: &str = "Result";

/// `UserService` → `User`. A name that is only a suffix is kept whole.
pub fn service_stem(name: &str) -> &str {
    SERVICE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix).filter(|stem| !stem.is_empty()))
        .unwrap_or(name)
}

/// Translates one contract into a service and registers it in `doc`,
/// synthesizing wrapper messages for arguments and returns as needed.
pub fn build_service<'d>(
    doc: &'d mut SchemaDocument,
    mapper: &TypeMapper,
    name: &str,
    docs: &str,
    methods: &[MethodDecl],
) -> Result<&'d SchemaService, ProtogenError> {
    let stem = service_stem(name);
    let mut schema_methods = Vec::with_capacity(methods.len());

    for method in methods {
        let Some(method_name) = method.name.as_deref() else {
            warn!(
                service = name,
                embedded = %method.embedded.as_ref().map(ToString::to_string).unwrap_or_default(),
                line = method.line,
                "skipping embedded contract; it has no RPC equivalent"
            );
            continue;
        };

        let mut params: &[Param] = &method.params;
        if let Some((first, rest)) = params.split_first() {
            if first.type_.is_named(Some("context"), "Context") {
                params = rest;
            }
        }
        let mut results: &[Param] = &method.results;
        if let Some((last, rest)) = results.split_last() {
            if last.type_.is_named(None, "error") {
                results = rest;
            }
        }

        let argument = single_message_type(doc, mapper, stem, method_name, params, ARGUMENT_SUFFIX)?;
        let returns = single_message_type(doc, mapper, stem, method_name, results, RETURN_SUFFIX)?;

        schema_methods.push(SchemaMethod {
            name: method_name.to_string(),
            docs: method.docs.clone(),
            argument,
            returns,
        });
    }

    let service = SchemaService {
        name:    stem.to_string(),
        docs:    docs.to_string(),
        methods: schema_methods,
    };
    doc.add_service(service).map_err(|e| ProtogenError::schema(name, e))
}

/// Reduces a parameter or result list to the name of exactly one message.
fn single_message_type(
    doc: &mut SchemaDocument,
    mapper: &TypeMapper,
    stem: &str,
    method: &str,
    members: &[Param],
    suffix: &str,
) -> Result<String, ProtogenError> {
    if let [only] = members {
        let field_type = mapper.resolve(&only.type_);
        if field_type.is_message() && !field_type.repeated {
            if let Some(origin) = &field_type.origin {
                doc.add_import(origin.clone());
            }
            return Ok(field_type.name);
        }
        if field_type.is_message() {
            let element = field_type.short_name();
            let list_name = format!("{}List", element);
            let field_name = exported_name(&pluralize(&to_snake_case(element)));
            let fields = [FieldDecl::new(Some(field_name), elements_by_value(&only.type_))];
            build_message(doc, mapper, &list_name, "", &fields)?;
            return Ok(list_name);
        }
    }

    let wrapper_name = format!("{}{}{}", stem, method, suffix);
    let mut used: Vec<String> = Vec::with_capacity(members.len());
    let mut fields = Vec::with_capacity(members.len());
    for member in members {
        let base = member
            .name
            .as_deref()
            .or_else(|| member.type_.base_name())
            .map(exported_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Value".to_string());

        let mut field_name = base.clone();
        let mut counter = 2;
        while used.contains(&field_name) {
            field_name = format!("{}{}", base, counter);
            counter += 1;
        }
        used.push(field_name.clone());
        fields.push(FieldDecl::new(Some(field_name), member.type_.clone()));
    }

    build_message(doc, mapper, &wrapper_name, "", &fields)?;
    Ok(wrapper_name)
}

/// `[]*T`, `*[]T` and `[N]T` all wrap as `[]T`, so every list of one
/// element type shares a single `<T>List` shape.
fn elements_by_value(expr: &TypeExpr) -> TypeExpr {
    match expr {
        TypeExpr::Pointer(inner) => elements_by_value(inner),
        TypeExpr::Slice(elem) | TypeExpr::Array { elem, .. } => match elem.as_ref() {
            TypeExpr::Pointer(target) => TypeExpr::Slice(target.clone()),
            _ => TypeExpr::Slice(elem.clone()),
        },
        other => other.clone(),
    }
}
