use std::collections::HashSet;

use crate::{
    document::{SchemaDocument, SchemaMessage, SchemaService},
    error::SchemaError,
    quote,
};

/// Returns `Ok(())` if the document can be emitted, or the first problem found.
///
/// The emitter calls this before rendering, so nothing of an invalid document
/// ever reaches an output sink.
pub fn verify_document(doc: &SchemaDocument) -> Result<(), SchemaError> {
    // 1) Check duplicate type names
    let mut defined: HashSet<&str> = HashSet::new();
    for message in &doc.messages {
        if !defined.insert(&message.name) {
            return Err(SchemaError::VerifierError(format!(
                "The message {} is defined twice",
                quote(&message.name)
            )));
        }
        verify_message(message)?;
    }

    let mut services: HashSet<&str> = HashSet::new();
    for service in &doc.services {
        if !services.insert(&service.name) {
            return Err(SchemaError::VerifierError(format!(
                "The service {} is defined twice",
                quote(&service.name)
            )));
        }
        verify_service(service)?;
    }

    Ok(())
}

fn verify_message(message: &SchemaMessage) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    for (index, field) in message.fields.iter().enumerate() {
        if field.type_.repeated && field.type_.optional {
            return Err(SchemaError::OptionalRepeated {
                message: message.name.clone(),
                field:   field.name.clone(),
            });
        }
        if field.type_.name.is_empty() {
            return Err(SchemaError::VerifierError(format!(
                "The field {} in {} has no type",
                quote(&field.name),
                quote(&message.name)
            )));
        }
        if !names.insert(field.name.as_str()) {
            return Err(SchemaError::VerifierError(format!(
                "The field {} is declared twice in {}",
                quote(&field.name),
                quote(&message.name)
            )));
        }

        // Tags run 1..N in declaration order
        let expected = index as u32 + 1;
        if field.tag != expected {
            return Err(SchemaError::VerifierError(format!(
                "The tag for field {} in {} must be {} but is {}",
                quote(&field.name),
                quote(&message.name),
                expected,
                field.tag
            )));
        }
    }
    Ok(())
}

fn verify_service(service: &SchemaService) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    for method in &service.methods {
        if !names.insert(method.name.as_str()) {
            return Err(SchemaError::VerifierError(format!(
                "The rpc {} is declared twice in service {}",
                quote(&method.name),
                quote(&service.name)
            )));
        }
        if method.argument.is_empty() || method.returns.is_empty() {
            return Err(SchemaError::VerifierError(format!(
                "The rpc {} in service {} needs both an argument and a return type",
                quote(&method.name),
                quote(&service.name)
            )));
        }
    }
    Ok(())
}
