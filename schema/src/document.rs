use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{error::SchemaError, field::SchemaField};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaMessage {
    pub name:   String,
    pub docs:   String,
    pub fields: Vec<SchemaField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaMethod {
    pub name:     String,
    pub docs:     String,
    pub argument: String,
    pub returns:  String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaService {
    pub name:    String,
    pub docs:    String,
    pub methods: Vec<SchemaMethod>,
}

/// One output `.proto` file under construction.
///
/// Imports and options live in ordered collections so that emitting the
/// same document twice yields the same bytes. Messages and services keep
/// the order in which they were first added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDocument {
    pub file_name: String,
    pub package:   String,
    pub imports:   BTreeSet<String>,
    pub options:   BTreeMap<String, String>,
    pub messages:  Vec<SchemaMessage>,
    pub services:  Vec<SchemaService>,
}

impl SchemaDocument {
    pub fn new(file_name: impl Into<String>, package: impl Into<String>) -> Self {
        SchemaDocument {
            file_name: file_name.into(),
            package:   package.into(),
            imports:   BTreeSet::new(),
            options:   BTreeMap::new(),
            messages:  Vec::new(),
            services:  Vec::new(),
        }
    }

    /// Adds an import unless it names this document itself.
    pub fn add_import(&mut self, path: impl Into<String>) {
        let path = path.into();
        if path != self.file_name {
            self.imports.insert(path);
        }
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.insert(key.into(), value.into());
    }

    pub fn message(&self, name: &str) -> Option<&SchemaMessage> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn service(&self, name: &str) -> Option<&SchemaService> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Appends `message`, or accepts it as a no-op when a message with the
    /// same name and identical fields already exists. A same-name message
    /// with different fields is an error.
    pub fn add_message(&mut self, message: SchemaMessage) -> Result<&SchemaMessage, SchemaError> {
        if let Some(index) = self.messages.iter().position(|m| m.name == message.name) {
            if self.messages[index].fields != message.fields {
                return Err(SchemaError::ConflictingMessage {
                    name:     message.name,
                    document: self.file_name.clone(),
                });
            }
            return Ok(&self.messages[index]);
        }
        self.messages.push(message);
        let last = self.messages.len() - 1;
        Ok(&self.messages[last])
    }

    pub fn add_service(&mut self, service: SchemaService) -> Result<&SchemaService, SchemaError> {
        if self.service(&service.name).is_some() {
            return Err(SchemaError::DuplicateService {
                name:     service.name,
                document: self.file_name.clone(),
            });
        }
        self.services.push(service);
        let last = self.services.len() - 1;
        Ok(&self.services[last])
    }
}
