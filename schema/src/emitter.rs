use crate::{
    document::{SchemaDocument, SchemaMessage, SchemaService},
    error::SchemaError,
    verifier::verify_document,
    SYNTAX,
};

/// Documentation is wrapped so that no comment line exceeds this column.
pub const WRAP_COLUMN: usize = 80;

const INDENT: &str = "  ";

/// Verifies `doc` and renders it as `.proto` text.
pub fn emit(doc: &SchemaDocument) -> Result<String, SchemaError> {
    verify_document(doc)?;
    Ok(render(doc))
}

fn render(doc: &SchemaDocument) -> String {
    let mut output = String::new();

    output.push_str(&format!("syntax = \"{}\";\n", SYNTAX));
    output.push_str(&format!("package {};\n", doc.package));

    if !doc.imports.is_empty() {
        output.push('\n');
        for import in &doc.imports {
            output.push_str(&format!("import \"{}\";\n", import));
        }
    }

    if !doc.options.is_empty() {
        output.push('\n');
        for (key, value) in &doc.options {
            output.push_str(&format!("option {} = {};\n", key, option_value(value)));
        }
    }

    for message in &doc.messages {
        output.push('\n');
        output.push_str(&render_message(message));
    }

    for service in &doc.services {
        output.push('\n');
        output.push_str(&render_service(service));
    }

    output
}

fn render_message(message: &SchemaMessage) -> String {
    let mut output = comment_lines(&message.docs, 0);
    if message.fields.is_empty() {
        output.push_str(&format!("message {} {{}}\n", message.name));
        return output;
    }
    output.push_str(&format!("message {} {{\n", message.name));
    let members: Vec<(&str, String)> = message
        .fields
        .iter()
        .map(|f| (f.docs.as_str(), format!("{};", f.declaration())))
        .collect();
    output.push_str(&render_members(&members));
    output.push_str("}\n");
    output
}

fn render_service(service: &SchemaService) -> String {
    let mut output = comment_lines(&service.docs, 0);
    if service.methods.is_empty() {
        output.push_str(&format!("service {} {{}}\n", service.name));
        return output;
    }
    output.push_str(&format!("service {} {{\n", service.name));
    let members: Vec<(&str, String)> = service
        .methods
        .iter()
        .map(|m| {
            (
                m.docs.as_str(),
                format!("rpc {}({}) returns ({});", m.name, m.argument, m.returns),
            )
        })
        .collect();
    output.push_str(&render_members(&members));
    output.push_str("}\n");
    output
}

/// Renders `(docs, line)` pairs one level deep. A blank line separates two
/// neighbours only when at least one of them carries documentation.
fn render_members(members: &[(&str, String)]) -> String {
    let mut output = String::new();
    for (index, (docs, line)) in members.iter().enumerate() {
        if index > 0 {
            let previous_docs = members[index - 1].0;
            if !previous_docs.trim().is_empty() || !docs.trim().is_empty() {
                output.push('\n');
            }
        }
        output.push_str(&comment_lines(docs, 1));
        output.push_str(&format!("{}{}\n", INDENT, line));
    }
    output
}

/// Turns free-form documentation into `//` lines wrapped at [`WRAP_COLUMN`].
/// Blank lines in the source text become empty `//` lines.
fn comment_lines(docs: &str, depth: usize) -> String {
    let text = docs.trim();
    if text.is_empty() {
        return String::new();
    }

    let indent = INDENT.repeat(depth);
    let width = WRAP_COLUMN.saturating_sub(indent.len() + 3).max(20);
    let mut output = String::new();

    for paragraph in text.lines() {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            output.push_str(&format!("{}//\n", indent));
            continue;
        }
        for line in wrap_words(&words, width) {
            output.push_str(&format!("{}// {}\n", indent, line));
        }
    }
    output
}

fn wrap_words(words: &[&str], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in words {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Booleans, numbers and upper-case identifiers (enum values such as `SPEED`)
/// are emitted bare. Anything else, dotted names included, is quoted.
fn option_value(value: &str) -> String {
    let bare = value == "true"
        || value == "false"
        || value.parse::<f64>().is_ok()
        || (value.chars().next().is_some_and(|c| c.is_ascii_uppercase())
            && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    if bare {
        value.to_string()
    } else {
        crate::quote(value)
    }
}
