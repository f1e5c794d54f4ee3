use crate::error::ProtogenError;

pub use brine_protogen_schema::quote;

pub fn error(file: &str, msg: &str, line: usize, column: usize) -> ProtogenError {
    ProtogenError::ParseError {
        file:   file.to_string(),
        msg:    msg.to_string(),
        line,
        column,
    }
}
