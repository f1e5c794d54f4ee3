use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("message \"{name}\" is declared twice in {document} with different fields")]
    ConflictingMessage {
        name:     String,
        document: String,
    },

    #[error("service \"{name}\" is declared twice in {document}")]
    DuplicateService {
        name:     String,
        document: String,
    },

    #[error("field \"{field}\" of message \"{message}\" is both optional and repeated")]
    OptionalRepeated {
        message: String,
        field:   String,
    },

    #[error("Verifier error: {0}")]
    VerifierError(String),
}
