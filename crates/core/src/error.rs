use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown interview phase: {0}")]
    UnknownPhase(String),

    #[error("Unknown agent role: {0}")]
    UnknownRole(String),

    #[error("Unknown message kind: {0}")]
    UnknownMessageKind(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::UnknownPhase("warmup".to_string());
        assert!(error.to_string().contains("warmup"));
    }
}
