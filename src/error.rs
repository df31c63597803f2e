use std::fmt;

/// Errors that can end a run, from validation through execution.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// Loops were not balanced; a matching `[` or `]` was not found.
    #[error("Unmatched bracket {kind} at instruction {ip}")]
    SyntaxError { ip: usize, kind: UnmatchedBracketKind },

    /// The data pointer attempted to move left of cell 0 or beyond the last cell.
    #[error("Pointer out of bounds at instruction {ip} (ptr={ptr}, op='{op}')")]
    PointerOutOfBounds { ip: usize, ptr: usize, op: char },

    /// A `,` could not produce a value.
    #[error("Input failure at instruction {ip}: {source}")]
    InputFailure {
        ip: usize,
        #[source]
        source: InputError,
    },

    /// A loop boundary had no resolved partner at run time.
    #[error("Internal consistency error at instruction {ip}: {detail}")]
    InternalConsistency { ip: usize, detail: &'static str },
}

impl InterpreterError {
    /// Instruction index the error refers to.
    pub fn ip(&self) -> usize {
        match self {
            InterpreterError::SyntaxError { ip, .. }
            | InterpreterError::PointerOutOfBounds { ip, .. }
            | InterpreterError::InputFailure { ip, .. }
            | InterpreterError::InternalConsistency { ip, .. } => *ip,
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Why a single input read failed.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input exhausted")]
    Exhausted,

    #[error("expected an unsigned integer, got '{token}'")]
    Malformed { token: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid value for one of the interpreter settings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid tape length '{0}': expected a positive integer")]
    TapeLength(String),

    #[error("unknown input mode '{0}' (expected 'decimal' or 'byte')")]
    InputMode(String),

    #[error("unknown output encoding '{0}' (expected 'unicode' or 'byte')")]
    OutputEncoding(String),
}
