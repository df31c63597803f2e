use std::io::{self, Write};
use crate::InterpreterError;

/// Pretty-print an [`InterpreterError`] with caret positioning.
/// If `program` is `Some("tapebf")`, prefix messages with "tapebf: ...".
pub fn print_interpreter_error(program: Option<&str>, code: &[u8], err: &InterpreterError) {
    let mut stderr = io::stderr().lock();
    let _ = write_interpreter_error(&mut stderr, program, code, err);
    let _ = stderr.flush();
}

/// Render an [`InterpreterError`] the way [`print_interpreter_error`] shows it.
pub fn write_interpreter_error<W: Write>(
    out: &mut W,
    program: Option<&str>,
    code: &[u8],
    err: &InterpreterError,
) -> io::Result<()> {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    let msg = match err {
        InterpreterError::SyntaxError { kind, .. } => {
            prefix_program(&format!("Parse error: unmatched bracket {kind}"))
        }
        InterpreterError::PointerOutOfBounds { ptr, op, .. } => {
            prefix_program(&format!("Runtime error: pointer out of bounds (ptr={ptr}, op={op})"))
        }
        InterpreterError::InputFailure { source, .. } => {
            prefix_program(&format!("Input error: {source}"))
        }
        InterpreterError::InternalConsistency { detail, .. } => {
            prefix_program(&format!("Internal error: {detail}"))
        }
    };
    write_error_with_context(out, &msg, code, err.ip())
}

/// Write a concise error with instruction index and a caret context window.
///
/// Positions are byte offsets; the window is decoded lossily for display.
pub fn write_error_with_context<W: Write>(out: &mut W, prefix: &str, code: &[u8], pos: usize) -> io::Result<()> {
    writeln!(out, "{prefix} at instruction {pos}")?;

    // Show a short window around the position for context
    const WINDOW_BYTES: usize = 32;

    let start = pos.saturating_sub(WINDOW_BYTES).min(code.len());
    let end = (pos + WINDOW_BYTES + 1).min(code.len());

    // Line breaks would push the caret off its column.
    let flatten = |bytes: &[u8]| -> String {
        String::from_utf8_lossy(bytes)
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect()
    };

    writeln!(out, "  {}", flatten(&code[start..end]))?;

    // Caret under the exact position
    let caret_offset = flatten(&code[start..pos.min(code.len())]).chars().count();
    writeln!(out, "  {}^", " ".repeat(caret_offset))
}
