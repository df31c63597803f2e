//! Bracket balance checks, run once before any execution.

use crate::error::{InterpreterError, UnmatchedBracketKind};

/// Returns `true` when every `]` closes an earlier `[` and every `[` is closed.
///
/// Only the nesting depth is tracked; positions are not recorded.
pub fn validate(program: &[u8]) -> bool {
    let mut depth: usize = 0;
    for &b in program {
        match b {
            b'[' => depth += 1,
            b']' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    depth == 0
}

/// Like [`validate`], but reports where the first imbalance is.
///
/// A stray `]` is found on the forward scan. A `[` that is never closed is
/// found by the same counter run backwards from the end of the program.
pub fn check(program: &[u8]) -> Result<(), InterpreterError> {
    let mut depth: usize = 0;
    for (ip, &b) in program.iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                if depth == 0 {
                    return Err(InterpreterError::SyntaxError {
                        ip,
                        kind: UnmatchedBracketKind::Close,
                    });
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    if depth == 0 {
        return Ok(());
    }

    let mut closes: usize = 0;
    for (ip, &b) in program.iter().enumerate().rev() {
        match b {
            b']' => closes += 1,
            b'[' if closes == 0 => {
                return Err(InterpreterError::SyntaxError {
                    ip,
                    kind: UnmatchedBracketKind::Open,
                });
            }
            b'[' => closes -= 1,
            _ => {}
        }
    }

    // Forward depth was nonzero, so the backward scan always finds an open.
    Err(InterpreterError::SyntaxError {
        ip: program.len(),
        kind: UnmatchedBracketKind::Open,
    })
}
