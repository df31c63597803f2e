//! A bounded-tape Brainfuck interpreter.
//!
//! Programs run on a fixed-length tape of 64-bit cells with a single data
//! pointer.
//!
//! Features and behaviors:
//! - Memory tape initialized to 0, 30,000 cells unless configured otherwise.
//! - Strict pointer bounds: moving left from cell 0 or right past the end
//!   returns an error.
//! - Cell arithmetic wraps modulo 2^64.
//! - Bracket balance is checked before anything executes, then every `[`/`]`
//!   is resolved to its partner once, so loop jumps are table lookups.
//! - Input `,` reads one unsigned decimal number per line by default; running
//!   out of input is an error.
//! - Output `.` writes the current cell as a Unicode code point.
//! - Bytes outside `><+-.,[]` are ignored.
//!
//! Quick start:
//!
//! ```no_run
//! use std::io;
//! use tapebf::{Interpreter, StdIo};
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let mut bf = Interpreter::new(code);
//! let mut io = StdIo::new(io::stdin().lock(), io::stdout());
//! bf.run(&mut io).expect("program should run");
//! ```

pub mod cli_util;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod loops;
pub mod syntax;
pub mod tape;

pub use config::Settings;
pub use error::{ConfigError, InputError, InterpreterError, UnmatchedBracketKind};
pub use io::{InputMode, Io, OutputEncoding, StdIo};
pub use loops::LoopMap;
pub use tape::{Cell, DEFAULT_TAPE_LEN, Tape};

/// A program paired with the tape it runs on.
pub struct Interpreter {
    code: Vec<u8>,
    tape: Tape,
}

impl Interpreter {
    /// Create a new interpreter from Brainfuck `code`.
    ///
    /// The memory tape is initialized to 30,000 zeroed cells.
    pub fn new(code: impl Into<Vec<u8>>) -> Self {
        Self::new_with_tape_len(code, DEFAULT_TAPE_LEN)
    }

    /// Create a new interpreter from Brainfuck `code` but with a custom tape length.
    ///
    /// # Panics
    ///
    /// With a `tape_len` of 0, running any instruction panics. Programs made
    /// only of comment bytes still run.
    pub fn new_with_tape_len(code: impl Into<Vec<u8>>, tape_len: usize) -> Self {
        Self {
            code: code.into(),
            tape: Tape::new(tape_len),
        }
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Validate, resolve loops, then execute until the program ends.
    ///
    /// Returns `Ok(())` on success or the first [`InterpreterError`] hit.
    pub fn run<I: Io + ?Sized>(&mut self, io: &mut I) -> Result<(), InterpreterError> {
        let loops = self.prepare()?;
        engine::run(&self.code, &mut self.tape, &loops, io)
    }

    /// Same as [`Interpreter::run`], writing a step-by-step table to `trace`.
    pub fn run_traced<I: Io + ?Sized>(
        &mut self,
        io: &mut I,
        trace: &mut dyn std::io::Write,
    ) -> Result<(), InterpreterError> {
        let loops = self.prepare()?;
        engine::run_traced(&self.code, &mut self.tape, &loops, io, trace)
    }

    fn prepare(&self) -> Result<LoopMap, InterpreterError> {
        syntax::check(&self.code)?;
        Ok(LoopMap::build(&self.code))
    }
}
