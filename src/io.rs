//! The interpreter's only contact with the outside world: `,` and `.`.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::error::{ConfigError, InputError};
use crate::tape::Cell;

/// Input and output collaborator driven by the engine.
pub trait Io {
    /// Blocking read of one value for `,`.
    fn input(&mut self) -> Result<Cell, InputError>;

    /// Emit one character for `.`. Stream errors are the adapter's concern.
    fn output(&mut self, value: Cell);

    /// Push any buffered output out. Called when a run ends.
    fn flush(&mut self) {}
}

/// How `,` turns input text into a cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// One unsigned decimal number per line; the rest of the line is dropped.
    #[default]
    Decimal,
    /// One raw byte.
    Byte,
}

impl FromStr for InputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "decimal" | "number" => Ok(InputMode::Decimal),
            "byte" | "raw" => Ok(InputMode::Byte),
            _ => Err(ConfigError::InputMode(s.to_string())),
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Decimal => write!(f, "decimal"),
            InputMode::Byte => write!(f, "byte"),
        }
    }
}

/// How `.` renders a cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    /// UTF-8 of the value as a Unicode scalar; anything else becomes U+FFFD.
    #[default]
    Unicode,
    /// The low 8 bits, written as one raw byte.
    Byte,
}

impl FromStr for OutputEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unicode" | "utf8" | "utf-8" => Ok(OutputEncoding::Unicode),
            "byte" | "raw" => Ok(OutputEncoding::Byte),
            _ => Err(ConfigError::OutputEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputEncoding::Unicode => write!(f, "unicode"),
            OutputEncoding::Byte => write!(f, "byte"),
        }
    }
}

/// Interpret a cell value as a Unicode scalar value.
pub fn cell_to_char(value: Cell) -> char {
    u32::try_from(value)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Stream-backed adapter: reads from any `BufRead`, writes to any `Write`.
pub struct StdIo<R, W> {
    reader: R,
    writer: W,
    input_mode: InputMode,
    output_encoding: OutputEncoding,
    // (prompt text, where to show it)
    prompt: Option<(String, Box<dyn Write>)>,
}

impl<R: BufRead, W: Write> StdIo<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            input_mode: InputMode::default(),
            output_encoding: OutputEncoding::default(),
            prompt: None,
        }
    }

    pub fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = mode;
        self
    }

    pub fn with_output_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.output_encoding = encoding;
        self
    }

    /// Show `text` on `sink` before every read.
    pub fn with_prompt<P>(mut self, text: impl Into<String>, sink: P) -> Self
    where
        P: Write + 'static,
    {
        self.prompt = Some((text.into(), Box::new(sink)));
        self
    }

    pub fn into_writer(mut self) -> W {
        let _ = self.writer.flush();
        self.writer
    }

    fn show_prompt(&mut self) {
        if let Some((text, sink)) = self.prompt.as_mut() {
            let _ = sink.write_all(text.as_bytes());
            let _ = sink.flush();
        }
    }

    fn read_decimal(&mut self) -> Result<Cell, InputError> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(InputError::Exhausted);
            }
            // Blank lines are skipped; only the first token of a line counts.
            let Some(token) = line.split_whitespace().next() else {
                continue;
            };
            return token.parse::<Cell>().map_err(|_| InputError::Malformed {
                token: token.to_string(),
            });
        }
    }

    fn read_byte(&mut self) -> Result<Cell, InputError> {
        let mut buf = [0u8; 1];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => Ok(Cell::from(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(InputError::Exhausted),
            Err(e) => Err(InputError::Io(e)),
        }
    }
}

impl<R: BufRead, W: Write> Io for StdIo<R, W> {
    fn input(&mut self) -> Result<Cell, InputError> {
        // Anything printed so far must be visible before blocking.
        let _ = self.writer.flush();
        self.show_prompt();
        match self.input_mode {
            InputMode::Decimal => self.read_decimal(),
            InputMode::Byte => self.read_byte(),
        }
    }

    fn output(&mut self, value: Cell) {
        let _ = match self.output_encoding {
            OutputEncoding::Unicode => {
                let mut buf = [0u8; 4];
                let s = cell_to_char(value).encode_utf8(&mut buf);
                self.writer.write_all(s.as_bytes())
            }
            OutputEncoding::Byte => self.writer.write_all(&[value as u8]),
        };
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}
