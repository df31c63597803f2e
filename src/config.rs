//! Interpreter settings.
//!
//! Each setting is resolved from, in order: a command-line flag, an
//! environment variable, `$XDG_CONFIG_HOME/tapebf.toml`, the built-in default.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use cross_xdg::BaseDirs;

use crate::error::ConfigError;
use crate::io::{InputMode, OutputEncoding};
use crate::tape::DEFAULT_TAPE_LEN;

pub const ENV_TAPE_LEN: &str = "TAPEBF_TAPE_LEN";
pub const ENV_INPUT: &str = "TAPEBF_INPUT";
pub const ENV_OUTPUT: &str = "TAPEBF_OUTPUT";
pub const ENV_PROMPT: &str = "TAPEBF_PROMPT";

const CONFIG_FILE: &str = "tapebf.toml";
const DEFAULT_PROMPT: &str = "input : ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tape_len: usize,
    pub input_mode: InputMode,
    pub output_encoding: OutputEncoding,
    /// Shown before each `,` read when stdin is a terminal. Empty disables it.
    pub prompt: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tape_len: DEFAULT_TAPE_LEN,
            input_mode: InputMode::default(),
            output_encoding: OutputEncoding::default(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

/// Raw values given on the command line; `None` falls through to the next layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tape_len: Option<String>,
    pub input_mode: Option<String>,
    pub output_encoding: Option<String>,
}

/// Parse a tape length. Zero is rejected: the tape needs at least one cell.
pub fn parse_tape_len(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::TapeLength(value.to_string())),
    }
}

/// Resolve settings from flags, the process environment and the config file.
pub fn load(flags: &Overrides) -> Result<Settings, ConfigError> {
    resolve(flags, |key| env::var(key).ok(), load_from_toml().unwrap_or_default())
}

/// Layer `flags` and `env` over `base`. Invalid flag or env values are errors.
pub fn resolve<E>(flags: &Overrides, env: E, base: Settings) -> Result<Settings, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let mut settings = base;

    if let Some(v) = flags.tape_len.clone().or_else(|| env(ENV_TAPE_LEN)) {
        settings.tape_len = parse_tape_len(&v)?;
    }
    if let Some(v) = flags.input_mode.clone().or_else(|| env(ENV_INPUT)) {
        settings.input_mode = v.parse()?;
    }
    if let Some(v) = flags.output_encoding.clone().or_else(|| env(ENV_OUTPUT)) {
        settings.output_encoding = v.parse()?;
    }
    if let Some(v) = env(ENV_PROMPT) {
        settings.prompt = v;
    }

    Ok(settings)
}

pub fn config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE);
    Some(path)
}

fn load_from_toml() -> Option<Settings> {
    let content = fs::read_to_string(config_path()?).ok()?;
    Some(parse_config(&content))
}

/// Read the `[interpreter]` section of a config file over the defaults.
///
/// Very small hand-rolled parser: `key = value` pairs, values optionally
/// quoted. Unknown keys and unparseable values are skipped.
pub fn parse_config(content: &str) -> Settings {
    let mut in_section = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line[1..line.len() - 1].trim() == "interpreter";
            continue;
        }
        if !in_section { continue; }
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim().to_string();
            let val_raw = line[eq + 1..].trim();
            // Accept quoted or unquoted
            let val = if val_raw.len() >= 2 && val_raw.starts_with('"') && val_raw.ends_with('"') {
                val_raw[1..val_raw.len() - 1].to_string()
            } else { val_raw.to_string() };
            map.insert(key, val);
        }
    }

    let mut cfg = Settings::default();

    macro_rules! set {
        ($field:ident, $key:literal, $parse:expr) => {
            if let Some(v) = map.get($key).and_then(|s| $parse(s.as_str()).ok()) { cfg.$field = v; }
        };
    }

    set!(tape_len, "tape_len", parse_tape_len);
    set!(input_mode, "input", |s: &str| s.parse::<InputMode>());
    set!(output_encoding, "output", |s: &str| s.parse::<OutputEncoding>());
    set!(prompt, "prompt", |s: &str| Ok::<_, ConfigError>(s.to_string()));

    cfg
}
