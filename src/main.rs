use clap::Parser;
use std::env;
use std::fs;
use std::io::{self, IsTerminal, Write};
use tapebf::cli_util::print_interpreter_error;
use tapebf::config::{self, Overrides};
use tapebf::{Interpreter, Io, StdIo};

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} [OPTIONS] <PROGRAM> [MEMSIZE]        # Run the program stored in file PROGRAM
  {0} [OPTIONS] -e "<code>"... [MEMSIZE]    # Run code given on the command line

Arguments:
  PROGRAM   Path to a Brainfuck source file
  MEMSIZE   Number of tape cells (default 30000)

Options:
  --exec,  -e <CODE>         Run CODE instead of a file (repeatable; parts are concatenated)
  --debug, -d                Print a step-by-step table of operations to stderr
  --input  <decimal|byte>    How `,` reads input (default decimal)
  --output <unicode|byte>    How `.` writes a cell (default unicode)
  --help,  -h                Show this help

Notes:
- Input (`,`) reads one unsigned number per line; running out of input is an error.
- Output (`.`) writes the cell as a Unicode code point; invalid values print U+FFFD.
- Characters outside of Brainfuck's ><+-.,[] are ignored.
- Defaults can be set with TAPEBF_TAPE_LEN, TAPEBF_INPUT, TAPEBF_OUTPUT, TAPEBF_PROMPT
  or in the [interpreter] section of $XDG_CONFIG_HOME/tapebf.toml.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "tapebf", disable_help_flag = true)]
struct Cli {
    /// Run CODE instead of reading a program file
    #[arg(short = 'e', long = "exec", value_name = "CODE", action = clap::ArgAction::Append, allow_hyphen_values = true)]
    exec: Vec<String>,

    /// Print a step-by-step table of operations to stderr
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// How `,` reads input: decimal or byte
    #[arg(long = "input", value_name = "MODE")]
    input: Option<String>,

    /// How `.` writes a cell: unicode or byte
    #[arg(long = "output", value_name = "ENCODING")]
    output: Option<String>,

    /// PROGRAM path followed by an optional MEMSIZE
    #[arg(value_name = "ARGS")]
    args: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,
}

enum Source {
    File(String),
    Inline(String),
}

/// Split positionals into the program source and an optional MEMSIZE.
fn split_args(exec: Vec<String>, mut args: Vec<String>) -> Result<(Source, Option<String>), String> {
    if !exec.is_empty() {
        if args.len() > 1 {
            return Err("cannot use a program file together with --exec".to_string());
        }
        return Ok((Source::Inline(exec.join("")), args.pop()));
    }

    match args.len() {
        0 => Err("missing PROGRAM".to_string()),
        1 | 2 => {
            let memsize = if args.len() == 2 { args.pop() } else { None };
            let path = args.remove(0);
            Ok((Source::File(path), memsize))
        }
        _ => Err("too many arguments".to_string()),
    }
}

fn run(program: &str, cli: Cli) -> i32 {
    let Cli {
        exec,
        debug,
        input,
        output,
        args,
        ..
    } = cli;

    let (source, memsize) = match split_args(exec, args) {
        Ok(parts) => parts,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            usage_and_exit(program, 2);
        }
    };

    let overrides = Overrides {
        tape_len: memsize,
        input_mode: input,
        output_encoding: output,
    };
    let settings = match config::load(&overrides) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: {e}");
            usage_and_exit(program, 2);
        }
    };

    let code = match source {
        Source::Inline(code) => code.into_bytes(),
        Source::File(path) => match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("{program}: failed to read program file '{path}': {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        },
    };

    // Install SIGINT (ctrl+c) handler so output already produced is not lost
    // while blocked on input.
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(130);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdio = StdIo::new(stdin.lock(), io::stdout())
        .with_input_mode(settings.input_mode)
        .with_output_encoding(settings.output_encoding);
    // Prompts only make sense for a person typing.
    if interactive && !settings.prompt.is_empty() {
        stdio = stdio.with_prompt(settings.prompt.clone(), io::stderr());
    }

    let mut bf = Interpreter::new_with_tape_len(code, settings.tape_len);
    let result = if debug {
        let mut trace = io::stderr();
        bf.run_traced(&mut stdio, &mut trace)
    } else {
        bf.run(&mut stdio)
    };
    stdio.flush();

    match result {
        Ok(()) => 0,
        Err(err) => {
            print_interpreter_error(Some(program), bf.code(), &err);
            1
        }
    }
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("tapebf"));

    let cli = Cli::parse();

    if cli.help {
        usage_and_exit(&program, 0);
    }

    let code = run(&program, cli);
    std::process::exit(code);
}
