//! Instruction dispatch loop.
//!
//! The engine walks the program with an instruction pointer, mutating the
//! [`Tape`] and calling the [`Io`] collaborator. `[` checks the current cell
//! before the body runs; `]` always returns to its `[` so that check runs
//! again on every pass.

use std::io::Write;

use crate::error::InterpreterError;
use crate::io::Io;
use crate::loops::LoopMap;
use crate::tape::Tape;

/// Execute `program` to completion against `tape`.
///
/// `loops` must be the map built from this same `program`.
pub fn run<I>(program: &[u8], tape: &mut Tape, loops: &LoopMap, io: &mut I) -> Result<(), InterpreterError>
where
    I: Io + ?Sized,
{
    execute(program, tape, loops, io, None)
}

/// Like [`run`], but also writes a step-by-step table of operations to `trace`.
///
/// Program I/O still happens as usual. Bytes that are not instructions are
/// skipped without a row.
pub fn run_traced<I>(
    program: &[u8],
    tape: &mut Tape,
    loops: &LoopMap,
    io: &mut I,
    trace: &mut dyn Write,
) -> Result<(), InterpreterError>
where
    I: Io + ?Sized,
{
    execute(program, tape, loops, io, Some(trace))
}

/// Cells shown in the TAPE column of the step trace.
const TRACE_WINDOW: usize = 8;

fn execute<I>(
    program: &[u8],
    tape: &mut Tape,
    loops: &LoopMap,
    io: &mut I,
    mut trace: Option<&mut dyn Write>,
) -> Result<(), InterpreterError>
where
    I: Io + ?Sized,
{
    if let Some(out) = trace.as_deref_mut() {
        let _ = writeln!(
            out,
            "{:<4} | {:<3} | {:<3} | {:<4} | {:<5} | {:<48} | {}",
            "STEP", "IP", "PTR", "CELL", "INSTR", "ACTION", "TAPE"
        );
        let _ = writeln!(out, "-----+-----+-----+------+-------+--------------------------------------------------+----------------");
    }

    let result = step_loop(program, tape, loops, io, trace);
    // Output from before a failure is kept, never rolled back.
    io.flush();
    result
}

fn is_instruction(b: u8) -> bool {
    matches!(b, b'>' | b'<' | b'+' | b'-' | b'.' | b',' | b'[' | b']')
}

fn step_loop<I>(
    program: &[u8],
    tape: &mut Tape,
    loops: &LoopMap,
    io: &mut I,
    mut trace: Option<&mut dyn Write>,
) -> Result<(), InterpreterError>
where
    I: Io + ?Sized,
{
    let mut ip: usize = 0;
    let mut step: usize = 0;

    while ip < program.len() {
        let instr = program[ip];
        // Comment bytes never look at the tape.
        if !is_instruction(instr) {
            ip += 1;
            continue;
        }

        let (ptr_before, cell_before) = (tape.pointer(), tape.read());
        let mut action: Option<String> = trace.as_ref().map(|_| String::new());
        let mut next = ip + 1;

        let outcome = 'op: {
            match instr {
                b'>' => {
                    if let Err(e) = tape.move_right() {
                        break 'op Err(InterpreterError::PointerOutOfBounds { ip, ptr: e.ptr, op: '>' });
                    }
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer head to index {}", tape.pointer()); }
                }
                b'<' => {
                    if let Err(e) = tape.move_left() {
                        break 'op Err(InterpreterError::PointerOutOfBounds { ip, ptr: e.ptr, op: '<' });
                    }
                    if let Some(a) = action.as_mut() { *a = format!("Moved pointer head to index {}", tape.pointer()); }
                }
                b'+' => {
                    tape.increment();
                    if let Some(a) = action.as_mut() { *a = format!("Increment cell[{}] from {} to {}", ptr_before, cell_before, tape.read()); }
                }
                b'-' => {
                    tape.decrement();
                    if let Some(a) = action.as_mut() { *a = format!("Decrement cell[{}] from {} to {}", ptr_before, cell_before, tape.read()); }
                }
                b'.' => {
                    io.output(cell_before);
                    if let Some(a) = action.as_mut() { *a = format!("Output value {}", cell_before); }
                }
                b',' => {
                    let value = match io.input() {
                        Ok(v) => v,
                        Err(source) => break 'op Err(InterpreterError::InputFailure { ip, source }),
                    };
                    tape.write(value);
                    if let Some(a) = action.as_mut() { *a = format!("Read value {} into cell[{}]", value, ptr_before); }
                }
                b'[' => {
                    let close = match partner(program, loops, ip, b']') {
                        Ok(close) => close,
                        Err(e) => break 'op Err(e),
                    };
                    if cell_before == 0 {
                        next = close + 1;
                        if let Some(a) = action.as_mut() { *a = format!("Cell is 0; skip past matching ']' at IP {}", close); }
                    } else if let Some(a) = action.as_mut() {
                        *a = "Enter loop (cell != 0)".to_string();
                    }
                }
                b']' => {
                    let open = match partner(program, loops, ip, b'[') {
                        Ok(open) => open,
                        Err(e) => break 'op Err(e),
                    };
                    next = open;
                    if let Some(a) = action.as_mut() { *a = format!("Jump back to matching '[' at IP {}", open); }
                }
                _ => {}
            }
            Ok(())
        };

        if let Some(out) = trace.as_deref_mut() {
            let action = match &outcome {
                Ok(()) => action.unwrap_or_default(),
                Err(err) => format!("Error: {err}"),
            };
            let (base, window) = tape.window(TRACE_WINDOW);
            let _ = writeln!(
                out,
                "{:<4} | {:<3} | {:<3} | {:<4} | {:^5} | {:<48} | {}: {:?}",
                step,
                ip,
                ptr_before,
                cell_before,
                instr as char,
                action,
                base,
                window
            );
        }
        outcome?;

        step += 1;
        ip = next;
    }

    Ok(())
}

/// Jump target for the bracket at `ip`, which must be the bracket `expected`.
fn partner(program: &[u8], loops: &LoopMap, ip: usize, expected: u8) -> Result<usize, InterpreterError> {
    let target = loops.partner(ip).ok_or(InterpreterError::InternalConsistency {
        ip,
        detail: "loop boundary has no resolved partner",
    })?;
    if program.get(target) != Some(&expected) {
        return Err(InterpreterError::InternalConsistency {
            ip,
            detail: "loop boundary resolved to a non-matching instruction",
        });
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use crate::tape::Cell;
    use std::collections::VecDeque;

    /// Feeds queued values to `,` and records everything `.` emits.
    #[derive(Default)]
    struct ScriptedIo {
        inputs: VecDeque<Cell>,
        outputs: Vec<Cell>,
    }

    impl ScriptedIo {
        fn with_inputs(inputs: &[Cell]) -> Self {
            Self { inputs: inputs.iter().copied().collect(), outputs: Vec::new() }
        }
    }

    impl Io for ScriptedIo {
        fn input(&mut self) -> Result<Cell, InputError> {
            self.inputs.pop_front().ok_or(InputError::Exhausted)
        }

        fn output(&mut self, value: Cell) {
            self.outputs.push(value);
        }
    }

    fn exec(program: &str, tape: &mut Tape, io: &mut ScriptedIo) -> Result<(), InterpreterError> {
        let program = program.as_bytes();
        let loops = LoopMap::build(program);
        run(program, tape, &loops, io)
    }

    #[test]
    fn increments_accumulate() {
        let mut tape = Tape::new(1);
        exec("++++", &mut tape, &mut ScriptedIo::default()).unwrap();
        assert_eq!(tape.cells(), &[4]);
    }

    #[test]
    fn clear_loop_terminates_at_zero() {
        let mut tape = Tape::new(1);
        exec("+[-]", &mut tape, &mut ScriptedIo::default()).unwrap();
        assert_eq!(tape.read(), 0);
    }

    #[test]
    fn clear_loop_on_preloaded_cell() {
        let mut tape = Tape::new(1);
        tape.write(300);
        exec("[-]", &mut tape, &mut ScriptedIo::default()).unwrap();
        assert_eq!(tape.read(), 0);
    }

    #[test]
    fn zero_cell_skips_loop_body() {
        let mut tape = Tape::new(2);
        let mut io = ScriptedIo::default();
        exec("[.>+]+", &mut tape, &mut io).unwrap();
        assert!(io.outputs.is_empty());
        assert_eq!(tape.cells(), &[1, 0]);
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn nested_loops_multiply() {
        // 3 * (2 * 4) via two nested transfer loops.
        let mut tape = Tape::new(3);
        exec("+++[>++[>++++<-]<-]", &mut tape, &mut ScriptedIo::default()).unwrap();
        assert_eq!(tape.cells(), &[0, 0, 24]);
    }

    #[test]
    fn moving_right_off_single_cell_tape_fails() {
        let mut tape = Tape::new(1);
        let err = exec(">", &mut tape, &mut ScriptedIo::default()).unwrap_err();
        assert!(matches!(err, InterpreterError::PointerOutOfBounds { ip: 0, ptr: 0, op: '>' }));
    }

    #[test]
    fn moving_left_of_origin_fails() {
        let mut tape = Tape::new(10);
        let err = exec("+<", &mut tape, &mut ScriptedIo::default()).unwrap_err();
        assert!(matches!(err, InterpreterError::PointerOutOfBounds { ip: 1, op: '<', .. }));
        assert_eq!(tape.read(), 1);
    }

    #[test]
    fn last_cell_is_reachable_but_not_beyond() {
        let len = 4;
        let mut tape = Tape::new(len);
        exec(&">".repeat(len - 1), &mut tape, &mut ScriptedIo::default()).unwrap();
        assert_eq!(tape.pointer(), len - 1);

        let mut tape = Tape::new(len);
        let err = exec(&">".repeat(len), &mut tape, &mut ScriptedIo::default()).unwrap_err();
        assert!(matches!(err, InterpreterError::PointerOutOfBounds { ip: 3, ptr: 3, op: '>' }));
    }

    #[test]
    fn input_is_stored_and_echoed() {
        let mut tape = Tape::new(1);
        let mut io = ScriptedIo::with_inputs(&[64]);
        exec(",+.", &mut tape, &mut io).unwrap();
        assert_eq!(io.outputs, vec![65]);
    }

    #[test]
    fn exhausted_input_aborts_after_earlier_output() {
        let mut tape = Tape::new(1);
        let mut io = ScriptedIo::default();
        let err = exec("+.,+", &mut tape, &mut io).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::InputFailure { ip: 2, source: InputError::Exhausted }
        ));
        assert_eq!(io.outputs, vec![1]);
        assert_eq!(tape.read(), 1);
    }

    #[test]
    fn non_instruction_bytes_are_ignored() {
        let mut tape = Tape::new(1);
        exec("a+ b\n+ // done", &mut tape, &mut ScriptedIo::default()).unwrap();
        assert_eq!(tape.read(), 2);
    }

    #[test]
    fn one_output_per_dot_in_program_order() {
        let mut tape = Tape::new(1);
        let mut io = ScriptedIo::default();
        exec("+.+.+.", &mut tape, &mut io).unwrap();
        assert_eq!(io.outputs, vec![1, 2, 3]);
    }

    #[test]
    fn mismatched_loop_map_is_internal_error() {
        let mut tape = Tape::new(1);
        let loops = LoopMap::build(b"++");
        let err = run(b"[]", &mut tape, &loops, &mut ScriptedIo::default()).unwrap_err();
        assert!(matches!(err, InterpreterError::InternalConsistency { ip: 0, .. }));
    }

    #[test]
    fn loop_map_pointing_at_wrong_byte_is_internal_error() {
        let mut tape = Tape::new(1);
        let loops = LoopMap::build(b"[+]");
        let err = run(b"[]+", &mut tape, &loops, &mut ScriptedIo::default()).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::InternalConsistency { ip: 0, detail } if detail.contains("non-matching")
        ));
    }

    #[test]
    fn trace_lists_each_executed_instruction() {
        let mut tape = Tape::new(2);
        let mut trace: Vec<u8> = Vec::new();
        let program = b"+ >";
        let loops = LoopMap::build(program);
        run_traced(program, &mut tape, &loops, &mut ScriptedIo::default(), &mut trace).unwrap();

        let text = String::from_utf8(trace).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("STEP | IP"));
        assert!(lines[0].ends_with("| TAPE"));
        assert_eq!(lines.len(), 4, "header, rule and one row per instruction: {text}");
        assert!(lines[2].contains("Increment cell[0] from 0 to 1"));
        assert!(lines[2].ends_with("| 0: [1, 0]"));
        assert!(lines[3].contains("Moved pointer head to index 1"));
        assert!(lines[3].ends_with("| 0: [1, 0]"));
    }

    #[test]
    fn trace_window_follows_the_pointer_across_pages() {
        let mut tape = Tape::new(10);
        let mut trace: Vec<u8> = Vec::new();
        let program = format!("{}+", ">".repeat(9));
        let loops = LoopMap::build(program.as_bytes());
        run_traced(program.as_bytes(), &mut tape, &loops, &mut ScriptedIo::default(), &mut trace).unwrap();

        let text = String::from_utf8(trace).unwrap();
        let last = text.lines().last().unwrap();
        assert!(last.contains("Increment cell[9] from 0 to 1"));
        assert!(last.ends_with("| 8: [0, 1]"), "{last}");
    }

    #[test]
    fn trace_includes_the_failing_instruction() {
        let mut tape = Tape::new(1);
        let mut trace: Vec<u8> = Vec::new();
        let program = b"+>";
        let loops = LoopMap::build(program);
        let err = run_traced(program, &mut tape, &loops, &mut ScriptedIo::default(), &mut trace).unwrap_err();
        assert!(matches!(err, InterpreterError::PointerOutOfBounds { ip: 1, .. }));

        let text = String::from_utf8(trace).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4, "{text}");
        assert!(lines[3].starts_with("1    | 1   | 0   | 1    |"));
        assert!(lines[3].contains("Error: Pointer out of bounds at instruction 1"));
    }

    #[test]
    fn trace_includes_failed_input() {
        let mut tape = Tape::new(1);
        let mut trace: Vec<u8> = Vec::new();
        let loops = LoopMap::build(b",");
        let err = run_traced(b",", &mut tape, &loops, &mut ScriptedIo::default(), &mut trace).unwrap_err();
        assert!(matches!(err, InterpreterError::InputFailure { ip: 0, .. }));
        assert!(String::from_utf8(trace).unwrap().contains("Error: Input failure at instruction 0: input exhausted"));
    }

    #[test]
    fn comment_bytes_do_not_touch_an_empty_tape() {
        let mut tape = Tape::new(0);
        let mut trace: Vec<u8> = Vec::new();
        let program = b"no instructions here";
        let loops = LoopMap::build(program);
        run_traced(program, &mut tape, &loops, &mut ScriptedIo::default(), &mut trace).unwrap();
        assert_eq!(String::from_utf8(trace).unwrap().lines().count(), 2);
    }
}
