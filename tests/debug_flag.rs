// Verifies that --debug prints a step-by-step table to stderr while the
// program still runs.
use predicates::prelude::*;

#[test]
fn debug_flag_prints_table() {
    let mut cmd = assert_cmd::Command::cargo_bin("tapebf").expect("failed to locate tapebf binary");

    cmd.args(["--debug", "-e", ">", "2"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(
            predicates::str::contains("STEP | IP")
                .and(predicates::str::contains("Moved pointer head to index 1")),
        );
}

#[test]
fn debug_flag_keeps_program_output_on_stdout() {
    let code = format!("{}.", "+".repeat(65));
    let mut cmd = assert_cmd::Command::cargo_bin("tapebf").expect("failed to locate tapebf binary");

    cmd.args(["-d", "-e", &code])
        .assert()
        .success()
        .stdout("A")
        .stderr(predicates::str::contains("Output value 65"));
}
