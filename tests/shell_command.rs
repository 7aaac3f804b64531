// tests/shell_command.rs

#![cfg(unix)]

use std::error::Error;
use std::time::Duration;

use serde_json::json;

use cmdpipe::{Command, CommandError, ParallelCommand, PipeCommand, SequentialCommand, ShellCommand};
use cmdpipe_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn echo_output_is_captured() -> TestResult {
    init_tracing();

    let mut cmd = ShellCommand::new("echo", ["hello"]);
    let result = cmd.run(None)?;

    assert!(result.succeeded);
    assert_eq!(result.output, Some(json!("hello\n")));
    let meta = result.metadata.ok_or("metadata missing")?;
    assert_eq!(meta["exit_code"], json!(0));
    assert_eq!(meta["stdout"], json!("hello\n"));
    Ok(())
}

#[test]
fn string_input_is_fed_to_stdin() -> TestResult {
    init_tracing();

    let mut cmd = ShellCommand::new("cat", Vec::<String>::new());
    let result = cmd.run(Some(json!("piped text")))?;

    assert_eq!(result.output, Some(json!("piped text")));
    Ok(())
}

#[test]
fn non_capturing_command_has_no_output() -> TestResult {
    init_tracing();

    let mut cmd = ShellCommand::new("echo", ["quiet"]).capture_output(false);
    let result = cmd.run(None)?;

    assert!(result.succeeded);
    assert!(result.output.is_none());
    Ok(())
}

#[test]
fn non_zero_exit_raises_with_check() -> TestResult {
    init_tracing();

    let mut cmd = ShellCommand::script("echo oops >&2; exit 3");
    let result = cmd.run(None)?;

    assert!(!result.succeeded);
    assert!(result.output.is_none());
    match result.error {
        Some(CommandError::NonZeroExit { code, ref stderr }) => {
            assert_eq!(code, 3);
            assert_eq!(stderr, "oops");
        }
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
    Ok(())
}

#[test]
fn non_zero_exit_is_reported_without_check() -> TestResult {
    init_tracing();

    let mut cmd = ShellCommand::script("printf partial; exit 2").check(false);
    let result = cmd.run(None)?;

    assert!(result.succeeded);
    assert_eq!(result.output, Some(json!("partial")));
    let meta = result.metadata.ok_or("metadata missing")?;
    assert_eq!(meta["exit_code"], json!(2));
    Ok(())
}

#[test]
fn missing_program_sets_not_found_flag() -> TestResult {
    init_tracing();

    let mut cmd = ShellCommand::new("cmdpipe-definitely-not-a-program", Vec::<String>::new());
    let result = cmd.run(None)?;

    assert!(!result.succeeded);
    assert!(matches!(result.error, Some(CommandError::CommandNotFound(_))));
    assert!(cmd.failed_with_command_not_found());
    assert!(!cmd.failed_with_timeout());
    Ok(())
}

#[test]
fn missing_program_raises_when_strict() {
    init_tracing();

    let mut cmd =
        ShellCommand::new("cmdpipe-definitely-not-a-program", Vec::<String>::new()).with_raise_error(true);

    assert!(matches!(cmd.run(None), Err(CommandError::CommandNotFound(_))));
    assert!(cmd.result().is_some_and(|r| !r.succeeded));
}

#[test]
fn timeout_kills_and_sets_flag() -> TestResult {
    init_tracing();

    let mut cmd = ShellCommand::new("sleep", ["5"]).timeout(Duration::from_millis(200));
    let result = cmd.run(None)?;

    assert!(!result.succeeded);
    assert!(matches!(result.error, Some(CommandError::Timeout { .. })));
    assert!(cmd.failed_with_timeout());
    assert!(!cmd.failed_with_command_not_found());
    Ok(())
}

#[test]
fn flags_reset_on_the_next_run() -> TestResult {
    init_tracing();

    // Sleeps for as many seconds as it reads from stdin.
    let mut cmd = ShellCommand::script("exec sleep \"$(cat)\"").timeout(Duration::from_millis(300));

    cmd.run(Some(json!("5")))?;
    assert!(cmd.failed_with_timeout());

    let result = cmd.run(Some(json!("0")))?;
    assert!(result.succeeded);
    assert!(!cmd.failed_with_timeout());
    Ok(())
}

#[test]
fn env_and_cwd_are_applied() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let mut cmd = ShellCommand::script("printf '%s:' \"$CMDPIPE_TEST_VAR\"; pwd")
        .env("CMDPIPE_TEST_VAR", "value")
        .cwd(dir.path());
    let result = cmd.run(None)?;

    let out = result.output_str().ok_or("no output")?.to_string();
    assert!(out.starts_with("value:"), "unexpected output {out}");
    let expected = dir.path().canonicalize()?;
    let reported = std::path::PathBuf::from(out.trim_start_matches("value:").trim_end());
    assert_eq!(reported.canonicalize()?, expected);
    Ok(())
}

#[test]
fn shell_commands_compose_in_a_pipe() -> TestResult {
    init_tracing();

    let mut pipe = PipeCommand::new(vec![
        ShellCommand::new("echo", ["hello world"]).boxed(),
        ShellCommand::new("tr", ["a-z", "A-Z"]).boxed(),
        ShellCommand::new("wc", ["-c"]).boxed(),
    ]);
    let result = pipe.run(None)?;

    let count = result.output_str().ok_or("no output")?.trim().to_string();
    assert_eq!(count, "12");
    assert_eq!(
        pipe.commands()[1].result().and_then(|r| r.output.clone()),
        Some(json!("HELLO WORLD\n"))
    );
    Ok(())
}

#[test]
fn shell_sequence_behaves_like_and_list() -> TestResult {
    init_tracing();

    let mut seq = SequentialCommand::new(vec![
        ShellCommand::script("printf a").boxed(),
        ShellCommand::new("false", Vec::<String>::new()).boxed(),
        ShellCommand::script("printf c").boxed(),
    ]);
    let result = seq.run(None)?;

    assert_eq!(result.output, Some(json!(["a", null])));
    assert!(!result.succeeded);
    Ok(())
}

#[test]
fn shell_commands_run_in_parallel() -> TestResult {
    init_tracing();

    let children = (0..4)
        .map(|i| ShellCommand::script(format!("printf {i}")).boxed())
        .collect();
    let mut par = ParallelCommand::new(children).with_pool_size(4)?;
    let result = par.run(None)?;

    assert_eq!(result.output, Some(json!(["0", "1", "2", "3"])));
    Ok(())
}

#[test]
fn shell_failures_inside_parallel_stay_inspectable() -> TestResult {
    init_tracing();

    let mut par = ParallelCommand::new(vec![
        PipeCommand::new(vec![
            ShellCommand::new("sleep", ["5"])
                .timeout(Duration::from_millis(200))
                .boxed(),
        ])
        .boxed(),
    ])
    .with_pool_size(1)?;
    par.run(None)?;

    let stage = &par.commands()[0].children()[0];
    let recorded = stage.result().ok_or("stage result lost in the worker")?;
    assert!(matches!(recorded.error, Some(CommandError::Timeout { .. })));
    Ok(())
}
