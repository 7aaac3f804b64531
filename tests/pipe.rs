// tests/pipe.rs

use std::error::Error;

use serde_json::json;

use cmdpipe::{Command, CommandError, PipeCommand};
use cmdpipe_test_utils::init_tracing;
use cmdpipe_test_utils::leaves::{AlwaysFault, AppendChar, Counting, SoftFail, append_chars};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn pipe_chains_outputs() -> TestResult {
    init_tracing();

    let mut pipe = PipeCommand::new(append_chars("ABC"));
    let result = pipe.run(None)?;

    assert_eq!(result.output, Some(json!("ABC")));
    assert!(result.succeeded);
    Ok(())
}

#[test]
fn pipe_starts_from_its_input_and_records_every_stage() -> TestResult {
    init_tracing();

    let mut pipe = PipeCommand::new(append_chars("ABC"));
    let result = pipe.run(Some(json!("D")))?;

    assert_eq!(result.output, Some(json!("DABC")));
    let stages: Vec<_> = pipe
        .commands()
        .iter()
        .map(|c| c.result().and_then(|r| r.output.clone()))
        .collect();
    assert_eq!(
        stages,
        vec![Some(json!("DA")), Some(json!("DAB")), Some(json!("DABC"))]
    );
    assert!(pipe.commands()[0].result().is_some_and(|r| r.succeeded));
    Ok(())
}

#[test]
fn soft_failure_short_circuits_with_the_stage_result() -> TestResult {
    init_tracing();

    let third = Counting::new();
    let calls = third.counter();
    let mut pipe = PipeCommand::new(vec![
        AppendChar::new('A').boxed(),
        SoftFail::new().boxed(),
        third.boxed(),
    ]);

    let result = pipe.run(None)?;

    assert!(!result.succeeded);
    assert!(result.output.is_none());
    assert!(result.error.is_none());
    assert_eq!(result.error_message.as_deref(), Some(SoftFail::MESSAGE));

    let stage = pipe.commands()[1].result().expect("second stage ran");
    assert_eq!(stage.succeeded, result.succeeded);
    assert_eq!(stage.error_message, result.error_message);

    assert!(pipe.commands()[2].result().is_none());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn raised_fault_in_non_strict_pipe_is_returned() -> TestResult {
    init_tracing();

    let mut pipe = PipeCommand::new(vec![
        AppendChar::new('A').boxed(),
        AlwaysFault::new().boxed(),
        AppendChar::new('C').boxed(),
    ]);

    let result = pipe.run(None)?;

    assert!(!result.succeeded);
    assert!(result.output.is_none());
    assert!(matches!(result.error, Some(CommandError::Failed(_))));
    assert!(pipe.commands()[2].result().is_none());
    Ok(())
}

#[test]
fn strict_pipe_forces_stages_to_raise() {
    init_tracing();

    let mut pipe = PipeCommand::new(vec![
        AppendChar::new('A').boxed(),
        SoftFail::new().boxed(),
        AppendChar::new('C').boxed(),
    ])
    .with_raise_error(true);

    let err = pipe.run(None).unwrap_err();
    assert_eq!(err.to_string(), SoftFail::MESSAGE);

    let recorded = pipe.result().expect("pipe result recorded");
    assert!(!recorded.succeeded);
    assert!(recorded.output.is_none());
    assert_eq!(recorded.error_message.as_deref(), Some(SoftFail::MESSAGE));
    assert!(matches!(recorded.error, Some(CommandError::Failed(_))));

    assert_eq!(
        pipe.commands()[0].result().and_then(|r| r.output.clone()),
        Some(json!("A"))
    );
    assert!(
        pipe.commands()[1]
            .result()
            .is_some_and(|r| matches!(r.error, Some(CommandError::Failed(_))))
    );
    assert!(pipe.commands()[2].result().is_none());
    // The child's own policy is left alone.
    assert!(!pipe.commands()[1].raise_error());
}

#[test]
fn non_strict_pipe_overrides_strict_child() -> TestResult {
    init_tracing();

    let mut pipe = PipeCommand::new(vec![SoftFail::strict().boxed()]);
    let result = pipe.run(None)?;

    // Run non-strictly, the child reports a soft failure instead of raising.
    assert!(!result.succeeded);
    assert!(result.error.is_none());
    Ok(())
}

#[test]
fn nested_pipes_compose() -> TestResult {
    init_tracing();

    let inner = PipeCommand::new(append_chars("BC"));
    let mut outer = PipeCommand::new(vec![
        AppendChar::new('A').boxed(),
        inner.boxed(),
        AppendChar::new('D').boxed(),
    ]);

    let result = outer.run(None)?;
    assert_eq!(result.output, Some(json!("ABCD")));
    Ok(())
}
