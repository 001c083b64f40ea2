// tests/controller_lifecycle.rs

mod common;
use crate::common::{init_tracing, mock_controller, output_of, TestResult};

use std::path::Path;

use tokio::io::BufReader;

use runtests::engine::{PassOutcome, RunExit, SetupStep};
use runtests::fs::FileSystem;
use runtests::fs::mock::MockFileSystem;
use runtests::report::Reporter;
use runtests_test_utils::builders::ConfigFileBuilder;
use runtests_test_utils::fake_executor::{FakeExecutor, FakeOutcome};
use runtests_test_utils::with_timeout;

fn sample_tree() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("./tests/pass.txt", "RUN: good %s");
    fs.add_file("./tests/fail.txt", "RUN: bad %s");
    fs.add_file("./tests/notes.txt", "just notes");
    fs.add_file("./src/main.rs", "// RUN: never");
    fs
}

#[tokio::test]
async fn full_cycle_reports_each_file_and_summary() -> TestResult {
    init_tracing();

    let fs = sample_tree();
    let executor = FakeExecutor::new().on(
        "bad tests/fail.txt",
        FakeOutcome::fail(1).stdout("got 3").stderr("expected 4"),
    );
    let config = ConfigFileBuilder::new().build_cmd("make").build();
    let controller = mock_controller(config, &fs, &executor, false);

    let mut reporter = Reporter::new(Vec::new(), false);
    let outcome = with_timeout(controller.run_once(&mut reporter)).await?;

    let PassOutcome::Completed(summary) = outcome else {
        panic!("expected a completed cycle, got {outcome:?}");
    };
    assert_eq!(summary.passes, vec!["tests/pass.txt"]);
    assert_eq!(summary.fails, vec!["tests/fail.txt"]);
    assert_eq!(summary.skipped, vec!["tests/notes.txt"]);

    assert_eq!(
        executor.executed().first().map(String::as_str),
        Some("make"),
        "build runs before any directive"
    );
    assert!(!executor.executed().iter().any(|c| c.contains("never")));

    let out = output_of(reporter.into_inner());
    let building = out.find("building...").expect("building phase printed");
    let cleaning = out.find("cleaning...").expect("cleaning phase printed");
    let running = out.find("running...").expect("running phase printed");
    assert!(building < cleaning && cleaning < running);
    assert!(out.contains("pre-run steps ok"));
    assert!(out.contains("): tests/pass.txt"));
    assert!(out.contains("fail: tests/fail.txt"));
    assert!(out.contains("got 3"));
    assert!(out.contains("expected 4"));
    assert!(out.contains("warn: no RUN directives in tests/notes.txt"));
    assert!(out.contains("testing concluded ("));
    assert!(out.ends_with("pass: 1 - fail: 1\n"));
    Ok(())
}

#[tokio::test]
async fn build_failure_aborts_before_any_test() -> TestResult {
    init_tracing();

    let fs = sample_tree();
    let executor = FakeExecutor::new().on(
        "make",
        FakeOutcome::fail(2).stdout("compiling").stderr("error[E0425]"),
    );
    let config = ConfigFileBuilder::new().build_cmd("make").build();
    let controller = mock_controller(config, &fs, &executor, false);

    let mut reporter = Reporter::new(Vec::new(), false);
    let input = b"\n";
    let exit = with_timeout(controller.run(&mut reporter, &mut BufReader::new(&input[..]))).await?;

    assert_eq!(exit, RunExit::SetupFailed(SetupStep::Build));
    assert_eq!(exit.exit_code(false), 1);
    assert_eq!(executor.executed(), vec!["make"]);
    assert!(!fs.exists(Path::new("./.temp")), "clean never ran");

    let out = output_of(reporter.into_inner());
    assert!(out.contains("fail: build"));
    assert!(out.contains("compiling"));
    assert!(out.contains("error[E0425]"));
    assert!(!out.contains("running..."));
    assert!(!out.contains("testing concluded"));
    Ok(())
}

#[tokio::test]
async fn clean_failure_aborts_before_any_test() -> TestResult {
    init_tracing();

    let fs = sample_tree();
    fs.add_dir("./.temp");
    fs.set_read_only(true);
    let executor = FakeExecutor::new();
    let config = ConfigFileBuilder::new().build();
    let controller = mock_controller(config, &fs, &executor, false);

    let mut reporter = Reporter::new(Vec::new(), false);
    let outcome = with_timeout(controller.run_once(&mut reporter)).await?;

    assert_eq!(outcome, PassOutcome::Aborted(SetupStep::Clean));
    assert!(executor.executed().is_empty());

    let out = output_of(reporter.into_inner());
    assert!(out.contains("fail: clean"));
    assert!(out.contains("read-only"));
    assert!(!out.contains("pre-run steps ok"));
    Ok(())
}

#[tokio::test]
async fn temp_dir_is_emptied_before_tests_run() -> TestResult {
    init_tracing();

    let fs = sample_tree();
    fs.add_file("./.temp/stale.class", "old");
    let executor = FakeExecutor::new();
    let config = ConfigFileBuilder::new().build();
    let controller = mock_controller(config, &fs, &executor, false);

    let mut reporter = Reporter::new(Vec::new(), false);
    with_timeout(controller.run_once(&mut reporter)).await?;

    assert!(fs.is_dir(Path::new("./.temp")));
    assert!(!fs.exists(Path::new("./.temp/stale.class")));
    assert!(fs.read_dir(Path::new("./.temp"))?.is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_discovery_warns_once_and_reports_zero_counts() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("./README.md", "# nothing to test");
    let executor = FakeExecutor::new();
    let config = ConfigFileBuilder::new().build();
    let controller = mock_controller(config, &fs, &executor, false);

    let mut reporter = Reporter::new(Vec::new(), false);
    let exit = with_timeout(controller.run(&mut reporter, &mut BufReader::new(&b""[..]))).await?;

    let RunExit::Finished(summary) = &exit else {
        panic!("expected a finished run, got {exit:?}");
    };
    assert!(summary.passes.is_empty() && summary.fails.is_empty());
    assert_eq!(exit.exit_code(true), 0);

    let out = output_of(reporter.into_inner());
    assert_eq!(out.matches("warn: no sources found").count(), 1);
    assert!(out.ends_with("pass: 0 - fail: 0\n"));
    Ok(())
}

#[tokio::test]
async fn unlistable_directory_does_not_stop_the_run() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("./a.txt", "RUN: true");
    fs.add_file("./locked/b.txt", "RUN: never");
    fs.deny_listing("./locked");
    let executor = FakeExecutor::new();
    let config = ConfigFileBuilder::new().build();
    let controller = mock_controller(config, &fs, &executor, false);

    let mut reporter = Reporter::new(Vec::new(), false);
    let outcome = with_timeout(controller.run_once(&mut reporter)).await?;

    let PassOutcome::Completed(summary) = outcome else {
        panic!("expected a completed cycle, got {outcome:?}");
    };
    assert_eq!(summary.passes, vec!["a.txt"]);
    assert_eq!(executor.executed(), vec!["true"]);

    let out = output_of(reporter.into_inner());
    assert!(out.ends_with("pass: 1 - fail: 0\n"));
    Ok(())
}

#[tokio::test]
async fn filters_select_sources_by_anchored_pattern() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("./tests/instruction/add.txt", "RUN: add");
    fs.add_file("./tests/instruction/sub.txt", "RUN: sub");
    fs.add_file("./tests/program/maps.txt", "RUN: maps");
    let executor = FakeExecutor::new();
    let config = ConfigFileBuilder::new()
        .include("tests/instruction")
        .exclude(".*sub")
        .build();
    let controller = mock_controller(config, &fs, &executor, false);

    let mut reporter = Reporter::new(Vec::new(), false);
    let outcome = with_timeout(controller.run_once(&mut reporter)).await?;

    let PassOutcome::Completed(summary) = outcome else {
        panic!("expected a completed cycle, got {outcome:?}");
    };
    assert_eq!(summary.passes, vec!["tests/instruction/add.txt"]);
    assert_eq!(executor.executed(), vec!["add"]);
    Ok(())
}

#[tokio::test]
async fn watch_mode_reruns_on_enter_and_stops_at_end_of_input() -> TestResult {
    init_tracing();

    let fs = sample_tree();
    let executor = FakeExecutor::new().on("bad tests/fail.txt", FakeOutcome::fail(1));
    let config = ConfigFileBuilder::new().build();
    let controller = mock_controller(config, &fs, &executor, true);

    let mut reporter = Reporter::new(Vec::new(), false);
    let exit = with_timeout(controller.run(&mut reporter, &mut BufReader::new(&b"\n"[..]))).await?;

    assert!(matches!(exit, RunExit::Finished(_)));
    assert_eq!(exit.exit_code(false), 0);
    assert_eq!(exit.exit_code(true), 1);

    let good_runs = executor
        .executed()
        .iter()
        .filter(|c| c.as_str() == "good tests/pass.txt")
        .count();
    assert_eq!(good_runs, 2);

    let out = output_of(reporter.into_inner());
    assert_eq!(out.matches("testing concluded").count(), 2);
    assert_eq!(out.matches("Press Enter to rerun").count(), 2);
    Ok(())
}

#[tokio::test]
async fn verbose_output_lists_commands_run() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("./one.txt", "RUN: run-tool check %s");
    let executor = FakeExecutor::new();
    let config = ConfigFileBuilder::new().build_cmd("make").build();
    let controller = mock_controller(config, &fs, &executor, false);

    let mut reporter = Reporter::new(Vec::new(), true);
    with_timeout(controller.run_once(&mut reporter)).await?;

    let out = output_of(reporter.into_inner());
    assert!(out.contains("run: make"));
    assert!(out.contains("  ran: cargo run -- check one.txt"));
    Ok(())
}
