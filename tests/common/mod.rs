#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use runtests::config::ConfigFile;
use runtests::engine::{Controller, RunOptions};
use runtests::fs::mock::MockFileSystem;
use runtests_test_utils::fake_executor::FakeExecutor;

pub use runtests_test_utils::init_tracing;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Controller over an in-memory tree rooted at `"."`.
pub fn mock_controller(
    config: ConfigFile,
    fs: &MockFileSystem,
    executor: &FakeExecutor,
    watch: bool,
) -> Controller {
    let options = RunOptions {
        root: PathBuf::from("."),
        verbose: false,
        watch,
    };
    Controller::new(
        config,
        options,
        Arc::new(fs.clone()),
        Arc::new(executor.clone()),
    )
}

pub fn output_of(buf: Vec<u8>) -> String {
    String::from_utf8(buf).expect("report output is UTF-8")
}
