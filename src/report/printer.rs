// src/report/printer.rs

//! Human-readable report written to stdout (or any `Write` in tests).

use std::io::{self, Write};
use std::time::Duration;

use super::color::{paint, Tone};
use super::model::{Execution, ExecutionStatus, FileResult, RunSummary, Verdict};

/// Maximum number of trailing stderr characters shown per failing command.
pub const STDERR_TAIL_CHARS: usize = 5000;

/// Writes progress lines, per-file verdicts and the run summary.
///
/// Plain text unless colours are switched on with
/// [`with_color`](Self::with_color); only the labels are coloured.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    verbose: bool,
    color: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn phase(&mut self, message: &str) -> io::Result<()> {
        let line = self.paint(message, Tone::Good);
        writeln!(self.out, "{line}")
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Echo a command before it runs (verbose mode only).
    pub fn command(&mut self, cmd: &str) -> io::Result<()> {
        if self.verbose {
            let label = self.paint("run:", Tone::Echo);
            writeln!(self.out, "{label} {cmd}")?;
        }
        Ok(())
    }

    /// Show the captured output of a failed build/clean step.
    pub fn setup_failure(&mut self, step: &str, execution: &Execution) -> io::Result<()> {
        self.failure_block(step, execution)
    }

    /// Same as [`setup_failure`](Self::setup_failure), for steps that fail
    /// without a process (e.g. the temp-dir reset).
    pub fn setup_error(&mut self, step: &str, error: &str) -> io::Result<()> {
        self.error_block(step, error)
    }

    pub fn no_sources(&mut self) -> io::Result<()> {
        let label = self.paint("warn:", Tone::Warn);
        writeln!(self.out, "{label} no sources found")
    }

    pub fn file_result(&mut self, result: &FileResult) -> io::Result<()> {
        match result.verdict() {
            Verdict::NoDirectives => {
                let label = self.paint("warn:", Tone::Warn);
                writeln!(self.out, "{label} no RUN directives in {}", result.source)?;
                return Ok(());
            }
            Verdict::Pass => {
                let label = format!("ok ({}s):", format_secs(result.duration()));
                let label = self.paint(&label, Tone::Good);
                writeln!(self.out, "{label} {}", result.source)?;
            }
            Verdict::Fail => {
                if let Some(err) = &result.error {
                    self.error_block(&result.source, err)?;
                }
                for execution in result.failing_executions() {
                    self.failure_block(&result.source, execution)?;
                }
            }
        }

        if self.verbose {
            let label = self.paint("ran:", Tone::Echo);
            for cmd in result.commands() {
                writeln!(self.out, "  {label} {cmd}")?;
            }
        }
        Ok(())
    }

    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out)?;
        let heading = self.paint("testing concluded", Tone::Heading);
        writeln!(self.out, "{heading} ({}s)", format_secs(summary.duration))?;
        let pass = self.paint("pass:", Tone::Good);
        let fail = self.paint("fail:", Tone::Bad);
        writeln!(
            self.out,
            "{pass} {} - {fail} {}",
            summary.passes.len(),
            summary.fails.len()
        )
    }

    fn error_block(&mut self, context: &str, error: &str) -> io::Result<()> {
        let header = self.paint(&format!("fail: {context}"), Tone::BadHeader);
        let label = self.paint("error:", Tone::Bad);
        writeln!(self.out, "{header}")?;
        writeln!(self.out, "{label} {error}")?;
        writeln!(self.out)
    }

    fn failure_block(&mut self, context: &str, execution: &Execution) -> io::Result<()> {
        let header = self.paint(&format!("fail: {context}"), Tone::BadHeader);
        writeln!(self.out, "{header}")?;
        writeln!(
            self.out,
            "cmd (line {}): {}",
            execution.command.line, execution.command.text
        )?;
        match execution.status {
            ExecutionStatus::Exited(code) => writeln!(self.out, "status: exit {code}")?,
            ExecutionStatus::TimedOut(limit) => {
                writeln!(self.out, "status: timed out after {}s", format_secs(limit))?
            }
        }
        let stdout_label = self.paint("stdout:", Tone::Bad);
        let stderr_label = self.paint("stderr:", Tone::Bad);
        writeln!(self.out, "{stdout_label}")?;
        writeln!(self.out, "{}", execution.stdout_lossy())?;
        writeln!(self.out, "{stderr_label}")?;
        writeln!(self.out, "{}", tail_chars(&execution.stderr_lossy(), STDERR_TAIL_CHARS))?;
        writeln!(self.out)
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        paint(text, tone, self.color)
    }
}

/// Seconds rounded to millisecond precision, e.g. `0.042`.
pub fn format_secs(d: Duration) -> String {
    format!("{:.3}", d.as_secs_f64())
}

/// Last `max` characters of `s` (character, not byte, count).
pub fn tail_chars(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    match s.char_indices().nth(count - max) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::directive::ResolvedCommand;

    fn execution(status: ExecutionStatus, stdout: &str, stderr: &str) -> Execution {
        Execution {
            command: ResolvedCommand {
                line: 1,
                text: "false".to_string(),
            },
            status,
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
            started_at: Instant::now(),
            elapsed: Duration::from_millis(12),
        }
    }

    fn render(verbose: bool, f: impl FnOnce(&mut Reporter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut reporter = Reporter::new(Vec::new(), verbose);
        f(&mut reporter).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn tail_keeps_last_characters() {
        assert_eq!(tail_chars("abcdef", 3), "def");
        assert_eq!(tail_chars("abc", 5), "abc");
        assert_eq!(tail_chars("ééééé", 2), "éé");
    }

    #[test]
    fn format_secs_rounds_to_millis() {
        assert_eq!(format_secs(Duration::from_micros(1_234_567)), "1.235");
        assert_eq!(format_secs(Duration::ZERO), "0.000");
    }

    #[test]
    fn passing_file_shows_duration_and_verbose_commands() {
        let result = FileResult::new("A.txt", vec![execution(ExecutionStatus::Exited(0), "", "")]);
        let out = render(true, |r| r.file_result(&result));
        assert_eq!(out, "ok (0.012s): A.txt\n  ran: false\n");
    }

    #[test]
    fn failing_file_shows_output_and_status() {
        let result = FileResult::new(
            "B.txt",
            vec![execution(ExecutionStatus::Exited(1), "out", "err")],
        );
        let out = render(false, |r| r.file_result(&result));
        assert_eq!(
            out,
            "fail: B.txt\ncmd (line 1): false\nstatus: exit 1\nstdout:\nout\nstderr:\nerr\n\n"
        );
    }

    #[test]
    fn timed_out_command_is_labelled() {
        let result = FileResult::new(
            "C.txt",
            vec![execution(ExecutionStatus::TimedOut(Duration::from_secs(10)), "", "")],
        );
        let out = render(false, |r| r.file_result(&result));
        assert!(out.contains("status: timed out after 10.000s"));
    }

    #[test]
    fn stderr_is_truncated_to_tail() {
        let long = format!("{}END", "x".repeat(STDERR_TAIL_CHARS * 2));
        let result = FileResult::new(
            "B.txt",
            vec![execution(ExecutionStatus::Exited(2), "", &long)],
        );
        let out = render(false, |r| r.file_result(&result));
        let stderr_section = out.split("stderr:\n").nth(1).unwrap().trim_end();
        assert_eq!(stderr_section.chars().count(), STDERR_TAIL_CHARS);
        assert!(stderr_section.ends_with("END"));
    }

    #[test]
    fn zero_directive_file_is_a_warning() {
        let result = FileResult::new("D.txt", vec![]);
        let out = render(true, |r| r.file_result(&result));
        assert_eq!(out, "warn: no RUN directives in D.txt\n");
    }

    #[test]
    fn unreadable_file_reports_error() {
        let result = FileResult::errored("E.txt", "reading file \"E.txt\"");
        let out = render(false, |r| r.file_result(&result));
        assert!(out.starts_with("fail: E.txt\nerror: reading file"));
    }

    #[test]
    fn summary_lines() {
        let summary = RunSummary {
            passes: vec!["A".into(), "B".into()],
            fails: vec!["C".into()],
            skipped: vec![],
            duration: Duration::from_millis(1500),
        };
        let out = render(false, |r| r.summary(&summary));
        assert_eq!(out, "\n\ntesting concluded (1.500s)\npass: 2 - fail: 1\n");
    }

    #[test]
    fn colored_output_wraps_labels_only() {
        let result = FileResult::new("A.txt", vec![execution(ExecutionStatus::Exited(0), "", "")]);
        let mut reporter = Reporter::new(Vec::new(), false).with_color(true);
        reporter.file_result(&result).unwrap();
        reporter.no_sources().unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            out,
            "\x1b[92mok (0.012s):\x1b[0m A.txt\n\x1b[93mwarn:\x1b[0m no sources found\n"
        );
    }

    #[test]
    fn failure_block_colors_header_and_labels() {
        let result = FileResult::new("B.txt", vec![execution(ExecutionStatus::Exited(1), "", "")]);
        let mut reporter = Reporter::new(Vec::new(), false).with_color(true);
        reporter.file_result(&result).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let header = out.lines().next().unwrap();
        assert!(header.contains("fail: B.txt"));
        assert!(header.contains("\x1b[4m") && header.contains("\x1b[91m"));
        assert!(header.ends_with("\x1b[0m"));
        assert!(out.contains("\x1b[91mstdout:\x1b[0m\n"));
        assert!(out.contains("\x1b[91mstderr:\x1b[0m\n"));
    }

    #[test]
    fn command_echo_only_when_verbose() {
        assert_eq!(render(false, |r| r.command("cargo build")), "");
        assert_eq!(render(true, |r| r.command("cargo build")), "run: cargo build\n");
    }
}
