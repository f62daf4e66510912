// Output format auto-detection for the CLI.
//
// TTY → human-readable text. Piped/redirected → structured JSON.
// `--json` flag forces JSON output regardless of terminal.

use doctoc_common::pipeline::PipelineError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

use crate::config::ConfigError;

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one object per response).
    Json,
}

impl OutputFormat {
    /// Auto-detect format: JSON if `--json` was passed or stdout is not a TTY.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    /// Testable variant that takes an explicit `is_tty` flag.
    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Write a value to stdout in the selected format.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    let mut out = io::stdout().lock();
    write_output(&mut out, format, value, human_fn)
}

/// Write a value to a provided writer (useful for testing).
pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => {
            writeln!(writer, "{}", human_fn(value))
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Write an error to stderr in the selected format.
pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    print_diagnostic(format, "error", ANSI_RED, code, message);
}

/// Write a warning to stderr in the selected format.
pub fn print_warning(format: OutputFormat, code: &str, message: &str) {
    print_diagnostic(format, "warning", ANSI_YELLOW, code, message);
}

/// Print a command failure with a stable error code.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    print_error(format, error_code(error), &format!("{error:#}"));
}

fn print_diagnostic(format: OutputFormat, label: &str, color: &str, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    match format {
        OutputFormat::Human => {
            let line = render_human_stderr_line(label, message, io::stderr().is_terminal(), color);
            let _ = writeln!(err, "{line}");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                label: {
                    "code": code,
                    "message": message,
                }
            });
            let _ = serde_json::to_writer(&mut err, &obj);
            let _ = writeln!(err);
        }
    }
}

/// Stable machine-readable code for the first recognized error in the chain.
fn error_code(error: &anyhow::Error) -> &'static str {
    for cause in error.chain() {
        if cause.downcast_ref::<ConfigError>().is_some() {
            return "CONFIG_ERROR";
        }
        if let Some(pipeline) = cause.downcast_ref::<PipelineError>() {
            return match pipeline {
                PipelineError::InvalidSettings(_)
                | PipelineError::Pattern(_)
                | PipelineError::UnknownPlugin { .. }
                | PipelineError::Options { .. } => "INVALID_SETTINGS",
                PipelineError::Flag(_)
                | PipelineError::UnknownConfig { .. }
                | PipelineError::FileOptions { .. } => "INVALID_FLAG",
                PipelineError::Strategy { .. } | PipelineError::Serialize { .. } => {
                    "STRATEGY_FAILED"
                }
                PipelineError::InvalidHeadings { .. } => "INVALID_HEADINGS",
            };
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return match io_err.kind() {
                io::ErrorKind::NotFound => "FILE_NOT_FOUND",
                io::ErrorKind::PermissionDenied => "PERMISSION_DENIED",
                _ => "IO_ERROR",
            };
        }
    }
    "DOCTOC_ERROR"
}

fn render_human_stderr_line(label: &str, message: &str, is_tty: bool, color: &str) -> String {
    if is_tty {
        format!("{color}{label}:{ANSI_RESET} {message}")
    } else {
        format!("{label}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use doctoc_common::pipeline::settings::SettingsError;

    #[test]
    fn detect_tty_returns_human() {
        assert_eq!(OutputFormat::detect_from_terminal(true), OutputFormat::Human);
    }

    #[test]
    fn detect_pipe_returns_json() {
        assert_eq!(OutputFormat::detect_from_terminal(false), OutputFormat::Json);
    }

    #[test]
    fn detect_json_flag_overrides_tty() {
        assert_eq!(OutputFormat::detect(true), OutputFormat::Json);
    }

    #[test]
    fn write_output_human_format() {
        #[derive(Serialize)]
        struct Info {
            file: String,
        }
        let info = Info { file: "index.html".into() };
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Human, &info, |i| format!("File: {}", i.file))
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "File: index.html\n");
    }

    #[test]
    fn write_output_json_format() {
        #[derive(Serialize)]
        struct Info {
            file: String,
            headings: u32,
        }
        let info = Info { file: "index.html".into(), headings: 4 };
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Json, &info, |_| {
            unreachable!("human_fn should not be called in JSON mode")
        })
        .unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.ends_with('\n'));
        let parsed: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed["file"], "index.html");
        assert_eq!(parsed["headings"], 4);
    }

    #[test]
    fn write_output_empty_string_human() {
        #[derive(Serialize)]
        struct Empty {}
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Human, &Empty {}, |_| String::new()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\n");
    }

    #[test]
    fn print_error_does_not_panic() {
        print_error(OutputFormat::Human, "TEST_ERR", "something broke");
        print_error(OutputFormat::Json, "TEST_ERR", "something broke");
        print_warning(OutputFormat::Json, "WARN", "heads up");
    }

    #[test]
    fn render_human_error_uses_color_for_tty() {
        let line = render_human_stderr_line("error", "boom", true, ANSI_RED);
        assert!(line.contains(ANSI_RED));
        assert!(line.contains(ANSI_RESET));
        assert!(line.contains("boom"));
    }

    #[test]
    fn render_human_warning_without_tty_is_plain() {
        let line = render_human_stderr_line("warning", "careful", false, ANSI_YELLOW);
        assert_eq!(line, "warning: careful");
    }

    #[test]
    fn error_code_for_pipeline_errors() {
        let err = anyhow::Error::new(PipelineError::UnknownConfig {
            filename: "a.html".into(),
            flag: "doctoc".into(),
            config: "nope".into(),
        });
        assert_eq!(error_code(&err), "INVALID_FLAG");

        let err = anyhow::Error::new(PipelineError::from(SettingsError::EmptyFlag))
            .context("failed to set up doctoc");
        assert_eq!(error_code(&err), "INVALID_SETTINGS");
    }

    #[test]
    fn error_code_for_missing_files() {
        let err = std::fs::read("/definitely/not/here.html")
            .context("failed to read input")
            .unwrap_err();
        assert_eq!(error_code(&err), "FILE_NOT_FOUND");
    }

    #[test]
    fn error_code_for_config_errors() {
        let parse = toml::from_str::<toml::Table>("x = [").unwrap_err();
        let err = anyhow::Error::new(ConfigError::Parse(parse));
        assert_eq!(error_code(&err), "CONFIG_ERROR");
    }

    #[test]
    fn error_code_fallback() {
        assert_eq!(error_code(&anyhow::anyhow!("something else")), "DOCTOC_ERROR");
    }
}
