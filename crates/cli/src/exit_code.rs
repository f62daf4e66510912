// Consistent exit codes for the doctoc CLI.
//
//   0  = success
//   1  = general error
//   2  = usage/argument error
//   10 = configuration error (doctoc.toml, settings, plugin options)
//   11 = input file missing or unreadable
//   12 = per-file directive error (flag value, unknown configuration)
//   13 = content error (strategy failure, invalid headings)

use doctoc_common::pipeline::PipelineError;
use std::process;

use crate::config::ConfigError;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    Config = 10,
    Input = 11,
    Directive = 12,
    Content = 13,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.downcast_ref::<ConfigError>().is_some() {
                return Self::Config;
            }
            if let Some(pipeline) = cause.downcast_ref::<PipelineError>() {
                return Self::from_pipeline(pipeline);
            }
            if let Some(clap_err) = cause.downcast_ref::<clap::Error>() {
                return match clap_err.kind() {
                    clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayVersion => Self::Success,
                    _ => Self::Usage,
                };
            }
            if cause.downcast_ref::<std::io::Error>().is_some() {
                return Self::Input;
            }
        }
        Self::Error
    }

    pub fn from_pipeline(err: &PipelineError) -> Self {
        match err {
            PipelineError::InvalidSettings(_)
            | PipelineError::Pattern(_)
            | PipelineError::UnknownPlugin { .. }
            | PipelineError::Options { .. } => Self::Config,
            PipelineError::Flag(_)
            | PipelineError::UnknownConfig { .. }
            | PipelineError::FileOptions { .. } => Self::Directive,
            PipelineError::Strategy { .. }
            | PipelineError::InvalidHeadings { .. }
            | PipelineError::Serialize { .. } => Self::Content,
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}
