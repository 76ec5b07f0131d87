//! Deployment runner for the Django front end.
//!
//! Runs the release steps in order and stops at the first failure:
//!
//! 1. Normalise `requirements.txt` (UTF-16 exports from Windows shells are
//!    converted to UTF-8, blank lines and NUL bytes dropped, `whitenoise`
//!    added if missing)
//! 2. `pip install -r requirements.txt`
//! 3. `python manage.py collectstatic --noinput`
//! 4. Remind the operator to restart the web app
//!
//! There are no retries; a failed step leaves the later ones unrun.

use crate::config::DeployConfig;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Requirement appended when the file does not mention whitenoise
pub const WHITENOISE_REQUIREMENT: &str = "whitenoise==6.6.0";

/// Shown once every step has succeeded
pub const RESTART_REMINDER: &str = "Deployment steps complete. Reload the web app to pick up the new release.";

/// Deployment errors
#[derive(Error, Debug)]
pub enum DeployError {
    /// A command ran and exited unsuccessfully
    #[error("step '{step}' failed with {status}")]
    StepFailed {
        /// Step name
        step: String,
        /// Exit status
        status: ExitStatus,
    },

    /// A command could not be started
    #[error("failed to run step '{step}': {source}")]
    Spawn {
        /// Step name
        step: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Requirements file could not be read or written
    #[error("requirements file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Requirements file is neither UTF-16 nor UTF-8
    #[error("requirements file {0} is not valid UTF-16 or UTF-8")]
    Encoding(PathBuf),
}

/// Summary of a requirements normalisation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Requirement lines written back
    pub lines: usize,
    /// Whether the input was UTF-16
    pub converted_from_utf16: bool,
    /// Whether whitenoise had to be appended
    pub added_whitenoise: bool,
}

/// One external command in the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    /// Human-readable name used in logs and errors
    pub name: String,
    /// Program to execute
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
}

impl CommandStep {
    /// Creates a step
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn run(&self, working_dir: Option<&Path>) -> Result<(), DeployError> {
        tracing::info!(step = %self.name, program = %self.program, args = ?self.args, "Running deploy step");

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let status = command.status().map_err(|source| DeployError::Spawn {
            step: self.name.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(DeployError::StepFailed {
                step: self.name.clone(),
                status,
            })
        }
    }
}

/// Ordered deployment plan
#[derive(Debug, Clone)]
pub struct DeployPlan {
    /// Requirements file normalised before any command runs
    pub requirements: PathBuf,
    /// Commands run in order after normalisation
    pub commands: Vec<CommandStep>,
    /// Directory commands run in; the current directory when unset
    pub working_dir: Option<PathBuf>,
}

impl DeployPlan {
    /// The standard plan: install requirements, then collect static files.
    #[must_use]
    pub fn from_config(config: &DeployConfig) -> Self {
        let requirements = config.requirements.display().to_string();
        let manage_py = config.manage_py.display().to_string();

        Self {
            requirements: config.requirements.clone(),
            commands: vec![
                CommandStep::new(
                    "install requirements",
                    config.pip.clone(),
                    ["install".to_string(), "-r".to_string(), requirements],
                ),
                CommandStep::new(
                    "collect static files",
                    config.python.clone(),
                    [manage_py, "collectstatic".to_string(), "--noinput".to_string()],
                ),
            ],
            working_dir: None,
        }
    }

    /// Run every step, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the [`DeployError`] of the step that failed.
    pub fn run(&self) -> Result<NormalizeReport, DeployError> {
        let requirements = match &self.working_dir {
            Some(dir) if self.requirements.is_relative() => dir.join(&self.requirements),
            _ => self.requirements.clone(),
        };

        let report = normalize_requirements(&requirements)?;
        tracing::info!(
            path = %requirements.display(),
            lines = report.lines,
            converted_from_utf16 = report.converted_from_utf16,
            added_whitenoise = report.added_whitenoise,
            "Requirements normalised"
        );

        for step in &self.commands {
            step.run(self.working_dir.as_deref())?;
        }

        tracing::info!("{RESTART_REMINDER}");
        Ok(report)
    }
}

/// Rewrite a requirements file as clean UTF-8 that includes whitenoise.
///
/// # Errors
///
/// Returns [`DeployError::Io`] if the file cannot be read or written, and
/// [`DeployError::Encoding`] if it cannot be decoded.
pub fn normalize_requirements(path: &Path) -> Result<NormalizeReport, DeployError> {
    let io_error = |source| DeployError::Io {
        path: path.to_path_buf(),
        source,
    };

    let bytes = std::fs::read(path).map_err(io_error)?;
    let (text, converted_from_utf16) =
        decode(&bytes).ok_or_else(|| DeployError::Encoding(path.to_path_buf()))?;

    let mut lines: Vec<String> = text
        .lines()
        .map(|line| line.replace('\0', "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    let added_whitenoise = !lines
        .iter()
        .any(|line| line.to_lowercase().contains("whitenoise"));
    if added_whitenoise {
        tracing::info!("Adding {WHITENOISE_REQUIREMENT} to requirements");
        lines.push(WHITENOISE_REQUIREMENT.to_string());
    }

    let mut output = lines.join("\n");
    output.push('\n');
    std::fs::write(path, output).map_err(io_error)?;

    Ok(NormalizeReport {
        lines: lines.len(),
        converted_from_utf16,
        added_whitenoise,
    })
}

/// Decode as UTF-16 when the bytes carry a BOM or interleaved NULs, else UTF-8.
fn decode(bytes: &[u8]) -> Option<(String, bool)> {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes).map(|s| (s, true)),
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes).map(|s| (s, true)),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8(rest.to_vec()).ok().map(|s| (s, false)),
        _ if bytes.len() % 2 == 0 && bytes.iter().skip(1).step_by(2).any(|&b| b == 0) => {
            utf16(bytes, u16::from_le_bytes).map(|s| (s, true))
        }
        _ => String::from_utf8(bytes.to_vec()).ok().map(|s| (s, false)),
    }
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}
