//! External slicer invocation.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::{Result, StackError};
use crate::settings::SlicerSettings;

/// One slicer run.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceJob {
    /// Patched config file to load.
    pub config: PathBuf,
    /// Bed position of the object's center, `x,y`.
    pub center: String,
    /// Directory receiving the G-code.
    pub output_dir: PathBuf,
    /// Mesh to slice.
    pub mesh: PathBuf,
}

/// Captured output of a successful slicer run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlicerOutput {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

/// Something that turns a mesh plus config into G-code.
pub trait Slicer {
    /// Run the slicer to completion. Non-success is an error.
    fn slice(&self, job: &SliceJob) -> Result<SlicerOutput>;
}

/// PrusaSlicer (or Slic3r) command-line interface.
#[derive(Debug, Clone, PartialEq)]
pub struct PrusaSlicer {
    /// Executable.
    pub program: PathBuf,
    /// Arguments passed before the generated ones.
    pub extra_args: Vec<String>,
}

impl PrusaSlicer {
    /// Slicer using `program` with no extra arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// Command line for `job`, without the program itself.
    pub fn args(&self, job: &SliceJob) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.extend([
            "--load".to_string(),
            path_arg(&job.config),
            "--center".to_string(),
            job.center.clone(),
            "--export-gcode".to_string(),
            "--output".to_string(),
            path_arg(&job.output_dir),
            path_arg(&job.mesh),
        ]);
        args
    }
}

impl From<&SlicerSettings> for PrusaSlicer {
    fn from(settings: &SlicerSettings) -> Self {
        Self {
            program: settings.program.clone(),
            extra_args: settings.extra_args.clone(),
        }
    }
}

impl Slicer for PrusaSlicer {
    fn slice(&self, job: &SliceJob) -> Result<SlicerOutput> {
        let program = self.program.display().to_string();
        let args = self.args(job);
        debug!(%program, ?args, "launching slicer");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| StackError::SlicerLaunch {
                program: program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(StackError::ExternalProcess {
                program,
                status: output.status,
                stdout,
                stderr,
            });
        }

        info!(mesh = %job.mesh.display(), "slicer finished");
        if !stdout.trim().is_empty() {
            info!("slicer stdout:\n{}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            info!("slicer stderr:\n{}", stderr.trim_end());
        }

        Ok(SlicerOutput { stdout, stderr })
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> SliceJob {
        SliceJob {
            config: PathBuf::from("out/temp_config.ini"),
            center: "185.0,208.0".into(),
            output_dir: PathBuf::from("out"),
            mesh: PathBuf::from("input/1.stl"),
        }
    }

    #[test]
    fn test_command_line() {
        let slicer = PrusaSlicer::new("prusa-slicer");
        assert_eq!(
            slicer.args(&job()),
            vec![
                "--load",
                "out/temp_config.ini",
                "--center",
                "185.0,208.0",
                "--export-gcode",
                "--output",
                "out",
                "input/1.stl",
            ]
        );
    }

    #[test]
    fn test_extra_args_come_first() {
        let slicer = PrusaSlicer::from(&SlicerSettings {
            program: PathBuf::from("slic3r"),
            extra_args: vec!["--loglevel".into(), "1".into()],
        });
        let args = slicer.args(&job());
        assert_eq!(&args[..3], &["--loglevel", "1", "--load"]);
    }

    #[test]
    fn test_launch_failure() {
        let slicer = PrusaSlicer::new("/nonexistent/stackslice-test-slicer");
        assert!(matches!(
            slicer.slice(&job()),
            Err(StackError::SlicerLaunch { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_captures_output() {
        let slicer = PrusaSlicer {
            program: PathBuf::from("sh"),
            extra_args: vec![
                "-c".into(),
                "echo sliced; echo 'bad config' >&2; exit 3".into(),
                "sh".into(),
            ],
        };
        match slicer.slice(&job()) {
            Err(StackError::ExternalProcess {
                stdout,
                stderr,
                status,
                ..
            }) => {
                assert_eq!(stdout.trim(), "sliced");
                assert_eq!(stderr.trim(), "bad config");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("expected ExternalProcess, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_success_returns_output() {
        let slicer = PrusaSlicer {
            program: PathBuf::from("sh"),
            extra_args: vec!["-c".into(), "echo \"$2\"".into(), "sh".into()],
        };
        let out = slicer.slice(&job()).unwrap();
        // $1 is --load, $2 the config path.
        assert_eq!(out.stdout.trim(), "out/temp_config.ini");
    }
}
