//! Error types for batch preparation and slicing.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can occur while preparing or running a batch.
///
/// Every variant is fatal to the run: nothing is retried and no object is
/// skipped.
#[derive(Error, Debug)]
pub enum StackError {
    /// Mesh has no vertices.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Mesh file could not be read or parsed.
    #[error("failed to read mesh {}: {details}", path.display())]
    MeshRead {
        /// Offending mesh file.
        path: PathBuf,
        /// What went wrong.
        details: String,
    },

    /// No extrusion multiplier configured for a mesh file.
    #[error("no extrusion multiplier configured for {0}")]
    MissingConfiguration(String),

    /// Mesh file name does not start with an integer.
    #[error("file name {0:?} does not start with a number")]
    InvalidFilename(String),

    /// Input directory cannot be listed.
    #[error("input directory {}: {source}", path.display())]
    InputDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Slicer configuration file is missing or cannot be written.
    #[error("config file {}: {source}", path.display())]
    ConfigFile {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Slicer could not be started.
    #[error("failed to launch slicer {program}: {source}")]
    SlicerLaunch {
        /// Slicer executable.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Slicer exited unsuccessfully.
    #[error("slicer {program} exited with {status}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    ExternalProcess {
        /// Slicer executable.
        program: String,
        /// Exit status.
        status: ExitStatus,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// Job settings are inconsistent.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Job file is not valid TOML for [`crate::JobSettings`].
    #[error("failed to parse job file: {0}")]
    Settings(#[from] toml::de::Error),

    /// Other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StackError {
    /// Create a mesh read error.
    pub fn mesh_read(path: impl Into<PathBuf>, details: impl ToString) -> Self {
        Self::MeshRead {
            path: path.into(),
            details: details.to_string(),
        }
    }

    /// Create an input directory error.
    pub fn input_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InputDir {
            path: path.into(),
            source,
        }
    }

    /// Create a config file error.
    pub fn config_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigFile {
            path: path.into(),
            source,
        }
    }
}

/// Result type for stackslice operations.
pub type Result<T> = std::result::Result<T, StackError>;
