//! Batch job settings.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StackError};
use crate::placement::{format_coord, BedCenter};

/// External slicer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerSettings {
    /// Slicer executable (name on `PATH` or full path).
    pub program: PathBuf,
    /// Arguments passed before the generated ones.
    pub extra_args: Vec<String>,
}

impl Default for SlicerSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("prusa-slicer"),
            extra_args: Vec::new(),
        }
    }
}

/// Extrusion multiplier as written in the job file.
///
/// Accepts a TOML integer, float or string. Integers and strings reach the
/// slicer as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Multiplier {
    /// Integer value, e.g. `1`.
    Integer(i64),
    /// Numeric value, e.g. `1.05`.
    Number(f64),
    /// Verbatim text, e.g. `"1.05"`.
    Text(String),
}

impl Multiplier {
    /// Text substituted into the slicer config.
    pub fn as_config_value(&self) -> String {
        match self {
            Multiplier::Integer(i) => i.to_string(),
            Multiplier::Number(v) => format_coord(*v),
            Multiplier::Text(s) => s.trim().to_string(),
        }
    }
}

/// Per-object settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSettings {
    /// Mesh file name inside the input directory, e.g. `1.stl`.
    pub file: String,
    /// Extrusion multiplier for this object.
    pub extrusion_multiplier: Multiplier,
}

/// Everything a batch run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    /// Directory holding the numbered STL files.
    pub input_dir: PathBuf,
    /// Directory receiving G-code and the scratch config.
    pub output_dir: PathBuf,
    /// Slicer config template, copied for every object.
    pub template: PathBuf,
    /// Height the anchor object's lowest point is moved to (mm).
    pub base_height: f64,
    /// Bed point the anchor object is centered on.
    pub bed: BedCenter,
    /// External slicer.
    pub slicer: SlicerSettings,
    /// Per-object settings.
    pub objects: Vec<ObjectSettings>,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./input"),
            output_dir: PathBuf::from("./temp"),
            template: PathBuf::from("./prusa_config_file/default_config.ini"),
            base_height: 0.0,
            bed: BedCenter::default(),
            slicer: SlicerSettings::default(),
            objects: Vec::new(),
        }
    }
}

impl JobSettings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.base_height.is_finite() {
            return Err(StackError::InvalidSettings(
                "base_height must be finite".into(),
            ));
        }
        if !self.bed.center_x.is_finite() || !self.bed.center_y.is_finite() {
            return Err(StackError::InvalidSettings(
                "bed center must be finite".into(),
            ));
        }
        if self.slicer.program.as_os_str().is_empty() {
            return Err(StackError::InvalidSettings(
                "slicer program must not be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for object in &self.objects {
            if !seen.insert(object.file.as_str()) {
                return Err(StackError::InvalidSettings(format!(
                    "duplicate settings for {}",
                    object.file
                )));
            }
            if object.extrusion_multiplier.as_config_value().is_empty() {
                return Err(StackError::InvalidSettings(format!(
                    "empty extrusion multiplier for {}",
                    object.file
                )));
            }
        }
        Ok(())
    }

    /// Extrusion multiplier per file name.
    pub fn multipliers(&self) -> HashMap<String, String> {
        self.objects
            .iter()
            .map(|o| (o.file.clone(), o.extrusion_multiplier.as_config_value()))
            .collect()
    }
}
