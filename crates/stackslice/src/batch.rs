//! Batch orchestration: discover, place, patch, slice.
//!
//! Objects are processed one at a time in file order. Each object gets its
//! own scratch copy of the config template inside the output directory; the
//! copy is removed once the slicer returns, whether or not it succeeded.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{info, warn};

use crate::error::{Result, StackError};
use crate::ini::{patch_config, EXTRUSION_MULTIPLIER_KEY, Z_OFFSET_KEY};
use crate::input::discover_meshes;
use crate::mesh::MeshReader;
use crate::placement::{build_metadata, ObjectMetadata};
use crate::settings::JobSettings;
use crate::slicer::{SliceJob, Slicer};

/// Outcome of a completed batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Sliced objects, in processing order.
    pub objects: Vec<ObjectMetadata>,
}

/// Discover meshes and compute their metadata without slicing.
pub fn plan_batch<R>(settings: &JobSettings, reader: &R) -> Result<Vec<ObjectMetadata>>
where
    R: MeshReader + ?Sized,
{
    settings.validate()?;

    let files = discover_meshes(&settings.input_dir)?;
    let paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();

    build_metadata(
        &paths,
        &settings.multipliers(),
        settings.bed,
        settings.base_height,
        reader,
    )
}

/// Run the whole batch.
///
/// Metadata for every object is computed before the first slicer run, so a
/// bad mesh aborts the batch before any G-code is written. After that, the
/// first failing object aborts the run; G-code of earlier objects is kept.
pub fn run_batch<R, S>(settings: &JobSettings, reader: &R, slicer: &S) -> Result<BatchReport>
where
    R: MeshReader + ?Sized,
    S: Slicer + ?Sized,
{
    let metadata = plan_batch(settings, reader)?;
    info!(objects = metadata.len(), "computed placement");
    for meta in &metadata {
        info!(
            file = %meta.source_name,
            center = %meta.center_arg(),
            z_offset = %meta.z_offset_value(),
            extrusion_multiplier = %meta.extrusion_multiplier,
            "object"
        );
    }

    std::fs::create_dir_all(&settings.output_dir)?;

    for (i, meta) in metadata.iter().enumerate() {
        info!(
            "slicing {} ({}/{})",
            meta.source_name,
            i + 1,
            metadata.len()
        );
        slice_object(settings, meta, slicer)?;
    }

    Ok(BatchReport { objects: metadata })
}

/// Patch a scratch config for `meta` and run the slicer on it.
fn slice_object<S>(settings: &JobSettings, meta: &ObjectMetadata, slicer: &S) -> Result<()>
where
    S: Slicer + ?Sized,
{
    let config = scratch_config(&settings.template, &settings.output_dir)?;

    let replacements = BTreeMap::from([
        (Z_OFFSET_KEY.to_string(), meta.z_offset_value()),
        (
            EXTRUSION_MULTIPLIER_KEY.to_string(),
            meta.extrusion_multiplier.clone(),
        ),
    ]);
    patch_config(&config, &replacements)?;

    let job = SliceJob {
        config: config.to_path_buf(),
        center: meta.center_arg(),
        output_dir: settings.output_dir.clone(),
        mesh: settings.input_dir.join(&meta.source_name),
    };
    let result = slicer.slice(&job);

    if let Err(e) = &result {
        warn!(file = %meta.source_name, error = %e, "slicer failed, removing scratch config");
    }
    let path = config.to_path_buf();
    if let Err(e) = config.close() {
        warn!(path = %path.display(), error = %e, "failed to remove scratch config");
    }

    result.map(|_| ())
}

/// Copy `template` to a fresh scratch file in `dir`.
///
/// The returned path is deleted when dropped.
fn scratch_config(template: &Path, dir: &Path) -> Result<TempPath> {
    let scratch = tempfile::Builder::new()
        .prefix("temp_config")
        .suffix(".ini")
        .tempfile_in(dir)
        .map_err(|e| StackError::config_file(dir, e))?
        .into_temp_path();

    std::fs::copy(template, &scratch).map_err(|e| StackError::config_file(template, e))?;
    Ok(scratch)
}
