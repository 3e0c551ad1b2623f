//! stackslice CLI - batch STL to G-code driver
//!
//! Places a numbered stack of STL files on the bed and slices each one with
//! its own patched copy of a slicer config template.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use stackslice::{JobSettings, PrusaSlicer, StlReader};

#[derive(Parser)]
#[command(name = "stackslice")]
#[command(about = "Place a stack of STL files and slice each with its own config", long_about = None)]
struct Cli {
    /// Log debug output (placement deltas, bounding boxes, slicer commands)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute placement for every object and slice them in order
    Run(JobArgs),
    /// Print the computed placement as JSON without slicing
    Plan(JobArgs),
    /// Set KEY = VALUE entries in a slicer config file
    Patch {
        /// Config file to modify
        file: PathBuf,
        /// Replacements, as KEY=VALUE
        #[arg(required = true, value_parser = parse_key_value)]
        entries: Vec<(String, String)>,
        /// Print the patched file instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
struct JobArgs {
    /// Job file (TOML)
    #[arg(short, long)]
    job: Option<PathBuf>,
    /// Directory holding the numbered STL files
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Directory receiving the G-code
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Slicer config template
    #[arg(long)]
    template: Option<PathBuf>,
    /// Height of the first object's lowest point (mm)
    #[arg(long)]
    base_height: Option<f64>,
    /// Slicer executable
    #[arg(long)]
    slicer: Option<PathBuf>,
}

impl JobArgs {
    fn settings(self) -> Result<JobSettings> {
        let mut settings = match &self.job {
            Some(path) => JobSettings::load(path)
                .with_context(|| format!("failed to load job file {}", path.display()))?,
            None => JobSettings::default(),
        };

        if let Some(dir) = self.input_dir {
            settings.input_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            settings.output_dir = dir;
        }
        if let Some(template) = self.template {
            settings.template = template;
        }
        if let Some(height) = self.base_height {
            settings.base_height = height;
        }
        if let Some(program) = self.slicer {
            settings.slicer.program = program;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    match cli.command {
        Commands::Run(args) => run(args.settings()?)?,
        Commands::Plan(args) => plan(args.settings()?)?,
        Commands::Patch {
            file,
            entries,
            dry_run,
        } => patch(&file, entries, dry_run)?,
    }

    Ok(())
}

fn run(settings: JobSettings) -> Result<()> {
    let slicer = PrusaSlicer::from(&settings.slicer);
    let report = stackslice::run_batch(&settings, &StlReader, &slicer)
        .context("batch aborted")?;

    println!(
        "Sliced {} object(s) into {}",
        report.objects.len(),
        settings.output_dir.display()
    );
    Ok(())
}

fn plan(settings: JobSettings) -> Result<()> {
    let metadata = stackslice::plan_batch(&settings, &StlReader)?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

fn patch(file: &PathBuf, entries: Vec<(String, String)>, dry_run: bool) -> Result<()> {
    let replacements: BTreeMap<String, String> = entries.into_iter().collect();

    if dry_run {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        print!("{}", stackslice::patch_str(&text, &replacements).text);
        return Ok(());
    }

    let updated = stackslice::patch_config(file, &replacements)?;
    if updated {
        println!("Updated {}", file.display());
    } else {
        println!("Appended {} key(s) to {}", replacements.len(), file.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("z_offset=0.5").unwrap(),
            ("z_offset".to_string(), "0.5".to_string())
        );
        assert_eq!(
            parse_key_value(" start_gcode = G28 ; home ").unwrap(),
            ("start_gcode".to_string(), "G28 ; home".to_string())
        );
        assert!(parse_key_value("z_offset").is_err());
        assert!(parse_key_value("=1").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let args = JobArgs {
            job: None,
            input_dir: Some("meshes".into()),
            output_dir: None,
            template: None,
            base_height: Some(0.4),
            slicer: Some("/opt/slic3r/slic3r.pl".into()),
        };
        let settings = args.settings().unwrap();
        assert_eq!(settings.input_dir, PathBuf::from("meshes"));
        assert_eq!(settings.output_dir, PathBuf::from("./temp"));
        assert_eq!(settings.base_height, 0.4);
        assert_eq!(settings.slicer.program, PathBuf::from("/opt/slic3r/slic3r.pl"));
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["stackslice", "patch", "a.ini", "z_offset=1", "extrusion_multiplier=1.1"])
            .unwrap();
        match cli.command {
            Commands::Patch { entries, dry_run, .. } => {
                assert_eq!(entries.len(), 2);
                assert!(!dry_run);
            }
            _ => panic!("expected patch"),
        }
    }
}
