// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! discretesurf CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use discretesurf::assembly::build_curve;
use discretesurf::cli::Reporter;
use discretesurf::geometry::CurveConnectivity;
use discretesurf::io::{projection_records, read_points, write_projection};
use discretesurf::{
    assemble, sort_connectivity, BvhBackend, Curve, JsonMeshReader, MeshReader, Section,
    SerialCommunicator, ShiftCriterion, SurfConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "discretesurf")]
#[command(about = "Project points onto discrete surfaces and curves", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./discretesurf.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sections of a mesh file
    Sections {
        /// Mesh file (JSON)
        mesh: PathBuf,
    },

    /// Project points onto the selected surfaces and every curve
    Project {
        /// Mesh file (JSON)
        mesh: PathBuf,

        /// Query points, a JSON array of [x, y, z]
        #[arg(short, long)]
        points: PathBuf,

        /// Surface sections to merge (all surfaces when omitted)
        #[arg(short, long, value_delimiter = ',')]
        select: Vec<String>,

        /// Write results as JSON instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a curve's element sequence after reorientation
    Reorder {
        /// Mesh file (JSON)
        mesh: PathBuf,

        /// Curve section name
        #[arg(long)]
        curve: String,

        /// Start the curve at this extremum (maxX, minY, ...)
        #[arg(long)]
        criterion: Option<ShiftCriterion>,

        /// Reverse the traversal direction first
        #[arg(long)]
        flip: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        Reporter::report_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SurfConfig::from_file(path)?,
        None => SurfConfig::load()?,
    };
    config.verbose |= cli.verbose;

    let default_filter = if config.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Sections { mesh } => sections_command(&mesh, &config),
        Commands::Project {
            mesh,
            points,
            select,
            output,
        } => project_command(&mesh, &points, select, output.as_deref(), &config),
        Commands::Reorder {
            mesh,
            curve,
            criterion,
            flip,
        } => reorder_command(&mesh, &curve, criterion, flip, &config),
        Commands::Version => {
            println!("discretesurf v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn sections_command(mesh: &Path, config: &SurfConfig) -> Result<()> {
    let sections = JsonMeshReader.read(mesh)?.into_sections(config)?;
    Reporter::report_sections(&mesh.display().to_string(), &sections);

    let mut curves: Vec<(&str, Curve)> = Vec::new();
    let mut warnings = Vec::new();
    for (name, section) in sections.iter() {
        if let Section::Curve(section) = section {
            let (curve, warning) = build_curve(sections.coords.clone(), name, section);
            warnings.extend(warning);
            curves.push((name, curve));
        }
    }

    if !curves.is_empty() {
        Reporter::report_curves(curves.iter().map(|(name, curve)| (*name, curve)));
    }
    Reporter::report_warnings(&warnings);
    Ok(())
}

fn project_command(
    mesh: &Path,
    points: &Path,
    select: Vec<String>,
    output: Option<&Path>,
    config: &SurfConfig,
) -> Result<()> {
    let sections = JsonMeshReader.read(mesh)?.into_sections(config)?;
    let selection = if select.is_empty() {
        sections
            .surface_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        select
    };

    let backend = Arc::new(BvhBackend::with_leaf_size(config.leaf_size));
    let geometry = assemble(&sections, selection.as_slice(), backend, &SerialCommunicator, config)
        .with_context(|| format!("Failed to assemble {}", mesh.display()))?;
    Reporter::report_warnings(&geometry.warnings);

    let query = read_points(points)?;
    let start = Instant::now();
    let acc = geometry.project(&query, &SerialCommunicator, config)?;
    let elapsed = start.elapsed();

    match output {
        Some(path) => {
            write_projection(path, &query, &acc)?;
            Reporter::success(&format!(
                "Wrote {} projections to {}",
                query.len(),
                path.display()
            ));
        }
        None => Reporter::report_projection(&projection_records(&query, &acc), elapsed),
    }
    Ok(())
}

fn reorder_command(
    mesh: &Path,
    name: &str,
    criterion: Option<ShiftCriterion>,
    flip: bool,
    config: &SurfConfig,
) -> Result<()> {
    let sections = JsonMeshReader.read(mesh)?.into_sections(config)?;
    let name = config.normalize_name(name);

    let section = sections
        .curve(&name)
        .with_context(|| format!("Cannot reorder {} in {}", name, mesh.display()))?;

    let topology = sort_connectivity(&section.elements)
        .with_context(|| format!("Curve {} cannot be reordered", name))?;
    let mut curve = Curve::new(Arc::clone(&sections.coords), CurveConnectivity::Sorted(topology));

    if flip {
        curve.flip();
    }
    if let Some(criterion) = criterion {
        curve.shift_start(criterion)?;
        Reporter::report_info(&format!("Start shifted to {}", criterion));
    }

    Reporter::report_elements(&name, curve.elements());
    Ok(())
}
