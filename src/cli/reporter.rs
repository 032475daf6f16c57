// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use colored::*;
use std::time::Duration;

use crate::assembly::{AssemblyWarning, MeshSections, Section};
use crate::geometry::{Curve, LineElement};
use crate::io::ProjectionRecord;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// List the sections of a mesh
    pub fn report_sections(file: &str, sections: &MeshSections) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Mesh:".bold(), file.cyan());
        println!(
            "  {} {}",
            "Nodes:".bright_black(),
            sections.coords.len().to_string().cyan()
        );
        println!("{}", "━".repeat(80).bright_black());

        for (name, section) in sections.iter() {
            match section {
                Section::Surface(surface) => println!(
                    "  {:<10} {:<30} {} trias, {} quads",
                    "surface".green(),
                    name,
                    surface.mesh.tria_count(),
                    surface.mesh.quad_count()
                ),
                Section::Curve(curve) => println!(
                    "  {:<10} {:<30} {} bars",
                    "curve".blue(),
                    name,
                    curve.elements.len()
                ),
            }
        }
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Sort status of every assembled curve
    pub fn report_curves<'a>(curves: impl IntoIterator<Item = (&'a str, &'a Curve)>) {
        println!("\n{}", "Curves:".bold());
        for (name, curve) in curves {
            let status = match curve.closure() {
                Some(closure) => format!("{:?}", closure).to_lowercase().green(),
                None => "unsorted".red(),
            };
            println!(
                "  {} {:<30} {} ({} elements)",
                "•".bright_black(),
                name,
                status,
                curve.len()
            );
        }
    }

    pub fn report_warnings(warnings: &[AssemblyWarning]) {
        for warning in warnings {
            Self::report_warning(&warning.to_string());
        }
    }

    /// Table of projection results
    pub fn report_projection(records: &[ProjectionRecord], duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{}", "Projection:".bold());
        println!("{}", "━".repeat(80).bright_black());

        for (i, record) in records.iter().enumerate() {
            if record.projected {
                println!(
                    "  {:>4} {} -> {} {} {}",
                    i,
                    Self::format_point(&record.query).bright_black(),
                    Self::format_point(&record.point).cyan(),
                    format!("d={:.6}", record.distance2.sqrt()).yellow(),
                    Self::format_point(&record.auxiliary).bright_black()
                );
            } else {
                println!(
                    "  {:>4} {} -> {}",
                    i,
                    Self::format_point(&record.query).bright_black(),
                    "not projected".red()
                );
            }
        }

        let projected = records.iter().filter(|r| r.projected).count();
        println!(
            "\n  {} {}/{}  {} {}",
            "Projected:".bright_black(),
            projected.to_string().cyan(),
            records.len(),
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Element sequence of a curve, printed with 1-based node numbers
    pub fn report_elements(name: &str, elements: &[LineElement]) {
        println!("{} {}", "Curve:".bold(), name.cyan());
        for element in elements {
            println!("  {:>6} {:>6}", element.first() + 1, element.second() + 1);
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    fn format_point(p: &[f64; 3]) -> String {
        format!("({:.4}, {:.4}, {:.4})", p[0], p[1], p[2])
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }
}
