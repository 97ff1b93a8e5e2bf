//! Command-line front end: read a puzzle file, solve it, print the result.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use flowsat::{BridgeRule, EncoderConfig, Grid, Outcome, VarisatBackend};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "solver")]
#[command(version, about = "Solve Flow Free puzzles by reduction to SAT", long_about = None)]
struct Cli {
    /// Puzzle file: one row per line, `*` for an empty cell, `+` for a bridge, any other character for an endpoint
    puzzle: PathBuf,

    /// Number of colors the puzzle is expected to contain
    #[arg(short = 'k', long)]
    colors: Option<usize>,

    /// Require paths to cross bridges in straight lines
    #[arg(long)]
    straight_bridges: bool,

    /// Also write the CNF instance to this file in DIMACS format
    #[arg(long)]
    dimacs: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let text = fs::read_to_string(&cli.puzzle)
        .with_context(|| format!("failed to read {}", cli.puzzle.display()))?;
    let grid = match cli.colors {
        Some(colors) => Grid::parse_with_colors(&text, colors),
        None => Grid::parse(&text),
    }.with_context(|| format!("failed to parse {}", cli.puzzle.display()))?;

    tracing::info!(rows = grid.rows(), cols = grid.cols(), colors = grid.num_colors(), "loaded puzzle");

    let config = EncoderConfig {
        bridge_rule: if cli.straight_bridges { BridgeRule::Straight } else { BridgeRule::Loose },
    };

    if let Some(path) = &cli.dimacs {
        let file = fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        grid.encode(config).write_dimacs(&mut writer)?;
        writer.flush()?;
    }

    match grid.solve_with(config, &mut VarisatBackend)? {
        Outcome::Solved(solved) => {
            print!("{solved}");
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Unsatisfiable => {
            eprintln!("no solution");
            Ok(ExitCode::FAILURE)
        }
    }
}
