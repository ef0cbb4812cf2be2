//! Two-phase run over one input file: evaluate the root, then solve the
//! unknown that makes both sides of the root equal.
use crate::compute::{ComputationError, Evaluator};
use crate::display::format_trace;
use crate::parse::{load, LoadError};
use crate::solver::solve_equality;
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_ROOT: &str = "root";
pub const DEFAULT_UNKNOWN: &str = "humn";

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Cannot read '{}': {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub root: String,
    pub unknown: String,
    /// Attach derivation traces for both phases to the report.
    pub trace: bool,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            root: DEFAULT_ROOT.to_string(),
            unknown: DEFAULT_UNKNOWN.to_string(),
            trace: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timings {
    pub parse_us: u64,
    pub evaluate_us: u64,
    pub solve_us: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub root: String,
    pub root_value: String,
    pub unknown: String,
    pub unknown_value: String,
    pub timings: Timings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_trace: Option<String>,
}

impl Report {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "part1: {}={}", self.root, self.root_value);
        let _ = writeln!(out, "parsing input took: {}µs", self.timings.parse_us);
        let _ = writeln!(out, "solving sheet took: {}µs", self.timings.evaluate_us);
        let _ = writeln!(out, "part2: {}={}", self.unknown, self.unknown_value);
        let _ = writeln!(out, "solving part2 took: {}µs", self.timings.solve_us);
        for trace in [&self.root_trace, &self.unknown_trace].into_iter().flatten() {
            let _ = write!(out, "\n{}", trace);
        }
        out
    }
}

/// Reads `config.input` and runs both phases.
pub fn run(config: &RunConfig) -> Result<Report, DriverError> {
    let text = std::fs::read_to_string(&config.input)
        .map_err(|source| DriverError::Io { path: config.input.clone(), source })?;
    run_text(&text, config)
}

/// Runs both phases on already-read input text.
pub fn run_text(text: &str, config: &RunConfig) -> Result<Report, DriverError> {
    let start = Instant::now();
    let mut graph = load(text)?;
    let parse_us = start.elapsed().as_micros() as u64;
    info!(nodes = graph.count(), parse_us, "graph loaded");

    let start = Instant::now();
    let mut evaluator = Evaluator::new(&graph);
    let root_value = evaluator.evaluate(&config.root)?;
    let evaluate_us = start.elapsed().as_micros() as u64;
    info!(root = %config.root, value = %root_value, evaluate_us, "phase 1 done");

    let root_trace = match (config.trace, graph.lookup(&config.root)) {
        (true, Some(id)) => Some(format_trace(&graph, evaluator.ledger(), id)),
        _ => None,
    };

    let start = Instant::now();
    let solved = solve_equality(&mut graph, &config.root, &config.unknown)?;
    let solve_us = start.elapsed().as_micros() as u64;
    info!(unknown = %config.unknown, value = %solved.value, solve_us, "phase 2 done");

    let unknown_trace = config.trace.then(|| format_trace(&graph, &solved.ledger, solved.unknown));

    Ok(Report {
        root: config.root.clone(),
        root_value: root_value.to_string(),
        unknown: config.unknown.clone(),
        unknown_value: solved.value.to_string(),
        timings: Timings { parse_us, evaluate_us, solve_us },
        root_trace,
        unknown_trace,
    })
}
