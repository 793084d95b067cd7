// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod record;
pub mod types;

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{ProjectConfig, default_config_path, find_tasks_dir, load_or_default};
use crate::dag::{BuildReport, GraphMutator, TaskGraph, build_dag, compute_levels, find_cycles};
use crate::fs::RealFileSystem;
use crate::record::RecordStore;
use crate::types::{ConnectOutcome, GraphEvent, NodeKey};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and tasks-directory discovery
/// - the record store
/// - graph build / mutation for the chosen subcommand
///
/// Graph work is blocking file I/O, so it runs on the blocking pool.
pub async fn run(args: CliArgs) -> Result<()> {
    let explicit_config = args.config.is_some();
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_or_default(&RealFileSystem, &config_path, explicit_config)
        .with_context(|| format!("loading config from {:?}", config_path))?;

    let tasks_dir = find_tasks_dir(&RealFileSystem, &cfg, args.tasks_dir.as_deref())?;
    info!(dir = ?tasks_dir, "using tasks directory");

    match args.command {
        Command::Show => {
            let (graph, _report) = build_blocking(tasks_dir, cfg).await?;
            print!("{}", render_levels(&graph));
            Ok(())
        }
        Command::Check => {
            let (graph, report) = build_blocking(tasks_dir, cfg).await?;
            let cycles = find_cycles(&graph);
            print!("{}", render_check(&report, &cycles));
            if cycles.is_empty() {
                Ok(())
            } else {
                Err(anyhow!("task graph contains {} cycle(s)", cycles.len()))
            }
        }
        Command::Connect { parent, child } => connect(tasks_dir, cfg, parent, child).await,
    }
}

fn open_store(tasks_dir: PathBuf, cfg: &ProjectConfig) -> RecordStore {
    RecordStore::open(tasks_dir).with_extension(cfg.records.extension.clone())
}

async fn build_blocking(tasks_dir: PathBuf, cfg: ProjectConfig) -> Result<(TaskGraph, BuildReport)> {
    tokio::task::spawn_blocking(move || {
        let store = open_store(tasks_dir, &cfg);
        build_dag(&store, cfg.layering.detect_cycles)
            .with_context(|| format!("loading tasks from {:?}", store.dir()))
    })
    .await?
}

async fn connect(tasks_dir: PathBuf, cfg: ProjectConfig, parent: NodeKey, child: NodeKey) -> Result<()> {
    let (outcome, graph, mut events) = tokio::task::spawn_blocking(move || -> Result<_> {
        let store = open_store(tasks_dir, &cfg);
        let (mut graph, _report) = build_dag(&store, cfg.layering.detect_cycles)?;

        let mut mutator = GraphMutator::new(store);
        let events = mutator.subscribe();
        let outcome = mutator.add_edge(&mut graph, &parent, &child)?;
        compute_levels(&mut graph, cfg.layering.detect_cycles);
        Ok((outcome, graph, events))
    })
    .await??;

    while let Ok(GraphEvent::EdgeAdded { parent, child }) = events.try_recv() {
        let level = graph.get(&child).map(|n| n.level).unwrap_or_default();
        debug!(parent = %parent, child = %child, level, "edge event");
        println!("connected: {child} now depends on {parent} (level {level})");
    }

    if outcome == ConnectOutcome::AlreadyConnected {
        println!("already connected");
    }
    Ok(())
}

/// One block per level: `key  label  <- dep, dep`.
pub fn render_levels(graph: &TaskGraph) -> String {
    let mut out = String::new();
    for (level, nodes) in graph.by_level() {
        let _ = writeln!(out, "level {level}:");
        for node in nodes {
            let _ = write!(out, "  {}  {}", node.key, node.label);
            if !node.resolved_deps.is_empty() {
                let _ = write!(out, "  <- {}", node.resolved_deps.join(", "));
            }
            out.push('\n');
        }
    }
    out
}

/// Human-readable listing of everything [`BuildReport`] and the cycle search found.
pub fn render_check(report: &BuildReport, cycles: &[Vec<NodeKey>]) -> String {
    let mut out = String::new();

    for skipped in &report.load.skipped {
        let _ = writeln!(out, "skipped {:?}: {}", skipped.path, skipped.reason);
    }
    for key in &report.load.duplicate_keys {
        let _ = writeln!(out, "duplicate key '{key}': later record used");
    }
    for u in &report.resolve.unresolved {
        let _ = writeln!(out, "unresolved: '{}' in {}", u.reference, u.node);
    }
    for a in &report.resolve.ambiguous {
        let _ = writeln!(
            out,
            "ambiguous: '{}' in {} matches {}; using {}",
            a.reference,
            a.node,
            a.candidates.join(", "),
            a.chosen
        );
    }
    for cycle in cycles {
        let _ = writeln!(out, "cycle: {}", cycle.join(" -> "));
    }

    if out.is_empty() {
        out.push_str("ok\n");
    }
    out
}
