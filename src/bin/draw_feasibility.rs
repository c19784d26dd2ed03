use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use wc26_draw::draw::{self, DrawSetup};
use wc26_draw::presets;
use wc26_draw::settings::Settings;
use wc26_draw::state::format_label;

const DEFAULT_RUNS: u64 = 500;
const DEFAULT_SEED: u64 = 2026;

#[derive(Debug, Default, Clone)]
struct RunReport {
    success: bool,
    orderings_tried: usize,
    pots_backtracked: usize,
    violations: Vec<String>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let settings = Settings::from_env();
    let registry = settings.load_registry().context("unable to load nation registry")?;
    let preset_id = parse_str_arg("--preset").unwrap_or_else(|| settings.preset_id.clone());
    let preset =
        presets::find_preset(&preset_id).ok_or_else(|| anyhow!("unknown preset '{preset_id}'"))?;
    let runs = parse_u64_arg("--runs").unwrap_or(DEFAULT_RUNS).clamp(1, 100_000);
    let seed = parse_u64_arg("--seed").unwrap_or(DEFAULT_SEED);

    let setup = preset
        .setup(&registry)
        .with_context(|| format!("preset {} is not drawable", preset.id))?;

    println!(
        "{} ({}): {} teams, {} pots, {} groups, {} runs from seed {}",
        preset.name,
        format_label(setup.format),
        setup.team_count(),
        setup.pots.len(),
        setup.number_of_groups,
        runs,
        seed
    );

    let reports: Vec<RunReport> = (0..runs)
        .into_par_iter()
        .map(|i| run_once(&setup, seed.wrapping_add(i)))
        .collect();

    summarize(&reports);
    Ok(())
}

fn run_once(setup: &DrawSetup, seed: u64) -> RunReport {
    let mut rng = StdRng::seed_from_u64(seed);
    let outcome = setup.run(&mut rng);
    RunReport {
        success: outcome.success,
        orderings_tried: outcome.stats.orderings_tried,
        pots_backtracked: outcome.stats.pots_backtracked,
        violations: draw::constraint_violations(&outcome.groups),
    }
}

fn summarize(reports: &[RunReport]) {
    let total = reports.len().max(1) as f64;
    let ok = reports.iter().filter(|r| r.success).count();
    let orderings: usize = reports.iter().map(|r| r.orderings_tried).sum();
    let backtracks: usize = reports.iter().map(|r| r.pots_backtracked).sum();
    let max_orderings = reports.iter().map(|r| r.orderings_tried).max().unwrap_or(0);

    println!("Success: {ok}/{} ({:.1}%)", reports.len(), ok as f64 * 100.0 / total);
    println!(
        "Orderings per draw: avg {:.2}, max {max_orderings}",
        orderings as f64 / total
    );
    println!("Pot backtracks per draw: avg {:.2}", backtracks as f64 / total);

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for report in reports {
        for violation in &report.violations {
            *counts.entry(violation.as_str()).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        println!("Violations: none");
        return;
    }
    println!("Violations:");
    for (violation, count) in counts {
        println!("  {count:>5}  {violation}");
    }
}

fn parse_str_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && let Ok(v) = raw.trim().parse::<u64>()
        {
            return Some(v);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && let Ok(v) = next.trim().parse::<u64>()
        {
            return Some(v);
        }
    }
    None
}
