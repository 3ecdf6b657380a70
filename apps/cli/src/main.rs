#![deny(warnings)]

//! Headless CLI: load config, packs and saves, run the store for a number
//! of days and print the resulting KPIs.

use anyhow::{Context, Result};
use modkit::{ModEngine, ScriptHost};
use persistence::{load_preferences, load_save, save_preferences, write_save, PREFS_FILE, SAVE_FILE};
use sim_core::{Catalog, SimConfig};
use sim_runtime::{KpiSnapshot, Simulation};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    days: Option<u32>,
    seed: Option<u64>,
    config: Option<PathBuf>,
    mods: Option<PathBuf>,
    save: Option<PathBuf>,
    prefs: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--days" => args.days = it.next().and_then(|s| s.parse().ok()),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--config" => args.config = it.next().map(PathBuf::from),
            "--mods" => args.mods = it.next().map(PathBuf::from),
            "--save" => args.save = it.next().map(PathBuf::from),
            "--prefs" => args.prefs = it.next().map(PathBuf::from),
            "--json" => args.json = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_catalog(mods: Option<&Path>) -> Result<Catalog> {
    let Some(root) = mods else {
        return Ok(Catalog::builtin());
    };
    let mut engine = ModEngine::new(root);
    let n = engine.load_all()?;
    info!(packs = n, root = %root.display(), "content packs loaded");
    Ok(engine.merged_catalog()?)
}

fn print_kpis(snap: &KpiSnapshot) {
    println!(
        "Day {} ({}) | cash: ${} | net worth: ${} | properties: {} | reputation: {:.1}",
        snap.day, snap.date, snap.cash, snap.net_worth, snap.properties_owned, snap.reputation
    );
    println!(
        "KPI | sales: {} | walkouts: {} | conversion: {:.1}% | revenue: ${} | staff: {} | payroll: ${}/mo (missed {}) | demand: {:.2}",
        snap.sales,
        snap.walkouts,
        snap.conversion_rate() * 100.0,
        snap.revenue,
        snap.employees,
        snap.monthly_payroll,
        snap.payroll_missed,
        snap.market_demand
    );
    println!(
        "Progress | season: {:?} tier {} | achievements: {} | aspirations: {} | prestige: {} | events: [{}]",
        snap.season,
        snap.season_tier,
        snap.achievements_unlocked,
        snap.aspirations_completed,
        snap.prestige_level,
        snap.active_events.join(", ")
    );
    println!(
        "Life | energy: {:.0}{} | networking: {:.2} | premium: {} | staff efficiency: {:.2}",
        snap.energy,
        if snap.needs_critical { " (critical)" } else { "" },
        snap.networking_bonus,
        snap.premium_currency,
        snap.staff_efficiency
    );
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        ?args,
        "starting market hustle"
    );

    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        cfg.rng_seed = seed;
    }
    let catalog = load_catalog(args.mods.as_deref())?;
    let prefs_path = args.prefs.unwrap_or_else(|| PathBuf::from(PREFS_FILE));
    let save_path = args.save.unwrap_or_else(|| PathBuf::from(SAVE_FILE));
    let prefs = load_preferences(&prefs_path)?;

    let mut sim = Simulation::new(cfg, catalog, prefs)?;
    if args.mods.is_some() {
        sim.set_predicate_host(Box::new(ScriptHost::new()));
    }
    if let Some(save) = load_save(&save_path)? {
        sim.restore_save(&save);
    }

    let days = sim.run_days(args.days.unwrap_or(30));
    for note in sim.drain_notifications() {
        tracing::debug!(?note, "notification");
    }
    info!(days, "run complete");

    write_save(&save_path, &sim.capture_save())?;
    save_preferences(&prefs_path, sim.preferences())?;

    let snap = sim.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        print_kpis(&snap);
    }
    Ok(())
}
