//! perp-sim: replay a scenario and print one JSON line per step, then a
//! summary of the reserve.

use anyhow::Context;
use clap::Parser;
use perp_sim::{Scenario, Simulation};
use perp_utils::{init_logging, LogFormat};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "perp-sim", about = "Replay a perpetual tranche scenario")]
struct Cli {
    /// Path to the TOML scenario file.
    #[arg(long, env = "PERP_SIM_SCENARIO")]
    scenario: PathBuf,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "warn", env = "PERP_SIM_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON instead of human-readable lines.
    #[arg(long, env = "PERP_SIM_JSON_LOGS")]
    json_logs: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(LogFormat::from_json_flag(cli.json_logs), &cli.log_level)
        .context("failed to install log subscriber")?;

    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("loading {}", cli.scenario.display()))?;
    tracing::info!(
        scenario = %cli.scenario.display(),
        steps = scenario.steps.len(),
        "running scenario"
    );

    let mut sim = Simulation::new(&scenario)?;
    let reports = sim.run(&scenario.steps);
    let rejected = reports
        .iter()
        .filter(|r| matches!(r.outcome, perp_sim::Outcome::Rejected { .. }))
        .count();
    let summary = sim.summary()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for report in &reports {
        write_json(&mut out, report, cli.pretty)?;
    }
    write_json(&mut out, &summary, cli.pretty)?;

    tracing::info!(steps = reports.len(), rejected, "scenario finished");
    Ok(())
}

fn write_json<T: serde::Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
