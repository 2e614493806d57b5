use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use microcosm_core::Simulation;
use microcosm_types::WorldConfig;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "microcosm-cli")]
#[command(about = "Microcosm world simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a world headless and report the final census.
    Run {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 1000)]
        ticks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Log a census line every N ticks; 0 disables the interval log.
        #[arg(long, default_value_t = 100)]
        log_every: u32,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write one tick summary per line as JSONL.
    Export {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 200)]
        ticks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Run the same seed twice and fail if the worlds diverge.
    Verify {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 200)]
        ticks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    ticks: u32,
    seed: u64,
    final_tick: u64,
    herbivores: u32,
    omnivores: u32,
    carnivores: u32,
    plants: u32,
    total_births: u64,
    total_deaths: u64,
    average_energy: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "microcosm_cli=info".to_owned()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            seed,
            log_every,
            format,
            out,
        } => run_command(config, ticks, seed, log_every, format, out),
        Commands::Export {
            config,
            ticks,
            seed,
            out,
        } => export_command(config, ticks, seed, out),
        Commands::Verify {
            config,
            ticks,
            seed,
        } => verify_command(config, ticks, seed),
    }
}

fn run_command(
    config_path: Option<PathBuf>,
    ticks: u32,
    seed: u64,
    log_every: u32,
    format: OutputFormat,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut sim = Simulation::new(config, seed)?;

    for i in 0..ticks {
        let summary = sim.tick();
        if log_every != 0 && (i + 1) % log_every == 0 {
            info!(
                tick = summary.tick,
                herbivores = summary.herbivores,
                omnivores = summary.omnivores,
                carnivores = summary.carnivores,
                plants = summary.plants,
                births = summary.births,
                deaths = summary.deaths,
                "census"
            );
        }
    }

    let census = sim.census();
    let metrics = sim.metrics();
    let summary = RunSummary {
        ticks,
        seed,
        final_tick: sim.turn(),
        herbivores: census.herbivores,
        omnivores: census.omnivores,
        carnivores: census.carnivores,
        plants: census.plants,
        total_births: metrics.total_births,
        total_deaths: metrics.total_deaths,
        average_energy: census.average_energy,
    };

    match format {
        OutputFormat::Pretty => {
            let text = format!(
                "ticks={} seed={} final_tick={} herbivores={} omnivores={} carnivores={} plants={} total_births={} total_deaths={} average_energy={:.1}",
                summary.ticks,
                summary.seed,
                summary.final_tick,
                summary.herbivores,
                summary.omnivores,
                summary.carnivores,
                summary.plants,
                summary.total_births,
                summary.total_deaths,
                summary.average_energy
            );
            write_output(text, out)?;
        }
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(&summary)?;
            write_output(text, out)?;
        }
    }

    Ok(())
}

fn export_command(config_path: Option<PathBuf>, ticks: u32, seed: u64, out: PathBuf) -> Result<()> {
    let config = load_config(config_path)?;
    let mut sim = Simulation::new(config, seed)?;
    let lines = sim.export_trace_jsonl(ticks);
    write_output(lines.join("\n"), Some(out))?;
    Ok(())
}

fn verify_command(config_path: Option<PathBuf>, ticks: u32, seed: u64) -> Result<()> {
    let config = load_config(config_path)?;
    let mut first = Simulation::new(config.clone(), seed)?;
    let mut second = Simulation::new(config, seed)?;
    first.step_n(ticks);
    second.step_n(ticks);

    if first.snapshot() != second.snapshot() {
        bail!("replay diverged after {ticks} ticks with seed {seed}");
    }
    println!("deterministic: seed {seed} replayed {ticks} ticks bit-identically");
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<WorldConfig> {
    if let Some(path) = path {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: WorldConfig = toml::from_str(&raw)
            .with_context(|| format!("failed to parse TOML config {}", path.display()))?;
        Ok(config)
    } else {
        Ok(WorldConfig::default())
    }
}

fn write_output(text: String, out: Option<PathBuf>) -> Result<()> {
    if let Some(path) = out {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating output directory {}", parent.display())
            })?;
        }
        fs::write(&path, text).with_context(|| format!("failed writing {}", path.display()))?;
        println!("wrote output to {}", path.display());
    } else {
        println!("{text}");
    }
    Ok(())
}
