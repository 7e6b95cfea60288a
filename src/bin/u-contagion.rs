//! Command-line front end: load a dataset, search for isolations, print
//! every improvement.

use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use u_contagion::epidemic::{greedy, Isolations, Population};
use u_contagion::ga::{Evolution, IsolationConfig, Progress, SeededPolicy};

#[derive(Parser, Debug)]
#[command(name = "u-contagion")]
#[command(version)]
#[command(about = "Find contact isolations that keep a threshold epidemic under half the population")]
struct Args {
    /// Path to the dataset to run
    #[arg(short, long)]
    dataset: PathBuf,

    /// Infected neighbors needed to infect a person
    #[arg(short, long, default_value_t = 5)]
    virality: usize,

    /// What to print on each improvement
    #[arg(long, value_enum, default_value_t = Display::Cost)]
    display: Display,

    /// Run the single-pass greedy baseline instead of the genetic search
    #[arg(long)]
    greedy: bool,

    /// Stop after this many milliseconds
    #[arg(short, long)]
    time_limit: Option<u64>,

    /// Stop after this many generations
    #[arg(short = 'g', long)]
    max_generations: Option<usize>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Live chromosomes kept after each generation
    #[arg(long, default_value_t = 10)]
    target_population: usize,

    /// Evaluate and breed on a single thread
    #[arg(long)]
    sequential: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Display {
    /// Only the cost
    Cost,
    /// Cost and elapsed time
    Timestamp,
    /// Every isolated relation, one per line, then a blank line
    Solutions,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level)
        .with_context(|| format!("invalid log level '{}'", args.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let population = Population::from_file(&args.dataset)
        .with_context(|| format!("failed to load dataset '{}'", args.dataset.display()))?;
    info!(
        persons = population.size(),
        relations = population.relations().len(),
        infected = population.infected().len(),
        "dataset loaded"
    );

    if args.greedy {
        return run_greedy(&population, &args);
    }
    run_evolution(&population, &args)
}

fn run_greedy(population: &Population, args: &Args) -> Result<()> {
    let isolations = greedy::isolate_infected(population, args.virality);
    let infected = population.run(args.virality, &isolations);
    info!(cost = isolations.len(), infected, "greedy baseline done");
    if infected > u_contagion::ga::EPIDEMIC_LIMIT_PERCENT {
        warn!(infected, "greedy isolations do not contain the epidemic");
    }

    let mut out = io::stdout().lock();
    match args.display {
        Display::Solutions => write_isolations(&mut out, &isolations)?,
        _ => writeln!(out, "{}", isolations.len())?,
    }
    Ok(())
}

fn run_evolution(population: &Population, args: &Args) -> Result<()> {
    let mut config = IsolationConfig::default()
        .with_virality(args.virality)
        .with_target_population(args.target_population)
        .with_parallel(!args.sequential);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(n) = args.max_generations {
        config = config.with_max_generations(n);
    }

    let mut evolution = Evolution::new(population, SeededPolicy::new(config))
        .context("failed to start the genetic search")?;

    // The watchdog drives the stop token; the driver notices it at the next
    // generation boundary.
    if let Some(ms) = args.time_limit {
        let handle = evolution.stop_handle();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(ms));
            handle.stop();
        });
    }

    let display = args.display;
    let mut out = io::stdout().lock();
    let mut write_error = None;
    let summary = evolution.run(|progress| {
        if write_error.is_none() {
            if let Err(e) = write_progress(&mut out, display, progress) {
                write_error = Some(e);
            }
        }
    })?;
    if let Some(e) = write_error {
        return Err(e).context("failed to write progress");
    }

    match &summary.best {
        Some(best) => info!(
            cost = best.cost,
            generations = summary.generations,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "search finished"
        ),
        None => warn!(
            generations = summary.generations,
            "no isolation set containing the epidemic was found"
        ),
    }
    Ok(())
}

fn write_progress(out: &mut impl Write, display: Display, progress: &Progress<'_>) -> io::Result<()> {
    match display {
        Display::Cost => writeln!(out, "{}", progress.solution.cost)?,
        Display::Timestamp => writeln!(
            out,
            "{} {:.3}",
            progress.solution.cost,
            progress.elapsed.as_secs_f64()
        )?,
        Display::Solutions => write_isolations(out, &progress.solution.isolations)?,
    }
    out.flush()
}

fn write_isolations(out: &mut impl Write, isolations: &Isolations) -> io::Result<()> {
    for relation in isolations {
        writeln!(out, "{relation}")?;
    }
    writeln!(out)
}
