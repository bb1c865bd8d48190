use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ripple_config::{json_schema, load_for_workspace, RippleConfig};
use ripple_core::{CancellationToken, MethodRef, SearchMatch};
use ripple_index::TypeUniverse;
use ripple_refactor::{RippleMethodFinder, RippleOptions, RippleStats};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ripple",
    version,
    about = "Find every method declaration that must change together with a given one"
)]
struct Cli {
    /// Path to a `ripple.toml` (defaults to discovery in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the ripple set of a method in a type universe
    Methods(MethodsArgs),
    /// Print the JSON schema of `ripple.toml`
    ConfigSchema,
}

#[derive(Args)]
struct MethodsArgs {
    /// JSON file describing the type universe
    universe: PathBuf,
    /// Seed method, `pkg.Type#name(ParamType, ...)`
    method: String,
    /// Only search the compilation unit declaring the seed
    #[arg(long)]
    single_file: bool,
    /// Keep declarations from compiled code in the ripple set
    #[arg(long, conflicts_with = "binary_refs")]
    include_binaries: bool,
    /// Report declarations from compiled code separately instead of dropping them
    #[arg(long)]
    binary_refs: bool,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn load_config(explicit: Option<&PathBuf>) -> Result<RippleConfig> {
    match explicit {
        Some(path) => RippleConfig::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("reading current directory")?;
            let (config, _path) = load_for_workspace(&cwd)?;
            Ok(config)
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Methods(args) => {
            let config = load_config(cli.config.as_ref())?;
            ripple_config::init_tracing(&config.logging);
            methods(&config, &args)?;
            Ok(0)
        }
        Command::ConfigSchema => {
            let out = serde_json::to_string_pretty(&json_schema())?;
            println!("{out}");
            Ok(0)
        }
    }
}

#[derive(Serialize)]
struct MethodsReport {
    seed: String,
    methods: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    binary_matches: Option<Vec<BinaryMatch>>,
    stats: StatsReport,
}

#[derive(Serialize)]
struct BinaryMatch {
    method: String,
    container: String,
}

#[derive(Serialize)]
struct StatsReport {
    candidates: usize,
    partitions: usize,
    marriage_rounds: u32,
    hierarchies_built: usize,
}

impl From<RippleStats> for StatsReport {
    fn from(stats: RippleStats) -> Self {
        Self {
            candidates: stats.candidates,
            partitions: stats.partitions,
            marriage_rounds: stats.marriage_rounds,
            hierarchies_built: stats.hierarchies_built,
        }
    }
}

fn methods(config: &RippleConfig, args: &MethodsArgs) -> Result<()> {
    let universe = TypeUniverse::load_from_path(&args.universe)
        .with_context(|| format!("loading universe {}", args.universe.display()))?;
    tracing::debug!(types = universe.len(), "loaded type universe");

    let reference: MethodRef = args.method.parse()?;
    let seed = universe.resolve(&reference)?;

    let options = RippleOptions {
        exclude_binaries: config.finder.exclude_binaries && !args.include_binaries,
        precheck_ratio: config.finder.precheck_ratio,
        union_strategy: config.finder.union_strategy,
    };

    let mut binary_refs: Vec<SearchMatch> = Vec::new();
    let mut finder = RippleMethodFinder::new(&universe, seed.clone()).with_options(options);
    if args.single_file {
        finder = finder.in_compilation_unit();
    }
    if args.binary_refs {
        finder = finder.with_binary_refs(&mut binary_refs);
    }
    let outcome = finder
        .run(&CancellationToken::new())
        .with_context(|| format!("computing ripple set of {seed}"))?;

    let mut methods: Vec<String> = outcome.methods.iter().map(ToString::to_string).collect();
    methods.sort();
    let binary_matches = args.binary_refs.then(|| {
        let mut matches: Vec<BinaryMatch> = binary_refs
            .iter()
            .map(|found| BinaryMatch {
                method: found.method.to_string(),
                container: found.container.to_string(),
            })
            .collect();
        matches.sort_by(|a, b| a.method.cmp(&b.method));
        matches
    });

    let report = MethodsReport {
        seed: seed.to_string(),
        methods,
        binary_matches,
        stats: outcome.stats.into(),
    };

    if args.json {
        let out = serde_json::to_string_pretty(&report)?;
        println!("{out}");
        return Ok(());
    }

    for method in &report.methods {
        println!("{method}");
    }
    if let Some(matches) = &report.binary_matches {
        if !matches.is_empty() {
            println!("binary:");
            for found in matches {
                println!("  {} ({})", found.method, found.container);
            }
        }
    }
    Ok(())
}
