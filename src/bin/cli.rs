//! Command-line front-end over the core solver: loads a JSON interaction
//! table, optionally narrows it to a subset of gyms, runs the requested
//! cover driver, and prints the solution set as a table.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::Parser;
use dancing_cover::{CoverError, CoverageLinks, CoverageMode, RankedSet, TypeEncoding};
use thiserror::Error;

use dancing_cover::formats::{self, FormatError};

const DEFENSE_DEPTH: i64 = 6;
const ATTACK_DEPTH: i64 = 24;

/// Errors surfaced by the CLI binary; any variant maps `main` to exit code 1.
#[derive(Debug, Error)]
enum CliError {
    /// Malformed or out-of-order argument sequence.
    #[error("{0}")]
    Usage(String),
    /// A file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A JSON/region file could not be parsed.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A core solver operation failed.
    #[error(transparent)]
    Cover(#[from] CoverError),
}

/// Which cover question to answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Algorithm {
    Exact,
    Overlapping,
}

/// Whether output uses ANSI color codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Palette {
    Color,
    Plain,
}

/// The fully classified request, built from the free-order token list.
#[derive(Debug, Default)]
struct Request {
    interaction_path: Option<PathBuf>,
    selected_gyms: BTreeSet<String>,
    mode: Option<CoverageMode>,
    algorithm: Option<Algorithm>,
    palette: Option<Palette>,
    help: bool,
}

#[derive(Parser, Debug)]
#[command(name = "dancing-cover-cli", about = "Dancing Links type-cover solver")]
struct Cli {
    /// JSON all-maps file resolving gym selectors to attack/defense type sets.
    #[arg(long = "gyms", value_name = "PATH")]
    gyms: Option<PathBuf>,

    /// Free-order tokens: a path (containing '/') to a JSON interaction
    /// file, gym selectors (`G1`…`Gn`, `E4`), `A`/`D`, `E`/`O`,
    /// `color`/`plain`, or `h` for help.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

/// Classifies a free-order token list into a [`Request`]. Unrecognized
/// tokens are reported by name so the caller can produce a usage error.
fn classify_tokens(tokens: &[String]) -> Result<Request, CliError> {
    let mut request = Request::default();

    for token in tokens {
        if token.contains('/') {
            if request.interaction_path.is_some() {
                return Err(CliError::Usage(
                    "cannot load multiple interaction files; specify one path".to_string(),
                ));
            }
            request.interaction_path = Some(PathBuf::from(token));
        } else if token.starts_with('G') || token == "E4" {
            request.selected_gyms.insert(token.clone());
        } else if token == "A" {
            request.mode = Some(CoverageMode::Attack);
        } else if token == "D" {
            request.mode = Some(CoverageMode::Defense);
        } else if token == "E" {
            request.algorithm = Some(Algorithm::Exact);
        } else if token == "O" {
            request.algorithm = Some(Algorithm::Overlapping);
        } else if token == "color" {
            request.palette = Some(Palette::Color);
        } else if token == "plain" {
            request.palette = Some(Palette::Plain);
        } else if token == "h" {
            request.help = true;
        } else {
            return Err(CliError::Usage(format!("unknown argument: {token}")));
        }
    }

    Ok(request)
}

fn map_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// What a classified, non-help request resolves to: either the search
/// outcome or a request to print the usage message.
enum Outcome {
    Help,
    Solved {
        solutions: BTreeSet<RankedSet<TypeEncoding>>,
        hit_limit: bool,
        palette: Palette,
    },
}

/// Loads the interaction (and, if requested, gym) files named by `cli`'s
/// tokens and runs the requested search. Split out from [`run`] so it can
/// be exercised directly in tests without spawning the binary or capturing
/// stdout.
fn execute(cli: &Cli) -> Result<Outcome, CliError> {
    let request = classify_tokens(&cli.tokens)?;

    if request.help {
        return Ok(Outcome::Help);
    }

    if !request.selected_gyms.is_empty() && cli.gyms.is_none() {
        return Err(CliError::Usage(
            "gym selector given without a --gyms <path> file".to_string(),
        ));
    }

    let Some(interaction_path) = request.interaction_path.as_ref() else {
        return Err(CliError::Usage(
            "no interaction file given; pass a path containing '/'".to_string(),
        ));
    };

    let mode = request.mode.unwrap_or(CoverageMode::Defense);
    let algorithm = request.algorithm.unwrap_or(Algorithm::Exact);
    let palette = request.palette.unwrap_or(Palette::Color);

    tracing::info!(path = %interaction_path.display(), ?mode, ?algorithm, "loading interaction file");

    let source = std::fs::read_to_string(interaction_path)?;
    let interactions = formats::parse_interaction_json(&source)?;

    let mut links = CoverageLinks::build(&interactions, mode);

    if !request.selected_gyms.is_empty() {
        let gyms_path = cli.gyms.as_ref().expect("checked above");
        let gyms_source = std::fs::read_to_string(gyms_path)?;
        let region = map_name(interaction_path);
        let subset = match mode {
            CoverageMode::Attack => {
                formats::gym_defense_types(&gyms_source, &region, &request.selected_gyms)?
            }
            CoverageMode::Defense => {
                formats::gym_attack_types(&gyms_source, &region, &request.selected_gyms)?
            }
        };
        links.hide_all_items_except(&subset);
    }

    tracing::info!(items = links.num_items(), options = links.num_options(), "prepared matrix");

    let depth = if mode == CoverageMode::Attack {
        ATTACK_DEPTH
    } else {
        DEFENSE_DEPTH
    };
    let (solutions, hit_limit) = match algorithm {
        Algorithm::Exact => links.exact_coverages(depth),
        Algorithm::Overlapping => links.overlapping_coverages(depth),
    };

    if hit_limit {
        tracing::warn!(cap = links.max_output(), "solution cap reached; output truncated");
    }
    tracing::info!(solutions = solutions.len(), hit_limit, "search finished");

    Ok(Outcome::Solved {
        solutions,
        hit_limit,
        palette,
    })
}

fn run(cli: Cli) -> Result<(), CliError> {
    match execute(&cli)? {
        Outcome::Help => print_help(),
        Outcome::Solved {
            solutions,
            palette,
            ..
        } => print_table(&solutions, palette),
    }
    Ok(())
}

fn print_help() {
    println!("dancing-cover-cli [--gyms PATH] TOKENS...");
    println!();
    println!("Tokens (any order):");
    println!("  PATH        a path (containing '/') to a JSON type-interaction file");
    println!("  G1..Gn, E4  select a gym (requires --gyms PATH)");
    println!("  A | D       attack or defense coverage (default: D)");
    println!("  E | O       exact or overlapping cover (default: E)");
    println!("  color|plain table output style (default: color)");
    println!("  h           print this message");
}

fn print_table(solutions: &BTreeSet<RankedSet<TypeEncoding>>, palette: Palette) {
    if solutions.is_empty() {
        println!("No solutions found.");
        return;
    }
    for set in solutions {
        let members: Vec<String> = set.iter().map(TypeEncoding::to_string).collect();
        match palette {
            Palette::Color => println!("{:>4}  {}", set.rank(), colorize(&members)),
            Palette::Plain => println!("{:>4}  {}", set.rank(), members.join(", ")),
        }
    }
}

fn colorize(members: &[String]) -> String {
    members
        .iter()
        .map(|m| format!("\x1b[1m{m}\x1b[0m"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
    Ok(())
}
