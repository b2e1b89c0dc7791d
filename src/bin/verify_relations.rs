use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use authorbase::bases::Workspace;
use authorbase::storage::{hash_path, verify_snapshot, JsonlPaperSource, PaperSource, RelationStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = CliArgs::parse()?;
    let workspace = match &args.home {
        Some(root) => Workspace::open_at(root)?,
        None => Workspace::new()?,
    };
    let store = RelationStore::new(workspace.layout.clone());
    let snapshot = store.load_snapshot()?;
    let papers = match &args.input {
        Some(input) => Some(JsonlPaperSource::new(input).load_papers()?.papers),
        None => None,
    };

    let violations = verify_snapshot(&snapshot, papers.as_deref());
    if violations.is_empty() {
        println!(
            "Relations under {} verified: {} edges, {} profiles, {} metrics rows.",
            workspace.layout.relations_dir.display(),
            snapshot.edges.len(),
            snapshot.profiles.len(),
            snapshot.metrics.len()
        );
        for path in [
            &workspace.layout.authorships_path,
            &workspace.layout.profiles_path,
            &workspace.layout.metrics_path,
        ] {
            if path.exists() {
                println!("  {} sha256 {}", path.display(), hash_path(path)?);
            }
        }
        Ok(())
    } else {
        println!("Relation verification failed:");
        for violation in &violations {
            println!("  - {}", violation);
        }
        anyhow::bail!(
            "Relation verification failed ({} violations)",
            violations.len()
        )
    }
}

struct CliArgs {
    home: Option<PathBuf>,
    input: Option<PathBuf>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut home = None;
        let mut input = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--home" => {
                    let value = args
                        .next()
                        .context("Expected a workspace directory after --home")?;
                    home = Some(PathBuf::from(value));
                }
                "--input" => {
                    let value = args
                        .next()
                        .context("Expected a directory of *.jsonl paper files after --input")?;
                    input = Some(PathBuf::from(value));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => {
                    return Err(anyhow!(
                        "Unknown argument '{other}'. Run with --help for usage instructions."
                    ));
                }
            }
        }
        Ok(Self { home, input })
    }
}

fn print_usage() {
    println!("authorbase relation verifier");
    println!("Checks edge orders, tier/external-id consistency, profile counts and ranks.");
    println!("Usage: cargo run --bin verify_relations -- [options]");
    println!("Options:");
    println!("  --home <dir>    Workspace root (default: $AUTHORBASE_HOME or the OS data dir)");
    println!("  --input <dir>   Also compare edge counts with mentions in these *.jsonl rows");
}
