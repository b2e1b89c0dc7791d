use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use authorbase::bases::Workspace;
use authorbase::orchestration::Pipeline;
use authorbase::storage::JsonlPaperSource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = CliArgs::parse()?;
    let workspace = match &args.home {
        Some(root) => Workspace::open_at(root)?,
        None => Workspace::new()?,
    };
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| workspace.layout.papers_dir.clone());
    let source = JsonlPaperSource::new(input);
    let pipeline = Pipeline::new(&workspace);

    let summary = if args.incremental {
        let changes = args
            .changes
            .as_deref()
            .context("--incremental needs a change set; pass --changes <file>")?;
        pipeline.run_incremental_from(&source, changes)?
    } else {
        pipeline.run_full(&source)?
    };

    println!("{}", summary.render());
    println!("Relations stored under {}", workspace.layout.relations_dir.display());
    Ok(())
}

struct CliArgs {
    home: Option<PathBuf>,
    input: Option<PathBuf>,
    changes: Option<PathBuf>,
    incremental: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut home = None;
        let mut input = None;
        let mut changes = None;
        let mut incremental = false;
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
                "--changes" => {
                    let value = args
                        .next()
                        .context("Expected a change set file after --changes")?;
                    changes = Some(PathBuf::from(value));
                    incremental = true;
                }
                "--incremental" => incremental = true,
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
        Ok(Self {
            home,
            input,
            changes,
            incremental,
        })
    }
}

fn print_usage() {
    println!("authorbase pipeline");
    println!("Resolves author identities and rebuilds profiles, metrics and ranks.");
    println!("Usage: cargo run --bin run_pipeline -- [options]");
    println!("Options:");
    println!("  --home <dir>       Workspace root (default: $AUTHORBASE_HOME or the OS data dir)");
    println!("  --input <dir>      Directory of *.jsonl paper rows (default: <home>/User/papers)");
    println!("  --changes <file>   JSON change set {{\"paper_ids\": [...]}}; implies --incremental");
    println!("  --incremental      Re-match only the papers in the change set (default: full run)");
    println!("Logging follows RUST_LOG (default: info).");
}
