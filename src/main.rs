use anyhow::Context;
use clap::Parser;
use initiative_audit::config::{load_config_file, FileConfig, DEFAULT_CONFIG_FILE};
use initiative_audit::prelude::*;
use std::path::PathBuf;

/// Validate citizen-initiative records and classify their names by connotation
#[derive(Parser, Debug)]
#[command(name = "initiative-audit")]
#[command(about = "Summarize initiatives by outcome and name connotation")]
#[command(version)]
struct Args {
    /// Dataset file or http(s) URL (default: projects.json)
    #[arg(long)]
    source: Option<String>,

    /// YAML config file (default: initiative-audit.yml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the classification state (default: ., or INITIATIVE_AUDIT_STATE_DIR env var)
    #[arg(long = "state-dir")]
    state_dir: Option<PathBuf>,

    /// Write the summary as JSON
    #[arg(long)]
    export: bool,

    /// Export file (default: results.json)
    #[arg(long = "export-file")]
    export_file: Option<PathBuf>,

    /// Report with the existing lexicon and manual classifications only
    #[arg(long = "skip-classification")]
    skip_classification: bool,

    /// Save a fetched dataset to this file
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("INITIATIVE_AUDIT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn read_file_config(path: Option<PathBuf>) -> anyhow::Result<FileConfig> {
    // An explicit --config must exist; the default file is optional
    match path {
        Some(path) => load_config_file(&path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default.exists() {
                load_config_file(&default)
                    .with_context(|| format!("Failed to load config file: {}", default.display()))
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}

fn build_config(args: Args) -> anyhow::Result<Config> {
    let mut builder = ConfigBuilder::from_file_config(read_file_config(args.config)?);

    if let Some(source) = args.source {
        builder = builder.source(&source);
    }

    // Check flag first, then environment variable, then config file / default
    if let Some(dir) = args.state_dir {
        builder = builder.state_dir(dir);
    } else if let Ok(dir) = std::env::var("INITIATIVE_AUDIT_STATE_DIR") {
        builder = builder.state_dir(dir);
    }

    if let Some(export_file) = args.export_file {
        builder = builder.export_file(export_file);
    }
    if let Some(snapshot) = args.snapshot {
        builder = builder.snapshot_file(snapshot);
    }

    Ok(builder
        .export(args.export)
        .skip_classification(args.skip_classification)
        .build()?)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet, args.verbose)?;

    let config = build_config(args)?;
    let export_file = config.export.then(|| config.export_file.clone());
    let source = config.source.to_string();

    let processor = AuditProcessor::new(config);
    let mut stdout = std::io::stdout();
    if let Err(error) = processor.run(LinePrompter::stdio(), &mut stdout) {
        // A bad record rejects the whole batch; anything else is an input or state failure
        let context = if error.is_record_error() {
            format!("Dataset {} contains an invalid record, nothing was analyzed", source)
        } else {
            format!("Failed to analyze initiatives from {}", source)
        };
        return Err(anyhow::Error::new(error).context(context));
    }

    if let Some(path) = export_file {
        println!("📁 Results saved as {}", path.display());
    }

    Ok(())
}
