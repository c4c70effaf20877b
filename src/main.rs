use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use docqa::config::Config;
use docqa::export::{ExportOptions, export_report};
use docqa::{
    ColorChoice, ExportFormat, ExtractionOptions, ExtractionReport, MergeDetection, RequiredKeys,
    load_document,
};

#[derive(Parser, Debug)]
#[command(
    name = "docqa",
    version,
    about = "Extract question/answer fields from tables in .docx files"
)]
struct Cli {
    /// Input .docx file
    #[arg(required_unless_present = "init_config")]
    file: Option<PathBuf>,

    /// Comma separated substrings; only labels containing one of them are kept
    #[arg(short, long, value_name = "LIST", conflicts_with = "all")]
    keys: Option<String>,

    /// Keep every extracted field
    #[arg(short, long)]
    all: bool,

    /// Field whose value is scanned for goal codes (repeatable)
    #[arg(short = 'g', long = "goal-key", value_name = "KEY")]
    goal_keys: Vec<String>,

    /// Skip goal code extraction
    #[arg(long, conflicts_with = "goal_keys")]
    no_goals: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<ExportFormat>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// How merged cells are recognised
    #[arg(long, value_enum)]
    merge_detection: Option<MergeDetection>,

    /// Colour terminal output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the default config file and exit
    #[arg(long)]
    init_config: bool,
}

fn extraction_options(cli: &Cli, config: &Config) -> ExtractionOptions {
    let required_keys = if cli.all {
        None
    } else {
        let keys = match &cli.keys {
            Some(list) => RequiredKeys::new(list.split(',')),
            None => RequiredKeys::new(&config.extraction.required_keys),
        };
        Some(keys).filter(|keys| !keys.is_empty())
    };

    let goal_keys = if cli.no_goals {
        Vec::new()
    } else if !cli.goal_keys.is_empty() {
        cli.goal_keys.clone()
    } else {
        config.goals.keys.clone()
    };

    ExtractionOptions {
        required_keys,
        goal_keys,
        merge_detection: cli
            .merge_detection
            .unwrap_or(config.extraction.merge_detection),
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.init_config {
        let path = cli
            .config
            .clone()
            .or_else(Config::config_path)
            .context("Could not determine the config directory")?;
        Config::default().save_to(&path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let Some(file) = cli.file.as_deref() else {
        bail!("No input file given");
    };

    let options = extraction_options(&cli, &config);
    let document = load_document(file).await?;
    let report = ExtractionReport::build(&document, &options);

    if report.fields.is_empty() {
        eprintln!("warning: no fields were extracted; check the required keys");
    }
    for key in report.missing_goal_keys() {
        eprintln!("warning: no field named '{key}' was found; check the required keys");
    }

    let export_options = ExportOptions {
        format: cli.format.unwrap_or(config.output.format),
        color: if cli.output.is_some() {
            ColorChoice::Never
        } else {
            cli.color
        },
        field_header: config.output.field_header.clone(),
        value_header: config.output.value_header.clone(),
    };
    let rendered = export_report(&report, &export_options)?;

    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote report");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docqa=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
