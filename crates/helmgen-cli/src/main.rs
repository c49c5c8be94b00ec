#![deny(unsafe_code)]

//! helmgen CLI: scan a source repository and ask an LLM for a Helm chart.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use helmgen_config::AppConfig;
use helmgen_core::{Assembly, Outcome, Pipeline, PipelineError, Section, llm};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// helmgen: generate a Helm chart for a project from its source tree.
#[derive(Parser)]
#[command(name = "helmgen", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "helmgen.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan, assemble and submit the prompt to the chat endpoint.
    Generate(RunArgs),

    /// Scan and assemble only; print the prompt without contacting the endpoint.
    Scan {
        /// Print only the relative paths of the files that would be sent.
        #[arg(long)]
        list: bool,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,

        #[command(flatten)]
        run: RunArgs,
    },
}

/// Overrides applied on top of the configuration file.
#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Source repository URL.
    #[arg(long)]
    repo_url: Option<String>,

    /// Local checkout of the source repository.
    #[arg(long)]
    repo_path: Option<PathBuf>,

    /// Subdirectories of the source repository to scan.
    #[arg(long, num_args = 1..)]
    code_dirs: Vec<String>,

    /// Reference Helm chart repository URL.
    #[arg(long)]
    helm_repo_url: Option<String>,

    /// Local checkout of the reference repository.
    #[arg(long)]
    helm_repo_path: Option<PathBuf>,

    /// Subdirectories of the reference repository to scan.
    #[arg(long, num_args = 1..)]
    helm_dirs: Vec<String>,

    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(long)]
    llm_endpoint: Option<String>,

    /// API key for the endpoint.
    #[arg(long, env = "HELMGEN_LLM_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    /// Model id; the first served model is used when omitted.
    #[arg(long)]
    model: Option<String>,

    /// Glob or path-prefix patterns to exclude from the scan.
    #[arg(long, num_args = 1..)]
    exclusion_patterns: Vec<String>,

    /// Text placed before the source files.
    #[arg(long)]
    preamble: Option<String>,

    /// Instruction placed after the last section.
    #[arg(long)]
    epilog: Option<String>,

    /// Scan existing checkouts without running git.
    #[arg(long)]
    no_sync: bool,
}

impl RunArgs {
    /// Merge the flags that were given into `config`.
    fn apply(self, config: &mut AppConfig) {
        if let Some(url) = self.repo_url {
            config.source.repo_url = url;
        }
        if let Some(path) = self.repo_path {
            config.source.repo_path = Some(path);
        }
        if !self.code_dirs.is_empty() {
            config.source.code_dirs = self.code_dirs;
        }
        if let Some(url) = self.helm_repo_url {
            config.reference.repo_url = url;
        }
        if let Some(path) = self.helm_repo_path {
            config.reference.repo_path = Some(path);
        }
        if !self.helm_dirs.is_empty() {
            config.reference.dirs = self.helm_dirs;
        }
        if let Some(endpoint) = self.llm_endpoint {
            config.llm.endpoint = Some(endpoint);
        }
        if let Some(key) = self.llm_api_key {
            config.llm.api_key = Some(key);
        }
        if let Some(model) = self.model {
            config.llm.model = Some(model);
        }
        if !self.exclusion_patterns.is_empty() {
            config.scan.exclusion_patterns = self.exclusion_patterns;
        }
        if let Some(preamble) = self.preamble {
            config.prompt.preamble = Some(preamble);
        }
        if let Some(epilog) = self.epilog {
            config.prompt.epilog = Some(epilog);
        }
        if self.no_sync {
            config.vcs.sync = false;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config).await?;
    let base_level = loaded
        .as_ref()
        .map_or("info", |config| config.logging.level.as_str());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(filter_for(cli.verbose, base_level))),
        )
        .init();

    if loaded.is_none() {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }
    let mut config = loaded.unwrap_or_default();

    match cli.command {
        Commands::Generate(run) => {
            run.apply(&mut config);
            config.validate()?;
            cmd_generate(config, cli.verbose > 0).await?
        }
        Commands::Scan { list, run } => {
            run.apply(&mut config);
            config.validate()?;
            cmd_scan(config, list, &mut io::stdout()).await?
        }
        Commands::Config { show, run } => {
            run.apply(&mut config);
            config.validate()?;
            cmd_config(&cli.config, &config, show)?
        }
    }

    Ok(())
}

/// Log filter for the given `-v` count; `base` applies when none is given.
fn filter_for(verbose: u8, base: &str) -> &str {
    match verbose {
        0 => base,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

async fn cmd_generate(config: AppConfig, log_prompt: bool) -> Result<()> {
    let pipeline = Pipeline::new(config)
        .map_err(describe)?
        .with_prompt_logging(log_prompt);
    let client = llm::create_client(&pipeline.config().llm)?;
    info!(endpoint = client.endpoint(), "Generating Helm chart");

    match pipeline.run(client).await.map_err(describe)? {
        Outcome::Completed(response) => {
            info!(model = %response.model, "Generation finished");
        }
        Outcome::NothingToSend(section) => {
            info!(%section, "Chat endpoint not called");
        }
    }
    Ok(())
}

/// Print the assembled prompt, or with `list` only the file paths, to `out`.
async fn cmd_scan<W: Write>(config: AppConfig, list: bool, out: &mut W) -> Result<()> {
    let pipeline = Pipeline::new(config).map_err(describe)?;
    pipeline.sync_repositories().await.map_err(describe)?;

    if list {
        for section in sections(&pipeline) {
            let records = pipeline.scan_section(section).map_err(describe)?;
            if records.is_empty() {
                warn!(%section, "No files were processed");
            }
            for record in records {
                writeln!(out, "{}", record.rel_path)?;
            }
        }
        return Ok(());
    }

    if let Assembly::Ready(document) = pipeline.assemble().map_err(describe)? {
        write!(out, "{document}")?;
    }
    Ok(())
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

/// Sections that take part in a run, in prompt order.
fn sections(pipeline: &Pipeline) -> Vec<Section> {
    let mut sections = vec![Section::Source];
    if pipeline.config().reference.is_enabled() {
        sections.push(Section::Reference);
    }
    sections
}

/// Attach the error class so the user knows whether to fix or retry.
fn describe(err: PipelineError) -> anyhow::Error {
    let class = if err.is_transient() {
        "transient failure; retrying may succeed"
    } else {
        "configuration or input error"
    };
    anyhow::Error::new(err).context(class)
}

/// Load the config file, or `None` when it does not exist.
async fn load_config(path: &Path) -> Result<Option<AppConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let config = AppConfig::load(path)
        .await
        .with_context(|| format!("failed to load '{}'", path.display()))?;
    Ok(Some(config))
}
