use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::{Builder, Env};
use log::LevelFilter;

use defdex::apply::{self, TerminalConfirm};
use defdex::config::{Config, DEFAULT_CONFIG};
use defdex::discovery::{discover, load_definitions};
use defdex::index;
use defdex::markdown;
use defdex::placement::place_all;
use defdex::reconcile::{reconcile, Options};
use defdex::report::{self, Report, Summary};
use defdex::tables::ScoringTables;

/// defdex - Keep an API definitions index in step with the documents it points into
#[derive(Parser)]
#[command(name = "defdex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Quiet mode - print the report only when there are findings
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the index against the definitions in the API documents
    Check {
        /// Show placement reasoning for every definition and details for each finding
        #[arg(short, long)]
        verbose: bool,

        /// Index file (overrides config)
        #[arg(long)]
        index_file: Option<PathBuf>,

        /// Directory holding the API documents (overrides config)
        #[arg(long)]
        docs_dir: Option<PathBuf>,

        /// Read definitions from a JSON file instead of scanning documents
        #[arg(long)]
        definitions: Option<PathBuf>,

        /// Also write the uncolored report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rewrite the index file after confirmation
        #[arg(long)]
        apply: bool,

        /// Exit 0 even when errors are found
        #[arg(long)]
        no_fail: bool,
    },

    /// Print the definitions found in the API documents as JSON
    Discover {
        /// Directory holding the API documents (overrides config)
        #[arg(long)]
        docs_dir: Option<PathBuf>,

        /// Index file to leave out of the scan (overrides config)
        #[arg(long)]
        index_file: Option<PathBuf>,
    },

    /// Print the GitHub anchor slug for a heading
    Anchor {
        /// Heading text
        text: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    let verbose = matches!(cli.command, Commands::Check { verbose: true, .. });
    init_logging(verbose, cli.quiet);

    let result = match cli.command {
        Commands::Check {
            verbose,
            index_file,
            docs_dir,
            definitions,
            output,
            apply,
            no_fail,
        } => cmd_check(
            &cli.config,
            CheckArgs {
                verbose,
                quiet: cli.quiet,
                index_file,
                docs_dir,
                definitions,
                output,
                apply,
                no_fail,
            },
        ),
        Commands::Discover {
            docs_dir,
            index_file,
        } => cmd_discover(&cli.config, docs_dir, index_file).map(|_| 0),
        Commands::Anchor { text } => {
            println!("{}", markdown::anchor(&text));
            Ok(0)
        }
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_module("defdex", LevelFilter::Debug);
    } else if quiet {
        builder.filter_level(LevelFilter::Error);
    }
    builder.target(env_logger::Target::Stderr).init();
}

struct CheckArgs {
    verbose: bool,
    quiet: bool,
    index_file: Option<PathBuf>,
    docs_dir: Option<PathBuf>,
    definitions: Option<PathBuf>,
    output: Option<PathBuf>,
    apply: bool,
    no_fail: bool,
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("loading config {}", path.display()))
}

fn cmd_check(config_path: &Path, args: CheckArgs) -> Result<i32> {
    let config = load_config(config_path)?;
    let index_file = args.index_file.unwrap_or_else(|| config.index_file.clone());
    let docs_dir = args.docs_dir.unwrap_or_else(|| config.docs_dir.clone());

    let tables = ScoringTables::load(config.tables.as_deref()).context("loading scoring tables")?;
    let mut tree = index::load(&index_file)
        .with_context(|| format!("parsing index {}", index_file.display()))?;

    let discovery = discover(&docs_dir, &index_file, &config.exclude)
        .with_context(|| format!("scanning {}", docs_dir.display()))?;
    let mut definitions = match &args.definitions {
        Some(path) => load_definitions(path)?,
        None => discovery.definitions,
    };

    place_all(
        &mut tree,
        &mut definitions,
        &tables,
        config.confidence_threshold,
    );
    let result = reconcile(
        &tree,
        &definitions,
        &discovery.catalog,
        &Options::from(&config),
    );

    let summary = Summary {
        index_file: index_file.display().to_string(),
        documents: discovery.catalog.len(),
        definitions: definitions.len(),
        indexed: tree.current_count(),
        sections: tree.sections.len(),
        duplicates: discovery.duplicates,
    };
    let report = Report::build(&summary, &definitions, &result, args.verbose);

    if let Some(output) = &args.output {
        fs::write(output, report.to_plain())
            .with_context(|| format!("writing report to {}", output.display()))?;
    }
    if !args.quiet || !result.issues.is_empty() {
        print!("{}", report.to_colored());
    }

    if args.apply {
        let mut confirm = TerminalConfirm::new();
        apply::apply(
            &mut tree,
            &result,
            &index_file,
            &mut confirm,
            &mut io::stdout(),
        )?;
    }

    Ok(report::exit_code(&result, args.no_fail))
}

fn cmd_discover(
    config_path: &Path,
    docs_dir: Option<PathBuf>,
    index_file: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let docs_dir = docs_dir.unwrap_or(config.docs_dir);
    let index_file = index_file.unwrap_or(config.index_file);

    let discovery = discover(&docs_dir, &index_file, &config.exclude)
        .with_context(|| format!("scanning {}", docs_dir.display()))?;
    println!("{}", serde_json::to_string_pretty(&discovery.definitions)?);
    Ok(())
}
