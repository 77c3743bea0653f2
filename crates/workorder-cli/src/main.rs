mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "workorder",
    version,
    about = "Extract and translate body-shop work orders"
)]
struct Cli {
    /// Log pipeline decisions to stderr (RUST_LOG overrides the level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the header and line items of a work order PDF
    Parse {
        /// Path to the work order PDF
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the work order to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Custom JSON glossary for Spanish part names
        #[arg(short, long, value_name = "FILE")]
        glossary: Option<PathBuf>,

        /// JSON file overriding layout tolerances
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Phrase a single operation in English and Spanish
    Phrase {
        /// Operation column, e.g. "Remove / Replace" (empty for a section heading)
        operation: String,

        /// Description column, e.g. "LT Belt Molding"
        description: String,

        /// Custom JSON glossary for Spanish part names
        #[arg(short, long, value_name = "FILE")]
        glossary: Option<PathBuf>,
    },
    /// Inspect and check part-name glossaries
    Glossary {
        #[command(subcommand)]
        action: GlossaryAction,
    },
}

#[derive(Subcommand)]
enum GlossaryAction {
    /// List the built-in glossary
    List,
    /// Validate a custom glossary file
    Validate {
        /// Path to JSON glossary file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
            glossary,
            config,
        } => commands::parse::run(input_file, &output, out, glossary, config),
        Commands::Phrase {
            operation,
            description,
            glossary,
        } => commands::phrase::run(&operation, &description, glossary),
        Commands::Glossary { action } => match action {
            GlossaryAction::List => commands::glossary::list(),
            GlossaryAction::Validate { file } => commands::glossary::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
