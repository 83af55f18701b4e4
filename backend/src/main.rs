//! smsgen CLI - Generate outbound SMS message files
//!
//! ```bash
//! smsgen generate -c contacts.csv -t templates.csv --dnc dnc.csv --split 1000
//! smsgen split uploads/03-07-2024-Messages.csv --per-file 500 --out-dir parts
//! smsgen serve                      # Start HTTP server (port 3000)
//! ```
//!
//! Settings come from the environment (and `.env`): `SMSGEN_UPLOAD_DIR`,
//! `SMSGEN_ALLOWED_EXTENSIONS`, `SMSGEN_MESSAGES_PER_FILE`, `SMSGEN_PORT`.

use clap::{Parser, Subcommand};
use smsgen::api::logs::log_info_indent;
use smsgen::{parse_split_count, run, Config, MessageGenerator, OutputWriter, RunRequest};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "smsgen")]
#[command(about = "Generate SMS message files from contacts and spintax templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the message file for a contact list
    Generate {
        /// Contacts CSV (first_name, associated_property_address_line_1, phone_1..phone_3)
        #[arg(short, long)]
        contacts: PathBuf,

        /// Templates CSV (every cell is a template)
        #[arg(short, long)]
        templates: PathBuf,

        /// Do-not-contact CSV (first column)
        #[arg(short, long)]
        dnc: Option<PathBuf>,

        /// Split into files of at most this many messages
        #[arg(short, long)]
        split: Option<String>,

        /// Output directory (default: upload directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Split an existing message file into parts
    Split {
        /// Message file to split
        input: PathBuf,

        /// Messages per part
        #[arg(short, long)]
        per_file: Option<String>,

        /// Directory for the parts (default: next to the input)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match cli.command {
        Commands::Generate {
            contacts,
            templates,
            dnc,
            split,
            out_dir,
            seed,
        } => cmd_generate(&config, contacts, templates, dnc, split, out_dir, seed),

        Commands::Split {
            input,
            per_file,
            out_dir,
        } => cmd_split(&config, &input, per_file, out_dir),

        Commands::Serve { port } => cmd_serve(config, port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_generate(
    config: &Config,
    contacts: PathBuf,
    templates: PathBuf,
    dnc: Option<PathBuf>,
    split: Option<String>,
    out_dir: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = RunRequest {
        contacts,
        templates,
        dnc,
        messages_per_file: split,
    };
    let writer = OutputWriter::new(out_dir.unwrap_or_else(|| config.upload_dir.clone()));

    let report = match seed {
        Some(seed) => run(&request, &mut MessageGenerator::seeded(seed), &writer)?,
        None => run(&request, &mut MessageGenerator::from_entropy(), &writer)?,
    };

    eprintln!("\n📊 Messages created: {}", report.created_count);
    eprintln!("   Messages blocked: {}", report.blocked_count);
    if report.skipped_rows > 0 {
        eprintln!("   Rows skipped:     {}", report.skipped_rows);
    }
    eprintln!("\n📁 Files in {}:", writer.dir().display());
    for file in &report.files {
        log_info_indent(file.as_str(), 1);
    }
    eprintln!("⚠️  Files are named by date: another run today overwrites them.");

    Ok(())
}

fn cmd_split(
    config: &Config,
    input: &Path,
    per_file: Option<String>,
    out_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = per_file.unwrap_or_else(|| config.default_messages_per_file.to_string());
    let per_file = parse_split_count(&raw)?;

    if input.file_name().is_none() {
        return Err(format!("Not a file: {}", input.display()).into());
    }
    let dir = out_dir.unwrap_or_else(|| {
        input.parent().unwrap_or_else(|| Path::new(".")).to_path_buf()
    });

    eprintln!("✂️  Splitting {} into files of {}", input.display(), per_file);
    let writer = OutputWriter::new(dir);
    let parts = writer.split_output(input, per_file)?;

    if parts.is_empty() {
        eprintln!("   Nothing to split: {} has no message rows", input.display());
    }
    for part in &parts {
        log_info_indent(writer.dir().join(part).display().to_string(), 1);
    }
    eprintln!("\n✨ Done!");

    Ok(())
}

async fn cmd_serve(config: Config, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match port {
        Some(port) => Config { port, ..config },
        None => config,
    };
    smsgen::server::start_server(config).await
}
