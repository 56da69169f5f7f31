pub mod cli;
mod tui_app;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cli::{
    errors::CrxCliError,
    helpers::{describe_metadata, exit_with_error, resolve_crx_file},
};
use crxtool::crx::{
    archive::{extract_zip_to_directory, zip_directory},
    parse_crx, parse_metadata, Crx2Packer, RsaKeyPair,
};
use std::{
    env, fs,
    io::{BufReader, BufWriter, Write},
    path::Path,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crxtool")]
#[command(version)]
#[command(about = "Inspect, extract and pack CRX browser extensions", long_about = None)]
#[command(next_line_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the zip payload of a CRX file into a directory
    Extract {
        /// CRX file to extract
        filename: String,
        #[arg(short, long)]
        output_dir: Option<String>,
    },
    /// Print the header of a CRX file
    Info {
        /// CRX file to inspect
        filename: String,
    },
    /// Pack a directory or zip file into a signed CRX2 file
    Pack {
        /// Extension directory or zip file
        source: String,
        /// PEM-encoded RSA private key
        #[arg(short, long)]
        key: String,
        /// Output file, defaults to <source name>.crx
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn extract(current_dir: &Path, filename: &str, output_dir: Option<String>) -> anyhow::Result<()> {
    let crx_file_path = resolve_crx_file(current_dir, filename);

    let data = fs::read(&crx_file_path)
        .with_context(|| format!("Failed to read {}", crx_file_path.display()))?;
    let extension = parse_crx(&data).context("Failed to parse crx")?;

    let output_base_dir = match output_dir {
        Some(path) => current_dir.join(path),
        None => current_dir.join("out"),
    };

    // Create a directory with the same name as the CRX file (without extension)
    let crx_name = crx_file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("extension");

    let extract_dir = output_base_dir.join(crx_name);

    if extract_dir.exists() {
        fs::remove_dir_all(&extract_dir).context("Failed to remove existing directory")?;
    }

    fs::create_dir_all(&extract_dir).context("Failed to create extraction directory")?;

    extract_zip_to_directory(&extension.zip, &extract_dir)
        .context("Failed to extract zip contents")?;

    info!(id = extension.metadata.id(), "extracted extension");
    println!(
        "Successfully extracted {} ({}) to {}",
        filename,
        extension.metadata.id(),
        extract_dir.display()
    );

    Ok(())
}

fn print_info(current_dir: &Path, filename: &str) -> anyhow::Result<()> {
    let crx_file_path = resolve_crx_file(current_dir, filename);

    let file = fs::File::open(&crx_file_path)
        .with_context(|| format!("Failed to open {}", crx_file_path.display()))?;
    let metadata = parse_metadata(&mut BufReader::new(file)).context("Failed to parse crx")?;

    for line in describe_metadata(&metadata) {
        println!("{}", line);
    }

    Ok(())
}

fn pack(
    current_dir: &Path,
    source: &str,
    key: &str,
    output: Option<String>,
) -> anyhow::Result<()> {
    let source_path = current_dir.join(source);

    let zip = if source_path.is_dir() {
        zip_directory(&source_path).context("Failed to zip extension directory")?
    } else if source_path.is_file() && source.ends_with(".zip") {
        fs::read(&source_path)
            .with_context(|| format!("Failed to read {}", source_path.display()))?
    } else if !source_path.exists() {
        exit_with_error(CrxCliError::NotFound(source_path.display().to_string()));
    } else {
        exit_with_error(CrxCliError::UnsupportedPackSource(
            source_path.display().to_string(),
        ));
    };

    let key_path = current_dir.join(key);
    if !key_path.exists() {
        exit_with_error(CrxCliError::NotFound(key_path.display().to_string()));
    }
    let pem = fs::read_to_string(&key_path)
        .with_context(|| format!("Failed to read {}", key_path.display()))?;
    let key_pair = RsaKeyPair::from_pem(&pem)?;

    let output_path = match output {
        Some(path) => current_dir.join(path),
        None => {
            let name = source_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("extension");
            current_dir.join(format!("{}.crx", name))
        }
    };

    let mut writer = BufWriter::new(
        fs::File::create(&output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?,
    );
    Crx2Packer
        .pack_extension_to(&zip, &key_pair, &mut writer)
        .context("Failed to pack extension")?;
    writer.flush()?;

    info!(output = %output_path.display(), "packed extension");
    println!("Successfully packed {} to {}", source, output_path.display());

    Ok(())
}

pub fn main() {
    // If no arguments provided, launch TUI mode
    if env::args().len() == 1 {
        if let Err(err) = tui_app::run_tui() {
            eprintln!("TUI Error: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = Cli::parse();
    init_logging();

    let current_dir = match env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("Error: failed to get current directory: {}", err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Extract {
            filename,
            output_dir,
        } => extract(&current_dir, &filename, output_dir),
        Commands::Info { filename } => print_info(&current_dir, &filename),
        Commands::Pack {
            source,
            key,
            output,
        } => pack(&current_dir, &source, &key, output),
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
