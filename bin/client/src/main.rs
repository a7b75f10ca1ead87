//! File relay client

mod constants;
mod download;
mod logger;
mod upload;

use clap::{Parser, Subcommand};
use constants::{DEFAULT_OUTPUT_DIR, DEFAULT_SERVER_URL};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relay-client")]
#[command(about = "Upload files to a relay server and fetch them back by link")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and print its share link
    Upload {
        /// File to upload
        file: PathBuf,
        /// Server URL
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
    /// Download a file by identifier or share link
    Download {
        /// Identifier or full share link
        target: String,
        /// Server URL, ignored when a full share link is given
        #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
        server: String,
        /// Directory the file is written to
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload { file, server } => {
            let uploaded = upload::upload_file(&server, &file)?;
            println!("Upload complete: {}", uploaded.original_name);
            println!("  Download name: {}", uploaded.download_name);
            println!("  Link: {}", uploaded.link);
        }
        Commands::Download {
            target,
            server,
            output_dir,
        } => {
            let path = download::download_file(&server, &target, &output_dir)?;
            println!("Saved to {}", path.display());
        }
    }

    Ok(())
}
