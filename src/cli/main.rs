use clap::Parser;
use std::path::PathBuf;

use heic2jpg::pipeline::{self, ConvertOptions};

#[derive(Parser, Debug)]
#[command(
    name = "heic2jpg",
    version,
    about = "Convert HEIC images to JPEG while preserving EXIF metadata"
)]
struct Cli {
    /// Path to the input HEIC file
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to the output JPEG file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let (input, output) = match (cli.input, cli.output) {
        (Some(input), Some(output)) => (input, output),
        _ => {
            println!("Usage: heic2jpg --input image.heic --output image.jpg [--verbose]");
            std::process::exit(1);
        }
    };

    log::debug!("input file:  {}", input.display());
    log::debug!("output file: {}", output.display());

    if let Err(err) = pipeline::convert(&input, &output, ConvertOptions::default()) {
        log::error!("conversion failed: {err:#}");
        std::process::exit(1);
    }

    // A stat failure here is the one non-fatal error: the JPEG was written.
    match std::fs::metadata(&output) {
        Ok(info) => println!("Conversion successful: {} ({} bytes)", output.display(), info.len()),
        Err(_) => println!("Conversion done, but failed to retrieve output file info."),
    }
}
