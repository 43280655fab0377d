use clap::{Parser, Subcommand};
use log::info;
use lz4stream::{compress_file_with, decompress_file, BlockSizeClass, FrameOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lz4stream", version, about = "Streaming LZ4 frame tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a single LZ4 frame
    Compress {
        input: PathBuf,
        /// Defaults to `<input>.lz4`
        output: Option<PathBuf>,
        /// Chunk size for reads and codec updates
        #[arg(long = "buffer-size", default_value_t = lz4stream::DEFAULT_BUFFER_SIZE)]
        buffer_size: usize,
        /// Maximum block size: 64k, 256k, 1m or 4m
        #[arg(long = "block-size", default_value = "4m", value_parser = parse_block_size)]
        block_size: BlockSizeClass,
        #[arg(long = "checksum")]
        checksum: bool,
        #[arg(long = "level", default_value_t = 0)]
        level: u32,
    },
    /// Decompress a single LZ4 frame file
    Decompress {
        input: PathBuf,
        /// Defaults to `<input>` without its `.lz4` suffix
        output: Option<PathBuf>,
    },
}

fn parse_block_size(raw: &str) -> Result<BlockSizeClass, String> {
    match raw.to_ascii_lowercase().as_str() {
        "64k" | "64kb" => Ok(BlockSizeClass::Max64KB),
        "256k" | "256kb" => Ok(BlockSizeClass::Max256KB),
        "1m" | "1mb" => Ok(BlockSizeClass::Max1MB),
        "4m" | "4mb" => Ok(BlockSizeClass::Max4MB),
        _ => Err(format!("unknown block size {raw:?}; expected 64k, 256k, 1m or 4m")),
    }
}

fn default_decompressed_path(input: &Path) -> PathBuf {
    match input.extension() {
        Some(ext) if ext == "lz4" => input.with_extension(""),
        _ => {
            let mut name = input.as_os_str().to_owned();
            name.push(".out");
            PathBuf::from(name)
        }
    }
}

fn run(cli: Cli) -> lz4stream::Result<()> {
    match cli.command {
        Commands::Compress {
            input,
            output,
            buffer_size,
            block_size,
            checksum,
            level,
        } => {
            let output = output.unwrap_or_else(|| {
                let mut name = input.as_os_str().to_owned();
                name.push(".lz4");
                PathBuf::from(name)
            });
            let options = FrameOptions::default()
                .with_buffer_size(buffer_size)
                .with_block_size(block_size)
                .with_content_checksum(checksum)
                .with_compression_level(level);
            let written = compress_file_with(&input, &output, options)?;
            info!(
                "Compressed {} -> {} ({} bytes)",
                input.display(),
                output.display(),
                written
            );
        }
        Commands::Decompress { input, output } => {
            let output = output.unwrap_or_else(|| default_decompressed_path(&input));
            let decoded = decompress_file(&input, &output)?;
            info!(
                "Decompressed {} -> {} ({} bytes)",
                input.display(),
                output.display(),
                decoded
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lz4stream: {e}");
            ExitCode::FAILURE
        }
    }
}
