//! texpak-cli - Command-line interface for texture archives
//!
//! Lists, inspects and extracts entries of a directory/data texture archive.
//! Extracted textures are written as raw RGBA8888 bytes.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Metadata, Record};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use texpak::Archive;

#[derive(Parser)]
#[command(name = "texpak-cli")]
#[command(about = "A CLI tool for inspecting and extracting texture archives")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the entries of an archive
    List {
        /// Directory file (the data file is found next to it)
        directory: PathBuf,
    },

    /// Show the header of one entry
    Info {
        /// Directory file
        directory: PathBuf,

        /// Entry name
        name: String,
    },

    /// Decode one entry to a raw RGBA file
    Extract {
        /// Directory file
        directory: PathBuf,

        /// Entry name
        name: String,

        /// Output RGBA file
        output: PathBuf,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Decode every entry into a directory of raw RGBA files
    ExtractAll {
        /// Directory file
        directory: PathBuf,

        /// Output directory
        output_dir: PathBuf,

        /// Force overwrite of existing files
        #[arg(short, long)]
        force: bool,
    },
}

/// Minimal stderr backend for the `log` facade
struct StderrLogger {
    level: LevelFilter,
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level_name = match record.level() {
            Level::Error => "error",
            Level::Warn => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        };
        eprintln!(
            "[{}] [{}] {}",
            record.module_path().unwrap_or("texpak"),
            level_name,
            record.args()
        );
    }

    fn flush(&self) {}
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::List { directory } => list_entries(&directory, cli.quiet),
        Commands::Info { directory, name } => show_entry_info(&directory, &name, cli.verbose),
        Commands::Extract {
            directory,
            name,
            output,
            force,
        } => extract_entry(&directory, &name, &output, force, cli.verbose, cli.quiet),
        Commands::ExtractAll {
            directory,
            output_dir,
            force,
        } => extract_all(&directory, &output_dir, force, cli.quiet).and_then(|failed| {
            if failed > 0 {
                Err(format!("{failed} entries failed to decode").into())
            } else {
                Ok(())
            }
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn open_archive(directory: &Path) -> Result<Archive, Box<dyn std::error::Error>> {
    if !directory.exists() {
        return Err(format!("Directory file '{}' does not exist", directory.display()).into());
    }
    Ok(Archive::open(directory)?)
}

fn list_entries(directory: &Path, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let archive = open_archive(directory)?;

    for entry in archive.entries() {
        println!("{:#010x}  {}", entry.data_offset, entry.name);
    }
    if !quiet {
        println!("{} entries", archive.len());
    }

    Ok(())
}

fn show_entry_info(
    directory: &Path,
    name: &str,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut archive = open_archive(directory)?;
    let header = archive.resolve(name)?;

    println!("Texture Information:");
    println!("  Name: {}", name);
    println!("  Dimensions: {}x{}", header.width, header.height);
    println!(
        "  Thumbnail: {}x{}",
        header.thumb_width, header.thumb_height
    );
    println!("  Alpha: {}", if header.has_alpha { "yes" } else { "no" });
    println!("  Flags: {:#010x}", header.flags);
    println!("  Payload: {} bytes at {:#x}", header.compressed_size, header.data_start);

    if verbose {
        match archive.decode_with_stats(name) {
            Ok((_, stats)) => {
                println!("  Tiles: {}", stats.tiles);
                println!("  Flat blocks: {}", stats.flat_blocks);
                println!("  Coded blocks: {}", stats.coded_blocks);
                println!("  Escape codes: {}", stats.escape_codes);
                println!("  Bits consumed: {}", stats.bits_consumed);
                if stats.overrun_bits > 0 {
                    println!("  Overrun: {} bits (payload truncated)", stats.overrun_bits);
                }
            }
            Err(e) => println!("  Decode failed: {}", e),
        }
    }

    Ok(())
}

fn extract_entry(
    directory: &Path,
    name: &str,
    output: &Path,
    force: bool,
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if output.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            output.display()
        )
        .into());
    }

    let mut archive = open_archive(directory)?;
    if verbose {
        println!("Decoding '{}' to '{}'", name, output.display());
    }

    let start_time = Instant::now();
    let raster = archive
        .decode(name)
        .map_err(|e| format!("Decoding '{}' failed: {}", name, e))?;
    fs::write(output, raster.pixels())?;

    if !quiet {
        println!("✓ Extracted {} ({}x{})", name, raster.width(), raster.height());
        println!("  Output: {} bytes", raster.pixels().len());
        println!("  Time:   {:.2?}", start_time.elapsed());
    }

    Ok(())
}

/// Extract every entry; returns the number of entries that failed
fn extract_all(
    directory: &Path,
    output_dir: &Path,
    force: bool,
    quiet: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut archive = open_archive(directory)?;
    fs::create_dir_all(output_dir)?;

    let names: Vec<String> = archive.entries().iter().map(|e| e.name.clone()).collect();
    let progress = if quiet {
        None
    } else {
        let pb = ProgressBar::new(names.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let start_time = Instant::now();
    let mut failed = 0;

    for name in &names {
        if let Some(ref pb) = progress {
            pb.set_message(name.clone());
        }

        let output = output_dir.join(format!("{}.rgba", sanitize(name)));
        let result = if output.exists() && !force {
            Err(format!("'{}' already exists. Use --force to overwrite", output.display()).into())
        } else {
            archive
                .decode(name)
                .map_err(Box::<dyn std::error::Error>::from)
                .and_then(|raster| Ok(fs::write(&output, raster.pixels())?))
        };

        if let Err(e) = result {
            failed += 1;
            let line = format!("✗ {}: {}", name, e);
            match progress {
                Some(ref pb) => pb.println(line),
                None => eprintln!("{}", line),
            }
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(ref pb) = progress {
        pb.finish_with_message("done");
    }

    if !quiet {
        println!("✓ Extracted {} of {} entries", names.len() - failed, names.len());
        println!("  Time: {:.2?}", start_time.elapsed());
    }

    Ok(failed)
}

/// Make an entry name safe to use as a file name
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
