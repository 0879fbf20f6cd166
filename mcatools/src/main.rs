use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mcatools_anvil::LoadMode;
use mcatools_benchmark::RegionMetrics;

mod commands;

#[derive(Parser)]
#[command(name = "mcatools", about = "Inspect and edit Minecraft Anvil region files (.mca)")]
pub struct Args {
    /// Abort on the first chunk that fails to decode instead of skipping it
    #[arg(long, global = true, env = "MCATOOLS_STRICT")]
    pub strict: bool,

    /// Print a decode/encode timing report when done
    #[arg(long, global = true)]
    pub benchmark: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render a region's biome map to a PNG
    ExportBiome {
        fromregion: PathBuf,
        toimage: PathBuf,
        /// Greyscale by biome id instead of the colour table
        #[arg(long)]
        mono: bool,
    },
    /// Write an edited biome PNG back into a region
    ImportBiome {
        fromimage: PathBuf,
        region: PathBuf,
        /// Where to write the result (defaults to overwriting REGION)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize the header and chunks of a region
    Info {
        region: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Decode every chunk, rebuild the file in memory and check it reads back the same
    Verify { region: PathBuf },
    /// Region file and block bounds for a block coordinate
    #[command(allow_negative_numbers = true)]
    Locate { block_x: i32, block_z: i32 },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mode = if args.strict { LoadMode::Strict } else { LoadMode::BestEffort };

    let benchmark = if args.benchmark || std::env::var("BENCHMARK").is_ok() {
        Some(RegionMetrics::new())
    } else {
        None
    };

    match args.command {
        Command::ExportBiome { fromregion, toimage, mono } => {
            commands::export_biome(&fromregion, &toimage, mono, mode, benchmark.as_ref())?
        }
        Command::ImportBiome { fromimage, region, output } => {
            let output = output.unwrap_or_else(|| region.clone());
            commands::import_biome(&fromimage, &region, &output, mode, benchmark.as_ref())?
        }
        Command::Info { region, json } => commands::info(&region, json, mode, benchmark.as_ref())?,
        Command::Verify { region } => commands::verify(&region, benchmark.as_ref())?,
        Command::Locate { block_x, block_z } => commands::locate(block_x, block_z),
    }

    if let Some(bench) = benchmark {
        println!("{}", bench.generate_report());
    }
    Ok(())
}
