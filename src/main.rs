use anyhow::Result;
use clap::{Parser, Subcommand};
use relist_core::{DashboardStats, ListingPage};
use std::path::PathBuf;

mod preview;

#[derive(Parser, Debug)]
#[command(name = "relist", about = "Defect overlays and thumbnails for device listings")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw detection boxes for a photo and cut a thumbnail of the top defect
    Preview {
        /// Device photo that was uploaded
        #[arg(long)]
        image: PathBuf,
        /// Saved JSON response of the listing-creation endpoint
        #[arg(long)]
        prediction: PathBuf,
        /// Displayed size as WIDTHxHEIGHT (defaults to the natural size)
        #[arg(long, value_parser = parse_size)]
        display: Option<(u32, u32)>,
        /// Preview configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Caption font, overrides the config
        #[arg(long)]
        font: Option<PathBuf>,
        #[arg(long, default_value = "outputs")]
        out_dir: PathBuf,
    },

    /// Count listings by status and decision for the dashboard cards
    Stats {
        /// JSON file with `{"items": [...]}` or a bare array of listings
        #[arg(long)]
        listings: PathBuf,
    },
}

fn parse_size(value: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("bad height '{}': {}", h, e))?;
    Ok((w, h))
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Preview {
            image,
            prediction,
            display,
            config,
            font,
            out_dir,
        } => {
            let options = preview::PreviewOptions {
                image,
                prediction,
                display,
                config,
                font,
                out_dir,
            };
            let summary = preview::run_preview(&options)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Stats { listings } => {
            let page = ListingPage::load(&listings)?;
            let stats = DashboardStats::from_listings(&page.items);
            log::info!("Counted {} listings from {:?}", stats.total, listings);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
