use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use amazon_sponsored_scraper::analysis::Analysis;
use amazon_sponsored_scraper::archiver::{self, HtmlDump};
use amazon_sponsored_scraper::cleaner;
use amazon_sponsored_scraper::config::{self, ScrapeConfig};
use amazon_sponsored_scraper::fetcher::HttpFetcher;
use amazon_sponsored_scraper::models::SponsoredRecord;
use amazon_sponsored_scraper::pacing::{NoPause, Pacer, RandomPacer};
use amazon_sponsored_scraper::pipeline::Scraper;
use amazon_sponsored_scraper::report;

const RAW_CSV: &str = "amazon_sponsored_products.csv";
const REPORT_MD: &str = "amazon_analysis_report.md";
const SUMMARY_JSON: &str = "amazon_analysis_summary.json";

#[derive(Parser)]
#[command(name = "sponsored-scraper")]
#[command(about = "Scrape, clean and summarize sponsored search listings")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape result pages, then clean and analyze the listings
    Run {
        /// Search term
        #[arg(default_value = "soft toys")]
        term: String,

        /// Number of result pages to scrape
        #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,

        /// Directory for CSV files and the report
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// JSON file overriding the default CSS selectors
        #[arg(long, value_name = "FILE")]
        selectors: Option<PathBuf>,

        /// Keep a copy of every fetched page in this directory
        #[arg(long, value_name = "DIR")]
        dump_html: Option<PathBuf>,

        /// Skip the randomized delays between retries and pages
        #[arg(long)]
        no_pacing: bool,
    },
    /// Clean and analyze a previously scraped raw CSV
    Clean {
        raw_csv: PathBuf,

        /// Output directory (defaults to the raw CSV's directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            term,
            pages,
            out_dir,
            selectors,
            dump_html,
            no_pacing,
        } => {
            let mut config = ScrapeConfig::default();
            if let Some(path) = selectors {
                config.selectors = config::load_selectors(&path)?;
            }
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("creating {}", out_dir.display()))?;

            let pacer: &dyn Pacer = if no_pacing { &NoPause } else { &RandomPacer };
            let fetcher = HttpFetcher::new(&config, pacer)?;
            let mut scraper = Scraper::new(&config, fetcher, pacer)?;
            if let Some(dir) = dump_html {
                scraper = scraper.with_hook(HtmlDump::new(dir)?);
            }

            info!(%term, pages, "starting sponsored product scrape");
            let raw = scraper.run(&term, pages);
            let raw_path = out_dir.join(RAW_CSV);
            archiver::save_raw_csv(&raw, &raw_path)?;
            clean_and_report(&raw, &raw_path, &out_dir)
        }
        Commands::Clean { raw_csv, out_dir } => {
            let out_dir = out_dir
                .or_else(|| raw_csv.parent().map(Path::to_path_buf))
                .unwrap_or_default();
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("creating {}", out_dir.display()))?;
            let raw = archiver::read_raw_csv(&raw_csv)?;
            clean_and_report(&raw, &raw_csv, &out_dir)
        }
    }
}

fn clean_and_report(raw: &[SponsoredRecord], raw_path: &Path, out_dir: &Path) -> Result<()> {
    let cleaned = cleaner::clean(raw);
    info!(removed = raw.len() - cleaned.len(), "removed duplicate products");

    let cleaned_name = archiver::cleaned_path(raw_path);
    let cleaned_name = cleaned_name
        .file_name()
        .context("raw CSV path has no file name")?;
    archiver::save_cleaned_csv(&cleaned, &out_dir.join(cleaned_name))?;

    if cleaned.is_empty() {
        warn!("no sponsored products were found");
        warn!("the site may be blocking requests, or the result-page markup changed");
        warn!("try again later, or update the selectors with --selectors");
    }

    let analysis = Analysis::from_records(&cleaned);
    let report = report::render_report(report::DEFAULT_TITLE, &analysis, chrono::Local::now());
    let report_path = out_dir.join(REPORT_MD);
    fs::write(&report_path, report)
        .with_context(|| format!("writing {}", report_path.display()))?;
    archiver::save_summary(&analysis, &out_dir.join(SUMMARY_JSON))?;

    info!(report = %report_path.display(), products = cleaned.len(), "analysis complete");
    Ok(())
}
