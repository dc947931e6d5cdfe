// src/cli.rs
// Command-line front end: fetch one chart edition and print it.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

use crate::chart::ChartData;
use crate::config::FetchOptions;
use crate::core::net::HttpFetcher;
use crate::progress::SkipLog;

#[derive(Parser, Debug)]
#[command(name = "cli", version)]
#[command(about = "Fetch a weekly music chart and print it as a table or JSON")]
pub struct Args {
    /// Chart identifier, e.g. hot-100, billboard-200, artist-100
    pub chart: String,

    /// Edition date (YYYY-MM-DD); rounded up to the next publication date
    #[arg(short, long)]
    pub date: Option<String>,

    /// Print JSON instead of the table
    #[arg(long)]
    pub json: bool,

    /// Fetch options as a JSON document; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extra attempts on network errors
    #[arg(long)]
    pub retries: Option<u32>,

    /// More log output (-v, -vv, -vvv); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    fn fetch_options(&self) -> Result<FetchOptions> {
        let mut opts = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .wrap_err_with(|| format!("reading {}", path.display()))?;
                serde_json::from_str::<FetchOptions>(&text)
                    .wrap_err_with(|| format!("parsing {}", path.display()))?
            }
            None => FetchOptions::default(),
        };
        if let Some(secs) = self.timeout {
            opts = opts.with_timeout_secs(secs);
        }
        if let Some(n) = self.retries {
            opts = opts.with_max_retries(n);
        }
        Ok(opts)
    }
}

pub fn run() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    crate::log::init(args.verbose);

    let fetcher = HttpFetcher::new(args.fetch_options()?);
    let mut skips = SkipLog::default();
    let chart = ChartData::fetch_with(&fetcher, &args.chart, args.date.clone(), Some(&mut skips))
        .wrap_err_with(|| format!("loading chart {}", args.chart))?;

    if skips.count() > 0 {
        eprintln!("note: {} malformed row(s) skipped", skips.count());
    }

    if args.json {
        println!("{}", chart.to_json_pretty()?);
    } else {
        print!("{chart}");
    }
    Ok(())
}
