//! One-off attorney search from the command line; prints the JSON wire shape
//! and optionally writes iCalendar files.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use court_calendar_search::ics::{ics_file_name, records_to_calendar};
use court_calendar_search::{
    init_tracing, CourtSearch, HttpCalendarSource, SearchConfig, SearchResponse,
};

#[derive(Debug, Parser)]
#[command(name = "court_search", about = "Find court hearings for an attorney")]
struct Args {
    /// Attorney first name
    first_name: String,
    /// Attorney last name
    last_name: String,
    /// "all" or a day (YYYY-MM-DD)
    #[arg(long, default_value = "all")]
    date: String,
    /// "all" or a court code
    #[arg(long, default_value = "all")]
    location: String,
    /// Write all hearings into one calendar file
    #[arg(long)]
    ics: Option<PathBuf>,
    /// Write one calendar file per hearing into this directory
    #[arg(long)]
    ics_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let args = Args::parse();

    let cfg = SearchConfig::from_env();
    let source = HttpCalendarSource::from_config(&cfg)?;
    let search = CourtSearch::new(Arc::new(source), cfg);

    let out = match search
        .search("attorney", &args.first_name, &args.last_name, &args.date, &args.location)
        .await
    {
        Ok(out) => out,
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&SearchResponse::failure(e.to_string()))?);
            return Ok(ExitCode::from(2));
        }
    };

    let stamp = chrono::Utc::now().naive_utc();
    if let Some(path) = &args.ics {
        std::fs::write(path, records_to_calendar(&out.records, stamp))
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), count = out.count, "wrote calendar");
    }
    if let Some(dir) = &args.ics_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for r in &out.records {
            let path = dir.join(ics_file_name(r));
            std::fs::write(&path, records_to_calendar(std::slice::from_ref(r), stamp))
                .with_context(|| format!("writing {}", path.display()))?;
        }
        tracing::info!(dir = %dir.display(), count = out.count, "wrote per-hearing calendars");
    }

    println!("{}", serde_json::to_string_pretty(&SearchResponse::from(out))?);
    Ok(ExitCode::SUCCESS)
}
