use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::models::{CleanedRecord, SponsoredRecord};
use crate::pipeline::PageHook;

fn write_csv<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    // Header is written by hand so that an empty scrape still yields one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(SponsoredRecord::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_raw_csv(records: &[SponsoredRecord], path: &Path) -> Result<()> {
    write_csv(records, path)?;
    info!(rows = records.len(), path = %path.display(), "saved raw listings");
    Ok(())
}

pub fn save_cleaned_csv(records: &[CleanedRecord], path: &Path) -> Result<()> {
    write_csv(records, path)?;
    info!(rows = records.len(), path = %path.display(), "saved cleaned listings");
    Ok(())
}

/// Reads a raw CSV written by [`save_raw_csv`]. Empty cells come back as
/// empty strings.
pub fn read_raw_csv(path: &Path) -> Result<Vec<SponsoredRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<SponsoredRecord>, _>>()
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(records)
}

/// `listings.csv` → `listings_cleaned.csv`, in the same directory.
pub fn cleaned_path(raw: &Path) -> PathBuf {
    let stem = raw
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "listings".to_string());
    let name = match raw.extension() {
        Some(ext) => format!("{stem}_cleaned.{}", ext.to_string_lossy()),
        None => format!("{stem}_cleaned"),
    };
    raw.with_file_name(name)
}

pub fn save_summary<T: Serialize>(summary: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Keeps a copy of every fetched page on disk for selector debugging.
pub struct HtmlDump {
    dir: PathBuf,
}

impl HtmlDump {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self { dir })
    }
}

impl PageHook for HtmlDump {
    fn page_fetched(&self, page: u32, _url: &Url, markup: &str) {
        let path = self.dir.join(format!(
            "search_page_{page}_{}.html",
            chrono::Utc::now().timestamp()
        ));
        if let Err(e) = fs::write(&path, markup) {
            warn!(path = %path.display(), "could not dump page: {e}");
        }
    }
}
