use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use tracing::warn;

use crate::models::MarketIndex;

pub const DEFAULT_DIGEST_DAYS: usize = 7;

/// Daily market caption, or `None` when the quote lacks a numeric index or
/// change.
pub fn caption_text(date: NaiveDate, index: &MarketIndex) -> Option<String> {
    let (Some(value), Some(change)) = (index.value(), index.change()) else {
        warn!("Market index quote is missing its value or change: {:?}", index);
        return None;
    };

    Some(format!(
        "{}大盤加權指數：\n開盤{:.2}\n漲跌指數為{}({})\n最後收{}\n今年漲跌幅：{}",
        date.format("%Y年%m月%d日"),
        value - change,
        index.raw_change().unwrap_or_default(),
        index.change_percent().unwrap_or_default(),
        index.raw_value().unwrap_or_default(),
        index.year_to_date().unwrap_or_default(),
    ))
}

pub fn caption_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}_caption.txt", date.format("%Y%m%d")))
}

pub fn digest_path(dir: &Path, date: NaiveDate, days: usize) -> PathBuf {
    dir.join(format!("{}_caption_{}dsummary.txt", date.format("%Y%m%d"), days))
}

pub fn write_caption(dir: &Path, date: NaiveDate, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let path = caption_path(dir, date);
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Daily captions in `dir`, newest first. Ordered by the date in the file
/// name, then by modification time.
pub fn recent_captions(dir: &Path, limit: usize) -> Result<Vec<PathBuf>> {
    let pattern = Regex::new(r"^(\d{8})_caption\.txt$")?;

    let mut captions: Vec<(String, SystemTime, PathBuf)> = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(captures) = file_name.to_str().and_then(|name| pattern.captures(name)) else {
            continue;
        };
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        captions.push((captures[1].to_string(), modified, entry.path()));
    }

    captions.sort_by(|a, b| (&b.0, b.1).cmp(&(&a.0, a.1)));

    Ok(captions
        .into_iter()
        .take(limit)
        .map(|(_, _, path)| path)
        .collect())
}

/// Concatenates the `days` most recent captions, separated by a blank line.
pub fn digest_text(dir: &Path, days: usize) -> Result<String> {
    let mut parts = Vec::new();
    for path in recent_captions(dir, days)? {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        parts.push(text.trim_end().to_string());
    }

    let mut digest = parts.join("\n\n");
    if !digest.is_empty() {
        digest.push('\n');
    }
    Ok(digest)
}

pub fn write_digest(dir: &Path, date: NaiveDate, days: usize) -> Result<PathBuf> {
    let digest = digest_text(dir, days)?;
    let path = digest_path(dir, date, days);
    fs::write(&path, digest).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
