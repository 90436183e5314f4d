use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, USER_AGENT};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "xscout";
const HTTP_SUBDIR: &str = "http";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    version: u32,
    url: String,
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

/// GET `url`, revalidating against the on-disk copy when one exists.
///
/// Entries live one file per URL so parallel fetchers never contend on a
/// shared cache file.
pub fn fetch_json_cached(client: &Client, url: &str) -> Result<String> {
    let cached_entry = load_entry(url);

    let mut req = client.get(url).header(USER_AGENT, "xscout/0.1");
    if let Some(entry) = cached_entry.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let headers = resp.headers().clone();
    if status == StatusCode::NOT_MODIFIED {
        if let Some(entry) = cached_entry {
            debug!(url, "cache revalidated");
            return Ok(entry.body);
        }
        return Err(anyhow::anyhow!("received 304 without cache body"));
    }

    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, truncate(&body, 200)));
    }

    let etag = headers
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let last_modified = headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    if etag.is_some() || last_modified.is_some() {
        let entry = CacheEntry {
            version: CACHE_VERSION,
            url: url.to_string(),
            body: body.clone(),
            etag,
            last_modified,
            fetched_at: system_time_to_secs(SystemTime::now()).unwrap_or_default(),
        };
        if let Err(err) = save_entry(&entry) {
            debug!(url, "cache write skipped: {err:#}");
        }
    }
    Ok(body)
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn entry_path(url: &str) -> Option<PathBuf> {
    let key = format!("{:x}", Sha256::digest(url.as_bytes()));
    app_cache_dir().map(|dir| dir.join(HTTP_SUBDIR).join(format!("{key}.json")))
}

fn load_entry(url: &str) -> Option<CacheEntry> {
    let path = entry_path(url)?;
    let raw = fs::read_to_string(path).ok()?;
    let entry = serde_json::from_str::<CacheEntry>(&raw).ok()?;
    if entry.version != CACHE_VERSION || entry.url != url {
        return None;
    }
    Some(entry)
}

fn save_entry(entry: &CacheEntry) -> Result<()> {
    let Some(path) = entry_path(&entry.url) else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(entry).context("serialize http cache entry")?;
    fs::write(&tmp, json).context("write http cache entry")?;
    fs::rename(&tmp, &path).context("swap http cache entry")?;
    Ok(())
}

fn truncate(raw: &str, max: usize) -> &str {
    match raw.char_indices().nth(max) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
