use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use tracing::warn;

use crate::age::DEFAULT_AGE;
use crate::aggregate::PROGRESSIVE_PASS_MIN_X;
use crate::ingest::IngestOptions;
use crate::rates::DEFAULT_MIN_MINUTES;
use crate::source::{EventSource, OPEN_DATA_URL, OpenDataDir, OpenDataHttp};

pub const DEFAULT_COMPETITION_ID: u32 = 11; // La Liga
pub const DEFAULT_SEASON_ID: u32 = 27; // 2015/16
pub const DEFAULT_OUTPUT: &str = "data/players.json";

#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Remote { base_url: String },
    Local { root: PathBuf },
}

/// Knobs that change the numbers in the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSettings {
    pub min_minutes: u32,
    pub progressive_pass_min_x: f64,
    pub default_age: u32,
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            min_minutes: DEFAULT_MIN_MINUTES,
            progressive_pass_min_x: PROGRESSIVE_PASS_MIN_X,
            default_age: DEFAULT_AGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub competition_id: u32,
    pub season_id: u32,
    pub metrics: MetricSettings,
    pub output: PathBuf,
    pub xlsx: Option<PathBuf>,
    pub source: SourceConfig,
    pub ingest: IngestOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            competition_id: DEFAULT_COMPETITION_ID,
            season_id: DEFAULT_SEASON_ID,
            metrics: MetricSettings::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            xlsx: None,
            source: SourceConfig::Remote {
                base_url: OPEN_DATA_URL.to_string(),
            },
            ingest: IngestOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// `.env.local` / `.env`, then the process environment, then CLI flags.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::from_env().apply_args(&args)
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        cfg.competition_id = env_number(&get, "XSCOUT_COMPETITION_ID", cfg.competition_id);
        cfg.season_id = env_number(&get, "XSCOUT_SEASON_ID", cfg.season_id);
        cfg.metrics.min_minutes = env_number(&get, "XSCOUT_MIN_MINUTES", cfg.metrics.min_minutes);
        cfg.metrics.progressive_pass_min_x = env_number(
            &get,
            "XSCOUT_PROGRESSIVE_X",
            cfg.metrics.progressive_pass_min_x,
        );
        cfg.metrics.default_age = env_number(&get, "XSCOUT_DEFAULT_AGE", cfg.metrics.default_age);
        cfg.ingest.parallelism =
            env_number(&get, "FETCH_PARALLELISM", cfg.ingest.parallelism).clamp(1, 32);
        if get("XSCOUT_SKIP_LINEUPS").is_some_and(|v| is_truthy(&v)) {
            cfg.ingest.with_lineups = false;
        }
        if let Some(out) = get("XSCOUT_OUTPUT") {
            cfg.output = PathBuf::from(out.trim());
        }
        if let Some(xlsx) = get("XSCOUT_XLSX") {
            cfg.xlsx = Some(PathBuf::from(xlsx.trim()));
        }
        if let Some(url) = get("XSCOUT_DATA_URL") {
            cfg.source = SourceConfig::Remote {
                base_url: url.trim().to_string(),
            };
        }
        if let Some(dir) = get("XSCOUT_DATA_DIR") {
            cfg.source = SourceConfig::Local {
                root: PathBuf::from(dir.trim()),
            };
        }
        cfg
    }

    /// Flags accept both `--flag=value` and `--flag value`.
    pub fn apply_args(mut self, args: &[String]) -> Result<Self> {
        if let Some(raw) = flag_value(args, "--competition") {
            self.competition_id = parse_flag(raw, "--competition")?;
        }
        if let Some(raw) = flag_value(args, "--season") {
            self.season_id = parse_flag(raw, "--season")?;
        }
        if let Some(raw) = flag_value(args, "--min-minutes") {
            self.metrics.min_minutes = parse_flag(raw, "--min-minutes")?;
        }
        if let Some(raw) = flag_value(args, "--parallelism") {
            let n: usize = parse_flag(raw, "--parallelism")?;
            if n == 0 {
                return Err(anyhow!("--parallelism must be at least 1"));
            }
            self.ingest.parallelism = n.min(32);
        }
        if let Some(raw) = flag_value(args, "--out") {
            self.output = PathBuf::from(raw);
        }
        if let Some(raw) = flag_value(args, "--xlsx") {
            self.xlsx = Some(PathBuf::from(raw));
        }
        if let Some(raw) = flag_value(args, "--data-url") {
            self.source = SourceConfig::Remote {
                base_url: raw.to_string(),
            };
        }
        if let Some(raw) = flag_value(args, "--data-dir") {
            self.source = SourceConfig::Local {
                root: PathBuf::from(raw),
            };
        }
        if args.iter().any(|a| a == "--skip-lineups") {
            self.ingest.with_lineups = false;
        }
        Ok(self)
    }

    pub fn open_source(&self) -> Box<dyn EventSource> {
        match &self.source {
            SourceConfig::Remote { base_url } => Box::new(OpenDataHttp::new(base_url.clone())),
            SourceConfig::Local { root } => Box::new(OpenDataDir::new(root.clone())),
        }
    }
}

fn env_number<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    let Some(raw) = get(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            warn!(key, value = %raw, "ignoring malformed value");
            default
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim());
        }
    }
    None
}

fn parse_flag<T: FromStr>(raw: &str, name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("invalid value {raw:?} for {name}"))
}
