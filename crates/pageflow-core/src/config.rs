use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-network tuning values (`[standard]` / `[constrained]` tables in config.toml).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Maximum pages of the current chapter loading at once.
    pub max_concurrent: usize,
    /// Automatic retries per page before it is left in the error state.
    pub max_retries: u32,
    /// Retry delay unit in milliseconds; the n-th retry waits n times this.
    pub retry_base_delay_ms: u64,
    /// Out-of-band next-chapter fetches allowed at once (0 disables prefetch).
    pub next_prefetch_concurrency: usize,
}

impl ProfileConfig {
    pub fn standard() -> Self {
        Self {
            max_concurrent: 3,
            max_retries: 2,
            retry_base_delay_ms: 1100,
            next_prefetch_concurrency: 1,
        }
    }

    /// Profile used when the client reports a save-data / constrained network.
    pub fn constrained() -> Self {
        Self {
            max_concurrent: 1,
            max_retries: 1,
            retry_base_delay_ms: 1800,
            next_prefetch_concurrency: 0,
        }
    }
}

/// Reader configuration loaded from `~/.config/pageflow/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Pages after the active one that are eagerly scheduled.
    pub look_ahead: usize,
    /// Focus line position as a fraction of viewport height from the top.
    pub focus_line_ratio: f32,
    /// Coalescing interval for scroll/resize driven recomputation (one frame).
    pub frame_interval_ms: u64,
    /// Delay before draining again when every loading slot is taken.
    pub redrain_delay_ms: u64,
    /// Delay between a settled next-chapter prefetch and the next drain.
    pub prefetch_drain_delay_ms: u64,
    /// Delay before re-checking prefetch activation conditions.
    pub prefetch_recheck_delay_ms: u64,
    /// Longest accepted next-chapter candidate location, in bytes.
    pub max_candidate_len: usize,
    /// Optional standard-network profile; built-in defaults when missing.
    #[serde(default)]
    pub standard: Option<ProfileConfig>,
    /// Optional constrained-network profile; built-in defaults when missing.
    #[serde(default)]
    pub constrained: Option<ProfileConfig>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            look_ahead: 3,
            focus_line_ratio: 0.38,
            frame_interval_ms: 16,
            redrain_delay_ms: 220,
            prefetch_drain_delay_ms: 900,
            prefetch_recheck_delay_ms: 1800,
            max_candidate_len: 2048,
            standard: None,
            constrained: None,
        }
    }
}

/// Fully resolved tuning for one reader view, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningProfile {
    pub constrained: bool,
    pub look_ahead: usize,
    pub focus_line_ratio: f32,
    pub frame_interval: Duration,
    pub max_concurrent: usize,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub redrain_delay: Duration,
    pub next_prefetch_concurrency: usize,
    pub prefetch_drain_delay: Duration,
    pub prefetch_recheck_delay: Duration,
    pub max_candidate_len: usize,
}

impl TuningProfile {
    /// Pick the standard or constrained profile from `cfg` based on the
    /// network-quality signal.
    pub fn select(cfg: &ReaderConfig, constrained: bool) -> Self {
        let profile = if constrained {
            cfg.constrained.unwrap_or_else(ProfileConfig::constrained)
        } else {
            cfg.standard.unwrap_or_else(ProfileConfig::standard)
        };
        Self {
            constrained,
            look_ahead: cfg.look_ahead,
            focus_line_ratio: cfg.focus_line_ratio.clamp(0.0, 1.0),
            frame_interval: Duration::from_millis(cfg.frame_interval_ms),
            max_concurrent: profile.max_concurrent.max(1),
            max_retries: profile.max_retries,
            retry_base_delay: Duration::from_millis(profile.retry_base_delay_ms),
            redrain_delay: Duration::from_millis(cfg.redrain_delay_ms),
            next_prefetch_concurrency: profile.next_prefetch_concurrency,
            prefetch_drain_delay: Duration::from_millis(cfg.prefetch_drain_delay_ms),
            prefetch_recheck_delay: Duration::from_millis(cfg.prefetch_recheck_delay_ms),
            max_candidate_len: cfg.max_candidate_len,
        }
    }
}

impl Default for TuningProfile {
    fn default() -> Self {
        Self::select(&ReaderConfig::default(), false)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pageflow")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ReaderConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<ReaderConfig> {
    if !path.exists() {
        let default_cfg = ReaderConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ReaderConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
