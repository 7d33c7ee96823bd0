//! Chapter manifest: the list of page locations a host feeds to a reader view.
//!
//! ```toml
//! base_url = "https://cdn.example.com"
//! page_height = 1400.0
//! pages = ["/ch1/001.jpg", "/ch1/002.jpg"]
//! next_chapter = '["/ch2/001.jpg", "/ch2/002.jpg"]'
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::resource::ResourceDescriptor;

/// Page height used when the manifest does not give one.
pub const DEFAULT_PAGE_HEIGHT: f32 = 1200.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterManifest {
    /// Page locations in reading order.
    pub pages: Vec<String>,
    /// Origin that site-relative locations are resolved against for transport.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Encoded next-chapter candidate list (JSON array of strings).
    #[serde(default)]
    pub next_chapter: Option<String>,
    #[serde(default)]
    pub page_height: Option<f32>,
}

impl ChapterManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("parsing manifest {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        let manifest: ChapterManifest = toml::from_str(data)?;
        Ok(manifest)
    }

    pub fn descriptors(&self) -> Vec<ResourceDescriptor> {
        self.pages
            .iter()
            .enumerate()
            .map(|(i, location)| ResourceDescriptor::new(i, location.clone()))
            .collect()
    }

    pub fn page_height(&self) -> f32 {
        self.page_height
            .filter(|h| *h > 0.0)
            .unwrap_or(DEFAULT_PAGE_HEIGHT)
    }

    /// Turn a page or candidate location into an absolute URL.
    ///
    /// Absolute locations pass through (a cache-busting query is kept).
    /// Site-relative ones need `base_url`.
    pub fn resolve(&self, location: &str) -> Result<String> {
        if let Ok(absolute) = url::Url::parse(location) {
            return Ok(absolute.to_string());
        }
        let base = self
            .base_url
            .as_deref()
            .with_context(|| format!("relative location {} needs base_url", location))?;
        let base = url::Url::parse(base).with_context(|| format!("invalid base_url {}", base))?;
        let joined = base
            .join(location)
            .with_context(|| format!("cannot resolve {} against {}", location, base))?;
        Ok(joined.to_string())
    }
}

/// Local file name for a delivered page: `page-007.jpg`.
///
/// The extension comes from the last path segment of `location`; `bin` when
/// there is none.
pub fn output_name(index: usize, location: &str) -> String {
    let path = location.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    let ext = segment
        .rsplit_once('.')
        .filter(|(stem, ext)| {
            !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string());
    format!("page-{:03}.{}", index + 1, ext)
}
