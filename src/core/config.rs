//! `.aeorc.yml` configuration with layered precedence.
//!
//! Layers, lowest to highest: built-in defaults, `~/.aeorc.yml`,
//! `./.aeorc.yml`, then command-line flags. A field set in a higher layer
//! replaces that field only; missing files are silently skipped and
//! malformed files contribute nothing beyond a warning.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CONFIG_FILE_NAME: &str = ".aeorc.yml";

/// Effective audit configuration after layering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AeoConfig {
    /// Per-request HTTP timeout in seconds.
    pub timeout: u64,
    /// Page sample size for site audits.
    pub max_pages: usize,
    /// Audit only the seed URL (skip discovery).
    pub single: bool,
    pub verbose: bool,
    /// Persist the report to the history store after the audit.
    pub save: bool,
    pub regression_threshold: f64,
    /// Custom AI bot list; `None` uses the built-in list.
    pub bots: Option<Vec<String>>,
    /// Output format hint for the caller; `None` means the caller's default.
    pub format: Option<String>,
}

impl Default for AeoConfig {
    fn default() -> Self {
        Self {
            timeout: 15,
            max_pages: 10,
            single: false,
            verbose: false,
            save: false,
            regression_threshold: 5.0,
            bots: None,
            format: None,
        }
    }
}

/// One configuration layer: every field optional, unknown keys ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
    pub timeout: Option<u64>,
    pub max_pages: Option<usize>,
    pub single: Option<bool>,
    pub verbose: Option<bool>,
    pub save: Option<bool>,
    pub regression_threshold: Option<f64>,
    pub bots: Option<Vec<String>>,
    pub format: Option<String>,
}

impl AeoConfig {
    /// Overlay a layer: present fields replace, absent fields keep the
    /// lower layer's value.
    pub fn apply(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.timeout {
            self.timeout = v;
        }
        if let Some(v) = layer.max_pages {
            self.max_pages = v;
        }
        if let Some(v) = layer.single {
            self.single = v;
        }
        if let Some(v) = layer.verbose {
            self.verbose = v;
        }
        if let Some(v) = layer.save {
            self.save = v;
        }
        if let Some(v) = layer.regression_threshold {
            self.regression_threshold = v;
        }
        if let Some(v) = layer.bots {
            self.bots = Some(v);
        }
        if let Some(v) = layer.format {
            self.format = Some(v);
        }
    }
}

fn read_layer(path: &Path) -> Option<ConfigLayer> {
    let contents = std::fs::read_to_string(path).ok()?;
    if contents.trim().is_empty() {
        return None;
    }
    match serde_yaml::from_str::<ConfigLayer>(&contents) {
        Ok(layer) => Some(layer),
        Err(e) => {
            warn!("{} parse error at {}: {} — ignoring layer", CONFIG_FILE_NAME, path.display(), e);
            None
        }
    }
}

/// Load configuration from `search_dirs`, ordered lowest priority first.
/// Each directory is probed for [`CONFIG_FILE_NAME`].
pub fn load_config_from(search_dirs: &[PathBuf]) -> AeoConfig {
    let mut config = AeoConfig::default();
    for dir in search_dirs {
        if let Some(layer) = read_layer(&dir.join(CONFIG_FILE_NAME)) {
            config.apply(layer);
        }
    }
    config
}

/// Load configuration from the standard locations: home dir, then the
/// current working directory on top.
pub fn load_config() -> AeoConfig {
    let mut search_dirs = Vec::new();
    if let Some(home) = dirs::home_dir() {
        search_dirs.push(home);
    }
    if let Ok(cwd) = std::env::current_dir() {
        search_dirs.push(cwd);
    }
    load_config_from(&search_dirs)
}
