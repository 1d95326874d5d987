//! Startup configuration.
//!
//! Three layers, later ones win: `config.json` in the platform config
//! directory, `ELEMENTUM_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use directories::ProjectDirs;
use elementum_core::Catalog;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "config.json";
pub const CATALOG_FILE: &str = "catalog.json";

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "elementum", about = "Falling-sand sandbox over a WebAssembly simulation.")]
pub struct Cli {
    /// Share link, `/elementum/<id>/` path or bare share id to open
    pub location: Option<String>,

    /// Simulation module (.wasm)
    #[arg(long, value_name = "PATH")]
    pub module: Option<PathBuf>,

    /// Element catalog (JSON); defaults to catalog.json next to the module
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Base URL of the share server
    #[arg(long, value_name = "URL")]
    pub share_url: Option<String>,

    /// Initial canvas size in units of 75 px
    #[arg(long, value_name = "N")]
    pub canvas_units: Option<u32>,

    /// Multiplier for the initial window size
    #[arg(long, value_name = "F")]
    pub window_scale: Option<f64>,

    /// Read this file instead of the default config.json
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub module_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub share_url: String,
    pub canvas_units: u32,
    pub window_scale: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from("elementum.wasm"),
            catalog_path: None,
            share_url: "http://127.0.0.1:8080".to_string(),
            canvas_units: 4,
            window_scale: 1.0,
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/elementum/config.json` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "Mechanika", "Elementum").map(|d| d.config_dir().join(CONFIG_FILE))
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// All three layers, with the real environment.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let path = cli.config.clone().or_else(Self::default_path);
        let mut config = match path {
            Some(p) if p.exists() => {
                info!(path = %p.display(), "loading config");
                Self::from_file(&p)?
            }
            Some(p) if cli.config.is_some() => {
                anyhow::bail!("config file {} does not exist", p.display())
            }
            _ => {
                debug!("no config file, using defaults");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = get("ELEMENTUM_MODULE") {
            self.module_path = PathBuf::from(v);
        }
        if let Some(v) = get("ELEMENTUM_CATALOG") {
            self.catalog_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("ELEMENTUM_SHARE_URL") {
            self.share_url = v;
        }
        if let Some(v) = get("ELEMENTUM_CANVAS_UNITS") {
            self.canvas_units = v
                .trim()
                .parse()
                .with_context(|| format!("ELEMENTUM_CANVAS_UNITS={v:?} is not a number"))?;
        }
        Ok(())
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(p) = &cli.module {
            self.module_path = p.clone();
        }
        if let Some(p) = &cli.catalog {
            self.catalog_path = Some(p.clone());
        }
        if let Some(u) = &cli.share_url {
            self.share_url = u.clone();
        }
        if let Some(n) = cli.canvas_units {
            self.canvas_units = n;
        }
        if let Some(f) = cli.window_scale {
            self.window_scale = f;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.canvas_units > 0, "canvas_units must be at least 1");
        anyhow::ensure!(
            self.window_scale > 0.0 && self.window_scale.is_finite(),
            "window_scale must be positive"
        );
        anyhow::ensure!(!self.share_url.trim().is_empty(), "share_url is empty");
        Ok(())
    }

    /// The explicit catalog, else `catalog.json` beside the module, else the
    /// built-in table.
    pub fn load_catalog(&self) -> anyhow::Result<Catalog> {
        let candidate = match &self.catalog_path {
            Some(p) => Some(p.clone()),
            None => self
                .module_path
                .parent()
                .map(|dir| dir.join(CATALOG_FILE))
                .filter(|p| p.exists()),
        };
        match candidate {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading catalog {}", path.display()))?;
                let catalog = Catalog::from_json(&text)
                    .with_context(|| format!("parsing catalog {}", path.display()))?;
                info!(path = %path.display(), elements = catalog.elements.len(), "catalog loaded");
                Ok(catalog)
            }
            None => Ok(Catalog::builtin()),
        }
    }
}
