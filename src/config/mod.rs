use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::config::emotions::{EmotionRegistry, EmotionSet};
use crate::stats::radial::{RadialLayout, DEFAULT_LABEL_FRACTION};

pub mod emotions;

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "MoodLog";
const APP_NAME: &str = "moodlog";

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            default_cfg.post_load(&self.paths)?;
            self.write_default_config(&default_cfg)?;
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load(&self.paths)?;
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
    pub diary_path: PathBuf,
    pub log_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var("MOODLOG_CONFIG").ok().map(PathBuf::from);
        let override_data = env::var("MOODLOG_DATA").ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let data_root = override_data.unwrap_or_else(|| project_dirs.data_dir().to_path_buf());
        let diary_path = data_root.join("diary.json");

        let state_dir = project_dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_root.join("state"));
        let log_dir = state_dir.join("logs");

        Ok(Self {
            config_dir,
            config_file,
            data_dir: data_root,
            diary_path,
            log_dir,
            state_dir,
        })
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.config_dir,
            &self.data_dir,
            &self.log_dir,
            &self.state_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppConfig {
    pub emotion_set: EmotionSet,
    pub chart: ChartOptions,
    pub calendar: CalendarOptions,
    pub store: StoreOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            emotion_set: EmotionSet::Classic,
            chart: ChartOptions::default(),
            calendar: CalendarOptions::default(),
            store: StoreOptions::default(),
        }
    }
}

impl AppConfig {
    fn post_load(&mut self, paths: &ConfigPaths) -> Result<()> {
        self.store.resolve(paths).context("resolving diary paths")?;
        if !(0.0..=1.0).contains(&self.chart.label_fraction) {
            tracing::warn!(
                label_fraction = self.chart.label_fraction,
                "chart label fraction outside 0..=1, falling back to default"
            );
            self.chart.label_fraction = DEFAULT_LABEL_FRACTION;
        }
        Ok(())
    }

    pub fn radial_layout(&self) -> RadialLayout {
        RadialLayout::new(self.chart.label_fraction)
    }

    pub fn emotion_registry(&self) -> EmotionRegistry {
        EmotionRegistry::new(self.emotion_set)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ChartOptions {
    /// Radius fraction at which the mood wheel anchors its labels.
    pub label_fraction: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            label_fraction: DEFAULT_LABEL_FRACTION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CalendarOptions {
    /// Show an entry-count badge on days with more than one entry.
    pub show_count_badge: bool,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            show_count_badge: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StoreOptions {
    #[serde(skip)]
    pub diary_path: PathBuf,
    pub file_name: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            diary_path: PathBuf::new(),
            file_name: String::from("diary.json"),
        }
    }
}

impl StoreOptions {
    fn resolve(&mut self, paths: &ConfigPaths) -> Result<()> {
        if self.diary_path.as_os_str().is_empty() {
            self.diary_path = if self.file_name.is_empty() {
                paths.diary_path.clone()
            } else {
                paths.data_dir.join(&self.file_name)
            };
        }
        Ok(())
    }
}
