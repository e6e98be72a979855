use crate::cli::Cli;
use crate::fish::{DEFAULT_FLOAT_INTERVAL_MS, DEFAULT_SWIM_INTERVAL_MS};
use crate::tank::DEFAULT_PLACEMENT_FLOOR_PX;
use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FishSettings {
    pub(crate) name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) note: Option<String>,
}

impl FishSettings {
    pub(crate) fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            note: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fish: Vec<FishSettings>,
    pub(crate) swim_interval_ms: u64,
    pub(crate) float_interval_ms: u64,
    pub(crate) fps_cap: u32,
    pub(crate) cell_width_px: i32,
    pub(crate) cell_height_px: i32,
    pub(crate) placement_floor_px: i32,
    pub(crate) seed: Option<u64>,
    pub(crate) show_hud: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fish: ["Brush Teeth", "Read", "Exercise", "Journal", "Code", "Vitamins"]
                .into_iter()
                .map(FishSettings::named)
                .collect(),
            swim_interval_ms: DEFAULT_SWIM_INTERVAL_MS,
            float_interval_ms: DEFAULT_FLOAT_INTERVAL_MS,
            fps_cap: 60,
            cell_width_px: 8,
            cell_height_px: 16,
            placement_floor_px: DEFAULT_PLACEMENT_FLOOR_PX,
            seed: None,
            show_hud: true,
        }
    }
}

impl Settings {
    /// Command-line values win over the file.
    pub(crate) fn apply_cli(&mut self, cli: &Cli) {
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if let Some(fps) = cli.fps {
            self.fps_cap = fps;
        }
        if !cli.fish.is_empty() {
            self.fish = cli.fish.iter().map(FishSettings::named).collect();
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.swim_interval_ms == 0 || self.float_interval_ms == 0 {
            bail!("swim and float intervals must be at least 1 ms");
        }
        if self.fps_cap == 0 {
            bail!("fps_cap must be positive");
        }
        if self.cell_width_px <= 0 || self.cell_height_px <= 0 {
            bail!(
                "cell metrics must be positive, got {}x{}",
                self.cell_width_px,
                self.cell_height_px
            );
        }
        if self.placement_floor_px <= 0 {
            bail!(
                "placement_floor_px must be positive, got {}",
                self.placement_floor_px
            );
        }
        if self.fish.is_empty() {
            bail!("the tank needs at least one fish");
        }
        Ok(())
    }

    pub(crate) fn fps(&self) -> u32 {
        self.fps_cap.clamp(10, 240)
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "fishtank", "Fishtank")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("fishtank.log"),
    })
}

/// Reads settings, falling back to defaults when the file is missing or bad.
pub(crate) fn load_settings(path: &Path) -> Settings {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(err) if err.kind() == ErrorKind::NotFound => return Settings::default(),
        Err(err) => {
            warn!(path = %path.display(), %err, "could not read settings, using defaults");
            return Settings::default();
        }
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(err) => {
            warn!(path = %path.display(), %err, "unreadable settings, using defaults");
            Settings::default()
        }
    }
}

/// Writes the defaults so there is a file to edit. Leaves existing files alone.
pub(crate) fn ensure_settings_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    save_settings_atomic(path, &Settings::default())
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("could not write {}", tmp.display()))?;
    replace_file(&tmp, path)
        .with_context(|| format!("could not move settings into {}", path.display()))
}

/// Moves `tmp` over `dest`. Platforms that refuse to rename onto an existing
/// file get one retry after the old file is removed.
fn replace_file(tmp: &Path, dest: &Path) -> std::io::Result<()> {
    match fs::rename(tmp, dest) {
        Ok(()) => Ok(()),
        Err(first) if dest.exists() => {
            debug!(%first, "rename over existing settings failed, retrying");
            fs::remove_file(dest)?;
            fs::rename(tmp, dest)
        }
        Err(err) => Err(err),
    }
}
