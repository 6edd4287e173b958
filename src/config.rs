use crate::model::Rules;
use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bitgotchi")]
#[command(about = "A one-bit virtual pet that lives in your terminal")]
pub(crate) struct Cli {
    /// Seed for the pet's random events (overrides settings)
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Directory of 32x32 PNG sprites to use instead of the built-in art
    #[arg(long)]
    pub(crate) sprites: Option<PathBuf>,

    /// Draw the screen with braille dots instead of half blocks
    #[arg(long, default_value_t = false)]
    pub(crate) braille: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DisplayMode {
    HalfBlock,
    Braille,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) display: DisplayMode,
    pub(crate) show_debug: bool,
    pub(crate) seed: Option<u64>,
    pub(crate) sprite_dir: Option<PathBuf>,
    pub(crate) rules: Rules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            enable_color: true,
            display: DisplayMode::HalfBlock,
            show_debug: true,
            seed: None,
            sprite_dir: None,
            rules: Rules::default(),
        }
    }
}

impl Settings {
    pub(crate) fn apply_cli(&mut self, cli: &Cli) {
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if let Some(dir) = &cli.sprites {
            self.sprite_dir = Some(dir.clone());
        }
        if cli.braille {
            self.display = DisplayMode::Braille;
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "bitgotchi", "Bitgotchi")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create data directory {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("bitgotchi.log"),
    })
}

/// Missing file means defaults. A file that does not parse is left alone
/// and defaults are used for this run.
pub(crate) fn load_settings(path: &Path) -> Settings {
    let Ok(s) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
            Settings::default()
        }
    }
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename over an existing file is not atomic on Windows
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings(&dir.path().join("nope.json"));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut s = Settings::default();
        s.seed = Some(42);
        s.display = DisplayMode::Braille;
        s.rules.age_child = 796;
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn partial_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "fps_cap": 60, "rules": { "tick_ms": 500 } }"#).unwrap();
        let s = load_settings(&path);
        assert_eq!(s.fps_cap, 60);
        assert_eq!(s.rules.tick_ms, 500);
        assert_eq!(s.rules.age_hatch, 128);
        assert_eq!(s.display, DisplayMode::HalfBlock);

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn cli_overrides_settings() {
        let cli = Cli::parse_from(["bitgotchi", "--seed", "7", "--braille", "--sprites", "art"]);
        let mut s = Settings::default();
        s.apply_cli(&cli);
        assert_eq!(s.seed, Some(7));
        assert_eq!(s.display, DisplayMode::Braille);
        assert_eq!(s.sprite_dir, Some(PathBuf::from("art")));

        let mut s = Settings::default();
        s.apply_cli(&Cli::parse_from(["bitgotchi"]));
        assert_eq!(s, Settings::default());
    }
}
