use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug, Default)]
#[command(about = "Find every target item in the grid as fast as you can")]
pub(crate) struct Args {
    /// fewest targets per round
    #[arg(long)]
    pub(crate) target_min: Option<usize>,

    /// most targets per round
    #[arg(long)]
    pub(crate) target_max: Option<usize>,

    /// tiles per grid row
    #[arg(long)]
    pub(crate) columns: Option<usize>,

    /// frame cap
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// fixed RNG seed (repeatable rounds)
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// no terminal bell
    #[arg(long)]
    pub(crate) mute: bool,

    /// monochrome tiles
    #[arg(long)]
    pub(crate) no_color: bool,

    /// allow Start while a round is running
    #[arg(long)]
    pub(crate) allow_restart: bool,

    /// settings file (default: per-user config dir)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// log file (default: per-user data dir)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,

    /// log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    pub(crate) log_level: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) target_min: usize,
    pub(crate) target_max: usize,
    pub(crate) columns: usize,
    pub(crate) fps_cap: u32,
    pub(crate) sound: bool,
    pub(crate) enable_color: bool,
    pub(crate) allow_restart: bool,
    pub(crate) seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_min: 3,
            target_max: 4,
            columns: 5,
            fps_cap: 30,
            sound: true,
            enable_color: true,
            allow_restart: false,
            seed: None,
        }
    }
}

impl Settings {
    /// Command-line flags win over the settings file for this run only.
    pub(crate) fn apply_args(&mut self, args: &Args) {
        if let Some(v) = args.target_min {
            self.target_min = v;
        }
        if let Some(v) = args.target_max {
            self.target_max = v;
        }
        if let Some(v) = args.columns {
            self.columns = v;
        }
        if let Some(v) = args.fps {
            self.fps_cap = v;
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if args.mute {
            self.sound = false;
        }
        if args.no_color {
            self.enable_color = false;
        }
        if args.allow_restart {
            self.allow_restart = true;
        }
    }

    pub(crate) fn validate(&self, catalog_len: usize) -> Result<()> {
        anyhow::ensure!(self.target_min >= 1, "target_min must be at least 1");
        anyhow::ensure!(
            self.target_min <= self.target_max,
            "target_min ({}) is larger than target_max ({})",
            self.target_min,
            self.target_max
        );
        anyhow::ensure!(
            self.target_max <= catalog_len,
            "target_max ({}) exceeds the {catalog_len} available items",
            self.target_max
        );
        anyhow::ensure!(self.columns >= 1, "columns must be at least 1");
        Ok(())
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "seektap", "SeekTap")
        .context("could not resolve project directories")?;
    let config_dir = proj.config_dir().to_path_buf();
    let data_dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&config_dir).ok();
    fs::create_dir_all(&data_dir).ok();
    Ok(Paths {
        settings_path: config_dir.join("settings.json"),
        log_path: data_dir.join("seektap.log"),
    })
}

/// Reads the settings file, writing defaults when it does not exist yet.
/// A file that exists but does not parse is left alone.
pub(crate) fn load_or_create_settings(path: &Path) -> Result<Settings> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(serde_json::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "bad settings file, using defaults");
            Settings::default()
        })),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let settings = Settings::default();
            save_settings_atomic(path, &settings)
                .with_context(|| format!("writing default settings to {}", path.display()))?;
            Ok(settings)
        }
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
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
    // rename-over-existing fails on Windows
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("seektap-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_are_valid() {
        Settings::default().validate(10).unwrap();
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let bad = |f: fn(&mut Settings)| {
            let mut s = Settings::default();
            f(&mut s);
            s.validate(10).is_err()
        };
        assert!(bad(|s| s.target_min = 0));
        assert!(bad(|s| s.target_min = 5));
        assert!(bad(|s| s.target_max = 11));
        assert!(bad(|s| s.columns = 0));
    }

    #[test]
    fn args_override_file_values() {
        let args = Args::parse_from([
            "seektap",
            "--target-min",
            "2",
            "--target-max",
            "6",
            "--seed",
            "42",
            "--mute",
        ]);
        let mut s = Settings::default();
        s.apply_args(&args);
        assert_eq!(s.target_min, 2);
        assert_eq!(s.target_max, 6);
        assert_eq!(s.seed, Some(42));
        assert!(!s.sound);
        assert!(s.enable_color);
        assert_eq!(s.columns, 5);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = scratch_dir("create");
        let path = dir.join("settings.json");
        let s = load_or_create_settings(&path).unwrap();
        assert_eq!(s, Settings::default());
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = scratch_dir("partial");
        let path = dir.join("settings.json");
        fs::write(&path, r#"{ "target_max": 6, "sound": false }"#).unwrap();
        let s = load_or_create_settings(&path).unwrap();
        assert_eq!(s.target_max, 6);
        assert!(!s.sound);
        assert_eq!(s.target_min, 3);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn broken_file_falls_back_without_overwriting() {
        let dir = scratch_dir("broken");
        let path = dir.join("settings.json");
        fs::write(&path, "{ nope").unwrap();
        let s = load_or_create_settings(&path).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ nope");
        let _ = fs::remove_dir_all(&dir);
    }
}
