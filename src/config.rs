//! External configuration loader.
//!
//! Reads `glyphworks.toml` from the executable's directory (or CWD), or the
//! file named with `--config`. Missing keys fall back to defaults.

use crate::error::{GlyphworksError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "glyphworks.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct Config {
    pub message: MessageConfig,
    pub display: DisplayConfig,
    pub general: GeneralConfig,
    /// Messages raised while loading, before logging exists.
    notes: Vec<(log::Level, String)>,
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub text: String,
    pub font: Option<PathBuf>,
    pub stride: usize,        // sample every Nth off-screen pixel
    pub font_scale: f32,      // font size as a fraction of min(width, height)
    pub hold_ticks: u64,
    pub cadence_min: u32,     // explosions between messages, inclusive
    pub cadence_max: u32,     // exclusive
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub scale: f32,           // logical units per terminal pixel
    pub fps: u32,
    pub bg_color: (u8, u8, u8),
    pub sky_alpha: u8,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    message: TomlMessage,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlMessage {
    #[serde(default = "default_text")]
    text: String,
    #[serde(default)]
    font: Option<String>,
    #[serde(default = "default_stride")]
    stride: usize,
    #[serde(default = "default_font_scale")]
    font_scale: f32,
    #[serde(default = "default_hold_ticks")]
    hold_ticks: u64,
    #[serde(default = "default_cadence_min")]
    cadence_min: u32,
    #[serde(default = "default_cadence_max")]
    cadence_max: u32,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_scale")]
    scale: f32,
    #[serde(default = "default_fps")]
    fps: u32,
    #[serde(default = "default_bg_color")]
    bg_color: String,
    #[serde(default = "default_sky_alpha")]
    sky_alpha: u8,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_text() -> String { "HAPPY BIRTHDAY!".into() }
fn default_stride() -> usize { 8 }
fn default_font_scale() -> f32 { 0.2 }
fn default_hold_ticks() -> u64 { 180 }   // 3s at 60 ticks/s
fn default_cadence_min() -> u32 { 4 }
fn default_cadence_max() -> u32 { 8 }
fn default_scale() -> f32 { 8.0 }
fn default_fps() -> u32 { 60 }
fn default_bg_color() -> String { "000000".into() }
fn default_sky_alpha() -> u8 { 14 }
fn default_log_file() -> String { "glyphworks.log".into() }

impl Default for TomlMessage {
    fn default() -> Self {
        TomlMessage {
            text: default_text(),
            font: None,
            stride: default_stride(),
            font_scale: default_font_scale(),
            hold_ticks: default_hold_ticks(),
            cadence_min: default_cadence_min(),
            cadence_max: default_cadence_max(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            scale: default_scale(),
            fps: default_fps(),
            bg_color: default_bg_color(),
            sky_alpha: default_sky_alpha(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            log_file: default_log_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::build(TomlConfig::default(), (0, 0, 0))
    }
}

// ── Loading ──

impl Config {
    /// Load config from an explicit path, or search for `glyphworks.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// An explicit path must exist; a missing searched file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for dir in candidate_dirs() {
            let path = dir.join(CONFIG_FILE);
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        let mut config = Self::default();
        config.note(log::Level::Debug, format!("no {CONFIG_FILE} found, using defaults"));
        Ok(config)
    }

    /// What happened while loading, oldest first.
    pub fn load_notes(&self) -> &[(log::Level, String)] {
        &self.notes
    }

    /// Replays the load notes; call once the logger is installed.
    pub fn log_load_notes(&self) {
        for (level, message) in &self.notes {
            log::log!(*level, "{message}");
        }
    }

    fn note(&mut self, level: log::Level, message: String) {
        self.notes.push((level, message));
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GlyphworksError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text, path)?;
        config.note(log::Level::Info, format!("loaded config from {}", path.display()));
        Ok(config)
    }

    /// `origin` is only used for error messages.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        let schema: TomlConfig = toml::from_str(text).map_err(|source| GlyphworksError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })?;
        let bg_color = parse_hex_color(&schema.display.bg_color)?;
        Ok(Self::build(schema, bg_color))
    }

    fn build(toml_cfg: TomlConfig, bg_color: (u8, u8, u8)) -> Self {
        let m = toml_cfg.message;
        let d = toml_cfg.display;
        let g = toml_cfg.general;

        let mut notes = Vec::new();
        let cadence_min = m.cadence_min.max(1);
        let cadence_max = if m.cadence_max > cadence_min {
            m.cadence_max
        } else {
            notes.push((
                log::Level::Warn,
                format!("cadence_max {} <= cadence_min {cadence_min}, widening", m.cadence_max),
            ));
            cadence_min + 1
        };

        Config {
            message: MessageConfig {
                text: m.text,
                font: m.font.map(PathBuf::from),
                stride: m.stride.max(1),
                font_scale: m.font_scale.clamp(0.01, 1.0),
                hold_ticks: m.hold_ticks,
                cadence_min,
                cadence_max,
            },
            display: DisplayConfig {
                scale: d.scale.max(1.0),
                fps: d.fps.clamp(1, 240),
                bg_color,
                sky_alpha: d.sky_alpha,
            },
            general: GeneralConfig {
                seed: g.seed,
                log_file: if g.log_file.is_empty() { None } else { Some(PathBuf::from(g.log_file)) },
            },
            notes,
        }
    }
}

pub fn parse_hex_color(hex: &str) -> Result<(u8, u8, u8)> {
    let invalid = || GlyphworksError::InvalidColor(hex.to_string());
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }

    let r = u8::from_str_radix(&digits[0..2], 16).map_err(|_| invalid())?;
    let g = u8::from_str_radix(&digits[2..4], 16).map_err(|_| invalid())?;
    let b = u8::from_str_radix(&digits[4..6], 16).map_err(|_| invalid())?;

    Ok((r, g, b))
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config> {
        Config::from_toml_str(text, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.message.text, "HAPPY BIRTHDAY!");
        assert_eq!(cfg.message.stride, 8);
        assert_eq!(cfg.message.hold_ticks, 180);
        assert_eq!((cfg.message.cadence_min, cfg.message.cadence_max), (4, 8));
        assert_eq!(cfg.display.fps, 60);
        assert_eq!(cfg.display.sky_alpha, 14);
        assert_eq!(cfg.display.bg_color, (0, 0, 0));
        assert!(cfg.general.seed.is_none());
        assert_eq!(cfg.general.log_file.as_deref(), Some(Path::new("glyphworks.log")));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse(
            r#"
            [message]
            text = "HI"
            hold_ticks = 90

            [display]
            bg_color = "1a1b26"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.message.text, "HI");
        assert_eq!(cfg.message.hold_ticks, 90);
        assert_eq!(cfg.message.stride, 8);
        assert_eq!(cfg.display.bg_color, (0x1a, 0x1b, 0x26));
        assert_eq!(cfg.display.scale, 8.0);
    }

    #[test]
    fn degenerate_values_are_clamped() {
        let cfg = parse(
            r#"
            [message]
            stride = 0
            cadence_min = 6
            cadence_max = 3

            [display]
            scale = 0.25
            fps = 0

            [general]
            log_file = ""
            "#,
        )
        .unwrap();
        assert_eq!(cfg.message.stride, 1);
        assert_eq!((cfg.message.cadence_min, cfg.message.cadence_max), (6, 7));
        assert_eq!(cfg.display.scale, 1.0);
        assert_eq!(cfg.display.fps, 1);
        assert!(cfg.general.log_file.is_none());

        let (level, note) = &cfg.load_notes()[0];
        assert_eq!(*level, log::Level::Warn);
        assert!(note.contains("widening"), "{note}");
    }

    #[test]
    fn clean_config_has_no_warnings() {
        let cfg = parse("[message]\ncadence_min = 2\ncadence_max = 5").unwrap();
        assert!(cfg.load_notes().is_empty());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = parse("[message\ntext = 1").unwrap_err();
        assert!(matches!(err, GlyphworksError::ConfigParse { .. }));
    }

    #[test]
    fn bad_bg_color_is_an_error() {
        let err = parse("[display]\nbg_color = \"zz0000\"").unwrap_err();
        assert!(matches!(err, GlyphworksError::InvalidColor(_)));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, GlyphworksError::ConfigRead { .. }));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ff8000").unwrap(), (255, 128, 0));
        assert_eq!(parse_hex_color("0a0B0c").unwrap(), (10, 11, 12));
        assert!(parse_hex_color("fff").is_err());
        assert!(parse_hex_color("ééé").is_err());
    }
}
