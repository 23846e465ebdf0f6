//! Signage catalog configuration.
//!
//! The storefront backend supplies admin-configured fonts, size presets,
//! palettes, and the physical board dimensions. The config is loaded once
//! per editing session and is read-only afterwards; when the backend is
//! unreachable the built-in defaults keep the composer usable (fail-open).

use crate::error::SignResult;
use crate::geometry::Size2;
use crate::net;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::time::Duration;

/// Design pixels per physical foot of sign.
pub const PX_PER_FT: f32 = 150.0;

/// Canvas height the size presets are authored against. Preset font sizes
/// and box dimensions scale by `canvas_height / REFERENCE_CANVAS_HEIGHT`.
pub const REFERENCE_CANVAS_HEIGHT: f32 = 1200.0;

/// Physical defaults applied until (or instead of) a backend config.
pub const DEFAULT_WIDTH_FT: f32 = 4.0;
pub const DEFAULT_HEIGHT_FT: f32 = 8.0;

/// Timeout for the one-shot config fetch.
const CONFIG_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// The fixed set of board overlay assets, referenced by path.
pub const BOARD_IMAGES: &[&str] = &[
    "/assets/signage/boards/vertical-board-1.png",
    "/assets/signage/boards/vertical-board-2.png",
    "/assets/signage/boards/vertical-board-3.png",
];

/// A selectable font: display name plus a font-family identifier token
/// (a CSS-style family list such as `'Dancing Script', cursive`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontChoice {
    pub name: String,
    pub value: String,
}

impl FontChoice {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Size preset keys, ordered small to extralarge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeKey {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeKey::Small => "small",
            SizeKey::Medium => "medium",
            SizeKey::Large => "large",
            SizeKey::ExtraLarge => "extralarge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "small" => Some(SizeKey::Small),
            "medium" => Some(SizeKey::Medium),
            "large" => Some(SizeKey::Large),
            "extralarge" => Some(SizeKey::ExtraLarge),
            _ => None,
        }
    }
}

/// A size preset authored at the reference canvas height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizePreset {
    /// Text box width in design pixels at the reference height.
    pub width: f32,
    /// Text box height in design pixels at the reference height.
    pub height: f32,
    /// Font size in design pixels at the reference height.
    pub font_size: f32,
    /// Price for this size, in store currency.
    pub price: f64,
}

/// Raw payload shape returned by the backend config endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigPayload {
    pub config: RemoteConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(default)]
    pub fonts: Vec<FontChoice>,
    #[serde(default)]
    pub sizes: Vec<RemoteSize>,
    #[serde(default)]
    pub text_colors: Vec<String>,
    #[serde(default)]
    pub background_gradients: Vec<String>,
    #[serde(default)]
    pub width_ft: Option<f32>,
    #[serde(default)]
    pub height_ft: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSize {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub price: f64,
}

/// Normalized signage catalog configuration. Immutable for the lifetime of
/// an editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct SignageConfig {
    /// Selectable fonts, de-duplicated by identifier. Never empty.
    pub fonts: Vec<FontChoice>,
    /// Size presets keyed by size key. Always contains `medium`.
    pub size_presets: BTreeMap<SizeKey, SizePreset>,
    /// Text color palette (CSS color strings).
    pub text_colors: Vec<String>,
    /// Background gradient identifiers.
    pub background_gradients: Vec<String>,
    /// Physical sign width in feet. Strictly positive.
    pub width_ft: f32,
    /// Physical sign height in feet. Strictly positive.
    pub height_ft: f32,
}

impl Default for SignageConfig {
    fn default() -> Self {
        let mut size_presets = BTreeMap::new();
        size_presets.insert(
            SizeKey::Small,
            SizePreset {
                width: 180.0,
                height: 44.0,
                font_size: 36.0,
                price: 45.0,
            },
        );
        size_presets.insert(
            SizeKey::Medium,
            SizePreset {
                width: 250.0,
                height: 60.0,
                font_size: 48.0,
                price: 65.0,
            },
        );
        size_presets.insert(
            SizeKey::Large,
            SizePreset {
                width: 330.0,
                height: 80.0,
                font_size: 64.0,
                price: 85.0,
            },
        );
        size_presets.insert(
            SizeKey::ExtraLarge,
            SizePreset {
                width: 420.0,
                height: 104.0,
                font_size: 84.0,
                price: 110.0,
            },
        );

        Self {
            fonts: vec![
                FontChoice::new("Roboto", "'Roboto', sans-serif"),
                FontChoice::new("Oswald", "'Oswald', sans-serif"),
                FontChoice::new("Playfair Display", "'Playfair Display', serif"),
                FontChoice::new("Dancing Script", "'Dancing Script', cursive"),
                FontChoice::new("Montserrat", "'Montserrat', sans-serif"),
            ],
            size_presets,
            text_colors: vec![
                "#ffffff".to_string(),
                "#111111".to_string(),
                "#d4af37".to_string(),
                "#c0392b".to_string(),
                "#2e86c1".to_string(),
            ],
            background_gradients: vec![
                "sunset".to_string(),
                "ocean".to_string(),
                "forest".to_string(),
                "midnight".to_string(),
                "blush".to_string(),
            ],
            width_ft: DEFAULT_WIDTH_FT,
            height_ft: DEFAULT_HEIGHT_FT,
        }
    }
}

impl SignageConfig {
    /// Fetch the catalog config from the backend. Fail-open: any network or
    /// decode error logs a warning and returns the built-in defaults, so the
    /// composer never blocks on a missing backend.
    pub fn fetch(url: &str) -> SignageConfig {
        match Self::try_fetch(url) {
            Ok(config) => config,
            Err(err) => {
                log::warn!(target: "config", "config fetch failed, using defaults: {}", err);
                SignageConfig::default()
            }
        }
    }

    /// Fetch the catalog config, surfacing errors to the caller.
    pub fn try_fetch(url: &str) -> SignResult<SignageConfig> {
        let value = net::fetch_json(url, CONFIG_FETCH_TIMEOUT)?;
        Self::from_value(value)
    }

    /// Build a config from an already-decoded JSON payload.
    pub fn from_value(value: serde_json::Value) -> SignResult<SignageConfig> {
        let payload: ConfigPayload = serde_json::from_value(value)?;
        Ok(Self::from_remote(payload.config))
    }

    /// Build a config from a JSON reader (local config files).
    pub fn from_reader(reader: impl std::io::Read) -> SignResult<SignageConfig> {
        let payload: ConfigPayload = serde_json::from_reader(reader)?;
        Ok(Self::from_remote(payload.config))
    }

    /// Normalize a backend payload over the built-in defaults.
    pub fn from_remote(remote: RemoteConfig) -> SignageConfig {
        let mut config = SignageConfig::default();

        // Fonts: backend order first, defaults appended, de-duplicated by
        // the family identifier token.
        let mut fonts = remote.fonts;
        fonts.extend(config.fonts.drain(..));
        let mut seen = HashSet::new();
        config.fonts = fonts
            .into_iter()
            .filter(|f| seen.insert(f.value.clone()))
            .collect();

        // Sizes: keyed mapping; unknown keys are dropped with a warning.
        if !remote.sizes.is_empty() {
            let mut presets = BTreeMap::new();
            for size in &remote.sizes {
                match SizeKey::parse(&size.key) {
                    Some(key) => {
                        presets.insert(
                            key,
                            SizePreset {
                                width: size.width,
                                height: size.height,
                                font_size: size.font_size,
                                price: size.price,
                            },
                        );
                    }
                    None => {
                        log::warn!(target: "config", "unknown size key {:?} dropped", size.key);
                    }
                }
            }
            // Keep the defaults for any key the backend did not supply, so
            // the fallback preset is always present.
            for (key, preset) in std::mem::take(&mut config.size_presets) {
                presets.entry(key).or_insert(preset);
            }
            config.size_presets = presets;
        }

        if !remote.text_colors.is_empty() {
            config.text_colors = remote.text_colors;
        }
        if !remote.background_gradients.is_empty() {
            config.background_gradients = remote.background_gradients;
        }
        if let Some(width_ft) = remote.width_ft {
            if width_ft > 0.0 {
                config.width_ft = width_ft;
            }
        }
        if let Some(height_ft) = remote.height_ft {
            if height_ft > 0.0 {
                config.height_ft = height_ft;
            }
        }

        config
    }

    /// Design canvas width in pixels, derived from the physical width.
    pub fn canvas_width(&self) -> f32 {
        self.width_ft * PX_PER_FT
    }

    /// Design canvas height in pixels, derived from the physical height.
    pub fn canvas_height(&self) -> f32 {
        self.height_ft * PX_PER_FT
    }

    pub fn canvas_size(&self) -> Size2 {
        Size2::new(self.canvas_width(), self.canvas_height())
    }

    /// Scale applied to preset font sizes and box dimensions so proportions
    /// stay consistent on a differently-sized board.
    pub fn text_scale_factor(&self) -> f32 {
        self.canvas_height() / REFERENCE_CANVAS_HEIGHT
    }

    /// Preset for `key`, falling back to `medium`, then to the first
    /// available preset.
    pub fn preset(&self, key: SizeKey) -> SizePreset {
        self.size_presets
            .get(&key)
            .or_else(|| self.size_presets.get(&SizeKey::Medium))
            .or_else(|| self.size_presets.values().next())
            .copied()
            .unwrap_or(SizePreset {
                width: 250.0,
                height: 60.0,
                font_size: 48.0,
                price: 0.0,
            })
    }

    /// Price for `key`, with the same fallback chain as [`preset`], ending
    /// at 0 if no presets exist at all.
    ///
    /// [`preset`]: SignageConfig::preset
    pub fn price(&self, key: SizeKey) -> f64 {
        self.size_presets
            .get(&key)
            .or_else(|| self.size_presets.get(&SizeKey::Medium))
            .map(|p| p.price)
            .unwrap_or(0.0)
    }

    /// First font in the catalog; the list is never empty.
    pub fn default_font(&self) -> &FontChoice {
        &self.fonts[0]
    }

    /// Whether `value` names a font in the catalog.
    pub fn has_font(&self, value: &str) -> bool {
        self.fonts.iter().any(|f| f.value == value)
    }
}
