mod loader;
pub mod template;

use serde::{Deserialize, Serialize};

use crate::color::Color;
pub use crate::log::LogConfig;

pub use loader::{config_dir, config_path, load, parse, try_load};

/// Default caption border color.
pub const DEFAULT_BORDER_COLOR: &str = "#2d2d30";
/// Default glow halo color.
pub const DEFAULT_GLOW_COLOR: &str = "#3c8ce7";
/// Default delay before the glow reappears after a restore, in ms.
///
/// Tuned by eye against the Windows 10/11 restore animation, not measured.
pub const DEFAULT_SETTLE_MS: u64 = 150;

/// Top-level configuration for Halo.
///
/// Loaded from `~/.config/halo/config.toml`. Missing sections fall back
/// to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Caption bar and button settings.
    pub caption: CaptionConfig,
    /// Glow halo settings.
    pub glow: GlowConfig,
    /// File logging settings.
    pub logging: LogConfig,
}

/// Caption bar settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Draw a separator border under the caption bar.
    pub show_caption_border: bool,
    /// Allow maximizing via the button and caption double-click.
    pub can_maximize: bool,
    /// Show the close button.
    pub show_close_button: bool,
    /// Show the minimize button.
    pub show_minimize_button: bool,
    /// Hex color of the window border.
    pub border_color: String,
    /// Entries of the caption menu, in display order.
    pub menu: Vec<MenuCommand>,
}

/// A caption menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCommand {
    /// Command identifier delivered to the application.
    pub id: String,
    /// Text shown in the menu.
    pub label: String,
}

/// Glow halo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowConfig {
    /// Whether the glow overlay is created at all.
    pub enabled: bool,
    /// Hex color of the glow.
    pub color: String,
    /// Outward margin around the window, in device-independent units.
    pub margin: f64,
    /// Delay after a restore before the glow reappears, in milliseconds.
    pub settle_ms: u64,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            show_caption_border: true,
            can_maximize: true,
            show_close_button: true,
            show_minimize_button: true,
            border_color: DEFAULT_BORDER_COLOR.into(),
            menu: Vec::new(),
        }
    }
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: DEFAULT_GLOW_COLOR.into(),
            margin: crate::geometry::GLOW_MARGIN,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

impl Config {
    /// Clamps values to safe ranges and replaces unparsable colors.
    pub fn validate(&mut self) {
        if !self.glow.margin.is_finite() {
            self.glow.margin = crate::geometry::GLOW_MARGIN;
        }
        self.glow.margin = self.glow.margin.clamp(0.0, 64.0);
        self.glow.settle_ms = self.glow.settle_ms.min(2000);

        if Color::from_hex(&self.glow.color).is_none() {
            self.glow.color = DEFAULT_GLOW_COLOR.into();
        }
        if Color::from_hex(&self.caption.border_color).is_none() {
            self.caption.border_color = DEFAULT_BORDER_COLOR.into();
        }
        self.caption.menu.retain(|m| !m.id.trim().is_empty());
        self.logging.backups = self.logging.backups.clamp(1, 9);
    }

    /// Parsed border color. Falls back to the default on bad input.
    pub fn border_color(&self) -> Color {
        Color::from_hex(&self.caption.border_color).unwrap_or(Color::rgb(0x2D, 0x2D, 0x30))
    }

    /// Parsed glow color. Falls back to the default on bad input.
    pub fn glow_color(&self) -> Color {
        Color::from_hex(&self.glow.color).unwrap_or(Color::rgb(0x3C, 0x8C, 0xE7))
    }
}
