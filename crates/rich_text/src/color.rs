//! Color values and adaptive-color classification
//!
//! Text colors fall into three classes. Grayscale colors (equal red, green,
//! and blue channels) are "adaptive": they render as the platform's default
//! foreground so they follow light/dark appearance, and they are never
//! persisted as explicit colors. Pure black and pure white form a strict
//! subset of the adaptive grays. Everything else is a custom color that is
//! preserved exactly.

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing color channels for equality.
///
/// Colors constructed from different initializers carry residual floating
/// error, so channel comparison uses one 8-bit step in 0.0-1.0 space.
pub const CHANNEL_EPSILON: f32 = 1.0 / 255.0;

// =============================================================================
// Color
// =============================================================================

/// An RGBA color with channels in the 0.0 to 1.0 range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel (0.0 to 1.0)
    pub red: f32,
    /// Green channel (0.0 to 1.0)
    pub green: f32,
    /// Blue channel (0.0 to 1.0)
    pub blue: f32,
    /// Alpha channel (0.0 to 1.0)
    pub alpha: f32,
}

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
        alpha: 1.0,
    };

    /// Opaque white
    pub const WHITE: Color = Color {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
        alpha: 1.0,
    };

    /// Create a new color with explicit alpha
    pub fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Create an opaque color
    pub fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    /// Create an opaque gray with the given level on all three channels
    pub fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }

    /// Parse a color from a CSS hex string (`#rrggbb` or `#rrggbbaa`)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        let channel = |range: std::ops::Range<usize>| -> Option<f32> {
            let byte = u8::from_str_radix(digits.get(range)?, 16).ok()?;
            Some(byte as f32 / 255.0)
        };

        match digits.len() {
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format this color as a CSS hex string
    ///
    /// Opaque colors produce `#rrggbb`; translucent colors append the alpha
    /// byte as `#rrggbbaa`.
    pub fn to_hex(&self) -> String {
        let byte = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;

        if channels_equal(self.alpha, 1.0) {
            format!(
                "#{:02x}{:02x}{:02x}",
                byte(self.red),
                byte(self.green),
                byte(self.blue)
            )
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                byte(self.red),
                byte(self.green),
                byte(self.blue),
                byte(self.alpha)
            )
        }
    }

    /// Check whether this color is an adaptive gray
    ///
    /// A color is adaptive when its red, green, and blue channels are equal
    /// within [`CHANNEL_EPSILON`]. Includes pure black and pure white.
    pub fn is_adaptive_gray(&self) -> bool {
        channels_equal(self.red, self.green) && channels_equal(self.green, self.blue)
    }

    /// Check whether this color is exactly black or exactly white
    ///
    /// Strict subset of [`Color::is_adaptive_gray`]: all three channels sit
    /// at 0.0 or all three sit at 1.0, within [`CHANNEL_EPSILON`].
    pub fn is_fixed_black_or_white(&self) -> bool {
        self.is_adaptive_gray()
            && (channels_equal(self.red, 0.0) || channels_equal(self.red, 1.0))
    }

    /// Classify this color for serialization purposes
    pub fn classify(&self) -> ColorClass {
        if self.is_fixed_black_or_white() {
            ColorClass::FixedBlackOrWhite
        } else if self.is_adaptive_gray() {
            ColorClass::AdaptiveGray
        } else {
            ColorClass::Custom
        }
    }
}

/// Compare two channel values with floating-error tolerance
fn channels_equal(a: f32, b: f32) -> bool {
    (a - b).abs() <= CHANNEL_EPSILON
}

// =============================================================================
// Color Class
// =============================================================================

/// Serialization class of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorClass {
    /// All channels at exactly 0.0 or exactly 1.0; elided on encode
    FixedBlackOrWhite,
    /// Equal channels at any level; elided on encode
    AdaptiveGray,
    /// Distinct channels; preserved exactly
    Custom,
}

impl ColorClass {
    /// Whether colors of this class are elided from serialized output
    pub fn is_elided(&self) -> bool {
        matches!(self, ColorClass::FixedBlackOrWhite | ColorClass::AdaptiveGray)
    }
}

// =============================================================================
// Tests
// =============================================================================
