//! Per-component styling attributes.

use std::sync::Arc;

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// An opaque font handle. Rasterization happens outside the toolkit core.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    family: Arc<str>,
    size: f32,
}

impl Font {
    pub fn new(family: impl Into<Arc<str>>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size(&self) -> f32 {
        self.size
    }
}

/// The styling attributes a component carries into painting.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub foreground: Color,
    pub background: Color,
    pub font: Option<Font>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            foreground: Color::BLACK,
            background: Color::TRANSPARENT,
            font: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_rgb8() {
        let c = Color::from_rgb8(255, 0, 51);
        assert_eq!(c, Color::rgb(1.0, 0.0, 0.2));
    }

    #[test]
    fn test_font_handle() {
        let font = Font::new("Inter", 13.0);
        assert_eq!(font.family(), "Inter");
        assert_eq!(font.size(), 13.0);
        assert_eq!(font.clone(), font);
    }
}
