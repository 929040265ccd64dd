//! Material design inspired styling for the UI.
//!
//! All colors, spacing and widget styles live here so dialogs, the grid and
//! the lightbox share one look.

use iced::theme;
use iced::widget::{button, container};
use iced::{Border, Color, Theme};

/// Material color palette
pub struct Palette;

impl Palette {
    pub const PRIMARY: Color = Color { r: 0.25, g: 0.32, b: 0.71, a: 1.0 }; // Indigo 700
    pub const ON_PRIMARY: Color = Color::WHITE;
    pub const SUCCESS: Color = Color { r: 0.18, g: 0.49, b: 0.20, a: 1.0 };
    pub const SECONDARY: Color = Color { r: 0.61, g: 0.15, b: 0.69, a: 1.0 };
    pub const WARNING: Color = Color { r: 0.93, g: 0.42, b: 0.01, a: 1.0 };
    pub const SURFACE: Color = Color { r: 0.98, g: 0.98, b: 0.98, a: 1.0 };
    pub const ON_SURFACE: Color = Color { r: 0.1, g: 0.1, b: 0.1, a: 1.0 };
    pub const SELECTED: Color = Color { r: 0.0, g: 0.0, b: 1.0, a: 1.0 };
    pub const SCRIM: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.95 };
    pub const BUSY: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.5 };

    pub const SPACING: u16 = 16;
    pub const THUMB_HEIGHT: f32 = 180.0;
    pub const THUMB_WIDTH: f32 = 200.0;
    pub const FACE_WIDTH: f32 = 100.0;
    pub const GRID_COLUMNS: usize = 5;
}

struct FilledButton(Color);

impl button::StyleSheet for FilledButton {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(self.0.into()),
            text_color: Palette::ON_PRIMARY,
            border: Border {
                radius: 4.0.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Style for primary action buttons.
pub fn button_primary() -> theme::Button {
    theme::Button::Custom(Box::new(FilledButton(Palette::PRIMARY)))
}

pub fn button_success() -> theme::Button {
    theme::Button::Custom(Box::new(FilledButton(Palette::SUCCESS)))
}

pub fn button_secondary() -> theme::Button {
    theme::Button::Custom(Box::new(FilledButton(Palette::SECONDARY)))
}

pub fn button_warning() -> theme::Button {
    theme::Button::Custom(Box::new(FilledButton(Palette::WARNING)))
}

struct ThumbnailButton {
    selected: bool,
}

impl button::StyleSheet for ThumbnailButton {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: None,
            border: Border {
                color: if self.selected { Palette::SELECTED } else { Color::TRANSPARENT },
                width: 2.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        }
    }
}

/// Borderless button wrapping an image; `selected` draws a blue outline.
pub fn thumbnail(selected: bool) -> theme::Button {
    theme::Button::Custom(Box::new(ThumbnailButton { selected }))
}

struct Filled {
    background: Color,
    text: Color,
    border: Color,
}

impl container::StyleSheet for Filled {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            text_color: Some(self.text),
            background: Some(self.background.into()),
            border: Border {
                color: self.border,
                width: 1.0,
                radius: 4.0.into(),
            },
            shadow: Default::default(),
        }
    }
}

/// Container style that mimics Material "cards".
pub fn card() -> theme::Container {
    theme::Container::Custom(Box::new(Filled {
        background: Palette::SURFACE,
        text: Palette::ON_SURFACE,
        border: Palette::PRIMARY,
    }))
}

/// Near-black backdrop behind the lightbox.
pub fn scrim() -> theme::Container {
    theme::Container::Custom(Box::new(Filled {
        background: Palette::SCRIM,
        text: Palette::ON_PRIMARY,
        border: Color::TRANSPARENT,
    }))
}

/// Translucent backdrop shown while a request is outstanding.
pub fn busy_overlay() -> theme::Container {
    theme::Container::Custom(Box::new(Filled {
        background: Palette::BUSY,
        text: Palette::ON_PRIMARY,
        border: Color::TRANSPARENT,
    }))
}

/// Light panel holding the face crops next to the lightbox image.
pub fn face_sidebar() -> theme::Container {
    theme::Container::Custom(Box::new(Filled {
        background: Color { r: 1.0, g: 0.99, b: 0.99, a: 0.3 },
        text: Palette::ON_SURFACE,
        border: Color::TRANSPARENT,
    }))
}
