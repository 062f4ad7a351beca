//! Pure mappings from engine intent to terminal styling. No I/O here.

use crossterm::style::Color;

use crt_core::{GlitchEffect, NotificationKind, Theme};

/// Foreground/background pair for a theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
}

/// The color scheme each theme renders with.
#[must_use]
pub fn theme_palette(theme: Theme) -> Palette {
    match theme {
        Theme::Normal => Palette {
            fg: Color::Green,
            bg: Color::Black,
        },
        Theme::Inverted => Palette {
            fg: Color::Black,
            bg: Color::Green,
        },
        Theme::Monochrome => Palette {
            fg: Color::Grey,
            bg: Color::Black,
        },
        Theme::Glitch => Palette {
            fg: Color::Magenta,
            bg: Color::Black,
        },
        Theme::Matrix => Palette {
            fg: Color::Rgb { r: 0, g: 255, b: 65 },
            bg: Color::Black,
        },
    }
}

/// Prefix tag and color for a notification line.
#[must_use]
pub fn notification_style(kind: NotificationKind) -> (&'static str, Color) {
    match kind {
        NotificationKind::System => ("[SYS]", Color::Cyan),
        NotificationKind::Success => ("[OK ]", Color::Green),
        NotificationKind::Warning => ("[WRN]", Color::Yellow),
        NotificationKind::Error => ("[ERR]", Color::Red),
        NotificationKind::Victory => ("[***]", Color::Magenta),
    }
}

/// Short marker rendered while a glitch effect is in flight.
#[must_use]
pub fn effect_marker(effect: GlitchEffect) -> &'static str {
    match effect {
        GlitchEffect::ScreenTear => "▞▞▞ SCREEN TEAR ▞▞▞",
        GlitchEffect::Pixelate => "░▒▓ PIXELATE ▓▒░",
        GlitchEffect::ColorShift => "◐◓◑ COLOR SHIFT ◐◓◑",
        GlitchEffect::TextScramble => "t̷e̷x̷t̷ ̷s̷c̷r̷a̷m̷b̷l̷e̷",
        GlitchEffect::ElementShake => "≋≋≋ SHAKE ≋≋≋",
    }
}
