//! Renders engine intent onto a terminal. All output is line-oriented and
//! best-effort: a write failure is logged and dropped, never propagated
//! back into the engine.

use std::io::{self, Write};

use crossterm::style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::queue;

use crt_core::{ChaosEvent, EventSink, SoundCue};

use crate::style::{effect_marker, notification_style, theme_palette};

const BEL: &str = "\x07";

/// Terminal-facing event sink.
#[derive(Debug, Default)]
pub struct TtyPresenter;

impl TtyPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TtyPresenter {
    fn emit(&self, event: ChaosEvent) {
        let mut out = io::stdout();
        if let Err(err) = render(&mut out, &event) {
            tracing::debug!(%err, "dropped a render");
        }
    }
}

/// Write one event as styled terminal output.
fn render(out: &mut impl Write, event: &ChaosEvent) -> io::Result<()> {
    match event {
        ChaosEvent::Notification { message, kind } => {
            let (prefix, color) = notification_style(*kind);
            queue!(
                out,
                SetForegroundColor(color),
                Print(prefix),
                ResetColor,
                Print(" "),
                Print(message),
                Print("\r\n"),
            )?;
        }
        ChaosEvent::ThemeChanged(theme) => {
            let palette = theme_palette(*theme);
            queue!(
                out,
                SetForegroundColor(palette.fg),
                SetBackgroundColor(palette.bg),
                Print(format!("  ── theme: {theme} ──  ")),
                ResetColor,
                Print("\r\n"),
            )?;
        }
        ChaosEvent::GlitchBurst(effects) => {
            for staged in effects {
                queue!(
                    out,
                    Print(format!(
                        "{} (+{}ms)\r\n",
                        effect_marker(staged.effect),
                        staged.offset.as_millis()
                    )),
                )?;
            }
        }
        ChaosEvent::Flicker => {
            queue!(out, Print("·flicker·\r\n"))?;
        }
        ChaosEvent::ClearGlitches => {
            queue!(out, ResetColor, Print("[glitches cleared]\r\n"))?;
        }
        ChaosEvent::Sound(cue) => {
            // Best-effort: BEL plus a label for terminals with the bell off.
            queue!(out, Print(BEL), Print(format!("♪ {}\r\n", sound_label(*cue))))?;
        }
        ChaosEvent::ChaosMeter(level) => {
            queue!(out, Print(format!("{}\r\n", meter_line(*level))))?;
        }
        ChaosEvent::VictoryDeclared => {
            queue!(
                out,
                Print("═══ REALITY RESTORED — ALL PUZZLES SOLVED ═══\r\n"),
            )?;
        }
    }
    out.flush()
}

fn sound_label(cue: SoundCue) -> &'static str {
    match cue {
        SoundCue::Glitch => "glitch",
        SoundCue::Error => "error",
        SoundCue::Success => "success",
        SoundCue::Typing => "typing",
    }
}

/// Ten-segment chaos meter, e.g. `chaos [######····] 6.0`.
fn meter_line(level: f64) -> String {
    let filled = (level.round().clamp(0.0, 10.0)) as usize;
    let bar: String = "#".repeat(filled) + &"·".repeat(10 - filled);
    format!("chaos [{bar}] {level:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crt_core::{GlitchEffect, NotificationKind, StaggeredEffect, Theme};
    use std::time::Duration;

    fn rendered(event: ChaosEvent) -> String {
        let mut buf = Vec::new();
        render(&mut buf, &event).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn notification_carries_prefix_and_message() {
        let text = rendered(ChaosEvent::Notification {
            message: "The chaos grows...".into(),
            kind: NotificationKind::Warning,
        });
        assert!(text.contains("[WRN]"));
        assert!(text.contains("The chaos grows..."));
    }

    #[test]
    fn meter_line_scales_with_level() {
        assert_eq!(meter_line(0.0), "chaos [··········] 0.0");
        assert_eq!(meter_line(6.0), "chaos [######····] 6.0");
        assert_eq!(meter_line(10.0), "chaos [##########] 10.0");
    }

    #[test]
    fn meter_line_survives_out_of_range_input() {
        assert!(meter_line(42.0).contains("##########"));
    }

    #[test]
    fn burst_lists_every_effect_with_offsets() {
        let text = rendered(ChaosEvent::GlitchBurst(vec![
            StaggeredEffect {
                effect: GlitchEffect::ScreenTear,
                offset: Duration::from_millis(0),
            },
            StaggeredEffect {
                effect: GlitchEffect::Pixelate,
                offset: Duration::from_millis(100),
            },
        ]));
        assert!(text.contains("SCREEN TEAR"));
        assert!(text.contains("(+100ms)"));
    }

    #[test]
    fn sound_rings_the_bell() {
        let text = rendered(ChaosEvent::Sound(SoundCue::Success));
        assert!(text.contains('\x07'));
        assert!(text.contains("success"));
    }

    #[test]
    fn theme_banner_names_the_theme() {
        let text = rendered(ChaosEvent::ThemeChanged(Theme::Matrix));
        assert!(text.contains("matrix"));
    }

    #[test]
    fn victory_banner_renders() {
        let text = rendered(ChaosEvent::VictoryDeclared);
        assert!(text.contains("REALITY RESTORED"));
    }
}
