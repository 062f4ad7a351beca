//! Terminal presentation for the chaos session.
//!
//! Consumes [`ChaosEvent`](crt_core::ChaosEvent) intents and renders them
//! as styled lines with crossterm. Holds no engine state; the mapping from
//! themes and effects to styling lives in [`style`] and is pure.

#![forbid(unsafe_code)]

pub mod presenter;
pub mod style;

pub use presenter::TtyPresenter;
pub use style::{effect_marker, notification_style, theme_palette, Palette};
