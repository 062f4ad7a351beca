//! The eight puzzle state machines of the chaos session.
//!
//! Each module owns one puzzle: its internal metric, its terminal
//! condition, and nothing else. All of them parameterize the shared
//! lifecycle plumbing from `crt_core` and report outcomes through an
//! [`EngineHandle`](crt_core::EngineHandle); none of them reach into the
//! engine or each other.

#![forbid(unsafe_code)]

pub mod clock;
pub mod error_page;
pub mod maze;
pub mod mime;
pub mod nav;
pub mod password;
pub mod search;
pub mod terminal;

pub use clock::TimeClock;
pub use error_page::ExistentialError;
pub use maze::IframeMaze;
pub use mime::MimeModal;
pub use nav::DrunkNav;
pub use password::ParanoidPassword;
pub use search::ConspiracySearch;
pub use terminal::SentientTerminal;

use crt_core::PuzzleBay;

/// Every puzzle id, in roster order.
pub const ALL_PUZZLE_IDS: [&str; 8] = [
    terminal::PUZZLE_ID,
    password::PUZZLE_ID,
    clock::PUZZLE_ID,
    nav::PUZZLE_ID,
    search::PUZZLE_ID,
    error_page::PUZZLE_ID,
    mime::PUZZLE_ID,
    maze::PUZZLE_ID,
];

/// Deposit the full roster into a bay for registration.
pub fn deposit_all(bay: &mut PuzzleBay) {
    bay.deposit(terminal::PUZZLE_ID, |h| Box::new(SentientTerminal::new(h)));
    bay.deposit(password::PUZZLE_ID, |h| Box::new(ParanoidPassword::new(h)));
    bay.deposit(clock::PUZZLE_ID, |h| Box::new(TimeClock::new(h)));
    bay.deposit(nav::PUZZLE_ID, |h| Box::new(DrunkNav::new(h)));
    bay.deposit(search::PUZZLE_ID, |h| Box::new(ConspiracySearch::new(h)));
    bay.deposit(error_page::PUZZLE_ID, |h| Box::new(ExistentialError::new(h)));
    bay.deposit(mime::PUZZLE_ID, |h| Box::new(MimeModal::new(h)));
    bay.deposit(maze::PUZZLE_ID, |h| Box::new(IframeMaze::new(h)));
}
