//! Misère solver for three-hand trick-taking games on a 32-card deck
//!
//! Decides whether the declarer of a misère contract can lose every trick,
//! at two fidelities:
//! - a single-suit simulation (`max_unwanted_tricks`) that estimates how many
//!   tricks the opponents can force in one suit, and
//! - an exact trick tree (`TrickTree`) over all suits that certifies a line of
//!   play on which the declarer takes nothing.
//!
//! `MisereBot` combines both to pick discards and cards.
//!
//! # Example
//!
//! ```
//! use misere_solver::{max_unwanted_tricks, CardSet, MisereTable, Suit};
//!
//! let table = MisereTable::new();
//! let mine = CardSet::parse_suit(Suit::Spade, "A").unwrap();
//! let left = CardSet::parse_suit(Suit::Spade, "J").unwrap();
//! let data = max_unwanted_tricks(Suit::Spade, mine, left, CardSet::new(), false, &table);
//! assert_eq!(data.tricks_if_they_lead, 1);
//! assert!(!data.good);
//! ```

pub mod cards;
mod error;
mod hands;
mod misere;
mod pattern;
mod play;
mod policy;
mod suit;
mod tree;
pub mod types;

pub use cards::{Card, CardSet};
pub use error::Error;
pub use hands::Hands;
pub use misere::{Decision, Hole, MisereBot, Reason, HAND_WITH_TALON};
pub use pattern::{pack_bits, relative_cards, unpack_bits, RelativeHands};
pub use play::{playable_cards, PlayedCard, Position, Trick};
pub use policy::{DeclarerPolicy, NodeView};
pub use suit::{max_unwanted_tricks, max_unwanted_tricks_seated, ListData, MisereTable};
pub use tree::{BuildOutcome, NodeId, SearchMode, TreeConfig, TreeStats, TrickNode, TrickTree};
pub use types::{Rank, Seat, Suit, NUM_RANKS, NUM_SEATS, NUM_SUITS, TOTAL_CARDS, TOTAL_TRICKS};

#[cfg(test)]
mod tests;
