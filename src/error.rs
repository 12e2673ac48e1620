//! Errors raised at the input boundary (parsing and validating deals).
//!
//! The analysis itself never fails: empty suits give zero-trick results and a
//! missing guaranteed line is reported as `None`.

use super::cards::{Card, CardSet};
use super::types::Seat;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid card {0:?}")]
    InvalidCard(String),

    #[error("invalid hand {text:?}: {reason}")]
    InvalidHand { text: String, reason: &'static str },

    #[error("expected {expected} hands, found {found}")]
    InvalidHands { expected: usize, found: usize },

    #[error("seats {first} and {second} both hold {cards}")]
    OverlappingHands {
        first: Seat,
        second: Seat,
        cards: CardSet,
    },

    #[error("hand sizes {sizes:?} cannot come from one trick sequence")]
    UnevenHands { sizes: [usize; 3] },

    #[error("invalid seat {0:?}")]
    InvalidSeat(String),

    #[error("seat {seat} cannot play {card}")]
    IllegalPlay { seat: Seat, card: Card },

    #[error("invalid discard: {0}")]
    InvalidDiscard(&'static str),

    #[error("seat {seat} asked to play while seat {to_play} is on turn")]
    NotOnTurn { seat: Seat, to_play: Seat },
}
