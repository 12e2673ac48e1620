//! Three hands representation - allocation-free
//!
//! Uses a fixed-size array of CardSet (3 × u32), no heap allocation.

use super::cards::*;
use super::error::Error;
use super::types::*;
use std::str::FromStr;

/// Three hands, one per seat - no heap allocation
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hands {
    hands: [CardSet; NUM_SEATS],
}

impl Hands {
    /// Create empty hands
    #[inline]
    pub const fn new() -> Self {
        Hands {
            hands: [CardSet::new(); NUM_SEATS],
        }
    }

    #[inline]
    pub const fn from_array(hands: [CardSet; NUM_SEATS]) -> Self {
        Hands { hands }
    }

    #[inline]
    pub fn as_array(&self) -> [CardSet; NUM_SEATS] {
        self.hands
    }

    /// Get hand for a seat
    #[inline]
    pub fn hand(&self, seat: Seat) -> CardSet {
        self.hands[seat]
    }

    /// Get all cards across all hands
    #[inline]
    pub fn all_cards(&self) -> CardSet {
        CardSet::merge(&self.hands)
    }

    /// Cards held by the two other seats
    #[inline]
    pub fn opponent_cards(&self, seat: Seat) -> CardSet {
        self.hands[left_of(seat)].union(self.hands[right_of(seat)])
    }

    /// Get number of tricks left (largest hand, so mid-trick positions count the open trick)
    #[inline]
    pub fn num_tricks(&self) -> usize {
        self.hands.iter().map(|h| h.size()).max().unwrap_or(0)
    }

    /// Hand sizes by seat
    #[inline]
    pub fn sizes(&self) -> [usize; NUM_SEATS] {
        [self.hands[0].size(), self.hands[1].size(), self.hands[2].size()]
    }

    /// Check that no card is held twice
    pub fn validate(&self) -> Result<(), Error> {
        for first in 0..NUM_SEATS {
            for second in first + 1..NUM_SEATS {
                let shared = self.hands[first].intersect(self.hands[second]);
                if !shared.is_empty() {
                    return Err(Error::OverlappingHands {
                        first,
                        second,
                        cards: shared,
                    });
                }
            }
        }
        Ok(())
    }

    /// Check that the hands are consistent with a trick led by `leader` and
    /// already joined by `played` seats: those seats hold one card fewer.
    pub fn validate_sizes(&self, leader: Seat, played: usize) -> Result<(), Error> {
        let sizes = self.sizes();
        let full = sizes[(leader + played) % NUM_SEATS];
        for offset in 0..NUM_SEATS {
            let seat = (leader + offset) % NUM_SEATS;
            let expected = if offset < played { full.wrapping_sub(1) } else { full };
            if sizes[seat] != expected {
                return Err(Error::UnevenHands { sizes });
            }
        }
        Ok(())
    }
}

impl std::ops::Index<Seat> for Hands {
    type Output = CardSet;

    #[inline]
    fn index(&self, seat: Seat) -> &Self::Output {
        &self.hands[seat]
    }
}

impl std::ops::IndexMut<Seat> for Hands {
    #[inline]
    fn index_mut(&mut self, seat: Seat) -> &mut Self::Output {
        &mut self.hands[seat]
    }
}

impl std::fmt::Debug for Hands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for seat in 0..NUM_SEATS {
            write!(f, "{}: {} ", seat, self.hands[seat])?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Hands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.hands[0], self.hands[1], self.hands[2])
    }
}

impl FromStr for Hands {
    type Err = Error;

    /// Parse three whitespace-separated hands, e.g. `"789.7..7 XJ.8..8 QK.9..9"`.
    /// An optional `"1:"` prefix names the seat of the first hand; the rest follow clockwise.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (start_seat, rest) = if s.len() >= 2 && s.chars().nth(1) == Some(':') {
            let seat_char = s.chars().next().unwrap_or('?');
            let seat = char_to_seat(seat_char)
                .ok_or_else(|| Error::InvalidSeat(seat_char.to_string()))?;
            (seat, &s[2..])
        } else {
            (0, s)
        };

        let hand_strs: Vec<&str> = rest.split_whitespace().collect();
        if hand_strs.len() != NUM_SEATS {
            return Err(Error::InvalidHands {
                expected: NUM_SEATS,
                found: hand_strs.len(),
            });
        }

        let mut hands = Hands::new();
        for (i, hand_str) in hand_strs.iter().enumerate() {
            let seat = (start_seat + i) % NUM_SEATS;
            hands.hands[seat] = hand_str.parse()?;
        }
        hands.validate()?;
        Ok(hands)
    }
}
