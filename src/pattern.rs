//! Seat-relative hand patterns
//!
//! Two positions are strategically identical when, suit by suit, every seat
//! holds the same *relative* ranks among the cards still in play. Packing
//! each hand against the cards in play squeezes out the gaps left by cards
//! already gone, so such positions share one key.

use super::cards::{mask_of, CardSet};
use super::hands::Hands;
use super::types::*;

/// Pack bits: extract bits from source where mask has 1s, compress them to low bits
/// Example: pack_bits(0b10100, 0b11100) = 0b101 (extracts bits 2,3,4 and packs to 0,1,2)
#[inline]
pub fn pack_bits(source: u32, mask: u32) -> u32 {
    if source == 0 {
        return 0;
    }
    let mut packed = 0u32;
    let mut bit = 1u32;
    let mut m = mask;
    while m != 0 {
        let lowest = m & m.wrapping_neg(); // isolate lowest bit
        if source & lowest != 0 {
            packed |= bit;
        }
        bit <<= 1;
        m &= m - 1; // clear lowest bit
    }
    packed
}

/// Unpack bits: scatter source bits to positions where mask has 1s
/// Example: unpack_bits(0b101, 0b11100) = 0b10100 (scatters bits 0,1,2 to positions 2,3,4)
#[inline]
pub fn unpack_bits(source: u32, mask: u32) -> u32 {
    if source == 0 {
        return 0;
    }
    let mut unpacked = 0u32;
    let mut bit = 1u32;
    let mut src = source;
    let mut m = mask;
    while src != 0 && m != 0 {
        if src & bit != 0 {
            unpacked |= m & m.wrapping_neg();
            src &= !bit;
        }
        bit <<= 1;
        m &= m - 1;
    }
    unpacked
}

/// Normalise one holding against the cards in play, suit by suit.
/// The lowest card in play of each suit becomes the seven of that suit.
pub fn relative_cards(hand: CardSet, in_play: CardSet) -> CardSet {
    let mut bits = 0u32;
    for suit in Suit::ALL {
        let shift = suit.index() * NUM_RANKS;
        let mask = mask_of(suit);
        let packed = pack_bits(hand.value() & mask, in_play.value() & mask);
        // pack_bits compresses to bit 0; move it back into the suit's segment
        bits |= packed << shift;
    }
    CardSet::from_bits(bits)
}

/// Hands with cards normalized within each suit, relative to the cards in play
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct RelativeHands {
    pub hands: [CardSet; NUM_SEATS],
}

impl RelativeHands {
    pub fn compute(hands: &Hands) -> Self {
        let in_play = hands.all_cards();
        let mut relative = RelativeHands::default();
        for seat in 0..NUM_SEATS {
            relative.hands[seat] = relative_cards(hands[seat], in_play);
        }
        relative
    }

    /// Map relative cards of one seat back to real cards
    pub fn restore(&self, seat: Seat, in_play: CardSet) -> CardSet {
        let mut bits = 0u32;
        for suit in Suit::ALL {
            let shift = suit.index() * NUM_RANKS;
            let mask = mask_of(suit);
            let packed = (self.hands[seat].value() & mask) >> shift;
            bits |= unpack_bits(packed, in_play.value() & mask);
        }
        CardSet::from_bits(bits)
    }
}
