//! Cards bitboard representation
//!
//! Uses a 32-bit integer where each bit represents a card.
//! Each suit owns a contiguous 8-bit segment, ranks ascending inside it:
//! bit 0 = Spade 7, bit 7 = Spade A, bit 8 = Club 7, ..., bit 31 = Heart A.
//! Ascending bit order is therefore the canonical (suit, rank) order, and
//! inside one suit it is also trick order.

use super::error::Error;
use super::types::*;
use std::fmt;
use std::str::FromStr;

/// Get mask for a suit (8 bits)
#[inline]
pub const fn mask_of(suit: Suit) -> u32 {
    0xFFu32 << (suit.index() * NUM_RANKS)
}

/// One card of the 32-card deck, stored as its bit index
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    #[inline]
    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Card((suit.index() * NUM_RANKS + rank.index()) as u8)
    }

    /// Card for a bit index, or `None` past the end of the deck
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < TOTAL_CARDS {
            Some(Card(index as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn suit(self) -> Suit {
        match self.0 as usize / NUM_RANKS {
            0 => Suit::Spade,
            1 => Suit::Club,
            2 => Suit::Diamond,
            _ => Suit::Heart,
        }
    }

    #[inline]
    pub fn rank(self) -> Rank {
        Rank::ALL[self.0 as usize % NUM_RANKS]
    }

    #[inline]
    const fn bit(self) -> u32 {
        1u32 << self.0
    }

    /// Trick order: true if both cards share a suit and `self` ranks higher.
    /// Cards of different suits never beat each other.
    #[inline]
    pub fn beats(self, other: Card) -> bool {
        self.suit() == other.suit() && self.0 > other.0
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit().letter(), self.rank().letter())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit().letter(), self.rank().letter())
    }
}

impl FromStr for Card {
    type Err = Error;

    /// Parse `"SA"`, `"hX"` or `"D10"` (suit letter first)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidCard(s.to_string());
        let mut chars = s.trim().chars();
        let suit = chars.next().and_then(Suit::from_char).ok_or_else(invalid)?;
        let rest: String = chars.collect();
        let rank = match rest.as_str() {
            "10" => Rank::Ten,
            r if r.chars().count() == 1 => r
                .chars()
                .next()
                .and_then(Rank::from_char)
                .ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };
        Ok(Card::new(suit, rank))
    }
}

/// A subset of the deck represented as a 32-bit bitboard
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CardSet {
    bits: u32,
}

impl CardSet {
    /// All 32 cards
    pub const FULL_DECK: CardSet = CardSet { bits: u32::MAX };

    /// Create empty card set
    #[inline]
    pub const fn new() -> Self {
        CardSet { bits: 0 }
    }

    /// Create from raw bits
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        CardSet { bits }
    }

    /// Build a single-suit set from an 8-bit rank pattern (bit 0 = seven)
    #[inline]
    pub const fn from_pattern(suit: Suit, pattern: u8) -> Self {
        CardSet {
            bits: (pattern as u32) << (suit.index() * NUM_RANKS),
        }
    }

    /// Get raw bits value
    #[inline]
    pub fn value(&self) -> u32 {
        self.bits
    }

    /// 8-bit rank pattern of one suit (bit 0 = seven)
    #[inline]
    pub fn pattern(&self, suit: Suit) -> u8 {
        (self.bits >> (suit.index() * NUM_RANKS)) as u8
    }

    /// Count number of cards
    #[inline]
    pub fn size(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Count cards in one suit
    #[inline]
    pub fn size_of(&self, suit: Suit) -> usize {
        (self.bits & mask_of(suit)).count_ones() as usize
    }

    /// Check if a card is present
    #[inline]
    pub fn contains(&self, card: Card) -> bool {
        self.bits & card.bit() != 0
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Check if the set holds no card of `suit`
    #[inline]
    pub fn is_void(&self, suit: Suit) -> bool {
        self.bits & mask_of(suit) == 0
    }

    /// Get cards in a specific suit
    #[inline]
    pub fn suit(&self, suit: Suit) -> CardSet {
        CardSet::from_bits(self.bits & mask_of(suit))
    }

    /// Lowest card (lowest suit, then lowest rank)
    #[inline]
    pub fn first(&self) -> Option<Card> {
        if self.bits == 0 {
            None
        } else {
            Card::from_index(self.bits.trailing_zeros() as usize)
        }
    }

    /// Highest card (highest suit, then highest rank)
    #[inline]
    pub fn last(&self) -> Option<Card> {
        if self.bits == 0 {
            None
        } else {
            Card::from_index(31 - self.bits.leading_zeros() as usize)
        }
    }

    /// The `index`-th card in ascending order, or `None` when out of range
    pub fn get(&self, index: usize) -> Option<Card> {
        self.iter().nth(index)
    }

    /// Cards of the same suit ranked below `card`
    #[inline]
    pub fn below(&self, card: Card) -> CardSet {
        let base = mask_of(card.suit());
        CardSet::from_bits(self.bits & base & (card.bit() - 1))
    }

    /// Cards of the same suit ranked above `card`
    #[inline]
    pub fn above(&self, card: Card) -> CardSet {
        let base = mask_of(card.suit());
        CardSet::from_bits(self.bits & base & !(card.bit() | (card.bit() - 1)))
    }

    /// Union of two card sets
    #[inline]
    pub fn union(&self, other: CardSet) -> CardSet {
        CardSet::from_bits(self.bits | other.bits)
    }

    /// Intersection of two card sets
    #[inline]
    pub fn intersect(&self, other: CardSet) -> CardSet {
        CardSet::from_bits(self.bits & other.bits)
    }

    /// Difference (cards in self but not in other)
    #[inline]
    pub fn different(&self, other: CardSet) -> CardSet {
        CardSet::from_bits(self.bits & !other.bits)
    }

    /// Complement (all cards not in self)
    #[inline]
    pub fn complement(&self) -> CardSet {
        CardSet::from_bits(!self.bits)
    }

    /// Check if self includes all cards in other
    #[inline]
    pub fn include(&self, other: CardSet) -> bool {
        self.intersect(other) == other
    }

    /// Bitwise OR of any number of sets
    pub fn merge(sets: &[CardSet]) -> CardSet {
        sets.iter().fold(CardSet::new(), |acc, set| acc.union(*set))
    }

    /// Add a single card
    #[inline]
    pub fn add(&mut self, card: Card) -> &mut Self {
        self.bits |= card.bit();
        self
    }

    /// Remove a single card
    #[inline]
    pub fn remove(&mut self, card: Card) -> &mut Self {
        self.bits &= !card.bit();
        self
    }

    /// Copy with one card added
    #[inline]
    pub fn with(&self, card: Card) -> CardSet {
        CardSet::from_bits(self.bits | card.bit())
    }

    /// Copy with one card removed
    #[inline]
    pub fn without(&self, card: Card) -> CardSet {
        CardSet::from_bits(self.bits & !card.bit())
    }

    /// Add all cards from another set
    #[inline]
    pub fn add_cards(&mut self, other: CardSet) -> &mut Self {
        self.bits |= other.bits;
        self
    }

    /// Remove all cards in another set
    #[inline]
    pub fn remove_cards(&mut self, other: CardSet) -> &mut Self {
        self.bits &= !other.bits;
        self
    }

    /// Parse one suit holding such as `"8JK"` (`-` or empty for a void)
    pub fn parse_suit(suit: Suit, text: &str) -> Result<CardSet, Error> {
        let mut cards = CardSet::new();
        let mut chars = text.trim().chars().peekable();
        while let Some(c) = chars.next() {
            if c == '-' {
                continue;
            }
            // "10" spells a ten
            if c == '1' && chars.peek() == Some(&'0') {
                chars.next();
            }
            let rank = Rank::from_char(c).ok_or_else(|| Error::InvalidHand {
                text: text.to_string(),
                reason: "unknown rank",
            })?;
            cards.add(Card::new(suit, rank));
        }
        Ok(cards)
    }

    /// Iterate over cards in ascending (suit, rank) order
    pub fn iter(&self) -> CardSetIterator {
        CardSetIterator { bits: self.bits }
    }

    /// Iterate over distinct plays for tree search, highest first.
    ///
    /// Only the top card of each run of consecutive ranks is yielded. Ranks in
    /// `gone` (already out of play) do not break a run, so with the eight gone
    /// a holding of 9 and 7 is a single run.
    pub fn tree_iter(&self, gone: CardSet) -> TreeIterator {
        TreeIterator {
            bits: self.bits,
            gone: gone.bits & !self.bits,
        }
    }
}

impl fmt::Debug for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardSet(")?;
        for suit in Suit::ALL {
            let suit_cards = self.suit(suit);
            if !suit_cards.is_empty() {
                write!(f, "{}: ", suit.letter())?;
                for card in suit_cards.iter() {
                    write!(f, "{}", card.rank().letter())?;
                }
                write!(f, " ")?;
            }
        }
        write!(f, ")")
    }
}

impl fmt::Display for CardSet {
    /// Four dot-separated suits in S.C.D.H order, e.g. `78.XJ..A`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, suit) in Suit::ALL.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            for card in self.suit(*suit).iter() {
                write!(f, "{}", card.rank().letter())?;
            }
        }
        Ok(())
    }
}

impl FromStr for CardSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suits: Vec<&str> = s.trim().split('.').collect();
        if suits.len() != NUM_SUITS {
            return Err(Error::InvalidHand {
                text: s.to_string(),
                reason: "expected four dot-separated suits",
            });
        }
        let mut cards = CardSet::new();
        for (suit, suit_str) in Suit::ALL.iter().zip(suits) {
            cards.add_cards(CardSet::parse_suit(*suit, suit_str)?);
        }
        Ok(cards)
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut cards = CardSet::new();
        for card in iter {
            cards.add(card);
        }
        cards
    }
}

/// Iterator over cards in a CardSet, lowest first
pub struct CardSetIterator {
    bits: u32,
}

impl Iterator for CardSetIterator {
    type Item = Card;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            None
        } else {
            let card = self.bits.trailing_zeros() as u8;
            self.bits &= self.bits - 1; // Clear lowest set bit
            Some(Card(card))
        }
    }
}

impl DoubleEndedIterator for CardSetIterator {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            None
        } else {
            let card = 31 - self.bits.leading_zeros() as u8;
            self.bits &= !(1u32 << card);
            Some(Card(card))
        }
    }
}

impl IntoIterator for CardSet {
    type Item = Card;
    type IntoIter = CardSetIterator;

    fn into_iter(self) -> Self::IntoIter {
        CardSetIterator { bits: self.bits }
    }
}

impl IntoIterator for &CardSet {
    type Item = Card;
    type IntoIter = CardSetIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator yielding the top card of each consecutive-rank run, highest first
pub struct TreeIterator {
    bits: u32,
    gone: u32,
}

impl Iterator for TreeIterator {
    type Item = Card;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let top = 31 - self.bits.leading_zeros();
        let floor = top & !(NUM_RANKS as u32 - 1);
        self.bits &= !(1u32 << top);

        // Swallow the rest of the run inside this suit
        let mut rank_bit = top;
        while rank_bit > floor {
            let below = 1u32 << (rank_bit - 1);
            if self.bits & below != 0 {
                self.bits &= !below;
            } else if self.gone & below == 0 {
                break;
            }
            rank_bit -= 1;
        }
        Some(Card(top as u8))
    }
}
