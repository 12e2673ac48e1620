//! Core type definitions for the 32-card, three-hand game

use std::fmt;

/// Suits in canonical order: SPADE, CLUB, DIAMOND, HEART
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Suit {
    Spade = 0,
    Club = 1,
    Diamond = 2,
    Heart = 3,
}

pub const NUM_SUITS: usize = 4;

impl Suit {
    pub const ALL: [Suit; NUM_SUITS] = [Suit::Spade, Suit::Club, Suit::Diamond, Suit::Heart];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Spade),
            1 => Some(Suit::Club),
            2 => Some(Suit::Diamond),
            3 => Some(Suit::Heart),
            _ => None,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Suit::Spade => 'S',
            Suit::Club => 'C',
            Suit::Diamond => 'D',
            Suit::Heart => 'H',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'S' => Some(Suit::Spade),
            'C' => Some(Suit::Club),
            'D' => Some(Suit::Diamond),
            'H' => Some(Suit::Heart),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suit::Spade => "Spade",
            Suit::Club => "Club",
            Suit::Diamond => "Diamond",
            Suit::Heart => "Heart",
        };
        f.write_str(name)
    }
}

/// Ranks: SEVEN=0, ..., ACE=7. There is no six in this deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    Seven = 0,
    Eight = 1,
    Nine = 2,
    Ten = 3,
    Jack = 4,
    Queen = 5,
    King = 6,
    Ace = 7,
}

pub const NUM_RANKS: usize = 8;

impl Rank {
    pub const ALL: [Rank; NUM_RANKS] = [
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Rank::Seven),
            1 => Some(Rank::Eight),
            2 => Some(Rank::Nine),
            3 => Some(Rank::Ten),
            4 => Some(Rank::Jack),
            5 => Some(Rank::Queen),
            6 => Some(Rank::King),
            7 => Some(Rank::Ace),
            _ => None,
        }
    }

    /// Single-character name; ten is written `X`
    pub const fn letter(self) -> char {
        const NAMES: [char; NUM_RANKS] = ['7', '8', '9', 'X', 'J', 'Q', 'K', 'A'];
        NAMES[self as usize]
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            '7' => Some(Rank::Seven),
            '8' => Some(Rank::Eight),
            '9' => Some(Rank::Nine),
            'X' | 'T' | '1' => Some(Rank::Ten),
            'J' => Some(Rank::Jack),
            'Q' => Some(Rank::Queen),
            'K' => Some(Rank::King),
            'A' => Some(Rank::Ace),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

pub const TOTAL_CARDS: usize = NUM_SUITS * NUM_RANKS;

/// Seats are numbered clockwise: the hand at `seat + 1` plays after `seat`
pub type Seat = usize;
pub const NUM_SEATS: usize = 3;

/// Cards per hand after the talon has been taken and discarded
pub const TOTAL_TRICKS: usize = 10;

/// Get next seat (clockwise)
#[inline]
pub fn next_seat(seat: Seat) -> Seat {
    (seat + 1) % NUM_SEATS
}

/// Get left-hand opponent (plays right after `seat`)
#[inline]
pub fn left_of(seat: Seat) -> Seat {
    (seat + 1) % NUM_SEATS
}

/// Get right-hand opponent (plays right before `seat`)
#[inline]
pub fn right_of(seat: Seat) -> Seat {
    (seat + 2) % NUM_SEATS
}

/// Get seat name
pub fn seat_name(seat: Seat) -> &'static str {
    const NAMES: [&str; NUM_SEATS] = ["First", "Second", "Third"];
    NAMES[seat % NUM_SEATS]
}

/// Convert character to seat (`0`-`2`)
pub fn char_to_seat(c: char) -> Option<Seat> {
    match c {
        '0' => Some(0),
        '1' => Some(1),
        '2' => Some(2),
        _ => None,
    }
}
