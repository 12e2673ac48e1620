//! Trick rules and play state

use super::cards::*;
use super::error::Error;
use super::hands::Hands;
use super::types::*;

/// Get playable cards for a hand given the suit led (if any)
pub fn playable_cards(hand: CardSet, lead_suit: Option<Suit>) -> CardSet {
    if let Some(suit) = lead_suit {
        // Must follow suit if possible
        let suit_cards = hand.suit(suit);
        if !suit_cards.is_empty() {
            return suit_cards;
        }
    }

    // Can play any card
    hand
}

/// A card played to a trick, with the seat that played it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayedCard {
    pub card: Card,
    pub seat: Seat,
}

impl PlayedCard {
    pub fn new(card: Card, seat: Seat) -> Self {
        PlayedCard { card, seat }
    }
}

/// A trick in progress or completed (0-3 cards), stored inline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Trick {
    leader: Seat,
    cards: [Option<Card>; NUM_SEATS],
    count: usize,
}

impl Trick {
    /// Create an empty trick led by `leader`
    pub fn new(leader: Seat) -> Self {
        Trick {
            leader,
            cards: [None; NUM_SEATS],
            count: 0,
        }
    }

    /// Add the next card; returns the seat that played it
    pub fn add(&mut self, card: Card) -> Seat {
        let seat = self.next_to_play();
        if self.count < NUM_SEATS {
            self.cards[self.count] = Some(card);
            self.count += 1;
        }
        seat
    }

    /// Get the number of cards played
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if no cards have been played
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if every seat has played
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.count == NUM_SEATS
    }

    /// Get the seat that led this trick
    #[inline]
    pub fn leader(&self) -> Seat {
        self.leader
    }

    /// Get the next seat to play
    #[inline]
    pub fn next_to_play(&self) -> Seat {
        (self.leader + self.count) % NUM_SEATS
    }

    /// Get the lead suit (suit of the first card played)
    #[inline]
    pub fn lead_suit(&self) -> Option<Suit> {
        self.cards[0].map(|c| c.suit())
    }

    /// Plays in order
    pub fn plays(&self) -> impl Iterator<Item = PlayedCard> + '_ {
        self.cards[..self.count]
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| {
                c.map(|card| PlayedCard::new(card, (self.leader + i) % NUM_SEATS))
            })
    }

    /// Card played by `seat`, if it has played
    pub fn card_of(&self, seat: Seat) -> Option<Card> {
        let offset = (seat + NUM_SEATS - self.leader) % NUM_SEATS;
        if offset < self.count {
            self.cards[offset]
        } else {
            None
        }
    }

    /// All cards on the table
    pub fn cards(&self) -> CardSet {
        self.plays().map(|p| p.card).collect()
    }

    /// The play currently holding the highest card of the led suit
    pub fn winner(&self) -> Option<PlayedCard> {
        let mut best: Option<PlayedCard> = None;
        for play in self.plays() {
            match best {
                Some(b) if !play.card.beats(b.card) => {}
                _ => best = Some(play),
            }
        }
        best
    }
}

/// A position in the round: unplayed hands, the open trick and the cards
/// already gathered in completed tricks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    /// Cards not yet played, excluding the open trick
    pub hands: Hands,
    /// Trick in progress (may be empty)
    pub trick: Trick,
    /// Cards of completed tricks
    pub gone: CardSet,
    /// Tricks taken per seat
    pub tricks: [u8; NUM_SEATS],
}

impl Position {
    /// Start of a trick led by `leader`
    pub fn new(hands: Hands, leader: Seat) -> Self {
        Position {
            hands,
            trick: Trick::new(leader),
            gone: CardSet::new(),
            tricks: [0; NUM_SEATS],
        }
    }

    /// Mid-trick position. `hands` must not contain the cards of `trick`.
    pub fn with_trick(hands: Hands, trick: Trick) -> Result<Self, Error> {
        hands.validate()?;
        if !hands.all_cards().intersect(trick.cards()).is_empty() {
            return Err(Error::InvalidHand {
                text: trick.cards().to_string(),
                reason: "trick cards are still in a hand",
            });
        }
        hands.validate_sizes(trick.leader(), trick.len())?;
        Ok(Position {
            hands,
            trick,
            gone: CardSet::new(),
            tricks: [0; NUM_SEATS],
        })
    }

    /// Seat to play next
    #[inline]
    pub fn to_play(&self) -> Seat {
        self.trick.next_to_play()
    }

    /// Legal cards for the seat to play
    #[inline]
    pub fn legal_cards(&self) -> CardSet {
        playable_cards(self.hands[self.to_play()], self.trick.lead_suit())
    }

    /// True once every card has been played
    pub fn is_over(&self) -> bool {
        self.trick.is_empty() && self.hands.all_cards().is_empty()
    }

    /// Hands as they stood when the open trick was led
    pub fn trick_start_hands(&self) -> Hands {
        let mut hands = self.hands;
        for play in self.trick.plays() {
            hands[play.seat].add(play.card);
        }
        hands
    }

    /// Play a card for the seat to move. Returns the winner when the card completes a trick.
    pub fn apply(&mut self, card: Card) -> Result<Option<Seat>, Error> {
        let seat = self.to_play();
        if !self.legal_cards().contains(card) {
            return Err(Error::IllegalPlay { seat, card });
        }
        self.hands[seat].remove(card);
        self.trick.add(card);
        if !self.trick.is_complete() {
            return Ok(None);
        }

        let winner = match self.trick.winner() {
            Some(w) => w.seat,
            None => self.trick.leader(),
        };
        self.tricks[winner] += 1;
        self.gone.add_cards(self.trick.cards());
        self.trick = Trick::new(winner);
        Ok(Some(winner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    #[test]
    fn test_playable_cards() {
        let hand: CardSet = "78.X..".parse().unwrap();
        assert_eq!(playable_cards(hand, Some(Suit::Spade)).size(), 2);
        assert_eq!(playable_cards(hand, Some(Suit::Heart)), hand);
        assert_eq!(playable_cards(hand, None), hand);
    }

    #[test]
    fn test_trick_builder() {
        let mut trick = Trick::new(2);
        assert!(trick.is_empty());
        assert_eq!(trick.next_to_play(), 2);
        assert_eq!(trick.lead_suit(), None);

        assert_eq!(trick.add(card("S9")), 2);
        assert_eq!(trick.add(card("SA")), 0);
        assert_eq!(trick.lead_suit(), Some(Suit::Spade));
        assert_eq!(trick.next_to_play(), 1);
        assert_eq!(trick.card_of(0), Some(card("SA")));
        assert_eq!(trick.card_of(1), None);

        // A higher heart discard does not win a spade trick
        trick.add(card("HA"));
        assert!(trick.is_complete());
        assert_eq!(trick.winner(), Some(PlayedCard::new(card("SA"), 0)));
        assert_eq!(trick.cards().size(), 3);
    }

    #[test]
    fn test_position_apply() {
        let hands: Hands = "7.A.. 8.7.. A...".parse().unwrap();
        let mut pos = Position::new(hands, 0);
        assert_eq!(pos.legal_cards().size(), 2);

        assert_eq!(pos.apply(card("S7")), Ok(None));
        // Seat 1 must follow with the spade
        assert!(matches!(pos.apply(card("C7")), Err(Error::IllegalPlay { seat: 1, .. })));
        assert_eq!(pos.apply(card("S8")), Ok(None));
        assert_eq!(pos.apply(card("SA")), Ok(Some(2)));
        assert_eq!(pos.tricks, [0, 0, 1]);
        assert_eq!(pos.to_play(), 2);
        assert_eq!(pos.gone.size(), 3);

        // Seat 2 is out of cards, which can only happen in a hand-built test
        assert!(!pos.is_over());
    }

    #[test]
    fn test_trick_start_hands() {
        let hands: Hands = ".A.. 8.7.. A.8..".parse().unwrap();
        let mut trick = Trick::new(0);
        trick.add(card("S7"));
        let pos = Position::with_trick(hands, trick).unwrap();
        assert_eq!(pos.to_play(), 1);
        let start = pos.trick_start_hands();
        assert_eq!(start[0].size(), 2);
        assert!(start[0].contains(card("S7")));
        assert_eq!(pos.hands[0].size(), 1);
    }

    #[test]
    fn test_with_trick_rejects_bad_sizes() {
        let hands: Hands = "7.A.. 8... A...".parse().unwrap();
        let mut trick = Trick::new(0);
        trick.add(card("S9"));
        assert!(Position::with_trick(hands, trick).is_err());
    }
}
