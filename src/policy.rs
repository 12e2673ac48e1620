//! Declarer policy capability used by the trick tree

use super::cards::{Card, CardSet};
use super::hands::Hands;
use super::play::{playable_cards, Trick};
use super::types::*;

/// A tree node as the declarer policy sees it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeView {
    /// Cards still held, excluding the open trick
    pub hands: Hands,
    /// The open trick (empty at a trick boundary)
    pub trick: Trick,
    pub declarer: Seat,
    /// Tricks the declarer has taken on this line
    pub declarer_tricks: u8,
    /// Completed tricks since the tree root
    pub depth: usize,
}

impl NodeView {
    #[inline]
    pub fn to_play(&self) -> Seat {
        self.trick.next_to_play()
    }

    /// Legal cards for the seat to play
    #[inline]
    pub fn legal_cards(&self) -> CardSet {
        playable_cards(self.hands[self.to_play()], self.trick.lead_suit())
    }

    /// Cards still in play: every hand plus the open trick
    #[inline]
    pub fn in_play(&self) -> CardSet {
        self.hands.all_cards().union(self.trick.cards())
    }
}

/// Choices the declarer makes while the tree is built.
///
/// Defenders are searched exhaustively; the declarer's card comes from
/// `choose_card` alone. Implementations must be deterministic: the tree is
/// replayed against the same policy and a different answer for the same node
/// forces a rebuild.
pub trait DeclarerPolicy {
    /// Card for the declarer to play; must be one of `view.legal_cards()`
    fn choose_card(&self, view: &NodeView) -> Card;

    /// Keep exact positions apart even when their relative hands match
    fn keep_fine_detail(&self, _view: &NodeView) -> bool {
        false
    }

    /// Cards of a declarer hand still holding the talon that are put aside
    /// before play. Empty when nothing needs to be dropped.
    fn refine_drop(&self, _hand: CardSet) -> CardSet {
        CardSet::new()
    }

    /// Line is certified: the declarer has taken nothing and cannot be forced to
    fn is_goal(&self, view: &NodeView) -> bool;
}
