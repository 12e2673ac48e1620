//! Misère decisions for the declarer: suit holes, discards and card play
//!
//! `MisereBot` ranks suits with the single-suit simulation, picks the talon
//! discard, and plays from a certified trick tree whenever one exists,
//! falling back to suit-level heuristics otherwise.

use std::fmt;
use std::sync::Arc;

use super::cards::*;
use super::error::Error;
use super::hands::Hands;
use super::play::Position;
use super::policy::{DeclarerPolicy, NodeView};
use super::suit::{max_unwanted_tricks, ListData, MisereTable};
use super::tree::{TreeConfig, TrickTree};
use super::types::*;

/// Cards the declarer holds before discarding the talon
pub const HAND_WITH_TALON: usize = TOTAL_TRICKS + 2;

/// A suit in which the opponents can force the declarer to take a trick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hole {
    pub suit: Suit,
    /// Forced tricks when the opponents lead the suit
    pub tricks: u8,
    /// Forced tricks when the declarer leads it
    pub self_lead_tricks: u8,
}

/// How a card was chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    /// Only one legal card
    Forced,
    /// Taken from a certified line of the trick tree
    Tree,
    /// Suit-level heuristic, no certified line
    Heuristic,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reason::Forced => "forced",
            Reason::Tree => "tree",
            Reason::Heuristic => "heuristic",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub card: Card,
    pub reason: Reason,
}

/// Declarer of a misère contract
#[derive(Clone, Debug)]
pub struct MisereBot {
    seat: Seat,
    table: Arc<MisereTable>,
    config: TreeConfig,
    fine_detail: bool,
    tree: Option<TrickTree>,
}

impl MisereBot {
    pub fn new(seat: Seat, table: Arc<MisereTable>) -> Self {
        MisereBot {
            seat,
            table,
            config: TreeConfig::default(),
            fine_detail: false,
            tree: None,
        }
    }

    pub fn with_config(mut self, config: TreeConfig) -> Self {
        self.config = config;
        self
    }

    /// Keep exact positions apart in the tree instead of merging relative ones
    pub fn with_fine_detail(mut self, fine_detail: bool) -> Self {
        self.fine_detail = fine_detail;
        self
    }

    #[inline]
    pub fn seat(&self) -> Seat {
        self.seat
    }

    #[inline]
    pub fn table(&self) -> &MisereTable {
        &self.table
    }

    /// Tree of the last decision, if any
    #[inline]
    pub fn tree(&self) -> Option<&TrickTree> {
        self.tree.as_ref()
    }

    /// Forget the tree, e.g. for a new round
    pub fn reset(&mut self) {
        self.tree = None;
    }

    /// One `ListData` per suit for the declarer's hand
    pub fn suit_report(&self, hands: &Hands, me_start: bool) -> [ListData; NUM_SUITS] {
        report(self.seat, hands, me_start, &self.table)
    }

    /// Non-empty suits, most dangerous first
    pub fn danger_ranking(&self, hands: &Hands) -> Vec<ListData> {
        let mut ranked: Vec<ListData> = self
            .suit_report(hands, false)
            .into_iter()
            .filter(|d| !hands[self.seat].is_void(d.suit))
            .collect();
        ranked.sort_by(|a, b| {
            b.total()
                .cmp(&a.total())
                .then(b.misere_eval.total_cmp(&a.misere_eval))
                .then(a.suit.cmp(&b.suit))
        });
        ranked
    }

    pub fn holes(&self, hands: &Hands) -> Vec<Hole> {
        let they_lead = self.suit_report(hands, false);
        let self_leads = self.suit_report(hands, true);
        they_lead
            .iter()
            .zip(self_leads.iter())
            .filter(|(t, s)| t.is_hole() || s.is_hole())
            .map(|(t, s)| Hole {
                suit: t.suit,
                tricks: t.total(),
                self_lead_tricks: s.total(),
            })
            .collect()
    }

    /// Two talon discards from a twelve-card hand: the pair leaving the lowest
    /// summed danger weight, then the fewest weighted suits, then the first
    /// pair in card order.
    pub fn choose_discard(&self, hand: CardSet) -> Result<[Card; 2], Error> {
        discard_pair(hand, &self.table)
    }

    /// Card of a certified line for the position, building or replaying the
    /// tree as needed. `None` when no line exists.
    pub fn guaranteed_card(&mut self, position: &Position) -> Option<Card> {
        let (tree, card) = match self.tree.take() {
            Some(mut tree) => {
                let card = tree.replay(position, &*self);
                (tree, card)
            }
            None => {
                let tree = TrickTree::build(position, self.seat, &*self, self.config);
                let card = tree.recommend(position);
                (tree, card)
            }
        };
        self.tree = Some(tree);
        card
    }

    /// Card to play for the declarer
    pub fn choose_play(&mut self, position: &Position) -> Result<Decision, Error> {
        let to_play = position.to_play();
        if to_play != self.seat {
            return Err(Error::NotOnTurn {
                seat: self.seat,
                to_play,
            });
        }
        let legal = position.legal_cards();
        let first = legal.first().ok_or_else(|| Error::InvalidHand {
            text: position.hands[self.seat].to_string(),
            reason: "no card left to play",
        })?;

        let decision = if legal.size() == 1 {
            Decision {
                card: first,
                reason: Reason::Forced,
            }
        } else if let Some(card) = self.guaranteed_card(position).filter(|c| legal.contains(*c)) {
            Decision {
                card,
                reason: Reason::Tree,
            }
        } else {
            let view = NodeView {
                hands: position.hands,
                trick: position.trick,
                declarer: self.seat,
                declarer_tricks: position.tricks[self.seat],
                depth: 0,
            };
            Decision {
                card: self.choose_card(&view),
                reason: Reason::Heuristic,
            }
        };

        tracing::info!(
            target: "misere_solver::play",
            seat = self.seat,
            card = %decision.card,
            reason = %decision.reason,
            "misère play"
        );
        Ok(decision)
    }

    /// Highest card that stays under the trick, or under a card someone
    /// still has to play after us
    fn follow(&self, view: &NodeView, best: Card, legal: CardSet) -> Option<Card> {
        if let Some(card) = legal.below(best).last() {
            return Some(card);
        }
        let seat = view.to_play();
        let suit = best.suit();
        let remaining = NUM_SEATS - view.trick.len() - 1;
        let threshold = (1..=remaining)
            .map(|offset| view.hands[(seat + offset) % NUM_SEATS].suit(suit))
            .filter_map(|cards| cards.first())
            .max();
        threshold
            .and_then(|t| legal.below(t).last())
            .or_else(|| legal.last())
    }

    /// Void in the led suit: drop the top card whose loss lowers the danger most
    fn discard(&self, hand: CardSet) -> Option<Card> {
        Suit::ALL
            .iter()
            .filter_map(|s| hand.suit(*s).last())
            .min_by(|a, b| {
                let after_a = self.table.hand_eval(hand.without(*a));
                let after_b = self.table.hand_eval(hand.without(*b));
                after_a
                    .total_cmp(&after_b)
                    .then(b.rank().cmp(&a.rank()))
                    .then(a.cmp(b))
            })
    }

    /// Highest card some opponent must overtake; otherwise the lowest rank held
    fn lead(&self, view: &NodeView, hand: CardSet) -> Option<Card> {
        let seat = view.to_play();
        let safe = Suit::ALL
            .iter()
            .filter_map(|s| {
                let threshold = [left_of(seat), right_of(seat)]
                    .iter()
                    .filter_map(|o| view.hands[*o].suit(*s).first())
                    .max()?;
                hand.below(threshold).last()
            })
            .max_by(|a, b| a.rank().cmp(&b.rank()).then(b.cmp(a)));
        safe.or_else(|| hand.iter().min_by_key(|c| c.rank()))
    }
}

impl DeclarerPolicy for MisereBot {
    fn choose_card(&self, view: &NodeView) -> Card {
        let legal = view.legal_cards();
        let hand = view.hands[view.to_play()];
        let chosen = match (view.trick.winner(), view.trick.lead_suit()) {
            (Some(best), Some(suit)) if !hand.is_void(suit) => self.follow(view, best.card, legal),
            (Some(_), _) => self.discard(hand),
            (None, _) => self.lead(view, hand),
        };
        match chosen.filter(|c| legal.contains(*c)).or_else(|| legal.first()) {
            Some(card) => card,
            // Only reachable with an empty hand, which the tree never asks about
            None => Card::new(Suit::Spade, Rank::Seven),
        }
    }

    fn keep_fine_detail(&self, _view: &NodeView) -> bool {
        self.fine_detail
    }

    fn refine_drop(&self, hand: CardSet) -> CardSet {
        match discard_pair(hand, &self.table) {
            Ok(pair) => pair.into_iter().collect(),
            Err(_) => CardSet::new(),
        }
    }

    fn is_goal(&self, view: &NodeView) -> bool {
        if view.declarer_tricks > 0 {
            return false;
        }
        [false, true].iter().all(|me_start| {
            report(view.declarer, &view.hands, *me_start, &self.table)
                .iter()
                .all(|d| !d.is_hole())
        })
    }
}

fn report(seat: Seat, hands: &Hands, me_start: bool, table: &MisereTable) -> [ListData; NUM_SUITS] {
    let (mine, left, right) = (hands[seat], hands[left_of(seat)], hands[right_of(seat)]);
    Suit::ALL.map(|suit| max_unwanted_tricks(suit, mine, left, right, me_start, table))
}

fn discard_pair(hand: CardSet, table: &MisereTable) -> Result<[Card; 2], Error> {
    if hand.size() != HAND_WITH_TALON {
        return Err(Error::InvalidDiscard("declarer must hold twelve cards"));
    }
    let cards: Vec<Card> = hand.iter().collect();
    let mut best: Option<(f32, usize, [Card; 2])> = None;
    for (i, first) in cards.iter().enumerate() {
        for second in &cards[i + 1..] {
            let rest = hand.without(*first).without(*second);
            let weight = table.hand_eval(rest);
            let weighted = Suit::ALL
                .iter()
                .filter(|s| table.eval(rest.pattern(**s)) > 0.0)
                .count();
            let better = match best {
                None => true,
                Some((w, n, _)) => weight < w || (weight == w && weighted < n),
            };
            if better {
                best = Some((weight, weighted, [*first, *second]));
            }
        }
    }
    let (weight, _, pair) = best.ok_or(Error::InvalidDiscard("no cards to discard"))?;
    tracing::debug!(
        target: "misere_solver::play",
        first = %pair[0],
        second = %pair[1],
        weight,
        "talon discard"
    );
    Ok(pair)
}
