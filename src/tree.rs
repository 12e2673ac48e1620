//! Trick tree search for a certified misère line
//!
//! The tree holds one node per complete trick. Defenders are expanded over
//! every distinct legal card, the declarer plays whatever the injected
//! `DeclarerPolicy` chooses, and any trick won by the declarer ends its
//! branch. Positions already reached by another line (same remaining cards
//! and next leader, or the same relative hands) are not expanded twice.
//! After the build, every node that does not lie on a marked line is pruned.

use std::collections::HashSet;
use std::time::Instant;

use super::cards::*;
use super::hands::Hands;
use super::pattern::RelativeHands;
use super::play::*;
use super::policy::{DeclarerPolicy, NodeView};
use super::types::*;

/// Assert always with the `verify` feature, in debug builds otherwise
macro_rules! invariant {
    ($cond:expr, $($arg:tt)+) => {
        if cfg!(feature = "verify") {
            assert!($cond, $($arg)+);
        } else {
            debug_assert!($cond, $($arg)+);
        }
    };
}

/// Index of a node in the tree arena
pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Stop at the first certified line
    #[default]
    FirstSolution,
    /// Keep every certified line
    Exhaustive,
}

/// Search sizing, passed explicitly to every build
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    pub mode: SearchMode,
    /// Refuse to build while any suit has more cards in play than this
    pub max_suit_len: Option<usize>,
    /// Stop after creating this many nodes
    pub node_limit: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            mode: SearchMode::FirstSolution,
            max_suit_len: Some(6),
            node_limit: None,
        }
    }
}

impl TreeConfig {
    /// No size limits at all
    pub fn unbounded() -> Self {
        TreeConfig {
            max_suit_len: None,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_suit_len(mut self, max_suit_len: Option<usize>) -> Self {
        self.max_suit_len = max_suit_len;
        self
    }

    pub fn with_node_limit(mut self, node_limit: Option<usize>) -> Self {
        self.node_limit = node_limit;
        self
    }
}

/// Counters of one build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Nodes created, root excluded
    pub nodes: usize,
    /// Tricks reaching a position already seen exactly
    pub duplicates: usize,
    /// Tricks reaching a position with the same relative hands
    pub similar: usize,
    /// Tricks the declarer would have won
    pub lost: usize,
    /// Certified lines found
    pub goals: usize,
    /// Nodes removed by pruning
    pub pruned: usize,
}

/// Why a build ended the way it did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    /// At least one certified line
    Found,
    /// Searched everything, no certified line
    Exhausted,
    /// Stopped at `TreeConfig::node_limit` without a certified line
    NodeLimit,
    /// Refused: a suit has too many cards in play
    SuitTooLong { suit: Suit, cards: usize },
    /// Refused: hands cannot be at a trick boundary
    UnevenHands,
}

/// One complete trick of the tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrickNode {
    /// Cards of the trick in play order (empty at the root)
    pub trick: Trick,
    /// Seat holding the highest card of the led suit, which leads next
    pub winner: Seat,
    /// Hands after the trick
    pub hands: Hands,
    /// Tricks the declarer took on the way here
    pub declarer_tricks: u8,
    /// Completed tricks since the root
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    marked: bool,
}

impl TrickNode {
    #[inline]
    pub fn leader(&self) -> Seat {
        self.trick.leader()
    }

    /// On a certified line
    #[inline]
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Pruned tree of certified lines, replayed as real play proceeds
#[derive(Clone, Debug)]
pub struct TrickTree {
    nodes: Vec<TrickNode>,
    current: NodeId,
    declarer: Seat,
    config: TreeConfig,
    stats: TreeStats,
    outcome: BuildOutcome,
    rebuilds: usize,
    /// Talon cards put aside from the declarer's hand at the root
    dropped: CardSet,
}

impl TrickTree {
    /// Build the tree from `position`, re-examining the cards already played
    /// to the open trick as forced moves.
    pub fn build<P: DeclarerPolicy + ?Sized>(
        position: &Position,
        declarer: Seat,
        policy: &P,
        config: TreeConfig,
    ) -> TrickTree {
        let started = Instant::now();
        let leader = position.trick.leader();
        let mut start = position.trick_start_hands();

        // A declarer still holding the talon puts the drop aside first
        let others = (0..NUM_SEATS)
            .filter(|s| *s != declarer)
            .map(|s| start[s].size())
            .max()
            .unwrap_or(0);
        let mut dropped = CardSet::new();
        if start[declarer].size() > others {
            dropped = policy.refine_drop(start[declarer]).intersect(start[declarer]);
            start[declarer].remove_cards(dropped);
        }

        let root = TrickNode {
            trick: Trick::new(leader),
            winner: leader,
            hands: start,
            declarer_tricks: 0,
            depth: 0,
            parent: None,
            children: Vec::new(),
            marked: false,
        };
        let mut builder = Builder::new(policy, declarer, config, position.trick, root);

        let outcome = match check_root(&start, &config) {
            Some(refused) => refused,
            None => {
                builder.expand(ROOT);
                if builder.stats.goals > 0 {
                    BuildOutcome::Found
                } else if builder.hit_limit {
                    BuildOutcome::NodeLimit
                } else {
                    BuildOutcome::Exhausted
                }
            }
        };

        let mut stats = builder.stats;
        let created = builder.nodes.len();
        let nodes = prune(builder.nodes);
        stats.pruned = created - nodes.len();

        tracing::debug!(
            target: "misere_solver::tree",
            declarer,
            leader,
            nodes = stats.nodes,
            duplicates = stats.duplicates,
            similar = stats.similar,
            lost = stats.lost,
            goals = stats.goals,
            pruned = stats.pruned,
            outcome = ?outcome,
            elapsed_us = started.elapsed().as_micros() as u64,
            "trick tree built"
        );

        TrickTree {
            nodes,
            current: ROOT,
            declarer,
            config,
            stats,
            outcome,
            rebuilds: 0,
            dropped,
        }
    }

    /// No certified line exists from the root
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].children.is_empty()
    }

    #[inline]
    pub fn outcome(&self) -> BuildOutcome {
        self.outcome
    }

    #[inline]
    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    #[inline]
    pub fn declarer(&self) -> Seat {
        self.declarer
    }

    #[inline]
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Times the tree was rebuilt after play left it
    #[inline]
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    #[inline]
    pub fn root(&self) -> &TrickNode {
        &self.nodes[ROOT]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &TrickNode {
        &self.nodes[id]
    }

    #[inline]
    pub fn nodes(&self) -> &[TrickNode] {
        &self.nodes
    }

    /// Node of the last trick matched by `locate`
    #[inline]
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Tricks of the first certified line below the current node
    pub fn line(&self) -> Vec<Trick> {
        let mut tricks = Vec::new();
        let mut id = self.current;
        while let Some(&child) = self.nodes[id].children.first() {
            tricks.push(self.nodes[child].trick);
            id = child;
        }
        tricks
    }

    /// Nodes from the root down to `id`, root excluded
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut at = id;
        while let Some(parent) = self.nodes[at].parent {
            path.push(at);
            at = parent;
        }
        path.reverse();
        path
    }

    /// Talon cards the build put aside from the declarer's hand
    #[inline]
    pub fn dropped(&self) -> CardSet {
        self.dropped
    }

    /// Move `current` down to the node whose hands match the start of the
    /// open trick of `position`, with the dropped talon cards left out.
    /// False when the position is not in the tree.
    pub fn locate(&mut self, position: &Position) -> bool {
        let mut start = position.trick_start_hands();
        start[self.declarer].remove_cards(self.dropped);
        let leader = position.trick.leader();
        let mut id = self.current;
        loop {
            let node = &self.nodes[id];
            if node.hands == start && node.winner == leader {
                self.current = id;
                return true;
            }
            let next = node
                .children
                .iter()
                .copied()
                .find(|c| holds_all(&self.nodes[*c].hands, &start));
            match next {
                Some(child) => id = child,
                None => return false,
            }
        }
    }

    /// Card of the tree's line for the seat to play, given the cards already
    /// on the table. Call after `locate`.
    pub fn recommend(&self, position: &Position) -> Option<Card> {
        let seat = position.to_play();
        self.nodes[self.current]
            .children
            .iter()
            .map(|c| &self.nodes[*c])
            .find(|child| {
                position
                    .trick
                    .plays()
                    .all(|p| child.trick.card_of(p.seat) == Some(p.card))
            })
            .and_then(|child| child.trick.card_of(seat))
    }

    /// Follow real play: the tree's card for `position`, rebuilding from the
    /// position when play has left the tree. `None` when no certified line exists.
    pub fn replay<P: DeclarerPolicy + ?Sized>(
        &mut self,
        position: &Position,
        policy: &P,
    ) -> Option<Card> {
        let located = self.locate(position);
        if located {
            if let Some(card) = self.recommend(position) {
                return Some(card);
            }
        }
        if self.is_empty() || (located && self.nodes[self.current].is_leaf()) {
            tracing::debug!(target: "misere_solver::tree", "no line ahead, rebuilding");
        } else {
            tracing::warn!(
                target: "misere_solver::tree",
                position = %position.hands,
                "unexpected move, rebuilding trick tree"
            );
        }
        self.rebuild(position, policy);
        self.recommend(position)
    }

    /// Discard the tree and build it again from `position`
    pub fn rebuild<P: DeclarerPolicy + ?Sized>(&mut self, position: &Position, policy: &P) {
        let rebuilds = self.rebuilds + 1;
        *self = TrickTree::build(position, self.declarer, policy, self.config);
        self.rebuilds = rebuilds;
    }
}

/// Refusal reason for a root that cannot be searched
fn check_root(start: &Hands, config: &TreeConfig) -> Option<BuildOutcome> {
    let sizes = start.sizes();
    if sizes.iter().any(|s| *s != sizes[0]) {
        tracing::warn!(target: "misere_solver::tree", ?sizes, "uneven hands at trick start");
        return Some(BuildOutcome::UnevenHands);
    }
    let max = config.max_suit_len?;
    let in_play = start.all_cards();
    Suit::ALL
        .iter()
        .map(|s| (*s, in_play.size_of(*s)))
        .find(|(_, cards)| *cards > max)
        .map(|(suit, cards)| BuildOutcome::SuitTooLong { suit, cards })
}

/// Every hand of `outer` contains the matching hand of `inner`
fn holds_all(outer: &Hands, inner: &Hands) -> bool {
    (0..NUM_SEATS).all(|s| outer[s].include(inner[s]))
}

/// Keep the root and every marked node, compacting the arena
fn prune(nodes: Vec<TrickNode>) -> Vec<TrickNode> {
    let mut kept: Vec<TrickNode> = Vec::new();
    let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(ROOT, None)];
    while let Some((old, parent)) = stack.pop() {
        let id = kept.len();
        let node = &nodes[old];
        kept.push(TrickNode {
            parent,
            children: Vec::new(),
            ..node.clone()
        });
        if let Some(p) = parent {
            kept[p].children.push(id);
        }
        for &child in node.children.iter().rev() {
            if nodes[child].marked {
                stack.push((child, Some(id)));
            }
        }
    }
    kept
}

/// Depth-first build state; dropped (with its dedup sets) after the build
struct Builder<'p, P: ?Sized> {
    policy: &'p P,
    declarer: Seat,
    config: TreeConfig,
    /// Plays already made to the open trick at the root
    forced: Trick,
    nodes: Vec<TrickNode>,
    /// Remaining-card bitmaps seen, per next leader
    exact: [HashSet<u32>; NUM_SEATS],
    /// Relative hands seen, per next leader
    similar: [HashSet<RelativeHands>; NUM_SEATS],
    stats: TreeStats,
    stop: bool,
    hit_limit: bool,
}

impl<'p, P: DeclarerPolicy + ?Sized> Builder<'p, P> {
    fn new(policy: &'p P, declarer: Seat, config: TreeConfig, forced: Trick, root: TrickNode) -> Self {
        Builder {
            policy,
            declarer,
            config,
            forced,
            nodes: vec![root],
            exact: Default::default(),
            similar: Default::default(),
            stats: TreeStats::default(),
            stop: false,
            hit_limit: false,
        }
    }

    fn expand(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let (hands, leader) = (node.hands, node.winner);
        self.enumerate(id, hands, Trick::new(leader));
    }

    /// Play the remaining slots of `trick` over every distinct choice
    fn enumerate(&mut self, parent: NodeId, hands: Hands, trick: Trick) {
        if self.stop {
            return;
        }
        if trick.is_complete() {
            self.complete_trick(parent, hands, trick);
            return;
        }

        let seat = trick.next_to_play();
        let legal = playable_cards(hands[seat], trick.lead_suit());
        if legal.is_empty() {
            return;
        }
        let candidates = if parent == ROOT && trick.len() < self.forced.len() {
            self.forced
                .plays()
                .nth(trick.len())
                .map_or(CardSet::new(), |p| CardSet::new().with(p.card))
        } else if seat == self.declarer {
            CardSet::new().with(self.declarer_card(parent, hands, trick, legal))
        } else {
            let gone = hands.all_cards().union(trick.cards()).complement();
            legal.tree_iter(gone).collect()
        };

        for card in candidates.iter().rev() {
            if self.stop {
                return;
            }
            let mut next_hands = hands;
            next_hands[seat].remove(card);
            let mut next_trick = trick;
            next_trick.add(card);
            self.enumerate(parent, next_hands, next_trick);
        }
    }

    fn declarer_card(&self, parent: NodeId, hands: Hands, trick: Trick, legal: CardSet) -> Card {
        let node = &self.nodes[parent];
        let view = NodeView {
            hands,
            trick,
            declarer: self.declarer,
            declarer_tricks: node.declarer_tricks,
            depth: node.depth,
        };
        let card = self.policy.choose_card(&view);
        invariant!(legal.contains(card), "policy chose illegal card {} from {}", card, legal);
        if legal.contains(card) {
            return card;
        }
        tracing::warn!(
            target: "misere_solver::tree",
            %card,
            %legal,
            "declarer policy chose an illegal card"
        );
        legal.first().unwrap_or(card)
    }

    fn complete_trick(&mut self, parent: NodeId, hands: Hands, trick: Trick) {
        let winner = match trick.winner() {
            Some(w) => w.seat,
            None => return,
        };
        let sizes = hands.sizes();
        invariant!(
            sizes.iter().all(|s| *s == sizes[0]),
            "hand sizes {:?} differ after trick",
            sizes
        );
        tracing::trace!(
            target: "misere_solver::tree",
            leader = trick.leader(),
            cards = %trick.cards(),
            winner,
            "trick"
        );
        if winner == self.declarer {
            self.stats.lost += 1;
            return;
        }

        let depth = self.nodes[parent].depth + 1;
        let view = NodeView {
            hands,
            trick: Trick::new(winner),
            declarer: self.declarer,
            declarer_tricks: 0,
            depth,
        };
        let finished = hands.all_cards().is_empty();
        if !finished && !self.insert_key(&view) {
            return;
        }

        self.stats.nodes += 1;
        let id = self.nodes.len();
        self.nodes.push(TrickNode {
            trick,
            winner,
            hands,
            declarer_tricks: 0,
            depth,
            parent: Some(parent),
            children: Vec::new(),
            marked: false,
        });
        self.nodes[parent].children.push(id);

        if finished || self.policy.is_goal(&view) {
            self.stats.goals += 1;
            self.mark_line(id);
            if self.config.mode == SearchMode::FirstSolution {
                self.stop = true;
            }
            return;
        }
        if self.config.node_limit.map_or(false, |limit| self.stats.nodes >= limit) {
            self.hit_limit = true;
            self.stop = true;
            return;
        }
        self.expand(id);
    }

    /// Record the position reached; false if it was reached before
    fn insert_key(&mut self, view: &NodeView) -> bool {
        let leader = view.trick.leader();
        if !self.exact[leader].insert(view.hands.all_cards().value()) {
            self.stats.duplicates += 1;
            return false;
        }
        if !self.policy.keep_fine_detail(view)
            && !self.similar[leader].insert(RelativeHands::compute(&view.hands))
        {
            self.stats.similar += 1;
            return false;
        }
        true
    }

    fn mark_line(&mut self, id: NodeId) {
        let mut at = Some(id);
        while let Some(i) = at {
            if self.nodes[i].marked {
                break;
            }
            self.nodes[i].marked = true;
            at = self.nodes[i].parent;
        }
    }
}
