//! Single-suit misère simulation
//!
//! Plays one suit in isolation between the analysed hand (seat 0) and its two
//! opponents (seat 1 plays after it, seat 2 before it). The analysed hand tries
//! to lose every trick; the opponents cooperate to make it win one. Discards
//! from other suits are not modelled, which makes the result a fast estimate
//! rather than an exact verdict.
//!
//! The suit is solved exactly: every distinct card of every seat is tried, the
//! analysed hand minimising and the opponents maximising the tricks it takes.
//! Cards are distinct unless they are adjacent among the cards still held or
//! on the table. Positions between tricks are memoised.

use std::collections::HashMap;

use super::cards::CardSet;
use super::types::*;

const ME: Seat = 0;
const LEFT: Seat = 1;
const RIGHT: Seat = 2;

/// Per-suit analysis result
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListData {
    pub suit: Suit,
    /// Tricks the hand is forced to win on its own leads
    pub tricks_if_self_leads: u8,
    /// Tricks the hand is forced to win on opponents' leads
    pub tricks_if_they_lead: u8,
    /// Lowest card lies below every opponent's lowest card
    pub good: bool,
    /// Probability that this rank pattern yields a trick, from `MisereTable`
    pub misere_eval: f32,
}

impl ListData {
    /// All forced tricks of the simulation
    #[inline]
    pub fn total(&self) -> u8 {
        self.tricks_if_self_leads + self.tricks_if_they_lead
    }

    /// A suit where the opponents can force a trick
    #[inline]
    pub fn is_hole(&self) -> bool {
        self.total() > 0
    }
}

/// Forced tricks of one suit when the hand or the opponents lead first.
///
/// Whenever the opponents win a trick, either of them may lead the next one,
/// as if they could always hand the lead to each other. Never fails: an empty
/// holding returns zeros.
pub fn max_unwanted_tricks(
    suit: Suit,
    mine: CardSet,
    left: CardSet,
    right: CardSet,
    me_start: bool,
    table: &MisereTable,
) -> ListData {
    let holdings = [mine.pattern(suit), left.pattern(suit), right.pattern(suit)];
    let lead = if me_start { Lead::Seat(ME) } else { Lead::Opponents };
    let tally = Solver::new(false).solve(holdings, lead);
    list_data(suit, holdings, tally, table)
}

/// Forced tricks of one suit when `elder_hand` leads and every later trick is
/// led by the seat that won the previous one (seat 0 is the analysed hand).
pub fn max_unwanted_tricks_seated(
    suit: Suit,
    mine: CardSet,
    left: CardSet,
    right: CardSet,
    elder_hand: Seat,
    table: &MisereTable,
) -> ListData {
    let holdings = [mine.pattern(suit), left.pattern(suit), right.pattern(suit)];
    let tally = Solver::new(true).solve(holdings, Lead::Seat(elder_hand % NUM_SEATS));
    list_data(suit, holdings, tally, table)
}

fn list_data(suit: Suit, holdings: [u8; NUM_SEATS], tally: Tally, table: &MisereTable) -> ListData {
    let data = ListData {
        suit,
        tricks_if_self_leads: tally.self_leads,
        tricks_if_they_lead: tally.they_lead,
        good: is_good(&holdings),
        misere_eval: table.eval(holdings[ME]),
    };
    tracing::trace!(
        target: "misere_solver::suit",
        suit = %suit,
        holding = %CardSet::from_pattern(suit, holdings[ME]),
        self_leads = data.tricks_if_self_leads,
        they_lead = data.tricks_if_they_lead,
        good = data.good,
        "suit simulated"
    );
    data
}

/// Lowest card of the hand is below the lowest card of each opponent holding
/// the suit. Empty holdings are trivially good.
fn is_good(holdings: &[u8; NUM_SEATS]) -> bool {
    if holdings[ME] == 0 {
        return true;
    }
    let mine = lowest(holdings[ME]);
    [holdings[LEFT], holdings[RIGHT]]
        .iter()
        .filter(|h| **h != 0)
        .all(|h| mine < lowest(*h))
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
struct Tally {
    self_leads: u8,
    they_lead: u8,
}

impl Tally {
    #[inline]
    fn total(&self) -> u8 {
        self.self_leads + self.they_lead
    }
}

/// Who leads the next trick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Lead {
    Seat(Seat),
    /// Either opponent holding the suit, whichever hurts more
    Opponents,
}

/// Minimax over one suit. `seated` makes the winner of a trick lead the next
/// one; otherwise the opponents may pass the lead between them.
struct Solver {
    seated: bool,
    memo: HashMap<([u8; NUM_SEATS], Lead), Tally>,
}

impl Solver {
    fn new(seated: bool) -> Self {
        Solver {
            seated,
            memo: HashMap::new(),
        }
    }

    fn solve(&mut self, h: [u8; NUM_SEATS], lead: Lead) -> Tally {
        if h[ME] == 0 {
            return Tally::default();
        }
        if h[LEFT] == 0 && h[RIGHT] == 0 {
            // Both opponents out: the hand pays once for having to lead the suit
            return Tally {
                self_leads: 1,
                they_lead: 0,
            };
        }
        if let Some(tally) = self.memo.get(&(h, lead)) {
            return *tally;
        }

        let leaders = match lead {
            Lead::Opponents => [Some(LEFT), Some(RIGHT)],
            Lead::Seat(seat) if seat == ME || h[seat] != 0 => [Some(seat), None],
            // A void winner hands the lead to the partner
            Lead::Seat(seat) => [Some(LEFT + RIGHT - seat), None],
        };
        let mut best: Option<Tally> = None;
        for leader in leaders.into_iter().flatten() {
            if h[leader] == 0 {
                continue;
            }
            let tally = self.play(h, leader, 0, None, 0);
            if best.map_or(true, |b| tally.total() > b.total()) {
                best = Some(tally);
            }
        }
        let tally = best.unwrap_or_default();
        self.memo.insert((h, lead), tally);
        tally
    }

    /// Fill slot `offset` of the trick led by `leader`. `best` is the seat and
    /// rank on top so far, `table` the ranks already played to the trick.
    fn play(
        &mut self,
        h: [u8; NUM_SEATS],
        leader: Seat,
        offset: usize,
        best: Option<(Seat, u32)>,
        table: u8,
    ) -> Tally {
        if offset == NUM_SEATS {
            let winner = best.map_or(leader, |(seat, _)| seat);
            let next = if winner == ME || self.seated {
                Lead::Seat(winner)
            } else {
                Lead::Opponents
            };
            let mut tally = self.solve(h, next);
            if winner == ME {
                if leader == ME {
                    tally.self_leads += 1;
                } else {
                    tally.they_lead += 1;
                }
            }
            return tally;
        }

        let seat = (leader + offset) % NUM_SEATS;
        if h[seat] == 0 {
            return self.play(h, leader, offset + 1, best, table);
        }
        let others = (0..NUM_SEATS)
            .filter(|s| *s != seat)
            .fold(table, |acc, s| acc | h[s]);

        let mut result: Option<Tally> = None;
        let mut choices = distinct_ranks(h[seat], others);
        while choices != 0 {
            let rank = highest(choices);
            choices &= !(1u8 << rank);

            let mut next = h;
            next[seat] &= !(1u8 << rank);
            let on_top = match best {
                Some((_, bar)) if rank <= bar => best,
                _ => Some((seat, rank)),
            };
            let tally = self.play(next, leader, offset + 1, on_top, table | (1u8 << rank));
            let better = match result {
                None => true,
                Some(r) if seat == ME => tally.total() < r.total(),
                Some(r) => tally.total() > r.total(),
            };
            if better {
                result = Some(tally);
            }
        }
        result.unwrap_or_default()
    }
}

/// Top rank of each run of `holding` not split by a rank in `others`
fn distinct_ranks(holding: u8, others: u8) -> u8 {
    let mut picks = 0u8;
    let mut in_run = false;
    for rank in (0..8).rev() {
        let bit = 1u8 << rank;
        if holding & bit != 0 {
            if !in_run {
                picks |= bit;
            }
            in_run = true;
        } else if others & bit != 0 {
            in_run = false;
        }
    }
    picks
}

#[inline]
fn lowest(pattern: u8) -> u32 {
    pattern.trailing_zeros()
}

#[inline]
fn highest(pattern: u8) -> u32 {
    7 - pattern.leading_zeros()
}

/// Danger weights for every single-suit rank pattern.
///
/// Entry `p` is the fraction of ways to split the ranks missing from `p`
/// between the two opponents for which the suit, opponents leading, costs at
/// least one trick. Built once and shared by reference.
#[derive(Clone, Debug)]
pub struct MisereTable {
    weights: Box<[f32; 256]>,
}

impl MisereTable {
    pub fn new() -> Self {
        let mut weights = Box::new([0f32; 256]);
        let mut solver = Solver::new(false);
        for (pattern, weight) in weights.iter_mut().enumerate().skip(1) {
            let mine = pattern as u8;
            let outstanding = !mine;
            let mut losing = 0u32;
            let mut total = 0u32;
            // Enumerate every subset of the outstanding ranks for the left hand
            let mut left = outstanding;
            loop {
                let right = outstanding & !left;
                if solver.solve([mine, left, right], Lead::Opponents).total() > 0 {
                    losing += 1;
                }
                total += 1;
                if left == 0 {
                    break;
                }
                left = (left - 1) & outstanding;
            }
            *weight = losing as f32 / total as f32;
        }
        MisereTable { weights }
    }

    /// Weight of one rank pattern (bit 0 = seven)
    #[inline]
    pub fn eval(&self, pattern: u8) -> f32 {
        self.weights[pattern as usize]
    }

    /// Summed weight of every suit of a hand
    pub fn hand_eval(&self, hand: CardSet) -> f32 {
        Suit::ALL.iter().map(|s| self.eval(hand.pattern(*s))).sum()
    }
}

impl Default for MisereTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suit(text: &str) -> CardSet {
        CardSet::parse_suit(Suit::Spade, text).unwrap()
    }

    fn run(mine: &str, left: &str, right: &str, me_start: bool, table: &MisereTable) -> ListData {
        max_unwanted_tricks(Suit::Spade, suit(mine), suit(left), suit(right), me_start, table)
    }

    #[test]
    fn test_lone_ace_under_jack_lead() {
        let table = MisereTable::new();
        let data = run("A", "J", "", false, &table);
        assert_eq!(data.tricks_if_they_lead, 1);
        assert_eq!(data.tricks_if_self_leads, 0);
        assert!(!data.good);
    }

    #[test]
    fn test_bottom_cards_never_win() {
        let table = MisereTable::new();
        for me_start in [false, true] {
            let data = run("789", "XJQKA", "XJQKA", me_start, &table);
            assert!(data.good);
            assert_eq!(data.tricks_if_self_leads, 0);
            assert_eq!(data.tricks_if_they_lead, 0);
        }
        for elder in 0..NUM_SEATS {
            let data = max_unwanted_tricks_seated(
                Suit::Spade,
                suit("789"),
                suit("XJQKA"),
                suit("XJQKA"),
                elder,
                &table,
            );
            assert_eq!(data.total(), 0);
        }
    }

    #[test]
    fn test_doubled_top_holdings() {
        // Both opponents listed with X, Q and A, which no deal can produce.
        // Each pattern is played as given, so the 8 is the lowest card and
        // every opponent lead can be ducked. Reading it as good = false with
        // two forced tricks would contradict the definition of `good`; see
        // DESIGN.md, open question decision 2.
        let table = MisereTable::new();
        let data = run("8JK", "XQA", "XQA", false, &table);
        assert!(data.good);
        assert_eq!(data.tricks_if_they_lead, 0);

        // Leading, the 8 is the only safe card; the K is caught later
        let data = run("8JK", "XQA", "XQA", true, &table);
        assert_eq!(data.tricks_if_self_leads, 0);
        assert_eq!(data.tricks_if_they_lead, 1);
    }

    #[test]
    fn test_opponents_save_the_low_card() {
        // Left leads the nine first: the jack wins it, and the seven led
        // next catches whichever card the hand kept
        let table = MisereTable::new();
        let data = run("8X", "79", "J", false, &table);
        assert_eq!((data.tricks_if_self_leads, data.tricks_if_they_lead), (0, 1));
        assert!(!data.good);

        let data = run("8X", "79", "J", true, &table);
        assert_eq!(data.total(), 1);

        for elder in 0..NUM_SEATS {
            let data = max_unwanted_tricks_seated(
                Suit::Spade,
                suit("8X"),
                suit("79"),
                suit("J"),
                elder,
                &table,
            );
            assert_eq!(data.tricks_if_they_lead, 1, "elder {}", elder);
        }
    }

    #[test]
    fn test_hole_below_the_nine() {
        let table = MisereTable::new();
        let data = run("9J", "78", "X", false, &table);
        assert!(!data.good);
        assert_eq!((data.tricks_if_self_leads, data.tricks_if_they_lead), (0, 1));
        assert!(data.is_hole());
    }

    #[test]
    fn test_opponents_void_costs_one_lead() {
        let table = MisereTable::new();
        let data = run("78", "", "", false, &table);
        assert!(data.good);
        assert_eq!((data.tricks_if_self_leads, data.tricks_if_they_lead), (1, 0));
    }

    #[test]
    fn test_empty_suit_is_zero() {
        let table = MisereTable::new();
        let data = run("", "789", "XJ", true, &table);
        assert_eq!(data.total(), 0);
        assert!(data.good);
        assert_eq!(data.misere_eval, 0.0);
    }

    #[test]
    fn test_seating_changes_the_outcome() {
        let table = MisereTable::new();
        let seated = |elder| {
            max_unwanted_tricks_seated(
                Suit::Spade,
                suit("7J"),
                suit("8A"),
                suit("9"),
                elder,
                &table,
            )
        };
        // Left on lead can only give the hand a chance to shed both cards
        assert_eq!(seated(1).total(), 0);
        // Right leads its nine and left keeps the eight for the last trick
        assert_eq!(seated(2).tricks_if_they_lead, 1);
        assert_eq!(seated(0).tricks_if_they_lead, 1);
    }

    #[test]
    fn test_only_the_named_suit_is_read() {
        let table = MisereTable::new();
        let mine: CardSet = "A.7..".parse().unwrap();
        let left: CardSet = "J.8..".parse().unwrap();
        let data = max_unwanted_tricks(Suit::Club, mine, left, CardSet::new(), false, &table);
        assert_eq!(data.suit, Suit::Club);
        assert_eq!(data.total(), 0);
        assert!(data.good);
    }

    #[test]
    fn test_table_extremes() {
        let table = MisereTable::new();
        assert_eq!(table.eval(0), 0.0);
        // A lone seven is always ducked
        assert_eq!(table.eval(0b0000_0001), 0.0);
        // A lone ace always wins when the suit is led
        assert_eq!(table.eval(0b1000_0000), 1.0);
        assert_eq!(table.eval(0xFF), 1.0);
        let mid = table.eval(0b0100_0010);
        assert!(mid > 0.0 && mid < 1.0);
    }

    /// Every disjoint split of the eight ranks between hand, left, right and out
    fn all_splits() -> impl Iterator<Item = [u8; 3]> {
        (0..4u32.pow(8)).map(|mut code| {
            let mut h = [0u8; 3];
            for rank in 0..8 {
                let place = (code % 4) as usize;
                code /= 4;
                if place < 3 {
                    h[place] |= 1 << rank;
                }
            }
            h
        })
    }

    #[test]
    fn test_conservation() {
        let mut free = Solver::new(false);
        let mut seated = Solver::new(true);
        for h in all_splits() {
            let limit = (h[0].count_ones()).min(h[1].count_ones() + h[2].count_ones() + 1) as u8;
            for leader in 0..NUM_SEATS {
                let t = seated.solve(h, Lead::Seat(leader));
                assert!(t.total() <= limit, "{:?} led by {}", h, leader);
            }
            for lead in [Lead::Seat(ME), Lead::Opponents] {
                let t = free.solve(h, lead);
                assert!(t.total() <= limit, "{:?} {:?}", h, lead);
            }
        }
    }

    /// Plain minimax over every legal card, no memo and no run skipping.
    /// `my_leads` restricts the cards the hand may lead.
    fn brute_force(h: [u8; 3], lead: Lead, seated: bool, my_leads: fn(u8) -> u8) -> u8 {
        if h[ME] == 0 {
            return 0;
        }
        if h[LEFT] == 0 && h[RIGHT] == 0 {
            return 1;
        }
        let leaders: Vec<Seat> = match lead {
            Lead::Opponents => vec![LEFT, RIGHT],
            Lead::Seat(seat) if seat == ME || h[seat] != 0 => vec![seat],
            Lead::Seat(seat) => vec![LEFT + RIGHT - seat],
        };
        leaders
            .into_iter()
            .filter(|s| h[*s] != 0)
            .map(|leader| brute_force_trick(h, leader, 0, None, seated, my_leads))
            .max()
            .unwrap_or(0)
    }

    fn brute_force_trick(
        h: [u8; 3],
        leader: Seat,
        offset: usize,
        best: Option<(Seat, u32)>,
        seated: bool,
        my_leads: fn(u8) -> u8,
    ) -> u8 {
        if offset == NUM_SEATS {
            let winner = best.map_or(leader, |(seat, _)| seat);
            let next = if winner == ME || seated {
                Lead::Seat(winner)
            } else {
                Lead::Opponents
            };
            return brute_force(h, next, seated, my_leads) + u8::from(winner == ME);
        }
        let seat = (leader + offset) % NUM_SEATS;
        if h[seat] == 0 {
            return brute_force_trick(h, leader, offset + 1, best, seated, my_leads);
        }
        let cards = if seat == ME && offset == 0 {
            my_leads(h[ME])
        } else {
            h[seat]
        };
        let outcomes = (0..8u32).filter(|r| cards & (1 << r) != 0).map(|rank| {
            let mut next = h;
            next[seat] &= !(1u8 << rank);
            let on_top = match best {
                Some((_, bar)) if rank <= bar => best,
                _ => Some((seat, rank)),
            };
            brute_force_trick(next, leader, offset + 1, on_top, seated, my_leads)
        });
        if seat == ME {
            outcomes.min().unwrap_or(0)
        } else {
            outcomes.max().unwrap_or(0)
        }
    }

    fn small_splits() -> impl Iterator<Item = [u8; 3]> {
        all_splits().filter(|h| h.iter().all(|p| p.count_ones() <= 3))
    }

    #[test]
    fn test_matches_brute_force() {
        let mut free = Solver::new(false);
        let mut seated = Solver::new(true);
        for h in small_splits() {
            for lead in [Lead::Seat(ME), Lead::Opponents] {
                assert_eq!(
                    free.solve(h, lead).total(),
                    brute_force(h, lead, false, |p| p),
                    "{:?} {:?}",
                    h,
                    lead
                );
            }
            for elder in 0..NUM_SEATS {
                assert_eq!(
                    seated.solve(h, Lead::Seat(elder)).total(),
                    brute_force(h, Lead::Seat(elder), true, |p| p),
                    "{:?} led by {}",
                    h,
                    elder
                );
            }
        }
    }

    #[test]
    fn test_lead_search_never_worse_than_fixed_leads() {
        // Always leading the lowest card, or always the second lowest
        fn lowest_only(p: u8) -> u8 {
            p & p.wrapping_neg()
        }
        fn second_lowest(p: u8) -> u8 {
            let rest = p & !lowest_only(p);
            if rest == 0 {
                p
            } else {
                lowest_only(rest)
            }
        }
        let mut free = Solver::new(false);
        for h in small_splits() {
            for lead in [Lead::Seat(ME), Lead::Opponents] {
                let searched = free.solve(h, lead).total();
                assert!(searched <= brute_force(h, lead, false, lowest_only), "{:?}", h);
                assert!(searched <= brute_force(h, lead, false, second_lowest), "{:?}", h);
            }
        }
    }

    #[test]
    fn test_distinct_ranks() {
        // 8 and 9 form one run, the jack sits alone above the ten
        assert_eq!(distinct_ranks(0b0001_0110, 0b0000_1001), 0b0001_0100);
        // Ranks nobody holds do not split a run
        assert_eq!(distinct_ranks(0b1000_0001, 0), 0b1000_0000);
        assert_eq!(distinct_ranks(0, 0xFF), 0);
    }

    #[test]
    fn test_lower_card_never_spoils_good() {
        for h in all_splits() {
            if h[0] == 0 || !is_good(&h) {
                continue;
            }
            let out = !(h[0] | h[1] | h[2]);
            let lower = out & ((1u8 << lowest(h[0])) - 1);
            if lower != 0 {
                let added = [h[0] | (1 << lowest(lower)), h[1], h[2]];
                assert!(is_good(&added), "{:?}", h);
            }
        }
    }

    #[test]
    fn test_deterministic_and_non_mutating() {
        let table = MisereTable::new();
        let mine: CardSet = "8JK.7..".parse().unwrap();
        let left: CardSet = "79.8..".parse().unwrap();
        let right: CardSet = "XQA.9..".parse().unwrap();
        let before = (mine, left, right);
        let a = max_unwanted_tricks(Suit::Spade, mine, left, right, false, &table);
        let b = max_unwanted_tricks(Suit::Spade, mine, left, right, false, &table);
        assert_eq!(a, b);
        assert_eq!((mine, left, right), before);
    }
}
