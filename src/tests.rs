//! Scenario tests across the suit simulation, the trick tree and the bot

use super::*;
use std::sync::Arc;

struct SuitCase {
    name: &'static str,
    mine: &'static str,
    left: &'static str,
    right: &'static str,
    me_start: bool,
    /// (tricks_if_self_leads, tricks_if_they_lead)
    expected: (u8, u8),
    good: bool,
}

const SUIT_CASES: &[SuitCase] = &[
    SuitCase {
        name: "lone ace under a jack lead",
        mine: "A",
        left: "J",
        right: "",
        me_start: false,
        expected: (0, 1),
        good: false,
    },
    SuitCase {
        name: "three bottom cards, they lead",
        mine: "789",
        left: "XJQKA",
        right: "XJQKA",
        me_start: false,
        expected: (0, 0),
        good: true,
    },
    SuitCase {
        name: "three bottom cards, self leads",
        mine: "789",
        left: "XJQKA",
        right: "XJQKA",
        me_start: true,
        expected: (0, 0),
        good: true,
    },
    SuitCase {
        name: "doubled top holdings",
        mine: "8JK",
        left: "XQA",
        right: "XQA",
        me_start: false,
        expected: (0, 0),
        good: true,
    },
    SuitCase {
        name: "hole below the nine",
        mine: "9J",
        left: "78",
        right: "X",
        me_start: false,
        expected: (0, 1),
        good: false,
    },
    SuitCase {
        name: "nine led before the seven",
        mine: "8X",
        left: "79",
        right: "J",
        me_start: false,
        expected: (0, 1),
        good: false,
    },
    SuitCase {
        name: "two low cards on the left",
        mine: "7J",
        left: "8A",
        right: "9",
        me_start: false,
        expected: (0, 1),
        good: true,
    },
    SuitCase {
        name: "opponents void",
        mine: "78",
        left: "",
        right: "",
        me_start: false,
        expected: (1, 0),
        good: true,
    },
    SuitCase {
        name: "empty suit",
        mine: "",
        left: "789",
        right: "XJ",
        me_start: true,
        expected: (0, 0),
        good: true,
    },
    SuitCase {
        name: "king under the lone ace",
        mine: "K",
        left: "A",
        right: "",
        me_start: false,
        expected: (0, 0),
        good: true,
    },
    SuitCase {
        name: "seven led under both",
        mine: "7",
        left: "8",
        right: "9",
        me_start: true,
        expected: (0, 0),
        good: true,
    },
];

#[test]
fn test_suit_cases() {
    let table = MisereTable::new();
    let parse = |text| CardSet::parse_suit(Suit::Heart, text).unwrap();
    for case in SUIT_CASES {
        let data = max_unwanted_tricks(
            Suit::Heart,
            parse(case.mine),
            parse(case.left),
            parse(case.right),
            case.me_start,
            &table,
        );
        assert_eq!(
            (data.tricks_if_self_leads, data.tricks_if_they_lead),
            case.expected,
            "{}",
            case.name
        );
        assert_eq!(data.good, case.good, "{}", case.name);
        assert_eq!(data.suit, Suit::Heart, "{}", case.name);
    }
}

struct TreeCase {
    name: &'static str,
    deal: &'static str,
    leader: Seat,
    found: bool,
}

const TREE_CASES: &[TreeCase] = &[
    TreeCase {
        name: "last trick ducked",
        deal: "8... 9... X...",
        leader: 1,
        found: true,
    },
    TreeCase {
        name: "last trick won",
        deal: "A... 9... X...",
        leader: 1,
        found: false,
    },
    TreeCase {
        name: "three low suits",
        deal: "7.7.7. 8.8.8. 9.9.9.",
        leader: 1,
        found: true,
    },
    TreeCase {
        name: "spade ladder",
        deal: "79... 8J... XQ...",
        leader: 1,
        found: true,
    },
    TreeCase {
        name: "ace caught in the end",
        deal: "8A... 79... XJ...",
        leader: 1,
        found: false,
    },
];

#[test]
fn test_tree_cases() {
    let bot = MisereBot::new(0, Arc::new(MisereTable::new()));
    for case in TREE_CASES {
        let hands: Hands = case.deal.parse().unwrap();
        let tree = TrickTree::build(&Position::new(hands, case.leader), 0, &bot, TreeConfig::unbounded());
        assert_eq!(!tree.is_empty(), case.found, "{}", case.name);
        let expected = if case.found {
            BuildOutcome::Found
        } else {
            BuildOutcome::Exhausted
        };
        assert_eq!(tree.outcome(), expected, "{}", case.name);
    }
}

/// Play a whole round: the bot in seat 0, defenders always playing `defend`
fn play_round(deal: &str, leader: Seat, defend: fn(CardSet) -> Option<Card>) -> (Position, Vec<Reason>) {
    let hands: Hands = deal.parse().unwrap();
    let mut position = Position::new(hands, leader);
    let mut bot = MisereBot::new(0, Arc::new(MisereTable::new()));
    let mut reasons = Vec::new();
    while !position.is_over() {
        let card = if position.to_play() == 0 {
            let decision = bot.choose_play(&position).unwrap();
            reasons.push(decision.reason);
            decision.card
        } else {
            defend(position.legal_cards()).unwrap()
        };
        position.apply(card).unwrap();
    }
    (position, reasons)
}

#[test]
fn test_round_against_low_defence() {
    let (position, reasons) = play_round("79... 8J... XQ...", 1, |legal| legal.first());
    assert_eq!(position.tricks[0], 0);
    assert!(reasons.contains(&Reason::Tree));
}

#[test]
fn test_round_against_high_defence() {
    let (position, _) = play_round("7.7.7. 8.8.8. 9.9.9.", 1, |legal| legal.last());
    assert_eq!(position.tricks[0], 0);
    assert_eq!(position.tricks[1] + position.tricks[2], 3);
}

#[test]
fn test_caught_ace_costs_one_trick() {
    let (low, _) = play_round("8A... 79... XJ...", 1, |legal| legal.first());
    assert_eq!(low.tricks[0], 1);
    let (high, reasons) = play_round("8A... 79... XJ...", 1, |legal| legal.last());
    assert_eq!(high.tricks[0], 1);
    assert_eq!(reasons, vec![Reason::Heuristic, Reason::Forced]);
}

#[test]
fn test_cards_and_hands_round_trip() {
    let deal = "789.789.7.7 XJQ.XJ.89X.8 KA.QKA.JQ.9X";
    let hands: Hands = deal.parse().unwrap();
    assert_eq!(hands.to_string(), deal);
    assert_eq!(hands.all_cards().size(), 26);
    assert_eq!(hands[0].size_of(Suit::Spade), 3);
}
