//! misere-diag - Inspect a misère deal
//!
//! Prints the per-suit simulation for the declarer, the suits the opponents
//! can exploit, a talon discard when the declarer still holds twelve cards,
//! and the certified line of the trick tree if one exists.
//!
//! Usage: misere-diag "<declarer> <left> <right>" [--leader 1] [--exhaustive] [-v]

use clap::Parser;
use misere_solver::{
    BuildOutcome, Hands, MisereBot, MisereTable, Position, SearchMode, Seat, TreeConfig,
    TrickTree, HAND_WITH_TALON, NUM_SEATS,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "misere-diag")]
#[command(about = "Suit simulation and trick-tree search for a misère deal")]
#[command(version)]
struct Args {
    /// Three hands in seat order, e.g. "79.8.7. 8J.9.X. XQ.X.8."
    deal: String,

    /// Seat leading the first trick
    #[arg(short = 'l', long = "leader", default_value_t = 1)]
    leader: Seat,

    /// Seat playing the misère
    #[arg(short = 'd', long = "declarer", default_value_t = 0)]
    declarer: Seat,

    /// Search every line instead of stopping at the first one
    #[arg(short = 'x', long = "exhaustive")]
    exhaustive: bool,

    /// Refuse the tree when a suit has more cards in play (0 lifts the limit)
    #[arg(long = "max-suit-len", default_value_t = 6)]
    max_suit_len: usize,

    /// Stop the tree after this many nodes
    #[arg(long = "node-limit")]
    node_limit: Option<usize>,

    /// Keep positions that differ only by equivalent ranks
    #[arg(long = "fine-detail")]
    fine_detail: bool,

    /// Log level: -v info, -vv debug, -vvv trace (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if args.leader >= NUM_SEATS || args.declarer >= NUM_SEATS {
        eprintln!("Seats are numbered 0 to {}", NUM_SEATS - 1);
        std::process::exit(1);
    }

    let hands: Hands = match args.deal.parse() {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error parsing deal '{}': {}", args.deal, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = hands.validate() {
        eprintln!("Invalid deal: {}", e);
        std::process::exit(1);
    }

    let mode = if args.exhaustive {
        SearchMode::Exhaustive
    } else {
        SearchMode::FirstSolution
    };
    let max_suit_len = (args.max_suit_len > 0).then_some(args.max_suit_len);
    let config = TreeConfig::default()
        .with_mode(mode)
        .with_max_suit_len(max_suit_len)
        .with_node_limit(args.node_limit);
    let bot = MisereBot::new(args.declarer, Arc::new(MisereTable::new()))
        .with_config(config)
        .with_fine_detail(args.fine_detail);

    println!("Deal:     {}", hands);
    println!("Declarer: seat {}", args.declarer);
    println!("Leader:   seat {}", args.leader);
    println!();

    print_suits(&bot, &hands);

    if hands[args.declarer].size() == HAND_WITH_TALON {
        match bot.choose_discard(hands[args.declarer]) {
            Ok([first, second]) => println!("Discard:  {} {}", first, second),
            Err(e) => println!("Discard:  none ({})", e),
        }
        println!();
    }

    let position = Position::new(hands, args.leader);
    let tree = TrickTree::build(&position, args.declarer, &bot, config);
    print_tree(&tree);
}

fn print_suits(bot: &MisereBot, hands: &Hands) {
    let they_lead = bot.suit_report(hands, false);
    let self_leads = bot.suit_report(hands, true);
    println!("Suit  Self  They  Good  Eval");
    for (theirs, mine) in they_lead.iter().zip(self_leads.iter()) {
        println!(
            "{:>4}  {:>4}  {:>4}  {:>4}  {:.3}",
            theirs.suit,
            mine.tricks_if_self_leads,
            theirs.tricks_if_they_lead,
            if theirs.good { "yes" } else { "no" },
            theirs.misere_eval
        );
    }
    let holes = bot.holes(hands);
    if holes.is_empty() {
        println!("No holes");
    } else {
        for hole in holes {
            println!(
                "Hole in {}: {} trick(s) if they lead, {} if declarer leads",
                hole.suit, hole.tricks, hole.self_lead_tricks
            );
        }
    }
    println!();
}

fn print_tree(tree: &TrickTree) {
    let stats = tree.stats();
    let outcome = match tree.outcome() {
        BuildOutcome::Found => "certified line found".to_string(),
        BuildOutcome::Exhausted => "no certified line".to_string(),
        BuildOutcome::NodeLimit => "node limit reached".to_string(),
        BuildOutcome::SuitTooLong { suit, cards } => {
            format!("refused: {} cards in play in {}", cards, suit)
        }
        BuildOutcome::UnevenHands => "refused: hands are not at a trick boundary".to_string(),
    };
    println!("Tree:     {}", outcome);
    println!(
        "Nodes: {}  Duplicates: {}  Similar: {}  Lost: {}  Goals: {}  Pruned: {}",
        stats.nodes, stats.duplicates, stats.similar, stats.lost, stats.goals, stats.pruned
    );

    let line = tree.line();
    if line.is_empty() {
        return;
    }
    println!();
    for (i, trick) in line.iter().enumerate() {
        let cards: Vec<String> = trick
            .plays()
            .map(|p| format!("{}:{}", p.seat, p.card))
            .collect();
        let winner = trick
            .winner()
            .map(|w| w.seat.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:>2}. {}  won by {}", i + 1, cards.join(" "), winner);
    }
}
