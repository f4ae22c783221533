//! Command line front end: search a position, run perft, or print the
//! generated magic numbers.
//!
//! Usage: cargo run --release -- search --fen "<fen>" --depth 8
//!        cargo run --release -- perft --depth 5 --divide
//!        cargo run --release -- magics

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::eyre;
use log::info;

use magic_chess::board::{Board, STARTING_POSITION_FEN};
use magic_chess::config::{PhaseRule, SearchConfig, TableConfig};
use magic_chess::magic::{Slider, BISHOP_RELEVANT_BITS, ROOK_RELEVANT_BITS};
use magic_chess::perft::{perft, perft_divide};
use magic_chess::search::Search;
use magic_chess::tables::Tables;

#[derive(Parser, Debug)]
#[command(name = "magic-chess")]
#[command(about = "Magic bitboard chess engine core")]
struct Args {
    /// Seed for the magic number search
    #[arg(long, global = true)]
    magic_seed: Option<u64>,

    /// Seed for the Zobrist keys
    #[arg(long, global = true)]
    zobrist_seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search a position with iterative deepening
    Search {
        #[arg(long, default_value = STARTING_POSITION_FEN)]
        fen: String,

        /// Moves to play from the position first, in coordinate notation
        #[arg(long, num_args = 1.., value_delimiter = ' ')]
        moves: Vec<String>,

        #[arg(short, long, default_value_t = 8)]
        depth: u8,

        /// Transposition table size in megabytes
        #[arg(long, default_value_t = 16)]
        tt_mb: usize,

        /// Stop after this many milliseconds
        #[arg(long)]
        time_ms: Option<u64>,

        /// Stop after this many nodes
        #[arg(long)]
        nodes: Option<u64>,

        #[arg(long, default_value_t = 50)]
        aspiration: i32,

        #[arg(long)]
        no_null_move: bool,

        #[arg(long)]
        no_lmr: bool,

        #[arg(long, value_enum, default_value_t = PhaseArg::Observed)]
        phase_rule: PhaseArg,
    },

    /// Count leaf nodes of the move tree
    Perft {
        #[arg(long, default_value = STARTING_POSITION_FEN)]
        fen: String,

        #[arg(short, long, default_value_t = 5)]
        depth: u8,

        /// Print the count under each root move
        #[arg(long)]
        divide: bool,
    },

    /// Print the relevant-bit tables and the magic numbers found with the seed
    Magics,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum PhaseArg {
    Observed,
    Material,
}

impl From<PhaseArg> for PhaseRule {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Observed => PhaseRule::Observed,
            PhaseArg::Material => PhaseRule::Material,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut table_config = TableConfig::default();
    if let Some(seed) = args.magic_seed {
        table_config.magic_seed = seed;
    }
    if let Some(seed) = args.zobrist_seed {
        table_config.zobrist_seed = seed;
    }

    let start = Instant::now();
    let tables = Tables::new(&table_config)?;
    info!("Tables built in {:?}", start.elapsed());

    match args.command {
        Command::Search {
            fen,
            moves,
            depth,
            tt_mb,
            time_ms,
            nodes,
            aspiration,
            no_null_move,
            no_lmr,
            phase_rule,
        } => {
            if depth == 0 {
                return Err(eyre!("search depth must be at least 1"));
            }
            let mut config = SearchConfig::new()
                .max_depth(depth)
                .tt_size_mb(tt_mb)
                .aspiration_window(aspiration)
                .null_move(!no_null_move)
                .lmr(!no_lmr)
                .phase_rule(phase_rule.into());
            if let Some(ms) = time_ms {
                config = config.time_limit(Duration::from_millis(ms));
            }
            if let Some(n) = nodes {
                config = config.node_limit(n);
            }

            let mut search = Search::new(Board::from_fen(&tables, &fen)?, config);
            for mv in &moves {
                search.play_uci_move(mv)?;
            }
            println!("{}", search.board());

            let result = search.search();
            println!("Evaluation: {}", result.score);
            if let Some(mate) = result.mate_in() {
                println!("Mate in {}", mate);
            }
            println!("Principal variation: {}", result.pv_string());
            match result.best_move {
                Some(mv) => println!("Best move: {}", mv),
                None => println!("Best move: none"),
            }
        }
        Command::Perft { fen, depth, divide } => {
            let board = Board::from_fen(&tables, &fen)?;
            let start = Instant::now();
            let nodes = if divide {
                let counts = perft_divide(&board, depth);
                for (mv, count) in &counts {
                    println!("{}: {}", mv, count);
                }
                counts.iter().map(|(_, n)| n).sum()
            } else {
                perft(&board, depth)
            };
            let elapsed = start.elapsed();
            println!("Depth {}: {} nodes in {:?}", depth, nodes, elapsed);
            if elapsed.as_secs_f64() > 0.0 {
                println!("{:.0} nodes/s", nodes as f64 / elapsed.as_secs_f64());
            }
        }
        Command::Magics => {
            print_table("BISHOP_RELEVANT_BITS", &BISHOP_RELEVANT_BITS.map(u64::from), false);
            print_table("ROOK_RELEVANT_BITS", &ROOK_RELEVANT_BITS.map(u64::from), false);
            print_table("BISHOP_MAGICS", &tables.attacks.bishop_magics(), true);
            print_table("ROOK_MAGICS", &tables.attacks.rook_magics(), true);

            for slider in [Slider::Bishop, Slider::Rook] {
                let total: u32 = (0..64u8).map(|sq| 1u32 << slider.relevant_bits(sq)).sum();
                info!("{} table: {} entries", slider, total);
            }
        }
    }

    Ok(())
}

fn print_table(name: &str, values: &[u64; 64], hex: bool) {
    let ty = if hex { "u64" } else { "u8" };
    println!("pub const {}: [{}; 64] = [", name, ty);
    for row in values.chunks(8) {
        let cells: Vec<String> = row
            .iter()
            .map(|v| if hex { format!("{:#018x}", v) } else { v.to_string() })
            .collect();
        println!("    {},", cells.join(", "));
    }
    println!("];");
}
