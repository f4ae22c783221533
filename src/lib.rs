pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod magic;
pub mod masks;
pub mod movegen;
pub mod movelist;
pub mod moves;
pub mod perft;
pub mod search;
pub mod tables;
pub mod tt;
pub mod types;
pub mod zobrist;
