use criterion::{black_box, criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;

use magic_chess::board::Board;
use magic_chess::config::{PhaseRule, SearchConfig, TableConfig};
use magic_chess::evaluate::static_evaluate;
use magic_chess::perft::perft;
use magic_chess::search::Search;
use magic_chess::tables::Tables;

const SEB_FEN: &str = "r3k2r/p1ppqpb1/Bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPB1PPP/R3K2R b KQkq - 0 1";

static TABLES: Lazy<Tables> = Lazy::new(|| Tables::new(&TableConfig::default()).unwrap());

pub fn bench_moves_from_start(c: &mut Criterion) {
    let bo = Board::starting_position(&TABLES);
    c.bench_function("generate moves from start", |b| b.iter(|| black_box(&bo).generate_moves()));
}

pub fn bench_moves_from_seb(c: &mut Criterion) {
    let bo = Board::from_fen(&TABLES, SEB_FEN).unwrap();
    c.bench_function("generate moves from seb", |b| b.iter(|| black_box(&bo).generate_moves()));
}

pub fn bench_evaluate_seb(c: &mut Criterion) {
    let bo = Board::from_fen(&TABLES, SEB_FEN).unwrap();
    c.bench_function("evaluate seb", |b| {
        b.iter(|| static_evaluate(black_box(&bo), PhaseRule::Observed))
    });
}

pub fn bench_perft_4(c: &mut Criterion) {
    let bo = Board::starting_position(&TABLES);
    c.bench_function("perft from start 4 ply", |b| b.iter(|| perft(black_box(&bo), 4)));
}

pub fn bench_search_seb(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat-sampling");
    group.sample_size(10);
    let bo = Board::from_fen(&TABLES, SEB_FEN).unwrap();
    group.bench_function("search from seb 5 ply", |b| {
        b.iter(|| {
            let mut search = Search::new(bo, SearchConfig::new().max_depth(5).tt_size_mb(4));
            search.search()
        })
    });
    group.finish();
}

pub fn bench_build_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("tables");
    group.sample_size(10);
    group.bench_function("build tables", |b| b.iter(|| Tables::new(black_box(&TableConfig::default()))));
    group.finish();
}

criterion_group!(
    benches,
    bench_moves_from_start,
    bench_moves_from_seb,
    bench_evaluate_seb,
    bench_perft_4,
    bench_search_seb,
    bench_build_tables,
);
criterion_main!(benches);
