//! Property checks for the Magic Formula ranker over generated inputs.

use magicrank_core::{rank, RankedResult, ScoredRecord, Ticker};

fn record(index: usize, earnings_yield: f64, rotc: f64) -> ScoredRecord {
    ScoredRecord {
        ticker: Ticker::parse(&format!("S{index:03}.L")).expect("valid ticker"),
        ebit: 100.0,
        enterprise_value: 100.0 / earnings_yield,
        tangible_capital: 100.0 / rotc,
        earnings_yield,
        rotc,
        ev_to_ebit: 1.0 / earnings_yield,
        payback_years: 1.0 / earnings_yield,
    }
}

/// Records with deliberately coarse metrics so ties are common.
fn universe(rng: &mut fastrand::Rng, size: usize) -> Vec<ScoredRecord> {
    (0..size)
        .map(|index| {
            let earnings_yield = f64::from(rng.u8(1..=20)) / 100.0;
            let rotc = f64::from(rng.u8(1..=20)) / 10.0;
            record(index, earnings_yield, rotc)
        })
        .collect()
}

fn order(result: &RankedResult) -> Vec<String> {
    result
        .iter()
        .map(|entry| entry.record.ticker.as_str().to_owned())
        .collect()
}

#[test]
fn ranking_is_independent_of_input_order() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for size in [1, 2, 7, 40, 150] {
        let records = universe(&mut rng, size);
        let expected = rank(records.clone());

        for _ in 0..5 {
            let mut shuffled = records.clone();
            rng.shuffle(&mut shuffled);
            assert_eq!(rank(shuffled), expected, "size {size}");
        }
    }
}

#[test]
fn positions_are_contiguous_from_one() {
    let mut rng = fastrand::Rng::with_seed(11);
    let ranked = rank(universe(&mut rng, 60));

    let positions = ranked.iter().map(|entry| entry.position).collect::<Vec<_>>();
    assert_eq!(positions, (1..=60).collect::<Vec<_>>());
}

#[test]
fn order_follows_score_then_yield_rank_then_ticker() {
    let mut rng = fastrand::Rng::with_seed(42);
    let ranked = rank(universe(&mut rng, 120));

    for pair in ranked.entries().windows(2) {
        let (left, right) = (&pair[0], &pair[1]);
        let key = |entry: &magicrank_core::RankedEntry| {
            (entry.magic_score, entry.rank_earnings_yield)
        };
        assert!(key(left) <= key(right), "{left:?} before {right:?}");
        if key(left) == key(right) {
            assert!(left.record.ticker < right.record.ticker);
        }
    }
}

#[test]
fn rank_sums_match_the_number_of_records() {
    let mut rng = fastrand::Rng::with_seed(7);
    let size = 33;
    let ranked = rank(universe(&mut rng, size));

    // Average ranks preserve the total 1 + 2 + ... + n.
    let expected = (size * (size + 1) / 2) as f64;
    let yield_total = ranked.iter().map(|entry| entry.rank_earnings_yield).sum::<f64>();
    let rotc_total = ranked.iter().map(|entry| entry.rank_rotc).sum::<f64>();
    assert!((yield_total - expected).abs() < 1e-9);
    assert!((rotc_total - expected).abs() < 1e-9);
}

#[test]
fn higher_yield_never_gets_a_worse_yield_rank() {
    let mut rng = fastrand::Rng::with_seed(99);
    let ranked = rank(universe(&mut rng, 80));

    for left in ranked.iter() {
        for right in ranked.iter() {
            if left.record.earnings_yield > right.record.earnings_yield {
                assert!(left.rank_earnings_yield < right.rank_earnings_yield);
            }
            if left.record.rotc == right.record.rotc {
                assert_eq!(left.rank_rotc, right.rank_rotc);
            }
        }
    }
}

#[test]
fn repeated_ranking_produces_the_same_ticker_order() {
    let mut rng = fastrand::Rng::with_seed(3);
    let records = universe(&mut rng, 50);

    assert_eq!(order(&rank(records.clone())), order(&rank(records)));
}
