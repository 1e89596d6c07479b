// Workers are forked from the harness process; keep this binary to one test.
extern crate sembench;

use sembench::{
    Benchmark,
    Phase,
    RunConfig,
    Summary,
};

#[test]
fn benchmark_collects_one_duration_per_worker() {
    let config = RunConfig::new(4, 3, 250, 4).unwrap();
    let mut bench = Benchmark::new(config).unwrap();
    assert_eq!(bench.phase(), Phase::PoolReady);

    let durations = bench.durations().unwrap();
    assert_eq!(durations.len(), 4);
    assert!(durations.iter().all(|d| d.is_finite() && *d >= 0.0));

    // Every worker posted twice per iteration and nothing ever decrements.
    assert_eq!(bench.pool().total().unwrap(), config.total_ops() as i64);

    let summary = Summary::from_durations(&durations).unwrap();
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;
    assert!((summary.avg - mean).abs() < 1e-9);
    assert!(summary.min <= summary.avg && summary.avg <= summary.max);

    let sets = bench.pool().sets().to_vec();
    let summary = bench.run().unwrap();
    assert!(summary.min <= summary.avg && summary.avg <= summary.max);
    assert!(sets.iter().all(|s| s.value(0).is_err()));
}
