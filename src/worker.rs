//! The timed lock/unlock loop each worker process runs.

use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};

use crate::error::Result;
use crate::pool::SemaphorePool;
use crate::timer::{
    timedelta,
    Timestamp,
};

/// Builds a worker's generator from its process id, so no two live workers
/// walk the pool in the same order.
pub fn rng_for(pid: i32) -> StdRng {
    StdRng::seed_from_u64(pid as u64)
}

/// Runs `niters` lock/unlock pairs against random semaphores in `pool` and
/// returns the seconds spent doing so.
///
/// Both halves of a pair add one to the same semaphore; neither ever blocks.
/// The first failing `semop` aborts the loop.
pub fn run<R: Rng>(pool: &SemaphorePool, niters: usize, rng: &mut R) -> Result<f64> {
    let sets = pool.sets();
    let nsems = pool.nsems();

    let start = Timestamp::now();
    for _ in 0..niters {
        let set = &sets[rng.gen_range(0..sets.len())];
        let sem = rng.gen_range(0..nsems);
        set.post(sem)?; // lock
        set.post(sem)?; // unlock
    }
    let end = Timestamp::now();

    Ok(timedelta(&start, &end))
}
