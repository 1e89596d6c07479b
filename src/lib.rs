//! Latency benchmark for System V semaphore sets under multi-process
//! contention.
//!
//! A run builds a pool of semaphore sets, forks `nprocs` workers that each
//! time `niters` lock/unlock pairs on randomly chosen semaphores, and reports
//! the average, minimum and maximum of the per-worker durations.

pub mod cli;
pub mod config;
mod error;
pub mod logger;
pub mod orchestrator;
pub mod pool;
pub mod report;
mod sys;
pub mod timer;
pub mod worker;

pub use config::RunConfig;
pub use error::{
    Error,
    Result,
};
pub use orchestrator::{
    run,
    Benchmark,
    Phase,
};
pub use pool::SemaphorePool;
pub use report::Summary;
pub use sys::SemaphoreSet;
pub use timer::{
    timedelta,
    Timestamp,
};
