//! Fans a run out over worker processes and gathers their timings.
//!
//! Every worker is a `fork`ed child that inherits the semaphore pool and
//! owns the write end of a private pipe. It sends back exactly one `f64`
//! (native byte order) and exits. The parent reaps every child before it
//! reads any pipe, then reads them in spawn order.

use std::fmt;
use std::fs::File;
use std::io::{
    self,
    Read,
    Write,
};
use std::os::fd::OwnedFd;
use std::panic::{
    self,
    AssertUnwindSafe,
};

use log::{
    debug,
    error,
    info,
    trace,
};
use nix::errno::Errno;
use nix::sys::wait::{
    wait,
    WaitStatus,
};
use nix::unistd::{
    fork,
    getpid,
    pipe,
    ForkResult,
    Pid,
};

use crate::config::RunConfig;
use crate::error::{
    Error,
    Result,
};
use crate::pool::SemaphorePool;
use crate::report::Summary;
use crate::worker;

const RESULT_SIZE: usize = 8;

const EXIT_OK: i32 = 0;
const EXIT_WORKER_FAILED: i32 = 1;
const EXIT_PANICKED: i32 = 101;

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    PoolReady,
    Spawning(usize),
    Waiting(usize),
    Collecting,
    Reporting,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Phase::Init => write!(f, "init"),
            Phase::PoolReady => write!(f, "pool ready"),
            Phase::Spawning(i) => write!(f, "spawning worker {}", i),
            Phase::Waiting(n) => write!(f, "waiting on {} workers", n),
            Phase::Collecting => write!(f, "collecting"),
            Phase::Reporting => write!(f, "reporting"),
            Phase::Done => write!(f, "done"),
        }
    }
}

struct Worker {
    pid: Pid,
    channel: File,
}

/// One benchmark run: owns the pool from construction until the run ends.
pub struct Benchmark {
    config: RunConfig,
    pool: SemaphorePool,
    phase: Phase,
}

impl Benchmark {
    /// Validates `config` and builds the semaphore pool.
    pub fn new(config: RunConfig) -> Result<Benchmark> {
        config.validate()?;
        debug!("phase: {}", Phase::Init);
        let pool = SemaphorePool::create(config.nsets, config.nsems)?;
        let mut bench = Benchmark {
            config,
            pool,
            phase: Phase::Init,
        };
        bench.enter(Phase::PoolReady);
        Ok(bench)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn pool(&self) -> &SemaphorePool {
        &self.pool
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs every worker and returns the durations in spawn order.
    ///
    /// Any spawn, worker or channel failure fails the whole run, but only
    /// after every child that was started has been reaped.
    pub fn durations(&mut self) -> Result<Vec<f64>> {
        let mut workers = Vec::with_capacity(self.config.nprocs);
        let mut failure = None;

        for i in 0..self.config.nprocs {
            self.enter(Phase::Spawning(i));
            match self.spawn(i) {
                Ok(w) => workers.push(w),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Err(e) = self.reap(workers.len()) {
            failure.get_or_insert(e);
        }
        if let Some(e) = failure {
            return Err(e);
        }

        self.enter(Phase::Collecting);
        workers
            .iter_mut()
            .enumerate()
            .map(|(i, w)| -> Result<f64> {
                let d = read_duration(&mut w.channel).map_err(|source| Error::Channel {
                    worker: i,
                    source,
                })?;
                debug!("worker {} (pid {}): {:.6}s", i, w.pid, d);
                Ok(d)
            })
            .collect()
    }

    /// Runs the benchmark to completion, removes the pool and summarizes.
    pub fn run(mut self) -> Result<Summary> {
        let durations = self.durations()?;
        self.enter(Phase::Reporting);
        let summary = Summary::from_durations(&durations)?;
        self.enter(Phase::Done);
        self.pool.teardown()?;
        Ok(summary)
    }

    fn enter(&mut self, phase: Phase) {
        debug!("phase: {}", phase);
        self.phase = phase;
    }

    fn spawn(&self, index: usize) -> Result<Worker> {
        let (reader, writer) = pipe().map_err(Error::Pipe)?;
        match unsafe { fork() }.map_err(Error::Fork)? {
            ForkResult::Parent { child } => {
                drop(writer);
                trace!("spawned worker pid {}", child);
                Ok(Worker {
                    pid: child,
                    channel: File::from(reader),
                })
            }
            ForkResult::Child => {
                drop(reader);
                let status = match panic::catch_unwind(AssertUnwindSafe(|| {
                    child_main(&self.pool, self.config.niters, index, writer)
                })) {
                    Ok(Ok(())) => EXIT_OK,
                    Ok(Err(e)) => {
                        error!("worker {} (pid {}): {}", index, getpid(), e);
                        EXIT_WORKER_FAILED
                    }
                    Err(_) => EXIT_PANICKED,
                };
                unsafe { libc::_exit(status) }
            }
        }
    }

    /// Waits until `outstanding` children have terminated, in any order.
    fn reap(&mut self, mut outstanding: usize) -> Result<()> {
        let mut failure = None;
        while outstanding > 0 {
            self.enter(Phase::Waiting(outstanding));
            let status = match wait() {
                Ok(status) => status,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(failure.unwrap_or(Error::Wait(e))),
            };
            match status {
                WaitStatus::Exited(pid, EXIT_OK) => trace!("worker {} finished", pid),
                WaitStatus::Exited(pid, status) => {
                    failure.get_or_insert(Error::WorkerExit {
                        pid: pid.as_raw(),
                        status,
                    });
                }
                WaitStatus::Signaled(pid, signal, _) => {
                    failure.get_or_insert(Error::WorkerSignaled {
                        pid: pid.as_raw(),
                        signal,
                    });
                }
                // Stopped or continued; still outstanding.
                _ => continue,
            }
            outstanding -= 1;
        }
        match failure {
            Some(e) => Err(e),
            None => {
                info!("all workers finished");
                Ok(())
            }
        }
    }
}

fn child_main(pool: &SemaphorePool, niters: usize, index: usize, channel: OwnedFd) -> Result<()> {
    let mut rng = worker::rng_for(getpid().as_raw());
    let duration = worker::run(pool, niters, &mut rng)?;
    let mut channel = File::from(channel);
    write_duration(&mut channel, duration).map_err(|source| Error::Channel {
        worker: index,
        source,
    })
}

fn write_duration<W: Write>(w: &mut W, duration: f64) -> io::Result<()> {
    w.write_all(&duration.to_ne_bytes())
}

fn read_duration<R: Read>(r: &mut R) -> io::Result<f64> {
    let mut buf = [0u8; RESULT_SIZE];
    r.read_exact(&mut buf)?;
    Ok(f64::from_ne_bytes(buf))
}

/// Builds the pool for `config`, runs every worker and summarizes.
pub fn run(config: RunConfig) -> Result<Summary> {
    Benchmark::new(config)?.run()
}
