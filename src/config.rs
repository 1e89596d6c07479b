use libc::c_ushort;

use crate::error::{
    Error,
    Result,
};

pub const DEFAULT_NSEMS: usize = 32;
pub const DEFAULT_NSETS: usize = 20;
pub const DEFAULT_NITERS: usize = 1000;
pub const DEFAULT_NPROCS: usize = 2;

/// Shape of one benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Semaphores per set.
    pub nsems: usize,
    /// Number of semaphore sets in the pool.
    pub nsets: usize,
    /// Lock/unlock pairs per worker.
    pub niters: usize,
    /// Number of worker processes.
    pub nprocs: usize,
}

impl RunConfig {
    pub fn new(nsems: usize, nsets: usize, niters: usize, nprocs: usize) -> Result<RunConfig> {
        let config = RunConfig {
            nsems,
            nsets,
            niters,
            nprocs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("semaphores per set", self.nsems),
            ("semaphore sets", self.nsets),
            ("iterations", self.niters),
            ("processes", self.nprocs),
        ];
        for &(name, value) in fields.iter() {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be at least 1", name)));
            }
        }
        if self.nsems > c_ushort::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "semaphores per set must not exceed {}, got {}",
                c_ushort::MAX,
                self.nsems
            )));
        }
        Ok(())
    }

    /// Total `semop` calls the whole run makes.
    pub fn total_ops(&self) -> usize {
        2 * self.niters * self.nprocs
    }
}

impl Default for RunConfig {
    fn default() -> RunConfig {
        RunConfig {
            nsems: DEFAULT_NSEMS,
            nsets: DEFAULT_NSETS,
            niters: DEFAULT_NITERS,
            nprocs: DEFAULT_NPROCS,
        }
    }
}
