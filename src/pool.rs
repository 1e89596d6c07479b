use log::{
    debug,
    warn,
};
use nix::unistd::{
    getpid,
    Pid,
};

use crate::error::{
    Error,
    Result,
};
use crate::sys::SemaphoreSet;

/// A fixed collection of semaphore sets shared by every worker.
///
/// The sets are created up front and inherited by child processes across
/// `fork`. Dropping the pool removes the sets, but only in the process that
/// built it; a forked copy dropping its pool leaves them alone.
#[derive(Debug)]
pub struct SemaphorePool {
    sets: Vec<SemaphoreSet>,
    nsems: usize,
    owner: Pid,
}

impl SemaphorePool {
    pub fn create(nsets: usize, nsems: usize) -> Result<SemaphorePool> {
        if nsets == 0 {
            return Err(Error::InvalidConfig("a pool needs at least one semaphore set".into()));
        }
        let mut pool = SemaphorePool {
            sets: Vec::with_capacity(nsets),
            nsems,
            owner: getpid(),
        };
        // On failure `pool` drops here and removes whatever was created so far.
        for _ in 0..nsets {
            pool.sets.push(SemaphoreSet::create(nsems)?);
        }
        debug!("created {} semaphore sets of {} semaphores", nsets, nsems);
        Ok(pool)
    }

    pub fn nsets(&self) -> usize {
        self.sets.len()
    }

    pub fn nsems(&self) -> usize {
        self.nsems
    }

    pub fn sets(&self) -> &[SemaphoreSet] {
        &self.sets
    }

    pub fn get(&self, set: usize) -> Option<&SemaphoreSet> {
        self.sets.get(set)
    }

    /// Sum of every semaphore value in the pool.
    pub fn total(&self) -> Result<i64> {
        let mut total = 0;
        for set in &self.sets {
            for sem in 0..self.nsems {
                total += set.value(sem)? as i64;
            }
        }
        Ok(total)
    }

    /// Removes every set now instead of on drop. Reports the first failure.
    pub fn teardown(mut self) -> Result<()> {
        let mut first = Ok(());
        for set in self.sets.drain(..) {
            if let Err(e) = set.remove() {
                if first.is_ok() {
                    first = Err(e);
                }
            }
        }
        first
    }

    fn is_owner(&self) -> bool {
        getpid() == self.owner
    }
}

impl Drop for SemaphorePool {
    fn drop(&mut self) {
        if !self.is_owner() {
            return;
        }
        let n = self.sets.len();
        for set in self.sets.drain(..) {
            if let Err(e) = set.remove() {
                warn!("failed to remove semaphore set {}: {}", set.id(), e);
            }
        }
        if n > 0 {
            debug!("removed {} semaphore sets", n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SemaphorePool;

    #[test]
    fn test_pool_shape() {
        let pool = SemaphorePool::create(3, 5).unwrap();
        assert_eq!(pool.nsets(), 3);
        assert_eq!(pool.nsems(), 5);
        assert!(pool.sets().iter().all(|s| s.len() == 5));
        assert!(pool.get(3).is_none());
        assert_eq!(pool.total().unwrap(), 0);
    }

    #[test]
    fn test_pool_empty_rejected() {
        assert!(SemaphorePool::create(0, 4).is_err());
        assert!(SemaphorePool::create(4, 0).is_err());
    }

    #[test]
    fn test_pool_teardown() {
        let pool = SemaphorePool::create(2, 1).unwrap();
        let sets = pool.sets().to_vec();
        pool.teardown().unwrap();
        for set in sets {
            assert!(set.value(0).is_err());
        }
    }

    #[test]
    fn test_pool_drop_removes() {
        let sets = {
            let pool = SemaphorePool::create(2, 2).unwrap();
            pool.sets().to_vec()
        };
        for set in sets {
            assert!(set.post(1).is_err());
        }
    }
}
