//! Thin safe layer over System V semaphore sets.
//!
//! A `SemaphoreSet` is only a kernel identifier, so it is `Copy` and survives
//! `fork` unchanged. Removing a set is explicit; nothing here runs on drop.

use libc::{
    self,
    c_int,
    c_short,
    c_ushort,
};
use nix::errno::Errno;

use crate::error::{
    Error,
    Result,
};

// rw for the owner only.
const SET_MODE: c_int = 0o600;

/// Handle to a kernel semaphore set of `nsems` counting semaphores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemaphoreSet {
    id: c_int,
    nsems: usize,
}

impl SemaphoreSet {
    /// Creates a new private set. Linux zero-initializes the values; other
    /// platforms leave them implementation-defined.
    pub fn create(nsems: usize) -> Result<SemaphoreSet> {
        if nsems == 0 || nsems > c_ushort::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "semaphores per set must be between 1 and {}, got {}",
                c_ushort::MAX,
                nsems
            )));
        }
        let id = unsafe {
            libc::semget(libc::IPC_PRIVATE, nsems as c_int, libc::IPC_CREAT | SET_MODE)
        };
        let id = Errno::result(id).map_err(Error::Create)?;
        Ok(SemaphoreSet { id, nsems })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.nsems
    }

    /// Atomically adds one to semaphore `sem`.
    ///
    /// Never blocks, but fails with `ERANGE` once the value would pass the
    /// kernel's per-semaphore maximum.
    pub fn post(&self, sem: usize) -> Result<()> {
        self.op(sem, 1)
    }

    fn op(&self, sem: usize, delta: c_short) -> Result<()> {
        // Same errno the kernel gives for `sem_num >= nsems`.
        if sem >= self.nsems {
            return Err(Error::Op {
                set_id: self.id,
                sem,
                errno: Errno::EFBIG,
            });
        }
        let mut buf = libc::sembuf {
            sem_num: sem as c_ushort,
            sem_op: delta,
            sem_flg: 0,
        };
        let res = unsafe { libc::semop(self.id, &mut buf, 1) };
        Errno::result(res).map(drop).map_err(|errno| Error::Op {
            set_id: self.id,
            sem,
            errno,
        })
    }

    /// Current value of semaphore `sem`.
    pub fn value(&self, sem: usize) -> Result<i32> {
        if sem >= self.nsems {
            return Err(Error::Control(Errno::EINVAL));
        }
        let res = unsafe { libc::semctl(self.id, sem as c_int, libc::GETVAL) };
        Errno::result(res).map_err(Error::Control)
    }

    /// Removes the set from the system. Other handles to it become invalid.
    pub fn remove(self) -> Result<()> {
        let res = unsafe { libc::semctl(self.id, 0, libc::IPC_RMID) };
        Errno::result(res).map(drop).map_err(Error::Control)
    }
}
