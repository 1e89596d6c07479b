use std::error;
use std::fmt;
use std::io;

use nix::errno::Errno;
use nix::sys::signal::Signal;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A run parameter is out of range.
    InvalidConfig(String),
    /// `semget` refused to create a set.
    Create(Errno),
    /// `semop` failed on the given set and semaphore index.
    Op {
        set_id: i32,
        sem: usize,
        errno: Errno,
    },
    /// `semctl` failed.
    Control(Errno),
    Pipe(Errno),
    Fork(Errno),
    Wait(Errno),
    /// A worker exited with a non-zero status.
    WorkerExit {
        pid: i32,
        status: i32,
    },
    /// A worker was killed by a signal.
    WorkerSignaled {
        pid: i32,
        signal: Signal,
    },
    /// Moving a worker's result through its channel failed or came up short.
    Channel {
        worker: usize,
        source: io::Error,
    },
    /// Nothing to summarize.
    NoSamples,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidConfig(ref msg) => write!(f, "invalid configuration: {}", msg),
            Error::Create(errno) => write!(f, "unable to create semaphore set: {}", errno),
            Error::Op { set_id, sem, errno: Errno::ERANGE } => write!(
                f,
                "semop on set {} semaphore {} would exceed the maximum semaphore value",
                set_id, sem
            ),
            Error::Op { set_id, sem, errno } => {
                write!(f, "semop on set {} semaphore {} failed: {}", set_id, sem, errno)
            }
            Error::Control(errno) => write!(f, "semctl failed: {}", errno),
            Error::Pipe(errno) => write!(f, "unable to create result channel: {}", errno),
            Error::Fork(errno) => write!(f, "unable to spawn worker process: {}", errno),
            Error::Wait(errno) => write!(f, "waiting for workers failed: {}", errno),
            Error::WorkerExit { pid, status } => {
                write!(f, "worker {} exited with status {}", pid, status)
            }
            Error::WorkerSignaled { pid, signal } => {
                write!(f, "worker {} was killed by {}", pid, signal)
            }
            Error::Channel { worker, ref source } => {
                write!(f, "result channel of worker {} failed: {}", worker, source)
            }
            Error::NoSamples => write!(f, "no worker durations to summarize"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Channel { ref source, .. } => Some(source),
            Error::Create(ref errno)
            | Error::Op { ref errno, .. }
            | Error::Control(ref errno)
            | Error::Pipe(ref errno)
            | Error::Fork(ref errno)
            | Error::Wait(ref errno) => Some(errno),
            _ => None,
        }
    }
}
