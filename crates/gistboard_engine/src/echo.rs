//! Echo suppression shared between the board controller and the sync loop.

use parking_lot::{Mutex, MutexGuard};

/// Remembers that this process just appended an entry, so the sync loop
/// skips exactly one new line instead of echoing it back.
///
/// The flag assumes nobody else appended between the local write and the
/// next poll. If someone did, their line is the one that gets skipped.
#[derive(Debug, Default)]
pub struct EchoSuppressor {
    armed: Mutex<bool>,
}

impl EchoSuppressor {
    /// Creates a disarmed suppressor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the flag.
    ///
    /// The controller holds the guard across its write and [`EchoGuard::arm`];
    /// the sync loop holds it across its diff and [`EchoGuard::take`]. Either
    /// side therefore sees the other's step as a whole.
    pub fn lock(&self) -> EchoGuard<'_> {
        EchoGuard {
            armed: self.armed.lock(),
        }
    }

    /// Returns true if the next new line will be skipped.
    pub fn is_armed(&self) -> bool {
        *self.armed.lock()
    }
}

/// Exclusive access to the echo flag.
pub struct EchoGuard<'a> {
    armed: MutexGuard<'a, bool>,
}

impl EchoGuard<'_> {
    /// Arms the flag.
    pub fn arm(&mut self) {
        *self.armed = true;
    }

    /// Clears the flag, returning whether it was armed.
    pub fn take(&mut self) -> bool {
        std::mem::replace(&mut *self.armed, false)
    }
}
