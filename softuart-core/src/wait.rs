//! Wait hooks for blocking calls
//!
//! Every blocking operation of the port is a polling loop: check the
//! buffer, and if it cannot make progress, call the hook once. The hook
//! decides whether to keep waiting. The default [`Spin`] waits forever,
//! which is only safe while the tick interrupt is running.

use core::ops::ControlFlow;

/// Called between failed polls of a blocking operation
pub trait WaitHook {
    /// Wait a little; return `Break` to abandon the operation
    fn wait(&mut self) -> ControlFlow<()>;
}

/// Spin forever
#[derive(Debug, Clone, Copy, Default)]
pub struct Spin;

impl WaitHook for Spin {
    fn wait(&mut self) -> ControlFlow<()> {
        core::hint::spin_loop();
        ControlFlow::Continue(())
    }
}

/// Spin for at most a fixed number of polls
#[derive(Debug, Clone, Copy)]
pub struct SpinLimit {
    remaining: u32,
}

impl SpinLimit {
    /// Give up after `polls` failed polls
    pub const fn new(polls: u32) -> Self {
        Self { remaining: polls }
    }

    /// Polls left before giving up
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl WaitHook for SpinLimit {
    fn wait(&mut self) -> ControlFlow<()> {
        if self.remaining == 0 {
            return ControlFlow::Break(());
        }
        self.remaining -= 1;
        core::hint::spin_loop();
        ControlFlow::Continue(())
    }
}

impl<F: FnMut() -> ControlFlow<()>> WaitHook for F {
    fn wait(&mut self) -> ControlFlow<()> {
        self()
    }
}
