//! Test doubles shared by the unit tests.

use core::convert::Infallible;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use std::sync::{Mutex, MutexGuard};
use std::vec::Vec;

use embassy_time::{Duration, MockDriver};
use embedded_hal::digital::{ErrorType, InputPin};


// The mock clock is global: tests that move it take turns
static CLOCK: Mutex<()> = Mutex::new(());

/// Exclusive use of the mock clock, reset to zero
pub fn clock() -> MutexGuard<'static, ()> {
    let guard = CLOCK.lock().unwrap_or_else(|e| e.into_inner());
    MockDriver::get().reset();
    guard
}

pub fn advance_ms(ms: u64) {
    MockDriver::get().advance(Duration::from_millis(ms));
}

/// Poll a future once, without a real waker
pub fn poll_once<F: Future>(fut: Pin<&mut F>) -> Poll<F::Output> {
    fut.poll(&mut Context::from_waker(Waker::noop()))
}


/// Plays back recorded levels, one per read; idles high when it runs out
pub struct ScriptedPin {
    levels: Vec<bool>,
    next: usize,
}

impl ScriptedPin {
    pub fn new(levels: &[bool]) -> Self {
        Self { levels: levels.to_vec(), next: 0 }
    }

    /// Idle high, then `n` clean low→high cycles, every level held for `hold` reads
    pub fn clicks(n: usize, hold: usize) -> Self {
        let mut levels = std::vec![true; hold];
        for _ in 0..n {
            levels.extend(core::iter::repeat_n(false, hold));
            levels.extend(core::iter::repeat_n(true, hold));
        }
        Self { levels, next: 0 }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Levels read so far
    pub fn reads(&self) -> usize {
        self.next
    }
}

impl ErrorType for ScriptedPin {
    type Error = Infallible;
}

impl InputPin for ScriptedPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        let level = self.levels.get(self.next).copied().unwrap_or(true);
        self.next += 1;
        Ok(level)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}
