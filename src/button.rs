use core::convert::Infallible;

use embedded_hal::digital::InputPin;
use embassy_time::{Instant, Timer};

use crate::config::{POLL_IDLE, SIMPLE_POLLS_PER_YIELD};
use crate::counter::{ClickCount, ClickCounter};
use crate::debounce::{DebounceMode, Edge};


/// One monitored push button.
/// Created at startup, never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct InputChannel {
    /// For the logs
    pub name: &'static str,
    pub mode: DebounceMode,
    pub count_on: Edge,
}

impl InputChannel {
    /// The channel's counter: the only writer of `count`
    pub fn counter<'a>(&self, count: &'a mut ClickCount) -> ClickCounter<'a> {
        ClickCounter::new(self.mode, self.count_on, count)
    }
}


/// Decides when the polling loop has to let other tasks run.
//
// Simple mode has no natural blocking point: it spins and sleeps once in a while.
// Debounced mode sleeps on every poll: the window is measured in milliseconds anyway.
pub struct Pacer {
    polls_per_sleep: u16,
    polls: u16,
}

impl Pacer {
    pub fn new(mode: DebounceMode) -> Self {
        let polls_per_sleep = match mode {
            DebounceMode::Simple => SIMPLE_POLLS_PER_YIELD,
            DebounceMode::Debounced { .. } => 1,
        };
        Self { polls_per_sleep, polls: 0 }
    }

    /// Count one poll. Returns `true` if it's time to sleep.
    pub fn tick(&mut self) -> bool {
        self.polls += 1;
        if self.polls >= self.polls_per_sleep {
            self.polls = 0;
            true
        } else {
            false
        }
    }
}


/// Read the pin once and feed the counter.
/// Returns the new count if that was a click.
pub fn poll_pin<P>(pin: &mut P, counter: &mut ClickCounter<'_>, now: Instant) -> Option<u32>
where
    P: InputPin<Error = Infallible>,
{
    let Ok(high) = pin.is_high();
    counter.poll(high, now)
}


/// Count clicks on `pin` forever.
pub async fn count_clicks<P>(channel: InputChannel, mut pin: P, mut counter: ClickCounter<'_>) -> !
where
    P: InputPin<Error = Infallible>,
{
    let mut pacer = Pacer::new(channel.mode);
    info!("Button {}: counting clicks ({})", channel.name, channel.mode);

    loop {
        if let Some(n) = poll_pin(&mut pin, &mut counter, Instant::now()) {
            debug!("Button {}: click #{}", channel.name, n);
        }

        if pacer.tick() {
            Timer::after(POLL_IDLE).await;
        }
    }
}


/// Task: count clicks on one button.
/// One instance per button.
#[cfg(target_os = "none")]
#[embassy_executor::task(pool_size = 2)]
pub async fn task_count_clicks(
    channel: InputChannel,
    pin: esp_hal::gpio::Input<'static>,
    counter: ClickCounter<'static>,
) {
    count_clicks(channel, pin, counter).await
}
