use core::sync::atomic::{AtomicU32, Ordering};

use embassy_time::Instant;

use crate::debounce::{DebounceFilter, DebounceMode, Edge};


/// Number of clicks on one input.
///
/// Written by exactly one [`ClickCounter`], read by anyone.
/// Never decreases.
//
// NOTE: the ESP32-C3 has no atomic read-modify-write instructions,
// so there's no `fetch_add()`: the single writer does load+store instead.
// Two writers would lose increments: the writer holds the count's only `&mut`.
#[derive(Default)]
pub struct ClickCount(AtomicU32);

impl ClickCount {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Current count. Non-blocking; may be slightly stale.
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    // Only the owning counter may call this
    fn increment(&self) -> u32 {
        let n = self.0.load(Ordering::Relaxed).saturating_add(1);
        self.0.store(n, Ordering::Release);
        n
    }
}


/// Counts clicks on one input: a debounce filter plus the count it feeds.
///
/// The counter is the count's only writer: it takes the count by `&mut`,
/// and hands out shared references that can only read.
///
/// ```
/// use click_count::counter::{ClickCount, ClickCounter};
/// use click_count::debounce::{DebounceMode, Edge};
/// use embassy_time::Instant;
///
/// let mut count = ClickCount::new();
/// let mut counter = ClickCounter::new(DebounceMode::Simple, Edge::Rising, &mut count);
/// let reader = counter.reader();
///
/// counter.poll(false, Instant::from_millis(0));
/// counter.poll(true, Instant::from_millis(1));
/// assert_eq!(reader.get(), 1);
/// ```
///
/// A second writer for the same count does not compile:
///
/// ```compile_fail
/// use click_count::counter::{ClickCount, ClickCounter};
/// use click_count::debounce::{DebounceMode, Edge};
///
/// let mut count = ClickCount::new();
/// let first = ClickCounter::new(DebounceMode::Simple, Edge::Rising, &mut count);
/// let second = ClickCounter::new(DebounceMode::Simple, Edge::Rising, &mut count);
/// drop((first, second));
/// ```
pub struct ClickCounter<'a> {
    filter: DebounceFilter,
    count_on: Edge,
    count: &'a ClickCount,
}

impl<'a> ClickCounter<'a> {
    /// `count_on`: which edge of the low→high cycle is the click
    pub fn new(mode: DebounceMode, count_on: Edge, count: &'a mut ClickCount) -> Self {
        Self { filter: DebounceFilter::new(mode), count_on, count }
    }

    /// Read access to the count, for other tasks
    pub fn reader(&self) -> &'a ClickCount {
        self.count
    }

    /// Feed one raw level. Returns the new count if this sample was a click.
    pub fn poll(&mut self, high: bool, now: Instant) -> Option<u32> {
        let edges = self.filter.sample(high, now);
        edges.contains(self.count_on).then(|| self.count.increment())
    }
}
