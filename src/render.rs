//! Shows who's clicking more: the strip is split in two color bands,
//! and the leader's band grows by one pixel per click of lead (up to the whole strip).

use embassy_time::{Duration, Timer};
use smart_leds::RGB8;

use crate::config::{self, Config, MAX_LEAD, PIXEL_COUNT};
use crate::counter::ClickCount;
use crate::led::{self, PixelStrip, StripError};


/// `a - b`, clamped to `-MAX_LEAD..=MAX_LEAD`
pub fn clamped_difference(a: u32, b: u32) -> i32 {
    // i64: no overflow for any pair of u32
    (i64::from(a) - i64::from(b)).clamp(-i64::from(MAX_LEAD), i64::from(MAX_LEAD)) as i32
}


/// Colors of the two bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub a: RGB8,
    pub b: RGB8,
}

impl Default for Palette {
    fn default() -> Self {
        Self { a: config::BLUE, b: config::RED }
    }
}


/// One picture on the strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFrame {
    difference: i32,
    pixels: [RGB8; PIXEL_COUNT],
}

impl RenderFrame {
    pub fn new(count_a: u32, count_b: u32, palette: Palette) -> Self {
        let difference = clamped_difference(count_a, count_b);
        let boundary = split_at(difference);

        let mut pixels = [palette.b; PIXEL_COUNT];
        pixels[..boundary].fill(palette.a);
        Self { difference, pixels }
    }

    /// Clamped `a - b`
    pub fn difference(&self) -> i32 {
        self.difference
    }

    pub fn pixels(&self) -> &[RGB8; PIXEL_COUNT] {
        &self.pixels
    }

    /// First pixel of the `b` band
    pub fn boundary(&self) -> usize {
        split_at(self.difference)
    }
}

fn split_at(difference: i32) -> usize {
    (MAX_LEAD + difference) as usize
}


/// Periodically draws the difference between two counters.
pub struct Renderer<'a, S> {
    strip: S,
    count_a: &'a ClickCount,
    count_b: &'a ClickCount,
    period: Duration,
    refresh_budget: Duration,
    // Last difference shown, for the logs
    shown: Option<i32>,
}

impl<'a, S: PixelStrip> Renderer<'a, S> {
    pub fn new(strip: S, count_a: &'a ClickCount, count_b: &'a ClickCount, config: &Config) -> Self {
        Self {
            strip,
            count_a,
            count_b,
            period: config.render_period,
            refresh_budget: config.refresh_budget,
            shown: None,
        }
    }

    /// Snapshot both counters. Never blocks.
    pub fn frame(&self) -> RenderFrame {
        RenderFrame::new(self.count_a.get(), self.count_b.get(), Palette::default())
    }

    /// Put the frame into the strip buffer and show it
    pub async fn draw(&mut self, frame: &RenderFrame) -> Result<(), StripError> {
        for (i, color) in frame.pixels().iter().enumerate() {
            self.strip.set_pixel(i, *color);
        }
        self.strip.refresh().await
    }

    /// Draw forever.
    /// A failed frame is skipped: the next period simply tries again.
    pub async fn run(mut self) -> ! {
        loop {
            let frame = self.frame();
            match led::within(self.refresh_budget, self.draw(&frame)).await {
                Ok(()) => {
                    if self.shown != Some(frame.difference()) {
                        debug!("Difference: {}", frame.difference());
                        self.shown = Some(frame.difference());
                    }
                }
                Err(e) => {
                    warn!("Frame skipped: {}", e);
                }
            }

            Timer::after(self.period).await;
        }
    }
}


#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use core::cell::RefCell;
    use core::pin::pin;
    use core::task::Poll;

    use embassy_futures::block_on;
    use embassy_time::Instant;

    use super::*;
    use crate::button::{InputChannel, count_clicks};
    use crate::counter::ClickCounter;
    use crate::debounce::{DebounceMode, Edge};
    use crate::testing::{ScriptedPin, advance_ms, clock, poll_once};

    const A: RGB8 = config::BLUE;
    const B: RGB8 = config::RED;

    /// What the strip has shown so far
    #[derive(Default)]
    struct Screen {
        frames: Vec<[RGB8; PIXEL_COUNT]>,
        failures: usize,
        fail_next: bool,
    }

    /// Draws onto a [`Screen`] the test keeps looking at
    struct RecordingStrip<'s> {
        buffer: [RGB8; PIXEL_COUNT],
        screen: &'s RefCell<Screen>,
    }

    impl<'s> RecordingStrip<'s> {
        fn new(screen: &'s RefCell<Screen>) -> Self {
            Self { buffer: [RGB8::default(); PIXEL_COUNT], screen }
        }
    }

    impl PixelStrip for RecordingStrip<'_> {
        fn set_pixel(&mut self, index: usize, color: RGB8) {
            if let Some(pixel) = self.buffer.get_mut(index) {
                *pixel = color;
            }
        }

        async fn clear(&mut self) -> Result<(), StripError> {
            self.buffer = [RGB8::default(); PIXEL_COUNT];
            self.refresh().await
        }

        async fn refresh(&mut self) -> Result<(), StripError> {
            let mut screen = self.screen.borrow_mut();
            if core::mem::take(&mut screen.fail_next) {
                screen.failures += 1;
                return Err(StripError::Write);
            }
            screen.frames.push(self.buffer);
            Ok(())
        }
    }

    fn count_of(pixels: &[RGB8], color: RGB8) -> usize {
        pixels.iter().filter(|&&p| p == color).count()
    }

    #[test]
    fn test_difference_is_clamped() {
        assert_eq!(clamped_difference(100, 0), 4);
        assert_eq!(clamped_difference(0, 100), -4);
        assert_eq!(clamped_difference(50, 52), -2);
        assert_eq!(clamped_difference(7, 7), 0);
        assert_eq!(clamped_difference(3, 0), 3);
        assert_eq!(clamped_difference(u32::MAX, 0), 4);
        assert_eq!(clamped_difference(0, u32::MAX), -4);
    }

    #[test]
    fn test_partition_boundaries() {
        // (count_a, count_b, expected difference, pixels of color A)
        for (a, b, difference, a_pixels) in [(0, 4, -4, 0), (10, 10, 0, 4), (4, 0, 4, 8), (1, 3, -2, 2)] {
            let frame = RenderFrame::new(a, b, Palette::default());
            assert_eq!(frame.difference(), difference);
            assert_eq!(frame.boundary(), a_pixels);

            // Two contiguous bands: A then B
            assert!(frame.pixels()[..a_pixels].iter().all(|&p| p == A));
            assert!(frame.pixels()[a_pixels..].iter().all(|&p| p == B));
        }
    }

    #[test]
    fn test_every_difference_splits_the_strip() {
        for d in -4..=4 {
            let (a, b) = if d >= 0 { (d as u32, 0) } else { (0, (-d) as u32) };
            let frame = RenderFrame::new(a, b, Palette::default());
            assert_eq!(count_of(frame.pixels(), A), (4 + d) as usize);
            assert_eq!(count_of(frame.pixels(), B), (4 - d) as usize);
        }
    }

    #[test]
    fn test_extreme_counts_stay_on_the_strip() {
        for (a, b, boundary) in [(u32::MAX, 0, 8), (0, u32::MAX, 0), (u32::MAX, u32::MAX, 4), (u32::MAX, u32::MAX - 2, 6)] {
            let frame = RenderFrame::new(a, b, Palette::default());
            assert!((-4..=4).contains(&frame.difference()));
            assert_eq!(frame.boundary(), boundary);
            assert_eq!(count_of(frame.pixels(), A), boundary);
        }
    }

    #[test]
    fn test_custom_palette() {
        let green = RGB8 { r: 0, g: 16, b: 0 };
        let frame = RenderFrame::new(3, 1, Palette { a: green, b: RGB8::default() });
        assert_eq!(count_of(frame.pixels(), green), 6);
        assert_eq!(count_of(frame.pixels(), RGB8::default()), 2);
    }

    #[test]
    fn test_draw_shows_frame() {
        let screen = RefCell::new(Screen::default());
        let (a, b) = (ClickCount::new(), ClickCount::new());
        let mut renderer = Renderer::new(RecordingStrip::new(&screen), &a, &b, &Config::default());

        let frame = renderer.frame();
        assert_eq!(frame.difference(), 0);
        block_on(renderer.draw(&frame)).unwrap();
        assert_eq!(screen.borrow().frames, [*frame.pixels()]);
    }

    #[test]
    fn test_run_skips_failed_frame_then_draws_next_period() {
        let _clock = clock();
        let screen = RefCell::new(Screen { fail_next: true, ..Default::default() });
        let (mut blue, red) = (ClickCount::new(), ClickCount::new());
        let mut blue_counter = ClickCounter::new(DebounceMode::Simple, Edge::Rising, &mut blue);
        let renderer = Renderer::new(RecordingStrip::new(&screen), blue_counter.reader(), &red, &Config::default());

        let mut task = pin!(renderer.run());

        // First frame fails: logged, skipped, then the loop sleeps
        assert!(matches!(poll_once(task.as_mut()), Poll::Pending));
        assert_eq!(screen.borrow().failures, 1);
        assert!(screen.borrow().frames.is_empty());

        // A click while the renderer sleeps
        blue_counter.poll(false, Instant::now());
        blue_counter.poll(true, Instant::now());

        // Not yet: the period is 100ms
        advance_ms(99);
        assert!(matches!(poll_once(task.as_mut()), Poll::Pending));
        assert!(screen.borrow().frames.is_empty());

        advance_ms(1);
        assert!(matches!(poll_once(task.as_mut()), Poll::Pending));
        assert_eq!(screen.borrow().frames, [*RenderFrame::new(1, 0, Palette::default()).pixels()]);
        assert_eq!(screen.borrow().failures, 1);
    }

    #[test]
    fn test_blue_three_red_one() {
        let _clock = clock();
        let blue_channel = InputChannel { name: "blue", mode: DebounceMode::Simple, count_on: Edge::Rising };
        let red_channel = InputChannel { name: "red", ..blue_channel };
        let (mut blue, mut red) = (ClickCount::new(), ClickCount::new());
        let blue_counter = blue_channel.counter(&mut blue);
        let red_counter = red_channel.counter(&mut red);
        let (blue_reader, red_reader) = (blue_counter.reader(), red_counter.reader());

        // Both sampling tasks run until their first sleep: every scripted level is read by then
        let mut blue_task = pin!(count_clicks(blue_channel, ScriptedPin::clicks(3, 1), blue_counter));
        let mut red_task = pin!(count_clicks(red_channel, ScriptedPin::clicks(1, 1), red_counter));
        assert!(matches!(poll_once(blue_task.as_mut()), Poll::Pending));
        assert!(matches!(poll_once(red_task.as_mut()), Poll::Pending));
        assert_eq!(blue_reader.get(), 3);
        assert_eq!(red_reader.get(), 1);

        let screen = RefCell::new(Screen::default());
        let mut render_task = pin!(Renderer::new(RecordingStrip::new(&screen), blue_reader, red_reader, &Config::default()).run());
        assert!(matches!(poll_once(render_task.as_mut()), Poll::Pending));

        let screen = screen.borrow();
        assert_eq!(screen.frames.len(), 1);
        let shown = screen.frames[0];
        assert!(shown[0..6].iter().all(|&p| p == A));
        assert!(shown[6..8].iter().all(|&p| p == B));
    }
}
