use anyhow::{Context, Result, bail};
use embassy_time::Duration;
use smart_leds::RGB8;

use crate::debounce::Edge;


/// Pixels on the strip
pub const PIXEL_COUNT: usize = 8;

/// The difference is clamped to `-MAX_LEAD..=MAX_LEAD`: half the strip each way
pub const MAX_LEAD: i32 = (PIXEL_COUNT / 2) as i32;

// Button sampling
pub const DEFAULT_DEBOUNCE_MS: u64 = 10;
pub const POLL_IDLE: Duration = Duration::from_millis(1);
// Simple mode never blocks: give other tasks a chance every so many polls
pub const SIMPLE_POLLS_PER_YIELD: u16 = 256;

// LED strip
pub const DEFAULT_RENDER_PERIOD_MS: u64 = 100;
pub const REFRESH_BUDGET: Duration = Duration::from_millis(100);
pub const CLEAR_BUDGET: Duration = Duration::from_millis(50);

// Dim: these strips are blinding at full power
pub const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 16 };
pub const RED: RGB8 = RGB8 { r: 16, g: 0, b: 0 };


/// Raw override values, as found in the build environment.
#[derive(Default, Clone, Copy)]
pub struct Overrides {
    pub debounce_ms: Option<&'static str>,
    pub render_period_ms: Option<&'static str>,
    pub click_edge: Option<&'static str>,
}

impl Overrides {
    /// Variables are read *at compile time*
    pub const fn from_build_env() -> Self {
        Self {
            debounce_ms: option_env!("CLICK_DEBOUNCE_MS"),
            render_period_ms: option_env!("CLICK_RENDER_PERIOD_MS"),
            click_edge: option_env!("CLICK_EDGE"),
        }
    }
}


/// Runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct Config {
    /// How long a low level is trusted before waiting for the release (debounced mode)
    pub debounce_window: Duration,
    /// Period between two strip refreshes
    pub render_period: Duration,
    pub refresh_budget: Duration,
    pub clear_budget: Duration,
    /// Which edge of a low→high cycle counts as the click
    pub click_edge: Edge,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            render_period: Duration::from_millis(DEFAULT_RENDER_PERIOD_MS),
            refresh_budget: REFRESH_BUDGET,
            clear_budget: CLEAR_BUDGET,
            click_edge: Edge::Rising,
        }
    }
}

impl Config {
    /// Load the configuration baked into this firmware build
    pub fn from_build_env() -> Result<Self> {
        Self::parse(Overrides::from_build_env())
    }

    /// Apply overrides on top of the defaults
    pub fn parse(overrides: Overrides) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = overrides.debounce_ms {
            let ms: u64 = v.trim().parse().context("CLICK_DEBOUNCE_MS: not a number of milliseconds")?;
            config.debounce_window = Duration::from_millis(ms);
        }

        if let Some(v) = overrides.render_period_ms {
            let ms: u64 = v.trim().parse().context("CLICK_RENDER_PERIOD_MS: not a number of milliseconds")?;
            if ms == 0 {
                bail!("CLICK_RENDER_PERIOD_MS: must be greater than zero");
            }
            config.render_period = Duration::from_millis(ms);
        }

        if let Some(v) = overrides.click_edge {
            config.click_edge = match v.trim() {
                "rising" => Edge::Rising,
                "falling" => Edge::Falling,
                other => bail!("CLICK_EDGE: expected `rising` or `falling`, got `{}`", other),
            };
        }

        Ok(config)
    }
}
