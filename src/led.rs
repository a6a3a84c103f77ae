use core::fmt;
use core::future::Future;

use embassy_time::{Duration, with_timeout};
use smart_leds::{RGB8, SmartLedsWrite};


#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum StripError {
    /// The driver failed to push the pixels out
    Write,
    /// The operation didn't finish within its time budget
    Timeout,
}

impl fmt::Display for StripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StripError::Write => f.write_str("LED strip write failed"),
            StripError::Timeout => f.write_str("LED strip did not respond in time"),
        }
    }
}

impl core::error::Error for StripError {}


/// An addressable LED strip.
///
/// Pixels are buffered: nothing is shown until [`PixelStrip::refresh`].
#[allow(async_fn_in_trait)]
pub trait PixelStrip {
    /// Set one pixel in the buffer. Indexes past the end are ignored.
    fn set_pixel(&mut self, index: usize, color: RGB8);

    /// Turn all pixels off, and show it
    async fn clear(&mut self) -> Result<(), StripError>;

    /// Show the buffer
    async fn refresh(&mut self) -> Result<(), StripError>;
}


/// Run a strip operation within a time budget.
//
// The budget is advisory: a blocking driver can't be interrupted,
// but an overrun is still reported.
pub async fn within<F>(budget: Duration, op: F) -> Result<(), StripError>
where
    F: Future<Output = Result<(), StripError>>,
{
    with_timeout(budget, op).await.unwrap_or(Err(StripError::Timeout))
}


/// Pixel buffer in front of any `smart-leds` driver
pub struct SmartLedStrip<W, const N: usize> {
    writer: W,
    pixels: [RGB8; N],
}

impl<W, const N: usize> SmartLedStrip<W, N>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    pub fn new(writer: W) -> Self {
        Self { writer, pixels: [RGB8::default(); N] }
    }

    fn write(&mut self) -> Result<(), StripError> {
        self.writer
            .write(self.pixels.iter().copied())
            .map_err(|_| StripError::Write)
    }
}

impl<W, const N: usize> PixelStrip for SmartLedStrip<W, N>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    fn set_pixel(&mut self, index: usize, color: RGB8) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    async fn clear(&mut self) -> Result<(), StripError> {
        self.pixels = [RGB8::default(); N];
        self.write()
    }

    async fn refresh(&mut self) -> Result<(), StripError> {
        self.write()
    }
}


/// The board's strip: WS2812, data line on SPI MOSI
#[cfg(target_os = "none")]
pub type BoardStrip = SmartLedStrip<
    ws2812_spi::Ws2812<esp_hal::spi::master::Spi<'static, esp_hal::Blocking>>,
    { crate::config::PIXEL_COUNT },
>;

/// Init the strip: SPI peripheral shapes the WS2812 bit timing
#[cfg(target_os = "none")]
pub fn init_board_strip(
    spi: esp_hal::peripherals::SPI2<'static>,
    data_pin: impl esp_hal::gpio::interconnect::PeripheralOutput<'static>,
) -> anyhow::Result<BoardStrip> {
    use esp_hal::spi;
    use esp_hal::time::Rate;

    // WS2812 wants 2..3.8MHz: every LED bit is encoded as 4 SPI bits
    let config = spi::master::Config::default()
        .with_frequency(Rate::from_khz(3_800))
        .with_mode(spi::Mode::_0);
    let spi = spi::master::Spi::new(spi, config)
        .map_err(|e| anyhow::anyhow!("LED strip SPI rejected its config: {:?}", e))?
        .with_mosi(data_pin);

    info!("LED strip: {} pixels", crate::config::PIXEL_COUNT);
    Ok(SmartLedStrip::new(ws2812_spi::Ws2812::new(spi)))
}
