#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]
#![deny(clippy::mem_forget)]
#![deny(clippy::large_stack_frames)]

// Firmware only: on the host there's nothing to run.
//   cargo run --release --target riscv32imc-unknown-none-elf
#[cfg(not(target_os = "none"))]
fn main() {}

#[cfg(target_os = "none")]
use {esp_backtrace as _, esp_println as _};
#[cfg(target_os = "none")]
esp_bootloader_esp_idf::esp_app_desc!();

#[cfg(target_os = "none")]
use {
    defmt,
    esp_hal::{
        clock::CpuClock,
        gpio,
        interrupt::software::SoftwareInterruptControl,
        timer::timg::TimerGroup,
    },
    embassy_executor::Spawner,
    click_count::{
        button::{InputChannel, task_count_clicks},
        config::Config,
        counter::ClickCount,
        debounce::DebounceMode,
        led,
        mk_static,
        render::Renderer,
    },
};


#[cfg(target_os = "none")]
#[allow(clippy::large_stack_frames)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // anyhow needs a heap; the rest of the firmware is static
    esp_alloc::heap_allocator!(size: 16 * 1024);

    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    // Init Embassy the usual way
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);
    defmt::info!("Push button click count is starting!");

    let config = Config::from_build_env().unwrap_or_else(|e| fatal(e));

    // Init LED strip: all off
    let mut strip = led::init_board_strip(peripherals.SPI2, peripherals.GPIO2).unwrap_or_else(|e| fatal(e));
    if let Err(e) = led::within(config.clear_budget, led::PixelStrip::clear(&mut strip)).await {
        fatal(anyhow::anyhow!("LED strip clear: {}", e));
    }

    // Init GPIO: debounce select. Read once, applies to both buttons.
    let mode = {
        let select = gpio::Input::new(peripherals.GPIO6, gpio::InputConfig::default());
        DebounceMode::from_select_level(select.is_high(), config.debounce_window)
    };
    match mode {
        DebounceMode::Debounced { window } => defmt::info!("Counting clicks with debounce delay of {} ms", window.as_millis()),
        DebounceMode::Simple => defmt::info!("Counting clicks without any debounce delay"),
    }

    // Init GPIO: buttons
    let blue_pin = gpio::Input::new(peripherals.GPIO4, gpio::InputConfig::default());
    let red_pin = gpio::Input::new(peripherals.GPIO5, gpio::InputConfig::default());
    let blue_channel = InputChannel { name: "blue", mode, count_on: config.click_edge };
    let red_channel = InputChannel { name: "red", mode, count_on: config.click_edge };

    // Each counting task gets the only writer of its count; the renderer only reads
    let blue_counter = blue_channel.counter(mk_static!(ClickCount, ClickCount::new()));
    let red_counter = red_channel.counter(mk_static!(ClickCount, ClickCount::new()));
    let (blue, red) = (blue_counter.reader(), red_counter.reader());

    // Spawn push button click counting tasks
    spawner.must_spawn(task_count_clicks(blue_channel, blue_pin, blue_counter));
    spawner.must_spawn(task_count_clicks(red_channel, red_pin, red_counter));

    // Show who's clicking more
    Renderer::new(strip, blue, red, &config).run().await
}


/// Startup failed: nothing sensible to do but report and halt
#[cfg(target_os = "none")]
fn fatal(e: anyhow::Error) -> ! {
    defmt::error!("Startup failed: {}", defmt::Display2Format(&e));
    panic!("startup failed");
}
