//! Contactless Front-End Main Application
//!
//! Entry point for the STM32-based contactless-card front end.
//! Initializes hardware, boots the device controller into the
//! persisted mode, and drives the cooperative executive.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_time::{Duration, Instant, Timer};
use {defmt_rtt as _, panic_probe as _};

use tagsim_firmware::device::{AntennaControl, Device, RamSettings, SystemControl};
use tagsim_firmware::scheduler::Executive;

/// Antenna-load switch on its dedicated GPIO
struct AntennaPin {
    pin: Output<'static>,
}

impl AntennaControl for AntennaPin {
    fn set_load(&mut self, enabled: bool) {
        if enabled {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}

/// System reset through the core reset request
struct CoreReset;

impl SystemControl for CoreReset {
    fn reset(&mut self) {
        cortex_m::peripheral::SCB::sys_reset();
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Contactless front end v{}", env!("CARGO_PKG_VERSION"));

    let config = embassy_stm32::Config::default();
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // Status LED and antenna-load switch
    let led = Output::new(p.PA5, Level::Low, Speed::Low);
    let antenna = AntennaPin {
        pin: Output::new(p.PB0, Level::High, Speed::Low),
    };

    // Settings restore from non-volatile storage is the transport
    // side's job; until it reports in we boot the defaults.
    let settings = RamSettings::new();
    let seed = Instant::now().as_ticks();

    let device = Device::new(antenna, settings, CoreReset, seed);
    let mut executive = Executive::new(device);

    info!("Device booted into persisted mode");

    spawner.spawn(heartbeat_task(led)).unwrap();

    info!("Tasks spawned, entering executive loop");

    loop {
        if let Some(result) = executive.iterate() {
            info!("async op finished: {}", result.status);
        }
        Timer::after(Duration::from_micros(250)).await;
    }
}

/// Heartbeat task - blinks LED to show system is running
#[embassy_executor::task]
async fn heartbeat_task(mut led: Output<'static>) {
    loop {
        led.set_high();
        Timer::after(Duration::from_millis(100)).await;
        led.set_low();
        Timer::after(Duration::from_millis(900)).await;
    }
}
