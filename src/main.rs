#![no_std]
#![no_main]

use defmt::{error, info, unwrap, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART1;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{self, DataBits, Parity, StopBits, UartRx};
use embassy_time::{Duration, Timer};
use panic_persist as _;

use tic_router::configuration::{RouterConfig, CONFIG};
use tic_router::control::DEFAULT_TABLE;
use tic_router::io::embassy_adapter::{EmbassyClock, PwmDimmer, UartByteSource};
use tic_router::router::Router;
use tic_router::utility::parse_config;

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"TIC-ROUTER"),
    embassy_rp::binary_info::rp_program_description!(
        c"Linky TIC solar surplus router for Raspberry Pico 2"
    ),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

// Interrupt handlers
bind_interrupts!(struct Irqs {
    UART1_IRQ => uart::InterruptHandler<UART1>;
});

#[cfg(feature = "usb-logger")]
bind_interrupts!(struct UsbIrqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<embassy_rp::peripherals::USB>;
});

/// Element power at full duty, used to scale direct-generation commands
const FULL_SCALE_W: u16 = 2000;

/// Pause before resuming after a link or dimmer error
const RETRY_DELAY: Duration = Duration::from_millis(100);

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    #[cfg(feature = "usb-logger")]
    {
        let driver = embassy_rp::usb::Driver::new(p.USB, UsbIrqs);
        spawner.must_spawn(logger_task(driver));
    }

    if let Some(panic_message) = panic_persist::get_panic_message_utf8() {
        error!("{}", panic_message);
        loop {
            Timer::after_secs(5).await;
        }
    }

    let config = match parse_config(CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid CONFIG ({}), using defaults", e);
            RouterConfig::default()
        }
    };
    info!("TIC mode {}, generation {}", config.mode, config.generation);

    // Meter link: optocoupler output on GP5, 7E1
    let mut uart_config = uart::Config::default();
    uart_config.baudrate = config.baud_rate();
    uart_config.data_bits = DataBits::DataBits7;
    uart_config.parity = Parity::ParityEven;
    uart_config.stop_bits = StopBits::STOP1;
    let rx = UartRx::new(p.UART1, p.PIN_5, Irqs, p.DMA_CH0, uart_config);

    // Dimmer control on GP16 (PWM slice 0, channel A), enable on GP17
    let pwm = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, PwmConfig::default());
    let enable = Output::new(p.PIN_17, Level::Low);

    let router = unwrap!(Router::new(&config, DEFAULT_TABLE, EmbassyClock));
    spawner.must_spawn(router_task(
        router,
        UartByteSource::new(rx),
        PwmDimmer::new(pwm, enable, FULL_SCALE_W),
    ));

    info!("tic-router started");
}

#[embassy_executor::task]
async fn router_task(
    mut router: Router<EmbassyClock>,
    mut source: UartByteSource<'static>,
    mut dimmer: PwmDimmer<'static>,
) {
    loop {
        match router.run(&mut source, &mut dimmer).await {
            Ok(()) => warn!("Meter link returned no data"),
            Err(e) => {
                warn!("Router interrupted: {}", e);
                router.resync();
            }
        }
        let snapshot = router.snapshot();
        info!(
            "state {}, level {}, routed {} Wh, frames {}, bad checksums {}",
            snapshot.state,
            snapshot.level,
            snapshot.routed_wh,
            snapshot.decoder.frames,
            snapshot.decoder.checksum_failures
        );
        Timer::after(RETRY_DELAY).await;
    }
}

#[cfg(feature = "usb-logger")]
#[embassy_executor::task]
async fn logger_task(driver: embassy_rp::usb::Driver<'static, embassy_rp::peripherals::USB>) {
    embassy_usb_logger::run!(1024, log::LevelFilter::Info, driver);
}
