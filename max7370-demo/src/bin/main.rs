#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those     holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{with_timeout, Duration, Timer};
use esp_hal::i2c::master::I2c;
use esp_hal::{
    clock::CpuClock,
    gpio::{Input, InputConfig},
    time::Rate,
    timer::systimer::SystemTimer,
};
use esp_println::println;
use log::{debug, error, info, warn};
use max7370_async::config::property;
use max7370_async::{Config, Error, KeyDirection, KeyEvent, Keypad, StaticProperties};
use static_cell::StaticCell;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    println!("{}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

const EVENT_QUEUE: usize = 16;
const START_ATTEMPTS: u32 = 3;

type KeyChannel = Channel<CriticalSectionRawMutex, KeyEvent, EVENT_QUEUE>;
type BoardKeypad =
    Keypad<I2c<'static, esp_hal::Async>, esp_hal::i2c::master::Error, Input<'static>>;

/// Properties of the keypad on this board. The key table is left out, so the
/// built-in layout is used.
static BOARD: StaticProperties<'static> = StaticProperties::new(&[
    (property::BUS, &[0]),
    (property::ADDRESS, &[0x38]),
    (property::IRQ_PIN, &[15]),
    (property::KEY_RELEASE, &[1]),
]);

static KEY_EVENTS: StaticCell<KeyChannel> = StaticCell::new();

/// The main entry point of the application.
#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger(log::LevelFilter::Debug);
    info!("Logger initialized");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    let keypad_config = match Config::from_node(Some(&BOARD)) {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid keypad configuration: {err:?}");
            idle().await
        }
    };

    let keypad_int = Input::new(peripherals.GPIO15, InputConfig::default());
    let i2c_config = esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(100));
    let keypad_i2c = I2c::new(peripherals.I2C0, i2c_config)
        .unwrap()
        .with_sda(peripherals.GPIO13)
        .with_scl(peripherals.GPIO14)
        .into_async();

    let mut keypad = Keypad::new(keypad_i2c, keypad_int, keypad_config);
    let mut attempt = 1;
    while let Err(err) = keypad.start().await {
        warn!("Keypad bring-up failed (attempt {attempt}): {err:?}");
        if attempt == START_ATTEMPTS {
            error!("Giving up on the keypad.");
            keypad.stop();
            idle().await
        }
        attempt += 1;
        Timer::after(Duration::from_millis(100)).await;
    }

    let events = KEY_EVENTS.init(Channel::new());
    spawner.spawn(scan_keys(keypad, events.sender())).unwrap();
    spawner.spawn(log_keys(events.receiver())).unwrap();

    idle().await
}

async fn idle() -> ! {
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}

/// Drains the keypad on every interrupt, forwarding events to the channel.
#[embassy_executor::task]
async fn scan_keys(
    mut keypad: BoardKeypad,
    mut events: Sender<'static, CriticalSectionRawMutex, KeyEvent, EVENT_QUEUE>,
) {
    loop {
        match with_timeout(Duration::from_secs(5), keypad.wait_for_interrupt()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!("Keypad interrupt handling failed: {err:?}");
                break;
            }
            Err(_) => {
                debug!("No keys.");
                continue;
            }
        }
        match keypad.drain(&mut events).await {
            Ok(count) => debug!("Delivered {count} key events"),
            Err(Error::Bus(err)) => warn!("Key FIFO read failed: {err:?}"),
            Err(err) => {
                error!("Keypad drain failed: {err:?}");
                break;
            }
        }
    }
    keypad.stop();
}

/// Logs key events as they arrive.
#[embassy_executor::task]
async fn log_keys(events: Receiver<'static, CriticalSectionRawMutex, KeyEvent, EVENT_QUEUE>) {
    loop {
        let event = events.receive().await;
        match event.direction {
            KeyDirection::Down => info!("Key {} down", event.code),
            KeyDirection::Up => info!("Key {} up", event.code),
        }
    }
}
