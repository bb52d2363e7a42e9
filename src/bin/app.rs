//! Morse Blinker Firmware
//!
//! Blinks stored text in Morse code on two complementary LEDs while serving
//! a captive setup portal over its own Wi-Fi access point:
//! - Starts a Wi-Fi Access Point and runs a DHCP server for clients
//! - Answers every DNS query with the device's own address
//! - Serves an HTTP page to read and change the blinked text
//! - Persists the text to flash across power loss

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};
use esp_println::println;
use esp_storage::FlashStorage;
use morse_blinker::config::{
    AP_ADDRESS, AP_PASSWORD, AP_PREFIX_LEN, AP_SSID_PREFIX, BUILD_VERSION, DEFAULT_TEXT,
};
use morse_blinker::controllers::portal::init_portal_controllers;
use morse_blinker::infrastructure::drivers::{WifiApConfig, device_ssid, start_wifi_ap};
use morse_blinker::infrastructure::repositories::FlashMessageStore;
use morse_blinker::infrastructure::tasks::portal;
use morse_core::{BlinkSequencer, BlinkTiming, render_pattern};
use static_cell::StaticCell;

esp_bootloader_esp_idf::esp_app_desc!();

static FLASH_STORAGE: StaticCell<FlashStorage<'static>> = StaticCell::new();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();

    println!("=================================");
    println!("  Morse Blinker {}", BUILD_VERSION);
    println!("=================================");

    // Initialize hardware
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Allocate heap memory (64 + 32 KB)
    esp_alloc::heap_allocator!(
        #[unsafe(link_section = ".dram2_uninit")] size: 64 * 1024
    );
    esp_alloc::heap_allocator!(size: 32 * 1024);

    // Start RTOS
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Load the stored message; running without a text source is pointless,
    // so an unusable flash driver halts boot here.
    let flash = FLASH_STORAGE.init(FlashStorage::new(peripherals.FLASH));
    let flash_ptr = flash as *mut FlashStorage<'static>;
    let mut store = FlashMessageStore::new(flash_ptr);
    let text = store
        .load_or_init(DEFAULT_TEXT)
        .await
        .expect("message storage unavailable");
    println!("Blinking text: {}", text.as_str());

    let sequence = init_portal_controllers(store, text).await;
    println!("Morse code: {}", render_pattern(&sequence).as_str());

    let mut sequencer = BlinkSequencer::new(BlinkTiming::new());
    sequencer.install(sequence);

    // Bring up the access point and its DHCP service
    let ssid = device_ssid(AP_SSID_PREFIX);
    let stack = start_wifi_ap(
        spawner,
        peripherals.WIFI,
        WifiApConfig {
            ssid: ssid.clone(),
            password: AP_PASSWORD,
            ip_address: AP_ADDRESS,
            prefix_len: AP_PREFIX_LEN,
        },
    )
    .await;

    println!("Portal ready!");
    println!("  Network name: {}", ssid.as_str());
    println!("  Password:     {}", AP_PASSWORD);
    println!("  Setup page:   http://{}/", AP_ADDRESS);

    // DNS, HTTP and blink timing all share this execution context.
    portal::run(stack, sequencer, peripherals.GPIO2, peripherals.GPIO4).await;
    unreachable!("portal loop ended");
}
