use embassy_net::Ipv4Address;

pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Access point name prefix; the chip id is appended for uniqueness.
pub const AP_SSID_PREFIX: &str = "ESP-MOBL";

/// Access point password.
pub const AP_PASSWORD: &str = "TopSecret";

/// Static address of the device inside its own network. Every DNS answer
/// and the DHCP router/DNS options point here.
pub const AP_ADDRESS: Ipv4Address = Ipv4Address::new(192, 168, 4, 1);
pub const AP_PREFIX_LEN: u8 = 24;

pub const HTTP_PORT: u16 = 80;
pub const DNS_PORT: u16 = 53;

/// Text blinked until the first configuration, persisted on first boot.
pub const DEFAULT_TEXT: &str = "HELLO WORLD";

/// Base address of the `message` partition (defined in partitions.csv).
pub const MESSAGE_PARTITION_OFFSET: u32 = 0x31_0000;
