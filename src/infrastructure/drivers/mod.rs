mod flash_storage;
mod random;
pub mod wifi_ap;

pub(crate) use flash_storage::{
    Encodable, EspNorFlashStorageDriver, MAGIC_HEADER_SIZE, PersistentStorage, StorageFault,
};
pub use wifi_ap::{WifiApConfig, device_ssid, start_wifi_ap};
