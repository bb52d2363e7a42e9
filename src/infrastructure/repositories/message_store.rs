//! Flash-backed message store.
//!
//! The configured text lives in one length-prefixed record. A record that
//! fails validation reads as "unprovisioned", which the boot path answers by
//! persisting the default text, exactly like a blank device.

use esp_storage::FlashStorage;
use morse_core::{MESSAGE_MAX_LEN, SourceText, normalize};

use crate::config::MESSAGE_PARTITION_OFFSET;
use crate::domain::ports::{MessageStore, StorageError};
use crate::infrastructure::drivers::{
    Encodable, EspNorFlashStorageDriver, MAGIC_HEADER_SIZE, PersistentStorage, StorageFault,
};

const RECORD_SIZE: usize = 1 + MESSAGE_MAX_LEN;
const STORAGE_SIZE: usize = MAGIC_HEADER_SIZE + RECORD_SIZE;

/// Length-prefixed message text, zero-padded to a fixed size.
struct StoredMessage {
    len: u8,
    text: [u8; MESSAGE_MAX_LEN],
}

impl StoredMessage {
    fn from_text(text: &str) -> Self {
        let mut bytes = [0u8; MESSAGE_MAX_LEN];
        let raw = text.as_bytes();
        let len = raw.len().min(MESSAGE_MAX_LEN);
        bytes[..len].copy_from_slice(&raw[..len]);
        Self { len: len as u8, text: bytes }
    }

    /// Back to text, re-sanitized so a foreign record cannot smuggle
    /// unsupported characters into playback.
    fn to_text(&self) -> Option<SourceText> {
        let raw = self.text.get(..self.len as usize)?;
        let s = core::str::from_utf8(raw).ok()?;
        Some(normalize(s))
    }
}

impl Encodable<RECORD_SIZE> for StoredMessage {
    fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut data = [0u8; RECORD_SIZE];
        data[0] = self.len;
        data[1..].copy_from_slice(&self.text);
        data
    }

    fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < RECORD_SIZE || data[0] as usize > MESSAGE_MAX_LEN {
            return None;
        }
        let mut text = [0u8; MESSAGE_MAX_LEN];
        text.copy_from_slice(&data[1..RECORD_SIZE]);
        Some(Self { len: data[0], text })
    }
}

/// [`MessageStore`] on the device's message partition.
pub struct FlashMessageStore {
    storage: PersistentStorage<EspNorFlashStorageDriver<STORAGE_SIZE>, STORAGE_SIZE>,
}

impl FlashMessageStore {
    pub fn new(flash: *mut FlashStorage<'static>) -> Self {
        let driver = EspNorFlashStorageDriver::new(flash, MESSAGE_PARTITION_OFFSET);
        Self {
            storage: PersistentStorage::new(driver),
        }
    }

    /// Load the stored text; an unprovisioned or corrupt record is replaced
    /// by `default_text`, persisted before it is returned.
    pub async fn load_or_init(&mut self, default_text: &str) -> Result<SourceText, StorageError> {
        match self.load().await {
            Ok(text) => Ok(text),
            Err(StorageError::InvalidRecord) => {
                log::info!("message_store: no stored text, provisioning default");
                let text = normalize(default_text);
                self.save(text.as_str()).await?;
                Ok(text)
            }
            Err(e) => Err(e),
        }
    }
}

impl MessageStore for FlashMessageStore {
    async fn load(&mut self) -> Result<SourceText, StorageError> {
        let record: StoredMessage = self.storage.load().await.map_err(|fault| match fault {
            StorageFault::DriverError => StorageError::DriverError,
            StorageFault::InvalidMagicHeader | StorageFault::InvalidData => {
                StorageError::InvalidRecord
            }
        })?;
        record.to_text().ok_or(StorageError::InvalidRecord)
    }

    async fn save(&mut self, text: &str) -> Result<(), StorageError> {
        let record = StoredMessage::from_text(text);
        self.storage
            .save(&record)
            .await
            .map_err(|_| StorageError::DriverError)
    }
}
