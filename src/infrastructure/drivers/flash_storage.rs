//! Flash record storage.
//!
//! A single fixed-size record behind a magic header, erased and rewritten
//! wholesale. Flash is owned by the portal context after boot; the ESP
//! driver below uses a raw pointer under that single-owner assumption.

use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};
use esp_storage::FlashStorage;

const BLOCK_SIZE: u32 = 4096;
const MAGIC_HEADER: u16 = 0xB11C;
pub(crate) const MAGIC_HEADER_SIZE: usize = MAGIC_HEADER.to_le_bytes().len();

#[derive(Debug)]
pub(crate) enum StorageFault {
    DriverError,
    InvalidMagicHeader,
    InvalidData,
}

/// Fixed-size record codec for values kept in flash.
pub(crate) trait Encodable<const SIZE: usize>
where
    Self: Sized,
{
    fn encode(&self) -> [u8; SIZE];
    fn decode(data: &[u8]) -> Option<Self>;
}

#[allow(async_fn_in_trait)]
pub(crate) trait StorageDriver<const STORAGE_SIZE: usize> {
    async fn read(&mut self, buffer: &mut [u8]) -> Result<(), StorageFault>;
    async fn write(&mut self, buffer: &[u8]) -> Result<(), StorageFault>;
}

/// Record storage on top of a [`StorageDriver`].
pub(crate) struct PersistentStorage<DRIVER: StorageDriver<STORAGE_SIZE>, const STORAGE_SIZE: usize>
{
    driver: DRIVER,
}

impl<DRIVER: StorageDriver<STORAGE_SIZE>, const STORAGE_SIZE: usize>
    PersistentStorage<DRIVER, STORAGE_SIZE>
{
    pub fn new(driver: DRIVER) -> Self {
        Self { driver }
    }

    /// Load the record, rejecting unprovisioned or torn data.
    pub async fn load<const SIZE: usize, T: Encodable<SIZE>>(&mut self) -> Result<T, StorageFault> {
        let mut buffer = [0u8; STORAGE_SIZE];
        self.driver.read(&mut buffer).await?;

        let magic = u16::from_le_bytes([buffer[0], buffer[1]]);
        if magic != MAGIC_HEADER {
            return Err(StorageFault::InvalidMagicHeader);
        }
        T::decode(&buffer[MAGIC_HEADER_SIZE..STORAGE_SIZE]).ok_or(StorageFault::InvalidData)
    }

    /// Save the record behind the magic header.
    pub async fn save<const SIZE: usize, T: Encodable<SIZE>>(
        &mut self,
        record: &T,
    ) -> Result<(), StorageFault> {
        let mut data = [0u8; STORAGE_SIZE];
        data[0..MAGIC_HEADER_SIZE].copy_from_slice(&MAGIC_HEADER.to_le_bytes());
        data[MAGIC_HEADER_SIZE..STORAGE_SIZE].copy_from_slice(&record.encode());
        self.driver.write(&data).await
    }
}

/// NOR-flash driver bound to one block of the message partition.
pub(crate) struct EspNorFlashStorageDriver<const SIZE: usize> {
    flash: *mut FlashStorage<'static>,
    addr: u32,
}

// Safety: the portal context is the sole flash owner after boot; the raw
// pointer is never accessed concurrently.
unsafe impl<const SIZE: usize> Send for EspNorFlashStorageDriver<SIZE> {}
unsafe impl<const SIZE: usize> Sync for EspNorFlashStorageDriver<SIZE> {}

impl<const SIZE: usize> EspNorFlashStorageDriver<SIZE> {
    pub(crate) fn new(flash: *mut FlashStorage<'static>, addr: u32) -> Self {
        Self { flash, addr }
    }
}

impl<const SIZE: usize> StorageDriver<SIZE> for EspNorFlashStorageDriver<SIZE> {
    async fn read(&mut self, buffer: &mut [u8]) -> Result<(), StorageFault> {
        // Safety: single flash owner, see above.
        unsafe { &mut *self.flash }
            .read(self.addr, buffer)
            .map_err(|_| StorageFault::DriverError)
    }

    async fn write(&mut self, buffer: &[u8]) -> Result<(), StorageFault> {
        // Safety: single flash owner, see above.
        let flash = unsafe { &mut *self.flash };
        flash
            .erase(self.addr, self.addr + BLOCK_SIZE)
            .map_err(|_| StorageFault::DriverError)?;
        flash
            .write(self.addr, buffer)
            .map_err(|_| StorageFault::DriverError)
    }
}
