use morse_core::SourceText;

/// Storage failures surfaced to the boot path and request handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The flash driver rejected the operation.
    DriverError,
    /// No valid record found (unprovisioned or corrupt).
    InvalidRecord,
}

/// Durable storage for the configured message text.
///
/// `load` is consulted once at startup; `save` runs synchronously inside the
/// scheduler pass that services a text update. Implementations must survive
/// power loss between the two.
#[allow(async_fn_in_trait)]
pub trait MessageStore {
    async fn load(&mut self) -> Result<SourceText, StorageError>;
    async fn save(&mut self, text: &str) -> Result<(), StorageError>;
}
