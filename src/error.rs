use thiserror::Error;

/// Errors reported by the driver core. Almost everything is recovered locally during boot, so
/// a caller usually only sees `LedError` from the executor.
#[derive(Error, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The ring of mode cells does not fit into the provided storage
    #[error("invalid slot offset")]
    InvalidSlotOffset,

    /// The mode ring needs byte-granular read, write and erase
    #[error("unsupported storage geometry")]
    UnsupportedGeometry,

    /// The internal error value is returned from the provided storage
    #[error("internal flash error")]
    FlashError,

    /// `0xFF` marks an erased cell and can never be committed
    #[error("erased sentinel cannot be stored")]
    ErasedValue,

    /// The PWM channel rejected a duty cycle
    #[error("led error")]
    LedError,
}
