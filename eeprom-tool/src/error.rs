use thiserror::Error;

/// Errors that can occur while generating, parsing or dumping EEPROM images.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to write CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("hex decoding error: {0}")]
    HexError(#[from] hex::FromHexError),

    #[error("image has {0} bytes, expected {expected}", expected = offtime_driver::store::RING_CELLS)]
    InvalidImageSize(usize),

    #[error("cell {0} is outside the ring")]
    InvalidPosition(usize),

    #[error("invalid mode: {0}")]
    InvalidMode(String),
}
