use crate::ControllerCommandError;
use thiserror::Error;
use zw_core::encoding::EncodingError;
use zw_serial::error::Error as SerialPortError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    SerialPort(#[from] SerialPortError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Controller(#[from] ControllerCommandError),
    #[error("Operation timed out")]
    Timeout,
    #[error("Operation was cancelled")]
    Cancelled,
    #[error("Internal error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, Error>;
