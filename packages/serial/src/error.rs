use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Serial port error: {0}")]
    SerialPort(#[from] tokio_serial::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
