use crate::{error::Result, frame::RawSerialFrame};
use std::future::Future;

/// Abstraction over a byte-stream transport that speaks serial frames.
/// Implemented for real serial ports and TCP bridges, and by in-memory
/// mocks in tests.
pub trait SerialBinding: Send + 'static {
    fn write(&mut self, frame: RawSerialFrame) -> impl Future<Output = Result<()>> + Send;

    /// Reads the next frame. Returns `None` when the transport is closed.
    fn read(&mut self) -> impl Future<Output = Option<RawSerialFrame>> + Send;
}
