use crate::{Direction, ImmutableLogger, LogInfo, Loglevel};
use std::sync::Arc;
use zw_core::log::LogPayload;
use zw_serial::frame::ControlFlow;

const SERIAL_LOGLEVEL: Loglevel = Loglevel::Debug;

/// Logs the raw traffic on the serial port
#[derive(Clone)]
pub struct SerialLogger {
    inner: Arc<dyn ImmutableLogger>,
}

impl SerialLogger {
    pub fn new(inner: Arc<dyn ImmutableLogger>) -> Self {
        Self { inner }
    }

    pub fn data(&self, data: &[u8], direction: Direction) {
        if self.inner.log_level() < SERIAL_LOGLEVEL {
            return;
        }

        let log = LogInfo::builder()
            .label("SERIAL")
            .direction(direction)
            .secondary_tag(format!("{} bytes", data.len()).into())
            .payload(LogPayload::from(format!("0x{}", hex::encode(data))))
            .build();
        self.inner.log(log, SERIAL_LOGLEVEL);
    }

    pub fn control_flow(&self, byte: ControlFlow, direction: Direction) {
        if self.inner.log_level() < SERIAL_LOGLEVEL {
            return;
        }

        let log = LogInfo::builder()
            .label("SERIAL")
            .direction(direction)
            .primary_tags(vec![byte.to_string().into()])
            .secondary_tag(format!("{:#04x}", byte as u8).into())
            .payload(LogPayload::empty())
            .build();
        self.inner.log(log, SERIAL_LOGLEVEL);
    }

    pub fn discarded(&self, data: &[u8]) {
        if self.inner.log_level() < SERIAL_LOGLEVEL {
            return;
        }

        let log = LogInfo::builder()
            .label("SERIAL")
            .direction(Direction::Inbound)
            .primary_tags(vec!["DISCARDED".into()])
            .secondary_tag(format!("{} bytes", data.len()).into())
            .payload(LogPayload::from(format!(
                "invalid data: 0x{}",
                hex::encode(data)
            )))
            .build();
        self.inner.log(log, SERIAL_LOGLEVEL);
    }
}
