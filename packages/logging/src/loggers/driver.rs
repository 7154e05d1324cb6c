use crate::{ImmutableLogger, LogInfo, Loglevel};
use std::sync::Arc;
use zw_core::log::LogPayload;

/// Logs driver-level messages
#[derive(Clone)]
pub struct DriverLogger {
    inner: Arc<dyn ImmutableLogger>,
}

macro_rules! log_level_method {
    ($name:ident, $level:ident) => {
        pub fn $name(&self, message: impl FnOnce() -> String) {
            if self.inner.log_level() < Loglevel::$level {
                return;
            }
            let log = LogInfo::builder()
                .label("DRIVER")
                .payload(LogPayload::from(message()))
                .build();
            self.inner.log(log, Loglevel::$level);
        }
    };
}

impl DriverLogger {
    pub fn new(inner: Arc<dyn ImmutableLogger>) -> Self {
        Self { inner }
    }

    log_level_method!(error, Error);
    log_level_method!(warn, Warn);
    log_level_method!(info, Info);
    log_level_method!(verbose, Verbose);
    log_level_method!(debug, Debug);
    log_level_method!(silly, Silly);
}
