use crate::{Direction, ImmutableLogger, LogInfo, Loglevel};
use std::sync::Arc;
use zw_core::log::ToLogPayload;
use zw_serial::command::{Command, CommandId};

const COMMAND_LOGLEVEL: Loglevel = Loglevel::Debug;

/// Logs the controller-level command exchange
#[derive(Clone)]
pub struct ControllerLogger {
    inner: Arc<dyn ImmutableLogger>,
}

impl ControllerLogger {
    pub fn new(inner: Arc<dyn ImmutableLogger>) -> Self {
        Self { inner }
    }

    pub fn command(&self, command: &Command, direction: Direction) {
        if self.inner.log_level() < COMMAND_LOGLEVEL {
            return;
        }

        let log = LogInfo::builder()
            .label("CNTRLR")
            .direction(direction)
            .primary_tags(vec![format!("{:?}", command.function_type()).into()])
            .payload(command.to_log_payload())
            .build();
        self.inner.log(log, COMMAND_LOGLEVEL);
    }

    pub fn info(&self, message: impl FnOnce() -> String) {
        if self.inner.log_level() < Loglevel::Info {
            return;
        }
        let log = LogInfo::builder()
            .label("CNTRLR")
            .payload(message().into())
            .build();
        self.inner.log(log, Loglevel::Info);
    }
}
