use crate::{Direction, ImmutableLogger, LogInfo, Loglevel};
use std::sync::Arc;
use zw_core::log::{LogPayload, ToLogPayload};
use zw_core::prelude::NodeId;
use zw_serial::command::{Command, CommandId};

const COMMAND_LOGLEVEL: Loglevel = Loglevel::Debug;

/// Logs the exchange with a single node
#[derive(Clone)]
pub struct NodeLogger {
    inner: Arc<dyn ImmutableLogger>,
    node_id: NodeId,
}

impl NodeLogger {
    pub fn new(inner: Arc<dyn ImmutableLogger>, node_id: NodeId) -> Self {
        Self { inner, node_id }
    }

    pub fn command(&self, command: &Command, direction: Direction) {
        if self.inner.log_level() < COMMAND_LOGLEVEL {
            return;
        }

        let log = LogInfo::builder()
            .label("NODE")
            .direction(direction)
            .primary_tags(vec![
                format!("Node {}", self.node_id).into(),
                format!("{:?}", command.function_type()).into(),
            ])
            .payload(command.to_log_payload())
            .build();
        self.inner.log(log, COMMAND_LOGLEVEL);
    }

    fn message(&self, message: impl FnOnce() -> String, level: Loglevel) {
        if self.inner.log_level() < level {
            return;
        }
        let log = LogInfo::builder()
            .label("NODE")
            .primary_tags(vec![format!("Node {}", self.node_id).into()])
            .payload(LogPayload::from(message()))
            .build();
        self.inner.log(log, level);
    }

    pub fn error(&self, message: impl FnOnce() -> String) {
        self.message(message, Loglevel::Error);
    }

    pub fn warn(&self, message: impl FnOnce() -> String) {
        self.message(message, Loglevel::Warn);
    }

    pub fn info(&self, message: impl FnOnce() -> String) {
        self.message(message, Loglevel::Info);
    }

    pub fn verbose(&self, message: impl FnOnce() -> String) {
        self.message(message, Loglevel::Verbose);
    }

    pub fn silly(&self, message: impl FnOnce() -> String) {
        self.message(message, Loglevel::Silly);
    }
}
