use crate::Driver;
use crate::driver::{CommandClassState, DriverStorage, ExecNodeCommandError};
use futures::future::BoxFuture;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use zw_cc::commandclass_raw::CCRaw;
use zw_core::prelude::*;
use zw_logging::loggers::node::NodeLogger;

pub mod basic;
pub mod binary_switch;
pub mod no_operation;
pub mod not_implemented;
pub mod version;

/// An application-layer frame after it was unwrapped from the serial
/// command that delivered it
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedCC {
    pub source_node_id: NodeId,
    pub command: CCRaw,
    pub rssi: Option<Rssi>,
}

pub type CCInterviewResult = Result<(), CCInterviewError>;

#[derive(Error, Debug)]
pub enum CCInterviewError {
    #[error(transparent)]
    Node(#[from] ExecNodeCommandError),
    #[error("the interview was cancelled")]
    Cancelled,
}

pub struct CCInterviewContext<'a> {
    pub driver: &'a Driver,
    pub node_id: NodeId,
    pub cancel: CancellationToken,
}

impl CCInterviewContext<'_> {
    pub fn log(&self) -> NodeLogger {
        self.driver.node_log(self.node_id)
    }
}

/// The behavior of a command class: how to interview it and how to digest
/// its reports into cached state. Implementations are stateless; everything
/// learned is written to the node storage.
pub trait CommandClassApi: Send + Sync {
    /// The command class this implementation handles
    fn cc_id(&self) -> CommandClasses;

    /// The highest version of this CC the implementation knows about
    fn implemented_version(&self) -> u8;

    /// The CCs that must be interviewed before this one. Almost every CC
    /// needs its version, which the Version CC interview provides.
    fn dependencies(&self) -> &'static [CommandClasses] {
        &[CommandClasses::Version]
    }

    /// Whether a node implementing `version` of this CC supports the given
    /// command. `None` when this cannot be decided before the version is
    /// known.
    fn is_command_supported(&self, version: Option<u8>, cc_command: u8) -> Option<bool>;

    /// Queries enough state to populate the cached properties of this CC
    fn interview<'a>(&'a self, ctx: &'a CCInterviewContext<'a>) -> BoxFuture<'a, CCInterviewResult>;

    /// Digests an inbound frame of this CC into the cached state. Malformed
    /// payloads are dropped without an error; the cached state stays
    /// untouched.
    fn process_received(&self, state: &mut CommandClassState, frame: &CCRaw);
}

/// The process-wide mapping from CC id to its implementation. This table is
/// the single place where implementations are registered; IDs not listed
/// here fall back to a catch-all that drops frames and reports no version.
pub fn cc_api_for(cc: CommandClasses) -> &'static dyn CommandClassApi {
    match cc {
        CommandClasses::Basic => &basic::BasicCCApi,
        CommandClasses::BinarySwitch => &binary_switch::BinarySwitchCCApi,
        CommandClasses::NoOperation => &no_operation::NoOperationCCApi,
        CommandClasses::Version => &version::VersionCCApi,
        _ => &not_implemented::NotImplementedCCApi,
    }
}

/// Routes an inbound application frame to the receiving node's CC instance
pub(crate) fn dispatch_application_frame(storage: &DriverStorage, received: &ReceivedCC) {
    use zw_logging::loggers::driver::DriverLogger;

    let node_id = received.source_node_id;
    if !storage.contains_node(node_id) {
        DriverLogger::new(storage.logger().clone()).warn(|| {
            format!(
                "dropping application frame from unknown node {}",
                node_id
            )
        });
        return;
    }

    let api = cc_api_for(received.command.cc_id);
    storage.write_node(node_id, |node| {
        match node.cc_state.get_mut(&received.command.cc_id) {
            Some(state) => api.process_received(state, &received.command),
            None => {
                // The node sent a CC it did not advertise. Nothing to update,
                // but waiters still see the frame.
            }
        }
    });
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_registry_covers_known_ccs() {
        assert_eq!(
            cc_api_for(CommandClasses::Version).cc_id(),
            CommandClasses::Version
        );
        assert_eq!(
            cc_api_for(CommandClasses::BinarySwitch).cc_id(),
            CommandClasses::BinarySwitch
        );
        // Unimplemented IDs are routed to the catch-all
        let api = cc_api_for(CommandClasses::Meter);
        assert_eq!(api.implemented_version(), 0);
        assert_eq!(api.is_command_supported(Some(1), 0x01), None);
    }
}
