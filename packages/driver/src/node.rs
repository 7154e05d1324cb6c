use crate::driver::{CacheValue, CommandClassState, InterviewStage};
use crate::error::{Error, Result};
use crate::{ControllerCommandResult, Driver};
use cc_api::{CCInterviewError, CommandClassApi, ReceivedCC, cc_api_for};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zw_cc::commandclass::NoOperationCC;
use zw_core::prelude::*;
use zw_core::submodule;

pub mod cc_api;

submodule!(interview);

/// A handle to a node in the network. Carries no state of its own; all data
/// lives in the driver's storage.
pub struct Node<'a> {
    id: NodeId,
    driver: &'a Driver,
}

impl<'a> Node<'a> {
    pub(crate) fn new(id: NodeId, driver: &'a Driver) -> Self {
        Self { id, driver }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn driver(&self) -> &'a Driver {
        self.driver
    }

    pub fn protocol_data(&self) -> Option<NodeInformationProtocolData> {
        self.driver
            .storage()
            .read_node(self.id, |node| node.protocol_data.clone())
            .flatten()
    }

    pub fn is_listening(&self) -> bool {
        self.protocol_data().map(|data| data.listening).unwrap_or(false)
    }

    pub fn can_sleep(&self) -> bool {
        self.protocol_data()
            .map(|data| !data.listening && data.frequent_listening.is_none())
            .unwrap_or(false)
    }

    pub fn interview_stage(&self) -> InterviewStage {
        self.driver
            .storage()
            .read_node(self.id, |node| node.interview_stage)
            .unwrap_or(InterviewStage::NotStarted)
    }

    pub(crate) fn set_interview_stage(&self, stage: InterviewStage) {
        self.driver.storage().write_node(self.id, |node| {
            node.interview_stage = stage;
        });
    }

    /// The interview steps that failed, by command class
    pub fn interview_errors(&self) -> Vec<(CommandClasses, String)> {
        self.driver
            .storage()
            .read_node(self.id, |node| node.interview_errors.clone())
            .unwrap_or_default()
    }

    pub fn supported_command_classes(&self) -> Vec<CommandClasses> {
        self.driver
            .storage()
            .read_node(self.id, |node| {
                node.cc_state
                    .iter()
                    .filter(|(_, state)| state.info.supported())
                    .map(|(cc, _)| *cc)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn supports_cc(&self, cc: CommandClasses) -> bool {
        self.driver
            .storage()
            .read_node(self.id, |node| {
                node.cc_state
                    .get(&cc)
                    .map(|state| state.info.supported())
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    /// Returns the command class instance for the given CC, if the node
    /// advertises it. IDs without a specific implementation are backed by a
    /// catch-all that drops frames and reports no version.
    pub fn get_command_class(&self, cc: CommandClasses) -> Option<CommandClassRef<'a>> {
        let exists = self
            .driver
            .storage()
            .read_node(self.id, |node| node.cc_state.contains_key(&cc))
            .unwrap_or(false);
        exists.then(|| CommandClassRef {
            driver: self.driver,
            node_id: self.id,
            cc,
            api: cc_api_for(cc),
        })
    }

    /// Pings the node and returns whether it responded
    pub async fn ping(&self, cancel: &CancellationToken) -> ControllerCommandResult<bool> {
        self.driver
            .try_reach_node(self.id, &NoOperationCC::default(), cancel)
            .await
    }
}

/// A lightweight instance of a command class on a node: a back-reference
/// (node ID plus driver handle) and the behavior registered for the CC.
/// Cached state and the learned version live in the node's storage.
pub struct CommandClassRef<'a> {
    driver: &'a Driver,
    node_id: NodeId,
    cc: CommandClasses,
    api: &'static dyn CommandClassApi,
}

impl<'a> CommandClassRef<'a> {
    pub fn cc_id(&self) -> CommandClasses {
        self.cc
    }

    fn state(&self) -> Option<CommandClassState> {
        self.driver
            .storage()
            .read_node(self.node_id, |node| node.cc_state.get(&self.cc).cloned())
            .flatten()
    }

    /// The version the node implements, or `None` until it was learned
    pub fn version(&self) -> Option<u8> {
        self.state().and_then(|state| state.version)
    }

    /// The version used for parsing and constructing payloads, never below 1
    pub fn effective_version(&self) -> u8 {
        self.state()
            .map(|state| state.effective_version())
            .unwrap_or(1)
    }

    /// Whether the node supports the given command of this CC.
    /// `None` means this cannot be known before the version is learned.
    pub fn is_command_supported(&self, cc_command: u8) -> Option<bool> {
        self.api.is_command_supported(self.version(), cc_command)
    }

    /// The CCs that must be interviewed before this one
    pub fn dependencies(&self) -> &'static [CommandClasses] {
        self.api.dependencies()
    }

    /// Reads a value this CC instance cached from reports
    pub fn cached_value(&self, property: &'static str) -> Option<CacheValue> {
        self.state().and_then(|state| state.values.get(property).cloned())
    }

    /// Sends a command of this CC to the node. For query-type commands the
    /// raw report is returned.
    pub async fn send_command<C>(
        &self,
        command: &C,
        cancel: &CancellationToken,
    ) -> crate::ExecNodeCommandResult<Option<zw_cc::commandclass_raw::CCRaw>>
    where
        C: zw_cc::commandclass::CCRequest
            + zw_core::encoding::Serializable
            + Clone
            + Send
            + Sync
            + 'static,
    {
        self.driver.exec_node_command(self.node_id, command, cancel).await
    }

    /// Resolves with the next application frame of this CC from this node
    /// whose command ID matches and which satisfies the given predicate.
    /// Multiple concurrent waiters each see the first matching frame
    /// arriving after their call.
    pub async fn await_next_report(
        &self,
        expected_command: u8,
        predicate: Option<Box<dyn Fn(&zw_cc::commandclass_raw::CCRaw) -> bool + Send + Sync>>,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<ReceivedCC> {
        let node_id = self.node_id;
        let cc = self.cc;
        let awaited = self
            .driver
            .await_cc(
                Box::new(move |received: &ReceivedCC| {
                    received.source_node_id == node_id
                        && received.command.cc_id == cc
                        && received.command.cc_command == Some(expected_command)
                        && predicate.as_ref().map(|p| p(&received.command)).unwrap_or(true)
                }),
                timeout,
            )
            .await?;

        tokio::select! {
            result = awaited.try_await() => result,
            _ = cancel.cancelled() => Err(Error::Cancelled),
        }
    }

    /// Runs this CC's interview step
    pub(crate) async fn interview(
        &self,
        ctx: &cc_api::CCInterviewContext<'_>,
    ) -> std::result::Result<(), CCInterviewError> {
        self.api.interview(ctx).await
    }
}
