use super::callback_id::CallbackIdAllocator;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use zw_core::prelude::*;
use zw_logging::ImmutableLogger;

/// Specifies the progress of the interview process for a node
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InterviewStage {
    NotStarted,
    InProgress,
    /// Every interview step succeeded
    Complete,
    /// At least one command class could not be interviewed
    PartiallyComplete,
}

/// What the driver learned about the controller itself during startup
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerInfo {
    pub home_id: u32,
    pub own_node_id: NodeId,
    pub api_version: u8,
    pub is_secondary: bool,
    pub is_sis: bool,
}

/// A value cached by a command class instance during interviews and from
/// incoming reports
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Bool(bool),
    U8(u8),
    U32(u32),
    String(String),
}

impl std::fmt::Display for CacheValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
        }
    }
}

/// The state a node's command class instance accumulates: its info from the
/// node information frame, the version learned during the interview and the
/// values cached from reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandClassState {
    pub info: CommandClassInfo,
    pub version: Option<u8>,
    pub values: BTreeMap<&'static str, CacheValue>,
}

impl CommandClassState {
    /// The version used for parsing and constructing payloads. Before the
    /// version is learned, V1 is assumed.
    pub fn effective_version(&self) -> u8 {
        self.version.unwrap_or(1)
    }
}

#[derive(Debug)]
pub(crate) struct NodeStorage {
    pub(crate) protocol_data: Option<NodeInformationProtocolData>,
    pub(crate) interview_stage: InterviewStage,
    pub(crate) interview_errors: Vec<(CommandClasses, String)>,
    pub(crate) cc_state: BTreeMap<CommandClasses, CommandClassState>,
}

impl NodeStorage {
    fn new(protocol_data: Option<NodeInformationProtocolData>) -> Self {
        Self {
            protocol_data,
            interview_stage: InterviewStage::NotStarted,
            interview_errors: Vec::new(),
            cc_state: BTreeMap::new(),
        }
    }
}

/// Storage shared between the driver handle and its background tasks.
/// The std locks are held briefly and never across awaits; `send_lock` is
/// async and serializes the frame/ACK exchange of concurrent transactions,
/// keeping a single frame in flight at the link layer.
pub(crate) struct DriverStorage {
    logger: Arc<dyn ImmutableLogger>,
    pub(crate) callback_ids: CallbackIdAllocator,
    pub(crate) send_lock: tokio::sync::Mutex<()>,
    controller: RwLock<Option<ControllerInfo>>,
    nodes: RwLock<BTreeMap<NodeId, NodeStorage>>,
}

impl DriverStorage {
    pub(crate) fn new(logger: Arc<dyn ImmutableLogger>) -> Self {
        Self {
            logger,
            callback_ids: CallbackIdAllocator::default(),
            send_lock: tokio::sync::Mutex::new(()),
            controller: RwLock::new(None),
            nodes: RwLock::new(BTreeMap::new()),
        }
    }

    pub(crate) fn logger(&self) -> &Arc<dyn ImmutableLogger> {
        &self.logger
    }

    pub(crate) fn controller_info(&self) -> Option<ControllerInfo> {
        self.controller
            .read()
            .expect("lock on controller info poisoned")
            .clone()
    }

    pub(crate) fn set_controller_info(&self, info: ControllerInfo) {
        *self
            .controller
            .write()
            .expect("lock on controller info poisoned") = Some(info);
    }

    pub(crate) fn insert_node(
        &self,
        node_id: NodeId,
        protocol_data: Option<NodeInformationProtocolData>,
    ) {
        self.nodes
            .write()
            .expect("lock on node map poisoned")
            .insert(node_id, NodeStorage::new(protocol_data));
    }

    pub(crate) fn node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .read()
            .expect("lock on node map poisoned")
            .keys()
            .copied()
            .collect()
    }

    pub(crate) fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes
            .read()
            .expect("lock on node map poisoned")
            .contains_key(&node_id)
    }

    /// Reads from a node's storage through a closure, holding the lock only
    /// for the duration of the call
    pub(crate) fn read_node<R>(
        &self,
        node_id: NodeId,
        f: impl FnOnce(&NodeStorage) -> R,
    ) -> Option<R> {
        let nodes = self.nodes.read().expect("lock on node map poisoned");
        nodes.get(&node_id).map(f)
    }

    /// Mutates a node's storage through a closure, holding the lock only for
    /// the duration of the call
    pub(crate) fn write_node<R>(
        &self,
        node_id: NodeId,
        f: impl FnOnce(&mut NodeStorage) -> R,
    ) -> Option<R> {
        let mut nodes = self.nodes.write().expect("lock on node map poisoned");
        nodes.get_mut(&node_id).map(f)
    }

    /// Stores the version a node implements for the given CC. The version is
    /// written exactly once; a later conflicting observation keeps the first
    /// value and returns `false`.
    pub(crate) fn set_cc_version(&self, node_id: NodeId, cc: CommandClasses, version: u8) -> bool {
        self.write_node(node_id, |node| {
            let state = node.cc_state.entry(cc).or_default();
            match state.version {
                None => {
                    state.version = Some(version);
                    true
                }
                Some(existing) => existing == version,
            }
        })
        .unwrap_or(false)
    }
}
