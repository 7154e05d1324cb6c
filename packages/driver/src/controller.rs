use crate::driver::expect_controller_command_result;
use crate::error::Error;
use crate::{
    ControllerCommandError, ControllerCommandResult, ControllerInfo, Driver, Node,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zw_core::prelude::*;
use zw_serial::command::{
    ApplicationUpdateStatus, Command, GetControllerIdRequest, GetNodeProtocolInfoRequest,
    GetSerialApiInitDataRequest, RequestNodeInfoRequest,
};

/// How long to wait for the application update following a node info request
const NODE_INFO_TIMEOUT: Duration = Duration::from_millis(10_000);

impl Driver {
    /// Queries the controller's identity and the list of nodes in the
    /// network, populating the node map
    pub(crate) async fn identify_controller(&self) -> ControllerCommandResult<()> {
        let log = self.controller_log();

        log.info(|| "querying controller IDs...".to_string());
        let response = self
            .exec_controller_command(GetControllerIdRequest::default(), None)
            .await;
        let ids = expect_controller_command_result!(response, GetControllerIdResponse);

        log.info(|| "querying Serial API init data...".to_string());
        let response = self
            .exec_controller_command(GetSerialApiInitDataRequest::default(), None)
            .await;
        let init_data = expect_controller_command_result!(response, GetSerialApiInitDataResponse);

        self.storage().set_controller_info(ControllerInfo {
            home_id: ids.home_id,
            own_node_id: ids.own_node_id,
            api_version: init_data.api_version,
            is_secondary: init_data.is_secondary,
            is_sis: init_data.is_sis,
        });

        for node_id in &init_data.node_ids {
            self.storage().insert_node(*node_id, None);
        }

        log.info(|| {
            format!(
                "controller {:#010x}, own node ID {}, {} node(s) in the network",
                ids.home_id,
                ids.own_node_id,
                init_data.node_ids.len()
            )
        });

        Ok(())
    }

    /// Queries the protocol info for every discovered node
    pub(crate) async fn discover_nodes(&self) -> ControllerCommandResult<()> {
        for node_id in self.storage().node_ids() {
            let response = self
                .exec_controller_command(GetNodeProtocolInfoRequest::new(node_id), None)
                .await;
            let info = expect_controller_command_result!(response, GetNodeProtocolInfoResponse);
            self.storage().write_node(node_id, |node| {
                node.protocol_data = Some(info.protocol_data.clone());
            });
        }
        Ok(())
    }

    /// Asks a node for its node information frame and waits for the answer,
    /// which arrives as an unsolicited application update
    pub(crate) async fn request_node_info(
        &self,
        node_id: NodeId,
        cancel: &CancellationToken,
    ) -> ControllerCommandResult<NodeInformationApplicationData> {
        // The update is not correlated by callback ID, match it by node ID.
        // A failed request reports node ID 0, which must resolve this waiter
        // as well.
        let awaited_update = self
            .await_command(
                Box::new(move |cmd| {
                    matches!(
                        cmd,
                        Command::ApplicationUpdateRequest(update)
                            if update.node_id == node_id
                                || update.status == ApplicationUpdateStatus::NodeInfoRequestFailed
                    )
                }),
                Some(NODE_INFO_TIMEOUT),
            )
            .await
            .map_err(|e| ControllerCommandError::Unexpected(e.to_string()))?;

        let response = self
            .exec_controller_command(RequestNodeInfoRequest::new(node_id), None)
            .await;
        expect_controller_command_result!(response, RequestNodeInfoResponse);

        let update = tokio::select! {
            result = awaited_update.try_await() => match result {
                Ok(Command::ApplicationUpdateRequest(update)) => update,
                Ok(_) => return Err(ControllerCommandError::Unexpected(
                    "expected an application update".to_string(),
                )),
                Err(Error::Timeout) => return Err(ControllerCommandError::CallbackTimeout),
                Err(e) => return Err(ControllerCommandError::Unexpected(e.to_string())),
            },
            _ = cancel.cancelled() => return Err(ControllerCommandError::Cancelled),
        };

        match update.node_info {
            Some(node_info) if update.status == ApplicationUpdateStatus::NodeInfoReceived => {
                Ok(node_info)
            }
            _ => Err(ControllerCommandError::Unexpected(format!(
                "node info request failed: {:?}",
                update.status
            ))),
        }
    }

    pub fn controller(&self) -> Controller<'_> {
        Controller { driver: self }
    }
}

/// Read access to what the driver knows about the controller and its network
pub struct Controller<'a> {
    driver: &'a Driver,
}

impl<'a> Controller<'a> {
    /// The controller's identity. `None` until the driver is opened.
    pub fn info(&self) -> Option<ControllerInfo> {
        self.driver.storage().controller_info()
    }

    pub fn own_node_id(&self) -> Option<NodeId> {
        self.info().map(|info| info.own_node_id)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.driver.storage().node_ids()
    }

    pub fn node(&self, node_id: NodeId) -> Option<Node<'a>> {
        if self.driver.storage().contains_node(node_id) {
            Some(Node::new(node_id, self.driver))
        } else {
            None
        }
    }

    pub fn nodes(&self) -> Vec<Node<'a>> {
        self.node_ids()
            .into_iter()
            .map(|node_id| Node::new(node_id, self.driver))
            .collect()
    }
}
