use super::exec_controller_command::{ControllerCommandError, ControllerCommandResult};
use super::ExecCommandOptions;
use crate::Driver;
use crate::error::Error;
use crate::node::cc_api::ReceivedCC;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use zw_cc::commandclass::{AsCCRaw, CCRequest};
use zw_cc::commandclass_raw::CCRaw;
use zw_core::encoding::Serializable;
use zw_core::prelude::NodeId;
use zw_serial::command::{Command, SendDataRequest};

/// How long to wait for a node to answer a query with a report
const REPORT_TIMEOUT: Duration = Duration::from_millis(10_000);

pub type ExecNodeCommandResult<T> = Result<T, ExecNodeCommandError>;

#[derive(Error, Debug)]
pub enum ExecNodeCommandError {
    #[error("Controller command error: {0}")]
    Controller(#[from] ControllerCommandError),
    #[error("The node did not acknowledge the command")]
    NodeNoAck,
    #[error("Timed out waiting for a response from the node")]
    NodeTimeout,
}

impl Driver {
    /// Sends a CC command to a node. For query-type commands the returned
    /// value is the raw report answering the query.
    pub async fn exec_node_command<C>(
        &self,
        node_id: NodeId,
        command: &C,
        cancel: &CancellationToken,
    ) -> ExecNodeCommandResult<Option<CCRaw>>
    where
        C: CCRequest + Serializable + Clone + Send + Sync + 'static,
    {
        let raw = command
            .as_raw()
            .map_err(|e| ControllerCommandError::Unexpected(e.to_string()))?;

        // A node may answer before the controller delivers the transmit
        // callback, so the report awaiter has to exist before sending
        let awaited_report = if command.expects_report() {
            let command = command.clone();
            let awaited = self
                .await_cc(
                    Box::new(move |received: &ReceivedCC| {
                        received.source_node_id == node_id && command.test_report(&received.command)
                    }),
                    Some(REPORT_TIMEOUT),
                )
                .await
                .map_err(|e| ControllerCommandError::Unexpected(e.to_string()))?;
            Some(awaited)
        } else {
            None
        };

        let controller_command = SendDataRequest::builder()
            .node_id(node_id)
            .command(raw)
            .build();

        let options = ExecCommandOptions {
            cancel: cancel.clone(),
            ..Default::default()
        };
        let result = self
            .exec_controller_command(controller_command, Some(&options))
            .await;

        match result {
            Ok(Some(Command::SendDataCallback(_))) => {
                // The node acknowledged the frame
            }
            Err(ControllerCommandError::CallbackNok(Command::SendDataCallback(_))) => {
                return Err(ExecNodeCommandError::NodeNoAck);
            }
            Err(e) => return Err(e.into()),
            Ok(other) => {
                return Err(ControllerCommandError::Unexpected(format!(
                    "unexpected result for SendData: {:?}",
                    other
                ))
                .into());
            }
        }

        let Some(awaited_report) = awaited_report else {
            return Ok(None);
        };

        tokio::select! {
            result = awaited_report.try_await() => match result {
                Ok(received) => Ok(Some(received.command)),
                Err(Error::Timeout) => Err(ExecNodeCommandError::NodeTimeout),
                Err(e) => {
                    Err(ControllerCommandError::Unexpected(e.to_string()).into())
                }
            },
            _ = cancel.cancelled() => Err(ControllerCommandError::Cancelled.into()),
        }
    }

    /// Convenience helper returning the transmit result of a fire-and-forget
    /// node command as a boolean, e.g. for pings
    pub async fn try_reach_node<C>(
        &self,
        node_id: NodeId,
        command: &C,
        cancel: &CancellationToken,
    ) -> ControllerCommandResult<bool>
    where
        C: CCRequest + Serializable + Clone + Send + Sync + 'static,
    {
        match self.exec_node_command(node_id, command, cancel).await {
            Ok(_) => Ok(true),
            Err(ExecNodeCommandError::NodeNoAck) => Ok(false),
            Err(ExecNodeCommandError::NodeTimeout) => Ok(false),
            Err(ExecNodeCommandError::Controller(e)) => Err(e),
        }
    }
}
