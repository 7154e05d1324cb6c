use super::{ExecCommandOptions, SerialApiMachineResult};
use crate::Driver;
use crate::error::Error;
use thiserror::Error;
use zw_serial::command::{AsCommandRaw, Command, CommandRequest};

pub type ControllerCommandResult<T> = Result<T, ControllerCommandError>;

#[derive(Error, Debug)]
pub enum ControllerCommandError {
    #[error("The controller did not accept the frame after multiple attempts")]
    LinkFailure,
    #[error("Timed out waiting for a response")]
    ResponseTimeout,
    #[error("The response indicated an error")]
    ResponseNok(Command),
    #[error("Timed out waiting for a callback")]
    CallbackTimeout,
    #[error("The callback indicated an error")]
    CallbackNok(Command),
    #[error("The command timed out")]
    Timeout,
    #[error("The command was cancelled")]
    Cancelled,
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<SerialApiMachineResult> for ControllerCommandError {
    fn from(result: SerialApiMachineResult) -> Self {
        match result {
            result if result.is_link_failure() => ControllerCommandError::LinkFailure,
            SerialApiMachineResult::ResponseTimeout => ControllerCommandError::ResponseTimeout,
            SerialApiMachineResult::ResponseNok(command) => {
                ControllerCommandError::ResponseNok(command)
            }
            SerialApiMachineResult::CallbackTimeout => ControllerCommandError::CallbackTimeout,
            SerialApiMachineResult::CallbackNok(command) => {
                ControllerCommandError::CallbackNok(command)
            }
            SerialApiMachineResult::Success(_) => {
                unreachable!("a successful result is not an error")
            }
            _ => ControllerCommandError::Unexpected("unhandled machine result".to_string()),
        }
    }
}

impl Driver {
    /// Executes a command addressed at the controller itself and returns the
    /// command that completed the transaction: the response, or the final
    /// callback for commands that have one.
    pub async fn exec_controller_command<C>(
        &self,
        command: C,
        options: Option<&ExecCommandOptions>,
    ) -> ControllerCommandResult<Option<Command>>
    where
        C: CommandRequest + AsCommandRaw + Into<Command> + Clone + 'static,
    {
        let default_options = ExecCommandOptions::default();
        let options = options.unwrap_or(&default_options);

        let result = self.execute_serial_api_command(command, options).await;
        match result {
            Ok(SerialApiMachineResult::Success(command)) => Ok(command),
            Ok(result) => Err(result.into()),
            Err(Error::Timeout) => Err(ControllerCommandError::Timeout),
            Err(Error::Cancelled) => Err(ControllerCommandError::Cancelled),
            Err(e) => Err(ControllerCommandError::Unexpected(e.to_string())),
        }
    }
}

/// Extracts the expected response type from a controller command result
macro_rules! expect_controller_command_result {
    ($actual:ident, $expected:ident) => {
        match $actual {
            Ok(Some(zw_serial::command::Command::$expected(result))) => result,
            Ok(_) => {
                return Err($crate::ControllerCommandError::Unexpected(
                    concat!("expected ", stringify!($expected)).to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }
    };
}
pub(crate) use expect_controller_command_result;
