use crate::command_raw::CommandRaw;
use std::fmt::Debug;
use thiserror::Error;
use zw_core::encoding::{EncodingError, EncodingResult, Parsable, Serializable};
use zw_core::prelude::*;
use zw_core::submodule;

submodule!(application);
submodule!(capability);
submodule!(memory);
submodule!(misc);
submodule!(network_mgmt);
submodule!(transport);

/// Identifies a Serial API command on the wire
pub trait CommandId {
    fn command_type(&self) -> CommandType;
    fn function_type(&self) -> FunctionType;
}

/// Functionality shared by all Serial API commands
pub trait CommandBase: CommandId + Debug + Sync + Send {
    /// Whether the command indicates success. Commands without an OK flag
    /// are always considered successful.
    fn is_ok(&self) -> bool {
        true
    }

    /// The callback ID carried by this command, if its wire format has one
    fn callback_id(&self) -> Option<u8> {
        None
    }
}

/// Functionality of commands initiated by the host
pub trait CommandRequest: CommandBase {
    /// Whether the controller answers this command with a RES frame
    fn expects_response(&self) -> bool;

    /// Whether the given command is the response to this request
    fn test_response(&self, response: &Command) -> bool {
        self.expects_response()
            && response.command_type() == CommandType::Response
            && response.function_type() == self.function_type()
    }

    /// Whether the controller sends one or more REQ callbacks for this command
    fn expects_callback(&self) -> bool;

    /// Whether the given command is a callback belonging to this request
    fn test_callback(&self, callback: &Command) -> bool {
        if !self.expects_callback()
            || callback.command_type() != CommandType::Request
            || callback.function_type() != self.function_type()
        {
            return false;
        }
        // Correlate by callback ID
        match self.callback_id() {
            Some(id) => callback.callback_id() == Some(id),
            None => false,
        }
    }

    /// Whether this command needs a callback ID assigned before sending
    fn needs_callback_id(&self) -> bool {
        false
    }

    fn set_callback_id(&mut self, callback_id: Option<u8>) {
        let _ = callback_id;
    }
}

/// Conversion of a typed command into the raw frame representation
pub trait AsCommandRaw {
    fn as_raw(&self) -> EncodingResult<CommandRaw>;
}

impl<T> AsCommandRaw for T
where
    T: CommandId + Serializable,
{
    fn as_raw(&self) -> EncodingResult<CommandRaw> {
        Ok(CommandRaw::new(
            self.command_type(),
            self.function_type() as u8,
            self.try_to_vec()?,
        ))
    }
}

#[derive(Error, Debug)]
pub enum TryFromRawError {
    #[error("Unknown function type: {0:#04x}")]
    UnknownFunctionType(u8),
    #[error("No decoder for {0:?} frames of function type {1:?}")]
    NotImplemented(CommandType, FunctionType),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

// Generates the typed union of all implemented commands, together with the
// delegating trait impls and `From` conversions. This table is assembled by
// hand; adding a command means adding its variant here and a decoder arm in
// `try_from_raw`.
macro_rules! command_enum {
    ( $( $variant:ident ),* $(,)? ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum Command {
            $( $variant($variant), )*
        }

        impl CommandId for Command {
            fn command_type(&self) -> CommandType {
                match self { $( Self::$variant(c) => c.command_type(), )* }
            }

            fn function_type(&self) -> FunctionType {
                match self { $( Self::$variant(c) => c.function_type(), )* }
            }
        }

        impl CommandBase for Command {
            fn is_ok(&self) -> bool {
                match self { $( Self::$variant(c) => c.is_ok(), )* }
            }

            fn callback_id(&self) -> Option<u8> {
                match self { $( Self::$variant(c) => c.callback_id(), )* }
            }
        }

        impl ToLogPayload for Command {
            fn to_log_payload(&self) -> LogPayload {
                match self { $( Self::$variant(c) => c.to_log_payload(), )* }
            }
        }

        $(
            impl From<$variant> for Command {
                fn from(val: $variant) -> Self {
                    Self::$variant(val)
                }
            }
        )*
    };
}

command_enum!(
    ApplicationCommandRequest,
    ApplicationUpdateRequest,
    AssignReturnRouteCallback,
    AssignReturnRouteRequest,
    AssignReturnRouteResponse,
    BridgeApplicationCommandRequest,
    ExtNvmReadLongBufferRequest,
    ExtNvmReadLongBufferResponse,
    GetControllerIdRequest,
    GetControllerIdResponse,
    GetNodeProtocolInfoRequest,
    GetNodeProtocolInfoResponse,
    GetRandomRequest,
    GetRandomResponse,
    GetSerialApiInitDataRequest,
    GetSerialApiInitDataResponse,
    IsFailedNodeRequest,
    IsFailedNodeResponse,
    MemoryGetByteRequest,
    MemoryGetByteResponse,
    RequestNodeInfoRequest,
    RequestNodeInfoResponse,
    SendDataCallback,
    SendDataMulticastCallback,
    SendDataMulticastRequest,
    SendDataMulticastResponse,
    SendDataRequest,
    SendDataResponse,
);

impl Command {
    /// Decodes an inbound raw frame into a typed command. Only frame kinds
    /// the controller can send to the host have decoders; host-to-controller
    /// requests are never parsed back.
    pub fn try_from_raw(raw: &CommandRaw) -> Result<Self, TryFromRawError> {
        use CommandType::*;

        let Ok(function_type) = FunctionType::try_from(raw.function_type) else {
            return Err(TryFromRawError::UnknownFunctionType(raw.function_type));
        };

        let payload = raw.payload.as_slice();
        let command = match (raw.command_type, function_type) {
            (Response, FunctionType::GetSerialApiInitData) => {
                GetSerialApiInitDataResponse::try_from_slice(payload)?.into()
            }
            (Response, FunctionType::GetControllerId) => {
                GetControllerIdResponse::try_from_slice(payload)?.into()
            }
            (Response, FunctionType::GetNodeProtocolInfo) => {
                GetNodeProtocolInfoResponse::try_from_slice(payload)?.into()
            }
            (Response, FunctionType::RequestNodeInfo) => {
                RequestNodeInfoResponse::try_from_slice(payload)?.into()
            }
            (Request, FunctionType::ApplicationUpdate) => {
                ApplicationUpdateRequest::try_from_slice(payload)?.into()
            }
            (Request, FunctionType::ApplicationCommand) => {
                ApplicationCommandRequest::try_from_slice(payload)?.into()
            }
            (Request, FunctionType::BridgeApplicationCommand) => {
                BridgeApplicationCommandRequest::try_from_slice(payload)?.into()
            }
            (Response, FunctionType::SendData) => {
                SendDataResponse::try_from_slice(payload)?.into()
            }
            (Request, FunctionType::SendData) => {
                SendDataCallback::try_from_slice(payload)?.into()
            }
            (Response, FunctionType::SendDataMulticast) => {
                SendDataMulticastResponse::try_from_slice(payload)?.into()
            }
            (Request, FunctionType::SendDataMulticast) => {
                SendDataMulticastCallback::try_from_slice(payload)?.into()
            }
            (Response, FunctionType::AssignReturnRoute) => {
                AssignReturnRouteResponse::try_from_slice(payload)?.into()
            }
            (Request, FunctionType::AssignReturnRoute) => {
                AssignReturnRouteCallback::try_from_slice(payload)?.into()
            }
            (Response, FunctionType::IsFailedNode) => {
                IsFailedNodeResponse::try_from_slice(payload)?.into()
            }
            (Response, FunctionType::MemoryGetByte) => {
                MemoryGetByteResponse::try_from_slice(payload)?.into()
            }
            (Response, FunctionType::GetRandom) => {
                GetRandomResponse::try_from_slice(payload)?.into()
            }
            (Response, FunctionType::ExtNvmReadLongBuffer) => {
                ExtNvmReadLongBufferResponse::try_from_slice(payload)?.into()
            }
            (command_type, function_type) => {
                return Err(TryFromRawError::NotImplemented(command_type, function_type));
            }
        };

        Ok(command)
    }
}
