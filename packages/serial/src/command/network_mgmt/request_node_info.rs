use crate::command::{CommandBase, CommandId, CommandRequest};
use cookie_factory as cf;
use nom::{combinator::map, number::complete::be_u8};
use zw_core::encoding::{self, Parsable, Serializable};
use zw_core::prelude::*;

/// Asks a node to send its node information frame. The answer arrives as an
/// unsolicited `ApplicationUpdate` request, NOT as a callback - the response
/// only tells whether the transmission was initiated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestNodeInfoRequest {
    pub node_id: NodeId,
}

impl RequestNodeInfoRequest {
    pub fn new(node_id: NodeId) -> Self {
        Self { node_id }
    }
}

impl CommandId for RequestNodeInfoRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::RequestNodeInfo
    }
}

impl CommandBase for RequestNodeInfoRequest {}

impl CommandRequest for RequestNodeInfoRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

impl Serializable for RequestNodeInfoRequest {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        self.node_id.serialize()
    }
}

impl ToLogPayload for RequestNodeInfoRequest {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("node ID", self.node_id)
            .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestNodeInfoResponse {
    pub was_sent: bool,
}

impl CommandId for RequestNodeInfoResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::RequestNodeInfo
    }
}

impl CommandBase for RequestNodeInfoResponse {
    fn is_ok(&self) -> bool {
        self.was_sent
    }
}

impl Parsable for RequestNodeInfoResponse {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        map(be_u8, |x| Self { was_sent: x > 0 })(i)
    }
}

impl ToLogPayload for RequestNodeInfoResponse {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("was sent", self.was_sent)
            .into()
    }
}
