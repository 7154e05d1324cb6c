use crate::command::{CommandBase, CommandId, CommandRequest};
use cookie_factory as cf;
use zw_core::encoding::{self, Parsable, Serializable};
use zw_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GetNodeProtocolInfoRequest {
    pub node_id: NodeId,
}

impl GetNodeProtocolInfoRequest {
    pub fn new(node_id: NodeId) -> Self {
        Self { node_id }
    }
}

impl CommandId for GetNodeProtocolInfoRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetNodeProtocolInfo
    }
}

impl CommandBase for GetNodeProtocolInfoRequest {}

impl CommandRequest for GetNodeProtocolInfoRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

impl Serializable for GetNodeProtocolInfoRequest {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        self.node_id.serialize()
    }
}

impl ToLogPayload for GetNodeProtocolInfoRequest {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("node ID", self.node_id)
            .into()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetNodeProtocolInfoResponse {
    pub protocol_data: NodeInformationProtocolData,
}

impl CommandId for GetNodeProtocolInfoResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetNodeProtocolInfo
    }
}

impl CommandBase for GetNodeProtocolInfoResponse {}

impl Parsable for GetNodeProtocolInfoResponse {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, protocol_data) = NodeInformationProtocolData::parse(i)?;
        Ok((i, Self { protocol_data }))
    }
}

impl ToLogPayload for GetNodeProtocolInfoResponse {
    fn to_log_payload(&self) -> LogPayload {
        let data = &self.protocol_data;
        LogPayloadDict::new()
            .with_entry("listening", data.listening)
            .with_entry("routing", data.routing)
            .with_entry("node type", data.node_type)
            .with_entry("protocol version", data.protocol_version)
            .into()
    }
}
