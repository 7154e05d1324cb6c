use crate::command::{CommandBase, CommandId, CommandRequest};
use cookie_factory as cf;
use nom::{combinator::map, number::complete::be_u8};
use zw_core::encoding::{self, Parsable, Serializable};
use zw_core::prelude::*;

/// Asks the controller whether it considers a node failed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsFailedNodeRequest {
    pub node_id: NodeId,
}

impl IsFailedNodeRequest {
    pub fn new(node_id: NodeId) -> Self {
        Self { node_id }
    }
}

impl CommandId for IsFailedNodeRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::IsFailedNode
    }
}

impl CommandBase for IsFailedNodeRequest {}

impl CommandRequest for IsFailedNodeRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

impl Serializable for IsFailedNodeRequest {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        self.node_id.serialize()
    }
}

impl ToLogPayload for IsFailedNodeRequest {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("node ID", self.node_id)
            .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsFailedNodeResponse {
    pub is_failed: bool,
}

impl CommandId for IsFailedNodeResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::IsFailedNode
    }
}

impl CommandBase for IsFailedNodeResponse {}

impl Parsable for IsFailedNodeResponse {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        map(be_u8, |x| Self { is_failed: x > 0 })(i)
    }
}

impl ToLogPayload for IsFailedNodeResponse {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("is failed node", self.is_failed)
            .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::AsCommandRaw;

    #[test]
    fn test_request_encoding() {
        let request = IsFailedNodeRequest::new(NodeId::new(5));
        assert_eq!(request.as_raw().unwrap().payload, vec![0x05]);
    }

    #[test]
    fn test_response_parsing() {
        let response = IsFailedNodeResponse::try_from_slice(&[0x01]).unwrap();
        assert!(response.is_failed);
    }
}
