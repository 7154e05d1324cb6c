use crate::command::{CommandBase, CommandId, CommandRequest};
use cookie_factory as cf;
use nom::number::complete::{be_u32, be_u8};
use zw_core::encoding::{self, Parsable, Serializable, encoders::empty};
use zw_core::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GetControllerIdRequest {}

impl CommandId for GetControllerIdRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetControllerId
    }
}

impl CommandBase for GetControllerIdRequest {}

impl CommandRequest for GetControllerIdRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

impl Serializable for GetControllerIdRequest {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        empty()
    }
}

impl ToLogPayload for GetControllerIdRequest {
    fn to_log_payload(&self) -> LogPayload {
        LogPayload::empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GetControllerIdResponse {
    pub home_id: u32,
    pub own_node_id: NodeId,
}

impl CommandId for GetControllerIdResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetControllerId
    }
}

impl CommandBase for GetControllerIdResponse {}

impl Parsable for GetControllerIdResponse {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, home_id) = be_u32(i)?;
        let (i, own_node_id) = be_u8(i)?;
        Ok((
            i,
            Self {
                home_id,
                own_node_id: NodeId::new(own_node_id),
            },
        ))
    }
}

impl ToLogPayload for GetControllerIdResponse {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("home ID", format!("{:#010x}", self.home_id))
            .with_entry("own node ID", self.own_node_id)
            .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_response() {
        let input = hex::decode("c064a99b01").unwrap();
        let response = GetControllerIdResponse::try_from_slice(&input).unwrap();
        assert_eq!(response.home_id, 0xc064a99b);
        assert_eq!(response.own_node_id, NodeId::new(1));
    }
}
