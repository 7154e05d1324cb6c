use crate::command::{CommandBase, CommandId, CommandRequest};
use cookie_factory as cf;
use nom::{combinator::opt, number::complete::be_u8};
use zw_core::encoding::{self, Parsable, Serializable, encoders::empty, parsers};
use zw_core::prelude::*;

const CAPABILITY_IS_SECONDARY: u8 = 0b0000_0100;
const CAPABILITY_IS_SIS: u8 = 0b0000_1000;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GetSerialApiInitDataRequest {}

impl CommandId for GetSerialApiInitDataRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetSerialApiInitData
    }
}

impl CommandBase for GetSerialApiInitDataRequest {}

impl CommandRequest for GetSerialApiInitDataRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

impl Serializable for GetSerialApiInitDataRequest {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        empty()
    }
}

impl ToLogPayload for GetSerialApiInitDataRequest {
    fn to_log_payload(&self) -> LogPayload {
        LogPayload::empty()
    }
}

/// The controller's answer to `GetSerialApiInitData`: its API version, role
/// flags and the list of node IDs currently in the network.
#[derive(Debug, Clone, PartialEq)]
pub struct GetSerialApiInitDataResponse {
    pub api_version: u8,
    pub is_secondary: bool,
    pub is_sis: bool,
    pub node_ids: Vec<NodeId>,
    pub chip_type: Option<u8>,
    pub chip_version: Option<u8>,
}

impl CommandId for GetSerialApiInitDataResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetSerialApiInitData
    }
}

impl CommandBase for GetSerialApiInitDataResponse {}

impl Parsable for GetSerialApiInitDataResponse {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, api_version) = be_u8(i)?;
        let (i, capabilities) = be_u8(i)?;
        // Node IDs as a variable-length bitmask, LSB = node 1
        let (i, node_ids) = parsers::variable_length_bitmask_u8(i, 1)?;
        let (i, chip_type) = opt(be_u8)(i)?;
        let (i, chip_version) = opt(be_u8)(i)?;

        Ok((
            i,
            Self {
                api_version,
                is_secondary: capabilities & CAPABILITY_IS_SECONDARY != 0,
                is_sis: capabilities & CAPABILITY_IS_SIS != 0,
                node_ids: node_ids.into_iter().map(NodeId::new).collect(),
                chip_type,
                chip_version,
            },
        ))
    }
}

impl ToLogPayload for GetSerialApiInitDataResponse {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("API version", self.api_version)
            .with_entry("is secondary", self.is_secondary)
            .with_entry("is SIS", self.is_sis)
            .with_entry(
                "nodes",
                self.node_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            )
            .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_response() {
        // API version 8, primary controller, a 29 byte bitmask with
        // nodes 1, 2 and 10, chip type/version 7.0
        let mut input = hex::decode("08001d0302").unwrap();
        input.resize(5 + 27, 0x00);
        input.extend_from_slice(&[0x07, 0x00]);
        let response = GetSerialApiInitDataResponse::try_from_slice(&input).unwrap();
        assert_eq!(response.api_version, 8);
        assert!(!response.is_secondary);
        assert!(!response.is_sis);
        assert_eq!(
            response.node_ids,
            vec![NodeId::new(1), NodeId::new(2), NodeId::new(10)]
        );
        assert_eq!(response.chip_type, Some(7));
        assert_eq!(response.chip_version, Some(0));
    }
}
