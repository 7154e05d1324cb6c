use crate::command::{CommandBase, CommandId};
use nom::{
    combinator::{map_parser, opt},
    multi::length_data,
    number::complete::be_u8,
};
use zw_cc::prelude::CCRaw;
use zw_core::encoding::{self, Parsable};
use zw_core::prelude::*;

/// An unsolicited application-layer frame from another node
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationCommandRequest {
    pub received_status: u8,
    pub source_node_id: NodeId,
    pub command: CCRaw,
    pub rssi: Option<Rssi>,
}

impl CommandId for ApplicationCommandRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::ApplicationCommand
    }
}

impl CommandBase for ApplicationCommandRequest {}

impl Parsable for ApplicationCommandRequest {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, received_status) = be_u8(i)?;
        let (i, source_node_id) = NodeId::parse(i)?;
        let (i, command) = map_parser(length_data(be_u8), CCRaw::parse)(i)?;
        let (i, rssi) = opt(Rssi::parse)(i)?;

        Ok((
            i,
            Self {
                received_status,
                source_node_id,
                command,
                rssi,
            },
        ))
    }
}

impl ToLogPayload for ApplicationCommandRequest {
    fn to_log_payload(&self) -> LogPayload {
        let mut ret = LogPayloadDict::new()
            .with_entry("source node ID", self.source_node_id)
            .with_entry("command", format!("{:?}", self.command));
        if let Some(rssi) = self.rssi {
            ret = ret.with_entry("RSSI", rssi);
        }
        ret.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use zw_core::prelude::CommandClasses;

    #[test]
    fn test_parse() {
        // Binary Switch Report from node 3
        let input = hex::decode("000303250300").unwrap();
        let request = ApplicationCommandRequest::try_from_slice(&input).unwrap();
        assert_eq!(request.received_status, 0);
        assert_eq!(request.source_node_id, NodeId::new(3));
        assert_eq!(request.command.cc_id, CommandClasses::BinarySwitch);
        assert_eq!(request.command.cc_command, Some(0x03));
        assert_eq!(request.command.payload, vec![0x00]);
        assert_eq!(request.rssi, None);
    }
}
