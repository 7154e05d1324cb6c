use crate::command::{CommandBase, CommandId};
use nom::{
    combinator::{map_parser, opt},
    multi::length_data,
    number::complete::be_u8,
};
use zw_cc::prelude::CCRaw;
use zw_core::encoding::{self, Parsable};
use zw_core::prelude::*;

/// An unsolicited application-layer frame received through the Bridge API.
/// Unlike the plain variant it carries the destination node and an RSSI
/// measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeApplicationCommandRequest {
    pub received_status: u8,
    pub destination_node_id: NodeId,
    pub source_node_id: NodeId,
    pub command: CCRaw,
    pub rssi: Option<Rssi>,
}

impl CommandId for BridgeApplicationCommandRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::BridgeApplicationCommand
    }
}

impl CommandBase for BridgeApplicationCommandRequest {}

impl Parsable for BridgeApplicationCommandRequest {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, received_status) = be_u8(i)?;
        let (i, destination_node_id) = NodeId::parse(i)?;
        let (i, source_node_id) = NodeId::parse(i)?;
        let (i, command) = map_parser(length_data(be_u8), CCRaw::parse)(i)?;
        let (i, rssi) = opt(Rssi::parse)(i)?;

        Ok((
            i,
            Self {
                received_status,
                destination_node_id,
                source_node_id,
                command,
                rssi,
            },
        ))
    }
}

impl ToLogPayload for BridgeApplicationCommandRequest {
    fn to_log_payload(&self) -> LogPayload {
        let mut ret = LogPayloadDict::new()
            .with_entry("source node ID", self.source_node_id)
            .with_entry("destination node ID", self.destination_node_id)
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
        // Binary Switch Report "on" from node 5 to node 1, RSSI -43 dBm
        let input = hex::decode("000105032503ffd5").unwrap();
        let request = BridgeApplicationCommandRequest::try_from_slice(&input).unwrap();
        assert_eq!(request.received_status, 0);
        assert_eq!(request.destination_node_id, NodeId::new(1));
        assert_eq!(request.source_node_id, NodeId::new(5));
        assert_eq!(request.command.cc_id, CommandClasses::BinarySwitch);
        assert_eq!(request.command.cc_command, Some(0x03));
        assert_eq!(request.command.payload, vec![0xff]);
        assert_eq!(request.rssi, Some(Rssi::Measured(-43)));
    }
}
