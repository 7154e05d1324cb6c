use crate::command::{CommandBase, CommandId};
use nom::{combinator::cond, number::complete::be_u8};
use zw_core::encoding::{self, NomTryFromPrimitive, Parsable};
use zw_core::prelude::*;
use derive_try_from_primitive::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ApplicationUpdateStatus {
    SmartStartHomeIdReceivedLR = 0x87,
    SmartStartIncludedNodeInfoReceived = 0x86,
    SmartStartHomeIdReceived = 0x85,
    NodeInfoReceived = 0x84,
    NodeInfoRequestDone = 0x82,
    NodeInfoRequestFailed = 0x81,
    RoutingPending = 0x80,
    NodeAdded = 0x40,
    NodeRemoved = 0x20,
    SucIdChanged = 0x10,
}

impl NomTryFromPrimitive for ApplicationUpdateStatus {
    type Repr = u8;

    fn format_error(repr: Self::Repr) -> String {
        format!("Unknown application update status: {:#04x}", repr)
    }
}

/// Progress notifications from the protocol, most importantly received node
/// information frames. Despite being a REQ, this command carries no callback
/// ID; it is correlated with `RequestNodeInfo` by the node ID.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationUpdateRequest {
    pub status: ApplicationUpdateStatus,
    pub node_id: NodeId,
    pub node_info: Option<NodeInformationApplicationData>,
}

impl CommandId for ApplicationUpdateRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::ApplicationUpdate
    }
}

impl CommandBase for ApplicationUpdateRequest {
    fn is_ok(&self) -> bool {
        self.status != ApplicationUpdateStatus::NodeInfoRequestFailed
    }
}

impl Parsable for ApplicationUpdateRequest {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, status) = nom::combinator::map_res(
            be_u8,
            ApplicationUpdateStatus::try_from_primitive,
        )(i)?;
        let (i, node_id) = NodeId::parse(i)?;
        let (i, node_info) = cond(
            matches!(
                status,
                ApplicationUpdateStatus::NodeInfoReceived
                    | ApplicationUpdateStatus::SmartStartIncludedNodeInfoReceived
            ),
            NodeInformationApplicationData::parse,
        )(i)?;

        Ok((
            i,
            Self {
                status,
                node_id,
                node_info,
            },
        ))
    }
}

impl ToLogPayload for ApplicationUpdateRequest {
    fn to_log_payload(&self) -> LogPayload {
        let mut ret = LogPayloadDict::new()
            .with_entry("status", format!("{:?}", self.status))
            .with_entry("node ID", self.node_id);
        if let Some(node_info) = &self.node_info {
            ret = ret.with_entry(
                "supported CCs",
                node_info
                    .supported_command_classes
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        ret.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_node_info_received() {
        // Node 2 reports device classes 04/10/01 and CCs Binary Switch + Version
        let input = hex::decode("8402050410012586").unwrap();
        let request = ApplicationUpdateRequest::try_from_slice(&input).unwrap();
        assert_eq!(request.status, ApplicationUpdateStatus::NodeInfoReceived);
        assert_eq!(request.node_id, NodeId::new(2));
        let node_info = request.node_info.unwrap();
        assert_eq!(
            node_info.supported_command_classes,
            vec![CommandClasses::BinarySwitch, CommandClasses::Version]
        );
    }

    #[test]
    fn test_parse_request_failed() {
        // A failed node info request reports node ID 0
        let input = hex::decode("8100").unwrap();
        let request = ApplicationUpdateRequest::try_from_slice(&input).unwrap();
        assert_eq!(
            request.status,
            ApplicationUpdateStatus::NodeInfoRequestFailed
        );
        assert!(!request.is_ok());
        assert_eq!(request.node_info, None);
    }
}
