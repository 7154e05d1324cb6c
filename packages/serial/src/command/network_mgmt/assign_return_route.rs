use crate::command::{CommandBase, CommandId, CommandRequest};
use cookie_factory as cf;
use nom::{combinator::map, number::complete::be_u8};
use typed_builder::TypedBuilder;
use zw_core::encoding::{self, Parsable, Serializable};
use zw_core::prelude::*;

/// Assigns a return route from a source node to a destination node.
/// Completion is reported by a callback correlated via the callback ID.
#[derive(Debug, Clone, Copy, PartialEq, TypedBuilder)]
pub struct AssignReturnRouteRequest {
    #[builder(setter(into))]
    pub source_node_id: NodeId,
    #[builder(setter(into))]
    pub destination_node_id: NodeId,
    #[builder(setter(skip), default)]
    pub callback_id: Option<u8>,
}

impl CommandId for AssignReturnRouteRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::AssignReturnRoute
    }
}

impl CommandBase for AssignReturnRouteRequest {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl CommandRequest for AssignReturnRouteRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        self.callback_id.is_some()
    }

    fn needs_callback_id(&self) -> bool {
        true
    }

    fn set_callback_id(&mut self, callback_id: Option<u8>) {
        self.callback_id = callback_id;
    }
}

impl Serializable for AssignReturnRouteRequest {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::{bytes::be_u8, sequence::tuple};
        tuple((
            self.source_node_id.serialize(),
            self.destination_node_id.serialize(),
            be_u8(self.callback_id.unwrap_or(0)),
        ))
    }
}

impl ToLogPayload for AssignReturnRouteRequest {
    fn to_log_payload(&self) -> LogPayload {
        let mut ret = LogPayloadDict::new()
            .with_entry("source node ID", self.source_node_id)
            .with_entry("destination node ID", self.destination_node_id);
        if let Some(callback_id) = self.callback_id {
            ret = ret.with_entry("callback ID", callback_id);
        }
        ret.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignReturnRouteResponse {
    pub was_executed: bool,
}

impl CommandId for AssignReturnRouteResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::AssignReturnRoute
    }
}

impl CommandBase for AssignReturnRouteResponse {
    fn is_ok(&self) -> bool {
        self.was_executed
    }
}

impl Parsable for AssignReturnRouteResponse {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        map(be_u8, |x| Self { was_executed: x > 0 })(i)
    }
}

impl ToLogPayload for AssignReturnRouteResponse {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("was executed", self.was_executed)
            .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignReturnRouteCallback {
    pub callback_id: Option<u8>,
    pub transmit_status: TransmitStatus,
}

impl CommandId for AssignReturnRouteCallback {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::AssignReturnRoute
    }
}

impl CommandBase for AssignReturnRouteCallback {
    fn is_ok(&self) -> bool {
        self.transmit_status == TransmitStatus::Ok
    }

    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl Parsable for AssignReturnRouteCallback {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, callback_id) = be_u8(i)?;
        let (i, transmit_status) = TransmitStatus::parse(i)?;
        Ok((
            i,
            Self {
                callback_id: Some(callback_id),
                transmit_status,
            },
        ))
    }
}

impl ToLogPayload for AssignReturnRouteCallback {
    fn to_log_payload(&self) -> LogPayload {
        let mut ret = LogPayloadDict::new();
        if let Some(callback_id) = self.callback_id {
            ret = ret.with_entry("callback ID", callback_id);
        }
        ret.with_entry("transmit status", format!("{:?}", self.transmit_status))
            .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::AsCommandRaw;

    #[test]
    fn test_request_encoding() {
        let mut request = AssignReturnRouteRequest::builder()
            .source_node_id(2u8)
            .destination_node_id(1u8)
            .build();
        request.set_callback_id(Some(3));

        let raw = request.as_raw().unwrap();
        assert_eq!(raw.payload, hex::decode("020103").unwrap());
    }

    #[test]
    fn test_callback_parsing() {
        let callback =
            AssignReturnRouteCallback::try_from_slice(&hex::decode("0300").unwrap()).unwrap();
        assert_eq!(callback.callback_id, Some(3));
        assert_eq!(callback.transmit_status, TransmitStatus::Ok);
        assert!(callback.is_ok());
    }
}
