use crate::command::{CommandBase, CommandId, CommandRequest};
use cookie_factory as cf;
use nom::{combinator::map, number::complete::be_u8};
use typed_builder::TypedBuilder;
use zw_cc::prelude::CCRaw;
use zw_core::encoding::{self, Parsable, Serializable};
use zw_core::prelude::*;

/// Sends an application-layer command to a list of nodes at once
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct SendDataMulticastRequest {
    pub node_ids: Vec<NodeId>,
    pub command: CCRaw,
    #[builder(setter(skip), default)]
    pub callback_id: Option<u8>,
    #[builder(default)]
    pub transmit_options: TransmitOptions,
}

impl CommandId for SendDataMulticastRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::SendDataMulticast
    }
}

impl CommandBase for SendDataMulticastRequest {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl CommandRequest for SendDataMulticastRequest {
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

impl Serializable for SendDataMulticastRequest {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::{bytes::be_u8, combinator::slice, multi::all, sequence::tuple};

        move |out| {
            let payload = self
                .command
                .try_to_vec()
                .expect("serializing a CC frame cannot fail");
            tuple((
                be_u8(self.node_ids.len() as u8),
                all(self.node_ids.iter().map(|node_id| node_id.serialize())),
                be_u8(payload.len() as u8),
                slice(&payload),
                self.transmit_options.serialize(),
                be_u8(self.callback_id.unwrap_or(0)),
            ))(out)
        }
    }
}

impl ToLogPayload for SendDataMulticastRequest {
    fn to_log_payload(&self) -> LogPayload {
        let mut ret = LogPayloadDict::new()
            .with_entry(
                "node IDs",
                self.node_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            )
            .with_entry("command", format!("{:?}", self.command))
            .with_entry("transmit options", self.transmit_options);
        if let Some(callback_id) = self.callback_id {
            ret = ret.with_entry("callback ID", callback_id);
        }
        ret.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendDataMulticastResponse {
    pub was_sent: bool,
}

impl CommandId for SendDataMulticastResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::SendDataMulticast
    }
}

impl CommandBase for SendDataMulticastResponse {
    fn is_ok(&self) -> bool {
        self.was_sent
    }
}

impl Parsable for SendDataMulticastResponse {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        map(be_u8, |x| Self { was_sent: x > 0 })(i)
    }
}

impl ToLogPayload for SendDataMulticastResponse {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("was sent", self.was_sent)
            .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendDataMulticastCallback {
    pub callback_id: Option<u8>,
    pub transmit_status: TransmitStatus,
}

impl CommandId for SendDataMulticastCallback {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::SendDataMulticast
    }
}

impl CommandBase for SendDataMulticastCallback {
    fn is_ok(&self) -> bool {
        self.transmit_status == TransmitStatus::Ok
    }

    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl Parsable for SendDataMulticastCallback {
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

impl ToLogPayload for SendDataMulticastCallback {
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
    use zw_core::prelude::CommandClasses;

    #[test]
    fn test_request_encoding() {
        // Binary Switch Set to nodes 2 and 3, ACK + auto route, callback ID 1
        let mut request = SendDataMulticastRequest::builder()
            .node_ids(vec![NodeId::new(2), NodeId::new(3)])
            .command(CCRaw {
                cc_id: CommandClasses::BinarySwitch,
                cc_command: Some(0x01),
                payload: vec![],
            })
            .transmit_options(TransmitOptions::new().ack(true).auto_route(true))
            .build();
        request.set_callback_id(Some(1));

        assert_eq!(
            request.as_raw().unwrap().payload,
            hex::decode("0202030225010501").unwrap()
        );
    }

    #[test]
    fn test_callback_parsing() {
        let callback =
            SendDataMulticastCallback::try_from_slice(&hex::decode("0100").unwrap()).unwrap();
        assert_eq!(callback.callback_id, Some(1));
        assert_eq!(callback.transmit_status, TransmitStatus::Ok);
    }
}
