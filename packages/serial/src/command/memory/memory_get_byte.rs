use crate::command::{CommandBase, CommandId, CommandRequest};
use cookie_factory as cf;
use nom::{combinator::map, number::complete::be_u8};
use zw_core::encoding::{self, Parsable, Serializable};
use zw_core::prelude::*;

/// Reads a single byte from the controller's NVM
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryGetByteRequest {
    pub offset: u16,
}

impl MemoryGetByteRequest {
    pub fn new(offset: u16) -> Self {
        Self { offset }
    }
}

impl CommandId for MemoryGetByteRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::MemoryGetByte
    }
}

impl CommandBase for MemoryGetByteRequest {}

impl CommandRequest for MemoryGetByteRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

impl Serializable for MemoryGetByteRequest {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u16(self.offset)
    }
}

impl ToLogPayload for MemoryGetByteRequest {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("offset", format!("{:#06x}", self.offset))
            .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryGetByteResponse {
    pub value: u8,
}

impl CommandId for MemoryGetByteResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::MemoryGetByte
    }
}

impl CommandBase for MemoryGetByteResponse {}

impl Parsable for MemoryGetByteResponse {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        map(be_u8, |value| Self { value })(i)
    }
}

impl ToLogPayload for MemoryGetByteResponse {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("value", format!("{:#04x}", self.value))
            .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::AsCommandRaw;

    #[test]
    fn test_request_encoding() {
        let request = MemoryGetByteRequest::new(0x1234);
        assert_eq!(request.as_raw().unwrap().payload, hex::decode("1234").unwrap());
    }

    #[test]
    fn test_response_parsing() {
        let response = MemoryGetByteResponse::try_from_slice(&[0xab]).unwrap();
        assert_eq!(response.value, 0xab);
    }
}
