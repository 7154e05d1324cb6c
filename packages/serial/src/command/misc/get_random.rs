use crate::command::{CommandBase, CommandId, CommandRequest};
use cookie_factory as cf;
use nom::{
    multi::length_data,
    number::complete::be_u8,
};
use zw_core::encoding::{self, Parsable, Serializable};
use zw_core::prelude::*;

/// Asks the controller's RNG for random bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GetRandomRequest {
    pub count: u8,
}

impl GetRandomRequest {
    pub fn new(count: u8) -> Self {
        Self { count }
    }
}

impl CommandId for GetRandomRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetRandom
    }
}

impl CommandBase for GetRandomRequest {}

impl CommandRequest for GetRandomRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

impl Serializable for GetRandomRequest {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u8(self.count)
    }
}

impl ToLogPayload for GetRandomRequest {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new().with_entry("count", self.count).into()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetRandomResponse {
    pub success: bool,
    pub bytes: Vec<u8>,
}

impl CommandId for GetRandomResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetRandom
    }
}

impl CommandBase for GetRandomResponse {
    fn is_ok(&self) -> bool {
        self.success
    }
}

impl Parsable for GetRandomResponse {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, success) = be_u8(i)?;
        let (i, bytes) = length_data(be_u8)(i)?;

        Ok((
            i,
            Self {
                success: success > 0,
                bytes: bytes.to_vec(),
            },
        ))
    }
}

impl ToLogPayload for GetRandomResponse {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("success", self.success)
            .with_entry("bytes", format!("0x{}", hex::encode(&self.bytes)))
            .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::AsCommandRaw;

    #[test]
    fn test_request_encoding() {
        let request = GetRandomRequest::new(5);
        assert_eq!(request.as_raw().unwrap().payload, vec![0x05]);
    }

    #[test]
    fn test_response_parsing() {
        let response =
            GetRandomResponse::try_from_slice(&hex::decode("01051122334455").unwrap()).unwrap();
        assert!(response.success);
        assert_eq!(response.bytes, hex::decode("1122334455").unwrap());
    }
}
