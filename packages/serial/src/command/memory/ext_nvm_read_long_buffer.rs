use crate::command::{CommandBase, CommandId, CommandRequest};
use cookie_factory as cf;
use nom::number::complete::be_u8;
use zw_core::encoding::{self, Parsable, Serializable, validate};
use zw_core::prelude::*;

/// Reads a buffer from the external NVM. The offset is 24 bits wide on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtNvmReadLongBufferRequest {
    pub offset: u32,
    pub length: u16,
}

impl ExtNvmReadLongBufferRequest {
    pub fn new(offset: u32, length: u16) -> Self {
        Self { offset, length }
    }
}

impl CommandId for ExtNvmReadLongBufferRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::ExtNvmReadLongBuffer
    }
}

impl CommandBase for ExtNvmReadLongBufferRequest {}

impl CommandRequest for ExtNvmReadLongBufferRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

impl Serializable for ExtNvmReadLongBufferRequest {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::{bytes::be_u16, bytes::be_u24, sequence::tuple};
        tuple((be_u24(self.offset), be_u16(self.length)))
    }
}

impl ToLogPayload for ExtNvmReadLongBufferRequest {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("offset", format!("{:#08x}", self.offset))
            .with_entry("length", self.length)
            .into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvmReadStatus {
    Success,
    Error(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtNvmReadLongBufferResponse {
    pub data: Vec<u8>,
    pub status: NvmReadStatus,
}

impl CommandId for ExtNvmReadLongBufferResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::ExtNvmReadLongBuffer
    }
}

impl CommandBase for ExtNvmReadLongBufferResponse {
    fn is_ok(&self) -> bool {
        self.status == NvmReadStatus::Success
    }
}

impl Parsable for ExtNvmReadLongBufferResponse {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        // The buffer contents, followed by a single status byte
        validate(i, !i.is_empty(), "NVM read response must not be empty")?;
        let (data, i) = i.split_at(i.len() - 1);
        let (i, status) = be_u8(i)?;

        Ok((
            i,
            Self {
                data: data.to_vec(),
                status: match status {
                    0 => NvmReadStatus::Success,
                    raw => NvmReadStatus::Error(raw),
                },
            },
        ))
    }
}

impl ToLogPayload for ExtNvmReadLongBufferResponse {
    fn to_log_payload(&self) -> LogPayload {
        LogPayloadDict::new()
            .with_entry("data", format!("0x{}", hex::encode(&self.data)))
            .with_entry("status", format!("{:?}", self.status))
            .into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::AsCommandRaw;

    #[test]
    fn test_request_encoding() {
        let request = ExtNvmReadLongBufferRequest::new(0x001234, 5);
        assert_eq!(
            request.as_raw().unwrap().payload,
            hex::decode("0012340005").unwrap()
        );
    }

    #[test]
    fn test_response_parsing() {
        let response =
            ExtNvmReadLongBufferResponse::try_from_slice(&hex::decode("aabbcc00").unwrap())
                .unwrap();
        assert_eq!(response.data, hex::decode("aabbcc").unwrap());
        assert_eq!(response.status, NvmReadStatus::Success);
        assert!(response.is_ok());
    }
}
