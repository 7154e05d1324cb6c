use crate::frame::{RawSerialFrame, SerialControlByte};
use cookie_factory as cf;
use nom::{
    bytes::complete::{tag, take},
    combinator::peek,
    number::complete::be_u8,
    sequence::tuple,
};
use std::fmt::Debug;
use zw_core::checksum::xor_sum;
use zw_core::encoding::{self, IntoEncodingResult, Parsable, Serializable, validate};
use zw_core::prelude::*;

/// A decoded data frame: `SOF | LEN | TYPE | CMD | PARAMS... | CKSUM`.
/// The function type is kept as a raw byte here, so frames for functions
/// this library does not implement still decode and can be dropped upstream.
#[derive(Clone, PartialEq)]
pub struct CommandRaw {
    pub command_type: CommandType,
    pub function_type: u8,
    pub payload: Vec<u8>,
    pub checksum: u8,
}

impl Debug for CommandRaw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRaw")
            .field("command_type", &self.command_type)
            .field("function_type", &format_args!("{:#04x}", self.function_type))
            .field("payload", &format_args!("0x{}", hex::encode(&self.payload)))
            .field("checksum", &format_args!("{:#04x}", self.checksum))
            .finish()
    }
}

fn frame_checksum(frame: &[u8]) -> u8 {
    // LEN through the last payload byte
    xor_sum(&frame[1..frame.len() - 1])
}

impl CommandRaw {
    pub fn new(command_type: CommandType, function_type: u8, payload: Vec<u8>) -> Self {
        Self {
            command_type,
            function_type,
            payload,
            // Computed during serialization
            checksum: 0,
        }
    }
}

impl Parsable for CommandRaw {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        // Ensure that the buffer contains at least 5 bytes
        peek(take(5usize))(i)?;

        // Ensure that it starts with a SOF byte and extract the length of the rest
        let (_, (_, len)) = peek(tuple((tag([SerialControlByte::SOF as u8]), be_u8)))(i)?;
        let (_, raw_data) = peek(take(len as usize + 2))(i)?;

        // Skip the SOF and length bytes
        let (i, _) = take(2usize)(i)?;

        let (i, command_type) = CommandType::parse(i)?;
        let (i, function_type) = be_u8(i)?;
        let (i, payload) = take(len as usize - 3)(i)?;
        let (i, checksum) = be_u8(i)?;

        let expected_checksum = frame_checksum(raw_data);
        validate(
            i,
            checksum == expected_checksum,
            format!(
                "checksum mismatch: expected {:#04x}, got {:#04x}",
                expected_checksum, checksum
            ),
        )?;

        Ok((
            i,
            Self {
                command_type,
                function_type,
                payload: payload.to_vec(),
                checksum,
            },
        ))
    }
}

impl CommandRaw {
    fn serialize_no_checksum<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::{bytes::be_u8, combinator::slice, sequence::tuple};

        tuple((
            be_u8(SerialControlByte::SOF as u8),
            be_u8(self.payload.len() as u8 + 3),
            self.command_type.serialize(),
            be_u8(self.function_type),
            slice(&self.payload),
            // Checksum placeholder
            be_u8(0),
        ))
    }
}

impl Serializable for CommandRaw {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::combinator::slice;

        move |out| {
            let mut buf = cf::gen_simple(self.serialize_no_checksum(), Vec::new())
                .expect("writing to a Vec cannot fail");
            let len = buf.len();
            buf[len - 1] = frame_checksum(&buf);
            slice(buf)(out)
        }
    }
}

impl From<CommandRaw> for RawSerialFrame {
    fn from(val: CommandRaw) -> Self {
        let data = val
            .try_to_vec()
            .expect("serializing a command frame cannot fail");
        RawSerialFrame::Data(data)
    }
}

impl CommandRaw {
    /// Decodes the contents of a `RawSerialFrame::Data`
    pub fn try_from_frame_data(data: &[u8]) -> encoding::EncodingResult<Self> {
        Self::parse(data).into_encoding_result()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse() {
        // An actual GetSerialApiInitData request with a correct checksum
        let input = hex::decode("01030002fe").unwrap();
        let cmd = CommandRaw::try_from_slice(&input).unwrap();
        assert_eq!(cmd.command_type, CommandType::Request);
        assert_eq!(cmd.function_type, 0x02);
        assert!(cmd.payload.is_empty());
        assert_eq!(cmd.checksum, 0xfe);
    }

    #[test]
    fn test_parse_invalid_checksum() {
        let input = hex::decode("01030002ff").unwrap();
        let result = CommandRaw::parse(&input);
        match result {
            Err(nom::Err::Failure(_)) => (),
            other => panic!("Expected a checksum failure, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_command_type() {
        // TYPE 0x02 is neither REQ nor RES
        let input = hex::decode("01030202fc").unwrap();
        assert!(CommandRaw::try_from_slice(&input).is_err());
    }

    #[test]
    fn test_parse_truncated() {
        // LEN claims 9 bytes, frame ends after 3
        let input = hex::decode("01090002fe").unwrap();
        assert!(CommandRaw::try_from_slice(&input).is_err());
    }

    #[test]
    fn test_serialize() {
        let cmd = CommandRaw::new(CommandType::Request, 0x02, vec![]);
        assert_eq!(cmd.try_to_vec().unwrap(), hex::decode("01030002fe").unwrap());
    }

    proptest! {
        #[test]
        fn test_roundtrip(
            command_type in prop_oneof![Just(CommandType::Request), Just(CommandType::Response)],
            function_type in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let cmd = CommandRaw::new(command_type, function_type, payload);
            let bytes = cmd.try_to_vec().unwrap();
            let parsed = CommandRaw::try_from_slice(&bytes).unwrap();
            prop_assert_eq!(parsed.command_type, cmd.command_type);
            prop_assert_eq!(parsed.function_type, cmd.function_type);
            prop_assert_eq!(parsed.payload.clone(), cmd.payload);
            // And byte-for-byte stability of the encoding
            prop_assert_eq!(parsed.try_to_vec().unwrap(), bytes);
        }
    }
}
