use bytes::{Buf, BytesMut};
use derive_try_from_primitive::*;
use nom::{
    branch::alt,
    bytes::streaming::{tag, take, take_till1},
    combinator::{map, peek, value},
    error::context,
    number::streaming::be_u8,
    sequence::tuple,
};
use std::fmt::Display;
use zw_core::encoding::{self, ParseResult};

pub const ACK_BUFFER: [u8; 1] = [SerialControlByte::ACK as u8];
pub const NAK_BUFFER: [u8; 1] = [SerialControlByte::NAK as u8];
pub const CAN_BUFFER: [u8; 1] = [SerialControlByte::CAN as u8];

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum SerialControlByte {
    SOF = 0x01,
    ACK = 0x06,
    NAK = 0x15,
    CAN = 0x18,
}

/// The single-byte link-layer tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ControlFlow {
    ACK = SerialControlByte::ACK as u8,
    NAK = SerialControlByte::NAK as u8,
    CAN = SerialControlByte::CAN as u8,
}

impl Display for ControlFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A frame as it appears on the wire: a control-flow byte, a data frame
/// (SOF through checksum, still undecoded) or skipped garbage
#[derive(Clone, Debug, PartialEq)]
pub enum RawSerialFrame {
    ControlFlow(ControlFlow),
    Data(Vec<u8>),
    Garbage(Vec<u8>),
}

fn consume_garbage(i: encoding::Input) -> ParseResult<RawSerialFrame> {
    map(
        take_till1(|b| SerialControlByte::try_from(b).is_ok()),
        |g: &[u8]| RawSerialFrame::Garbage(g.to_vec()),
    )(i)
}

fn parse_control(i: encoding::Input) -> ParseResult<RawSerialFrame> {
    alt((
        value(
            RawSerialFrame::ControlFlow(ControlFlow::ACK),
            tag(&ACK_BUFFER),
        ),
        value(
            RawSerialFrame::ControlFlow(ControlFlow::NAK),
            tag(&NAK_BUFFER),
        ),
        value(
            RawSerialFrame::ControlFlow(ControlFlow::CAN),
            tag(&CAN_BUFFER),
        ),
    ))(i)
}

fn parse_data(i: encoding::Input) -> ParseResult<RawSerialFrame> {
    // Ensure that the buffer contains at least 5 bytes
    peek(take(5usize))(i)?;

    // Ensure that it starts with a SOF byte and extract the length of the rest of the frame
    let (_, (_, len)) = peek(tuple((tag([SerialControlByte::SOF as u8]), be_u8)))(i)?;

    // Take the whole frame, SOF and length byte included
    let (i, data) = take(len as usize + 2)(i)?;

    Ok((i, RawSerialFrame::Data(data.to_vec())))
}

impl RawSerialFrame {
    pub fn parse(i: encoding::Input) -> ParseResult<Self> {
        // A serial frame is either a control byte, data starting with SOF, or skipped garbage
        context(
            "Serial Frame",
            alt((consume_garbage, parse_control, parse_data)),
        )(i)
    }

    /// Parses one frame off the front of the given buffer, advancing it past
    /// the consumed bytes. Returns `None` while the buffer holds no complete
    /// frame yet.
    pub fn parse_mut(src: &mut BytesMut) -> Option<Self> {
        match Self::parse(&src[..]) {
            Ok((rest, frame)) => {
                let consumed = src.len() - rest.len();
                src.advance(consumed);
                Some(frame)
            }
            Err(_) => None,
        }
    }

    pub fn serialize(&self, dst: &mut BytesMut) {
        match self {
            Self::ControlFlow(byte) => dst.extend_from_slice(&[*byte as u8]),
            Self::Data(data) => dst.extend_from_slice(data),
            Self::Garbage(data) => dst.extend_from_slice(data),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_garbage() {
        let data = hex::decode("07080901").unwrap();
        let expected = hex::decode("070809").unwrap();
        assert_eq!(
            consume_garbage(&data),
            Ok(([0x01].as_slice(), RawSerialFrame::Garbage(expected)))
        );
    }

    #[test]
    fn test_control() {
        let data = hex::decode("0615180a").unwrap();
        let (data, ack) = parse_control(&data).unwrap();
        assert_eq!(ack, RawSerialFrame::ControlFlow(ControlFlow::ACK));
        let (data, nak) = parse_control(data).unwrap();
        assert_eq!(nak, RawSerialFrame::ControlFlow(ControlFlow::NAK));
        let (data, can) = parse_control(data).unwrap();
        assert_eq!(can, RawSerialFrame::ControlFlow(ControlFlow::CAN));
        assert_eq!(data, &[0x0a]);
    }

    #[test]
    fn test_data() {
        let data = hex::decode("01030008f406").unwrap();
        let expected = hex::decode("01030008f4").unwrap();
        assert_eq!(
            parse_data(&data),
            Ok(([0x06].as_slice(), RawSerialFrame::Data(expected)))
        );
    }

    #[test]
    fn test_data_incomplete() {
        // The length byte claims more data than the buffer holds
        let data = hex::decode("010400").unwrap();
        assert!(matches!(
            parse_data(&data),
            Err(nom::Err::Incomplete(_))
        ));
    }

    #[test]
    fn test_many() {
        let mut src = BytesMut::from(hex::decode("01030008f40618000000080106").unwrap().as_slice());

        assert_eq!(
            RawSerialFrame::parse_mut(&mut src),
            Some(RawSerialFrame::Data(hex::decode("01030008f4").unwrap()))
        );
        assert_eq!(
            RawSerialFrame::parse_mut(&mut src),
            Some(RawSerialFrame::ControlFlow(ControlFlow::ACK))
        );
        assert_eq!(
            RawSerialFrame::parse_mut(&mut src),
            Some(RawSerialFrame::ControlFlow(ControlFlow::CAN))
        );
        assert_eq!(
            RawSerialFrame::parse_mut(&mut src),
            Some(RawSerialFrame::Garbage(hex::decode("00000008").unwrap()))
        );
        // The remaining bytes look like the beginning of a data frame
        assert_eq!(RawSerialFrame::parse_mut(&mut src), None);
        assert_eq!(&src[..], hex::decode("0106").unwrap());
    }
}
