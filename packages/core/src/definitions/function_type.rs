use crate::encoding::{self, NomTryFromPrimitive, Parsable, Serializable};
use cookie_factory as cf;
use derive_try_from_primitive::*;
use nom::{combinator::map_res, error::context, number::complete::be_u8};

/// The function IDs of the Serial API commands implemented by this library.
/// Frames with other function IDs decode at the raw level only and are
/// dropped by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum FunctionType {
    GetSerialApiInitData = 0x02,
    ApplicationCommand = 0x04, // A message from another node
    SendData = 0x13,
    SendDataMulticast = 0x14,
    GetRandom = 0x1c,
    GetControllerId = 0x20, // Get Home ID and Controller Node ID
    MemoryGetByte = 0x21,
    ExtNvmReadLongBuffer = 0x2a,
    GetNodeProtocolInfo = 0x41, // Listening, speeds, device classes etc. for a given node
    AssignReturnRoute = 0x46,
    ApplicationUpdate = 0x49, // Node information frames, among others
    RequestNodeInfo = 0x60, // Ask a node for its supported command classes
    IsFailedNode = 0x62,
    BridgeApplicationCommand = 0xa8, // A message from another node using the Bridge API
}

impl NomTryFromPrimitive for FunctionType {
    type Repr = u8;

    fn format_error(repr: Self::Repr) -> String {
        format!("Unknown function type: {:#04x}", repr)
    }
}

impl Parsable for FunctionType {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        context(
            "FunctionType",
            map_res(be_u8, FunctionType::try_from_primitive),
        )(i)
    }
}

impl Serializable for FunctionType {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u8(*self as u8)
    }
}
