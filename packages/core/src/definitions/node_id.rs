use crate::encoding::{self, Parsable, Serializable};
use cookie_factory as cf;
use nom::{combinator::map, number::complete::be_u8};
use std::fmt::{Debug, Display};

/// The address of a node on the network. The Serial API variant in scope
/// uses 8-bit node IDs; `0` means "unspecified" and `0xff` is the broadcast
/// address.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u8);

pub const NODE_ID_UNSPECIFIED: NodeId = NodeId(0);
pub const NODE_ID_BROADCAST: NodeId = NodeId(0xff);

impl NodeId {
    pub fn new(id: u8) -> Self {
        Self(id)
    }

    pub fn broadcast() -> Self {
        NODE_ID_BROADCAST
    }

    pub fn unspecified() -> Self {
        NODE_ID_UNSPECIFIED
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0>3}", self.0)
    }
}

impl From<u8> for NodeId {
    fn from(val: u8) -> Self {
        Self(val)
    }
}

impl From<NodeId> for u8 {
    fn from(val: NodeId) -> Self {
        val.0
    }
}

impl PartialEq<u8> for NodeId {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl Parsable for NodeId {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        map(be_u8, NodeId::new)(i)
    }
}

impl Serializable for NodeId {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u8(self.0)
    }
}
