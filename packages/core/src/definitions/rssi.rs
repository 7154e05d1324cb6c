use crate::encoding::{self, Parsable, Serializable};
use cookie_factory as cf;
use nom::{combinator::map, number::complete::be_i8};
use std::fmt::Display;

/// A received signal strength indication, attached to inbound application
/// frames by newer controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rssi {
    Measured(i8),
    NotAvailable,
    ReceiverSaturated,
    NoSignalDetected,
}

impl Rssi {
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Measured(_))
    }
}

impl Display for Rssi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Measured(rssi) => write!(f, "{} dBm", rssi),
            Self::NotAvailable => write!(f, "N/A"),
            Self::ReceiverSaturated => write!(f, "Receiver saturated"),
            Self::NoSignalDetected => write!(f, "No signal detected"),
        }
    }
}

impl From<i8> for Rssi {
    fn from(raw: i8) -> Self {
        match raw {
            127 => Self::NotAvailable,
            126 => Self::ReceiverSaturated,
            125 => Self::NoSignalDetected,
            raw => Self::Measured(raw),
        }
    }
}

impl From<Rssi> for i8 {
    fn from(val: Rssi) -> Self {
        match val {
            Rssi::Measured(rssi) => rssi,
            Rssi::NotAvailable => 127,
            Rssi::ReceiverSaturated => 126,
            Rssi::NoSignalDetected => 125,
        }
    }
}

impl Parsable for Rssi {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        map(be_i8, Rssi::from)(i)
    }
}

impl Serializable for Rssi {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_i8((*self).into())
    }
}

#[test]
fn test_parse_measured() {
    let input = [0xd5];
    let (_, rssi) = Rssi::parse(&input).unwrap();
    assert_eq!(rssi, Rssi::Measured(-43));
}
