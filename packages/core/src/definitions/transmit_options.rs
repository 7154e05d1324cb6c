use crate::encoding::{self, Parsable, Serializable};
use cookie_factory as cf;
use nom::{combinator::map, number::complete::be_u8};

const TRANSMIT_OPTION_ACK: u8 = 0x01;
const TRANSMIT_OPTION_LOW_POWER: u8 = 0x02;
const TRANSMIT_OPTION_AUTO_ROUTE: u8 = 0x04;
const TRANSMIT_OPTION_NO_ROUTE: u8 = 0x10;
const TRANSMIT_OPTION_EXPLORE: u8 = 0x20;

/// The transmit options passed along with outgoing node commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitOptions(u8);

impl Default for TransmitOptions {
    fn default() -> Self {
        // Request acknowledgement and let the controller route
        Self::new().ack(true).auto_route(true).explore(true)
    }
}

impl TransmitOptions {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn ack(self, ack: bool) -> Self {
        self.with_bit(TRANSMIT_OPTION_ACK, ack)
    }

    pub fn low_power(self, low_power: bool) -> Self {
        self.with_bit(TRANSMIT_OPTION_LOW_POWER, low_power)
    }

    pub fn auto_route(self, auto_route: bool) -> Self {
        self.with_bit(TRANSMIT_OPTION_AUTO_ROUTE, auto_route)
    }

    pub fn no_route(self, no_route: bool) -> Self {
        self.with_bit(TRANSMIT_OPTION_NO_ROUTE, no_route)
    }

    pub fn explore(self, explore: bool) -> Self {
        self.with_bit(TRANSMIT_OPTION_EXPLORE, explore)
    }

    fn with_bit(self, bit: u8, value: bool) -> Self {
        if value {
            Self(self.0 | bit)
        } else {
            Self(self.0 & !bit)
        }
    }
}

impl Parsable for TransmitOptions {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        map(be_u8, TransmitOptions)(i)
    }
}

impl Serializable for TransmitOptions {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u8(self.0)
    }
}

impl std::fmt::Display for TransmitOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = Vec::new();
        if self.0 & TRANSMIT_OPTION_ACK != 0 {
            names.push("ACK");
        }
        if self.0 & TRANSMIT_OPTION_LOW_POWER != 0 {
            names.push("low power");
        }
        if self.0 & TRANSMIT_OPTION_AUTO_ROUTE != 0 {
            names.push("auto route");
        }
        if self.0 & TRANSMIT_OPTION_NO_ROUTE != 0 {
            names.push("no route");
        }
        if self.0 & TRANSMIT_OPTION_EXPLORE != 0 {
            names.push("explore");
        }
        write!(f, "{}", names.join(", "))
    }
}

#[test]
fn test_ack_and_auto_route() {
    let options = TransmitOptions::new().ack(true).auto_route(true);
    assert_eq!(options.try_to_vec().unwrap(), vec![0x05]);
}
