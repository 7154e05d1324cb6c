use crate::encoding::{self, Parsable, Serializable};
use cookie_factory as cf;
use nom::{combinator::map, error::context, number::complete::be_u8};
use std::cmp::Ordering;
use std::fmt::Display;

/// Marker byte separating supported from controlled CCs in a node information frame
pub const COMMAND_CLASS_SUPPORT_CONTROL_MARK: u8 = 0xef;

/// Identifies a Command Class. The mapping is total: IDs this library has no
/// implementation for are preserved as `Unknown`, so they can still be
/// routed, logged and queried for their version.
#[derive(Debug, Clone, Copy)]
pub enum CommandClasses {
    NoOperation,
    Basic,
    BinarySwitch,
    MultilevelSwitch,
    BinarySensor,
    MultilevelSensor,
    Meter,
    ThermostatSetpoint,
    DoorLock,
    Configuration,
    Notification,
    ManufacturerSpecific,
    PowerLevel,
    Battery,
    WakeUp,
    Association,
    Version,
    Security,
    Security2,
    Unknown(u8),
}

impl CommandClasses {
    /// The wire representation of this CC
    pub fn id(&self) -> u8 {
        match self {
            Self::NoOperation => 0x00,
            Self::Basic => 0x20,
            Self::BinarySwitch => 0x25,
            Self::MultilevelSwitch => 0x26,
            Self::BinarySensor => 0x30,
            Self::MultilevelSensor => 0x31,
            Self::Meter => 0x32,
            Self::ThermostatSetpoint => 0x43,
            Self::DoorLock => 0x62,
            Self::Configuration => 0x70,
            Self::Notification => 0x71,
            Self::ManufacturerSpecific => 0x72,
            Self::PowerLevel => 0x73,
            Self::Battery => 0x80,
            Self::WakeUp => 0x84,
            Self::Association => 0x85,
            Self::Version => 0x86,
            Self::Security => 0x98,
            Self::Security2 => 0x9f,
            Self::Unknown(id) => *id,
        }
    }
}

impl From<u8> for CommandClasses {
    fn from(id: u8) -> Self {
        match id {
            0x00 => Self::NoOperation,
            0x20 => Self::Basic,
            0x25 => Self::BinarySwitch,
            0x26 => Self::MultilevelSwitch,
            0x30 => Self::BinarySensor,
            0x31 => Self::MultilevelSensor,
            0x32 => Self::Meter,
            0x43 => Self::ThermostatSetpoint,
            0x62 => Self::DoorLock,
            0x70 => Self::Configuration,
            0x71 => Self::Notification,
            0x72 => Self::ManufacturerSpecific,
            0x73 => Self::PowerLevel,
            0x80 => Self::Battery,
            0x84 => Self::WakeUp,
            0x85 => Self::Association,
            0x86 => Self::Version,
            0x98 => Self::Security,
            0x9f => Self::Security2,
            id => Self::Unknown(id),
        }
    }
}

impl From<CommandClasses> for u8 {
    fn from(cc: CommandClasses) -> Self {
        cc.id()
    }
}

// Equality and ordering follow the numeric CC ID, so ordered collections and
// the interview tie-break are deterministic on the wire representation, and
// a round-tripped `Unknown` compares equal to its named counterpart
impl PartialEq for CommandClasses {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for CommandClasses {}

impl std::hash::Hash for CommandClasses {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl Ord for CommandClasses {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

impl PartialOrd for CommandClasses {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for CommandClasses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(id) => write!(f, "Unknown CC ({:#04x})", id),
            Self::NoOperation => write!(f, "No Operation"),
            Self::BinarySwitch => write!(f, "Binary Switch"),
            Self::MultilevelSwitch => write!(f, "Multilevel Switch"),
            Self::BinarySensor => write!(f, "Binary Sensor"),
            Self::MultilevelSensor => write!(f, "Multilevel Sensor"),
            Self::ThermostatSetpoint => write!(f, "Thermostat Setpoint"),
            Self::DoorLock => write!(f, "Door Lock"),
            Self::ManufacturerSpecific => write!(f, "Manufacturer Specific"),
            Self::PowerLevel => write!(f, "Powerlevel"),
            Self::WakeUp => write!(f, "Wake Up"),
            Self::Security2 => write!(f, "Security 2"),
            other => write!(f, "{:?}", other),
        }
    }
}

impl Parsable for CommandClasses {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        context("CommandClasses", map(be_u8, CommandClasses::from))(i)
    }
}

impl Serializable for CommandClasses {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u8(self.id())
    }
}

pub mod cc_list {
    use super::*;
    use nom::bytes::complete::take as take_bytes;

    /// Parses a CC list with the given length into supported and controlled
    /// CCs, separated by the support/control marker
    pub fn fixed_length_cc_list(
        i: encoding::Input,
        len: usize,
    ) -> encoding::ParseResult<(Vec<CommandClasses>, Vec<CommandClasses>)> {
        let (i, raw) = take_bytes(len)(i)?;

        let mut supported = Vec::new();
        let mut controlled = Vec::new();
        let mut after_mark = false;
        for &byte in raw {
            if byte == COMMAND_CLASS_SUPPORT_CONTROL_MARK {
                after_mark = true;
            } else if after_mark {
                controlled.push(CommandClasses::from(byte));
            } else {
                supported.push(CommandClasses::from(byte));
            }
        }

        Ok((i, (supported, controlled)))
    }

    #[test]
    fn test_fixed_length_cc_list() {
        let input = [0x25, 0x86, 0xef, 0x20, 0xff];
        let (rest, (supported, controlled)) = fixed_length_cc_list(&input, 4).unwrap();
        assert_eq!(
            supported,
            vec![CommandClasses::BinarySwitch, CommandClasses::Version]
        );
        assert_eq!(controlled, vec![CommandClasses::Basic]);
        assert_eq!(rest, &[0xff]);
    }
}
