use cookie_factory as cf;
use nom::number::complete::be_u8;
use std::fmt::Display;
use zw_core::encoding::{self, Parsable, Serializable};

/// A boolean value in a Set-type command: `0x00` or `0xff` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySet(pub bool);

impl From<bool> for BinarySet {
    fn from(val: bool) -> Self {
        Self(val)
    }
}

impl Serializable for BinarySet {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u8(if self.0 { 0xff } else { 0x00 })
    }
}

/// A boolean value in a Report-type command. Nodes may report `0xfe` when
/// the current state is unknown. All other values besides `0x00`/`0xff` are
/// invalid and fail the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryReport {
    Off,
    On,
    Unknown,
}

impl BinaryReport {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Off => Some(false),
            Self::On => Some(true),
            Self::Unknown => None,
        }
    }
}

impl Parsable for BinaryReport {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (rest, raw) = be_u8(i)?;
        let value = match raw {
            0x00 => Self::Off,
            0xff => Self::On,
            0xfe => Self::Unknown,
            _ => {
                return Err(nom::Err::Error(encoding::NomError::validation_failure(
                    i,
                    format!("Invalid binary report value: {:#04x}", raw),
                )));
            }
        };
        Ok((rest, value))
    }
}

impl Serializable for BinaryReport {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u8(match self {
            Self::Off => 0x00,
            Self::On => 0xff,
            Self::Unknown => 0xfe,
        })
    }
}

impl Display for BinaryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::On => write!(f, "on"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A multilevel value in a Report-type command: a level between 0 and 99,
/// `0xff` ("on", legacy) or `0xfe` (unknown)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelReport {
    Level(u8),
    On,
    Unknown,
}

impl LevelReport {
    /// Interprets the value as a boolean where any nonzero level is "on"
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Level(level) => Some(*level > 0),
            Self::On => Some(true),
            Self::Unknown => None,
        }
    }
}

impl Parsable for LevelReport {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (rest, raw) = be_u8(i)?;
        let value = match raw {
            0x00..=0x63 => Self::Level(raw),
            0xff => Self::On,
            0xfe => Self::Unknown,
            _ => {
                return Err(nom::Err::Error(encoding::NomError::validation_failure(
                    i,
                    format!("Invalid level report value: {:#04x}", raw),
                )));
            }
        };
        Ok((rest, value))
    }
}

impl Serializable for LevelReport {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u8(match self {
            Self::Level(level) => *level,
            Self::On => 0xff,
            Self::Unknown => 0xfe,
        })
    }
}

impl Display for LevelReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Level(level) => write!(f, "{} %", level),
            Self::On => write!(f, "on"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A multilevel value in a Set-type command: a level between 0 and 99 or
/// `0xff` for "restore previous / fully on"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSet(u8);

impl LevelSet {
    pub fn new(level: u8) -> Self {
        // Clamp into the valid range, keeping 0xff as the special "on" value
        match level {
            0x64..=0xfe => Self(0x63),
            level => Self(level),
        }
    }

    pub fn on() -> Self {
        Self(0xff)
    }

    pub fn off() -> Self {
        Self(0x00)
    }
}

impl Serializable for LevelSet {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u8(self.0)
    }
}

/// A transition duration in a Report-type command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationReport(u8);

impl DurationReport {
    pub fn raw(&self) -> u8 {
        self.0
    }

    /// The reported duration in seconds, if it is known
    pub fn seconds(&self) -> Option<u32> {
        match self.0 {
            0x00..=0x7f => Some(self.0 as u32),
            0x80..=0xfd => Some((self.0 as u32 - 0x7f) * 60),
            _ => None,
        }
    }
}

impl Parsable for DurationReport {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, raw) = be_u8(i)?;
        Ok((i, Self(raw)))
    }
}

impl Serializable for DurationReport {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        cf::bytes::be_u8(self.0)
    }
}

/// A two-part version as reported by the Version CC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionNumber {
    pub major: u8,
    pub minor: u8,
}

impl Parsable for VersionNumber {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, major) = be_u8(i)?;
        let (i, minor) = be_u8(i)?;
        Ok((i, Self { major, minor }))
    }
}

impl Serializable for VersionNumber {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::{bytes::be_u8, sequence::tuple};
        tuple((be_u8(self.major), be_u8(self.minor)))
    }
}

impl Display for VersionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_binary_report_rejects_invalid() {
        // Anything between 0x01 and 0xfd is not a valid binary report
        assert!(BinaryReport::try_from_slice(&[0x42]).is_err());
        assert_eq!(
            BinaryReport::try_from_slice(&[0xff]).unwrap(),
            BinaryReport::On
        );
    }

    #[test]
    fn test_duration_seconds() {
        assert_eq!(DurationReport(0x05).seconds(), Some(5));
        assert_eq!(DurationReport(0x81).seconds(), Some(120));
        assert_eq!(DurationReport(0xfe).seconds(), None);
    }
}
