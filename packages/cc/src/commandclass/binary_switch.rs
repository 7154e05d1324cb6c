use crate::commandclass::{CCId, CCRequest};
use crate::commandclass_raw::CCRaw;
use crate::values::{BinaryReport, BinarySet, DurationReport};
use cookie_factory as cf;
use derive_try_from_primitive::*;
use nom::combinator::{cond, opt};
use zw_core::encoding::{self, Parsable, Serializable, encoders::empty};
use zw_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum BinarySwitchCCCommand {
    Set = 0x01,
    Get = 0x02,
    Report = 0x03,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinarySwitchCCSet {
    pub target_value: BinarySet,
    /// Transition duration, supported by V2 nodes. V1 nodes ignore the
    /// extra byte.
    pub duration: Option<DurationReport>,
}

impl BinarySwitchCCSet {
    pub fn new(target_value: bool) -> Self {
        Self {
            target_value: target_value.into(),
            duration: None,
        }
    }
}

impl CCId for BinarySwitchCCSet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::BinarySwitch
    }

    fn cc_command(&self) -> Option<u8> {
        Some(BinarySwitchCCCommand::Set as _)
    }
}

impl CCRequest for BinarySwitchCCSet {}

impl Serializable for BinarySwitchCCSet {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::sequence::tuple;
        tuple((self.target_value.serialize(), self.duration.serialize()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BinarySwitchCCGet {}

impl CCId for BinarySwitchCCGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::BinarySwitch
    }

    fn cc_command(&self) -> Option<u8> {
        Some(BinarySwitchCCCommand::Get as _)
    }
}

impl CCRequest for BinarySwitchCCGet {
    fn expects_report(&self) -> bool {
        true
    }

    fn test_report(&self, report: &CCRaw) -> bool {
        report.cc_id == CommandClasses::BinarySwitch
            && report.cc_command == Some(BinarySwitchCCCommand::Report as _)
    }
}

impl Serializable for BinarySwitchCCGet {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        empty()
    }
}

/// A Binary Switch state report. V2 appends target value and duration,
/// detected by the payload length rather than the negotiated version.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinarySwitchCCReport {
    pub current_value: BinaryReport,
    pub target_value: Option<BinaryReport>,
    pub duration: Option<DurationReport>,
}

impl CCId for BinarySwitchCCReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::BinarySwitch
    }

    fn cc_command(&self) -> Option<u8> {
        Some(BinarySwitchCCCommand::Report as _)
    }
}

impl Parsable for BinarySwitchCCReport {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, current_value) = BinaryReport::parse(i)?;
        let (i, target_value) = opt(BinaryReport::parse)(i)?;
        let (i, duration) = cond(target_value.is_some(), opt(DurationReport::parse))(i)?;

        Ok((
            i,
            Self {
                current_value,
                target_value,
                duration: duration.flatten(),
            },
        ))
    }
}

impl Serializable for BinarySwitchCCReport {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::sequence::tuple;
        move |out| match (self.target_value, self.duration) {
            (Some(target_value), Some(duration)) => tuple((
                self.current_value.serialize(),
                target_value.serialize(),
                duration.serialize(),
            ))(out),
            _ => self.current_value.serialize()(out),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_serialize() {
        let cc = BinarySwitchCCSet::new(true);
        assert_eq!(cc.try_to_vec().unwrap(), vec![0xff]);

        let cc = BinarySwitchCCSet {
            target_value: false.into(),
            duration: Some(DurationReport::try_from_slice(&[0x05]).unwrap()),
        };
        assert_eq!(cc.try_to_vec().unwrap(), vec![0x00, 0x05]);
    }

    #[test]
    fn test_parse_report_v1() {
        let report = BinarySwitchCCReport::try_from_slice(&[0xff]).unwrap();
        assert_eq!(report.current_value, BinaryReport::On);
        assert_eq!(report.target_value, None);
    }

    #[test]
    fn test_parse_report_v2_by_length() {
        let report = BinarySwitchCCReport::try_from_slice(&[0x00, 0xff, 0x01]).unwrap();
        assert_eq!(report.current_value, BinaryReport::Off);
        assert_eq!(report.target_value, Some(BinaryReport::On));
        assert_eq!(report.duration.unwrap().seconds(), Some(1));
    }

    #[test]
    fn test_parse_report_invalid_value() {
        assert!(BinarySwitchCCReport::try_from_slice(&[0x42]).is_err());
    }
}
