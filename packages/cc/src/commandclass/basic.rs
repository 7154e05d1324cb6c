use crate::commandclass::{CCId, CCRequest};
use crate::commandclass_raw::CCRaw;
use crate::values::{DurationReport, LevelReport, LevelSet};
use cookie_factory as cf;
use derive_try_from_primitive::*;
use nom::combinator::{cond, opt};
use zw_core::encoding::{self, Parsable, Serializable, encoders::empty};
use zw_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum BasicCCCommand {
    Set = 0x01,
    Get = 0x02,
    Report = 0x03,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicCCSet {
    pub target_value: LevelSet,
}

impl CCId for BasicCCSet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Basic
    }

    fn cc_command(&self) -> Option<u8> {
        Some(BasicCCCommand::Set as _)
    }
}

impl CCRequest for BasicCCSet {}

impl Serializable for BasicCCSet {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        self.target_value.serialize()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BasicCCGet {}

impl CCId for BasicCCGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Basic
    }

    fn cc_command(&self) -> Option<u8> {
        Some(BasicCCCommand::Get as _)
    }
}

impl CCRequest for BasicCCGet {
    fn expects_report(&self) -> bool {
        true
    }

    fn test_report(&self, report: &CCRaw) -> bool {
        report.cc_id == CommandClasses::Basic
            && report.cc_command == Some(BasicCCCommand::Report as _)
    }
}

impl Serializable for BasicCCGet {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        empty()
    }
}

/// A Basic CC state report. V2 appends target value and duration; whether
/// they are present is detected by the payload length, so V2 nodes work
/// with a V1 parser and vice versa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicCCReport {
    pub current_value: LevelReport,
    pub target_value: Option<LevelReport>,
    pub duration: Option<DurationReport>,
}

impl CCId for BasicCCReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Basic
    }

    fn cc_command(&self) -> Option<u8> {
        Some(BasicCCCommand::Report as _)
    }
}

impl Parsable for BasicCCReport {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, current_value) = LevelReport::parse(i)?;
        let (i, target_value) = opt(LevelReport::parse)(i)?;
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

impl Serializable for BasicCCReport {
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
    fn test_parse_report_v1() {
        let input = [0x63];
        let report = BasicCCReport::try_from_slice(&input).unwrap();
        assert_eq!(report.current_value, LevelReport::Level(0x63));
        assert_eq!(report.target_value, None);
        assert_eq!(report.duration, None);
    }

    #[test]
    fn test_parse_report_v2_by_length() {
        // Same command ID as V1, but with target value and duration appended
        let input = [0x00, 0x63, 0x0a];
        let report = BasicCCReport::try_from_slice(&input).unwrap();
        assert_eq!(report.current_value, LevelReport::Level(0));
        assert_eq!(report.target_value, Some(LevelReport::Level(0x63)));
        assert_eq!(report.duration.unwrap().seconds(), Some(10));
    }

    #[test]
    fn test_parse_report_invalid_value() {
        // 0x80 is outside the defined range for levels
        assert!(BasicCCReport::try_from_slice(&[0x80]).is_err());
    }

    #[test]
    fn test_parse_report_with_unknown_extra_bytes() {
        // A frame from a newer version with bytes this parser does not know
        // about must still parse
        let input = [0x00, 0x63, 0x0a, 0x42];
        assert!(BasicCCReport::try_from_slice(&input).is_ok());
    }
}
