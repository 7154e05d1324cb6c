use crate::commandclass::{CCId, CCRequest};
use crate::commandclass_raw::CCRaw;
use crate::values::VersionNumber;
use cookie_factory as cf;
use derive_try_from_primitive::*;
use nom::{
    combinator::opt,
    multi::count,
    number::complete::be_u8,
};
use zw_core::encoding::{self, NomTryFromPrimitive, Parsable, Serializable, encoders::empty};
use zw_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum VersionCCCommand {
    Get = 0x11,
    Report = 0x12,
    CommandClassGet = 0x13,
    CommandClassReport = 0x14,
}

/// The protocol library a node's firmware is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ZWaveLibraryType {
    Unknown = 0x00,
    StaticController = 0x01,
    Controller = 0x02,
    EnhancedSlave = 0x03,
    Slave = 0x04,
    Installer = 0x05,
    RoutingSlave = 0x06,
    BridgeController = 0x07,
    DeviceUnderTest = 0x08,
    AvRemote = 0x0a,
    AvDevice = 0x0b,
}

impl NomTryFromPrimitive for ZWaveLibraryType {
    type Repr = u8;

    fn format_error(repr: Self::Repr) -> String {
        format!("Unknown library type: {:#04x}", repr)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VersionCCGet {}

impl CCId for VersionCCGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Version
    }

    fn cc_command(&self) -> Option<u8> {
        Some(VersionCCCommand::Get as _)
    }
}

impl CCRequest for VersionCCGet {
    fn expects_report(&self) -> bool {
        true
    }

    fn test_report(&self, report: &CCRaw) -> bool {
        report.cc_id == CommandClasses::Version
            && report.cc_command == Some(VersionCCCommand::Report as _)
    }
}

impl Serializable for VersionCCGet {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        empty()
    }
}

/// A node's firmware version report. V1 carries the library type, protocol
/// version and a single firmware version; V2 appends the hardware version
/// and additional firmware targets, detected by the payload length.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionCCReport {
    pub library_type: ZWaveLibraryType,
    pub protocol_version: VersionNumber,
    pub firmware_versions: Vec<VersionNumber>,
    pub hardware_version: Option<u8>,
}

impl CCId for VersionCCReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Version
    }

    fn cc_command(&self) -> Option<u8> {
        Some(VersionCCCommand::Report as _)
    }
}

impl Parsable for VersionCCReport {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, library_type) = nom::combinator::map_res(
            be_u8,
            ZWaveLibraryType::try_from_primitive,
        )(i)?;
        let (i, protocol_version) = VersionNumber::parse(i)?;
        let (i, firmware0_version) = VersionNumber::parse(i)?;
        // V2 fields
        let (i, hardware_version) = opt(be_u8)(i)?;
        let (i, additional_targets) = opt(be_u8)(i)?;
        let (i, mut additional_versions) = match additional_targets {
            Some(n) => count(VersionNumber::parse, n as usize)(i)?,
            None => (i, Vec::new()),
        };

        let mut firmware_versions = vec![firmware0_version];
        firmware_versions.append(&mut additional_versions);

        Ok((
            i,
            Self {
                library_type,
                protocol_version,
                firmware_versions,
                hardware_version,
            },
        ))
    }
}

impl Serializable for VersionCCReport {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::{bytes::be_u8, multi::all, sequence::tuple};
        move |out| {
            let v1 = tuple((
                be_u8(self.library_type as u8),
                self.protocol_version.serialize(),
                self.firmware_versions[0].serialize(),
            ));
            match self.hardware_version {
                Some(hardware_version) => tuple((
                    v1,
                    be_u8(hardware_version),
                    be_u8(self.firmware_versions.len() as u8 - 1),
                    all(self.firmware_versions[1..].iter().map(|v| v.serialize())),
                ))(out),
                None => v1(out),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VersionCCCommandClassGet {
    pub requested_cc: CommandClasses,
}

impl VersionCCCommandClassGet {
    pub fn new(requested_cc: CommandClasses) -> Self {
        Self { requested_cc }
    }
}

impl CCId for VersionCCCommandClassGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Version
    }

    fn cc_command(&self) -> Option<u8> {
        Some(VersionCCCommand::CommandClassGet as _)
    }
}

impl CCRequest for VersionCCCommandClassGet {
    fn expects_report(&self) -> bool {
        true
    }

    fn test_report(&self, report: &CCRaw) -> bool {
        // The report echoes the requested CC in its first payload byte
        report.cc_id == CommandClasses::Version
            && report.cc_command == Some(VersionCCCommand::CommandClassReport as _)
            && report.payload.first() == Some(&self.requested_cc.id())
    }
}

impl Serializable for VersionCCCommandClassGet {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        self.requested_cc.serialize()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VersionCCCommandClassReport {
    pub requested_cc: CommandClasses,
    /// The version the node implements, 0 if the CC is not supported
    pub version: u8,
}

impl CCId for VersionCCCommandClassReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Version
    }

    fn cc_command(&self) -> Option<u8> {
        Some(VersionCCCommand::CommandClassReport as _)
    }
}

impl Parsable for VersionCCCommandClassReport {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, requested_cc) = CommandClasses::parse(i)?;
        let (i, version) = be_u8(i)?;
        Ok((
            i,
            Self {
                requested_cc,
                version,
            },
        ))
    }
}

impl Serializable for VersionCCCommandClassReport {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::{bytes::be_u8, sequence::tuple};
        tuple((self.requested_cc.serialize(), be_u8(self.version)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_report_v1() {
        // Routing slave, protocol 4.33, firmware 1.2
        let input = hex::decode("0604210102").unwrap();
        let report = VersionCCReport::try_from_slice(&input).unwrap();
        assert_eq!(report.library_type, ZWaveLibraryType::RoutingSlave);
        assert_eq!(report.protocol_version.to_string(), "4.33");
        assert_eq!(report.firmware_versions.len(), 1);
        assert_eq!(report.hardware_version, None);
    }

    #[test]
    fn test_parse_report_v2_by_length() {
        // V1 fields + hardware version 3, one additional firmware target 2.5
        let input = vec![0x06, 0x04, 0x21, 0x01, 0x02, 0x03, 0x01, 0x02, 0x05];
        let report = VersionCCReport::try_from_slice(&input).unwrap();
        assert_eq!(report.hardware_version, Some(3));
        assert_eq!(report.firmware_versions.len(), 2);
        assert_eq!(report.firmware_versions[1].to_string(), "2.5");
    }

    #[test]
    fn test_command_class_get_roundtrip() {
        use crate::commandclass::AsCCRaw;

        let get = VersionCCCommandClassGet::new(CommandClasses::BinarySwitch);
        let raw = get.as_raw().unwrap();
        assert_eq!(raw.try_to_vec().unwrap(), hex::decode("861325").unwrap());

        let report =
            VersionCCCommandClassReport::try_from_slice(&hex::decode("2502").unwrap()).unwrap();
        assert_eq!(report.requested_cc, CommandClasses::BinarySwitch);
        assert_eq!(report.version, 2);
        assert!(get.test_report(&CCRaw {
            cc_id: CommandClasses::Version,
            cc_command: Some(VersionCCCommand::CommandClassReport as _),
            payload: hex::decode("2502").unwrap(),
        }));
    }
}
