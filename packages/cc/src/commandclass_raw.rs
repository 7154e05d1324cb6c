use cookie_factory as cf;
use nom::{combinator::rest, number::complete::be_u8};
use std::fmt::Debug;
use zw_core::encoding::{self, Parsable, Serializable, encoders::empty};
use zw_core::prelude::*;

/// The undecoded payload of an application-layer frame: command class,
/// CC-specific command and parameters, independent of the serial transport.
#[derive(Clone, PartialEq)]
pub struct CCRaw {
    pub cc_id: CommandClasses,
    pub cc_command: Option<u8>,
    pub payload: Vec<u8>,
}

impl Debug for CCRaw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CCRaw")
            .field("cc_id", &self.cc_id)
            .field("cc_command", &self.cc_command.map(|c| format!("{:#04x}", c)))
            .field("payload", &format_args!("0x{}", hex::encode(&self.payload)))
            .finish()
    }
}

impl Parsable for CCRaw {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, cc_id) = CommandClasses::parse(i)?;

        // All CCs except NoOperation have a CC command
        let (i, cc_command) = match cc_id {
            CommandClasses::NoOperation => (i, None),
            _ => {
                let (i, cc_command) = be_u8(i)?;
                (i, Some(cc_command))
            }
        };
        let (i, payload) = rest(i)?;

        Ok((
            i,
            Self {
                cc_id,
                cc_command,
                payload: payload.to_vec(),
            },
        ))
    }
}

impl Serializable for CCRaw {
    fn serialize<'a, W: std::io::Write + 'a>(&'a self) -> impl cf::SerializeFn<W> + 'a {
        use cf::{bytes::be_u8, combinator::slice, sequence::tuple};
        tuple((
            self.cc_id.serialize(),
            move |out| match self.cc_command {
                Some(cc_command) => be_u8(cc_command)(out),
                None => empty()(out),
            },
            slice(&self.payload),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        // Binary Switch Report, on
        let input = hex::decode("2503ff").unwrap();
        let raw = CCRaw::try_from_slice(&input).unwrap();
        assert_eq!(raw.cc_id, CommandClasses::BinarySwitch);
        assert_eq!(raw.cc_command, Some(0x03));
        assert_eq!(raw.payload, vec![0xff]);
    }

    #[test]
    fn test_parse_no_operation() {
        // NoOperation has neither a command nor a payload
        let input = [0x00];
        let raw = CCRaw::try_from_slice(&input).unwrap();
        assert_eq!(raw.cc_id, CommandClasses::NoOperation);
        assert_eq!(raw.cc_command, None);
        assert!(raw.payload.is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let raw = CCRaw {
            cc_id: CommandClasses::Basic,
            cc_command: Some(0x01),
            payload: vec![0x63],
        };
        let serialized = raw.try_to_vec().unwrap();
        assert_eq!(serialized, hex::decode("200163").unwrap());
        assert_eq!(CCRaw::try_from_slice(&serialized).unwrap(), raw);
    }
}
