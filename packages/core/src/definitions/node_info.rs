use super::{
    CommandClasses, DataRate, FrequentListening, NodeType, ProtocolVersion, cc_list,
};
use crate::encoding::{self, Parsable};
use nom::{
    combinator::cond,
    number::complete::be_u8,
};

/// The protocol-level information the controller stores about a node:
/// listening behavior, supported data rates and device classes.
/// Reported by `GetNodeProtocolInfo`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInformationProtocolData {
    /// Whether this node is always listening
    pub listening: bool,
    /// Whether this node is frequently listening, and if yes, with which interval
    pub frequent_listening: Option<FrequentListening>,
    /// Whether the node supports routing/forwarding messages
    pub routing: bool,
    /// Which data rates the node supports
    pub supported_data_rates: Vec<DataRate>,
    /// The protocol version this node implements
    pub protocol_version: ProtocolVersion,
    /// Whether this node supports additional CCs besides the mandatory minimum
    pub optional_functionality: bool,
    /// Whether this node is a controller or an end node
    pub node_type: NodeType,
    /// Whether this node supports secure communication
    pub supports_security: bool,
    /// Whether the node can wake up FLiRS nodes
    pub beaming: bool,
    /// Which basic device class is implemented by this node
    pub basic_device_class: u8,
    /// Which generic device class is implemented by this node
    pub generic_device_class: u8,
    /// Which specific device class is implemented by this node
    pub specific_device_class: u8,
}

// Capability byte (byte 0)
const CAPABILITY_LISTENING: u8 = 0b1000_0000;
const CAPABILITY_ROUTING: u8 = 0b0100_0000;
const CAPABILITY_SPEED_40K: u8 = 0b0001_0000;
const CAPABILITY_SPEED_9K6: u8 = 0b0000_1000;
const CAPABILITY_PROTOCOL_VERSION_MASK: u8 = 0b0000_0111;

// Security byte (byte 1)
const SECURITY_OPTIONAL_FUNCTIONALITY: u8 = 0b1000_0000;
const SECURITY_SENSOR_1000MS: u8 = 0b0100_0000;
const SECURITY_SENSOR_250MS: u8 = 0b0010_0000;
const SECURITY_BEAM_CAPABILITY: u8 = 0b0001_0000;
const SECURITY_END_NODE: u8 = 0b0000_1000;
const SECURITY_SUPPORTS_SECURITY: u8 = 0b0000_0001;

// Reserved byte (byte 2)
const RESERVED_SPEED_100K: u8 = 0b0000_0001;

impl Parsable for NodeInformationProtocolData {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        let (i, capability) = be_u8(i)?;
        let (i, security) = be_u8(i)?;
        let (i, reserved) = be_u8(i)?;
        let (i, basic_device_class) = be_u8(i)?;
        let (i, generic_device_class) = be_u8(i)?;
        let (i, specific_device_class) = be_u8(i)?;

        let mut supported_data_rates = Vec::new();
        if reserved & RESERVED_SPEED_100K != 0 {
            supported_data_rates.push(DataRate::DataRate100k);
        }
        if capability & CAPABILITY_SPEED_40K != 0 {
            supported_data_rates.push(DataRate::DataRate40k);
        }
        if capability & CAPABILITY_SPEED_9K6 != 0 {
            supported_data_rates.push(DataRate::DataRate9k6);
        }

        let frequent_listening = if security & SECURITY_SENSOR_1000MS != 0 {
            Some(FrequentListening::Every1000ms)
        } else if security & SECURITY_SENSOR_250MS != 0 {
            Some(FrequentListening::Every250ms)
        } else {
            None
        };

        Ok((
            i,
            Self {
                listening: capability & CAPABILITY_LISTENING != 0,
                frequent_listening,
                routing: capability & CAPABILITY_ROUTING != 0,
                supported_data_rates,
                protocol_version: ProtocolVersion::new(
                    capability & CAPABILITY_PROTOCOL_VERSION_MASK,
                ),
                optional_functionality: security & SECURITY_OPTIONAL_FUNCTIONALITY != 0,
                node_type: if security & SECURITY_END_NODE != 0 {
                    NodeType::EndNode
                } else {
                    NodeType::Controller
                },
                supports_security: security & SECURITY_SUPPORTS_SECURITY != 0,
                beaming: security & SECURITY_BEAM_CAPABILITY != 0,
                basic_device_class,
                generic_device_class,
                specific_device_class,
            },
        ))
    }
}

/// The application-level information a node advertises about itself in its
/// node information frame, most importantly the supported command classes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInformationApplicationData {
    pub basic_device_class: u8,
    pub generic_device_class: u8,
    pub specific_device_class: u8,
    /// Which command classes are supported by this node
    pub supported_command_classes: Vec<CommandClasses>,
    /// Which command classes this node can control in other nodes
    pub controlled_command_classes: Vec<CommandClasses>,
}

impl Parsable for NodeInformationApplicationData {
    fn parse(i: encoding::Input) -> encoding::ParseResult<Self> {
        // The specs call this the CC list length, but it includes the device class bytes
        let (i, remaining_len) = be_u8(i)?;
        let (i, basic_device_class) = be_u8(i)?;
        let (i, generic_device_class) = be_u8(i)?;
        let (i, specific_device_class) = be_u8(i)?;
        let cc_len = (remaining_len as usize).saturating_sub(3);
        let (i, ccs) = cond(cc_len > 0, |i| cc_list::fixed_length_cc_list(i, cc_len))(i)?;
        let (supported_command_classes, controlled_command_classes) = ccs.unwrap_or_default();

        Ok((
            i,
            Self {
                basic_device_class,
                generic_device_class,
                specific_device_class,
                supported_command_classes,
                controlled_command_classes,
            },
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_protocol_data() {
        // listening + routing + 40k + 9.6k, protocol version 3,
        // optional functionality, beaming, end node, security,
        // 100k, binary switch device classes
        let input = hex::decode("db9d01041001").unwrap();
        let (_, data) = NodeInformationProtocolData::parse(&input).unwrap();

        assert!(data.listening);
        assert!(data.routing);
        assert!(data.optional_functionality);
        assert!(data.beaming);
        assert!(data.supports_security);
        assert_eq!(data.frequent_listening, None);
        assert_eq!(data.node_type, NodeType::EndNode);
        assert_eq!(data.protocol_version.raw(), 3);
        assert_eq!(
            data.supported_data_rates,
            vec![
                DataRate::DataRate100k,
                DataRate::DataRate40k,
                DataRate::DataRate9k6
            ]
        );
        assert_eq!(data.basic_device_class, 0x04);
        assert_eq!(data.generic_device_class, 0x10);
        assert_eq!(data.specific_device_class, 0x01);
    }

    #[test]
    fn test_parse_application_data() {
        // len 6 = 3 device class bytes + 3 CC bytes
        let input = hex::decode("06041001258672").unwrap();
        let (_, data) = NodeInformationApplicationData::parse(&input).unwrap();

        assert_eq!(data.generic_device_class, 0x10);
        assert_eq!(
            data.supported_command_classes,
            vec![
                CommandClasses::BinarySwitch,
                CommandClasses::Version,
                CommandClasses::ManufacturerSpecific
            ]
        );
        assert!(data.controlled_command_classes.is_empty());
    }
}
