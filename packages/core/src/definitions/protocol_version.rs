use std::fmt::Display;

/// The Z-Wave protocol generation a node implements, as reported in its
/// protocol info (3 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion(u8);

impl ProtocolVersion {
    pub fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u8 {
        self.0
    }
}

impl Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            1 => write!(f, "2.0"),
            2 => write!(f, "4.2x / 5.0x"),
            3 => write!(f, "4.5x / 6.0x"),
            raw => write!(f, "unknown ({})", raw),
        }
    }
}
