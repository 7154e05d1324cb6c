use std::fmt::Display;

/// The data rates a node can communicate with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DataRate {
    DataRate9k6,
    DataRate40k,
    DataRate100k,
}

impl Display for DataRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataRate9k6 => write!(f, "9.6 kbit/s"),
            Self::DataRate40k => write!(f, "40 kbit/s"),
            Self::DataRate100k => write!(f, "100 kbit/s"),
        }
    }
}
