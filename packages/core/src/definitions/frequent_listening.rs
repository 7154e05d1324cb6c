use std::fmt::Display;

/// The wakeup beam interval of a frequently listening (FLiRS) node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequentListening {
    Every1000ms,
    Every250ms,
}

impl Display for FrequentListening {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Every1000ms => write!(f, "every 1000 ms"),
            Self::Every250ms => write!(f, "every 250 ms"),
        }
    }
}
