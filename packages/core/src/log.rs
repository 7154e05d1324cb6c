use std::borrow::Cow;
use std::fmt::Display;

/// Structured content of a log message: either free-form text lines or an
/// ordered list of key/value entries.
#[derive(Debug, Clone, Default)]
pub enum LogPayload {
    #[default]
    Empty,
    Text(Cow<'static, str>),
    Dict(LogPayloadDict),
}

impl LogPayload {
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Renders the payload into individual output lines
    pub fn to_lines(&self) -> Vec<String> {
        match self {
            Self::Empty => vec![],
            Self::Text(text) => text.lines().map(ToOwned::to_owned).collect(),
            Self::Dict(dict) => dict
                .entries
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .collect(),
        }
    }
}

impl<T> From<T> for LogPayload
where
    T: Into<Cow<'static, str>>,
{
    fn from(text: T) -> Self {
        Self::Text(text.into())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogPayloadDict {
    entries: Vec<(Cow<'static, str>, String)>,
}

impl LogPayloadDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Display,
    ) -> Self {
        self.entries.push((key.into(), value.to_string()));
        self
    }

    pub fn extend(mut self, other: LogPayloadDict) -> Self {
        self.entries.extend(other.entries);
        self
    }
}

impl From<LogPayloadDict> for LogPayload {
    fn from(dict: LogPayloadDict) -> Self {
        Self::Dict(dict)
    }
}

pub trait ToLogPayload {
    fn to_log_payload(&self) -> LogPayload;
}
