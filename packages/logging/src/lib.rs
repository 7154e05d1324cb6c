use std::borrow::Cow;
use time::OffsetDateTime;
use typed_builder::TypedBuilder;
use zw_core::log::LogPayload;
use zw_core::submodule;

pub mod loggers;

submodule!(console);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Verbose,
    Debug,
    Silly,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    None,
    Inbound,
    Outbound,
}

impl Direction {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::None => "  ",
            Self::Inbound => "« ",
            Self::Outbound => "» ",
        }
    }
}

/// A single structured log record
#[derive(Debug, Clone, TypedBuilder)]
pub struct LogInfo {
    #[builder(default = OffsetDateTime::now_utc())]
    pub timestamp: OffsetDateTime,
    #[builder(default)]
    pub direction: Direction,
    pub label: &'static str,
    #[builder(default, setter(strip_option))]
    pub primary_tags: Option<Vec<Cow<'static, str>>>,
    #[builder(default, setter(strip_option))]
    pub secondary_tag: Option<Cow<'static, str>>,
    pub payload: LogPayload,
}

/// A logger that does not require mutability. Typically an abstraction over
/// a channel to the thread doing the actual writing.
pub trait ImmutableLogger: Send + Sync {
    fn log(&self, log: LogInfo, level: Loglevel);

    fn log_level(&self) -> Loglevel;
    fn set_log_level(&self, level: Loglevel);
}
