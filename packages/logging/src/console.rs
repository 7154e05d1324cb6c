use crate::{ImmutableLogger, LogInfo, Loglevel};
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use time::macros::format_description;

fn level_color(level: Loglevel) -> Option<Color> {
    match level {
        Loglevel::Error => Some(Color::Red),
        Loglevel::Warn => Some(Color::Yellow),
        Loglevel::Info => Some(Color::Green),
        Loglevel::Verbose => Some(Color::Cyan),
        Loglevel::Debug | Loglevel::Silly => None,
    }
}

fn level_to_u8(level: Loglevel) -> u8 {
    match level {
        Loglevel::Error => 0,
        Loglevel::Warn => 1,
        Loglevel::Info => 2,
        Loglevel::Verbose => 3,
        Loglevel::Debug => 4,
        Loglevel::Silly => 5,
    }
}

fn level_from_u8(raw: u8) -> Loglevel {
    match raw {
        0 => Loglevel::Error,
        1 => Loglevel::Warn,
        2 => Loglevel::Info,
        3 => Loglevel::Verbose,
        4 => Loglevel::Debug,
        _ => Loglevel::Silly,
    }
}

/// Writes log records to stderr, one line per payload line
pub struct ConsoleLogger {
    stream: Mutex<StandardStream>,
    level: AtomicU8,
}

impl ConsoleLogger {
    pub fn new(level: Loglevel) -> Self {
        Self {
            stream: Mutex::new(StandardStream::stderr(ColorChoice::Auto)),
            level: AtomicU8::new(level_to_u8(level)),
        }
    }
}

impl ImmutableLogger for ConsoleLogger {
    fn log(&self, log: LogInfo, level: Loglevel) {
        if level > self.log_level() {
            return;
        }

        let format = format_description!("[hour]:[minute]:[second].[subsecond digits:3]");
        let timestamp = log
            .timestamp
            .format(format)
            .unwrap_or_else(|_| String::new());

        let mut header = format!("{} {} {}", timestamp, log.label, log.direction.symbol());
        if let Some(tags) = &log.primary_tags {
            header.push_str(&format!("[{}] ", tags.join("][")));
        }
        if let Some(tag) = &log.secondary_tag {
            header.push_str(&format!("({}) ", tag));
        }

        let Ok(mut stream) = self.stream.lock() else {
            return;
        };
        let mut spec = ColorSpec::new();
        spec.set_fg(level_color(level));
        let _ = stream.set_color(&spec);

        let lines = log.payload.to_lines();
        if lines.is_empty() {
            let _ = writeln!(stream, "{}", header.trim_end());
        } else {
            for (index, line) in lines.iter().enumerate() {
                if index == 0 {
                    let _ = writeln!(stream, "{}{}", header, line);
                } else {
                    let _ = writeln!(stream, "{:width$}{}", "", line, width = timestamp.len() + 1);
                }
            }
        }
        let _ = stream.reset();
    }

    fn log_level(&self) -> Loglevel {
        level_from_u8(self.level.load(Ordering::Relaxed))
    }

    fn set_log_level(&self, level: Loglevel) {
        self.level.store(level_to_u8(level), Ordering::Relaxed);
    }
}
