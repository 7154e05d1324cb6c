pub mod checksum;
pub mod definitions;
pub mod encoding;
pub mod log;
pub mod prelude;
pub mod util;
pub mod wrapping_counter;
