pub use crate::command::{
    AsCommandRaw, Command, CommandBase, CommandId, CommandRequest, TryFromRawError,
};
pub use crate::command_raw::CommandRaw;
pub use crate::frame::{ControlFlow, RawSerialFrame};
