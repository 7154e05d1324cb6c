use crate::commandclass_raw::CCRaw;
use zw_core::encoding::{EncodingResult, Serializable};
use zw_core::prelude::*;
use zw_core::submodule;

submodule!(basic);
submodule!(binary_switch);
submodule!(no_operation);
submodule!(version);

/// Identifies a command class and the command within it
pub trait CCId {
    /// The command class identifier
    fn cc_id(&self) -> CommandClasses;

    /// The subcommand identifier. Only `NoOperation` has none.
    fn cc_command(&self) -> Option<u8>;
}

/// Conversion of a typed CC command into its wire representation
pub trait AsCCRaw {
    fn as_raw(&self) -> EncodingResult<CCRaw>;
}

impl<T> AsCCRaw for T
where
    T: CCId + Serializable,
{
    fn as_raw(&self) -> EncodingResult<CCRaw> {
        Ok(CCRaw {
            cc_id: self.cc_id(),
            cc_command: self.cc_command(),
            payload: self.try_to_vec()?,
        })
    }
}

/// Query-type CC commands declare which report answers them
pub trait CCRequest: CCId {
    /// Whether this command expects a report from the node
    fn expects_report(&self) -> bool {
        false
    }

    /// Whether the given raw frame is the report answering this command
    fn test_report(&self, report: &CCRaw) -> bool {
        let _ = report;
        false
    }
}
