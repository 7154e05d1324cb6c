use super::{CCInterviewContext, CCInterviewResult, CommandClassApi};
use crate::driver::CommandClassState;
use futures::FutureExt;
use futures::future::BoxFuture;
use zw_cc::commandclass_raw::CCRaw;
use zw_core::prelude::*;

/// The catch-all for command classes without a dedicated implementation:
/// accepts frames, drops them, reports no version.
pub struct NotImplementedCCApi;

impl CommandClassApi for NotImplementedCCApi {
    fn cc_id(&self) -> CommandClasses {
        // Never matched by the registry, only used as fallback
        CommandClasses::Unknown(0)
    }

    fn implemented_version(&self) -> u8 {
        0
    }

    fn is_command_supported(&self, _version: Option<u8>, _cc_command: u8) -> Option<bool> {
        None
    }

    fn interview<'a>(&'a self, _ctx: &'a CCInterviewContext<'a>) -> BoxFuture<'a, CCInterviewResult> {
        // Nothing to query
        async { Ok(()) }.boxed()
    }

    fn process_received(&self, _state: &mut CommandClassState, _frame: &CCRaw) {}
}
