use super::{CCInterviewContext, CCInterviewResult, CommandClassApi};
use crate::driver::CommandClassState;
use futures::FutureExt;
use futures::future::BoxFuture;
use zw_cc::commandclass_raw::CCRaw;
use zw_core::prelude::*;

pub struct NoOperationCCApi;

impl CommandClassApi for NoOperationCCApi {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::NoOperation
    }

    fn implemented_version(&self) -> u8 {
        1
    }

    fn dependencies(&self) -> &'static [CommandClasses] {
        // Pings work without any prior knowledge
        &[]
    }

    fn is_command_supported(&self, _version: Option<u8>, _cc_command: u8) -> Option<bool> {
        // NoOperation has no commands, only the empty frame itself
        Some(false)
    }

    fn interview<'a>(&'a self, _ctx: &'a CCInterviewContext<'a>) -> BoxFuture<'a, CCInterviewResult> {
        async { Ok(()) }.boxed()
    }

    fn process_received(&self, _state: &mut CommandClassState, _frame: &CCRaw) {}
}
