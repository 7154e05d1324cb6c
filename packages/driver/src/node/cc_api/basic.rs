use super::{CCInterviewContext, CCInterviewError, CCInterviewResult, CommandClassApi};
use crate::driver::{CacheValue, CommandClassState};
use futures::FutureExt;
use futures::future::BoxFuture;
use zw_cc::commandclass::{BasicCCCommand, BasicCCGet, BasicCCReport};
use zw_cc::commandclass_raw::CCRaw;
use zw_cc::values::LevelReport;
use zw_core::encoding::Parsable;
use zw_core::prelude::*;

pub const CURRENT_VALUE: &str = "currentValue";
pub const TARGET_VALUE: &str = "targetValue";
pub const DURATION: &str = "duration";

fn level_to_cache_value(level: LevelReport) -> Option<CacheValue> {
    match level {
        LevelReport::Level(value) => Some(CacheValue::U8(value)),
        LevelReport::On => Some(CacheValue::U8(0xff)),
        LevelReport::Unknown => None,
    }
}

pub struct BasicCCApi;

impl CommandClassApi for BasicCCApi {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Basic
    }

    fn implemented_version(&self) -> u8 {
        2
    }

    fn is_command_supported(&self, _version: Option<u8>, cc_command: u8) -> Option<bool> {
        Some(BasicCCCommand::try_from(cc_command).is_ok())
    }

    fn interview<'a>(&'a self, ctx: &'a CCInterviewContext<'a>) -> BoxFuture<'a, CCInterviewResult> {
        async move {
            if ctx.cancel.is_cancelled() {
                return Err(CCInterviewError::Cancelled);
            }

            ctx.log().verbose(|| "querying Basic state...".to_string());
            let report = ctx
                .driver
                .exec_node_command(ctx.node_id, &BasicCCGet::default(), &ctx.cancel)
                .await?;

            if let Some(report) = report {
                ctx.driver.storage().write_node(ctx.node_id, |node| {
                    if let Some(state) = node.cc_state.get_mut(&CommandClasses::Basic) {
                        self.process_received(state, &report);
                    }
                });
            }

            Ok(())
        }
        .boxed()
    }

    fn process_received(&self, state: &mut CommandClassState, frame: &CCRaw) {
        if frame.cc_command != Some(BasicCCCommand::Report as u8) {
            return;
        }
        let Ok(report) = BasicCCReport::try_from_slice(&frame.payload) else {
            return;
        };

        if let Some(value) = level_to_cache_value(report.current_value) {
            state.values.insert(CURRENT_VALUE, value);
        }
        if let Some(value) = report.target_value.and_then(level_to_cache_value) {
            state.values.insert(TARGET_VALUE, value);
        }
        if let Some(duration) = report.duration {
            state.values.insert(DURATION, CacheValue::U8(duration.raw()));
        }
    }
}
