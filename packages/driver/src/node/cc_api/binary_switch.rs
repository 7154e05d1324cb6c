use super::{CCInterviewContext, CCInterviewError, CCInterviewResult, CommandClassApi};
use crate::driver::{CacheValue, CommandClassState};
use futures::FutureExt;
use futures::future::BoxFuture;
use zw_cc::commandclass::{BinarySwitchCCCommand, BinarySwitchCCGet, BinarySwitchCCReport};
use zw_cc::commandclass_raw::CCRaw;
use zw_core::encoding::Parsable;
use zw_core::prelude::*;

pub const CURRENT_VALUE: &str = "currentValue";
pub const TARGET_VALUE: &str = "targetValue";
pub const DURATION: &str = "duration";

pub struct BinarySwitchCCApi;

impl CommandClassApi for BinarySwitchCCApi {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::BinarySwitch
    }

    fn implemented_version(&self) -> u8 {
        2
    }

    fn is_command_supported(&self, _version: Option<u8>, cc_command: u8) -> Option<bool> {
        let known = BinarySwitchCCCommand::try_from(cc_command).is_ok();
        Some(known)
    }

    fn interview<'a>(&'a self, ctx: &'a CCInterviewContext<'a>) -> BoxFuture<'a, CCInterviewResult> {
        async move {
            if ctx.cancel.is_cancelled() {
                return Err(CCInterviewError::Cancelled);
            }

            ctx.log()
                .verbose(|| "querying Binary Switch state...".to_string());
            let report = ctx
                .driver
                .exec_node_command(ctx.node_id, &BinarySwitchCCGet::default(), &ctx.cancel)
                .await?;

            if let Some(report) = report {
                ctx.driver.storage().write_node(ctx.node_id, |node| {
                    if let Some(state) = node.cc_state.get_mut(&CommandClasses::BinarySwitch) {
                        self.process_received(state, &report);
                    }
                });
            }

            Ok(())
        }
        .boxed()
    }

    fn process_received(&self, state: &mut CommandClassState, frame: &CCRaw) {
        if frame.cc_command != Some(BinarySwitchCCCommand::Report as u8) {
            return;
        }
        // A report with an out-of-range value is dropped, the cached state
        // stays as it is
        let Ok(report) = BinarySwitchCCReport::try_from_slice(&frame.payload) else {
            return;
        };

        if let Some(value) = report.current_value.as_bool() {
            state.values.insert(CURRENT_VALUE, CacheValue::Bool(value));
        }
        if let Some(value) = report.target_value.and_then(|v| v.as_bool()) {
            state.values.insert(TARGET_VALUE, CacheValue::Bool(value));
        }
        if let Some(duration) = report.duration {
            state.values.insert(DURATION, CacheValue::U8(duration.raw()));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn report_frame(payload: Vec<u8>) -> CCRaw {
        CCRaw {
            cc_id: CommandClasses::BinarySwitch,
            cc_command: Some(BinarySwitchCCCommand::Report as u8),
            payload,
        }
    }

    #[test]
    fn test_process_received_caches_values() {
        let mut state = CommandClassState::default();
        BinarySwitchCCApi.process_received(&mut state, &report_frame(vec![0xff]));
        assert_eq!(state.values.get(CURRENT_VALUE), Some(&CacheValue::Bool(true)));
    }

    #[test]
    fn test_invalid_report_leaves_state_unchanged() {
        let mut state = CommandClassState::default();
        BinarySwitchCCApi.process_received(&mut state, &report_frame(vec![0x00]));
        assert_eq!(state.values.get(CURRENT_VALUE), Some(&CacheValue::Bool(false)));

        // 0x42 is outside the defined value range
        BinarySwitchCCApi.process_received(&mut state, &report_frame(vec![0x42]));
        assert_eq!(state.values.get(CURRENT_VALUE), Some(&CacheValue::Bool(false)));
    }

    #[test]
    fn test_unknown_value_is_not_cached() {
        let mut state = CommandClassState::default();
        BinarySwitchCCApi.process_received(&mut state, &report_frame(vec![0xfe]));
        assert!(state.values.is_empty());
    }
}
