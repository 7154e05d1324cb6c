use super::{CCInterviewContext, CCInterviewError, CCInterviewResult, CommandClassApi};
use crate::driver::{CacheValue, CommandClassState, ExecNodeCommandError};
use futures::FutureExt;
use futures::future::BoxFuture;
use zw_cc::commandclass::{
    VersionCCCommand, VersionCCCommandClassGet, VersionCCCommandClassReport, VersionCCGet,
    VersionCCReport,
};
use zw_cc::commandclass_raw::CCRaw;
use zw_core::encoding::Parsable;
use zw_core::prelude::*;

pub const LIBRARY_TYPE: &str = "libraryType";
pub const PROTOCOL_VERSION: &str = "protocolVersion";
pub const FIRMWARE_VERSION: &str = "firmwareVersion";
pub const HARDWARE_VERSION: &str = "hardwareVersion";

pub struct VersionCCApi;

impl CommandClassApi for VersionCCApi {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Version
    }

    fn implemented_version(&self) -> u8 {
        2
    }

    fn dependencies(&self) -> &'static [CommandClasses] {
        // The Version CC provides what everything else depends on, it must
        // come first
        &[]
    }

    fn is_command_supported(&self, version: Option<u8>, cc_command: u8) -> Option<bool> {
        match VersionCCCommand::try_from(cc_command) {
            Ok(_) => Some(true),
            // Commands from V3 upward are not implemented here. Whether the
            // node knows them still depends on its version.
            Err(_) if (0x15..=0x18).contains(&cc_command) => version.map(|v| v >= 3),
            Err(_) => Some(false),
        }
    }

    /// Queries the version of every CC the node advertises and writes it
    /// into the respective instance, then queries the node's own version
    /// information. Runs before any other CC interview.
    fn interview<'a>(&'a self, ctx: &'a CCInterviewContext<'a>) -> BoxFuture<'a, CCInterviewResult> {
        async move {
            // The Version CC's own version gates the remaining queries
            query_cc_version(ctx, CommandClasses::Version).await?;

            ctx.log()
                .verbose(|| "querying node version information...".to_string());
            let report = ctx
                .driver
                .exec_node_command(ctx.node_id, &VersionCCGet::default(), &ctx.cancel)
                .await?;
            if let Some(report) = report {
                ctx.driver.storage().write_node(ctx.node_id, |node| {
                    if let Some(state) = node.cc_state.get_mut(&CommandClasses::Version) {
                        self.process_received(state, &report);
                    }
                });
            }

            // Learn the version of every other CC before their interviews run
            let ccs: Vec<CommandClasses> = ctx
                .driver
                .storage()
                .read_node(ctx.node_id, |node| node.cc_state.keys().copied().collect())
                .unwrap_or_default();
            for cc in ccs {
                if cc == CommandClasses::Version {
                    continue;
                }
                query_cc_version(ctx, cc).await?;
            }

            Ok(())
        }
        .boxed()
    }

    fn process_received(&self, state: &mut CommandClassState, frame: &CCRaw) {
        if frame.cc_command != Some(VersionCCCommand::Report as u8) {
            return;
        }
        let Ok(report) = VersionCCReport::try_from_slice(&frame.payload) else {
            return;
        };

        state.values.insert(
            LIBRARY_TYPE,
            CacheValue::U8(report.library_type as u8),
        );
        state.values.insert(
            PROTOCOL_VERSION,
            CacheValue::String(report.protocol_version.to_string()),
        );
        state.values.insert(
            FIRMWARE_VERSION,
            CacheValue::String(report.firmware_versions[0].to_string()),
        );
        if let Some(hardware_version) = report.hardware_version {
            state
                .values
                .insert(HARDWARE_VERSION, CacheValue::U8(hardware_version));
        }
    }
}

async fn query_cc_version(ctx: &CCInterviewContext<'_>, cc: CommandClasses) -> CCInterviewResult {
    if ctx.cancel.is_cancelled() {
        return Err(CCInterviewError::Cancelled);
    }

    let log = ctx.log();
    log.verbose(|| format!("querying version for CC {}...", cc));

    let result = ctx
        .driver
        .exec_node_command(ctx.node_id, &VersionCCCommandClassGet::new(cc), &ctx.cancel)
        .await;

    match result {
        Ok(Some(raw)) => {
            let Ok(report) = VersionCCCommandClassReport::try_from_slice(&raw.payload) else {
                // Malformed report, treat the query as unanswered
                log.warn(|| format!("dropping malformed version report for CC {}", cc));
                return Ok(());
            };
            if report.version == 0 {
                // The NIF said this CC is supported, now the node claims it
                // is not
                log.warn(|| format!("node does not support CC {} after all", cc));
                ctx.driver.storage().write_node(ctx.node_id, |node| {
                    node.cc_state.remove(&cc);
                });
            } else {
                log.info(|| format!("supports CC {} in version {}", cc, report.version));
                if !ctx
                    .driver
                    .storage()
                    .set_cc_version(ctx.node_id, cc, report.version)
                {
                    log.warn(|| {
                        format!(
                            "conflicting version report for CC {}, keeping the known value",
                            cc
                        )
                    });
                }
            }
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(ExecNodeCommandError::NodeTimeout) => {
            // Assume V1, the query may simply be unsupported
            log.warn(|| format!("version query for CC {} timed out, assuming version 1", cc));
            ctx.driver.storage().set_cc_version(ctx.node_id, cc, 1);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
