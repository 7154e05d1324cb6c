use super::SerialEvent;
use super::awaited::{AwaitedRef, AwaitedRegistry, Predicate};
use super::storage::DriverStorage;
use crate::node::cc_api::{ReceivedCC, dispatch_application_frame};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, oneshot};
use zw_logging::Direction;
use zw_logging::loggers::{controller::ControllerLogger, driver::DriverLogger, node::NodeLogger};
use zw_serial::command::{Command, CommandId};
use zw_serial::frame::ControlFlow;

pub(crate) enum MainTaskCommand {
    RegisterAwaitedControlFlow {
        predicate: Predicate<ControlFlow>,
        timeout: Option<Duration>,
        callback: oneshot::Sender<AwaitedRef<ControlFlow>>,
    },
    RegisterAwaitedCommand {
        predicate: Predicate<Command>,
        timeout: Option<Duration>,
        callback: oneshot::Sender<AwaitedRef<Command>>,
    },
    RegisterAwaitedCC {
        predicate: Predicate<ReceivedCC>,
        timeout: Option<Duration>,
        callback: oneshot::Sender<AwaitedRef<ReceivedCC>>,
    },
}

pub(crate) type MainTaskCommandSender = mpsc::Sender<MainTaskCommand>;

/// The receive dispatcher. Owns the registries of awaited values and routes
/// every inbound frame: control-flow bytes to the transaction waiting for an
/// ACK, responses and callbacks to their transactions, application frames to
/// their nodes, and everything unmatched to the log.
pub(crate) struct MainLoop {
    storage: Arc<DriverStorage>,
    awaited_control_flow_frames: Arc<AwaitedRegistry<ControlFlow>>,
    awaited_commands: Arc<AwaitedRegistry<Command>>,
    awaited_ccs: Arc<AwaitedRegistry<ReceivedCC>>,

    cmd_rx: mpsc::Receiver<MainTaskCommand>,
    event_rx: mpsc::Receiver<SerialEvent>,
    shutdown: Arc<Notify>,
}

impl MainLoop {
    pub(crate) fn new(
        storage: Arc<DriverStorage>,
        cmd_rx: mpsc::Receiver<MainTaskCommand>,
        event_rx: mpsc::Receiver<SerialEvent>,
        shutdown: Arc<Notify>,
    ) -> Self {
        Self {
            storage,
            awaited_control_flow_frames: Arc::new(AwaitedRegistry::default()),
            awaited_commands: Arc::new(AwaitedRegistry::default()),
            awaited_ccs: Arc::new(AwaitedRegistry::default()),
            cmd_rx,
            event_rx,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                // Commands take precedence, so a transaction can set up its
                // frame handlers before the next frame is dispatched
                biased;

                _ = self.shutdown.notified() => break,

                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },

                event = self.event_rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
            }
        }
    }

    fn handle_command(&mut self, cmd: MainTaskCommand) {
        match cmd {
            MainTaskCommand::RegisterAwaitedControlFlow {
                predicate,
                timeout,
                callback,
            } => {
                let awaited = self.awaited_control_flow_frames.add(predicate, timeout);
                let _ = callback.send(awaited);
            }
            MainTaskCommand::RegisterAwaitedCommand {
                predicate,
                timeout,
                callback,
            } => {
                let awaited = self.awaited_commands.add(predicate, timeout);
                let _ = callback.send(awaited);
            }
            MainTaskCommand::RegisterAwaitedCC {
                predicate,
                timeout,
                callback,
            } => {
                let awaited = self.awaited_ccs.add(predicate, timeout);
                let _ = callback.send(awaited);
            }
        }
    }

    fn handle_event(&mut self, event: SerialEvent) {
        match event {
            SerialEvent::ControlFlow(byte) => {
                // Route to the transaction waiting for it, if any
                if let Some(channel) = self.awaited_control_flow_frames.take_matching(&byte) {
                    let _ = channel.send(byte);
                    return;
                }
                self.driver_log()
                    .silly(|| format!("unexpected {} frame, dropping it", byte));
            }

            SerialEvent::Command(raw) => {
                let cmd = match Command::try_from_raw(&raw) {
                    Ok(cmd) => cmd,
                    Err(e) => {
                        self.driver_log()
                            .warn(|| format!("dropping undecodable frame: {}", e));
                        return;
                    }
                };

                // Log the received command in the area it belongs to
                match &cmd {
                    Command::ApplicationCommandRequest(request) => self
                        .node_log(request.source_node_id)
                        .command(&cmd, Direction::Inbound),
                    Command::BridgeApplicationCommandRequest(request) => self
                        .node_log(request.source_node_id)
                        .command(&cmd, Direction::Inbound),
                    _ => self.controller_log().command(&cmd, Direction::Inbound),
                }

                // Responses and callbacks complete the oldest matching
                // transaction
                if let Some(channel) = self.awaited_commands.take_matching(&cmd) {
                    let _ = channel.send(cmd);
                    return;
                }

                // Unsolicited application frames are dispatched to their node
                match cmd {
                    Command::ApplicationCommandRequest(request) => {
                        self.handle_application_frame(ReceivedCC {
                            source_node_id: request.source_node_id,
                            command: request.command,
                            rssi: request.rssi,
                        });
                    }
                    Command::BridgeApplicationCommandRequest(request) => {
                        self.handle_application_frame(ReceivedCC {
                            source_node_id: request.source_node_id,
                            command: request.command,
                            rssi: request.rssi,
                        });
                    }
                    cmd => {
                        self.driver_log().verbose(|| {
                            format!(
                                "no transaction matches {:?} {:?}, dropping it",
                                cmd.command_type(),
                                cmd.function_type()
                            )
                        });
                    }
                }
            }
        }
    }

    fn handle_application_frame(&mut self, received: ReceivedCC) {
        // Update the cached state of the receiving command class instance
        dispatch_application_frame(&self.storage, &received);

        // Every waiter whose predicate matches sees this frame
        for channel in self.awaited_ccs.take_all_matching(&received) {
            let _ = channel.send(received.clone());
        }
    }

    fn driver_log(&self) -> DriverLogger {
        DriverLogger::new(self.storage.logger().clone())
    }

    fn controller_log(&self) -> ControllerLogger {
        ControllerLogger::new(self.storage.logger().clone())
    }

    fn node_log(&self, node_id: zw_core::prelude::NodeId) -> NodeLogger {
        NodeLogger::new(self.storage.logger().clone(), node_id)
    }
}
