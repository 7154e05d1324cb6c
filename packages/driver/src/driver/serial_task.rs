use super::SerialEvent;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc, oneshot};
use zw_logging::{Direction, loggers::serial::SerialLogger};
use zw_serial::binding::SerialBinding;
use zw_serial::command_raw::CommandRaw;
use zw_serial::frame::{ControlFlow, RawSerialFrame};

pub(crate) enum SerialTaskCommand {
    SendFrame {
        frame: RawSerialFrame,
        callback: oneshot::Sender<zw_serial::error::Result<()>>,
    },
}

pub(crate) type SerialTaskCommandSender = mpsc::Sender<SerialTaskCommand>;

/// The only task with access to the transport. Serializes outgoing frames
/// and implements the receive discipline: decodable data frames are ACKed
/// immediately and handed upward, garbage and checksum failures are answered
/// with NAK and discarded.
pub(crate) struct SerialTask<S> {
    port: S,
    cmd_rx: mpsc::Receiver<SerialTaskCommand>,
    event_tx: mpsc::Sender<SerialEvent>,
    log: SerialLogger,
    shutdown: Arc<Notify>,
}

impl<S> SerialTask<S>
where
    S: SerialBinding,
{
    pub(crate) fn new(
        port: S,
        cmd_rx: mpsc::Receiver<SerialTaskCommand>,
        event_tx: mpsc::Sender<SerialEvent>,
        log: SerialLogger,
        shutdown: Arc<Notify>,
    ) -> Self {
        Self {
            port,
            cmd_rx,
            event_tx,
            log,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                // Pending sends go out before the next inbound frame is touched
                biased;

                _ = self.shutdown.notified() => break,

                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },

                frame = self.port.read() => match frame {
                    Some(frame) => {
                        if !self.handle_frame(frame).await {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    }

    async fn handle_command(&mut self, cmd: SerialTaskCommand) {
        match cmd {
            SerialTaskCommand::SendFrame { frame, callback } => {
                match &frame {
                    RawSerialFrame::Data(data) => self.log.data(data, Direction::Outbound),
                    RawSerialFrame::ControlFlow(byte) => {
                        self.log.control_flow(*byte, Direction::Outbound)
                    }
                    RawSerialFrame::Garbage(_) => {}
                }
                let result = self.port.write(frame).await;
                let _ = callback.send(result);
            }
        }
    }

    /// Returns `false` when the upper layer is gone and the task should stop
    async fn handle_frame(&mut self, frame: RawSerialFrame) -> bool {
        match frame {
            RawSerialFrame::ControlFlow(byte) => {
                self.log.control_flow(byte, Direction::Inbound);
                self.event_tx
                    .send(SerialEvent::ControlFlow(byte))
                    .await
                    .is_ok()
            }
            RawSerialFrame::Data(bytes) => {
                self.log.data(&bytes, Direction::Inbound);
                match CommandRaw::try_from_frame_data(&bytes) {
                    Ok(raw) => {
                        // The frame is well-formed, ACK it right away
                        self.write_control_flow(ControlFlow::ACK).await;
                        self.event_tx.send(SerialEvent::Command(raw)).await.is_ok()
                    }
                    Err(_) => {
                        // Bad checksum or truncated frame: ask the
                        // controller to retransmit
                        self.log.discarded(&bytes);
                        self.write_control_flow(ControlFlow::NAK).await;
                        true
                    }
                }
            }
            RawSerialFrame::Garbage(bytes) => {
                // Try to re-synchronize with the controller
                self.log.discarded(&bytes);
                self.write_control_flow(ControlFlow::NAK).await;
                true
            }
        }
    }

    async fn write_control_flow(&mut self, byte: ControlFlow) {
        self.log.control_flow(byte, Direction::Outbound);
        let _ = self.port.write(RawSerialFrame::ControlFlow(byte)).await;
    }
}
