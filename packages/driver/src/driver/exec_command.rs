use super::storage::DriverStorage;
use super::{
    SerialApiMachine, SerialApiMachineCondition, SerialApiMachineInput, SerialApiMachineResult,
    SerialApiMachineState,
};
use crate::Driver;
use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zw_core::util::MaybeSleep;
use zw_logging::Direction;
use zw_serial::command::{AsCommandRaw, Command, CommandBase, CommandRequest};
use zw_serial::frame::{ControlFlow, RawSerialFrame};

/// How long to wait for the controller to accept a frame
const ACK_TIMEOUT: Duration = Duration::from_millis(1600);
/// How long to wait for the RES to a REQ
const RESPONSE_TIMEOUT: Duration = Duration::from_millis(10_000);
/// How long to wait for a callback to a REQ
const CALLBACK_TIMEOUT: Duration = Duration::from_millis(30_000);
/// How often a frame is put on the wire before the transaction fails
const MAX_SEND_ATTEMPTS: u8 = 3;
/// The back-off window after the controller signals CAN
const CAN_BACKOFF: std::ops::Range<u64> = 100..1000;

pub struct ExecCommandOptions {
    /// Overall deadline for the transaction
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
    /// For commands that stream multiple callbacks: decides which callback
    /// finishes the transaction. Intermediate callbacks are discarded after
    /// this returns `false`. When not set, the first callback is terminal.
    pub callback_is_terminal: Option<Box<dyn Fn(&Command) -> bool + Send + Sync>>,
}

impl Default for ExecCommandOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            cancel: CancellationToken::new(),
            callback_is_terminal: None,
        }
    }
}

/// Releases a reserved callback ID when the transaction reaches a terminal
/// state, including cancellation
struct CallbackIdGuard {
    storage: Arc<DriverStorage>,
    id: u8,
}

impl Drop for CallbackIdGuard {
    fn drop(&mut self) {
        self.storage.callback_ids.release(self.id);
    }
}

fn can_backoff_duration() -> Duration {
    let mut raw = [0u8; 2];
    // An even spread matters more here than what the bytes look like, so a
    // failed syscall just means no jitter
    let _ = getrandom::getrandom(&mut raw);
    let span = CAN_BACKOFF.end - CAN_BACKOFF.start;
    Duration::from_millis(CAN_BACKOFF.start + (u16::from_be_bytes(raw) as u64) % span)
}

impl Driver {
    /// Executes a Serial API command: assigns a callback ID where needed,
    /// sends the frame with link-layer retransmission and collects the
    /// expected response and callback(s).
    pub(crate) async fn execute_serial_api_command<C>(
        &self,
        mut command: C,
        options: &ExecCommandOptions,
    ) -> Result<SerialApiMachineResult>
    where
        C: CommandRequest + AsCommandRaw + Into<Command> + Clone + 'static,
    {
        // Give the command a callback ID if it needs one. This may suspend
        // until another transaction releases an ID.
        let _callback_id_guard = if command.needs_callback_id() && command.callback_id().is_none() {
            let id = tokio::select! {
                id = self.storage().callback_ids.allocate() => id,
                _ = options.cancel.cancelled() => return Err(Error::Cancelled),
            };
            command.set_callback_id(Some(id));
            Some(CallbackIdGuard {
                storage: self.storage().clone(),
                id,
            })
        } else {
            None
        };

        tokio::select! {
            result = self.run_serial_api_command(&command, options) => result,
            _ = options.cancel.cancelled() => Err(Error::Cancelled),
            _ = MaybeSleep::new(options.timeout) => Err(Error::Timeout),
        }
        // The guard drops here, releasing the callback ID in every exit path
    }

    async fn run_serial_api_command<C>(
        &self,
        command: &C,
        options: &ExecCommandOptions,
    ) -> Result<SerialApiMachineResult>
    where
        C: CommandRequest + AsCommandRaw + Into<Command> + Clone + 'static,
    {
        let mut machine = SerialApiMachine::new();

        let expects_response = command.expects_response();
        let expects_callback = command.expects_callback();
        let evaluate_condition =
            move |condition: SerialApiMachineCondition| match condition {
                SerialApiMachineCondition::ExpectsResponse => expects_response,
                SerialApiMachineCondition::ExpectsCallback => expects_callback,
            };

        let mut advance = |machine: &mut SerialApiMachine, input: SerialApiMachineInput| {
            if let Some(new_state) = machine.next(input, evaluate_condition) {
                machine.transition(new_state);
            }
        };

        // With multiple tasks involved, setting up the awaiters just in time
        // is prone to race conditions. All awaiters exist before the frame is
        // handed to the serial task.
        let mut awaited_response = if expects_response {
            let command = command.clone();
            Some(
                self.await_command(
                    Box::new(move |cmd| command.test_response(cmd)),
                    Some(RESPONSE_TIMEOUT),
                )
                .await?,
            )
        } else {
            None
        };
        let mut awaited_callback = if expects_callback {
            let command = command.clone();
            Some(
                self.await_command(
                    Box::new(move |cmd| command.test_callback(cmd)),
                    Some(CALLBACK_TIMEOUT),
                )
                .await?,
            )
        } else {
            None
        };

        let raw = command.as_raw()?;
        let frame: RawSerialFrame = raw.into();

        self.controller_log()
            .command(&command.clone().into(), Direction::Outbound);

        advance(&mut machine, SerialApiMachineInput::Start);

        // Link layer: send and wait for ACK, retransmitting on NAK, CAN or
        // silence. A CAN additionally backs off before the next attempt and
        // does NOT reset the attempt counter. The framing is half-duplex,
        // concurrent transactions queue here until the wire is free.
        let send_lock = self.storage().send_lock.lock().await;
        let mut attempts = 0u8;
        loop {
            attempts += 1;
            debug_assert_eq!(machine.state(), &SerialApiMachineState::Sending);

            let awaited_ack = self
                .await_control_flow_frame(Box::new(|_| true), Some(ACK_TIMEOUT))
                .await?;
            self.write_serial(frame.clone()).await?;
            advance(&mut machine, SerialApiMachineInput::FrameSent);

            let outcome = match awaited_ack.try_await().await {
                Ok(ControlFlow::ACK) => {
                    advance(&mut machine, SerialApiMachineInput::Ack);
                    break;
                }
                Ok(ControlFlow::NAK) => SerialApiMachineInput::Nak,
                Ok(ControlFlow::CAN) => SerialApiMachineInput::Can,
                Err(Error::Timeout) => SerialApiMachineInput::AckTimeout,
                Err(e) => return Err(e),
            };

            if attempts >= MAX_SEND_ATTEMPTS {
                advance(&mut machine, outcome);
                let SerialApiMachineState::Done(result) = machine.state() else {
                    return Err(Error::Internal);
                };
                return Ok(result.clone());
            }

            if outcome == SerialApiMachineInput::Can {
                tokio::time::sleep(can_backoff_duration()).await;
            }
            machine.restart_sending();
        }
        drop(send_lock);

        // Wait for the response if one is expected
        if let Some(awaited) = awaited_response.take() {
            debug_assert_eq!(machine.state(), &SerialApiMachineState::WaitingForResponse);
            let input = match awaited.try_await().await {
                Ok(response) if response.is_ok() => SerialApiMachineInput::Response(response),
                Ok(response) => SerialApiMachineInput::ResponseNok(response),
                Err(Error::Timeout) => SerialApiMachineInput::ResponseTimeout,
                Err(e) => return Err(e),
            };
            advance(&mut machine, input);
        }

        // Wait for callbacks until one is terminal
        while matches!(machine.state(), SerialApiMachineState::WaitingForCallback) {
            let Some(awaited) = awaited_callback.take() else {
                return Err(Error::Internal);
            };
            let input = match awaited.try_await().await {
                Ok(callback) if !callback.is_ok() => SerialApiMachineInput::CallbackNok(callback),
                Ok(callback) => {
                    let is_terminal = options
                        .callback_is_terminal
                        .as_ref()
                        .map(|test| test(&callback))
                        .unwrap_or(true);
                    if !is_terminal {
                        // Multi-shot command: keep listening
                        let command = command.clone();
                        awaited_callback = Some(
                            self.await_command(
                                Box::new(move |cmd| command.test_callback(cmd)),
                                Some(CALLBACK_TIMEOUT),
                            )
                            .await?,
                        );
                        continue;
                    }
                    SerialApiMachineInput::Callback(callback)
                }
                Err(Error::Timeout) => SerialApiMachineInput::CallbackTimeout,
                Err(e) => return Err(e),
            };
            advance(&mut machine, input);
        }

        match machine.state() {
            SerialApiMachineState::Done(result) => Ok(result.clone()),
            _ => Err(Error::Internal),
        }
    }
}
