use zw_serial::command::Command;

/// The terminal outcome of executing a Serial API command
#[derive(Debug, Clone, PartialEq)]
pub enum SerialApiMachineResult {
    /// The command went through. Carries the response if one was expected,
    /// otherwise the final callback, if any.
    Success(Option<Command>),
    AckTimeout,
    Nak,
    Can,
    ResponseTimeout,
    ResponseNok(Command),
    CallbackTimeout,
    CallbackNok(Command),
}

impl SerialApiMachineResult {
    /// Whether the failure happened at the link layer, before the command
    /// was even acknowledged
    pub fn is_link_failure(&self) -> bool {
        matches!(self, Self::AckTimeout | Self::Nak | Self::Can)
    }
}

/// The states a command execution passes through. The link-layer retransmit
/// loop re-enters `Sending` from the NAK/CAN/timeout outcomes; that
/// counting lives in the executor, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum SerialApiMachineState {
    Initial,
    Sending,
    WaitingForAck,
    WaitingForResponse,
    WaitingForCallback,
    Done(SerialApiMachineResult),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SerialApiMachineInput {
    Start,
    FrameSent,
    Ack,
    Nak,
    Can,
    AckTimeout,
    Response(Command),
    ResponseNok(Command),
    ResponseTimeout,
    Callback(Command),
    CallbackNok(Command),
    CallbackTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SerialApiMachineCondition {
    ExpectsResponse,
    ExpectsCallback,
}

pub struct SerialApiMachine {
    state: SerialApiMachineState,
}

impl Default for SerialApiMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialApiMachine {
    pub fn new() -> Self {
        Self {
            state: SerialApiMachineState::Initial,
        }
    }

    pub fn state(&self) -> &SerialApiMachineState {
        &self.state
    }

    pub fn done(&self) -> bool {
        matches!(self.state, SerialApiMachineState::Done(_))
    }

    /// Restarts the send phase for a link-layer retransmission
    pub fn restart_sending(&mut self) {
        debug_assert!(!self.done());
        self.state = SerialApiMachineState::Sending;
    }

    /// Computes the state following `input`, or `None` if the input is not
    /// expected in the current state
    pub fn next(
        &self,
        input: SerialApiMachineInput,
        evaluate: impl Fn(SerialApiMachineCondition) -> bool,
    ) -> Option<SerialApiMachineState> {
        use SerialApiMachineCondition::*;
        use SerialApiMachineInput as Input;
        use SerialApiMachineResult as Result;
        use SerialApiMachineState as State;

        match (&self.state, input) {
            (State::Initial, Input::Start) => Some(State::Sending),
            (State::Sending, Input::FrameSent) => Some(State::WaitingForAck),

            (State::WaitingForAck, Input::Ack) if evaluate(ExpectsResponse) => {
                Some(State::WaitingForResponse)
            }
            (State::WaitingForAck, Input::Ack) if evaluate(ExpectsCallback) => {
                Some(State::WaitingForCallback)
            }
            (State::WaitingForAck, Input::Ack) => Some(State::Done(Result::Success(None))),
            (State::WaitingForAck, Input::Nak) => Some(State::Done(Result::Nak)),
            (State::WaitingForAck, Input::Can) => Some(State::Done(Result::Can)),
            (State::WaitingForAck, Input::AckTimeout) => Some(State::Done(Result::AckTimeout)),

            (State::WaitingForResponse, Input::Response(response)) => {
                if evaluate(ExpectsCallback) {
                    Some(State::WaitingForCallback)
                } else {
                    Some(State::Done(Result::Success(Some(response))))
                }
            }
            (State::WaitingForResponse, Input::ResponseNok(response)) => {
                Some(State::Done(Result::ResponseNok(response)))
            }
            (State::WaitingForResponse, Input::ResponseTimeout) => {
                Some(State::Done(Result::ResponseTimeout))
            }

            (State::WaitingForCallback, Input::Callback(callback)) => {
                Some(State::Done(Result::Success(Some(callback))))
            }
            (State::WaitingForCallback, Input::CallbackNok(callback)) => {
                Some(State::Done(Result::CallbackNok(callback)))
            }
            (State::WaitingForCallback, Input::CallbackTimeout) => {
                Some(State::Done(Result::CallbackTimeout))
            }

            _ => None,
        }
    }

    pub fn transition(&mut self, new_state: SerialApiMachineState) {
        self.state = new_state;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn expects(response: bool, callback: bool) -> impl Fn(SerialApiMachineCondition) -> bool {
        move |condition| match condition {
            SerialApiMachineCondition::ExpectsResponse => response,
            SerialApiMachineCondition::ExpectsCallback => callback,
        }
    }

    #[test]
    fn test_response_only_flow() {
        let mut machine = SerialApiMachine::new();
        for input in [
            SerialApiMachineInput::Start,
            SerialApiMachineInput::FrameSent,
            SerialApiMachineInput::Ack,
        ] {
            let next = machine.next(input, expects(true, false)).unwrap();
            machine.transition(next);
        }
        assert_eq!(machine.state(), &SerialApiMachineState::WaitingForResponse);
    }

    #[test]
    fn test_ack_completes_fire_and_forget() {
        let mut machine = SerialApiMachine::new();
        for input in [
            SerialApiMachineInput::Start,
            SerialApiMachineInput::FrameSent,
            SerialApiMachineInput::Ack,
        ] {
            let next = machine.next(input, expects(false, false)).unwrap();
            machine.transition(next);
        }
        assert!(machine.done());
    }

    #[test]
    fn test_unexpected_input_is_rejected() {
        let machine = SerialApiMachine::new();
        assert!(
            machine
                .next(SerialApiMachineInput::Ack, expects(true, true))
                .is_none()
        );
    }

    #[test]
    fn test_nak_then_restart() {
        let mut machine = SerialApiMachine::new();
        for input in [
            SerialApiMachineInput::Start,
            SerialApiMachineInput::FrameSent,
        ] {
            let next = machine.next(input, expects(false, false)).unwrap();
            machine.transition(next);
        }
        let next = machine
            .next(SerialApiMachineInput::Nak, expects(false, false))
            .unwrap();
        assert_eq!(
            next,
            SerialApiMachineState::Done(SerialApiMachineResult::Nak)
        );
        // The executor decides to retransmit instead of accepting the failure
        machine.restart_sending();
        assert_eq!(machine.state(), &SerialApiMachineState::Sending);
    }
}
