//! An in-memory serial transport with a scriptable controller side, used to
//! exercise the driver end-to-end without hardware.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use zw_driver::{Driver, DriverOptions};
use zw_logging::{ImmutableLogger, LogInfo, Loglevel};
use zw_serial::binding::SerialBinding;
use zw_serial::frame::{ControlFlow, RawSerialFrame};

pub struct MockPort {
    rx: mpsc::Receiver<RawSerialFrame>,
    tx: mpsc::Sender<RawSerialFrame>,
}

impl SerialBinding for MockPort {
    async fn write(&mut self, frame: RawSerialFrame) -> zw_serial::error::Result<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::BrokenPipe, "mock closed"))?;
        Ok(())
    }

    async fn read(&mut self) -> Option<RawSerialFrame> {
        self.rx.recv().await
    }
}

/// The test's view of the transport: observe what the driver sends, inject
/// what the controller answers
pub struct MockController {
    tx: mpsc::Sender<RawSerialFrame>,
    rx: mpsc::Receiver<RawSerialFrame>,
}

pub fn mock_port() -> (MockPort, MockController) {
    let (to_driver_tx, to_driver_rx) = mpsc::channel(64);
    let (from_driver_tx, from_driver_rx) = mpsc::channel(64);
    (
        MockPort {
            rx: to_driver_rx,
            tx: from_driver_tx,
        },
        MockController {
            tx: to_driver_tx,
            rx: from_driver_rx,
        },
    )
}

fn frame_checksum(frame: &[u8]) -> u8 {
    frame[1..frame.len() - 1].iter().fold(0xff, |acc, x| acc ^ x)
}

/// Builds a complete data frame with the checksum filled in
pub fn data_frame(command_type: u8, function_type: u8, payload: &[u8]) -> RawSerialFrame {
    let mut data = vec![0x01, payload.len() as u8 + 3, command_type, function_type];
    data.extend_from_slice(payload);
    data.push(0);
    let len = data.len();
    data[len - 1] = frame_checksum(&data);
    RawSerialFrame::Data(data)
}

pub fn request(function_type: u8, payload: &[u8]) -> RawSerialFrame {
    data_frame(0x00, function_type, payload)
}

pub fn response(function_type: u8, payload: &[u8]) -> RawSerialFrame {
    data_frame(0x01, function_type, payload)
}

impl MockController {
    pub async fn send(&self, frame: RawSerialFrame) {
        self.tx.send(frame).await.expect("driver is gone");
    }

    pub async fn ack(&self) {
        self.send(RawSerialFrame::ControlFlow(ControlFlow::ACK)).await;
    }

    pub async fn nak(&self) {
        self.send(RawSerialFrame::ControlFlow(ControlFlow::NAK)).await;
    }

    pub async fn can(&self) {
        self.send(RawSerialFrame::ControlFlow(ControlFlow::CAN)).await;
    }

    pub async fn recv(&mut self) -> RawSerialFrame {
        tokio::time::timeout(Duration::from_secs(15), self.rx.recv())
            .await
            .expect("timed out waiting for the driver to send a frame")
            .expect("driver is gone")
    }

    /// Receives the next data frame, skipping over ACK/NAK/CAN
    pub async fn expect_data(&mut self) -> Vec<u8> {
        loop {
            match self.recv().await {
                RawSerialFrame::Data(data) => return data,
                RawSerialFrame::ControlFlow(_) => continue,
                RawSerialFrame::Garbage(data) => panic!("driver sent garbage: {:?}", data),
            }
        }
    }

    /// Receives the next data frame and asserts its exact bytes
    pub async fn expect_frame(&mut self, expected_hex: &str) {
        let data = self.expect_data().await;
        assert_eq!(
            hex::encode(&data),
            expected_hex,
            "unexpected frame from driver"
        );
    }

    /// Receives the next data frame and asserts it is the given request,
    /// checksum included
    pub async fn expect_request(&mut self, function_type: u8, payload: &[u8]) {
        let data = self.expect_data().await;
        let RawSerialFrame::Data(expected) = request(function_type, payload) else {
            unreachable!()
        };
        assert_eq!(
            hex::encode(&data),
            hex::encode(&expected),
            "unexpected frame from driver"
        );
    }

    /// Answers the frame the driver just sent: ACK, then a response
    pub async fn ack_and_respond(&self, function_type: u8, payload: &[u8]) {
        self.ack().await;
        self.send(response(function_type, payload)).await;
    }
}

/// Discards everything that is logged. Keeps the test output readable.
struct NullLogger;

impl ImmutableLogger for NullLogger {
    fn log(&self, _log: LogInfo, _level: Loglevel) {}

    fn log_level(&self) -> Loglevel {
        Loglevel::Error
    }

    fn set_log_level(&self, _level: Loglevel) {}
}

pub fn driver_options() -> DriverOptions {
    DriverOptions::builder()
        .logger(Arc::new(NullLogger) as Arc<dyn ImmutableLogger>)
        .build()
}

/// Runs the startup script: controller IDs and a network with nodes 1
/// (the controller) and 2, including their protocol info
pub async fn open_driver_with_network() -> (Driver, MockController) {
    let (port, mut mock) = mock_port();

    let script = tokio::spawn(async move {
        // GetControllerId
        mock.expect_frame("01030020dc").await;
        mock.ack_and_respond(0x20, &[0xc0, 0x64, 0xa9, 0x9b, 0x01])
            .await;

        // GetSerialApiInitData: API version 5, nodes 1 and 2
        mock.expect_frame("01030002fe").await;
        mock.ack_and_respond(0x02, &[0x05, 0x00, 0x01, 0x03, 0x07, 0x00])
            .await;

        // GetNodeProtocolInfo for both nodes
        mock.expect_frame("0104004101bb").await;
        mock.ack_and_respond(0x41, &[0xd3, 0x9c, 0x00, 0x02, 0x02, 0x01])
            .await;
        mock.expect_frame("0104004102b8").await;
        mock.ack_and_respond(0x41, &[0xd3, 0x9c, 0x01, 0x04, 0x10, 0x01])
            .await;

        mock
    });

    let driver = Driver::open(port, driver_options())
        .await
        .expect("opening the driver against the mock failed");
    let mock = script.await.unwrap();

    (driver, mock)
}

/// Runs the interview script for node 2 advertising Binary Switch + Version.
/// Must be driven concurrently with `node.interview()`.
pub async fn script_node2_interview(mock: &mut MockController) {
    // RequestNodeInfo, answered by an ApplicationUpdate with the CC list
    mock.expect_request(0x60, &[0x02]).await;
    mock.ack_and_respond(0x60, &[0x01]).await;
    mock.send(request(0x49, &[0x84, 0x02, 0x05, 0x04, 0x10, 0x01, 0x25, 0x86]))
        .await;

    // Version CC interview: its own version first...
    mock.expect_request(0x13, &[0x02, 0x03, 0x86, 0x13, 0x86, 0x25, 0x01])
        .await;
    mock.ack_and_respond(0x13, &[0x01]).await;
    mock.send(request(0x13, &[0x01, 0x00])).await;
    mock.send(request(0x04, &[0x00, 0x02, 0x04, 0x86, 0x14, 0x86, 0x02]))
        .await;

    // ...then the node's version info...
    mock.expect_request(0x13, &[0x02, 0x02, 0x86, 0x11, 0x25, 0x02])
        .await;
    mock.ack_and_respond(0x13, &[0x01]).await;
    mock.send(request(0x13, &[0x02, 0x00])).await;
    mock.send(request(
        0x04,
        &[0x00, 0x02, 0x07, 0x86, 0x12, 0x06, 0x04, 0x21, 0x01, 0x02],
    ))
    .await;

    // ...then the Binary Switch version
    mock.expect_request(0x13, &[0x02, 0x03, 0x86, 0x13, 0x25, 0x25, 0x03])
        .await;
    mock.ack_and_respond(0x13, &[0x01]).await;
    mock.send(request(0x13, &[0x03, 0x00])).await;
    mock.send(request(0x04, &[0x00, 0x02, 0x04, 0x86, 0x14, 0x25, 0x02]))
        .await;

    // Binary Switch interview queries the current state
    mock.expect_request(0x13, &[0x02, 0x02, 0x25, 0x02, 0x25, 0x04])
        .await;
    mock.ack_and_respond(0x13, &[0x01]).await;
    mock.send(request(0x13, &[0x04, 0x00])).await;
    mock.send(request(0x04, &[0x00, 0x02, 0x03, 0x25, 0x03, 0xff]))
        .await;
}
