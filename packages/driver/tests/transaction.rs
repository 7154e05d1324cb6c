mod common;

use common::{driver_options, mock_port};
use zw_core::prelude::NodeId;
use zw_driver::{ControllerCommandError, Driver};
use zw_serial::command::{Command, GetControllerIdRequest, GetRandomRequest};

#[tokio::test]
async fn test_response_roundtrip() {
    let (port, mut mock) = mock_port();
    let driver = Driver::new(port, driver_options());

    let script = tokio::spawn(async move {
        mock.expect_frame("01030020dc").await;
        mock.ack_and_respond(0x20, &[0xc0, 0x64, 0xa9, 0x9b, 0x01])
            .await;
        mock
    });

    let result = driver
        .exec_controller_command(GetControllerIdRequest::default(), None)
        .await
        .unwrap();

    let Some(Command::GetControllerIdResponse(response)) = result else {
        panic!("expected a GetControllerIdResponse, got {:?}", result);
    };
    assert_eq!(response.home_id, 0xc064a99b);
    assert_eq!(response.own_node_id, NodeId::from(1u8));

    script.await.unwrap();
}

#[tokio::test]
async fn test_three_naks_fail_the_transaction() {
    let (port, mut mock) = mock_port();
    let driver = Driver::new(port, driver_options());

    let script = tokio::spawn(async move {
        // The same frame is retransmitted twice after the first NAK
        for _ in 0..3 {
            mock.expect_frame("01030020dc").await;
            mock.nak().await;
        }
        mock
    });

    let result = driver
        .exec_controller_command(GetControllerIdRequest::default(), None)
        .await;
    assert!(matches!(result, Err(ControllerCommandError::LinkFailure)));

    let mut mock = script.await.unwrap();

    // The driver is not wedged: the next transaction goes through
    let script = tokio::spawn(async move {
        mock.expect_frame("0104001c05e2").await;
        mock.ack_and_respond(0x1c, &[0x01, 0x05, 0x11, 0x22, 0x33, 0x44, 0x55])
            .await;
    });
    let result = driver
        .exec_controller_command(GetRandomRequest::new(5), None)
        .await
        .unwrap();
    let Some(Command::GetRandomResponse(response)) = result else {
        panic!("expected a GetRandomResponse, got {:?}", result);
    };
    assert!(response.success);
    assert_eq!(response.bytes, hex::decode("1122334455").unwrap());

    script.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_can_backs_off_and_retransmits() {
    let (port, mut mock) = mock_port();
    let driver = Driver::new(port, driver_options());

    let script = tokio::spawn(async move {
        mock.expect_frame("01030020dc").await;
        mock.can().await;
        // The retransmission after the back-off must carry the same bytes
        mock.expect_frame("01030020dc").await;
        mock.ack_and_respond(0x20, &[0xc0, 0x64, 0xa9, 0x9b, 0x01])
            .await;
    });

    let result = driver
        .exec_controller_command(GetControllerIdRequest::default(), None)
        .await
        .unwrap();
    assert!(matches!(result, Some(Command::GetControllerIdResponse(_))));

    script.await.unwrap();
}
