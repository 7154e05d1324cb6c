mod common;

use common::{open_driver_with_network, request, script_node2_interview};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zw_core::prelude::{CommandClasses, NodeId};
use zw_driver::cc_api::binary_switch;
use zw_driver::{CacheValue, InterviewStage};

#[tokio::test]
async fn test_open_discovers_the_network() {
    let (driver, _mock) = open_driver_with_network().await;

    let controller = driver.controller();
    let info = controller.info().unwrap();
    assert_eq!(info.home_id, 0xc064a99b);
    assert_eq!(info.own_node_id, NodeId::new(1));
    assert_eq!(info.api_version, 5);
    assert_eq!(
        controller.node_ids(),
        vec![NodeId::new(1), NodeId::new(2)]
    );

    let node = controller.node(NodeId::new(2)).unwrap();
    assert!(node.is_listening());
    assert_eq!(node.interview_stage(), InterviewStage::NotStarted);
    assert!(controller.node(NodeId::new(3)).is_none());
}

#[tokio::test]
async fn test_node_interview() {
    let (driver, mut mock) = open_driver_with_network().await;
    let cancel = CancellationToken::new();

    let interview = {
        let driver = driver.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let controller = driver.controller();
            let node = controller.node(NodeId::new(2)).unwrap();
            node.interview(&cancel).await
        })
    };

    script_node2_interview(&mut mock).await;
    interview.await.unwrap().unwrap();

    let controller = driver.controller();
    let node = controller.node(NodeId::new(2)).unwrap();

    assert_eq!(node.interview_stage(), InterviewStage::Complete);
    assert!(node.interview_errors().is_empty());
    assert_eq!(
        node.supported_command_classes(),
        vec![CommandClasses::BinarySwitch, CommandClasses::Version]
    );

    // The Version CC interview ran first and wrote the versions into the
    // other instances
    let version_cc = node.get_command_class(CommandClasses::Version).unwrap();
    assert_eq!(version_cc.version(), Some(2));
    assert_eq!(
        version_cc.cached_value("firmwareVersion"),
        Some(CacheValue::String("1.2".to_string()))
    );

    let switch_cc = node.get_command_class(CommandClasses::BinarySwitch).unwrap();
    assert_eq!(switch_cc.version(), Some(2));
    assert_eq!(switch_cc.effective_version(), 2);
    // The state query at the end of the interview was cached
    assert_eq!(
        switch_cc.cached_value(binary_switch::CURRENT_VALUE),
        Some(CacheValue::Bool(true))
    );
    // V1 commands are supported, the version is known
    assert_eq!(switch_cc.is_command_supported(0x02), Some(true));
}

#[tokio::test]
async fn test_unsolicited_report_updates_state_but_invalid_one_does_not() {
    let (driver, mut mock) = open_driver_with_network().await;
    let cancel = CancellationToken::new();

    let interview = {
        let driver = driver.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let controller = driver.controller();
            let node = controller.node(NodeId::new(2)).unwrap();
            node.interview(&cancel).await
        })
    };
    script_node2_interview(&mut mock).await;
    interview.await.unwrap().unwrap();

    let controller = driver.controller();
    let node = controller.node(NodeId::new(2)).unwrap();
    let switch_cc = node.get_command_class(CommandClasses::BinarySwitch).unwrap();

    // An unsolicited "off" report flips the cached state...
    let report = {
        let driver = driver.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let controller = driver.controller();
            let node = controller.node(NodeId::new(2)).unwrap();
            let switch_cc = node.get_command_class(CommandClasses::BinarySwitch).unwrap();
            switch_cc
                .await_next_report(0x03, None, Some(Duration::from_secs(5)), &cancel)
                .await
        })
    };
    // Give the waiter time to register
    tokio::time::sleep(Duration::from_millis(50)).await;
    mock.send(request(0x04, &[0x00, 0x02, 0x03, 0x25, 0x03, 0x00]))
        .await;
    let received = report.await.unwrap().unwrap();
    assert_eq!(received.command.payload, vec![0x00]);
    assert_eq!(
        switch_cc.cached_value(binary_switch::CURRENT_VALUE),
        Some(CacheValue::Bool(false))
    );

    // ...but a report with a value outside the defined range is dropped
    // silently and leaves the cache untouched
    mock.send(request(0x04, &[0x00, 0x02, 0x03, 0x25, 0x03, 0x42]))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        switch_cc.cached_value(binary_switch::CURRENT_VALUE),
        Some(CacheValue::Bool(false))
    );
}

#[tokio::test]
async fn test_concurrent_waiters_all_see_the_frame() {
    let (driver, mut mock) = open_driver_with_network().await;
    let cancel = CancellationToken::new();

    let interview = {
        let driver = driver.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let controller = driver.controller();
            let node = controller.node(NodeId::new(2)).unwrap();
            node.interview(&cancel).await
        })
    };
    script_node2_interview(&mut mock).await;
    interview.await.unwrap().unwrap();

    let mut waiters = Vec::new();
    for _ in 0..3 {
        let driver = driver.clone();
        let cancel = cancel.clone();
        waiters.push(tokio::spawn(async move {
            let controller = driver.controller();
            let node = controller.node(NodeId::new(2)).unwrap();
            let switch_cc = node.get_command_class(CommandClasses::BinarySwitch).unwrap();
            switch_cc
                .await_next_report(0x03, None, Some(Duration::from_secs(5)), &cancel)
                .await
        }));
    }
    // Give the waiters time to register
    tokio::time::sleep(Duration::from_millis(50)).await;

    mock.send(request(0x04, &[0x00, 0x02, 0x03, 0x25, 0x03, 0xff]))
        .await;

    for waiter in waiters {
        let received = waiter.await.unwrap().unwrap();
        assert_eq!(received.command.cc_id, CommandClasses::BinarySwitch);
        assert_eq!(received.command.payload, vec![0xff]);
    }
}

#[tokio::test]
async fn test_await_next_report_cancellation() {
    let (driver, mut mock) = open_driver_with_network().await;
    let cancel = CancellationToken::new();

    let interview = {
        let driver = driver.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let controller = driver.controller();
            let node = controller.node(NodeId::new(2)).unwrap();
            node.interview(&cancel).await
        })
    };
    script_node2_interview(&mut mock).await;
    interview.await.unwrap().unwrap();

    // A predicate that never matches: only cancellation can end this wait
    let wait_cancel = CancellationToken::new();
    let waiter = {
        let driver = driver.clone();
        let wait_cancel = wait_cancel.clone();
        tokio::spawn(async move {
            let controller = driver.controller();
            let node = controller.node(NodeId::new(2)).unwrap();
            let switch_cc = node.get_command_class(CommandClasses::BinarySwitch).unwrap();
            switch_cc
                .await_next_report(0x03, Some(Box::new(|_| false)), None, &wait_cancel)
                .await
        })
    };

    // Even a matching command ID does not resolve the waiter
    mock.send(request(0x04, &[0x00, 0x02, 0x03, 0x25, 0x03, 0xff]))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    wait_cancel.cancel();
    let result = waiter.await.unwrap();
    assert!(matches!(result, Err(zw_driver::error::Error::Cancelled)));
}
