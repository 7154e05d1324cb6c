use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use zw_driver::{Driver, DriverOptions};
use zw_logging::{ConsoleLogger, ImmutableLogger, Loglevel};
use zw_serial::serialport::{SerialPort, TcpSocket};

#[tokio::main]
async fn main() -> Result<()> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    let options = DriverOptions::builder()
        .logger(Arc::new(ConsoleLogger::new(Loglevel::Debug)) as Arc<dyn ImmutableLogger>)
        .build();

    // "host:port" means a TCP bridge like ser2net, anything else is a
    // local serial port
    let driver = if addr.contains(':') {
        let port = TcpSocket::new(&addr).with_context(|| format!("connecting to {}", addr))?;
        Driver::open(port, options).await?
    } else {
        let port = SerialPort::new(&addr).with_context(|| format!("opening {}", addr))?;
        Driver::open(port, options).await?
    };

    let cancel = CancellationToken::new();
    driver.interview_nodes(&cancel).await?;

    let controller = driver.controller();
    if let Some(info) = controller.info() {
        println!(
            "controller: home ID {:#010x}, own node ID {}",
            info.home_id, info.own_node_id
        );
    }

    for node in controller.nodes() {
        println!(
            "node {}: listening={}, interview={:?}",
            node.id(),
            node.is_listening(),
            node.interview_stage(),
        );
        for cc in node.supported_command_classes() {
            let Some(instance) = node.get_command_class(cc) else {
                continue;
            };
            match instance.version() {
                Some(version) => println!("  · {} (V{})", cc, version),
                None => println!("  · {}", cc),
            }
        }
        for (cc, error) in node.interview_errors() {
            println!("  ! {} interview failed: {}", cc, error);
        }
    }

    driver.shutdown();
    Ok(())
}
