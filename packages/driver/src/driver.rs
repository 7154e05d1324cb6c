use crate::error::{Error, Result};
use awaited::{AwaitedRef, Predicate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, oneshot};
use typed_builder::TypedBuilder;
use zw_core::prelude::NodeId;
use zw_core::submodule;
use zw_logging::loggers::{
    controller::ControllerLogger, driver::DriverLogger, node::NodeLogger, serial::SerialLogger,
};
use zw_logging::{ConsoleLogger, ImmutableLogger, Loglevel};
use zw_serial::binding::SerialBinding;
use zw_serial::command::Command;
use zw_serial::command_raw::CommandRaw;
use zw_serial::frame::{ControlFlow, RawSerialFrame};

use crate::node::cc_api::ReceivedCC;

pub(crate) mod awaited;
mod callback_id;
mod serial_task;

submodule!(exec_command);
submodule!(exec_controller_command);
submodule!(exec_node_command);
submodule!(main_loop);
submodule!(serial_api_machine);
submodule!(storage);

use serial_task::{SerialTask, SerialTaskCommand, SerialTaskCommandSender};

/// What the serial task hands to the main loop
pub(crate) enum SerialEvent {
    ControlFlow(ControlFlow),
    Command(CommandRaw),
}

#[derive(TypedBuilder)]
pub struct DriverOptions {
    #[builder(default, setter(into, strip_option))]
    pub logger: Option<Arc<dyn ImmutableLogger>>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The driver owns the background tasks speaking to a Z-Wave controller and
/// is the entry point for everything this library can do. It is cheap to
/// clone; all clones talk to the same controller.
#[derive(Clone)]
pub struct Driver {
    serial_cmd: SerialTaskCommandSender,
    main_cmd: MainTaskCommandSender,
    storage: Arc<DriverStorage>,
    shutdown: Arc<Notify>,
}

impl Driver {
    /// Creates a driver over the given transport and spawns its background
    /// tasks, without talking to the controller yet. Must be called from
    /// within a tokio runtime.
    pub fn new<S>(port: S, options: DriverOptions) -> Self
    where
        S: SerialBinding,
    {
        let logger = options
            .logger
            .unwrap_or_else(|| Arc::new(ConsoleLogger::new(Loglevel::Info)));

        let (serial_cmd_tx, serial_cmd_rx) = mpsc::channel(16);
        let (main_cmd_tx, main_cmd_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(16);
        let shutdown = Arc::new(Notify::new());

        let storage = Arc::new(DriverStorage::new(logger));

        let serial_task = SerialTask::new(
            port,
            serial_cmd_rx,
            event_tx,
            SerialLogger::new(storage.logger().clone()),
            shutdown.clone(),
        );
        let main_loop = MainLoop::new(storage.clone(), main_cmd_rx, event_rx, shutdown.clone());

        tokio::spawn(serial_task.run());
        tokio::spawn(main_loop.run());

        Self {
            serial_cmd: serial_cmd_tx,
            main_cmd: main_cmd_tx,
            storage,
            shutdown,
        }
    }

    /// Opens the driver: spawns the background tasks, identifies the
    /// controller and discovers the nodes in the network.
    pub async fn open<S>(port: S, options: DriverOptions) -> Result<Self>
    where
        S: SerialBinding,
    {
        let driver = Self::new(port, options);
        driver.identify_controller().await?;
        driver.discover_nodes().await?;
        Ok(driver)
    }

    /// Stops the background tasks. Pending transactions fail.
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }

    pub(crate) fn storage(&self) -> &Arc<DriverStorage> {
        &self.storage
    }

    /// Writes a frame to the serial port and waits until it is on the wire
    pub(crate) async fn write_serial(&self, frame: RawSerialFrame) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.serial_cmd
            .send(SerialTaskCommand::SendFrame {
                frame,
                callback: tx,
            })
            .await
            .map_err(|_| Error::Internal)?;
        rx.await.map_err(|_| Error::Internal)??;
        Ok(())
    }

    pub(crate) async fn await_control_flow_frame(
        &self,
        predicate: Predicate<ControlFlow>,
        timeout: Option<Duration>,
    ) -> Result<AwaitedRef<ControlFlow>> {
        let (tx, rx) = oneshot::channel();
        self.main_cmd
            .send(MainTaskCommand::RegisterAwaitedControlFlow {
                predicate,
                timeout,
                callback: tx,
            })
            .await
            .map_err(|_| Error::Internal)?;
        rx.await.map_err(|_| Error::Internal)
    }

    pub(crate) async fn await_command(
        &self,
        predicate: Predicate<Command>,
        timeout: Option<Duration>,
    ) -> Result<AwaitedRef<Command>> {
        let (tx, rx) = oneshot::channel();
        self.main_cmd
            .send(MainTaskCommand::RegisterAwaitedCommand {
                predicate,
                timeout,
                callback: tx,
            })
            .await
            .map_err(|_| Error::Internal)?;
        rx.await.map_err(|_| Error::Internal)
    }

    pub(crate) async fn await_cc(
        &self,
        predicate: Predicate<ReceivedCC>,
        timeout: Option<Duration>,
    ) -> Result<AwaitedRef<ReceivedCC>> {
        let (tx, rx) = oneshot::channel();
        self.main_cmd
            .send(MainTaskCommand::RegisterAwaitedCC {
                predicate,
                timeout,
                callback: tx,
            })
            .await
            .map_err(|_| Error::Internal)?;
        rx.await.map_err(|_| Error::Internal)
    }

    pub(crate) fn log(&self) -> DriverLogger {
        DriverLogger::new(self.storage.logger().clone())
    }

    pub(crate) fn controller_log(&self) -> ControllerLogger {
        ControllerLogger::new(self.storage.logger().clone())
    }

    pub(crate) fn node_log(&self, node_id: NodeId) -> NodeLogger {
        NodeLogger::new(self.storage.logger().clone(), node_id)
    }
}
