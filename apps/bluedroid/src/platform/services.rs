//! Service triggers issued through an external command.

use crate::config::ServiceBackend;
use bluedroid_core::ServiceControl;
use std::io;
use std::process::Command;
use tracing::debug;

/// Runs `setprop ctl.start <svc>` / `systemctl start <svc>` and friends.
///
/// Only the command's exit status is observed; whether the service actually
/// reached its target state is left to the caller.
#[derive(Debug, Clone)]
pub struct CommandServices {
    backend: ServiceBackend,
}

impl CommandServices {
    pub fn new(backend: ServiceBackend) -> Self {
        Self { backend }
    }

    fn command(&self, start: bool, service: &str) -> Command {
        match &self.backend {
            ServiceBackend::Property { program } => {
                let mut cmd = Command::new(program);
                cmd.arg(if start { "ctl.start" } else { "ctl.stop" }).arg(service);
                cmd
            }
            ServiceBackend::Systemd { program } => {
                let mut cmd = Command::new(program);
                cmd.arg(if start { "start" } else { "stop" }).arg(service);
                cmd
            }
        }
    }

    fn trigger(&self, start: bool, service: &str) -> io::Result<()> {
        let mut cmd = self.command(start, service);
        debug!(command = ?cmd, "service trigger");

        let status = cmd.status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("{:?} exited with {}", cmd.get_program(), status)))
        }
    }
}

impl ServiceControl for CommandServices {
    fn start(&mut self, service: &str) -> io::Result<()> {
        self.trigger(true, service)
    }

    fn stop(&mut self, service: &str) -> io::Result<()> {
        self.trigger(false, service)
    }
}
