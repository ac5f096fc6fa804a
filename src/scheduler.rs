//! Cooperative executive
//!
//! The single execution context of the firmware. Every iteration runs
//! the active codec task, the active application task, the periodic
//! application tick at the divided rate, and the pending-task poll.
//! Each step runs to completion; anything that would block is modeled
//! as a pending asynchronous operation instead.

use crate::config::TASK_ITERATIONS_PER_TICK;
use crate::device::DeviceControl;
use crate::terminal::dispatch::{CommandLine, CommandResult, Dispatch};

/// Couples a device controller with the command engine and drives both
#[derive(Debug)]
pub struct Executive<D: DeviceControl> {
    device: D,
    terminal: CommandLine,
    iterations: u32,
}

impl<D: DeviceControl> Executive<D> {
    /// Wrap a booted device
    pub fn new(device: D) -> Self {
        Self {
            device,
            terminal: CommandLine::new(),
            iterations: 0,
        }
    }

    /// Device controller
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// Mutable device controller
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Whether an asynchronous operation is outstanding
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.terminal.is_pending()
    }

    /// Dispatch one line of terminal input
    pub fn handle_line(&mut self, line: &str) -> Dispatch {
        self.terminal.process(line, &mut self.device)
    }

    /// Force-cancel the outstanding operation on an operator break
    pub fn break_pending(&mut self) -> bool {
        self.terminal.break_pending(&mut self.device)
    }

    /// One scheduler iteration
    ///
    /// Returns the pending task's result on the iteration it finishes
    /// or times out; the transport forwards it to the operator.
    pub fn iterate(&mut self) -> Option<CommandResult> {
        self.device.codec_task();
        self.device.app_task();

        self.iterations = self.iterations.wrapping_add(1);
        if self.iterations % TASK_ITERATIONS_PER_TICK == 0 {
            self.device.app_tick();
            self.device.advance_systick();
            if let Some(result) = self.terminal.tick(&mut self.device) {
                return Some(result);
            }
        }

        self.terminal.poll(&mut self.device)
    }

    /// Run whole ticks worth of iterations, stopping at the first
    /// pending-task result
    pub fn run_ticks(&mut self, ticks: u32) -> Option<CommandResult> {
        for _ in 0..ticks * TASK_ITERATIONS_PER_TICK {
            if let Some(result) = self.iterate() {
                return Some(result);
            }
        }
        None
    }
}
