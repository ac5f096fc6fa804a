//! Command dispatch engine
//!
//! Resolves a line of terminal input to a handler from the command
//! table and manages the pending-asynchronous-task state machine.
//! Reader-style operations that cannot finish within one scheduler
//! iteration return a wait marker; the armed task is then polled every
//! iteration and aged every tick until completion, failure, timeout,
//! or forced cancellation by a mode switch or break request.

use core::fmt::Write;

use crate::device::{ActiveMode, DeviceControl};
use crate::reader::frame::SendFrame;
use crate::reader::ops::{OpOutcome, OpPoll, ReaderOp};
use crate::terminal::commands::{CommandEntry, COMMAND_TABLE};
use crate::types::TextBuffer;

/// Reserved character meaning boolean true
pub const CHAR_TRUE: char = '1';

/// Reserved character meaning boolean false
pub const CHAR_FALSE: char = '0';

/// Reserved setter value requesting the accepted-values list
pub const SUGGEST_VALUE: &str = "?";

/// Status classification returned to the transport layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    /// Command completed
    Ok,
    /// Command completed and produced text
    OkWithText,
    /// Bulk transfer armed, transport takes over (collaborator)
    XmodemWait,
    /// No such command
    UnknownCommand,
    /// Command exists but not in this shape or mode
    InvalidUsage,
    /// Malformed, wrong-length, or out-of-range parameter
    InvalidParam,
    /// Pending task deadline elapsed
    Timeout,
}

impl CommandStatus {
    /// Numeric wire code
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 100,
            Self::OkWithText => 101,
            Self::XmodemWait => 110,
            Self::UnknownCommand => 200,
            Self::InvalidUsage => 201,
            Self::InvalidParam => 202,
            Self::Timeout => 203,
        }
    }

    /// Wire label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::OkWithText => "OK WITH TEXT",
            Self::XmodemWait => "WAIT FOR XMODEM",
            Self::UnknownCommand => "UNKNOWN COMMAND",
            Self::InvalidUsage => "INVALID COMMAND USAGE",
            Self::InvalidParam => "INVALID PARAMETER",
            Self::Timeout => "TIMEOUT",
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for CommandStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}:{}", self.code(), self.label());
    }
}

/// Status plus optional text payload, bounded by the output buffer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandResult {
    /// Status classification
    pub status: CommandStatus,
    /// Text payload, empty unless the status carries one
    pub text: TextBuffer,
}

impl CommandResult {
    /// Result with no text
    #[must_use]
    pub const fn status(status: CommandStatus) -> Self {
        Self {
            status,
            text: TextBuffer::new(),
        }
    }

    /// Result carrying text
    #[must_use]
    pub const fn with_text(status: CommandStatus, text: TextBuffer) -> Self {
        Self { status, text }
    }

    /// Render the wire form: `code:LABEL`, then the text line if any
    pub fn render(&self, out: &mut TextBuffer) {
        let _ = write!(out, "{}:{}\r\n", self.status.code(), self.status.label());
        if !self.text.is_empty() {
            let _ = out.push_str(&self.text);
            let _ = out.push_str("\r\n");
        }
    }
}

/// Reply of an executor handler
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandReply {
    /// Finished synchronously
    Status(CommandStatus),
    /// Asynchronous operation armed, result follows via polling
    Wait,
}

/// Outcome of dispatching one input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Immediate result
    Reply(CommandResult),
    /// A pending task was armed; the result arrives later
    Pending,
}

/// The at-most-one outstanding asynchronous task
#[derive(Clone, Copy, Debug)]
struct PendingTask {
    /// Deadline in ticks from arm time, 0 = unbounded
    deadline: u16,
    /// Ticks elapsed since arming
    elapsed: u16,
}

/// Holder of the optional pending task
///
/// Owned by the command engine; the device controller receives a
/// mutable reference during a mode switch so the switch protocol can
/// force-cancel in its fixed position in the teardown sequence.
#[derive(Clone, Copy, Debug, Default)]
pub struct PendingSlot {
    task: Option<PendingTask>,
}

impl PendingSlot {
    /// Empty slot
    #[must_use]
    pub const fn new() -> Self {
        Self { task: None }
    }

    /// Whether a task is outstanding
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    /// Arm a task with the given deadline in ticks (0 = unbounded)
    pub fn arm(&mut self, deadline: u16) {
        self.task = Some(PendingTask {
            deadline,
            elapsed: 0,
        });
    }

    /// Drop the task without touching the operation
    ///
    /// Callers must have quiesced the operation first.
    fn disarm(&mut self) {
        self.task = None;
    }

    /// Force-cancel any outstanding task via the active mode's
    /// cancellation path
    ///
    /// Returns whether a task was actually cancelled.
    pub fn cancel(&mut self, active: &mut ActiveMode) -> bool {
        if self.task.take().is_some() {
            active.abort_async();
            true
        } else {
            false
        }
    }
}

/// Handler view of the engine: the device plus the pending slot
///
/// Split out so handlers can switch modes (which needs the slot) and
/// arm operations through one place that keeps cancellation ordered.
pub struct CommandContext<'a> {
    /// Device controller
    pub device: &'a mut dyn DeviceControl,
    /// Pending task slot
    pub pending: &'a mut PendingSlot,
}

impl CommandContext<'_> {
    /// Arm a reader operation, cancelling any task left outstanding
    pub fn arm_op(&mut self, op: ReaderOp) -> CommandReply {
        if self.pending.is_armed() {
            self.pending.disarm();
            self.device.cancel_async();
        }
        if self.device.start_reader_op(op) {
            CommandReply::Wait
        } else {
            CommandReply::Status(CommandStatus::InvalidUsage)
        }
    }

    /// Arm a raw frame transmission, cancelling any outstanding task
    pub fn arm_frame(&mut self, frame: &SendFrame, raw: bool) -> CommandReply {
        if self.pending.is_armed() {
            self.pending.disarm();
            self.device.cancel_async();
        }
        if self.device.arm_send(frame, raw) {
            CommandReply::Wait
        } else {
            CommandReply::Status(CommandStatus::InvalidUsage)
        }
    }
}

/// The command-line engine
///
/// Feeds complete input lines through the command table and owns the
/// pending-task slot. The transport collaborator calls
/// [`CommandLine::process`] per line; the scheduler calls
/// [`CommandLine::poll`] every iteration and [`CommandLine::tick`]
/// at the tick rate.
#[derive(Debug, Default)]
pub struct CommandLine {
    pending: PendingSlot,
}

impl CommandLine {
    /// Engine with nothing pending
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: PendingSlot::new(),
        }
    }

    /// Whether an asynchronous operation is outstanding
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_armed()
    }

    /// Dispatch one line of input
    pub fn process(&mut self, line: &str, device: &mut dyn DeviceControl) -> Dispatch {
        let line = line.trim_matches(|c: char| c == '\r' || c == '\n' || c == ' ');
        if line.is_empty() {
            return Dispatch::Reply(CommandResult::status(CommandStatus::UnknownCommand));
        }

        // NAME=value and NAME param before NAME? so "NAME=?" stays a
        // suggestion query, not a getter.
        if let Some((name, param)) = line.split_once('=') {
            return self.run_setter(name, param, device);
        }
        if let Some(name) = line.strip_suffix('?') {
            return self.run_getter(name, device);
        }
        if let Some((name, param)) = line.split_once(' ') {
            return self.run_executor(name, Some(param), device);
        }
        self.run_executor(line, None, device)
    }

    /// Poll the outstanding task; emits its result when finished
    pub fn poll(&mut self, device: &mut dyn DeviceControl) -> Option<CommandResult> {
        if !self.pending.is_armed() {
            return None;
        }

        match device.poll_async() {
            OpPoll::Pending => None,
            OpPoll::Done(OpOutcome::Success(text)) => {
                self.pending.disarm();
                if text.is_empty() {
                    Some(CommandResult::status(CommandStatus::Ok))
                } else {
                    Some(CommandResult::with_text(CommandStatus::OkWithText, text))
                }
            }
            OpPoll::Done(OpOutcome::Failure) => {
                self.pending.disarm();
                Some(CommandResult::status(CommandStatus::Timeout))
            }
        }
    }

    /// Age the outstanding task by one tick
    ///
    /// A task whose deadline elapses is cancelled cooperatively and
    /// reported as a timeout.
    pub fn tick(&mut self, device: &mut dyn DeviceControl) -> Option<CommandResult> {
        let task = self.pending.task.as_mut()?;
        if task.deadline == 0 {
            return None;
        }

        task.elapsed = task.elapsed.saturating_add(1);
        if task.elapsed < task.deadline {
            return None;
        }

        self.pending.disarm();
        device.cancel_async();
        Some(CommandResult::status(CommandStatus::Timeout))
    }

    /// Force-cancel the outstanding task on an operator break request
    ///
    /// Returns whether a task was actually cancelled.
    pub fn break_pending(&mut self, device: &mut dyn DeviceControl) -> bool {
        if !self.pending.is_armed() {
            return false;
        }
        self.pending.disarm();
        device.cancel_async();
        true
    }

    /// Pending slot, handed to the device for mode switches
    pub fn pending_slot(&mut self) -> &mut PendingSlot {
        &mut self.pending
    }

    fn run_getter(&mut self, name: &str, device: &mut dyn DeviceControl) -> Dispatch {
        let Some(entry) = Self::lookup(name) else {
            return Dispatch::Reply(CommandResult::status(CommandStatus::UnknownCommand));
        };
        let Some(handler) = entry.get else {
            return Dispatch::Reply(CommandResult::status(CommandStatus::InvalidUsage));
        };

        let mut ctx = CommandContext {
            device: &mut *device,
            pending: &mut self.pending,
        };
        let mut text = TextBuffer::new();
        let status = handler(&mut ctx, &mut text);
        Dispatch::Reply(CommandResult::with_text(status, text))
    }

    fn run_setter(&mut self, name: &str, param: &str, device: &mut dyn DeviceControl) -> Dispatch {
        let Some(entry) = Self::lookup(name) else {
            return Dispatch::Reply(CommandResult::status(CommandStatus::UnknownCommand));
        };
        let Some(handler) = entry.set else {
            return Dispatch::Reply(CommandResult::status(CommandStatus::InvalidUsage));
        };

        let mut ctx = CommandContext {
            device: &mut *device,
            pending: &mut self.pending,
        };
        let mut text = TextBuffer::new();
        let status = handler(&mut ctx, param, &mut text);
        Dispatch::Reply(CommandResult::with_text(status, text))
    }

    fn run_executor(
        &mut self,
        name: &str,
        param: Option<&str>,
        device: &mut dyn DeviceControl,
    ) -> Dispatch {
        let Some(entry) = Self::lookup(name) else {
            return Dispatch::Reply(CommandResult::status(CommandStatus::UnknownCommand));
        };

        let mut ctx = CommandContext {
            device: &mut *device,
            pending: &mut self.pending,
        };
        let mut text = TextBuffer::new();
        let reply = match (param, entry.exec, entry.exec_param) {
            (None, Some(handler), _) => handler(&mut ctx, &mut text),
            (Some(p), _, Some(handler)) => handler(&mut ctx, p, &mut text),
            _ => CommandReply::Status(CommandStatus::InvalidUsage),
        };

        match reply {
            CommandReply::Status(status) => {
                Dispatch::Reply(CommandResult::with_text(status, text))
            }
            CommandReply::Wait => {
                self.pending.arm(device.pending_timeout());
                Dispatch::Pending
            }
        }
    }

    fn lookup(name: &str) -> Option<&'static CommandEntry> {
        COMMAND_TABLE
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }
}
