//! Asynchronous operation kinds and poll results
//!
//! Long-running card operations are modeled as resumable poll steps
//! rather than blocking calls: a command handler arms one of these and
//! the scheduler polls it until completion, failure, or timeout.

use crate::types::TextBuffer;

/// Asynchronous operation armed by a command handler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderOp {
    /// Identify a card in the field
    Identify,
    /// Acquire the UID of a card in the field
    GetUid,
    /// Dump a Mifare Ultralight card
    DumpUltralight,
    /// Clone a Mifare Ultralight card into emulation storage
    CloneUltralight,
    /// Calibrate the demodulation threshold
    Autocalibrate,
    /// Transmit an arbitrary frame, parity-framed wire format
    Send,
    /// Transmit an arbitrary frame, raw bit variant
    SendRaw,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ReaderOp {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Identify => defmt::write!(f, "IDENTIFY"),
            Self::GetUid => defmt::write!(f, "GETUID"),
            Self::DumpUltralight => defmt::write!(f, "DUMP_MFU"),
            Self::CloneUltralight => defmt::write!(f, "CLONE_MFU"),
            Self::Autocalibrate => defmt::write!(f, "AUTOCALIBRATE"),
            Self::Send => defmt::write!(f, "SEND"),
            Self::SendRaw => defmt::write!(f, "SENDRAW"),
        }
    }
}

/// Result of polling the in-flight operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpPoll {
    /// Still running; poll again next iteration
    Pending,
    /// Finished; the engine emits the outcome and returns to idle
    Done(OpOutcome),
}

/// Terminal state of a finished operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpOutcome {
    /// Completed, optionally with response text
    Success(TextBuffer),
    /// Failed (no card, protocol error); surfaced as a timeout status
    Failure,
}
