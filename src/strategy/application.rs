//! Application strategies
//!
//! The protocol/emulation logic layer of a mode. Emulation variants
//! carry the card identity state (UID, ATQA, SAK); the reader and
//! sniffer variants carry the asynchronous operation engine polled by
//! the command dispatcher. Frame-level protocol internals belong to the
//! codec/hardware layer and are out of scope here.

use crate::config::{cards, DUMMY_ATQA, DUMMY_SAK, VICINITY_UID_PREFIX};
use crate::reader::ops::{OpOutcome, OpPoll, ReaderOp};
use crate::types::{append_hex, Atqa, Sak, TextBuffer, Uid};

/// Capability set of a protocol/emulation application
pub trait CardApplication {
    /// Bring up the application after its codec
    fn init(&mut self);

    /// Return to the idle protocol state, keeping configuration
    fn reset(&mut self);

    /// Per-iteration work, must not block
    fn task(&mut self);

    /// Periodic work at the tick rate
    fn tick(&mut self);

    /// Process one received frame, returning the reply length
    fn process_frame(&mut self, frame: &[u8], reply: &mut [u8]) -> usize {
        let _ = (frame, reply);
        0
    }

    /// Card UID, empty for modes without one
    fn uid(&self) -> Uid {
        Uid::default()
    }

    /// Replace the card UID
    fn set_uid(&mut self, uid: &Uid) {
        let _ = uid;
    }

    /// Answer-to-request value
    fn atqa(&self) -> Atqa {
        Atqa::new(DUMMY_ATQA)
    }

    /// Replace the answer-to-request value
    fn set_atqa(&mut self, atqa: Atqa) {
        let _ = atqa;
    }

    /// Select-acknowledge value
    fn sak(&self) -> Sak {
        Sak::new(DUMMY_SAK)
    }

    /// Replace the select-acknowledge value
    fn set_sak(&mut self, sak: Sak) {
        let _ = sak;
    }
}

/// Application selector stored in a mode profile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppKind {
    /// No application
    Dummy,
    /// Mifare Ultralight family
    Ultralight,
    /// Mifare Classic Mini
    ClassicMini,
    /// Mifare Classic 1K
    Classic1k,
    /// Mifare Classic 1K, 7-byte UID
    Classic1k7b,
    /// Mifare Classic 4K
    Classic4k,
    /// Mifare Classic 4K, 7-byte UID
    Classic4k7b,
    /// Generic vicinity card
    Vicinity,
    /// Passive sniffer
    Sniffer,
    /// Active reader
    Reader,
}

impl AppKind {
    /// Instantiate the application for this kind, uninitialized
    #[must_use]
    pub fn instantiate(self, uid_size: usize) -> AppStack {
        match self {
            Self::Dummy => AppStack::Dummy(DummyApp),
            Self::Ultralight => AppStack::Card(CardApp::new(
                uid_size,
                cards::MF_ULTRALIGHT_ATQA,
                cards::MF_ULTRALIGHT_SAK,
            )),
            Self::ClassicMini => AppStack::Card(CardApp::new(
                uid_size,
                cards::MF_CLASSIC_MINI_ATQA,
                cards::MF_CLASSIC_MINI_SAK,
            )),
            Self::Classic1k => AppStack::Card(CardApp::new(
                uid_size,
                cards::MF_CLASSIC_1K_ATQA,
                cards::MF_CLASSIC_1K_SAK,
            )),
            Self::Classic1k7b => AppStack::Card(CardApp::new(
                uid_size,
                cards::MF_CLASSIC_1K_7B_ATQA,
                cards::MF_CLASSIC_1K_SAK,
            )),
            Self::Classic4k => AppStack::Card(CardApp::new(
                uid_size,
                cards::MF_CLASSIC_4K_ATQA,
                cards::MF_CLASSIC_4K_SAK,
            )),
            Self::Classic4k7b => AppStack::Card(CardApp::new(
                uid_size,
                cards::MF_CLASSIC_4K_7B_ATQA,
                cards::MF_CLASSIC_4K_SAK,
            )),
            Self::Vicinity => AppStack::Vicinity(VicinityApp::new(uid_size)),
            Self::Sniffer => AppStack::Sniffer(AsyncApp::sniffer()),
            Self::Reader => AppStack::Reader(AsyncApp::reader()),
        }
    }
}

/// The closed set of application implementations
#[derive(Clone, Debug)]
pub enum AppStack {
    /// No-op baseline
    Dummy(DummyApp),
    /// Proximity-card emulation (Ultralight and Classic families)
    Card(CardApp),
    /// Vicinity-card emulation
    Vicinity(VicinityApp),
    /// Passive sniffer
    Sniffer(AsyncApp),
    /// Active reader
    Reader(AsyncApp),
}

impl AppStack {
    /// Arm an asynchronous operation, `false` if this mode cannot run it
    pub fn start_op(&mut self, op: ReaderOp) -> bool {
        match self {
            Self::Reader(app) => app.start(op),
            Self::Sniffer(app) => app.start(op),
            _ => false,
        }
    }

    /// Poll the in-flight operation
    pub fn poll_op(&mut self) -> OpPoll {
        match self {
            Self::Reader(app) | Self::Sniffer(app) => app.poll(),
            _ => OpPoll::Pending,
        }
    }

    /// Cooperatively cancel the in-flight operation, if any
    ///
    /// Returns whether an operation was actually in flight.
    pub fn abort_op(&mut self) -> bool {
        if let Self::Reader(app) | Self::Sniffer(app) = self {
            app.abort()
        } else {
            false
        }
    }

    /// The in-flight asynchronous operation, if any
    #[must_use]
    pub fn current_op(&self) -> Option<ReaderOp> {
        match self {
            Self::Reader(app) | Self::Sniffer(app) => app.current_op(),
            _ => None,
        }
    }
}

impl CardApplication for AppStack {
    fn init(&mut self) {
        match self {
            Self::Dummy(a) => a.init(),
            Self::Card(a) => a.init(),
            Self::Vicinity(a) => a.init(),
            Self::Sniffer(a) | Self::Reader(a) => a.init(),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Dummy(a) => a.reset(),
            Self::Card(a) => a.reset(),
            Self::Vicinity(a) => a.reset(),
            Self::Sniffer(a) | Self::Reader(a) => a.reset(),
        }
    }

    fn task(&mut self) {
        match self {
            Self::Dummy(a) => a.task(),
            Self::Card(a) => a.task(),
            Self::Vicinity(a) => a.task(),
            Self::Sniffer(a) | Self::Reader(a) => a.task(),
        }
    }

    fn tick(&mut self) {
        match self {
            Self::Dummy(a) => a.tick(),
            Self::Card(a) => a.tick(),
            Self::Vicinity(a) => a.tick(),
            Self::Sniffer(a) | Self::Reader(a) => a.tick(),
        }
    }

    fn process_frame(&mut self, frame: &[u8], reply: &mut [u8]) -> usize {
        match self {
            Self::Dummy(a) => a.process_frame(frame, reply),
            Self::Card(a) => a.process_frame(frame, reply),
            Self::Vicinity(a) => a.process_frame(frame, reply),
            Self::Sniffer(a) | Self::Reader(a) => a.process_frame(frame, reply),
        }
    }

    fn uid(&self) -> Uid {
        match self {
            Self::Card(a) => a.uid(),
            Self::Vicinity(a) => a.uid(),
            _ => Uid::default(),
        }
    }

    fn set_uid(&mut self, uid: &Uid) {
        match self {
            Self::Card(a) => a.set_uid(uid),
            Self::Vicinity(a) => a.set_uid(uid),
            _ => {}
        }
    }

    fn atqa(&self) -> Atqa {
        match self {
            Self::Card(a) => a.atqa(),
            _ => Atqa::new(DUMMY_ATQA),
        }
    }

    fn set_atqa(&mut self, atqa: Atqa) {
        if let Self::Card(a) = self {
            a.set_atqa(atqa);
        }
    }

    fn sak(&self) -> Sak {
        match self {
            Self::Card(a) => a.sak(),
            _ => Sak::new(DUMMY_SAK),
        }
    }

    fn set_sak(&mut self, sak: Sak) {
        if let Self::Card(a) = self {
            a.set_sak(sak);
        }
    }
}

/// No-op application for the baseline mode
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyApp;

impl CardApplication for DummyApp {
    fn init(&mut self) {}
    fn reset(&mut self) {}
    fn task(&mut self) {}
    fn tick(&mut self) {}
}

/// Proximity-card emulation state shared by the Mifare families
#[derive(Clone, Debug)]
pub struct CardApp {
    uid: Uid,
    atqa: Atqa,
    sak: Sak,
    selected: bool,
}

impl CardApp {
    fn new(uid_size: usize, atqa: u16, sak: u8) -> Self {
        Self {
            uid: Uid::zeroed(uid_size),
            atqa: Atqa::new(atqa),
            sak: Sak::new(sak),
            selected: false,
        }
    }
}

impl CardApplication for CardApp {
    fn init(&mut self) {
        self.selected = false;
    }

    fn reset(&mut self) {
        self.selected = false;
    }

    fn task(&mut self) {}

    fn tick(&mut self) {}

    fn process_frame(&mut self, frame: &[u8], reply: &mut [u8]) -> usize {
        // Anticollision and memory commands are resolved by the codec
        // front end; the control plane only tracks selection state.
        if !frame.is_empty() {
            self.selected = true;
        }
        let _ = reply;
        0
    }

    fn uid(&self) -> Uid {
        self.uid.clone()
    }

    fn set_uid(&mut self, uid: &Uid) {
        self.uid = uid.clone();
    }

    fn atqa(&self) -> Atqa {
        self.atqa
    }

    fn set_atqa(&mut self, atqa: Atqa) {
        self.atqa = atqa;
    }

    fn sak(&self) -> Sak {
        self.sak
    }

    fn set_sak(&mut self, sak: Sak) {
        self.sak = sak;
    }
}

/// Vicinity-card emulation state
#[derive(Clone, Debug)]
pub struct VicinityApp {
    uid: Uid,
}

impl VicinityApp {
    fn new(uid_size: usize) -> Self {
        let mut uid = Uid::zeroed(uid_size);
        uid.set_prefix(VICINITY_UID_PREFIX);
        Self { uid }
    }
}

impl CardApplication for VicinityApp {
    fn init(&mut self) {}

    fn reset(&mut self) {}

    fn task(&mut self) {}

    fn tick(&mut self) {}

    fn uid(&self) -> Uid {
        self.uid.clone()
    }

    fn set_uid(&mut self, uid: &Uid) {
        self.uid = uid.clone();
    }
}

/// Which asynchronous operations an [`AsyncApp`] accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AsyncRole {
    Reader,
    Sniffer,
}

/// Operation engine behind the reader and sniffer modes
///
/// Holds at most one in-flight operation and its outcome. The codec
/// layer finishes operations by delivering frames or calling
/// [`AsyncApp::finish`]; the command dispatcher polls and cancels.
#[derive(Clone, Debug)]
pub struct AsyncApp {
    role: AsyncRole,
    op: Option<ReaderOp>,
    outcome: Option<OpOutcome>,
}

impl AsyncApp {
    /// Create the reader-mode engine
    #[must_use]
    pub const fn reader() -> Self {
        Self {
            role: AsyncRole::Reader,
            op: None,
            outcome: None,
        }
    }

    /// Create the sniffer-mode engine
    #[must_use]
    pub const fn sniffer() -> Self {
        Self {
            role: AsyncRole::Sniffer,
            op: None,
            outcome: None,
        }
    }

    /// The in-flight operation, if any
    #[must_use]
    pub const fn current_op(&self) -> Option<ReaderOp> {
        self.op
    }

    fn start(&mut self, op: ReaderOp) -> bool {
        // The sniffer only supports threshold calibration
        if self.role == AsyncRole::Sniffer && op != ReaderOp::Autocalibrate {
            return false;
        }
        self.op = Some(op);
        self.outcome = None;
        true
    }

    fn poll(&mut self) -> OpPoll {
        if self.op.is_none() {
            return OpPoll::Pending;
        }
        match self.outcome.take() {
            Some(outcome) => {
                self.op = None;
                OpPoll::Done(outcome)
            }
            None => OpPoll::Pending,
        }
    }

    fn abort(&mut self) -> bool {
        self.outcome = None;
        self.op.take().is_some()
    }

    /// Record the outcome of the in-flight operation
    pub fn finish(&mut self, outcome: OpOutcome) {
        if self.op.is_some() {
            self.outcome = Some(outcome);
        }
    }
}

impl CardApplication for AsyncApp {
    fn init(&mut self) {
        self.op = None;
        self.outcome = None;
    }

    fn reset(&mut self) {
        self.op = None;
        self.outcome = None;
    }

    fn task(&mut self) {}

    fn tick(&mut self) {}

    fn process_frame(&mut self, frame: &[u8], reply: &mut [u8]) -> usize {
        let _ = reply;
        // A delivered frame is the response that completes the
        // in-flight operation; its payload is reported as hex text.
        if self.op.is_some() {
            let mut text = TextBuffer::new();
            append_hex(&mut text, frame);
            self.outcome = Some(OpOutcome::Success(text));
        }
        0
    }
}
