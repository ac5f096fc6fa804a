//! Codec strategies
//!
//! The modulation/demodulation layer of a mode. Variants model the
//! lifecycle and arming state of each physical layer; the bit-level
//! signal processing itself lives behind the hardware front end and is
//! not part of the control plane.

use crate::reader::frame::SendFrame;

/// Capability set of a physical-layer codec
pub trait Codec {
    /// Bring up the physical layer
    fn init(&mut self);

    /// Tear down the physical layer
    fn deinit(&mut self);

    /// Per-iteration work, must not block
    fn task(&mut self);

    /// Start the reader field carrier
    fn field_on(&mut self) {}

    /// Stop the reader field carrier
    fn field_off(&mut self) {}

    /// Whether the field carrier is active
    fn field_active(&self) -> bool {
        false
    }

    /// Arm a frame for transmission; `false` if unsupported
    fn arm_transmit(&mut self, frame: &SendFrame) -> bool {
        let _ = frame;
        false
    }

    /// Abort any armed transmission so the layer is quiescent
    fn quiesce(&mut self) {}
}

/// Codec selector stored in a mode profile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecKind {
    /// No physical layer
    Dummy,
    /// Proximity-card load modulation
    ProximityEmulation,
    /// Vicinity-card load modulation
    VicinityEmulation,
    /// Passive proximity-card capture
    ProximitySniff,
    /// Active proximity-card field generation
    ProximityReader,
}

impl CodecKind {
    /// Instantiate the codec for this kind, uninitialized
    #[must_use]
    pub fn instantiate(self) -> CodecStack {
        match self {
            Self::Dummy => CodecStack::Dummy(DummyCodec),
            Self::ProximityEmulation => CodecStack::Proximity(LoadModCodec::new()),
            Self::VicinityEmulation => CodecStack::Vicinity(LoadModCodec::new()),
            Self::ProximitySniff => CodecStack::Sniff(SniffCodec::new()),
            Self::ProximityReader => CodecStack::Reader(ReaderCodec::new()),
        }
    }
}

/// The closed set of codec implementations
#[derive(Clone, Debug)]
pub enum CodecStack {
    /// No-op baseline
    Dummy(DummyCodec),
    /// Proximity-card emulation
    Proximity(LoadModCodec),
    /// Vicinity-card emulation
    Vicinity(LoadModCodec),
    /// Passive sniffer
    Sniff(SniffCodec),
    /// Active reader
    Reader(ReaderCodec),
}

impl Codec for CodecStack {
    fn init(&mut self) {
        match self {
            Self::Dummy(c) => c.init(),
            Self::Proximity(c) | Self::Vicinity(c) => c.init(),
            Self::Sniff(c) => c.init(),
            Self::Reader(c) => c.init(),
        }
    }

    fn deinit(&mut self) {
        match self {
            Self::Dummy(c) => c.deinit(),
            Self::Proximity(c) | Self::Vicinity(c) => c.deinit(),
            Self::Sniff(c) => c.deinit(),
            Self::Reader(c) => c.deinit(),
        }
    }

    fn task(&mut self) {
        match self {
            Self::Dummy(c) => c.task(),
            Self::Proximity(c) | Self::Vicinity(c) => c.task(),
            Self::Sniff(c) => c.task(),
            Self::Reader(c) => c.task(),
        }
    }

    fn field_on(&mut self) {
        if let Self::Reader(c) = self {
            c.field_on();
        }
    }

    fn field_off(&mut self) {
        if let Self::Reader(c) = self {
            c.field_off();
        }
    }

    fn field_active(&self) -> bool {
        match self {
            Self::Reader(c) => c.field_active(),
            _ => false,
        }
    }

    fn arm_transmit(&mut self, frame: &SendFrame) -> bool {
        match self {
            Self::Reader(c) => c.arm_transmit(frame),
            _ => false,
        }
    }

    fn quiesce(&mut self) {
        if let Self::Reader(c) = self {
            c.quiesce();
        }
    }
}

/// No-op codec for the baseline mode
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyCodec;

impl Codec for DummyCodec {
    fn init(&mut self) {}
    fn deinit(&mut self) {}
    fn task(&mut self) {}
}

/// Load-modulation codec shared by the card-emulation families
///
/// Emulation answers an external reader's field; the control plane only
/// tracks whether the demodulator front end is online.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadModCodec {
    online: bool,
}

impl LoadModCodec {
    /// Create an offline codec
    #[must_use]
    pub const fn new() -> Self {
        Self { online: false }
    }

    /// Whether the demodulator is online
    #[must_use]
    pub const fn online(&self) -> bool {
        self.online
    }
}

impl Codec for LoadModCodec {
    fn init(&mut self) {
        self.online = true;
    }

    fn deinit(&mut self) {
        self.online = false;
    }

    fn task(&mut self) {}
}

/// Passive capture codec for the sniffer mode
#[derive(Clone, Copy, Debug, Default)]
pub struct SniffCodec {
    online: bool,
}

impl SniffCodec {
    /// Create an offline codec
    #[must_use]
    pub const fn new() -> Self {
        Self { online: false }
    }

    /// Whether capture is online
    #[must_use]
    pub const fn online(&self) -> bool {
        self.online
    }
}

impl Codec for SniffCodec {
    fn init(&mut self) {
        self.online = true;
    }

    fn deinit(&mut self) {
        self.online = false;
    }

    fn task(&mut self) {}
}

/// Field-generating codec for the active reader mode
#[derive(Clone, Debug, Default)]
pub struct ReaderCodec {
    online: bool,
    field: bool,
    armed: Option<SendFrame>,
}

impl ReaderCodec {
    /// Create an offline codec
    #[must_use]
    pub const fn new() -> Self {
        Self {
            online: false,
            field: false,
            armed: None,
        }
    }

    /// The frame currently armed for transmission, if any
    #[must_use]
    pub const fn armed_frame(&self) -> Option<&SendFrame> {
        self.armed.as_ref()
    }
}

impl Codec for ReaderCodec {
    fn init(&mut self) {
        self.online = true;
    }

    fn deinit(&mut self) {
        self.field = false;
        self.armed = None;
        self.online = false;
    }

    fn task(&mut self) {}

    fn field_on(&mut self) {
        self.field = true;
    }

    fn field_off(&mut self) {
        self.field = false;
    }

    fn field_active(&self) -> bool {
        self.field
    }

    fn arm_transmit(&mut self, frame: &SendFrame) -> bool {
        if !self.online {
            return false;
        }
        // Transmission needs the carrier up
        self.field = true;
        self.armed = Some(frame.clone());
        true
    }

    fn quiesce(&mut self) {
        self.armed = None;
    }
}
