//! Device controller
//!
//! Owns the single live mode instance and performs the switch protocol.
//! Hardware collaborators (antenna load, settings persistence, system
//! reset) sit behind traits so the control plane stays host-testable.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::config::{
    DEFAULT_BAUDRATE, DEFAULT_PENDING_TIMEOUT_TICKS, DEFAULT_READER_THRESHOLD,
    SETTINGS_SLOT_COUNT, UID_SIZE_MAX, VICINITY_UID_PREFIX,
};
use crate::profile::{ModeId, ModeProfile};
use crate::reader::frame::SendFrame;
use crate::reader::ops::{OpPoll, ReaderOp};
use crate::strategy::application::{AppStack, CardApplication};
use crate::strategy::codec::{Codec, CodecStack};
use crate::terminal::dispatch::PendingSlot;
use crate::types::{Atqa, Sak, TagFamily, Uid};

/// Antenna-load front end
///
/// The load is enabled while emulating so a reader close by is not
/// blinded, and disabled while this device itself is the reader.
pub trait AntennaControl {
    /// Switch the antenna load on or off
    fn set_load(&mut self, enabled: bool);
}

/// Persistent settings collaborator
///
/// Slot-structured: each regular slot remembers its own mode and
/// per-slot tunables; one overflow slot follows the regular ones.
pub trait SettingsStore {
    /// Index of the active slot
    fn active_slot(&self) -> usize;

    /// Number of regular slots
    fn slot_count(&self) -> usize;

    /// Make `slot` active; `false` if out of range
    fn select_slot(&mut self, slot: usize) -> bool;

    /// Mode persisted in the active slot
    fn persisted_mode(&self) -> ModeId;

    /// Persist a mode into the active slot
    fn persist_mode(&mut self, id: ModeId);

    /// Pending-task timeout of the active slot, in ticks
    fn pending_timeout(&self) -> u16;

    /// Update the pending-task timeout of the active slot
    fn set_pending_timeout(&mut self, ticks: u16);

    /// Reader demodulation threshold of the active slot
    fn reader_threshold(&self) -> u16;

    /// Update the reader demodulation threshold of the active slot
    fn set_reader_threshold(&mut self, value: u16);

    /// Serial baud rate (device-global)
    fn baud_rate(&self) -> u32;

    /// Update the serial baud rate
    fn set_baud_rate(&mut self, baud: u32);
}

/// System-level actions (intentional restarts)
pub trait SystemControl {
    /// Reset the device
    fn reset(&mut self);
}

/// Per-slot persisted values
#[derive(Clone, Copy, Debug)]
pub struct SlotSettings {
    /// Selected mode
    pub mode: ModeId,
    /// Pending-task timeout in ticks
    pub pending_timeout: u16,
    /// Reader demodulation threshold
    pub reader_threshold: u16,
}

impl Default for SlotSettings {
    fn default() -> Self {
        Self {
            mode: ModeId::None,
            pending_timeout: DEFAULT_PENDING_TIMEOUT_TICKS,
            reader_threshold: DEFAULT_READER_THRESHOLD,
        }
    }
}

/// In-memory settings store
///
/// The regular slots plus the overflow slot. Persistence to
/// non-volatile storage is a transport-side concern layered on top.
#[derive(Clone, Debug)]
pub struct RamSettings {
    slots: [SlotSettings; SETTINGS_SLOT_COUNT + 1],
    active: usize,
    baud: u32,
}

impl RamSettings {
    /// Create a store with default slots
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [SlotSettings::default(); SETTINGS_SLOT_COUNT + 1],
            active: 0,
            baud: DEFAULT_BAUDRATE,
        }
    }
}

impl Default for RamSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for RamSettings {
    fn active_slot(&self) -> usize {
        self.active
    }

    fn slot_count(&self) -> usize {
        SETTINGS_SLOT_COUNT
    }

    fn select_slot(&mut self, slot: usize) -> bool {
        if slot < self.slots.len() {
            self.active = slot;
            true
        } else {
            false
        }
    }

    fn persisted_mode(&self) -> ModeId {
        self.slots[self.active].mode
    }

    fn persist_mode(&mut self, id: ModeId) {
        self.slots[self.active].mode = id;
    }

    fn pending_timeout(&self) -> u16 {
        self.slots[self.active].pending_timeout
    }

    fn set_pending_timeout(&mut self, ticks: u16) {
        self.slots[self.active].pending_timeout = ticks;
    }

    fn reader_threshold(&self) -> u16 {
        self.slots[self.active].reader_threshold
    }

    fn set_reader_threshold(&mut self, value: u16) {
        self.slots[self.active].reader_threshold = value;
    }

    fn baud_rate(&self) -> u32 {
        self.baud
    }

    fn set_baud_rate(&mut self, baud: u32) {
        self.baud = baud;
    }
}

/// The single live mode instance
///
/// A runtime copy of one profile's metadata plus the owned, live
/// strategy pair. `read_only` may be toggled at runtime; the other
/// metadata only changes as part of a full switch.
#[derive(Debug)]
pub struct ActiveMode {
    id: ModeId,
    uid_size: usize,
    memory_size: u32,
    read_only: bool,
    tag_family: TagFamily,
    codec: CodecStack,
    application: AppStack,
}

impl ActiveMode {
    fn from_profile(profile: &ModeProfile) -> Self {
        Self {
            id: profile.id,
            uid_size: profile.uid_size,
            memory_size: profile.memory_size,
            read_only: profile.read_only,
            tag_family: profile.tag_family,
            codec: profile.codec.instantiate(),
            application: profile.application.instantiate(profile.uid_size),
        }
    }

    /// Mode identifier
    #[must_use]
    pub const fn id(&self) -> ModeId {
        self.id
    }

    /// UID length in bytes, 0 if the mode has no UID
    #[must_use]
    pub const fn uid_size(&self) -> usize {
        self.uid_size
    }

    /// Addressable storage size in bytes
    #[must_use]
    pub const fn memory_size(&self) -> u32 {
        self.memory_size
    }

    /// Write-protection state
    #[must_use]
    pub const fn read_only(&self) -> bool {
        self.read_only
    }

    /// Over-the-air protocol family
    #[must_use]
    pub const fn tag_family(&self) -> TagFamily {
        self.tag_family
    }

    /// The in-flight asynchronous operation, if any
    #[must_use]
    pub fn current_op(&self) -> Option<crate::reader::ops::ReaderOp> {
        self.application.current_op()
    }

    /// Cooperatively cancel any in-flight asynchronous operation
    ///
    /// Returns whether an operation was actually cancelled.
    pub(crate) fn abort_async(&mut self) -> bool {
        let cancelled = self.application.abort_op();
        self.codec.quiesce();
        cancelled
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ActiveMode {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Mode({}, uid={}, mem={}, ro={})",
            self.id,
            self.uid_size as u32,
            self.memory_size,
            self.read_only
        );
    }
}

/// Control surface the command dispatcher operates on
///
/// Object-safe so the const command table can hold plain function
/// pointers over `&mut dyn DeviceControl`.
pub trait DeviceControl {
    /// Active mode identifier
    fn mode_id(&self) -> ModeId;

    /// Active mode display name
    fn mode_name(&self) -> &'static str;

    /// Run the full switch protocol for `id`
    fn switch_to(&mut self, id: ModeId, pending: &mut PendingSlot);

    /// Switch by display name, enforcing the final-slot policy
    fn switch_by_name(&mut self, name: &str, pending: &mut PendingSlot) -> bool;

    /// UID length of the active mode
    fn uid_size(&self) -> usize;

    /// Storage size of the active mode
    fn memory_size(&self) -> u32;

    /// Write-protection state
    fn read_only(&self) -> bool;

    /// Toggle write protection
    fn set_read_only(&mut self, read_only: bool);

    /// Card UID from the active application
    fn uid(&self) -> Uid;

    /// Set the UID from hex text of exactly `uid_size` bytes
    fn set_uid_hex(&mut self, text: &str) -> bool;

    /// Generate a random UID honoring the family prefix convention
    fn set_uid_random(&mut self);

    /// Answer-to-request value
    fn atqa(&self) -> Atqa;

    /// Set the answer-to-request value
    fn set_atqa(&mut self, atqa: Atqa);

    /// Select-acknowledge value
    fn sak(&self) -> Sak;

    /// Set the select-acknowledge value
    fn set_sak(&mut self, sak: Sak);

    /// Protocol family of the active mode
    fn tag_family(&self) -> TagFamily;

    /// Active settings slot
    fn active_slot(&self) -> usize;

    /// Number of regular settings slots
    fn slot_count(&self) -> usize;

    /// Activate a settings slot and its persisted mode
    fn select_slot(&mut self, slot: usize, pending: &mut PendingSlot) -> bool;

    /// Pending-task timeout in ticks
    fn pending_timeout(&self) -> u16;

    /// Update the pending-task timeout
    fn set_pending_timeout(&mut self, ticks: u16);

    /// Reader demodulation threshold
    fn reader_threshold(&self) -> u16;

    /// Update the reader demodulation threshold
    fn set_reader_threshold(&mut self, value: u16);

    /// Serial baud rate
    fn baud_rate(&self) -> u32;

    /// Update the serial baud rate
    fn set_baud_rate(&mut self, baud: u32);

    /// Whether the reader field carrier is active
    fn field_active(&self) -> bool;

    /// Start or stop the reader field carrier
    fn set_field(&mut self, on: bool);

    /// Tick counter since boot
    fn systick(&self) -> u32;

    /// Advance the tick counter (scheduler only)
    fn advance_systick(&mut self);

    /// Intentional device restart
    fn reset_system(&mut self);

    /// Arm an asynchronous operation on the active application
    fn start_reader_op(&mut self, op: ReaderOp) -> bool;

    /// Arm a raw frame transmission
    fn arm_send(&mut self, frame: &SendFrame, raw: bool) -> bool;

    /// Poll the in-flight asynchronous operation
    fn poll_async(&mut self) -> OpPoll;

    /// Cooperatively cancel the in-flight asynchronous operation
    fn cancel_async(&mut self);

    /// Per-iteration codec work
    fn codec_task(&mut self);

    /// Per-iteration application work
    fn app_task(&mut self);

    /// Periodic application work at the tick rate
    fn app_tick(&mut self);
}

/// Device controller owning the active mode and its collaborators
#[derive(Debug)]
pub struct Device<A, S, C>
where
    A: AntennaControl,
    S: SettingsStore,
    C: SystemControl,
{
    active: ActiveMode,
    antenna: A,
    settings: S,
    system: C,
    rng: SmallRng,
    tick: u32,
    cancelled_ops: u32,
}

impl<A, S, C> Device<A, S, C>
where
    A: AntennaControl,
    S: SettingsStore,
    C: SystemControl,
{
    /// Boot the device: baseline mode first, then the persisted mode
    pub fn new(antenna: A, settings: S, system: C, seed: u64) -> Self {
        let mut device = Self {
            active: ActiveMode::from_profile(ModeProfile::by_id(ModeId::None)),
            antenna,
            settings,
            system,
            rng: SmallRng::seed_from_u64(seed),
            tick: 0,
            cancelled_ops: 0,
        };

        // No command engine exists yet, so nothing can be pending
        let mut boot = PendingSlot::new();
        let persisted = device.settings.persisted_mode();
        device.switch_to(persisted, &mut boot);
        device
    }

    /// Read view of the active mode
    #[must_use]
    pub const fn current(&self) -> &ActiveMode {
        &self.active
    }

    /// Settings collaborator
    #[must_use]
    pub const fn settings(&self) -> &S {
        &self.settings
    }

    /// Deliver a received frame to the active application
    ///
    /// Called from the codec receive path; returns the reply length.
    pub fn deliver_frame(&mut self, frame: &[u8], reply: &mut [u8]) -> usize {
        self.active.application.process_frame(frame, reply)
    }

    /// Count of asynchronous operations force-cancelled since boot
    #[must_use]
    pub const fn cancelled_ops(&self) -> u32 {
        self.cancelled_ops
    }
}

impl<A, S, C> DeviceControl for Device<A, S, C>
where
    A: AntennaControl,
    S: SettingsStore,
    C: SystemControl,
{
    fn mode_id(&self) -> ModeId {
        self.active.id
    }

    fn mode_name(&self) -> &'static str {
        ModeProfile::by_id(self.active.id).name
    }

    fn switch_to(&mut self, id: ModeId, pending: &mut PendingSlot) {
        // Fixed teardown/bring-up order; runs to completion with no
        // task or tick invocation in between.
        self.active.codec.deinit();
        if pending.cancel(&mut self.active) {
            self.cancelled_ops = self.cancelled_ops.saturating_add(1);
        }
        self.settings.persist_mode(id);
        self.active = ActiveMode::from_profile(ModeProfile::by_id(id));
        self.antenna.set_load(id != ModeId::ProximityReader);
        self.active.codec.init();
        self.active.application.init();
    }

    fn switch_by_name(&mut self, name: &str, pending: &mut PendingSlot) -> bool {
        let Some(profile) = ModeProfile::by_name(name) else {
            return false;
        };

        // The overflow slot may only hold the reader mode, so a safe
        // mode stays reachable once the regular slots are exhausted.
        if self.settings.active_slot() >= self.settings.slot_count()
            && profile.id != ModeId::ProximityReader
        {
            return false;
        }

        self.switch_to(profile.id, pending);
        true
    }

    fn uid_size(&self) -> usize {
        self.active.uid_size
    }

    fn memory_size(&self) -> u32 {
        self.active.memory_size
    }

    fn read_only(&self) -> bool {
        self.active.read_only
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.active.read_only = read_only;
    }

    fn uid(&self) -> Uid {
        self.active.application.uid()
    }

    fn set_uid_hex(&mut self, text: &str) -> bool {
        let Some(uid) = Uid::from_hex(text, self.active.uid_size) else {
            return false;
        };
        if uid.is_empty() {
            return false;
        }
        self.active.application.set_uid(&uid);
        true
    }

    fn set_uid_random(&mut self) {
        let size = self.active.uid_size;
        if size == 0 || size > UID_SIZE_MAX {
            return;
        }

        let mut buf = [0u8; UID_SIZE_MAX];
        self.rng.fill_bytes(&mut buf[..size]);
        if let Some(mut uid) = Uid::from_bytes(&buf[..size]) {
            if self.active.tag_family == TagFamily::VicinityCard {
                uid.set_prefix(VICINITY_UID_PREFIX);
            }
            self.active.application.set_uid(&uid);
        }
    }

    fn atqa(&self) -> Atqa {
        self.active.application.atqa()
    }

    fn set_atqa(&mut self, atqa: Atqa) {
        self.active.application.set_atqa(atqa);
    }

    fn sak(&self) -> Sak {
        self.active.application.sak()
    }

    fn set_sak(&mut self, sak: Sak) {
        self.active.application.set_sak(sak);
    }

    fn tag_family(&self) -> TagFamily {
        self.active.tag_family
    }

    fn active_slot(&self) -> usize {
        self.settings.active_slot()
    }

    fn slot_count(&self) -> usize {
        self.settings.slot_count()
    }

    fn select_slot(&mut self, slot: usize, pending: &mut PendingSlot) -> bool {
        if !self.settings.select_slot(slot) {
            return false;
        }
        let mode = self.settings.persisted_mode();
        self.switch_to(mode, pending);
        true
    }

    fn pending_timeout(&self) -> u16 {
        self.settings.pending_timeout()
    }

    fn set_pending_timeout(&mut self, ticks: u16) {
        self.settings.set_pending_timeout(ticks);
    }

    fn reader_threshold(&self) -> u16 {
        self.settings.reader_threshold()
    }

    fn set_reader_threshold(&mut self, value: u16) {
        self.settings.set_reader_threshold(value);
    }

    fn baud_rate(&self) -> u32 {
        self.settings.baud_rate()
    }

    fn set_baud_rate(&mut self, baud: u32) {
        self.settings.set_baud_rate(baud);
    }

    fn field_active(&self) -> bool {
        self.active.codec.field_active()
    }

    fn set_field(&mut self, on: bool) {
        if on {
            self.active.codec.field_on();
        } else {
            self.active.codec.field_off();
        }
    }

    fn systick(&self) -> u32 {
        self.tick
    }

    fn advance_systick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    fn reset_system(&mut self) {
        self.system.reset();
    }

    fn start_reader_op(&mut self, op: ReaderOp) -> bool {
        self.active.application.reset();
        if !self.active.application.start_op(op) {
            return false;
        }
        if matches!(self.active.codec, CodecStack::Reader(_)) {
            self.active.codec.field_on();
        }
        true
    }

    fn arm_send(&mut self, frame: &SendFrame, raw: bool) -> bool {
        self.active.application.reset();
        let op = if raw { ReaderOp::SendRaw } else { ReaderOp::Send };
        if !self.active.application.start_op(op) {
            return false;
        }
        if !self.active.codec.arm_transmit(frame) {
            self.active.application.abort_op();
            return false;
        }
        true
    }

    fn poll_async(&mut self) -> OpPoll {
        self.active.application.poll_op()
    }

    fn cancel_async(&mut self) {
        if self.active.abort_async() {
            self.cancelled_ops = self.cancelled_ops.saturating_add(1);
        }
    }

    fn codec_task(&mut self) {
        self.active.codec.task();
    }

    fn app_task(&mut self) {
        self.active.application.task();
    }

    fn app_tick(&mut self) {
        self.active.application.tick();
    }
}
