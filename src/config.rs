//! System configuration and device constants
//!
//! This module defines compile-time constants for the contactless front end.
//! All buffer bounds, protocol defaults, and scheduler parameters are
//! centralized here.

/// Terminal response buffer size in bytes
pub const TERMINAL_BUFFER_SIZE: usize = 256;

/// Maximum UID length supported by any compiled-in mode
pub const UID_SIZE_MAX: usize = 16;

/// Raw send frame capacity in bytes
pub const RAW_FRAME_CAPACITY: usize = 64;

/// Scheduler iterations per application tick
pub const TASK_ITERATIONS_PER_TICK: u32 = 32;

/// Application tick interval in milliseconds
pub const TICK_INTERVAL_MS: u32 = 100;

/// Upper bound for the pending-task timeout, in ticks
pub const PENDING_TIMEOUT_MAX_TICKS: u16 = 600;

/// Default pending-task timeout (10 ticks = 1 second)
pub const DEFAULT_PENDING_TIMEOUT_TICKS: u16 = 10;

/// Maximum reader demodulation threshold (12-bit DAC range)
pub const READER_THRESHOLD_MAX: u16 = 4095;

/// Default reader demodulation threshold
pub const DEFAULT_READER_THRESHOLD: u16 = 400;

/// Minimum accepted serial baud rate
pub const BAUDRATE_MIN: u32 = 115_200;

/// Maximum accepted serial baud rate
pub const BAUDRATE_MAX: u32 = 921_600;

/// Default serial baud rate
pub const DEFAULT_BAUDRATE: u32 = 460_800;

/// Number of regular settings slots; one overflow slot follows them
pub const SETTINGS_SLOT_COUNT: usize = 8;

/// First UID byte required by the vicinity-card addressing convention
pub const VICINITY_UID_PREFIX: u8 = 0xE0;

/// ATQA reported by modes without an application of their own
pub const DUMMY_ATQA: u16 = 0x0004;

/// SAK reported by modes without an application of their own
pub const DUMMY_SAK: u8 = 0x04;

/// Card family parameters
pub mod cards {
    //! Per-family UID sizes, memory sizes, and anticollision defaults

    /// Mifare Ultralight UID size
    pub const MF_ULTRALIGHT_UID_SIZE: usize = 7;

    /// Mifare Ultralight user memory size
    pub const MF_ULTRALIGHT_MEM_SIZE: u32 = 192;

    /// Mifare Ultralight EV1 (80 byte) memory size
    pub const MF_ULTRALIGHT_EV1_80_MEM_SIZE: u32 = 320;

    /// Mifare Ultralight EV1 (164 byte) memory size
    pub const MF_ULTRALIGHT_EV1_164_MEM_SIZE: u32 = 656;

    /// Mifare Ultralight ATQA
    pub const MF_ULTRALIGHT_ATQA: u16 = 0x0044;

    /// Mifare Ultralight SAK
    pub const MF_ULTRALIGHT_SAK: u8 = 0x00;

    /// Mifare Classic single-size UID
    pub const MF_CLASSIC_UID_SIZE: usize = 4;

    /// Mifare Classic double-size UID
    pub const MF_CLASSIC_UID_SIZE_7B: usize = 7;

    /// Mifare Classic Mini memory size
    pub const MF_CLASSIC_MINI_MEM_SIZE: u32 = 320;

    /// Mifare Classic 1K memory size
    pub const MF_CLASSIC_1K_MEM_SIZE: u32 = 1024;

    /// Mifare Classic 4K memory size
    pub const MF_CLASSIC_4K_MEM_SIZE: u32 = 4096;

    /// Mifare Classic Mini ATQA
    pub const MF_CLASSIC_MINI_ATQA: u16 = 0x0004;

    /// Mifare Classic Mini SAK
    pub const MF_CLASSIC_MINI_SAK: u8 = 0x09;

    /// Mifare Classic 1K ATQA
    pub const MF_CLASSIC_1K_ATQA: u16 = 0x0004;

    /// Mifare Classic 1K ATQA with the cascade bit (7-byte UID)
    pub const MF_CLASSIC_1K_7B_ATQA: u16 = 0x0044;

    /// Mifare Classic 1K SAK
    pub const MF_CLASSIC_1K_SAK: u8 = 0x08;

    /// Mifare Classic 4K ATQA
    pub const MF_CLASSIC_4K_ATQA: u16 = 0x0002;

    /// Mifare Classic 4K ATQA with the cascade bit (7-byte UID)
    pub const MF_CLASSIC_4K_7B_ATQA: u16 = 0x0042;

    /// Mifare Classic 4K SAK
    pub const MF_CLASSIC_4K_SAK: u8 = 0x18;

    /// Vicinity-card UID size
    pub const VICINITY_UID_SIZE: usize = 8;

    /// Vicinity-card memory size
    pub const VICINITY_MEM_SIZE: u32 = 8192;
}
