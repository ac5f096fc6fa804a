//! Mode profile registry
//!
//! The immutable table of selectable modes. Each profile binds a codec
//! strategy and an application strategy together with the fixed metadata
//! of the emulated card family. The table is firmware-resident and never
//! mutated; the active mode (`crate::device::ActiveMode`) is a runtime
//! copy produced only by the switch protocol.

use crate::config::cards;
use crate::strategy::application::AppKind;
use crate::strategy::codec::CodecKind;
use crate::types::TagFamily;

/// Identifier of a compiled-in mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ModeId {
    /// All-dummy no-op baseline
    #[default]
    None,
    /// Mifare Ultralight emulation
    MfUltralight,
    /// Mifare Ultralight EV1 (80 byte) emulation
    MfUltralightEv1_80,
    /// Mifare Ultralight EV1 (164 byte) emulation
    MfUltralightEv1_164,
    /// Mifare Classic Mini emulation
    MfClassicMini,
    /// Mifare Classic 1K emulation
    MfClassic1k,
    /// Mifare Classic 1K with 7-byte UID
    MfClassic1k7b,
    /// Mifare Classic 4K emulation
    MfClassic4k,
    /// Mifare Classic 4K with 7-byte UID
    MfClassic4k7b,
    /// Generic vicinity-card emulation
    Vicinity,
    /// Passive proximity-card sniffer
    ProximitySniffer,
    /// Active proximity-card reader
    ProximityReader,
}

impl ModeId {
    /// All compiled-in mode identifiers, in registry order
    pub const ALL: [Self; 12] = [
        Self::None,
        Self::MfUltralight,
        Self::MfUltralightEv1_80,
        Self::MfUltralightEv1_164,
        Self::MfClassicMini,
        Self::MfClassic1k,
        Self::MfClassic1k7b,
        Self::MfClassic4k,
        Self::MfClassic4k7b,
        Self::Vicinity,
        Self::ProximitySniffer,
        Self::ProximityReader,
    ];
}

#[cfg(feature = "embedded")]
impl defmt::Format for ModeId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", ModeProfile::by_id(*self).name);
    }
}

/// One entry of the mode registry
///
/// Immutable; profiles are only ever read, and copied into the single
/// `ActiveMode` instance by the switch protocol.
#[derive(Clone, Copy, Debug)]
pub struct ModeProfile {
    /// Mode identifier
    pub id: ModeId,
    /// Display name used on the terminal
    pub name: &'static str,
    /// Physical-layer strategy for this mode
    pub codec: CodecKind,
    /// Protocol/emulation strategy for this mode
    pub application: AppKind,
    /// UID length in bytes, 0 if the mode has no UID
    pub uid_size: usize,
    /// Addressable storage size in bytes, 0 if none
    pub memory_size: u32,
    /// Default write-protection state
    pub read_only: bool,
    /// Over-the-air protocol family
    pub tag_family: TagFamily,
}

/// The registry, indexed by `ModeId` discriminant
static PROFILES: [ModeProfile; 12] = [
    ModeProfile {
        id: ModeId::None,
        name: "NONE",
        codec: CodecKind::Dummy,
        application: AppKind::Dummy,
        uid_size: 0,
        memory_size: 0,
        read_only: true,
        tag_family: TagFamily::None,
    },
    ModeProfile {
        id: ModeId::MfUltralight,
        name: "MF_ULTRALIGHT",
        codec: CodecKind::ProximityEmulation,
        application: AppKind::Ultralight,
        uid_size: cards::MF_ULTRALIGHT_UID_SIZE,
        memory_size: cards::MF_ULTRALIGHT_MEM_SIZE,
        read_only: false,
        tag_family: TagFamily::ProximityCard,
    },
    ModeProfile {
        id: ModeId::MfUltralightEv1_80,
        name: "MF_ULTRALIGHT_EV1_80B",
        codec: CodecKind::ProximityEmulation,
        application: AppKind::Ultralight,
        uid_size: cards::MF_ULTRALIGHT_UID_SIZE,
        memory_size: cards::MF_ULTRALIGHT_EV1_80_MEM_SIZE,
        read_only: false,
        tag_family: TagFamily::ProximityCard,
    },
    ModeProfile {
        id: ModeId::MfUltralightEv1_164,
        name: "MF_ULTRALIGHT_EV1_164B",
        codec: CodecKind::ProximityEmulation,
        application: AppKind::Ultralight,
        uid_size: cards::MF_ULTRALIGHT_UID_SIZE,
        memory_size: cards::MF_ULTRALIGHT_EV1_164_MEM_SIZE,
        read_only: false,
        tag_family: TagFamily::ProximityCard,
    },
    ModeProfile {
        id: ModeId::MfClassicMini,
        name: "MF_CLASSIC_MINI_4B",
        codec: CodecKind::ProximityEmulation,
        application: AppKind::ClassicMini,
        uid_size: cards::MF_CLASSIC_UID_SIZE,
        memory_size: cards::MF_CLASSIC_MINI_MEM_SIZE,
        read_only: false,
        tag_family: TagFamily::ProximityCard,
    },
    ModeProfile {
        id: ModeId::MfClassic1k,
        name: "MF_CLASSIC_1K",
        codec: CodecKind::ProximityEmulation,
        application: AppKind::Classic1k,
        uid_size: cards::MF_CLASSIC_UID_SIZE,
        memory_size: cards::MF_CLASSIC_1K_MEM_SIZE,
        read_only: false,
        tag_family: TagFamily::ProximityCard,
    },
    ModeProfile {
        id: ModeId::MfClassic1k7b,
        name: "MF_CLASSIC_1K_7B",
        codec: CodecKind::ProximityEmulation,
        application: AppKind::Classic1k7b,
        uid_size: cards::MF_CLASSIC_UID_SIZE_7B,
        memory_size: cards::MF_CLASSIC_1K_MEM_SIZE,
        read_only: false,
        tag_family: TagFamily::ProximityCard,
    },
    ModeProfile {
        id: ModeId::MfClassic4k,
        name: "MF_CLASSIC_4K",
        codec: CodecKind::ProximityEmulation,
        application: AppKind::Classic4k,
        uid_size: cards::MF_CLASSIC_UID_SIZE,
        memory_size: cards::MF_CLASSIC_4K_MEM_SIZE,
        read_only: false,
        tag_family: TagFamily::ProximityCard,
    },
    ModeProfile {
        id: ModeId::MfClassic4k7b,
        name: "MF_CLASSIC_4K_7B",
        codec: CodecKind::ProximityEmulation,
        application: AppKind::Classic4k7b,
        uid_size: cards::MF_CLASSIC_UID_SIZE_7B,
        memory_size: cards::MF_CLASSIC_4K_MEM_SIZE,
        read_only: false,
        tag_family: TagFamily::ProximityCard,
    },
    ModeProfile {
        id: ModeId::Vicinity,
        name: "VICINITY",
        codec: CodecKind::VicinityEmulation,
        application: AppKind::Vicinity,
        uid_size: cards::VICINITY_UID_SIZE,
        memory_size: cards::VICINITY_MEM_SIZE,
        read_only: false,
        tag_family: TagFamily::VicinityCard,
    },
    ModeProfile {
        id: ModeId::ProximitySniffer,
        name: "ISO14443A_SNIFF",
        codec: CodecKind::ProximitySniff,
        application: AppKind::Sniffer,
        uid_size: 0,
        memory_size: 0,
        read_only: true,
        tag_family: TagFamily::None,
    },
    ModeProfile {
        id: ModeId::ProximityReader,
        name: "ISO14443A_READER",
        codec: CodecKind::ProximityReader,
        application: AppKind::Reader,
        uid_size: 0,
        memory_size: 0,
        read_only: false,
        tag_family: TagFamily::None,
    },
];

impl ModeProfile {
    /// Look up a profile by identifier
    ///
    /// Total over `ModeId`; a hole in the table is a build defect.
    #[must_use]
    pub fn by_id(id: ModeId) -> &'static Self {
        let profile = &PROFILES[id as usize];
        debug_assert_eq!(profile.id, id);
        profile
    }

    /// Look up a profile by display name, case-sensitive exact match
    #[must_use]
    pub fn by_name(name: &str) -> Option<&'static Self> {
        PROFILES.iter().find(|p| p.name == name)
    }

    /// Display names in registry order
    pub fn names() -> impl Iterator<Item = &'static str> {
        PROFILES.iter().map(|p| p.name)
    }
}
