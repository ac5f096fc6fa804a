//! Mode Profile Registry Tests
//!
//! Tests for the immutable mode table and its lookup operations.

use tagsim_firmware::profile::{ModeId, ModeProfile};
use tagsim_firmware::strategy::application::AppKind;
use tagsim_firmware::strategy::codec::CodecKind;
use tagsim_firmware::types::TagFamily;

// ============================================================================
// Lookup Tests
// ============================================================================

#[test]
fn test_by_id_total_over_mode_ids() {
    for id in ModeId::ALL {
        let profile = ModeProfile::by_id(id);
        assert_eq!(profile.id, id);
    }
}

#[test]
fn test_by_name_exact_match() {
    let profile = ModeProfile::by_name("MF_CLASSIC_1K").unwrap();
    assert_eq!(profile.id, ModeId::MfClassic1k);
}

#[test]
fn test_by_name_is_case_sensitive() {
    assert!(ModeProfile::by_name("mf_classic_1k").is_none());
    assert!(ModeProfile::by_name("Mf_Classic_1k").is_none());
}

#[test]
fn test_by_name_unknown() {
    assert!(ModeProfile::by_name("MF_CLASSIC_2K").is_none());
    assert!(ModeProfile::by_name("").is_none());
}

#[test]
fn test_names_in_table_order() {
    let names: Vec<&str> = ModeProfile::names().collect();
    assert_eq!(names.len(), ModeId::ALL.len());
    assert_eq!(names[0], "NONE");
    assert_eq!(names[names.len() - 1], "ISO14443A_READER");

    // Every name resolves back to its own profile
    for (i, name) in names.iter().enumerate() {
        let profile = ModeProfile::by_name(name).unwrap();
        assert_eq!(profile.id, ModeId::ALL[i]);
    }
}

#[test]
fn test_names_are_unique() {
    let names: Vec<&str> = ModeProfile::names().collect();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

// ============================================================================
// Table Metadata Tests
// ============================================================================

#[test]
fn test_baseline_profile_is_all_dummy() {
    let profile = ModeProfile::by_id(ModeId::None);
    assert_eq!(profile.name, "NONE");
    assert_eq!(profile.codec, CodecKind::Dummy);
    assert_eq!(profile.application, AppKind::Dummy);
    assert_eq!(profile.uid_size, 0);
    assert_eq!(profile.memory_size, 0);
    assert!(profile.read_only);
    assert_eq!(profile.tag_family, TagFamily::None);
}

#[test]
fn test_ultralight_profile() {
    let profile = ModeProfile::by_id(ModeId::MfUltralight);
    assert_eq!(profile.uid_size, 7);
    assert_eq!(profile.memory_size, 192);
    assert!(!profile.read_only);
    assert_eq!(profile.tag_family, TagFamily::ProximityCard);
}

#[test]
fn test_classic_profiles() {
    let c1k = ModeProfile::by_id(ModeId::MfClassic1k);
    assert_eq!(c1k.uid_size, 4);
    assert_eq!(c1k.memory_size, 1024);

    let c1k7 = ModeProfile::by_id(ModeId::MfClassic1k7b);
    assert_eq!(c1k7.uid_size, 7);
    assert_eq!(c1k7.memory_size, 1024);

    let c4k = ModeProfile::by_id(ModeId::MfClassic4k);
    assert_eq!(c4k.uid_size, 4);
    assert_eq!(c4k.memory_size, 4096);

    let c4k7 = ModeProfile::by_id(ModeId::MfClassic4k7b);
    assert_eq!(c4k7.uid_size, 7);
    assert_eq!(c4k7.memory_size, 4096);
}

#[test]
fn test_vicinity_profile() {
    let profile = ModeProfile::by_id(ModeId::Vicinity);
    assert_eq!(profile.uid_size, 8);
    assert_eq!(profile.memory_size, 8192);
    assert_eq!(profile.tag_family, TagFamily::VicinityCard);
    assert_eq!(profile.codec, CodecKind::VicinityEmulation);
}

#[test]
fn test_reader_and_sniffer_have_no_uid() {
    let reader = ModeProfile::by_id(ModeId::ProximityReader);
    assert_eq!(reader.uid_size, 0);
    assert_eq!(reader.memory_size, 0);
    assert_eq!(reader.codec, CodecKind::ProximityReader);
    assert_eq!(reader.application, AppKind::Reader);

    let sniffer = ModeProfile::by_id(ModeId::ProximitySniffer);
    assert_eq!(sniffer.uid_size, 0);
    assert!(sniffer.read_only);
    assert_eq!(sniffer.codec, CodecKind::ProximitySniff);
}

#[test]
fn test_emulation_profiles_use_load_modulation() {
    for id in [
        ModeId::MfUltralight,
        ModeId::MfUltralightEv1_80,
        ModeId::MfUltralightEv1_164,
        ModeId::MfClassicMini,
        ModeId::MfClassic1k,
        ModeId::MfClassic1k7b,
        ModeId::MfClassic4k,
        ModeId::MfClassic4k7b,
    ] {
        let profile = ModeProfile::by_id(id);
        assert_eq!(profile.codec, CodecKind::ProximityEmulation);
        assert_eq!(profile.tag_family, TagFamily::ProximityCard);
    }
}
