//! Command Dispatch Engine Tests
//!
//! Tests for line parsing, the status taxonomy, the suggestion
//! convention, and the pending-task state machine.

use std::cell::Cell;
use std::rc::Rc;

use tagsim_firmware::device::{
    AntennaControl, Device, DeviceControl, RamSettings, SystemControl,
};
use tagsim_firmware::profile::ModeId;
use tagsim_firmware::terminal::dispatch::{CommandLine, CommandStatus, Dispatch};
use tagsim_firmware::types::{TextBuffer, Uid};

// ============================================================================
// Test Rig
// ============================================================================

#[derive(Clone, Debug, Default)]
struct SharedAntenna(Rc<Cell<bool>>);

impl AntennaControl for SharedAntenna {
    fn set_load(&mut self, enabled: bool) {
        self.0.set(enabled);
    }
}

#[derive(Clone, Debug, Default)]
struct ResetCounter(Rc<Cell<u32>>);

impl SystemControl for ResetCounter {
    fn reset(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

type TestDevice = Device<SharedAntenna, RamSettings, ResetCounter>;

fn rig() -> (CommandLine, TestDevice) {
    let device = Device::new(
        SharedAntenna::default(),
        RamSettings::new(),
        ResetCounter::default(),
        42,
    );
    (CommandLine::new(), device)
}

fn status(dispatch: &Dispatch) -> CommandStatus {
    match dispatch {
        Dispatch::Reply(result) => result.status,
        Dispatch::Pending => panic!("expected an immediate reply"),
    }
}

fn text(dispatch: &Dispatch) -> String {
    match dispatch {
        Dispatch::Reply(result) => result.text.as_str().to_string(),
        Dispatch::Pending => panic!("expected an immediate reply"),
    }
}

// ============================================================================
// Line Parsing Tests
// ============================================================================

#[test]
fn test_unknown_command() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("BOGUS", &mut device);
    assert_eq!(status(&reply), CommandStatus::UnknownCommand);
}

#[test]
fn test_empty_line() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("", &mut device);
    assert_eq!(status(&reply), CommandStatus::UnknownCommand);
}

#[test]
fn test_command_names_are_case_insensitive() {
    let (mut engine, mut device) = rig();
    assert_eq!(
        status(&engine.process("version?", &mut device)),
        CommandStatus::OkWithText
    );
    assert_eq!(
        status(&engine.process("Config?", &mut device)),
        CommandStatus::OkWithText
    );
}

#[test]
fn test_line_endings_are_stripped() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("CONFIG?\r\n", &mut device);
    assert_eq!(text(&reply), "NONE");
}

#[test]
fn test_wrong_shape_is_invalid_usage() {
    let (mut engine, mut device) = rig();
    // VERSION has no executor shape, HELP has no getter shape
    assert_eq!(
        status(&engine.process("VERSION", &mut device)),
        CommandStatus::InvalidUsage
    );
    assert_eq!(
        status(&engine.process("HELP?", &mut device)),
        CommandStatus::InvalidUsage
    );
    assert_eq!(
        status(&engine.process("SYSTICK=5", &mut device)),
        CommandStatus::InvalidUsage
    );
}

// ============================================================================
// Getter / Setter Tests
// ============================================================================

#[test]
fn test_version() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("VERSION?", &mut device);
    assert_eq!(status(&reply), CommandStatus::OkWithText);
    assert!(text(&reply).contains("tagsim-firmware"));
}

#[test]
fn test_config_switch() {
    let (mut engine, mut device) = rig();

    let reply = engine.process("CONFIG=MF_ULTRALIGHT", &mut device);
    assert_eq!(status(&reply), CommandStatus::Ok);
    assert_eq!(device.mode_id(), ModeId::MfUltralight);
    assert_eq!(text(&engine.process("CONFIG?", &mut device)), "MF_ULTRALIGHT");
}

#[test]
fn test_config_unknown_name() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("CONFIG=MF_CLASSIC_2K", &mut device);
    assert_eq!(status(&reply), CommandStatus::InvalidParam);
    assert_eq!(device.mode_id(), ModeId::None);
}

#[test]
fn test_config_suggestion_lists_all_modes() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("CONFIG=?", &mut device);
    assert_eq!(status(&reply), CommandStatus::OkWithText);

    let list = text(&reply);
    for name in ["NONE", "MF_ULTRALIGHT", "VICINITY", "ISO14443A_READER"] {
        assert!(list.contains(name), "missing {name} in {list}");
    }
}

#[test]
fn test_uid_without_uid_mode() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("UID?", &mut device);
    assert_eq!(status(&reply), CommandStatus::OkWithText);
    assert_eq!(text(&reply), "NO UID.");
}

#[test]
fn test_uid_set_and_get() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=MF_CLASSIC_1K", &mut device);

    assert_eq!(
        status(&engine.process("UID=DEADBEEF", &mut device)),
        CommandStatus::Ok
    );
    assert_eq!(text(&engine.process("UID?", &mut device)), "DEADBEEF");
}

#[test]
fn test_uid_wrong_length() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=MF_CLASSIC_1K", &mut device);
    assert_eq!(
        status(&engine.process("UID=DEADBEEF00", &mut device)),
        CommandStatus::InvalidParam
    );
}

#[test]
fn test_uid_random_keyword() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=MF_ULTRALIGHT", &mut device);

    assert_eq!(
        status(&engine.process("UID=random", &mut device)),
        CommandStatus::Ok
    );
    assert_eq!(text(&engine.process("UID?", &mut device)).len(), 14);
    assert_eq!(text(&engine.process("UIDSIZE?", &mut device)), "7");
}

#[test]
fn test_atqa_sak_wire_format() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=MF_CLASSIC_1K", &mut device);

    assert_eq!(text(&engine.process("ATQA?", &mut device)), "0004");
    assert_eq!(text(&engine.process("SAK?", &mut device)), "08");

    assert_eq!(
        status(&engine.process("ATQA=0042", &mut device)),
        CommandStatus::Ok
    );
    assert_eq!(
        status(&engine.process("SAK=20", &mut device)),
        CommandStatus::Ok
    );
    assert_eq!(text(&engine.process("ATQA?", &mut device)), "0042");
    assert_eq!(text(&engine.process("SAK?", &mut device)), "20");

    assert_eq!(
        status(&engine.process("ATQA=42", &mut device)),
        CommandStatus::InvalidParam
    );
    assert_eq!(
        status(&engine.process("SAK=2", &mut device)),
        CommandStatus::InvalidParam
    );
}

#[test]
fn test_read_only_flag() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=MF_ULTRALIGHT", &mut device);

    assert_eq!(text(&engine.process("READONLY?", &mut device)), "0");
    assert_eq!(
        status(&engine.process("READONLY=1", &mut device)),
        CommandStatus::Ok
    );
    assert_eq!(text(&engine.process("READONLY?", &mut device)), "1");
    assert_eq!(
        status(&engine.process("READONLY=x", &mut device)),
        CommandStatus::InvalidParam
    );
    assert_eq!(text(&engine.process("READONLY=?", &mut device)), "1,0");
}

#[test]
fn test_memsize() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=MF_CLASSIC_4K", &mut device);
    assert_eq!(text(&engine.process("MEMSIZE?", &mut device)), "4096");
}

#[test]
fn test_timeout_range() {
    let (mut engine, mut device) = rig();

    assert_eq!(text(&engine.process("TIMEOUT?", &mut device)), "1000 ms");
    assert_eq!(
        status(&engine.process("TIMEOUT=600", &mut device)),
        CommandStatus::Ok
    );
    assert_eq!(text(&engine.process("TIMEOUT?", &mut device)), "60000 ms");
    assert_eq!(
        status(&engine.process("TIMEOUT=601", &mut device)),
        CommandStatus::InvalidParam
    );
    // Range error keeps the previous value
    assert_eq!(text(&engine.process("TIMEOUT?", &mut device)), "60000 ms");
}

#[test]
fn test_threshold_range() {
    let (mut engine, mut device) = rig();

    assert_eq!(
        status(&engine.process("THRESHOLD=4095", &mut device)),
        CommandStatus::Ok
    );
    assert_eq!(text(&engine.process("THRESHOLD?", &mut device)), "4095");
    assert_eq!(
        status(&engine.process("THRESHOLD=4096", &mut device)),
        CommandStatus::InvalidParam
    );
    assert_eq!(text(&engine.process("THRESHOLD?", &mut device)), "4095");
}

#[test]
fn test_baudrate_range() {
    let (mut engine, mut device) = rig();

    assert_eq!(text(&engine.process("BAUDRATE?", &mut device)), "460800");
    assert_eq!(
        status(&engine.process("BAUDRATE=115200", &mut device)),
        CommandStatus::Ok
    );
    assert_eq!(
        status(&engine.process("BAUDRATE=9600", &mut device)),
        CommandStatus::InvalidParam
    );
    assert_eq!(text(&engine.process("BAUDRATE?", &mut device)), "115200");
}

#[test]
fn test_setting_slots() {
    let (mut engine, mut device) = rig();

    assert_eq!(text(&engine.process("SETTING?", &mut device)), "0");
    assert_eq!(
        status(&engine.process("SETTING=3", &mut device)),
        CommandStatus::Ok
    );
    assert_eq!(text(&engine.process("SETTING?", &mut device)), "3");
    assert_eq!(
        status(&engine.process("SETTING=99", &mut device)),
        CommandStatus::InvalidParam
    );
    assert_eq!(text(&engine.process("SETTING=?", &mut device)), "0,1,2,3,4,5,6,7,8");
}

#[test]
fn test_systick_renders_four_hex_digits() {
    let (mut engine, mut device) = rig();
    assert_eq!(text(&engine.process("SYSTICK?", &mut device)), "0000");
    for _ in 0..0x1A {
        device.advance_systick();
    }
    assert_eq!(text(&engine.process("SYSTICK?", &mut device)), "001A");
}

#[test]
fn test_help_lists_commands() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("HELP", &mut device);
    assert_eq!(status(&reply), CommandStatus::OkWithText);

    let list = text(&reply);
    for name in ["VERSION", "CONFIG", "UID", "SEND", "SENDRAW", "AUTOCALIBRATE"] {
        assert!(list.split(',').any(|n| n == name), "missing {name}");
    }
}

#[test]
fn test_reset_executor() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("RESET", &mut device);
    assert_eq!(status(&reply), CommandStatus::Ok);
}

// ============================================================================
// Suggestion Purity Tests
// ============================================================================

#[derive(Debug, PartialEq)]
struct Snapshot {
    mode: ModeId,
    uid: Uid,
    atqa: u16,
    sak: u8,
    read_only: bool,
    slot: usize,
    timeout: u16,
    threshold: u16,
    baud: u32,
    field: bool,
}

fn snapshot(device: &TestDevice) -> Snapshot {
    Snapshot {
        mode: device.mode_id(),
        uid: device.uid(),
        atqa: device.atqa().value(),
        sak: device.sak().value(),
        read_only: device.read_only(),
        slot: device.active_slot(),
        timeout: device.pending_timeout(),
        threshold: device.reader_threshold(),
        baud: device.baud_rate(),
        field: device.field_active(),
    }
}

#[test]
fn test_suggest_never_mutates_state() {
    let (mut engine, mut device) = rig();

    engine.process("CONFIG=MF_ULTRALIGHT", &mut device);
    engine.process("UID=04AABBCCDDEE77", &mut device);
    engine.process("READONLY=1", &mut device);
    engine.process("TIMEOUT=42", &mut device);

    let before = snapshot(&device);
    for setter in [
        "CONFIG", "UID", "ATQA", "SAK", "READONLY", "SETTING", "TIMEOUT", "THRESHOLD",
        "BAUDRATE", "FIELD",
    ] {
        let mut line = String::from(setter);
        line.push_str("=?");
        let reply = engine.process(&line, &mut device);
        assert_eq!(status(&reply), CommandStatus::OkWithText, "{setter}");
        assert_eq!(snapshot(&device), before, "{setter} mutated state");
        assert!(!engine.is_pending());
    }
}

// ============================================================================
// Pending Task Tests
// ============================================================================

#[test]
fn test_reader_executor_in_wrong_mode() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=MF_ULTRALIGHT", &mut device);

    for line in ["IDENTIFY", "GETUID", "DUMP_MFU", "AUTOCALIBRATE", "SEND 9320"] {
        let reply = engine.process(line, &mut device);
        assert_eq!(status(&reply), CommandStatus::InvalidUsage, "{line}");
        assert!(!engine.is_pending(), "{line} armed a task");
    }
}

#[test]
fn test_reader_executor_arms_pending_task() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=ISO14443A_READER", &mut device);

    let reply = engine.process("IDENTIFY", &mut device);
    assert!(matches!(reply, Dispatch::Pending));
    assert!(engine.is_pending());
    assert!(engine.poll(&mut device).is_none());
}

#[test]
fn test_pending_task_completes_with_frame() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=ISO14443A_READER", &mut device);
    engine.process("GETUID", &mut device);

    // The codec receive path delivers the card's answer
    let mut reply_buf = [0u8; 16];
    device.deliver_frame(&[0x04, 0xAA, 0xBB, 0xCC], &mut reply_buf);

    let result = engine.poll(&mut device).unwrap();
    assert_eq!(result.status, CommandStatus::OkWithText);
    assert_eq!(result.text.as_str(), "04AABBCC");
    assert!(!engine.is_pending());
}

#[test]
fn test_pending_task_times_out_after_deadline() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=ISO14443A_READER", &mut device);
    engine.process("TIMEOUT=5", &mut device);
    engine.process("IDENTIFY", &mut device);

    for _ in 0..4 {
        assert!(engine.tick(&mut device).is_none());
    }
    let result = engine.tick(&mut device).unwrap();
    assert_eq!(result.status, CommandStatus::Timeout);
    assert!(!engine.is_pending());
    assert_eq!(device.cancelled_ops(), 1);
    assert!(device.current().current_op().is_none());
}

#[test]
fn test_zero_timeout_is_unbounded() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=ISO14443A_READER", &mut device);
    engine.process("TIMEOUT=0", &mut device);
    engine.process("IDENTIFY", &mut device);

    for _ in 0..1000 {
        assert!(engine.tick(&mut device).is_none());
    }
    assert!(engine.is_pending());
}

#[test]
fn test_break_cancels_pending_task() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=ISO14443A_READER", &mut device);
    engine.process("IDENTIFY", &mut device);

    assert!(engine.break_pending(&mut device));
    assert!(!engine.is_pending());
    assert_eq!(device.cancelled_ops(), 1);
    assert!(!engine.break_pending(&mut device));
}

#[test]
fn test_mode_switch_cancels_pending_task() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=ISO14443A_READER", &mut device);
    engine.process("IDENTIFY", &mut device);
    assert!(engine.is_pending());

    let reply = engine.process("CONFIG=NONE", &mut device);
    assert_eq!(status(&reply), CommandStatus::Ok);
    assert!(!engine.is_pending());
    assert_eq!(device.cancelled_ops(), 1);
    assert!(engine.poll(&mut device).is_none());
}

#[test]
fn test_clone_switches_to_reader_and_arms() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=MF_ULTRALIGHT", &mut device);

    let reply = engine.process("CLONE_MFU", &mut device);
    assert!(matches!(reply, Dispatch::Pending));
    assert_eq!(device.mode_id(), ModeId::ProximityReader);
    assert!(engine.is_pending());
}

#[test]
fn test_autocalibrate_in_sniffer_mode() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=ISO14443A_SNIFF", &mut device);

    let reply = engine.process("AUTOCALIBRATE", &mut device);
    assert!(matches!(reply, Dispatch::Pending));
}

#[test]
fn test_send_parameter_errors() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=ISO14443A_READER", &mut device);

    assert_eq!(
        status(&engine.process("SEND ABC", &mut device)),
        CommandStatus::InvalidParam
    );
    assert_eq!(
        status(&engine.process("SEND 0009 3F", &mut device)),
        CommandStatus::InvalidParam
    );
    assert_eq!(
        status(&engine.process("SENDRAW 000C 9320", &mut device)),
        CommandStatus::InvalidParam
    );
    assert!(!engine.is_pending());
}

#[test]
fn test_send_arms_transmission() {
    let (mut engine, mut device) = rig();
    engine.process("CONFIG=ISO14443A_READER", &mut device);

    let reply = engine.process("SEND 0007 3F", &mut device);
    assert!(matches!(reply, Dispatch::Pending));
    assert!(engine.is_pending());
    // Arming the transmission raises the field carrier
    assert!(device.field_active());
}

// ============================================================================
// Result Rendering Tests
// ============================================================================

#[test]
fn test_render_status_only() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("CONFIG=MF_ULTRALIGHT", &mut device);

    let Dispatch::Reply(result) = reply else {
        panic!("expected reply");
    };
    let mut out = TextBuffer::new();
    result.render(&mut out);
    assert_eq!(out.as_str(), "100:OK\r\n");
}

#[test]
fn test_render_status_with_text() {
    let (mut engine, mut device) = rig();
    let reply = engine.process("CONFIG?", &mut device);

    let Dispatch::Reply(result) = reply else {
        panic!("expected reply");
    };
    let mut out = TextBuffer::new();
    result.render(&mut out);
    assert_eq!(out.as_str(), "101:OK WITH TEXT\r\nNONE\r\n");
}

#[test]
fn test_error_status_codes() {
    let (mut engine, mut device) = rig();

    let Dispatch::Reply(result) = engine.process("BOGUS", &mut device) else {
        panic!("expected reply");
    };
    assert_eq!(result.status.code(), 200);

    let Dispatch::Reply(result) = engine.process("IDENTIFY", &mut device) else {
        panic!("expected reply");
    };
    assert_eq!(result.status.code(), 201);

    let Dispatch::Reply(result) = engine.process("CONFIG=XX", &mut device) else {
        panic!("expected reply");
    };
    assert_eq!(result.status.code(), 202);
}
