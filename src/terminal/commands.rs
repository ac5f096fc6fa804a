//! Command table and handlers
//!
//! Each command registers up to four handler shapes: executor
//! (`NAME`), executor with parameter (`NAME param`), getter (`NAME?`)
//! and setter (`NAME=value`). A setter invoked with the reserved `?`
//! value returns its accepted-values list without mutating anything.

use core::fmt::Write;

use crate::config::{
    BAUDRATE_MAX, BAUDRATE_MIN, PENDING_TIMEOUT_MAX_TICKS, READER_THRESHOLD_MAX, TICK_INTERVAL_MS,
};
use crate::profile::{ModeId, ModeProfile};
use crate::reader::frame::parse_send_param;
use crate::reader::ops::ReaderOp;
use crate::terminal::dispatch::{
    CommandContext, CommandReply, CommandStatus, CHAR_FALSE, CHAR_TRUE, SUGGEST_VALUE,
};
use crate::types::TextBuffer;

/// Keyword accepted by the UID setter to generate a random UID
pub const UID_RANDOM: &str = "random";

/// Sentinel text reported by modes without a UID
pub const NO_UID_TEXT: &str = "NO UID.";

/// Getter handler: produces text
pub type GetHandler = fn(&mut CommandContext<'_>, &mut TextBuffer) -> CommandStatus;

/// Setter handler: consumes one parameter, may produce text
pub type SetHandler = fn(&mut CommandContext<'_>, &str, &mut TextBuffer) -> CommandStatus;

/// Executor handler: triggers an action, may arm a pending task
pub type ExecHandler = fn(&mut CommandContext<'_>, &mut TextBuffer) -> CommandReply;

/// Executor-with-parameter handler
pub type ExecParamHandler = fn(&mut CommandContext<'_>, &str, &mut TextBuffer) -> CommandReply;

/// One entry of the command table
pub struct CommandEntry {
    /// Command name, matched case-insensitively
    pub name: &'static str,
    /// Executor shape
    pub exec: Option<ExecHandler>,
    /// Executor-with-parameter shape
    pub exec_param: Option<ExecParamHandler>,
    /// Getter shape
    pub get: Option<GetHandler>,
    /// Setter shape
    pub set: Option<SetHandler>,
}

impl CommandEntry {
    const fn get(name: &'static str, get: GetHandler) -> Self {
        Self {
            name,
            exec: None,
            exec_param: None,
            get: Some(get),
            set: None,
        }
    }

    const fn get_set(name: &'static str, get: GetHandler, set: SetHandler) -> Self {
        Self {
            name,
            exec: None,
            exec_param: None,
            get: Some(get),
            set: Some(set),
        }
    }

    const fn exec(name: &'static str, exec: ExecHandler) -> Self {
        Self {
            name,
            exec: Some(exec),
            exec_param: None,
            get: None,
            set: None,
        }
    }

    const fn exec_param(name: &'static str, exec_param: ExecParamHandler) -> Self {
        Self {
            name,
            exec: None,
            exec_param: Some(exec_param),
            get: None,
            set: None,
        }
    }
}

/// The command surface, in help order
pub static COMMAND_TABLE: &[CommandEntry] = &[
    CommandEntry::get("VERSION", get_version),
    CommandEntry::get_set("CONFIG", get_config, set_config),
    CommandEntry::get_set("UID", get_uid, set_uid),
    CommandEntry::get("UIDSIZE", get_uid_size),
    CommandEntry::get_set("ATQA", get_atqa, set_atqa),
    CommandEntry::get_set("SAK", get_sak, set_sak),
    CommandEntry::get_set("READONLY", get_read_only, set_read_only),
    CommandEntry::get("MEMSIZE", get_mem_size),
    CommandEntry::get_set("SETTING", get_setting, set_setting),
    CommandEntry::get_set("TIMEOUT", get_timeout, set_timeout),
    CommandEntry::get_set("THRESHOLD", get_threshold, set_threshold),
    CommandEntry::get_set("BAUDRATE", get_baudrate, set_baudrate),
    CommandEntry::get_set("FIELD", get_field, set_field),
    CommandEntry::get("SYSTICK", get_systick),
    CommandEntry::exec("HELP", exec_help),
    CommandEntry::exec("RESET", exec_reset),
    CommandEntry::exec("IDENTIFY", exec_identify),
    CommandEntry::exec("GETUID", exec_get_uid),
    CommandEntry::exec("DUMP_MFU", exec_dump_mfu),
    CommandEntry::exec("CLONE_MFU", exec_clone_mfu),
    CommandEntry::exec("AUTOCALIBRATE", exec_autocalibrate),
    CommandEntry::exec_param("SEND", exec_send),
    CommandEntry::exec_param("SENDRAW", exec_send_raw),
];

fn is_suggest(param: &str) -> bool {
    param == SUGGEST_VALUE
}

fn bool_char(value: bool) -> char {
    if value {
        CHAR_TRUE
    } else {
        CHAR_FALSE
    }
}

fn get_version(_ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = write!(
        out,
        "{} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    CommandStatus::OkWithText
}

fn get_config(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = out.push_str(ctx.device.mode_name());
    CommandStatus::OkWithText
}

fn set_config(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandStatus {
    if is_suggest(param) {
        let mut first = true;
        for name in ModeProfile::names() {
            if !first && out.push(',').is_err() {
                break;
            }
            first = false;
            if out.push_str(name).is_err() {
                break;
            }
        }
        return CommandStatus::OkWithText;
    }

    if ctx.device.switch_by_name(param, ctx.pending) {
        CommandStatus::Ok
    } else {
        CommandStatus::InvalidParam
    }
}

fn get_uid(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    if ctx.device.uid_size() == 0 {
        let _ = out.push_str(NO_UID_TEXT);
        return CommandStatus::OkWithText;
    }

    ctx.device.uid().write_hex(out);
    CommandStatus::OkWithText
}

fn set_uid(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandStatus {
    if is_suggest(param) {
        let _ = write!(out, "{} hex digits,{}", ctx.device.uid_size() * 2, UID_RANDOM);
        return CommandStatus::OkWithText;
    }

    if param.eq_ignore_ascii_case(UID_RANDOM) {
        ctx.device.set_uid_random();
        return CommandStatus::Ok;
    }

    if ctx.device.set_uid_hex(param) {
        CommandStatus::Ok
    } else {
        CommandStatus::InvalidParam
    }
}

fn get_uid_size(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = write!(out, "{}", ctx.device.uid_size());
    CommandStatus::OkWithText
}

fn get_atqa(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    ctx.device.atqa().write_hex(out);
    CommandStatus::OkWithText
}

fn set_atqa(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandStatus {
    if is_suggest(param) {
        let _ = out.push_str("4 hex digits, e.g. 0004");
        return CommandStatus::OkWithText;
    }

    match crate::types::Atqa::from_hex(param) {
        Some(atqa) => {
            ctx.device.set_atqa(atqa);
            CommandStatus::Ok
        }
        None => CommandStatus::InvalidParam,
    }
}

fn get_sak(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    ctx.device.sak().write_hex(out);
    CommandStatus::OkWithText
}

fn set_sak(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandStatus {
    if is_suggest(param) {
        let _ = out.push_str("2 hex digits, e.g. 08");
        return CommandStatus::OkWithText;
    }

    match crate::types::Sak::from_hex(param) {
        Some(sak) => {
            ctx.device.set_sak(sak);
            CommandStatus::Ok
        }
        None => CommandStatus::InvalidParam,
    }
}

fn get_read_only(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = out.push(bool_char(ctx.device.read_only()));
    CommandStatus::OkWithText
}

fn set_read_only(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandStatus {
    if is_suggest(param) {
        let _ = write!(out, "{CHAR_TRUE},{CHAR_FALSE}");
        return CommandStatus::OkWithText;
    }

    let mut chars = param.chars();
    match (chars.next(), chars.next()) {
        (Some(CHAR_TRUE), None) => {
            ctx.device.set_read_only(true);
            CommandStatus::Ok
        }
        (Some(CHAR_FALSE), None) => {
            ctx.device.set_read_only(false);
            CommandStatus::Ok
        }
        _ => CommandStatus::InvalidParam,
    }
}

fn get_mem_size(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = write!(out, "{}", ctx.device.memory_size());
    CommandStatus::OkWithText
}

fn get_setting(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = write!(out, "{}", ctx.device.active_slot());
    CommandStatus::OkWithText
}

fn set_setting(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandStatus {
    if is_suggest(param) {
        let mut first = true;
        for slot in 0..=ctx.device.slot_count() {
            if !first {
                let _ = out.push(',');
            }
            first = false;
            let _ = write!(out, "{slot}");
        }
        return CommandStatus::OkWithText;
    }

    let Ok(slot) = param.parse::<usize>() else {
        return CommandStatus::InvalidParam;
    };
    if ctx.device.select_slot(slot, ctx.pending) {
        CommandStatus::Ok
    } else {
        CommandStatus::InvalidParam
    }
}

fn get_timeout(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = write!(
        out,
        "{} ms",
        u32::from(ctx.device.pending_timeout()) * TICK_INTERVAL_MS
    );
    CommandStatus::OkWithText
}

fn set_timeout(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandStatus {
    if is_suggest(param) {
        let _ = write!(
            out,
            "0 = no timeout\r\n1-{PENDING_TIMEOUT_MAX_TICKS} = 100 ms - 60000 ms timeout"
        );
        return CommandStatus::OkWithText;
    }

    match param.parse::<u16>() {
        Ok(ticks) if ticks <= PENDING_TIMEOUT_MAX_TICKS => {
            ctx.device.set_pending_timeout(ticks);
            CommandStatus::Ok
        }
        _ => CommandStatus::InvalidParam,
    }
}

fn get_threshold(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = write!(out, "{}", ctx.device.reader_threshold());
    CommandStatus::OkWithText
}

fn set_threshold(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandStatus {
    if is_suggest(param) {
        let _ = write!(
            out,
            "Any integer from 0 to {READER_THRESHOLD_MAX}. Reference voltage will be (VCC * THRESHOLD / 4095) mV."
        );
        return CommandStatus::OkWithText;
    }

    match param.parse::<u16>() {
        Ok(value) if value <= READER_THRESHOLD_MAX => {
            ctx.device.set_reader_threshold(value);
            CommandStatus::Ok
        }
        _ => CommandStatus::InvalidParam,
    }
}

fn get_baudrate(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = write!(out, "{}", ctx.device.baud_rate());
    CommandStatus::OkWithText
}

fn set_baudrate(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandStatus {
    if is_suggest(param) {
        let _ = write!(out, "{BAUDRATE_MIN}-{BAUDRATE_MAX}");
        return CommandStatus::OkWithText;
    }

    match param.parse::<u32>() {
        Ok(baud) if (BAUDRATE_MIN..=BAUDRATE_MAX).contains(&baud) => {
            ctx.device.set_baud_rate(baud);
            CommandStatus::Ok
        }
        _ => CommandStatus::InvalidParam,
    }
}

fn get_field(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = out.push(bool_char(ctx.device.field_active()));
    CommandStatus::OkWithText
}

fn set_field(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandStatus {
    if is_suggest(param) {
        let _ = write!(out, "{CHAR_TRUE},{CHAR_FALSE}");
        return CommandStatus::OkWithText;
    }

    let mut chars = param.chars();
    match (chars.next(), chars.next()) {
        (Some(CHAR_TRUE), None) => {
            ctx.device.set_field(true);
            CommandStatus::Ok
        }
        (Some(CHAR_FALSE), None) => {
            ctx.device.set_field(false);
            CommandStatus::Ok
        }
        _ => CommandStatus::InvalidParam,
    }
}

fn get_systick(ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandStatus {
    let _ = write!(out, "{:04X}", ctx.device.systick() & 0xFFFF);
    CommandStatus::OkWithText
}

fn exec_help(_ctx: &mut CommandContext<'_>, out: &mut TextBuffer) -> CommandReply {
    for (i, entry) in COMMAND_TABLE.iter().enumerate() {
        if i > 0 && out.push(',').is_err() {
            break;
        }
        if out.push_str(entry.name).is_err() {
            break;
        }
    }
    CommandReply::Status(CommandStatus::OkWithText)
}

fn exec_reset(ctx: &mut CommandContext<'_>, _out: &mut TextBuffer) -> CommandReply {
    ctx.device.reset_system();
    CommandReply::Status(CommandStatus::Ok)
}

fn require_reader(ctx: &CommandContext<'_>) -> bool {
    ctx.device.mode_id() == ModeId::ProximityReader
}

fn exec_identify(ctx: &mut CommandContext<'_>, _out: &mut TextBuffer) -> CommandReply {
    if !require_reader(ctx) {
        return CommandReply::Status(CommandStatus::InvalidUsage);
    }
    ctx.arm_op(ReaderOp::Identify)
}

fn exec_get_uid(ctx: &mut CommandContext<'_>, _out: &mut TextBuffer) -> CommandReply {
    if !require_reader(ctx) {
        return CommandReply::Status(CommandStatus::InvalidUsage);
    }
    ctx.arm_op(ReaderOp::GetUid)
}

fn exec_dump_mfu(ctx: &mut CommandContext<'_>, _out: &mut TextBuffer) -> CommandReply {
    if !require_reader(ctx) {
        return CommandReply::Status(CommandStatus::InvalidUsage);
    }
    ctx.arm_op(ReaderOp::DumpUltralight)
}

fn exec_clone_mfu(ctx: &mut CommandContext<'_>, _out: &mut TextBuffer) -> CommandReply {
    // Cloning starts from reader mode regardless of the current one;
    // the switch runs the full teardown/bring-up sequence first.
    ctx.device.switch_to(ModeId::ProximityReader, ctx.pending);
    ctx.arm_op(ReaderOp::CloneUltralight)
}

fn exec_autocalibrate(ctx: &mut CommandContext<'_>, _out: &mut TextBuffer) -> CommandReply {
    match ctx.device.mode_id() {
        ModeId::ProximityReader | ModeId::ProximitySniffer => {
            ctx.arm_op(ReaderOp::Autocalibrate)
        }
        _ => CommandReply::Status(CommandStatus::InvalidUsage),
    }
}

fn exec_send(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandReply {
    send_frame(ctx, param, out, false)
}

fn exec_send_raw(ctx: &mut CommandContext<'_>, param: &str, out: &mut TextBuffer) -> CommandReply {
    send_frame(ctx, param, out, true)
}

fn send_frame(
    ctx: &mut CommandContext<'_>,
    param: &str,
    _out: &mut TextBuffer,
    raw: bool,
) -> CommandReply {
    if !require_reader(ctx) {
        return CommandReply::Status(CommandStatus::InvalidUsage);
    }

    let Some(frame) = parse_send_param(param, raw) else {
        return CommandReply::Status(CommandStatus::InvalidParam);
    };
    ctx.arm_frame(&frame, raw)
}
