use super::*;
use alloc::string::String;
use std::sync::Mutex;
use std::thread::{self, ThreadId};

/// Records every `apl` log line together with the thread that emitted it
struct Capture {
    lines: Mutex<Vec<(ThreadId, ::log::Level, String)>>,
}

impl ::log::Log for Capture {
    fn enabled(&self, _: &::log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &::log::Record) {
        if record.target() == "apl" {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push((thread::current().id(), record.level(), format!("{}", record.args())));
            }
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    lines: Mutex::new(Vec::new()),
};

#[test]
fn test_log_helpers_do_not_panic_without_a_logger() {
    crate::log::info("info");
    crate::log::warn("warn");
    crate::log::debug("label", "debug");
    crate::log::stage(&crate::AssemblyStage::Start, &crate::AssemblyStage::Done);
    crate::log::action("expand", "group=aoe");
}

#[test]
fn test_diagnostics_are_logged_at_debug_only() {
    // Only this test installs a logger
    let _ = ::log::set_logger(&CAPTURE);
    ::log::set_max_level(::log::LevelFilter::Trace);

    let rotation = Rotation::apl(vec![APLAction::group_ref("nope")]);
    let assembly = assemble(&rotation);
    assert_eq!(assembly.diagnostics.len(), 1);

    let me = thread::current().id();
    let lines = CAPTURE.lines.lock().unwrap();
    let mentions: Vec<&(ThreadId, ::log::Level, String)> = lines
        .iter()
        .filter(|(id, _, msg)| *id == me && msg.contains("'nope' not found"))
        .collect();
    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].1, ::log::Level::Debug);
}
