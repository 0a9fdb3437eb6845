//! Scripted end-to-end runs through the host runtime

use chrono::NaiveDate;
use std::io::Cursor;
use tempfile::TempDir;
use vical_core::Key;
use vical_storage::{CalendarStore, JsonFileStore, MemoryStore};
use vicald::{HostRuntime, HostRuntimeConfig};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn config(script: Option<&str>) -> HostRuntimeConfig {
    HostRuntimeConfig {
        script: script.map(str::to_string),
        ..HostRuntimeConfig::new(today())
    }
}

fn type_line<S: CalendarStore>(runtime: &mut HostRuntime<S>, line: &str) {
    for ch in line.chars() {
        runtime.step(Key::Char(ch));
    }
    runtime.step(Key::Enter);
}

fn names_today<S: CalendarStore>(runtime: &HostRuntime<S>) -> Vec<String> {
    runtime
        .editor()
        .calendar()
        .items_on(today())
        .iter()
        .map(|item| item.name().to_string())
        .collect()
}

#[test]
fn test_write_quit_saves_and_exits() {
    let script = r#"
        # create a task and leave
        ":newtask dentist"
        Enter
        ":wq"
        Enter
        # never reached
        j
    "#;
    let mut runtime = HostRuntime::new(config(Some(script)), MemoryStore::new()).unwrap();
    let mut out = Vec::new();
    runtime.run(&mut out).unwrap();

    assert!(runtime.is_shutdown());
    assert_eq!(runtime.store().save_count(), 1);
    assert_eq!(runtime.editor().selected_date(), today());

    let saved = runtime.store().load().unwrap();
    let names: Vec<&str> = saved.items_on(today()).iter().map(|i| i.name()).collect();
    assert_eq!(names, vec!["dentist"]);
}

#[test]
fn test_quit_blocked_until_forced() {
    let mut runtime = HostRuntime::new(config(None), MemoryStore::new()).unwrap();
    type_line(&mut runtime, ":newtask milk");
    type_line(&mut runtime, ":q");

    assert!(!runtime.is_shutdown());
    let status = runtime.editor().status().unwrap();
    assert!(status.is_error);
    assert_eq!(
        status.text,
        "No write since last change (use :q! to override)"
    );

    type_line(&mut runtime, ":q!");
    assert!(runtime.is_shutdown());
    assert_eq!(runtime.store().save_count(), 0);
}

#[test]
fn test_quit_after_write_is_allowed() {
    let mut runtime = HostRuntime::new(config(None), MemoryStore::new()).unwrap();
    type_line(&mut runtime, ":newtask milk");
    type_line(&mut runtime, ":w");

    assert!(!runtime.is_shutdown());
    assert!(!runtime.editor().is_dirty());
    assert_eq!(
        runtime.editor().status().unwrap().text,
        "1 subcalendar(s) written"
    );

    type_line(&mut runtime, ":q");
    assert!(runtime.is_shutdown());
}

#[test]
fn test_failed_save_keeps_editor_open_and_dirty() {
    let mut store = MemoryStore::new();
    store.fail_saves(true);
    let mut runtime = HostRuntime::new(config(None), store).unwrap();
    type_line(&mut runtime, ":newtask milk");
    type_line(&mut runtime, ":wq");

    assert!(!runtime.is_shutdown());
    assert!(runtime.editor().is_dirty());
    let status = runtime.editor().status().unwrap();
    assert!(status.is_error);
    assert!(status.text.starts_with("Save failed: "));

    type_line(&mut runtime, ":q");
    assert!(!runtime.is_shutdown());

    runtime.store_mut().fail_saves(false);
    type_line(&mut runtime, ":wq");
    assert!(runtime.is_shutdown());
    assert_eq!(runtime.store().save_count(), 1);
}

#[test]
fn test_file_store_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("subcalendars.json");

    let script = "\":newtask dentist\"\nEnter\n\"3l\"\n\":newtask gym\"\nEnter\n\":wq\"\nEnter";
    let mut first = HostRuntime::new(config(Some(script)), JsonFileStore::new(&path)).unwrap();
    first.run(&mut Vec::new()).unwrap();
    assert!(first.is_shutdown());

    let second = HostRuntime::new(config(None), JsonFileStore::new(&path)).unwrap();
    assert_eq!(names_today(&second), vec!["dentist"]);
    let later = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let names: Vec<&str> = second
        .editor()
        .calendar()
        .items_on(later)
        .iter()
        .map(|i| i.name())
        .collect();
    assert_eq!(names, vec!["gym"]);
    assert!(!second.editor().is_dirty());
}

#[test]
fn test_interactive_lines_stop_at_quit() {
    let input = "\":newtask milk\"\nEnter\nBogus\n\":q!\"\nEnter\nj\n";
    let mut runtime = HostRuntime::new(config(None), MemoryStore::new()).unwrap();
    let mut out = Vec::new();
    runtime
        .run_interactive(Cursor::new(input), &mut out)
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("> [ ] milk @Default"));
    assert!(text.contains("Invalid key name: Bogus"));
    assert!(runtime.is_shutdown());
    assert_eq!(runtime.editor().selected_date(), today());
}

#[test]
fn test_render_reflects_final_state() {
    let script = "\":newtask call mom\"\nEnter\nSpace";
    let mut runtime = HostRuntime::new(config(Some(script)), MemoryStore::new()).unwrap();
    let mut out = Vec::new();
    runtime.run(&mut out).unwrap();

    let frame = runtime.render();
    assert!(frame.contains("> [x] call mom @Default"));
    assert!(frame.contains("NORMAL Default*"));
    assert!(String::from_utf8(out).unwrap().ends_with(&frame));
}

#[test]
fn test_counts_past_the_last_date_keep_rendering() {
    let script = r#"
        "yy"
        v
        "2l"
        ":newevent trip"
        Enter
        "yy"
        "99999999l"
        p
        T
        Enter
        "99999999h"
        E
        Enter
    "#;
    let mut runtime = HostRuntime::new(config(Some(script)), MemoryStore::new()).unwrap();
    let mut out = Vec::new();
    runtime.run(&mut out).unwrap();

    assert!(!runtime.is_shutdown());
    assert_eq!(runtime.editor().selected_date(), NaiveDate::MIN);
    assert_eq!(runtime.editor().calendar().item_count(), 3);
    let frame = runtime.render();
    assert!(frame.contains("[ 1]"));
    assert!(frame.contains("> === New Event @Default"));

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("E: No item selected"));
    assert!(text.contains("E: Date out of range"));
    assert!(text.contains("> [ ] New Task @Default"));
}
