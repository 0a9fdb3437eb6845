//! Key grammar integration tests
//!
//! These tests drive the dispatcher with key traces the way a host would
//! and check the resulting calendar, selection and registers.

use chrono::NaiveDate;
use vical_core::{
    Calendar, CalendarItem, CoreIoRequest, CoreOutcome, Dispatcher, Editor, Key, Mode,
    RegisterName, Settings, Subcalendar, SubcalId,
};

fn d(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

/// Editor on Friday 2026-10-16 with one empty subcalendar
fn setup() -> (Dispatcher, Editor, SubcalId) {
    let home = Subcalendar::new("Home", "green");
    let id = home.uid().clone();
    let cal = Calendar::from_subcalendars(vec![home]).unwrap();
    let editor = Editor::new(cal, Settings::default(), d(10, 16));
    (Dispatcher::default(), editor, id)
}

fn seed(editor: &mut Editor, subcal: &SubcalId, items: Vec<CalendarItem>) {
    editor
        .transact("seed", |rec| {
            for item in items {
                rec.insert_item(subcal, item)?;
            }
            Ok(())
        })
        .unwrap();
}

/// Feeds a key trace; `\x1b` is Escape and `\n` is Enter
fn press_keys(dp: &mut Dispatcher, editor: &mut Editor, keys: &str) -> CoreOutcome {
    let mut last = CoreOutcome::Continue;
    for ch in keys.chars() {
        let key = match ch {
            '\x1b' => Key::Escape,
            '\n' => Key::Enter,
            '\x08' => Key::Backspace,
            other => Key::Char(other),
        };
        last = dp.feed(editor, key);
    }
    last
}

fn names_on(editor: &Editor, date: NaiveDate) -> Vec<String> {
    editor
        .calendar()
        .items_on(date)
        .iter()
        .map(|item| item.name().to_string())
        .collect()
}

fn register_names(editor: &Editor, name: RegisterName) -> Vec<String> {
    editor
        .registers()
        .get(name)
        .iter()
        .map(|p| p.name().to_string())
        .collect()
}

#[test]
fn test_counted_motion_moves_three_weeks() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, "3j");
    assert_eq!(ed.selected_date(), d(11, 6));
    press_keys(&mut dp, &mut ed, "2h");
    assert_eq!(ed.selected_date(), d(11, 4));
}

#[test]
fn test_goto_parses_count_buffer_as_date() {
    let (mut dp, mut ed, _) = setup();

    press_keys(&mut dp, &mut ed, "07042026gg");
    assert_eq!(ed.selected_date(), d(7, 4));

    press_keys(&mut dp, &mut ed, "072026gg");
    assert_eq!(ed.selected_date(), d(7, 1));

    press_keys(&mut dp, &mut ed, "gg");
    assert_eq!(ed.selected_date(), d(10, 16));

    press_keys(&mut dp, &mut ed, "0gg");
    assert_eq!(ed.selected_date(), d(10, 1));
}

#[test]
fn test_back_jump_returns_to_goto_origin() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, "12252026gg");
    assert_eq!(ed.selected_date(), d(12, 25));
    press_keys(&mut dp, &mut ed, "`");
    assert_eq!(ed.selected_date(), d(10, 16));
    press_keys(&mut dp, &mut ed, "`");
    assert_eq!(ed.selected_date(), d(12, 25));
}

#[test]
fn test_invalid_goto_keeps_selection() {
    let (mut dp, mut ed, _) = setup();
    let outcome = press_keys(&mut dp, &mut ed, "13452026gg");
    assert_eq!(ed.selected_date(), d(10, 16));
    match outcome {
        CoreOutcome::StatusMessage(text) => assert!(text.starts_with("Invalid date")),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(ed.status().unwrap().is_error);
}

#[test]
fn test_month_and_week_jumps() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, "G");
    assert_eq!(ed.selected_date(), d(10, 31));
    press_keys(&mut dp, &mut ed, "g0");
    // Weeks start on Sunday by default
    assert_eq!(ed.selected_date(), d(10, 25));
    press_keys(&mut dp, &mut ed, "g$");
    assert_eq!(ed.selected_date(), d(10, 31));
}

#[test]
fn test_delete_rotates_numbered_registers() {
    let (mut dp, mut ed, sc) = setup();
    seed(
        &mut ed,
        &sc,
        vec![
            CalendarItem::task("a", d(10, 16)),
            CalendarItem::task("b", d(10, 16)),
            CalendarItem::task("c", d(10, 16)),
        ],
    );

    press_keys(&mut dp, &mut ed, "dd");
    press_keys(&mut dp, &mut ed, "dd");
    press_keys(&mut dp, &mut ed, "dd");

    assert!(names_on(&ed, d(10, 16)).is_empty());
    assert_eq!(register_names(&ed, RegisterName::Numbered(1)), vec!["c"]);
    assert_eq!(register_names(&ed, RegisterName::Numbered(2)), vec!["b"]);
    assert_eq!(register_names(&ed, RegisterName::Numbered(3)), vec!["a"]);
    assert_eq!(register_names(&ed, RegisterName::Unnamed), vec!["c"]);
    assert!(register_names(&ed, RegisterName::Numbered(0)).is_empty());
}

#[test]
fn test_yank_fills_register_zero_only() {
    let (mut dp, mut ed, sc) = setup();
    seed(&mut ed, &sc, vec![CalendarItem::task("a", d(10, 16))]);

    let outcome = press_keys(&mut dp, &mut ed, "yy");
    assert_eq!(outcome, CoreOutcome::StatusMessage("1 item yanked".to_string()));
    assert_eq!(register_names(&ed, RegisterName::Numbered(0)), vec!["a"]);
    assert!(register_names(&ed, RegisterName::Numbered(1)).is_empty());
    assert_eq!(ed.history().undo_len(), 1);
}

#[test]
fn test_named_register_yank_and_paste() {
    let (mut dp, mut ed, sc) = setup();
    seed(&mut ed, &sc, vec![CalendarItem::task("a", d(10, 16))]);

    press_keys(&mut dp, &mut ed, "\"ayy");
    assert_eq!(dp.args().regname, RegisterName::Unnamed);
    press_keys(&mut dp, &mut ed, "l\"ap");

    assert_eq!(names_on(&ed, d(10, 17)), vec!["a"]);
    let original = ed.calendar().items_on(d(10, 16))[0].uid();
    let copy = ed.calendar().items_on(d(10, 17))[0].uid();
    assert_ne!(original, copy);
}

#[test]
fn test_counted_paste_fills_consecutive_days() {
    let (mut dp, mut ed, sc) = setup();
    seed(&mut ed, &sc, vec![CalendarItem::task("a", d(10, 16))]);

    press_keys(&mut dp, &mut ed, "yyl3p");
    for day in 17..=19 {
        assert_eq!(names_on(&ed, d(10, day)), vec!["a"]);
    }
    // One paste is one undo step
    press_keys(&mut dp, &mut ed, "u");
    for day in 17..=19 {
        assert!(names_on(&ed, d(10, day)).is_empty());
    }
}

#[test]
fn test_invalid_register_name() {
    let (mut dp, mut ed, _) = setup();
    let outcome = press_keys(&mut dp, &mut ed, "\"!");
    assert_eq!(
        outcome,
        CoreOutcome::StatusMessage("Invalid register: !".to_string())
    );
    assert_eq!(dp.args().regname, RegisterName::Unnamed);
}

#[test]
fn test_paste_from_empty_register() {
    let (mut dp, mut ed, _) = setup();
    let outcome = press_keys(&mut dp, &mut ed, "\"qp");
    assert_eq!(
        outcome,
        CoreOutcome::StatusMessage("Register q is empty".to_string())
    );
    assert_eq!(ed.history().undo_len(), 0);
}

#[test]
fn test_toggle_complete_uses_majority_rule() {
    let (mut dp, mut ed, sc) = setup();
    seed(
        &mut ed,
        &sc,
        vec![
            CalendarItem::task("a", d(10, 16)).with_completed(true),
            CalendarItem::task("b", d(10, 16)),
            CalendarItem::task("c", d(10, 16)),
        ],
    );

    press_keys(&mut dp, &mut ed, "3 ");
    let done: Vec<Option<bool>> = ed
        .calendar()
        .items_on(d(10, 16))
        .iter()
        .map(|item| item.completed())
        .collect();
    assert_eq!(done, vec![Some(true); 3]);

    press_keys(&mut dp, &mut ed, "3x");
    press_keys(&mut dp, &mut ed, "x");
    let done: Vec<Option<bool>> = ed
        .calendar()
        .items_on(d(10, 16))
        .iter()
        .map(|item| item.completed())
        .collect();
    assert_eq!(done, vec![Some(false); 3]);
}

#[test]
fn test_operator_with_date_motion() {
    let (mut dp, mut ed, sc) = setup();
    seed(
        &mut ed,
        &sc,
        (16..=20)
            .map(|day| CalendarItem::task(format!("t{}", day), d(10, day)))
            .collect(),
    );

    press_keys(&mut dp, &mut ed, "d2l");
    assert!(names_on(&ed, d(10, 16)).is_empty());
    assert!(names_on(&ed, d(10, 17)).is_empty());
    assert!(names_on(&ed, d(10, 18)).is_empty());
    assert_eq!(names_on(&ed, d(10, 19)), vec!["t19"]);
    assert_eq!(register_names(&ed, RegisterName::Numbered(1)).len(), 3);
    assert_eq!(dp.mode(), Mode::Normal);
}

#[test]
fn test_operator_count_multiplies_motion_count() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, "2y3l");
    assert_eq!(ed.selected_date(), d(10, 22));
    assert_eq!(dp.mode(), Mode::Normal);
    assert_eq!(dp.pending_keys(), "");
}

#[test]
fn test_uppercase_operator_is_single_unit() {
    let (mut dp, mut ed, sc) = setup();
    seed(
        &mut ed,
        &sc,
        vec![
            CalendarItem::task("a", d(10, 16)),
            CalendarItem::task("b", d(10, 16)),
        ],
    );
    press_keys(&mut dp, &mut ed, "D");
    assert_eq!(names_on(&ed, d(10, 16)), vec!["b"]);
}

#[test]
fn test_item_motion_targets_following_items() {
    let (mut dp, mut ed, sc) = setup();
    seed(
        &mut ed,
        &sc,
        vec![
            CalendarItem::task("a", d(10, 16)),
            CalendarItem::task("b", d(10, 16)),
            CalendarItem::task("c", d(10, 16)),
        ],
    );
    press_keys(&mut dp, &mut ed, "gj");
    assert_eq!(ed.selected_item().unwrap().name(), "b");
    press_keys(&mut dp, &mut ed, "dgj");
    assert_eq!(names_on(&ed, d(10, 16)), vec!["a"]);
}

#[test]
fn test_change_opens_prefilled_prompt() {
    let (mut dp, mut ed, sc) = setup();
    seed(&mut ed, &sc, vec![CalendarItem::task("a", d(10, 16))]);

    press_keys(&mut dp, &mut ed, "cc");
    assert_eq!(dp.mode(), Mode::Prompt);
    assert_eq!(dp.prompt().unwrap().label(), "Rename: ");
    assert_eq!(dp.prompt().unwrap().text(), "a");

    press_keys(&mut dp, &mut ed, "\x08zz\n");
    assert_eq!(names_on(&ed, d(10, 16)), vec!["zz"]);
    assert_eq!(dp.mode(), Mode::Normal);
}

#[test]
fn test_blank_change_is_rejected() {
    let (mut dp, mut ed, sc) = setup();
    seed(&mut ed, &sc, vec![CalendarItem::task("a", d(10, 16))]);
    let depth = ed.history().undo_len();

    let outcome = press_keys(&mut dp, &mut ed, "cc\x08 \n");
    assert_eq!(
        outcome,
        CoreOutcome::StatusMessage("Name cannot be blank".to_string())
    );
    assert_eq!(names_on(&ed, d(10, 16)), vec!["a"]);
    assert_eq!(ed.history().undo_len(), depth);
}

#[test]
fn test_escape_aborts_prompt_without_change() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, "Tfoo\x1b");
    assert_eq!(dp.mode(), Mode::Normal);
    assert!(names_on(&ed, d(10, 16)).is_empty());
    assert_eq!(ed.history().undo_len(), 0);
    assert!(!ed.is_dirty());
}

#[test]
fn test_escape_from_ex_restores_pending_operator() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, "2d:wq");
    assert_eq!(dp.mode(), Mode::ExCommand);
    assert_eq!(dp.ex_buffer(), Some("wq"));

    press_keys(&mut dp, &mut ed, "\x1b");
    assert_eq!(dp.mode(), Mode::OperatorPending);
    assert_eq!(dp.pending_keys(), "2d");

    press_keys(&mut dp, &mut ed, "\x1b");
    assert_eq!(dp.mode(), Mode::Normal);
    assert_eq!(dp.pending_keys(), "");
}

#[test]
fn test_backspace_on_empty_ex_line_leaves_ex_mode() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, ":w\x08");
    assert_eq!(dp.mode(), Mode::ExCommand);
    press_keys(&mut dp, &mut ed, "\x08");
    assert_eq!(dp.mode(), Mode::Normal);
}

#[test]
fn test_counted_new_task_spaced_by_motion() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, "3T5l");
    assert_eq!(dp.mode(), Mode::Prompt);
    press_keys(&mut dp, &mut ed, "\n");

    assert_eq!(names_on(&ed, d(10, 16)), vec!["New Task"]);
    assert_eq!(names_on(&ed, d(10, 21)), vec!["New Task"]);
    assert_eq!(names_on(&ed, d(10, 26)), vec!["New Task"]);
    assert_eq!(ed.calendar().item_count(), 3);
    assert_eq!(ed.history().undo_len(), 1);
}

#[test]
fn test_visual_delete_covers_range() {
    let (mut dp, mut ed, sc) = setup();
    seed(
        &mut ed,
        &sc,
        vec![
            CalendarItem::task("a", d(10, 16)),
            CalendarItem::task("b", d(10, 18)),
            CalendarItem::task("c", d(10, 20)),
        ],
    );

    press_keys(&mut dp, &mut ed, "v2l");
    assert_eq!(dp.mode(), Mode::Visual);
    assert_eq!(ed.selection_range(), Some((d(10, 16), d(10, 18))));

    press_keys(&mut dp, &mut ed, "d");
    assert_eq!(dp.mode(), Mode::Normal);
    assert!(!ed.is_visual());
    assert_eq!(ed.calendar().item_count(), 1);
    assert_eq!(names_on(&ed, d(10, 20)), vec!["c"]);
}

#[test]
fn test_visual_event_spans_range() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, "v3lE");
    assert_eq!(dp.prompt().unwrap().text(), "New Event");
    press_keys(&mut dp, &mut ed, "\n");

    let items = ed.calendar().items_on(d(10, 18));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].duration_days(), 4);
    assert!(!ed.is_visual());
}

#[test]
fn test_subcalendar_cycling() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, ":newcal Work\n");
    assert_eq!(ed.selected_subcal().unwrap().name(), "Work");
    press_keys(&mut dp, &mut ed, "[");
    assert_eq!(ed.selected_subcal().unwrap().name(), "Home");
    press_keys(&mut dp, &mut ed, "2]");
    assert_eq!(ed.selected_subcal().unwrap().name(), "Home");
}

#[test]
fn test_hidden_subcalendar_items_not_listed() {
    let (mut dp, mut ed, sc) = setup();
    seed(&mut ed, &sc, vec![CalendarItem::task("a", d(10, 16))]);
    let outcome = press_keys(&mut dp, &mut ed, "zc");
    assert_eq!(outcome, CoreOutcome::StatusMessage("Home hidden".to_string()));
    assert!(names_on(&ed, d(10, 16)).is_empty());
    press_keys(&mut dp, &mut ed, "u");
    assert_eq!(names_on(&ed, d(10, 16)), vec!["a"]);
}

#[test]
fn test_ex_write_and_quit_requests() {
    let (mut dp, mut ed, _) = setup();
    assert_eq!(
        press_keys(&mut dp, &mut ed, ":q\n"),
        CoreOutcome::RequestExit { forced: false }
    );

    press_keys(&mut dp, &mut ed, "T\n");
    assert!(ed.is_dirty());
    assert_eq!(press_keys(&mut dp, &mut ed, ":q\n"), CoreOutcome::QuitBlocked);
    assert_eq!(
        ed.status().unwrap().text,
        "No write since last change (use :q! to override)"
    );
    assert_eq!(
        press_keys(&mut dp, &mut ed, ":w\n"),
        CoreOutcome::RequestIo(CoreIoRequest::Save)
    );
    assert_eq!(
        press_keys(&mut dp, &mut ed, ":wq\n"),
        CoreOutcome::RequestIo(CoreIoRequest::SaveAndQuit)
    );
    assert_eq!(
        press_keys(&mut dp, &mut ed, ":q!\n"),
        CoreOutcome::RequestExit { forced: true }
    );

    ed.mark_saved();
    assert_eq!(
        press_keys(&mut dp, &mut ed, ":q\n"),
        CoreOutcome::RequestExit { forced: false }
    );
}

#[test]
fn test_ex_commands_act_on_selected_item() {
    let (mut dp, mut ed, _) = setup();
    press_keys(&mut dp, &mut ed, ":newtask buy milk\n");
    assert_eq!(names_on(&ed, d(10, 16)), vec!["buy milk"]);

    press_keys(&mut dp, &mut ed, ":complete\n");
    assert_eq!(ed.selected_item().unwrap().completed(), Some(true));

    press_keys(&mut dp, &mut ed, ":rename buy oat milk\n");
    assert_eq!(names_on(&ed, d(10, 16)), vec!["buy oat milk"]);

    press_keys(&mut dp, &mut ed, ":delete\n");
    assert!(names_on(&ed, d(10, 16)).is_empty());

    let outcome = press_keys(&mut dp, &mut ed, ":delete\n");
    assert_eq!(outcome, CoreOutcome::StatusMessage("No item selected".to_string()));
}

#[test]
fn test_unknown_ex_command() {
    let (mut dp, mut ed, _) = setup();
    let outcome = press_keys(&mut dp, &mut ed, ":frob\n");
    assert_eq!(
        outcome,
        CoreOutcome::StatusMessage("Unknown command: frob".to_string())
    );
    assert_eq!(dp.mode(), Mode::Normal);
}

#[test]
fn test_delete_subcalendar_confirmation() {
    let (mut dp, mut ed, _) = setup();

    let outcome = press_keys(&mut dp, &mut ed, ":delcal\n");
    assert_eq!(
        outcome,
        CoreOutcome::StatusMessage("Cannot delete the last subcalendar".to_string())
    );

    press_keys(&mut dp, &mut ed, ":newcal Work\n:delcal\n");
    assert_eq!(
        dp.prompt().unwrap().label(),
        "Delete subcalendar 'Work'? (y/N): "
    );
    press_keys(&mut dp, &mut ed, "n\n");
    assert_eq!(ed.calendar().subcal_count(), 2);

    press_keys(&mut dp, &mut ed, ":delcal\ny\n");
    assert_eq!(ed.calendar().subcal_count(), 1);
    assert_eq!(ed.selected_subcal().unwrap().name(), "Home");

    press_keys(&mut dp, &mut ed, "u");
    assert_eq!(ed.calendar().subcal_count(), 2);
}

#[test]
fn test_huge_counts_stop_at_calendar_limits() {
    let (mut dp, mut ed, sc) = setup();
    seed(
        &mut ed,
        &sc,
        vec![CalendarItem::event("trip", d(10, 16), d(10, 18)).unwrap()],
    );
    press_keys(&mut dp, &mut ed, "yy");

    press_keys(&mut dp, &mut ed, "99999999l");
    assert_eq!(ed.selected_date(), NaiveDate::MAX);

    let outcome = press_keys(&mut dp, &mut ed, "p");
    assert_eq!(
        outcome,
        CoreOutcome::StatusMessage("Date out of range".to_string())
    );
    assert!(ed.status().unwrap().is_error);
    assert_eq!(ed.calendar().item_count(), 1);
    assert_eq!(dp.mode(), Mode::Normal);

    press_keys(&mut dp, &mut ed, "T\n");
    assert_eq!(names_on(&ed, NaiveDate::MAX), vec!["New Task"]);
    press_keys(&mut dp, &mut ed, "E\n");
    assert_eq!(names_on(&ed, NaiveDate::MAX), vec!["New Event", "New Task"]);

    // Copies that would land past the last date are dropped
    press_keys(&mut dp, &mut ed, "3Tl\n");
    assert_eq!(names_on(&ed, NaiveDate::MAX).len(), 3);
    assert_eq!(ed.calendar().item_count(), 4);

    press_keys(&mut dp, &mut ed, "99999999h");
    assert_eq!(ed.selected_date(), NaiveDate::MIN);
    press_keys(&mut dp, &mut ed, "99999999h");
    assert_eq!(ed.selected_date(), NaiveDate::MIN);
}

#[test]
fn test_operator_over_huge_span_collects_items_once() {
    let (mut dp, mut ed, sc) = setup();
    seed(
        &mut ed,
        &sc,
        vec![
            CalendarItem::task("a", d(10, 16)),
            CalendarItem::event("trip", d(10, 20), d(10, 25)).unwrap(),
        ],
    );

    press_keys(&mut dp, &mut ed, "d99999999l");
    assert_eq!(ed.calendar().item_count(), 0);
    assert_eq!(register_names(&ed, RegisterName::Numbered(1)), vec!["a", "trip"]);
}
