//! End-to-end message flows against the model, the way the event loop
//! drives it: controller-mapped messages in, ui snapshots out.

use custdash::data::demo_records;
use custdash::domain::Message;
use custdash::model::{Model, RunState};
use custdash::pipeline::{Direction, Field, PAGE_SIZES};
use custdash::record::{Plan, Record, SignupDate, Status};
use ratatui::crossterm::event::{KeyCode, KeyEvent};

fn key(c: char) -> Message {
    Message::RawKey(KeyEvent::from(KeyCode::Char(c)))
}

fn press(code: KeyCode) -> Message {
    Message::RawKey(KeyEvent::from(code))
}

fn customer(i: usize, name: &str, plan: Plan) -> Record {
    Record {
        id: format!("cus_{i:04}"),
        name: format!("{name} {i:02}"),
        email: format!("user{i:02}@fixture.io"),
        plan,
        status: Status::Active,
        signup_date: SignupDate::parse(&format!("2023-01-{:02}", (i % 27) + 1)),
        spend: 10.0 * i as f64,
    }
}

#[test]
fn a_full_session_walks_every_surface() {
    let mut records = demo_records(59, 7);
    records.push(customer(59, "Packard", Plan::Pro));
    let pro_accounts = records.iter().filter(|r| r.plan == Plan::Pro).count();
    let mut model = Model::new(records, "demo data", 10, 0);

    let data = model.uidata();
    assert_eq!(data.total, 60);
    assert_eq!(data.total_pages, 6);
    assert_eq!(data.rows.len(), 10);
    assert_eq!(data.sort_key, Field::SignupDate);
    assert_eq!(data.sort_dir, Direction::Descending);

    // type a query; the table narrows while editing
    model.update(Message::Search);
    for c in "pro".chars() {
        model.update(key(c));
    }
    assert!(model.uidata().editing);
    assert_eq!(model.uidata().filtered, pro_accounts);

    model.update(press(KeyCode::Enter));
    let data = model.uidata();
    assert!(!data.editing);
    assert_eq!(data.filtered, pro_accounts);
    assert_eq!(data.page, 1);

    // sort by spend, flip to descending
    model.update(Message::SortBy(Field::Spend));
    model.update(Message::SortBy(Field::Spend));
    let data = model.uidata();
    assert_eq!((data.sort_key, data.sort_dir), (Field::Spend, Direction::Descending));
    assert!(data.rows[0].spend.starts_with('$'));

    model.update(Message::LastPage);
    let data = model.uidata();
    assert_eq!(data.page, data.total_pages);
    assert!(!data.has_next);

    model.update(Message::Quit);
    assert_eq!(model.run_state, RunState::Quitting);
}

#[test]
fn narrowing_and_cancelling_follow_the_pagination_contract() {
    let mut records: Vec<Record> = (0..25).map(|i| customer(i, "Member", Plan::Free)).collect();
    records.extend((25..29).map(|i| customer(i, "Zelda", Plan::Pro)));
    let mut model = Model::new(records, "fixture", 10, 0);

    model.update(Message::NextPage);
    model.update(Message::NextPage);
    assert_eq!(model.uidata().page, 3);

    model.update(Message::Search);
    for c in "zelda".chars() {
        model.update(key(c));
    }
    let data = model.uidata();
    assert_eq!(data.page, 1);
    assert_eq!(data.filtered, 4);
    assert_eq!(data.total_pages, 1);
    assert_eq!(data.rows.len(), 4);

    // cancelling restores the pre-edit query and with it the full set
    model.update(press(KeyCode::Esc));
    let data = model.uidata();
    assert!(!data.editing);
    assert_eq!(data.query, "");
    assert_eq!(data.filtered, 29);
}

#[test]
fn committed_queries_survive_the_next_edit_until_cancelled() {
    let mut records: Vec<Record> = (0..10).map(|i| customer(i, "Member", Plan::Free)).collect();
    records.push(customer(10, "Solo", Plan::Business));
    let mut model = Model::new(records, "fixture", 10, 0);

    model.update(Message::Search);
    for c in "solo".chars() {
        model.update(key(c));
    }
    model.update(press(KeyCode::Enter));
    assert_eq!(model.uidata().filtered, 1);

    // reopen the editor: the committed query is the editing baseline
    model.update(Message::Search);
    for _ in 0..4 {
        model.update(press(KeyCode::Backspace));
    }
    for c in "member".chars() {
        model.update(key(c));
    }
    assert_eq!(model.uidata().filtered, 10);

    model.update(press(KeyCode::Esc));
    let data = model.uidata();
    assert_eq!(data.query, "solo");
    assert_eq!(data.filtered, 1);
}

#[test]
fn view_invariants_hold_under_a_message_storm() {
    let mut script: Vec<Message> = Vec::new();
    script.extend([
        Message::NextPage,
        Message::NextPage,
        Message::PrevPage,
        Message::LastPage,
        Message::FirstPage,
        Message::GrowPageSize,
        Message::GrowPageSize,
        Message::GrowPageSize,
        Message::ShrinkPageSize,
    ]);
    for field in Field::ALL {
        script.push(Message::SortBy(field));
        script.push(Message::SortBy(field));
    }
    script.extend([
        Message::MoveDown,
        Message::MoveDown,
        Message::MoveRight,
        Message::SortSelected,
        Message::MoveUp,
        Message::MoveLeft,
    ]);
    script.push(Message::Search);
    script.extend("churned".chars().map(key));
    script.push(press(KeyCode::Enter));
    script.extend([
        Message::LastPage,
        Message::NextPage,
        Message::CopyCell,
        Message::CopyRow,
    ]);
    script.push(Message::Search);
    script.extend("@nowhere".chars().map(key));
    script.push(press(KeyCode::Esc));
    script.extend([
        Message::Help,
        Message::MoveDown,
        Message::Exit,
        Message::ShrinkPageSize,
        Message::PrevPage,
    ]);

    let mut model = Model::new(demo_records(60, 11), "demo data", 10, 0);
    for (step, message) in script.into_iter().enumerate() {
        model.update(message);
        let data = model.uidata();
        assert!(
            data.page >= 1 && data.page <= data.total_pages,
            "page {} of {} out of range at step {step}",
            data.page,
            data.total_pages
        );
        assert!(data.total_pages >= 1, "no page at step {step}");
        assert!(PAGE_SIZES.contains(&data.page_size), "bad page size at step {step}");
        assert!(data.rows.len() <= data.page_size, "overfull page at step {step}");
        assert!(data.filtered <= data.total, "filter grew the set at step {step}");
        match data.selected_row {
            Some(selected) => assert!(selected < data.rows.len(), "cursor off page at step {step}"),
            None => assert!(data.rows.is_empty(), "cursor lost at step {step}"),
        }
        assert!(data.selected_col < Field::ALL.len(), "column cursor out of range at step {step}");
        assert_eq!(data.has_prev, data.page > 1, "prev flag wrong at step {step}");
        assert_eq!(data.has_next, data.page < data.total_pages, "next flag wrong at step {step}");
    }
    assert_eq!(model.run_state, RunState::Running);
}
