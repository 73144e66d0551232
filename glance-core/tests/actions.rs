mod common;

use common::{row, session, FakeDocument, Page, Recorded, HEIGHT, WIDTH};
use glance_drivers::{
    CursorState, EditCommand, FieldKind, KeyPhase, OptionNode, OptionQuery, Point, PointerEvent,
    Rect, ScrollOp, SyntheticEvent,
};

fn signup_form() -> Page {
    let mut page = Page::new(2400.0);
    let form = page.add(0, "form", "", row(0));
    let email = page.add(form, "input", "", row(1));
    page.attr(email, "id", "email")
        .attr(email, "placeholder", "Email");
    let bio = page.add(form, "div", "", row(2));
    page.attr(bio, "role", "textbox").attr(bio, "id", "bio");
    page.node_mut(bio).content_editable = true;
    let plan = page.add(form, "select", "", row(3));
    page.attr(plan, "id", "plan").attr(plan, "name", "Plan");
    let size = page.add(form, "div", "", row(4));
    page.attr(size, "role", "combobox")
        .attr(size, "id", "size")
        .attr(size, "aria-label", "Size");
    page.add(form, "button", "Create account", Rect::new(200.0, 1500.0, 160.0, 30.0));
    page
}

#[tokio::test]
async fn click_glides_from_the_origin_and_presses_on_target() {
    let mut s = session(FakeDocument::new(signup_form()));
    s.analyze_page().await;
    assert_eq!(s.pointer_position(), Point::new(100.0, 100.0));

    let outcome = s.click("[0][input]Email").await;
    assert_eq!(outcome, "Clicked on element: input with text 'Email'");

    let center = row(1).center();
    let log = s.document().log();
    let moves: Vec<Point> = log
        .iter()
        .filter_map(|r| match r {
            Recorded::Pointer(PointerEvent::Move(p)) => Some(*p),
            _ => None,
        })
        .collect();
    assert!(moves.len() >= 11);
    assert_eq!(moves.first(), Some(&Point::new(100.0, 100.0)));
    assert_eq!(moves.last(), Some(&center));
    assert!(log.contains(&Recorded::Cursor(center, CursorState::Pressed)));
    assert!(log.contains(&Recorded::FocusAt(center)));
    assert_eq!(s.pointer_position(), center);

    let down = log
        .iter()
        .position(|r| *r == Recorded::Pointer(PointerEvent::Down(center)))
        .unwrap();
    let up = log
        .iter()
        .position(|r| *r == Recorded::Pointer(PointerEvent::Up(center)))
        .unwrap();
    assert!(down < up);
}

#[tokio::test]
async fn off_screen_targets_are_scrolled_into_view() {
    let mut s = session(FakeDocument::new(signup_form()));
    s.analyze_page().await;

    let outcome = s.click("create account").await;
    assert_eq!(outcome, "Clicked on element: button with text 'Create account'");

    let page_center = Point::new(280.0, 1515.0);
    assert_eq!(s.document().scrolls(), vec![ScrollOp::IntoView(page_center)]);
    let scrolled = 1515.0 - HEIGHT / 2.0;
    let client = Point::new(280.0, 1515.0 - scrolled);
    assert!(s
        .document()
        .pointer_events()
        .contains(&PointerEvent::Down(client)));
}

#[tokio::test]
async fn failed_pointer_dispatch_falls_back_to_a_programmatic_click() {
    let mut s = session(FakeDocument::new(signup_form()));
    s.analyze_page().await;
    s.document().state().fail_pointer = true;

    let outcome = s.click("email").await;
    assert_eq!(outcome, "Clicked on element: input with text 'Email'");
    assert!(s
        .document()
        .log()
        .contains(&Recorded::ClickAt(row(1).center())));
}

#[tokio::test]
async fn fill_native_input_sets_value_and_fires_events() {
    let mut s = session(FakeDocument::new(signup_form()));
    s.analyze_page().await;

    let outcome = s.fill_input(r#"{"type": "input", "text": "email"}"#, "ab").await;
    assert_eq!(
        outcome,
        "Filled input field: input with text 'Email' with value: 'ab'"
    );

    let log = s.document().log();
    assert!(log.contains(&Recorded::SetValue("#email".into(), "ab".into())));
    let events = log
        .iter()
        .find_map(|r| match r {
            Recorded::Events(sel, events) if sel == "#email" => Some(events.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(&events[..2], &[SyntheticEvent::Input, SyntheticEvent::Change]);
    assert_eq!(events.len(), 2 + 6);
    assert_eq!(
        events[4],
        SyntheticEvent::Key {
            phase: KeyPhase::Up,
            key: "a".into()
        }
    );
    assert!(!log.iter().any(|r| matches!(r, Recorded::Assign(..))));
}

#[tokio::test]
async fn fill_content_editable_replaces_paragraphs() {
    let doc = FakeDocument::new(signup_form());
    doc.state()
        .field_kinds
        .insert("#bio".into(), FieldKind::ContentEditable);
    let mut s = session(doc);
    s.analyze_page().await;

    let outcome = s.fill_input("[1][input]", "Hi\nthere").await;
    assert!(outcome.starts_with("Filled input field: input with text"));

    let log = s.document().log();
    assert!(log.contains(&Recorded::Edit(
        "#bio".into(),
        vec![
            EditCommand::SelectAll,
            EditCommand::Delete,
            EditCommand::InsertText("Hi".into()),
            EditCommand::InsertParagraph,
            EditCommand::InsertText("there".into()),
        ]
    )));
    assert!(log.contains(&Recorded::Events("#bio".into(), vec![SyntheticEvent::Input])));
}

#[tokio::test]
async fn fill_falls_back_to_value_assignment() {
    let mut s = session(FakeDocument::new(signup_form()));
    s.analyze_page().await;
    s.document().state().fail_field = true;

    let outcome = s.fill_input("[0][input]Email", "x@y.z").await;
    assert_eq!(
        outcome,
        "Filled input field: input with text 'Email' with value: 'x@y.z' (using fallback)"
    );
    assert!(s
        .document()
        .log()
        .contains(&Recorded::Assign("#email".into(), "x@y.z".into())));
}

#[tokio::test]
async fn fill_reports_unsupported_fields() {
    let doc = FakeDocument::new(signup_form());
    {
        let mut state = doc.state();
        state
            .field_kinds
            .insert("#email".into(), FieldKind::Other("div".into()));
        state.fail_assign = true;
    }
    let mut s = session(doc);
    s.analyze_page().await;

    let outcome = s.fill_input("[0][input]Email", "x").await;
    assert_eq!(
        outcome,
        "Error filling input field: Interaction error: Unsupported element type: div"
    );
}

#[tokio::test]
async fn fill_request_validation() {
    let mut s = session(FakeDocument::new(signup_form()));
    assert_eq!(
        s.fill_input_request("{id: 0, value").await,
        "Error: Invalid JSON input format. Please provide a valid JSON string."
    );
    assert_eq!(
        s.fill_input_request(r#"{"id": 0}"#).await,
        "Error: 'value' field is required in the input JSON."
    );
    assert_eq!(
        s.fill_input_request(r#"{"type": "input", "value": "v"}"#).await,
        "Error: At least one of 'id', 'type', or 'text' must be provided to identify the element."
    );
    assert_eq!(
        s.fill_input_request(r#"{"id": 0, "value": "a@b.c"}"#).await,
        "Filled input field: input with text 'Email' with value: 'a@b.c'"
    );
}

#[tokio::test]
async fn native_select_tries_label_then_value_then_index() {
    let doc = FakeDocument::new(signup_form());
    doc.state().native_options = vec![
        ("Free".into(), "free".into()),
        ("Pro".into(), "pro".into()),
    ];
    let mut s = session(doc);
    s.analyze_page().await;

    assert_eq!(
        s.select_option("[2][dropdown]Plan", "Pro").await,
        "Selected option 'Pro' from dropdown: Plan by visible text"
    );
    assert_eq!(
        s.select_option("[2][dropdown]Plan", "free").await,
        "Selected option with value 'free' from dropdown: Plan"
    );
    assert_eq!(
        s.select_option("[2][dropdown]Plan", "1").await,
        "Selected option at index 1 from dropdown: Plan"
    );
    assert!(s
        .select_option("[2][dropdown]Plan", "Enterprise")
        .await
        .starts_with("Failed to select option 'Enterprise' from dropdown:"));

    let queries: Vec<OptionQuery> = s
        .document()
        .log()
        .into_iter()
        .filter_map(|r| match r {
            Recorded::Select(_, q) => Some(q),
            _ => None,
        })
        .collect();
    assert_eq!(
        &queries[3..6],
        &[
            OptionQuery::Label("1".into()),
            OptionQuery::Value("1".into()),
            OptionQuery::Index(1),
        ]
    );
}

#[tokio::test]
async fn custom_dropdown_opens_and_clicks_the_option() {
    let doc = FakeDocument::new(signup_form());
    let large = Point::new(290.0, 360.0);
    doc.state().option_nodes = vec![
        OptionNode {
            text: "Small".into(),
            value: Some("s".into()),
            center: Point::new(290.0, 330.0),
        },
        OptionNode {
            text: "Large".into(),
            value: Some("l".into()),
            center: large,
        },
    ];
    let mut s = session(doc);
    s.analyze_page().await;

    let outcome = s.select_option(r#"{"type":"dropdown","text":"size"}"#, "l").await;
    assert_eq!(outcome, "Clicked on option 'Large' in dropdown: Size");

    let downs: Vec<Point> = s
        .document()
        .pointer_events()
        .into_iter()
        .filter_map(|e| match e {
            PointerEvent::Down(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(downs, vec![row(4).center(), large]);

    let outcome = s.select_option("[3][dropdown]Size", "XL").await;
    assert_eq!(
        outcome,
        "Could not find option 'XL' in the opened dropdown: Size"
    );
}

#[tokio::test]
async fn scroll_down_wheels_at_the_viewport_center() {
    let mut s = session(FakeDocument::new(signup_form()));
    assert_eq!(s.scroll("Down").await, "Scrolled down");

    let center = Point::new(WIDTH / 2.0, HEIGHT / 2.0);
    let wheels: Vec<_> = s
        .document()
        .pointer_events()
        .into_iter()
        .filter(|e| matches!(e, PointerEvent::Wheel { .. }))
        .collect();
    assert_eq!(
        wheels,
        vec![
            PointerEvent::Wheel {
                at: center,
                delta_x: 0.0,
                delta_y: 100.0
            };
            3
        ]
    );
    assert_eq!(s.pointer_position(), center);
    assert_eq!(s.document().state().scroll_y, 300.0);
}

#[tokio::test]
async fn scroll_respects_boundaries() {
    let mut s = session(FakeDocument::new(signup_form()));
    let b = s.boundaries().await.unwrap();
    assert!(b.at_top && !b.at_bottom);

    assert_eq!(s.scroll("up").await, "Already at the top of the page");
    assert!(s.document().pointer_events().is_empty());

    assert_eq!(s.scroll("'bottom'").await, "Scrolled to bottom");
    assert_eq!(s.document().scrolls(), vec![ScrollOp::ToBottom]);
    assert!(s.boundaries().await.unwrap().at_bottom);
    assert_eq!(s.scroll("down").await, "Already at the bottom of the page");

    assert_eq!(s.scroll("TOP").await, "Scrolled to top");
    assert_eq!(s.document().state().scroll_y, 0.0);
}

#[tokio::test]
async fn unknown_directions_default_to_down() {
    let mut s = session(FakeDocument::new(signup_form()));
    assert_eq!(
        s.scroll("\"Sideways\"").await,
        "Invalid direction 'sideways', defaulted to scrolling down"
    );
    assert_eq!(s.document().state().scroll_y, 300.0);
}

#[tokio::test]
async fn scroll_failures_use_the_coarse_fallback() {
    let mut s = session(FakeDocument::new(signup_form()));
    s.document().state().fail_pointer = true;
    assert_eq!(
        s.scroll("down").await,
        "Emergency scroll fallback used for direction: down"
    );
    assert_eq!(
        s.document().scrolls(),
        vec![ScrollOp::By { dx: 0.0, dy: 300.0 }]
    );

    s.document().state().fail_scroll = true;
    assert_eq!(
        s.scroll("up").await,
        "Error scrolling: Script error: pointer dispatch disabled - Fallback also failed: Script error: scrolling disabled"
    );
}

#[tokio::test]
async fn fields_sharing_a_class_are_told_apart() {
    let mut page = Page::new(800.0);
    let form = page.add(0, "form", "", row(0));
    for (n, label) in [(1, "First name"), (2, "Last name")] {
        let field = page.add(form, "input", "", row(n));
        page.attr(field, "class", "form-control")
            .attr(field, "type", "text")
            .attr(field, "aria-label", label);
    }
    let mut s = session(FakeDocument::new(page));
    s.analyze_page().await;

    let selectors: Vec<String> = s
        .snapshot()
        .unwrap()
        .elements
        .iter()
        .map(|e| e.css_selector.clone())
        .collect();
    assert_eq!(
        selectors,
        vec![
            r#"form > input.form-control[type="text"]:nth-of-type(1)"#,
            r#"form > input.form-control[type="text"]:nth-of-type(2)"#,
        ]
    );

    let outcome = s
        .fill_input(r#"{"type":"input","text":"last name"}"#, "Smith")
        .await;
    assert_eq!(
        outcome,
        "Filled input field: input with text 'Last name' with value: 'Smith'"
    );
    assert!(s.document().log().contains(&Recorded::SetValue(
        selectors[1].clone(),
        "Smith".into()
    )));
}

#[tokio::test]
async fn stale_viewport_flags_are_rechecked_before_clicking() {
    let mut page = Page::new(2000.0);
    page.add(0, "button", "Top action", row(0));
    page.add(0, "button", "Next", row(5));
    let mut s = session(FakeDocument::new(page));
    s.analyze_page().await;
    assert_eq!(s.scroll("down").await, "Scrolled down");

    let outcome = s.click("[0][button]Top action").await;
    assert_eq!(outcome, "Clicked on element: button with text 'Top action'");

    let center = row(0).center();
    assert_eq!(s.document().scrolls(), vec![ScrollOp::IntoView(center)]);
    let downs: Vec<Point> = s
        .document()
        .pointer_events()
        .into_iter()
        .filter_map(|e| match e {
            PointerEvent::Down(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(downs, vec![center]);
}

#[tokio::test]
async fn clicking_empty_space_is_an_error() {
    let mut s = session(FakeDocument::new(signup_form()));
    s.analyze_page().await;
    s.document().state().hit_nothing = true;

    assert_eq!(
        s.click("[0][input]Email").await,
        "Error clicking on element: Interaction error: No element under the pointer at (280, 165)"
    );
    assert!(!s
        .document()
        .pointer_events()
        .iter()
        .any(|e| matches!(e, PointerEvent::Down(_))));
}
