//! Integration Tests for the Reactive Runtime and Components
//!
//! These tests verify that signals, tracked computations, components and
//! event bindings work together correctly.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use sprout_core::{App, Error, EventSpec, LifecycleState};

/// Counts invocations of a handler.
fn hit_counter() -> (Rc<Cell<u32>>, impl Fn(&sprout_core::Event) + 'static) {
    let hits = Rc::new(Cell::new(0));
    let sink = hits.clone();
    (hits, move |_: &sprout_core::Event| sink.set(sink.get() + 1))
}

/// Writing the current value never runs subscribers or moves the previous value.
#[test]
fn no_op_write_law() {
    let app = App::new();
    let signal = app.create_signal(7);
    let runs = Rc::new(Cell::new(0));

    let (reader, counter) = (signal.clone(), runs.clone());
    app.track(move || {
        reader.get();
        counter.set(counter.get() + 1);
    });
    signal.set(8);
    let previous = signal.get_previous();
    let runs_before = runs.get();

    for _ in 0..3 {
        assert!(!signal.set(signal.get_untracked()));
    }

    assert_eq!(runs.get(), runs_before);
    assert_eq!(signal.get_previous(), previous);
}

/// Subscribers run in registration order, all before `set` returns.
#[test]
fn change_propagates_in_subscription_order() {
    let app = App::new();
    let signal = app.create_signal(0);
    let log = Rc::new(RefCell::new(Vec::new()));

    for index in 1..=4 {
        let (reader, log) = (signal.clone(), log.clone());
        app.track(move || {
            let value = reader.get();
            log.borrow_mut().push((index, value));
        });
    }
    log.borrow_mut().clear();

    signal.set(10);

    assert_eq!(*log.borrow(), vec![(1, 10), (2, 10), (3, 10), (4, 10)]);
}

/// Nested writes run depth-first: a subscriber's own writes finish
/// propagating before the next subscriber runs.
#[test]
fn nested_writes_are_depth_first() {
    let app = App::new();
    let source = app.create_signal(0);
    let derived = app.create_signal(0);
    let log = Rc::new(RefCell::new(Vec::new()));

    {
        let (source, derived, log) = (source.clone(), derived.clone(), log.clone());
        app.track(move || {
            let value = source.get();
            log.borrow_mut().push("first");
            derived.set(value * 2);
        });
    }
    {
        let (derived, log) = (derived.clone(), log.clone());
        app.track(move || {
            derived.get();
            log.borrow_mut().push("derived reader");
        });
    }
    {
        let (source, log) = (source.clone(), log.clone());
        app.track(move || {
            source.get();
            log.borrow_mut().push("second");
        });
    }
    log.borrow_mut().clear();

    source.set(1);

    assert_eq!(*log.borrow(), vec!["first", "derived reader", "second"]);
    assert_eq!(derived.get(), 2);
}

/// A computation reading only `a` ignores writes to `b`.
#[test]
fn dependency_isolation() {
    let app = App::new();
    let a = app.create_signal(0);
    let b = app.create_signal(0);
    let runs = Rc::new(Cell::new(0));

    let (reader, counter) = (a.clone(), runs.clone());
    app.track(move || {
        reader.get();
        counter.set(counter.get() + 1);
    });

    b.set(1);
    b.set(2);
    assert_eq!(runs.get(), 1);

    a.set(1);
    assert_eq!(runs.get(), 2);
}

/// Conditional reads rebuild the dependency set on every run.
#[test]
fn conditional_dependencies_follow_latest_run() {
    let app = App::new();
    let use_left = app.create_signal(true);
    let left = app.create_signal("l0");
    let right = app.create_signal("r0");
    let seen = Rc::new(RefCell::new(Vec::new()));

    let computation = {
        let (flag, l, r, seen) = (use_left.clone(), left.clone(), right.clone(), seen.clone());
        app.track(move || {
            let value = if flag.get() { l.get() } else { r.get() };
            seen.borrow_mut().push(value);
        })
    };

    right.set("r1");
    assert_eq!(*seen.borrow(), vec!["l0"]);

    use_left.set(false);
    assert_eq!(
        computation.dependencies(),
        vec![use_left.id(), right.id()]
    );

    left.set("l1");
    right.set("r2");
    assert_eq!(*seen.borrow(), vec!["l0", "r1", "r2"]);
}

/// The previous value tracks the value before the latest accepted write.
#[test]
fn previous_value_correctness() {
    let app = App::new();
    let signal = app.create_signal(1);
    assert_eq!(signal.get_previous(), 1);

    for next in 2..=5 {
        signal.set(next);
        assert_eq!(signal.get_previous(), next - 1);
    }

    // Rejected write leaves it alone.
    signal.set(5);
    assert_eq!(signal.get_previous(), 4);

    signal.update(|v| v * 10);
    assert_eq!(signal.get_previous(), 5);
    assert_eq!(signal.get(), 50);
}

/// Re-rendering with no intervening change gives identical content.
#[test]
fn idempotent_rerender() {
    let app = App::new();
    app.create_mount_point("app");
    let items = app.create_signal(vec!["a", "b"]);

    let reader = items.clone();
    let component = app.component(move || {
        let list = sprout_core::dom::markup::join_map(reader.get(), |i| format!("<li>{i}</li>"));
        format!("<ul>{list}</ul>")
    });
    component.render(None);

    component.update_dom();
    let first = component.node_ref().inner_html();
    component.update_dom();
    let second = component.node_ref().inner_html();

    assert_eq!(first, second);
    assert_eq!(first, "<ul><li>a</li><li>b</li></ul>");
}

/// Delegated bindings only fire for their own target id.
#[test]
fn event_delegation_scenario() {
    let app = App::new();
    app.create_mount_point("app");
    let component = app.static_component(|| {
        r#"<button id="minus">-</button><button id="plus">+</button>"#.to_string()
    });

    let (plus_hits, plus) = hit_counter();
    let (minus_hits, minus) = hit_counter();
    component
        .add_event(move |_| EventSpec::new("click", plus).target_id("plus"))
        .add_event(move |_| EventSpec::new("click", minus).target_id("minus"))
        .render(None);

    let invoked = app.document().fire("click", "plus");

    assert_eq!(invoked, 2);
    assert_eq!(plus_hits.get(), 1);
    assert_eq!(minus_hits.get(), 0);
}

/// Removing one named binding leaves the others installed.
#[test]
fn removal_scenario() {
    let app = App::new();
    app.create_mount_point("app");
    let component = app.static_component(|| "<i id=\"t\">t</i>".to_string());

    let (a_hits, a) = hit_counter();
    let (b_hits, b) = hit_counter();
    let (c_hits, c) = hit_counter();
    component
        .add_event(move |_| EventSpec::new("click", a).name("a"))
        .add_event(move |_| EventSpec::new("focus", b).name("b"))
        .add_event(move |_| EventSpec::new("input", c).name("c"))
        .render(None);
    assert_eq!(component.node_ref().listener_count(None), 3);

    component.remove_event("b").unwrap();

    let container = component.node_ref();
    assert_eq!(container.listener_count(None), 2);
    assert_eq!(component.binding_count(), 2);

    for kind in ["click", "focus", "input"] {
        app.document().fire(kind, "t");
    }
    assert_eq!((a_hits.get(), b_hits.get(), c_hits.get()), (1, 0, 1));
}

/// Removing an unknown name is an error and changes nothing.
#[test]
fn removing_unknown_event_fails() {
    let app = App::new();
    let component = app.static_component(String::new);
    component.add_event(|_| EventSpec::new("click", |_| {}).name("known"));

    let err = component.remove_event("remove").unwrap_err();

    assert!(matches!(err, Error::EventNotRegistered { ref name } if name == "remove"));
    assert_eq!(component.binding_count(), 1);
}

/// Clicking the increment button three times renders "3".
#[test]
fn counter_end_to_end() {
    let app = App::new();
    app.create_mount_point("app");
    let count = app.create_signal(0);

    let reader = count.clone();
    let counter = app.component(move || {
        format!(
            r#"<button id="minus">-</button><h1>{}</h1><button id="plus">+</button>"#,
            reader.get()
        )
    });

    let (inc, dec) = (count.clone(), count.clone());
    counter
        .add_event(move |_| {
            EventSpec::new("click", move |_| {
                inc.update(|c| c + 1);
            })
            .name("increment")
            .target_id("plus")
        })
        .add_event(move |_| {
            EventSpec::new("click", move |_| {
                dec.update(|c| c - 1);
            })
            .target_id("minus")
        })
        .render(Some("app"));

    for _ in 0..3 {
        app.document().fire("click", "plus");
    }

    assert_eq!(count.get(), 3);
    assert_eq!(counter.node_ref().text_content(), "- 3 +");
    assert_eq!(counter.state(), LifecycleState::Updated);
    // Re-renders re-installed the bindings without stacking listeners.
    assert_eq!(counter.node_ref().listener_count(Some("click")), 2);

    app.document().fire("click", "minus");
    assert_eq!(counter.node_ref().text_content(), "- 2 +");
}

/// Window-scoped bindings receive window events after mount.
#[test]
fn window_scoped_binding() {
    let app = App::new();
    app.create_mount_point("app");
    let width = app.create_signal(0u32);

    let reader = width.clone();
    let component = app.component(move || format!("<p>{}</p>", reader.get()));

    let writer = width.clone();
    component
        .add_event(move |_| {
            EventSpec::new("resize", move |_| {
                writer.update(|w| w + 100);
            })
            .on_window()
            .name("resize")
        })
        .render(None);

    app.document()
        .dispatch_window(&sprout_core::Event::new("resize"));
    assert_eq!(component.node_ref().text_content(), "100");
    assert_eq!(app.document().window_listener_count(Some("resize")), 1);

    component.remove_event("resize").unwrap();
    app.document()
        .dispatch_window(&sprout_core::Event::new("resize"));
    assert_eq!(width.get(), 100);
    assert_eq!(app.document().window_listener_count(None), 0);
}

/// A panicking markup function leaves the previous content and a clean stack.
#[test]
fn failed_update_keeps_previous_content() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let app = App::new();
    app.create_mount_point("app");
    let value = app.create_signal(1);

    let reader = value.clone();
    let component = app.component(move || {
        let v = reader.get();
        assert!(v < 100, "value out of range");
        format!("<b>{v}</b>")
    });
    component.render(None);

    let result = catch_unwind(AssertUnwindSafe(|| {
        value.set(500);
    }));

    assert!(result.is_err());
    assert_eq!(component.node_ref().inner_html(), "<b>1</b>");
    assert_eq!(app.runtime().depth(), 0);

    // The component is still subscribed and recovers on the next write.
    value.set(2);
    assert_eq!(component.node_ref().inner_html(), "<b>2</b>");
}

/// Mounting into a missing target is a silent no-op that callers can detect.
#[test]
fn missing_render_target() {
    let app = App::new();
    let component = app.component(|| "hello".to_string());

    component.render(None);

    assert!(!component.is_mounted());
    assert!(app.document().get_element_by_id(component.id()).is_none());

    app.create_mount_point("app");
    component.render(None);
    assert!(component.is_mounted());
    assert!(app.document().get_element_by_id(component.id()).is_some());
}

/// Two components reading the same signal both re-render.
#[test]
fn components_sharing_a_signal() {
    let app = App::new();
    app.create_mount_point("app");
    let name = app.create_signal("ada".to_string());

    let (r1, r2) = (name.clone(), name.clone());
    let greeting = app.component(move || format!("hello {}", r1.get()));
    let badge = app.component(move || format!("[{}]", r2.get()));
    greeting.render(None);
    badge.render(None);

    name.set("grace".to_string());

    assert_eq!(greeting.node_ref().text_content(), "hello grace");
    assert_eq!(badge.node_ref().text_content(), "[grace]");
    assert_eq!(name.subscriber_count(), 2);

    name.reset();
    assert_eq!(badge.node_ref().text_content(), "[ada]");
}
