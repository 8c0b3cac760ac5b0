mod support;

use remixer::prelude::*;
use support::{counter, recorder, volume};

#[test]
fn siblings_observe_every_value_in_order() {
    let mut remixer = Remixer::new();
    let screen = remixer.create_context("screen");
    let dialog = remixer.create_context("dialog");

    let a = remixer
        .add_item(screen, volume().build().expect("build a"))
        .expect("add a");
    let (seen, record) = recorder();
    remixer
        .add_item(dialog, volume().callback(record).build().expect("build b"))
        .expect("add b");

    for value in [0.0, 5.0, 20.0, 10.0] {
        remixer.set_value(a, value).expect("set");
    }

    let seen: Vec<f64> =
        seen.borrow().iter().filter_map(RemixValue::as_number).collect();
    // construction, convergence on add, then each set
    assert_eq!(seen, vec![15.0, 15.0, 0.0, 5.0, 20.0, 10.0]);
}

#[test]
fn change_from_any_instance_reaches_all_others() {
    let mut remixer = Remixer::new();
    let context = remixer.create_context("screen");

    let mut handles = Vec::new();
    let mut counts = Vec::new();
    for _ in 0..4 {
        let (count, callback) = counter();
        let handle = remixer
            .add_item(
                context,
                Variable::string_options("mode", &["red", "blue", "green"])
                    .callback(callback)
                    .build()
                    .expect("build"),
            )
            .expect("add");
        handles.push(handle);
        counts.push(count);
    }

    let before: Vec<usize> = counts.iter().map(|c| c.get()).collect();
    remixer.set_value(handles[3], "green").expect("set");

    for (handle, (count, before)) in
        handles.iter().zip(counts.iter().zip(before))
    {
        assert_eq!(remixer.value(*handle), Some(&"green".into()));
        assert_eq!(count.get(), before + 1);
    }
}

#[test]
fn incompatible_item_leaves_group_untouched() {
    let mut remixer = Remixer::new();
    let context = remixer.create_context("screen");
    let first = remixer
        .add_item(context, volume().build().expect("build"))
        .expect("add");

    let err = remixer
        .add_item(
            context,
            Variable::range("vol", 15.0, (0.0, 20.0), 1.0)
                .build()
                .expect("build"),
        )
        .expect_err("different increment must be rejected");
    assert!(matches!(err, RemixerError::IncompatibleItemsWithSameKey { .. }));

    let err = remixer
        .add_item(context, Trigger::builder("vol").build().expect("build"))
        .expect_err("trigger sharing a variable key must be rejected");
    assert!(matches!(err, RemixerError::IncompatibleItemsWithSameKey { .. }));

    let group = remixer.items_with_key("vol");
    assert_eq!(group.len(), 1);
    assert_eq!(remixer.value(first), Some(&15.0.into()));
}

#[test]
fn canonical_value_survives_context_teardown() {
    let mut remixer = Remixer::new();
    let screen = remixer.create_context("screen");

    let a = remixer
        .add_item(screen, volume().build().expect("build"))
        .expect("add");
    remixer.set_value(a, 5.0).expect("set");
    remixer.on_context_destroyed(screen).expect("destroy");

    assert!(remixer.live().is_empty());
    let stored = remixer
        .snapshot()
        .and_then(|snapshot| snapshot.get("vol"))
        .expect("snapshot retained");
    assert_eq!(stored.selected_value, Some(5.0.into()));
    assert_eq!(stored.title, "Volume");

    let reopened = remixer.create_context("screen");
    let b = remixer
        .add_item(reopened, volume().build().expect("build"))
        .expect("add");
    assert_eq!(remixer.value(b), Some(&5.0.into()));
}

#[test]
fn snapshot_serializes_every_live_key() {
    let mut remixer = Remixer::new();
    let context = remixer.create_context("screen");

    remixer
        .add_item(context, volume().build().expect("build"))
        .expect("add");
    remixer
        .add_item(
            context,
            Variable::color("tint", Color::rgb(0x11, 0x22, 0x33))
                .build()
                .expect("build"),
        )
        .expect("add");
    remixer
        .add_item(context, Trigger::builder("reset").build().expect("build"))
        .expect("add");

    let snapshot = remixer.snapshot().expect("local mechanism keeps one");
    let json = snapshot.to_json_pretty().expect("to json");
    let (restored, rejected) = Snapshot::from_json(&json).expect("from json");

    assert!(rejected.is_empty());
    assert_eq!(&restored, snapshot);

    let tree = snapshot.to_tree().expect("to tree");
    assert_eq!(tree["variables"]["tint"]["selectedValue"], "#ff112233");
    assert_eq!(tree["variables"]["vol"]["increment"], 5.0);
    assert!(tree["variables"]["reset"].get("selectedValue").is_none());
}

#[test]
fn declarations_register_in_file_order() {
    let yaml = r#"
defaults: &defaults
  layout: slider

speed:
  <<: *defaults
  type: range
  range: [0, 10]
  step: 2
  default: 4

label:
  type: string
  default: hello
"#;
    let mut remixer = Remixer::new();
    let context = remixer.create_context("screen");

    let declarations = parse_declarations(yaml).expect("parse");
    let handles = remixer
        .add_declarations(context, declarations)
        .expect("register");

    let keys: Vec<&str> = remixer
        .items_for_context(context)
        .iter()
        .map(|item| item.key())
        .collect();
    assert_eq!(keys, vec!["speed", "label"]);
    assert_eq!(remixer.value(handles[0]), Some(&4.0.into()));
    assert_eq!(
        remixer.item(handles[0]).and_then(RemixerItem::layout_hint),
        Some("slider")
    );
}
