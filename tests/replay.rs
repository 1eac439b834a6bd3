use fluent_dom as fd;
use fluent_dom::script::{self, Op};
use pretty_assertions::assert_eq;

fn run(root: &str, src: &str) -> Result<String, String> {
    let ops = script::parse(src).map_err(|e| e.to_string())?;
    let (mut b, node) = fd::memory_builder(root).map_err(|e| e.to_string())?;
    script::replay(&mut b, &ops).map_err(|e| e.to_string())?;
    Ok(b.dom().outer_html(node))
}

#[test]
fn test_replay_list_with_for_each() {
    let src = r#"[
        {"op": "spawn", "tag": "ul"},
        {"op": "to_spawned"},
        {"op": "set_class", "name": "items"},
        {"op": "for_each", "items": ["a", 2], "body": [
            {"op": "spawn", "tag": "li"},
            {"op": "append_text", "text": "{index}: {item}"},
            {"op": "append_spawned"}
        ]},
        {"op": "to_main"},
        {"op": "append_spawned"}
    ]"#;
    assert_eq!(
        run("body", src).unwrap(),
        r#"<body><ul class="items"><li>0: a</li><li>1: 2</li></ul></body>"#
    );
}

#[test]
fn test_replay_call_if_and_style() {
    let src = r#"[
        {"op": "call_if", "condition": false,
         "then": [{"op": "append_text", "text": "yes"}],
         "otherwise": [{"op": "append_text", "text": "no"}]},
        {"op": "call_if", "condition": true, "then": [{"op": "set_style", "key": "color", "value": "red"}]},
        {"op": "set_attr", "key": "id", "value": "main"}
    ]"#;
    assert_eq!(run("div", src).unwrap(), r#"<div style="color: red;" id="main">no</div>"#);
}

#[test]
fn test_replay_remove_children_and_clear() {
    let src = r#"[
        {"op": "append_text", "text": "old"},
        {"op": "remove_children"},
        {"op": "append_text", "text": "new"},
        {"op": "on", "event": "click"},
        {"op": "clear"}
    ]"#;
    assert_eq!(run("p", src).unwrap(), "<p>new</p>");
}

#[test]
fn test_replay_reports_failing_op() {
    let ops = vec![
        Op::Spawn { tag: "p".into() },
        Op::ToSpawned,
        Op::AppendSpawned,
    ];
    let (mut b, _) = fd::memory_builder("body").unwrap();
    let err = script::replay(&mut b, &ops).unwrap_err();
    assert_eq!(err.index(), 2);
    assert!(err.build_error().is_precondition());
    assert_eq!(err.to_string(), "op #2 (append_spawned) failed: no receiver for spawned target");
}

#[test]
fn test_replay_after_clear_fails_without_root() {
    let src = r#"[{"op": "clear"}, {"op": "set_value", "value": "x"}]"#;
    assert_eq!(
        run("input", src).unwrap_err(),
        "op #1 (set_value) failed: no receiver for main target"
    );
}

#[test]
fn test_replay_nested_for_each_uses_inner_items() {
    let src = r#"[
        {"op": "for_each", "items": ["x", "y"], "body": [
            {"op": "append_text", "text": "{item}:"},
            {"op": "for_each", "items": ["a", "b"], "body": [
                {"op": "append_text", "text": "{item}{index}"}
            ]},
            {"op": "append_text", "text": ";"}
        ]}
    ]"#;
    assert_eq!(run("p", src).unwrap(), "<p>x:a0b1;y:a0b1;</p>");
}

#[test]
fn test_replay_item_text_is_not_substituted_again() {
    let src = r#"[
        {"op": "for_each", "items": ["{index}", "{item}"], "body": [
            {"op": "append_text", "text": "[{item}]"}
        ]}
    ]"#;
    assert_eq!(run("p", src).unwrap(), "<p>[{index}][{item}]</p>");
}
