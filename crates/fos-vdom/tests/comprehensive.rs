//! Comprehensive tests for fos-vdom
//!
//! Reconciliation properties checked against a real `DomTree` host.

use fos_dom::{DomTree, MutationType, NodeId};
use fos_vdom::{AttrValue, Key, NodeDesc, NodeRenderer};

fn item(key: &str) -> NodeDesc {
    NodeDesc::new(key, "li").attr("data-key", key)
}

fn list(keys: &[&str]) -> NodeDesc {
    NodeDesc::new("list", "ul").children(keys.iter().map(|k| item(k)))
}

fn host_order(renderer: &NodeRenderer<DomTree>) -> Vec<String> {
    let host = renderer.host();
    host.child_ids(renderer.html())
        .into_iter()
        .map(|id| host.get_attribute(id, "data-key").unwrap_or_default().to_string())
        .collect()
}

fn handle(renderer: &NodeRenderer<DomTree>, key: &str) -> NodeId {
    renderer.lookup_host(&Key::from(key)).expect("key should be live")
}

// ============================================================================
// IDEMPOTENCE
// ============================================================================

#[test]
fn test_second_identical_sync_is_noop() {
    let desc = NodeDesc::new("app", "div")
        .attr("id", "app")
        .child(
            NodeDesc::new("header", "header")
                .attr("expanded", true)
                .attr("value", 4)
                .child(NodeDesc::new("title", "h1").attr("class", "title")),
        )
        .child(NodeDesc::new("body", "main").attr("hidden", false));

    let mut renderer = NodeRenderer::new(DomTree::new(), &desc).unwrap();
    renderer.host_mut().observe(true);

    let stats = renderer.sync(&desc).unwrap();

    assert!(stats.is_noop(), "unexpected work: {stats:?}");
    assert!(renderer.host_mut().take_records().is_empty());
}

#[test]
fn test_noop_after_reorder_settles() {
    let mut renderer = NodeRenderer::new(DomTree::new(), &list(&["a", "b", "c"])).unwrap();
    renderer.sync(&list(&["c", "b", "a"])).unwrap();

    renderer.host_mut().observe(true);
    let stats = renderer.sync(&list(&["c", "b", "a"])).unwrap();

    assert!(stats.is_noop());
    assert!(renderer.host_mut().take_records().is_empty());
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

#[test]
fn test_attribute_round_trip() {
    let desc = NodeDesc::new("root", "div")
        .attr("a", 1)
        .attr("b", true)
        .attr("c", "x");
    let mut renderer = NodeRenderer::new(DomTree::new(), &desc).unwrap();

    let attrs: Vec<(String, String)> = renderer.host()
        .attributes(renderer.html())
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect();
    assert_eq!(
        attrs,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), String::new()),
            ("c".to_string(), "x".to_string()),
        ]
    );

    let desc = desc.attr("b", false);
    renderer.sync(&desc).unwrap();

    let host = renderer.host();
    assert_eq!(host.get_attribute(renderer.html(), "b"), None);
    assert_eq!(host.attributes(renderer.html()).count(), 2);
}

#[test]
fn test_false_never_renders_as_string() {
    let desc = NodeDesc::new("root", "div")
        .child(NodeDesc::new("field", "input").attr("disabled", false));
    let mut renderer = NodeRenderer::new(DomTree::new(), &desc).unwrap();
    let input = handle(&renderer, "field");

    assert_eq!(renderer.host().get_attribute(input, "disabled"), None);

    let enabled = NodeDesc::new("root", "div")
        .child(NodeDesc::new("field", "input").attr("disabled", true));
    renderer.sync(&enabled).unwrap();
    assert_eq!(renderer.host().get_attribute(input, "disabled"), Some(""));

    renderer.sync(&desc).unwrap();
    assert_eq!(renderer.host().get_attribute(input, "disabled"), None);
    assert!(renderer.host().attributes(input).all(|a| a.value != "false"));

    let snapshot = renderer.element(renderer.lookup(&Key::from("field")).unwrap()).unwrap();
    assert_eq!(snapshot.attributes()["disabled"], AttrValue::Bool(false));
}

#[test]
fn test_attribute_removed_when_absent_from_description() {
    let desc = NodeDesc::new("root", "div").attr("class", "a").attr("title", "t");
    let mut renderer = NodeRenderer::new(DomTree::new(), &desc).unwrap();

    let stats = renderer.sync(&NodeDesc::new("root", "div").attr("class", "b")).unwrap();

    assert_eq!(stats.attributes_set, 1);
    assert_eq!(stats.attributes_removed, 1);
    assert_eq!(renderer.host().to_html(renderer.html()), r#"<div class="b"></div>"#);
}

// ============================================================================
// IDENTITY
// ============================================================================

#[test]
fn test_moved_child_keeps_its_element() {
    let mut renderer = NodeRenderer::new(DomTree::new(), &list(&["a", "b", "c"])).unwrap();
    let element = renderer.lookup(&Key::from("b")).unwrap();
    let host = handle(&renderer, "b");

    renderer.sync(&list(&["b", "c", "a"])).unwrap();

    assert_eq!(renderer.lookup(&Key::from("b")), Some(element));
    assert_eq!(handle(&renderer, "b"), host);
    assert_eq!(host_order(&renderer), ["b", "c", "a"]);
}

#[test]
fn test_child_moves_between_parents() {
    let two_lists = |left: &[&str], right: &[&str]| {
        NodeDesc::new("root", "div")
            .child(NodeDesc::new("left", "ul").children(left.iter().map(|k| item(k))))
            .child(NodeDesc::new("right", "ul").children(right.iter().map(|k| item(k))))
    };
    let mut renderer = NodeRenderer::new(DomTree::new(), &two_lists(&["a", "b"], &["c"])).unwrap();
    let b = handle(&renderer, "b");

    let stats = renderer.sync(&two_lists(&["a"], &["b", "c"])).unwrap();

    let right = handle(&renderer, "right");
    assert_eq!(handle(&renderer, "b"), b);
    assert_eq!(renderer.host().parent(b), Some(right));
    assert_eq!(stats.created, 0);
    assert_eq!(stats.purged, 0);
    assert_eq!(
        renderer.host().to_html(renderer.html()),
        concat!(
            r#"<div><ul><li data-key="a"></li></ul>"#,
            r#"<ul><li data-key="b"></li><li data-key="c"></li></ul></div>"#
        )
    );
}

#[test]
fn test_integer_and_string_keys_are_distinct() {
    let desc = NodeDesc::new("root", "div")
        .child(NodeDesc::new(1, "p"))
        .child(NodeDesc::new("1", "p"));
    let renderer = NodeRenderer::new(DomTree::new(), &desc).unwrap();

    assert_eq!(renderer.len(), 2);
    assert_ne!(renderer.lookup(&Key::Int(1)), renderer.lookup(&Key::from("1")));
}

// ============================================================================
// GARBAGE COLLECTION
// ============================================================================

#[test]
fn test_removed_key_is_collected() {
    let mut renderer = NodeRenderer::new(DomTree::new(), &list(&["a", "k"])).unwrap();
    let k = handle(&renderer, "k");

    let stats = renderer.sync(&list(&["a"])).unwrap();

    assert_eq!(stats.purged, 1);
    assert!(renderer.lookup(&Key::from("k")).is_none());
    assert!(!renderer.host().contains(k));
    assert_eq!(renderer.host().child_ids(renderer.html()).len(), 1);

    renderer.sync(&list(&["a"])).unwrap();
    assert!(renderer.lookup(&Key::from("k")).is_none());
}

#[test]
fn test_removed_subtree_is_collected() {
    let desc = NodeDesc::new("root", "div").child(
        NodeDesc::new("panel", "section")
            .child(NodeDesc::new("p1", "p"))
            .child(NodeDesc::new("p2", "p").child(NodeDesc::new("deep", "span"))),
    );
    let mut renderer = NodeRenderer::new(DomTree::new(), &desc).unwrap();
    assert_eq!(renderer.len(), 4);
    let nodes_before = renderer.host().len();

    let stats = renderer.sync(&NodeDesc::new("root", "div")).unwrap();

    assert_eq!(stats.purged, 4);
    assert_eq!(stats.removed, 1);
    assert!(renderer.is_empty());
    assert_eq!(renderer.tree().len(), 1);
    assert_eq!(renderer.host().len(), nodes_before - 4);
}

#[test]
fn test_shrink_and_reorder() {
    let mut renderer = NodeRenderer::new(DomTree::new(), &list(&["A", "B", "C"])).unwrap();
    let a = handle(&renderer, "A");
    let b = handle(&renderer, "B");
    let c = handle(&renderer, "C");

    renderer.sync(&list(&["C", "A"])).unwrap();

    assert_eq!(renderer.host().child_ids(renderer.html()), vec![c, a]);
    assert_eq!(handle(&renderer, "A"), a);
    assert_eq!(handle(&renderer, "C"), c);
    assert!(renderer.lookup(&Key::from("B")).is_none());
    assert!(!renderer.host().contains(b));
}

#[test]
fn test_grow_keeps_existing_elements() {
    let mut renderer = NodeRenderer::new(DomTree::new(), &list(&["a"])).unwrap();
    let a = handle(&renderer, "a");

    let stats = renderer.sync(&list(&["x", "a", "y"])).unwrap();

    assert_eq!(stats.created, 2);
    assert_eq!(stats.inserted, 2);
    assert_eq!(handle(&renderer, "a"), a);
    assert_eq!(host_order(&renderer), ["x", "a", "y"]);
}

#[test]
fn test_empty_children_clear_in_one_pass() {
    let mut renderer = NodeRenderer::new(DomTree::new(), &list(&["a", "b", "c"])).unwrap();
    renderer.host_mut().observe(true);

    let stats = renderer.sync(&list(&[])).unwrap();

    let child_list: Vec<_> = renderer.host_mut()
        .take_records()
        .into_iter()
        .filter(|r| r.mutation_type == MutationType::ChildList && !r.removed_nodes.is_empty())
        .collect();
    assert_eq!(child_list.len(), 1);
    assert_eq!(child_list[0].removed_nodes.len(), 3);
    assert_eq!(stats.removed, 3);
    assert_eq!(stats.purged, 3);
    assert!(renderer.is_empty());
}

#[test]
fn test_reverse_long_list() {
    let keys: Vec<String> = (0..50).map(|i| format!("k{i}")).collect();
    let forward: Vec<&str> = keys.iter().map(String::as_str).collect();
    let backward: Vec<&str> = forward.iter().rev().copied().collect();

    let mut renderer = NodeRenderer::new(DomTree::new(), &list(&forward)).unwrap();
    let handles: Vec<NodeId> = forward.iter().map(|k| handle(&renderer, k)).collect();

    let stats = renderer.sync(&list(&backward)).unwrap();

    assert_eq!(stats.created, 0);
    assert_eq!(host_order(&renderer), backward);
    assert!(forward.iter().zip(&handles).all(|(k, h)| handle(&renderer, k) == *h));
}
