use super::*;

fn leaf(name: &str, value: &str) -> DomNode {
    DomNode::new(name, "ns").with_field("Value", FieldValue::parse(value))
}

fn with_children(children: &[DomNode]) -> DomNode {
    children
        .iter()
        .cloned()
        .fold(DomNode::new("Parent", "ns"), |n, c| n.with_child(c))
}

fn ignore(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn equality_is_reflexive_and_symmetric() {
    let a = with_children(&[leaf("X", "1"), leaf("Y", "2")]);
    let b = with_children(&[leaf("Y", "2"), leaf("X", "1")]);
    assert_eq!(a, a);
    assert_eq!(a, b);
    assert_eq!(b, a);
}

#[test]
fn equality_ignores_child_order_but_not_counts() {
    let x = leaf("X", "1");
    let y = leaf("Y", "2");
    let xxy = with_children(&[x.clone(), x.clone(), y.clone()]);
    let yxx = with_children(&[y.clone(), x.clone(), x.clone()]);
    let xyy = with_children(&[x.clone(), y.clone(), y.clone()]);
    assert_eq!(xxy, yxx);
    assert_ne!(xxy, xyy);
}

#[test]
fn repeated_components_are_counted() {
    let mut layout = DomNode::new("PixelLayout", "ns");
    for code in ["CompRed", "CompGreen", "CompBlue"] {
        layout.add_child(
            DomNode::new("RGBALayoutItem", "ns")
                .with_field("Code", FieldValue::text(code))
                .with_field("ComponentSize", FieldValue::text("10")),
        );
    }
    for _ in 0..5 {
        layout.add_child(
            DomNode::new("RGBALayoutItem", "ns")
                .with_field("Code", FieldValue::text("CompNull"))
                .with_field("ComponentSize", FieldValue::text("0")),
        );
    }
    let null_item = DomNode::new("RGBALayoutItem", "ns")
        .with_field("Code", FieldValue::text("CompNull"))
        .with_field("ComponentSize", FieldValue::text("0"));
    let counts: Vec<usize> = layout
        .children()
        .filter(|(c, _)| **c == null_item)
        .map(|(_, n)| n)
        .collect();
    assert_eq!(counts, [5]);
    assert_eq!(layout.children().count(), 4);
}

#[test]
fn namespace_and_name_participate_in_equality() {
    assert_ne!(DomNode::new("A", "ns1"), DomNode::new("A", "ns2"));
    assert_ne!(DomNode::new("A", "ns"), DomNode::new("B", "ns"));
}

#[test]
fn ul_fields_compare_without_version_byte() {
    let a = DomNode::new("D", "ns").with_field(
        "ColorPrimaries",
        FieldValue::parse("urn:smpte:ul:060e2b34.04010106.04010101.03030000"),
    );
    let b = DomNode::new("D", "ns").with_field(
        "ColorPrimaries",
        FieldValue::parse("URN:SMPTE:UL:060E2B34.0401010D.04010101.03030000"),
    );
    assert_eq!(a, b);
}

#[test]
fn field_value_parsing_classifies_text() {
    assert_eq!(FieldValue::parse(" 24/1 ").as_fraction(), Some((24, 1)));
    assert!(FieldValue::parse("urn:smpte:ul:060e2b34.04010106.04010101.03030000")
        .as_ul()
        .is_some());
    assert_eq!(FieldValue::parse("http://a/b").as_text(), Some("http://a/b"));
    assert_eq!(
        FieldValue::parse("urn:uuid:ABCDEF00-0000-0000-0000-000000000000").as_text(),
        Some("urn:uuid:abcdef00-0000-0000-0000-000000000000")
    );
    // Non-ASCII text must not trip prefix slicing.
    assert_eq!(FieldValue::parse("é").as_text(), Some("é"));
}

#[test]
fn ignore_set_strips_fields_and_elements_recursively() {
    let a = DomNode::new("D", "ns")
        .with_field("InstanceUID", FieldValue::text("urn:uuid:1"))
        .with_field("StoredWidth", FieldValue::text("1920"))
        .with_child(DomNode::new("PHDRMetadataTrackSubDescriptor", "ns"))
        .with_child(
            DomNode::new("SubDescriptors", "ns")
                .with_field("InstanceUID", FieldValue::text("urn:uuid:2")),
        );
    let b = DomNode::new("D", "ns")
        .with_field("InstanceUID", FieldValue::text("urn:uuid:3"))
        .with_field("StoredWidth", FieldValue::text("1920"))
        .with_child(
            DomNode::new("SubDescriptors", "ns")
                .with_field("InstanceUID", FieldValue::text("urn:uuid:4")),
        );
    let set = ignore(&["InstanceUID", "PHDRMetadataTrackSubDescriptor"]);
    assert_ne!(a, b);
    assert!(a.equals_ignoring(&b, &set));
}

#[test]
fn ignore_projection_is_idempotent() {
    let m = with_children(&[
        leaf("X", "1").with_field("InstanceUID", FieldValue::text("a")),
        leaf("X", "1").with_field("InstanceUID", FieldValue::text("b")),
        leaf("Y", "2"),
    ]);
    let set = ignore(&["InstanceUID"]);
    let once = m.with_ignored(&set);
    let twice = once.with_ignored(&set);
    assert_eq!(once, twice);
    // Both X children collapse into one entry counted twice.
    let x = leaf("X", "1");
    assert_eq!(once.children().find(|(c, _)| **c == x).map(|(_, n)| n), Some(2));
}

#[test]
fn remove_nodes_of_equal_trees_is_empty() {
    let a = with_children(&[leaf("X", "1"), leaf("Y", "2")]);
    let diff = DomNode::remove_nodes(&a, &a.clone());
    assert!(diff.is_empty());
    assert_eq!(a.difference_count(&a), 0);
}

#[test]
fn remove_nodes_points_at_inner_difference() {
    let reference = DomNode::new("D", "ns")
        .with_field("StoredWidth", FieldValue::text("1920"))
        .with_child(
            DomNode::new("SubDescriptors", "ns").with_child(
                DomNode::new("JPEG2000SubDescriptor", "ns")
                    .with_field("Rsiz", FieldValue::text("1798"))
                    .with_field("Xsiz", FieldValue::text("1920")),
            ),
        );
    let candidate = DomNode::new("D", "ns")
        .with_field("StoredWidth", FieldValue::text("1920"))
        .with_child(
            DomNode::new("SubDescriptors", "ns").with_child(
                DomNode::new("JPEG2000SubDescriptor", "ns")
                    .with_field("Rsiz", FieldValue::text("1799"))
                    .with_field("Xsiz", FieldValue::text("1920")),
            ),
        );
    let diff = DomNode::remove_nodes(&reference, &candidate);
    assert!(diff.field("StoredWidth").is_none());
    let j2k = diff.find("JPEG2000SubDescriptor").unwrap();
    assert_eq!(j2k.field("Rsiz").and_then(FieldValue::as_text), Some("1798"));
    assert!(j2k.field("Xsiz").is_none());
}

#[test]
fn remove_nodes_keeps_unmatched_subtrees_whole() {
    let reference = with_children(&[leaf("X", "1"), leaf("Z", "3")]);
    let candidate = with_children(&[leaf("X", "1")]);
    let diff = DomNode::remove_nodes(&reference, &candidate);
    assert_eq!(diff.child("Z"), Some(&leaf("Z", "3")));
    assert!(diff.child("X").is_none());
}

#[test]
fn closest_match_prefers_fewest_differences() {
    let reference = DomNode::new("D", "ns")
        .with_field("A", FieldValue::text("1"))
        .with_field("B", FieldValue::text("2"))
        .with_field("C", FieldValue::text("3"));
    let far = DomNode::new("D", "ns")
        .with_field("A", FieldValue::text("9"))
        .with_field("B", FieldValue::text("9"))
        .with_field("C", FieldValue::text("3"));
    let near = DomNode::new("D", "ns")
        .with_field("A", FieldValue::text("1"))
        .with_field("B", FieldValue::text("2"))
        .with_field("C", FieldValue::text("4"));
    let other_kind = DomNode::new("E", "ns");
    let candidates = [far, other_kind, near.clone()];
    let (idx, best) = DomNode::closest_match(&reference, &candidates).unwrap();
    assert_eq!(idx, 2);
    assert_eq!(best, &near);
    assert!(DomNode::closest_match(&reference, &[]).is_none());
}

#[test]
fn display_renders_counts() {
    let n = with_children(&[leaf("X", "1"), leaf("X", "1")]);
    let text = n.to_string();
    assert!(text.starts_with("Parent [ns]"));
    assert!(text.contains("X [ns] (x2)"));
    assert!(text.contains("Value = 1"));
}

#[test]
fn child_lookup_outlives_the_name() {
    let parent = with_children(&[leaf("X", "1"), leaf("Y", "2")]);
    let found = {
        let name = String::from("Y");
        parent.child(&name)
    };
    assert_eq!(found, Some(&leaf("Y", "2")));
    assert_eq!(parent.children_named("X").count(), 1);
}
