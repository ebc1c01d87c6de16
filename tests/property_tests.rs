//! Property tests: option round-trips and whitespace invariance.

use proptest::prelude::*;
use protoparse::parser::ast::AstMember;
use protoparse::parser::{parse_message, parse_option};

const KEYWORDS: &[&str] = &[
    "syntax", "package", "import", "option", "message", "enum", "service", "rpc", "returns",
    "stream", "map", "oneof", "reserved", "repeated", "optional", "required", "to", "max",
];

fn ident() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}".prop_filter("keyword", |s| !KEYWORDS.contains(&s.as_str()))
}

fn option_name() -> impl Strategy<Value = String> {
    (
        proptest::option::of(prop::collection::vec(ident(), 1..3)),
        prop::collection::vec(ident(), 1..4),
    )
        .prop_map(|(ext, segments)| match ext {
            Some(ext) => format!("({}).{}", ext.join("."), segments.join(".")),
            None => segments.join("."),
        })
}

fn constant() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("true".to_string()),
        Just("false".to_string()),
        "[0-9]{1,6}",
        "-[1-9][0-9]{0,4}",
        "[0-9]{1,3}\\.[0-9]{1,3}",
        "\"[a-zA-Z0-9 ._/]{0,12}\"",
        ident(),
    ]
}

/// One message body element, rendered on a single line.
fn element() -> impl Strategy<Value = String> {
    prop_oneof![
        (ident(), ident(), 1u32..1000).prop_map(|(t, n, num)| format!("{t} {n} = {num};")),
        (ident(), 1u32..1000).prop_map(|(n, num)| format!("repeated string {n} = {num};")),
        (ident(), 1u32..1000).prop_map(|(n, num)| format!("map<int32, string> {n} = {num};")),
        (option_name(), constant()).prop_map(|(n, c)| format!("option {n} = {c};")),
        (1u32..100).prop_map(|n| format!("reserved {n};")),
        ident().prop_map(|n| format!("message M{n} {{}}")),
        ident().prop_map(|n| format!("enum E{n} {{ ZERO = 0; }}")),
        ident().prop_map(|n| format!("oneof o{n} {{ int32 v{n} = 1; }}")),
    ]
}

proptest! {
    #[test]
    fn option_round_trips(name in option_name(), value in constant()) {
        let first = parse_option(&format!("option {name} = {value};")).unwrap();
        prop_assert_eq!(&first.name, &name);
        prop_assert_eq!(&first.constant, &value);

        let printed = format!("option {} = {};", first.name, first.constant);
        let second = parse_option(&printed).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn body_length_ignores_layout(
        elements in prop::collection::vec(element(), 0..12),
        gaps in prop::collection::vec(0usize..3, 12),
    ) {
        let compact = format!("message M {{ {} }}", elements.join(" "));

        let mut spaced = String::from("message M {\n");
        for (element, gap) in elements.iter().zip(gaps.iter()) {
            spaced.push_str(&"\n".repeat(*gap));
            spaced.push_str("    ");
            spaced.push_str(element);
            spaced.push('\n');
        }
        spaced.push_str("}\n");

        let a = parse_message(&compact).unwrap();
        let b = parse_message(&spaced).unwrap();
        prop_assert_eq!(a.body.len(), elements.len());
        prop_assert_eq!(b.body.len(), elements.len());

        let kinds = |body: &[AstMember]| {
            body.iter().map(|m| std::mem::discriminant(m)).collect::<Vec<_>>()
        };
        prop_assert_eq!(kinds(&a.body), kinds(&b.body));
    }
}
