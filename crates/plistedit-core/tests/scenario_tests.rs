//! End-to-end scenarios for the codec and the value model.

use plistedit_core::path::{self, Path};
use plistedit_core::{classify, date, parse, serialize, Dict, Kind, NumberKind, PlistValue};

#[test]
fn classify_covers_every_kind() {
    let values = [
        PlistValue::Null,
        PlistValue::Boolean(true),
        PlistValue::Integer(3),
        PlistValue::Real(3.5),
        PlistValue::from("x"),
        PlistValue::Date(date::now()),
        PlistValue::Array(Vec::new()),
        PlistValue::Dict(Dict::new()),
    ];
    let kinds: Vec<Kind> = values.iter().map(classify).collect();
    assert_eq!(
        kinds,
        vec![
            Kind::Null,
            Kind::Boolean,
            Kind::Number(NumberKind::Integer),
            Kind::Number(NumberKind::Real),
            Kind::String,
            Kind::Date,
            Kind::Array,
            Kind::Dict,
        ]
    );
    assert_eq!(
        classify(&PlistValue::Real(3.0)),
        Kind::Number(NumberKind::Integer)
    );
}

#[test]
fn firefox_dict_roundtrips() {
    let xml = "<plist><dict><key>name</key><string>Firefox</string><key>version</key><string>1.0</string></dict></plist>";
    let tree = parse(xml).unwrap();
    assert_eq!(
        tree,
        PlistValue::from(serde_json::json!({"name": "Firefox", "version": "1.0"}))
    );
    let out = serialize(&tree, false);
    assert!(out.ends_with(
        "<plist version=\"1.0\"><dict><key>name</key><string>Firefox</string><key>version</key><string>1.0</string></dict></plist>"
    ));
}

#[test]
fn integer_array_append() {
    let mut tree =
        parse("<plist><array><integer>1</integer><integer>2</integer></array></plist>").unwrap();
    path::append(&mut tree, &Path::root(), PlistValue::Integer(3)).unwrap();
    let out = serialize(&tree, false);
    assert!(out.ends_with(
        "<array><integer>1</integer><integer>2</integer><integer>3</integer></array></plist>"
    ));
}

#[test]
fn invalid_date_is_epoch_not_an_error() {
    let tree = parse("<plist><date>not-a-date</date></plist>").unwrap();
    assert_eq!(tree, PlistValue::Date(date::epoch()));
    assert!(serialize(&tree, false).contains("<date>1970-01-01T00:00:00Z</date>"));
}

#[test]
fn dict_equality_respects_key_order() {
    let ab = PlistValue::from(serde_json::json!({"a": 1, "b": 2}));
    let ba = PlistValue::from(serde_json::json!({"b": 2, "a": 1}));
    assert_ne!(ab, ba);
    assert_eq!(ab, PlistValue::from(serde_json::json!({"a": 1, "b": 2})));
    // Nested dicts are compared the same way.
    assert_ne!(
        PlistValue::Array(vec![ab.clone()]),
        PlistValue::Array(vec![ba])
    );
}

#[test]
fn integer_real_equality_is_exact() {
    assert_eq!(PlistValue::Integer(3), PlistValue::Real(3.0));
    assert_eq!(PlistValue::Real(-7.0), PlistValue::Integer(-7));
    assert_ne!(PlistValue::Integer(3), PlistValue::Real(3.5));
    // 2^53 + 1 has no exact f64; its nearest neighbour is not the same number.
    assert_ne!(
        PlistValue::Integer(9_007_199_254_740_993),
        PlistValue::Real(9_007_199_254_740_992.0)
    );
    assert_eq!(
        PlistValue::Integer(9_007_199_254_740_992),
        PlistValue::Real(9_007_199_254_740_992.0)
    );
    assert_ne!(PlistValue::Integer(i64::MAX), PlistValue::Real(i64::MAX as f64));
}
