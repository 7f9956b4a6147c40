/// Property-based tests for the plist codec and path addressing.
///
/// Generated trees hold every kind except `Null` (which has no plist form and
/// is written as an empty dict). Dates are generated at whole seconds since
/// the wire format drops fractions.
use chrono::DateTime;
use proptest::prelude::*;
use plistedit_core::path::{self, Path};
use plistedit_core::{classify, parse, serialize, Dict, Kind, NumberKind, PlistValue};

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_ ]{0,12}").unwrap()
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,30}",
        prop::string::string_regex("[a-zA-Z0-9<>&'\"\n\t./_-]{0,20}").unwrap(),
        Just(String::new()),
        Just("  padded  ".to_string()),
        Just("#!/bin/sh\nexit 0".to_string()),
        Just("2016-03-01T12:00:00Z".to_string()),
        Just("caf\u{00e9} \u{4f60}\u{597d}".to_string()),
    ]
}

fn arb_leaf() -> impl Strategy<Value = PlistValue> {
    prop_oneof![
        any::<bool>().prop_map(PlistValue::Boolean),
        any::<i64>().prop_map(PlistValue::Integer),
        (-1.0e12f64..1.0e12f64).prop_map(PlistValue::Real),
        arb_text().prop_map(PlistValue::String),
        (0i64..4_102_444_800i64)
            .prop_map(|secs| PlistValue::Date(DateTime::from_timestamp(secs, 0).unwrap())),
    ]
}

fn arb_value() -> impl Strategy<Value = PlistValue> {
    arb_leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(PlistValue::Array),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|pairs| PlistValue::Dict(pairs.into_iter().collect::<Dict>())),
        ]
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn compact_roundtrip(value in arb_value()) {
        let back = parse(&serialize(&value, false)).unwrap();
        prop_assert_eq!(&back, &value);
    }

    #[test]
    fn pretty_roundtrip(value in arb_value()) {
        let back = parse(&serialize(&value, true)).unwrap();
        prop_assert_eq!(&back, &value);
    }

    #[test]
    fn integral_reals_classify_as_integers(n in -1_000_000i64..1_000_000i64) {
        prop_assert_eq!(classify(&PlistValue::Real(n as f64)), Kind::Number(NumberKind::Integer));
        prop_assert_eq!(classify(&PlistValue::Real(n as f64 + 0.5)), Kind::Number(NumberKind::Real));
    }

    #[test]
    fn strings_are_never_sniffed(text in arb_text()) {
        prop_assert_eq!(classify(&PlistValue::String(text)), Kind::String);
    }

    #[test]
    fn write_then_read(key in arb_key(), value in arb_leaf()) {
        let mut tree = PlistValue::Dict(Dict::new());
        let target = Path::root().key(&key);
        path::write(&mut tree, &target, value.clone()).unwrap();
        prop_assert_eq!(path::read(&tree, &target), Some(&value));
    }

    #[test]
    fn array_removal_renumbers_later_siblings(removed in 0usize..8, probe in 0usize..8) {
        let array = Path::parse("items");
        let before = array.index(probe).key("path");
        let after = before.after_array_removal(&array, removed);
        match probe.cmp(&removed) {
            std::cmp::Ordering::Less => {
                prop_assert_eq!(after, Some(before));
            }
            std::cmp::Ordering::Equal => {
                prop_assert_eq!(after, None);
            }
            std::cmp::Ordering::Greater => {
                prop_assert_eq!(after, Some(array.index(probe - 1).key("path")));
            }
        }
    }
}
