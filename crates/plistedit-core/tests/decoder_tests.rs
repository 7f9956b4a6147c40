use plistedit_core::{date, parse, PlistError, PlistValue};

fn wrap(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
{body}
</plist>
"#
    )
}

fn keys(value: &PlistValue) -> Vec<&str> {
    value
        .as_dict()
        .expect("dict")
        .keys()
        .map(String::as_str)
        .collect()
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn decode_string() {
    let value = parse(&wrap("<string>Firefox</string>")).unwrap();
    assert_eq!(value, PlistValue::from("Firefox"));
}

#[test]
fn decode_empty_and_self_closing_string() {
    assert_eq!(
        parse(&wrap("<string></string>")).unwrap(),
        PlistValue::from("")
    );
    assert_eq!(parse(&wrap("<string/>")).unwrap(), PlistValue::from(""));
}

#[test]
fn decode_string_entities() {
    let value = parse(&wrap("<string>a &lt;b&gt; &amp; &quot;c&quot;</string>")).unwrap();
    assert_eq!(value, PlistValue::from("a <b> & \"c\""));
}

#[test]
fn decode_string_keeps_whitespace() {
    let value = parse(&wrap("<string>  line1\nline2  </string>")).unwrap();
    assert_eq!(value, PlistValue::from("  line1\nline2  "));
}

#[test]
fn decode_integer() {
    assert_eq!(
        parse(&wrap("<integer>42</integer>")).unwrap(),
        PlistValue::Integer(42)
    );
    assert_eq!(
        parse(&wrap("<integer>-7</integer>")).unwrap(),
        PlistValue::Integer(-7)
    );
}

#[test]
fn decode_real() {
    assert_eq!(
        parse(&wrap("<real>3.25</real>")).unwrap(),
        PlistValue::Real(3.25)
    );
}

#[test]
fn decode_booleans() {
    assert_eq!(parse(&wrap("<true/>")).unwrap(), PlistValue::Boolean(true));
    assert_eq!(parse(&wrap("<false/>")).unwrap(), PlistValue::Boolean(false));
}

#[test]
fn decode_date() {
    let value = parse(&wrap("<date>2016-03-01T12:30:00Z</date>")).unwrap();
    let expected = date::parse_date("2016-03-01T12:30:00Z").unwrap();
    assert_eq!(value, PlistValue::Date(expected));
}

#[test]
fn decode_invalid_date_falls_back_to_epoch() {
    let value = parse(&wrap("<date>not-a-date</date>")).unwrap();
    assert_eq!(value, PlistValue::Date(date::epoch()));
}

#[test]
fn decode_data_keeps_base64_text() {
    let value = parse(&wrap("<data>SGVsbG8=</data>")).unwrap();
    assert_eq!(value, PlistValue::from("SGVsbG8="));
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn decode_firefox_dict() {
    let xml = wrap(
        "<dict>
  <key>name</key><string>Firefox</string>
  <key>version</key><string>45.0</string>
  <key>catalogs</key><array><string>testing</string></array>
  <key>unattended_install</key><true/>
</dict>",
    );
    let value = parse(&xml).unwrap();
    assert_eq!(
        keys(&value),
        vec!["name", "version", "catalogs", "unattended_install"]
    );
    let dict = value.as_dict().unwrap();
    assert_eq!(dict["name"], PlistValue::from("Firefox"));
    assert_eq!(dict["version"], PlistValue::from("45.0"));
    assert_eq!(
        dict["catalogs"],
        PlistValue::Array(vec![PlistValue::from("testing")])
    );
    assert_eq!(dict["unattended_install"], PlistValue::Boolean(true));
}

#[test]
fn decode_integer_array() {
    let value = parse(&wrap(
        "<array><integer>1</integer><integer>2</integer></array>",
    ))
    .unwrap();
    assert_eq!(
        value,
        PlistValue::Array(vec![PlistValue::Integer(1), PlistValue::Integer(2)])
    );
}

#[test]
fn decode_empty_containers() {
    assert_eq!(
        parse(&wrap("<array/>")).unwrap(),
        PlistValue::Array(Vec::new())
    );
    assert_eq!(parse(&wrap("<dict></dict>")).unwrap().as_dict().unwrap().len(), 0);
    assert_eq!(parse(&wrap("<dict/>")).unwrap().as_dict().unwrap().len(), 0);
}

#[test]
fn decode_duplicate_key_overwrites_in_place() {
    let value = parse(&wrap(
        "<dict><key>a</key><integer>1</integer><key>b</key><integer>2</integer><key>a</key><integer>3</integer></dict>",
    ))
    .unwrap();
    assert_eq!(keys(&value), vec!["a", "b"]);
    assert_eq!(value.as_dict().unwrap()["a"], PlistValue::Integer(3));
}

#[test]
fn decode_nested_structures() {
    let value = parse(&wrap(
        "<dict><key>installs</key><array><dict><key>type</key><string>file</string><key>path</key><string>/Applications/Firefox.app</string></dict></array></dict>",
    ))
    .unwrap();
    let installs = value.as_dict().unwrap()["installs"].as_array().unwrap();
    assert_eq!(installs.len(), 1);
    assert_eq!(
        installs[0].as_dict().unwrap()["path"],
        PlistValue::from("/Applications/Firefox.app")
    );
}

#[test]
fn decode_without_plist_wrapper() {
    let value = parse("<array><string>x</string></array>").unwrap();
    assert_eq!(value, PlistValue::Array(vec![PlistValue::from("x")]));
}

#[test]
fn decode_ignores_comments() {
    let value = parse(&wrap(
        "<dict><!-- managed --><key>a</key><!-- value --><true/></dict>",
    ))
    .unwrap();
    assert_eq!(value.as_dict().unwrap()["a"], PlistValue::Boolean(true));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn malformed_xml_is_an_error() {
    let err = parse(&wrap("<dict><key>a</key><string>x</dict>")).unwrap_err();
    assert!(matches!(err, PlistError::Xml { .. }), "got {err:?}");
}

#[test]
fn truncated_document_is_an_error() {
    let err = parse("<plist version=\"1.0\"><dict><key>a</key>").unwrap_err();
    assert!(matches!(err, PlistError::Xml { .. }), "got {err:?}");
}

#[test]
fn unknown_element_is_an_error() {
    let err = parse(&wrap("<dict><key>a</key><uid>1</uid></dict>")).unwrap_err();
    assert!(matches!(err, PlistError::UnknownElement(ref name) if name == "uid"));
}

#[test]
fn value_without_key_is_a_structure_error() {
    let err = parse(&wrap("<dict><string>orphan</string></dict>")).unwrap_err();
    assert!(matches!(err, PlistError::Structure(_)), "got {err:?}");
}

#[test]
fn empty_document_is_a_structure_error() {
    let err = parse("").unwrap_err();
    assert!(matches!(err, PlistError::Structure(_)), "got {err:?}");
}

// ============================================================================
// Malformed numbers
// ============================================================================

#[test]
fn unsigned_64_bit_integer_decodes_as_real() {
    let value = parse(&wrap(
        "<dict><key>name</key><string>Firefox</string>\
         <key>installed_size</key><integer>18446744073709551615</integer></dict>",
    ))
    .unwrap();
    let dict = value.as_dict().unwrap();
    assert_eq!(dict["name"], PlistValue::from("Firefox"));
    assert!(
        matches!(dict["installed_size"], PlistValue::Real(f) if f == u64::MAX as f64),
        "got {:?}",
        dict["installed_size"]
    );
}

#[test]
fn integer_at_i64_bounds_stays_integer() {
    let value = parse(&wrap(
        "<array><integer>9223372036854775807</integer><integer>-9223372036854775808</integer></array>",
    ))
    .unwrap();
    assert!(matches!(
        value.as_array().unwrap().as_slice(),
        [PlistValue::Integer(i64::MAX), PlistValue::Integer(i64::MIN)]
    ));
}

#[test]
fn unparseable_integer_text_decodes_as_zero() {
    let value = parse(&wrap(
        "<dict><key>name</key><string>Firefox</string>\
         <key>a</key><integer>twelve</integer><key>b</key><integer/></dict>",
    ))
    .unwrap();
    let dict = value.as_dict().unwrap();
    assert_eq!(dict["name"], PlistValue::from("Firefox"));
    assert!(matches!(dict["a"], PlistValue::Integer(0)));
    assert!(matches!(dict["b"], PlistValue::Integer(0)));
}

#[test]
fn unparseable_real_text_decodes_as_zero() {
    let value = parse(&wrap("<array><real>1.2.3</real><real></real></array>")).unwrap();
    assert!(matches!(
        value.as_array().unwrap().as_slice(),
        [PlistValue::Real(a), PlistValue::Real(b)] if *a == 0.0 && *b == 0.0
    ));
}
