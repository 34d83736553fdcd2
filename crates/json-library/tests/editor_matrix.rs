mod common;

use json_library::{
    add_object_to_json, delete_object_from_json, get_value_from_json, update_value_to_json, JsonLibraryError,
};
use serde_json::{json, Value};

use common::example;

fn keys(val: &Value) -> Vec<&str> {
    val.as_object().unwrap().keys().map(String::as_str).collect()
}

#[test]
fn query_matrix() {
    let doc = example();

    assert_eq!(
        get_value_from_json(&doc, "$..number", false).unwrap(),
        vec![json!("0123-4567-8888"), json!("0123-4567-8910"), json!("0123-4567-8999")]
    );
    assert_eq!(get_value_from_json(&doc, "$..occupation", false).unwrap(), vec![Value::Null]);
    assert_eq!(get_value_from_json(&doc, "$..siblings", false).unwrap(), vec![json!([])]);
    assert_eq!(
        get_value_from_json(&doc, "$.bankAccounts[?(@.amount>=100)].bank", false).unwrap(),
        vec![json!("WesternUnion"), json!("HSBC")]
    );
    // Two union branches hitting the same node both report it.
    assert_eq!(
        get_value_from_json(&doc, "$['firstName','firstName']", false).unwrap(),
        vec![json!("John"), json!("John")]
    );
}

#[test]
fn query_default_vs_strict_matrix() {
    let doc = example();
    assert!(get_value_from_json(&doc, "$..notfound", false).unwrap().is_empty());
    match get_value_from_json(&doc, "$..notfound", true).unwrap_err() {
        JsonLibraryError::EmptyResult { path } => assert_eq!(path, "$..notfound"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn malformed_path_matrix() {
    let doc = example();
    for path in ["$.bankAccounts[?(@.amount=>100)].bank", "", "firstName", "$[", "$.a[?(@.b==)]"] {
        match get_value_from_json(&doc, path, false).unwrap_err() {
            JsonLibraryError::PathSyntax { expr, .. } => assert_eq!(expr, path),
            other => panic!("unexpected {other:?} for {path:?}"),
        }
        assert!(matches!(
            delete_object_from_json(&doc, path).unwrap_err(),
            JsonLibraryError::PathSyntax { .. }
        ));
    }
}

#[test]
fn add_merge_vs_append_matrix() {
    let doc = json!({"address": {"city": "X"}});
    let out = add_object_to_json(&doc, "$..address", &json!({"lat": 1})).unwrap();
    assert_eq!(out, json!({"address": {"city": "X", "lat": 1}}));

    let doc = json!({"colors": ["red"]});
    let out = add_object_to_json(&doc, "$..colors", &json!("green")).unwrap();
    assert_eq!(out, json!({"colors": ["red", "green"]}));

    // A container value is appended whole, not spread.
    let out = add_object_to_json(&doc, "$.colors", &json!(["a", "b"])).unwrap();
    assert_eq!(out, json!({"colors": ["red", ["a", "b"]]}));

    // Scalars are left alone.
    let doc = json!({"name": "x", "list": []});
    let out = add_object_to_json(&doc, "$.*", &json!(1)).unwrap();
    assert_eq!(out, json!({"name": "x", "list": [1]}));
}

#[test]
fn add_merge_key_order_matrix() {
    let doc = example();
    let extra = json!({"latitude": "13.1234", "city": "Bangkok", "longitude": "130.1234"});
    let out = add_object_to_json(&doc, "$..address", &extra).unwrap();
    assert_eq!(
        keys(&out["address"]),
        vec!["streetAddress", "city", "postalCode", "latitude", "longitude"]
    );
    assert_eq!(out["address"]["city"], json!("Bangkok"));
}

#[test]
fn add_into_every_match_matrix() {
    let doc = example();
    let out = add_object_to_json(&doc, "$.phoneNumbers[*]", &json!({"verified": true})).unwrap();
    for phone in out["phoneNumbers"].as_array().unwrap() {
        assert_eq!(phone["verified"], json!(true));
    }
}

#[test]
fn add_fallback_matrix() {
    assert_eq!(
        add_object_to_json(&json!({}), "$.country", &json!("Thailand")).unwrap(),
        json!({"country": "Thailand"})
    );

    let doc = example();
    let out = add_object_to_json(&doc, "$.address.country", &json!("Japan")).unwrap();
    assert_eq!(out["address"]["country"], json!("Japan"));
    assert_eq!(keys(&out["address"]).last(), Some(&"country"));

    // The parent may match several objects.
    let out = add_object_to_json(&doc, "$.phoneNumbers[*].ext", &json!(0)).unwrap();
    assert_eq!(get_value_from_json(&out, "$..ext", false).unwrap().len(), 3);

    // Bracket notation takes the same route.
    let out = add_object_to_json(&doc, "$['address']['zone']", &json!(9)).unwrap();
    assert_eq!(out["address"]["zone"], json!(9));

    // Non-object parents are skipped without failing.
    let out = add_object_to_json(&doc, "$.firstName.initial", &json!("J")).unwrap();
    assert_eq!(out, doc);
}

#[test]
fn add_no_match_matrix() {
    let doc = example();
    match add_object_to_json(&doc, "$.nothing.country", &json!(1)).unwrap_err() {
        JsonLibraryError::NoMatch { path } => assert_eq!(path, "$.nothing"),
        other => panic!("unexpected {other:?}"),
    }
    // No single trailing name to create.
    for path in ["$.siblings[0]", "$..missing", "$.phoneNumbers[?(@.type=='fax')]"] {
        assert!(
            matches!(add_object_to_json(&doc, path, &json!(1)).unwrap_err(), JsonLibraryError::NoMatch { .. }),
            "{path}"
        );
    }
}

#[test]
fn add_detached_match_matrix() {
    // The inner match is overwritten by the outer merge before it is visited.
    let cases = [
        (json!({"a": {"a": {}}}), json!({"a": {"z": 1}}), json!({"a": {"a": {"z": 1}}})),
        (json!({"a": {"a": []}}), json!({"a": []}), json!({"a": {"a": []}})),
        (json!({"a": {"a": {"b": 1}}}), json!({"c": 2}), json!({"a": {"a": {"b": 1, "c": 2}, "c": 2}})),
    ];
    for (doc, value, expected) in cases {
        assert_eq!(add_object_to_json(&doc, "$..a", &value).unwrap(), expected, "{doc}");
    }
}

#[test]
fn query_huge_slice_step_matrix() {
    let doc = json!({"a": [1, 2, 3]});
    assert_eq!(
        get_value_from_json(&doc, "$.a[1::9223372036854775807]", false).unwrap(),
        vec![json!(2)]
    );
    assert_eq!(
        get_value_from_json(&doc, "$.a[::-9223372036854775807]", false).unwrap(),
        vec![json!(3)]
    );
    assert_eq!(
        delete_object_from_json(&doc, "$.a[1::9223372036854775807]").unwrap(),
        json!({"a": [1, 3]})
    );
}

#[test]
fn add_invalid_merge_matrix() {
    let doc = example();
    match add_object_to_json(&doc, "$.address", &json!("text")).unwrap_err() {
        JsonLibraryError::InvalidMerge { path } => assert_eq!(path, "$['address']"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn update_matrix() {
    let doc = example();

    let out = update_value_to_json(&doc, "$..address.streetAddress", &json!("Ratchadapisek Road")).unwrap();
    assert_eq!(out["address"]["streetAddress"], json!("Ratchadapisek Road"));

    let out = update_value_to_json(&doc, "$..phoneNumbers[0].type", &json!("mobile")).unwrap();
    assert_eq!(out["phoneNumbers"][0]["type"], json!("mobile"));

    // Every match is written, not just the first.
    let out = update_value_to_json(&doc, "$.phoneNumbers[*].type", &json!("fax")).unwrap();
    assert_eq!(get_value_from_json(&out, "$..type", false).unwrap(), vec![json!("fax"); 3]);

    let out = update_value_to_json(&doc, "$.favoriteColor[-1]", &json!({"hex": "#00f"})).unwrap();
    assert_eq!(out["favoriteColor"], json!(["red", {"hex": "#00f"}]));

    // Weak contract: nothing matched, nothing changed.
    assert_eq!(update_value_to_json(&doc, "$..notfound", &json!(1)).unwrap(), doc);
}

#[test]
fn update_keeps_key_position_matrix() {
    let doc = example();
    let out = update_value_to_json(&doc, "$.isMarried", &json!(true)).unwrap();
    assert_eq!(keys(&out), keys(&doc));
}

#[test]
fn delete_matrix() {
    let doc = example();

    let out = delete_object_from_json(&doc, "$..isMarried").unwrap();
    assert!(out.get("isMarried").is_none());

    let out = delete_object_from_json(&doc, "$..phoneNumbers[0]").unwrap();
    let types = get_value_from_json(&out, "$.phoneNumbers[*].type", false).unwrap();
    assert!(!types.contains(&json!("iPhone")));
    assert_eq!(types.len(), 2);

    let out = delete_object_from_json(&doc, "$..phoneNumbers[*]").unwrap();
    assert_eq!(out["phoneNumbers"], json!([]));

    let out = delete_object_from_json(&doc, "$.bankAccounts[?(@.amount<100)]").unwrap();
    assert_eq!(
        get_value_from_json(&out, "$.bankAccounts[*].bank", false).unwrap(),
        vec![json!("WesternUnion"), json!("HSBC")]
    );

    assert_eq!(delete_object_from_json(&doc, "$..notfound").unwrap(), doc);
}

#[test]
fn delete_ordering_matrix() {
    let doc = json!({"phoneNumbers": ["a", "b", "c"]});
    for path in ["$.phoneNumbers[0,2]", "$.phoneNumbers[2,0]", "$..phoneNumbers[0,2]", "$.phoneNumbers[::2]"] {
        assert_eq!(delete_object_from_json(&doc, path).unwrap(), json!({"phoneNumbers": ["b"]}), "{path}");
    }

    // A match and one of its descendants in one pass.
    let doc = json!({"a": {"b": {"c": 1}}, "keep": 1});
    assert_eq!(delete_object_from_json(&doc, "$..b").unwrap(), json!({"a": {}, "keep": 1}));
    assert_eq!(delete_object_from_json(&doc, "$['a', 'keep']").unwrap(), json!({}));
}

#[test]
fn copy_on_write_matrix() {
    let doc = example();
    let snapshot = doc.clone();
    let value = json!({"latitude": "13.1234"});
    let value_snapshot = value.clone();

    let added = add_object_to_json(&doc, "$..address", &value).unwrap();
    let updated = update_value_to_json(&doc, "$..type", &json!("x")).unwrap();
    let deleted = delete_object_from_json(&doc, "$..phoneNumbers").unwrap();

    assert_eq!(doc, snapshot);
    assert_eq!(value, value_snapshot);
    assert_ne!(added, snapshot);
    assert_ne!(updated, snapshot);
    assert_ne!(deleted, snapshot);
}
