use item_lists::ingestion::json::records_from_json_str;
use item_lists::processing::{
    aggregate, limit, remove_duplicates, sort, split_out, AggregateOptions, CompareFields,
    FieldToAggregate, IncludeFields, LimitOptions, RemoveDuplicatesOptions, SortField, SortOptions,
    SplitOutOptions,
};
use item_lists::types::{record, Record};
use item_lists::{ErrorKind, ItemListError};
use serde_json::json;

fn items(input: &str) -> Vec<Record> {
    records_from_json_str(input).unwrap()
}

#[test]
fn split_out_with_all_other_fields() {
    let out = split_out(
        &items(r#"[{"a": [1, 2], "b": "x"}]"#),
        &SplitOutOptions::new("a").include(IncludeFields::AllOtherFields),
    )
    .unwrap();
    assert_eq!(out, items(r#"[{"a": 1, "b": "x"}, {"a": 2, "b": "x"}]"#));
}

#[test]
fn split_out_on_non_array_names_the_field() {
    let err = split_out(&items(r#"[{"a": 5}]"#), &SplitOutOptions::new("a")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert!(err.to_string().contains("'a'"));
}

#[test]
fn split_out_on_missing_field_fails() {
    let err = split_out(&items(r#"[{"b": [1]}]"#), &SplitOutOptions::new("a")).unwrap_err();
    assert!(matches!(err, ItemListError::FieldNotFound { ref field, item_index: 0, hint: None } if field == "a"));
}

#[test]
fn aggregate_skips_absent_fields() {
    let out = aggregate(
        &items(r#"[{"a": 1}, {"a": 2}, {}]"#),
        &AggregateOptions::new(vec![FieldToAggregate::renamed("a", "vals")]),
    )
    .unwrap();
    assert_eq!(out, record(json!({"vals": [1, 2]})).unwrap());
}

#[test]
fn aggregate_requires_fields() {
    let err = aggregate(&items(r#"[{"a": 1}]"#), &AggregateOptions::new(vec![])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn dedupe_all_fields_keeps_order() {
    let out = remove_duplicates(
        &items(r#"[{"a": 1, "b": 1}, {"a": 1, "b": 1}, {"a": 2, "b": 2}]"#),
        &RemoveDuplicatesOptions::default(),
    )
    .unwrap();
    assert_eq!(out, items(r#"[{"a": 1, "b": 1}, {"a": 2, "b": 2}]"#));
}

#[test]
fn dedupe_on_absent_key_fails() {
    let err = remove_duplicates(
        &items(r#"[{"a": 1}, {"b": 1}]"#),
        &RemoveDuplicatesOptions::new(CompareFields::SelectedFields(vec!["a".into()])),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn dedupe_collapses_long_runs_of_equal_items() {
    let input = items(
        r#"[{"k": "x", "i": 0}, {"k": "y", "i": 1}, {"k": "x", "i": 2}, {"k": "x", "i": 3},
            {"k": "y", "i": 4}, {"k": "z", "i": 5}, {"k": "x", "i": 6}]"#,
    );
    let out = remove_duplicates(
        &input,
        &RemoveDuplicatesOptions::new(CompareFields::AllFieldsExcept(vec!["i".into()])),
    )
    .unwrap();
    let kept: Vec<i64> = out.iter().filter_map(|r| r["i"].as_i64()).collect();
    assert_eq!(kept, vec![0, 1, 5]);
}

#[test]
fn sort_ascending_and_descending() {
    let input = items(r#"[{"n": 3}, {"n": 1}, {"n": 2}]"#);
    let up = sort(&input, &SortOptions::simple(vec![SortField::ascending("n")])).unwrap();
    assert_eq!(up, items(r#"[{"n": 1}, {"n": 2}, {"n": 3}]"#));
    let down = sort(&input, &SortOptions::simple(vec![SortField::descending("n")])).unwrap();
    assert_eq!(down, items(r#"[{"n": 3}, {"n": 2}, {"n": 1}]"#));
}

#[test]
fn sort_requires_fields() {
    let err = sort(&items(r#"[{"n": 1}]"#), &SortOptions::simple(vec![])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn sort_strings_by_code_units() {
    let input = items(r#"[{"s": "b"}, {"s": "B"}, {"s": "a"}, {"s": "é"}]"#);
    let out = sort(&input, &SortOptions::simple(vec![SortField::ascending("s")])).unwrap();
    let order: Vec<&str> = out.iter().filter_map(|r| r["s"].as_str()).collect();
    assert_eq!(order, vec!["B", "a", "b", "é"]);
}

#[test]
fn sort_with_code_on_nested_fields() {
    let input = items(r#"[{"u": {"age": 40}}, {"u": {"age": 20}}, {"u": {"age": 30}}]"#);
    let out = sort(
        &input,
        &SortOptions::code(
            "if a.u.age == b.u.age { return 0; }\nreturn if a.u.age > b.u.age { -1 } else { 1 };",
        ),
    )
    .unwrap();
    let ages: Vec<i64> = out.iter().filter_map(|r| r["u"]["age"].as_i64()).collect();
    assert_eq!(ages, vec![40, 30, 20]);
}

#[test]
fn limit_slices() {
    let input = items(r#"[{"i": 0}, {"i": 1}, {"i": 2}, {"i": 3}, {"i": 4}]"#);
    assert_eq!(
        limit(&input, &LimitOptions::first(2)).unwrap(),
        items(r#"[{"i": 0}, {"i": 1}]"#)
    );
    assert_eq!(
        limit(&input, &LimitOptions::last(2)).unwrap(),
        items(r#"[{"i": 3}, {"i": 4}]"#)
    );
    let err = limit(&input, &LimitOptions::first(6)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn inputs_are_left_untouched() {
    let input = items(r#"[{"a": [2, 1], "b": {"c": 1}}, {"a": [3], "b": {"c": 1}}]"#);
    let snapshot = input.clone();

    split_out(&input, &SplitOutOptions::new("a").include(IncludeFields::AllOtherFields)).unwrap();
    aggregate(&input, &AggregateOptions::new(vec![FieldToAggregate::new("b.c")])).unwrap();
    remove_duplicates(&input, &RemoveDuplicatesOptions::default()).unwrap();
    sort(&input, &SortOptions::code("a.b.c = 99; b.x = 1; return 0;")).unwrap();
    limit(&input, &LimitOptions::last(1)).unwrap();

    assert_eq!(input, snapshot);
}
