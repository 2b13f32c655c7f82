//! Tests for the serialization pipeline

use super::built_in;
use super::*;
use crate::error::{Error, SerializerError};
use crate::record::Record;
use crate::schema::{ElementType, FieldBuilder, RecordSchema, ValueType};
use serde_json::{json, Value};
use std::sync::Arc;

fn user_schema() -> Arc<RecordSchema> {
    RecordSchema::builder("User")
        .field(FieldBuilder::scalar("id", ValueType::Integer))
        .field(FieldBuilder::scalar("name", ValueType::String).serializer(built_in::uppercase()))
        .field(FieldBuilder::scalar("age", ValueType::Integer))
        .build()
        .unwrap()
}

fn user(schema: &Arc<RecordSchema>, id: i64, name: &str, age: i64) -> Record {
    Record::builder(schema)
        .set("id", id)
        .set("name", name)
        .set("age", age)
        .build()
        .unwrap()
}

#[test]
fn test_excluded_field_hidden_everywhere() {
    let schema = RecordSchema::builder("User")
        .field(FieldBuilder::scalar("id", ValueType::Integer))
        .field(FieldBuilder::scalar("name", ValueType::String))
        .field(FieldBuilder::scalar("age", ValueType::Integer).exclude())
        .build()
        .unwrap();
    let record = Record::bind(&schema, &json!({"id": 1, "name": "test", "age": 18})).unwrap();

    assert_eq!(record.value("age"), Some(&json!(18)));
    assert_eq!(Value::Object(dump(&record).unwrap()), json!({"id": 1, "name": "test"}));
    assert_eq!(dump_json(&record).unwrap(), r#"{"id":1,"name":"test"}"#);
    assert_eq!(dump_display(&record).unwrap(), "id=1 name='test'");
}

#[test]
fn test_serializer_applies_to_every_form() {
    let schema = RecordSchema::builder("User")
        .field(FieldBuilder::scalar("id", ValueType::Integer))
        .field(FieldBuilder::scalar("name", ValueType::String))
        .field(FieldBuilder::scalar("age", ValueType::Integer).serializer(built_in::increment(1)))
        .build()
        .unwrap();
    let record = Record::bind(&schema, &json!({"id": 1, "name": "test", "age": 18})).unwrap();

    assert_eq!(record.value("age"), Some(&json!(18)));
    assert_eq!(
        Value::Object(dump(&record).unwrap()),
        json!({"id": 1, "name": "test", "age": 19})
    );
    assert_eq!(dump_json(&record).unwrap(), r#"{"id":1,"name":"test","age":19}"#);
    assert_eq!(dump_display(&record).unwrap(), "id=1 name='test' age=19");
}

#[test]
fn test_nested_records_and_lists_use_their_own_serializers() {
    let users = user_schema();
    let outer = RecordSchema::builder("A")
        .field(FieldBuilder::record("u", &users))
        .field(FieldBuilder::records("ul", &users))
        .build()
        .unwrap();

    let record = Record::builder(&outer)
        .set("u", user(&users, 1, "test", 18))
        .set("ul", vec![user(&users, 2, "test2", 28), user(&users, 3, "test3", 38)])
        .build()
        .unwrap();

    assert_eq!(
        Value::Object(dump(&record).unwrap()),
        json!({
            "u": {"id": 1, "name": "TEST", "age": 18},
            "ul": [
                {"id": 2, "name": "TEST2", "age": 28},
                {"id": 3, "name": "TEST3", "age": 38}
            ]
        })
    );
    assert_eq!(
        dump_json(&record).unwrap(),
        r#"{"u":{"id":1,"name":"TEST","age":18},"ul":[{"id":2,"name":"TEST2","age":28},{"id":3,"name":"TEST3","age":38}]}"#
    );
    assert_eq!(
        dump_display(&record).unwrap(),
        "u={'id':1,'name':'TEST','age':18} ul=[{'id':2,'name':'TEST2','age':28},{'id':3,'name':'TEST3','age':38}]"
    );
}

#[test]
fn test_serializer_skips_null() {
    let schema = RecordSchema::builder("User")
        .field(FieldBuilder::scalar("name", ValueType::String).serializer(built_in::uppercase()))
        .build()
        .unwrap();
    let record = Record::bind(&schema, &json!({})).unwrap();

    assert_eq!(Value::Object(dump(&record).unwrap()), json!({"name": null}));
    assert_eq!(dump_display(&record).unwrap(), "name=null");
}

#[test]
fn test_serializer_failure_aborts_dump() {
    let schema = RecordSchema::builder("User")
        .field(FieldBuilder::scalar("id", ValueType::Integer))
        .field(FieldBuilder::scalar("name", ValueType::Any).serializer(built_in::uppercase()))
        .build()
        .unwrap();
    let record = Record::bind(&schema, &json!({"id": 1, "name": 5})).unwrap();

    for result in [dump(&record).map(|_| ()), dump_json(&record).map(|_| ())] {
        match result.unwrap_err() {
            Error::Serialization { field, source } => {
                assert_eq!(field, "name");
                assert!(matches!(source, SerializerError::TypeMismatch { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
    assert!(dump_display(&record).is_err());
}

#[test]
fn test_closure_serializer_with_anyhow() {
    let schema = RecordSchema::builder("Probe")
        .field(FieldBuilder::scalar("v", ValueType::Any).serialize_with("reject", |_| {
            Err(anyhow::anyhow!("not allowed").into())
        }))
        .build()
        .unwrap();
    let record = Record::bind(&schema, &json!({"v": 1})).unwrap();

    let err = dump(&record).unwrap_err();
    assert!(err.to_string().contains("not allowed"));
}

#[test]
fn test_computed_fields_appended_after_regular_fields() {
    let schema = RecordSchema::builder("Cart")
        .computed("total", |r| {
            let prices = r.value("prices").and_then(Value::as_array).cloned().unwrap_or_default();
            json!(prices.iter().filter_map(Value::as_f64).sum::<f64>())
        })
        .field(FieldBuilder::sequence("prices", ValueType::Float))
        .field(FieldBuilder::scalar("owner", ValueType::String))
        .computed_hidden("secret", |_| json!("hidden"))
        .build()
        .unwrap();
    let record = Record::bind(&schema, &json!({"prices": [1.5, 2.5], "owner": "ada"})).unwrap();

    let keys: Vec<String> = dump(&record).unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["prices", "owner", "total"]);
    assert_eq!(
        dump_json(&record).unwrap(),
        r#"{"prices":[1.5,2.5],"owner":"ada","total":4.0}"#
    );
    assert_eq!(record.computed("secret"), Some(json!("hidden")));
}

#[test]
fn test_built_in_derivations() {
    let schema = RecordSchema::builder("Person")
        .field(FieldBuilder::scalar("first", ValueType::String))
        .field(FieldBuilder::scalar("last", ValueType::String))
        .field(FieldBuilder::sequence("scores", ValueType::Integer))
        .derived("full", built_in::concat(vec!["first".into(), "last".into()], " "))
        .derived("n", built_in::count("scores"))
        .derived("total", built_in::sum("scores"))
        .build()
        .unwrap();

    let record = Record::bind(
        &schema,
        &json!({"first": "Ada", "last": "Lovelace", "scores": [1, 2, 3]}),
    )
    .unwrap();
    let output = Value::Object(dump(&record).unwrap());
    assert_eq!(output["full"], json!("Ada Lovelace"));
    assert_eq!(output["n"], json!(3));
    assert_eq!(output["total"], json!(6));

    let sparse = Record::bind(&schema, &json!({"first": "Ada"})).unwrap();
    let output = Value::Object(dump(&sparse).unwrap());
    assert_eq!(output["full"], json!("Ada"));
    assert_eq!(output["n"], json!(0));
    assert_eq!(output["total"], json!(0));
}

#[test]
fn test_dump_with_options() {
    let users = user_schema();
    let outer = RecordSchema::builder("Team")
        .field(FieldBuilder::scalar("title", ValueType::String))
        .field(FieldBuilder::scalar("motto", ValueType::String))
        .field(FieldBuilder::record("lead", &users))
        .build()
        .unwrap();
    let record = Record::bind(
        &outer,
        &json!({"title": "core", "lead": {"id": 1, "name": "ada"}}),
    )
    .unwrap();

    let options = DumpOptions::new().exclude_none(true).exclude("title");
    assert_eq!(
        Value::Object(dump_with(&record, &options).unwrap()),
        json!({"lead": {"id": 1, "name": "ADA"}})
    );

    let plain = Value::Object(dump(&record).unwrap());
    assert_eq!(plain["motto"], Value::Null);
    assert_eq!(plain["lead"]["age"], Value::Null);
}

#[test]
fn test_mapping_of_records_dumps_in_document_order() {
    let users = user_schema();
    let schema = RecordSchema::builder("Directory")
        .field(FieldBuilder::mapping("people", ElementType::Record(Arc::clone(&users))))
        .build()
        .unwrap();
    let record = Record::bind(
        &schema,
        &json!({"people": {"zed": {"id": 2, "name": "z"}, "amy": {"id": 1, "name": "a"}}}),
    )
    .unwrap();

    assert_eq!(
        dump_json(&record).unwrap(),
        r#"{"people":{"zed":{"id":2,"name":"Z","age":null},"amy":{"id":1,"name":"A","age":null}}}"#
    );
}

#[test]
fn test_pretty_json_and_display_values() {
    let schema = user_schema();
    let record = user(&schema, 1, "x", 2);

    let pretty = dump_json_pretty(&record).unwrap();
    assert!(pretty.contains("\n  \"id\": 1"));
    let reparsed: Value = serde_json::from_str(&pretty).unwrap();
    assert_eq!(reparsed, Value::Object(dump(&record).unwrap()));

    assert_eq!(display_value(&json!("a b")), "'a b'");
    assert_eq!(display_value(&json!(true)), "true");
    assert_eq!(display_value(&json!(null)), "null");
    assert_eq!(display_value(&json!([1, "x"])), "[1,'x']");
    assert_eq!(display_value(&json!({"k": ["v", null]})), "{'k':['v',null]}");
}

#[test]
fn test_display_escapes_quotes() {
    let schema = RecordSchema::builder("Tagged")
        .field(FieldBuilder::scalar("a", ValueType::String))
        .field(FieldBuilder::sequence("tags", ValueType::String))
        .build()
        .unwrap();
    let record = Record::bind(&schema, &json!({"a": "x' b='y", "tags": ["p", "it's"]})).unwrap();

    assert_eq!(
        dump_display(&record).unwrap(),
        r"a='x\' b=\'y' tags=['p','it\'s']"
    );
    assert_eq!(display_value(&json!(r"back\slash")), r"'back\\slash'");
}

#[test]
fn test_display_mapping_honors_dump_options() {
    let schema = user_schema();
    let record = Record::bind(&schema, &json!({"id": 3, "name": null, "age": 9})).unwrap();

    let options = DumpOptions::new().exclude_none(true).exclude("age");
    let mapping = dump_with(&record, &options).unwrap();
    assert_eq!(display_mapping(&mapping), "id=3");
    assert_eq!(display_mapping(&dump(&record).unwrap()), dump_display(&record).unwrap());
}

#[test]
fn test_empty_record() {
    let schema = RecordSchema::builder("Empty").build().unwrap();
    let record = Record::bind(&schema, &json!({"x": 1})).unwrap();

    assert!(dump(&record).unwrap().is_empty());
    assert_eq!(dump_json(&record).unwrap(), "{}");
    assert_eq!(dump_display(&record).unwrap(), "");
}
