//! Property-based tests for the configuration pipeline.

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde_yaml::{Mapping, Value};

use super::Config;
use crate::document::{render, ValueSource};
use crate::schema::{CompositeDecl, Describe, FieldDecl, Schema, TypeDecl};
use crate::validate::ErrorKind;

struct Transport;

impl Schema for Transport {
    fn declare() -> CompositeDecl {
        CompositeDecl::new("Transport")
            .doc("How to reach the server.")
            .field(FieldDecl::new::<String>("host").doc("Host name.").default("localhost"))
            .field(FieldDecl::new::<i64>("port").default(993))
            .field(FieldDecl::new::<bool>("use_ssl").default(true))
    }
}

impl Describe for Transport {
    fn describe() -> TypeDecl {
        TypeDecl::composite::<Self>()
    }
}

struct Settings;

impl Schema for Settings {
    fn declare() -> CompositeDecl {
        CompositeDecl::new("Settings")
            .doc("Settings used by property tests.")
            .field(FieldDecl::new::<Transport>("transport"))
            .field(FieldDecl::new::<Transport>("backup"))
            .field(FieldDecl::new::<Option<String>>("label"))
            .field(FieldDecl::new::<BTreeMap<String, i64>>("limits"))
    }
}

const TRANSPORT_FIELDS: [&str; 3] = ["host", "port", "use_ssl"];

// Strategy for generating valid transport sections
fn transport_strategy() -> impl Strategy<Value = Value> {
    ("[a-z][a-z0-9.-]{0,15}", any::<i64>(), any::<bool>()).prop_map(|(host, port, ssl)| {
        let mut map = Mapping::new();
        map.insert("host".into(), host.into());
        map.insert("port".into(), port.into());
        map.insert("use_ssl".into(), ssl.into());
        Value::Mapping(map)
    })
}

// Strategy for generating valid documents
fn settings_strategy() -> impl Strategy<Value = Value> {
    (
        transport_strategy(),
        transport_strategy(),
        prop::option::of("[ -~]{0,20}"),
        prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..5),
    )
        .prop_map(|(transport, backup, label, limits)| {
            let mut map = Mapping::new();
            map.insert("transport".into(), transport);
            map.insert("backup".into(), backup);
            map.insert("label".into(), label.map_or(Value::Null, Value::from));
            map.insert(
                "limits".into(),
                Value::Mapping(
                    limits
                        .into_iter()
                        .map(|(k, v)| (Value::from(k), Value::from(v)))
                        .collect(),
                ),
            );
            Value::Mapping(map)
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        .. ProptestConfig::default()
    })]

    // Every missing field and every unknown key is reported
    #[test]
    fn validation_reports_every_problem(
        missing in prop::sample::subsequence(TRANSPORT_FIELDS.to_vec(), 0..=3),
        unknown in prop::collection::btree_set("x_[a-z]{1,6}", 0..4)
    ) {
        let mut transport = Mapping::new();
        for field in TRANSPORT_FIELDS {
            if !missing.contains(&field) {
                let value = match field {
                    "host" => Value::from("h"),
                    "port" => Value::from(1),
                    _ => Value::from(false),
                };
                transport.insert(field.into(), value);
            }
        }
        for key in &unknown {
            transport.insert(key.as_str().into(), Value::from(1));
        }
        let mut root = Mapping::new();
        root.insert("transport".into(), Value::Mapping(transport.clone()));
        root.insert("backup".into(), Value::Mapping(transport));
        root.insert("limits".into(), Value::Mapping(Mapping::new()));

        let config = Config::<Settings>::new().unwrap();
        match config.validate(&Value::Mapping(root)) {
            Ok(()) => prop_assert!(missing.is_empty() && unknown.is_empty()),
            Err(err) => {
                let report = err.report().unwrap();
                prop_assert_eq!(report.count(ErrorKind::MissingRequired), missing.len() * 2);
                prop_assert_eq!(report.count(ErrorKind::UnexpectedField), unknown.len() * 2);
            }
        }
    }

    // A partial update changes only the keys it names
    #[test]
    fn partial_update_isolation(
        data in settings_strategy(),
        host in "[a-z]{1,10}"
    ) {
        let mut config = Config::<Settings>::from_data(data.clone()).unwrap();
        let mut transport = Mapping::new();
        transport.insert("host".into(), Value::from(host.as_str()));
        let mut partial = Mapping::new();
        partial.insert("transport".into(), Value::Mapping(transport));
        let partial = Value::Mapping(partial);
        config.update(&partial).unwrap();

        let after = config.to_data();
        prop_assert_eq!(after.get("backup"), data.get("backup"));
        prop_assert_eq!(after.get("limits"), data.get("limits"));
        prop_assert_eq!(after.get("label"), data.get("label"));
        prop_assert_eq!(&after["transport"]["port"], &data["transport"]["port"]);
        prop_assert_eq!(&after["transport"]["host"], &Value::from(host));
    }

    // Rendered documents parse back to the same data and render identically
    #[test]
    fn render_round_trip(data in settings_strategy()) {
        let config = Config::<Settings>::from_data(data.clone()).unwrap();
        let text = config.to_yaml().unwrap();
        let parsed: Value = serde_yaml::from_str(&text).unwrap();
        prop_assert_eq!(&parsed, &data);

        let again = render(config.schema().descriptor(), ValueSource::Data(&parsed)).unwrap();
        prop_assert_eq!(again, text);
    }
}
