//! Property tests for parameter and network checks.

use heron_core::{codes, NetworkPolicy, ParamKind, ParameterSpec};
use heron_pipeline::network::allowed;
use heron_pipeline::validation::{check_value, validate_parameters};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

proptest! {
    #[test]
    fn string_length_bound_is_exact(s in "\\PC{0,12}", max in 1usize..10) {
        let spec = ParameterSpec::new("bio", ParamKind::String).max_length(max);
        let fits = s.chars().count() <= max;
        prop_assert_eq!(check_value(&spec, &json!(s)), fits);
    }

    #[test]
    fn unbounded_strings_always_pass(s in "\\PC{0,64}") {
        let spec = ParameterSpec::new("bio", ParamKind::String);
        prop_assert!(check_value(&spec, &json!(s)));
    }

    #[test]
    fn numbers_never_satisfy_string_kinds(n in any::<i64>()) {
        let spec = ParameterSpec::new("name", ParamKind::String);
        prop_assert!(!check_value(&spec, &json!(n)));

        let spec = ParameterSpec::new("age", ParamKind::Number);
        prop_assert!(check_value(&spec, &json!(n)));
        prop_assert!(!check_value(&spec, &json!(n.to_string())));
    }

    #[test]
    fn enum_accepts_only_listed_options(choice in "[a-z]{1,6}") {
        let spec = ParameterSpec::new("color", ParamKind::Enum).options(["red", "blue"]);
        let listed = choice == "red" || choice == "blue";
        prop_assert_eq!(check_value(&spec, &json!(choice)), listed);
    }

    #[test]
    fn every_absent_parameter_is_reported(count in 1usize..8) {
        let specs: Vec<_> = (0..count)
            .map(|i| ParameterSpec::new(format!("p{i}"), ParamKind::Number))
            .collect();

        let outcome = validate_parameters(&specs, &HashMap::new(), Some(&Map::new()))
            .expect_err("empty body must fail");
        prop_assert_eq!(outcome.code.as_str(), codes::INVALID_PARAMETERS);
        prop_assert_eq!(outcome.data["missing"].as_array().map(Vec::len), Some(count));
        prop_assert_eq!(outcome.data["invalid"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn valid_body_is_returned_unchanged(age in any::<u32>(), bio in "[a-z]{0,5}") {
        let specs = [
            ParameterSpec::new("age", ParamKind::Number).required(),
            ParameterSpec::new("bio", ParamKind::String).max_length(5),
        ];
        let mut body = Map::new();
        body.insert("age".to_string(), json!(age));
        body.insert("bio".to_string(), json!(bio));

        let accepted = validate_parameters(&specs, &HashMap::new(), Some(&body)).unwrap();
        prop_assert_eq!(Value::Object(accepted), Value::Object(body));
    }

    #[test]
    fn exceptions_invert_the_default(b in any::<u8>(), c in any::<u8>(), d in any::<u8>()) {
        let inside = format!("10.{b}.{c}.{d}");
        let outside = format!("11.{b}.{c}.{d}");

        let deny = NetworkPolicy::deny_all().except("10.0.0.0/8");
        prop_assert!(allowed(&inside, &deny));
        prop_assert!(!allowed(&outside, &deny));

        let allow = NetworkPolicy::allow_all().except("10.0.0.0/8");
        prop_assert!(!allowed(&inside, &allow));
        prop_assert!(allowed(&outside, &allow));
    }

    #[test]
    fn mapped_addresses_match_v4_ranges(b in any::<u8>(), c in any::<u8>()) {
        let policy = NetworkPolicy::deny_all().except("192.168.0.0/16");
        let mapped = format!("::ffff:192.168.{b}.{c}");
        prop_assert!(allowed(&mapped, &policy));
    }
}
