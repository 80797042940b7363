use data_layer_dot_path::{expand, get};
use proptest::prelude::*;
use serde_json::{json, Value};

proptest! {
    #[test]
    fn expand_then_get_round_trips(
        segments in prop::collection::vec("[a-z][a-z0-9_]{0,7}", 1..6),
        value in any::<i64>(),
    ) {
        let key = segments.join(".");
        let branch = expand(&key, json!(value));
        prop_assert_eq!(get(&branch, &key), Some(&json!(value)));
    }

    #[test]
    fn expand_nests_one_level_per_segment(
        segments in prop::collection::vec("[a-z]{1,8}", 1..6),
    ) {
        let key = segments.join(".");
        let branch = expand(&key, json!(true));

        let mut current = Value::Object(branch);
        for segment in &segments {
            let map = current.as_object().expect("intermediate node must be an object");
            prop_assert_eq!(map.len(), 1);
            current = map.get(segment.as_str()).expect("segment must be present").clone();
        }
        prop_assert_eq!(current, json!(true));
    }

    #[test]
    fn get_never_resolves_prefix_with_foreign_head(
        segments in prop::collection::vec("[a-z]{1,8}", 1..4),
        value in any::<u32>(),
    ) {
        let key = segments.join(".");
        let branch = expand(&key, json!(value));
        prop_assert_eq!(get(&branch, "zzzzzzzzz"), None);
    }
}
