//! Animal schema validation tests

use animal_registry::validation::animal::{
    AnimalValidationError, REQUIRED_FIELDS, parse_animal, validate_animal,
};
use serde_json::{Value, json};

fn fox() -> Value {
    json!({
        "name": "Fox",
        "sciName": "Vulpes vulpes",
        "description": ["a", "b"],
        "images": ["img1"],
        "events": [{"name": "Sighting", "date": "05/01/2023", "url": "http://x"}]
    })
}

fn message(candidate: &Value) -> String {
    validate_animal(candidate).unwrap_err().to_string()
}

mod required_field_tests {
    use super::*;

    #[test]
    fn test_each_missing_field_named() {
        for field in REQUIRED_FIELDS {
            let mut candidate = fox();
            candidate.as_object_mut().unwrap().remove(field);
            assert_eq!(message(&candidate), format!("invalid {}: must exist", field));
        }
    }

    #[test]
    fn test_earliest_missing_field_wins() {
        let mut candidate = fox();
        let object = candidate.as_object_mut().unwrap();
        object.remove("images");
        object.remove("sciName");
        object.remove("events");
        assert_eq!(message(&candidate), "invalid sciName: must exist");

        assert_eq!(message(&json!({})), "invalid name: must exist");
    }

    #[test]
    fn test_presence_checked_before_content() {
        // An invalid name does not mask a missing later field.
        let candidate = json!({"name": "", "sciName": "x", "description": [], "images": []});
        assert_eq!(message(&candidate), "invalid events: must exist");
    }
}

mod field_rule_tests {
    use super::*;

    #[test]
    fn test_blank_names() {
        for bad in [json!(""), json!("   "), json!(42), json!(null), json!(["Fox"])] {
            let mut candidate = fox();
            candidate["name"] = bad.clone();
            assert_eq!(
                message(&candidate),
                "invalid name: must have a length of at least 1"
            );

            let mut candidate = fox();
            candidate["sciName"] = bad;
            assert_eq!(
                message(&candidate),
                "invalid sciName: must have a length of at least 1"
            );
        }
    }

    #[test]
    fn test_description_length() {
        for short in [json!([]), json!(["only"]), json!("not an array")] {
            let mut candidate = fox();
            candidate["description"] = short;
            assert_eq!(
                message(&candidate),
                "invalid description: must contain at least 2 items"
            );
        }

        for long_enough in [json!(["a", "b"]), json!(["", "", ""])] {
            let mut candidate = fox();
            candidate["description"] = long_enough;
            assert!(validate_animal(&candidate).is_ok());
        }
    }

    #[test]
    fn test_images_and_events_non_empty() {
        let mut candidate = fox();
        candidate["images"] = json!([]);
        assert_eq!(message(&candidate), "invalid images: must not be empty");

        let mut candidate = fox();
        candidate["events"] = json!({"name": "Sighting"});
        assert_eq!(message(&candidate), "invalid events: must not be empty");
    }

    #[test]
    fn test_rule_order() {
        // Both description and images are invalid; description is checked first.
        let mut candidate = fox();
        candidate["description"] = json!(["a"]);
        candidate["images"] = json!([]);
        assert_eq!(
            validate_animal(&candidate).unwrap_err(),
            AnimalValidationError::DescriptionTooShort
        );
    }
}

mod event_tests {
    use super::*;

    fn with_event(event: Value) -> Value {
        let mut candidate = fox();
        candidate["events"] = json!([event]);
        candidate
    }

    #[test]
    fn test_event_name() {
        for event in [
            json!({"date": "05/01/2023", "url": "http://x"}),
            json!({"name": " ", "date": "05/01/2023", "url": "http://x"}),
            json!("Sighting"),
        ] {
            assert_eq!(
                message(&with_event(event)),
                "invalid event: must contain a name"
            );
        }
    }

    #[test]
    fn test_event_dates() {
        let date_message = "invalid event: must contain a date in the format mm/dd/yyyy";
        for bad in ["13/01/2020", "2020-01-05", "5/1/2020", ""] {
            let event = json!({"name": "Sighting", "date": bad, "url": "http://x"});
            assert_eq!(message(&with_event(event)), date_message, "date {bad}");
        }

        let missing = json!({"name": "Sighting", "url": "http://x"});
        assert_eq!(message(&with_event(missing)), date_message);

        // Day range only, not calendar-aware.
        for good in ["02/29/2020", "04/31/2020", "02/30/2024"] {
            let event = json!({"name": "Sighting", "date": good, "url": "http://x"});
            assert!(validate_animal(&with_event(event)).is_ok(), "date {good}");
        }
    }

    #[test]
    fn test_event_url() {
        let event = json!({"name": "Sighting", "date": "05/01/2023", "url": ""});
        assert_eq!(
            message(&with_event(event)),
            "invalid event: must contain a url"
        );
    }

    #[test]
    fn test_first_invalid_event_reported() {
        let mut candidate = fox();
        candidate["events"] = json!([
            {"name": "Sighting", "date": "05/01/2023", "url": "http://x"},
            {"name": "Birth", "date": "05/01/2023"},
            {"date": "05/01/2023", "url": "http://z"}
        ]);
        let err = validate_animal(&candidate).unwrap_err();
        assert_eq!(err, AnimalValidationError::EventUrl { index: 1 });
        assert_eq!(err.to_string(), "invalid event: must contain a url");
    }
}

mod parse_tests {
    use super::*;

    #[test]
    fn test_parse_keeps_values() {
        let parsed = parse_animal(&fox()).unwrap();
        assert_eq!(parsed.sci_name, "Vulpes vulpes");
        assert_eq!(parsed.description, vec!["a", "b"]);
        assert_eq!(parsed.images, vec!["img1"]);
        assert_eq!(parsed.events[0].date, "05/01/2023");
        assert_eq!(parsed.events[0].url, "http://x");
    }

    #[test]
    fn test_validation_is_deterministic() {
        let mut candidate = fox();
        candidate["events"][0]["date"] = json!("00/00/0000");
        let first = validate_animal(&candidate);
        for _ in 0..5 {
            assert_eq!(validate_animal(&candidate), first);
        }
    }
}
