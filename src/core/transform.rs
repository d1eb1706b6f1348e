use crate::core::{NormalizedRecord, RawRecord};

/// Maps a source user onto the stored shape. `age` is the character count of
/// `username`; absent or non-string fields fall back to empty values.
pub fn transform(raw: &RawRecord) -> NormalizedRecord {
    NormalizedRecord {
        name: raw.str_field("name").unwrap_or_default().to_string(),
        age: raw
            .str_field("username")
            .map(|u| u.chars().count() as i64)
            .unwrap_or(0),
        email: raw.str_field("email").unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transform_user_record() {
        let raw = RawRecord::from(json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {"city": "Gwenborough"}
        }));

        let record = transform(&raw);

        assert_eq!(record.name, "Leanne Graham");
        assert_eq!(record.age, 4);
        assert_eq!(record.email, "Sincere@april.biz");
    }

    #[test]
    fn test_transform_counts_characters_not_bytes() {
        let raw = RawRecord::from(json!({"name": "Zoë", "username": "zoë_ü", "email": "z@x.io"}));
        assert_eq!(transform(&raw).age, 5);
    }

    #[test]
    fn test_transform_missing_and_mistyped_fields() {
        let raw = RawRecord::from(json!({"name": 42, "username": ["Bret"]}));

        let record = transform(&raw);

        assert_eq!(record.name, "");
        assert_eq!(record.age, 0);
        assert_eq!(record.email, "");
    }
}
