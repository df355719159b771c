use serde::{Deserialize, Deserializer};

/// One field of a partial update.
///
/// Use with `#[serde(default)]` on the containing struct: a key missing from
/// the request body stays `Missing`, `"key": null` becomes `Null` (clear the
/// column) and anything else becomes `Value`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Missing => Patch::Missing,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(default)]
    struct Form {
        name: Patch<String>,
        tags: Patch<Vec<String>>,
    }

    impl Default for Form {
        fn default() -> Self {
            Self {
                name: Patch::Missing,
                tags: Patch::Missing,
            }
        }
    }

    #[test]
    fn distinguishes_missing_null_and_value() {
        let form: Form = serde_json::from_value(json!({ "name": null })).unwrap();
        assert_eq!(form.name, Patch::Null);
        assert!(form.tags.is_missing());

        let form: Form = serde_json::from_value(json!({ "tags": ["a"] })).unwrap();
        assert!(form.name.is_missing());
        assert_eq!(form.tags, Patch::Value(vec!["a".to_string()]));
    }

    #[test]
    fn map_preserves_state() {
        assert_eq!(Patch::Value(2).map(|v| v * 2), Patch::Value(4));
        assert_eq!(Patch::<i32>::Null.map(|v| v * 2), Patch::Null);
    }
}
