#[cfg(test)]
pub mod test {
    use indexmap::IndexMap;
    use serde::{Deserialize, Serialize};

    /// Build an environment/property map from literal pairs.
    pub fn vars(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct TestConfig {
        /// The application host.
        pub host: String,

        /// The port number.
        pub port: u16,

        /// Enable debug mode.
        pub debug: bool,

        /// Sampling ratio.
        pub ratio: f64,

        /// Free-form labels.
        pub tags: Vec<String>,

        /// Listen ports.
        pub ports: Vec<i64>,

        /// Database settings.
        pub database: TestDbConfig,

        /// Renamed on the wire, like CLI-friendly kebab-case keys.
        #[serde(rename = "max-retries")]
        pub max_retries: u32,

        /// Never serialized, so never addressable.
        #[serde(skip)]
        pub session_token: String,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct TestDbConfig {
        /// Connection string URL.
        pub url: Option<String>,

        /// Connection pool size.
        pub pool_size: usize,
    }

    /// The seed most tests bind: one of each scalar kind, two containers, a
    /// nested object, a renamed member, and a skipped member.
    pub fn seed() -> TestConfig {
        TestConfig {
            host: "localhost".to_string(),
            port: 8080,
            debug: false,
            ratio: 0.5,
            tags: vec!["alpha".to_string(), "beta".to_string()],
            ports: vec![1, 2, 3, 4],
            database: TestDbConfig {
                url: None,
                pool_size: 5,
            },
            max_retries: 3,
            session_token: String::new(),
        }
    }

    #[test]
    fn seed_serializes_to_the_expected_shape() {
        let doc = serde_json::to_value(seed()).unwrap();
        let map = doc.as_object().unwrap();
        assert_eq!(map["host"], "localhost");
        assert_eq!(map["ports"], serde_json::json!([1, 2, 3, 4]));
        assert!(map.contains_key("max-retries"));
        assert!(!map.contains_key("max_retries"));
        assert!(!map.contains_key("session_token"));
    }
}
