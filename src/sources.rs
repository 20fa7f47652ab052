use indexmap::IndexMap;

/// The overlay sources consulted for one `process` pass, highest precedence
/// first: CLI tokens, system properties, environment variables.
pub(crate) struct Sources<'a> {
    pub args: &'a [String],
    pub props: &'a IndexMap<String, String>,
    pub env: &'a IndexMap<String, String>,
    /// `None` disables the environment layer entirely. An empty string means
    /// unprefixed lookup.
    pub env_prefix: Option<&'a str>,
}

impl Sources<'_> {
    pub(crate) fn env_name(&self, path: &str) -> Option<String> {
        self.env_prefix.map(|prefix| format!("{prefix}{path}"))
    }
}

/// Exact-name lookup. Empty values count as unset.
pub(crate) fn lookup<'a>(map: &'a IndexMap<String, String>, name: &str) -> Option<&'a str> {
    map.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

/// Lookup trying the name as given, then lowercased, then uppercased.
/// Environment conventions differ per platform, so all three spellings are
/// probed.
pub(crate) fn lookup_ci<'a>(map: &'a IndexMap<String, String>, name: &str) -> Option<&'a str> {
    for candidate in variants(name) {
        if let Some(value) = lookup(map, &candidate) {
            return Some(value);
        }
    }
    None
}

/// The spellings a key is probed under: as given, lowercase, uppercase.
pub(crate) fn variants(name: &str) -> [String; 3] {
    [name.to_string(), name.to_lowercase(), name.to_uppercase()]
}

/// If `key` addresses an element of the container `stem` (`stem[3]`,
/// `stem[3]=…`, `stem[3].field=…`), extract the element index.
pub(crate) fn indexed(key: &str, stem: &str) -> Option<usize> {
    let rest = key.strip_prefix(stem)?.strip_prefix('[')?;
    let close = rest.find(']')?;
    rest[..close].parse().ok()
}

/// Highest element index any key addresses under any of the stems.
pub(crate) fn max_index<'a>(
    keys: impl Iterator<Item = &'a str>,
    stems: &[String],
) -> Option<usize> {
    let mut max = None;
    for key in keys {
        for stem in stems {
            if let Some(index) = indexed(key, stem) {
                max = Some(max.map_or(index, |m: usize| m.max(index)));
            }
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::vars;

    #[test]
    fn lookup_is_exact_and_skips_empty() {
        let map = vars(&[("port", "8080"), ("host", "")]);
        assert_eq!(lookup(&map, "port"), Some("8080"));
        assert_eq!(lookup(&map, "PORT"), None);
        assert_eq!(lookup(&map, "host"), None);
    }

    #[test]
    fn lookup_ci_probes_case_variants() {
        let map = vars(&[("APP_PORT", "1"), ("app_debug", "true")]);
        assert_eq!(lookup_ci(&map, "APP_port"), Some("1"));
        assert_eq!(lookup_ci(&map, "APP_debug"), Some("true"));
        assert_eq!(lookup_ci(&map, "APP_host"), None);
    }

    #[test]
    fn exact_spelling_wins_over_variants() {
        let map = vars(&[("APP_port", "exact"), ("APP_PORT", "upper")]);
        assert_eq!(lookup_ci(&map, "APP_port"), Some("exact"));
    }

    #[test]
    fn indexed_extracts_element_indices() {
        assert_eq!(indexed("ports[7]=7", "ports"), Some(7));
        assert_eq!(indexed("servers[2].host=x", "servers"), Some(2));
        assert_eq!(indexed("APP_PORTS[3]", "APP_PORTS"), Some(3));
        assert_eq!(indexed("grid[1][4]=9", "grid"), Some(1));
    }

    #[test]
    fn indexed_ignores_other_stems() {
        assert_eq!(indexed("ports2[1]=x", "ports"), None);
        assert_eq!(indexed("port[1]=x", "ports"), None);
        assert_eq!(indexed("ports=x", "ports"), None);
        assert_eq!(indexed("ports[x]=1", "ports"), None);
    }

    #[test]
    fn max_index_spans_keys_and_stems() {
        let keys = ["ports[2]=a", "ports[7]=b", "other=c"];
        assert_eq!(
            max_index(keys.iter().copied(), &["ports".to_string()]),
            Some(7)
        );
        assert_eq!(
            max_index(keys.iter().copied(), &["missing".to_string()]),
            None
        );
    }
}
