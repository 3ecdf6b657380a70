use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted key/value store for values that outlive a single run, such as
/// prestige bonus multipliers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    values: BTreeMap<String, f64>,
}

impl Preferences {
    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Entries whose key starts with `prefix`, in key order.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.values
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), *v))
    }

    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_scan_is_ordered_and_bounded() {
        let mut p = Preferences::default();
        p.set("prestige.capitalist.start_money", 50_000.0);
        p.set("prestige.capitalist.money_mult", 1.0);
        p.set("prestige.veteran.money_mult", 0.9);
        p.set("volume", 0.5);
        let keys: Vec<_> = p.with_prefix("prestige.capitalist.").map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["prestige.capitalist.money_mult", "prestige.capitalist.start_money"]
        );
        assert_eq!(p.get_or("missing", 2.0), 2.0);
    }
}
