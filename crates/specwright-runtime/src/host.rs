//! Access to the ambient process environment.

use std::collections::BTreeMap;

/// Source of the host's environment variables.
pub trait HostEnv: Send + Sync {
    /// Returns every variable of the host environment.
    fn vars(&self) -> BTreeMap<String, String>;

    /// Returns one variable, if set.
    fn var(&self, key: &str) -> Option<String> {
        self.vars().remove(key)
    }
}

/// Reads the environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl HostEnv for ProcessEnv {
    fn vars(&self) -> BTreeMap<String, String> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed environment snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedEnv(BTreeMap<String, String>);

impl FixedEnv {
    /// Creates a snapshot from key/value pairs.
    #[must_use]
    pub fn new<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl HostEnv for FixedEnv {
    fn vars(&self) -> BTreeMap<String, String> {
        self.0.clone()
    }

    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}
