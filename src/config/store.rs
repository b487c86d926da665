use std::collections::BTreeMap;

/// Merged environment variables of a resolution run.
///
/// Writes overwrite unconditionally, so the last writer for a key wins.
/// Iteration is ordered by key.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VariableStore {
    vars: BTreeMap<String, String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Writes every pair of `vars`, overriding existing values.
    pub fn merge<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.put(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn snapshot(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
