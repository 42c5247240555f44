use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Cache key: a resource family plus every parameter that shapes the result.
///
/// Parameters are kept sorted, so two keys built from the same pairs in a different order
/// are equal. A key with fewer parameters acts as a prefix: invalidating
/// `QueryKey::new("applications")` hits every applications listing regardless of filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    resource: String,
    params: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add (or replace) one parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Add a parameter only when it is set.
    pub fn with_opt<V: ToString>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Add every `(name, value)` pair, e.g. rendered search filters.
    pub fn with_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        for (name, value) in pairs {
            self.params.insert(name.into(), value.to_string());
        }
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Whether `self` falls under `prefix`: same resource, and every parameter of `prefix`
    /// present with the same value.
    pub fn matches(&self, prefix: &QueryKey) -> bool {
        self.resource == prefix.resource
            && prefix
                .params
                .iter()
                .all(|(k, v)| self.params.get(k) == Some(v))
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}

impl From<&str> for QueryKey {
    fn from(resource: &str) -> Self {
        QueryKey::new(resource)
    }
}
