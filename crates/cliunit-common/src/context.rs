//! Per-transaction read and write contexts.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

use crate::iid::InstanceIdentifier;

/// Context of one read transaction.
///
/// Several readers usually scrape the same show command (every interface
/// reader parses `show running-config`); the output is cached here so the
/// device sees the command once per transaction.
#[derive(Debug, Default)]
pub struct ReadContext {
    cache: DashMap<String, String>,
}

impl ReadContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached output of a command.
    pub fn cached(&self, command: &str) -> Option<String> {
        self.cache.get(command).map(|entry| entry.value().clone())
    }

    /// Stores the output of a command.
    pub fn store(&self, command: &str, output: &str) {
        self.cache.insert(command.to_string(), output.to_string());
    }

    /// Number of cached commands.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

/// Context of one write transaction: the data before and after the change,
/// indexed by identifier.
///
/// Writers use it to look at data they do not own, such as the local AS
/// number a BGP neighbor writer needs to enter `router bgp`.
#[derive(Debug, Clone, Default)]
pub struct WriteContext {
    before: HashMap<String, serde_json::Value>,
    after: HashMap<String, serde_json::Value>,
}

impl WriteContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the data present at `id` before the transaction.
    pub fn with_before<T: Serialize>(mut self, id: &InstanceIdentifier, data: &T) -> Self {
        if let Ok(value) = serde_json::to_value(data) {
            self.before.insert(id.to_string(), value);
        }
        self
    }

    /// Records the data present at `id` after the transaction.
    pub fn with_after<T: Serialize>(mut self, id: &InstanceIdentifier, data: &T) -> Self {
        if let Ok(value) = serde_json::to_value(data) {
            self.after.insert(id.to_string(), value);
        }
        self
    }

    /// Data at `id` before the transaction, if present and of type `T`.
    pub fn read_before<T: DeserializeOwned>(&self, id: &InstanceIdentifier) -> Option<T> {
        Self::lookup(&self.before, id)
    }

    /// Data at `id` after the transaction, if present and of type `T`.
    pub fn read_after<T: DeserializeOwned>(&self, id: &InstanceIdentifier) -> Option<T> {
        Self::lookup(&self.after, id)
    }

    fn lookup<T: DeserializeOwned>(
        map: &HashMap<String, serde_json::Value>,
        id: &InstanceIdentifier,
    ) -> Option<T> {
        map.get(&id.to_string())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Global {
        #[serde(rename = "as")]
        asn: u32,
    }

    #[test]
    fn test_read_context_cache() {
        let ctx = ReadContext::new();
        assert_eq!(ctx.cached("show running-config"), None);

        ctx.store("show running-config", "hostname r1\n");
        assert_eq!(
            ctx.cached("show running-config").as_deref(),
            Some("hostname r1\n")
        );
        assert_eq!(ctx.cached_count(), 1);
    }

    #[test]
    fn test_write_context_snapshots() {
        let id = InstanceIdentifier::new().child("bgp").child("global");
        let ctx = WriteContext::new()
            .with_before(&id, &Global { asn: 100 })
            .with_after(&id, &Global { asn: 200 });

        assert_eq!(ctx.read_before::<Global>(&id), Some(Global { asn: 100 }));
        assert_eq!(ctx.read_after::<Global>(&id), Some(Global { asn: 200 }));

        let other = InstanceIdentifier::new().child("acl");
        assert_eq!(ctx.read_after::<Global>(&other), None);
    }
}
