//! Test fixtures for common translation-unit scenarios
//!
//! Provides builders for modification sets and write contexts so writer
//! tests read like the change they exercise.

use serde::Serialize;
use serde_json::Value;

use cliunit_common::{InstanceIdentifier, Modification, ReadContext, WriteContext};

fn to_value<T: Serialize>(data: &T) -> Value {
    serde_json::to_value(data).unwrap_or(Value::Null)
}

/// An ordered set of modifications, together with the matching
/// [`WriteContext`].
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    modifications: Vec<Modification>,
    ctx: WriteContext,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the creation of `data` at `id`.
    pub fn create<T: Serialize>(mut self, id: InstanceIdentifier, data: &T) -> Self {
        self.ctx = self.ctx.with_after(&id, data);
        self.modifications.push(Modification::create(id, to_value(data)));
        self
    }

    /// Adds a change of the data at `id` from `before` to `after`.
    pub fn update<T: Serialize>(mut self, id: InstanceIdentifier, before: &T, after: &T) -> Self {
        self.ctx = self.ctx.with_before(&id, before).with_after(&id, after);
        self.modifications
            .push(Modification::update(id, to_value(before), to_value(after)));
        self
    }

    /// Adds the removal of `before` from `id`.
    pub fn delete<T: Serialize>(mut self, id: InstanceIdentifier, before: &T) -> Self {
        self.ctx = self.ctx.with_before(&id, before);
        self.modifications.push(Modification::delete(id, to_value(before)));
        self
    }

    /// Records data that is present and unchanged, e.g. the BGP global
    /// config a neighbor writer looks up.
    pub fn unchanged<T: Serialize>(mut self, id: &InstanceIdentifier, data: &T) -> Self {
        self.ctx = self.ctx.with_before(id, data).with_after(id, data);
        self
    }

    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    pub fn context(&self) -> &WriteContext {
        &self.ctx
    }

    /// Splits into the arguments of `HandlerRegistry::apply`.
    pub fn into_parts(self) -> (Vec<Modification>, WriteContext) {
        (self.modifications, self.ctx)
    }
}

/// A fresh read transaction.
pub fn read_context() -> ReadContext {
    ReadContext::new()
}

/// Joins command lines the way writer templates render them.
pub fn commands(lines: &[&str]) -> String {
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_change_set() {
        let id = InstanceIdentifier::new().child("vlans").keyed("vlan", 10);
        let set = ChangeSet::new()
            .create(id.clone(), &json!({"vlan-id": 10}))
            .delete(id.with_last_key(20), &json!({"vlan-id": 20}));

        assert_eq!(set.modifications().len(), 2);
        assert_eq!(
            set.context().read_after::<Value>(&id),
            Some(json!({"vlan-id": 10}))
        );

        let (mods, _ctx) = set.into_parts();
        assert!(mods[1].after.is_none());
    }

    #[test]
    fn test_commands() {
        assert_eq!(commands(&["configure terminal", "end"]), "configure terminal\nend\n");
        assert_eq!(commands(&[]), "");
    }
}
