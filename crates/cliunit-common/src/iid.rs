//! Instance identifiers addressing a subtree of the configuration model.
//!
//! An identifier is a list of path arguments, each optionally keyed:
//! `/interfaces/interface[GigabitEthernet0/1]/config`. Handlers are
//! registered on the key-less *schema path* (`/interfaces/interface/config`)
//! and pull the keys they need with [`InstanceIdentifier::key_of`].

use std::fmt;
use std::str::FromStr;

/// One step of an [`InstanceIdentifier`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathArg {
    pub name: String,
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct InstanceIdentifier {
    args: Vec<PathArg>,
}

impl InstanceIdentifier {
    /// Creates an empty (root) identifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an unkeyed step.
    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.args.push(PathArg {
            name: name.into(),
            key: None,
        });
        self
    }

    /// Appends a keyed list step.
    pub fn keyed(mut self, name: impl Into<String>, key: impl ToString) -> Self {
        self.args.push(PathArg {
            name: name.into(),
            key: Some(key.to_string()),
        });
        self
    }

    /// Returns the key of the last step called `name`.
    pub fn key_of(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .rev()
            .find(|arg| arg.name == name)
            .and_then(|arg| arg.key.as_deref())
    }

    /// Returns the identifier without its last step.
    pub fn parent(&self) -> Option<Self> {
        if self.args.is_empty() {
            return None;
        }
        let mut args = self.args.clone();
        args.pop();
        Some(Self { args })
    }

    /// Replaces the key of the last step, turning a list identifier into
    /// the identifier of one of its entries.
    pub fn with_last_key(&self, key: impl ToString) -> Self {
        let mut args = self.args.clone();
        if let Some(last) = args.last_mut() {
            last.key = Some(key.to_string());
        }
        Self { args }
    }

    pub fn last(&self) -> Option<&PathArg> {
        self.args.last()
    }

    pub fn args(&self) -> &[PathArg] {
        &self.args
    }

    /// The key-less path used to look handlers up.
    pub fn schema_path(&self) -> String {
        if self.args.is_empty() {
            return "/".to_string();
        }
        self.args.iter().map(|arg| format!("/{}", arg.name)).collect()
    }
}

impl fmt::Display for InstanceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            return f.write_str("/");
        }
        for arg in &self.args {
            match &arg.key {
                Some(key) => write!(f, "/{}[{}]", arg.name, key)?,
                None => write!(f, "/{}", arg.name)?,
            }
        }
        Ok(())
    }
}

/// Error returned when an identifier string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid instance identifier '{0}'")]
pub struct InvalidIdentifier(pub String);

impl FromStr for InstanceIdentifier {
    type Err = InvalidIdentifier;

    /// Parses the [`Display`](fmt::Display) form. Keys may contain `/`
    /// (`interface[GigabitEthernet0/1]`) but not brackets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidIdentifier(s.to_string());
        let rest = s.strip_prefix('/').ok_or_else(invalid)?;

        let mut id = InstanceIdentifier::new();
        let mut name = String::new();
        let mut key: Option<String> = None;
        let mut in_key = false;

        let mut flush = |name: &mut String, key: &mut Option<String>| -> Result<(), InvalidIdentifier> {
            if name.is_empty() {
                return Err(invalid());
            }
            id.args.push(PathArg {
                name: std::mem::take(name),
                key: key.take(),
            });
            Ok(())
        };

        for c in rest.chars() {
            match (c, in_key) {
                ('[', false) if key.is_none() => {
                    in_key = true;
                    key = Some(String::new());
                }
                (']', true) => in_key = false,
                ('[', _) | (']', _) => return Err(invalid()),
                ('/', false) => flush(&mut name, &mut key)?,
                (c, true) => key.get_or_insert_with(String::new).push(c),
                (_, false) if key.is_some() => return Err(invalid()),
                (c, false) => name.push(c),
            }
        }

        if in_key {
            return Err(invalid());
        }
        if !name.is_empty() {
            flush(&mut name, &mut key)?;
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ifc_config(name: &str) -> InstanceIdentifier {
        InstanceIdentifier::new()
            .child("interfaces")
            .keyed("interface", name)
            .child("config")
    }

    #[test]
    fn test_display_and_schema_path() {
        let id = ifc_config("GigabitEthernet0/1");
        assert_eq!(id.to_string(), "/interfaces/interface[GigabitEthernet0/1]/config");
        assert_eq!(id.schema_path(), "/interfaces/interface/config");
        assert_eq!(InstanceIdentifier::new().schema_path(), "/");
    }

    #[test]
    fn test_key_of() {
        let id = ifc_config("Loopback0");
        assert_eq!(id.key_of("interface"), Some("Loopback0"));
        assert_eq!(id.key_of("interfaces"), None);
        assert_eq!(id.key_of("missing"), None);
    }

    #[test]
    fn test_parent_and_last_key() {
        let id = ifc_config("Loopback0");
        assert_eq!(
            id.parent().unwrap().to_string(),
            "/interfaces/interface[Loopback0]"
        );

        let list = InstanceIdentifier::new().child("interfaces").child("interface");
        assert_eq!(
            list.with_last_key("Tunnel1").to_string(),
            "/interfaces/interface[Tunnel1]"
        );
        assert!(InstanceIdentifier::new().parent().is_none());
    }

    #[test]
    fn test_parse_round_trip() {
        let id = ifc_config("GigabitEthernet0/0/1");
        let parsed: InstanceIdentifier = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("interfaces".parse::<InstanceIdentifier>().is_err());
        assert!("/interfaces//config".parse::<InstanceIdentifier>().is_err());
        assert!("/interface[a".parse::<InstanceIdentifier>().is_err());
        assert!("/interface[a]b".parse::<InstanceIdentifier>().is_err());
        assert!("/interface[a[b]]".parse::<InstanceIdentifier>().is_err());
    }
}
