//! Translate units and the handler registry.
//!
//! A [`TranslateUnit`] declares which devices it understands and registers
//! its handlers into a [`HandlerRegistry`], keyed on schema path. The
//! registry erases handler data types to `serde_json::Value` so callers can
//! drive any handler without knowing its model type.
//!
//! Writers run in registration order; deletes run first, in reverse
//! registration order, so children are removed before their parents.

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::cli::Cli;
use crate::context::{ReadContext, WriteContext};
use crate::error::{ReadError, ReadResult, WriteError, WriteResult};
use crate::handler::{ConfigReader, ConfigWriter, ListReader};
use crate::iid::InstanceIdentifier;

/// Identity of a device as reported by its management system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceId {
    pub vendor: String,
    pub version: String,
}

impl DeviceId {
    pub fn new(vendor: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            version: version.into(),
        }
    }
}

/// Registration boundary for one vendor/OS combination.
///
/// # Example
///
/// ```ignore
/// struct IosUnit;
///
/// impl TranslateUnit for IosUnit {
///     fn name(&self) -> &str { "ios" }
///     fn supports(&self, device: &DeviceId) -> bool { device.vendor == "ios" }
///     fn error_patterns(&self) -> &[Regex] { &ERROR_PATTERNS }
///     fn provide_handlers(&self, registry: &mut HandlerRegistry, cli: Arc<dyn Cli>) {
///         registry.add_reader(IFC_CONFIG, InterfaceConfigReader::new(cli.clone()));
///     }
/// }
/// ```
pub trait TranslateUnit: Send + Sync {
    /// Unit name for logging and listing.
    fn name(&self) -> &str;

    /// Returns true if this unit handles the device.
    fn supports(&self, device: &DeviceId) -> bool;

    /// Output lines that signal the device rejected a command.
    fn error_patterns(&self) -> &[Regex];

    /// Registers readers and writers bound to `cli`.
    fn provide_handlers(&self, registry: &mut HandlerRegistry, cli: Arc<dyn Cli>);
}

/// A single change handed to [`HandlerRegistry::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Modification {
    pub id: InstanceIdentifier,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl Modification {
    pub fn create(id: InstanceIdentifier, after: Value) -> Self {
        Self {
            id,
            before: None,
            after: Some(after),
        }
    }

    pub fn update(id: InstanceIdentifier, before: Value, after: Value) -> Self {
        Self {
            id,
            before: Some(before),
            after: Some(after),
        }
    }

    pub fn delete(id: InstanceIdentifier, before: Value) -> Self {
        Self {
            id,
            before: Some(before),
            after: None,
        }
    }

    fn is_delete(&self) -> bool {
        self.before.is_some() && self.after.is_none()
    }
}

#[async_trait]
trait ErasedReader: Send + Sync {
    async fn read(&self, id: &InstanceIdentifier, ctx: &ReadContext) -> ReadResult<Value>;
}

#[async_trait]
trait ErasedListReader: Send + Sync {
    async fn read_ids(&self, id: &InstanceIdentifier, ctx: &ReadContext)
        -> ReadResult<Vec<String>>;
}

#[async_trait]
trait ErasedWriter: Send + Sync {
    async fn apply(
        &self,
        id: &InstanceIdentifier,
        before: Option<&Value>,
        after: Option<&Value>,
        ctx: &WriteContext,
    ) -> WriteResult<()>;
}

struct ReaderAdapter<R>(R);

#[async_trait]
impl<R> ErasedReader for ReaderAdapter<R>
where
    R: ConfigReader,
    R::Data: Default + Serialize,
{
    async fn read(&self, id: &InstanceIdentifier, ctx: &ReadContext) -> ReadResult<Value> {
        let mut data = R::Data::default();
        self.0.read_current_attributes(id, &mut data, ctx).await?;
        serde_json::to_value(&data).map_err(|e| ReadError::Serialize {
            path: id.to_string(),
            message: e.to_string(),
        })
    }
}

struct ListReaderAdapter<R>(R);

#[async_trait]
impl<R: ListReader> ErasedListReader for ListReaderAdapter<R> {
    async fn read_ids(
        &self,
        id: &InstanceIdentifier,
        ctx: &ReadContext,
    ) -> ReadResult<Vec<String>> {
        let keys = self.0.get_all_ids(id, ctx).await?;
        Ok(keys.iter().map(ToString::to_string).collect())
    }
}

struct WriterAdapter<W>(W);

impl<W> WriterAdapter<W>
where
    W: ConfigWriter,
    W::Data: DeserializeOwned,
{
    fn decode(id: &InstanceIdentifier, value: &Value) -> WriteResult<W::Data> {
        serde_json::from_value(value.clone())
            .map_err(|e| WriteError::invalid_data(id, e.to_string()))
    }
}

#[async_trait]
impl<W> ErasedWriter for WriterAdapter<W>
where
    W: ConfigWriter,
    W::Data: DeserializeOwned,
{
    async fn apply(
        &self,
        id: &InstanceIdentifier,
        before: Option<&Value>,
        after: Option<&Value>,
        ctx: &WriteContext,
    ) -> WriteResult<()> {
        match (before, after) {
            (None, Some(after)) => {
                let after = Self::decode(id, after)?;
                self.0.write_current_attributes(id, &after, ctx).await
            }
            (Some(before), Some(after)) => {
                let before = Self::decode(id, before)?;
                let after = Self::decode(id, after)?;
                self.0
                    .update_current_attributes(id, &before, &after, ctx)
                    .await
            }
            (Some(before), None) => {
                let before = Self::decode(id, before)?;
                self.0.delete_current_attributes(id, &before, ctx).await
            }
            (None, None) => Ok(()),
        }
    }
}

/// Handlers of one device session, keyed on schema path.
#[derive(Default)]
pub struct HandlerRegistry {
    readers: HashMap<String, Box<dyn ErasedReader>>,
    list_readers: HashMap<String, Box<dyn ErasedListReader>>,
    writers: Vec<(String, Box<dyn ErasedWriter>)>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry holding the handlers of `unit`.
    pub fn for_unit(unit: &dyn TranslateUnit, cli: Arc<dyn Cli>) -> Self {
        let mut registry = Self::new();
        unit.provide_handlers(&mut registry, cli);
        info!(
            unit = unit.name(),
            readers = registry.readers.len() + registry.list_readers.len(),
            writers = registry.writers.len(),
            error_patterns = unit.error_patterns().len(),
            "Registered handlers"
        );
        registry
    }

    pub fn add_reader<R>(&mut self, schema_path: &str, reader: R)
    where
        R: ConfigReader + 'static,
        R::Data: Default + Serialize,
    {
        self.readers
            .insert(schema_path.to_string(), Box::new(ReaderAdapter(reader)));
    }

    pub fn add_list_reader<R>(&mut self, schema_path: &str, reader: R)
    where
        R: ListReader + 'static,
    {
        self.list_readers
            .insert(schema_path.to_string(), Box::new(ListReaderAdapter(reader)));
    }

    /// Registers a writer. Registration order is write order.
    pub fn add_writer<W>(&mut self, schema_path: &str, writer: W)
    where
        W: ConfigWriter + 'static,
        W::Data: DeserializeOwned,
    {
        self.writers
            .push((schema_path.to_string(), Box::new(WriterAdapter(writer))));
    }

    /// Schema paths with a reader, list reader or writer, sorted.
    pub fn supported_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .readers
            .keys()
            .chain(self.list_readers.keys())
            .chain(self.writers.iter().map(|(path, _)| path))
            .cloned()
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Reads the container at `id`.
    #[instrument(skip(self, ctx), fields(path = %id))]
    pub async fn read(&self, id: &InstanceIdentifier, ctx: &ReadContext) -> ReadResult<Value> {
        let reader = self
            .readers
            .get(&id.schema_path())
            .ok_or_else(|| ReadError::unsupported(id))?;
        reader.read(id, ctx).await
    }

    /// Reads the keys of the list at `id`.
    #[instrument(skip(self, ctx), fields(path = %id))]
    pub async fn read_ids(
        &self,
        id: &InstanceIdentifier,
        ctx: &ReadContext,
    ) -> ReadResult<Vec<String>> {
        let reader = self
            .list_readers
            .get(&id.schema_path())
            .ok_or_else(|| ReadError::unsupported(id))?;
        reader.read_ids(id, ctx).await
    }

    /// Applies a set of modifications.
    ///
    /// Deletes run first in reverse writer order, then creates and updates
    /// in writer order. Within one writer, modifications keep their input
    /// order. Processing stops at the first failure.
    #[instrument(skip_all, fields(count = modifications.len()))]
    pub async fn apply(
        &self,
        modifications: Vec<Modification>,
        ctx: &WriteContext,
    ) -> WriteResult<()> {
        let mut ordered = Vec::with_capacity(modifications.len());
        for modification in modifications {
            let path = modification.id.schema_path();
            let index = self
                .writers
                .iter()
                .position(|(p, _)| *p == path)
                .ok_or_else(|| WriteError::unsupported(&modification.id))?;
            ordered.push((index, modification));
        }

        let (mut deletes, mut writes): (Vec<_>, Vec<_>) =
            ordered.into_iter().partition(|(_, m)| m.is_delete());
        deletes.sort_by(|(a, _), (b, _)| b.cmp(a));
        writes.sort_by_key(|(index, _)| *index);

        for (index, modification) in deletes.into_iter().chain(writes) {
            let (path, writer) = &self.writers[index];
            debug!(schema_path = %path, id = %modification.id, "Applying modification");
            writer
                .apply(
                    &modification.id,
                    modification.before.as_ref(),
                    modification.after.as_ref(),
                    ctx,
                )
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Named {
        name: String,
    }

    struct NameReader;

    #[async_trait]
    impl ConfigReader for NameReader {
        type Data = Named;

        async fn read_current_attributes(
            &self,
            id: &InstanceIdentifier,
            data: &mut Named,
            _ctx: &ReadContext,
        ) -> ReadResult<()> {
            data.name = id.key_of("item").unwrap_or_default().to_string();
            Ok(())
        }
    }

    struct KeysReader;

    #[async_trait]
    impl ListReader for KeysReader {
        type Key = u32;

        async fn get_all_ids(
            &self,
            _id: &InstanceIdentifier,
            _ctx: &ReadContext,
        ) -> ReadResult<Vec<u32>> {
            Ok(vec![1, 2])
        }
    }

    struct LogWriter {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ConfigWriter for LogWriter {
        type Data = Named;

        async fn write_current_attributes(
            &self,
            _id: &InstanceIdentifier,
            data: &Named,
            _ctx: &WriteContext,
        ) -> WriteResult<()> {
            self.log.lock().unwrap().push(format!("{} write {}", self.tag, data.name));
            Ok(())
        }

        async fn delete_current_attributes(
            &self,
            _id: &InstanceIdentifier,
            data: &Named,
            _ctx: &WriteContext,
        ) -> WriteResult<()> {
            self.log.lock().unwrap().push(format!("{} delete {}", self.tag, data.name));
            Ok(())
        }
    }

    fn item(name: &str) -> InstanceIdentifier {
        InstanceIdentifier::new().keyed("item", name).child("config")
    }

    fn sub(name: &str) -> InstanceIdentifier {
        InstanceIdentifier::new().keyed("item", name).child("sub")
    }

    fn registry(log: &Arc<Mutex<Vec<String>>>) -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.add_reader("/item/config", NameReader);
        registry.add_list_reader("/item", KeysReader);
        registry.add_writer(
            "/item/config",
            LogWriter {
                tag: "parent",
                log: log.clone(),
            },
        );
        registry.add_writer(
            "/item/sub",
            LogWriter {
                tag: "child",
                log: log.clone(),
            },
        );
        registry
    }

    #[tokio::test]
    async fn test_read_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&log);
        let ctx = ReadContext::new();

        let value = registry.read(&item("a"), &ctx).await.unwrap();
        assert_eq!(value, json!({"name": "a"}));

        let ids = registry
            .read_ids(&InstanceIdentifier::new().child("item"), &ctx)
            .await
            .unwrap();
        assert_eq!(ids, vec!["1", "2"]);

        let missing = registry.read(&sub("a"), &ctx).await;
        assert!(matches!(missing, Err(ReadError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn test_apply_ordering() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&log);

        registry
            .apply(
                vec![
                    Modification::create(sub("n"), json!({"name": "n-sub"})),
                    Modification::delete(item("o"), json!({"name": "o"})),
                    Modification::create(item("n"), json!({"name": "n"})),
                    Modification::delete(sub("o"), json!({"name": "o-sub"})),
                    Modification::update(item("u"), json!({"name": "u1"}), json!({"name": "u2"})),
                ],
                &WriteContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "child delete o-sub",
                "parent delete o",
                "parent write n",
                "parent delete u1",
                "parent write u2",
                "child write n-sub",
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_rejects_unknown_path_and_bad_data() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&log);
        let ctx = WriteContext::new();

        let unknown = InstanceIdentifier::new().child("nothing");
        let result = registry
            .apply(vec![Modification::create(unknown, json!({}))], &ctx)
            .await;
        assert!(matches!(result, Err(WriteError::Unsupported { .. })));

        let result = registry
            .apply(vec![Modification::create(item("x"), json!({"name": 5}))], &ctx)
            .await;
        assert!(matches!(result, Err(WriteError::InvalidData { .. })));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_supported_paths() {
        let log = Arc::new(Mutex::new(Vec::new()));
        assert_eq!(
            registry(&log).supported_paths(),
            vec!["/item", "/item/config", "/item/sub"]
        );
    }
}
