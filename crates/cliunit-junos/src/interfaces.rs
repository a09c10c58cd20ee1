//! Interface list and interface config.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use cliunit_common::handler::blocking_read;
use cliunit_common::{
    parsing, template, Cli, Command, ConfigReader, ConfigWriter, InstanceIdentifier, ListReader,
    ReadContext, ReadError, ReadResult, WriteContext, WriteResult,
};
use cliunit_model::interfaces::{InterfaceConfig, InterfaceType};

use crate::unit::{send_config, statements_under, SH_INTERFACES};

static INTERFACE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^set interfaces (?<name>\S+) ").expect("Invalid regex pattern"));
static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^description (?<desc>.+)$").expect("Invalid regex pattern"));
static MTU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^mtu (?<mtu>\d+)$").expect("Invalid regex pattern"));
static DISABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^disable$").expect("Invalid regex pattern"));

/// Names under `set interfaces` that are groupings, not interfaces.
const NOT_INTERFACES: &[&str] = &["interface-range", "interface-set", "traceoptions"];

const WRITE_TEMPLATE: &str = "\
configure
{% if data.description %}
set interfaces {{ data.name }} description {{ data.description | quote }}
{% elif before.description %}
delete interfaces {{ data.name }} description
{% endif %}
{% if data.mtu %}
set interfaces {{ data.name }} mtu {{ data.mtu }}
{% elif before.mtu %}
delete interfaces {{ data.name }} mtu
{% endif %}
{% if data.enabled is defined and not data.enabled %}
set interfaces {{ data.name }} disable
{% elif before.enabled is defined and not before.enabled %}
delete interfaces {{ data.name }} disable
{% endif %}
commit and-quit";

const DELETE_TEMPLATE: &str = "\
configure
delete interfaces {{ before.name }}
commit and-quit";

pub fn parse_interface_ids(output: &str) -> Vec<String> {
    parsing::parse_keys(output, &INTERFACE_LINE, |c| {
        let name = &c["name"];
        (!NOT_INTERFACES.contains(&name)).then(|| name.to_string())
    })
}

pub fn parse_interface(output: &str, config: &mut InterfaceConfig) {
    config.if_type = Some(InterfaceType::from_name(&config.name));
    let statements = statements_under(output, &format!("set interfaces {}", config.name));
    if statements.is_empty() {
        return;
    }
    config.description = parsing::parse_field(&statements, &DESCRIPTION, |c| Some(parsing::unquote(&c["desc"])));
    config.mtu = parsing::parse_field(&statements, &MTU, |c| c["mtu"].parse().ok());
    config.enabled = Some(!parsing::contains_line(&statements, &DISABLE));
}

pub struct InterfaceReader {
    cli: Arc<dyn Cli>,
}

impl InterfaceReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ListReader for InterfaceReader {
    type Key = String;

    async fn get_all_ids(
        &self,
        id: &InstanceIdentifier,
        ctx: &ReadContext,
    ) -> ReadResult<Vec<String>> {
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_INTERFACES), ctx).await?;
        Ok(parse_interface_ids(&output))
    }
}

pub struct InterfaceConfigReader {
    cli: Arc<dyn Cli>,
}

impl InterfaceConfigReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigReader for InterfaceConfigReader {
    type Data = InterfaceConfig;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut InterfaceConfig,
        ctx: &ReadContext,
    ) -> ReadResult<()> {
        data.name = id
            .key_of("interface")
            .ok_or_else(|| ReadError::unsupported(id))?
            .to_string();
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_INTERFACES), ctx).await?;
        parse_interface(&output, data);
        Ok(())
    }
}

/// Writes interface config.
///
/// Deleting a physical interface is allowed here: Junos keeps the port and
/// drops its configuration back to defaults.
pub struct InterfaceConfigWriter {
    cli: Arc<dyn Cli>,
}

impl InterfaceConfigWriter {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigWriter for InterfaceConfigWriter {
    type Data = InterfaceConfig;

    async fn write_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &InterfaceConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = template::render(WRITE_TEMPLATE, None::<&InterfaceConfig>, Some(data))?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn update_current_attributes(
        &self,
        id: &InstanceIdentifier,
        before: &InterfaceConfig,
        after: &InterfaceConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = template::render(WRITE_TEMPLATE, Some(before), Some(after))?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn delete_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &InterfaceConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        debug!(interface = %data.name, "Resetting interface to defaults");
        let commands = template::render(DELETE_TEMPLATE, Some(data), None::<&InterfaceConfig>)?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliunit_common::WriteError;
    use cliunit_model::paths;
    use cliunit_test::{commands, MockCli};
    use pretty_assertions::assert_eq;

    const OUTPUT: &str = "\
set interfaces interface-range ACCESS member ge-0/0/[2-5]
set interfaces ge-0/0/0 description \"uplink to core\"
set interfaces ge-0/0/0 mtu 9192
set interfaces ge-0/0/0 unit 0 family inet address 10.0.0.1/30
set interfaces ge-0/0/1 disable
set interfaces lo0 unit 0 family inet address 10.255.0.1/32
";

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_interface_ids(OUTPUT), vec!["ge-0/0/0", "ge-0/0/1", "lo0"]);
    }

    #[test]
    fn test_parse_interface() {
        let mut config = InterfaceConfig::new("ge-0/0/0");
        parse_interface(OUTPUT, &mut config);
        assert_eq!(
            config,
            InterfaceConfig {
                name: "ge-0/0/0".into(),
                if_type: Some(InterfaceType::EthernetCsmacd),
                description: Some("uplink to core".into()),
                mtu: Some(9192),
                enabled: Some(true),
            }
        );

        let mut config = InterfaceConfig::new("ge-0/0/1");
        parse_interface(OUTPUT, &mut config);
        assert_eq!(config.enabled, Some(false));

        let mut config = InterfaceConfig::new("ge-0/0/9");
        parse_interface(OUTPUT, &mut config);
        assert_eq!(config.enabled, None);
    }

    #[tokio::test]
    async fn test_update() {
        let cli = Arc::new(MockCli::new());
        let writer = InterfaceConfigWriter::new(cli.clone());
        let before = InterfaceConfig {
            mtu: Some(9192),
            enabled: Some(false),
            ..InterfaceConfig::new("ge-0/0/1")
        };
        let after = InterfaceConfig {
            description: Some("to r2".into()),
            enabled: Some(true),
            ..InterfaceConfig::new("ge-0/0/1")
        };

        writer
            .update_current_attributes(&paths::interface_config("ge-0/0/1"), &before, &after, &WriteContext::new())
            .await
            .unwrap();

        assert_eq!(
            cli.sent_commands(),
            vec![commands(&[
                "configure",
                "set interfaces ge-0/0/1 description \"to r2\"",
                "delete interfaces ge-0/0/1 mtu",
                "delete interfaces ge-0/0/1 disable",
                "commit and-quit",
            ])]
        );
    }

    #[tokio::test]
    async fn test_delete_physical() {
        let cli = Arc::new(MockCli::new());
        let writer = InterfaceConfigWriter::new(cli.clone());
        writer
            .delete_current_attributes(
                &paths::interface_config("ge-0/0/1"),
                &InterfaceConfig::new("ge-0/0/1"),
                &WriteContext::new(),
            )
            .await
            .unwrap();
        assert_eq!(
            cli.sent_commands(),
            vec![commands(&["configure", "delete interfaces ge-0/0/1", "commit and-quit"])]
        );
    }

    #[tokio::test]
    async fn test_commit_error() {
        let commit = commands(&["configure", "set interfaces ge-0/0/1 mtu 20000", "commit and-quit"]);
        let cli = Arc::new(MockCli::new().with_output(
            commit,
            "[edit interfaces ge-0/0/1]\n  'mtu 20000'\n    error: value 20000 is not within range (256..16000)\nerror: configuration check-out failed\n",
        ));
        let writer = InterfaceConfigWriter::new(cli.clone());
        let data = InterfaceConfig {
            mtu: Some(20000),
            ..InterfaceConfig::new("ge-0/0/1")
        };
        let result = writer
            .write_current_attributes(&paths::interface_config("ge-0/0/1"), &data, &WriteContext::new())
            .await;
        assert!(matches!(result, Err(WriteError::DeviceRejected { .. })));
    }
}
