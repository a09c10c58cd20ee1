//! Cable-mac list and config.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use cliunit_common::handler::blocking_read;
use cliunit_common::{
    parsing, template, Cli, Command, ConfigReader, ConfigWriter, InstanceIdentifier, ListReader,
    ReadContext, ReadError, ReadResult, WriteContext, WriteError, WriteResult,
};
use cliunit_model::cable::CableMacConfig;

use crate::unit::send_config;

pub const SH_CABLE_MACS: &str = "show running-config interface cable-mac";

static CABLE_MAC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^interface cable-mac (?<id>\d+)$").expect("Invalid regex pattern")
});
static DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*description (?<desc>.+)$").expect("Invalid regex pattern")
});
static SHUTDOWN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*shutdown$").expect("Invalid regex pattern"));

const WRITE_TEMPLATE: &str = "\
configure interface cable-mac {{ data.id }}
{% if data.description %}
description {{ data.description | quote }}
{% elif before.description %}
no description
{% endif %}
{% if data.enabled is defined %}
{% if data.enabled %}
no shutdown
{% else %}
shutdown
{% endif %}
{% endif %}
exit";

const DELETE_TEMPLATE: &str = "configure no interface cable-mac {{ before.id }}";

pub(crate) fn cable_mac_key(id: &InstanceIdentifier) -> ReadResult<u32> {
    id.key_of("cable-mac")
        .and_then(|key| key.parse().ok())
        .ok_or_else(|| ReadError::unsupported(id))
}

pub fn parse_cable_mac_ids(output: &str) -> Vec<u32> {
    parsing::parse_keys(output, &CABLE_MAC_LINE, |c| c["id"].parse().ok())
}

pub fn parse_cable_mac(output: &str, config: &mut CableMacConfig) {
    let Some(section) =
        parsing::find_section(output, &CABLE_MAC_LINE, "id", &config.id.to_string())
    else {
        return;
    };
    let body = section.body_text();
    config.description =
        parsing::parse_field(&body, &DESCRIPTION, |c| Some(parsing::unquote(&c["desc"])));
    config.enabled = Some(!parsing::contains_line(&body, &SHUTDOWN));
}

pub struct CableMacReader {
    cli: Arc<dyn Cli>,
}

impl CableMacReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ListReader for CableMacReader {
    type Key = u32;

    async fn get_all_ids(&self, id: &InstanceIdentifier, ctx: &ReadContext) -> ReadResult<Vec<u32>> {
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_CABLE_MACS), ctx).await?;
        Ok(parse_cable_mac_ids(&output))
    }
}

pub struct CableMacConfigReader {
    cli: Arc<dyn Cli>,
}

impl CableMacConfigReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigReader for CableMacConfigReader {
    type Data = CableMacConfig;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut CableMacConfig,
        ctx: &ReadContext,
    ) -> ReadResult<()> {
        data.id = cable_mac_key(id)?;
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_CABLE_MACS), ctx).await?;
        parse_cable_mac(&output, data);
        Ok(())
    }
}

pub struct CableMacConfigWriter {
    cli: Arc<dyn Cli>,
}

impl CableMacConfigWriter {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigWriter for CableMacConfigWriter {
    type Data = CableMacConfig;

    async fn write_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &CableMacConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = template::render(WRITE_TEMPLATE, None::<&CableMacConfig>, Some(data))?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn update_current_attributes(
        &self,
        id: &InstanceIdentifier,
        before: &CableMacConfig,
        after: &CableMacConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        if before.id != after.id {
            return Err(WriteError::update_failed(id, "cable-mac id cannot be changed"));
        }
        let commands = template::render(WRITE_TEMPLATE, Some(before), Some(after))?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn delete_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &CableMacConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = template::render(DELETE_TEMPLATE, Some(data), None::<&CableMacConfig>)?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliunit_model::paths;
    use cliunit_test::{commands, MockCli};
    use pretty_assertions::assert_eq;

    const OUTPUT: &str = "\
interface cable-mac 1
 description \"Main MAC domain\"
 cable cm-ip-prov-mode ipv4only
 no shutdown
exit
interface cable-mac 2
 shutdown
exit
interface cable-mac 10
exit
";

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_cable_mac_ids(OUTPUT), vec![1, 2, 10]);
    }

    #[test]
    fn test_parse_cable_mac() {
        let mut config = CableMacConfig {
            id: 1,
            ..Default::default()
        };
        parse_cable_mac(OUTPUT, &mut config);
        assert_eq!(
            config,
            CableMacConfig {
                id: 1,
                description: Some("Main MAC domain".into()),
                enabled: Some(true),
            }
        );

        let mut config = CableMacConfig {
            id: 2,
            ..Default::default()
        };
        parse_cable_mac(OUTPUT, &mut config);
        assert_eq!(config.enabled, Some(false));
        assert_eq!(config.description, None);
    }

    #[test]
    fn test_parse_escaped_description() {
        let output = "\
interface cable-mac 3
 description \"node \\\"A\\\" east\"
";
        let mut config = CableMacConfig {
            id: 3,
            ..Default::default()
        };
        parse_cable_mac(output, &mut config);
        assert_eq!(config.description.as_deref(), Some("node \"A\" east"));
    }

    #[tokio::test]
    async fn test_write_and_delete() {
        let cli = Arc::new(MockCli::new());
        let writer = CableMacConfigWriter::new(cli.clone());
        let data = CableMacConfig {
            id: 3,
            description: Some("node 3".into()),
            enabled: Some(false),
        };

        writer
            .write_current_attributes(&paths::cable_mac_config(3), &data, &WriteContext::new())
            .await
            .unwrap();
        writer
            .delete_current_attributes(&paths::cable_mac_config(3), &data, &WriteContext::new())
            .await
            .unwrap();

        assert_eq!(
            cli.sent_commands(),
            vec![
                commands(&[
                    "configure interface cable-mac 3",
                    "description \"node 3\"",
                    "shutdown",
                    "exit",
                ]),
                commands(&["configure no interface cable-mac 3"]),
            ]
        );
    }

    #[tokio::test]
    async fn test_update() {
        let cli = Arc::new(MockCli::new());
        let writer = CableMacConfigWriter::new(cli.clone());
        let before = CableMacConfig {
            id: 1,
            description: Some("old".into()),
            enabled: Some(false),
        };
        let after = CableMacConfig {
            id: 1,
            description: None,
            enabled: Some(true),
        };

        writer
            .update_current_attributes(&paths::cable_mac_config(1), &before, &after, &WriteContext::new())
            .await
            .unwrap();

        assert_eq!(
            cli.sent_commands(),
            vec![commands(&[
                "configure interface cable-mac 1",
                "no description",
                "no shutdown",
                "exit",
            ])]
        );
    }
}
