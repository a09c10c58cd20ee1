//! VLAN list and VLAN config (`vlan N` blocks).
//!
//! Unnamed VLANs are collapsed into one header, `vlan 30,40-42`, in the
//! running config.

use async_trait::async_trait;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use cliunit_common::handler::blocking_read;
use cliunit_common::{
    parsing, template, Cli, Command, ConfigReader, ConfigWriter, InstanceIdentifier, ListReader,
    ReadContext, ReadError, ReadResult, WriteContext, WriteError, WriteResult,
};
use cliunit_model::vlan::{VlanConfig, VlanStatus};
use cliunit_types::VlanId;

use crate::unit::send_config;

pub const SH_VLANS: &str = "show running-config | section ^vlan";

static VLAN_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^vlan (?<ids>\d[\d,-]*)$").expect("Invalid regex pattern"));
static NAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*name (?<name>\S+)$").expect("Invalid regex pattern"));
static SUSPEND_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*state suspend$").expect("Invalid regex pattern"));

const WRITE_TEMPLATE: &str = "\
configure terminal
vlan {{ data.vlan_id }}
{% if data.name %}
name {{ data.name }}
{% elif before.name %}
no name
{% endif %}
{% if data.status == 'SUSPENDED' %}
state suspend
{% elif before.status == 'SUSPENDED' %}
state active
{% endif %}
end";

const DELETE_TEMPLATE: &str = "\
configure terminal
no vlan {{ before.vlan_id }}
end";

fn vlan_key(id: &InstanceIdentifier) -> ReadResult<VlanId> {
    id.key_of("vlan")
        .and_then(|key| key.parse().ok())
        .ok_or_else(|| ReadError::unsupported(id))
}

fn header_ids(header: &str) -> Vec<VlanId> {
    VLAN_LINE
        .captures(header)
        .and_then(|c| VlanId::parse_list(&c["ids"]).ok())
        .unwrap_or_default()
}

pub fn parse_vlan_ids(output: &str) -> Vec<VlanId> {
    parsing::parse_fields(output, &VLAN_LINE, |c| VlanId::parse_list(&c["ids"]).ok())
        .into_iter()
        .flatten()
        .sorted()
        .dedup()
        .collect()
}

pub fn parse_vlan(output: &str, config: &mut VlanConfig) {
    let Some(section) = parsing::split_sections(output, &VLAN_LINE)
        .into_iter()
        .find(|section| header_ids(section.header).contains(&config.vlan_id))
    else {
        return;
    };
    let body = section.body_text();
    config.name = parsing::parse_field(&body, &NAME_LINE, |c| Some(c["name"].to_string()));
    config.status = Some(if parsing::contains_line(&body, &SUSPEND_LINE) {
        VlanStatus::Suspended
    } else {
        VlanStatus::Active
    });
}

/// VLANs exist only in the default network instance on IOS.
pub struct VlanReader {
    cli: Arc<dyn Cli>,
}

impl VlanReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ListReader for VlanReader {
    type Key = VlanId;

    async fn get_all_ids(
        &self,
        id: &InstanceIdentifier,
        ctx: &ReadContext,
    ) -> ReadResult<Vec<VlanId>> {
        if id.key_of("network-instance") != Some(cliunit_model::DEFAULT_NETWORK_INSTANCE) {
            return Ok(Vec::new());
        }
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_VLANS), ctx).await?;
        Ok(parse_vlan_ids(&output))
    }
}

pub struct VlanConfigReader {
    cli: Arc<dyn Cli>,
}

impl VlanConfigReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigReader for VlanConfigReader {
    type Data = VlanConfig;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut VlanConfig,
        ctx: &ReadContext,
    ) -> ReadResult<()> {
        data.vlan_id = vlan_key(id)?;
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_VLANS), ctx).await?;
        parse_vlan(&output, data);
        Ok(())
    }
}

pub struct VlanConfigWriter {
    cli: Arc<dyn Cli>,
}

impl VlanConfigWriter {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigWriter for VlanConfigWriter {
    type Data = VlanConfig;

    async fn write_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &VlanConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = template::render(WRITE_TEMPLATE, None::<&VlanConfig>, Some(data))?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn update_current_attributes(
        &self,
        id: &InstanceIdentifier,
        before: &VlanConfig,
        after: &VlanConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        if before.vlan_id != after.vlan_id {
            return Err(WriteError::update_failed(id, "VLAN id cannot be changed"));
        }
        let commands = template::render(WRITE_TEMPLATE, Some(before), Some(after))?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn delete_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &VlanConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        if data.vlan_id == VlanId::DEFAULT {
            return Err(WriteError::delete_failed(id, "default VLAN cannot be deleted"));
        }
        let commands = template::render(DELETE_TEMPLATE, Some(data), None::<&VlanConfig>)?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliunit_model::paths;
    use cliunit_test::{commands, CommandVerifier, MockCli};
    use pretty_assertions::assert_eq;

    const OUTPUT: &str = "\
vlan 10
 name users
vlan 20
 name voice
 state suspend
vlan 30,40-41
vlan internal allocation policy ascending
";

    fn vlan(id: u16) -> VlanId {
        VlanId::new(id).unwrap()
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(
            parse_vlan_ids(OUTPUT),
            vec![vlan(10), vlan(20), vlan(30), vlan(40), vlan(41)]
        );
    }

    #[test]
    fn test_parse_vlan() {
        let mut config = VlanConfig::new(vlan(20));
        parse_vlan(OUTPUT, &mut config);
        assert_eq!(
            config,
            VlanConfig {
                vlan_id: vlan(20),
                name: Some("voice".into()),
                status: Some(VlanStatus::Suspended),
            }
        );

        let mut config = VlanConfig::new(vlan(41));
        parse_vlan(OUTPUT, &mut config);
        assert_eq!(config.name, None);
        assert_eq!(config.status, Some(VlanStatus::Active));

        let mut config = VlanConfig::new(vlan(99));
        parse_vlan(OUTPUT, &mut config);
        assert_eq!(config, VlanConfig::new(vlan(99)));
    }

    #[tokio::test]
    async fn test_vrf_has_no_vlans() {
        let cli = Arc::new(MockCli::new().with_output(SH_VLANS, OUTPUT));
        let reader = VlanReader::new(cli.clone());
        let ids = reader
            .get_all_ids(&paths::vlans("BLUE"), &ReadContext::new())
            .await
            .unwrap();
        assert!(ids.is_empty());
        CommandVerifier::new(&cli).assert_nothing_sent().unwrap();
    }

    #[tokio::test]
    async fn test_update() {
        let cli = Arc::new(MockCli::new());
        let writer = VlanConfigWriter::new(cli.clone());
        let before = VlanConfig {
            name: Some("voice".into()),
            status: Some(VlanStatus::Suspended),
            ..VlanConfig::new(vlan(20))
        };
        let after = VlanConfig {
            status: Some(VlanStatus::Active),
            ..VlanConfig::new(vlan(20))
        };

        writer
            .update_current_attributes(
                &paths::vlan_config("default", 20),
                &before,
                &after,
                &WriteContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            cli.sent_commands(),
            vec![commands(&["configure terminal", "vlan 20", "no name", "state active", "end"])]
        );
    }

    #[tokio::test]
    async fn test_delete_default_vlan() {
        let cli = Arc::new(MockCli::new());
        let writer = VlanConfigWriter::new(cli.clone());
        let result = writer
            .delete_current_attributes(
                &paths::vlan_config("default", 1),
                &VlanConfig::default(),
                &WriteContext::new(),
            )
            .await;
        assert!(matches!(result, Err(WriteError::DeleteFailed { .. })));

        writer
            .delete_current_attributes(
                &paths::vlan_config("default", 30),
                &VlanConfig::new(vlan(30)),
                &WriteContext::new(),
            )
            .await
            .unwrap();
        assert_eq!(
            cli.sent_commands(),
            vec![commands(&["configure terminal", "no vlan 30", "end"])]
        );
    }
}
