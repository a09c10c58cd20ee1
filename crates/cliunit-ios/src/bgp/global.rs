use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::net::Ipv4Addr;
use std::sync::Arc;

use cliunit_common::handler::blocking_read;
use cliunit_common::{
    parsing, template, Cli, Command, ConfigReader, ConfigWriter, InstanceIdentifier, ReadContext,
    ReadResult, WriteContext, WriteError, WriteResult,
};
use cliunit_model::bgp::BgpGlobalConfig;

use super::{instance_of, network_instance_key, vrf_name, ADDRESS_FAMILY_LINE, ROUTER_BGP_LINE, SH_BGP};
use crate::unit::send_config;

static ROUTER_ID_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*bgp router-id (?<id>\S+)$").expect("Invalid regex pattern"));

const WRITE_TEMPLATE: &str = "\
configure terminal
router bgp {{ data.as }}
{% if vrf %}
address-family ipv4 vrf {{ vrf }}
{% endif %}
{% if data.router_id %}
bgp router-id {{ data.router_id }}
{% elif before.router_id %}
no bgp router-id
{% endif %}
{% if vrf %}
exit-address-family
{% endif %}
end";

const DELETE_TEMPLATE: &str = "\
configure terminal
{% if vrf %}
router bgp {{ before.as }}
no address-family ipv4 vrf {{ vrf }}
{% else %}
no router bgp {{ before.as }}
{% endif %}
end";

pub fn parse_global(output: &str, network_instance: &str, config: &mut BgpGlobalConfig) {
    config.as_number = parsing::parse_field(output, &ROUTER_BGP_LINE, |c| c["as"].parse().ok());
    config.router_id = parsing::parse_under_header(
        output,
        &ADDRESS_FAMILY_LINE,
        &ROUTER_ID_LINE,
        |header, c| {
            if instance_of(header) != network_instance {
                return None;
            }
            c["id"].parse::<Ipv4Addr>().ok()
        },
    )
    .into_iter()
    .next();
}

pub struct BgpGlobalConfigReader {
    cli: Arc<dyn Cli>,
}

impl BgpGlobalConfigReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigReader for BgpGlobalConfigReader {
    type Data = BgpGlobalConfig;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut BgpGlobalConfig,
        ctx: &ReadContext,
    ) -> ReadResult<()> {
        let network_instance = network_instance_key(id)?;
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_BGP), ctx).await?;
        parse_global(&output, network_instance, data);
        Ok(())
    }
}

pub struct BgpGlobalConfigWriter {
    cli: Arc<dyn Cli>,
}

impl BgpGlobalConfigWriter {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }

    fn render(
        id: &InstanceIdentifier,
        before: Option<&BgpGlobalConfig>,
        data: &BgpGlobalConfig,
    ) -> WriteResult<String> {
        if data.as_number.is_none() {
            return Err(WriteError::invalid_data(id, "BGP AS number is mandatory"));
        }
        let network_instance = id.key_of("network-instance").unwrap_or_default();
        Ok(template::render_with(
            WRITE_TEMPLATE,
            json!({ "before": before, "data": data, "vrf": vrf_name(network_instance) }),
        )?)
    }
}

#[async_trait]
impl ConfigWriter for BgpGlobalConfigWriter {
    type Data = BgpGlobalConfig;

    async fn write_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &BgpGlobalConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = Self::render(id, None, data)?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn update_current_attributes(
        &self,
        id: &InstanceIdentifier,
        before: &BgpGlobalConfig,
        after: &BgpGlobalConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        if before.as_number != after.as_number {
            return Err(WriteError::update_failed(
                id,
                "AS number cannot be changed, remove the BGP process first",
            ));
        }
        let commands = Self::render(id, Some(before), after)?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn delete_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &BgpGlobalConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        if data.as_number.is_none() {
            return Err(WriteError::delete_failed(id, "BGP AS number is unknown"));
        }
        let network_instance = id.key_of("network-instance").unwrap_or_default();
        let commands = template::render_with(
            DELETE_TEMPLATE,
            json!({ "before": data, "vrf": vrf_name(network_instance) }),
        )?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}
