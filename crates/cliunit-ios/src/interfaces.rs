//! Interface list and interface config.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use cliunit_common::handler::blocking_read;
use cliunit_common::{
    parsing, template, Cli, Command, ConfigReader, ConfigWriter, InstanceIdentifier, ListReader,
    ReadContext, ReadError, ReadResult, WriteContext, WriteError, WriteResult,
};
use cliunit_model::interfaces::{InterfaceConfig, InterfaceType};

use crate::unit::send_config;

pub const SH_INTERFACES: &str = "show running-config | include ^interface";

pub fn sh_interface(name: &str) -> String {
    format!("show running-config interface {}", name)
}

static INTERFACE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^interface (?<name>\S+)$").expect("Invalid regex pattern"));
static DESCRIPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*description (?<desc>.+)$").expect("Invalid regex pattern"));
static MTU_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*mtu (?<mtu>\d+)$").expect("Invalid regex pattern"));
static SHUTDOWN_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*shutdown$").expect("Invalid regex pattern"));

const WRITE_TEMPLATE: &str = "\
configure terminal
interface {{ data.name }}
{% if data.description %}
description {{ data.description }}
{% elif before.description %}
no description
{% endif %}
{% if data.mtu %}
mtu {{ data.mtu }}
{% elif before.mtu %}
no mtu
{% endif %}
{% if data.enabled is defined %}
{% if data.enabled %}
no shutdown
{% else %}
shutdown
{% endif %}
{% elif before.enabled is defined and not before.enabled %}
no shutdown
{% endif %}
end";

const DELETE_TEMPLATE: &str = "\
configure terminal
no interface {{ before.name }}
end";

pub(crate) fn interface_key(id: &InstanceIdentifier) -> ReadResult<&str> {
    id.key_of("interface").ok_or_else(|| ReadError::unsupported(id))
}

/// Lists configured interfaces. Subinterfaces (`Gi0/1.100`) are skipped.
pub struct InterfaceReader {
    cli: Arc<dyn Cli>,
}

impl InterfaceReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

pub fn parse_interface_ids(output: &str) -> Vec<String> {
    parsing::parse_keys(output, &INTERFACE_LINE, |c| {
        let name = &c["name"];
        (!name.contains('.')).then(|| name.to_string())
    })
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

pub fn parse_interface(output: &str, config: &mut InterfaceConfig) {
    config.if_type = Some(InterfaceType::from_name(&config.name));
    if !parsing::contains_line(output, &INTERFACE_LINE) {
        return;
    }
    config.description =
        parsing::parse_field(output, &DESCRIPTION_LINE, |c| Some(c["desc"].to_string()));
    config.mtu = parsing::parse_field(output, &MTU_LINE, |c| c["mtu"].parse().ok());
    config.enabled = Some(!parsing::contains_line(output, &SHUTDOWN_LINE));
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
        let name = interface_key(id)?;
        let output =
            blocking_read(self.cli.as_ref(), id, &Command::new(sh_interface(name)), ctx).await?;
        data.name = name.to_string();
        parse_interface(&output, data);
        Ok(())
    }
}

/// Writes interface config. Only virtual interfaces can be deleted.
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
        let if_type = data
            .if_type
            .unwrap_or_else(|| InterfaceType::from_name(&data.name));
        if !if_type.is_virtual() {
            return Err(WriteError::delete_failed(
                id,
                format!("physical interface {} cannot be deleted", data.name),
            ));
        }
        debug!(interface = %data.name, "Removing virtual interface");
        let commands = template::render(DELETE_TEMPLATE, Some(data), None::<&InterfaceConfig>)?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}
