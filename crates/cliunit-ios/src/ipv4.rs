//! Interface IPv4 addresses.
//!
//! IOS keeps one primary and any number of secondary addresses per
//! interface. Secondaries must be removed before the primary and added
//! after it, so the writer orders the diff accordingly.
//!
//! Subinterface 0 is the interface itself; subinterface N is the IOS
//! subinterface `NAME.N`.

use async_trait::async_trait;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::net::Ipv4Addr;
use std::sync::Arc;

use cliunit_common::handler::blocking_read;
use cliunit_common::{
    parsing, template, Cli, Command, ConfigReader, ConfigWriter, InstanceIdentifier, ReadContext,
    ReadError, ReadResult, WriteContext, WriteError, WriteResult,
};
use cliunit_model::interfaces::{Ipv4AddressConfig, Ipv4Addresses};
use cliunit_types::mask_to_prefix_len;

use crate::interfaces::sh_interface;
use crate::unit::send_config;

static ADDRESS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*ip address (?<ip>\d+\.\d+\.\d+\.\d+) (?<mask>\d+\.\d+\.\d+\.\d+)(?<secondary> secondary)?$")
        .expect("Invalid regex pattern")
});

const WRITE_TEMPLATE: &str = "\
configure terminal
interface {{ name }}
{% for a in removed %}
no ip address {{ a.ip }} {{ a.prefix_length | netmask }}{% if a.secondary %} secondary{% endif %}

{% endfor %}
{% for a in added %}
ip address {{ a.ip }} {{ a.prefix_length | netmask }}{% if a.secondary %} secondary{% endif %}

{% endfor %}
end";

const DELETE_TEMPLATE: &str = "\
configure terminal
interface {{ name }}
no ip address
end";

/// The IOS interface an address path refers to.
fn ios_interface(id: &InstanceIdentifier) -> Option<String> {
    let name = id.key_of("interface")?;
    match id.key_of("subinterface") {
        None | Some("0") => Some(name.to_string()),
        Some(index) => Some(format!("{}.{}", name, index)),
    }
}

pub fn parse_addresses(output: &str) -> Vec<Ipv4AddressConfig> {
    parsing::parse_fields(output, &ADDRESS_LINE, |c| {
        let ip: Ipv4Addr = c["ip"].parse().ok()?;
        let mask: Ipv4Addr = c["mask"].parse().ok()?;
        Some(Ipv4AddressConfig {
            ip,
            prefix_length: mask_to_prefix_len(mask).ok()?,
            secondary: c.name("secondary").is_some(),
        })
    })
}

pub struct Ipv4AddressReader {
    cli: Arc<dyn Cli>,
}

impl Ipv4AddressReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigReader for Ipv4AddressReader {
    type Data = Ipv4Addresses;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut Ipv4Addresses,
        ctx: &ReadContext,
    ) -> ReadResult<()> {
        let name = ios_interface(id).ok_or_else(|| ReadError::unsupported(id))?;
        let output =
            blocking_read(self.cli.as_ref(), id, &Command::new(sh_interface(&name)), ctx).await?;
        data.address = parse_addresses(&output);
        Ok(())
    }
}

pub struct Ipv4AddressWriter {
    cli: Arc<dyn Cli>,
}

impl Ipv4AddressWriter {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }

    fn validate(id: &InstanceIdentifier, data: &Ipv4Addresses) -> WriteResult<()> {
        if data.address.iter().filter(|a| !a.secondary).count() > 1 {
            return Err(WriteError::invalid_data(id, "more than one primary address"));
        }
        if let Some(a) = data.address.iter().find(|a| a.prefix_length > 32) {
            return Err(WriteError::invalid_data(
                id,
                format!("invalid prefix length {}", a.prefix_length),
            ));
        }
        Ok(())
    }

    /// Renders the change between two address sets.
    pub fn render(
        id: &InstanceIdentifier,
        before: &Ipv4Addresses,
        after: &Ipv4Addresses,
    ) -> WriteResult<String> {
        Self::validate(id, after)?;
        let name = ios_interface(id).ok_or_else(|| WriteError::unsupported(id))?;

        // Secondaries out first, primary in first.
        let removed = before
            .address
            .iter()
            .filter(|a| !after.address.contains(a))
            .sorted_by_key(|a| !a.secondary)
            .collect_vec();
        let added = after
            .address
            .iter()
            .filter(|a| !before.address.contains(a))
            .sorted_by_key(|a| a.secondary)
            .collect_vec();

        Ok(template::render_with(
            WRITE_TEMPLATE,
            json!({ "name": name, "removed": removed, "added": added }),
        )?)
    }
}

#[async_trait]
impl ConfigWriter for Ipv4AddressWriter {
    type Data = Ipv4Addresses;

    async fn write_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &Ipv4Addresses,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = Self::render(id, &Ipv4Addresses::default(), data)?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn update_current_attributes(
        &self,
        id: &InstanceIdentifier,
        before: &Ipv4Addresses,
        after: &Ipv4Addresses,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = Self::render(id, before, after)?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn delete_current_attributes(
        &self,
        id: &InstanceIdentifier,
        _data: &Ipv4Addresses,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let name = ios_interface(id).ok_or_else(|| WriteError::unsupported(id))?;
        let commands = template::render_with(DELETE_TEMPLATE, json!({ "name": name }))?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}
