//! IPv4 addresses of a logical unit (`unit N family inet address A/L`).
//!
//! The subinterface key is the Junos unit number. The address flagged
//! `primary` is the primary one; without a flag Junos picks the first.

use async_trait::async_trait;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

use cliunit_common::handler::blocking_read;
use cliunit_common::{
    parsing, template, Cli, Command, ConfigReader, ConfigWriter, InstanceIdentifier, ReadContext,
    ReadError, ReadResult, WriteContext, WriteError, WriteResult,
};
use cliunit_model::interfaces::{Ipv4AddressConfig, Ipv4Addresses};
use cliunit_types::IpPrefix;

use crate::unit::{send_config, statements_under, SH_INTERFACES};

static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^family inet address (?<prefix>\d+\.\d+\.\d+\.\d+/\d+)(?<primary> primary)?$")
        .expect("Invalid regex pattern")
});

const WRITE_TEMPLATE: &str = "\
configure
{% for a in removed %}
delete {{ unit }} family inet address {{ a.ip }}/{{ a.prefix_length }}
{% endfor %}
{% for a in demoted %}
delete {{ unit }} family inet address {{ a.ip }}/{{ a.prefix_length }} primary
{% endfor %}
{% for a in added %}
set {{ unit }} family inet address {{ a.ip }}/{{ a.prefix_length }}{% if flag_primary and not a.secondary %} primary{% endif %}

{% endfor %}
commit and-quit";

const DELETE_TEMPLATE: &str = "\
configure
delete {{ unit }} family inet
commit and-quit";

/// `interfaces NAME unit N`, the statement path of a subinterface.
fn unit_path(id: &InstanceIdentifier) -> Option<String> {
    let name = id.key_of("interface")?;
    let unit = id.key_of("subinterface")?;
    Some(format!("interfaces {} unit {}", name, unit))
}

pub fn parse_addresses(output: &str, unit_path: &str) -> Vec<Ipv4AddressConfig> {
    let statements = statements_under(output, &format!("set {}", unit_path));
    let parsed: Vec<(IpPrefix, bool)> = parsing::parse_fields(&statements, &ADDRESS, |c| {
        let prefix: IpPrefix = c["prefix"].parse().ok()?;
        Some((prefix, c.name("primary").is_some()))
    });

    let explicit_primary = parsed.iter().any(|(_, primary)| *primary);
    parsed
        .into_iter()
        .enumerate()
        .filter_map(|(index, (prefix, primary))| {
            let IpAddr::V4(ip) = prefix.address() else {
                return None;
            };
            let is_primary = if explicit_primary { primary } else { index == 0 };
            Some(Ipv4AddressConfig {
                ip,
                prefix_length: prefix.prefix_len(),
                secondary: !is_primary,
            })
        })
        .collect()
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
        let unit_path = unit_path(id).ok_or_else(|| ReadError::unsupported(id))?;
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_INTERFACES), ctx).await?;
        data.address = parse_addresses(&output, &unit_path);
        debug!(unit = %unit_path, addresses = data.address.len(), "Parsed IPv4 addresses");
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

    pub fn render(
        id: &InstanceIdentifier,
        before: &Ipv4Addresses,
        after: &Ipv4Addresses,
    ) -> WriteResult<String> {
        let unit_path = unit_path(id).ok_or_else(|| WriteError::unsupported(id))?;
        if after.address.iter().filter(|a| !a.secondary).count() > 1 {
            return Err(WriteError::invalid_data(id, "more than one primary address"));
        }

        let same = |a: &Ipv4AddressConfig, b: &Ipv4AddressConfig| {
            a.ip == b.ip && a.prefix_length == b.prefix_length
        };
        let removed = before
            .address
            .iter()
            .filter(|a| !after.address.iter().any(|b| same(a, b)))
            .collect_vec();
        // A kept address losing the primary role keeps its flag unless deleted.
        let demoted = before
            .address
            .iter()
            .filter(|a| !a.secondary)
            .filter(|a| after.address.iter().any(|b| same(a, b) && b.secondary))
            .collect_vec();
        let added = after
            .address
            .iter()
            .filter(|a| !before.address.contains(a))
            .sorted_by_key(|a| a.secondary)
            .collect_vec();

        Ok(template::render_with(
            WRITE_TEMPLATE,
            json!({
                "unit": unit_path,
                "removed": removed,
                "demoted": demoted,
                "added": added,
                "flag_primary": after.address.len() > 1,
            }),
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
        let unit_path = unit_path(id).ok_or_else(|| WriteError::unsupported(id))?;
        let commands = template::render_with(DELETE_TEMPLATE, json!({ "unit": unit_path }))?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}
