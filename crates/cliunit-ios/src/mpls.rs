//! MPLS-TE tunnels, configured as `interface TunnelN` with
//! `tunnel mode mpls traffic-eng`. The tunnel name is the interface number.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use cliunit_common::handler::blocking_read;
use cliunit_common::parsing::{self, Section};
use cliunit_common::{
    template, Cli, Command, ConfigReader, ConfigWriter, InstanceIdentifier, ListReader,
    ReadContext, ReadError, ReadResult, WriteContext, WriteError, WriteResult,
};
use cliunit_model::mpls::TeTunnelConfig;

use crate::unit::send_config;

pub const SH_TUNNELS: &str = "show running-config | section ^interface Tunnel";

static TUNNEL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^interface Tunnel(?<id>\d+)$").expect("Invalid regex pattern"));
static TE_MODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*tunnel mode mpls traffic-eng$").expect("Invalid regex pattern")
});
static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*description (?<desc>.+)$").expect("Invalid regex pattern"));
static DESTINATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*tunnel destination (?<ip>\S+)$").expect("Invalid regex pattern")
});
static AUTOROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*tunnel mpls traffic-eng autoroute announce$").expect("Invalid regex pattern")
});
static METRIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*tunnel mpls traffic-eng autoroute metric (?:absolute )?(?<metric>\d+)$")
        .expect("Invalid regex pattern")
});
static BANDWIDTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*tunnel mpls traffic-eng bandwidth (?<kbps>\d+)$").expect("Invalid regex pattern")
});
static PRIORITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*tunnel mpls traffic-eng priority (?<setup>\d) (?<hold>\d)$")
        .expect("Invalid regex pattern")
});

const WRITE_TEMPLATE: &str = "\
configure terminal
interface Tunnel{{ data.name }}
{% if not before %}
tunnel mode mpls traffic-eng
{% endif %}
{% if data.description %}
description {{ data.description }}
{% elif before.description %}
no description
{% endif %}
{% if data.destination %}
tunnel destination {{ data.destination }}
{% elif before.destination %}
no tunnel destination
{% endif %}
{% if data.autoroute_announce %}
tunnel mpls traffic-eng autoroute announce
{% if data.metric is defined %}
tunnel mpls traffic-eng autoroute metric {{ data.metric }}
{% elif before.metric is defined %}
no tunnel mpls traffic-eng autoroute metric
{% endif %}
{% elif before.autoroute_announce %}
no tunnel mpls traffic-eng autoroute announce
{% endif %}
{% if data.bandwidth_kbps is defined %}
tunnel mpls traffic-eng bandwidth {{ data.bandwidth_kbps }}
{% elif before.bandwidth_kbps is defined %}
no tunnel mpls traffic-eng bandwidth
{% endif %}
{% if data.setup_priority is defined %}
tunnel mpls traffic-eng priority {{ data.setup_priority }} {{ data.hold_priority if data.hold_priority is defined else data.setup_priority }}
{% elif before.setup_priority is defined %}
no tunnel mpls traffic-eng priority
{% endif %}
end";

const DELETE_TEMPLATE: &str = "\
configure terminal
no interface Tunnel{{ before.name }}
end";

fn te_sections(output: &str) -> impl Iterator<Item = Section<'_>> {
    parsing::split_sections(output, &TUNNEL_LINE)
        .into_iter()
        .filter(|section| section.body.iter().any(|line| TE_MODE.is_match(line)))
}

pub fn parse_tunnel_ids(output: &str) -> Vec<String> {
    let mut ids: Vec<u32> = te_sections(output)
        .filter_map(|section| {
            TUNNEL_LINE
                .captures(section.header)
                .and_then(|c| c["id"].parse().ok())
        })
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids.iter().map(ToString::to_string).collect()
}

pub fn parse_tunnel(output: &str, config: &mut TeTunnelConfig) {
    let Some(section) = te_sections(output).find(|section| {
        TUNNEL_LINE
            .captures(section.header)
            .is_some_and(|c| c["id"] == config.name)
    }) else {
        return;
    };

    let body = section.body_text();
    config.description = parsing::parse_field(&body, &DESCRIPTION, |c| Some(c["desc"].to_string()));
    config.destination = parsing::parse_field(&body, &DESTINATION, |c| c["ip"].parse().ok());
    config.autoroute_announce = parsing::contains_line(&body, &AUTOROUTE);
    config.metric = parsing::parse_field(&body, &METRIC, |c| c["metric"].parse().ok());
    config.bandwidth_kbps = parsing::parse_field(&body, &BANDWIDTH, |c| c["kbps"].parse().ok());
    if let Some((setup, hold)) = parsing::parse_field(&body, &PRIORITY, |c| {
        Some((c["setup"].parse().ok()?, c["hold"].parse().ok()?))
    }) {
        config.setup_priority = Some(setup);
        config.hold_priority = Some(hold);
    }
}

fn tunnel_key(id: &InstanceIdentifier) -> ReadResult<&str> {
    id.key_of("tunnel").ok_or_else(|| ReadError::unsupported(id))
}

pub struct TeTunnelReader {
    cli: Arc<dyn Cli>,
}

impl TeTunnelReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ListReader for TeTunnelReader {
    type Key = String;

    async fn get_all_ids(
        &self,
        id: &InstanceIdentifier,
        ctx: &ReadContext,
    ) -> ReadResult<Vec<String>> {
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_TUNNELS), ctx).await?;
        Ok(parse_tunnel_ids(&output))
    }
}

pub struct TeTunnelConfigReader {
    cli: Arc<dyn Cli>,
}

impl TeTunnelConfigReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigReader for TeTunnelConfigReader {
    type Data = TeTunnelConfig;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut TeTunnelConfig,
        ctx: &ReadContext,
    ) -> ReadResult<()> {
        data.name = tunnel_key(id)?.to_string();
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_TUNNELS), ctx).await?;
        parse_tunnel(&output, data);
        Ok(())
    }
}

pub struct TeTunnelConfigWriter {
    cli: Arc<dyn Cli>,
}

impl TeTunnelConfigWriter {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }

    fn validate(id: &InstanceIdentifier, data: &TeTunnelConfig) -> WriteResult<()> {
        if data.name.parse::<u32>().is_err() {
            return Err(WriteError::invalid_data(
                id,
                format!("tunnel name must be the tunnel number, got {}", data.name),
            ));
        }
        let out_of_range = [data.setup_priority, data.hold_priority]
            .iter()
            .flatten()
            .any(|p| *p > 7);
        if out_of_range {
            return Err(WriteError::invalid_data(id, "priorities range from 0 to 7"));
        }
        if data.metric.is_some() && !data.autoroute_announce {
            return Err(WriteError::invalid_data(id, "metric requires autoroute announce"));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigWriter for TeTunnelConfigWriter {
    type Data = TeTunnelConfig;

    async fn write_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &TeTunnelConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        Self::validate(id, data)?;
        let commands = template::render(WRITE_TEMPLATE, None::<&TeTunnelConfig>, Some(data))?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn update_current_attributes(
        &self,
        id: &InstanceIdentifier,
        before: &TeTunnelConfig,
        after: &TeTunnelConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        Self::validate(id, after)?;
        let commands = template::render(WRITE_TEMPLATE, Some(before), Some(after))?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn delete_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &TeTunnelConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = template::render(DELETE_TEMPLATE, Some(data), None::<&TeTunnelConfig>)?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}
