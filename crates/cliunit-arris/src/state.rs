//! Cable-mac operational state from `show interface cable-mac N`.
//!
//! The output has a status line, a modem summary and two channel tables.
//! Rows of both tables start the same way (`chan admin oper frequency`),
//! so each row is attributed to the table header nearest above it.
//!
//! ```text
//! cable-mac 1   Admin: up   Oper: up
//! Modems: total 120, online 115
//!
//! Downstream channels
//! Chan     Admin Oper  Frequency(Hz)  Power(dBmV)  Modulation
//! 1/0/0    up    up    555000000      50.0         qam256
//!
//! Upstream channels
//! Chan     Admin Oper  Frequency(Hz)  Width(Hz)
//! 1/0/0    up    up    20000000       6400000
//! ```

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use cliunit_common::handler::blocking_read;
use cliunit_common::{parsing, Cli, Command, ConfigReader, InstanceIdentifier, ReadContext, ReadResult};
use cliunit_model::cable::{CableMacState, DownstreamChannel, UpstreamChannel};
use cliunit_model::Status;

use crate::cable_mac::cable_mac_key;

pub fn sh_cable_mac(id: u32) -> String {
    format!("show interface cable-mac {}", id)
}

static STATUS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^cable-mac \d+\s+Admin: (?<admin>\w+)\s+Oper: (?<oper>\w+)$")
        .expect("Invalid regex pattern")
});
static MODEMS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Modems: total (?<total>\d+), online (?<online>\d+)$").expect("Invalid regex pattern")
});
static TABLE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?<direction>Downstream|Upstream) channels$").expect("Invalid regex pattern")
});
static CHANNEL_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?<chan>\d+/\d+/\d+)\s+(?<admin>\w+)\s+(?<oper>\w+)\s+(?<freq>\d+)\s+(?<rest>.+)$")
        .expect("Invalid regex pattern")
});
static DOWNSTREAM_REST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?<power>-?\d+(?:\.\d+)?)\s+(?<modulation>\S+)$").expect("Invalid regex pattern")
});
static UPSTREAM_REST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?<width>\d+)$").expect("Invalid regex pattern"));

enum Channel {
    Downstream(DownstreamChannel),
    Upstream(UpstreamChannel),
}

fn parse_row(direction: &str, row: &regex::Captures<'_>) -> Option<Channel> {
    let id = row["chan"].to_string();
    let admin_status = Status::from_word(&row["admin"]);
    let oper_status = Status::from_word(&row["oper"]);
    let frequency_hz = row["freq"].parse().ok();
    let rest = row["rest"].trim();

    match direction {
        "Downstream" => {
            let caps = DOWNSTREAM_REST.captures(rest);
            Some(Channel::Downstream(DownstreamChannel {
                id,
                admin_status,
                oper_status,
                frequency_hz,
                power_dbmv: caps.as_ref().and_then(|c| c["power"].parse().ok()),
                modulation: caps.as_ref().map(|c| c["modulation"].to_string()),
            }))
        }
        "Upstream" => Some(Channel::Upstream(UpstreamChannel {
            id,
            admin_status,
            oper_status,
            frequency_hz,
            width_hz: UPSTREAM_REST
                .captures(rest)
                .and_then(|c| c["width"].parse().ok()),
        })),
        _ => None,
    }
}

pub fn parse_state(output: &str, state: &mut CableMacState) {
    if let Some((admin, oper)) = parsing::parse_field(output, &STATUS_LINE, |c| {
        Some((Status::from_word(&c["admin"]), Status::from_word(&c["oper"])))
    }) {
        state.admin_status = admin;
        state.oper_status = oper;
    }
    if let Some((total, online)) = parsing::parse_field(output, &MODEMS_LINE, |c| {
        Some((c["total"].parse().ok()?, c["online"].parse().ok()?))
    }) {
        state.modems_total = Some(total);
        state.modems_online = Some(online);
    }

    // Rows above the first table header belong to no table.
    let channels = parsing::parse_under_header(output, &TABLE_HEADER, &CHANNEL_ROW, |header, row| {
        parse_row(header.map(|h| h.name("direction"))??.as_str(), row)
    });
    for channel in channels {
        match channel {
            Channel::Downstream(ds) => state.downstream.push(ds),
            Channel::Upstream(us) => state.upstream.push(us),
        }
    }
}

pub struct CableMacStateReader {
    cli: Arc<dyn Cli>,
}

impl CableMacStateReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigReader for CableMacStateReader {
    type Data = CableMacState;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut CableMacState,
        ctx: &ReadContext,
    ) -> ReadResult<()> {
        let cable_mac = cable_mac_key(id)?;
        let output =
            blocking_read(self.cli.as_ref(), id, &Command::new(sh_cable_mac(cable_mac)), ctx).await?;
        parse_state(&output, data);
        debug!(
            cable_mac,
            downstream = data.downstream.len(),
            upstream = data.upstream.len(),
            "Parsed cable-mac state"
        );
        Ok(())
    }
}
