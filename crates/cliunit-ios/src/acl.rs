//! Extended IPv4 access lists.
//!
//! Entries are read from `ip access-list extended NAME` blocks. Entries
//! printed without a sequence number get the number IOS would assign
//! (previous + 10).

use async_trait::async_trait;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::iter::Peekable;
use std::net::{IpAddr, Ipv4Addr};
use std::str::SplitWhitespace;
use std::sync::Arc;

use cliunit_common::handler::blocking_read;
use cliunit_common::{
    parsing, template, Cli, Command, ConfigReader, ConfigWriter, InstanceIdentifier, ListReader,
    ReadContext, ReadError, ReadResult, WriteContext, WriteError, WriteResult,
};
use cliunit_model::acl::{
    AclAddress, AclEntries, AclEntry, AclSetConfig, AclType, ForwardingAction, IpProtocol,
};
use cliunit_types::{mask_to_prefix_len, IpPrefix};

use crate::unit::send_config;

pub const SH_ACLS: &str = "show running-config | section ^ip access-list extended";

static ACL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ip access-list extended (?<name>\S+)$").expect("Invalid regex pattern")
});
static REMARK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*remark (?<text>.+)$").expect("Invalid regex pattern"));
static ENTRY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?<seq>\d+) )?(?<action>permit|deny) (?<rest>.+)$")
        .expect("Invalid regex pattern")
});

const SEQUENCE_STEP: u32 = 10;

/// Well-known port names IOS prints instead of numbers.
const PORT_NAMES: &[(&str, u16)] = &[
    ("ftp-data", 20),
    ("ftp", 21),
    ("ssh", 22),
    ("telnet", 23),
    ("smtp", 25),
    ("domain", 53),
    ("tftp", 69),
    ("www", 80),
    ("pop3", 110),
    ("ntp", 123),
    ("snmp", 161),
    ("bgp", 179),
    ("syslog", 514),
];

const SET_TEMPLATE: &str = "\
configure terminal
ip access-list extended {{ data.name }}
{% if before.description and before.description != data.description %}
no remark {{ before.description }}
{% endif %}
{% if data.description and data.description != before.description %}
remark {{ data.description }}
{% endif %}
end";

const SET_DELETE_TEMPLATE: &str = "\
configure terminal
no ip access-list extended {{ before.name }}
end";

const ENTRIES_TEMPLATE: &str = "\
configure terminal
ip access-list extended {{ name }}
{% for seq in removed %}
no {{ seq }}
{% endfor %}
{% for line in added %}
{{ line }}
{% endfor %}
end";

fn acl_key(id: &InstanceIdentifier) -> Option<&str> {
    id.key_of("acl-set")
}

fn parse_port(word: &str) -> Option<u16> {
    word.parse().ok().or_else(|| {
        PORT_NAMES
            .iter()
            .find(|(name, _)| *name == word)
            .map(|(_, port)| *port)
    })
}

fn parse_address(tokens: &mut Peekable<SplitWhitespace<'_>>) -> Option<AclAddress> {
    match tokens.next()? {
        "any" => Some(AclAddress::Any),
        "host" => tokens.next()?.parse().ok().map(AclAddress::Host),
        address => {
            let address: Ipv4Addr = address.parse().ok()?;
            let wildcard: Ipv4Addr = tokens.next()?.parse().ok()?;
            let prefix_len = mask_to_prefix_len(Ipv4Addr::from(!u32::from(wildcard))).ok()?;
            IpPrefix::new(IpAddr::V4(address), prefix_len)
                .ok()
                .map(AclAddress::Prefix)
        }
    }
}

/// Parses the part of an entry after `permit`/`deny`.
///
/// Entries the model cannot express (source ports, port ranges) yield
/// `None`. Trailing options such as `log` are ignored.
fn parse_entry(sequence_id: u32, action: ForwardingAction, rest: &str) -> Option<AclEntry> {
    let mut tokens = rest.split_whitespace().peekable();
    let protocol = IpProtocol::from_keyword(tokens.next()?)?;
    let source = parse_address(&mut tokens)?;
    if matches!(tokens.peek(), Some(&("eq" | "range" | "gt" | "lt" | "neq"))) {
        return None;
    }
    let destination = parse_address(&mut tokens)?;
    let destination_port = match tokens.next() {
        Some("eq") => Some(parse_port(tokens.next()?)?),
        Some("range" | "gt" | "lt" | "neq") => return None,
        _ => None,
    };

    Some(AclEntry {
        sequence_id,
        action,
        protocol,
        source,
        destination,
        destination_port,
    })
}

pub fn parse_acl_names(output: &str) -> Vec<String> {
    parsing::parse_keys(output, &ACL_LINE, |c| Some(c["name"].to_string()))
}

pub fn parse_acl_set(output: &str, config: &mut AclSetConfig) {
    config.acl_type = AclType::AclIpv4;
    if let Some(section) = parsing::find_section(output, &ACL_LINE, "name", &config.name) {
        config.description =
            parsing::parse_field(&section.body_text(), &REMARK_LINE, |c| Some(c["text"].to_string()));
    }
}

pub fn parse_acl_entries(output: &str, name: &str) -> Vec<AclEntry> {
    let Some(section) = parsing::find_section(output, &ACL_LINE, "name", name) else {
        return Vec::new();
    };

    let mut last_sequence: u32 = 0;
    let mut entries = Vec::new();
    for caps in section.body.iter().filter_map(|line| ENTRY_LINE.captures(line)) {
        let sequence_id = caps
            .name("seq")
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(last_sequence.saturating_add(SEQUENCE_STEP));
        last_sequence = sequence_id;

        let action = match &caps["action"] {
            "permit" => ForwardingAction::Accept,
            _ => ForwardingAction::Drop,
        };
        if let Some(entry) = parse_entry(sequence_id, action, &caps["rest"]) {
            entries.push(entry);
        }
    }
    entries
}

fn render_address(address: &AclAddress) -> Result<String, String> {
    match address {
        AclAddress::Any => Ok("any".to_string()),
        AclAddress::Host(IpAddr::V4(ip)) => Ok(format!("host {}", ip)),
        AclAddress::Prefix(prefix) => match (prefix.address(), prefix.netmask()) {
            (IpAddr::V4(ip), Some(mask)) => {
                Ok(format!("{} {}", ip, Ipv4Addr::from(!u32::from(mask))))
            }
            _ => Err(format!("{} is not an IPv4 prefix", prefix)),
        },
        AclAddress::Host(ip) => Err(format!("{} is not an IPv4 address", ip)),
    }
}

/// Renders an entry as an IOS ACE line: `10 permit tcp any host 10.0.0.1 eq 22`.
pub fn render_entry(entry: &AclEntry) -> Result<String, String> {
    let action = match entry.action {
        ForwardingAction::Accept => "permit",
        ForwardingAction::Drop => "deny",
    };
    let mut line = format!(
        "{} {} {} {} {}",
        entry.sequence_id,
        action,
        entry.protocol,
        render_address(&entry.source)?,
        render_address(&entry.destination)?
    );
    if let Some(port) = entry.destination_port {
        if !entry.protocol.has_ports() {
            return Err(format!("protocol {} has no ports", entry.protocol));
        }
        line.push_str(&format!(" eq {}", port));
    }
    Ok(line)
}

pub struct AclSetReader {
    cli: Arc<dyn Cli>,
}

impl AclSetReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ListReader for AclSetReader {
    type Key = String;

    async fn get_all_ids(
        &self,
        id: &InstanceIdentifier,
        ctx: &ReadContext,
    ) -> ReadResult<Vec<String>> {
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_ACLS), ctx).await?;
        Ok(parse_acl_names(&output))
    }
}

pub struct AclSetConfigReader {
    cli: Arc<dyn Cli>,
}

impl AclSetConfigReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigReader for AclSetConfigReader {
    type Data = AclSetConfig;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut AclSetConfig,
        ctx: &ReadContext,
    ) -> ReadResult<()> {
        data.name = acl_key(id)
            .ok_or_else(|| ReadError::unsupported(id))?
            .to_string();
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_ACLS), ctx).await?;
        parse_acl_set(&output, data);
        Ok(())
    }
}

pub struct AclEntriesReader {
    cli: Arc<dyn Cli>,
}

impl AclEntriesReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigReader for AclEntriesReader {
    type Data = AclEntries;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut AclEntries,
        ctx: &ReadContext,
    ) -> ReadResult<()> {
        let name = acl_key(id).ok_or_else(|| ReadError::unsupported(id))?;
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_ACLS), ctx).await?;
        data.entry = parse_acl_entries(&output, name);
        Ok(())
    }
}

pub struct AclSetConfigWriter {
    cli: Arc<dyn Cli>,
}

impl AclSetConfigWriter {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }

    fn check_type(id: &InstanceIdentifier, data: &AclSetConfig) -> WriteResult<()> {
        if data.acl_type != AclType::AclIpv4 {
            return Err(WriteError::invalid_data(id, "only IPv4 extended access lists are supported"));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigWriter for AclSetConfigWriter {
    type Data = AclSetConfig;

    async fn write_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &AclSetConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        Self::check_type(id, data)?;
        let commands = template::render(SET_TEMPLATE, None::<&AclSetConfig>, Some(data))?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn update_current_attributes(
        &self,
        id: &InstanceIdentifier,
        before: &AclSetConfig,
        after: &AclSetConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        Self::check_type(id, after)?;
        let commands = template::render(SET_TEMPLATE, Some(before), Some(after))?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn delete_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &AclSetConfig,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = template::render(SET_DELETE_TEMPLATE, Some(data), None::<&AclSetConfig>)?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}

/// Writes ACL entries as a diff: changed and removed sequence numbers are
/// cleared with `no SEQ`, new and changed entries are written in full.
pub struct AclEntriesWriter {
    cli: Arc<dyn Cli>,
}

impl AclEntriesWriter {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }

    pub fn render(
        id: &InstanceIdentifier,
        before: &AclEntries,
        after: &AclEntries,
    ) -> WriteResult<String> {
        let name = acl_key(id).ok_or_else(|| WriteError::unsupported(id))?;
        if let Some(seq) = after.entry.iter().map(|e| e.sequence_id).duplicates().next() {
            return Err(WriteError::invalid_data(id, format!("duplicate sequence id {}", seq)));
        }

        let removed = before
            .entry
            .iter()
            .filter(|e| !after.entry.contains(e))
            .map(|e| e.sequence_id)
            .sorted()
            .collect_vec();
        let added = after
            .entry
            .iter()
            .filter(|e| !before.entry.contains(e))
            .sorted_by_key(|e| e.sequence_id)
            .map(render_entry)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|message| WriteError::invalid_data(id, message))?;

        Ok(template::render_with(
            ENTRIES_TEMPLATE,
            json!({ "name": name, "removed": removed, "added": added }),
        )?)
    }
}

#[async_trait]
impl ConfigWriter for AclEntriesWriter {
    type Data = AclEntries;

    async fn write_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &AclEntries,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = Self::render(id, &AclEntries::default(), data)?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn update_current_attributes(
        &self,
        id: &InstanceIdentifier,
        before: &AclEntries,
        after: &AclEntries,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = Self::render(id, before, after)?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn delete_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &AclEntries,
        _ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = Self::render(id, data, &AclEntries::default())?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}
