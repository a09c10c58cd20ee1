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
    parsing, template, Cli, Command, ConfigReader, ConfigWriter, InstanceIdentifier, ListReader,
    ReadContext, ReadError, ReadResult, WriteContext, WriteError, WriteResult,
};
use cliunit_model::bgp::{BgpGlobalConfig, BgpNeighborConfig, CommunityType};
use cliunit_model::{paths, DEFAULT_NETWORK_INSTANCE};
use cliunit_types::AsNumber;

use super::{instance_of, network_instance_key, vrf_name, ADDRESS_FAMILY_LINE, SH_BGP};
use crate::unit::send_config;

static NEIGHBOR_DEFINITION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*neighbor (?<ip>\S+) (?:remote-as|peer-group) \S+$")
        .expect("Invalid regex pattern")
});
static NEIGHBOR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*neighbor (?<ip>\S+) (?<rest>.+)$").expect("Invalid regex pattern")
});
static REMOTE_AS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^remote-as (?<as>\S+)$").expect("Invalid regex pattern"));
static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^description (?<desc>.+)$").expect("Invalid regex pattern"));
static SHUTDOWN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^shutdown$").expect("Invalid regex pattern"));
static PEER_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^peer-group (?<group>\S+)$").expect("Invalid regex pattern"));
static SEND_COMMUNITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^send-community(?: (?<kind>both|standard|extended))?$")
        .expect("Invalid regex pattern")
});

const WRITE_TEMPLATE: &str = "\
configure terminal
router bgp {{ as }}
{% if vrf %}
address-family ipv4 vrf {{ vrf }}
{% endif %}
{% set n = data.neighbor_address %}
{% if data.peer_as %}
neighbor {{ n }} remote-as {{ data.peer_as }}
{% elif before.peer_as %}
no neighbor {{ n }} remote-as {{ before.peer_as }}
{% endif %}
{% if data.peer_group %}
neighbor {{ n }} peer-group {{ data.peer_group }}
{% elif before.peer_group %}
no neighbor {{ n }} peer-group {{ before.peer_group }}
{% endif %}
{% if data.description %}
neighbor {{ n }} description {{ data.description }}
{% elif before.description %}
no neighbor {{ n }} description
{% endif %}
{% if data.send_community %}
{% if before.send_community and before.send_community != data.send_community %}
no neighbor {{ n }} send-community {{ before.send_community | lower }}
{% endif %}
neighbor {{ n }} send-community {{ data.send_community | lower }}
{% elif before.send_community %}
no neighbor {{ n }} send-community {{ before.send_community | lower }}
{% endif %}
{% if data.enabled is defined %}
{% if data.enabled %}
no neighbor {{ n }} shutdown
{% else %}
neighbor {{ n }} shutdown
{% endif %}
{% endif %}
{% if vrf %}
neighbor {{ n }} activate
exit-address-family
{% endif %}
end";

const DELETE_TEMPLATE: &str = "\
configure terminal
router bgp {{ as }}
{% if vrf %}
address-family ipv4 vrf {{ vrf }}
{% endif %}
no neighbor {{ before.neighbor_address }}
{% if vrf %}
exit-address-family
{% endif %}
end";

pub fn parse_neighbor_ids(output: &str, network_instance: &str) -> Vec<IpAddr> {
    parsing::parse_under_header(
        output,
        &ADDRESS_FAMILY_LINE,
        &NEIGHBOR_DEFINITION_LINE,
        |header, c| {
            if instance_of(header) != network_instance {
                return None;
            }
            c["ip"].parse::<IpAddr>().ok()
        },
    )
    .into_iter()
    .sorted()
    .dedup()
    .collect()
}

pub fn parse_neighbor(output: &str, network_instance: &str, config: &mut BgpNeighborConfig) {
    let address = config.neighbor_address;
    let lines = parsing::parse_under_header(output, &ADDRESS_FAMILY_LINE, &NEIGHBOR_LINE, |header, c| {
        let same_neighbor = c["ip"].parse::<IpAddr>().is_ok_and(|ip| ip == address);
        (same_neighbor && instance_of(header) == network_instance).then(|| c["rest"].to_string())
    });
    if lines.is_empty() {
        return;
    }

    let text = lines.join("\n");
    config.peer_as = parsing::parse_field(&text, &REMOTE_AS, |c| c["as"].parse().ok());
    config.description = parsing::parse_field(&text, &DESCRIPTION, |c| Some(c["desc"].to_string()));
    config.peer_group = parsing::parse_field(&text, &PEER_GROUP, |c| Some(c["group"].to_string()));
    config.send_community = parsing::parse_field(&text, &SEND_COMMUNITY, |c| {
        Some(match c.name("kind").map(|m| m.as_str()) {
            Some("both") => CommunityType::Both,
            Some("extended") => CommunityType::Extended,
            _ => CommunityType::Standard,
        })
    });
    config.enabled = Some(!parsing::contains_line(&text, &SHUTDOWN));
}

fn neighbor_key(id: &InstanceIdentifier) -> ReadResult<IpAddr> {
    id.key_of("neighbor")
        .and_then(|key| key.parse().ok())
        .ok_or_else(|| ReadError::unsupported(id))
}

pub struct BgpNeighborReader {
    cli: Arc<dyn Cli>,
}

impl BgpNeighborReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ListReader for BgpNeighborReader {
    type Key = IpAddr;

    async fn get_all_ids(
        &self,
        id: &InstanceIdentifier,
        ctx: &ReadContext,
    ) -> ReadResult<Vec<IpAddr>> {
        let network_instance = network_instance_key(id)?;
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_BGP), ctx).await?;
        Ok(parse_neighbor_ids(&output, network_instance))
    }
}

pub struct BgpNeighborConfigReader {
    cli: Arc<dyn Cli>,
}

impl BgpNeighborConfigReader {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl ConfigReader for BgpNeighborConfigReader {
    type Data = BgpNeighborConfig;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut BgpNeighborConfig,
        ctx: &ReadContext,
    ) -> ReadResult<()> {
        let network_instance = network_instance_key(id)?;
        data.neighbor_address = neighbor_key(id)?;
        let output = blocking_read(self.cli.as_ref(), id, &Command::new(SH_BGP), ctx).await?;
        parse_neighbor(&output, network_instance, data);
        Ok(())
    }
}

/// Writes neighbors under `router bgp AS`.
///
/// The AS is owned by the global config, so it is looked up in the write
/// context: in the neighbor's own instance first, then in the default one.
pub struct BgpNeighborConfigWriter {
    cli: Arc<dyn Cli>,
}

impl BgpNeighborConfigWriter {
    pub fn new(cli: Arc<dyn Cli>) -> Self {
        Self { cli }
    }

    fn local_as(ctx: &WriteContext, network_instance: &str, use_before: bool) -> Option<AsNumber> {
        [network_instance, DEFAULT_NETWORK_INSTANCE]
            .iter()
            .map(|ni| paths::bgp_global(ni))
            .find_map(|global| {
                let config: Option<BgpGlobalConfig> = if use_before {
                    ctx.read_before(&global).or_else(|| ctx.read_after(&global))
                } else {
                    ctx.read_after(&global).or_else(|| ctx.read_before(&global))
                };
                config.and_then(|c| c.as_number)
            })
    }

    fn render(
        id: &InstanceIdentifier,
        template_text: &str,
        before: Option<&BgpNeighborConfig>,
        data: Option<&BgpNeighborConfig>,
        ctx: &WriteContext,
        missing_as: impl FnOnce() -> WriteError,
    ) -> WriteResult<String> {
        let network_instance = id.key_of("network-instance").unwrap_or_default();
        let local_as = Self::local_as(ctx, network_instance, data.is_none()).ok_or_else(missing_as)?;
        debug!(path = %id, local_as = %local_as, "Rendering neighbor");
        Ok(template::render_with(
            template_text,
            json!({
                "as": local_as,
                "vrf": vrf_name(network_instance),
                "before": before,
                "data": data,
            }),
        )?)
    }
}

const MISSING_AS: &str = "BGP AS number is not configured";

#[async_trait]
impl ConfigWriter for BgpNeighborConfigWriter {
    type Data = BgpNeighborConfig;

    async fn write_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &BgpNeighborConfig,
        ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = Self::render(id, WRITE_TEMPLATE, None, Some(data), ctx, || {
            WriteError::create_failed(id, MISSING_AS)
        })?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn update_current_attributes(
        &self,
        id: &InstanceIdentifier,
        before: &BgpNeighborConfig,
        after: &BgpNeighborConfig,
        ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = Self::render(id, WRITE_TEMPLATE, Some(before), Some(after), ctx, || {
            WriteError::update_failed(id, MISSING_AS)
        })?;
        send_config(self.cli.as_ref(), id, commands).await
    }

    async fn delete_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &BgpNeighborConfig,
        ctx: &WriteContext,
    ) -> WriteResult<()> {
        let commands = Self::render(id, DELETE_TEMPLATE, Some(data), None, ctx, || {
            WriteError::delete_failed(id, MISSING_AS)
        })?;
        send_config(self.cli.as_ref(), id, commands).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliunit_test::{commands, ChangeSet, MockCli};
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    const OUTPUT: &str = "\
router bgp 65000
 bgp router-id 10.0.0.1
 neighbor IBGP peer-group
 neighbor IBGP remote-as 65000
 neighbor 10.1.1.2 remote-as 65001
 neighbor 10.1.1.2 description core 1
 neighbor 10.1.1.3 remote-as 65000
 neighbor 10.1.1.3 shutdown
 neighbor 10.1.1.4 peer-group IBGP
 neighbor 2001:db8::1 remote-as 65002
 !
 address-family ipv4
  neighbor 10.1.1.2 activate
  neighbor 10.1.1.2 send-community both
 exit-address-family
 !
 address-family ipv4 vrf BLUE
  neighbor 10.1.1.2 remote-as 65100
  neighbor 10.1.1.2 activate
  neighbor 10.1.1.2 send-community
 exit-address-family
";

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn global(asn: u32) -> BgpGlobalConfig {
        BgpGlobalConfig {
            as_number: Some(AsNumber::new(asn)),
            router_id: None,
        }
    }

    #[test]
    fn test_parse_ids_per_instance() {
        assert_eq!(
            parse_neighbor_ids(OUTPUT, "default"),
            vec![ip("10.1.1.2"), ip("10.1.1.3"), ip("10.1.1.4"), ip("2001:db8::1")]
        );
        assert_eq!(parse_neighbor_ids(OUTPUT, "BLUE"), vec![ip("10.1.1.2")]);
        assert!(parse_neighbor_ids(OUTPUT, "RED").is_empty());
    }

    #[test]
    fn test_parse_neighbor_default() {
        let mut config = BgpNeighborConfig::new(ip("10.1.1.2"));
        parse_neighbor(OUTPUT, "default", &mut config);
        assert_eq!(
            config,
            BgpNeighborConfig {
                neighbor_address: ip("10.1.1.2"),
                peer_as: Some(AsNumber::new(65001)),
                description: Some("core 1".into()),
                enabled: Some(true),
                peer_group: None,
                send_community: Some(CommunityType::Both),
            }
        );
    }

    #[test]
    fn test_parse_neighbor_same_address_in_vrf() {
        let mut config = BgpNeighborConfig::new(ip("10.1.1.2"));
        parse_neighbor(OUTPUT, "BLUE", &mut config);
        assert_eq!(config.peer_as, Some(AsNumber::new(65100)));
        assert_eq!(config.description, None);
        assert_eq!(config.send_community, Some(CommunityType::Standard));
    }

    #[test]
    fn test_parse_neighbor_shutdown_and_group() {
        let mut config = BgpNeighborConfig::new(ip("10.1.1.3"));
        parse_neighbor(OUTPUT, "default", &mut config);
        assert_eq!(config.enabled, Some(false));

        let mut config = BgpNeighborConfig::new(ip("10.1.1.4"));
        parse_neighbor(OUTPUT, "default", &mut config);
        assert_eq!(config.peer_group.as_deref(), Some("IBGP"));
        assert_eq!(config.peer_as, None);
    }

    #[tokio::test]
    async fn test_write_in_vrf_uses_default_as() {
        let cli = Arc::new(MockCli::new());
        let writer = BgpNeighborConfigWriter::new(cli.clone());
        let ctx = ChangeSet::new()
            .unchanged(&paths::bgp_global("default"), &global(65000))
            .into_parts()
            .1;
        let data = BgpNeighborConfig {
            peer_as: Some(AsNumber::new(65100)),
            send_community: Some(CommunityType::Extended),
            enabled: Some(true),
            ..BgpNeighborConfig::new(IpAddr::V4(Ipv4Addr::new(192, 168, 5, 1)))
        };

        writer
            .write_current_attributes(&paths::bgp_neighbor_config("BLUE", "192.168.5.1"), &data, &ctx)
            .await
            .unwrap();

        assert_eq!(
            cli.sent_commands(),
            vec![commands(&[
                "configure terminal",
                "router bgp 65000",
                "address-family ipv4 vrf BLUE",
                "neighbor 192.168.5.1 remote-as 65100",
                "neighbor 192.168.5.1 send-community extended",
                "no neighbor 192.168.5.1 shutdown",
                "neighbor 192.168.5.1 activate",
                "exit-address-family",
                "end",
            ])]
        );
    }

    #[tokio::test]
    async fn test_update() {
        let cli = Arc::new(MockCli::new());
        let writer = BgpNeighborConfigWriter::new(cli.clone());
        let ctx = WriteContext::new().with_after(&paths::bgp_global("default"), &global(65000));
        let before = BgpNeighborConfig {
            peer_as: Some(AsNumber::new(65001)),
            description: Some("old".into()),
            peer_group: Some("IBGP".into()),
            ..BgpNeighborConfig::new(ip("10.1.1.2"))
        };
        let after = BgpNeighborConfig {
            peer_as: Some(AsNumber::new(65001)),
            enabled: Some(false),
            ..BgpNeighborConfig::new(ip("10.1.1.2"))
        };

        writer
            .update_current_attributes(&paths::bgp_neighbor_config("default", "10.1.1.2"), &before, &after, &ctx)
            .await
            .unwrap();

        assert_eq!(
            cli.sent_commands(),
            vec![commands(&[
                "configure terminal",
                "router bgp 65000",
                "neighbor 10.1.1.2 remote-as 65001",
                "no neighbor 10.1.1.2 peer-group IBGP",
                "no neighbor 10.1.1.2 description",
                "neighbor 10.1.1.2 shutdown",
                "end",
            ])]
        );
    }

    #[tokio::test]
    async fn test_update_narrows_community_and_clears_peer_as() {
        let cli = Arc::new(MockCli::new());
        let writer = BgpNeighborConfigWriter::new(cli.clone());
        let ctx = WriteContext::new().with_after(&paths::bgp_global("default"), &global(65000));
        let before = BgpNeighborConfig {
            peer_as: Some(AsNumber::new(65001)),
            peer_group: Some("IBGP".into()),
            send_community: Some(CommunityType::Both),
            ..BgpNeighborConfig::new(ip("10.1.1.2"))
        };
        let after = BgpNeighborConfig {
            peer_group: Some("IBGP".into()),
            send_community: Some(CommunityType::Standard),
            ..BgpNeighborConfig::new(ip("10.1.1.2"))
        };

        writer
            .update_current_attributes(&paths::bgp_neighbor_config("default", "10.1.1.2"), &before, &after, &ctx)
            .await
            .unwrap();

        assert_eq!(
            cli.sent_commands(),
            vec![commands(&[
                "configure terminal",
                "router bgp 65000",
                "no neighbor 10.1.1.2 remote-as 65001",
                "neighbor 10.1.1.2 peer-group IBGP",
                "no neighbor 10.1.1.2 send-community both",
                "neighbor 10.1.1.2 send-community standard",
                "end",
            ])]
        );
    }

    #[tokio::test]
    async fn test_missing_as() {
        let cli = Arc::new(MockCli::new());
        let writer = BgpNeighborConfigWriter::new(cli.clone());
        let result = writer
            .write_current_attributes(
                &paths::bgp_neighbor_config("default", "10.1.1.2"),
                &BgpNeighborConfig::new(ip("10.1.1.2")),
                &WriteContext::new(),
            )
            .await;
        assert!(matches!(result, Err(WriteError::CreateFailed { .. })));
        assert!(cli.sent_commands().is_empty());
    }

    #[tokio::test]
    async fn test_delete_uses_before_as() {
        let cli = Arc::new(MockCli::new());
        let writer = BgpNeighborConfigWriter::new(cli.clone());
        let ctx = WriteContext::new().with_before(&paths::bgp_global("default"), &global(65000));

        writer
            .delete_current_attributes(
                &paths::bgp_neighbor_config("default", "10.1.1.2"),
                &BgpNeighborConfig::new(ip("10.1.1.2")),
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(
            cli.sent_commands(),
            vec![commands(&["configure terminal", "router bgp 65000", "no neighbor 10.1.1.2", "end"])]
        );
    }
}
