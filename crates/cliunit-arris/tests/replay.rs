//! Drives the Arris unit against captured CMTS output.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

use cliunit_arris::ArrisUnit;
use cliunit_common::{Command, HandlerRegistry, Modification, ReadContext, ReplayCli, WriteContext};
use cliunit_model::paths;

const RUNNING: &str = "\
interface cable-mac 1
 description \"Main MAC domain\"
 no shutdown
exit
interface cable-mac 2
 shutdown
exit
";

const STATE: &str = "\
cable-mac 1   Admin: up   Oper: up
Modems: total 42, online 40

Downstream channels
Chan     Admin Oper  Frequency(Hz)  Power(dBmV)  Modulation
1/0/0    up    up    555000000      50.0         qam256

Upstream channels
Chan     Admin Oper  Frequency(Hz)  Width(Hz)
1/0/0    up    up    20000000       6400000
";

fn capture(dir: &tempfile::TempDir, command: &str, output: &str) {
    let name = ReplayCli::capture_name(&Command::new(command));
    std::fs::write(dir.path().join(name), output).unwrap();
}

#[tokio::test]
async fn test_read_from_captures() {
    let dir = tempfile::tempdir().unwrap();
    capture(&dir, "show running-config interface cable-mac", RUNNING);
    capture(&dir, "show interface cable-mac 1", STATE);

    let cli = Arc::new(ReplayCli::new(dir.path()));
    let registry = HandlerRegistry::for_unit(&ArrisUnit::new(), cli.clone());
    let ctx = ReadContext::new();

    let ids = registry.read_ids(&paths::cable_macs(), &ctx).await.unwrap();
    assert_eq!(ids, vec!["1", "2"]);

    let config = registry.read(&paths::cable_mac_config(1), &ctx).await.unwrap();
    assert_eq!(
        config,
        json!({"id": 1, "description": "Main MAC domain", "enabled": true})
    );

    let state = registry.read(&paths::cable_mac_state(1), &ctx).await.unwrap();
    assert_eq!(state["modems_total"], 42);
    assert_eq!(state["upstream"][0]["width_hz"], 6_400_000);

    // A MAC domain without a capture reads as empty state.
    let empty = registry.read(&paths::cable_mac_state(2), &ctx).await.unwrap();
    assert_eq!(empty, json!({"downstream": [], "upstream": []}));

    assert_eq!(
        cli.sent_commands(),
        vec![
            "show running-config interface cable-mac",
            "show interface cable-mac 1",
            "show interface cable-mac 2",
        ]
    );
}

#[tokio::test]
async fn test_apply_records_commands() {
    let dir = tempfile::tempdir().unwrap();
    let cli = Arc::new(ReplayCli::new(dir.path()));
    let registry = HandlerRegistry::for_unit(&ArrisUnit::new(), cli.clone());

    registry
        .apply(
            vec![
                Modification::delete(paths::cable_mac_config(2), json!({"id": 2})),
                Modification::update(
                    paths::cable_mac_config(1),
                    json!({"id": 1, "enabled": true}),
                    json!({"id": 1, "enabled": false}),
                ),
            ],
            &WriteContext::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        cli.sent_commands(),
        vec![
            "configure no interface cable-mac 2\n",
            "configure interface cable-mac 1\nshutdown\nexit\n",
        ]
    );
}

#[tokio::test]
async fn test_bad_data_is_rejected_before_sending() {
    let dir = tempfile::tempdir().unwrap();
    let cli = Arc::new(ReplayCli::new(dir.path()));
    let registry = HandlerRegistry::for_unit(&ArrisUnit::new(), cli.clone());

    let result = registry
        .apply(
            vec![Modification::create(
                paths::cable_mac_config(5),
                json!({"id": "five"}),
            )],
            &WriteContext::new(),
        )
        .await;

    assert!(result.is_err());
    assert!(cli.sent_commands().is_empty());
}
