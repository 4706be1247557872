// End-to-end runs of the merakifw binary against a mocked Dashboard API

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use httpmock::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

fn merakifw(config_dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("merakifw");
    cmd.env_remove("APIKEY")
        .env_remove("ORGID")
        .env_remove("MERAKI_BASE_URL")
        .env_remove("RUST_LOG")
        .env("MERAKIFW_CONFIG_DIR", config_dir.path())
        .env("NO_COLOR", "1");
    cmd
}

fn mock_organizations(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/organizations")
            .header("Authorization", "Bearer good-key");
        then.status(200).json_body(json!([
            {"id": "111", "name": "Acme", "url": "https://n1.meraki.com/o/x"},
            {"id": "222", "name": "Globex"}
        ]));
    })
}

/// Branch-B and Branch-A are appliance networks, HQ-Switch is not.
fn mock_branches(server: &MockServer) -> (httpmock::Mock<'_>, httpmock::Mock<'_>) {
    server.mock(|when, then| {
        when.method(GET).path("/organizations/111/networks");
        then.status(200).json_body(json!([
            {"id": "L_B", "name": "Branch-B", "productTypes": ["appliance", "wireless"]},
            {"id": "N_HQ", "name": "HQ-Switch", "productTypes": ["switch"]},
            {"id": "L_A", "name": "Branch-A", "productTypes": ["appliance"]}
        ]));
    });
    let branch_b = server.mock(|when, then| {
        when.method(GET)
            .path("/networks/L_B/appliance/firewall/firewalledServices");
        then.status(200).json_body(json!([
            {"service": "ICMP", "access": "unrestricted"},
            {"service": "SNMP", "access": "blocked", "allowedIps": ["1.2.3.4"]}
        ]));
    });
    let branch_a = server.mock(|when, then| {
        when.method(GET)
            .path("/networks/L_A/appliance/firewall/firewalledServices");
        then.status(200).json_body(json!([]));
    });
    (branch_b, branch_a)
}

#[test]
fn help_describes_options() {
    let dir = TempDir::new().unwrap();
    merakifw(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("--apikey"))
        .stdout(predicates::str::contains("--orgid"))
        .stdout(predicates::str::contains("Firewall Appliance Services"));
}

#[test]
fn reports_appliance_networks_sorted_by_name() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_organizations(&server);
    let (branch_b, branch_a) = mock_branches(&server);

    let assert = merakifw(&dir)
        .args(["--apikey", "good-key", "--orgid", "111", "--base-url"])
        .arg(server.base_url())
        .assert()
        .success();

    branch_a.assert();
    branch_b.assert();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(!stdout.contains("HQ-Switch"));
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "NETWORK NAME  ICMP          ICMP ALLOWED  SNMP ACCESS  SNMP ALLOWED  WEB ACCESS   WEB ALLOWED",
            "------------  ------------  ------------  -----------  ------------  -----------  -----------",
            "Branch-A      unsupported                 unsupported                unsupported",
            "Branch-B      unrestricted                blocked      1.2.3.4       unsupported",
        ]
    );
}

#[test]
fn org_without_appliances_prints_header_only_table() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_organizations(&server);
    server.mock(|when, then| {
        when.method(GET).path("/organizations/111/networks");
        then.status(200).json_body(json!([
            {"id": "N_HQ", "name": "HQ-Switch", "productTypes": ["switch"]}
        ]));
    });
    let services = server.mock(|when, then| {
        when.method(GET).path_contains("/firewalledServices");
        then.status(200).json_body(json!([]));
    });

    let assert = merakifw(&dir)
        .args(["--apikey", "good-key", "--orgid", "111", "--base-url"])
        .arg(server.base_url())
        .assert()
        .success()
        .stderr(predicates::str::contains("No appliance networks found"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(
        stdout,
        "NETWORK NAME  ICMP  ICMP ALLOWED  SNMP ACCESS  SNMP ALLOWED  WEB ACCESS  WEB ALLOWED\n\
         ------------  ----  ------------  -----------  ------------  ----------  -----------\n"
    );
    services.assert_hits(0);
}

#[test]
fn zero_timeout_is_rejected_before_any_request() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let orgs = mock_organizations(&server);

    merakifw(&dir)
        .args(["--apikey", "good-key", "--orgid", "111", "--timeout", "0", "--base-url"])
        .arg(server.base_url())
        .assert()
        .code(2)
        .stderr(predicates::str::contains("--timeout"));

    orgs.assert_hits(0);
}

#[test]
fn json_output_carries_every_cell() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_organizations(&server);
    mock_branches(&server);

    let assert = merakifw(&dir)
        .args(["--output", "json"])
        .env("APIKEY", "good-key")
        .env("ORGID", "111")
        .env("MERAKI_BASE_URL", server.base_url())
        .assert()
        .success();

    let rows: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["network"], "Branch-A");
    assert_eq!(rows[0]["web"]["access"], "unsupported");
    assert_eq!(rows[0]["web"]["allowed"], "");
    assert_eq!(rows[1]["network"], "Branch-B");
    assert_eq!(rows[1]["icmp"]["access"], "unrestricted");
    assert_eq!(rows[1]["icmp"]["allowed"], "");
    assert_eq!(rows[1]["snmp"]["allowed"], "1.2.3.4");
}

#[test]
fn invalid_api_key_stops_before_org_lookup() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let orgs = server.mock(|when, then| {
        when.method(GET).path("/organizations");
        then.status(401).json_body(json!({"errors": ["Invalid API key"]}));
    });
    let networks = server.mock(|when, then| {
        when.method(GET).path("/organizations/111/networks");
        then.status(200).json_body(json!([]));
    });

    merakifw(&dir)
        .args(["--apikey", "bad-key", "--orgid", "111", "--base-url"])
        .arg(server.base_url())
        .assert()
        .code(2)
        .stderr(predicates::str::contains(
            "Invalid value for '--apikey': Provided API Key can't access the Meraki Dashboard",
        ));

    orgs.assert_hits(1);
    networks.assert_hits(0);
}

#[test]
fn invalid_org_lists_organizations_and_stops() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let orgs = mock_organizations(&server);
    let missing = server.mock(|when, then| {
        when.method(GET).path("/organizations/999/networks");
        then.status(404).json_body(json!({"errors": ["Not found"]}));
    });
    let services = server.mock(|when, then| {
        when.method(GET).path_contains("/firewalledServices");
        then.status(200).json_body(json!([]));
    });

    let assert = merakifw(&dir)
        .args(["--apikey", "good-key", "--orgid", "999", "--base-url"])
        .arg(server.base_url())
        .assert()
        .code(2)
        .stderr(predicates::str::contains(
            "Invalid value for '--orgid': Provide a valid Organization ID",
        ));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.starts_with("ORGANIZATION ID"));
    let rows: Vec<Vec<&str>> = stdout
        .lines()
        .skip(2)
        .map(|line| line.split_whitespace().collect())
        .collect();
    assert_eq!(rows, [vec!["111", "Acme"], vec!["222", "Globex"]]);

    orgs.assert_hits(2);
    missing.assert_hits(1);
    services.assert_hits(0);
}

#[test]
fn service_fetch_failure_aborts_without_table() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_organizations(&server);
    server.mock(|when, then| {
        when.method(GET).path("/organizations/111/networks");
        then.status(200).json_body(json!([
            {"id": "L_A", "name": "Branch-A", "productTypes": ["appliance"]}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/networks/L_A/appliance/firewall/firewalledServices");
        then.status(500).json_body(json!({"errors": ["Internal error"]}));
    });

    let assert = merakifw(&dir)
        .args(["--apikey", "good-key", "--orgid", "111", "--base-url"])
        .arg(server.base_url())
        .assert()
        .code(1)
        .stderr(predicates::str::contains("firewalled services for network L_A"))
        .stderr(predicates::str::contains("HTTP 500"));

    assert!(assert.get_output().stdout.is_empty());
}

#[test]
fn missing_api_key_without_input_is_reported() {
    let dir = TempDir::new().unwrap();
    merakifw(&dir)
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicates::str::contains("Missing option '--apikey'"));
}

#[test]
fn prompts_for_org_id_when_not_given() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_organizations(&server);
    mock_branches(&server);

    merakifw(&dir)
        .args(["--apikey", "good-key", "--base-url"])
        .arg(server.base_url())
        .write_stdin("111\n")
        .assert()
        .success()
        .stderr(predicates::str::contains("Organization ID: "))
        .stdout(predicates::str::contains("Branch-A"));
}

#[test]
fn config_file_supplies_defaults() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_organizations(&server);
    mock_branches(&server);
    std::fs::write(
        dir.path().join("config.yaml"),
        format!(
            "api_key: good-key\norg_id: \"111\"\nbase_url: {}\n",
            server.base_url()
        ),
    )
    .unwrap();

    merakifw(&dir)
        .assert()
        .success()
        .stdout(predicates::str::contains("Branch-B"));
}
