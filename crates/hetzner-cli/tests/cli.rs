use std::fs;

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

fn hetzner_cmd(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hetzner").expect("hetzner binary");
    cmd.arg("--config")
        .arg(tmp.path().join("config.toml"))
        .env_remove("HCLOUD_TOKEN")
        .env_remove("HETZNER_ROBOT_USER")
        .env_remove("HETZNER_ROBOT_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn cloud_cmd(server: &MockServer, tmp: &TempDir) -> Command {
    let mut cmd = hetzner_cmd(tmp);
    cmd.arg("--cloud-endpoint")
        .arg(server.url("/v1"))
        .arg("--token")
        .arg("test-token");
    cmd
}

fn server_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": "running",
        "created": "2024-01-01T00:00:00+00:00",
        "public_net": {"ipv4": {"ip": "10.0.0.1", "blocked": false}, "ipv6": null},
        "server_type": {"id": 1, "name": "cx22", "description": "CX22", "cores": 2,
                        "memory": 4.0, "disk": 40, "cpu_type": "shared",
                        "architecture": "x86", "prices": []},
        "datacenter": {"id": 1, "name": "fsn1-dc14", "description": "Falkenstein 1 DC14",
                       "location": {"id": 1, "name": "fsn1", "description": "Falkenstein DC Park 1",
                                    "country": "DE", "city": "Falkenstein",
                                    "network_zone": "eu-central"}},
        "image": null,
        "labels": {},
        "locked": false
    })
}

fn action_json(id: u64, status: &str, error: Value) -> Value {
    json!({
        "id": id,
        "command": "start_server",
        "status": status,
        "progress": 100,
        "started": "2024-01-01T00:00:00+00:00",
        "finished": "2024-01-01T00:00:05+00:00",
        "resources": [{"id": 1, "type": "server"}],
        "error": error
    })
}

#[test]
fn server_list_collects_pages_as_json() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    let page1 = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/servers")
            .query_param("page", "1")
            .header("authorization", "Bearer test-token");
        then.status(200).json_body(json!({
            "servers": [server_json(1, "web-1")],
            "meta": {"pagination": {"page": 1, "per_page": 1, "next_page": 2}}
        }));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET).path("/v1/servers").query_param("page", "2");
        then.status(200).json_body(json!({
            "servers": [server_json(2, "web-2")],
            "meta": {"pagination": {"page": 2, "per_page": 1, "next_page": null}}
        }));
    });

    let assert = cloud_cmd(&server, &tmp)
        .args(["cloud", "server", "list", "--output", "json", "--per-page", "1"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let servers: Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(servers.as_array().map(Vec::len), Some(2));
    assert_eq!(servers[1]["name"], "web-2");

    page1.assert();
    page2.assert();
}

#[test]
fn server_list_renders_table() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    server.mock(|when, then| {
        when.method(GET).path("/v1/servers");
        then.status(200).json_body(json!({
            "servers": [server_json(7, "db-1")],
            "meta": {"pagination": {"page": 1, "per_page": 50, "next_page": null}}
        }));
    });

    cloud_cmd(&server, &tmp)
        .args(["cloud", "server", "list"])
        .assert()
        .success()
        .stdout(contains("NAME"))
        .stdout(contains("db-1"))
        .stdout(contains("10.0.0.1"));
}

#[test]
fn api_error_exits_with_code_and_message() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    server.mock(|when, then| {
        when.method(GET).path("/v1/servers/99");
        then.status(404).json_body(json!({
            "error": {"code": "not_found", "message": "server not found"}
        }));
    });

    cloud_cmd(&server, &tmp)
        .args(["cloud", "server", "get", "99"])
        .assert()
        .failure()
        .stderr(contains("not_found: server not found"));
}

#[test]
fn poweron_with_wait_polls_action() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    let poweron = server.mock(|when, then| {
        when.method(POST).path("/v1/servers/1/actions/poweron");
        then.status(201)
            .json_body(json!({"action": action_json(5, "running", Value::Null)}));
    });
    let poll = server.mock(|when, then| {
        when.method(GET).path("/v1/actions/5");
        then.status(200)
            .json_body(json!({"action": action_json(5, "success", Value::Null)}));
    });

    cloud_cmd(&server, &tmp)
        .args(["cloud", "server", "poweron", "1", "--wait", "-o", "json"])
        .assert()
        .success()
        .stdout(contains("\"success\""));

    poweron.assert();
    poll.assert_hits(1);
}

#[test]
fn action_wait_reports_failure() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    server.mock(|when, then| {
        when.method(GET).path("/v1/actions/8");
        then.status(200).json_body(json!({
            "action": action_json(8, "error", json!({"code": "action_failed", "message": "disk full"}))
        }));
    });

    cloud_cmd(&server, &tmp)
        .args(["cloud", "action", "wait", "8", "--interval", "10"])
        .assert()
        .failure()
        .stderr(contains("Action 8 failed: disk full"));
}

#[test]
fn ssh_key_delete_accepts_empty_response() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/v1/ssh_keys/3");
        then.status(204);
    });

    cloud_cmd(&server, &tmp)
        .args(["cloud", "ssh-key", "delete", "3"])
        .assert()
        .success()
        .stdout(contains("SSH key 3 deleted"));

    delete.assert();
}

#[test]
fn missing_token_names_sources() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    hetzner_cmd(&tmp)
        .args(["--cloud-endpoint", &server.url("/v1")])
        .args(["cloud", "location", "list"])
        .assert()
        .failure()
        .stderr(contains("HCLOUD_TOKEN"));
}

#[test]
fn token_from_config_file() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");
    fs::write(
        tmp.path().join("config.toml"),
        "[cloud]\ntoken = \"file-token\"\n",
    )
    .expect("write config");

    let locations = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/locations")
            .header("authorization", "Bearer file-token");
        then.status(200).json_body(json!({
            "locations": [{"id": 1, "name": "hel1", "description": "Helsinki DC Park 1",
                           "country": "FI", "city": "Helsinki", "network_zone": "eu-central"}],
            "meta": {"pagination": {"page": 1, "per_page": 50, "next_page": null}}
        }));
    });

    hetzner_cmd(&tmp)
        .args(["--cloud-endpoint", &server.url("/v1")])
        .args(["cloud", "location", "list"])
        .assert()
        .success()
        .stdout(contains("Helsinki"));

    locations.assert();
}

#[test]
fn robot_server_list_uses_basic_auth() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    let list = server.mock(|when, then| {
        // "user:pass"
        when.method(GET)
            .path("/server")
            .header("authorization", "Basic dXNlcjpwYXNz");
        then.status(200).json_body(json!([
            {"server": {"server_number": 321, "server_name": "backup", "server_ip": "192.0.2.10",
                        "product": "EX44", "dc": "FSN1-DC7", "traffic": "unlimited",
                        "status": "ready", "cancelled": false, "paid_until": "2025-01-31",
                        "ip": ["192.0.2.10"]}}
        ]));
    });

    hetzner_cmd(&tmp)
        .args(["--robot-endpoint", &server.base_url()])
        .args(["--robot-user", "user", "--robot-password", "pass"])
        .args(["robot", "server", "list"])
        .assert()
        .success()
        .stdout(contains("321"))
        .stdout(contains("EX44"));

    list.assert();
}

#[test]
fn auction_list_filters_offers() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    server.mock(|when, then| {
        when.method(GET).path("/live_data_en.json");
        then.status(200).json_body(json!({
            "server": [
                {"id": 1, "cpu": "Intel Core i7-6700", "ram_size": 64, "price": 39.0,
                 "datacenter": "FSN1-DC1", "hdd_count": 2, "hdd_size": 512},
                {"id": 2, "cpu": "AMD Ryzen 7 3700X", "ram_size": 64, "price": 45.0,
                 "datacenter": "HEL1-DC2", "hdd_count": 2, "hdd_size": 1024},
                {"id": 3, "cpu": "Intel Xeon E3-1275", "ram_size": 32, "price": 29.0,
                 "datacenter": "FSN1-DC5", "hdd_count": 2, "hdd_size": 4000}
            ]
        }));
    });

    let assert = hetzner_cmd(&tmp)
        .args(["--auction-endpoint", &server.base_url()])
        .args(["auction", "list", "--datacenter", "fsn", "--min-ram", "64", "-o", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let offers: Value = serde_json::from_str(&stdout).expect("json output");
    let ids: Vec<u64> = offers
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|o| o["id"].as_u64())
        .collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn config_set_then_show_redacts_secrets() {
    let tmp = tempdir().expect("tempdir");

    hetzner_cmd(&tmp)
        .args(["config", "set", "cloud.token", "super-secret"])
        .assert()
        .success();
    hetzner_cmd(&tmp)
        .args(["config", "set", "defaults.per_page", "20"])
        .assert()
        .success();

    let saved = fs::read_to_string(tmp.path().join("config.toml")).expect("config written");
    assert!(saved.contains("super-secret"));

    hetzner_cmd(&tmp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("***"))
        .stdout(contains("per_page = 20"))
        .stdout(contains("super-secret").not());
}

#[test]
fn config_set_rejects_unknown_key() {
    let tmp = tempdir().expect("tempdir");

    hetzner_cmd(&tmp)
        .args(["config", "set", "cloud.nope", "x"])
        .assert()
        .failure()
        .stderr(contains("unknown config key"));
}

#[test]
fn zero_poll_interval_is_rejected() {
    let server = MockServer::start();
    let tmp = tempdir().expect("tempdir");

    let poll = server.mock(|when, then| {
        when.method(GET).path("/v1/actions/5");
        then.status(200)
            .json_body(json!({"action": action_json(5, "running", Value::Null)}));
    });

    cloud_cmd(&server, &tmp)
        .args(["cloud", "action", "wait", "5", "--interval", "0"])
        .assert()
        .failure();
    hetzner_cmd(&tmp)
        .args(["config", "set", "defaults.poll_interval_ms", "0"])
        .assert()
        .failure()
        .stderr(contains("poll_interval_ms must be at least 1"));

    poll.assert_hits(0);
}
