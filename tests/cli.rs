use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

const CONFIG: &str = r#"
original_node_params:
  - name: RT1
    type: arista
    ospf: true
  - name: RT2
    type: juniper
    ospf: false
batfish:
  type: batfish
  state_dir: {{ root }}/{{ network_name }}/{{ snapshot_name }}/batfish
  routes_file: _routes.json
  ospf_neighbors_file: _ospf_neighbors.json
original:
  type: original
  state_dir: {{ root }}/{{ network_name }}/{{ snapshot_name }}/original
  routes_dir: showroute
  routes_file: _show_route.txt
  ospf_neighbors_dir: showospfneigh
  ospf_neighbors_file: _show_ospf_neigh.txt
"#;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

/// Lay out a config plus RT1 state for both environments under one tempdir
fn workspace() -> TempDir {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    // `{{ root }}` is not a known placeholder, so fill it in before the tool renders the rest
    write(
        &root.join("config.tmpl.yaml"),
        &CONFIG.replace("{{ root }}", &root.display().to_string()),
    );

    write(
        &root.join("mddo/asis/batfish/rt1_routes.json"),
        r#"[{"VRF": "default", "Network": "10.0.0.0/30", "Next_Hop": {"type": "interface"},
             "Next_Hop_IP": "AUTO/NONE(-1l)", "Next_Hop_Interface": "Ethernet1",
             "Protocol": "connected", "Admin_Distance": 0, "Metric": 0}]"#,
    );
    write(
        &root.join("mddo/asis/batfish/rt1_ospf_neighbors.json"),
        r#"[{"VRF": "default", "Remote_IP": "10.0.0.2", "Remote_Interface": {"hostname": "rt3"},
             "Session_Status": "ESTABLISHED"}]"#,
    );
    write(
        &root.join("mddo/asis/original/showroute/RT1_show_route.txt"),
        "C        10.0.0.0/30 is directly connected, Ethernet1\n\
         O        10.1.1.0/24 [110/20] via 10.0.0.2, 00:01:23, Ethernet1\n",
    );
    write(
        &root.join("mddo/asis/original/showospfneigh/RT1_show_ospf_neigh.txt"),
        "Neighbor ID     Pri   State           Dead Time   Address         Interface\n\
         10.255.0.3        1   FULL/DR         00:00:38    10.0.0.2        Ethernet1\n",
    );
    dir
}

fn command(dir: &TempDir, table: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("netstate-diff"));
    cmd.current_dir(dir.path())
        .args(["--table", table, "--network", "mddo"])
        .args(["--src-env", "batfish", "--src-snapshot", "asis"])
        .args(["--dst-env", "original", "--dst-snapshot", "asis"])
        .args(["--output", "json"]);
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("json report")
}

#[test]
fn route_diff_for_one_node() {
    let dir = workspace();
    let output = command(&dir, "route")
        .args(["--node", "rt1"])
        .assert()
        .success()
        .get_output()
        .clone();

    let report = stdout_json(&output);
    assert_eq!(report["src_env"], "batfish");
    assert_eq!(report["dst_env"], "original");

    let results = report["all_results"].as_array().expect("all_results");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["node_param"]["name"], "RT1");

    let result = &results[0]["result"];
    assert_eq!(result["both"][0]["src_entry"]["destination"], "10.0.0.0/30");
    assert_eq!(result["only_src"].as_array().map(Vec::len), Some(0));
    assert_eq!(result["only_dst"][0]["destination"], "10.1.1.0/24");
}

#[test]
fn ospf_neighbor_skips_non_speakers() {
    let dir = workspace();
    let output = command(&dir, "ospf_neighbor").assert().success().get_output().clone();

    let report = stdout_json(&output);
    let results = report["all_results"].as_array().expect("all_results");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["result"]["both"][0]["dst_entry"]["id"], "10.255.0.3");
    assert_eq!(results[1]["node_param"]["name"], "RT2");
    assert_eq!(results[1]["note"], "ignored (non-ospf-speaker)");
}

#[test]
fn missing_state_file_fails_after_reporting() {
    let dir = workspace();
    fs::remove_file(dir.path().join("mddo/asis/original/showroute/RT1_show_route.txt")).expect("remove");

    let output = command(&dir, "route")
        .args(["--node", "RT1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not be checked"))
        .get_output()
        .clone();

    let report = stdout_json(&output);
    let error = report["all_results"][0]["error"].as_str().expect("error");
    assert!(error.contains("RT1_show_route.txt"));
}

#[test]
fn unknown_node_is_rejected() {
    let dir = workspace();
    command(&dir, "route")
        .args(["--node", "RT9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("RT9"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn debug_prints_both_tables() {
    let dir = workspace();
    let output = command(&dir, "route")
        .args(["--node", "RT1", "--debug"])
        .assert()
        .success()
        .get_output()
        .clone();

    let report = stdout_json(&output);
    let node = &report["all_results"][0];
    assert_eq!(node["src"]["entries"].as_array().map(Vec::len), Some(1));
    assert_eq!(node["dst"]["entries"].as_array().map(Vec::len), Some(2));
}
