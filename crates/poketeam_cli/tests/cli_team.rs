use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn run_cli(store: &Path, args: &[&str]) -> std::process::Output {
    let catalog = workspace_root().join("tests/fixtures/catalog.json");
    Command::new(env!("CARGO_BIN_EXE_poketeam"))
        .arg("--catalog-file")
        .arg(catalog)
        .arg("--store")
        .arg(store)
        .args(["--origin", "https://poke.test"])
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("POKETEAM_LOG_PATH")
        .output()
        .expect("failed to run poketeam CLI")
}

fn team_ids(store: &Path) -> Vec<u64> {
    let output = run_cli(store, &["team", "--json"]);
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("team json");
    value["slots"]
        .as_array()
        .expect("slots array")
        .iter()
        .map(|slot| slot["id"].as_u64().expect("numeric id"))
        .collect()
}

#[test]
fn add_persists_between_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");

    let output = run_cli(&store, &["team", "add", "25", "6"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Pikachu ajouté à votre équipe !"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Mon équipe (2/6)"));

    assert_eq!(team_ids(&store), vec![25, 6]);

    let raw = std::fs::read_to_string(&store).expect("store written");
    let value: Value = serde_json::from_str(&raw).expect("store is JSON");
    assert_eq!(value["team"][1]["slot"], 1);
    assert_eq!(value["team"][1]["pokemon"]["pokedex_id"], 6);
    assert!(value["team"][0]["addedAt"].is_string());
}

#[test]
fn duplicate_add_warns_and_exits_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    run_cli(&store, &["team", "add", "25"]);

    let output = run_cli(&store, &["team", "add", "25"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Ce Pokémon est déjà dans votre équipe !"));
    assert_eq!(team_ids(&store), vec![25]);
}

#[test]
fn seventh_member_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    let output = run_cli(&store, &["team", "add", "1", "4", "6", "7", "10", "21"]);
    assert!(output.status.success());

    let output = run_cli(&store, &["team", "add", "25"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Votre équipe est pleine"));
    assert_eq!(team_ids(&store), vec![1, 4, 6, 7, 10, 21]);
}

#[test]
fn unknown_id_fails_without_touching_team() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    run_cli(&store, &["team", "add", "7"]);

    let output = run_cli(&store, &["team", "add", "9999"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(team_ids(&store), vec![7]);
}

#[test]
fn remove_move_and_clear() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    run_cli(&store, &["team", "add", "1", "4", "7"]);

    let output = run_cli(&store, &["team", "move", "1", "3"]);
    assert!(output.status.success());
    assert_eq!(team_ids(&store), vec![4, 7, 1]);

    let output = run_cli(&store, &["team", "move", "1", "5"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalide"));
    assert_eq!(team_ids(&store), vec![4, 7, 1]);

    let output = run_cli(&store, &["team", "remove", "7"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Carapuce retiré de votre équipe."));
    assert_eq!(team_ids(&store), vec![4, 1]);

    let output = run_cli(&store, &["team", "remove", "7"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("n'est pas dans votre équipe"));

    let output = run_cli(&store, &["team", "clear"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Équipe vidée !"));
    assert!(team_ids(&store).is_empty());
}

#[test]
fn share_prints_link_and_optional_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    run_cli(&store, &["team", "add", "1", "4", "7"]);

    let output = run_cli(&store, &["team", "share"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "Lien de partage : https://poke.test?team=1,4,7");

    let output = run_cli(&store, &["team", "share", "--qr", "--json"]);
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("share json");
    assert_eq!(value["url"], "https://poke.test?team=1,4,7");
    assert!(value["qr_svg"].as_str().is_some_and(|svg| svg.contains("<svg")));
}

#[test]
fn share_of_empty_team_warns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    let output = run_cli(&store, &["team", "share"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("rien à partager"));
}

#[test]
fn import_replaces_team_from_link() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    run_cli(&store, &["team", "add", "7"]);

    let output = run_cli(
        &store,
        &["team", "import", "https://poke.test/?team=25,6,1,1,150"],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Équipe chargée avec 5 Pokémon !"));
    assert_eq!(team_ids(&store), vec![25, 6, 1, 1, 150]);
}

#[test]
fn import_accepts_bare_id_list_and_round_trips_share() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    let output = run_cli(&store, &["team", "import", "1,4,7"]);
    assert!(output.status.success());

    let output = run_cli(&store, &["team", "share"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let link = stdout
        .trim()
        .strip_prefix("Lien de partage : ")
        .expect("share line")
        .to_string();

    let other = dir.path().join("other.json");
    let output = run_cli(&other, &["team", "import", &link]);
    assert!(output.status.success());
    assert_eq!(team_ids(&other), vec![1, 4, 7]);
}

#[test]
fn import_with_nothing_usable_is_a_no_op() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    run_cli(&store, &["team", "add", "7"]);

    let output = run_cli(&store, &["team", "import", "https://poke.test/?team=abc,0"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Aucun Pokémon à importer"));
    assert_eq!(team_ids(&store), vec![7]);
}

#[test]
fn failed_import_keeps_previous_team() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    run_cli(&store, &["team", "add", "7"]);

    let output = run_cli(&store, &["team", "import", "1,9999"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Impossible de charger"));
    assert_eq!(team_ids(&store), vec![7]);
}

#[test]
fn corrupt_store_starts_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("team.json");
    std::fs::write(&store, "{ not json").expect("write corrupt store");
    assert!(team_ids(&store).is_empty());
}
