use std::fs;
use std::path::PathBuf;

use matchedge::context::MatchContext;
use matchedge::persist::{load_session_from, save_session_to};
use matchedge::store::{MatchCategory, MatchStore};

fn temp_session_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("matchedge_test_{name}_{}", std::process::id()));
    path.push("session.json");
    path
}

#[test]
fn session_round_trips_store_and_context() {
    let path = temp_session_path("roundtrip");

    let mut context = MatchContext::default();
    context.team1_name = "Alpha".to_string();
    context.team2_name = "Beta".to_string();
    context.total_line = 2.5;

    let mut store = MatchStore::new();
    store.replace_category(MatchCategory::H2h, &[(2, 1), (0, 0)], &context);
    store.replace_category(MatchCategory::Team1, &[(3, 1)], &context);

    save_session_to(&path, &store, &context);
    let (loaded_store, loaded_context) = load_session_from(&path).expect("session should load");

    assert_eq!(loaded_store.total_matches(), 3);
    assert_eq!(loaded_store.h2h[0].team1_score, 2);
    assert_eq!(loaded_context.team1_name, "Alpha");
    assert_eq!(loaded_context.total_line, 2.5);

    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn incompatible_version_is_ignored() {
    let path = temp_session_path("version");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"{"version":999,"store":{"h2h":[],"team1":[],"team2":[]},"context":{"team1_name":"A","team2_name":"B","team1_ranking":0,"team2_ranking":0,"importance":1.0,"location":"Neutral","total_line":0.0,"point_spread":0.0,"spread_direction":"Team1"}}"#,
    )
    .unwrap();

    assert!(load_session_from(&path).is_none());

    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn corrupt_cache_reads_as_no_session() {
    let path = temp_session_path("corrupt");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "not json at all").unwrap();

    assert!(load_session_from(&path).is_none());

    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn missing_file_reads_as_no_session() {
    let path = temp_session_path("missing");
    assert!(load_session_from(&path).is_none());
}
