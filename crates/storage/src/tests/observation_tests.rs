#![expect(clippy::unwrap_used, reason = "test code")]

use agentmem_core::{NewObservation, ObservationType};

use super::{at_minute, create_test_observation, create_test_storage};

#[test]
fn test_storage_new_is_empty() {
    let (storage, _temp_dir) = create_test_storage();
    let stats = storage.get_stats().unwrap();
    assert_eq!(stats.observations, 0);
    assert_eq!(stats.sessions, 0);
    assert_eq!(stats.projects, 0);
}

#[test]
fn test_create_then_get_round_trips_fields() {
    let (storage, _temp_dir) = create_test_storage();
    let input = NewObservation::builder("s-1", "acme", ObservationType::FileWrite, "Fixed X")
        .subtitle("in parser")
        .text("details...")
        .narrative("The parser dropped trailing tokens")
        .facts(vec!["tokens were dropped".to_owned()])
        .concepts(vec!["parser".to_owned(), "bugfix".to_owned()])
        .files_read(vec!["src/lex.rs".to_owned()])
        .files_modified(vec!["src/parse.rs".to_owned()])
        .prompt_number(4)
        .created_at(at_minute(0))
        .build();

    let id = storage.create_observation(&input).unwrap();
    let got = storage.get_observation(id).unwrap().unwrap();

    assert_eq!(got.id, id);
    assert_eq!(got.session_id, input.session_id);
    assert_eq!(got.project, input.project);
    assert_eq!(got.observation_type, input.observation_type);
    assert_eq!(got.title, input.title);
    assert_eq!(got.subtitle, input.subtitle);
    assert_eq!(got.text, input.text);
    assert_eq!(got.narrative, input.narrative);
    assert_eq!(got.facts, input.facts);
    assert_eq!(got.concepts, input.concepts);
    assert_eq!(got.files_read, input.files_read);
    assert_eq!(got.files_modified, input.files_modified);
    assert_eq!(got.prompt_number, 4);
    assert_eq!(got.created_at, input.created_at);
    assert_eq!(got.created_at_epoch, input.created_at_epoch());
    assert_eq!(got.last_accessed_epoch, None);
    assert!(!got.is_stale);
}

#[test]
fn test_ids_strictly_increase() {
    let (storage, _temp_dir) = create_test_storage();
    let mut last = 0;
    for i in 0..5 {
        let id = storage.create_observation(&create_test_observation("acme", &format!("obs {i}"))).unwrap();
        assert!(id > last);
        last = id;
    }
}

#[test]
fn test_get_missing_observation_is_none() {
    let (storage, _temp_dir) = create_test_storage();
    assert!(storage.get_observation(42).unwrap().is_none());
}

#[test]
fn test_get_by_ids_ignores_unknown() {
    let (storage, _temp_dir) = create_test_storage();
    let a = storage.create_observation(&create_test_observation("acme", "one")).unwrap();
    let b = storage.create_observation(&create_test_observation("acme", "two")).unwrap();

    let found = storage.get_observations_by_ids(&[a, b, 999]).unwrap();

    assert_eq!(found.len(), 2);
    let mut ids: Vec<i64> = found.iter().map(|o| o.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![a, b]);
    assert!(storage.get_observations_by_ids(&[]).unwrap().is_empty());
}

#[test]
fn test_session_observations_ordered_by_prompt_number() {
    let (storage, _temp_dir) = create_test_storage();
    for (title, prompt) in [("third", 3), ("first", 1), ("second", 2), ("first again", 1)] {
        let obs = NewObservation::builder("s-order", "acme", ObservationType::Command, title)
            .prompt_number(prompt)
            .build();
        storage.create_observation(&obs).unwrap();
    }

    let titles: Vec<String> =
        storage.get_session_observations("s-order").unwrap().into_iter().map(|o| o.title).collect();

    assert_eq!(titles, vec!["first", "first again", "second", "third"]);
}

#[test]
fn test_project_listing_is_newest_first_and_scoped() {
    let (storage, _temp_dir) = create_test_storage();
    for (minute, project) in [(0, "acme"), (1, "other"), (2, "acme"), (3, "acme")] {
        let obs = NewObservation::builder("s", project, ObservationType::Manual, format!("m{minute}"))
            .created_at(at_minute(minute))
            .build();
        storage.create_observation(&obs).unwrap();
    }

    let titles: Vec<String> = storage
        .list_project_observations("acme", 2)
        .unwrap()
        .into_iter()
        .map(|o| o.title)
        .collect();
    assert_eq!(titles, vec!["m3", "m2"]);
}

#[test]
fn test_list_observations_paginates() {
    let (storage, _temp_dir) = create_test_storage();
    for i in 0..5 {
        storage.create_observation(&create_test_observation("acme", &format!("obs {i}"))).unwrap();
    }

    let page = storage.list_observations(Some("acme"), 3, 2).unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert!(!page.has_more());

    let first = storage.list_observations(None, 0, 2).unwrap();
    assert!(first.has_more());
}

#[test]
fn test_search_by_file_matches_either_list() {
    let (storage, _temp_dir) = create_test_storage();
    let read = NewObservation::builder("s", "acme", ObservationType::FileRead, "read config")
        .files_read(vec!["config/app_settings.toml".to_owned()])
        .build();
    let wrote = NewObservation::builder("s", "acme", ObservationType::FileWrite, "wrote config")
        .files_modified(vec!["config/app_settings.toml".to_owned()])
        .build();
    let other = NewObservation::builder("s", "acme", ObservationType::FileWrite, "unrelated")
        .files_modified(vec!["config/appXsettings.toml".to_owned()])
        .build();
    storage.create_observation(&read).unwrap();
    storage.create_observation(&wrote).unwrap();
    storage.create_observation(&other).unwrap();

    // `_` must be matched literally, not as a LIKE wildcard
    let hits = storage.search_by_file("app_settings", None, 10).unwrap();

    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|o| o.title != "unrelated"));
}

#[test]
fn test_list_projects_is_distinct_and_sorted() {
    let (storage, _temp_dir) = create_test_storage();
    storage.create_observation(&create_test_observation("zeta", "a")).unwrap();
    storage.create_observation(&create_test_observation("alpha", "b")).unwrap();
    storage.create_observation(&create_test_observation("zeta", "c")).unwrap();
    storage.create_or_get_session("content-1", "mid", None).unwrap();

    assert_eq!(storage.list_projects().unwrap(), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_project_stats_counts_by_type() {
    let (storage, _temp_dir) = create_test_storage();
    storage.create_observation(&create_test_observation("acme", "a")).unwrap();
    let cmd = NewObservation::builder("s", "acme", ObservationType::Command, "ran").build();
    let id = storage.create_observation(&cmd).unwrap();
    storage.store_embedding(id, &[1.0, 0.0], "test").unwrap();
    storage.create_observation(&create_test_observation("other", "b")).unwrap();

    let stats = storage.get_project_stats("acme").unwrap();

    assert_eq!(stats.observations, 2);
    assert_eq!(stats.embedded, 1);
    assert_eq!(stats.by_type.get("command"), Some(&1));
    assert_eq!(stats.by_type.get("discovery"), Some(&1));
    assert!(stats.first_epoch.is_some());

    let empty = storage.get_project_stats("nobody").unwrap();
    assert_eq!(empty.observations, 0);
    assert_eq!(empty.first_epoch, None);
}
