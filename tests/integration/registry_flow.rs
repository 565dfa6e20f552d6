//! End-to-end registry flows against SQLite and real project folders

use super::common::fixtures::TestEnv;
use binder::core::RegistryError;
use binder::{App, Availability, ProjectCandidate};
use std::fs;
use std::path::PathBuf;

async fn open(env: &TestEnv) -> App {
    App::open_at(env.config(), env.db_path())
        .await
        .expect("Failed to open app")
}

fn names(app: &App) -> Vec<String> {
    app.gateway()
        .registry()
        .iter()
        .map(|binding| binding.name.clone())
        .collect()
}

#[tokio::test]
async fn test_add_persists_across_reopen() {
    let env = TestEnv::new();
    let api = env.project("api");
    let web = env.project("web");

    {
        let app = open(&env).await;
        let report = app
            .gateway()
            .add_projects(vec![
                ProjectCandidate::new(&api, "20.11.0"),
                ProjectCandidate::new(&web, "18.19.0"),
            ])
            .await
            .unwrap();
        assert_eq!(report.added.len(), 2);
    }

    let app = open(&env).await;
    assert_eq!(names(&app), vec!["api", "web"]);
    let registry = app.gateway().registry();
    assert!(registry.iter().all(|binding| binding.active));
    assert_eq!(registry.bindings()[0].path, api);
}

#[tokio::test]
async fn test_duplicate_scenario() {
    let env = TestEnv::new();
    let a = env.project("a");
    let b = env.project("b");
    let app = open(&env).await;

    app.gateway()
        .add_projects(vec![ProjectCandidate::new(&a, "18.0.0")])
        .await
        .unwrap();

    let report = app
        .gateway()
        .add_projects(vec![ProjectCandidate::new(&a, "20.0.0")])
        .await
        .unwrap();
    assert_eq!(report.rejected.len(), 1);
    assert!(matches!(
        report.rejected[0],
        RegistryError::DuplicateProject { .. }
    ));
    assert_eq!(app.gateway().registry().bindings()[0].version, "18.0.0");

    app.gateway()
        .add_projects(vec![ProjectCandidate::new(&b, "20.0.0")])
        .await
        .unwrap();
    let paths: Vec<PathBuf> = app
        .gateway()
        .registry()
        .iter()
        .map(|binding| binding.path.clone())
        .collect();
    assert_eq!(paths, vec![b, a]);
}

#[tokio::test]
async fn test_rebind_writes_version_file_and_remove_cleans_up() {
    let env = TestEnv::new();
    env.install("20.11.0");
    let api = env.project("api");
    let app = open(&env).await;
    app.gateway().reload(true).await.unwrap();

    app.gateway()
        .add_projects(vec![ProjectCandidate::new(&api, "")])
        .await
        .unwrap();
    let outcome = app.gateway().rebind_version(&api, "20.11.0").await.unwrap();

    assert!(!outcome.is_degraded());
    assert_eq!(outcome.binding().availability, Availability::Installed);
    assert_eq!(
        fs::read_to_string(api.join(".nvmdrc")).unwrap(),
        "20.11.0"
    );

    app.gateway().remove_project(&api).await.unwrap();
    assert!(!api.join(".nvmdrc").exists());
    assert!(app.gateway().remove_project(&api).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rebind_deleted_project_degrades() {
    let env = TestEnv::new();
    let gone = env.project("gone");
    let app = open(&env).await;
    app.gateway()
        .add_projects(vec![ProjectCandidate::new(&gone, "18.0.0")])
        .await
        .unwrap();

    fs::remove_dir_all(&gone).unwrap();
    let outcome = app.gateway().rebind_version(&gone, "20.0.0").await.unwrap();
    assert!(outcome.is_degraded());

    drop(app);
    let app = open(&env).await;
    let registry = app.gateway().registry();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.bindings()[0].version, "20.0.0");
    assert!(!registry.bindings()[0].active);
}

#[tokio::test]
async fn test_reorder_persists() {
    let env = TestEnv::new();
    let app = open(&env).await;
    let candidates = ["one", "two", "three"]
        .iter()
        .map(|name| ProjectCandidate::new(env.project(name), "18.0.0"))
        .collect();
    app.gateway().add_projects(candidates).await.unwrap();

    app.gateway().reorder(0, 2).await.unwrap();
    assert!(matches!(
        app.gateway().reorder(5, 0).await,
        Err(RegistryError::IndexOutOfRange { index: 5, len: 3 })
    ));

    drop(app);
    let app = open(&env).await;
    assert_eq!(names(&app), vec!["two", "three", "one"]);
}

#[tokio::test]
async fn test_reload_flags_missing_versions() {
    let env = TestEnv::new();
    env.install("v18.19.0");
    let app = open(&env).await;
    app.gateway()
        .add_projects(vec![
            ProjectCandidate::new(env.project("old"), "16.20.2"),
            ProjectCandidate::new(env.project("new"), "18.19.0"),
            ProjectCandidate::new(env.project("none"), ""),
        ])
        .await
        .unwrap();

    let report = app.gateway().reload(true).await.unwrap();

    let availability: Vec<Availability> = report
        .registry
        .iter()
        .map(|binding| binding.availability)
        .collect();
    assert_eq!(
        availability,
        vec![
            Availability::Missing,
            Availability::Installed,
            Availability::Unbound
        ]
    );
    assert_eq!(report.installed.iter().collect::<Vec<_>>(), vec!["18.19.0"]);
}

#[tokio::test]
async fn test_add_from_args_picker_reads_version_file() {
    let env = TestEnv::new();
    let pinned = env.project("pinned");
    fs::write(pinned.join(".nvmdrc"), "v16.20.2\n").unwrap();
    let app = open(&env).await;

    let picker = app.args_picker(vec![pinned.clone()], Some("20.0.0".to_string()));
    let report = app
        .gateway()
        .add_from_picker(&picker, &App::project_picker_options())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.added[0].version, "16.20.2");
    assert_eq!(report.added[0].name, "pinned");
}
