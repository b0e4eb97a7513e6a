//! End-to-end flow across a simulated process restart.

use tempfile::TempDir;
use todolist::{Config, LoadStatus, RegisterError, SaveStatus, TodoApp};

fn config_in(tmp: &TempDir) -> Config {
    Config {
        data_dir: tmp.path().to_path_buf(),
        ..Config::default()
    }
}

#[test]
fn register_login_and_todos_survive_restart() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(&tmp);

    let (ana_id, ana_items) = {
        let app = TodoApp::open(&config).unwrap();

        let registered = app
            .accounts()
            .register("Ana", "Ana@Mail.com", "secret1")
            .unwrap();
        assert_eq!(registered.save, SaveStatus::Saved);
        assert_eq!(
            app.accounts().register("x", "ana@mail.com ", "other"),
            Err(RegisterError::EmailTaken("ana@mail.com".into()))
        );
        app.accounts().register("Bob", "bob@mail.com", "pw").unwrap();

        let ana = app.sign_in("ana@mail.com", "secret1").unwrap();
        let milk = app.todos().add(ana.user_id, "Buy milk", None).unwrap().into_inner();
        assert_eq!(milk.id, 1);
        assert!(!milk.done);

        assert!(app.todos().toggle_done(milk.id, ana.user_id).value);
        assert!(!app.todos().delete(milk.id, 2).value);
        app.todos()
            .add(ana.user_id, "Call mum", Some("Sunday")).unwrap();
        app.todos().add(2, "Bob's task", None).unwrap();

        (ana.user_id, app.todos_for(&ana))
    };

    let app = TodoApp::open(&config).unwrap();
    assert_eq!(
        app.accounts().load_status(),
        &LoadStatus::Loaded { records: 2 }
    );
    assert_eq!(app.todos().load_status(), &LoadStatus::Loaded { records: 3 });

    let ana = app.sign_in("ana@mail.com", "secret1").unwrap();
    assert_eq!(ana.user_id, ana_id);
    assert_eq!(app.todos_for(&ana), ana_items);
    assert!(ana_items.iter().any(|t| t.title == "Buy milk" && t.done));

    app.todos().clear_for_owner(ana.user_id);
    assert!(app.todos_for(&ana).is_empty());
    assert_eq!(app.todos().list_for_owner(2).len(), 1);
}

#[test]
fn corrupt_documents_do_not_block_startup() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(&tmp);
    std::fs::write(config.users_path(), "garbage").unwrap();
    std::fs::write(config.todos_path(), "[{").unwrap();

    let app = TodoApp::open(&config).unwrap();
    assert!(matches!(
        app.accounts().load_status(),
        LoadStatus::Recovered { .. }
    ));
    assert!(matches!(
        app.todos().load_status(),
        LoadStatus::Recovered { .. }
    ));

    app.accounts()
        .register("Ana", "ana@mail.com", "secret1")
        .unwrap();
    let ana = app.sign_in("ana@mail.com", "secret1").unwrap();
    app.todos().add(ana.user_id, "fresh", None).unwrap();
    assert_eq!(app.todos_for(&ana).len(), 1);
}
