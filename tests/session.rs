mod common;

use common::MockLogbook;
use lgbk::{tracking::SessionError, Config, RunNumber, Session, Target};
use std::io::Write;

fn routes() -> Vec<(&'static str, u16, &'static str)> {
    vec![
        (
            "lgbk/ws/activeexperiment_for_instrument_station",
            200,
            r#"{"value": {"name": "xpplv1234"}}"#,
        ),
        (
            "lgbk/xpplv1234/ws/info",
            200,
            r#"{"value": {"description": "Liquid jet", "instrument": "XPP", "posix_group": "xpplv1234"}}"#,
        ),
        ("run_control/xpplv1234/ws/start_run", 200, r#"{"value": {"num": 12}}"#),
        ("run_control/xpplv1234/ws/add_run_params", 200, r#"{"success": true}"#),
        ("lgbk/xpplv1234/ws/register_file", 200, r#"{"success": true}"#),
    ]
}

#[test]
fn session_resolves_station_and_drives_a_run() {
    let logbook = MockLogbook::start(&routes());
    let config = Config::new(logbook.url.clone()).credentials("opr", "secret");
    let mut session = Session::connect(config, Target::station("XPP", 0)).unwrap();

    assert_eq!(session.experiment().as_ref(), "xpplv1234");
    assert_eq!(session.info().description, "Liquid jet");
    assert_eq!(session.info().posix_gid, "xpplv1234");

    assert_eq!(session.start_run(Some("DATA")).unwrap(), RunNumber::from(12));
    session.report_detectors(&["epix10k"]).unwrap();
    session
        .report_open_file("/cds/data/drpsrcf/xpp/xpplv1234/xtc/r0012-s000.xtc2", None)
        .unwrap();

    let paths: Vec<String> = logbook.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "lgbk/ws/activeexperiment_for_instrument_station",
            "lgbk/xpplv1234/ws/info",
            "run_control/xpplv1234/ws/start_run",
            "run_control/xpplv1234/ws/add_run_params",
            "lgbk/xpplv1234/ws/register_file",
        ]
    );

    let requests = logbook.requests();
    let detectors: serde_json::Value = serde_json::from_str(&requests[3].body).unwrap();
    assert_eq!(detectors, serde_json::json!({"DAQ Detectors/epix10k": true}));
    let file: serde_json::Value = serde_json::from_str(&requests[4].body).unwrap();
    assert_eq!(file["path"], "/xpp/xpplv1234/xtc/r0012-s000.xtc2");
    assert_eq!(file["gen"], 1);
}

#[test]
fn session_from_config_file() {
    let logbook = MockLogbook::start(&routes());
    let path = std::env::temp_dir().join(format!("lgbk-session-{}.cnf", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "logbook_endpoint={}", logbook.url).unwrap();
    writeln!(file, "logbook_uid=opr").unwrap();
    writeln!(file, "logbook_pwd=secret").unwrap();
    writeln!(file, "logbook_use_kerberos=false").unwrap();
    drop(file);

    let session = Session::from_config_file(&path, Target::experiment("xpplv1234"));
    std::fs::remove_file(&path).unwrap();

    let session = session.unwrap();
    assert_eq!(session.info().instrument_name, "XPP");
    assert_eq!(
        logbook.last_request().authorization.as_deref(),
        Some("Basic b3ByOnNlY3JldA==")
    );
}

#[test]
fn connect_rejects_config_without_authentication() {
    let logbook = MockLogbook::start(&routes());
    let result = Session::connect(Config::new(logbook.url.clone()), Target::station("XPP", 0));
    assert!(matches!(result, Err(SessionError::Config(_))));
    assert!(logbook.requests().is_empty());
}
