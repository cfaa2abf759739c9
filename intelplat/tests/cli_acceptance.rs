use intelplat_core::{Database, GroupCount, Table};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const FIXTURE_FILES: &[&str] = &[
    "cyber_incidents.csv",
    "datasets_metadata.csv",
    "it_tickets.csv",
    "users.txt",
];

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
    data_dir: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");
        let data_dir = base.join("DATA");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");
        fs::create_dir_all(&data_dir).expect("failed to create data dir");

        seed_data_fixtures(&data_dir);

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
            data_dir,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.data_dir.join("intelligence_platform.db")
    }
}

fn seed_data_fixtures(data_dir: &std::path::Path) {
    let source = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../intelplat-core/tests/fixtures/data");
    for name in FIXTURE_FILES {
        fs::copy(source.join(name), data_dir.join(name))
            .unwrap_or_else(|e| panic!("failed to copy fixture {name}: {e}"));
    }
}

fn run_bin(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("intelplat"));
    let data_dir = env.data_dir.to_string_lossy().into_owned();

    Command::new(bin_path)
        .arg("--data-dir")
        .arg(&data_dir)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute intelplat: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "intelplat {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

#[test]
fn setup_bootstraps_database_from_data_dir() {
    let env = CliTestEnv::new();

    let output = run_bin(&env, &["setup"]);
    assert_success(&["setup"], &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Users migrated: 2"), "got:\n{stdout}");
    assert!(stdout.contains("loaded 6 rows"));
    assert!(stdout.contains("loaded 3 rows"));
    assert!(stdout.contains("loaded 4 rows"));

    let db_path = env.db_path();
    assert!(
        db_path.exists(),
        "database file should exist at {}",
        db_path.display()
    );

    let rerun = run_bin(&env, &["setup"]);
    assert_success(&["setup"], &rerun);
    let rerun_stdout = String::from_utf8_lossy(&rerun.stdout);
    assert!(rerun_stdout.contains("Users migrated: 0"));
    assert!(rerun_stdout.contains("skipped (already has data)"));

    let db = Database::open(&db_path).expect("failed to open db");
    db.migrate().expect("failed to migrate db");
    assert_eq!(db.count_rows(Table::Incidents).unwrap(), 6);
    assert_eq!(db.count_rows(Table::Users).unwrap(), 2);
}

#[test]
fn demo_registers_then_logs_in_on_rerun() {
    let env = CliTestEnv::new();

    let first = run_bin(&env, &[]);
    assert_success(&[], &first);
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("User 'alice' registered successfully"), "got:\n{stdout}");
    assert!(stdout.contains("Inserted incident id: 7"));
    assert!(stdout.contains("Total incidents: 7"));
    assert!(stdout.contains("High Severity Incidents by Status"));

    let second = run_bin(&env, &["demo"]);
    assert_success(&["demo"], &second);
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("Username 'alice' already exists"));
    assert!(stdout.contains("Welcome, alice! (role: analyst)"));
    assert!(stdout.contains("Total incidents: 8"));

    let db = Database::open(&env.db_path()).expect("failed to open db");
    let alice = db
        .find_user_by_username("alice")
        .unwrap()
        .expect("alice should exist");
    assert!(alice.password_hash.starts_with("$argon2"));

    let high = db.count_high_severity_incidents_by_status().unwrap();
    assert!(high.contains(&GroupCount::new("Open", 3)));
}

#[test]
fn report_json_lists_aggregates() {
    let env = CliTestEnv::new();

    let setup = run_bin(&env, &["setup"]);
    assert_success(&["setup"], &setup);

    let args = ["report", "--format", "json"];
    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("report should be valid JSON");
    assert_eq!(report["incidents"]["total"], 6);
    assert_eq!(report["datasets"]["total"], 3);
    assert_eq!(report["tickets"]["total"], 4);
    assert_eq!(report["datasets"]["largest"][0]["key"], "NetworkLogs");
    assert_eq!(report["datasets"]["largest"].as_array().unwrap().len(), 2);

    let text = run_bin(&env, &["report"]);
    assert_success(&["report"], &text);
    let stdout = String::from_utf8_lossy(&text.stdout);
    assert!(stdout.contains("Incidents: 6"));
    assert!(stdout.contains("Phishing"));
}
