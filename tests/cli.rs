use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

struct TestEnv {
    tmp: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            tmp: TempDir::new().expect("create temp dir"),
        }
    }

    fn cmd(&self, today: &str) -> Command {
        let mut cmd = Command::cargo_bin("vigil").unwrap();
        cmd.env("VIGIL_DB", self.tmp.path().join("vigil.db"))
            .env("VIGIL_CONFIG", self.tmp.path().join("config.toml"))
            .args(["--today", today]);
        cmd
    }

    fn run(&self, today: &str, args: &[&str]) {
        self.cmd(today).args(args).assert().success();
    }

    fn json(&self, today: &str, args: &[&str]) -> Value {
        let out = self
            .cmd(today)
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}

#[test]
fn empty_history_has_no_streak() {
    let env = TestEnv::new();
    let v = env.json("2024-05-10", &["streak"]);
    assert_eq!(v["current"], 0);
    assert_eq!(v["best"], 0);
    assert_eq!(v["active_days"], 0);
}

#[test]
fn daily_checkins_build_a_streak() {
    let env = TestEnv::new();
    env.run("2024-05-01", &["challenge", "add", "Psalms", "--days", "10"]);
    for day in ["2024-05-01", "2024-05-02", "2024-05-03"] {
        env.run(day, &["checkin", "1"]);
    }

    let v = env.json("2024-05-03", &["streak"]);
    assert_eq!((v["current"].as_u64(), v["best"].as_u64()), (Some(3), Some(3)));

    let v = env.json("2024-05-04", &["streak"]);
    assert_eq!((v["current"].as_u64(), v["best"].as_u64()), (Some(0), Some(3)));
}

#[test]
fn repeat_checkin_is_idempotent() {
    let env = TestEnv::new();
    env.run("2024-05-01", &["challenge", "add", "Silence", "--days", "7"]);
    env.run("2024-05-01", &["checkin", "1"]);
    env.cmd("2024-05-01")
        .args(["checkin", "1"])
        .assert()
        .success()
        .stdout(contains("Already checked in today"));

    let v = env.json("2024-05-01", &["streak"]);
    assert_eq!(v["active_days"], 1);
}

#[test]
fn journey_reports_day_index_and_trail() {
    let env = TestEnv::new();
    env.run(
        "2024-05-01",
        &["challenge", "add", "Lent", "--kind", "fasting", "--days", "5", "--start", "2024-05-01"],
    );
    env.run("2024-05-01", &["chapter", "1", "2", "Bread"]);
    env.run("2024-05-01", &["checkin", "1"]);
    env.run("2024-05-03", &["checkin", "1"]);

    let v = env.json("2024-05-04", &["journey", "1"]);
    assert_eq!(v["progress"]["day_index"], 4);
    assert_eq!(v["progress"]["is_completed"], false);
    let statuses: Vec<&str> = v["trail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["completed", "missed", "completed", "available", "locked"]);
    assert_eq!(v["trail"][1]["title"], "Bread");

    let v = env.json("2024-05-20", &["journey", "1"]);
    assert_eq!(v["progress"]["day_index"], 5);
    assert_eq!(v["progress"]["is_completed"], true);
}

#[test]
fn finishing_every_day_earns_a_trophy() {
    let env = TestEnv::new();
    env.run("2024-05-01", &["challenge", "add", "Two days", "--days", "2"]);
    env.run("2024-05-01", &["checkin", "1"]);
    env.run("2024-05-02", &["checkin", "1"]);

    let v = env.json("2024-05-02", &["progress"]);
    assert_eq!(v["active_days_total"], 2);
    assert_eq!(v["streak_current"], 2);
    assert_eq!(v["challenges_completed_total"], 1);
    assert_eq!(v["trophies_preview"][0]["title"], "Two days");
}

#[test]
fn checkin_after_journey_ends_fails() {
    let env = TestEnv::new();
    env.run("2024-05-01", &["challenge", "add", "Short", "--days", "1"]);
    env.cmd("2024-05-03")
        .args(["checkin", "1"])
        .assert()
        .failure()
        .stderr(contains("ended"));
}

#[test]
fn rejects_bad_input() {
    let env = TestEnv::new();
    env.cmd("2024-5-1").arg("streak").assert().failure();
    env.cmd("2024-05-01")
        .args(["challenge", "add", "Nothing", "--days", "0"])
        .assert()
        .failure()
        .stderr(contains("must be positive"));
    env.cmd("2024-05-01")
        .args(["journey", "42"])
        .assert()
        .failure()
        .stderr(contains("No challenge"));
}

#[test]
fn huge_duration_is_refused() {
    let env = TestEnv::new();
    env.cmd("2024-05-01")
        .args(["challenge", "add", "Forever", "--days", "5000000000"])
        .assert()
        .failure()
        .stderr(contains("too large"));
    let v = env.json("2024-05-01", &["trophies"]);
    assert_eq!(v.as_array().map(Vec::len), Some(0));
}

#[test]
fn trophy_shows_checkins_and_reflections() {
    let env = TestEnv::new();
    env.run("2024-05-01", &["challenge", "add", "Psalms", "--days", "3", "--start", "2024-05-01"]);
    env.run("2024-05-03", &["checkin", "1", "--reflection", "late light"]);
    env.run("2024-05-01", &["checkin", "1", "--reflection", "quiet morning"]);

    let v = env.json("2024-05-03", &["trophy", "1"]);
    assert_eq!(v["completed"], 2);
    assert_eq!(v["challenge"]["end_date"], "2024-05-04");
    assert_eq!(v["checkins"][0]["date_key"], "2024-05-01");
    assert_eq!(v["checkins"][0]["reflection"], "quiet morning");
    assert_eq!(v["checkins"][1]["day_index"], 3);

    env.cmd("2024-05-03")
        .args(["trophy", "1"])
        .assert()
        .success()
        .stdout(contains("2024-05-01 → 2024-05-04"))
        .stdout(contains("2/3"))
        .stdout(contains("quiet morning"));
}

#[test]
fn journey_day_shows_chapter_and_reflection() {
    let env = TestEnv::new();
    env.run("2024-05-01", &["challenge", "add", "Lent", "--days", "5", "--start", "2024-05-01"]);
    env.run("2024-05-01", &["chapter", "1", "2", "Bread", "--focus", "hunger"]);
    env.run("2024-05-02", &["checkin", "1", "--reflection", "slow walk"]);

    let v = env.json("2024-05-03", &["journey", "1", "--day", "2"]);
    assert_eq!(v["status"], "completed");
    assert_eq!(v["chapter"]["title"], "Bread");
    assert_eq!(v["checkin"]["reflection"], "slow walk");

    let v = env.json("2024-05-03", &["journey", "1", "--day", "1"]);
    assert_eq!(v["status"], "missed");
    assert!(v["checkin"].is_null());

    env.cmd("2024-05-03")
        .args(["journey", "1", "--day", "9"])
        .assert()
        .failure()
        .stderr(contains("outside"));
}

#[test]
fn leaving_a_challenge_refuses_checkins() {
    let env = TestEnv::new();
    env.run("2024-05-01", &["challenge", "add", "Silence", "--days", "7"]);
    env.run("2024-05-01", &["challenge", "leave", "1"]);
    env.cmd("2024-05-02")
        .args(["checkin", "1"])
        .assert()
        .failure()
        .stderr(contains("You left"));
    env.cmd("2024-05-02")
        .args(["challenge", "leave", "7"])
        .assert()
        .failure()
        .stderr(contains("No challenge"));
}
