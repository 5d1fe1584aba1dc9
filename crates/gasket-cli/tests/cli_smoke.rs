use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SCRATCH_SEQ: AtomicUsize = AtomicUsize::new(0);

/// A config file in the temp dir, removed on drop.
struct ScratchConfig {
    path: PathBuf,
}

impl ScratchConfig {
    fn write(contents: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "gasket-{}-{seq}-{nanos}.toml",
            std::process::id()
        ));
        fs::write(&path, contents).expect("scratch config should be written");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchConfig {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn run_gasket<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_gasket"))
        .args(args)
        .env_remove("GASKET_LOG")
        .output()
        .expect("gasket binary should start")
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn expect_exit(output: &Output, success: bool) {
    assert_eq!(
        output.status.success(),
        success,
        "exit {:?}\nstdout:\n{}\nstderr:\n{}",
        output.status.code(),
        text(&output.stdout),
        text(&output.stderr),
    );
}

fn json_stdout(output: &Output) -> Value {
    expect_exit(output, true);
    serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("stdout is not json ({e}):\n{}", text(&output.stdout)))
}

#[test]
fn presets_json_lists_every_preset() {
    let payload = json_stdout(&run_gasket(["presets", "--json"]));
    let names: Vec<&str> = payload["presets"]
        .as_array()
        .expect("presets array")
        .iter()
        .map(|p| p["name"].as_str().expect("name"))
        .collect();
    assert_eq!(
        names,
        ["equal_triple", "enclosed_pair", "triangle", "construction"]
    );
    assert_eq!(payload["presets"][0]["generators"].as_array().map(Vec::len), Some(3));
}

#[test]
fn generate_preset_json_smoke() {
    let output = run_gasket([
        "generate",
        "--preset",
        "equal_triple",
        "--max-level",
        "1",
        "--json",
    ]);
    let payload = json_stdout(&output);
    assert_eq!(payload["circle_count"], 5);
    assert_eq!(payload["expected_count"], 5);
    assert_eq!(payload["circles"].as_array().map(Vec::len), Some(5));
    assert_eq!(payload["digest"].as_str().map(str::len), Some(64));
    let k4 = payload["circles"][3]["curvature"].as_f64().expect("curvature");
    assert!((k4 - (3.0 + 2.0 * 3f64.sqrt())).abs() < 1e-12);
}

#[test]
fn generate_explicit_circles_text_smoke() {
    let output = run_gasket([
        "generate",
        "--circle=0,0,-1",
        "--circle=-0.5,0,2",
        "--circle=0.5,0,2",
        "--max-level",
        "3",
    ]);
    expect_exit(&output, true);

    let stdout = text(&output.stdout);
    assert!(stdout.contains("gasket generate --max-level 3"));
    assert!(stdout.contains("Circles: 29"));
    assert!(stdout.contains("Digest: "));
}

#[test]
fn generate_is_identical_with_workers() {
    let base = ["generate", "--preset", "triangle", "--max-level", "5", "--json"];
    let a = json_stdout(&run_gasket(base));
    let b = json_stdout(&run_gasket(base.into_iter().chain(["--parallelism", "3"])));
    assert_eq!(a["digest"], b["digest"]);
    assert_eq!(a["circle_count"], 245);
}

#[test]
fn summary_only_omits_circles() {
    let output = run_gasket([
        "generate",
        "--preset",
        "enclosed_pair",
        "--max-level",
        "4",
        "--summary-only",
        "--json",
    ]);
    let payload = json_stdout(&output);
    assert_eq!(payload["circle_count"], 83);
    assert!(payload.get("circles").is_none());
    assert_eq!(payload["levels"]["0"], 5);
}

#[test]
fn children_of_enclosed_pair() {
    let output = run_gasket(["children", "--preset", "enclosed", "--json"]);
    let payload = json_stdout(&output);
    assert_eq!(payload["tangent"], true);
    let k4 = payload["children"][0]["curvature"].as_f64().expect("k4");
    let k5 = payload["children"][1]["curvature"].as_f64().expect("k5");
    assert!((k4 - 3.0).abs() < 1e-12);
    assert!((k5 - 3.0).abs() < 1e-12);
}

#[test]
fn audit_reports_sound_gasket() {
    let output = run_gasket(["audit", "--preset", "equal_triple", "--max-level", "5", "--json"]);
    let payload = json_stdout(&output);
    assert_eq!(payload["circle_count"], 245);
    assert_eq!(payload["untangent_count"], 0);
    assert_eq!(payload["curvature_monotone"], true);
}

#[test]
fn config_file_supplies_generators_and_ceiling() {
    let config = ScratchConfig::write(
        "max_level = 2\nmax_level_ceiling = 4\npreset = \"enclosed_pair\"\n",
    );
    let path = config.path().as_os_str();

    let ok = run_gasket([
        OsStr::new("generate"),
        OsStr::new("--config"),
        path,
        OsStr::new("--json"),
    ]);
    assert_eq!(json_stdout(&ok)["circle_count"], 11);

    let too_deep = run_gasket([
        OsStr::new("generate"),
        OsStr::new("--config"),
        path,
        OsStr::new("--max-level"),
        OsStr::new("9"),
    ]);
    expect_exit(&too_deep, false);
    assert!(text(&too_deep.stderr).contains("ceiling"));
}

#[test]
fn construction_preset_from_config_is_sound() {
    let config = ScratchConfig::write("preset = \"construction\"\nmax_level = 5\n");
    let output = run_gasket([
        OsStr::new("audit"),
        OsStr::new("--config"),
        config.path().as_os_str(),
        OsStr::new("--json"),
    ]);
    let payload = json_stdout(&output);
    assert_eq!(payload["circle_count"], 245);
    assert_eq!(payload["untangent_count"], 0);
}

#[test]
fn malformed_circle_is_rejected() {
    let output = run_gasket(["generate", "--circle=0,0", "--circle=1,0,1", "--circle=2,0,1"]);
    expect_exit(&output, false);
    assert!(text(&output.stderr).contains("invalid --circle"));
}

#[test]
fn non_tangent_generators_fail() {
    let output = run_gasket([
        "generate",
        "--circle=0,0,1",
        "--circle=5,0,1",
        "--circle=0,5,1",
    ]);
    expect_exit(&output, false);
    assert!(text(&output.stderr).contains("invalid configuration"));
}

#[test]
fn missing_generators_fail() {
    let output = run_gasket(["generate"]);
    expect_exit(&output, false);
    assert!(text(&output.stderr).contains("no generators"));
}
