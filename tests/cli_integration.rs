use std::io::Write;
use std::process::{Command, Output};

fn wayquery(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wayquery"))
        .args(args)
        .output()
        .expect("failed to execute process")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn prints_query_for_region() {
    let output = wayquery(&[
        "--region",
        "-37.8,144.9,900",
        "--filter",
        "highway in ['primary','trunk'] and access != 'private'",
    ]);
    assert!(output.status.success());

    // Default profile grows the region by 1/0.9
    assert_eq!(
        stdout(&output).trim_end(),
        "[out:json];(\
         way(around:1000,-37.8,144.9)[highway=\"primary\"][access!=\"private\"];\
         way(around:1000,-37.8,144.9)[highway=\"trunk\"][access!=\"private\"];\
         );out tags geom qt;"
    );
}

#[test]
fn prints_criteria_as_json() {
    let output = wayquery(&["--criteria", "--filter", "lanes >= 2 or oneway"]);
    assert!(output.status.success());

    let criteria: Vec<String> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(criteria, vec![r#"(if:t["lanes"]>=2)"#, r#"[oneway="yes"]"#]);
}

#[test]
fn evaluates_filter_against_tags() {
    let output = wayquery(&["--tag", "highway=residential", "--tag", "service=driveway"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "false");

    let output = wayquery(&["--tag", "highway=residential", "--tag", "surface=asphalt"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "true");
}

#[test]
fn reads_profile_and_lets_flags_override() {
    let mut profile = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(profile, "region: \"51.5,-0.1,2km\"").unwrap();
    writeln!(profile, "filter: \"highway == 'primary'\"").unwrap();
    writeln!(profile, "grow: 1").unwrap();
    let path = profile.path().to_str().unwrap();

    let output = wayquery(&["--profile", path, "--verbose"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        "[out:json];(way(around:2000,51.5,-0.1)[highway=\"primary\"];);out tags geom qt;"
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("Region:"));

    let output = wayquery(&["--profile", path, "--filter", "is_tag(bridge)"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("way(around:2000,51.5,-0.1)[bridge];"));
}

#[test]
fn reports_errors() {
    let output = wayquery(&["--filter", "highway == 'primary'"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No region given"));

    let output = wayquery(&["--region", "0,0", "--filter", "x in"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to compile expression"));

    let output = wayquery(&["--region", "91,0"]);
    assert!(!output.status.success());
}

#[test]
fn classifies_tagged_ways() {
    let output = wayquery(&["--classify", "--tag", "highway=residential"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "primary");

    let output = wayquery(&[
        "--classify",
        "-t",
        "highway=primary",
        "-t",
        "surface=cobblestone",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "secondary");

    let output = wayquery(&["--classify", "--tag", "highway=steps"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "excluded");

    let output = wayquery(&["--classify"]);
    assert!(!output.status.success());
}
