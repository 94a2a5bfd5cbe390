use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use assert_fs::prelude::*;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn genint(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_genint"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn generate_writes_gsl_integrator() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = fixture("parsing_test_code.h");

    let output = genint(
        temp.path(),
        &[
            "generate",
            "-i",
            input.to_str().unwrap(),
            "-I",
            "area",
            "-o",
            "area_integral",
            "-d",
            "area.h",
            "-b",
            "gsl-miser",
            "-n",
            "1000",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    temp.child("area_integral.h")
        .assert(predicate::str::contains("#ifndef AREA_INTEGRAL_H"))
        .assert(predicate::str::contains("double * error = NULL"));
    temp.child("area_integral.c")
        .assert(predicate::str::contains("#include \"area.h\""))
        .assert(predicate::str::contains("gsl_monte_miser_integrate"))
        .assert(predicate::str::contains("size_t n_calls = 1000;"));
}

#[test]
fn config_file_supplies_defaults() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("feynman.toml")
        .write_str("[generation]\nbackend = \"gsl-vegas\"\n\n[output]\nsource_extension = \"cpp\"\ninclude_banner = false\n")
        .unwrap();
    let input = fixture("parsing_test_code.c");

    let output = genint(
        temp.path(),
        &["generate", "-i", input.to_str().unwrap(), "-I", "count_points", "-o", "points", "-O", "count"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    temp.child("points.h")
        .assert(predicate::str::starts_with("#ifndef POINTS_H"))
        .assert(predicate::str::contains("int count(unsigned int n_min, unsigned int n_max"));
    temp.child("points.cpp")
        .assert(predicate::str::contains("gsl_monte_vegas_chisq"));
    temp.child("points.c").assert(predicate::path::missing());
}

#[test]
fn missing_function_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = fixture("parsing_test_code.h");

    let output = genint(
        temp.path(),
        &["generate", "-i", input.to_str().unwrap(), "-I", "volume", "-o", "volume"],
    );
    assert!(!output.status.success());
    assert!(predicate::str::contains("No function named 'volume'")
        .eval(&String::from_utf8_lossy(&output.stderr)));
    temp.child("volume.h").assert(predicate::path::missing());
}

#[test]
fn unknown_backend_is_rejected() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = fixture("parsing_test_code.h");

    let output = genint(
        temp.path(),
        &["generate", "-i", input.to_str().unwrap(), "-I", "area", "-o", "area", "-b", "simpson"],
    );
    assert!(!output.status.success());
    temp.child("area.h").assert(predicate::path::missing());
}

#[test]
fn inspect_lists_declarations() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = fixture("parsing_test_code.c");

    let output = genint(temp.path(), &["inspect", input.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(predicate::str::contains("definition\tdouble area(double radius)").eval(&stdout));
    assert!(predicate::str::contains("double scaled(double value, int)").eval(&stdout));
    assert_eq!(stdout.lines().count(), 5);
}
