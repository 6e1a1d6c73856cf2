use std::fs;
use std::process::Command;

use peel_archive::test::{gzip_data, tar_archive, zip_archive};

fn peel() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_peel"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn inspect_lists_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let tarball = dir.path().join("a.tar.gz");
    let archive = dir.path().join("b.zip");
    fs::write(&tarball, gzip_data(&tar_archive(&[("x", b"1")]))).unwrap();
    fs::write(&archive, zip_archive(&[("y", b"2")])).unwrap();

    let output = peel().arg("inspect").arg(&tarball).arg(&archive).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("tar "));
    assert!(lines[1].ends_with("a.tar.gz"));
    assert!(lines[2].starts_with("zip "));
}

#[test]
fn convert_writes_parquet() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.tar");
    let output = dir.path().join("out.parquet");
    fs::write(&input, tar_archive(&[("a", b"alpha"), ("b", b"beta")])).unwrap();

    let status = peel()
        .args(["convert", "--no-progress", "-c", "snappy"])
        .arg(&output)
        .arg(&input)
        .status()
        .unwrap();
    assert!(status.success());

    let data = fs::read(&output).unwrap();
    assert_eq!(&data[..4], b"PAR1");
}

#[test]
fn extract_skip_errors() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.txt");
    let bad = dir.path().join("bad.gz");
    let dest = dir.path().join("out");
    fs::write(&good, b"fine").unwrap();
    let mut broken = gzip_data(&b"truncated stream ".repeat(40));
    let len = broken.len();
    broken.truncate(len / 2);
    fs::write(&bad, broken).unwrap();

    let failed = peel()
        .args(["extract", "--no-progress"])
        .arg(&dest)
        .arg(&bad)
        .arg(&good)
        .status()
        .unwrap();
    assert!(!failed.success());

    let skipped = peel()
        .args(["extract", "--no-progress", "--skip-errors"])
        .arg(&dest)
        .arg(&bad)
        .arg(&good)
        .status()
        .unwrap();
    assert!(skipped.success());
}
