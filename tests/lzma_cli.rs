use assert_cmd::prelude::*;
use std::io::Write;
use std::process::Command;

type StdResult = Result<(),Box<dyn std::error::Error>>;

fn write_file(dir: &std::path::Path,name: &str,contents: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents).unwrap();
    path
}

#[test]
fn create_shrinks_repetitive_input_and_extracts_exactly() -> StdResult {
    let dir = tempfile::tempdir()?;
    let data = b"AAAA".repeat(1000);
    let f = write_file(dir.path(),"report.bin",&data);
    let archive = dir.path().join("archive.lzma");

    Command::cargo_bin("lzma")?
        .arg("create").arg("-o").arg(&archive).arg(&f)
        .assert().success();

    let bytes = std::fs::read(&archive)?;
    assert_eq!(&bytes[0..4],b"LZMA");
    assert!(bytes.len() < data.len());

    let out_dir = dir.path().join("out");
    Command::cargo_bin("lzma")?
        .arg("extract").arg(&archive).arg("-d").arg(&out_dir)
        .assert().success();
    assert_eq!(std::fs::read(out_dir.join("report.bin"))?,data);
    Ok(())
}

#[test]
fn level_flag_is_accepted_but_advisory() -> StdResult {
    let dir = tempfile::tempdir()?;
    let f = write_file(dir.path(),"a.txt",b"some content to compress");
    let archive = dir.path().join("archive.lzma");
    Command::cargo_bin("lzma")?
        .arg("create").arg("-o").arg(&archive).arg("-l").arg("9").arg(&f)
        .assert().success();
    assert!(archive.exists());
    Ok(())
}

#[test]
fn level_flag_out_of_range_is_rejected() -> StdResult {
    let dir = tempfile::tempdir()?;
    let f = write_file(dir.path(),"a.txt",b"some content to compress");
    let archive = dir.path().join("archive.lzma");
    Command::cargo_bin("lzma")?
        .arg("create").arg("-o").arg(&archive).arg("-l").arg("10").arg(&f)
        .assert().failure();
    assert!(!archive.exists());
    Ok(())
}

#[test]
fn add_then_extract_recovers_all_entries() -> StdResult {
    let dir = tempfile::tempdir()?;
    let f1 = write_file(dir.path(),"one.bin",b"alpha beta gamma");
    let archive = dir.path().join("archive.lzma");
    Command::cargo_bin("lzma")?
        .arg("create").arg("-o").arg(&archive).arg(&f1)
        .assert().success();

    let f2 = write_file(dir.path(),"two.bin",b"delta epsilon zeta");
    Command::cargo_bin("lzma")?
        .arg("add").arg(&archive).arg(&f2)
        .assert().success();

    let out_dir = dir.path().join("out");
    Command::cargo_bin("lzma")?
        .arg("extract").arg(&archive).arg("-d").arg(&out_dir)
        .assert().success();
    assert_eq!(std::fs::read(out_dir.join("one.bin"))?,b"alpha beta gamma");
    assert_eq!(std::fs::read(out_dir.join("two.bin"))?,b"delta epsilon zeta");
    Ok(())
}

#[test]
fn list_prints_totals() -> StdResult {
    let dir = tempfile::tempdir()?;
    let f = write_file(dir.path(),"a.bin",b"hello world hello world");
    let archive = dir.path().join("archive.lzma");
    Command::cargo_bin("lzma")?
        .arg("create").arg("-o").arg(&archive).arg(&f)
        .assert().success();

    Command::cargo_bin("lzma")?
        .arg("list").arg(&archive)
        .assert().success()
        .stdout(predicates::str::contains("total"));
    Ok(())
}
