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
fn create_extract_round_trips_two_files() -> StdResult {
    let dir = tempfile::tempdir()?;
    let f1 = write_file(dir.path(),"one.txt",&b"Content of file 1\n".repeat(50));
    let f2 = write_file(dir.path(),"two.txt",&b"Content of file 2\n".repeat(50));
    let archive = dir.path().join("archive.lzha");

    Command::cargo_bin("lzha")?
        .arg("create").arg("-o").arg(&archive).arg(&f1).arg(&f2)
        .assert().success();

    let bytes = std::fs::read(&archive)?;
    assert_eq!(&bytes[0..4],b"LZHA");
    let count = u32::from_le_bytes(bytes[16..20].try_into().unwrap());
    assert_eq!(count,2);

    let out_dir = dir.path().join("out");
    Command::cargo_bin("lzha")?
        .arg("extract").arg(&archive).arg("-d").arg(&out_dir)
        .assert().success();

    assert_eq!(std::fs::read(out_dir.join("one.txt"))?,b"Content of file 1\n".repeat(50));
    assert_eq!(std::fs::read(out_dir.join("two.txt"))?,b"Content of file 2\n".repeat(50));
    Ok(())
}

#[test]
fn list_prints_entries() -> StdResult {
    let dir = tempfile::tempdir()?;
    let f = write_file(dir.path(),"a.txt",b"hello world");
    let archive = dir.path().join("archive.lzha");
    Command::cargo_bin("lzha")?
        .arg("create").arg("-o").arg(&archive).arg(&f)
        .assert().success();

    Command::cargo_bin("lzha")?
        .arg("list").arg(&archive)
        .assert().success()
        .stdout(predicates::str::contains("a.txt"));
    Ok(())
}

#[test]
fn add_appends_and_dedups_last_write_wins() -> StdResult {
    let dir = tempfile::tempdir()?;
    let f1 = write_file(dir.path(),"note.txt",b"first");
    let archive = dir.path().join("archive.lzha");
    Command::cargo_bin("lzha")?
        .arg("create").arg("-o").arg(&archive).arg(&f1)
        .assert().success();

    let f2 = write_file(dir.path(),"note.txt",b"second version");
    Command::cargo_bin("lzha")?
        .arg("add").arg(&archive).arg(&f2)
        .assert().success();

    let out_dir = dir.path().join("out");
    Command::cargo_bin("lzha")?
        .arg("extract").arg(&archive).arg("-d").arg(&out_dir)
        .assert().success();
    assert_eq!(std::fs::read(out_dir.join("note.txt"))?,b"second version");
    Ok(())
}

#[test]
fn extract_fails_on_missing_archive() -> StdResult {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("nope.lzha");
    Command::cargo_bin("lzha")?
        .arg("extract").arg(&missing)
        .assert().failure();
    Ok(())
}

#[test]
fn no_huffman_flag_still_round_trips() -> StdResult {
    let dir = tempfile::tempdir()?;
    let f = write_file(dir.path(),"plain.txt",b"abcabcabcabc");
    let archive = dir.path().join("archive.lzha");
    Command::cargo_bin("lzha")?
        .arg("create").arg("-o").arg(&archive).arg("--no-huffman").arg(&f)
        .assert().success();

    let out_dir = dir.path().join("out");
    Command::cargo_bin("lzha")?
        .arg("extract").arg(&archive).arg("-d").arg(&out_dir)
        .assert().success();
    assert_eq!(std::fs::read(out_dir.join("plain.txt"))?,b"abcabcabcabc");
    Ok(())
}
