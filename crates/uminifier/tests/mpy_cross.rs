//! Exécution réelle de processus : un script shell joue le rôle de `mpy-cross`.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pretty_assertions::assert_eq;
use uminifier::{Compile, CompilerConfig, MpyCross};

fn fake_cross(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("mpy-cross");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn cross_at(program: &Path) -> MpyCross {
    MpyCross::new(&CompilerConfig {
        program: program.to_str().unwrap().into(),
        ..CompilerConfig::default()
    })
}

#[test]
fn writes_output_given_after_dash_o() {
    let dir = tempfile::tempdir().unwrap();
    // $1 = -o, $2 = sortie, $3 = entrée
    let program = fake_cross(dir.path(), r#"[ "$1" = "-o" ] || exit 9; cp "$3" "$2""#);
    let input = dir.path().join("imain.py");
    let output = dir.path().join("main.mpy");
    fs::write(&input, "x=1\n").unwrap();

    let outcome = cross_at(&program).compile(&input, &output).unwrap();

    assert!(outcome.success());
    assert_eq!(fs::read_to_string(&output).unwrap(), "x=1\n");
}

#[test]
fn failure_reports_code_and_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let program = fake_cross(dir.path(), "echo 'SyntaxError: invalid syntax' >&2; exit 1");
    let outcome = cross_at(&program)
        .compile(&dir.path().join("i.py"), &dir.path().join("i.mpy"))
        .unwrap();

    assert!(!outcome.success());
    assert_eq!(outcome.exit_code, Some(1));
    assert_eq!(outcome.diagnostic(), Some("SyntaxError: invalid syntax"));
}

#[test]
fn extra_args_come_first() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("argv.txt");
    let program = fake_cross(dir.path(), &format!(r#"echo "$@" > "{}""#, log.display()));
    let cross = MpyCross::new(&CompilerConfig {
        program: program.to_str().unwrap().into(),
        args: vec!["-march=xtensa".into()],
        timeout_secs: None,
    });
    cross.compile(Path::new("in.py"), Path::new("out.mpy")).unwrap();

    assert_eq!(fs::read_to_string(&log).unwrap().trim(), "-march=xtensa -o out.mpy in.py");
}

#[test]
fn hung_compiler_is_killed() {
    let dir = tempfile::tempdir().unwrap();
    let program = fake_cross(dir.path(), "exec sleep 30");
    let outcome = cross_at(&program)
        .with_timeout(Some(Duration::from_millis(200)))
        .compile(Path::new("in.py"), Path::new("out.mpy"))
        .unwrap();

    assert!(outcome.timed_out);
    assert!(!outcome.success());
    assert_eq!(outcome.exit_code, None);
}
