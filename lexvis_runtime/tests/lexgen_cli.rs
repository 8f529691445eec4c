//! Runs the `lexgen` and `lexvis` binaries as separate processes

use serde_json::Value;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn lexgen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lexgen"))
}

#[test]
fn lexgen_writes_artifact_and_tokens_file() {
    let dir = tempdir().unwrap();
    let grammar = dir.path().join("Calc.g4");
    fs::write(&grammar, "lexer grammar Calc;\nNUM : [0-9]+ ;\nPLUS : '+' ;\n").unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let status = lexgen()
        .args(["-Dlanguage=Json", "-no-listener", "-o"])
        .arg(&out)
        .arg(&grammar)
        .status()
        .unwrap();
    assert!(status.success());

    let artifact: Value =
        serde_json::from_str(&fs::read_to_string(out.join("CalcLexer.json")).unwrap()).unwrap();
    assert_eq!(artifact["lexer_name"], "CalcLexer");
    let tokens = fs::read_to_string(out.join("CalcLexer.tokens")).unwrap();
    assert!(tokens.contains("NUM=1"));
    assert!(tokens.contains("'+'=2"));
}

#[test]
fn lexgen_reports_grammar_errors() {
    let dir = tempdir().unwrap();
    let grammar = dir.path().join("Bad.g4");
    fs::write(&grammar, "lexer grammar Bad;\nA : 'a'\n").unwrap();

    let output = lexgen().arg("-o").arg(dir.path()).arg(&grammar).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error("), "{}", stderr);
    assert!(stderr.contains("Bad.g4:"), "{}", stderr);
    assert!(!dir.path().join("BadLexer.json").exists());
}

#[test]
fn lexgen_usage_and_version() {
    let output = lexgen().arg("-Dlanguage=Cpp").arg("G.g4").output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let output = lexgen().arg("--version").output().unwrap();
    assert!(output.status.success());
    let version = String::from_utf8_lossy(&output.stdout);
    assert!(version.starts_with("lexgen "), "{}", version);
    assert_eq!(
        version.split_whitespace().last(),
        Some(lexvis_compiler::artifact::schema::TOOL_VERSION)
    );
}

#[cfg(feature = "cli")]
#[test]
fn lexvis_prints_token_stream_json() {
    let dir = tempdir().unwrap();
    let grammar = dir.path().join("Words.g4");
    fs::write(
        &grammar,
        "lexer grammar Words;\nWORD : [a-z]+ ;\nWS : ' '+ -> skip ;\n",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_lexvis"))
        .arg("--grammar")
        .arg(&grammar)
        .args(["--input", "hello world"])
        .arg("--tool")
        .arg(env!("CARGO_BIN_EXE_lexgen"))
        .env("LEXVIS_WORKSPACE_DIR", dir.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stdout));

    let response: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["grammar_identifier"], "Words");
    assert_eq!(response["input_text"], "hello world");
    assert_eq!(response["tokens"][1]["text"], "world");
    assert_eq!(response["tokens"][1]["start"], 6);
}

#[cfg(feature = "cli")]
#[test]
fn lexvis_prints_error_json() {
    let dir = tempdir().unwrap();
    let grammar = dir.path().join("Digits.g4");
    fs::write(&grammar, "lexer grammar Digits;\nNUM : [0-9]+ ;\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_lexvis"))
        .arg("--grammar")
        .arg(&grammar)
        .args(["--input", "1a"])
        .arg("--tool")
        .arg(env!("CARGO_BIN_EXE_lexgen"))
        .env("LEXVIS_WORKSPACE_DIR", dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let response: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["kind"], "execution");
    assert!(response["message"]
        .as_str()
        .unwrap()
        .contains("token recognition error at: 'a'"));
}
