use assert_cmd::Command;
use indoc::{formatdoc, indoc};

static MESSAGE: &str = include_str!("../../parcel_codec/tests/fixtures/message.b64");
static MESSAGE_JSON: &str = include_str!("../../parcel_codec/tests/fixtures/message.json");

const PROTOCOL_KEY_HEX: &str = "4c487755476e6b74436c4e7639556f633147717a636362687264614a3341060a";
const PROTOCOL_KEY_BASE64: &str = "TEh3VUdua3RDbE52OVVvYzFHcXpjY2JocmRhSjNBBgo=";

fn cli() -> Command {
    let mut command = Command::cargo_bin("parcel-codec").unwrap();
    command.env_remove("RUST_LOG").env_remove("PARCEL_CODEC_KEY");
    command
}

#[test]
fn test_cli_open() {
    let assert = cli().arg("open").arg(MESSAGE).assert();
    assert.success().stdout(format!("{MESSAGE_JSON}\n"));
}

#[test]
fn test_cli_open_stdin() {
    let assert = cli()
        .arg("open")
        .arg("-")
        .write_stdin(format!("{MESSAGE}\n"))
        .assert();
    assert.success().stdout(format!("{MESSAGE_JSON}\n"));
}

#[test]
fn test_cli_open_json_body() {
    let assert = cli()
        .arg("open")
        .arg("--json-body")
        .arg(format!(r#"{{"data":"{MESSAGE}"}}"#))
        .assert();
    assert.success().stdout(format!("{MESSAGE_JSON}\n"));

    let assert = cli()
        .arg("open")
        .arg("-j")
        .arg(r#"{"data":null}"#)
        .assert();
    assert.success().stdout("");
}

#[test]
fn test_cli_open_pretty() {
    let output = cli().arg("open").arg("-p").arg(MESSAGE).output().unwrap();
    assert!(output.status.success());

    let stdout = std::str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.starts_with("{\n  \"rs\": [\n"));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(stdout).unwrap(),
        serde_json::from_str::<serde_json::Value>(MESSAGE_JSON).unwrap()
    );
}

#[test]
fn test_cli_open_keys() {
    for key in [PROTOCOL_KEY_HEX, PROTOCOL_KEY_BASE64] {
        let assert = cli().arg("open").arg("-k").arg(key).arg(MESSAGE).assert();
        assert.success().stdout(format!("{MESSAGE_JSON}\n"));
    }

    let assert = cli()
        .env("PARCEL_CODEC_KEY", PROTOCOL_KEY_HEX)
        .arg("open")
        .arg(MESSAGE)
        .assert();
    assert.success().stdout(format!("{MESSAGE_JSON}\n"));

    let assert = cli()
        .arg("open")
        .arg("--derived-subkey")
        .arg(MESSAGE)
        .assert();
    assert.success().stdout(format!("{MESSAGE_JSON}\n"));
}

#[test]
fn test_cli_open_failures() {
    let wrong_key = "00".repeat(32);
    let assert = cli()
        .arg("open")
        .arg("--key")
        .arg(&wrong_key)
        .arg(MESSAGE)
        .assert();
    assert.failure().stderr(indoc! {"
        Error: authentication tag mismatch (tampered data or wrong key)
    "});

    let assert = cli().arg("open").arg("AAAA").assert();
    assert.failure().stderr(indoc! {"
        Error: envelope of 3 bytes is shorter than nonce and tag (28 bytes)
    "});

    let assert = cli().arg("open").arg("not base64!").assert();
    assert.failure().stderr(indoc! {"
        Error: expect base64 encoded data
    "});

    let assert = cli().arg("open").arg("-k").arg("AAAA").arg(MESSAGE).assert();
    assert.failure().stderr(indoc! {"
        Error: expect 16, 24 or 32 byte AES key but got 2 bytes
    "});

    let assert = cli().arg("open").arg("-k").arg("!!").arg(MESSAGE).assert();
    assert.failure().stderr(indoc! {"
        Error: expect AES key as hex or base64 string
    "});
}

#[test]
fn test_cli_seal() {
    let assert = cli()
        .arg("seal")
        .arg("--nonce")
        .arg("000102030405060708090a0b")
        .arg(r#"{"ut":"1673387321382"}"#)
        .assert();
    assert.success().stdout(indoc! {"
        AAECAwQFBgcICQoLdOBbLpov+5l1SYEg0MDDl3DQByPGP6DGWFmkDTUob/u/khvYrgc=
    "});

    let assert = cli()
        .arg("seal")
        .arg("-n")
        .arg("a5708b0509e192f23dfc450e")
        .arg("-j")
        .arg("-")
        .write_stdin(MESSAGE_JSON)
        .assert();
    assert.success().stdout(formatdoc! {r#"
        {{"data":"{MESSAGE}"}}
    "#});
}

#[test]
fn test_cli_seal_open_roundtrip() {
    let output = cli().arg("seal").arg("hello").output().unwrap();
    assert!(output.status.success());
    let sealed = std::str::from_utf8(&output.stdout).unwrap().trim().to_string();

    let assert = cli().arg("open").arg(&sealed).assert();
    assert.success().stdout("hello\n");
}

#[test]
fn test_cli_seal_bad_nonce() {
    let assert = cli().arg("seal").arg("-n").arg("0102").arg("{}").assert();
    assert.failure().stderr(indoc! {"
        Error: expect 12 byte nonce but got 2 bytes
    "});

    let assert = cli().arg("seal").arg("-n").arg("xyz").arg("{}").assert();
    assert.failure().stderr(indoc! {"
        Error: expect hex encoded data
    "});
}

#[test]
fn test_cli_digest() {
    let assert = cli()
        .arg("digest")
        .arg("000102030405060708090a0b0c0d0e0f")
        .assert();
    assert.success().stdout(indoc! {"
        5194d8c2cd514dbcd374012efe5dff45
    "});

    let assert = cli().arg("digest").arg("").assert();
    assert.success().stdout(indoc! {"
        00000000000000000000000000000000
    "});
}
