use std::path::Path;
use std::process::{Command, Output};

use stegcrypt::{carrier, PixelGrid};

fn cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stegcrypt-cli"))
        .args(args)
        .env_remove("STEGCRYPT_PASSWORD")
        .output()
        .expect("run stegcrypt-cli")
}

fn write_cover(path: &Path) {
    carrier::save_png(&PixelGrid::filled(32, 32, 100).unwrap(), path).unwrap();
}

fn no_config(dir: &Path) -> String {
    let path = dir.join("config.toml");
    std::fs::write(&path, "").unwrap();
    path.display().to_string()
}

#[test]
fn embed_then_extract_message() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    write_cover(&cover);
    let config = no_config(dir.path());

    let out = cli(&[
        "--config",
        &config,
        "embed",
        cover.to_str().unwrap(),
        "-o",
        stego.to_str().unwrap(),
        "--message",
        "hello from the cli",
        "--password",
        "s3cret-pw",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = cli(&[
        "--config",
        &config,
        "extract",
        stego.to_str().unwrap(),
        "--password",
        "s3cret-pw",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(out.stdout, b"hello from the cli");
}

#[test]
fn extract_binary_file_to_output_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    let secret = dir.path().join("secret.bin");
    let recovered = dir.path().join("recovered.bin");
    write_cover(&cover);
    std::fs::write(&secret, [0u8, 159, 146, 150, 255]).unwrap();
    let config = no_config(dir.path());

    let out = cli(&[
        "--config",
        &config,
        "embed",
        cover.to_str().unwrap(),
        "-o",
        stego.to_str().unwrap(),
        "--file",
        secret.to_str().unwrap(),
        "-p",
        "s3cret-pw",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = cli(&[
        "--config",
        &config,
        "extract",
        stego.to_str().unwrap(),
        "-p",
        "s3cret-pw",
        "-o",
        recovered.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    assert_eq!(std::fs::read(&recovered).unwrap(), [0u8, 159, 146, 150, 255]);

    let out = cli(&[
        "--config",
        &config,
        "extract",
        stego.to_str().unwrap(),
        "-p",
        "s3cret-pw",
        "--json",
    ]);
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["ok"], true);
    assert_eq!(report["kind"], "binary");
    assert_eq!(report["payload"], "AJ+Slv8=");
}

#[test]
fn wrong_password_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    write_cover(&cover);
    let config = no_config(dir.path());

    let out = cli(&[
        "--config",
        &config,
        "embed",
        cover.to_str().unwrap(),
        "-o",
        stego.to_str().unwrap(),
        "-m",
        "hidden",
        "-p",
        "right-password",
    ]);
    assert!(out.status.success());

    let out = cli(&[
        "--config",
        &config,
        "extract",
        stego.to_str().unwrap(),
        "-p",
        "wrong-password",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("wrong password"));
}

#[test]
fn short_password_rejected_by_config() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.png");
    write_cover(&cover);
    let config = dir.path().join("strict.toml");
    std::fs::write(&config, "min_password_len = 12").unwrap();

    let out = cli(&[
        "--config",
        config.to_str().unwrap(),
        "embed",
        cover.to_str().unwrap(),
        "-o",
        dir.path().join("out.png").to_str().unwrap(),
        "-m",
        "hidden",
        "-p",
        "only-ten-c",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("at least 12 characters"));
}

#[test]
fn capacity_json() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.png");
    write_cover(&cover);
    let config = no_config(dir.path());

    let out = cli(&["--config", &config, "capacity", cover.to_str().unwrap(), "--json"]);
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["channels"], 3072);
    assert_eq!(report["max_payload_bytes"], 380);
    assert_eq!(report["max_plaintext_bytes"], 348);
}

#[test]
fn password_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    write_cover(&cover);
    let config = no_config(dir.path());

    let out = Command::new(env!("CARGO_BIN_EXE_stegcrypt-cli"))
        .args([
            "--config",
            config.as_str(),
            "embed",
            cover.to_str().unwrap(),
            "-o",
            stego.to_str().unwrap(),
            "-m",
            "from the environment",
        ])
        .env("STEGCRYPT_PASSWORD", "env-password")
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = Command::new(env!("CARGO_BIN_EXE_stegcrypt-cli"))
        .args(["--config", config.as_str(), "extract", stego.to_str().unwrap()])
        .env("STEGCRYPT_PASSWORD", "env-password")
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(out.stdout, b"from the environment");

    // explicit flag wins over the environment
    let out = Command::new(env!("CARGO_BIN_EXE_stegcrypt-cli"))
        .args([
            "--config",
            config.as_str(),
            "extract",
            stego.to_str().unwrap(),
            "-p",
            "not-the-password",
        ])
        .env("STEGCRYPT_PASSWORD", "env-password")
        .output()
        .unwrap();
    assert!(!out.status.success());
}

#[test]
fn json_report_on_wrong_password() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    write_cover(&cover);
    let config = no_config(dir.path());

    let out = cli(&[
        "--config",
        &config,
        "embed",
        cover.to_str().unwrap(),
        "-o",
        stego.to_str().unwrap(),
        "-m",
        "hidden",
        "-p",
        "right-password",
    ]);
    assert!(out.status.success());

    let out = cli(&[
        "--config",
        &config,
        "extract",
        stego.to_str().unwrap(),
        "-p",
        "wrong-password",
        "--json",
    ]);
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["ok"], false);
    assert!(report["payload"].is_null());
    assert!(report["error"]
        .as_str()
        .unwrap()
        .contains("wrong password"));
}

#[test]
fn empty_message_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    let empty = dir.path().join("empty.bin");
    write_cover(&cover);
    std::fs::write(&empty, b"").unwrap();
    let config = no_config(dir.path());

    let out = cli(&[
        "--config",
        &config,
        "embed",
        cover.to_str().unwrap(),
        "-o",
        stego.to_str().unwrap(),
        "-m",
        "",
        "-p",
        "s3cret-pw",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("empty"));

    let out = cli(&[
        "--config",
        &config,
        "embed",
        cover.to_str().unwrap(),
        "-o",
        stego.to_str().unwrap(),
        "-f",
        empty.to_str().unwrap(),
        "-p",
        "s3cret-pw",
    ]);
    assert!(!out.status.success());
    assert!(!stego.exists());
}
