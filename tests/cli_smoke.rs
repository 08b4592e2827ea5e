use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_sketchbook")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "sketchbook.exe"
            } else {
                "sketchbook"
            });
            p
        })
}

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("cli_smoke").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn cli_frame_writes_png() {
    let dir = scratch("frame");
    let out_path = dir.join("soldiers.png");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(exe())
        .args(["frame", "--sketch", "soldiers", "--frame", "12", "--seed", "1", "--out"])
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out_path).unwrap();
    assert_eq!((img.width(), img.height()), (400, 400));
}

#[test]
fn cli_frame_reads_config_file() {
    let dir = scratch("config");
    let cfg_path = dir.join("run.json");
    let out_path = dir.join("cannon.png");
    let _ = std::fs::remove_file(&out_path);
    std::fs::write(&cfg_path, r#"{"sketch":"cannon","seed":5}"#).unwrap();

    let status = std::process::Command::new(exe())
        .arg("frame")
        .arg("--config")
        .arg(&cfg_path)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
}

#[test]
fn cli_play_writes_png_sequence() {
    let dir = scratch("play");
    let out_dir = dir.join("frames");
    let _ = std::fs::remove_dir_all(&out_dir);

    let status = std::process::Command::new(exe())
        .args(["play", "--sketch", "spiral", "--seed", "2", "--ticks", "3", "--out-dir"])
        .arg(&out_dir)
        .status()
        .unwrap();

    assert!(status.success());
    for i in 0..3 {
        assert!(out_dir.join(format!("spiral_{i:06}.png")).exists());
    }
}

#[test]
fn cli_map_writes_page_and_prints_popup() {
    let dir = scratch("map");
    let in_path = dir.join("locations.html");
    let out_path = dir.join("map.html");
    let _ = std::fs::remove_file(&out_path);
    std::fs::write(
        &in_path,
        r#"<ul><li data-latlng="20,0"><abbr>X</abbr> <a href="http://example.com">X</a></li></ul>"#,
    )
    .unwrap();

    let output = std::process::Command::new(exe())
        .arg("map")
        .arg("--in")
        .arg(&in_path)
        .arg("--out")
        .arg(&out_path)
        .args(["--title", "Stations", "--click", "0"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout.trim(),
        r#"<a href="http://example.com" target="_blank">X</a>"#
    );
    let html = std::fs::read_to_string(&out_path).unwrap();
    assert!(html.contains("<title>Stations</title>"));
    assert!(html.contains("L.marker"));
}

#[test]
fn cli_map_rejects_malformed_list() {
    let dir = scratch("map_bad");
    let in_path = dir.join("bad.html");
    std::fs::write(
        &in_path,
        r#"<ul><li data-latlng="north"><abbr>X</abbr><a href="x">X</a></li></ul>"#,
    )
    .unwrap();

    let status = std::process::Command::new(exe())
        .arg("map")
        .arg("--in")
        .arg(&in_path)
        .arg("--out")
        .arg(dir.join("map.html"))
        .status()
        .unwrap();

    assert!(!status.success());
}

#[test]
fn cli_play_stops_after_config_frames() {
    let dir = scratch("play_config");
    let cfg_path = dir.join("run.json");
    let out_dir = dir.join("frames");
    let _ = std::fs::remove_dir_all(&out_dir);
    std::fs::write(
        &cfg_path,
        r#"{"sketch":"soldiers","frames":2,"pacing":"unpaced"}"#,
    )
    .unwrap();

    let status = std::process::Command::new(exe())
        .arg("play")
        .arg("--config")
        .arg(&cfg_path)
        .arg("--out-dir")
        .arg(&out_dir)
        .status()
        .unwrap();

    assert!(status.success());
    let written = std::fs::read_dir(&out_dir).unwrap().count();
    assert_eq!(written, 2);
}
