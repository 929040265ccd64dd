use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gallery_cli(home: &TempDir, backend: &str) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("gallery_cli")?;
    cmd.env("HOME", home.path());
    cmd.env_remove("FACEGALLERY_BACKEND_URL");
    cmd.args(["--backend-url", backend, "--log-level", "warn"]);
    Ok(cmd)
}

#[test]
fn gallery_cli_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("gallery_cli")?;
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("FaceGallery command-line client"));
    Ok(())
}

#[test]
fn gallery_cli_folders() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let server = mocks::backend_server();
    mocks::expect_catalog(&server);

    gallery_cli(&home, &mocks::base_url(&server))?
        .arg("folders")
        .assert()
        .success()
        .stdout(predicate::str::contains("home (1 images)"))
        .stdout(predicate::str::contains("trip (3 images)"));
    Ok(())
}

#[test]
fn gallery_cli_images_with_limit() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let server = mocks::backend_server();
    mocks::expect_catalog(&server);

    gallery_cli(&home, &mocks::base_url(&server))?
        .args(["images", "trip", "--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("images/trip/b.jpg"))
        .stdout(predicate::str::contains("images/trip/c.JPG").not());
    Ok(())
}

#[test]
fn gallery_cli_images_unknown_folder() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let server = mocks::backend_server();
    mocks::expect_catalog(&server);

    gallery_cli(&home, &mocks::base_url(&server))?
        .args(["images", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Folder not found: nowhere"));
    Ok(())
}

#[test]
fn gallery_cli_faces_normalizes_url() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let server = mocks::backend_server();
    let base = mocks::base_url(&server);
    mocks::expect_faces(&server, "images/trip/a.jpg", &["face_images/trip/a/face_0.jpg"]);

    gallery_cli(&home, &base)?
        .args(["faces", &format!("{}/images/trip/a.jpg", base)])
        .assert()
        .success()
        .stdout(predicate::str::contains("face_images/trip/a/face_0.jpg"));
    Ok(())
}

#[test]
fn gallery_cli_search_upload() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let probe = home.path().join("me.jpg");
    std::fs::write(&probe, b"jpeg bytes")?;
    let server = mocks::backend_server();
    mocks::expect_search(&server);

    gallery_cli(&home, &mocks::base_url(&server))?
        .args(["search", "--folder", "trip", "--file"])
        .arg(&probe)
        .assert()
        .success()
        .stdout(predicate::str::contains("Face 0"))
        .stdout(predicate::str::contains(
            "93.21%  face_images/trip/a/face_0.jpg -> images/trip/a.jpg",
        ))
        .stdout(predicate::str::contains("50.00%"));
    Ok(())
}

#[test]
fn gallery_cli_search_no_matches() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let probe = home.path().join("me.png");
    std::fs::write(&probe, b"png bytes")?;
    let server = mocks::backend_server();
    mocks::expect_search_empty(&server);

    gallery_cli(&home, &mocks::base_url(&server))?
        .args(["search", "--folder", "trip", "--file"])
        .arg(&probe)
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches found."));
    Ok(())
}

#[test]
fn gallery_cli_search_backend_error() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let probe = home.path().join("me.jpg");
    std::fs::write(&probe, b"jpeg bytes")?;
    let server = mocks::backend_server();
    mocks::expect_search_error(&server, "No embeddings found for folder");

    gallery_cli(&home, &mocks::base_url(&server))?
        .args(["search", "--folder", "trip", "--file"])
        .arg(&probe)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No embeddings found for folder"));
    Ok(())
}

#[test]
fn gallery_cli_search_face() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let server = mocks::backend_server();
    mocks::expect_search_face(&server);

    gallery_cli(&home, &mocks::base_url(&server))?
        .args([
            "search-face",
            "--folder",
            "trip",
            "--image-path",
            "face_images/trip/b/face_0.jpg",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("-> images/trip/c.JPG"));
    Ok(())
}

#[test]
fn gallery_cli_folder_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let server = mocks::backend_server();
    let base = mocks::base_url(&server);
    mocks::expect_detect(&server, "trip");
    mocks::expect_embed(&server, "trip");

    gallery_cli(&home, &base)?
        .args(["detect", "--folder", "trip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Detected faces in 3 images of trip"));
    gallery_cli(&home, &base)?
        .args(["embed", "--folder", "trip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 4 embeddings for trip"));
    Ok(())
}

#[test]
fn gallery_cli_backend_unreachable() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    gallery_cli(&home, "http://127.0.0.1:1")?
        .arg("folders")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn gallery_cli_init_config_writes_file() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let path = home.path().join("conf").join("config");
    gallery_cli(&home, "http://backend:9000")?
        .arg("--config")
        .arg(&path)
        .arg("init-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Config written to"));

    let written = std::fs::read_to_string(&path)?;
    assert!(written.contains("backend_url = \"http://backend:9000\""));
    assert!(written.contains("batch_size = 50"));
    Ok(())
}

#[test]
fn gallery_cli_reads_backend_from_config() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let server = mocks::backend_server();
    mocks::expect_catalog(&server);
    let path = home.path().join("config");
    std::fs::write(&path, format!("backend_url = \"{}\"\n", mocks::base_url(&server)))?;

    let mut cmd = Command::cargo_bin("gallery_cli")?;
    cmd.env("HOME", home.path())
        .env_remove("FACEGALLERY_BACKEND_URL")
        .arg("--config")
        .arg(&path)
        .arg("folders")
        .assert()
        .success()
        .stdout(predicate::str::contains("trip (3 images)"));
    Ok(())
}
