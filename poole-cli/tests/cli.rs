use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn poole(site: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("poole").unwrap();
    cmd.arg("--site").arg(site).env_remove("RUST_LOG");
    cmd
}

#[test]
fn init_scaffolds_build_root() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    poole(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("[DONE]\t_poole directory created"))
        .stdout(predicate::str::contains("[DONE]\tDefault content file created"));

    let root = dir.path().join("_poole");
    assert!(root.join("config.yml").is_file());
    assert!(root.join("layouts/default.html").is_file());
    assert!(root.join("content/pages/index.md").is_file());
    assert!(root.join("assets/img").is_dir());
    Ok(())
}

#[test]
fn init_twice_needs_force() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    poole(dir.path()).arg("init").assert().success();

    poole(dir.path())
        .arg("init")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[ERROR]\tThe website is already initialized"));

    poole(dir.path()).args(["init", "--force"]).assert().success();
    Ok(())
}

#[test]
fn generate_builds_scaffolded_site() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    poole(dir.path()).arg("init").assert().success();

    poole(dir.path())
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendering pages"))
        .stdout(predicate::str::contains("Write index.html"))
        .stdout(predicate::str::contains("[DONE]\tTime:"));

    let html = fs::read_to_string(dir.path().join("_site/index.html"))?;
    assert!(html.contains("<title>Poole - Home</title>"));
    assert!(html.contains(r#"<a href="http://localhost:8000/">Home</a>"#));
    assert_eq!(
        fs::read_to_string(dir.path().join("_site/README.md"))?,
        "Powered by Poole."
    );

    // A second run replaces the page
    poole(dir.path())
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete index.html"));
    Ok(())
}

#[test]
fn generate_with_root_base_url_keeps_single_slash() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    poole(dir.path()).arg("init").assert().success();

    let config = dir.path().join("_poole/config.yml");
    let yaml = fs::read_to_string(&config)?.replace(
        r#"base_url: "http://localhost:8000""#,
        r#"base_url: "/""#,
    );
    fs::write(&config, yaml)?;
    let about = dir.path().join("_poole/content/pages/about");
    fs::create_dir_all(&about)?;
    fs::write(
        about.join("about.md"),
        "<!--\ntitle = About\nmenu = nav\n-->\nAbout",
    )?;

    poole(dir.path()).arg("generate").assert().success();

    let html = fs::read_to_string(dir.path().join("_site/index.html"))?;
    assert!(html.contains(r#"<a href="/">Home</a>"#));
    assert!(html.contains(r#"<a href="/about">About</a>"#));
    assert!(!html.contains("//about"));
    Ok(())
}

#[test]
fn generate_dry_run_writes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    poole(dir.path()).arg("init").assert().success();

    poole(dir.path())
        .args(["generate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 pages rendered (dry run)"));

    assert!(!dir.path().join("_site").exists());
    Ok(())
}

#[test]
fn generate_without_site_fails_with_code_2() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    poole(dir.path())
        .arg("generate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[ERROR]\tFailed to load site"))
        .stderr(predicate::str::contains("config.yml"));
    Ok(())
}

#[test]
fn list_pages_prints_relative_paths() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    poole(dir.path()).arg("init").assert().success();
    let about = dir.path().join("_poole/content/pages/about");
    fs::create_dir_all(&about)?;
    fs::write(about.join("about.md"), "About")?;

    poole(dir.path())
        .args(["list", "pages"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- about/about.md\n- index.md\n"));

    poole(dir.path())
        .args(["list", "posts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[INFO]\tList posts"))
        .stdout(predicate::str::contains("- ").not());
    Ok(())
}

#[test]
fn deploy_requires_repository() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    poole(dir.path()).arg("init").assert().success();

    poole(dir.path())
        .arg("deploy")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("deploy.repository"));
    Ok(())
}

#[test]
fn unknown_command_is_a_usage_error() {
    let dir = tempdir().unwrap();
    poole(dir.path()).arg("publish").assert().code(2);
}
