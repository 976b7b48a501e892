//! The `strata` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use strata::test_utils::TemplateDirFixture;

fn strata() -> Command {
    let mut cmd = Command::cargo_bin("strata").unwrap();
    cmd.env_remove("STRATA_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_render_through_layouts() {
    let site = TemplateDirFixture::site().unwrap();
    let data = site.write("data/home.json", r#"{"name": "Ada"}"#).unwrap();

    strata()
        .arg("render")
        .arg("pages/home")
        .arg("--dir")
        .arg(site.path())
        .args(["-l", "layouts/main", "-l", "layouts/root"])
        .arg("--data")
        .arg(&data)
        .assert()
        .success()
        .stdout("<html><main><h1>welcome, Ada</h1></main></html>");
}

#[test]
fn test_render_with_context_values() {
    let site = TemplateDirFixture::site().unwrap();

    strata()
        .args(["render", "pages/about", "--value", "site=docs", "--dir"])
        .arg(site.path())
        .assert()
        .success()
        .stdout("<p>About docs</p>");
}

#[test]
fn test_render_missing_template_fails() {
    let site = TemplateDirFixture::site().unwrap();

    strata()
        .args(["render", "pages/nope", "--dir"])
        .arg(site.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Template not found: pages/nope"))
        .stderr(predicate::str::contains("strata list"));
}

#[test]
fn test_render_missing_layout_fails() {
    let site = TemplateDirFixture::site().unwrap();

    strata()
        .args(["render", "pages/about", "-l", "layouts/ghost", "--dir"])
        .arg(site.path())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Layout not found: layouts/ghost"));
}

#[test]
fn test_missing_directory_fails_with_suggestion() {
    strata()
        .args(["list", "--dir", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"))
        .stderr(predicate::str::contains("--dir"));
}

#[test]
fn test_list_templates() {
    let site = TemplateDirFixture::site().unwrap();

    strata()
        .arg("list")
        .arg("--dir")
        .arg(site.path())
        .assert()
        .success()
        .stdout(
            "layouts/main\nlayouts/root\npages/about\npages/home\npages/list\npartials/item\n",
        );
}

#[test]
fn test_list_functions() {
    let site = TemplateDirFixture::site().unwrap();

    strata()
        .args(["list", "--functions", "--dir"])
        .arg(site.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ctx_val"))
        .stdout(predicate::str::contains("T\n"));
}

#[test]
fn test_broken_template_fails_startup() {
    let site = TemplateDirFixture::site().unwrap();
    site.write("pages/broken.html", "{% if %}").unwrap();

    strata()
        .args(["list", "--dir"])
        .arg(site.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template parsing failed"));
}

#[test]
fn test_config_from_environment() {
    let site = TemplateDirFixture::new().unwrap();
    site.write("views/page.txt", "text page").unwrap();
    let config = site.write("strata.toml", "root = \"views\"\nextensions = [\"txt\"]\n").unwrap();

    strata()
        .env("STRATA_CONFIG", &config)
        .args(["render", "page"])
        .assert()
        .success()
        .stdout("text page");
}

#[test]
fn test_config_flag_with_override() {
    let site = TemplateDirFixture::new().unwrap();
    site.write("views/page.txt", "from views").unwrap();
    site.write("other/page.txt", "from other").unwrap();
    let config = site.write("strata.toml", "root = \"views\"\nextensions = [\".txt\"]\n").unwrap();

    strata()
        .arg("--config")
        .arg(&config)
        .args(["render", "page", "--dir"])
        .arg(site.path().join("other"))
        .assert()
        .success()
        .stdout("from other");
}
