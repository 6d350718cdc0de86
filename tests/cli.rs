use std::fs;
use std::path::Path;
use std::process::Command;

const LANDING: &str = env!("CARGO_BIN_EXE_landing");

fn write_project(root: &Path) {
    fs::create_dir_all(root.join("layouts")).unwrap();
    fs::create_dir_all(root.join("content")).unwrap();
    fs::write(
        root.join("site.yaml"),
        "title: Jane Doe\nbase_url: https://jane.example.org\n",
    )
    .unwrap();
    fs::write(
        root.join("layouts/index.html"),
        "<title>{{ .Site.Title }}</title>\n{{ .Content }}\n",
    )
    .unwrap();
    fs::write(root.join("content/_index.md"), "---\n---\nHello\n").unwrap();
}

#[test]
fn test_build_from_subdirectory() {
    let tmp = tempfile::tempdir().unwrap();
    let project = tmp.path().join("site");
    write_project(&project);

    let status = Command::new(LANDING)
        .arg("build")
        .current_dir(project.join("content"))
        .status()
        .unwrap();

    assert!(status.success());
    let html = fs::read_to_string(project.join("public/index.html")).unwrap();
    assert!(html.contains("<title>Jane Doe</title>"));
}

#[test]
fn test_build_without_project_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let output = Command::new(LANDING)
        .arg("build")
        .current_dir(tmp.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_vcard_no_prompt() {
    let tmp = tempfile::tempdir().unwrap();
    let svg = tmp.path().join("card.svg");
    let vcf = tmp.path().join("card.vcf");

    let status = Command::new(LANDING)
        .args(&["vcard", "--no-prompt", "--name", "Jane Doe", "--line-ending", "lf"])
        .arg("--out-svg")
        .arg(&svg)
        .arg("--vcf")
        .arg(&vcf)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(fs::read_to_string(&svg).unwrap().contains("<svg"));
    assert!(fs::read_to_string(&vcf).unwrap().contains("FN:Jane Doe\n"));
}

#[test]
fn test_vcard_prompts_on_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let tmp = tempfile::tempdir().unwrap();
    let vcf = tmp.path().join("card.vcf");

    let mut child = Command::new(LANDING)
        .args(&["vcard", "--line-ending", "lf"])
        .arg("--out-svg")
        .arg(tmp.path().join("card.svg"))
        .arg("--vcf")
        .arg(&vcf)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .unwrap();
    // Given name, surname; everything else is left empty by end of input.
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"Jane\nDoe\n")
        .unwrap();

    assert!(child.wait().unwrap().success());
    assert!(fs::read_to_string(&vcf).unwrap().contains("N:Doe;Jane;;;\n"));
}
