use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

fn run_help(root: &TempDir, args: &[&str]) {
    let mut cmd = cargo_bin_cmd!("modelzoo");
    cmd.env_remove("MODELZOO_ROOT")
        .arg("--root")
        .arg(root.path())
        .args(args)
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn every_cli_command_has_help_path() {
    let root = TempDir::new().expect("temp root");

    // top-level
    run_help(&root, &[]);

    // read-only commands
    run_help(&root, &["validate"]);
    run_help(&root, &["resolve"]);
    run_help(&root, &["show"]);
    run_help(&root, &["list"]);

    // writer commands
    run_help(&root, &["publish"]);
    run_help(&root, &["promote"]);
    run_help(&root, &["mirror"]);
}
