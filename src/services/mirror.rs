//! Commit the catalog and push it to its git remotes.
//!
//! The primary remote is authoritative: failing to push there fails the run.
//! The secondary remote is a convenience mirror, so a failed push is logged
//! and reported but does not fail the run.

use crate::domain::constants::MODELS_DIR;
use crate::domain::models::{MirrorConfig, MirrorReport, PushOutcome};
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

pub trait GitRunner {
    /// Runs `git <args>` in `cwd`, returning stdout on success.
    fn run(&self, cwd: &Path, args: &[&str]) -> anyhow::Result<String>;
}

/// Shells out to the `git` binary on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl GitRunner for GitCli {
    fn run(&self, cwd: &Path, args: &[&str]) -> anyhow::Result<String> {
        let out = Command::new("git").current_dir(cwd).args(args).output()?;
        if !out.status.success() {
            anyhow::bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&out.stdout).to_string())
    }
}

fn push_with_retry(
    git: &dyn GitRunner,
    root: &Path,
    remote: &str,
    retries: u32,
) -> PushOutcome {
    let mut attempts = 0;
    let mut last_err = None;
    while attempts <= retries {
        attempts += 1;
        match git.run(root, &["push", remote, "HEAD"]) {
            Ok(_) => {
                info!(remote, attempts, "pushed catalog");
                return PushOutcome {
                    remote: remote.to_string(),
                    ok: true,
                    attempts,
                    error: None,
                };
            }
            Err(e) => last_err = Some(e.to_string()),
        }
    }
    PushOutcome {
        remote: remote.to_string(),
        ok: false,
        attempts,
        error: last_err,
    }
}

/// Stages `models/`, commits when anything changed, then pushes.
pub fn mirror(
    root: &Path,
    config: &MirrorConfig,
    git: &dyn GitRunner,
    message: &str,
) -> anyhow::Result<MirrorReport> {
    if !config.push {
        return Ok(MirrorReport {
            enabled: false,
            committed: false,
            pushes: Vec::new(),
        });
    }
    let Some(primary) = config.primary_remote.as_deref() else {
        anyhow::bail!("git push is enabled but no primary remote is configured");
    };

    git.run(root, &["add", "--all", MODELS_DIR])?;
    let staged = git.run(root, &["diff", "--cached", "--name-only"])?;
    let committed = !staged.trim().is_empty();
    if committed {
        git.run(root, &["commit", "-m", message])?;
    }

    let mut pushes = Vec::new();
    let outcome = push_with_retry(git, root, primary, config.retries);
    if !outcome.ok {
        anyhow::bail!(
            "push to primary remote {} failed after {} attempts: {}",
            primary,
            outcome.attempts,
            outcome.error.unwrap_or_default()
        );
    }
    pushes.push(outcome);

    if let Some(secondary) = config.secondary_remote.as_deref() {
        let outcome = push_with_retry(git, root, secondary, config.retries);
        if !outcome.ok {
            warn!(
                remote = secondary,
                error = outcome.error.as_deref().unwrap_or(""),
                "push to secondary remote failed; continuing"
            );
        }
        pushes.push(outcome);
    }

    Ok(MirrorReport {
        enabled: true,
        committed,
        pushes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Records every call; a push to `remote` fails `failures[remote]`
    /// times before succeeding.
    #[derive(Default)]
    struct FakeGit {
        calls: RefCell<Vec<String>>,
        failures: RefCell<HashMap<String, u32>>,
        staged: String,
    }

    impl FakeGit {
        fn failing(remote: &str, times: u32) -> Self {
            let git = FakeGit {
                staged: "models/m/v1/model.pkl\n".to_string(),
                ..FakeGit::default()
            };
            git.failures.borrow_mut().insert(remote.to_string(), times);
            git
        }
    }

    impl GitRunner for FakeGit {
        fn run(&self, _cwd: &Path, args: &[&str]) -> anyhow::Result<String> {
            self.calls.borrow_mut().push(args.join(" "));
            if args[0] == "diff" {
                return Ok(self.staged.clone());
            }
            if args[0] == "push" {
                let mut failures = self.failures.borrow_mut();
                if let Some(left) = failures.get_mut(args[1]) {
                    if *left > 0 {
                        *left -= 1;
                        anyhow::bail!("remote hung up");
                    }
                }
            }
            Ok(String::new())
        }
    }

    fn config(secondary: bool) -> MirrorConfig {
        MirrorConfig {
            push: true,
            primary_remote: Some("origin".to_string()),
            secondary_remote: secondary.then(|| "backup".to_string()),
            retries: 1,
        }
    }

    #[test]
    fn disabled_mirror_does_nothing() {
        let git = FakeGit::default();
        let report = mirror(Path::new("."), &MirrorConfig::default(), &git, "msg").unwrap();
        assert!(!report.enabled);
        assert!(git.calls.borrow().is_empty());
    }

    #[test]
    fn primary_push_is_retried_once() {
        let git = FakeGit::failing("origin", 1);
        let report = mirror(Path::new("."), &config(false), &git, "publish m v1").unwrap();
        assert!(report.committed);
        assert_eq!(report.pushes[0].attempts, 2);
        assert!(report.pushes[0].ok);
        assert!(git
            .calls
            .borrow()
            .contains(&"commit -m publish m v1".to_string()));
    }

    #[test]
    fn primary_failure_is_fatal() {
        let git = FakeGit::failing("origin", 5);
        let err = mirror(Path::new("."), &config(true), &git, "msg").unwrap_err();
        assert!(err.to_string().contains("primary remote origin"));
        assert!(!git.calls.borrow().iter().any(|c| c.contains("backup")));
    }

    #[test]
    fn secondary_failure_is_reported_not_fatal() {
        let git = FakeGit::failing("backup", 5);
        let report = mirror(Path::new("."), &config(true), &git, "msg").unwrap();
        assert_eq!(report.pushes.len(), 2);
        assert!(report.pushes[0].ok);
        assert!(!report.pushes[1].ok);
        assert_eq!(report.pushes[1].attempts, 2);
    }

    #[test]
    fn nothing_staged_skips_commit() {
        let git = FakeGit::default();
        let report = mirror(Path::new("."), &config(false), &git, "msg").unwrap();
        assert!(!report.committed);
        assert!(!git.calls.borrow().iter().any(|c| c.starts_with("commit")));
    }

    #[test]
    fn push_without_primary_is_rejected() {
        let cfg = MirrorConfig {
            push: true,
            ..MirrorConfig::default()
        };
        assert!(mirror(Path::new("."), &cfg, &FakeGit::default(), "msg").is_err());
    }
}
