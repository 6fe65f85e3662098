use super::output::{parse_formula_output, parse_operator_output};
use super::ChemistryEngine;
use crate::error::EvalError;
use crate::types::{MatchRecord, MechanismTier};
use rxn_common::ReactionSmiles;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Python run with `-c`; argv is `[op, reaction, dataset?]`. Always prints
/// exactly one JSON object as its last stdout line.
const BRIDGE_SCRIPT: &str = r#"
import json, sys
try:
    from evodex.evaluation import assign_evodex_F, match_operators
    op, reaction = sys.argv[1], sys.argv[2]
    if op == "formula":
        result = assign_evodex_F(reaction)
        if isinstance(result, set):
            result = sorted(result)
    else:
        result = sorted(match_operators(reaction, sys.argv[3]) or [])
    print(json.dumps({"ok": result}))
except Exception as exc:
    print(json.dumps({"error": f"{type(exc).__name__}: {exc}"}))
"#;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Interpreter with the `evodex` package installed. Searched on `PATH`
    /// (`python3`, then `python`) when unset.
    pub interpreter: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            interpreter: None,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Runs the EVODEX Python package in a subprocess, one process per query.
pub struct EvodexBridge {
    interpreter: PathBuf,
    timeout: Duration,
}

impl EvodexBridge {
    pub fn new(config: &BridgeConfig) -> Result<Self, EvalError> {
        let interpreter = match &config.interpreter {
            Some(path) => {
                let configured = path.to_string_lossy();
                let configured: &str = &configured;
                find_interpreter(&[configured])?
            }
            None => find_interpreter(&["python3", "python"])?,
        };
        tracing::info!("EVODEX bridge using interpreter {:?}", interpreter);
        Ok(Self::with_interpreter(interpreter, config.timeout))
    }

    pub fn with_interpreter(interpreter: PathBuf, timeout: Duration) -> Self {
        Self {
            interpreter,
            timeout,
        }
    }

    // TODO: keep one interpreter alive across queries; dataset loading
    // dominates the cost of every call.
    async fn run(&self, args: &[&str]) -> Result<String, EvalError> {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg("-c").arg(BRIDGE_SCRIPT).args(args);
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);

        tracing::debug!("EVODEX bridge call: {:?}", args);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| EvalError::Timeout {
                seconds: self.timeout.as_secs(),
            })?
            .map_err(EvalError::BridgeExecution)?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                "EVODEX bridge exited with {:?}: {}",
                output.status.code(),
                stderr.trim()
            );
        }
        Ok(stdout)
    }
}

#[async_trait::async_trait]
impl ChemistryEngine for EvodexBridge {
    fn name(&self) -> &str {
        "evodex"
    }

    async fn formula_match(
        &self,
        reaction: &ReactionSmiles,
    ) -> Result<Option<MatchRecord>, EvalError> {
        let stdout = self.run(&["formula", reaction.as_str()]).await?;
        let result = parse_formula_output(&stdout)?;
        tracing::info!("Formula match for {}: {:?}", reaction, result);
        Ok(result)
    }

    async fn mechanism_match(
        &self,
        reaction: &ReactionSmiles,
        tier: MechanismTier,
    ) -> Result<Vec<MatchRecord>, EvalError> {
        let stdout = self
            .run(&["operators", reaction.as_str(), tier.code()])
            .await?;
        let result = parse_operator_output(&stdout)?;
        tracing::info!("{} operator matches for {}: {}", tier, reaction, result.len());
        Ok(result)
    }
}

fn find_interpreter(candidates: &[&str]) -> Result<PathBuf, EvalError> {
    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.components().count() > 1 && path.exists() {
            return Ok(path);
        }
        if let Ok(found) = which::which(candidate) {
            return Ok(found);
        }
    }
    Err(EvalError::InterpreterNotFound(candidates.join(", ")))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    /// Writes an executable stand-in for python. It receives
    /// `-c <script> <op> <reaction> [dataset]` like the real interpreter.
    fn fake_interpreter(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("fake-python");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn reaction() -> ReactionSmiles {
        ReactionSmiles::parse("CCCO>>CCC=O").unwrap()
    }

    #[tokio::test]
    async fn test_formula_call_passes_reaction() {
        let dir = tempfile::tempdir().unwrap();
        let interp = fake_interpreter(
            &dir,
            r#"[ "$3" = "formula" ] && [ "$4" = "CCCO>>CCC=O" ] && echo '{"ok": "EVODEX.1-F1"}'"#,
        );
        let bridge = EvodexBridge::with_interpreter(interp, Duration::from_secs(5));
        let result = bridge.formula_match(&reaction()).await.unwrap();
        assert_eq!(result, Some(MatchRecord::new("EVODEX.1-F1")));
    }

    #[tokio::test]
    async fn test_operator_call_passes_dataset_code() {
        let dir = tempfile::tempdir().unwrap();
        let interp = fake_interpreter(
            &dir,
            r#"echo "loading"; echo "{\"ok\": [\"EVODEX.1-$5\"]}""#,
        );
        let bridge = EvodexBridge::with_interpreter(interp, Duration::from_secs(5));
        let result = bridge
            .mechanism_match(&reaction(), MechanismTier::Natural)
            .await
            .unwrap();
        assert_eq!(result, vec![MatchRecord::new("EVODEX.1-N")]);
    }

    #[tokio::test]
    async fn test_formula_candidates_keep_package_order() {
        let dir = tempfile::tempdir().unwrap();
        let interp = fake_interpreter(
            &dir,
            r#"echo '{"ok": ["EVODEX.1-F9", "EVODEX.1-F2"]}'"#,
        );
        let bridge = EvodexBridge::with_interpreter(interp, Duration::from_secs(5));
        let result = bridge.formula_match(&reaction()).await.unwrap();
        assert_eq!(result, Some(MatchRecord::new("EVODEX.1-F9")));
    }

    /// Runs the real bridge script against a stub `evodex` package.
    #[tokio::test]
    async fn test_bridge_script_orders_formula_and_operator_replies() {
        let Ok(python) = which::which("python3") else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("evodex");
        fs::create_dir(&package).unwrap();
        fs::write(package.join("__init__.py"), "").unwrap();
        fs::write(
            package.join("evaluation.py"),
            "def assign_evodex_F(reaction):\n    return ['EVODEX.1-F9', 'EVODEX.1-F2']\n\n\
             def match_operators(reaction, dataset):\n    return ['EVODEX.1-E9', 'EVODEX.1-E2']\n",
        )
        .unwrap();
        // `python -c` puts the working directory on sys.path.
        let interp = fake_interpreter(
            &dir,
            &format!("cd '{}' && exec '{}' \"$@\"", dir.path().display(), python.display()),
        );
        let bridge = EvodexBridge::with_interpreter(interp, Duration::from_secs(30));

        let formula = bridge.formula_match(&reaction()).await.unwrap();
        assert_eq!(formula, Some(MatchRecord::new("EVODEX.1-F9")));

        let operators = bridge
            .mechanism_match(&reaction(), MechanismTier::Enzymatic)
            .await
            .unwrap();
        assert_eq!(
            operators,
            vec![MatchRecord::new("EVODEX.1-E2"), MatchRecord::new("EVODEX.1-E9")]
        );
    }

    #[tokio::test]
    async fn test_engine_exception_is_a_fault() {
        let dir = tempfile::tempdir().unwrap();
        let interp = fake_interpreter(&dir, r#"echo '{"error": "ValueError: bad"}'"#);
        let bridge = EvodexBridge::with_interpreter(interp, Duration::from_secs(5));
        let err = bridge.formula_match(&reaction()).await.unwrap_err();
        assert!(matches!(err, EvalError::Engine(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let interp = fake_interpreter(&dir, "sleep 5");
        let bridge = EvodexBridge::with_interpreter(interp, Duration::from_millis(200));
        let err = bridge.formula_match(&reaction()).await.unwrap_err();
        assert!(matches!(err, EvalError::Timeout { .. }));
    }

    #[test]
    fn test_missing_interpreter() {
        let config = BridgeConfig {
            interpreter: Some(PathBuf::from("/nonexistent/python-for-rxn")),
            ..Default::default()
        };
        assert!(matches!(
            EvodexBridge::new(&config),
            Err(EvalError::InterpreterNotFound(_))
        ));
    }
}
