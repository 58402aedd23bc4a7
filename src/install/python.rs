//! Python interpreter discovery and virtual environment setup.
use anyhow::Result;
use std::path::Path;

use crate::error::SetupError;
use crate::exec::Executor;
use crate::logging::Log;

/// Interpreter names tried in order.
pub const INTERPRETERS: [&str; 2] = ["python3", "python"];

/// Minimum supported `(major, minor)` version.
pub const MIN_VERSION: (u32, u32) = (3, 8);

/// Prompt shown by shells inside the environment.
pub const VENV_PROMPT: &str = "shelpers-venv";

/// Refuse to run from inside an activated virtual environment.
///
/// # Errors
///
/// Returns [`SetupError::VirtualEnvActive`] if `virtual_env` is non-empty.
pub fn check_no_virtualenv(virtual_env: Option<&str>) -> Result<(), SetupError> {
    match virtual_env {
        Some(path) if !path.is_empty() => Err(SetupError::VirtualEnvActive(path.to_string())),
        _ => Ok(()),
    }
}

/// Parse `Python X.Y[.Z…]` into `(X, Y)`.
#[must_use]
pub fn parse_version(output: &str) -> Option<(u32, u32)> {
    let rest = output.trim().strip_prefix("Python ")?;
    let mut parts = rest.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor: String = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    Some((major, minor.parse().ok()?))
}

/// Find the first interpreter on `PATH` that satisfies [`MIN_VERSION`].
///
/// # Errors
///
/// Returns [`SetupError::UnexpectedVersion`] if a candidate prints something
/// that is not a Python version, or [`SetupError::NoInterpreter`] if no
/// candidate is recent enough.
pub fn find_interpreter(executor: &dyn Executor) -> Result<String, SetupError> {
    let (want_major, want_minor) = MIN_VERSION;
    for name in INTERPRETERS {
        if !executor.which(name) {
            continue;
        }
        let result = match executor.run_unchecked(name, &["--version"]) {
            Ok(result) if result.success => result,
            _ => continue,
        };
        // Python 2 prints its version to stderr.
        let text = if result.stdout.trim().is_empty() {
            result.stderr
        } else {
            result.stdout
        };
        match parse_version(&text) {
            None => {
                return Err(SetupError::UnexpectedVersion {
                    program: name.to_string(),
                    output: text.trim().to_string(),
                });
            }
            Some((major, minor)) if major == want_major && minor >= want_minor => {
                return Ok(name.to_string());
            }
            Some(_) => {}
        }
    }
    Err(SetupError::NoInterpreter(format!("{want_major}.{want_minor}")))
}

/// Create the virtual environment at `venv` unless it already exists.
///
/// With `force`, an existing environment is recreated with `--clear`.
/// Returns whether `venv` was (re)created.
///
/// # Errors
///
/// Returns an error if the `venv` module fails.
pub fn create_venv(
    executor: &dyn Executor,
    python: &str,
    venv: &Path,
    force: bool,
    log: &dyn Log,
) -> Result<bool> {
    let exists = venv.is_dir();
    if exists && !force {
        log.info("virtual environment already exists");
        return Ok(false);
    }

    let venv_arg = venv.to_string_lossy();
    let mut args = vec!["-m", "venv", &*venv_arg, "--prompt", VENV_PROMPT];
    if exists {
        args.push("--clear");
    }
    log.info("creating virtual environment");
    executor.run_visible(python, &args)?;
    Ok(true)
}

/// Upgrade pip and install `requirements` into the environment.
///
/// Returns `false` without running anything when `requirements` is absent.
///
/// # Errors
///
/// Returns an error if either pip invocation fails.
pub fn install_requirements(
    executor: &dyn Executor,
    venv_python: &Path,
    requirements: &Path,
    log: &dyn Log,
) -> Result<bool> {
    if !requirements.is_file() {
        log.info(&format!("no {} found", requirements.display()));
        return Ok(false);
    }
    let python = venv_python.to_string_lossy();
    let requirements = requirements.to_string_lossy();
    log.info("upgrading pip");
    executor.run_visible(&python, &["-m", "pip", "install", "--upgrade", "pip"])?;
    log.info("installing requirements");
    executor.run_visible(&python, &["-m", "pip", "install", "-r", &requirements])?;
    Ok(true)
}
