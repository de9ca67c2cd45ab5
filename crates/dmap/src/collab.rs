//! Configuration for the external fitting collaborators.
//!
//! The fitters themselves run out of process and are not part of this
//! crate. Historically their configuration leaked in through process
//! environment variables set just before the call; this module re-expresses
//! that as an explicit struct the caller builds and hands to the
//! invocation, so nothing about the collaborator lives in ambient process
//! state.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Explicit configuration for invoking the external fitting program on an
/// encoded record file.
#[derive(Debug, Clone)]
pub struct FitterConfig {
    /// The fitter executable.
    pub program: PathBuf,
    /// Working directory the fitter may scribble in.
    pub sandbox_dir: PathBuf,
    /// Directory layout template the fitter's library expects.
    pub dir_format: String,
}

impl FitterConfig {
    /// Creates a configuration with the conventional directory template.
    pub fn new(program: impl Into<PathBuf>, sandbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            sandbox_dir: sandbox_dir.into(),
            dir_format: "%(dirtree)s/".to_owned(),
        }
    }

    /// The environment the fitter expects, as explicit pairs rather than
    /// mutations of this process's environment.
    pub fn env_pairs(&self) -> Vec<(&'static str, OsString)> {
        vec![
            ("DAVIT_LOCALDIR", self.sandbox_dir.clone().into_os_string()),
            ("DAVIT_DIRFORMAT", OsString::from(self.dir_format.clone())),
        ]
    }

    /// Builds the fitter invocation for one input record file. The caller
    /// decides when (and whether) to spawn it and where stdout goes.
    pub fn command(&self, input: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-new").arg(input);
        cmd.current_dir(&self.sandbox_dir);
        cmd.envs(self.env_pairs());
        cmd
    }
}
