//! Process-control helpers shared across the workspace.

use std::convert::Infallible;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// The program and arguments this process was started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchArgs {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl LaunchArgs {
    /// Captures the current executable and its arguments, without `argv[0]`.
    pub fn current() -> io::Result<Self> {
        Ok(Self {
            program: std::env::current_exe()?,
            args: std::env::args_os().skip(1).collect(),
        })
    }

    /// A `Command` that starts the same program again with the same arguments
    /// and the same stdio.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

/// Starts a fresh copy of the process described by `launch` and exits the
/// current one with status 0.
///
/// Only returns if the new process could not be spawned. Nothing in the
/// current process is unwound or dropped once the spawn succeeds.
pub fn relaunch(launch: &LaunchArgs) -> io::Result<Infallible> {
    launch.command().spawn()?;
    std::process::exit(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_launch_points_at_this_executable() {
        let launch = LaunchArgs::current().unwrap();
        assert!(launch.program.exists());
    }

    #[test]
    fn command_preserves_program_and_arguments() {
        let launch = LaunchArgs {
            program: PathBuf::from("/usr/bin/ttvlol"),
            args: vec!["watch".into(), "some channel".into(), "--restart-on-ad".into()],
        };
        let cmd = launch.command();
        assert_eq!(cmd.get_program(), "/usr/bin/ttvlol");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["watch", "some channel", "--restart-on-ad"]);
    }

    #[test]
    fn relaunch_of_missing_program_returns_error() {
        let launch = LaunchArgs {
            program: PathBuf::from("/nonexistent/ttvlol"),
            args: vec!["watch".into(), "foo".into()],
        };
        let err = relaunch(&launch).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
