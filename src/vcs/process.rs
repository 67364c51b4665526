use crate::error::{Result, UpdateError};
use crate::logging::LogConfig;
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs external tools, quietly unless debug output is on.
#[derive(Debug, Clone, Copy)]
pub struct CommandRunner {
    log: LogConfig,
}

impl CommandRunner {
    pub fn new(log: LogConfig) -> Self {
        Self { log }
    }

    /// Runs `program args...` in `cwd` and returns its stdout.
    ///
    /// With debug output enabled the tool writes straight to the terminal
    /// and the returned string is empty.
    ///
    /// # Errors
    ///
    /// `CommandFailed` carrying the captured stderr when the tool exits
    /// non-zero; `Io` when it cannot be started at all.
    pub fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<String> {
        let display = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");

        match cwd {
            Some(dir) => log::debug!("Running `{}` in {}", display, dir.display()),
            None => log::debug!("Running `{}`", display),
        }

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        if self.log.show_command_output() {
            let status = cmd
                .stdin(Stdio::null())
                .status()
                .map_err(|e| spawn_error(&display, e))?;
            if !status.success() {
                return Err(UpdateError::CommandFailed {
                    command: display,
                    status: status.to_string(),
                    stderr: String::new(),
                });
            }
            return Ok(String::new());
        }

        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(&display, e))?;

        if !output.status.success() {
            return Err(UpdateError::CommandFailed {
                command: display,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn spawn_error(command: &str, e: std::io::Error) -> UpdateError {
    UpdateError::Io(std::io::Error::new(
        e.kind(),
        format!("Failed to run `{}`: {}", command, e),
    ))
}
