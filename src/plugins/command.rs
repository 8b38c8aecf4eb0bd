//! Plugins implemented as external executables.

use super::{Plugin, PluginFailure};
use crate::render::TemplateEngine;
use crate::types::Site;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O with plugin process failed: {0}")]
    Io(#[from] io::Error),
    #[error("{status}{}", stderr_suffix(.stderr))]
    Exit { status: ExitStatus, stderr: String },
    #[error("plugin output is not a valid site: {0}")]
    Json(#[from] serde_json::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// An executable that transforms the site over stdin/stdout.
///
/// The process runs with the project root as its working directory. It
/// receives the site as one JSON document on stdin and must write the
/// transformed site, in the same shape, to stdout before exiting with
/// status 0. Anything written to stderr is reported if the plugin fails.
///
/// Command plugins cannot register template filters or helpers; that takes
/// an in-process [`Plugin`].
#[derive(Debug, Clone)]
pub struct CommandPlugin {
    program: PathBuf,
    project_root: PathBuf,
}

impl CommandPlugin {
    pub fn new(program: PathBuf, project_root: PathBuf) -> Self {
        Self {
            program,
            project_root,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, site: &Site) -> Result<Site, CommandError> {
        let input = serde_json::to_vec(site)?;

        let mut child = Command::new(&self.program)
            .current_dir(&self.project_root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from a second thread so a plugin that streams its
        // output before reading all input cannot deadlock on a full pipe.
        let stdin = child.stdin.take();
        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || -> io::Result<()> {
                if let Some(mut stdin) = stdin {
                    match stdin.write_all(&input) {
                        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                        _ => {}
                    }
                }
                Ok(())
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            output.and_then(|output| written.map(|()| output))
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(CommandError::Exit {
                status: output.status,
                stderr,
            });
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(plugin = %self.program.display(), "{}", stderr.trim());
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

impl Plugin for CommandPlugin {
    fn apply(&self, site: Site, _: &mut TemplateEngine) -> Result<Site, PluginFailure> {
        tracing::debug!(program = %self.program.display(), "running plugin process");
        Ok(self.run(&site)?)
    }
}
