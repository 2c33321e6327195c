// src/system/executor.rs

//! Spawns the version-control client and exposes line-oriented streams over it.
//!
//! One [`Executor`] represents exactly one invocation of the external tool: the
//! record parsers that sit above this layer know how many lines a given command
//! produces and drain the reader fully before the next `exec`. The executor
//! merges the child's stderr into its stdout through a single anonymous pipe,
//! so diagnostics interleave with tagged output in emission order, exactly as
//! they would on a terminal.

use std::collections::HashMap;
use std::io::{self, BufReader, LineWriter, PipeReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{}' could not be started: {source}", argv.join(" "))]
    Launch {
        /// The argv that was handed to the OS, kept for diagnostics.
        argv: Vec<String>,
        #[source]
        source: io::Error,
    },
}

/// Creates [`Executor`] instances bound to a snapshot of environment
/// variables.
///
/// The connection registry resyncs this snapshot from its settings; replacing
/// it later never retroactively affects a process an existing executor has
/// already spawned, because every executor receives its own clone.
#[derive(Debug, Clone, Default)]
pub struct ExecutorFactory {
    env: HashMap<String, String>,
}

impl ExecutorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the environment snapshot used by subsequently created
    /// executors.
    pub fn set_env(&mut self, env: HashMap<String, String>) {
        self.env = env;
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Returns a fresh, unstarted executor carrying the current snapshot.
    pub fn new_executor(&self) -> Executor {
        Executor {
            env: self.env.clone(),
            child: None,
            reader: None,
            writer: None,
        }
    }
}

/// A single invocation of the external tool.
///
/// Not reusable across commands (one `exec` per lifecycle) and not safe for
/// concurrent use; a CI job that needs parallel commands takes one executor
/// per command from the factory.
#[derive(Debug)]
pub struct Executor {
    env: HashMap<String, String>,
    child: Option<Arc<Mutex<Child>>>,
    reader: Option<BufReader<PipeReader>>,
    writer: Option<LineWriter<ChildStdin>>,
}

impl Executor {
    /// Spawns the child process described by `argv`.
    ///
    /// Arguments are passed to the OS literally: no shell is involved and no
    /// metacharacter expands. stderr is merged into stdout through one pipe.
    /// Returns as soon as the OS hands back a live process handle; it does not
    /// wait for completion. Any reader or writer from a previous invocation on
    /// this instance is discarded first.
    ///
    /// # Errors
    ///
    /// [`ExecError::EmptyCommand`] when `argv` is empty, and
    /// [`ExecError::Launch`] (carrying the attempted argv) when the executable
    /// cannot be started.
    pub fn exec<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<(), ExecError> {
        self.close();
        self.child = None;

        let (program, args) = argv.split_first().ok_or(ExecError::EmptyCommand)?;

        // Both stdio slots of the child write into the same pipe, which is
        // what preserves the emission order of stdout and stderr lines.
        let (pipe_reader, pipe_writer) = io::pipe().map_err(|e| launch_error(argv, e))?;
        let stderr_writer = pipe_writer
            .try_clone()
            .map_err(|e| launch_error(argv, e))?;

        log::debug!(
            "Launching '{}' with {} argument(s).",
            program.as_ref(),
            args.len()
        );

        let mut child = Command::new(program.as_ref())
            .args(args.iter().map(AsRef::as_ref))
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::from(pipe_writer))
            .stderr(Stdio::from(stderr_writer))
            .spawn()
            .map_err(|e| launch_error(argv, e))?;

        self.writer = child.stdin.take().map(LineWriter::new);
        self.reader = Some(BufReader::new(pipe_reader));
        self.child = Some(Arc::new(Mutex::new(child)));
        Ok(())
    }

    /// The line reader over the merged stdout+stderr stream. `None` until a
    /// successful [`Executor::exec`].
    pub fn reader(&mut self) -> Option<&mut BufReader<PipeReader>> {
        self.reader.as_mut()
    }

    /// The line writer over the child's stdin, for commands that prompt for
    /// interactive input. `None` until a successful [`Executor::exec`].
    pub fn writer(&mut self) -> Option<&mut LineWriter<ChildStdin>> {
        self.writer.as_mut()
    }

    /// The shared process handle, for callers that need the exit status or
    /// want to terminate an in-flight command. This layer offers no
    /// cancellation of its own.
    pub fn process(&self) -> Option<Arc<Mutex<Child>>> {
        self.child.clone()
    }

    /// Releases the reader and writer of the current invocation.
    ///
    /// The two sides are closed independently: a failure on one never
    /// prevents closing the other, and every close-time I/O error is logged
    /// and suppressed so that teardown cannot mask a command's actual result.
    /// Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                log::warn!("Failed to flush the command's input stream on close: {}", e);
            }
        }
        // Dropping the reader closes the read end of the pipe.
        self.reader = None;
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.close();
    }
}

fn launch_error<S: AsRef<str>>(argv: &[S], source: io::Error) -> ExecError {
    ExecError::Launch {
        argv: argv.iter().map(|a| a.as_ref().to_string()).collect(),
        source,
    }
}
