// src/system/pipe.rs

//! Guarantees eventual closure of a pipe write end that its producer never
//! closes.
//!
//! Some host launch APIs write a child's output into a pipe but keep the write
//! end open for the lifetime of the host, so a consumer doing a blocking read
//! on the other end would hang forever once the child finishes. Binding a
//! [`PipeCloser`] to the child's handle spawns one background thread that
//! outlives the command: it waits for the process to terminate (normally or
//! otherwise) and then drops the write end unconditionally. Only *eventual*
//! closure is promised; a reader must be prepared to block until data arrives
//! or the closure happens.

use std::io::PipeWriter;
use std::process::Child;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the write end a producer will never close on its own.
#[derive(Debug)]
pub struct PipeCloser {
    writer: PipeWriter,
}

impl PipeCloser {
    pub fn new(writer: PipeWriter) -> Self {
        Self { writer }
    }

    /// Starts the background closer watching `child`.
    ///
    /// The thread polls the handle instead of holding the lock across a
    /// blocking wait, so callers remain free to kill the process through the
    /// same shared handle. Every error while waiting is swallowed; the write
    /// end is dropped in all cases once watching stops.
    pub fn bind_to_process(self, child: Arc<Mutex<Child>>) -> JoinHandle<()> {
        thread::spawn(move || {
            loop {
                match child.lock() {
                    Ok(mut guard) => match guard.try_wait() {
                        Ok(Some(status)) => {
                            log::debug!(
                                "Bound process exited with {}; releasing the pipe write end.",
                                status
                            );
                            break;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            log::warn!(
                                "Could not poll the bound process: {}. Releasing the pipe write end.",
                                e
                            );
                            break;
                        }
                    },
                    // A poisoned handle means another holder panicked
                    // mid-operation; stop watching and close anyway.
                    Err(_) => break,
                }
                thread::sleep(POLL_INTERVAL);
            }
            drop(self.writer);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::process::{Command, Stdio};

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn spawn_sh(script: &str) -> Arc<Mutex<Child>> {
        let child = Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        Arc::new(Mutex::new(child))
    }

    #[test]
    fn write_end_closes_after_normal_exit() {
        init_logs();
        let (mut reader, writer) = std::io::pipe().unwrap();
        let child = spawn_sh("exit 0");

        let closer = PipeCloser::new(writer).bind_to_process(Arc::clone(&child));

        // Nothing ever writes into the pipe: this read only returns because
        // the closer dropped the write end after the child exited.
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert!(buf.is_empty());

        closer.join().unwrap();
        child.lock().unwrap().wait().unwrap();
    }

    #[test]
    fn write_end_closes_after_external_termination() {
        init_logs();
        let (mut reader, writer) = std::io::pipe().unwrap();
        let child = spawn_sh("sleep 30");

        let closer = PipeCloser::new(writer).bind_to_process(Arc::clone(&child));
        child.lock().unwrap().kill().unwrap();

        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert!(buf.is_empty());

        closer.join().unwrap();
        child.lock().unwrap().wait().unwrap();
    }
}
