//! Run a server as a child process and call it over its stdin/stdout.
//!
//! The child's stderr is its log stream; each line is forwarded to
//! `tracing` from a background thread.

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use cborpc_frame::FrameConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::Client;
use crate::error::{Result, RpcError};

/// A child process speaking the protocol on its stdin/stdout.
pub struct ChildProcess {
    child: Child,
    client: Option<Client<ChildStdout, ChildStdin>>,
    stderr_forwarder: Option<JoinHandle<()>>,
    reaped: bool,
}

impl ChildProcess {
    /// Spawn `program` with `args` using default frame configuration.
    pub fn spawn<I, S>(program: impl AsRef<OsStr>, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self::spawn_with_config(program, args, FrameConfig::default())
    }

    /// Spawn `program` with `args` and explicit frame configuration.
    pub fn spawn_with_config<I, S>(
        program: impl AsRef<OsStr>,
        args: I,
        config: FrameConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = program.as_ref();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RpcError::Spawn {
                program: program.to_string_lossy().into_owned(),
                source,
            })?;

        let pid = child.id();
        tracing::debug!(pid, program = %program.to_string_lossy(), "spawned server process");

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RpcError::Io(std::io::Error::other("child stdio not captured")));
        };

        let stderr_forwarder = child.stderr.take().map(|stderr| {
            std::thread::spawn(move || {
                for line in BufReader::new(stderr).lines() {
                    match line {
                        Ok(line) => tracing::info!(target: "cborpc::child", pid, "{line}"),
                        Err(err) => {
                            tracing::debug!(pid, error = %err, "child stderr closed");
                            break;
                        }
                    }
                }
            })
        });

        Ok(Self {
            child,
            client: Some(Client::with_config(stdout, stdin, config)),
            stderr_forwarder,
            reaped: false,
        })
    }

    /// OS process id of the child.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Call `method` on the child and wait for its reply.
    pub fn call<A, T>(&mut self, method: &str, args: &A) -> Result<T>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let client = self.client.as_mut().ok_or(RpcError::ConnectionClosed)?;
        client.call(method, args)
    }

    /// Close the child's stdin and wait for it to exit.
    ///
    /// A well-behaved server sees end-of-stream and exits on its own.
    pub fn stop(&mut self) -> Result<ExitStatus> {
        self.client = None;
        self.wait()
    }

    /// Close the child's stdin, send SIGTERM, and wait for it to exit.
    #[cfg(unix)]
    pub fn terminate(&mut self) -> Result<ExitStatus> {
        self.client = None;
        if !self.reaped {
            let pid = libc::pid_t::try_from(self.child.id())
                .map_err(|_| RpcError::Io(std::io::Error::other("pid out of range")))?;
            // SAFETY: kill(2) has no memory-safety preconditions; the pid belongs to
            // a child we have not reaped yet, so it cannot have been recycled.
            let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
            if rc != 0 {
                let err = std::io::Error::last_os_error();
                if err.raw_os_error() != Some(libc::ESRCH) {
                    return Err(RpcError::Io(err));
                }
            }
        }
        self.wait()
    }

    fn wait(&mut self) -> Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        if let Some(handle) = self.stderr_forwarder.take() {
            let _ = handle.join();
        }
        tracing::debug!(pid = self.child.id(), %status, "server process exited");
        Ok(status)
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        self.client = None;
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn spawn_failure_names_program() {
        let err = ChildProcess::spawn("/nonexistent/cborpc-server", std::iter::empty::<&str>())
            .err()
            .expect("spawn should fail");
        match err {
            RpcError::Spawn { program, .. } => assert_eq!(program, "/nonexistent/cborpc-server"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stop_closes_stdin_and_waits() {
        // cat exits once its stdin reaches end-of-file
        let mut child = ChildProcess::spawn("cat", std::iter::empty::<&str>()).expect("spawn cat");
        let status = child.stop().expect("stop");
        assert!(status.success());
        assert!(matches!(
            child.call::<_, i64>("Arith.Multiply", &()),
            Err(RpcError::ConnectionClosed)
        ));
    }

    #[test]
    fn terminate_sends_sigterm() {
        let mut child = ChildProcess::spawn("sleep", ["30"]).expect("spawn sleep");
        let status = child.terminate().expect("terminate");
        assert!(!status.success());
    }

    #[test]
    fn call_round_trips_through_cat() {
        // cat echoes the request frame: same Seq, no Error, args as reply
        let mut child = ChildProcess::spawn("cat", std::iter::empty::<&str>()).expect("spawn cat");
        let reply: i64 = child.call("Echo.Value", &5i64).expect("echoed call");
        assert_eq!(reply, 5);
        assert!(child.stop().expect("stop").success());
    }
}
