//! Running lpac as a child process

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread;

use crossbeam_channel::{RecvTimeoutError, bounded};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::LpacConfig;
use crate::error::{LpacError, Result};
use crate::output::parse_output;

/// Run `lpac <args>` against the card with `aid` and return the result data
///
/// The child is killed when it does not finish within the configured
/// timeout.
pub(crate) fn run(config: &LpacConfig, aid: &str, args: &[&str]) -> Result<Value> {
    let program = config.executable();
    let joined = args.join(" ");
    debug!(command = %joined, %aid, "Running lpac");

    let mut command = Command::new(&program);
    command
        .args(args)
        .current_dir(&config.dir)
        .env("LPAC_APDU", &config.apdu_backend)
        .env("LPAC_HTTP", &config.http_backend)
        .env("LPAC_CUSTOM_ISD_R_AID", aid)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(ifid) = &config.driver_ifid {
        command.env("LPAC_APDU_PCSC_DRV_IFID", ifid);
    }
    if config.debug_apdu {
        command.env("LIBEUICC_DEBUG_APDU", "1");
    }
    if config.debug_http {
        command.env("LIBEUICC_DEBUG_HTTP", "1");
    }

    let mut child = command
        .spawn()
        .map_err(|source| LpacError::Spawn { program, source })?;
    forward_stderr(&mut child);

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("lpac stdout was not captured"))?;
    let (tx, rx) = bounded(1);
    let reader = thread::Builder::new()
        .name("lpac-stdout".into())
        .spawn(move || {
            let mut buf = String::new();
            let read = stdout.read_to_string(&mut buf).map(|_| buf);
            // Caller may have timed out already
            let _ = tx.send(read);
        });
    if let Err(e) = reader {
        kill(&mut child);
        return Err(e.into());
    }

    let timeout = config.timeout();
    let stdout = match rx.recv_timeout(timeout) {
        Ok(read) => read,
        Err(RecvTimeoutError::Timeout) => {
            warn!(command = %joined, ?timeout, "lpac timed out, killing it");
            kill(&mut child);
            return Err(LpacError::Timeout {
                command: joined,
                timeout,
            });
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(std::io::Error::other("lpac stdout reader stopped"))
        }
    };
    let stdout = match stdout {
        Ok(stdout) => stdout,
        Err(e) => {
            kill(&mut child);
            return Err(e.into());
        }
    };

    let status = child.wait()?;
    trace!(command = %joined, %status, "lpac exited");

    parse_output(&stdout)?.ok_or_else(|| LpacError::NoResult {
        status: status.to_string(),
    })
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "Failed to kill lpac");
    }
    // Reap the child
    let _ = child.wait();
}

/// Forward lpac's stderr (debug output) to the log line by line
fn forward_stderr(child: &mut Child) {
    let Some(stderr) = child.stderr.take() else {
        return;
    };
    let spawned = thread::Builder::new()
        .name("lpac-stderr".into())
        .spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                debug!(target: "lpac", "{line}");
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Could not forward lpac stderr");
    }
}
