//! Running Android SDK tools with a timeout

use ddeck_core::prelude::*;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Run `program` with `args` and return its stdout
///
/// A non-zero exit status is an error carrying stderr.
pub async fn run_tool(program: &Path, args: &[&str], limit: Duration) -> Result<String> {
    let command_line = format!("{} {}", tool_name(program), args.join(" "));
    trace!("Running {}", command_line);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = timeout(limit, output)
        .await
        .map_err(|_| Error::timeout(&command_line, limit))?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found(tool_name(program))
            } else {
                Error::process(format!("Failed to run {}: {}", command_line, e))
            }
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::process(format!(
            "{} failed with exit code {:?}: {}",
            command_line,
            output.status.code(),
            stderr.trim()
        )));
    }

    Ok(stdout)
}

fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string())
}
