use super::{CollaboratorError, Geoprocessor, Invocation};
use crate::config::Defaults;
use std::io::{ErrorKind, Write};
use std::process::{ChildStdin, Command, Stdio};
use std::thread::JoinHandle;
use std::time::Instant;

/// Runs the backend program once per invocation.
///
/// The program receives its configured arguments followed by the operation
/// name, and reads the invocation as JSON from stdin. A non-zero exit is a
/// failure carrying the exit code and stderr.
#[derive(Debug, Clone)]
pub struct ExternalGeoprocessor {
    program: String,
    args: Vec<String>,
}

impl ExternalGeoprocessor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_defaults(defaults: &Defaults) -> Self {
        Self::new(defaults.backend.program.clone(), defaults.backend.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command_args(&self, invocation: &Invocation) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(invocation.operation.clone());
        args
    }

    fn log_command_start(&self, args: &[String], payload: &str) {
        tracing::debug!("Executing geoprocessor: {} {}", self.program, args.join(" "));
        tracing::trace!("Invocation payload: {} bytes", payload.len());
    }

    /// Feed the payload from a helper thread so the child's output pipes are
    /// drained concurrently. A child that exits without reading stdin closes
    /// the pipe; that is not a failure of the call.
    fn send_payload(mut stdin: ChildStdin, payload: Vec<u8>) -> JoinHandle<std::io::Result<()>> {
        std::thread::spawn(move || match stdin.write_all(&payload) {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!("Geoprocessor closed stdin before reading the whole payload");
                Ok(())
            }
            other => other,
        })
    }

    fn map_spawn_error(&self, err: std::io::Error) -> CollaboratorError {
        if err.kind() == std::io::ErrorKind::NotFound {
            CollaboratorError::NotFound(self.program.clone())
        } else {
            CollaboratorError::Spawn(err)
        }
    }
}

impl Geoprocessor for ExternalGeoprocessor {
    fn execute(&self, invocation: &Invocation) -> Result<(), CollaboratorError> {
        let payload = serde_json::to_string(invocation)?;
        let args = self.command_args(invocation);
        self.log_command_start(&args, &payload);

        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.map_spawn_error(e))?;

        let writer = child
            .stdin
            .take()
            .map(|stdin| Self::send_payload(stdin, payload.into_bytes()));
        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| {
                    CollaboratorError::Stdin(std::io::Error::other("stdin writer panicked"))
                })?
                .map_err(CollaboratorError::Stdin)?;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            tracing::info!("  {line}");
        }

        tracing::debug!(
            "{} finished with {:?} in {:?}",
            invocation.operation,
            output.status.code(),
            start.elapsed()
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(CollaboratorError::Failed {
                operation: invocation.operation.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::geo::call::{Call, DaysSinceLastRain};

    fn invocation() -> Invocation {
        Invocation::new(
            1,
            Call::DaysSinceLastRain(DaysSinceLastRain {
                data_dir: None,
                data_pattern: None,
                dst_dir: None,
                start_date: None,
                threshold: Some(1.0),
                max_days: None,
            }),
        )
    }

    #[test]
    fn test_program_receives_operation_and_payload() {
        let temp = tempfile::TempDir::new().unwrap();
        let capture = temp.path().join("captured.json");
        let script = format!(
            "test \"$1\" = analysis.calc_days_since_last_rainfall && cat > '{}'",
            capture.display()
        );
        let backend = ExternalGeoprocessor::new("sh", vec!["-c".to_string(), script, "sh".to_string()]);

        backend.execute(&invocation()).unwrap();

        let payload: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(capture).unwrap()).unwrap();
        assert_eq!(payload["step"], 1);
        assert_eq!(payload["arguments"]["threshold"], 1.0);
    }

    fn large_invocation(files: usize) -> Invocation {
        let mut invocation = invocation();
        invocation.inputs.insert(
            "current".to_string(),
            (0..files)
                .map(|i| std::path::PathBuf::from(format!("/data/chirps/chirps-v2.0.{i:06}.tif")))
                .collect(),
        );
        invocation
    }

    #[test]
    fn test_backend_ignoring_stdin_succeeds() {
        let backend =
            ExternalGeoprocessor::new("sh", vec!["-c".to_string(), "echo done".to_string()]);
        backend.execute(&large_invocation(5000)).unwrap();
    }

    #[test]
    fn test_backend_writing_before_reading() {
        // more output than a pipe buffer holds, then the payload
        let backend = ExternalGeoprocessor::new(
            "sh",
            vec![
                "-c".to_string(),
                "head -c 200000 /dev/zero | tr '\\0' x; cat > /dev/null".to_string(),
            ],
        );
        backend.execute(&large_invocation(5000)).unwrap();
    }

    #[test]
    fn test_non_zero_exit_is_failure() {
        let backend = ExternalGeoprocessor::new(
            "sh",
            vec!["-c".to_string(), "cat > /dev/null; echo bad tile >&2; exit 3".to_string()],
        );
        match backend.execute(&invocation()).unwrap_err() {
            CollaboratorError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "bad tile");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_program() {
        let backend = ExternalGeoprocessor::new("riskflow-geo-does-not-exist", Vec::new());
        assert!(matches!(
            backend.execute(&invocation()),
            Err(CollaboratorError::NotFound(_))
        ));
    }
}
