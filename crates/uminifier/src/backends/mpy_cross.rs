//! mpy_cross.rs — Lancement de `mpy-cross <args> -o <output> <input>`.
//!
//! stdout hérité (le compilateur parle directement au terminal), stderr
//! capturé par un thread lecteur pour être rapporté en cas d'échec.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use log::{debug, warn};

use super::{Compile, CompileError, CompileOutcome};
use crate::config::CompilerConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct MpyCross {
    program: Utf8PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl MpyCross {
    pub fn new(cfg: &CompilerConfig) -> Self {
        Self { program: cfg.program.clone(), args: cfg.args.clone(), timeout: cfg.timeout() }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(self.program.as_std_path());
        cmd.args(&self.args)
            .arg("-o")
            .arg(output)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped());
        cmd
    }

    fn wait(&self, child: &mut Child) -> io::Result<(ExitStatus, bool)> {
        let Some(limit) = self.timeout else {
            return child.wait().map(|status| (status, false));
        };
        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok((status, false));
            }
            if Instant::now() >= deadline {
                warn!("{} still running after {}s, killing it", self.program, limit.as_secs_f32());
                child.kill()?;
                return child.wait().map(|status| (status, true));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Default for MpyCross {
    fn default() -> Self {
        Self::new(&CompilerConfig::default())
    }
}

impl Compile for MpyCross {
    fn name(&self) -> &str {
        self.program.as_str()
    }

    fn compile(&self, input: &Path, output: &Path) -> Result<CompileOutcome, CompileError> {
        let mut cmd = self.command(input, output);
        debug!("exec: {cmd:?}");
        let mut child = cmd.spawn().map_err(|source| CompileError::Launch {
            program: self.program.to_string(),
            source,
        })?;

        let reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                if let Err(e) = pipe.read_to_end(&mut buf) {
                    warn!("stderr capture interrupted: {e}");
                }
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        let (status, timed_out) = self.wait(&mut child).map_err(|source| CompileError::Wait {
            program: self.program.to_string(),
            source,
        })?;
        let stderr = reader.and_then(|h| h.join().ok()).unwrap_or_default();
        debug!("{} exited with {status}", self.program);

        Ok(CompileOutcome { exit_code: status.code(), stderr, timed_out })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_line_layout() {
        let cfg = CompilerConfig {
            program: "mpy-cross-1.22".into(),
            args: vec!["-march=armv7m".into(), "-O2".into()],
            timeout_secs: None,
        };
        let cmd = MpyCross::new(&cfg).command(Path::new("/w/imain.py"), Path::new("/w/main.mpy"));
        assert_eq!(cmd.get_program(), "mpy-cross-1.22");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["-march=armv7m", "-O2", "-o", "/w/main.mpy", "/w/imain.py"]);
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let cfg = CompilerConfig { program: "/nonexistent/mpy-cross".into(), ..CompilerConfig::default() };
        let err = MpyCross::new(&cfg).compile(Path::new("a.py"), Path::new("a.mpy")).unwrap_err();
        assert!(matches!(err, CompileError::Launch { ref program, .. } if program == "/nonexistent/mpy-cross"));
    }

    #[test]
    fn timeout_comes_from_config() {
        let cfg = CompilerConfig { timeout_secs: Some(3), ..CompilerConfig::default() };
        assert_eq!(MpyCross::new(&cfg).timeout, Some(Duration::from_secs(3)));
        assert_eq!(MpyCross::default().timeout, None);
    }
}
