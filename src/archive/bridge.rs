//! Archive Tool Bridge Module
//!
//! Drives the bundled `7za` executable for the format that has no in-process
//! reader. The tool reports only through its exit code and combined
//! stdout/stderr, so every failure carries the full captured output.

use std::backtrace::Backtrace;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::debug;

use crate::archive::listing::{parse_listing, RawListingRecord};
use crate::archive::settle::Settle;
use crate::error::BridgeError;

// == Tool Location ==
/// Where the bundled tool lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLayout {
    /// Installed build: tool shipped under the resources directory
    Packaged(PathBuf),
    /// Source checkout: tool vendored next to the manifest
    Development(PathBuf),
}

impl ToolLayout {
    /// Packaged when a resources directory is known, development otherwise.
    pub fn detect(resources_dir: Option<&Path>) -> Self {
        match resources_dir {
            Some(dir) => ToolLayout::Packaged(dir.to_path_buf()),
            None => ToolLayout::Development(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
        }
    }

    fn root(&self) -> &Path {
        match self {
            ToolLayout::Packaged(root) | ToolLayout::Development(root) => root,
        }
    }

    /// `<root>/7zip-bin/<os>/<arch>/7za[.exe]` for the running platform.
    pub fn tool_path(&self) -> PathBuf {
        let (os, arch) = platform_dir();
        self.root()
            .join("7zip-bin")
            .join(os)
            .join(arch)
            .join(executable_name())
    }
}

/// Platform folder names used by the bundled tool layout.
pub fn platform_dir() -> (&'static str, &'static str) {
    let os = match std::env::consts::OS {
        "windows" => "win",
        "macos" => "mac",
        _ => "linux",
    };
    let arch = match std::env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        "arm" => "arm",
        other => other,
    };
    (os, arch)
}

fn executable_name() -> &'static str {
    if cfg!(windows) {
        "7za.exe"
    } else {
        "7za"
    }
}

// == Completion ==
/// Something the child process reported.
#[derive(Debug)]
pub(crate) enum ProcessEvent {
    Error(std::io::Error),
    Exit {
        code: Option<i32>,
        success: bool,
        output: String,
    },
}

/// Turns process events into the single result of one run.
pub(crate) struct Completion {
    program: String,
    origin: String,
    settle: Settle<Result<String, BridgeError>>,
}

impl Completion {
    pub(crate) fn new(
        program: String,
        origin: String,
    ) -> (Self, oneshot::Receiver<Result<String, BridgeError>>) {
        let (settle, outcome) = Settle::channel();
        (
            Self {
                program,
                origin,
                settle,
            },
            outcome,
        )
    }

    /// Records `event`; returns false when the run had already settled.
    pub(crate) fn on_event(&mut self, event: ProcessEvent) -> bool {
        if self.settle.is_settled() {
            debug!(program = %self.program, ?event, "Ignoring event after settlement");
            return false;
        }

        let result = match event {
            ProcessEvent::Error(source) => Err(BridgeError::Spawn {
                program: self.program.clone(),
                source,
            }),
            ProcessEvent::Exit {
                success: true,
                output,
                ..
            } => Ok(output),
            ProcessEvent::Exit { code, output, .. } => Err(BridgeError::NonZeroExit {
                program: self.program.clone(),
                code,
                output,
                origin: std::mem::take(&mut self.origin),
            }),
        };
        self.settle.settle(result)
    }
}

// == Seven Zip Bridge ==
/// Wrapper around the external archive tool.
#[derive(Debug, Clone)]
pub struct SevenZipBridge {
    program: PathBuf,
}

impl SevenZipBridge {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Uses `override_path` when given, otherwise the bundled tool for `layout`.
    pub fn resolve(override_path: Option<&Path>, layout: &ToolLayout) -> Self {
        match override_path {
            Some(path) => Self::new(path),
            None => Self::new(layout.tool_path()),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    // == List ==
    /// Lists the archive's entries without extracting anything.
    pub async fn list(&self, archive: &Path) -> Result<Vec<RawListingRecord>, BridgeError> {
        let output = self
            .cmd(&[
                OsStr::new("l"),
                OsStr::new("-slt"),
                OsStr::new("-ba"),
                archive.as_os_str(),
            ])
            .await?;
        Ok(parse_listing(&output))
    }

    // == Unpack ==
    /// Extracts the whole archive into `destination`, or the tool's working
    /// directory when `None`.
    pub async fn unpack(
        &self,
        archive: &Path,
        destination: Option<&Path>,
    ) -> Result<String, BridgeError> {
        let mut args: Vec<&OsStr> = vec![OsStr::new("x"), archive.as_os_str(), OsStr::new("-y")];
        let output_flag = destination.map(|dest| {
            let mut flag = OsString::from("-o");
            flag.push(dest.as_os_str());
            flag
        });
        if let Some(flag) = &output_flag {
            args.push(flag.as_os_str());
        }
        self.cmd(&args).await
    }

    // == Pack ==
    /// Adds `source` to the archive at `destination`, creating it if needed.
    pub async fn pack(&self, source: &Path, destination: &Path) -> Result<String, BridgeError> {
        self.cmd(&[OsStr::new("a"), destination.as_os_str(), source.as_os_str()])
            .await
    }

    /// Runs the tool with arbitrary arguments.
    pub async fn cmd<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<String, BridgeError> {
        run(&self.program, args).await
    }
}

// == Run ==
/// Runs `program` to completion and returns its combined output.
///
/// The backtrace is taken before spawning, whatever `RUST_BACKTRACE` says,
/// so a failure points at the caller.
pub async fn run<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> Result<String, BridgeError> {
    let label = program.display().to_string();
    let origin = Backtrace::force_capture().to_string();
    let (mut completion, outcome) = Completion::new(label.clone(), origin);

    debug!(program = %label, "Spawning archive tool");
    let spawned = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    match spawned {
        Err(err) => {
            completion.on_event(ProcessEvent::Error(err));
        }
        Ok(child) => match child.wait_with_output().await {
            Ok(output) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                completion.on_event(ProcessEvent::Exit {
                    code: output.status.code(),
                    success: output.status.success(),
                    output: combined,
                });
            }
            Err(err) => {
                completion.on_event(ProcessEvent::Error(err));
            }
        },
    }
    drop(completion);

    outcome
        .await
        .map_err(|_| BridgeError::Abandoned(label))?
}
