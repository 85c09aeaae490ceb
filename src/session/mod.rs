//! Resolution orchestrator.
//!
//! A session takes the caller-supplied identifiers (board, optional cpu,
//! programmer, optional port), validates them against the catalog, and
//! specializes a working overlay in a fixed order: board subtree, selected
//! cpu subtree, upload tool subtree, programmer subtree. Each merge lands in
//! the overlay's top layer; the catalog is never mutated. A session that
//! fails any step is never handed back to the caller.

mod summary;

pub use summary::{UploadSummary, SUMMARY_SCHEMA_ID, SUMMARY_SCHEMA_VERSION};

use serde::Serialize;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::config::{extract_overlay_subtree, Overlay};
use crate::expand::{ExpandError, Expander};
use crate::runner::ProcessRunner;

/// Resolution errors. All are detected eagerly and propagated immediately;
/// none are recovered internally.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The board demands a cpu selection and none was given.
    #[error("board \"{board}\" requires a cpu selection (choices: {})", choices.join(", "))]
    MissingRequiredCpu { board: String, choices: Vec<String> },

    /// The selected cpu is not in the board's supported set.
    #[error("board \"{board}\" does not support cpu \"{cpu}\"")]
    UnsupportedCpu { board: String, cpu: String },

    /// A cpu was selected for a board with a fixed default.
    #[error("board \"{board}\" has a fixed default cpu; do not select one")]
    UnexpectedCpuOverride { board: String },

    /// A required configuration key is undefined at resolution time.
    #[error("undefined configuration key \"{0}\"")]
    MissingKey(String),

    /// Template expansion failed.
    #[error(transparent)]
    Expand(#[from] ExpandError),

    /// The external tool could not be launched.
    #[error("failed to launch upload command: {0}")]
    Runner(#[source] std::io::Error),

    /// The external tool exited nonzero. Surfaced verbatim, not classified.
    #[error("upload command exited with status {exit_code}")]
    ExternalProcessFailure { exit_code: i32 },
}

/// Caller-supplied identifiers for one resolution session.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub board: String,
    pub cpu: Option<String>,
    pub programmer: String,
    pub port: Option<String>,
}

/// Orchestrator progress. Single-pass; a failed session short-circuits and
/// is dropped rather than exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Initialized,
    Validated,
    BoardConfigApplied,
    CpuConfigApplied,
    ToolConfigApplied,
    ProgrammerConfigApplied,
    Ready,
}

/// Per-expansion overrides applied on a disposable overlay layer, never to
/// the session itself.
#[derive(Debug, Clone)]
pub struct BuildOverrides {
    pub path: String,
    pub project_name: String,
}

/// A fully resolved session, ready to expand template keys and run uploads.
#[derive(Debug)]
pub struct UploadSession<'a> {
    catalog: &'a Catalog,
    overlay: Overlay<'a>,
    expander: Expander,
    state: SessionState,
    request: UploadRequest,
}

impl<'a> UploadSession<'a> {
    /// Resolve a session against a catalog. Runs the whole state machine;
    /// on any failure the partial session is discarded.
    pub fn resolve(catalog: &'a Catalog, request: UploadRequest) -> Result<Self, SessionError> {
        let mut session = Self {
            catalog,
            overlay: Overlay::over_store(catalog.store()),
            expander: Expander::new(),
            state: SessionState::Initialized,
            request,
        };
        session.seed_identifiers();
        session.validate()?;
        session.apply_board_config();
        session.apply_cpu_config();
        session.apply_tool_config()?;
        session.apply_programmer_config();
        session.state = SessionState::Ready;
        Ok(session)
    }

    /// Write the identifiers into the working layer so templates can
    /// reference them (`{board}`, `{port}`, ...). The port is also exposed
    /// as `serial.port`, the key Arduino-style templates use.
    fn seed_identifiers(&mut self) {
        self.overlay.set("board", &self.request.board);
        self.overlay.set("programmer", &self.request.programmer);
        if let Some(cpu) = &self.request.cpu {
            self.overlay.set("cpu", cpu);
        }
        if let Some(port) = &self.request.port {
            self.overlay.set("port", port);
            self.overlay.set("serial.port", port);
        }
    }

    /// Check the cpu selection against the board's supported set.
    fn validate(&mut self) -> Result<(), SessionError> {
        let board = &self.request.board;
        let cpus = self.catalog.board_supported_cpus(board);
        if cpus.is_empty() {
            if self.request.cpu.is_some() {
                return Err(SessionError::UnexpectedCpuOverride {
                    board: board.clone(),
                });
            }
        } else {
            match &self.request.cpu {
                None => {
                    return Err(SessionError::MissingRequiredCpu {
                        board: board.clone(),
                        choices: cpus.into_iter().collect(),
                    });
                }
                Some(cpu) if !cpus.contains(cpu) => {
                    return Err(SessionError::UnsupportedCpu {
                        board: board.clone(),
                        cpu: cpu.clone(),
                    });
                }
                Some(_) => {}
            }
        }
        self.state = SessionState::Validated;
        Ok(())
    }

    fn apply_board_config(&mut self) {
        self.merge_subtree(&format!("boards.{}", self.request.board));
        self.state = SessionState::BoardConfigApplied;
    }

    fn apply_cpu_config(&mut self) {
        // Only the selected cpu's options; sibling cpus never leak in.
        if let Some(cpu) = self.request.cpu.clone() {
            self.merge_subtree(&format!("boards.{}.menu.cpu.{}", self.request.board, cpu));
            self.state = SessionState::CpuConfigApplied;
        }
    }

    fn apply_tool_config(&mut self) -> Result<(), SessionError> {
        let tool = self
            .overlay
            .get("upload.tool")
            .ok_or_else(|| SessionError::MissingKey("upload.tool".to_string()))?
            .to_string();
        self.merge_subtree(&format!("tools.{tool}"));
        self.state = SessionState::ToolConfigApplied;
        Ok(())
    }

    fn apply_programmer_config(&mut self) {
        self.merge_subtree(&format!("programmers.{}", self.request.programmer));
        self.state = SessionState::ProgrammerConfigApplied;
    }

    /// Extract a subtree from the effective overlay view and merge it into
    /// the top layer. Emptiness is not an error here.
    fn merge_subtree(&mut self, prefix: &str) {
        let subtree = extract_overlay_subtree(&self.overlay, prefix);
        self.overlay.merge(&subtree);
    }

    /// Current state; `Ready` for any session `resolve` returns.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Peek at a resolved key without expansion.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.overlay.get(key)
    }

    pub fn board(&self) -> &str {
        &self.request.board
    }

    pub fn cpu(&self) -> Option<&str> {
        self.request.cpu.as_deref()
    }

    pub fn programmer(&self) -> &str {
        &self.request.programmer
    }

    pub fn port(&self) -> Option<&str> {
        self.request.port.as_deref()
    }

    /// The resolved upload tool identifier.
    pub fn upload_tool(&self) -> Option<&str> {
        self.overlay.get("upload.tool")
    }

    /// Fully expand any template key against the session overlay.
    pub fn expand(&self, key: &str) -> Result<String, ExpandError> {
        self.expander.expand_key(&self.overlay, key)
    }

    /// Expand the `upload.pattern` template into an invocable command
    /// string. Build overrides go on a throwaway child layer, so repeated
    /// calls with different paths never interfere.
    pub fn upload_command(&self, build: Option<&BuildOverrides>) -> Result<String, ExpandError> {
        match build {
            Some(overrides) => {
                let mut scratch = Overlay::over(&self.overlay);
                scratch.set("build.path", &overrides.path);
                scratch.set("build.project_name", &overrides.project_name);
                self.expander.expand_key(&scratch, "upload.pattern")
            }
            None => self.expander.expand_key(&self.overlay, "upload.pattern"),
        }
    }

    /// Expand `upload.pattern` and hand it to the runner. The runner's exit
    /// status is surfaced verbatim; nonzero is an error, not interpreted.
    pub fn upload(
        &self,
        runner: &dyn ProcessRunner,
        build: Option<&BuildOverrides>,
    ) -> Result<(), SessionError> {
        let command = self.upload_command(build)?;
        let exit_code = runner.execute(&command).map_err(SessionError::Runner)?;
        if exit_code != 0 {
            return Err(SessionError::ExternalProcessFailure { exit_code });
        }
        Ok(())
    }

    /// Summary artifact for an expanded command.
    pub fn summary(&self, command: &str) -> UploadSummary {
        UploadSummary::new(self, command)
    }
}
