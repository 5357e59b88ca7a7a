//! Opening the selected note in an editor.
//!
//! The note content is written to a scratch file under the metadata
//! directory and handed to `$EDITOR` (tokenized with shell quoting rules).
//! The terminal UI is suspended for the lifetime of the editor process.
//! Without a usable editor, or when the editor cannot be started, the platform
//! opener is tried instead, which hands the file to a separate window and
//! does not suspend the UI.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while handing a note to an editor.
#[derive(Error, Debug)]
pub enum EditError {
    #[error("note name {0:?} cannot be used as a file name")]
    InvalidName(String),

    #[error("failed to write scratch file {path}: {source}")]
    ScratchWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse editor command {command:?}: {reason}")]
    EditorParse { command: String, reason: String },

    #[error("failed to launch `{program}`: {source}")]
    EditorLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {}", exit_label(.code))]
    EditorExit { program: String, code: Option<i32> },

    #[error("terminal suspend failed: {0}")]
    Terminal(#[source] io::Error),

    #[error("no opener could handle {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Note handed from the session to the edit flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteHandoff {
    pub name: String,
    pub content: String,
}

/// How the scratch file will be opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorCommand {
    /// Argument vector of the configured editor, without the file path.
    External(Vec<String>),
    /// Platform open action.
    PlatformOpen,
}

/// What happened when a note was opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditReport {
    /// The configured editor ran to completion with the UI suspended.
    Edited(PathBuf),
    /// The platform opener accepted the file.
    Opened(PathBuf),
}

/// Whether a child process gets the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attach {
    Terminal,
    Detached,
}

/// Pauses the UI around a blocking action.
pub trait Suspend {
    fn suspended<R>(&mut self, action: impl FnOnce() -> R) -> io::Result<R>;
}

/// Runs an external command to completion.
pub trait CommandRunner {
    fn run(&mut self, argv: &[String], attach: Attach) -> Result<(), EditError>;
}

/// [`CommandRunner`] backed by `std::process`.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, argv: &[String], attach: Attach) -> Result<(), EditError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(EditError::EditorParse {
                command: String::new(),
                reason: "empty command".into(),
            });
        };

        info!(?argv, "running");
        let mut cmd = Command::new(program);
        cmd.args(args);
        if attach == Attach::Detached {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }

        let status = cmd.status().map_err(|source| EditError::EditorLaunch {
            program: program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(EditError::EditorExit {
                program: program.clone(),
                code: status.code(),
            });
        }
        Ok(())
    }
}

/// Split an editor command the way a shell would. Blank means no editor.
pub fn resolve_editor(editor: Option<&str>) -> Result<EditorCommand, EditError> {
    let Some(raw) = editor.filter(|e| !e.trim().is_empty()) else {
        return Ok(EditorCommand::PlatformOpen);
    };
    let tokens = shell_words::split(raw).map_err(|err| EditError::EditorParse {
        command: raw.to_string(),
        reason: err.to_string(),
    })?;
    if tokens.is_empty() {
        return Ok(EditorCommand::PlatformOpen);
    }
    Ok(EditorCommand::External(tokens))
}

/// Scratch file for `note_name`, always directly inside `scratch_dir`.
pub fn scratch_path(scratch_dir: &Path, note_name: &str) -> Result<PathBuf, EditError> {
    let file_stem: String = note_name
        .chars()
        .map(|c| if std::path::is_separator(c) || c == '\0' { '_' } else { c })
        .collect();
    if file_stem.trim().is_empty() || file_stem == "." || file_stem == ".." {
        return Err(EditError::InvalidName(note_name.to_string()));
    }
    Ok(scratch_dir.join(format!("{file_stem}.txt")))
}

/// Open commands to try in order for the current platform.
pub fn platform_open_commands(path: &Path) -> Vec<Vec<String>> {
    let path = path.to_string_lossy().into_owned();
    if cfg!(target_os = "macos") {
        vec![
            vec!["open".into(), path.clone()],
            vec!["open".into(), "-e".into(), path],
        ]
    } else if cfg!(target_os = "windows") {
        vec![
            vec!["cmd".into(), "/C".into(), "start".into(), String::new(), path.clone()],
            vec!["notepad".into(), path],
        ]
    } else {
        vec![
            vec!["xdg-open".into(), path.clone()],
            vec!["gio".into(), "open".into(), path],
        ]
    }
}

/// Writes a note to its scratch file and opens it.
#[derive(Clone, Debug)]
pub struct NoteEditFlow {
    scratch_dir: PathBuf,
    editor: Option<String>,
}

impl NoteEditFlow {
    pub fn new(scratch_dir: impl Into<PathBuf>, editor: Option<String>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            editor,
        }
    }

    pub fn write_scratch(&self, note: &NoteHandoff) -> Result<PathBuf, EditError> {
        let path = scratch_path(&self.scratch_dir, &note.name)?;
        std::fs::write(&path, &note.content).map_err(|source| EditError::ScratchWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn open(
        &self,
        note: &NoteHandoff,
        ui: &mut impl Suspend,
        runner: &mut impl CommandRunner,
    ) -> Result<EditReport, EditError> {
        let path = self.write_scratch(note)?;

        let editor = resolve_editor(self.editor.as_deref()).unwrap_or_else(|err| {
            warn!("editor unusable, using platform opener: {err}");
            EditorCommand::PlatformOpen
        });
        if let EditorCommand::External(mut argv) = editor {
            argv.push(path.to_string_lossy().into_owned());
            let result = ui
                .suspended(|| runner.run(&argv, Attach::Terminal))
                .map_err(EditError::Terminal)?;
            match result {
                Ok(()) => return Ok(EditReport::Edited(path)),
                Err(err @ EditError::EditorLaunch { .. }) => {
                    warn!("editor unavailable, using platform opener: {err}");
                }
                Err(err) => return Err(err),
            }
        }

        open_with_platform(&path, runner)?;
        Ok(EditReport::Opened(path))
    }
}

fn open_with_platform(path: &Path, runner: &mut impl CommandRunner) -> Result<(), EditError> {
    let mut last_err = None;
    for argv in platform_open_commands(path) {
        match runner.run(&argv, Attach::Detached) {
            Ok(()) => return Ok(()),
            Err(err) => {
                warn!("open attempt failed: {err}");
                last_err = Some(err);
            }
        }
    }
    Err(EditError::OpenFailed {
        path: path.to_path_buf(),
        reason: last_err.map_or_else(|| "no opener configured".into(), |e| e.to_string()),
    })
}
