//! Error and refusal types surfaced by the dialogue runtime.
use std::fmt;

/// Problems detected while building scripts or reading dialogue configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueConfigError {
    EmptyScript { speaker_label: String },
    Read { path: String, message: String },
    Parse { path: String, message: String },
}

impl fmt::Display for DialogueConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyScript { speaker_label } => {
                write!(f, "Dialogue script for {} has no lines", speaker_label)
            }
            Self::Read { path, message } => write!(f, "Failed to read {}: {}", path, message),
            Self::Parse { path, message } => write!(f, "Failed to parse {}: {}", path, message),
        }
    }
}

impl std::error::Error for DialogueConfigError {}

/// Reasons a session operation was refused. Refusals are expected outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueRefusal {
    /// `start` while the session is already running.
    AlreadyActive,
    /// `advance`/`end` while the session is not running.
    NotActive,
    /// `start` on a finished, non-repeatable script.
    Exhausted,
    /// The NPC was configured without a script.
    MissingScript,
}

impl fmt::Display for DialogueRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AlreadyActive => "session already active",
            Self::NotActive => "session not active",
            Self::Exhausted => "dialogue finished and cannot repeat",
            Self::MissingScript => "no dialogue script configured",
        };
        write!(f, "{}", label)
    }
}

/// Failure reported by an external subscriber or hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    Failed { message: String },
    Panicked { message: String },
}

impl HookError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn panicked(message: impl Into<String>) -> Self {
        Self::Panicked {
            message: message.into(),
        }
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { message } => write!(f, "subscriber failed: {}", message),
            Self::Panicked { message } => write!(f, "subscriber panicked: {}", message),
        }
    }
}

impl std::error::Error for HookError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_readable_messages() {
        let empty = DialogueConfigError::EmptyScript {
            speaker_label: "Ink Master".into(),
        };
        assert!(empty.to_string().contains("Ink Master"));

        let parse = DialogueConfigError::Parse {
            path: "config/dialogue.toml".into(),
            message: "expected table".into(),
        };
        assert!(parse.to_string().starts_with("Failed to parse config/dialogue.toml"));

        assert_eq!(
            HookError::panicked("boom").to_string(),
            "subscriber panicked: boom"
        );
        assert_eq!(DialogueRefusal::Exhausted.to_string(), "dialogue finished and cannot repeat");
    }
}
