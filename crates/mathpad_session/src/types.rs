use serde::{Deserialize, Serialize};

/// Presentation tag attached to a history record by the command that
/// produced it. Carries no computation meaning.
///
/// The serialized names are part of the on-disk history format; renaming
/// them orphans previously written files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Icon {
    /// Plain evaluation (the default command path).
    #[serde(rename = "calculate")]
    Calculate,
    /// simplify / derive / rationalize commands.
    #[serde(rename = "function")]
    Function,
    /// Variable assignment.
    #[serde(rename = "equal")]
    Equal,
    /// A caught evaluation failure.
    #[serde(rename = "error")]
    Error,
    /// The informational "clear history" record.
    #[serde(rename = "delete_forever")]
    DeleteForever,
}

/// One evaluated command: the input line, the formatted result, and the
/// presentation tag chosen by the command that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub equation: String,
    pub result: String,
    pub icon: Icon,
}

impl HistoryRecord {
    pub fn new(equation: impl Into<String>, result: impl Into<String>, icon: Icon) -> Self {
        Self {
            equation: equation.into(),
            result: result.into(),
            icon,
        }
    }

    /// Two records are the same history entry when both equation and result
    /// match; the icon is not part of the identity.
    pub fn same_entry(&self, other: &HistoryRecord) -> bool {
        self.equation == other.equation && self.result == other.result
    }
}

/// Configuration for the bounded history cache.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Max retained records; the oldest is evicted past this.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 20 }
    }
}
