use serde::{Deserialize, Serialize};

/// What to do when one cell (a roll-number column or an answer row) receives
/// more than one candidate label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Keep the label offered last.
    #[default]
    LastMatch,
    /// Keep the label offered first.
    FirstMatch,
    /// Two different labels make the cell a conflict.
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    Empty,
    Picked(String),
    Conflict,
}

/// Accumulates candidate labels for one cell under a policy.
#[derive(Debug)]
pub(crate) struct Resolver {
    policy: ConflictPolicy,
    chosen: Option<String>,
    conflicting: bool,
}

impl Resolver {
    pub(crate) fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            chosen: None,
            conflicting: false,
        }
    }

    pub(crate) fn offer(&mut self, label: &str) {
        match self.policy {
            ConflictPolicy::LastMatch => self.chosen = Some(label.to_owned()),
            ConflictPolicy::FirstMatch => {
                if self.chosen.is_none() {
                    self.chosen = Some(label.to_owned());
                }
            }
            ConflictPolicy::Reject => {
                if let Some(prev) = &self.chosen {
                    if prev != label {
                        self.conflicting = true;
                    }
                } else {
                    self.chosen = Some(label.to_owned());
                }
            }
        }
    }

    pub(crate) fn resolve(self) -> Resolution {
        if self.conflicting {
            return Resolution::Conflict;
        }
        match self.chosen {
            Some(label) => Resolution::Picked(label),
            None => Resolution::Empty,
        }
    }
}
