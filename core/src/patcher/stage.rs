use crate::error::{AppError, AppResult};

/// Where a registration is in its lifecycle.
///
/// `Start → Checked → RefInserted → BuildInserted → GroupInserted →
/// PhaseInserted → Committed`. Any non-terminal stage may fall to `Aborted`;
/// `AlreadyRegistered` is only reachable from `Start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchStage {
    /// Nothing inspected yet.
    Start,
    /// Registration check passed; the file is new.
    Checked,
    /// File reference record inserted.
    RefInserted,
    /// Build file record inserted.
    BuildInserted,
    /// Group membership inserted.
    GroupInserted,
    /// Build phase membership inserted.
    PhaseInserted,
    /// Final text written to storage.
    Committed,
    /// The file was already present; nothing to do.
    AlreadyRegistered,
    /// A step failed; nothing was written.
    Aborted,
}

impl PatchStage {
    /// The stage that follows on success, if any.
    pub fn successor(self) -> Option<PatchStage> {
        use PatchStage::*;
        match self {
            Start => Some(Checked),
            Checked => Some(RefInserted),
            RefInserted => Some(BuildInserted),
            BuildInserted => Some(GroupInserted),
            GroupInserted => Some(PhaseInserted),
            PhaseInserted => Some(Committed),
            Committed | AlreadyRegistered | Aborted => None,
        }
    }

    /// True for stages nothing can leave.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PatchStage::Committed | PatchStage::AlreadyRegistered | PatchStage::Aborted
        )
    }

    /// Moves to `to`, rejecting transitions the lifecycle does not allow.
    pub fn advance(self, to: PatchStage) -> AppResult<PatchStage> {
        let allowed = match to {
            PatchStage::Aborted => !self.is_terminal(),
            PatchStage::AlreadyRegistered => self == PatchStage::Start,
            _ => self.successor() == Some(to),
        };

        if allowed {
            tracing::debug!(from = ?self, to = ?to, "patch stage");
            Ok(to)
        } else {
            Err(AppError::InvalidStage { from: self, to })
        }
    }
}
