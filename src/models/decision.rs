//! Review decision for a needs-review channel

use serde::{Deserialize, Serialize};

use crate::models::EpgDataId;

/// User decision for a channel with more than one candidate
///
/// `Undecided` is distinct from `Skip`: only `Skip` is an explicit choice to
/// leave the channel unassigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    #[default]
    Undecided,
    Assign(EpgDataId),
    Skip,
}

impl Decision {
    pub fn is_decided(&self) -> bool {
        !matches!(self, Decision::Undecided)
    }

    /// Chosen EPG entry, if the decision assigns one
    pub fn epg_data_id(&self) -> Option<EpgDataId> {
        match self {
            Decision::Assign(id) => Some(*id),
            Decision::Undecided | Decision::Skip => None,
        }
    }
}

/// `Some(id)` assigns, `None` skips.
impl From<Option<EpgDataId>> for Decision {
    fn from(choice: Option<EpgDataId>) -> Self {
        match choice {
            Some(id) => Decision::Assign(id),
            None => Decision::Skip,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Undecided => write!(f, "undecided"),
            Decision::Assign(id) => write!(f, "assign({id})"),
            Decision::Skip => write!(f, "skip"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_and_undecided_are_distinct() {
        assert_ne!(Decision::Skip, Decision::Undecided);
        assert!(Decision::Skip.is_decided());
        assert!(!Decision::Undecided.is_decided());
        assert_eq!(Decision::Skip.epg_data_id(), None);
        assert_eq!(Decision::Assign(4).epg_data_id(), Some(4));
    }

    #[test]
    fn test_from_optional_choice() {
        assert_eq!(Decision::from(Some(9)), Decision::Assign(9));
        assert_eq!(Decision::from(None), Decision::Skip);
        assert_eq!(Decision::default(), Decision::Undecided);
    }
}
