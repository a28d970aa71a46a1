//! Milestone achievements derived from completed-letter counts.

use crate::model::alphabet::ALPHABET_LEN;
use serde::Serialize;

/// Letter-count milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstLetter,
    FiveLetters,
    TenLetters,
    AllLetters,
}

impl Achievement {
    pub const ALL: [Achievement; 4] = [
        Self::FirstLetter,
        Self::FiveLetters,
        Self::TenLetters,
        Self::AllLetters,
    ];

    /// Stable id shared with clients.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstLetter => "first_letter",
            Self::FiveLetters => "five_letters",
            Self::TenLetters => "ten_letters",
            Self::AllLetters => "all_letters",
        }
    }

    /// Completed letters needed to unlock.
    pub fn threshold(self) -> usize {
        match self {
            Self::FirstLetter => 1,
            Self::FiveLetters => 5,
            Self::TenLetters => 10,
            Self::AllLetters => ALPHABET_LEN,
        }
    }
}

/// Returns every achievement unlocked at `completed_letters`.
pub fn unlocked(completed_letters: usize) -> Vec<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|achievement| completed_letters >= achievement.threshold())
        .collect()
}

/// Returns achievements crossed when moving from `before` to `after`.
pub fn newly_unlocked(before: usize, after: usize) -> Vec<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|achievement| before < achievement.threshold() && after >= achievement.threshold())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{newly_unlocked, unlocked, Achievement};

    #[test]
    fn unlocked_follows_thresholds() {
        assert!(unlocked(0).is_empty());
        assert_eq!(unlocked(5), vec![Achievement::FirstLetter, Achievement::FiveLetters]);
        assert_eq!(unlocked(29).len(), 4);
    }

    #[test]
    fn newly_unlocked_reports_only_crossed_milestones() {
        assert_eq!(newly_unlocked(0, 1), vec![Achievement::FirstLetter]);
        assert!(newly_unlocked(1, 1).is_empty());
        assert_eq!(newly_unlocked(9, 10), vec![Achievement::TenLetters]);
    }
}
