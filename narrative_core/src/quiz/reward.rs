//! Reward tiers awarded at quiz completion.

use serde::{Deserialize, Serialize};

/// One of four fixed categories assigned from the final score ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardTier {
    /// Every answer correct.
    Gold,
    /// At least 70%.
    Silver,
    /// At least 40%.
    Bronze,
    Participation,
}

impl RewardTier {
    /// Map `score / total` onto a tier.
    ///
    /// Thresholds are inclusive lower bounds checked from the top down. The
    /// comparison is done on integers so 7/10 lands on Silver exactly.
    pub fn for_score(score: usize, total: usize) -> Self {
        if total == 0 {
            return RewardTier::Participation;
        }

        let scaled = score * 10;
        if score == total {
            RewardTier::Gold
        } else if scaled >= total * 7 {
            RewardTier::Silver
        } else if scaled >= total * 4 {
            RewardTier::Bronze
        } else {
            RewardTier::Participation
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RewardTier::Gold => "Gold Medal",
            RewardTier::Silver => "Silver Medal",
            RewardTier::Bronze => "Bronze Medal",
            RewardTier::Participation => "Participation Star",
        }
    }
}

impl std::fmt::Display for RewardTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
