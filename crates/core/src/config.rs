use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Nightmare,
}

/// Per-difficulty scheduling rule. `slot_minimum` is both the number of
/// slots a new game starts with and the floor below which removal is
/// refused. `deal_limit` bounds how many slots are dealt from in one
/// tick; `None` means every available slot is dealt from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifficultyRule {
    pub difficulty: Difficulty,
    pub slot_minimum: usize,
    pub deal_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub difficulties: Vec<DifficultyRule>,
    pub tick_interval_ms: u64,
    pub shuffle_coefficient: u32,
    pub max_deck_count: u32,
    pub default_deck_count: u32,
}

impl GameConfig {
    pub fn difficulty_rule(&self, difficulty: Difficulty) -> Option<&DifficultyRule> {
        self.difficulties
            .iter()
            .find(|rule| rule.difficulty == difficulty)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulties: vec![
                DifficultyRule {
                    difficulty: Difficulty::Easy,
                    slot_minimum: 1,
                    deal_limit: Some(1),
                },
                DifficultyRule {
                    difficulty: Difficulty::Medium,
                    slot_minimum: 2,
                    deal_limit: Some(2),
                },
                DifficultyRule {
                    difficulty: Difficulty::Hard,
                    slot_minimum: 4,
                    deal_limit: Some(4),
                },
                DifficultyRule {
                    difficulty: Difficulty::Nightmare,
                    slot_minimum: 6,
                    deal_limit: None,
                },
            ],
            tick_interval_ms: 300,
            shuffle_coefficient: 2,
            max_deck_count: 10,
            default_deck_count: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_cover_every_tier() {
        let config = GameConfig::default();
        for (difficulty, limit) in [
            (Difficulty::Easy, Some(1)),
            (Difficulty::Medium, Some(2)),
            (Difficulty::Hard, Some(4)),
            (Difficulty::Nightmare, None),
        ] {
            let rule = config.difficulty_rule(difficulty).unwrap();
            assert_eq!(rule.deal_limit, limit);
            assert_eq!(rule.slot_minimum, limit.unwrap_or(6));
        }
        assert_eq!(config.tick_interval_ms, 300);
        assert_eq!(config.shuffle_coefficient, 2);
    }
}
