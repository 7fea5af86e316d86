use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One weight per counted rank, indexed by `rank - 1` for ranks 1..=13.
pub const RANK_WEIGHTS: usize = 13;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrategyId(pub usize);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("unknown strategy id {0}")]
    Unknown(usize),
    #[error("strategy \"{0}\" is built-in and cannot be edited")]
    BuiltIn(String),
}

/// A named card-counting system: a signed weight per rank. The joker has
/// no weight; it triggers a quiz instead of a count update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Strategy {
    name: String,
    description: String,
    weights: [i32; RANK_WEIGHTS],
    custom: bool,
}

impl Strategy {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        weights: [i32; RANK_WEIGHTS],
        custom: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            weights,
            custom,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn weights(&self) -> &[i32; RANK_WEIGHTS] {
        &self.weights
    }

    pub fn is_custom(&self) -> bool {
        self.custom
    }

    /// Weight of a counted rank. Never call this for the joker.
    pub fn weight(&self, rank: u16) -> i32 {
        debug_assert!((1..=13).contains(&rank), "weight lookup for rank {rank}");
        self.weights[(rank - 1) as usize]
    }

    pub fn update_weight(&self, current: i32, rank: u16) -> i32 {
        current + self.weight(rank)
    }
}

/// Roster of strategies: the immutable built-ins plus any user-defined
/// ones. The book is the contract surface for the external strategy
/// editor: it hands out ids, enforces that only custom entries mutate,
/// and serializes for whatever persistence layer sits on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyBook {
    items: Vec<Strategy>,
}

impl StrategyBook {
    /// The seven shipped counting systems.
    pub fn builtin() -> Self {
        let items = vec![
            Strategy::new(
                "Hi-Opt I Count",
                "The Hi-Opt I blackjack card counting system was developed by Charles Einstein and \
                 introduced in his book \"The World's Greatest Blackjack Book\" in 1980. The Hi-Opt I \
                 system assigns point values to each card in the deck and is a more complex system \
                 than the Hi-Lo system, with additional point values for some cards. It is considered \
                 a more powerful system than the Hi-Lo, but also more difficult to learn and use \
                 effectively.",
                [0, 0, 1, 1, 1, 1, 0, 0, 0, -1, -1, -1, -1],
                false,
            ),
            Strategy::new(
                "Hi-Lo Count",
                "The Hi-Lo blackjack card counting system was first introduced by Harvey Dubner in \
                 1963. Dubner's goal was to create a simple yet effective system that could be used \
                 by anyone to increase their odds of winning at blackjack.",
                [-1, 1, 1, 1, 1, 1, 0, 0, 0, -1, -1, -1, -1],
                false,
            ),
            Strategy::new(
                "Hi-Opt II Count",
                "The Hi-Opt II blackjack card counting system is a more advanced version of the \
                 Hi-Opt I system, developed by Lance Humble and Carl Cooper in their book \"The \
                 World's Greatest Blackjack Book\" in 1980. The Hi-Opt II system assigns point values \
                 to each card in the deck, with additional point values for some cards, and is \
                 considered one of the most powerful card counting systems. It is also one of the \
                 most difficult to learn and use effectively.",
                [0, 1, 1, 2, 2, 1, 1, 0, 0, -2, -2, -2, -2],
                false,
            ),
            Strategy::new(
                "KO Count",
                "The Knock-Out (KO) blackjack card counting system was developed by Olaf Vancura and \
                 Ken Fuchs in their book \"Knock-Out Blackjack\" in 1998. The KO system assigns point \
                 values to each card in the deck, with the additional advantage that it does not \
                 require a true count conversion for betting, making it easier to use than some \
                 other systems.",
                [-1, 1, 1, 1, 1, 1, 1, 0, 0, -1, -1, -1, -1],
                false,
            ),
            Strategy::new(
                "Omega II Count",
                "The Omega II blackjack card counting system was developed by Bryce Carlson and \
                 introduced in his book \"Blackjack for Blood\" in 2001. The Omega II system assigns \
                 point values to each card in the deck, with additional point values for some cards, \
                 and is considered one of the most powerful card counting systems, especially for \
                 multi-deck games.",
                [0, 1, 1, 2, 2, 2, 1, 0, -1, -2, -2, -2, -2],
                false,
            ),
            Strategy::new(
                "Zen Count",
                "The Zen Count blackjack card counting system was developed by Arnold Snyder and \
                 introduced in his book \"Blackbelt in Blackjack\" in 1983. The Zen Count system \
                 assigns point values to each card in the deck, with additional point values for \
                 some cards, and is considered a powerful system for both single and multi-deck \
                 games.",
                [-1, 1, 1, 2, 2, 2, 1, 0, 0, -2, -2, -2, -2],
                false,
            ),
            Strategy::new(
                "10 Count",
                "The 10 Count blackjack card counting system was developed by Edward O. Thorp, a \
                 mathematician and author of the classic book \"Beat the Dealer\" in 1962. The 10 \
                 Count system assigns point values to each card in the deck, with a focus on the \
                 10-value cards, and is considered one of the earliest and most basic card counting \
                 systems.",
                [1, 1, 1, 1, 1, 1, 1, 1, 1, -2, -2, -2, -2],
                false,
            ),
        ];
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: StrategyId) -> Option<&Strategy> {
        self.items.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StrategyId, &Strategy)> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, strategy)| (StrategyId(index), strategy))
    }

    pub fn find_by_name(&self, name: &str) -> Option<StrategyId> {
        self.items
            .iter()
            .position(|strategy| strategy.name() == name)
            .map(StrategyId)
    }

    /// Appends a user-defined strategy and returns its id.
    pub fn create_custom(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        weights: [i32; RANK_WEIGHTS],
    ) -> StrategyId {
        self.items.push(Strategy::new(name, description, weights, true));
        StrategyId(self.items.len() - 1)
    }

    /// Appends a blank user-defined strategy with the stock placeholder
    /// name and all-zero weights, ready for the editor.
    pub fn create_blank_custom(&mut self) -> StrategyId {
        self.create_custom("New Strategy", "Some Notes (use Markdown)", [0; RANK_WEIGHTS])
    }

    pub fn set_weights(
        &mut self,
        id: StrategyId,
        weights: [i32; RANK_WEIGHTS],
    ) -> Result<(), StrategyError> {
        self.custom_mut(id)?.weights = weights;
        Ok(())
    }

    pub fn set_name(&mut self, id: StrategyId, name: impl Into<String>) -> Result<(), StrategyError> {
        self.custom_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_description(
        &mut self,
        id: StrategyId,
        description: impl Into<String>,
    ) -> Result<(), StrategyError> {
        self.custom_mut(id)?.description = description.into();
        Ok(())
    }

    fn custom_mut(&mut self, id: StrategyId) -> Result<&mut Strategy, StrategyError> {
        let strategy = self
            .items
            .get_mut(id.0)
            .ok_or(StrategyError::Unknown(id.0))?;
        if !strategy.custom {
            return Err(StrategyError::BuiltIn(strategy.name.clone()));
        }
        Ok(strategy)
    }
}
