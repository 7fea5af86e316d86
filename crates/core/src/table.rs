use crate::{
    DealOutcome, DeckError, Difficulty, DifficultyRule, Event, EventBus, GameConfig, RngState,
    SlotError, SlotId, SlotState, StrategyBook, StrategyId, TableSlot, RANK_WEIGHTS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    #[error("no rule configured for difficulty {0:?}")]
    DifficultyNotConfigured(Difficulty),
    #[error("no slot with id {0:?}")]
    UnknownSlot(SlotId),
    #[error("unknown strategy {0:?}")]
    UnknownStrategy(StrategyId),
    #[error("cannot drop below the difficulty slot minimum")]
    SlotMinimum,
    #[error("deck count must be between 1 and {0}")]
    DeckCountOutOfRange(u32),
    #[error(transparent)]
    Slot(#[from] SlotError),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

/// The virtual dealer: owns the slots, decides which of them advance on
/// each timer tick, pauses dealing while quizzes are outstanding, and
/// keeps the session score. Slots are mutated only through their
/// transition methods; `available` and `pending_quiz` are mutated only
/// here.
#[derive(Debug)]
pub struct Table {
    config: GameConfig,
    rule: DifficultyRule,
    book: StrategyBook,
    rng: RngState,
    slots: Vec<TableSlot>,
    available: BTreeSet<SlotId>,
    pending_quiz: BTreeSet<SlotId>,
    swap_pick: Option<SlotId>,
    score: Score,
    next_slot: u32,
    paused: bool,
    launching: bool,
    ticking: bool,
    game_over: bool,
}

impl Table {
    pub fn new(
        config: GameConfig,
        difficulty: Difficulty,
        rng: RngState,
    ) -> Result<Self, TableError> {
        let rule = *config
            .difficulty_rule(difficulty)
            .ok_or(TableError::DifficultyNotConfigured(difficulty))?;
        if config.default_deck_count == 0 || config.default_deck_count > config.max_deck_count {
            return Err(TableError::DeckCountOutOfRange(config.max_deck_count));
        }
        if config.shuffle_coefficient == 0 {
            return Err(TableError::Slot(SlotError::Deck(DeckError::ZeroCoefficient)));
        }
        Ok(Self {
            config,
            rule,
            book: StrategyBook::builtin(),
            rng,
            slots: Vec::new(),
            available: BTreeSet::new(),
            pending_quiz: BTreeSet::new(),
            swap_pick: None,
            score: Score::default(),
            next_slot: 0,
            paused: false,
            launching: false,
            ticking: false,
            game_over: false,
        })
    }

    /// Applies to the next `new_game`; the removal floor follows
    /// immediately.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), TableError> {
        self.rule = *self
            .config
            .difficulty_rule(difficulty)
            .ok_or(TableError::DifficultyNotConfigured(difficulty))?;
        Ok(())
    }

    /// Discards any previous session and seats the difficulty-mandated
    /// number of active slots plus one trailing fake slot (the add-a-slot
    /// affordance). The timer stays stopped until the first resume.
    pub fn new_game(&mut self, events: &mut EventBus) {
        self.slots.clear();
        self.available.clear();
        self.pending_quiz.clear();
        self.swap_pick = None;
        self.score = Score::default();
        self.game_over = false;
        self.paused = false;
        self.launching = true;
        self.ticking = false;
        for _ in 0..self.rule.slot_minimum {
            let id = self.push_fake_slot();
            let index = self.slots.len() - 1;
            let deck_count = self.config.default_deck_count;
            let coefficient = self.config.shuffle_coefficient;
            match self.slots[index].activate(deck_count, coefficient, &mut self.rng, events) {
                Ok(()) => {
                    self.available.insert(id);
                }
                Err(err) => debug_assert!(false, "default activation failed: {err}"),
            }
        }
        self.push_fake_slot();
        events.push(Event::SlotCountChanged {
            count: self.slots.len(),
        });
    }

    /// One dealing round. A no-op unless the timer is running. Ends the
    /// session when nothing is available; otherwise deals from a subset
    /// of `available` fixed up front, so no slot is picked twice within
    /// the tick.
    pub fn tick(&mut self, events: &mut EventBus) {
        if !self.ticking {
            return;
        }
        self.debug_check_invariants();
        if self.available.is_empty() {
            self.ticking = false;
            self.game_over = true;
            events.push(Event::GameOver);
            return;
        }
        let mut pool: Vec<SlotId> = self.available.iter().copied().collect();
        let picked: Vec<SlotId> = match self.rule.deal_limit {
            None => pool,
            Some(limit) => {
                let mut picked = Vec::with_capacity(limit.min(pool.len()));
                while picked.len() < limit && !pool.is_empty() {
                    let index = self.rng.pick_index(pool.len());
                    picked.push(pool.swap_remove(index));
                }
                picked
            }
        };
        for id in &picked {
            self.available.remove(id);
        }
        for id in picked {
            let Some(index) = self.slots.iter().position(|slot| slot.id() == id) else {
                debug_assert!(false, "picked a slot that no longer exists");
                continue;
            };
            let Some(strategy) = self.book.get(self.slots[index].strategy()) else {
                debug_assert!(false, "slot refers to an unknown strategy");
                continue;
            };
            match self.slots[index].deal_next(strategy, events) {
                Ok(DealOutcome::Dealt(_)) => {
                    self.available.insert(id);
                }
                Ok(DealOutcome::Quiz(_)) => {
                    self.pending_quiz.insert(id);
                    self.ticking = false;
                }
                Ok(DealOutcome::Finished) => {}
                Err(err) => debug_assert!(false, "picked an undealable slot: {err}"),
            }
        }
    }

    /// Turns the fake slot into an active one and appends a fresh fake
    /// slot behind it.
    pub fn activate_slot(
        &mut self,
        id: SlotId,
        deck_count: u32,
        events: &mut EventBus,
    ) -> Result<(), TableError> {
        let index = self.index_of(id)?;
        if deck_count == 0 || deck_count > self.config.max_deck_count {
            return Err(TableError::DeckCountOutOfRange(self.config.max_deck_count));
        }
        if !self.slots[index].is_fake() {
            return Err(SlotError::AlreadyActive.into());
        }
        let coefficient = self.config.shuffle_coefficient;
        self.slots[index].activate(deck_count, coefficient, &mut self.rng, events)?;
        self.available.insert(id);
        self.push_fake_slot();
        events.push(Event::SlotCountChanged {
            count: self.slots.len(),
        });
        Ok(())
    }

    /// Grades an outstanding quiz. `total` always advances, `correct`
    /// only on a match, and the timer restarts once the last outstanding
    /// quiz across all slots is cleared (unless the user has paused).
    pub fn submit_answer(
        &mut self,
        id: SlotId,
        guess: i32,
        events: &mut EventBus,
    ) -> Result<bool, TableError> {
        let index = self.index_of(id)?;
        if !self.pending_quiz.contains(&id) {
            return Err(SlotError::NoQuizPending.into());
        }
        let correct = self.slots[index].submit_answer(guess, events)?;
        self.pending_quiz.remove(&id);
        self.available.insert(id);
        self.score.total += 1;
        if correct {
            self.score.correct += 1;
        }
        events.push(Event::ScoreChanged {
            correct: self.score.correct,
            total: self.score.total,
        });
        if self.pending_quiz.is_empty() && !self.paused && !self.launching && !self.game_over {
            self.ticking = true;
        }
        Ok(correct)
    }

    pub fn request_reshuffle(&mut self, id: SlotId, events: &mut EventBus) -> Result<(), TableError> {
        let index = self.index_of(id)?;
        let state = self.slots[index].state();
        if !matches!(
            state,
            SlotState::Idle | SlotState::Dealt | SlotState::Exhausted
        ) {
            return Err(SlotError::NotReshuffleable(state).into());
        }
        let coefficient = self.config.shuffle_coefficient;
        self.slots[index].reshuffle(coefficient, &mut self.rng, events)?;
        self.available.insert(id);
        Ok(())
    }

    /// Removal is legal from any slot state, even mid-quiz, but never
    /// below the difficulty floor. The slot is withdrawn from every
    /// scheduler set; if it held the last outstanding quiz, dealing
    /// resumes.
    pub fn request_remove(&mut self, id: SlotId, events: &mut EventBus) -> Result<(), TableError> {
        let index = self.index_of(id)?;
        if !self.can_remove() {
            return Err(TableError::SlotMinimum);
        }
        self.available.remove(&id);
        let was_quiz = self.pending_quiz.remove(&id);
        self.slots.remove(index);
        if self.swap_pick == Some(id) {
            self.swap_pick = None;
        }
        events.push(Event::SlotRemoved { slot: id });
        events.push(Event::SlotCountChanged {
            count: self.slots.len(),
        });
        if was_quiz
            && self.pending_quiz.is_empty()
            && !self.paused
            && !self.launching
            && !self.game_over
        {
            self.ticking = true;
        }
        Ok(())
    }

    /// Two picks swap the display order of the chosen slots. Picking the
    /// same slot twice clears the selection.
    pub fn request_swap(&mut self, id: SlotId, events: &mut EventBus) -> Result<(), TableError> {
        self.index_of(id)?;
        events.push(Event::SwapRequested { slot: id });
        match self.swap_pick.take() {
            None => self.swap_pick = Some(id),
            Some(first) if first == id => {}
            Some(first) => {
                let a = self.index_of(first)?;
                let b = self.index_of(id)?;
                self.slots.swap(a, b);
                events.push(Event::SlotsSwapped { first, second: id });
            }
        }
        Ok(())
    }

    pub fn select_strategy(
        &mut self,
        id: SlotId,
        strategy: StrategyId,
    ) -> Result<(), TableError> {
        let index = self.index_of(id)?;
        if self.book.get(strategy).is_none() {
            return Err(TableError::UnknownStrategy(strategy));
        }
        self.slots[index].set_strategy(strategy);
        Ok(())
    }

    pub fn create_custom_strategy(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        weights: [i32; RANK_WEIGHTS],
    ) -> StrategyId {
        self.book.create_custom(name, description, weights)
    }

    /// User-initiated pause, distinct from the quiz-induced one. The
    /// first resume ends the launch phase: the add-a-slot affordance is
    /// dropped if it was never activated, and from then on the slot
    /// roster is fixed. Resuming restarts the timer only once no quiz is
    /// outstanding.
    pub fn pause(&mut self, paused: bool, events: &mut EventBus) {
        if self.launching && !paused {
            self.launching = false;
            if self.slots.last().map_or(false, TableSlot::is_fake) {
                if let Some(slot) = self.slots.pop() {
                    events.push(Event::SlotRemoved { slot: slot.id() });
                    events.push(Event::SlotCountChanged {
                        count: self.slots.len(),
                    });
                }
            }
        }
        self.paused = paused;
        events.push(Event::PausedChanged { paused });
        if paused {
            self.ticking = false;
        } else if self.pending_quiz.is_empty() && !self.game_over {
            self.ticking = true;
        }
    }

    pub fn can_remove(&self) -> bool {
        self.available.len() > self.rule.slot_minimum
    }

    pub fn timer_running(&self) -> bool {
        self.ticking
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_launching(&self) -> bool {
        self.launching
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn difficulty(&self) -> Difficulty {
        self.rule.difficulty
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn strategies(&self) -> &StrategyBook {
        &self.book
    }

    pub fn strategies_mut(&mut self) -> &mut StrategyBook {
        &mut self.book
    }

    pub fn slots(&self) -> &[TableSlot] {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> Option<&TableSlot> {
        self.slots.iter().find(|slot| slot.id() == id)
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn pending_quiz_ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.pending_quiz.iter().copied()
    }

    pub fn has_pending_quiz(&self) -> bool {
        !self.pending_quiz.is_empty()
    }

    fn push_fake_slot(&mut self) -> SlotId {
        let id = SlotId(self.next_slot);
        self.next_slot += 1;
        self.slots.push(TableSlot::fake(id));
        id
    }

    fn index_of(&self, id: SlotId) -> Result<usize, TableError> {
        self.slots
            .iter()
            .position(|slot| slot.id() == id)
            .ok_or(TableError::UnknownSlot(id))
    }

    fn debug_check_invariants(&self) {
        debug_assert!(
            self.available.is_disjoint(&self.pending_quiz),
            "a slot is both dealable and awaiting an answer"
        );
        #[cfg(debug_assertions)]
        for id in &self.available {
            let slot = self.slots.iter().find(|slot| slot.id() == *id);
            debug_assert!(
                slot.map_or(false, TableSlot::can_deal),
                "available set holds an undealable slot {id:?}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(difficulty: Difficulty) -> Table {
        Table::new(GameConfig::default(), difficulty, RngState::from_seed(17)).unwrap()
    }

    #[test]
    fn new_game_seats_minimum_plus_fake() {
        let mut events = EventBus::default();
        let mut table = table(Difficulty::Medium);
        table.new_game(&mut events);
        assert_eq!(table.slots().len(), 3);
        assert_eq!(table.available_count(), 2);
        assert!(table.slots().last().unwrap().is_fake());
        assert!(table.is_launching());
        assert!(!table.timer_running());
    }

    #[test]
    fn launch_drops_unused_fake_slot() {
        let mut events = EventBus::default();
        let mut table = table(Difficulty::Easy);
        table.new_game(&mut events);
        table.pause(false, &mut events);
        assert!(!table.is_launching());
        assert_eq!(table.slots().len(), 1);
        assert!(table.timer_running());
    }

    #[test]
    fn activating_the_fake_slot_appends_another() {
        let mut events = EventBus::default();
        let mut table = table(Difficulty::Easy);
        table.new_game(&mut events);
        let fake = table.slots().last().unwrap().id();
        table.activate_slot(fake, 2, &mut events).unwrap();
        assert_eq!(table.slots().len(), 3);
        assert_eq!(table.available_count(), 2);
        assert!(table.slots().last().unwrap().is_fake());

        // a deck count outside 1..=max is refused
        let fresh = table.slots().last().unwrap().id();
        assert_eq!(
            table.activate_slot(fresh, 0, &mut events),
            Err(TableError::DeckCountOutOfRange(10))
        );
        assert_eq!(
            table.activate_slot(fresh, 11, &mut events),
            Err(TableError::DeckCountOutOfRange(10))
        );
    }

    #[test]
    fn removal_is_refused_at_the_floor() {
        let mut events = EventBus::default();
        let mut table = table(Difficulty::Medium);
        table.new_game(&mut events);
        let first = table.slots()[0].id();
        assert!(!table.can_remove());
        assert_eq!(
            table.request_remove(first, &mut events),
            Err(TableError::SlotMinimum)
        );
        assert_eq!(table.slots().len(), 3);

        let fake = table.slots().last().unwrap().id();
        table.activate_slot(fake, 1, &mut events).unwrap();
        assert!(table.can_remove());
        table.request_remove(first, &mut events).unwrap();
        assert_eq!(table.available_count(), 2);
    }

    #[test]
    fn swap_reorders_slots() {
        let mut events = EventBus::default();
        let mut table = table(Difficulty::Medium);
        table.new_game(&mut events);
        let first = table.slots()[0].id();
        let second = table.slots()[1].id();
        table.request_swap(first, &mut events).unwrap();
        table.request_swap(second, &mut events).unwrap();
        assert_eq!(table.slots()[0].id(), second);
        assert_eq!(table.slots()[1].id(), first);

        // picking the same slot twice clears the pending pick
        table.request_swap(first, &mut events).unwrap();
        table.request_swap(first, &mut events).unwrap();
        assert_eq!(table.slots()[1].id(), first);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut events = EventBus::default();
        let mut table = table(Difficulty::Easy);
        table.new_game(&mut events);
        let missing = SlotId(999);
        assert_eq!(
            table.submit_answer(missing, 0, &mut events),
            Err(TableError::UnknownSlot(missing))
        );
        assert_eq!(
            table.select_strategy(table.slots()[0].id(), StrategyId(99)),
            Err(TableError::UnknownStrategy(StrategyId(99)))
        );
    }
}
