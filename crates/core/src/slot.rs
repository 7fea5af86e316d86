use crate::{shuffle_cards, CardId, DeckError, Event, EventBus, RngState, Strategy, StrategyId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

/// Slot life cycle. `Fake` is the add-a-slot placeholder: no deck, never
/// dealt from. An activated slot moves between `Idle`, `Dealt`,
/// `AwaitingAnswer` and `Exhausted`; removal is performed by the table
/// and is legal from any state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SlotState {
    Fake,
    Idle,
    Dealt,
    AwaitingAnswer,
    Exhausted,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    #[error("slot is already active")]
    AlreadyActive,
    #[error("deck count must be at least 1")]
    InvalidDeckCount,
    #[error("cannot deal in state {0:?}")]
    NotDealable(SlotState),
    #[error("no quiz is pending")]
    NoQuizPending,
    #[error("cannot reshuffle in state {0:?}")]
    NotReshuffleable(SlotState),
    #[error(transparent)]
    Deck(#[from] DeckError),
}

/// What a single deal produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealOutcome {
    /// A counted card; the running count was updated.
    Dealt(CardId),
    /// A joker; the slot now waits for the trainee's answer.
    Quiz(CardId),
    /// The deck was already empty; the slot is exhausted.
    Finished,
}

/// An independent deck-and-quiz unit. The slot owns its deck and running
/// count exclusively; the table drives it only through the transition
/// methods below, each of which pushes exactly one event on success.
#[derive(Debug, Clone)]
pub struct TableSlot {
    id: SlotId,
    deck: VecDeque<CardId>,
    deck_count: u32,
    strategy: StrategyId,
    running_count: i32,
    current_card: Option<CardId>,
    state: SlotState,
}

impl TableSlot {
    pub fn fake(id: SlotId) -> Self {
        Self {
            id,
            deck: VecDeque::new(),
            deck_count: 0,
            strategy: StrategyId(0),
            running_count: 0,
            current_card: None,
            state: SlotState::Fake,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn is_fake(&self) -> bool {
        self.state == SlotState::Fake
    }

    pub fn can_deal(&self) -> bool {
        matches!(self.state, SlotState::Idle | SlotState::Dealt)
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    pub fn current_card(&self) -> Option<CardId> {
        self.current_card
    }

    pub fn strategy(&self) -> StrategyId {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: StrategyId) {
        self.strategy = strategy;
    }

    pub fn deck_count(&self) -> u32 {
        self.deck_count
    }

    pub fn cards_left(&self) -> usize {
        self.deck.len()
    }

    pub fn cards_total(&self) -> usize {
        self.deck_count as usize * crate::CARDS_PER_DECK
    }

    /// Gives the fake slot a freshly shuffled deck and makes it
    /// dealable. The running count starts at zero.
    pub fn activate(
        &mut self,
        deck_count: u32,
        coefficient: u32,
        rng: &mut RngState,
        events: &mut EventBus,
    ) -> Result<(), SlotError> {
        debug_assert!(self.is_fake(), "activate on slot in state {:?}", self.state);
        if !self.is_fake() {
            return Err(SlotError::AlreadyActive);
        }
        if deck_count == 0 {
            return Err(SlotError::InvalidDeckCount);
        }
        self.deck = shuffle_cards(deck_count, coefficient, rng)?;
        self.deck_count = deck_count;
        self.running_count = 0;
        self.current_card = None;
        self.state = SlotState::Idle;
        events.push(Event::SlotActivated { slot: self.id });
        Ok(())
    }

    /// Pops the front card. An empty deck exhausts the slot without
    /// dealing; a joker suspends the slot behind a quiz with the count
    /// frozen for grading; anything else updates the running count under
    /// `strategy`.
    pub fn deal_next(
        &mut self,
        strategy: &Strategy,
        events: &mut EventBus,
    ) -> Result<DealOutcome, SlotError> {
        debug_assert!(self.can_deal(), "deal on slot in state {:?}", self.state);
        if !self.can_deal() {
            return Err(SlotError::NotDealable(self.state));
        }
        let Some(card) = self.deck.pop_front() else {
            self.state = SlotState::Exhausted;
            self.current_card = None;
            events.push(Event::SlotFinished { slot: self.id });
            return Ok(DealOutcome::Finished);
        };
        self.current_card = Some(card);
        if card.is_joker() {
            self.state = SlotState::AwaitingAnswer;
            events.push(Event::QuizPosted { slot: self.id });
            Ok(DealOutcome::Quiz(card))
        } else {
            self.running_count = strategy.update_weight(self.running_count, card.rank());
            self.state = SlotState::Dealt;
            events.push(Event::CardDealt {
                slot: self.id,
                card,
            });
            Ok(DealOutcome::Dealt(card))
        }
    }

    /// Grades the pending quiz. The slot always becomes dealable again;
    /// wrong answers only affect the table-level score.
    pub fn submit_answer(&mut self, guess: i32, events: &mut EventBus) -> Result<bool, SlotError> {
        debug_assert!(
            self.state == SlotState::AwaitingAnswer,
            "answer on slot in state {:?}",
            self.state
        );
        if self.state != SlotState::AwaitingAnswer {
            return Err(SlotError::NoQuizPending);
        }
        let correct = guess == self.running_count;
        self.state = SlotState::Dealt;
        events.push(Event::Answered {
            slot: self.id,
            correct,
        });
        Ok(correct)
    }

    /// Replaces the deck with a fresh shuffle at the configured deck
    /// count. The running count carries over: the trainee keeps counting
    /// across reshuffles within one session.
    pub fn reshuffle(
        &mut self,
        coefficient: u32,
        rng: &mut RngState,
        events: &mut EventBus,
    ) -> Result<(), SlotError> {
        let allowed = matches!(
            self.state,
            SlotState::Idle | SlotState::Dealt | SlotState::Exhausted
        );
        debug_assert!(allowed, "reshuffle on slot in state {:?}", self.state);
        if !allowed {
            return Err(SlotError::NotReshuffleable(self.state));
        }
        self.deck = shuffle_cards(self.deck_count, coefficient, rng)?;
        self.current_card = None;
        self.state = SlotState::Idle;
        events.push(Event::SlotReshuffled { slot: self.id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Colour, Rank, StrategyBook, Suit};

    fn hi_lo(book: &StrategyBook) -> &Strategy {
        book.get(book.find_by_name("Hi-Lo Count").unwrap()).unwrap()
    }

    fn active_slot(deck: Vec<CardId>) -> TableSlot {
        let mut slot = TableSlot::fake(SlotId(0));
        slot.deck = deck.into();
        slot.deck_count = 1;
        slot.state = SlotState::Idle;
        slot
    }

    #[test]
    fn activation_only_from_fake() {
        let mut rng = RngState::from_seed(5);
        let mut events = EventBus::default();
        let mut slot = TableSlot::fake(SlotId(3));

        assert_eq!(
            slot.activate(0, 2, &mut rng, &mut events),
            Err(SlotError::InvalidDeckCount)
        );
        slot.activate(1, 2, &mut rng, &mut events).unwrap();
        assert_eq!(slot.state(), SlotState::Idle);
        assert_eq!(slot.cards_left(), 54);
        assert_eq!(slot.running_count(), 0);
        let drained: Vec<Event> = events.drain().collect();
        assert_eq!(drained, vec![Event::SlotActivated { slot: SlotId(3) }]);
    }

    #[test]
    fn dealing_a_counted_card_updates_the_count() {
        let book = StrategyBook::builtin();
        let mut events = EventBus::default();
        let mut slot = active_slot(vec![
            CardId::from_parts(Rank::Two, Suit::Clubs),
            CardId::from_parts(Rank::King, Suit::Hearts),
        ]);

        let outcome = slot.deal_next(hi_lo(&book), &mut events).unwrap();
        assert_eq!(
            outcome,
            DealOutcome::Dealt(CardId::from_parts(Rank::Two, Suit::Clubs))
        );
        assert_eq!(slot.running_count(), 1);
        assert_eq!(slot.state(), SlotState::Dealt);

        slot.deal_next(hi_lo(&book), &mut events).unwrap();
        assert_eq!(slot.running_count(), 0);
    }

    #[test]
    fn lone_joker_posts_a_quiz_and_freezes_the_count() {
        let book = StrategyBook::builtin();
        let mut events = EventBus::default();
        let mut slot = active_slot(vec![
            CardId::from_parts(Rank::Five, Suit::Spades),
            CardId::joker(Colour::Red),
        ]);

        slot.deal_next(hi_lo(&book), &mut events).unwrap();
        assert_eq!(slot.running_count(), 1);

        let outcome = slot.deal_next(hi_lo(&book), &mut events).unwrap();
        assert_eq!(outcome, DealOutcome::Quiz(CardId::joker(Colour::Red)));
        assert_eq!(slot.state(), SlotState::AwaitingAnswer);
        assert_eq!(slot.running_count(), 1);
    }

    #[test]
    fn exhaustion_happens_on_the_deal_after_the_last_card() {
        let book = StrategyBook::builtin();
        let mut events = EventBus::default();
        let mut slot = active_slot(vec![CardId::from_parts(Rank::Nine, Suit::Clubs)]);

        let outcome = slot.deal_next(hi_lo(&book), &mut events).unwrap();
        assert!(matches!(outcome, DealOutcome::Dealt(_)));
        // the deck is now empty but the slot is still dealable
        assert_eq!(slot.state(), SlotState::Dealt);

        let outcome = slot.deal_next(hi_lo(&book), &mut events).unwrap();
        assert_eq!(outcome, DealOutcome::Finished);
        assert_eq!(slot.state(), SlotState::Exhausted);
    }

    #[test]
    fn answers_are_graded_against_the_frozen_count() {
        let book = StrategyBook::builtin();
        let mut events = EventBus::default();
        let mut slot = active_slot(vec![
            CardId::from_parts(Rank::Three, Suit::Clubs),
            CardId::joker(Colour::Black),
            CardId::from_parts(Rank::Four, Suit::Clubs),
        ]);

        slot.deal_next(hi_lo(&book), &mut events).unwrap();
        slot.deal_next(hi_lo(&book), &mut events).unwrap();
        assert!(slot.submit_answer(1, &mut events).unwrap());
        assert_eq!(slot.state(), SlotState::Dealt);

        // wrong guesses also return the slot to a dealable state
        let mut slot = active_slot(vec![CardId::joker(Colour::Black)]);
        slot.deal_next(hi_lo(&book), &mut events).unwrap();
        assert!(!slot.submit_answer(7, &mut events).unwrap());
        assert!(slot.can_deal());
    }

    #[test]
    fn reshuffle_preserves_running_count() {
        let book = StrategyBook::builtin();
        let mut rng = RngState::from_seed(11);
        let mut events = EventBus::default();
        let mut slot = active_slot(vec![CardId::from_parts(Rank::Two, Suit::Clubs)]);

        slot.deal_next(hi_lo(&book), &mut events).unwrap();
        slot.deal_next(hi_lo(&book), &mut events).unwrap();
        assert_eq!(slot.state(), SlotState::Exhausted);

        slot.reshuffle(2, &mut rng, &mut events).unwrap();
        assert_eq!(slot.state(), SlotState::Idle);
        assert_eq!(slot.cards_left(), 54);
        assert_eq!(slot.running_count(), 1);
    }
}
