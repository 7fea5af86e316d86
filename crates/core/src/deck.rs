use crate::{CardId, Colour, Rank, RngState, Suit};
use std::collections::VecDeque;
use thiserror::Error;

/// 52 ranked cards plus the black and red jokers.
pub const CARDS_PER_DECK: usize = 54;

/// After this many rejected shuffles the widest-spaced candidate seen so
/// far is accepted instead of searching forever.
const MAX_SHUFFLE_ATTEMPTS: usize = 1_000;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    #[error("deck count must be at least 1")]
    NoDecks,
    #[error("shuffle coefficient must be at least 1")]
    ZeroCoefficient,
}

/// Emits `deck_count` repetitions of the 52 rank-suit combinations (rank
/// outer, suit inner, both ascending) followed by the black and red
/// jokers.
pub fn generate_deck(deck_count: u32) -> Vec<CardId> {
    let mut deck = Vec::with_capacity(deck_count as usize * CARDS_PER_DECK);
    for _ in 0..deck_count {
        for rank in Rank::RANKED {
            for suit in Suit::ALL {
                deck.push(CardId::from_parts(rank, suit));
            }
        }
        for colour in [Colour::Black, Colour::Red] {
            deck.push(CardId::joker(colour));
        }
    }
    deck
}

/// Shuffles a freshly generated deck until every joker is at least
/// `threshold = len / (deck_count * coefficient)` positions away from the
/// previous joker (the sequence start counts as position -1). Jokers are
/// the quiz triggers; clustering them would bunch the quizzes together.
///
/// This is rejection sampling over whole-deck shuffles, not an in-place
/// fixup. Degenerate parameters are rejected before the loop.
pub fn shuffle_cards(
    deck_count: u32,
    coefficient: u32,
    rng: &mut RngState,
) -> Result<VecDeque<CardId>, DeckError> {
    if deck_count == 0 {
        return Err(DeckError::NoDecks);
    }
    if coefficient == 0 {
        return Err(DeckError::ZeroCoefficient);
    }
    let mut deck = generate_deck(deck_count);
    let threshold = deck.len() / (deck_count as usize * coefficient as usize);
    let mut best: Option<(usize, Vec<CardId>)> = None;
    for _ in 0..MAX_SHUFFLE_ATTEMPTS {
        rng.shuffle(&mut deck);
        let gap = min_joker_gap(&deck);
        if gap >= threshold {
            return Ok(deck.into_iter().collect());
        }
        if best.as_ref().map_or(true, |(widest, _)| gap > *widest) {
            best = Some((gap, deck.clone()));
        }
    }
    let (_, fallback) = best.unwrap_or((0, deck));
    Ok(fallback.into_iter().collect())
}

/// Smallest distance between consecutive joker positions, counting the
/// distance from the sequence start (as index -1) to the first joker.
/// Returns `usize::MAX` when the sequence holds no joker.
pub fn min_joker_gap(cards: &[CardId]) -> usize {
    let mut last: isize = -1;
    let mut min = usize::MAX;
    for (index, card) in cards.iter().enumerate() {
        if card.is_joker() {
            min = min.min((index as isize - last) as usize);
            last = index as isize;
        }
    }
    min
}
