use crate::{CardId, SlotId};
use serde::{Deserialize, Serialize};

/// One notification per state transition, pushed before the next
/// scheduler tick starts. The driving layer drains the bus between
/// ticks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    SlotActivated { slot: SlotId },
    SlotRemoved { slot: SlotId },
    SlotFinished { slot: SlotId },
    SlotReshuffled { slot: SlotId },
    CardDealt { slot: SlotId, card: CardId },
    QuizPosted { slot: SlotId },
    Answered { slot: SlotId, correct: bool },
    SwapRequested { slot: SlotId },
    SlotsSwapped { first: SlotId, second: SlotId },
    ScoreChanged { correct: u32, total: u32 },
    SlotCountChanged { count: usize },
    PausedChanged { paused: bool },
    GameOver,
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_queue_in_order() {
        let mut bus = EventBus::default();
        bus.push(Event::GameOver);
        bus.push(Event::PausedChanged { paused: true });
        let drained: Vec<Event> = bus.drain().collect();
        assert_eq!(
            drained,
            vec![Event::GameOver, Event::PausedChanged { paused: true }]
        );
        assert_eq!(bus.drain().count(), 0);
    }
}
