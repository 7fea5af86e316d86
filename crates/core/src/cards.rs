use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Colour {
    Black = 0,
    Red = 1,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Suit {
    Clubs = 0,
    Diamonds = 1,
    Hearts = 2,
    Spades = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

/// Rank 0 is the joker; 1 is the ace, up through 13 for the king.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Rank {
    Joker = 0,
    Ace = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
}

impl Rank {
    /// The thirteen counted ranks, lowest first. Excludes the joker.
    pub const RANKED: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];
}

/// Selects between the two spellings used by card-face asset sets:
/// `Legacy` names the joker "jocker" and the ace "1", `Standard` names
/// them "joker" and "ace". Consumers matching on name strings rely on
/// these exact fragments.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum NameStyle {
    #[default]
    Legacy,
    Standard,
}

/// Packed card identity: the low byte is the rank, the next byte is the
/// suit. For jokers (rank 0) the suit byte carries the colour instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CardId(u16);

impl CardId {
    pub fn encode(rank: u16, suit: u16) -> Self {
        CardId(((suit & 0xff) << 8) | (rank & 0xff))
    }

    pub fn from_parts(rank: Rank, suit: Suit) -> Self {
        Self::encode(rank as u16, suit as u16)
    }

    pub fn joker(colour: Colour) -> Self {
        Self::encode(Rank::Joker as u16, colour as u16)
    }

    pub fn rank(self) -> u16 {
        self.0 & 0xff
    }

    pub fn suit(self) -> u16 {
        (self.0 >> 8) & 0xff
    }

    pub fn is_joker(self) -> bool {
        self.rank() == 0
    }

    /// Display key for the card, e.g. `"10_heart"`, `"ace_spade"`,
    /// `"black_joker"`. Out-of-range rank or suit values contribute an
    /// empty fragment, so malformed ids degrade to partial names instead
    /// of failing.
    pub fn name(self, style: NameStyle) -> String {
        let mut name = rank_word(self.rank(), style);
        if self.is_joker() {
            name.insert_str(0, colour_prefix(self.suit()));
        } else {
            name.push_str(suit_fragment(self.suit()));
        }
        name
    }
}

fn rank_word(rank: u16, style: NameStyle) -> String {
    match rank {
        13 => "king".to_string(),
        12 => "queen".to_string(),
        11 => "jack".to_string(),
        0 => match style {
            NameStyle::Standard => "joker".to_string(),
            NameStyle::Legacy => "jocker".to_string(),
        },
        1 if style == NameStyle::Standard => "ace".to_string(),
        1..=10 => rank.to_string(),
        _ => String::new(),
    }
}

fn colour_prefix(colour: u16) -> &'static str {
    match colour {
        0 => "black_",
        1 => "red_",
        _ => "",
    }
}

fn suit_fragment(suit: u16) -> &'static str {
    match suit {
        0 => "_club",
        1 => "_diamond",
        2 => "_heart",
        3 => "_spade",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_round_trips_every_rank_and_suit() {
        for rank in 0..=13u16 {
            for suit in 0..=3u16 {
                let id = CardId::encode(rank, suit);
                assert_eq!(id.rank(), rank);
                assert_eq!(id.suit(), suit);
            }
        }
    }

    #[test]
    fn joker_iff_rank_zero() {
        assert!(CardId::joker(Colour::Black).is_joker());
        assert!(CardId::joker(Colour::Red).is_joker());
        for rank in Rank::RANKED {
            assert!(!CardId::from_parts(rank, Suit::Hearts).is_joker());
        }
    }

    #[test]
    fn ranked_card_names() {
        let ten = CardId::from_parts(Rank::Ten, Suit::Hearts);
        assert_eq!(ten.name(NameStyle::Legacy), "10_heart");
        let king = CardId::from_parts(Rank::King, Suit::Clubs);
        assert_eq!(king.name(NameStyle::Standard), "king_club");
        let queen = CardId::from_parts(Rank::Queen, Suit::Diamonds);
        assert_eq!(queen.name(NameStyle::Legacy), "queen_diamond");
        let jack = CardId::from_parts(Rank::Jack, Suit::Spades);
        assert_eq!(jack.name(NameStyle::Legacy), "jack_spade");
    }

    #[test]
    fn ace_spelling_follows_style() {
        let ace = CardId::from_parts(Rank::Ace, Suit::Spades);
        assert_eq!(ace.name(NameStyle::Standard), "ace_spade");
        assert_eq!(ace.name(NameStyle::Legacy), "1_spade");
    }

    #[test]
    fn joker_spelling_follows_style() {
        let black = CardId::joker(Colour::Black);
        assert_eq!(black.name(NameStyle::Standard), "black_joker");
        assert_eq!(black.name(NameStyle::Legacy), "black_jocker");
        let red = CardId::joker(Colour::Red);
        assert_eq!(red.name(NameStyle::Standard), "red_joker");
        assert_eq!(red.name(NameStyle::Legacy), "red_jocker");
    }

    #[test]
    fn malformed_ids_degrade_to_partial_names() {
        // unknown suit keeps the rank word, unknown rank keeps the suit
        assert_eq!(CardId::encode(5, 9).name(NameStyle::Legacy), "5");
        assert_eq!(CardId::encode(77, 2).name(NameStyle::Legacy), "_heart");
        assert_eq!(CardId::encode(77, 9).name(NameStyle::Legacy), "");
    }
}
