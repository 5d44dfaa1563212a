use serde::{Deserialize, Serialize};

use crate::trial::Condition;

/// Stimulus payloads across all trial-based paradigms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stimulus {
    /// Five-arrow array: four flankers around one target.
    Flanker {
        flank: ArrowDirection,
        target: ArrowDirection,
    },
    Signal {
        signal: Signal,
    },
    /// Color word whose meaning and ink may disagree.
    ColorWord {
        meaning: Color,
        ink: Color,
    },
    Position {
        position: GridPosition,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowDirection {
    Left,
    Right,
}

impl ArrowDirection {
    pub fn symbol(&self) -> char {
        match self {
            ArrowDirection::Left => '<',
            ArrowDirection::Right => '>',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '<' => Some(ArrowDirection::Left),
            '>' => Some(ArrowDirection::Right),
            _ => None,
        }
    }

    /// The choice a participant reports for this direction.
    pub fn choice(&self) -> &'static str {
        match self {
            ArrowDirection::Left => "left",
            ArrowDirection::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "go")]
    Go,
    #[serde(rename = "nogo")]
    NoGo,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Go => "go",
            Signal::NoGo => "nogo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Black,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::Red,
        Color::Blue,
        Color::Yellow,
        Color::Black,
        Color::Green,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Black => "black",
            Color::Green => "green",
        }
    }

    /// Word shown on screen when this color is the meaning.
    pub fn word(&self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Blue => "BLUE",
            Color::Yellow => "YELLOW",
            Color::Black => "BLACK",
            Color::Green => "GREEN",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            Color::Red => "#dc3545",
            Color::Blue => "#007bff",
            Color::Yellow => "#ffc107",
            Color::Black => "#000000",
            Color::Green => "#28a745",
        }
    }

    /// Response key bound to this ink color.
    pub fn key(&self) -> &'static str {
        match self {
            Color::Red => "1",
            Color::Blue => "2",
            Color::Yellow => "3",
            Color::Black => "4",
            Color::Green => "5",
        }
    }
}

/// One cell of the 3x3 grid used by the 1-back task, numbered 1..=9 row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GridPosition(u8);

impl GridPosition {
    pub const COUNT: u8 = 9;

    pub fn new(id: u8) -> Option<Self> {
        (1..=Self::COUNT).contains(&id).then_some(GridPosition(id))
    }

    pub fn all() -> impl Iterator<Item = GridPosition> {
        (1..=Self::COUNT).map(GridPosition)
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            1 => "top-left",
            2 => "top",
            3 => "top-right",
            4 => "left",
            5 => "center",
            6 => "right",
            7 => "bottom-left",
            8 => "bottom",
            _ => "bottom-right",
        }
    }

    pub fn grid_class(&self) -> String {
        format!("grid-{}", self.0)
    }
}

impl TryFrom<u8> for GridPosition {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        GridPosition::new(id).ok_or_else(|| format!("grid position {id} outside 1..=9"))
    }
}

impl From<GridPosition> for u8 {
    fn from(p: GridPosition) -> u8 {
        p.0
    }
}

impl Stimulus {
    /// Parses a five-character flanker array such as `"<<><<"`. The four
    /// outer arrows must agree.
    pub fn flanker_from_symbols(symbols: &str) -> Option<Self> {
        let dirs: Vec<ArrowDirection> = symbols
            .chars()
            .map(ArrowDirection::from_symbol)
            .collect::<Option<_>>()?;
        if dirs.len() != 5 {
            return None;
        }
        let flank = dirs[0];
        if [dirs[1], dirs[3], dirs[4]].iter().any(|d| *d != flank) {
            return None;
        }
        Some(Stimulus::Flanker {
            flank,
            target: dirs[2],
        })
    }

    /// Text the presentation layer draws.
    pub fn label(&self) -> String {
        match self {
            Stimulus::Flanker { flank, target } => {
                let f = flank.symbol();
                [f, f, target.symbol(), f, f].iter().collect()
            }
            Stimulus::Signal { signal } => signal.as_str().to_string(),
            Stimulus::ColorWord { meaning, .. } => meaning.word().to_string(),
            Stimulus::Position { position } => position.name().to_string(),
        }
    }

    /// Condition that follows from the stimulus alone. 1-back positions have
    /// none: a match is a property of consecutive trials.
    pub fn intrinsic_condition(&self) -> Option<Condition> {
        match self {
            Stimulus::Flanker { flank, target } => Some(if flank == target {
                Condition::Congruent
            } else {
                Condition::Incongruent
            }),
            Stimulus::Signal { signal: Signal::Go } => Some(Condition::Go),
            Stimulus::Signal { signal: Signal::NoGo } => Some(Condition::NoGo),
            Stimulus::ColorWord { meaning, ink } => Some(if meaning == ink {
                Condition::Congruent
            } else {
                Condition::Incongruent
            }),
            Stimulus::Position { .. } => None,
        }
    }

    /// Expected choice for forced-choice stimuli: the target's direction for
    /// flanker arrays, the key bound to the ink for color words.
    pub fn correct_choice(&self) -> Option<&'static str> {
        match self {
            Stimulus::Flanker { target, .. } => Some(target.choice()),
            Stimulus::ColorWord { ink, .. } => Some(ink.key()),
            Stimulus::Signal { .. } | Stimulus::Position { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flanker_symbols_roundtrip_through_label() {
        for s in ["<<<<<", ">>>>>", "<<><<", ">><>>"] {
            let stim = Stimulus::flanker_from_symbols(s).unwrap();
            assert_eq!(stim.label(), s);
        }
    }

    #[test]
    fn flanker_rejects_malformed_arrays() {
        assert!(Stimulus::flanker_from_symbols("<<<<").is_none());
        assert!(Stimulus::flanker_from_symbols("<><<<").is_none());
        assert!(Stimulus::flanker_from_symbols("<<x<<").is_none());
    }

    #[test]
    fn flanker_answer_follows_the_middle_arrow() {
        let stim = Stimulus::flanker_from_symbols("<<><<").unwrap();
        assert_eq!(stim.correct_choice(), Some("right"));
        assert_eq!(stim.intrinsic_condition(), Some(Condition::Incongruent));

        let stim = Stimulus::flanker_from_symbols(">>>>>").unwrap();
        assert_eq!(stim.correct_choice(), Some("right"));
        assert_eq!(stim.intrinsic_condition(), Some(Condition::Congruent));
    }

    #[test]
    fn color_word_answer_is_the_ink_key() {
        let stim = Stimulus::ColorWord {
            meaning: Color::Red,
            ink: Color::Green,
        };
        assert_eq!(stim.correct_choice(), Some("5"));
        assert_eq!(stim.label(), "RED");
        assert_eq!(stim.intrinsic_condition(), Some(Condition::Incongruent));
    }

    #[test]
    fn grid_position_bounds() {
        assert!(GridPosition::new(0).is_none());
        assert!(GridPosition::new(10).is_none());
        assert_eq!(GridPosition::all().count(), 9);
        assert_eq!(GridPosition::new(5).unwrap().name(), "center");
        assert_eq!(GridPosition::new(5).unwrap().grid_class(), "grid-5");
    }

    #[test]
    fn stimulus_serializes_tagged() {
        let stim = Stimulus::Position {
            position: GridPosition::new(3).unwrap(),
        };
        let json = serde_json::to_value(stim).unwrap();
        assert_eq!(json["kind"], "position");
        assert_eq!(json["position"], 3);

        let back: Stimulus = serde_json::from_value(json).unwrap();
        assert_eq!(back, stim);
        assert!(serde_json::from_str::<GridPosition>("12").is_err());
    }
}
