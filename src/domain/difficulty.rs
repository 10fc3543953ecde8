/// Difficulty presets.
///
/// A fixed table, never mutated at runtime. Daily challenges always use
/// `Medium`; their extra reward comes from the flat bonus in `scoring`.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyConfig {
    pub max_mistakes: u32,
    pub time_limit_seconds: u32,
    pub score_multiplier: f64,
    pub hint_cost: u32,
}

const EASY: DifficultyConfig = DifficultyConfig {
    max_mistakes: 8,
    time_limit_seconds: 120,
    score_multiplier: 1.0,
    hint_cost: 20,
};

const MEDIUM: DifficultyConfig = DifficultyConfig {
    max_mistakes: 6,
    time_limit_seconds: 90,
    score_multiplier: 1.5,
    hint_cost: 35,
};

const HARD: DifficultyConfig = DifficultyConfig {
    max_mistakes: 4,
    time_limit_seconds: 60,
    score_multiplier: 2.0,
    hint_cost: 50,
};

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn config(self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => EASY,
            Difficulty::Medium => MEDIUM,
            Difficulty::Hard => HARD,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_name(name: &str) -> Option<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }
}
