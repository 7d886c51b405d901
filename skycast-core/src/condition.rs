use serde::{Deserialize, Serialize};

/// Coarse weather category derived from a provider condition text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTag {
    Sunny,
    Cloudy,
    Rain,
    Snow,
    Thunderstorm,
    Other,
}

/// Ordered keyword rules; the first rule with a matching keyword wins.
const RULES: &[(ConditionTag, &[&str])] = &[
    (ConditionTag::Sunny, &["sunny", "clear"]),
    (ConditionTag::Cloudy, &["cloudy", "overcast"]),
    (ConditionTag::Rain, &["rain", "drizzle", "shower"]),
    (ConditionTag::Snow, &["snow", "sleet", "blizzard"]),
    (ConditionTag::Thunderstorm, &["thunderstorm", "lightning"]),
];

impl ConditionTag {
    /// Classify a condition text by case-insensitive substring match.
    pub fn from_condition_text(text: &str) -> Self {
        let lower = text.to_lowercase();

        RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(tag, _)| *tag)
            .unwrap_or(ConditionTag::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionTag::Sunny => "sunny",
            ConditionTag::Cloudy => "cloudy",
            ConditionTag::Rain => "rain",
            ConditionTag::Snow => "snow",
            ConditionTag::Thunderstorm => "thunderstorm",
            ConditionTag::Other => "other",
        }
    }

    /// Terminal glyph. `Other` shares the cloud glyph.
    pub fn glyph(&self) -> &'static str {
        match self {
            ConditionTag::Sunny => "☀",
            ConditionTag::Cloudy | ConditionTag::Other => "☁",
            ConditionTag::Rain => "🌧",
            ConditionTag::Snow => "❄",
            ConditionTag::Thunderstorm => "⛈",
        }
    }
}

impl std::fmt::Display for ConditionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
