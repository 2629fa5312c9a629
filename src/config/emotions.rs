use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Which emotion vocabulary the diary uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EmotionSet {
    /// Six diary moods: joy, anxiety, embarrassment, sadness, anger, hurt.
    Classic,
    /// A reduced joy / sadness / anger vocabulary.
    Basic,
}

impl Default for EmotionSet {
    fn default() -> Self {
        EmotionSet::Classic
    }
}

/// Presentation for a single emotion tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionStyle {
    /// Tag stored on diary entries.
    pub tag: &'static str,
    /// Human-readable name shown in legends and lists.
    pub label: &'static str,
    pub glyph: &'static str,
    pub color: Color,
    /// Soft fill behind the emotion chip in the detail view.
    pub background: Color,
    /// Edge shade for panels tinted by this emotion.
    pub border: Color,
}

const CLASSIC_STYLES: &[EmotionStyle] = &[
    EmotionStyle {
        tag: "happy",
        label: "Joy",
        glyph: "😊",
        color: Color::Rgb(0xfa, 0xcc, 0x15),
        background: Color::Rgb(0xfe, 0xf9, 0xc3),
        border: Color::Rgb(0xfd, 0xe0, 0x47),
    },
    EmotionStyle {
        tag: "anxiety",
        label: "Anxiety",
        glyph: "😰",
        color: Color::Rgb(0xa8, 0x55, 0xf7),
        background: Color::Rgb(0xf3, 0xe8, 0xff),
        border: Color::Rgb(0xc4, 0xb5, 0xfd),
    },
    EmotionStyle {
        tag: "embarrassed",
        label: "Embarrassed",
        glyph: "😳",
        color: Color::Rgb(0x16, 0xa3, 0x4a),
        background: Color::Rgb(0xdc, 0xfc, 0xe7),
        border: Color::Rgb(0x86, 0xef, 0xac),
    },
    EmotionStyle {
        tag: "sad",
        label: "Sadness",
        glyph: "😢",
        color: Color::Rgb(0x60, 0xa5, 0xfa),
        background: Color::Rgb(0xdb, 0xea, 0xfe),
        border: Color::Rgb(0x93, 0xc5, 0xfd),
    },
    EmotionStyle {
        tag: "angry",
        label: "Anger",
        glyph: "😡",
        color: Color::Rgb(0xf8, 0x71, 0x71),
        background: Color::Rgb(0xfe, 0xe2, 0xe2),
        border: Color::Rgb(0xfc, 0xa5, 0xa5),
    },
    EmotionStyle {
        tag: "hurt",
        label: "Hurt",
        glyph: "🤕",
        color: Color::Rgb(0x6b, 0x72, 0x80),
        background: Color::Rgb(0xf3, 0xf4, 0xf6),
        border: Color::Rgb(0x9c, 0xa3, 0xaf),
    },
];

const BASIC_STYLES: &[EmotionStyle] = &[
    EmotionStyle {
        tag: "happy",
        label: "Joy",
        glyph: "😊",
        color: Color::Rgb(0xfa, 0xcc, 0x15),
        background: Color::Rgb(0xfe, 0xf9, 0xc3),
        border: Color::Rgb(0xfd, 0xe0, 0x47),
    },
    EmotionStyle {
        tag: "sad",
        label: "Sadness",
        glyph: "😢",
        color: Color::Rgb(0x60, 0xa5, 0xfa),
        background: Color::Rgb(0xdb, 0xea, 0xfe),
        border: Color::Rgb(0x93, 0xc5, 0xfd),
    },
    EmotionStyle {
        tag: "angry",
        label: "Anger",
        glyph: "😡",
        color: Color::Rgb(0xf8, 0x71, 0x71),
        background: Color::Rgb(0xfe, 0xe2, 0xe2),
        border: Color::Rgb(0xfc, 0xa5, 0xa5),
    },
];

/// Lookup table from emotion tags to their presentation.
///
/// Entries are free to carry tags outside the active set; rendering
/// falls back to the set's first style rather than rejecting them.
#[derive(Debug, Clone, Copy)]
pub struct EmotionRegistry {
    set: EmotionSet,
    styles: &'static [EmotionStyle],
}

impl EmotionRegistry {
    pub fn new(set: EmotionSet) -> Self {
        let styles = match set {
            EmotionSet::Classic => CLASSIC_STYLES,
            EmotionSet::Basic => BASIC_STYLES,
        };
        Self { set, styles }
    }

    pub fn set(&self) -> EmotionSet {
        self.set
    }

    pub fn all(&self) -> &'static [EmotionStyle] {
        self.styles
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.styles.iter().any(|style| style.tag == tag)
    }

    pub fn style(&self, tag: &str) -> Option<&'static EmotionStyle> {
        self.styles.iter().find(|style| style.tag == tag)
    }

    /// Style for `tag`, or the set's first style for tags recorded
    /// under a vocabulary this registry does not know.
    pub fn style_or_default(&self, tag: &str) -> &'static EmotionStyle {
        self.style(tag).unwrap_or(&self.styles[0])
    }

    pub fn known_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.styles.iter().map(|style| style.tag)
    }
}

impl Default for EmotionRegistry {
    fn default() -> Self {
        Self::new(EmotionSet::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_set_resolves_each_tag() {
        let registry = EmotionRegistry::new(EmotionSet::Classic);
        assert_eq!(registry.all().len(), 6);
        assert!(registry.contains("hurt"));
        assert_eq!(registry.style("sad").map(|style| style.label), Some("Sadness"));
    }

    #[test]
    fn styles_carry_primary_background_and_border_colors() {
        let registry = EmotionRegistry::new(EmotionSet::Classic);
        let joy = registry.style("happy").unwrap();
        assert_eq!(joy.color, Color::Rgb(0xfa, 0xcc, 0x15));
        assert_eq!(joy.background, Color::Rgb(0xfe, 0xf9, 0xc3));
        assert_eq!(joy.border, Color::Rgb(0xfd, 0xe0, 0x47));
    }

    #[test]
    fn unknown_tags_fall_back_to_the_first_style() {
        let registry = EmotionRegistry::new(EmotionSet::Basic);
        assert!(!registry.contains("embarrassed"));
        assert_eq!(registry.style_or_default("embarrassed").tag, "happy");
    }

    #[test]
    fn set_names_round_trip_through_strum() {
        assert_eq!("classic".parse::<EmotionSet>().ok(), Some(EmotionSet::Classic));
        assert_eq!(EmotionSet::Basic.to_string(), "basic");
    }
}
