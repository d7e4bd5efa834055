//! Builds the natural-language prompt sent to the image model.
//!
//! The inspiration text goes in verbatim. Nothing stops a user from writing
//! text that bends the rest of the prompt; the image API's own content policy
//! is the only filter.

use std::fmt;

use serde::Deserialize;

use crate::color::{Color, ColorLabel};

/// How hard the prompt leans on the chosen color.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// One paragraph naming black, white and the hex code.
    Simple,
    /// Names the color by label and hex, makes it the dominant accent and
    /// restates the requirement at the end.
    #[default]
    Emphatic,
}

impl PromptMode {
    /// Every mode, in display order.
    pub const ALL: [PromptMode; 2] = [PromptMode::Emphatic, PromptMode::Simple];

    /// Form and CLI value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Emphatic => "emphatic",
        }
    }

    /// Text for the mode selector.
    pub fn description(self) -> &'static str {
        match self {
            Self::Simple => "Simple: black, white and your color",
            Self::Emphatic => "Emphatic: your color as the dominant accent",
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the image prompt. When the emphatic mode gets no label, the hex code
/// stands in for it.
pub fn build_prompt(
    inspiration: &str,
    color: Color,
    label: Option<&ColorLabel>,
    mode: PromptMode,
) -> String {
    match mode {
        PromptMode::Simple => format!(
            "Create a beautiful, symmetrical mandala inspired by '{inspiration}'. \
             Use black, white, and {color} as the primary colors. \
             The design should be intricate, detailed, and suitable for printing. \
             Make it centered and balanced with clear patterns."
        ),
        PromptMode::Emphatic => {
            let label = label.map_or_else(|| color.to_string(), ToString::to_string);
            [
                format!("Create a beautiful, symmetrical mandala inspired by '{inspiration}'."),
                format!(
                    "The mandala MUST prominently feature the color {label} ({color}) as a main color throughout the design."
                ),
                format!(
                    "Use {label}, black, and white as the primary colors, with {label} being the dominant accent."
                ),
                "The mandala should be intricate, detailed, and suitable for printing.".to_string(),
                "Make it perfectly centered and balanced with clear patterns.".to_string(),
                format!(
                    "The final image must be a mandala inspired by '{inspiration}' with {label} clearly visible as a key element in the design."
                ),
            ]
            .join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::name_color;

    #[test]
    fn simple_prompt_has_word_and_uppercase_hex() {
        let color: Color = "#1e90ff".parse().expect("valid color");
        let prompt = build_prompt("forest", color, None, PromptMode::Simple);
        assert!(prompt.contains("'forest'"));
        assert!(prompt.contains("#1E90FF"));
        assert!(prompt.contains("black, white, and #1E90FF"));
        assert!(!prompt.contains('\n'));
    }

    #[test]
    fn simple_prompt_ignores_label() {
        let color = Color::new(255, 0, 0);
        let label = name_color(color);
        let prompt = build_prompt("ember", color, Some(&label), PromptMode::Simple);
        assert!(!prompt.contains("red ("));
        assert!(prompt.contains("#FF0000"));
    }

    #[test]
    fn emphatic_prompt_names_color_twice_and_restates() {
        let color = Color::new(30, 60, 255);
        let label = name_color(color);
        let prompt = build_prompt("ocean", color, Some(&label), PromptMode::Emphatic);
        assert!(prompt.contains("blue (#1E3CFF)"));
        assert_eq!(prompt.matches("ocean").count(), 2);
        assert!(prompt.contains("with blue being the dominant accent"));
        assert!(
            prompt
                .lines()
                .last()
                .is_some_and(|line| line.contains("blue clearly visible"))
        );
    }

    #[test]
    fn emphatic_prompt_without_label_uses_hex() {
        let color = Color::new(161, 178, 195);
        let prompt = build_prompt("galaxy", color, None, PromptMode::Emphatic);
        assert!(prompt.contains("#A1B2C3 (#A1B2C3)"));
        assert!(prompt.contains("Use #A1B2C3, black, and white"));
    }

    #[test]
    fn inspiration_is_inserted_verbatim() {
        let prompt = build_prompt("it's <raw>", Color::new(0, 0, 0), None, PromptMode::Simple);
        assert!(prompt.contains("'it's <raw>'"));
    }
}
