//! The one place style tags turn into instruction text. Image generation and
//! prompt suggestion both read from this table.

use crate::LogoStyle;

#[derive(Debug, PartialEq, Eq)]
pub struct StyleInstructions {
    pub style: LogoStyle,
    pub label: &'static str,
    /// Appended to the user's prompt when asking for an image.
    pub image: &'static str,
    /// Asks the text model for a prompt in this style.
    pub suggestion: &'static str,
}

pub static STYLE_TABLE: [StyleInstructions; 4] = [
    StyleInstructions {
        style: LogoStyle::None,
        label: "No Style",
        image: "Create a clean, professional logo.",
        suggestion: "Create a versatile logo prompt that works well in any style.",
    },
    StyleInstructions {
        style: LogoStyle::Monogram,
        label: "Monogram",
        image: "Create a monogram-style logo with elegant, intertwined letters.",
        suggestion: "Create a monogram-style logo prompt that uses initials or letters in an elegant, intertwined design.",
    },
    StyleInstructions {
        style: LogoStyle::Abstract,
        label: "Abstract",
        image: "Create an abstract logo with geometric shapes and modern design elements.",
        suggestion: "Create an abstract logo prompt that uses geometric shapes, lines, and modern design elements.",
    },
    StyleInstructions {
        style: LogoStyle::Mascot,
        label: "Mascot",
        image: "Create a mascot-style logo with a friendly, memorable character or animal.",
        suggestion: "Create a mascot-style logo prompt that features a friendly, memorable character or animal.",
    },
];

pub fn instructions_for(style: LogoStyle) -> &'static StyleInstructions {
    match style {
        LogoStyle::None => &STYLE_TABLE[0],
        LogoStyle::Monogram => &STYLE_TABLE[1],
        LogoStyle::Abstract => &STYLE_TABLE[2],
        LogoStyle::Mascot => &STYLE_TABLE[3],
    }
}

/// The full prompt sent to the image model.
pub fn image_prompt(prompt: &str, style: LogoStyle) -> String {
    format!(
        "{}. {} Make it a professional logo with a clean background.",
        prompt.trim(),
        instructions_for(style).image
    )
}

/// The meta prompt sent to the text model for a "surprise me" suggestion.
pub fn suggestion_prompt(style: LogoStyle) -> String {
    format!(
        "{} Make it specific, visual, and brand-friendly. Respond with just the prompt text, no explanations.",
        instructions_for(style).suggestion
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_style() {
        for style in LogoStyle::ALL {
            assert_eq!(instructions_for(style).style, style);
        }
    }

    #[test]
    fn test_image_prompt() {
        assert_eq!(
            image_prompt("A blue lion logo reading 'HEXA'", LogoStyle::None),
            "A blue lion logo reading 'HEXA'. Create a clean, professional logo. Make it a professional logo with a clean background."
        );
        assert!(image_prompt("Owl", LogoStyle::Mascot)
            .contains("friendly, memorable character or animal"));
    }

    #[test]
    fn test_suggestion_prompt() {
        let prompt = suggestion_prompt(LogoStyle::Monogram);
        assert!(prompt.starts_with("Create a monogram-style logo prompt"));
        assert!(prompt.ends_with("Respond with just the prompt text, no explanations."));
    }
}
