use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    /// Turn raw user input into the word that gets looked up.
    /// Returns an empty string for blank input.
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // Unicode normalization (NFC)
        let text: String = text.nfc().collect();

        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_collapses_whitespace() {
        assert_eq!(DefaultPreprocessor.process("  pé de\tmoleque \n"), "pé de moleque");
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(DefaultPreprocessor.process(" \t\n "), "");
    }

    #[test]
    fn composes_combining_marks() {
        let decomposed = "sala\u{0301}rio";
        assert_eq!(DefaultPreprocessor.process(decomposed), "salário");
    }
}
