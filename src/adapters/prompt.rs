//! Translation prompt construction.

/// Target language used when the request names none.
pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

/// Returns the system instruction for a request.
///
/// A non-blank `system_message` replaces the default template entirely.
pub fn system_instruction(system_message: Option<&str>, target_language: Option<&str>) -> String {
    if let Some(message) = system_message.filter(|m| !m.trim().is_empty()) {
        return message.to_string();
    }

    let target = target_language
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TARGET_LANGUAGE);

    format!(
        "You are a professional translator. Translate the user's text into {target}. \
         Preserve the original formatting, including line breaks, lists and markdown. \
         Output only the translation, without explanations or notes."
    )
}

/// Builds a single-turn prompt: the instruction, a blank line, then the text.
///
/// Used by surfaces without a separate system role.
pub fn build_translation_prompt(
    text: &str,
    system_message: Option<&str>,
    target_language: Option<&str>,
) -> String {
    format!("{}\n\n{}", system_instruction(system_message, target_language), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_names_target() {
        let instruction = system_instruction(None, Some("French"));
        assert!(instruction.contains("into French."));
        assert!(instruction.starts_with("You are a professional translator."));
    }

    #[test]
    fn test_default_target_is_english() {
        assert!(system_instruction(None, None).contains("into English."));
        assert!(system_instruction(Some("  "), Some("")).contains("into English."));
    }

    #[test]
    fn test_custom_system_message_wins() {
        let prompt = build_translation_prompt("Hallo", Some("Translate to pirate speak."), Some("French"));
        assert_eq!(prompt, "Translate to pirate speak.\n\nHallo");
    }
}
