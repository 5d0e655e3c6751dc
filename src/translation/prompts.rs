/*!
 * Prompt construction for batch translation.
 */

/// Fixed translator persona; `{target_language}` is substituted per request
pub const SYSTEM_INSTRUCTION: &str = "You are an expert subtitle translator. \
Translate every subtitle line into {target_language}. \
Use natural, conversational {target_language} as people actually speak it, not a literal word-for-word rendering. \
Preserve the emotional tone of each line, and carry jokes, wordplay and comedic intent over with equivalent expressions rather than literal ones. \
Keep each translation about as long as the original so it still fits the on-screen timing. \
Return ONLY a JSON array of strings: exactly one translation per input line, in the same order, with no commentary.";

/// Everything a provider needs to ask for one batch translation
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationPrompt {
    /// System instruction with the target language filled in
    pub system_instruction: String,
    /// Target language display name
    pub target_language: String,
    /// Source texts, in batch order
    pub source_texts: Vec<String>,
}

impl TranslationPrompt {
    pub fn new(target_language: impl Into<String>, source_texts: Vec<String>) -> Self {
        let target_language = target_language.into();
        Self {
            system_instruction: SYSTEM_INSTRUCTION.replace("{target_language}", &target_language),
            target_language,
            source_texts,
        }
    }

    /// User message: instructions plus the source lines as a JSON array
    pub fn user_content(&self) -> String {
        // Serializing a Vec<String> cannot fail
        let lines = serde_json::to_string_pretty(&self.source_texts).unwrap_or_else(|_| "[]".to_string());
        format!(
            "Translate the following {} subtitle lines into {}.\n\
             Return ONLY the translations as a JSON array of {} strings in the exact same order.\n\n\
             Subtitles:\n{}",
            self.source_texts.len(),
            self.target_language,
            self.source_texts.len(),
            lines
        )
    }

    pub fn len(&self) -> usize {
        self.source_texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_texts.is_empty()
    }
}
