//! Query result types exchanged with the keyboard frontend.

/// Confidence is normalized into this band; everything above 0.9 up to 1.0
/// is reserved for caller-injected system candidates (clipboard, contacts)
/// which never originate here.
pub const SUGGESTION_CANDIDATE_MIN_CONFIDENCE: f64 = 0.0;
pub const SUGGESTION_CANDIDATE_MAX_CONFIDENCE: f64 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionCandidate {
    pub text: String,
    pub secondary_text: Option<String>,
    pub edit_distance: u32,
    pub confidence: f64,
    pub is_eligible_for_auto_commit: bool,
    pub is_eligible_for_user_removal: bool,
}

impl SuggestionCandidate {
    pub fn new(text: impl Into<String>, edit_distance: u32, confidence: f64) -> Self {
        Self {
            text: text.into(),
            secondary_text: None,
            edit_distance,
            confidence,
            is_eligible_for_auto_commit: false,
            is_eligible_for_user_removal: true,
        }
    }
}

pub const RESULT_UNSPECIFIED: i32 = 0x0000;
pub const RESULT_ATTR_IN_THE_DICTIONARY: i32 = 0x0001;
pub const RESULT_ATTR_LOOKS_LIKE_TYPO: i32 = 0x0002;
pub const RESULT_ATTR_HAS_RECOMMENDED_SUGGESTIONS: i32 = 0x0004;
pub const RESULT_ATTR_LOOKS_LIKE_GRAMMAR_ERROR: i32 = 0x0008;
pub const RESULT_ATTR_DONT_SHOW_UI_FOR_SUGGESTIONS: i32 = 0x0010;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellingResult {
    pub suggestion_attributes: i32,
    pub suggestions: Vec<String>,
}

impl SpellingResult {
    pub fn unspecified() -> Self {
        Self {
            suggestion_attributes: RESULT_UNSPECIFIED,
            suggestions: Vec::new(),
        }
    }

    pub fn valid_word() -> Self {
        Self {
            suggestion_attributes: RESULT_ATTR_IN_THE_DICTIONARY,
            suggestions: Vec::new(),
        }
    }

    pub fn typo(suggestions: Vec<String>, is_high_confidence_result: bool) -> Self {
        let mut attributes = RESULT_ATTR_LOOKS_LIKE_TYPO;
        if is_high_confidence_result {
            attributes |= RESULT_ATTR_HAS_RECOMMENDED_SUGGESTIONS;
        }
        Self {
            suggestion_attributes: attributes,
            suggestions,
        }
    }

    pub fn grammar_error(suggestions: Vec<String>, is_high_confidence_result: bool) -> Self {
        let mut attributes = RESULT_ATTR_LOOKS_LIKE_GRAMMAR_ERROR;
        if is_high_confidence_result {
            attributes |= RESULT_ATTR_HAS_RECOMMENDED_SUGGESTIONS;
        }
        Self {
            suggestion_attributes: attributes,
            suggestions,
        }
    }

    pub fn is_in_dictionary(&self) -> bool {
        self.suggestion_attributes & RESULT_ATTR_IN_THE_DICTIONARY != 0
    }

    pub fn looks_like_typo(&self) -> bool {
        self.suggestion_attributes & RESULT_ATTR_LOOKS_LIKE_TYPO != 0
    }
}
