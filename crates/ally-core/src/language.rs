//! Language resolution and localized static text.
//!
//! Maps display names ("Hindi") to language codes ("hi") and codes to the
//! output-language directive sent to the model, the localized fallback
//! reply, and the terminal-chat farewell. Every lookup defaults to English
//! and none of them can fail. The fallback text lives here, not in the
//! remote service, so a localized reply is available during an outage.

/// Code used whenever a name or code is not in the table.
pub const DEFAULT_CODE: &str = "en";

/// Static record for one supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    /// Lowercase display name accepted by [`resolve_code`].
    pub name: &'static str,
    /// Language code (ISO 639-1).
    pub code: &'static str,
    /// Output-language directive appended to the system instruction.
    pub instruction: &'static str,
    /// Reply returned when generation fails.
    pub fallback: &'static str,
    /// Goodbye line for the end of a terminal session.
    pub farewell: &'static str,
}

const GENERIC_FAREWELL: &str = "Take care.";

static PROFILES: [LanguageProfile; 10] = [
    LanguageProfile {
        name: "english",
        code: "en",
        instruction: "Respond in simple English.",
        fallback: "I’m taking a short pause. Please try again in a moment.",
        farewell: "Take care. Wishing you good health and peace.",
    },
    LanguageProfile {
        name: "hindi",
        code: "hi",
        instruction: "Respond only in simple Hindi.",
        fallback: "मैं थोड़ी देर के लिए रुक रहा हूँ। कृपया कुछ समय बाद फिर कोशिश करें।",
        farewell: "अपना ध्यान रखें। आपको अच्छे स्वास्थ्य की शुभकामनाएँ।",
    },
    LanguageProfile {
        name: "marathi",
        code: "mr",
        instruction: "Respond only in simple Marathi.",
        fallback: "मी थोडा वेळ थांबत आहे. कृपया थोड्या वेळाने पुन्हा प्रयत्न करा.",
        farewell: GENERIC_FAREWELL,
    },
    LanguageProfile {
        name: "tamil",
        code: "ta",
        instruction: "Respond only in simple Tamil.",
        fallback: "நான் சிறிது நேரம் இடைவேளை எடுக்கிறேன். தயவுசெய்து சிறிது நேரத்திற்குப் பிறகு முயற்சிக்கவும்.",
        farewell: GENERIC_FAREWELL,
    },
    LanguageProfile {
        name: "telugu",
        code: "te",
        instruction: "Respond only in simple Telugu.",
        fallback: "నేను కొద్దిసేపు విరామం తీసుకుంటున్నాను. దయచేసి కొద్దిసేపటి తర్వాత మళ్లీ ప్రయత్నించండి.",
        farewell: GENERIC_FAREWELL,
    },
    LanguageProfile {
        name: "bengali",
        code: "bn",
        instruction: "Respond only in simple Bengali.",
        fallback: "আমি একটু বিরতি নিচ্ছি। অনুগ্রহ করে কিছুক্ষণ পরে আবার চেষ্টা করুন।",
        farewell: GENERIC_FAREWELL,
    },
    LanguageProfile {
        name: "gujarati",
        code: "gu",
        instruction: "Respond only in simple Gujarati.",
        fallback: "હું થોડા સમય માટે વિરામ લઈ રહ્યો છું. કૃપા કરીને થોડા સમય પછી ફરી પ્રયત્ન કરો.",
        farewell: GENERIC_FAREWELL,
    },
    LanguageProfile {
        name: "kannada",
        code: "kn",
        instruction: "Respond only in simple Kannada.",
        fallback: "ನಾನು ಸ್ವಲ್ಪ ವಿರಾಮ ತೆಗೆದುಕೊಳ್ಳುತ್ತಿದ್ದೇನೆ. ದಯವಿಟ್ಟು ಸ್ವಲ್ಪ ಸಮಯದ ನಂತರ ಮತ್ತೆ ಪ್ರಯತ್ನಿಸಿ.",
        farewell: GENERIC_FAREWELL,
    },
    LanguageProfile {
        name: "malayalam",
        code: "ml",
        instruction: "Respond only in simple Malayalam.",
        fallback: "ഞാൻ അല്പസമയം ഇടവേള എടുക്കുന്നു. ദയവായി കുറച്ച് സമയത്തിന് ശേഷം വീണ്ടും ശ്രമിക്കുക.",
        farewell: GENERIC_FAREWELL,
    },
    LanguageProfile {
        name: "punjabi",
        code: "pa",
        instruction: "Respond only in simple Punjabi.",
        fallback: "ਮੈਂ ਥੋੜ੍ਹੀ ਦੇਰ ਲਈ ਰੁਕ ਰਿਹਾ ਹਾਂ। ਕਿਰਪਾ ਕਰਕੇ ਕੁਝ ਸਮੇਂ ਬਾਅਦ ਦੁਬਾਰਾ ਕੋਸ਼ਿਸ਼ ਕਰੋ।",
        farewell: GENERIC_FAREWELL,
    },
];

/// All supported languages, English first.
pub fn supported_languages() -> &'static [LanguageProfile] {
    &PROFILES
}

/// Profile for a language code, or the English profile for unknown codes.
pub fn profile_for(code: &str) -> &'static LanguageProfile {
    PROFILES
        .iter()
        .find(|p| p.code == code)
        .unwrap_or(&PROFILES[0])
}

/// Resolve a display name to a language code, case-insensitively.
///
/// Unknown names resolve to [`DEFAULT_CODE`].
pub fn resolve_code(display_name: &str) -> &'static str {
    let needle = display_name.trim().to_lowercase();
    PROFILES
        .iter()
        .find(|p| p.name == needle)
        .map(|p| p.code)
        .unwrap_or(DEFAULT_CODE)
}

/// Output-language directive for the system instruction.
pub fn instruction_for(code: &str) -> &'static str {
    profile_for(code).instruction
}

/// Localized reply used when generation fails.
pub fn fallback_for(code: &str) -> &'static str {
    profile_for(code).fallback
}

/// Localized goodbye line.
pub fn farewell_for(code: &str) -> &'static str {
    profile_for(code).farewell
}
