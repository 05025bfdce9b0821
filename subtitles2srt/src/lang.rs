//! Choosing a tesseract language.
//!
//! Subtitle tracks are normally labelled with two-letter ISO 639-1 codes,
//! but tesseract names its language data using three-letter codes, plus a
//! few names of its own.

use isolang::Language;
use log::warn;

/// The language we use when we don't know any better.
pub const DEFAULT_TESSERACT_LANG: &str = "eng";

/// Languages where tesseract's name differs from the ISO 639-3 code.
const TESSERACT_NAMES: &[(&str, &str)] = &[("zh", "chi_sim")];

/// Convert an ISO 639-1 code like `"de"` to the name of the corresponding
/// tesseract language, like `"deu"`.
///
/// ```
/// use subtitles2srt::lang::tesseract_lang_for;
///
/// assert_eq!(tesseract_lang_for("de").as_deref(), Some("deu"));
/// assert_eq!(tesseract_lang_for("xx"), None);
/// ```
pub fn tesseract_lang_for(iso639_1: &str) -> Option<String> {
    let code = iso639_1.trim().to_ascii_lowercase();
    if let Some((_, name)) = TESSERACT_NAMES.iter().find(|(c, _)| *c == code) {
        return Some((*name).to_owned());
    }
    Language::from_639_1(&code).map(|l| l.to_639_3().to_owned())
}

/// Pick the tesseract language to use.  An explicit tesseract language
/// always wins.  Otherwise, we try to map the subtitle language, falling
/// back to English.
pub fn choose_tesseract_lang(tesseract_lang: Option<&str>, subtitle_lang: Option<&str>) -> String {
    if let Some(lang) = tesseract_lang {
        return lang.to_owned();
    }
    match subtitle_lang {
        None => DEFAULT_TESSERACT_LANG.to_owned(),
        Some(lang) => tesseract_lang_for(lang).unwrap_or_else(|| {
            warn!(
                "unknown language {:?}, using tesseract language {:?}",
                lang, DEFAULT_TESSERACT_LANG
            );
            DEFAULT_TESSERACT_LANG.to_owned()
        }),
    }
}
