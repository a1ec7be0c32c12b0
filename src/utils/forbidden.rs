//! Topic filter for generated and incoming text
//! Rejects anything touching family, religion or nationality

use once_cell::sync::Lazy;

/// Keyword stems, matched as case-insensitive substrings
static FORBIDDEN_TOPICS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Family
        "mother", "mom ", "mum ", "mama", "father", "dad", "papa",
        "sister", "brother", "grandma", "grandpa", "grandmother", "grandfather",
        "wife", "husband", "daughter", "family", "parent", "relatives",
        "мама", "мать", "мамк", "папа", "отец", "отц", "сестр", "брат",
        "бабушк", "дедушк", "жена", "муж ", "дочь", "сын ", "семь", "родител", "родн",

        // Religion
        "god", "jesus", "christ", "allah", "muhammad", "prophet", "bible", "quran", "koran",
        "church", "mosque", "synagogue", "temple", "religion", "religious",
        "muslim", "islam", "jewish", "judaism", "buddh", "hindu", "catholic", "orthodox",
        "бог", "иисус", "христ", "аллах", "пророк", "библи", "коран", "церк", "мечет",
        "синагог", "религ", "мусульм", "ислам", "иудей", "буддий", "католи", "правосл",

        // Nationality and ethnicity
        "nation", "ethnic", "russian", "ukrainian", "american", "chinese", "jew",
        "arab", "african", "asian", "european", "mexican", "indian", "polish",
        "georgian", "armenian", "azerbaijani", "kazakh", "uzbek", "tajik", "chechen",
        "нация", "национ", "русск", "росси", "украин", "хохол", "москал", "американ",
        "китай", "еврей", "жид", "араб", "африк", "азиат", "европ", "мексик", "индий",
        "поляк", "грузин", "армян", "азербайдж", "казах", "узбек", "таджик", "чечен", "хач",
    ]
});

/// Check if text touches a forbidden topic
pub fn is_forbidden(text: &str) -> bool {
    forbidden_match(text).is_some()
}

/// Return the first forbidden keyword found in text, if any
pub fn forbidden_match(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    // Pad so stems with a trailing space also match at the very end
    let padded = format!("{} ", lower);
    FORBIDDEN_TOPICS
        .iter()
        .copied()
        .find(|word| padded.contains(word))
}
