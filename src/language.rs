//! Language identification for dataset previews.
//!
//! The corpus is assembled from column headers and the free-text cells of the
//! sample rows; identifiers, dates, numbers, URLs and similar tokens are
//! dropped first because they carry no linguistic signal. Classification is a
//! small trigram + stopword model restricted to the seven languages the
//! pattern bank covers.

use std::{collections::HashMap, fmt, sync::LazyLock};

use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::model::{LanguageResult, SampleRow};

/// Corpora shorter than this are not classified.
pub const MIN_TEXT_LENGTH: usize = 20;
const MIN_USEFUL_LENGTH: usize = 3;
const MIN_HEADER_LENGTH: usize = 3;
const RELIABLE_CONFIDENCE: f64 = 0.5;
const TRIGRAM_WEIGHT: f64 = 0.6;
const STOPWORD_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    English,
    German,
    French,
    Spanish,
    Italian,
    Dutch,
    Portuguese,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::German,
        Language::French,
        Language::Spanish,
        Language::Italian,
        Language::Dutch,
        Language::Portuguese,
    ];

    /// ISO 639-3 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "eng",
            Language::German => "deu",
            Language::French => "fra",
            Language::Spanish => "spa",
            Language::Italian => "ita",
            Language::Dutch => "nld",
            Language::Portuguese => "por",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::German => "German",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::Italian => "Italian",
            Language::Dutch => "Dutch",
            Language::Portuguese => "Portuguese",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let lowered = code.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == lowered)
    }

    /// Unknown codes resolve to English.
    pub fn from_code_or_default(code: &str) -> Self {
        Self::from_code(code).unwrap_or(Language::English)
    }

    fn profile(&self) -> &'static LanguageProfile {
        &PROFILES[self]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// Most frequent trigrams per language, ranked. `_` marks a word boundary.
const TRIGRAMS: &[(Language, &str)] = &[
    (
        Language::English,
        "_th the he_ _an and nd_ _of of_ _to to_ ing ng_ _in in_ ion tio on_ ed_ \
         is_ _is er_ es_ ent _wi wit ith th_ _fo for or_ _co ati at_ ter _re re_ \
         his _be all hat tha _wh ly_ _on ver ere her al_ _ha ess ss_ tle",
    ),
    (
        Language::German,
        "en_ er_ _de der ie_ _di die ich ein _ei und _un nd_ sch che ch_ den _da \
         das as_ ung ng_ cht _ge gen ine _zu zu_ ten in_ _in ber _be ist _is st_ \
         nen eit te_ _mi mit it_ auf _au hen _ve ver lic _wi ht_ ste ers _st",
    ),
    (
        Language::French,
        "es_ _de de_ le_ _le ent _la la_ nt_ ion _et et_ les ur_ tio on_ des _pa \
         _co que _qu ue_ ne_ _un re_ men ait _en en_ our _po pou par _da dan ans \
         _pr eur est _es ais ons _su sur ett _ce ell ant _ré",
    ),
    (
        Language::Spanish,
        "_de de_ os_ _la la_ el_ _el as_ _en en_ ent es_ _qu que ue_ _co on_ ció \
         ión _lo los del ado ra_ _se _pa par _un una na_ nte con _es est sta ien \
         _po por or_ ara aci _re mos las _al ero ndo _su",
    ),
    (
        Language::Italian,
        "_di di_ _la la_ to_ _il il_ che _ch he_ re_ ell ent _de del lla _co con \
         one ion zio _pe per er_ _in _un una no_ ato are _ne nel _so ere tto _al \
         _si eri _qu ono sta gli _gl ata _è_ lia",
    ),
    (
        Language::Dutch,
        "en_ _de de_ _he het et_ an_ _va van _ee een _en _in in_ ing ng_ _ge gen \
         er_ _vo voo oor or_ _te ver _ve _is is_ _op op_ _me met _da dat aar _zi \
         ijk lij ijn _wo eer ee_ sch cht ere _on and ord",
    ),
    (
        Language::Portuguese,
        "_de de_ os_ _qu que ue_ _a_ _e_ _o_ ão_ _co com _pa par ra_ _do do_ da_ \
         _da as_ _em em_ ent nte es_ ção açã _um uma ma_ _se _pr _no _na ar_ ado \
         men por _po or_ ões ais nto est _es _nã não",
    ),
];

const STOPWORDS: &[(Language, &str)] = &[
    (
        Language::English,
        "the and of to in is for with on this that are was by at from be an it as \
         or will you our we all new about",
    ),
    (
        Language::German,
        "der die das und ist mit von den dem des ein eine einen nicht auf für im zu \
         sich auch wir sie es bei nach aus über werden wird oder am vom zum zur",
    ),
    (
        Language::French,
        "le la les de des du et est un une pour dans sur avec au aux par que qui ce \
         cette nous vous pas sont plus en",
    ),
    (
        Language::Spanish,
        "el la los las de del y es un una para con en por que se al su sus como más \
         este esta son lo",
    ),
    (
        Language::Italian,
        "il lo la gli le di del della e è un una per con che in su sono da dei delle \
         nel nella al alla questo",
    ),
    (
        Language::Dutch,
        "de het een en van is op voor met in te dat die niet zijn wordt bij aan ook \
         naar over om er we",
    ),
    (
        Language::Portuguese,
        "o a os as de do da dos das e é um uma para com em no na por que se não mais \
         ao pelo pela",
    ),
];

// Column-name vocabulary, counted like stopwords so that header-only corpora
// carry signal. Names spelled alike in several languages sit under English.
const SCHEMA_WORDS: &[(Language, &str)] = &[
    (
        Language::English,
        "id name title description summary details date time timestamp created \
         updated start end location venue address street city town country state \
         zip postcode latitude longitude coordinates category price amount email \
         phone url website organizer",
    ),
    (
        Language::German,
        "titel bezeichnung beschreibung datum uhrzeit zeit ort standort stadt \
         adresse anschrift strasse straße breitengrad längengrad kategorie preis",
    ),
    (
        Language::French,
        "titre nom lieu adresse rue ville pays heure début fin catégorie prix",
    ),
    (
        Language::Spanish,
        "título nombre descripción fecha hora lugar dirección calle ciudad país \
         categoría precio",
    ),
    (
        Language::Italian,
        "titolo nome descrizione data ora luogo indirizzo città paese categoria \
         prezzo",
    ),
    (
        Language::Dutch,
        "naam omschrijving beschrijving datum tijd plaats locatie adres straat stad \
         categorie prijs",
    ),
    (
        Language::Portuguese,
        "título nome descrição data hora endereço morada rua cidade país categoria \
         preço",
    ),
];

struct LanguageProfile {
    trigram_weights: HashMap<String, f64>,
    stopwords: Vec<&'static str>,
}

static PROFILES: LazyLock<HashMap<Language, LanguageProfile>> = LazyLock::new(|| {
    Language::ALL
        .into_iter()
        .map(|lang| {
            let ranked = TRIGRAMS
                .iter()
                .find(|(candidate, _)| *candidate == lang)
                .map(|(_, list)| list.split_whitespace().collect::<Vec<_>>())
                .unwrap_or_default();
            let total = ranked.len().max(1) as f64;
            let mut trigram_weights = HashMap::with_capacity(ranked.len());
            for (rank, trigram) in ranked.into_iter().enumerate() {
                trigram_weights
                    .entry(trigram.to_string())
                    .or_insert(1.0 - rank as f64 / (2.0 * total));
            }
            let stopwords = STOPWORDS
                .iter()
                .chain(SCHEMA_WORDS)
                .filter(|(candidate, _)| *candidate == lang)
                .flat_map(|(_, list)| list.split_whitespace())
                .collect();
            (
                lang,
                LanguageProfile {
                    trigram_weights,
                    stopwords,
                },
            )
        })
        .collect()
});

static EXCLUSION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // email
        r"^[^\s@]+@[^\s@]+\.[^\s@]+$",
        // url
        r"(?i)^(https?|ftp)://\S+$|^www\.\S+$",
        // ISO-8601 date / datetime
        r"^\d{4}-\d{2}-\d{2}([T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?)?$",
        // bare number
        r"^[+-]?\d+(\.\d+)?$",
        // lat,lng pair
        r"^[+-]?\d{1,3}(\.\d+)?\s*[,;]\s*[+-]?\d{1,3}(\.\d+)?$",
        // uuid
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
        // number with separators
        r"^[+-]?\d[\d.,'\s]*$",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid regex: language exclusion"))
    .collect()
});

/// Whether a trimmed value is worth feeding to the classifier.
pub fn is_useful_text(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.chars().count() < MIN_USEFUL_LENGTH {
        return false;
    }
    !EXCLUSION_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(trimmed))
}

fn is_text_header(header: &str) -> bool {
    let trimmed = header.trim();
    trimmed.chars().count() >= MIN_HEADER_LENGTH
        && trimmed.chars().any(char::is_alphabetic)
        && is_useful_text(trimmed)
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(text) => {
            if is_useful_text(text) {
                out.push(text.trim());
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}

/// Builds the classification corpus from headers and sample rows.
pub fn extract_text_for_language_detection(samples: &[SampleRow], headers: &[String]) -> String {
    let mut parts: Vec<String> = headers
        .iter()
        .filter(|header| is_text_header(header))
        .map(|header| header.trim().replace(['_', '-', '.'], " "))
        .collect();

    let mut values = Vec::new();
    for row in samples {
        for value in row.values() {
            collect_strings(value, &mut values);
        }
    }
    parts.extend(values.into_iter().map(str::to_string));
    parts.join(" ")
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphabetic())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn word_trigrams(word: &str) -> impl Iterator<Item = String> + '_ {
    let padded: Vec<char> = std::iter::once('_')
        .chain(word.chars())
        .chain(std::iter::once('_'))
        .collect();
    (0..padded.len().saturating_sub(2)).map(move |idx| padded[idx..idx + 3].iter().collect())
}

/// Normalized per-language scores, best first. Empty when there is no evidence.
pub fn rank_languages(text: &str) -> Vec<(Language, f64)> {
    let words = tokenize(text);
    if words.is_empty() {
        return Vec::new();
    }
    let trigrams: Vec<String> = words.iter().flat_map(|word| word_trigrams(word)).collect();
    let trigram_total = trigrams.len().max(1) as f64;
    let word_total = words.len() as f64;

    let raw: Vec<(Language, f64)> = Language::ALL
        .into_iter()
        .map(|lang| {
            let profile = lang.profile();
            let trigram_share = trigrams
                .iter()
                .filter_map(|trigram| profile.trigram_weights.get(trigram))
                .sum::<f64>()
                / trigram_total;
            let stopword_share = words
                .iter()
                .filter(|word| profile.stopwords.iter().any(|stop| *stop == word.as_str()))
                .count() as f64
                / word_total;
            let evidence = TRIGRAM_WEIGHT * trigram_share + STOPWORD_WEIGHT * stopword_share;
            (lang, evidence * evidence)
        })
        .collect();

    let total: f64 = raw.iter().map(|(_, score)| score).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut ranked: Vec<(Language, f64)> = raw
        .into_iter()
        .filter(|(_, score)| *score > 0.0)
        .map(|(lang, score)| (lang, score / total))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

pub fn detect_language_from_text(text: &str) -> LanguageResult {
    if text.trim().chars().count() < MIN_TEXT_LENGTH {
        return LanguageResult::default();
    }
    let ranked = rank_languages(text);
    let Some(&(top, score)) = ranked.first() else {
        debug!("Language undetermined for {} char corpus", text.len());
        return LanguageResult::default();
    };
    let confidence = match ranked.get(1) {
        Some(&(_, second)) => (score + 0.5 * (score - second)).min(1.0),
        None => score,
    }
    .clamp(0.0, 1.0);
    if confidence < RELIABLE_CONFIDENCE {
        debug!("Best guess {top} at {confidence:.3} is unreliable, using English");
        return LanguageResult {
            confidence,
            ..LanguageResult::default()
        };
    }
    debug!("Detected language {top} with confidence {confidence:.3}");
    LanguageResult {
        code: top.code().to_string(),
        name: top.name().to_string(),
        confidence,
        is_reliable: true,
    }
}

pub fn detect_language(samples: &[SampleRow], headers: &[String]) -> LanguageResult {
    let text = extract_text_for_language_detection(samples, headers);
    detect_language_from_text(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> SampleRow {
        value.as_object().cloned().expect("object row")
    }

    #[test]
    fn exclusion_patterns_drop_structured_values() {
        for value in [
            "info@example.org",
            "https://example.org/events/1",
            "2024-05-01",
            "2024-05-01T10:30:00Z",
            "12345",
            "52.52,13.405",
            "550e8400-e29b-41d4-a716-446655440000",
            "1,234,567.89",
            "ab",
        ] {
            assert!(!is_useful_text(value), "{value} should be excluded");
        }
        assert!(is_useful_text("Konzert im Park"));
    }

    #[test]
    fn corpus_skips_short_and_numeric_headers() {
        let headers = vec!["id".to_string(), "event_title".to_string(), "2024".to_string()];
        let samples = vec![row(json!({"title": "Summer fair", "count": 3, "mail": "a@b.cd"}))];
        let text = extract_text_for_language_detection(&samples, &headers);
        assert_eq!(text, "event title Summer fair");
    }

    #[test]
    fn nested_strings_are_collected() {
        let samples = vec![row(json!({"venue": {"name": "Stadtpark", "tags": ["Musik", "x"]}}))];
        let text = extract_text_for_language_detection(&samples, &[]);
        assert!(text.contains("Stadtpark"));
        assert!(text.contains("Musik"));
        assert!(!text.contains(" x"));
    }

    #[test]
    fn short_corpus_returns_default() {
        let result = detect_language_from_text("kurz");
        assert_eq!(result, LanguageResult::default());
    }

    #[test]
    fn english_prose_is_detected() {
        let result = detect_language_from_text(
            "The annual meeting of the city council will take place in the town hall with all members and the public",
        );
        assert_eq!(result.code, "eng");
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    }

    #[test]
    fn french_prose_is_detected() {
        let result = detect_language_from_text(
            "Le marché de la ville est ouvert tous les samedis pour les habitants et les visiteurs dans le centre",
        );
        assert_eq!(result.code, "fra");
    }

    #[test]
    fn language_codes_round_trip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
        assert_eq!(Language::from_code_or_default("jpn"), Language::English);
    }

    #[test]
    fn word_trigrams_include_boundaries() {
        let grams: Vec<String> = word_trigrams("der").collect();
        assert_eq!(grams, vec!["_de", "der", "er_"]);
    }
}
