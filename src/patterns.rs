//! Column-name pattern bank.
//!
//! Every table is an ordered list of case-insensitive regexes matched against a
//! column's leaf name, most specific first. The position of the first matching
//! pattern drives the confidence of a mapping (see [`pattern_confidence`]).
//! Tables are compiled once and never mutated.

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;

use crate::language::Language;

/// Semantic role looked up in the per-language tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Title,
    Description,
    Timestamp,
    LocationName,
    /// Free-text address usable for geocoding.
    Address,
}

impl FieldRole {
    pub const ALL: [FieldRole; 5] = [
        FieldRole::Title,
        FieldRole::Description,
        FieldRole::Timestamp,
        FieldRole::LocationName,
        FieldRole::Address,
    ];
}

/// Inclusive numeric range a coordinate axis must fall in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateBounds {
    pub min: f64,
    pub max: f64,
}

impl CoordinateBounds {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

pub const LATITUDE_BOUNDS: CoordinateBounds = CoordinateBounds {
    min: -90.0,
    max: 90.0,
};
pub const LONGITUDE_BOUNDS: CoordinateBounds = CoordinateBounds {
    min: -180.0,
    max: 180.0,
};

/// `0.5 + 0.5 × (1 − index / count)`: the earliest pattern scores 1.0.
pub fn pattern_confidence(index: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    0.5 + 0.5 * (1.0 - index as f64 / count as f64)
}

/// Index of the first pattern that matches `name`.
pub fn first_match(patterns: &[Regex], name: &str) -> Option<usize> {
    patterns.iter().position(|pattern| pattern.is_match(name))
}

type Table = &'static [(Language, &'static [&'static str])];

const TITLE: Table = &[
    (
        Language::English,
        &[
            r"^title$",
            r"^(event|item|product|post|article|display)[_\s.-]?(title|name)$",
            r"^name$",
            r"^heading$",
            r"^headline$",
            r"^subject$",
            r"^label$",
            r"title",
            r"name",
        ],
    ),
    (
        Language::German,
        &[
            r"^titel$",
            r"^(veranstaltungs|event|produkt|artikel)[_\s.-]?(titel|name)$",
            r"^bezeichnung$",
            r"^name$",
            r"^überschrift$",
            r"^betreff$",
            r"titel",
            r"^title$",
            r"name",
        ],
    ),
    (
        Language::French,
        &[
            r"^titre$",
            r"^(titre|nom)[_\s.-]?(de[_\s.-]?l[_\s.'-]?)?([ée]v[ée]nement|produit|article)$",
            r"^nom$",
            r"^intitul[ée]$",
            r"^libell[ée]$",
            r"^sujet$",
            r"titre",
            r"^title$",
            r"nom",
        ],
    ),
    (
        Language::Spanish,
        &[
            r"^t[íi]tulo$",
            r"^(t[íi]tulo|nombre)[_\s.-]?(del?[_\s.-]?)?(evento|producto|art[íi]culo)$",
            r"^nombre$",
            r"^encabezado$",
            r"^asunto$",
            r"t[íi]tulo",
            r"^title$",
            r"nombre",
        ],
    ),
    (
        Language::Italian,
        &[
            r"^titolo$",
            r"^(titolo|nome)[_\s.-]?(dell?[_\s.'-]?)?(evento|prodotto|articolo)$",
            r"^nome$",
            r"^intestazione$",
            r"^oggetto$",
            r"titolo",
            r"^title$",
            r"nome",
        ],
    ),
    (
        Language::Dutch,
        &[
            r"^titel$",
            r"^(evenement|product|artikel)[_\s.-]?(titel|naam)$",
            r"^naam$",
            r"^kop$",
            r"^onderwerp$",
            r"titel",
            r"^title$",
            r"naam",
        ],
    ),
    (
        Language::Portuguese,
        &[
            r"^t[íi]tulo$",
            r"^(t[íi]tulo|nome)[_\s.-]?(d[oae][_\s.-]?)?(evento|produto|artigo)$",
            r"^nome$",
            r"^cabe[çc]alho$",
            r"^assunto$",
            r"t[íi]tulo",
            r"^title$",
            r"nome",
        ],
    ),
];

const DESCRIPTION: Table = &[
    (
        Language::English,
        &[
            r"^description$",
            r"^(event|item|product|full|long|short)[_\s.-]?description$",
            r"^desc$",
            r"^summary$",
            r"^details?$",
            r"^body$",
            r"^content$",
            r"^notes?$",
            r"^text$",
            r"description",
            r"summary",
            r"comment",
        ],
    ),
    (
        Language::German,
        &[
            r"^beschreibung$",
            r"^(kurz|lang|veranstaltungs)[_\s.-]?beschreibung$",
            r"^zusammenfassung$",
            r"^inhalt$",
            r"^details?$",
            r"^text$",
            r"^notiz(en)?$",
            r"^bemerkung(en)?$",
            r"beschreibung",
            r"^description$",
        ],
    ),
    (
        Language::French,
        &[
            r"^description$",
            r"^description[_\s.-]?(courte|longue|compl[èe]te)$",
            r"^r[ée]sum[ée]$",
            r"^d[ée]tails?$",
            r"^contenu$",
            r"^texte$",
            r"^remarques?$",
            r"^commentaires?$",
            r"description",
        ],
    ),
    (
        Language::Spanish,
        &[
            r"^descripci[óo]n$",
            r"^descripci[óo]n[_\s.-]?(corta|larga|completa)$",
            r"^resumen$",
            r"^detalles?$",
            r"^contenido$",
            r"^texto$",
            r"^notas?$",
            r"descripci[óo]n",
            r"^description$",
        ],
    ),
    (
        Language::Italian,
        &[
            r"^descrizione$",
            r"^descrizione[_\s.-]?(breve|lunga|completa)$",
            r"^riassunto$",
            r"^dettagli$",
            r"^contenuto$",
            r"^testo$",
            r"^note$",
            r"descrizione",
            r"^description$",
        ],
    ),
    (
        Language::Dutch,
        &[
            r"^beschrijving$",
            r"^omschrijving$",
            r"^(korte|lange)[_\s.-]?(beschrijving|omschrijving)$",
            r"^samenvatting$",
            r"^inhoud$",
            r"^tekst$",
            r"^opmerkingen$",
            r"beschrijving|omschrijving",
            r"^description$",
        ],
    ),
    (
        Language::Portuguese,
        &[
            r"^descri[çc][ãa]o$",
            r"^descri[çc][ãa]o[_\s.-]?(curta|longa|completa)$",
            r"^resumo$",
            r"^detalhes$",
            r"^conte[úu]do$",
            r"^texto$",
            r"^notas$",
            r"descri[çc][ãa]o",
            r"^description$",
        ],
    ),
];

const TIMESTAMP: Table = &[
    (
        Language::English,
        &[
            r"^timestamp$",
            r"^date[_\s.-]?time$",
            r"^(event|start|occurred|created|published|recorded)[_\s.-]?(at|date|time|on)$",
            r"^date$",
            r"^time$",
            r"^(created|updated|modified)$",
            r"date",
            r"time",
            r"_at$",
        ],
    ),
    (
        Language::German,
        &[
            r"^zeitstempel$",
            r"^datum[_\s.-]?(und[_\s.-]?)?uhrzeit$",
            r"^(start|beginn|ende|erstellungs|veranstaltungs)[_\s.-]?(datum|zeit)$",
            r"^datum$",
            r"^zeitpunkt$",
            r"^erstellt[_\s.-]?(am)?$",
            r"^uhrzeit$",
            r"^zeit$",
            r"datum",
            r"zeit",
            r"^timestamp$",
            r"^date$",
        ],
    ),
    (
        Language::French,
        &[
            r"^horodatage$",
            r"^date[_\s.-]?(et[_\s.-]?)?heure$",
            r"^date[_\s.-]?(de[_\s.-]?)?(d[ée]but|fin|cr[ée]ation|publication)$",
            r"^date$",
            r"^heure$",
            r"^cr[ée][ée][_\s.-]?le$",
            r"date",
            r"heure",
            r"^timestamp$",
        ],
    ),
    (
        Language::Spanish,
        &[
            r"^marca[_\s.-]?de[_\s.-]?tiempo$",
            r"^fecha[_\s.-]?(y[_\s.-]?)?hora$",
            r"^fecha[_\s.-]?(de[_\s.-]?)?(inicio|fin|creaci[óo]n|publicaci[óo]n)$",
            r"^fecha$",
            r"^hora$",
            r"fecha",
            r"hora",
            r"^timestamp$",
            r"^date$",
        ],
    ),
    (
        Language::Italian,
        &[
            r"^data[_\s.-]?(e[_\s.-]?)?ora$",
            r"^data[_\s.-]?(di[_\s.-]?)?(inizio|fine|creazione|pubblicazione)$",
            r"^data$",
            r"^ora$",
            r"^orario$",
            r"data",
            r"^timestamp$",
            r"^date$",
        ],
    ),
    (
        Language::Dutch,
        &[
            r"^tijdstempel$",
            r"^datum[_\s.-]?(en[_\s.-]?)?tijd$",
            r"^(start|begin|eind|aanmaak)[_\s.-]?(datum|tijd)$",
            r"^datum$",
            r"^tijd$",
            r"datum",
            r"tijd",
            r"^timestamp$",
            r"^date$",
        ],
    ),
    (
        Language::Portuguese,
        &[
            r"^data[_\s.-]?(e[_\s.-]?)?hora$",
            r"^data[_\s.-]?(de[_\s.-]?)?(in[íi]cio|fim|cria[çc][ãa]o|publica[çc][ãa]o)$",
            r"^data$",
            r"^hora$",
            r"^hor[áa]rio$",
            r"data",
            r"hora",
            r"^timestamp$",
            r"^date$",
        ],
    ),
];

const LOCATION_NAME: Table = &[
    (
        Language::English,
        &[
            r"^location[_\s.-]?name$",
            r"^venue([_\s.-]?name)?$",
            r"^place([_\s.-]?name)?$",
            r"^location$",
            r"^site$",
            r"^city$",
            r"^town$",
            r"^region$",
            r"^country$",
            r"location",
            r"venue",
            r"place",
        ],
    ),
    (
        Language::German,
        &[
            r"^ort[_\s.-]?name$",
            r"^ortsname$",
            r"^veranstaltungsort$",
            r"^ort$",
            r"^standort$",
            r"^stadt$",
            r"^gemeinde$",
            r"^region$",
            r"^land$",
            r"standort",
            r"^location$",
        ],
    ),
    (
        Language::French,
        &[
            r"^nom[_\s.-]?(du[_\s.-]?)?lieu$",
            r"^lieu$",
            r"^emplacement$",
            r"^site$",
            r"^ville$",
            r"^commune$",
            r"^r[ée]gion$",
            r"^pays$",
            r"lieu",
            r"^location$",
        ],
    ),
    (
        Language::Spanish,
        &[
            r"^nombre[_\s.-]?(del[_\s.-]?)?lugar$",
            r"^lugar$",
            r"^ubicaci[óo]n$",
            r"^sitio$",
            r"^ciudad$",
            r"^localidad$",
            r"^regi[óo]n$",
            r"^pa[íi]s$",
            r"lugar|ubicaci[óo]n",
            r"^location$",
        ],
    ),
    (
        Language::Italian,
        &[
            r"^nome[_\s.-]?(del[_\s.-]?)?luogo$",
            r"^luogo$",
            r"^localit[àa]$",
            r"^sede$",
            r"^citt[àa]$",
            r"^comune$",
            r"^regione$",
            r"^paese$",
            r"luogo",
            r"^location$",
        ],
    ),
    (
        Language::Dutch,
        &[
            r"^plaats[_\s.-]?naam$",
            r"^plaatsnaam$",
            r"^locatie$",
            r"^plaats$",
            r"^stad$",
            r"^gemeente$",
            r"^regio$",
            r"^land$",
            r"locatie|plaats",
            r"^location$",
        ],
    ),
    (
        Language::Portuguese,
        &[
            r"^nome[_\s.-]?(do[_\s.-]?)?local$",
            r"^local$",
            r"^localiza[çc][ãa]o$",
            r"^lugar$",
            r"^cidade$",
            r"^munic[íi]pio$",
            r"^regi[ãa]o$",
            r"^pa[íi]s$",
            r"local",
            r"^location$",
        ],
    ),
];

const ADDRESS: Table = &[
    (
        Language::English,
        &[
            r"^(full|street|postal|mailing)[_\s.-]?address$",
            r"^address$",
            r"^addr$",
            r"^address[_\s.-]?(line)?[_\s.-]?1$",
            r"^street$",
            r"^location$",
            r"address",
            r"street",
        ],
    ),
    (
        Language::German,
        &[
            r"^(post|voll)?anschrift$",
            r"^adresse$",
            r"^stra(ß|ss)e$",
            r"^stra(ß|ss)e[_\s.-]?(und[_\s.-]?)?hausnummer$",
            r"adresse|anschrift",
            r"^address$",
        ],
    ),
    (
        Language::French,
        &[
            r"^adresse[_\s.-]?(postale|compl[èe]te)$",
            r"^adresse$",
            r"^rue$",
            r"adresse",
            r"^address$",
        ],
    ),
    (
        Language::Spanish,
        &[
            r"^direcci[óo]n[_\s.-]?(postal|completa)$",
            r"^direcci[óo]n$",
            r"^domicilio$",
            r"^calle$",
            r"direcci[óo]n",
            r"^address$",
        ],
    ),
    (
        Language::Italian,
        &[
            r"^indirizzo[_\s.-]?(postale|completo)$",
            r"^indirizzo$",
            r"^recapito$",
            r"^via$",
            r"indirizzo",
            r"^address$",
        ],
    ),
    (
        Language::Dutch,
        &[
            r"^(post|volledig)[_\s.-]?adres$",
            r"^adres$",
            r"^straat$",
            r"adres",
            r"^address$",
        ],
    ),
    (
        Language::Portuguese,
        &[
            r"^endere[çc]o[_\s.-]?(postal|completo)$",
            r"^endere[çc]o$",
            r"^morada$",
            r"^rua$",
            r"endere[çc]o|morada",
            r"^address$",
        ],
    ),
];

pub const LATITUDE: &[&str] = &[
    r"^lat$",
    r"^latitude$",
    r"^lat[_\s.-]?(deg|degrees?|dd|wgs84)$",
    r"^(geo|gps|wgs84|y)[_\s.-]?lat(itude)?$",
    r"^(breite|breitengrad|geo[_\s.-]?breite)$",
    r"^(latitud|latitudine|breedtegraad|breedte)$",
    r"[_\s.-]lat(itude)?$",
    r"^y$",
];

pub const LONGITUDE: &[&str] = &[
    r"^(lng|lon)$",
    r"^longitude$",
    r"^long$",
    r"^(lng|lon|long)[_\s.-]?(deg|degrees?|dd|wgs84)$",
    r"^(geo|gps|wgs84|x)[_\s.-]?(lng|lon|long|longitude)$",
    r"^(l[äa]nge|l[äa]ngengrad|geo[_\s.-]?l[äa]nge)$",
    r"^(longitud|longitudine|lengtegraad|lengte)$",
    r"[_\s.-](lng|lon|long|longitude)$",
    r"^x$",
];

pub const COMBINED: &[&str] = &[
    r"^coordinates?$",
    r"^coords?$",
    r"^lat[_\s.-]?(lng|lon|long)$",
    r"^(lng|lon|long)[_\s.-]?lat$",
    r"^geo[_\s.-]?(location|position|point|coordinates?)$",
    r"^location[_\s.-]?coordinates?$",
    r"^(koordinaten|coordonn[ée]es|coordenadas|coordinate|co[öo]rdinaten)$",
    r"^(gps|geo)$",
    r"^position$",
    r"^point$",
    r"^geometry$",
    r"coord",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("(?i){pattern}")).expect("Invalid regex: pattern bank entry")
        })
        .collect()
}

fn compile_table(table: Table) -> HashMap<Language, Vec<Regex>> {
    table
        .iter()
        .map(|(lang, patterns)| (*lang, compile(patterns)))
        .collect()
}

static ROLE_PATTERNS: LazyLock<HashMap<FieldRole, HashMap<Language, Vec<Regex>>>> =
    LazyLock::new(|| {
        FieldRole::ALL
            .into_iter()
            .map(|role| {
                let table = match role {
                    FieldRole::Title => TITLE,
                    FieldRole::Description => DESCRIPTION,
                    FieldRole::Timestamp => TIMESTAMP,
                    FieldRole::LocationName => LOCATION_NAME,
                    FieldRole::Address => ADDRESS,
                };
                (role, compile_table(table))
            })
            .collect()
    });

pub static LATITUDE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(LATITUDE));
pub static LONGITUDE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(LONGITUDE));
pub static COMBINED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(COMBINED));

/// Patterns for `role` in `language`.
pub fn role_patterns(role: FieldRole, language: Language) -> &'static [Regex] {
    let by_language = &ROLE_PATTERNS[&role];
    by_language
        .get(&language)
        .or_else(|| by_language.get(&Language::English))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_every_language() {
        for role in FieldRole::ALL {
            for lang in Language::ALL {
                assert!(
                    !role_patterns(role, lang).is_empty(),
                    "{role:?} missing {lang}"
                );
            }
        }
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let english = role_patterns(FieldRole::Title, Language::English);
        let fallback = role_patterns(FieldRole::Title, Language::from_code_or_default("jpn"));
        assert_eq!(english.len(), fallback.len());
        assert_eq!(english[0].as_str(), fallback[0].as_str());
    }

    #[test]
    fn confidence_decays_with_index() {
        assert_eq!(pattern_confidence(0, 4), 1.0);
        assert_eq!(pattern_confidence(2, 4), 0.75);
        assert!(pattern_confidence(3, 4) > 0.5);
        assert_eq!(pattern_confidence(0, 0), 0.0);
    }

    #[test]
    fn coordinate_names_tolerate_separators() {
        for name in ["lat", "Latitude", "gps_lat", "geo-latitude", "Breite", "start.lat"] {
            assert!(first_match(&LATITUDE_PATTERNS, name).is_some(), "{name}");
        }
        for name in ["lng", "LON", "longitude", "gps lng", "Länge", "lon_deg"] {
            assert!(first_match(&LONGITUDE_PATTERNS, name).is_some(), "{name}");
        }
        assert!(first_match(&LONGITUDE_PATTERNS, "belong").is_none());
        for name in ["coordinates", "latlng", "lat_lng", "geometry", "Koordinaten"] {
            assert!(first_match(&COMBINED_PATTERNS, name).is_some(), "{name}");
        }
    }

    #[test]
    fn earliest_pattern_wins() {
        let patterns = role_patterns(FieldRole::Title, Language::English);
        assert_eq!(first_match(patterns, "title"), Some(0));
        assert_eq!(first_match(patterns, "event_title"), Some(1));
        assert_eq!(first_match(patterns, "subtitle_text"), Some(patterns.len() - 2));
    }

    #[test]
    fn bounds_reject_out_of_range_and_nan() {
        assert!(LATITUDE_BOUNDS.contains(-90.0));
        assert!(!LATITUDE_BOUNDS.contains(90.5));
        assert!(!LONGITUDE_BOUNDS.contains(f64::NAN));
    }
}
