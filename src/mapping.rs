//! Name-pattern driven assignment of semantic roles to columns.

use std::collections::BTreeMap;

use log::debug;
use regex::Regex;

use crate::{
    geo,
    language::Language,
    model::{FieldMapping, FieldMappings, FieldStatistics, ValueFormat},
    patterns::{self, FieldRole},
};

pub type FieldStatsMap = BTreeMap<String, FieldStatistics>;

/// Column gate applied before a name match counts.
pub type FieldValidator = fn(&FieldStatistics) -> bool;

pub fn is_text_field(stats: &FieldStatistics) -> bool {
    stats.string_share() > 0.0
}

pub fn is_date_field(stats: &FieldStatistics) -> bool {
    stats.has_format(ValueFormat::Date) || stats.has_format(ValueFormat::DateTime) || is_text_field(stats)
}

/// Best column whose leaf name matches one of `patterns` and passes `validator`.
///
/// Per column the earliest matching pattern counts; across columns the highest
/// confidence wins and ties keep the first column in path order.
pub fn find_field_by_pattern(
    field_stats: &FieldStatsMap,
    patterns: &[Regex],
    validator: FieldValidator,
) -> Option<FieldMapping> {
    let mut best: Option<FieldMapping> = None;
    for (path, stats) in field_stats {
        let Some(index) = patterns::first_match(patterns, stats.leaf_name()) else {
            continue;
        };
        if !validator(stats) {
            continue;
        }
        let confidence = patterns::pattern_confidence(index, patterns.len());
        if best
            .as_ref()
            .is_none_or(|current| confidence > current.confidence)
        {
            best = Some(FieldMapping::new(path.clone(), confidence));
        }
    }
    best
}

/// One role lookup: which table to consult and how to validate candidates.
#[derive(Debug, Clone, Copy)]
pub struct MappingStrategy {
    pub role: FieldRole,
    pub validator: FieldValidator,
}

impl MappingStrategy {
    pub fn run(&self, field_stats: &FieldStatsMap, language: Language) -> Option<FieldMapping> {
        find_field_by_pattern(
            field_stats,
            patterns::role_patterns(self.role, language),
            self.validator,
        )
    }
}

pub const TITLE_STRATEGY: MappingStrategy = MappingStrategy {
    role: FieldRole::Title,
    validator: is_text_field,
};
pub const DESCRIPTION_STRATEGY: MappingStrategy = MappingStrategy {
    role: FieldRole::Description,
    validator: is_text_field,
};
pub const TIMESTAMP_STRATEGY: MappingStrategy = MappingStrategy {
    role: FieldRole::Timestamp,
    validator: is_date_field,
};
pub const LOCATION_NAME_STRATEGY: MappingStrategy = MappingStrategy {
    role: FieldRole::LocationName,
    validator: is_text_field,
};

/// Title, description, timestamp, location name and geo mappings.
pub fn detect_field_mappings(field_stats: &FieldStatsMap, language_code: &str) -> FieldMappings {
    let language = Language::from_code_or_default(language_code);
    let mappings = FieldMappings {
        title: TITLE_STRATEGY.run(field_stats, language),
        description: DESCRIPTION_STRATEGY.run(field_stats, language),
        timestamp: TIMESTAMP_STRATEGY.run(field_stats, language),
        location_name: LOCATION_NAME_STRATEGY.run(field_stats, language),
        geo: geo::detect_geo_fields_for_language(field_stats, language),
    };
    debug!(
        "Field mappings ({language}): title={:?} description={:?} timestamp={:?} location={:?}",
        mappings.title.as_ref().map(|m| &m.path),
        mappings.description.as_ref().map(|m| &m.path),
        mappings.timestamp.as_ref().map(|m| &m.path),
        mappings.location_name.as_ref().map(|m| &m.path),
    );
    mappings
}
