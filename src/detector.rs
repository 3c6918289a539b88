//! Detector trait, the built-in default detector, and the dispatching registry.

use log::debug;

use crate::{
    config::EnumOptions,
    language, mapping,
    model::{DetectionContext, DetectionResult, DetectorConfig, PatternResult},
    structure,
};

pub const DEFAULT_DETECTOR_NAME: &str = "default";

/// A pluggable strategy that turns a dataset preview into a [`DetectionResult`].
///
/// Implementations must be pure over the supplied context. A panic inside
/// `can_handle` or `detect` is not caught by [`DetectionService`].
pub trait SchemaDetector: Send + Sync {
    fn name(&self) -> &str;

    /// Host-side settings. The service itself does not filter on them.
    fn config(&self) -> DetectorConfig {
        DetectorConfig::default()
    }

    fn can_handle(&self, context: &DetectionContext) -> bool;

    fn detect(&self, context: &DetectionContext) -> DetectionResult;
}

/// Language → name patterns → geo → identifier/enum columns. Handles anything.
#[derive(Debug, Clone, Default)]
pub struct DefaultDetector {
    enum_options: EnumOptions,
}

impl DefaultDetector {
    pub fn new(enum_options: EnumOptions) -> Self {
        Self { enum_options }
    }
}

impl SchemaDetector for DefaultDetector {
    fn name(&self) -> &str {
        DEFAULT_DETECTOR_NAME
    }

    fn can_handle(&self, _context: &DetectionContext) -> bool {
        true
    }

    fn detect(&self, context: &DetectionContext) -> DetectionResult {
        let language = language::detect_language(&context.sample_data, &context.headers);
        let field_mappings = mapping::detect_field_mappings(&context.field_stats, &language.code);
        let patterns = PatternResult {
            id_fields: structure::detect_id_fields(&context.field_stats),
            enum_fields: structure::detect_enum_fields(&context.field_stats, &self.enum_options),
        };
        debug!(
            "Default detector: {} field(s), {} id, {} enum",
            context.field_stats.len(),
            patterns.id_fields.len(),
            patterns.enum_fields.len()
        );
        DetectionResult {
            language,
            field_mappings,
            patterns,
        }
    }
}

/// Registry of detectors with a guaranteed fallback.
///
/// Detectors keep their registration order; re-registering a name replaces the
/// detector in place. Mutation needs `&mut self`, so registering while another
/// thread is detecting is ruled out by the borrow checker.
#[derive(Default)]
pub struct DetectionService {
    detectors: Vec<Box<dyn SchemaDetector>>,
    default_name: Option<String>,
}

impl DetectionService {
    /// Registers `detectors` in order. Without one named `"default"`, the last
    /// supplied detector becomes the fallback.
    pub fn new(detectors: Vec<Box<dyn SchemaDetector>>) -> Self {
        let mut service = Self::default();
        let mut last_name = None;
        for detector in detectors {
            last_name = Some(detector.name().to_string());
            service.register(detector);
        }
        if service.default_name.is_none() {
            service.default_name = last_name;
        }
        service
    }

    /// Service holding only [`DefaultDetector`] with the given enum options.
    pub fn with_default(enum_options: EnumOptions) -> Self {
        Self::new(vec![Box::new(DefaultDetector::new(enum_options))])
    }

    pub fn register(&mut self, detector: Box<dyn SchemaDetector>) {
        let name = detector.name().to_string();
        if name == DEFAULT_DETECTOR_NAME {
            self.default_name = Some(name.clone());
        }
        match self.position(&name) {
            Some(idx) => {
                debug!("Replacing detector '{name}'");
                self.detectors[idx] = detector;
            }
            None => {
                debug!("Registering detector '{name}'");
                self.detectors.push(detector);
            }
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.detectors
            .iter()
            .position(|detector| detector.name() == name)
    }

    pub fn get_detector(&self, name: &str) -> Option<&dyn SchemaDetector> {
        self.position(name).map(|idx| self.detectors[idx].as_ref())
    }

    pub fn get_all_detectors(&self) -> Vec<&dyn SchemaDetector> {
        self.detectors.iter().map(|detector| detector.as_ref()).collect()
    }

    pub fn default_detector(&self) -> Option<&dyn SchemaDetector> {
        self.default_name
            .as_deref()
            .and_then(|name| self.get_detector(name))
    }

    fn is_default(&self, detector: &dyn SchemaDetector) -> bool {
        self.default_name.as_deref() == Some(detector.name())
    }

    /// First non-default detector accepting `context`, else the default one.
    ///
    /// The default detector's `can_handle` is never consulted.
    pub fn find_compatible_detector(&self, context: &DetectionContext) -> Option<&dyn SchemaDetector> {
        self.detectors
            .iter()
            .map(|detector| detector.as_ref())
            .filter(|detector| !self.is_default(*detector))
            .find(|detector| detector.can_handle(context))
            .or_else(|| self.default_detector())
    }

    /// Runs the named detector if it exists and accepts `context`; otherwise the
    /// fallback; otherwise returns [`DetectionResult::empty`].
    pub fn detect(&self, name: Option<&str>, context: &DetectionContext) -> DetectionResult {
        if let Some(name) = name {
            match self.get_detector(name) {
                Some(detector) if detector.can_handle(context) => {
                    debug!("Dispatching to detector '{name}'");
                    return detector.detect(context);
                }
                Some(_) => debug!("Detector '{name}' declined the context, using fallback"),
                None => debug!("Detector '{name}' not registered, using fallback"),
            }
        }
        match self.default_detector() {
            Some(detector) => detector.detect(context),
            None => {
                debug!("No detectors registered, returning empty result");
                DetectionResult::empty()
            }
        }
    }
}
