//! Registry document validation with structured errors and suggestions.
//!
//! Returns a [`ValidationResult`] with errors (the loader rejects the
//! document) and warnings (logged, document still loads).

pub mod fuzzy;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use funnelscope_core::{FunnelSchema, VerticalBenchmarks};

use crate::schema::{DocumentMetadata, RegistryDocument};

use self::fuzzy::{fuzzy_match, is_kebab_case, to_kebab_case};

/// Supported `apiVersion` values.
const SUPPORTED_API_VERSIONS: &[&str] = &["v1"];

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path-like location, e.g. `"spec.stages[2].metric"`.
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line, for load status reporting.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| match &e.suggestion {
                Some(s) => format!("{}: {} (did you mean '{}'?)", e.path, e.message, s),
                None => format!("{}: {}", e.path, e.message),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate any [`RegistryDocument`] variant.
pub fn validate_document(doc: &RegistryDocument) -> ValidationResult {
    let mut result = ValidationResult::new();
    match doc {
        RegistryDocument::Funnel(d) => {
            validate_header(&d.api_version, &d.metadata, &mut result);
            if d.metadata.source.as_deref().map_or(true, str::is_empty) {
                result.error("metadata.source", "funnel schemas must name a source platform");
            }
            validate_funnel(&d.spec, &mut result);
        }
        RegistryDocument::Benchmarks(d) => {
            validate_header(&d.api_version, &d.metadata, &mut result);
            validate_benchmarks(&d.spec, &mut result);
        }
    }
    result
}

fn validate_header(api_version: &str, metadata: &DocumentMetadata, result: &mut ValidationResult) {
    if !SUPPORTED_API_VERSIONS.contains(&api_version) {
        result.warn("apiVersion", format!("unsupported apiVersion '{}'", api_version));
    }
    if metadata.id.is_empty() {
        result.error("metadata.id", "id must not be empty");
    } else if !is_kebab_case(&metadata.id) {
        result.error_with_suggestion(
            "metadata.id",
            format!("id '{}' must be kebab-case", metadata.id),
            to_kebab_case(&metadata.id),
        );
    }
    if metadata.vertical.trim().is_empty() {
        result.error("metadata.vertical", "vertical must not be empty");
    }
}

/// Stage metrics unique and non-empty; primary KPI names a stage.
pub fn validate_funnel(funnel: &FunnelSchema, result: &mut ValidationResult) {
    if funnel.stages.is_empty() {
        result.error("spec.stages", "a funnel needs at least one stage");
        return;
    }

    let mut seen = HashSet::new();
    for (i, stage) in funnel.stages.iter().enumerate() {
        if stage.name.trim().is_empty() {
            result.error(format!("spec.stages[{i}].name"), "stage name must not be empty");
        }
        if stage.metric.trim().is_empty() {
            result.error(format!("spec.stages[{i}].metric"), "stage metric must not be empty");
        } else if !seen.insert(stage.metric.as_str()) {
            result.error(
                format!("spec.stages[{i}].metric"),
                format!("duplicate stage metric '{}'", stage.metric),
            );
        }
        if stage.cost_source.is_some() && stage.cost_metric.is_none() {
            result.warn(
                format!("spec.stages[{i}].cost_source"),
                "cost_source has no effect without cost_metric",
            );
        }
    }

    let metrics: Vec<&str> = funnel.stages.iter().map(|s| s.metric.as_str()).collect();
    if !metrics.contains(&funnel.primary_kpi.as_str()) {
        let message = format!("primary_kpi '{}' is not a stage metric", funnel.primary_kpi);
        match fuzzy_match(&funnel.primary_kpi, &metrics) {
            Some(s) => result.error_with_suggestion("spec.primary_kpi", message, s),
            None => result.error("spec.primary_kpi", message),
        }
    } else if metrics.last() != Some(&funnel.primary_kpi.as_str()) {
        result.warn("spec.primary_kpi", "primary_kpi is usually the last stage");
    }

    if funnel.roas_metric.as_deref() == Some("") {
        result.warn("spec.roas_metric", "empty roas_metric falls back to 'roas'");
    }
}

/// Variances strictly positive; conversion rates within (0, 1].
pub fn validate_benchmarks(benchmarks: &VerticalBenchmarks, result: &mut ValidationResult) {
    if !(benchmarks.default_variance_percent > 0.0) {
        result.error(
            "spec.default_variance_percent",
            format!("must be positive, got {}", benchmarks.default_variance_percent),
        );
    }
    for (metric, stage) in &benchmarks.stages {
        if let Some(v) = stage.variance_percent {
            if !(v > 0.0) {
                result.error(
                    format!("spec.stages.{metric}.variance_percent"),
                    format!("must be positive, got {v}"),
                );
            }
        }
        if let Some(rate) = stage.typical_conversion_rate {
            if !(rate > 0.0 && rate <= 1.0) {
                result.error(
                    format!("spec.stages.{metric}.typical_conversion_rate"),
                    format!("must be a fraction in (0, 1], got {rate}"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BenchmarksDocument, FunnelDocument};
    use funnelscope_core::{FunnelStage, StageBenchmark};

    fn metadata(id: &str, source: Option<&str>) -> DocumentMetadata {
        DocumentMetadata {
            id: id.to_string(),
            name: "test".to_string(),
            source: source.map(str::to_string),
            vertical: "ecommerce".to_string(),
            description: None,
            tags: None,
            enabled: true,
        }
    }

    fn funnel_doc(stages: &[&str], primary_kpi: &str) -> RegistryDocument {
        RegistryDocument::Funnel(FunnelDocument {
            api_version: "v1".into(),
            kind: "FunnelSchema".into(),
            metadata: metadata("meta-ecommerce", Some("meta")),
            spec: FunnelSchema {
                stages: stages.iter().map(|m| FunnelStage::new(m, m, "insights")).collect(),
                primary_kpi: primary_kpi.to_string(),
                roas_metric: None,
            },
        })
    }

    #[test]
    fn valid_funnel_passes() {
        let doc = funnel_doc(&["impressions", "link_clicks", "purchase"], "purchase");
        let result = validate_document(&doc);
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn duplicate_metric_rejected() {
        let doc = funnel_doc(&["impressions", "purchase", "purchase"], "purchase");
        let result = validate_document(&doc);
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "spec.stages[2].metric");
    }

    #[test]
    fn empty_metric_rejected() {
        let result = validate_document(&funnel_doc(&["impressions", "", "purchase"], "purchase"));
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.path == "spec.stages[1].metric"));
    }

    #[test]
    fn unknown_primary_kpi_suggests_stage() {
        let result = validate_document(&funnel_doc(&["impressions", "purchase"], "purchases"));
        assert!(!result.valid);
        let err = &result.errors[0];
        assert_eq!(err.path, "spec.primary_kpi");
        assert_eq!(err.suggestion.as_deref(), Some("purchase"));
        assert!(result.error_summary().contains("did you mean 'purchase'"));
    }

    #[test]
    fn non_terminal_primary_kpi_warns() {
        let result = validate_document(&funnel_doc(&["purchase", "repeat_purchase"], "purchase"));
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn funnel_requires_source() {
        let mut doc = funnel_doc(&["purchase"], "purchase");
        if let RegistryDocument::Funnel(d) = &mut doc {
            d.metadata.source = None;
        }
        let result = validate_document(&doc);
        assert!(result.errors.iter().any(|e| e.path == "metadata.source"));
    }

    #[test]
    fn id_must_be_kebab_case() {
        let mut doc = funnel_doc(&["purchase"], "purchase");
        if let RegistryDocument::Funnel(d) = &mut doc {
            d.metadata.id = "Meta_Ecommerce".into();
        }
        let result = validate_document(&doc);
        assert_eq!(result.errors[0].suggestion.as_deref(), Some("meta-ecommerce"));
    }

    #[test]
    fn benchmark_variances_must_be_positive() {
        let mut spec = VerticalBenchmarks::default();
        spec.stages.insert(
            "purchase".into(),
            StageBenchmark {
                variance_percent: Some(0.0),
                typical_conversion_rate: Some(1.5),
            },
        );
        let doc = RegistryDocument::Benchmarks(BenchmarksDocument {
            api_version: "v1".into(),
            kind: "VerticalBenchmarks".into(),
            metadata: metadata("ecommerce", None),
            spec,
        });
        let result = validate_document(&doc);
        let paths: Vec<_> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "spec.stages.purchase.variance_percent",
                "spec.stages.purchase.typical_conversion_rate"
            ]
        );
    }

    #[test]
    fn nan_default_variance_rejected() {
        let mut result = ValidationResult::new();
        let spec = VerticalBenchmarks {
            default_variance_percent: f64::NAN,
            ..Default::default()
        };
        validate_benchmarks(&spec, &mut result);
        assert!(!result.valid);
    }
}
