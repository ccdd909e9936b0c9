//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy: any `Error` makes the request invalid; warnings and info notes
//! travel with the quote.
//!
//! Product engines never fail on odd input (a zero width simply prices to
//! zero or NaN), so this is the only place requests are rejected.

use serde::{Deserialize, Serialize};

use crate::products::acrylic::{AcrylicColor, AcrylicInput};
use crate::products::{Product, QuoteRequest};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    /// Request field the violation is about, e.g. `panels[1].width`.
    pub field: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

impl ValidationViolation {
    fn error(rule: &str, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            severity: ViolationSeverity::Error,
            field: field.into(),
            message: message.into(),
            expected: None,
            actual: None,
            remediation: vec![],
        }
    }

    fn expected(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    fn remedy(mut self, step: &str) -> Self {
        self.remediation.push(step.to_string());
        self
    }

    fn with_severity(mut self, severity: ViolationSeverity) -> Self {
        self.severity = severity;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub product: Product,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    /// `rule: message` for each error, joined for an error string.
    pub fn error_summary(&self) -> String {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .map(|v| format!("{} ({}): {}", v.rule, v.field, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, request: &QuoteRequest) -> Vec<ValidationViolation>;
}

/// Every printed piece in the request as `(field prefix, width, height)`.
/// Yard signs have a fixed size and contribute nothing.
fn pieces(request: &QuoteRequest) -> Vec<(String, f64, f64)> {
    let single = |w: f64, h: f64| vec![(String::new(), w, h)];
    match request {
        QuoteRequest::Acm(i) => single(i.width, i.height),
        QuoteRequest::Acrylic(i) => single(i.width, i.height),
        QuoteRequest::Banner(i) => single(i.width, i.height),
        QuoteRequest::Coroplast(i) => single(i.width, i.height),
        QuoteRequest::CutVinyl(i) => single(i.width, i.height),
        QuoteRequest::Decal(i) => single(i.width, i.height),
        QuoteRequest::Foam(i) => single(i.width, i.height),
        QuoteRequest::Pvc(i) => single(i.width, i.height),
        QuoteRequest::Wrap(i) => i
            .panels
            .iter()
            .enumerate()
            .map(|(n, p)| (format!("panels[{}].", n), p.width, p.height))
            .collect(),
        QuoteRequest::Wall(i) => i
            .panels
            .iter()
            .enumerate()
            .map(|(n, p)| (format!("panels[{}].", n), p.width, p.height))
            .collect(),
        QuoteRequest::Yard(_) => vec![],
    }
}

// --- Concrete Rules ---

pub struct PositiveDimensionsRule;

impl ValidationRule for PositiveDimensionsRule {
    fn name(&self) -> &'static str { "positive_dimensions" }

    fn validate(&self, request: &QuoteRequest) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        for (prefix, width, height) in pieces(request) {
            for (axis, value) in [("width", width), ("height", height)] {
                if !(value.is_finite() && value > 0.0) {
                    violations.push(
                        ValidationViolation::error(self.name(), format!("{}{}", prefix, axis), "Dimension must be positive")
                            .expected("> 0 inches", value.to_string())
                            .remedy("Enter the finished size in inches"),
                    );
                }
            }
        }
        violations
    }
}

pub struct QuantityRule;

impl ValidationRule for QuantityRule {
    fn name(&self) -> &'static str { "quantity" }

    fn validate(&self, request: &QuoteRequest) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        if request.qty() == 0 {
            violations.push(
                ValidationViolation::error(self.name(), "qty", "Quantity must be at least 1")
                    .expected(">= 1", "0"),
            );
        }
        if let QuoteRequest::Wrap(input) = request {
            for (n, panel) in input.panels.iter().enumerate() {
                if panel.qty == 0 {
                    violations.push(
                        ValidationViolation::error(self.name(), format!("panels[{}].qty", n), "Panel line quantity must be at least 1")
                            .expected(">= 1", "0")
                            .remedy("Remove the panel instead of zeroing it"),
                    );
                }
            }
        }
        violations
    }
}

pub struct FileCountRule;

impl ValidationRule for FileCountRule {
    fn name(&self) -> &'static str { "file_count" }

    fn validate(&self, request: &QuoteRequest) -> Vec<ValidationViolation> {
        match request.job() {
            Some(job) if job.files == 0 => vec![
                ValidationViolation::error(self.name(), "files", "At least one artwork file is required")
                    .expected(">= 1", "0"),
            ],
            _ => vec![],
        }
    }
}

pub struct PanelListRule;

impl ValidationRule for PanelListRule {
    fn name(&self) -> &'static str { "panel_list" }

    fn validate(&self, request: &QuoteRequest) -> Vec<ValidationViolation> {
        let empty = match request {
            QuoteRequest::Wrap(i) => i.panels.is_empty(),
            QuoteRequest::Wall(i) => i.panels.is_empty(),
            _ => false,
        };
        if empty {
            vec![ValidationViolation::error(self.name(), "panels", "No panels to print")
                .remedy("Add at least one panel with its width and height")]
        } else {
            vec![]
        }
    }
}

pub struct StandoffRule;

impl ValidationRule for StandoffRule {
    fn name(&self) -> &'static str { "standoffs" }

    fn validate(&self, request: &QuoteRequest) -> Vec<ValidationViolation> {
        match request {
            QuoteRequest::Acrylic(AcrylicInput { standoffs: true, standoff_count: 0, .. }) => vec![
                ValidationViolation::error(self.name(), "standoff_count", "Standoffs requested with a count of zero")
                    .expected(">= 1 per panel", "0")
                    .remedy("Use 4 standoffs for a typical wall panel"),
            ],
            _ => vec![],
        }
    }
}

/// Black acrylic is stocked in 1/4" only; thicker panels quote as white.
pub struct AcrylicColorRule;

impl ValidationRule for AcrylicColorRule {
    fn name(&self) -> &'static str { "acrylic_color" }

    fn validate(&self, request: &QuoteRequest) -> Vec<ValidationViolation> {
        match request {
            QuoteRequest::Acrylic(input)
                if input.color == AcrylicColor::Black && input.effective_color() != AcrylicColor::Black =>
            {
                vec![ValidationViolation::error(self.name(), "color", "Black is not stocked at this thickness, quoting white")
                    .with_severity(ViolationSeverity::Info)]
            }
            _ => vec![],
        }
    }
}

/// Banners wider than the in-house printer are outsourced.
pub struct BannerWidthRule;

/// Widest banner short edge printed in-house, inches.
const BANNER_INHOUSE_WIDTH_IN: f64 = 62.0;

impl ValidationRule for BannerWidthRule {
    fn name(&self) -> &'static str { "banner_width" }

    fn validate(&self, request: &QuoteRequest) -> Vec<ValidationViolation> {
        match request {
            QuoteRequest::Banner(input) if input.width.min(input.height) > BANNER_INHOUSE_WIDTH_IN => {
                vec![ValidationViolation::error(self.name(), "width", "Banner exceeds in-house print width")
                    .with_severity(ViolationSeverity::Warning)
                    .expected(format!("<= {} in short edge", BANNER_INHOUSE_WIDTH_IN), input.width.min(input.height).to_string())
                    .remedy("Confirm outsourced production pricing")]
            }
            _ => vec![],
        }
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(PositiveDimensionsRule),
                Box::new(QuantityRule),
                Box::new(FileCountRule),
                Box::new(PanelListRule),
                Box::new(StandoffRule),
                Box::new(AcrylicColorRule),
                Box::new(BannerWidthRule),
            ],
        }
    }

    pub fn validate(&self, request: &QuoteRequest) -> ValidationResult {
        let violations: Vec<_> = self.rules.iter().flat_map(|rule| rule.validate(request)).collect();
        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        ValidationResult { valid, violations, product: request.product() }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> QuoteRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_clean_request_is_valid() {
        let result = Validator::new().validate(&request(r#"{"product": "coroplast", "width": 24, "height": 18, "qty": 10}"#));
        assert!(result.valid);
        assert!(result.violations.is_empty());
        assert_eq!(result.product, Product::Coroplast);
    }

    #[test]
    fn test_zero_dimension_and_quantity() {
        let result = Validator::new().validate(&request(r#"{"product": "decal", "width": 0, "height": 12, "qty": 0}"#));
        assert!(!result.valid);
        let rules: Vec<_> = result.violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(rules, vec!["positive_dimensions", "quantity"]);
        assert_eq!(result.violations[0].field, "width");
    }

    #[test]
    fn test_panel_fields_are_indexed() {
        let result = Validator::new().validate(&request(
            r#"{"product": "wrap", "qty": 1, "panels": [{"w": 120, "h": 60}, {"w": 120, "h": -1, "qty": 0}]}"#,
        ));
        let fields: Vec<_> = result.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["panels[1].height", "panels[1].qty"]);
    }

    #[test]
    fn test_empty_panel_list() {
        let result = Validator::new().validate(&request(r#"{"product": "wall", "qty": 1, "panels": []}"#));
        assert!(!result.valid);
        assert_eq!(result.violations[0].rule, "panel_list");
    }

    #[test]
    fn test_files_and_standoffs() {
        let result = Validator::new().validate(&request(
            r#"{"product": "acrylic", "width": 24, "height": 18, "qty": 1, "files": 0, "standoffs": true, "standoff_count": 0}"#,
        ));
        assert!(result.error_summary().contains("file_count (files)"));
        assert!(result.error_summary().contains("standoffs (standoff_count)"));
    }

    #[test]
    fn test_notes_do_not_block() {
        let result = Validator::new().validate(&request(
            r#"{"product": "acrylic", "width": 24, "height": 18, "qty": 1, "thickness": "1/2", "color": "Black"}"#,
        ));
        assert!(result.valid);
        assert_eq!(result.violations[0].severity, ViolationSeverity::Info);

        let result = Validator::new().validate(&request(r#"{"product": "banner", "width": 96, "height": 72, "qty": 1}"#));
        assert!(result.valid);
        assert_eq!(result.violations[0].severity, ViolationSeverity::Warning);
    }
}
