use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One candidate line produced by document extraction. Ordering is
/// significant and preserved through classification and assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    pub index: usize,
    pub text: String,
}

impl RawLine {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Label assigned to a candidate line by the classifier. The assembler may
/// override a label based on surrounding context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineLabel {
    Title,
    Header,
    Ingredient,
    Step,
    Note,
    Junk,
}

/// A label plus a confidence score. Confidence is only meaningful when a
/// statistical hint produced the label; the deterministic rules always
/// report 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineClassification {
    pub label: LineLabel,
    pub confidence: f32,
}

impl LineClassification {
    pub fn certain(label: LineLabel) -> Self {
        Self {
            label,
            confidence: 1.0,
        }
    }
}

/// Canonical measurement units. Every recognized spelling or abbreviation
/// normalizes onto one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitKind {
    Teaspoon,
    Tablespoon,
    Cup,
    Ounce,
    Pound,
    Gram,
    Kilogram,
    Milliliter,
    Liter,
    Pint,
    Quart,
    Gallon,
    FluidOunce,
    Pinch,
    Dash,
    Piece,
    Clove,
    Bunch,
    Can,
    Package,
    Whole,
}

impl UnitKind {
    /// Canonical singular display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            UnitKind::Teaspoon => "tsp",
            UnitKind::Tablespoon => "tbsp",
            UnitKind::Cup => "cup",
            UnitKind::Ounce => "oz",
            UnitKind::Pound => "lb",
            UnitKind::Gram => "g",
            UnitKind::Kilogram => "kg",
            UnitKind::Milliliter => "ml",
            UnitKind::Liter => "l",
            UnitKind::Pint => "pint",
            UnitKind::Quart => "quart",
            UnitKind::Gallon => "gallon",
            UnitKind::FluidOunce => "fl oz",
            UnitKind::Pinch => "pinch",
            UnitKind::Dash => "dash",
            UnitKind::Piece => "piece",
            UnitKind::Clove => "clove",
            UnitKind::Bunch => "bunch",
            UnitKind::Can => "can",
            UnitKind::Package => "package",
            UnitKind::Whole => "",
        }
    }

    /// Plural display name.
    pub fn plural_name(&self) -> &'static str {
        match self {
            UnitKind::Teaspoon => "tsp",
            UnitKind::Tablespoon => "tbsp",
            UnitKind::Cup => "cups",
            UnitKind::Ounce => "oz",
            UnitKind::Pound => "lbs",
            UnitKind::Gram => "g",
            UnitKind::Kilogram => "kg",
            UnitKind::Milliliter => "ml",
            UnitKind::Liter => "l",
            UnitKind::Pint => "pints",
            UnitKind::Quart => "quarts",
            UnitKind::Gallon => "gallons",
            UnitKind::FluidOunce => "fl oz",
            UnitKind::Pinch => "pinches",
            UnitKind::Dash => "dashes",
            UnitKind::Piece => "pieces",
            UnitKind::Clove => "cloves",
            UnitKind::Bunch => "bunches",
            UnitKind::Can => "cans",
            UnitKind::Package => "packages",
            UnitKind::Whole => "",
        }
    }

    /// Whether this unit measures volume.
    pub fn is_volume(&self) -> bool {
        matches!(
            self,
            UnitKind::Teaspoon
                | UnitKind::Tablespoon
                | UnitKind::Cup
                | UnitKind::Milliliter
                | UnitKind::Liter
                | UnitKind::Pint
                | UnitKind::Quart
                | UnitKind::Gallon
                | UnitKind::FluidOunce
        )
    }

    /// Whether this unit measures weight.
    pub fn is_weight(&self) -> bool {
        matches!(
            self,
            UnitKind::Ounce | UnitKind::Pound | UnitKind::Gram | UnitKind::Kilogram
        )
    }
}

/// A parsed amount. `upper_value`, when present, makes this a range whose
/// midpoint is `(value + upper_value) / 2`; the invariant
/// `upper_value >= value` holds for every constructed range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quantity {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_value: Option<f64>,
    pub unit: UnitKind,
}

impl Quantity {
    pub fn exact(value: f64, unit: UnitKind) -> Self {
        Self {
            value,
            upper_value: None,
            unit,
        }
    }

    pub fn range(low: f64, high: f64, unit: UnitKind) -> Self {
        let (low, high) = if high >= low { (low, high) } else { (high, low) };
        Self {
            value: low,
            upper_value: Some(high),
            unit,
        }
    }

    pub fn is_range(&self) -> bool {
        self.upper_value.is_some()
    }

    /// Midpoint for display and arithmetic; equals `value` for exact amounts.
    pub fn midpoint(&self) -> f64 {
        match self.upper_value {
            Some(upper) => (self.value + upper) / 2.0,
            None => self.value,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn fmt_value(v: f64) -> String {
            if v.fract() == 0.0 {
                format!("{}", v as i64)
            } else {
                format!("{}", v)
            }
        }
        match self.upper_value {
            Some(upper) => write!(f, "{}-{}", fmt_value(self.value), fmt_value(upper))?,
            None => write!(f, "{}", fmt_value(self.value))?,
        }
        let name = if self.midpoint() > 1.0 {
            self.unit.plural_name()
        } else {
            self.unit.display_name()
        };
        if !name.is_empty() {
            write!(f, " {}", name)?;
        }
        Ok(())
    }
}

/// A single ingredient entry. `name` is never empty after sanitation;
/// `section` is `None` for the implicit default group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_quantities: Vec<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity: None,
            additional_quantities: Vec::new(),
            note: None,
            section: None,
        }
    }
}

/// One cooking step. `index` values are dense and 0-based, matching the
/// final array position after all merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookStep {
    pub id: Uuid,
    pub index: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timers: Vec<TimerSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl CookStep {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            index,
            text: text.into(),
            timers: Vec::new(),
            media_url: None,
            section: None,
        }
    }
}

/// A duration reference found inside step text, with a semantic label
/// drawn from a closed vocabulary ("Cook" when nothing better applies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSpec {
    pub seconds: u32,
    pub label: String,
}

impl TimerSpec {
    pub fn new(seconds: u32, label: impl Into<String>) -> Self {
        Self {
            seconds,
            label: label.into(),
        }
    }

    pub fn from_minutes(minutes: u32, label: impl Into<String>) -> Self {
        Self::new(minutes * 60, label)
    }

    pub fn from_hours(hours: u32, label: impl Into<String>) -> Self {
        Self::new(hours * 3600, label)
    }
}

/// A grouping view over ingredients or steps by section name, preserving
/// first-seen order. The default group keeps `name: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionItems {
    pub name: Option<String>,
    pub items: Vec<String>,
}

/// The fully assembled recipe. Built once per parse call and never mutated
/// in place afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledRecipe {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
    pub yields: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_minutes: Option<u32>,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<CookStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub note_lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub ingredient_sections: Vec<SectionItems>,
    pub step_sections: Vec<SectionItems>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_midpoint() {
        let exact = Quantity::exact(1.5, UnitKind::Cup);
        assert_eq!(exact.midpoint(), 1.5);
        assert!(!exact.is_range());

        let range = Quantity::range(2.0, 3.0, UnitKind::Tablespoon);
        assert_eq!(range.midpoint(), 2.5);
        assert!(range.is_range());
    }

    #[test]
    fn test_range_normalizes_order() {
        let range = Quantity::range(3.0, 2.0, UnitKind::Cup);
        assert_eq!(range.value, 2.0);
        assert_eq!(range.upper_value, Some(3.0));
    }

    #[test]
    fn test_quantity_display() {
        assert_eq!(Quantity::exact(2.0, UnitKind::Cup).to_string(), "2 cups");
        assert_eq!(
            Quantity::exact(0.5, UnitKind::Teaspoon).to_string(),
            "0.5 tsp"
        );
        assert_eq!(
            Quantity::range(2.0, 3.0, UnitKind::Tablespoon).to_string(),
            "2-3 tbsp"
        );
        assert_eq!(Quantity::exact(2.0, UnitKind::Whole).to_string(), "2");
    }

    #[test]
    fn test_timer_constructors() {
        assert_eq!(TimerSpec::from_minutes(5, "Cook").seconds, 300);
        assert_eq!(TimerSpec::from_hours(2, "Bake").seconds, 7200);
    }

    #[test]
    fn test_unit_classes() {
        assert!(UnitKind::Cup.is_volume());
        assert!(!UnitKind::Cup.is_weight());
        assert!(UnitKind::Pound.is_weight());
        assert!(!UnitKind::Clove.is_volume());
    }
}
