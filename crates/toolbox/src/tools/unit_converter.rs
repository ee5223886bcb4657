//! Unit converters: one tool per measurement category.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Measurement category handled by a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCategory {
    Area,
    Length,
    Speed,
    Temperature,
    Volume,
    Weight,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 6] = [
        UnitCategory::Area,
        UnitCategory::Length,
        UnitCategory::Speed,
        UnitCategory::Temperature,
        UnitCategory::Volume,
        UnitCategory::Weight,
    ];

    fn function_name(&self) -> &'static str {
        match self {
            UnitCategory::Area => "convertArea",
            UnitCategory::Length => "convertLength",
            UnitCategory::Speed => "convertSpeed",
            UnitCategory::Temperature => "convertTemperature",
            UnitCategory::Volume => "convertVolume",
            UnitCategory::Weight => "convertWeight",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            UnitCategory::Area => {
                "Converts areas between square meters, square kilometers, square feet, \
                 square yards, square miles, acres and hectares."
            }
            UnitCategory::Length => {
                "Converts lengths between meters, kilometers, centimeters, millimeters, \
                 miles, yards, feet, inches and nautical miles."
            }
            UnitCategory::Speed => {
                "Converts speeds between m/s, km/h, mph, knots and ft/s."
            }
            UnitCategory::Temperature => {
                "Converts temperatures between celsius, fahrenheit and kelvin."
            }
            UnitCategory::Volume => {
                "Converts volumes between liters, milliliters, cubic meters, gallons, \
                 quarts, pints, cups and fluid ounces."
            }
            UnitCategory::Weight => {
                "Converts weights between kilograms, grams, milligrams, tonnes, pounds, \
                 ounces and stones."
            }
        }
    }

    fn demo(&self) -> (&'static str, &'static str, f64, f64) {
        match self {
            UnitCategory::Area => ("acres", "hectares", 1.0, 0.4),
            UnitCategory::Length => ("meters", "feet", 1.0, 3.28),
            UnitCategory::Speed => ("km/h", "mph", 100.0, 62.14),
            UnitCategory::Temperature => ("celsius", "fahrenheit", 100.0, 212.0),
            UnitCategory::Volume => ("liters", "gallons", 10.0, 2.64),
            UnitCategory::Weight => ("kilograms", "pounds", 1.0, 2.2),
        }
    }
}

/// Converter for a single category.
///
/// # Parameters
///
/// - `value` (required): The numeric value to convert (number or numeric string).
/// - `from` (required): The source unit (e.g., "km", "miles", "celsius").
/// - `to` (required): The target unit.
///
/// Unit names are case-insensitive and ignore spaces, underscores and dashes,
/// so "square feet", "square_feet" and "squareFeet" are the same unit.
///
/// # Examples
///
/// ```json
/// {"value": 1, "from": "meters", "to": "feet"}
/// {"value": 32, "from": "fahrenheit", "to": "celsius"}
/// ```
pub struct UnitConverter {
    category: UnitCategory,
}

impl UnitConverter {
    /// Create a converter for a category.
    pub fn new(category: UnitCategory) -> Self {
        Self { category }
    }

    /// One converter per category.
    pub fn all() -> Vec<Self> {
        UnitCategory::ALL.into_iter().map(Self::new).collect()
    }
}

/// Factor to multiply by to reach the category's base unit.
fn to_base(category: UnitCategory, unit: &str) -> Option<f64> {
    let unit = normalize_unit(unit);

    let factor = match category {
        // Base: square meters
        UnitCategory::Area => match unit.as_str() {
            "m2" | "sqm" | "squaremeter" | "squaremeters" => 1.0,
            "km2" | "sqkm" | "squarekilometer" | "squarekilometers" => 1_000_000.0,
            "ft2" | "sqft" | "squarefoot" | "squarefeet" => 0.09290304,
            "yd2" | "sqyd" | "squareyard" | "squareyards" => 0.83612736,
            "mi2" | "sqmi" | "squaremile" | "squaremiles" => 2_589_988.110336,
            "acre" | "acres" => 4046.8564224,
            "ha" | "hectare" | "hectares" => 10_000.0,
            _ => return None,
        },
        // Base: meters
        UnitCategory::Length => match unit.as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => 1.0,
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => 1000.0,
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => 0.01,
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => 0.001,
            "mi" | "mile" | "miles" => 1609.344,
            "yd" | "yard" | "yards" => 0.9144,
            "ft" | "foot" | "feet" => 0.3048,
            "in" | "inch" | "inches" => 0.0254,
            "nmi" | "nauticalmile" | "nauticalmiles" => 1852.0,
            _ => return None,
        },
        // Base: m/s
        UnitCategory::Speed => match unit.as_str() {
            "m/s" | "mps" | "meterspersecond" => 1.0,
            "km/h" | "kph" | "kmh" | "kilometersperhour" => 1000.0 / 3600.0,
            "mph" | "mi/h" | "milesperhour" => 0.44704,
            "knot" | "knots" | "kn" | "kt" => 1852.0 / 3600.0,
            "ft/s" | "fps" | "feetpersecond" => 0.3048,
            _ => return None,
        },
        // Not linear; only membership matters here.
        UnitCategory::Temperature => match unit.as_str() {
            "c" | "celsius" | "f" | "fahrenheit" | "k" | "kelvin" => 1.0,
            _ => return None,
        },
        // Base: liters
        UnitCategory::Volume => match unit.as_str() {
            "l" | "liter" | "liters" | "litre" | "litres" => 1.0,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => 0.001,
            "m3" | "cubicmeter" | "cubicmeters" => 1000.0,
            "gal" | "gallon" | "gallons" => 3.785411784,
            "qt" | "quart" | "quarts" => 0.946352946,
            "pt" | "pint" | "pints" => 0.473176473,
            "cup" | "cups" => 0.2365882365,
            "floz" | "fluidounce" | "fluidounces" => 0.0295735295625,
            _ => return None,
        },
        // Base: kilograms
        UnitCategory::Weight => match unit.as_str() {
            "kg" | "kilogram" | "kilograms" => 1.0,
            "g" | "gram" | "grams" => 0.001,
            "mg" | "milligram" | "milligrams" => 0.000001,
            "t" | "tonne" | "tonnes" | "metricton" | "metrictons" => 1000.0,
            "lb" | "lbs" | "pound" | "pounds" => 0.45359237,
            "oz" | "ounce" | "ounces" => 0.028349523125,
            "st" | "stone" | "stones" => 6.35029318,
            _ => return None,
        },
    };

    Some(factor)
}

fn normalize_unit(unit: &str) -> String {
    unit.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .collect()
}

/// Convert temperature values (not linear, goes through Celsius).
fn convert_temperature(value: f64, from: &str, to: &str) -> f64 {
    let celsius = match normalize_unit(from).as_str() {
        "f" | "fahrenheit" => (value - 32.0) * 5.0 / 9.0,
        "k" | "kelvin" => value - 273.15,
        _ => value,
    };

    match normalize_unit(to).as_str() {
        "f" | "fahrenheit" => celsius * 9.0 / 5.0 + 32.0,
        "k" | "kelvin" => celsius + 273.15,
        _ => celsius,
    }
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl UnitConverter {
    /// Convert `value` from one unit to another within this category.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, ToolError> {
        let unsupported = |name: &str, unit: &str| {
            ToolError::invalid(
                name,
                format!(
                    "Unsupported unit '{}'. {}",
                    unit,
                    self.category.description()
                ),
            )
        };

        let from_base = to_base(self.category, from).ok_or_else(|| unsupported("from", from))?;
        let to_base = to_base(self.category, to).ok_or_else(|| unsupported("to", to))?;

        let result = if self.category == UnitCategory::Temperature {
            convert_temperature(value, from, to)
        } else {
            value * from_base / to_base
        };

        Ok(round2(result))
    }
}

#[async_trait]
impl Tool for UnitConverter {
    fn name(&self) -> &str {
        self.category.function_name()
    }

    fn description(&self) -> &str {
        self.category.description()
    }

    fn required_params(&self) -> &[&str] {
        &["from", "to", "value"]
    }

    fn demo_body(&self) -> Value {
        let (from, to, value, _) = self.category.demo();
        json!({ "from": from, "to": to, "value": value })
    }

    fn demo_response(&self) -> Value {
        let (from, to, value, result) = self.category.demo();
        json!({ "status": true, "from": from, "to": to, "value": value, "result": result })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let value = args.get_number("value")?;
        let from = args.get_string("from")?;
        let to = args.get_string("to")?;

        debug!("Converting {} {} to {}", value, from, to);

        let result = self.convert(value, &from, &to)?;

        Ok(ToolOutput::success(json!({
            "status": true,
            "from": from,
            "to": to,
            "value": value,
            "result": result,
        })))
    }
}
