use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

impl Default for IntRange {
    fn default() -> Self {
        Self { min: 0, max: 99_999 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
    pub precision: f64,
}

impl Default for FloatRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 99_999.0,
            precision: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdFormat {
    pub max: u64,
    pub separator: String,
}

impl Default for IdFormat {
    fn default() -> Self {
        Self {
            max: 9_999_999_999,
            separator: ":".to_string(),
        }
    }
}

/// Default generators for the built-in scalars, configured by `faker.types`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalarDefaults {
    pub int: IntRange,
    pub float: FloatRange,
    pub id: IdFormat,
}

impl ScalarDefaults {
    /// Value for a built-in scalar, `None` for any other type name
    pub fn generate<R: Rng>(&self, scalar: &str, owner: &str, rng: &mut R) -> Option<Value> {
        let value = match scalar {
            "Int" => {
                let IntRange { min, max } = self.int;
                Value::Number(rng.gen_range(min..=max.max(min)).into())
            }
            "Float" => self.float(rng),
            "String" => Value::String("string".to_string()),
            "Boolean" => Value::Bool(rng.gen_bool(0.5)),
            "ID" => {
                let n = rng.gen_range(0..=self.id.max);
                Value::String(STANDARD.encode(format!("{owner}{}{n}", self.id.separator)))
            }
            _ => return None,
        };
        Some(value)
    }

    fn float<R: Rng>(&self, rng: &mut R) -> Value {
        let FloatRange {
            min,
            max,
            precision,
        } = self.float;
        let raw = if max > min { rng.gen_range(min..=max) } else { min };
        let rounded = if precision > 0.0 {
            let steps = (raw / precision).round() * precision;
            // strip float noise such as 12.340000000000002
            (steps * 1e6).round() / 1e6
        } else {
            raw
        };
        Number::from_f64(rounded.clamp(min, max.max(min)))
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
