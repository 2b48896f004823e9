use crate::foundation::error::{ImfError, ImfResult};

pub use uuid::Uuid;

/// Rational edit rate (frames or samples per second).
///
/// Equality is structural: `24/1` and `48/2` are different edit rates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditRate {
    num: u64,
    den: u64, // must be > 0
}

impl EditRate {
    /// Build an edit rate, rejecting zero numerator or denominator.
    pub fn new(num: u64, den: u64) -> ImfResult<Self> {
        if den == 0 {
            return Err(ImfError::validation("EditRate denominator must be > 0"));
        }
        if num == 0 {
            return Err(ImfError::validation("EditRate numerator must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Build an edit rate from a `[numerator, denominator]` list.
    pub fn from_slice(values: &[u64]) -> ImfResult<Self> {
        match values {
            [num, den] => Self::new(*num, *den),
            _ => Err(ImfError::validation(format!(
                "EditRate expects exactly 2 values, got {}",
                values.len()
            ))),
        }
    }

    /// Parse the CPL text form, e.g. `"24000 1001"`.
    pub fn parse(text: &str) -> ImfResult<Self> {
        let values = text
            .split_whitespace()
            .map(|part| {
                part.parse::<u64>().map_err(|e| {
                    ImfError::validation(format!("EditRate value '{part}' is not an integer: {e}"))
                })
            })
            .collect::<ImfResult<Vec<_>>>()?;
        Self::from_slice(&values)
    }

    pub fn numerator(self) -> u64 {
        self.num
    }

    pub fn denominator(self) -> u64 {
        self.den
    }

    pub fn as_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Convert a duration counted in `self` units into `target` units, rounding half up.
    pub fn convert_duration(self, units: u64, target: EditRate) -> u64 {
        let num = u128::from(units) * u128::from(target.num) * u128::from(self.den);
        let den = u128::from(target.den) * u128::from(self.num);
        let rounded = (2 * num + den) / (2 * den);
        u64::try_from(rounded).unwrap_or(u64::MAX)
    }
}

impl std::fmt::Display for EditRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.num, self.den)
    }
}

impl serde::Serialize for EditRate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        [self.num, self.den].serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for EditRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr(Vec<u64>),
            Text(String),
        }

        let parsed = match Repr::deserialize(deserializer)? {
            Repr::Arr(values) => EditRate::from_slice(&values),
            Repr::Text(text) => EditRate::parse(&text),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

/// Parse a `urn:uuid:` string (the prefix is optional).
pub fn parse_urn_uuid(text: &str) -> ImfResult<Uuid> {
    let trimmed = text.trim();
    let raw = trimmed
        .strip_prefix("urn:uuid:")
        .or_else(|| trimmed.strip_prefix("URN:UUID:"))
        .unwrap_or(trimmed);
    Uuid::parse_str(raw).map_err(|e| ImfError::validation(format!("invalid UUID '{text}': {e}")))
}

/// Render a UUID in the `urn:uuid:` form used throughout IMF documents.
pub fn urn_uuid(id: Uuid) -> String {
    format!("urn:uuid:{}", id.hyphenated())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
