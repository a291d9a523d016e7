//! Cell values held by a row

use std::borrow::Cow;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) of floats that convert losslessly to `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A single typed value within a row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Cell {
    #[serde(rename = "n")]
    Null,
    #[serde(rename = "b")]
    Bool(bool),
    #[serde(rename = "i")]
    Int(i64),
    #[serde(rename = "f", with = "float_repr")]
    Float(f64),
    #[serde(rename = "s")]
    String(Cow<'static, str>),
    #[serde(rename = "d")]
    Date(NaiveDate),
    #[serde(rename = "dt")]
    DateTime(NaiveDateTime),
}

/// Floats as JSON numbers, with non-finite values spelled `NaN`, `inf` and
/// `-inf` (the same text the XML codec writes).
mod float_repr {
    use std::fmt;

    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if *value > 0.0 {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }

    struct FloatVisitor;

    impl<'de> Visitor<'de> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or one of \"NaN\", \"inf\", \"-inf\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }
}

/// Returns the float as an `i64` when it holds an exact integer in range.
fn exact_int(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Float(a), Cell::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Cell::String(a), Cell::String(b)) => a == b,
            (Cell::Date(a), Cell::Date(b)) => a == b,
            (Cell::DateTime(a), Cell::DateTime(b)) => a == b,
            // Cross-type numeric comparison, exact only
            (Cell::Int(a), Cell::Float(b)) | (Cell::Float(b), Cell::Int(a)) => {
                exact_int(*b) == Some(*a)
            }
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Integral floats hash like the equal Int so that Hash agrees with Eq.
        match self {
            Cell::Null => 0u8.hash(state),
            Cell::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Cell::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Cell::Float(f) => match exact_int(*f) {
                Some(i) => {
                    2u8.hash(state);
                    i.hash(state);
                }
                None if f.is_nan() => 3u8.hash(state),
                None => {
                    3u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            Cell::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            Cell::Date(d) => {
                5u8.hash(state);
                d.hash(state);
            }
            Cell::DateTime(dt) => {
                6u8.hash(state);
                dt.hash(state);
            }
        }
    }
}

impl Cell {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Short tag naming the value type, as used on the wire
    pub fn type_tag(&self) -> &'static str {
        match self {
            Cell::Null => "n",
            Cell::Bool(_) => "b",
            Cell::Int(_) => "i",
            Cell::Float(_) => "f",
            Cell::String(_) => "s",
            Cell::Date(_) => "d",
            Cell::DateTime(_) => "dt",
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            Cell::Null => Cow::Borrowed("NULL"),
            Cell::Bool(b) => Cow::Owned(b.to_string()),
            Cell::Int(i) => Cow::Owned(i.to_string()),
            Cell::Float(f) => Cow::Owned(f.to_string()),
            Cell::String(s) => Cow::Borrowed(s.as_ref()),
            Cell::Date(d) => Cow::Owned(d.to_string()),
            Cell::DateTime(dt) => Cow::Owned(dt.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Cell::Null => 0,
            Cell::Int(_) | Cell::Float(_) => 1,
            Cell::Bool(_) => 2,
            Cell::String(_) => 3,
            Cell::Date(_) => 4,
            Cell::DateTime(_) => 5,
        }
    }

    /// Total order used for sorting rows.
    ///
    /// Nulls sort first, then numbers (ints and floats compared by value,
    /// NaN after every other number), then bools, strings, dates and
    /// datetimes.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cell::Int(a), Cell::Int(b)) => a.cmp(b),
            (Cell::Float(a), Cell::Float(b)) => compare_floats(*a, *b),
            (Cell::Int(a), Cell::Float(b)) => compare_int_float(*a, *b),
            (Cell::Float(a), Cell::Int(b)) => compare_int_float(*b, *a).reverse(),
            (Cell::Bool(a), Cell::Bool(b)) => a.cmp(b),
            (Cell::String(a), Cell::String(b)) => a.cmp(b),
            (Cell::Date(a), Cell::Date(b)) => a.cmp(b),
            (Cell::DateTime(a), Cell::DateTime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn compare_int_float(a: i64, b: f64) -> Ordering {
    if b.is_nan() {
        return Ordering::Less;
    }
    match exact_int(b) {
        Some(b) => a.cmp(&b),
        // Every i64 lies in [-2^63, 2^63).
        None if b >= I64_BOUND => Ordering::Less,
        None if b < -I64_BOUND => Ordering::Greater,
        // Non-integral, so |b| < 2^52 and never equal to an integer.
        None => (a as f64).partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::String(Cow::Owned(s))
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<i32> for Cell {
    fn from(i: i32) -> Self {
        Cell::Int(i64::from(i))
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl From<NaiveDate> for Cell {
    fn from(d: NaiveDate) -> Self {
        Cell::Date(d)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(dt: NaiveDateTime) -> Self {
        Cell::DateTime(dt)
    }
}

impl<T> From<Option<T>> for Cell
where
    T: Into<Cell>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Cell::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(cell: &Cell) -> u64 {
        let mut hasher = DefaultHasher::new();
        cell.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_exact_equality() {
        assert_eq!(Cell::from("a"), Cell::from("a".to_string()));
        assert_ne!(Cell::from("a"), Cell::from("b"));
        assert_eq!(Cell::Float(f64::NAN), Cell::Float(f64::NAN));
        assert_ne!(Cell::Null, Cell::from(""));
    }

    #[test]
    fn test_int_float_equality_hashes_alike() {
        assert_eq!(Cell::Int(3), Cell::Float(3.0));
        assert_eq!(hash_of(&Cell::Int(3)), hash_of(&Cell::Float(3.0)));
        assert_ne!(Cell::Int(3), Cell::Float(3.5));
        assert_eq!(hash_of(&Cell::Float(0.0)), hash_of(&Cell::Float(-0.0)));
    }

    #[test]
    fn test_compare_orders_by_rank_then_value() {
        assert_eq!(Cell::Null.compare(&Cell::Int(-5)), Ordering::Less);
        assert_eq!(Cell::Int(2).compare(&Cell::Float(1.5)), Ordering::Greater);
        assert_eq!(Cell::Float(f64::NAN).compare(&Cell::Int(i64::MAX)), Ordering::Greater);
        assert_eq!(Cell::from("b").compare(&Cell::from("a")), Ordering::Greater);
        assert_eq!(Cell::Int(100).compare(&Cell::from("1")), Ordering::Less);
    }

    #[test]
    fn test_compare_at_i64_boundary() {
        let top = Cell::Float(I64_BOUND);
        assert_eq!(Cell::Int(i64::MAX).compare(&top), Ordering::Less);
        assert_eq!(Cell::Int(i64::MAX - 1).compare(&top), Ordering::Less);
        assert_eq!(top.compare(&Cell::Int(i64::MAX)), Ordering::Greater);
        assert_eq!(Cell::Int(i64::MIN).compare(&Cell::Float(-I64_BOUND)), Ordering::Equal);
        assert_eq!(
            Cell::Int(i64::MIN).compare(&Cell::Float(f64::NEG_INFINITY)),
            Ordering::Greater
        );
        assert_eq!(Cell::Int(i64::MAX).compare(&Cell::Float(f64::INFINITY)), Ordering::Less);
    }

    #[test]
    fn test_compare_equal_iff_eq() {
        let cells = [
            Cell::Int(i64::MAX),
            Cell::Int(i64::MAX - 1),
            Cell::Int(i64::MIN),
            Cell::Int(0),
            Cell::Int(3),
            Cell::Float(I64_BOUND),
            Cell::Float(-I64_BOUND),
            Cell::Float(0.0),
            Cell::Float(-0.0),
            Cell::Float(3.0),
            Cell::Float(2.5),
            Cell::Float(f64::INFINITY),
            Cell::Float(f64::NEG_INFINITY),
            Cell::Float(f64::NAN),
            Cell::Null,
            Cell::from("3"),
        ];
        for a in &cells {
            for b in &cells {
                assert_eq!(
                    a.compare(b) == Ordering::Equal,
                    a == b,
                    "compare/eq disagree for {:?} and {:?}",
                    a,
                    b
                );
                assert_eq!(a.compare(b), b.compare(a).reverse());
                for c in &cells {
                    if a.compare(b) != Ordering::Greater && b.compare(c) != Ordering::Greater {
                        assert_ne!(a.compare(c), Ordering::Greater, "{:?} {:?} {:?}", a, b, c);
                    }
                }
            }
        }
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Cell::from(None::<i64>), Cell::Null);
        assert_eq!(Cell::from(Some(7i64)), Cell::Int(7));
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(Cell::Null.type_tag(), "n");
        assert_eq!(Cell::from(1.5).type_tag(), "f");
        let date = NaiveDate::from_ymd_opt(2014, 3, 1).unwrap();
        assert_eq!(Cell::from(date).type_tag(), "d");
    }
}
