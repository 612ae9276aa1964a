//! Product records.

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use std::fmt;

/// A product offered by the store.
///
/// Decoding is lenient. Keys match case-insensitively and the last
/// occurrence of a key wins. Missing fields, `null` field values and a
/// `null` document all leave fields at their zero value. Unknown keys are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Product {
    /// Display name.
    pub name: String,
    /// Unit price.
    #[serde(serialize_with = "serialize_price")]
    pub price: f64,
}

impl Product {
    /// Creates a new product.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// Applies the set fields of `patch` to this product.
    ///
    /// A field counts as set when it differs from its zero value, so a patch
    /// can never clear a name or set a price to zero.
    pub fn merge(&mut self, patch: Product) {
        if !patch.name.is_empty() {
            self.name = patch.name;
        }
        if patch.price != 0.0 {
            self.price = patch.price;
        }
    }
}

impl<'de> Deserialize<'de> for Product {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_option(ProductVisitor)
    }
}

struct ProductVisitor;

impl<'de> Visitor<'de> for ProductVisitor {
    type Value = Product;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a product object")
    }

    fn visit_none<E: de::Error>(self) -> Result<Product, E> {
        Ok(Product::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Product, E> {
        Ok(Product::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Product, D::Error> {
        deserializer.deserialize_map(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Product, A::Error> {
        let mut product = Product::default();

        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("name") {
                if let Some(name) = map.next_value::<Option<String>>()? {
                    product.name = name;
                }
            } else if key.eq_ignore_ascii_case("price") {
                if let Some(price) = map.next_value::<Option<f64>>()? {
                    product.price = price;
                }
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        Ok(product)
    }
}

/// Formats a price the way Go's `encoding/json` does: shortest round-trip
/// digits, plain notation for magnitudes in `[1e-6, 1e21)` and zero,
/// exponent notation (`1e+21`, `1e-7`) otherwise.
fn format_price(price: f64) -> String {
    let abs = price.abs();
    if abs == 0.0 || (1e-6..1e21).contains(&abs) {
        return format!("{price}");
    }

    let formatted = format!("{price:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if exponent.starts_with('-') => {
            format!("{mantissa}e{exponent}")
        }
        Some((mantissa, exponent)) => format!("{mantissa}e+{exponent:0>2}"),
        None => formatted,
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_price<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !price.is_finite() {
        return serializer.serialize_f64(*price);
    }
    let raw = RawValue::from_string(format_price(*price)).map_err(S::Error::custom)?;
    raw.serialize(serializer)
}
