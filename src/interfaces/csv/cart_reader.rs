use crate::domain::cart::CartLine;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// Reads cart lines from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<CartLine>`.
/// Whitespace is trimmed and extra columns (such as the `line_total`
/// emitted by the writer) are ignored, so exported carts re-import as is.
pub struct CartLineReader<R: Read> {
    reader: csv::Reader<R>,
}

/// CSV row shape. Prices are parsed from the raw field text so the scale
/// written by the exporter (`120.50`, not `120.5`) survives re-import.
#[derive(Deserialize)]
struct CartLineRecord {
    product_id: String,
    #[serde(default)]
    variant_id: Option<String>,
    #[serde(default)]
    size_label: Option<String>,
    name: String,
    #[serde(deserialize_with = "decimal_from_field")]
    unit_price: Decimal,
    quantity: u32,
    #[serde(default)]
    image_url: Option<String>,
}

fn decimal_from_field<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Decimal::from_str_exact(raw.trim()).map_err(serde::de::Error::custom)
}

impl From<CartLineRecord> for CartLine {
    fn from(record: CartLineRecord) -> Self {
        CartLine {
            product_id: record.product_id,
            variant_id: record.variant_id,
            size_label: record.size_label,
            name: record.name,
            unit_price: record.unit_price,
            quantity: record.quantity,
            image_url: record.image_url,
        }
    }
}

impl<R: Read> CartLineReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes lines.
    pub fn lines(self) -> impl Iterator<Item = Result<CartLine>> {
        self.reader
            .into_deserialize::<CartLineRecord>()
            .map(|result| result.map(CartLine::from).map_err(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "product_id,variant_id,size_label,name,unit_price,quantity\n\
                    mattress-orto,140x200,,Orto Premium,49895,1\n\
                    pillow-soft,,,Soft Pillow,120.50,2";
        let reader = CartLineReader::new(data.as_bytes());
        let results: Vec<Result<CartLine>> = reader.lines().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.product_id, "mattress-orto");
        assert_eq!(first.variant_id.as_deref(), Some("140x200"));
        assert_eq!(first.unit_price, dec!(49895));

        let second = results[1].as_ref().unwrap();
        assert!(second.variant_id.is_none());
        assert_eq!(second.quantity, 2);
    }

    #[test]
    fn test_reader_preserves_price_scale() {
        let data = "product_id,variant_id,size_label,name,unit_price,quantity,line_total\n\
                    pillow-cloud,,,Cloud Pillow,120.50,1,120.50\n\
                    product-1,,,Product 1,10.00,1,10.00";
        let reader = CartLineReader::new(data.as_bytes());
        let lines: Vec<CartLine> = reader.lines().map(|l| l.unwrap()).collect();

        // Trailing zeros are significant for money display.
        assert_eq!(lines[0].unit_price.to_string(), "120.50");
        assert_eq!(lines[1].unit_price.to_string(), "10.00");
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "product_id,variant_id,size_label,name,unit_price,quantity\n\
                    mattress-orto,,,Orto Premium,not-a-price,1";
        let reader = CartLineReader::new(data.as_bytes());
        let results: Vec<Result<CartLine>> = reader.lines().collect();

        assert!(results[0].is_err());
    }
}
