use crate::domain::cart::CartLine;
use crate::error::Result;
use std::io::Write;

/// Writes cart lines as CSV, with a derived `line_total` column.
pub struct CartWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CartWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_lines(&mut self, lines: &[CartLine]) -> Result<()> {
        self.writer.write_record([
            "product_id",
            "variant_id",
            "size_label",
            "name",
            "unit_price",
            "quantity",
            "line_total",
        ])?;
        for line in lines {
            self.writer.write_record([
                line.product_id.as_str(),
                line.variant_id.as_deref().unwrap_or(""),
                line.size_label.as_deref().unwrap_or(""),
                line.name.as_str(),
                &line.unit_price.to_string(),
                &line.quantity.to_string(),
                &line.line_total().to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::csv::cart_reader::CartLineReader;
    use rust_decimal_macros::dec;

    fn line() -> CartLine {
        CartLine {
            product_id: "mattress-orto".to_string(),
            variant_id: Some("140x200".to_string()),
            size_label: None,
            name: "Orto Premium".to_string(),
            unit_price: dec!(49895),
            quantity: 3,
            image_url: None,
        }
    }

    #[test]
    fn test_writer_emits_line_totals() {
        let mut out = Vec::new();
        CartWriter::new(&mut out).write_lines(&[line()]).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(
            "product_id,variant_id,size_label,name,unit_price,quantity,line_total"
        ));
        assert!(text.contains("mattress-orto,140x200,,Orto Premium,49895,3,149685"));
    }

    #[test]
    fn test_export_reimports() {
        let mut out = Vec::new();
        CartWriter::new(&mut out).write_lines(&[line()]).unwrap();

        let reader = CartLineReader::new(out.as_slice());
        let restored: Vec<CartLine> = reader.lines().map(|r| r.unwrap()).collect();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].product_id, line().product_id);
        assert_eq!(restored[0].quantity, 3);
    }
}
