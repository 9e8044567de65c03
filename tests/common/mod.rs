use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn generate_cart_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record([
        "product_id",
        "variant_id",
        "size_label",
        "name",
        "unit_price",
        "quantity",
    ])?;

    for i in 1..=rows {
        wtr.write_record([
            &format!("product-{i}"),
            "",
            "",
            &format!("Product {i}"),
            "10.00",
            "1",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
