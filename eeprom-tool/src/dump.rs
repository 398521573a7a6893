use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::error::Error;
use crate::report::CellState;
use crate::EepromImage;

#[derive(Debug, Serialize)]
struct CellRow {
    cell: usize,
    raw: String,
    state: CellState,
}

/// Write the cell dump of `image` to a CSV file at `output_path`.
pub(crate) fn write_csv<P: AsRef<Path>>(image: &EepromImage, output_path: P) -> Result<(), Error> {
    let mut wtr = Writer::from_path(output_path)?;
    write_records(&mut wtr, image)
}

/// Write the cell dump of `image` to a `String`.
pub(crate) fn write_csv_content(image: &EepromImage) -> Result<String, Error> {
    let mut wtr = Writer::from_writer(Vec::new());
    write_records(&mut wtr, image)?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::IoError(e.into_error()))?;
    // only ASCII is ever written
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_records<W: std::io::Write>(wtr: &mut Writer<W>, image: &EepromImage) -> Result<(), Error> {
    let report = image.parse();

    for (cell, raw) in image.cells.iter().enumerate() {
        wtr.serialize(CellRow {
            cell,
            raw: format!("0x{raw:02X}"),
            state: report.state(cell),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
