use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::error::ConvertError;
use crate::model::SheetData;

fn write_records<W: Write>(writer: &mut Writer<W>, sheet: &SheetData) -> Result<(), ConvertError> {
    writer.write_record(&sheet.header)?;
    for row in &sheet.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv(path: &Path, sheet: &SheetData, delimiter: u8) -> Result<(), ConvertError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    write_records(&mut writer, sheet)
}

pub(crate) fn write_csv_to_string(
    sheet: &SheetData,
    delimiter: u8,
) -> Result<String, ConvertError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    write_records(&mut writer, sheet)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ConvertError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| ConvertError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}
