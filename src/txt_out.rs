use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ConvertError;
use crate::model::{OUTPUT_HEADER, OutputRecord};
use crate::options::{ConvertOptions, LineEnding};

fn writer_builder(options: &ConvertOptions) -> WriterBuilder {
    let terminator = match options.line_ending {
        LineEnding::Lf => Terminator::Any(b'\n'),
        LineEnding::CrLf => Terminator::CRLF,
    };

    let mut builder = WriterBuilder::new();
    builder
        .delimiter(options.delimiter)
        .quote_style(QuoteStyle::Never)
        .terminator(terminator);
    builder
}

fn write_all<W: Write>(
    writer: &mut csv::Writer<W>,
    records: &[OutputRecord],
) -> Result<(), ConvertError> {
    writer.write_record(OUTPUT_HEADER)?;
    for record in records {
        writer.write_record(record.fields())?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_records(
    path: &Path,
    records: &[OutputRecord],
    options: &ConvertOptions,
) -> Result<(), ConvertError> {
    let mut writer = writer_builder(options).from_path(path)?;
    write_all(&mut writer, records)
}

pub(crate) fn write_records_to_string(
    records: &[OutputRecord],
    options: &ConvertOptions,
) -> Result<String, ConvertError> {
    let mut writer = writer_builder(options).from_writer(Vec::<u8>::new());
    write_all(&mut writer, records)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ConvertError::Io(error.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|error| ConvertError::InvalidOption(format!("invalid utf-8 output: {error}")))
}
