//! Apache Parquet format.

use arrow::array::{Array, ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Days, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::sync::Arc;
use xetl_types::{Frame, Value};

use crate::{Codec, FormatError, OutputFormat};

/// Parquet codec.
#[derive(Debug, Clone)]
pub struct ParquetCodec {
    /// Row group size (number of rows per group).
    row_group_size: usize,
    /// Compression codec.
    compression: Compression,
}

impl Default for ParquetCodec {
    fn default() -> Self {
        Self {
            row_group_size: 100_000,
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetCodec {
    /// Creates a new Parquet codec with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the Arrow type of a column from its non-null values.
    fn column_type(frame: &Frame, idx: usize) -> DataType {
        let mut ints = 0usize;
        let mut floats = 0usize;
        let mut dates = 0usize;
        let mut others = 0usize;
        for row in frame.rows() {
            match &row[idx] {
                Value::Null => {}
                Value::Int(_) => ints += 1,
                Value::Float(_) => floats += 1,
                Value::Date(_) => dates += 1,
                Value::Text(_) => others += 1,
            }
        }

        if others > 0 || (dates > 0 && ints + floats > 0) {
            DataType::Utf8
        } else if dates > 0 {
            DataType::Date32
        } else if floats > 0 {
            DataType::Float64
        } else if ints > 0 {
            DataType::Int64
        } else {
            DataType::Utf8
        }
    }

    /// Creates the Arrow schema for a frame.
    fn schema_for(frame: &Frame) -> Schema {
        Schema::new(
            frame
                .columns()
                .iter()
                .enumerate()
                .map(|(idx, name)| Field::new(name, Self::column_type(frame, idx), true))
                .collect::<Vec<_>>(),
        )
    }

    /// Converts a frame to an Arrow RecordBatch.
    fn frame_to_batch(frame: &Frame, schema: Arc<Schema>) -> Result<RecordBatch, FormatError> {
        let columns: Vec<ArrayRef> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let values = frame.rows().iter().map(|row| &row[idx]);
                let array: ArrayRef = match field.data_type() {
                    DataType::Int64 => Arc::new(Int64Array::from(
                        values
                            .map(|v| match v {
                                Value::Int(i) => Some(*i),
                                _ => None,
                            })
                            .collect::<Vec<_>>(),
                    )),
                    DataType::Float64 => Arc::new(Float64Array::from(
                        values.map(Value::as_f64).collect::<Vec<_>>(),
                    )),
                    DataType::Date32 => Arc::new(Date32Array::from(
                        values
                            .map(|v| v.as_date().map(days_since_epoch))
                            .collect::<Vec<_>>(),
                    )),
                    _ => Arc::new(StringArray::from(
                        values
                            .map(|v| (!v.is_null()).then(|| v.to_string()))
                            .collect::<Vec<_>>(),
                    )),
                };
                array
            })
            .collect();

        RecordBatch::try_new_with_options(
            schema,
            columns,
            &RecordBatchOptions::new().with_row_count(Some(frame.len())),
        )
        .map_err(|e| FormatError::Parquet(e.to_string()))
    }

    /// Appends the rows of an Arrow RecordBatch to a frame.
    fn append_batch(frame: &mut Frame, batch: &RecordBatch) -> Result<(), FormatError> {
        let columns = batch
            .columns()
            .iter()
            .map(normalize_column)
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let values = columns
                .iter()
                .map(|column| cell(column.as_ref(), row))
                .collect::<Result<Vec<_>, _>>()?;
            frame
                .push_row(values)
                .map_err(|e| FormatError::Malformed(e.to_string()))?;
        }
        Ok(())
    }
}

/// Casts a column to one of the four array types a [`Value`] maps from.
fn normalize_column(column: &ArrayRef) -> Result<ArrayRef, FormatError> {
    let data_type = column.data_type();
    let target = if data_type.is_integer() {
        DataType::Int64
    } else if data_type.is_floating() {
        DataType::Float64
    } else if matches!(data_type, DataType::Date32 | DataType::Date64) {
        DataType::Date32
    } else {
        DataType::Utf8
    };
    cast(column, &target).map_err(|e| FormatError::Parquet(e.to_string()))
}

/// Reads one cell of a normalized column.
fn cell(column: &dyn Array, row: usize) -> Result<Value, FormatError> {
    if column.is_null(row) {
        return Ok(Value::Null);
    }
    let any = column.as_any();
    if let Some(ints) = any.downcast_ref::<Int64Array>() {
        return Ok(Value::Int(ints.value(row)));
    }
    if let Some(floats) = any.downcast_ref::<Float64Array>() {
        let f = floats.value(row);
        return Ok(if f.is_finite() { Value::Float(f) } else { Value::Null });
    }
    if let Some(dates) = any.downcast_ref::<Date32Array>() {
        return date_from_days(dates.value(row)).map(Value::Date).ok_or_else(|| {
            FormatError::Malformed(format!("date out of range: {}", dates.value(row)))
        });
    }
    if let Some(strings) = any.downcast_ref::<StringArray>() {
        return Ok(Value::Text(strings.value(row).to_string()));
    }
    Err(FormatError::Malformed(format!(
        "unsupported column type {}",
        column.data_type()
    )))
}

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

fn date_from_days(days: i32) -> Option<NaiveDate> {
    let offset = Days::new(u64::from(days.unsigned_abs()));
    if days >= 0 {
        epoch().checked_add_days(offset)
    } else {
        epoch().checked_sub_days(offset)
    }
}

#[async_trait]
impl Codec for ParquetCodec {
    async fn encode(&self, frame: &Frame) -> Result<Bytes, FormatError> {
        let schema = Arc::new(Self::schema_for(frame));
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut buffer = Vec::new();
        let mut arrow_writer = ArrowWriter::try_new(&mut buffer, Arc::clone(&schema), Some(props))
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        let batch = Self::frame_to_batch(frame, schema)?;
        arrow_writer
            .write(&batch)
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        arrow_writer
            .close()
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        Ok(Bytes::from(buffer))
    }

    async fn decode(&self, data: &[u8]) -> Result<Frame, FormatError> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(data))
            .map_err(|e| FormatError::Parquet(e.to_string()))?;
        let mut frame = Frame::new(builder.schema().fields().iter().map(|f| f.name().clone()));

        let reader = builder
            .build()
            .map_err(|e| FormatError::Parquet(e.to_string()))?;
        for batch in reader {
            let batch = batch.map_err(|e| FormatError::Parquet(e.to_string()))?;
            Self::append_batch(&mut frame, &batch)?;
        }

        Ok(frame)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Parquet
    }
}
