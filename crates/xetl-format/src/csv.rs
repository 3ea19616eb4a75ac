//! Delimited text format.

use async_trait::async_trait;
use bytes::Bytes;
use csv_async::{AsyncReaderBuilder, AsyncWriterBuilder};
use futures::StreamExt;
use xetl_types::{Frame, Value};

use crate::{Codec, FormatError, OutputFormat};

/// CSV codec.
///
/// Reading expects a header row; every other row must have the same number
/// of fields. Empty fields read as [`Value::Null`].
#[derive(Debug, Clone)]
pub struct CsvCodec {
    /// Field delimiter (default: comma).
    delimiter: u8,
}

impl Default for CsvCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvCodec {
    /// Creates a new CSV codec with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[async_trait]
impl Codec for CsvCodec {
    async fn encode(&self, frame: &Frame) -> Result<Bytes, FormatError> {
        let mut writer = AsyncWriterBuilder::new()
            .delimiter(self.delimiter)
            .create_writer(Vec::new());

        writer.write_record(frame.columns()).await?;
        for row in frame.rows() {
            writer
                .write_record(row.iter().map(ToString::to_string))
                .await?;
        }

        let data = writer
            .into_inner()
            .await
            .map_err(|e| FormatError::Io(std::io::Error::other(e.to_string())))?;
        Ok(Bytes::from(data))
    }

    async fn decode(&self, data: &[u8]) -> Result<Frame, FormatError> {
        let mut reader = AsyncReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .create_reader(data);

        let headers = reader.headers().await?.clone();
        let mut frame = Frame::new(headers.iter());

        let mut records = reader.records();
        while let Some(record) = records.next().await {
            let record = record?;
            frame
                .push_row(record.iter().map(Value::infer).collect())
                .map_err(|e| FormatError::Malformed(e.to_string()))?;
        }

        Ok(frame)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const TRADES: &str = "ISIN,Mnemonic,Date,Time,StartPrice,EndPrice,MinPrice,MaxPrice,TradedVolume\n\
        AT0000A0E9W5,SANT,2022-09-16,13:00,20.21,18.27,18.21,20.42,633\n\
        AT0000A0E9W5,SANT,2022-09-16,14:00,18.27,21.19,18.27,21.34,\n";

    #[tokio::test]
    async fn test_decode_infers_types() {
        let frame = CsvCodec::new().decode(TRADES.as_bytes()).await.unwrap();

        assert_eq!(frame.columns().len(), 9);
        assert_eq!(frame.len(), 2);
        let first = &frame.rows()[0];
        assert_eq!(first[0], Value::from("AT0000A0E9W5"));
        assert_eq!(first[2], Value::from("2022-09-16"));
        assert_eq!(first[4], Value::Float(20.21));
        assert_eq!(first[8], Value::Int(633));
        assert_eq!(frame.rows()[1][8], Value::Null);
    }

    #[tokio::test]
    async fn test_encode_writes_header_and_nulls() {
        let frame = Frame::try_new(
            ["isin", "date", "change_prev_closing_%"],
            vec![vec![
                "AT0000A0E9W5".into(),
                NaiveDate::from_ymd_opt(2022, 9, 16).unwrap().into(),
                Value::Null,
            ]],
        )
        .unwrap();

        let data = CsvCodec::new().encode(&frame).await.unwrap();
        let text = String::from_utf8(data.to_vec()).unwrap();
        assert_eq!(text, "isin,date,change_prev_closing_%\nAT0000A0E9W5,2022-09-16,\n");
    }

    #[tokio::test]
    async fn test_custom_delimiter() {
        let codec = CsvCodec::new().with_delimiter(b';');
        let frame = codec.decode(b"a;b\n1;x\n").await.unwrap();
        assert_eq!(frame.columns(), ["a", "b"]);
        assert_eq!(frame.rows()[0], vec![Value::Int(1), Value::from("x")]);

        let tsv = CsvCodec::new()
            .with_delimiter(b'\t')
            .encode(&frame)
            .await
            .unwrap();
        assert_eq!(&tsv[..], b"a\tb\n1\tx\n");
    }

    #[tokio::test]
    async fn test_ragged_rows_are_malformed() {
        let result = CsvCodec::new().decode(b"a,b\n1,2,3\n").await;
        assert!(matches!(result, Err(FormatError::Csv(_))));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_malformed() {
        let result = CsvCodec::new().decode(b"a,b\n\xff\xfe,2\n").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_header_only() {
        let frame = CsvCodec::new()
            .decode(b"source_date,datetime_of_processing\n")
            .await
            .unwrap();
        assert_eq!(frame.columns(), ["source_date", "datetime_of_processing"]);
        assert!(frame.is_empty());
    }
}
