//! Parquet serialization of leaf rows.

use std::io::Write;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, FixedSizeBinaryBuilder, LargeBinaryBuilder, StringBuilder, UInt64Builder,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use peel_archive::LeafEntry;
use peel_verify::DIGEST_LEN;
use tracing::debug;

use crate::Result;
use crate::converter::LeafSink;
use crate::options::ConversionOptions;

pub const SOURCE_COLUMN: &str = "source";
pub const PATH_COLUMN: &str = "path";
pub const SIZE_COLUMN: &str = "size";
pub const CONTENT_COLUMN: &str = "content";
pub const HASH_COLUMN: &str = "hash";

/// The five-column output schema. No column is nullable.
pub fn leaf_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(SOURCE_COLUMN, DataType::Utf8, false),
        Field::new(PATH_COLUMN, DataType::Utf8, false),
        Field::new(SIZE_COLUMN, DataType::UInt64, false),
        Field::new(CONTENT_COLUMN, DataType::LargeBinary, false),
        Field::new(HASH_COLUMN, DataType::FixedSizeBinary(DIGEST_LEN as i32), false),
    ]))
}

pub fn writer_properties(options: &ConversionOptions) -> WriterProperties {
    let mut props = WriterProperties::builder()
        .set_compression(options.compression.as_parquet())
        .set_statistics_enabled(EnabledStatistics::Chunk)
        .set_statistics_truncate_length(Some(1024))
        .set_column_statistics_enabled(CONTENT_COLUMN.into(), EnabledStatistics::None)
        .set_dictionary_enabled(false)
        .set_column_bloom_filter_enabled(HASH_COLUMN.into(), true);

    for column in [SOURCE_COLUMN, PATH_COLUMN] {
        props = props
            .set_column_bloom_filter_enabled(column.into(), true)
            .set_column_dictionary_enabled(column.into(), true);
    }
    props.build()
}

/// Buffers leaf rows into record batches and streams them to a parquet
/// sink.
pub struct TableWriter<W: Write + Send> {
    writer: ArrowWriter<W>,
    schema: SchemaRef,
    batch: BatchBuilder,
    batch_rows: usize,
    batch_bytes: usize,
    batches_written: usize,
    rows_written: u64,
}

impl<W: Write + Send> TableWriter<W> {
    pub fn try_new(sink: W, options: &ConversionOptions) -> Result<Self> {
        let schema = leaf_schema();
        let writer = ArrowWriter::try_new(sink, schema.clone(), Some(writer_properties(options)))?;
        Ok(Self {
            writer,
            schema,
            batch: BatchBuilder::default(),
            batch_rows: options.batch_rows.max(1),
            batch_bytes: options.batch_bytes.max(1),
            batches_written: 0,
            rows_written: 0,
        })
    }

    pub fn push(&mut self, leaf: &LeafEntry) -> Result<()> {
        self.batch.append(leaf)?;
        if self.batch.rows >= self.batch_rows || self.batch.bytes >= self.batch_bytes {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.batch.rows == 0 {
            return Ok(());
        }
        let batch = self.batch.finish(&self.schema)?;
        self.writer.write(&batch)?;
        self.batches_written += 1;
        self.rows_written += batch.num_rows() as u64;
        debug!(
            rows = batch.num_rows(),
            batches = self.batches_written,
            "batch written"
        );
        Ok(())
    }

    pub fn batches_written(&self) -> usize {
        self.batches_written
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush pending rows, write the parquet footer and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer.into_inner()?)
    }
}

impl<W: Write + Send> LeafSink for TableWriter<W> {
    fn accept(&mut self, leaf: &LeafEntry) -> Result<()> {
        self.push(leaf)
    }
}

struct BatchBuilder {
    source: StringBuilder,
    path: StringBuilder,
    size: UInt64Builder,
    content: LargeBinaryBuilder,
    hash: FixedSizeBinaryBuilder,
    rows: usize,
    bytes: usize,
}

impl Default for BatchBuilder {
    fn default() -> Self {
        Self {
            source: StringBuilder::new(),
            path: StringBuilder::new(),
            size: UInt64Builder::new(),
            content: LargeBinaryBuilder::new(),
            hash: FixedSizeBinaryBuilder::new(DIGEST_LEN as i32),
            rows: 0,
            bytes: 0,
        }
    }
}

impl BatchBuilder {
    fn append(&mut self, leaf: &LeafEntry) -> Result<()> {
        self.hash.append_value(leaf.hash.as_bytes())?;
        self.source.append_value(&leaf.source);
        self.path.append_value(&leaf.path);
        self.size.append_value(leaf.size);
        self.content.append_value(&leaf.content);
        self.rows += 1;
        self.bytes += leaf.content.len();
        Ok(())
    }

    fn finish(&mut self, schema: &SchemaRef) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(self.source.finish()),
            Arc::new(self.path.finish()),
            Arc::new(self.size.finish()),
            Arc::new(self.content.finish()),
            Arc::new(self.hash.finish()),
        ];
        self.rows = 0;
        self.bytes = 0;
        Ok(RecordBatch::try_new(schema.clone(), columns)?)
    }
}
