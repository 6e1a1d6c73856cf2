#![allow(dead_code)]

use arrow::array::AsArray;
use arrow::datatypes::UInt64Type;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub source: String,
    pub path: String,
    pub size: u64,
    pub content: Vec<u8>,
    pub hash: Vec<u8>,
}

pub fn read_rows(data: impl Into<Bytes>) -> Vec<Row> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(data.into())
        .unwrap()
        .build()
        .unwrap();

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.unwrap();
        let source = batch.column(0).as_string::<i32>();
        let path = batch.column(1).as_string::<i32>();
        let size = batch.column(2).as_primitive::<UInt64Type>();
        let content = batch.column(3).as_binary::<i64>();
        let hash = batch.column(4).as_fixed_size_binary();
        for i in 0..batch.num_rows() {
            rows.push(Row {
                source: source.value(i).to_string(),
                path: path.value(i).to_string(),
                size: size.value(i),
                content: content.value(i).to_vec(),
                hash: hash.value(i).to_vec(),
            });
        }
    }
    rows
}
