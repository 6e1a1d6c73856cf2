//! In-memory fixture builders for tests.
//!
//! Compiled for this crate's own tests and, through the `test-utils`
//! feature, for dependents' tests. Builders panic on failure.

use std::io::{Cursor, Write};

pub fn gzip_data(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).expect("gzip encode");
    encoder.finish().expect("gzip finish")
}

pub fn zstd_data(data: &[u8]) -> Vec<u8> {
    zstd::encode_all(data, 3).expect("zstd encode")
}

pub fn bz2_data(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).expect("bzip2 encode");
    encoder.finish().expect("bzip2 finish")
}

pub fn xz_data(data: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data).expect("xz encode");
    encoder.finish().expect("xz finish")
}

/// A GNU tar with one regular file per `(name, content)` pair.
pub fn tar_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *content)
            .expect("tar append");
    }
    builder.into_inner().expect("tar finish")
}

/// A deflate zip; names ending in `/` become directory entries.
pub fn zip_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in members {
        if name.ends_with('/') {
            writer
                .add_directory(name.to_string(), options)
                .expect("zip directory");
        } else {
            writer.start_file(name.to_string(), options).expect("zip start");
            writer.write_all(content).expect("zip write");
        }
    }
    writer.finish().expect("zip finish").into_inner()
}
