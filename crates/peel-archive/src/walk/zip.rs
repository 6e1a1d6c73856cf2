use std::io::{self, Cursor, Read};

use super::{LeafVisitor, Walker, join_path};

impl<V: LeafVisitor + ?Sized> Walker<'_, V> {
    /// Zip needs random access, so the container is buffered first and its
    /// central directory walked in index order.
    pub(super) fn walk_zip(&mut self, reader: &mut dyn Read, path: &str) -> Result<(), V::Error> {
        let buffer = self.read_bounded(reader, path)?;
        let mut archive = zip::ZipArchive::new(Cursor::new(buffer))
            .map_err(|e| self.read_error(path, zip_to_io(e)))?;

        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| self.read_error(path, zip_to_io(e)))?;
            if file.is_dir() {
                self.stats.skipped_members += 1;
                continue;
            }

            let member_path = join_path(path, file.name());
            self.walk_stream(&mut file, &member_path)?;
        }
        Ok(())
    }
}

fn zip_to_io(err: zip::result::ZipError) -> io::Error {
    match err {
        zip::result::ZipError::Io(err) => err,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
