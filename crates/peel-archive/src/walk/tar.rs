use std::io::Read;

use tar::EntryType;
use tracing::trace;

use super::{LeafVisitor, Walker, join_path};

impl<V: LeafVisitor + ?Sized> Walker<'_, V> {
    /// Stream tar members in header order. Only regular file payloads are
    /// recursed into; long-name and pax records are folded in by `tar`.
    pub(super) fn walk_tar(&mut self, reader: &mut dyn Read, path: &str) -> Result<(), V::Error> {
        let mut archive = tar::Archive::new(reader);
        let entries = archive.entries().map_err(|e| self.read_error(path, e))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| self.read_error(path, e))?;
            let entry_type = entry.header().entry_type();
            if !matches!(entry_type, EntryType::Regular | EntryType::Continuous) {
                self.stats.skipped_members += 1;
                trace!(source = self.source_id, path, ?entry_type, "tar member skipped");
                continue;
            }

            let name = entry
                .path()
                .map_err(|e| self.read_error(path, e))?
                .to_string_lossy()
                .into_owned();
            let member_path = join_path(path, &name);
            self.walk_stream(&mut entry, &member_path)?;
        }
        Ok(())
    }
}
