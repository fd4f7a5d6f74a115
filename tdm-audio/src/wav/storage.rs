//! Storage seam for the WAV writer.
//!
//! [`Storage`] is a directory that can test, delete and create files by
//! name; [`StorageFile`] is one open file. The writer never reads back.
//!
//! With the `sdmmc` feature, [`embedded_sdmmc::Directory`] implements
//! [`Storage`] directly, so an open FAT directory on an SD card can be handed
//! to [`WavWriter`](super::WavWriter) as is.

use core::fmt::Debug;

/// A directory the writer creates its recording in.
pub trait Storage {
    type Error: Debug;
    type File: StorageFile<Error = Self::Error>;

    fn exists(&mut self, name: &str) -> Result<bool, Self::Error>;

    fn remove(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Create `name` empty, truncating any existing file, and open it for
    /// writing at offset 0.
    fn create(&mut self, name: &str) -> Result<Self::File, Self::Error>;
}

/// A file open for writing.
pub trait StorageFile {
    type Error: Debug;

    /// Write all of `bytes` at the current position.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Move the write position to `offset` bytes from the start.
    fn seek_to(&mut self, offset: u32) -> Result<(), Self::Error>;

    /// Flush and close.
    fn close(self) -> Result<(), Self::Error>;
}

#[cfg(feature = "sdmmc")]
mod sdmmc {
    use embedded_sdmmc::{BlockDevice, Directory, Error, File, Mode, TimeSource};

    use super::{Storage, StorageFile};

    impl<'a, D, T, const MAX_DIRS: usize, const MAX_FILES: usize, const MAX_VOLUMES: usize> Storage
        for Directory<'a, D, T, MAX_DIRS, MAX_FILES, MAX_VOLUMES>
    where
        D: BlockDevice,
        T: TimeSource,
    {
        type Error = Error<D::Error>;
        type File = File<'a, D, T, MAX_DIRS, MAX_FILES, MAX_VOLUMES>;

        fn exists(&mut self, name: &str) -> Result<bool, Self::Error> {
            match self.find_directory_entry(name) {
                Ok(_) => Ok(true),
                Err(Error::NotFound) => Ok(false),
                Err(e) => Err(e),
            }
        }

        fn remove(&mut self, name: &str) -> Result<(), Self::Error> {
            self.delete_file_in_dir(name)
        }

        fn create(&mut self, name: &str) -> Result<Self::File, Self::Error> {
            self.open_file_in_dir(name, Mode::ReadWriteCreateOrTruncate)
        }
    }

    impl<'a, D, T, const MAX_DIRS: usize, const MAX_FILES: usize, const MAX_VOLUMES: usize> StorageFile
        for File<'a, D, T, MAX_DIRS, MAX_FILES, MAX_VOLUMES>
    where
        D: BlockDevice,
        T: TimeSource,
    {
        type Error = Error<D::Error>;

        fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            self.write(bytes)
        }

        fn seek_to(&mut self, offset: u32) -> Result<(), Self::Error> {
            self.seek_from_start(offset)
        }

        fn close(self) -> Result<(), Self::Error> {
            File::close(self)
        }
    }
}

/// In-memory storage used by the writer and integration tests.
#[cfg(test)]
pub(crate) mod tests {
    extern crate std;

    use std::cell::RefCell;
    use std::rc::Rc;
    use std::string::{String, ToString};
    use std::vec::Vec;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum MemError {
        Unavailable,
        NotFound,
        Full,
    }

    #[derive(Default)]
    pub(crate) struct Disk {
        pub(crate) files: Vec<(String, Vec<u8>)>,
        pub(crate) closed: Vec<String>,
        pub(crate) removed: Vec<String>,
        pub(crate) unavailable: bool,
        /// Fail any write that would grow a file past this many bytes.
        pub(crate) capacity: Option<usize>,
    }

    impl Disk {
        pub(crate) fn file(&self, name: &str) -> Option<&[u8]> {
            self.files
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, d)| d.as_slice())
        }
    }

    /// Shared handle so a test can inspect the disk while the writer owns
    /// its storage.
    #[derive(Clone, Default)]
    pub(crate) struct MemStorage(pub(crate) Rc<RefCell<Disk>>);

    pub(crate) struct MemFile {
        disk: Rc<RefCell<Disk>>,
        name: String,
        pos: usize,
    }

    impl Storage for MemStorage {
        type Error = MemError;
        type File = MemFile;

        fn exists(&mut self, name: &str) -> Result<bool, MemError> {
            let disk = self.0.borrow();
            if disk.unavailable {
                return Err(MemError::Unavailable);
            }
            Ok(disk.file(name).is_some())
        }

        fn remove(&mut self, name: &str) -> Result<(), MemError> {
            let mut disk = self.0.borrow_mut();
            let idx = disk
                .files
                .iter()
                .position(|(n, _)| n == name)
                .ok_or(MemError::NotFound)?;
            disk.files.remove(idx);
            disk.removed.push(name.to_string());
            Ok(())
        }

        fn create(&mut self, name: &str) -> Result<MemFile, MemError> {
            let mut disk = self.0.borrow_mut();
            if disk.unavailable {
                return Err(MemError::Unavailable);
            }
            disk.files.retain(|(n, _)| n != name);
            disk.files.push((name.to_string(), Vec::new()));
            Ok(MemFile {
                disk: self.0.clone(),
                name: name.to_string(),
                pos: 0,
            })
        }
    }

    impl StorageFile for MemFile {
        type Error = MemError;

        fn write_all(&mut self, bytes: &[u8]) -> Result<(), MemError> {
            let mut disk = self.disk.borrow_mut();
            let end = self.pos + bytes.len();
            if matches!(disk.capacity, Some(cap) if end > cap) {
                return Err(MemError::Full);
            }
            let (_, data) = disk
                .files
                .iter_mut()
                .find(|(n, _)| *n == self.name)
                .ok_or(MemError::NotFound)?;
            if data.len() < end {
                data.resize(end, 0);
            }
            data[self.pos..end].copy_from_slice(bytes);
            self.pos = end;
            Ok(())
        }

        fn seek_to(&mut self, offset: u32) -> Result<(), MemError> {
            self.pos = offset as usize;
            Ok(())
        }

        fn close(self) -> Result<(), MemError> {
            self.disk.borrow_mut().closed.push(self.name);
            Ok(())
        }
    }

    #[test]
    fn mem_storage_overwrites_in_place() {
        let mut storage = MemStorage::default();
        let mut file = storage.create("A.WAV").unwrap();
        file.write_all(&[1, 2, 3, 4]).unwrap();
        file.seek_to(1).unwrap();
        file.write_all(&[9]).unwrap();
        file.close().unwrap();
        let disk = storage.0.borrow();
        assert_eq!(disk.file("A.WAV"), Some(&[1, 9, 3, 4][..]));
        assert_eq!(disk.closed, ["A.WAV"]);
    }
}
