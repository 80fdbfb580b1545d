use std::{cell::RefCell, env, fs::File, io, path::{Path, PathBuf}, rc::Rc};

use anyhow::{anyhow, Result};
use hashbrown::HashMap;

pub trait FileSystem {
    type Reader: io::Read;
    type Writer: io::Write;

    fn exists(&self, path: &Path) -> bool;
    /// Opens `path` for writing, discarding previous contents.
    fn get_writer(&mut self, path: &Path) -> Result<Self::Writer>;
    fn get_reader(&mut self, path: &Path) -> Result<Self::Reader>;
    fn get_executable_directory(&self) -> Result<PathBuf>;
}

pub struct DefaultFileSystem;

impl FileSystem for DefaultFileSystem {
    type Reader = File;
    type Writer = File;

    fn get_writer(&mut self, path: &Path) -> Result<Self::Writer> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow!("Could not create directory {:?}: {}", parent, e))?;
        }

        File::create(path).map_err(|e| anyhow!("Could not create file: {}", e))
    }

    fn get_reader(&mut self, path: &Path) -> Result<Self::Reader> {
        File::open(path).map_err(|e| anyhow!("Could not open file: {}", e))
    }

    fn get_executable_directory(&self) -> Result<PathBuf> {
        let executable_path = env::current_exe()?;

        executable_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("executable {:?} has no parent directory", executable_path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl DefaultFileSystem {
    pub fn new() -> Self {
        Self
    }
}

pub struct MemoryFileSystem {
    map: HashMap<PathBuf, MemoryFileSystemEntry>
}

impl FileSystem for MemoryFileSystem {
    type Reader = MemoryFileSystemEntry;
    type Writer = MemoryFileSystemEntry;

    fn get_writer(&mut self, path: &Path) -> Result<Self::Writer> {
        let entry = MemoryFileSystemEntry::new();
        self.map.insert(path.to_path_buf(), entry.clone());

        Ok(entry)
    }

    fn get_reader(&mut self, path: &Path) -> Result<Self::Reader> {
        self.map.get(path)
            .map(MemoryFileSystemEntry::rewind)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }

    fn get_executable_directory(&self) -> Result<PathBuf> {
        Ok(std::env::temp_dir())
    }

    fn exists(&self, path: &Path) -> bool {
        self.map.contains_key(path)
    }
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self {
            map: HashMap::new()
        }
    }
}

#[derive(Clone)]
pub struct MemoryFileSystemEntry {
    data: Rc<RefCell<Vec<u8>>>,
    position: usize,
}

impl io::Read for MemoryFileSystemEntry {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.borrow();
        let available = data.len().saturating_sub(self.position);
        let bytes_to_read = available.min(buf.len());

        if bytes_to_read == 0 {
            return Ok(0);
        }

        buf[..bytes_to_read].copy_from_slice(&data[self.position..self.position + bytes_to_read]);
        self.position += bytes_to_read;

        Ok(bytes_to_read)
    }
}

impl io::Write for MemoryFileSystemEntry {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MemoryFileSystemEntry {
    pub fn new() -> Self {
        Self {
            data: Rc::new(RefCell::new(Vec::new())),
            position: 0
        }
    }

    fn rewind(&self) -> Self {
        Self {
            data: self.data.clone(),
            position: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn should_replace_contents_on_write() {
        let path = PathBuf::from("settings.json");
        let mut file_system = MemoryFileSystem::new();

        file_system.get_writer(&path).unwrap().write_all(b"first").unwrap();
        file_system.get_writer(&path).unwrap().write_all(b"second").unwrap();

        let mut contents = String::new();
        file_system.get_reader(&path).unwrap().read_to_string(&mut contents).unwrap();

        assert_eq!(contents, "second");
    }

    #[test]
    fn should_fail_reading_missing_file() {
        let mut file_system = MemoryFileSystem::new();
        let path = PathBuf::from("missing.json");

        assert!(!file_system.exists(&path));
        assert!(file_system.get_reader(&path).is_err());
    }
}
