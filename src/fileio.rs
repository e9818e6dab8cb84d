//! Code regarding file input (reading `.jack`, `.vm` and `.asm` sources)
//! and output (writing the generated `.vm`, `.asm`, `.hack` and `.xml` files).
//!
//! ## Input
//! Every command accepts either a single source file or a directory.
//! For a directory, all files with the expected extension directly inside it
//! are taken, sorted by path, so that repeated builds see units in the same order.
//!
//! ## Output
//! Output files are only written once a stage has processed all of its units
//! successfully, so a failing build never leaves a half-written file behind.

use std::{
    io,
    path::{Path, PathBuf},
};

pub mod input {
    use std::{
        fs, io,
        path::{Path, PathBuf},
    };

    /// A single translation unit: one source file and its contents.
    #[derive(Debug, Clone)]
    pub struct SourceFile {
        path: PathBuf,
        module_name: String,
        content: String,
    }

    impl SourceFile {
        /// Reads the file at `path`, naming the unit after the file stem.
        pub fn load(path: &Path) -> io::Result<Self> {
            let content = fs::read_to_string(path)?;

            Ok(Self::new(path.to_path_buf(), content))
        }

        /// A unit whose content is already in memory but that belongs at `path`.
        pub fn new(path: PathBuf, content: String) -> Self {
            Self {
                module_name: super::file_stem(&path),
                path,
                content,
            }
        }

        /// Construct an in-memory unit named `module_name`.
        #[cfg(test)]
        pub fn internal(module_name: impl Into<String>, content: impl Into<String>) -> Self {
            let module_name = module_name.into();

            Self {
                path: PathBuf::from(&module_name),
                module_name,
                content: content.into(),
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        pub fn module_name(&self) -> &str {
            &self.module_name
        }

        pub fn content(&self) -> &str {
            &self.content
        }
    }

    /// Lists the files with the given extension that `path` designates.
    ///
    /// `path` is either a file with that extension or a directory;
    /// directory entries are returned in sorted order.
    pub fn discover(path: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        if path.is_file() {
            return if super::has_extension(path, extension) {
                Ok(vec![path.to_path_buf()])
            } else {
                Err(io::Error::other(format!(
                    "`{}` is not a `.{extension}` file",
                    path.display()
                )))
            };
        }

        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("`{}` is neither a file nor a directory", path.display()),
            ));
        }

        let mut paths = fs::read_dir(path)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<io::Result<Vec<_>>>()?
            .into_iter()
            .filter(|path| path.is_file() && super::has_extension(path, extension))
            .collect::<Vec<_>>();

        if paths.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no `.{extension}` files in `{}`", path.display()),
            ));
        }

        paths.sort();
        Ok(paths)
    }
}

pub mod output {
    use std::{
        fs,
        io::{self, Write},
        path::{Path, PathBuf},
    };

    pub struct OutputFile {
        path: PathBuf,
        content: String,
    }

    impl OutputFile {
        pub const fn new(path: PathBuf, content: String) -> Self {
            Self { path, content }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    /// Writes the file, terminating its last line with a newline.
    pub fn generate(output_file: &OutputFile) -> io::Result<()> {
        let mut file = fs::File::create(&output_file.path)?;
        file.write_all(output_file.content.as_bytes())?;

        if !output_file.content.is_empty() && !output_file.content.ends_with('\n') {
            file.write_all(b"\n")?;
        }

        Ok(())
    }
}

/// Default destination for a stage whose input is `path`:
/// `dir/Prog.vm -> dir/Prog.asm` for a file, `dir -> dir/dir.asm` for a directory.
pub fn default_output(path: &Path, extension: &str) -> io::Result<PathBuf> {
    if path.is_dir() {
        let dir = path.canonicalize()?;
        Ok(dir.join(file_stem(&dir)).with_extension(extension))
    } else {
        Ok(path.with_extension(extension))
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}
