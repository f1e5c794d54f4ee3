use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::ProtogenError,
    parser::parse_source,
    tokenizer::tokenize_source,
    types::SourceModule,
};

/// Yields exactly one module's worth of top-level declarations.
pub trait DeclarationSource {
    fn load(&self) -> Result<SourceModule, ProtogenError>;
}

/// Go files on disk: either every non-test `.go` file of one directory, or
/// an explicit list of files that all live in the same directory.
#[derive(Debug, Clone)]
pub struct GoSource {
    files: Vec<PathBuf>,
}

impl GoSource {
    pub fn from_paths(paths: &[PathBuf]) -> Result<Self, ProtogenError> {
        let files = match paths {
            [] => return Err(ProtogenError::Module("no input paths given".to_string())),
            [dir] if dir.is_dir() => Self::discover(dir)?,
            _ => Self::explicit(paths)?,
        };
        Ok(GoSource { files })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn discover(dir: &Path) -> Result<Vec<PathBuf>, ProtogenError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if path.is_file() && name.ends_with(".go") && !name.ends_with("_test.go") {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(ProtogenError::Module(format!(
                "no Go source files found in {}",
                dir.display()
            )));
        }
        files.sort();
        Ok(files)
    }

    fn explicit(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ProtogenError> {
        let mut directory: Option<PathBuf> = None;
        for path in paths {
            if !path.is_file() {
                return Err(ProtogenError::Module(format!(
                    "{} is not a source file; pass a single directory or files from one directory",
                    path.display()
                )));
            }
            let parent = parent_dir(path);
            match &directory {
                Some(dir) if *dir != parent => {
                    return Err(ProtogenError::Module(format!(
                        "input files span several directories ({} and {})",
                        dir.display(),
                        parent.display()
                    )));
                }
                Some(_) => {}
                None => directory = Some(parent),
            }
        }
        let mut files = paths.to_vec();
        files.sort();
        files.dedup();
        Ok(files)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

impl DeclarationSource for GoSource {
    fn load(&self) -> Result<SourceModule, ProtogenError> {
        let mut sources = Vec::with_capacity(self.files.len());
        for path in &self.files {
            let text = fs::read_to_string(path)?;
            sources.push((path.display().to_string(), text));
        }
        parse_module(sources.iter().map(|(name, text)| (name.as_str(), text.as_str())))
    }
}

/// In-memory Go sources, keyed by file name. Mostly useful in tests.
#[derive(Debug, Clone, Default)]
pub struct StringSource {
    files: Vec<(String, String)>,
}

impl StringSource {
    pub fn new() -> Self {
        StringSource::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.push((name.into(), text.into()));
        self
    }
}

impl DeclarationSource for StringSource {
    fn load(&self) -> Result<SourceModule, ProtogenError> {
        parse_module(self.files.iter().map(|(name, text)| (name.as_str(), text.as_str())))
    }
}

/// Parses every file and checks they all declare the same package.
fn parse_module<'a>(
    files: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<SourceModule, ProtogenError> {
    let mut module: Option<(String, String)> = None;
    let mut declarations = Vec::new();

    for (file, text) in files {
        let tokens = tokenize_source(file, text)?;
        let parsed = parse_source(file, &tokens)?;
        match &module {
            Some((package, first)) if *package != parsed.package => {
                return Err(ProtogenError::Module(format!(
                    "found package {} in {} and package {} in {}",
                    package, first, parsed.package, file
                )));
            }
            Some(_) => {}
            None => module = Some((parsed.package.clone(), file.to_string())),
        }
        debug!(file, declarations = parsed.declarations.len(), "parsed source file");
        declarations.extend(parsed.declarations);
    }

    let (name, _) = module.ok_or_else(|| ProtogenError::Module("no source files to read".to_string()))?;
    Ok(SourceModule { name, declarations })
}
