//! Compile-or-resolve for submissions.
//!
//! A path with a C or C++ extension is compiled with the MPI compiler
//! wrappers into the compiler's default `./a.out`. Any other path is taken
//! to be a ready executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::config::ToolchainConfig;
use crate::console::print_command;
use crate::error::{HarnessError, HarnessResult};

/// Name the compiler wrappers write when no `-o` is given
pub const DEFAULT_BINARY: &str = "./a.out";

/// Common optimisation and warning flags
const COMMON_FLAGS: [&str; 2] = ["-O3", "-Wall"];

/// Source languages the harness knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    C,
    Cpp,
}

impl SourceLanguage {
    /// Detect the language from the lowercased file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "c" => Some(SourceLanguage::C),
            "cc" | "cpp" => Some(SourceLanguage::Cpp),
            _ => None,
        }
    }

    /// Language standard flag passed to the compiler
    pub fn std_flag(&self) -> &'static str {
        match self {
            SourceLanguage::C => "-std=gnu99",
            SourceLanguage::Cpp => "-std=gnu++03",
        }
    }
}

/// Compiler handles building source submissions.
pub struct Compiler {
    toolchain: ToolchainConfig,
}

impl Compiler {
    /// Create a new compiler with the given toolchain.
    pub fn new(toolchain: ToolchainConfig) -> Self {
        Self { toolchain }
    }

    /// Build the argv for compiling `source`.
    pub fn get_compile_command(&self, language: SourceLanguage, source: &Path) -> Vec<OsString> {
        let compiler = match language {
            SourceLanguage::C => &self.toolchain.mpicc,
            SourceLanguage::Cpp => &self.toolchain.mpicxx,
        };

        let mut argv: Vec<OsString> = vec![compiler.into(), language.std_flag().into()];
        argv.extend(COMMON_FLAGS.iter().map(OsString::from));
        argv.push(source.into());
        argv
    }

    /// Compile `filename` if it is a source file and return the executable.
    ///
    /// Fails when compilation fails or the executable does not exist.
    pub async fn resolve(&self, filename: &Path) -> HarnessResult<PathBuf> {
        let executable = match SourceLanguage::from_path(filename) {
            Some(language) => {
                self.compile(language, filename).await?;
                PathBuf::from(DEFAULT_BINARY)
            }
            None => filename.to_path_buf(),
        };

        if !executable.exists() {
            return Err(HarnessError::ExecutableMissing(executable));
        }

        Ok(executable)
    }

    async fn compile(&self, language: SourceLanguage, source: &Path) -> HarnessResult<()> {
        let argv = self.get_compile_command(language, source);
        print_command(&argv);

        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .status()
            .await
            .map_err(|source| HarnessError::Spawn {
                program: argv[0].to_string_lossy().into_owned(),
                source,
            })?;

        if !status.success() {
            tracing::debug!(?status, "Compiler exited unsuccessfully");
            return Err(HarnessError::CompilationFailed);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_detection() {
        assert_eq!(SourceLanguage::from_path(Path::new("sort.c")), Some(SourceLanguage::C));
        assert_eq!(SourceLanguage::from_path(Path::new("SORT.C")), Some(SourceLanguage::C));
        assert_eq!(SourceLanguage::from_path(Path::new("a/sort.cc")), Some(SourceLanguage::Cpp));
        assert_eq!(SourceLanguage::from_path(Path::new("sort.CPP")), Some(SourceLanguage::Cpp));
        assert_eq!(SourceLanguage::from_path(Path::new("sort.cxx")), None);
        assert_eq!(SourceLanguage::from_path(Path::new("./a.out")), None);
        assert_eq!(SourceLanguage::from_path(Path::new("sort")), None);
    }

    #[test]
    fn test_get_compile_command() {
        let compiler = Compiler::new(ToolchainConfig::default());

        let argv = compiler.get_compile_command(SourceLanguage::C, Path::new("sort.c"));
        assert_eq!(argv, ["mpicc", "-std=gnu99", "-O3", "-Wall", "sort.c"]);

        let argv = compiler.get_compile_command(SourceLanguage::Cpp, Path::new("sort.cpp"));
        assert_eq!(argv, ["mpicxx", "-std=gnu++03", "-O3", "-Wall", "sort.cpp"]);
    }

    #[tokio::test]
    async fn test_non_source_path_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("prebuilt");
        std::fs::write(&exe, b"#!/bin/sh\n").unwrap();

        let compiler = Compiler::new(ToolchainConfig::default());
        assert_eq!(compiler.resolve(&exe).await.unwrap(), exe);
    }

    #[tokio::test]
    async fn test_missing_executable_is_fatal() {
        let compiler = Compiler::new(ToolchainConfig::default());
        let err = compiler
            .resolve(Path::new("/nonexistent/sorter"))
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::ExecutableMissing(_)));
    }

    #[tokio::test]
    async fn test_failing_compiler_is_fatal() {
        let toolchain = ToolchainConfig {
            mpicc: PathBuf::from("false"),
            ..ToolchainConfig::default()
        };
        let compiler = Compiler::new(toolchain);
        let err = compiler.resolve(Path::new("sort.c")).await.unwrap_err();
        assert!(matches!(err, HarnessError::CompilationFailed));
    }
}
