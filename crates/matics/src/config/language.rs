use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::config::ConfigError;

const INVALID_FILE_NAME_CHARS: [char; 2] = ['/', '\\'];

/// A supported source language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Python,
    Java,
    C,
    Cpp,
}

impl Language {
    /// Every supported language, in menu order
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::Java,
        Language::C,
        Language::Cpp,
    ];

    /// Identifier used as the key in the `[languages]` config table
    pub fn id(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }

    /// Guess the language from a file extension (without the dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "c" => Some(Language::C),
            "cpp" | "cc" | "cxx" => Some(Language::Cpp),
            _ => None,
        }
    }

    /// Starter program shown for a fresh buffer
    pub fn default_source(&self) -> &'static str {
        match self {
            Language::Python => "print(\"Hello, World!\")\n",
            Language::Java => {
                "public class Main { public static void main(String[] args) { System.out.println(\"Hello, World!\"); } }\n"
            }
            Language::C => "#include <stdio.h>\nint main() { printf(\"Hello, World!\\n\"); return 0; }\n",
            Language::Cpp => {
                "#include <iostream>\nusing namespace std;\nint main() { cout << \"Hello, World!\" << endl; return 0; }\n"
            }
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Python => "Python",
            Language::Java => "Java",
            Language::C => "C",
            Language::Cpp => "C++",
        };
        f.write_str(name)
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "c" => Ok(Language::C),
            "cpp" | "c++" => Ok(Language::Cpp),
            _ => Err(ConfigError::UnsupportedLanguage(s.to_owned())),
        }
    }
}

/// Toolchain configuration for one language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Human-readable name (e.g., "C++")
    pub name: String,

    /// Canonical source file name inside the workspace
    pub source_name: FileName,

    /// Compilation step (None for interpreted languages)
    #[serde(default)]
    pub compile: Option<CompileConfig>,

    /// Execution step
    pub run: RunConfig,
}

impl LanguageConfig {
    /// Check if the language is compiled
    pub fn is_compiled(&self) -> bool {
        self.compile.is_some()
    }

    /// File name of the compiled artifact on this platform, if any
    pub fn output_name(&self) -> Option<String> {
        self.compile.as_ref().map(CompileConfig::artifact_name)
    }

    /// Placeholder values for this language's commands.
    ///
    /// `root` is the workspace directory the commands run in.
    pub fn placeholders(&self, root: &Path) -> Vec<(&'static str, String)> {
        let source = self.source_name.as_str();
        let class = Path::new(source)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_owned());

        let mut vars = vec![("source", source.to_owned()), ("class", class)];
        if let Some(output) = self.output_name() {
            vars.push(("binary", binary_invocation(root, &output)));
            vars.push(("output", output));
        }
        vars
    }
}

/// How a compiled output in `root` is invoked on this platform
///
/// POSIX shells need a `./` prefix for programs in the working directory.
/// Windows no longer searches the working directory, so the full path is used.
pub fn binary_invocation(root: &Path, output_name: &str) -> String {
    if cfg!(windows) {
        root.join(output_name).to_string_lossy().into_owned()
    } else {
        format!("./{output_name}")
    }
}

/// `name` with the platform's executable suffix (`.exe` on Windows)
pub fn executable_file_name(name: &str) -> String {
    format!("{name}{}", std::env::consts::EXE_SUFFIX)
}

/// Expand `{name}` placeholders in the given command
pub fn expand_command(command: &[String], vars: &[(&str, String)]) -> Vec<String> {
    command
        .iter()
        .map(|arg| {
            vars.iter().fold(arg.clone(), |acc, (key, value)| {
                acc.replace(&format!("{{{key}}}"), value)
            })
        })
        .collect()
}

/// File name inside the workspace, without any directory component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileName(String);

impl FileName {
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        let contains_invalid = name.chars().any(|c| INVALID_FILE_NAME_CHARS.contains(&c));
        if contains_invalid || name == "." || name == ".." {
            return Err(ConfigError::InvalidFileName(name.to_owned()));
        }
        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for FileName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileName::new(&s).map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a file name without '/' or '\\' characters",
            )
        })
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for the compilation step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Command and arguments with placeholders
    pub command: Vec<String>,

    /// Artifact the compiler produces (e.g., "temp_C_program")
    pub output_name: String,

    /// Whether the artifact is a native executable. Native outputs get the
    /// platform's executable suffix, which native compilers append on Windows.
    #[serde(default)]
    pub executable: bool,

    /// Environment variables to set during compilation
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl CompileConfig {
    /// File name the compiler writes on this platform
    pub fn artifact_name(&self) -> String {
        if self.executable {
            executable_file_name(&self.output_name)
        } else {
            self.output_name.clone()
        }
    }
}

/// Configuration for the execution step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Command and arguments with placeholders
    pub command: Vec<String>,

    /// Environment variables to set
    #[serde(default)]
    pub env: HashMap<String, String>,
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn file_name_rejects_all_strings_with_slash(s in ".*/.*") {
            prop_assert!(FileName::new(&s).is_err());
        }

        #[test]
        fn file_name_accepts_identifier_names(s in "[a-zA-Z0-9_+-]+\\.[a-z]{1,4}") {
            prop_assert!(FileName::new(&s).is_ok());
        }

        #[test]
        fn expand_command_preserves_args_without_placeholders(
            arg1 in "[a-z]+",
            arg2 in "[a-z]+",
        ) {
            let cmd = vec![arg1.clone(), arg2.clone()];
            let vars = vec![("source", "main.py".to_owned())];
            let result = expand_command(&cmd, &vars);
            prop_assert_eq!(&result[0], &arg1);
            prop_assert_eq!(&result[1], &arg2);
        }

        #[test]
        fn expand_command_length_preserved(cmd_len in 1usize..10) {
            let cmd: Vec<String> = (0..cmd_len).map(|i| format!("{{source}}{i}")).collect();
            let result = expand_command(&cmd, &[("source", "x".to_owned())]);
            prop_assert_eq!(result.len(), cmd_len);
        }
    }
}
