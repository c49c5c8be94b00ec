//! Prompt assembly.
//!
//! A prompt document is one or more sections followed by an epilog:
//!
//! ```text
//! <preamble>
//! ----
//! path/of/first/file
//! <content>
//! ----
//! path/of/second/file
//! <content>
//!
//! --END--
//! <epilog>
//! ```
//!
//! Each file contributes `separator \n relpath \n content \n`; each section
//! closes with `\n--END--\n`; the epilog is followed by a single newline.
//! Nothing is truncated.

use std::fmt;

use crate::scan::FileRecord;

/// Marker closing each section.
pub const END_MARKER: &str = "--END--";

pub const DEFAULT_SEPARATOR: &str = "----";

/// Describes the layout of the source section.
pub const SOURCE_PREAMBLE: &str = "The following text represents a project with code. The structure of the text consists of sections beginning with ----, followed by a single line containing the file path and file name, and then a variable number of lines containing the file contents. The text representing the project ends when the symbols --END-- are encountered.";

/// Describes the layout of the reference chart section.
pub const REFERENCE_PREAMBLE: &str = "The following text represents a reference helm chart. The structure of the text consists of sections beginning with ----, followed by a single line containing the file path and file name, and then a variable number of lines containing the file contents. The text representing the helm chart ends when the symbols --END-- are encountered.";

/// Appended to the preamble of the last section.
pub const END_INSTRUCTION: &str = "Any further text beyond --END-- is meant to be interpreted as instructions using the aforementioned project as context.";

pub const DEFAULT_EPILOG: &str = "Please generate a helm chart for the above code using the above reference helm chart. The generated helm chart should be compatible with Kubernetes and should include all necessary files and configurations. The generated helm chart should follow the same convention as the above reference helm chart, to include the user configurations in the helm chart's values.yaml file with comment indicating the purpose of each configuration item. These user configurations will be loaded throught a Kubernetes configmap into the pods. The config map should only contain the valid configuration items for the user specified backend. The generated helm chart's content begins with '----HELM START----', ends with '----HELM END----' and each file begins with '----'.";

/// Preamble for the source section.
///
/// A custom preamble is used verbatim. Otherwise the built-in text is used,
/// with the end instruction attached when no reference section follows.
pub fn source_preamble(custom: Option<&str>, has_reference: bool) -> String {
    match custom {
        Some(text) => text.to_string(),
        None if has_reference => SOURCE_PREAMBLE.to_string(),
        None => format!("{SOURCE_PREAMBLE}{END_INSTRUCTION}"),
    }
}

/// Preamble for the reference chart section, which is always last.
pub fn reference_preamble() -> String {
    format!("{REFERENCE_PREAMBLE}{END_INSTRUCTION}")
}

pub fn epilog(custom: Option<&str>) -> &str {
    custom.unwrap_or(DEFAULT_EPILOG)
}

/// The assembled text sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDocument {
    text: String,
    file_count: usize,
    section_count: usize,
}

impl PromptDocument {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of files across all sections.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn section_count(&self) -> usize {
        self.section_count
    }
}

impl fmt::Display for PromptDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Incremental builder for multi-section documents.
#[derive(Debug)]
pub struct PromptBuilder {
    separator: String,
    text: String,
    file_count: usize,
    section_count: usize,
}

impl PromptBuilder {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            text: String::new(),
            file_count: 0,
            section_count: 0,
        }
    }

    /// Append a section: the preamble, every record, then the end marker.
    pub fn section(&mut self, preamble: &str, records: &[FileRecord]) -> &mut Self {
        self.text.push_str(preamble);
        self.text.push('\n');
        for record in records {
            self.text.push_str(&self.separator);
            self.text.push('\n');
            self.text.push_str(&record.rel_path);
            self.text.push('\n');
            self.text.push_str(&record.content);
            self.text.push('\n');
        }
        self.text.push('\n');
        self.text.push_str(END_MARKER);
        self.text.push('\n');

        self.file_count += records.len();
        self.section_count += 1;
        self
    }

    /// Append the epilog and finish the document.
    pub fn finish(mut self, epilog: &str) -> PromptDocument {
        self.text.push_str(epilog);
        self.text.push('\n');
        PromptDocument {
            text: self.text,
            file_count: self.file_count,
            section_count: self.section_count,
        }
    }
}

/// Assemble a single-section document.
pub fn assemble(
    records: &[FileRecord],
    separator: &str,
    preamble: &str,
    epilog: &str,
) -> PromptDocument {
    let mut builder = PromptBuilder::new(separator);
    builder.section(preamble, records);
    builder.finish(epilog)
}
