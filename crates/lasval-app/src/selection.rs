//! File acceptance rules and the selection surface
//!
//! A file is accepted when it is within the size limit and carries the
//! required extension. The surface mimics a file input: it only reports a
//! change when the offered value differs from the one it holds, so it has to
//! be reset after each processed selection for the same file to be offered
//! again.

use lasval_core::prelude::*;
use lasval_core::SelectedFile;

use crate::config::UploadSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceRules {
    pub max_size_bytes: u64,
    /// Compared case-insensitively against the end of the file name
    pub required_extension: String,
}

impl Default for AcceptanceRules {
    fn default() -> Self {
        Self::from_settings(&UploadSettings::default())
    }
}

impl AcceptanceRules {
    pub fn from_settings(settings: &UploadSettings) -> Self {
        Self {
            max_size_bytes: settings.max_file_size_bytes,
            required_extension: settings.required_extension.to_ascii_lowercase(),
        }
    }

    /// Check a candidate; the size limit is checked first.
    pub fn check(&self, file: &SelectedFile) -> Result<()> {
        if file.size_bytes > self.max_size_bytes {
            return Err(Error::input_rejected(format!(
                "File size exceeds {}MB limit",
                self.max_size_bytes / (1024 * 1024)
            )));
        }

        if file.name.is_empty() {
            return Err(Error::input_rejected("File has no name"));
        }

        if !file
            .name
            .to_ascii_lowercase()
            .ends_with(&self.required_extension)
        {
            return Err(Error::input_rejected(format!(
                "Please select a {} file",
                self.required_extension.trim_start_matches('.').to_uppercase()
            )));
        }

        Ok(())
    }
}

/// Value held by the selection control
#[derive(Debug, Default)]
pub struct SelectionSurface {
    current: Option<SelectedFile>,
}

impl SelectionSurface {
    /// Offer a file. Returns true when this is a change the control would report.
    pub fn offer(&mut self, file: &SelectedFile) -> bool {
        if let Some(current) = &self.current {
            if current.same_identity(file) {
                return false;
            }
        }
        self.current = Some(file.clone());
        true
    }

    /// Clear the held value so the next offer always fires
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
