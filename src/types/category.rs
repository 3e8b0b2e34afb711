use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of content the sender says the bundle holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Audio,
    Photos,
    Videos,
    Documents,
    Contacts,
    #[default]
    Any,
}

impl Category {
    /// Maps free-form user input onto a category; unknown input is `Any`.
    pub fn normalize(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "audio" | "audios" => Category::Audio,
            "photo" | "photos" | "images" => Category::Photos,
            "video" | "videos" => Category::Videos,
            "document" | "documents" | "docs" => Category::Documents,
            "contact" | "contacts" => Category::Contacts,
            _ => Category::Any,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Audio => "audio",
            Category::Photos => "photos",
            Category::Videos => "videos",
            Category::Documents => "documents",
            Category::Contacts => "contacts",
            Category::Any => "any",
        }
    }

    /// Human readable label for share pages.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Audio => "Audio",
            Category::Photos => "Photos",
            Category::Videos => "Videos",
            Category::Documents => "Documents",
            Category::Contacts => "Contacts",
            Category::Any => "Any File",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
