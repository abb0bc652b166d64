use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// The three diagnostic panels. Each one fixes the input resolution, the
/// model handle and the decision rule used for a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Malaria,
    Pneumonia,
    BrainTumor,
}

/// File extensions accepted by every upload panel.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Invalid model type: {0:?}")]
    Invalid(String),
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Malaria, Category::Pneumonia, Category::BrainTumor];

    /// Side length of the square image the category's model expects.
    pub fn resolution(self) -> u32 {
        match self {
            Category::Malaria | Category::Pneumonia => 128,
            Category::BrainTumor => 224,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Malaria => "Malaria",
            Category::Pneumonia => "Pneumonia",
            Category::BrainTumor => "Brain Tumor",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Category::Malaria => "malaria",
            Category::Pneumonia => "pneumonia",
            Category::BrainTumor => "brain-tumor",
        }
    }

    pub fn menu_title(self) -> &'static str {
        match self {
            Category::Malaria => "Malaria Detection",
            Category::Pneumonia => "Pneumonia Detection",
            Category::BrainTumor => "Brain Tumor Detection",
        }
    }

    /// Bootstrap icon name shown next to the menu entry.
    pub fn icon(self) -> &'static str {
        match self {
            Category::Malaria => "bug",
            Category::Pneumonia => "lungs",
            Category::BrainTumor => "clipboard-pulse",
        }
    }

    pub fn upload_prompt(self) -> &'static str {
        match self {
            Category::Malaria => "Choose a cell image...",
            Category::Pneumonia => "Choose an X-ray image...",
            Category::BrainTumor => "Choose a brain MRI image...",
        }
    }

    pub fn preview_caption(self) -> &'static str {
        match self {
            Category::Malaria => "Uploaded Image.",
            Category::Pneumonia => "Uploaded X-ray Image.",
            Category::BrainTumor => "Uploaded Brain MRI Image.",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    /// Accepts either the display name ("Brain Tumor") or the URL slug
    /// ("brain-tumor"). Anything else is rejected.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name() == tag || c.slug() == tag)
            .ok_or_else(|| CategoryError::Invalid(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_slugs() {
        assert_eq!("Malaria".parse::<Category>(), Ok(Category::Malaria));
        assert_eq!("pneumonia".parse::<Category>(), Ok(Category::Pneumonia));
        assert_eq!("Brain Tumor".parse::<Category>(), Ok(Category::BrainTumor));
        assert_eq!("brain-tumor".parse::<Category>(), Ok(Category::BrainTumor));
    }

    #[test]
    fn rejects_unknown_tags() {
        for tag in ["", "Covid", "brain tumor", "MALARIA", "brain_tumor"] {
            assert_eq!(
                tag.parse::<Category>(),
                Err(CategoryError::Invalid(tag.to_string()))
            );
        }
    }

    #[test]
    fn resolutions_match_models() {
        assert_eq!(Category::Malaria.resolution(), 128);
        assert_eq!(Category::Pneumonia.resolution(), 128);
        assert_eq!(Category::BrainTumor.resolution(), 224);
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(Category::BrainTumor.to_string(), "Brain Tumor");
        for c in Category::ALL {
            assert_eq!(c.to_string().parse::<Category>(), Ok(c));
        }
    }
}
