use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Retailers with a known extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Site {
    #[serde(rename = "bergfreunde")]
    Bergfreunde,
    #[serde(rename = "mountex")]
    Mountex,
    #[serde(rename = "4camping")]
    FourCamping,
    #[serde(rename = "maszas")]
    Maszas,
}

impl Site {
    pub const ALL: [Site; 4] = [
        Site::Bergfreunde,
        Site::Mountex,
        Site::FourCamping,
        Site::Maszas,
    ];

    /// Canonical lowercase key used in configuration and fixture file names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Site::Bergfreunde => "bergfreunde",
            Site::Mountex => "mountex",
            Site::FourCamping => "4camping",
            Site::Maszas => "maszas",
        }
    }

    /// Name stamped onto every discount coming from this site.
    #[must_use]
    pub fn display_name(self) -> String {
        capitalize_site_name(self.name())
    }

    /// Sites whose listings only appear after client-side rendering.
    #[must_use]
    pub fn requires_rendering(self) -> bool {
        matches!(self, Site::Mountex)
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown site: '{0}'")]
pub struct UnknownSite(pub String);

impl FromStr for Site {
    type Err = UnknownSite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Site::ALL
            .into_iter()
            .find(|site| site.name() == key)
            .ok_or_else(|| UnknownSite(s.to_string()))
    }
}

/// Upper-cases the first character and lower-cases the rest.
#[must_use]
pub fn capitalize_site_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
