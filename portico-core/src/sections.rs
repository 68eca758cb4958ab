use serde::{Deserialize, Serialize};

/// A feature area of the app and the path prefixes it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub paths: Vec<String>,
    #[serde(default)]
    pub module: Option<String>,
    /// Reachable without a signed-in user.
    #[serde(default, rename = "enableLoggedOut", alias = "enable_logged_out")]
    pub enable_logged_out: bool,
}

impl Section {
    #[must_use]
    pub fn new(name: &str, paths: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            paths: paths.iter().map(ToString::to_string).collect(),
            module: None,
            enable_logged_out: false,
        }
    }

    #[must_use]
    pub const fn logged_out(mut self) -> Self {
        self.enable_logged_out = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    #[must_use]
    pub const fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Parse a JSON array of sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a list of sections.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Path prefixes of every section open to logged-out visitors.
    #[must_use]
    pub fn logged_out_paths(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|section| section.enable_logged_out)
            .flat_map(|section| section.paths.iter().map(String::as_str))
            .collect()
    }

    /// First logged-out prefix that `path` starts with. Case-sensitive.
    #[must_use]
    pub fn logged_out_match(&self, path: &str) -> Option<&str> {
        self.logged_out_paths()
            .into_iter()
            .find(|prefix| path.starts_with(prefix))
    }

    /// Section owning `path`, by longest matching prefix.
    #[must_use]
    pub fn section_for(&self, path: &str) -> Option<&Section> {
        self.sections
            .iter()
            .filter_map(|section| {
                section
                    .paths
                    .iter()
                    .filter(|prefix| path.starts_with(prefix.as_str()))
                    .map(String::len)
                    .max()
                    .map(|len| (len, section))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, section)| section)
    }
}
