//! Remote resource lists

use serde::{Deserialize, Serialize};

/// A third-party file pulled into the project or the generated site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// File name, also the lookup key in a local mirror
    pub name: String,

    /// Where to download it from
    pub url: String,

    /// Destination path relative to the target directory (defaults to name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,

    /// A failed fetch aborts the run instead of producing a warning
    #[serde(default)]
    pub required: bool,
}

impl ResourceSpec {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            dest: None,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Get the destination path (falls back to name if dest not specified)
    pub fn destination(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.name)
    }
}

/// Resources fetched into every generated site
pub fn default_site_resources() -> Vec<ResourceSpec> {
    vec![ResourceSpec::new(
        "bottle.py",
        "https://raw.githubusercontent.com/bottlepy/bottle/master/bottle.py",
    )
    .required()]
}

/// Stylesheet mixin libraries fetched into `dev/sass/vendor`
pub fn default_vendor_resources() -> Vec<ResourceSpec> {
    vec![
        ResourceSpec::new(
            "_flex-box_mixins.scss",
            "https://raw.githubusercontent.com/mastastealth/sass-flex-mixin/master/_flexbox.scss",
        ),
        ResourceSpec::new(
            "_media-query_mixins.scss",
            "https://raw.githubusercontent.com/paranoida/sass-mediaqueries/master/_media-queries.scss",
        ),
        ResourceSpec::new(
            "_general_mixins.scss",
            "https://raw.githubusercontent.com/SwankSwashbucklers/some-sassy-mixins/master/mixins.scss",
        ),
    ]
}
