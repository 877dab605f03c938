//! Environment variable overrides.

/// Prefix browser builds put in front of the same variables.
const BROWSER_PREFIX: &str = "VITE_";

pub(crate) const CLOUD_NAME: &str = "CLOUDINARY_CLOUD_NAME";
pub(crate) const UPLOAD_PRESET: &str = "CLOUDINARY_UPLOAD_PRESET";
pub(crate) const PROVIDER_USERNAME: &str = "BROWSERSTACK_USERNAME";
pub(crate) const PROVIDER_ACCESS_KEY: &str = "BROWSERSTACK_ACCESS_KEY";

/// Looks up `name`, then `VITE_<name>`. Blank values count as absent.
pub(crate) fn lookup(get: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    non_blank(get(name)).or_else(|| non_blank(get(&format!("{BROWSER_PREFIX}{name}"))))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
