use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"%%|%\((?P<name>[^)]+)\)s").unwrap();
}

/// Output path template in the downloader's `%(field)s` syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate(String);

impl OutputTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fills in the given fields and leaves every other placeholder in place,
    /// so the result can still be handed to the downloader.
    pub fn substitute(&self, fields: &[(&str, &str)]) -> String {
        PLACEHOLDER
            .replace_all(&self.0, |caps: &Captures| match caps.name("name") {
                Some(name) => match lookup(fields, name.as_str()) {
                    Some(value) => value.replace('%', "%%"),
                    None => caps[0].to_string(),
                },
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Glob pattern matching the file the downloader produced for `fields`.
    ///
    /// Field values are escaped, unknown placeholders match anything.
    pub fn glob(&self, fields: &[(&str, &str)]) -> String {
        PLACEHOLDER
            .replace_all(&self.0, |caps: &Captures| match caps.name("name") {
                Some(name) => match lookup(fields, name.as_str()) {
                    Some("*") => "*".to_string(),
                    Some(value) => glob::Pattern::escape(value),
                    None => "*".to_string(),
                },
                None => "%".to_string(),
            })
            .into_owned()
    }
}

impl Default for OutputTemplate {
    fn default() -> Self {
        Self::new(library::DEFAULT_OUTPUT_TEMPLATE)
    }
}

/// Path component a title is stored under. Downloads are written with this
/// name and removal looks files up by it.
pub fn file_name(title: &str) -> String {
    let name = sanitize_filename::sanitize_with_options(
        title,
        sanitize_filename::Options {
            truncate: true,
            windows: true,
            replacement: "_",
        },
    );
    if name.is_empty() {
        "_".to_string()
    } else {
        name
    }
}

/// The name `yt-dlp` picks on its own for a raw title, used to find files
/// whose output path was not rendered by [`file_name`].
pub fn downloader_file_name(title: &str) -> String {
    title
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '/' => '⧸',
            '\\' => '⧹',
            ':' => '：',
            '?' => '？',
            '|' => '｜',
            '"' => '＂',
            '*' => '＊',
            '<' => '＜',
            '>' => '＞',
            other => other,
        })
        .collect()
}

fn lookup<'a>(fields: &[(&str, &'a str)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}
