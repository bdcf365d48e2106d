//! Works and the work registry
//!
//! A work is one book of the corpus: a stable numeric ordinal used for
//! cross-work ordering, a display name, and an optional short abbreviation
//! used when cross-reference footnotes cite it. Works are immutable once
//! loaded.
//!
//! The registry is language scoped: the same work can carry different names
//! per language, all sharing the ordinal. It is an explicitly constructed
//! value threaded through every parse, map and weave call; the engine keeps
//! no global state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_LANGUAGE: &str = "default";

/// One identified book of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub ordinal: i32,
    pub name: String,
    pub abbreviation: String,
    pub language: Option<String>,
}

impl Work {
    pub fn new(ordinal: i32, name: impl Into<String>) -> Self {
        Self {
            ordinal,
            name: name.into(),
            abbreviation: String::new(),
            language: None,
        }
    }

    pub fn abbreviated(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = abbreviation.into();
        self
    }

    pub fn in_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// The backing document file name this work conventionally lives in.
    pub fn file_name(&self) -> String {
        format!("{:02}-{}.md", self.ordinal, self.name)
    }
}

/// Language-scoped lookup of works by name or ordinal.
#[derive(Debug, Clone)]
pub struct WorkRegistry {
    languages: BTreeMap<String, BTreeMap<String, Work>>,
    default_language: String,
}

impl Default for WorkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkRegistry {
    pub fn new() -> Self {
        Self {
            languages: BTreeMap::new(),
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_default_language(language: impl Into<String>) -> Self {
        Self {
            languages: BTreeMap::new(),
            default_language: language.into(),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Insert a work under its own language, or the default language when it
    /// carries none.
    pub fn insert(&mut self, work: Work) {
        let language = work
            .language
            .clone()
            .unwrap_or_else(|| self.default_language.clone());
        self.languages
            .entry(language)
            .or_default()
            .insert(work.name.clone(), work);
    }

    /// Seed a registry from an ordered list of (ordinal, name) pairs.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for (ordinal, name) in names {
            registry.insert(Work::new(ordinal, name));
        }
        registry
    }

    /// Seed a registry from document file names of the `NN-Name.md` form.
    /// Names that do not follow the convention get ordinal -1.
    pub fn from_file_names<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for file in files {
            let file = file.as_ref();
            let ordinal = work_ordinal(file).unwrap_or(-1);
            registry.insert(Work::new(ordinal, work_name(file)));
        }
        registry
    }

    pub fn by_name(&self, language: Option<&str>, name: &str) -> Option<&Work> {
        let language = language.unwrap_or(&self.default_language);
        self.languages.get(language)?.get(name)
    }

    pub fn by_ordinal(&self, language: Option<&str>, ordinal: i32) -> Option<&Work> {
        let language = language.unwrap_or(&self.default_language);
        self.languages
            .get(language)?
            .values()
            .find(|work| work.ordinal == ordinal)
    }

    /// All works of one language, in name order.
    pub fn works<'a>(&'a self, language: Option<&str>) -> impl Iterator<Item = &'a Work> + 'a {
        let language = language.unwrap_or(&self.default_language);
        self.languages
            .get(language)
            .into_iter()
            .flatten()
            .map(|(_, work)| work)
    }

    /// The non-empty abbreviations of one language, for reference scanning.
    pub fn abbreviations(&self, language: Option<&str>) -> Vec<&str> {
        self.works(language)
            .map(|w| w.abbreviation.as_str())
            .filter(|a| !a.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.values().all(|works| works.is_empty())
    }
}

static FILE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9.]+-").unwrap());
static FILE_ORDINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+").unwrap());

/// The work name encoded in a document file name: the stem with the numeric
/// prefix and `.md` extension stripped, e.g. `01-Genesis.md` -> `Genesis`.
pub fn work_name(file: &str) -> String {
    let stem = file.strip_suffix(".md").unwrap_or(file);
    let stem = stem.rsplit(['/', '\\']).next().unwrap_or(stem);
    FILE_PREFIX.replace(stem, "").trim().to_string()
}

/// The ordinal prefix of a document file name, if it has one.
pub fn work_ordinal(file: &str) -> Option<i32> {
    let stem = file.strip_suffix(".md").unwrap_or(file);
    let stem = stem.rsplit(['/', '\\']).next().unwrap_or(stem);
    FILE_ORDINAL.find(stem)?.as_str().parse().ok()
}
