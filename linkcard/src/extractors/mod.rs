//! Field extractors.
//!
//! Each field is an ordered list of [`Candidate`] sources evaluated lazily by
//! [`pick_first`]: the first source whose trimmed value is non-empty wins and
//! later sources are never computed.

mod description;
mod favicon;
mod image;
mod title;

pub use description::{description_candidates, extract_description};
pub use favicon::{extract_favicon, favicon_candidates};
pub use image::{extract_image, image_candidates};
pub use title::{extract_title, title_candidates};

/// A named, lazily computed source for a field value.
pub struct Candidate<'a> {
    source: &'static str,
    compute: Box<dyn Fn() -> Option<String> + 'a>,
}

impl<'a> Candidate<'a> {
    /// Creates a candidate.
    pub fn new(source: &'static str, compute: impl Fn() -> Option<String> + 'a) -> Self {
        Self {
            source,
            compute: Box::new(compute),
        }
    }

    /// Creates a candidate with a fixed value.
    #[must_use]
    pub fn constant(source: &'static str, value: &'a str) -> Self {
        Self::new(source, move || Some(value.to_string()))
    }

    /// The source name.
    #[must_use]
    pub fn source(&self) -> &'static str {
        self.source
    }

    fn evaluate(&self) -> Option<String> {
        (self.compute)()
    }
}

impl std::fmt::Debug for Candidate<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate").field("source", &self.source).finish()
    }
}

/// The winning candidate of a [`pick_first`] evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picked {
    /// Name of the source that produced the value.
    pub source: &'static str,
    /// The trimmed value.
    pub value: String,
}

/// Returns the first candidate whose trimmed value is non-empty.
pub fn pick_first<'a>(candidates: impl IntoIterator<Item = Candidate<'a>>) -> Option<Picked> {
    candidates.into_iter().find_map(|candidate| {
        let value = candidate.evaluate()?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Picked {
            source: candidate.source,
            value: trimmed.to_string(),
        })
    })
}
