//! Collision-free slug minting on top of [`crate::slug`].
//!
//! The resolver only reads. Callers persist the returned slug themselves and
//! rely on the `UNIQUE` constraint of the slug column to reject the loser of
//! two concurrent writers.

use std::fmt;
use std::future::Future;

use crate::slug::{is_valid_slug, normalize_to_slug};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;
pub const DEFAULT_SUGGESTION_MARGIN: u32 = 10;

/// Key-existence capability of the table that owns the slug column.
pub trait SlugLookup {
    type Error;

    /// Ids of every record currently holding `slug`.
    fn ids_with_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Candidates probed by [`resolve_unique_slug`] before giving up.
    pub max_attempts: u32,
    /// Extra numbered candidates [`suggest_slugs`] looks at beyond `limit`.
    pub suggestion_margin: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            suggestion_margin: DEFAULT_SUGGESTION_MARGIN,
        }
    }
}

#[derive(Debug)]
pub enum SlugError<E> {
    /// The text normalizes to nothing usable.
    InvalidInput(String),
    /// Every candidate up to the attempt cap is taken.
    Exhausted { base: String, attempts: u32 },
    Lookup(E),
}

impl<E: fmt::Display> fmt::Display for SlugError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlugError::InvalidInput(text) => {
                write!(f, "no valid slug can be generated from {text:?}")
            }
            SlugError::Exhausted { base, attempts } => {
                write!(f, "no free slug for {base:?} after {attempts} attempts")
            }
            SlugError::Lookup(e) => write!(f, "slug lookup failed: {e}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for SlugError<E> {}

fn candidate(base: &str, counter: u32) -> String {
    if counter <= 1 {
        base.to_string()
    } else {
        format!("{base}-{counter}")
    }
}

/// Whether `slug` could be stored right now. Invalid slugs are never
/// available. A single holder equal to `exclude_id` does not count.
pub async fn is_slug_available<L: SlugLookup>(
    lookup: &L,
    slug: &str,
    exclude_id: Option<&str>,
) -> Result<bool, SlugError<L::Error>> {
    if !is_valid_slug(slug) {
        return Ok(false);
    }
    let ids = lookup.ids_with_slug(slug).await.map_err(SlugError::Lookup)?;
    Ok(match ids.as_slice() {
        [] => true,
        [only] => exclude_id == Some(only.as_str()),
        _ => false,
    })
}

/// Mint a slug for `text` that no other record holds.
///
/// Tries the normalized base first, then `base-2`, `base-3`, ... When
/// `exclude_id` is `Some`, that record's own row is not a collision (renames).
pub async fn resolve_unique_slug<L: SlugLookup>(
    lookup: &L,
    text: &str,
    exclude_id: Option<&str>,
    settings: &ResolverSettings,
) -> Result<String, SlugError<L::Error>> {
    let base = normalize_to_slug(text);
    if !is_valid_slug(&base) {
        return Err(SlugError::InvalidInput(text.to_string()));
    }

    for counter in 1..=settings.max_attempts {
        let slug = candidate(&base, counter);
        if is_slug_available(lookup, &slug, exclude_id).await? {
            return Ok(slug);
        }
        tracing::debug!(%slug, "slug taken, trying next suffix");
    }

    tracing::error!(
        text,
        %base,
        attempts = settings.max_attempts,
        "slug resolution exhausted"
    );
    Err(SlugError::Exhausted {
        base,
        attempts: settings.max_attempts,
    })
}

/// Up to `limit` currently free slugs for `text`, in ascending suffix order.
///
/// Looks at the base and `base-2` through `base-(limit + margin)`. Reserves
/// nothing. Text without a valid slug gives an empty list.
pub async fn suggest_slugs<L: SlugLookup>(
    lookup: &L,
    text: &str,
    limit: usize,
    settings: &ResolverSettings,
) -> Result<Vec<String>, SlugError<L::Error>> {
    let base = normalize_to_slug(text);
    let mut suggestions = Vec::new();
    if !is_valid_slug(&base) || limit == 0 {
        return Ok(suggestions);
    }

    let last = u32::try_from(limit)
        .unwrap_or(u32::MAX)
        .saturating_add(settings.suggestion_margin);
    for counter in 1..=last {
        if suggestions.len() >= limit {
            break;
        }
        // the base itself is counter 1; numbered variants start at 2
        let slug = candidate(&base, counter);
        if is_slug_available(lookup, &slug, None).await? {
            suggestions.push(slug);
        }
    }
    Ok(suggestions)
}
