//! Immutable selector building.
//! Spec: Section 5 — Simple selector sequences; Section 11 — Combinators

use crate::{FragmentKind, SelectorError, Specificity};
use core::fmt;
use log::{debug, trace};

/// Set of unique fragment kinds already used in a chain, one bit per rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
struct SeenKinds(u8);

impl SeenKinds {
    #[inline]
    const fn contains(self, kind: FragmentKind) -> bool {
        self.0 & (1 << kind.rank()) != 0
    }

    #[inline]
    const fn with(self, kind: FragmentKind) -> Self {
        Self(self.0 | (1 << kind.rank()))
    }
}

/// A selector under construction.
///
/// Each append returns a fresh `Selector` and leaves the receiver untouched, so
/// a partially built selector can be shared as the base of several chains.
#[derive(Clone, Debug, PartialEq, Eq, Default, Hash)]
pub struct Selector {
    /// Rendered selector text.
    text: String,
    /// Kind of the last appended fragment; `None` when empty or combined.
    last: Option<FragmentKind>,
    /// Unique kinds already present.
    seen: SeenKinds,
    /// Accumulated specificity.
    specificity: Specificity,
}

impl Selector {
    /// An empty selector; any fragment may be appended first.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment of `kind`.
    ///
    /// # Errors
    /// Returns [`SelectorError::DuplicateFragment`] when `kind` may appear only once
    /// and is already present, and [`SelectorError::Order`] when the previous
    /// fragment ranks after `kind`.
    pub fn append(&self, kind: FragmentKind, value: &str) -> Result<Self, SelectorError> {
        if kind.is_unique() && self.seen.contains(kind) {
            debug!("Rejected duplicate {kind} fragment {value:?} on {:?}", self.text);
            return Err(SelectorError::DuplicateFragment { kind });
        }
        if let Some(previous) = self.last
            && previous.rank() > kind.rank()
        {
            debug!("Rejected {kind} fragment {value:?} after {previous} on {:?}", self.text);
            return Err(SelectorError::Order {
                previous,
                attempted: kind,
            });
        }

        let mut text = self.text.clone();
        kind.render(value, &mut text);
        trace!("Appended {kind} fragment: {text:?}");
        Ok(Self {
            text,
            last: Some(kind),
            seen: if kind.is_unique() {
                self.seen.with(kind)
            } else {
                self.seen
            },
            specificity: self.specificity.with_fragment(kind, value),
        })
    }

    /// Append an element (type) name verbatim, e.g. `div` or `*`.
    ///
    /// # Errors
    /// See [`Selector::append`].
    #[inline]
    pub fn element(&self, name: &str) -> Result<Self, SelectorError> {
        self.append(FragmentKind::Element, name)
    }

    /// Append `#name`.
    ///
    /// # Errors
    /// See [`Selector::append`].
    #[inline]
    pub fn id(&self, name: &str) -> Result<Self, SelectorError> {
        self.append(FragmentKind::Id, name)
    }

    /// Append `.name`.
    ///
    /// # Errors
    /// See [`Selector::append`].
    #[inline]
    pub fn class(&self, name: &str) -> Result<Self, SelectorError> {
        self.append(FragmentKind::Class, name)
    }

    /// Append `[spec]`. The attribute syntax inside the brackets is taken as given.
    ///
    /// # Errors
    /// See [`Selector::append`].
    #[inline]
    pub fn attr(&self, spec: &str) -> Result<Self, SelectorError> {
        self.append(FragmentKind::Attribute, spec)
    }

    /// Append `:name`.
    ///
    /// # Errors
    /// See [`Selector::append`].
    #[inline]
    pub fn pseudo_class(&self, name: &str) -> Result<Self, SelectorError> {
        self.append(FragmentKind::PseudoClass, name)
    }

    /// Append `::name`.
    ///
    /// # Errors
    /// See [`Selector::append`].
    #[inline]
    pub fn pseudo_element(&self, name: &str) -> Result<Self, SelectorError> {
        self.append(FragmentKind::PseudoElement, name)
    }

    /// The rendered selector text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True if nothing has been appended yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Kind of the most recently appended fragment, if ordering is still tracked.
    #[inline]
    pub const fn last_kind(&self) -> Option<FragmentKind> {
        self.last
    }

    /// Specificity of everything appended or combined so far.
    #[inline]
    pub const fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Unique kinds already present, lowest rank first.
    #[cfg(feature = "serde")]
    pub(crate) fn unique_kinds(&self) -> Vec<FragmentKind> {
        FragmentKind::ORDER
            .into_iter()
            .filter(|kind| self.seen.contains(*kind))
            .collect()
    }

    /// Rebuild a selector from its stored parts. `unique` must hold only unique kinds.
    #[cfg(feature = "serde")]
    pub(crate) fn from_parts(
        text: String,
        last: Option<FragmentKind>,
        unique: &[FragmentKind],
        specificity: Specificity,
    ) -> Self {
        Self {
            text,
            last,
            seen: unique
                .iter()
                .fold(SeenKinds::default(), |seen, kind| seen.with(*kind)),
            specificity,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.text)
    }
}

/// Stateless entry point for building selectors.
///
/// Holds no fields, so every selector it hands out is a fresh, independent value.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectorBuilder;

impl SelectorBuilder {
    /// An empty selector to start a chain from.
    #[inline]
    #[must_use]
    pub fn create() -> Selector {
        Selector::new()
    }

    /// Join two selectors as `"{left} {combinator} {right}"`.
    ///
    /// The combinator text is not validated. The result is a terminal composite:
    /// ordering and occurrence tracking start over, and its specificity is the sum
    /// of both operands. Neither operand is modified.
    /// Spec: Section 11 — Combinators
    #[must_use]
    pub fn combine(left: &Selector, combinator: impl AsRef<str>, right: &Selector) -> Selector {
        let combinator = combinator.as_ref();
        let text = format!("{} {combinator} {}", left.text, right.text);
        trace!("Combined selector: {text:?}");
        Selector {
            text,
            last: None,
            seen: SeenKinds::default(),
            specificity: left.specificity.saturating_add(right.specificity),
        }
    }

    /// The selector's text verbatim.
    #[inline]
    pub fn stringify(selector: &Selector) -> String {
        selector.text.clone()
    }
}
