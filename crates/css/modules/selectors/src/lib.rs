//! Selectors Level 3 — ordered selector building.
//! Spec: <https://www.w3.org/TR/selectors-3/>
//!
//! This module builds selector text one fragment at a time:
//! - Element, id, class, attribute, pseudo-class and pseudo-element fragments
//! - Fragment ordering and single-occurrence rules for a compound selector
//! - Combining two built selectors with a combinator
//! - Specificity tracking
//! - Parsing selector text back into a checked `Selector`
//!
//! Every builder step returns a new `Selector`; nothing is mutated in place.

use core::fmt;

mod builder;
mod error;
mod parser;
#[cfg(feature = "serde")]
mod serde_impl;
mod specificity;

// Re-export public API
pub use builder::{Selector, SelectorBuilder};
pub use error::SelectorError;
pub use parser::{parse_selector, parse_selector_list};
pub use specificity::Specificity;

/// The kinds of fragment a compound selector is made of, in their required order.
/// Spec: Section 5 — Simple selector sequences
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FragmentKind {
    /// Spec: Section 5 — Type selectors (and the universal selector `*`)
    Element,
    /// Spec: Section 7 — ID selectors
    Id,
    /// Spec: Section 6 — Class selectors
    Class,
    /// Spec: Section 8 — Attribute selectors
    Attribute,
    /// Spec: Section 6.6 — Pseudo-classes
    PseudoClass,
    /// Spec: Section 7 — Pseudo-elements
    PseudoElement,
}

impl FragmentKind {
    /// All kinds, lowest rank first.
    pub const ORDER: [Self; 6] = [
        Self::Element,
        Self::Id,
        Self::Class,
        Self::Attribute,
        Self::PseudoClass,
        Self::PseudoElement,
    ];

    /// Position of this kind in [`FragmentKind::ORDER`].
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Element => 0,
            Self::Id => 1,
            Self::Class => 2,
            Self::Attribute => 3,
            Self::PseudoClass => 4,
            Self::PseudoElement => 5,
        }
    }

    /// True for kinds that may appear at most once in a chain.
    #[inline]
    pub const fn is_unique(self) -> bool {
        matches!(self, Self::Element | Self::Id | Self::PseudoElement)
    }

    /// Render `value` with this kind's punctuation.
    pub(crate) fn render(self, value: &str, out: &mut String) {
        match self {
            Self::Element => out.push_str(value),
            Self::Id => {
                out.push('#');
                out.push_str(value);
            }
            Self::Class => {
                out.push('.');
                out.push_str(value);
            }
            Self::Attribute => {
                out.push('[');
                out.push_str(value);
                out.push(']');
            }
            Self::PseudoClass => {
                out.push(':');
                out.push_str(value);
            }
            Self::PseudoElement => {
                out.push_str("::");
                out.push_str(value);
            }
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Element => "element",
            Self::Id => "id",
            Self::Class => "class",
            Self::Attribute => "attribute",
            Self::PseudoClass => "pseudo-class",
            Self::PseudoElement => "pseudo-element",
        })
    }
}

/// Combinators between compounds.
/// Spec: Section 11 — Combinators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: any ancestor.
    Descendant,
    /// `>`: the parent.
    Child,
    /// `+`: the immediately preceding sibling.
    AdjacentSibling,
    /// `~`: any preceding sibling.
    GeneralSibling,
}

impl Combinator {
    /// The combinator's text as passed to [`SelectorBuilder::combine`].
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Descendant => " ",
            Self::Child => ">",
            Self::AdjacentSibling => "+",
            Self::GeneralSibling => "~",
        }
    }
}

impl AsRef<str> for Combinator {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
