//! CSS selector specificity calculation.
//! Spec: <https://www.w3.org/TR/selectors-3/#specificity>

use crate::FragmentKind;

/// Specificity triple (a, b, c).
/// Spec: Section 9 — Calculating a selector's specificity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Specificity(pub u16, pub u16, pub u16);

impl Specificity {
    /// Account for one more fragment of `kind` with the given value.
    /// Spec: Section 9 — ids count in a; classes, attributes and pseudo-classes in b;
    /// type selectors and pseudo-elements in c. The universal selector is ignored.
    #[must_use]
    pub fn with_fragment(self, kind: FragmentKind, value: &str) -> Self {
        let Self(id_count, class_attr_count, type_count) = self;
        match kind {
            FragmentKind::Id => Self(id_count.saturating_add(1), class_attr_count, type_count),
            FragmentKind::Class | FragmentKind::Attribute | FragmentKind::PseudoClass => {
                Self(id_count, class_attr_count.saturating_add(1), type_count)
            }
            FragmentKind::Element if value == "*" => self,
            FragmentKind::Element | FragmentKind::PseudoElement => {
                Self(id_count, class_attr_count, type_count.saturating_add(1))
            }
        }
    }

    /// Sum of two specificities, as for the compounds of a complex selector.
    /// Spec: Section 9 — Specificity accumulation
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(
            self.0.saturating_add(other.0),
            self.1.saturating_add(other.1),
            self.2.saturating_add(other.2),
        )
    }
}
