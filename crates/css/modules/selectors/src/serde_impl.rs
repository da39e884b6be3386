//! Selectors serialize with their full builder state, so any built value reads back
//! unchanged. A plain selector string is also accepted and parsed.

use crate::{FragmentKind, Selector, Specificity, parse_selector};
use core::fmt;
use serde::de::value::MapAccessDeserializer;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Stored form of a `Selector`.
#[derive(Serialize, Deserialize)]
struct SelectorState {
    text: String,
    last: Option<FragmentKind>,
    unique: Vec<FragmentKind>,
    specificity: Specificity,
}

impl SelectorState {
    fn into_selector<Failure: de::Error>(self) -> Result<Selector, Failure> {
        if let Some(kind) = self.unique.iter().find(|kind| !kind.is_unique()) {
            return Err(Failure::custom(format!(
                "{kind} fragments may repeat and cannot be listed as unique"
            )));
        }
        Ok(Selector::from_parts(
            self.text,
            self.last,
            &self.unique,
            self.specificity,
        ))
    }
}

impl Serialize for Selector {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        SelectorState {
            text: self.as_str().to_owned(),
            last: self.last_kind(),
            unique: self.unique_kinds(),
            specificity: self.specificity(),
        }
        .serialize(serializer)
    }
}

struct SelectorVisitor;

impl<'de> Visitor<'de> for SelectorVisitor {
    type Value = Selector;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a CSS selector string or a stored selector state")
    }

    fn visit_str<Failure: de::Error>(self, value: &str) -> Result<Selector, Failure> {
        parse_selector(value).map_err(Failure::custom)
    }

    fn visit_map<Access: MapAccess<'de>>(self, map: Access) -> Result<Selector, Access::Error> {
        SelectorState::deserialize(MapAccessDeserializer::new(map))?.into_selector()
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        deserializer.deserialize_any(SelectorVisitor)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Combinator, FragmentKind, Selector, SelectorBuilder, SelectorError};
    use core::error::Error;

    fn reread(sel: &Selector) -> Result<Selector, Box<dyn Error>> {
        Ok(serde_json::from_str(&serde_json::to_string(sel)?)?)
    }

    #[test]
    /// # Panics
    /// Panics if the stored form drops part of the builder state.
    fn serializes_full_state() -> Result<(), Box<dyn Error>> {
        let sel = SelectorBuilder::create().element("a")?.class("nav")?;
        assert_eq!(
            serde_json::to_string(&sel)?,
            r#"{"text":"a.nav","last":"class","unique":["element"],"specificity":[0,1,1]}"#
        );
        assert_eq!(reread(&sel)?, sel);
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if a selector string is not parsed on the way in.
    fn accepts_selector_text() -> Result<(), Box<dyn Error>> {
        let sel = SelectorBuilder::create().element("a")?.class("nav")?;
        let back: Selector = serde_json::from_str(r#""a.nav""#)?;
        assert_eq!(back, sel);
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if builder output that the parser would reject does not read back.
    fn builder_output_reads_back() -> Result<(), Box<dyn Error>> {
        let left = SelectorBuilder::create().class("a")?;
        let right = SelectorBuilder::create().class("b")?;
        let appended = SelectorBuilder::combine(&left, Combinator::Child, &right).id("x")?;
        assert_eq!(appended.as_str(), ".a > .b#x");
        assert_eq!(reread(&appended)?, appended);

        let link = SelectorBuilder::create().element("a")?;
        let dangling = SelectorBuilder::combine(&link, "+", &SelectorBuilder::create());
        assert_eq!(dangling.as_str(), "a + ");
        assert_eq!(reread(&dangling)?, dangling);

        let custom = SelectorBuilder::combine(&link, "foo", &right);
        assert_eq!(reread(&custom)?, custom);

        let tail = appended.pseudo_element("after")?;
        let restored = reread(&tail)?;
        assert_eq!(
            restored.pseudo_element("before"),
            Err(SelectorError::DuplicateFragment {
                kind: FragmentKind::PseudoElement
            })
        );
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if a repeatable kind is accepted in the unique list.
    fn rejects_repeatable_kind_as_unique() {
        let parsed = serde_json::from_str::<Selector>(
            r#"{"text":".a","last":"class","unique":["class"],"specificity":[0,1,0]}"#,
        );
        let message = parsed.map_err(|err| err.to_string());
        assert!(message.is_err_and(|text| text.starts_with("class fragments may repeat")));
    }

    #[test]
    /// # Panics
    /// Panics if deserialization accepts text the builder would reject.
    fn deserialization_checks_order() {
        let parsed = serde_json::from_str::<Selector>(r#"".a#b""#);
        let message = parsed.map_err(|err| err.to_string());
        let expected = SelectorError::Order {
            previous: FragmentKind::Class,
            attempted: FragmentKind::Id,
        }
        .to_string();
        assert!(message.is_err_and(|text| text.starts_with(&expected)));
    }
}
