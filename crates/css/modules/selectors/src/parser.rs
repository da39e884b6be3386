//! CSS selector parsing.
//! Spec: <https://www.w3.org/TR/selectors-3/#w3cselgrammar>
//!
//! Text is tokenized into fragments and combinators, and every fragment is
//! replayed through [`Selector::append`], so parsed selectors obey the same
//! ordering and occurrence rules as built ones.

use crate::{Combinator, FragmentKind, Selector, SelectorBuilder, SelectorError};
use core::mem::take;
use core::str::FromStr;
use log::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Internal tokenizer token kinds.
enum Tok<'src> {
    /// An explicit child/adjacent/general sibling combinator.
    Combinator(Combinator),
    /// Whitespace that implies a descendant combinator.
    DescendantWS,
    /// Separator between selectors of a list.
    Comma,
    /// A fragment and its raw value, without punctuation.
    Fragment(FragmentKind, &'src str),
}

/// Tokenizer over a selector string.
struct SelectorTokenizer<'src> {
    /// Selector text being tokenized.
    input: &'src str,
    /// Current cursor byte index into `input`.
    index: usize,
}

/// Bytes allowed in names. Non-ASCII bytes are accepted so UTF-8 names pass through.
#[inline]
const fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte >= 0x80
}

#[inline]
const fn syntax(position: usize, reason: &'static str) -> SelectorError {
    SelectorError::Syntax { position, reason }
}

impl<'src> SelectorTokenizer<'src> {
    /// Construct a tokenizer from input.
    #[inline]
    const fn new(input: &'src str) -> Self {
        Self { input, index: 0 }
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input
            .as_bytes()
            .get(self.index.saturating_add(offset))
            .copied()
    }

    #[inline]
    fn bump(&mut self, count: usize) {
        self.index = self.index.saturating_add(count);
    }

    #[inline]
    fn slice_from(&self, start: usize) -> &'src str {
        self.input.get(start..self.index).unwrap_or_default()
    }

    /// Return the next selector token, if any.
    fn next_token(&mut self) -> Option<Result<Tok<'src>, SelectorError>> {
        let start = self.index;
        while self.peek_at(0).is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump(1);
        }
        if self.index > start {
            return Some(Ok(Tok::DescendantWS));
        }

        let current = self.peek_at(0)?;
        let token = match current {
            b'*' => {
                self.bump(1);
                Ok(Tok::Fragment(FragmentKind::Element, "*"))
            }
            b'.' => self.consume_prefixed(FragmentKind::Class, 1),
            b'#' => self.consume_prefixed(FragmentKind::Id, 1),
            b'[' => self.consume_attr(),
            b':' if self.peek_at(1) == Some(b':') => {
                self.consume_prefixed(FragmentKind::PseudoElement, 2)
            }
            b':' => self.consume_pseudo_class(),
            b'>' => {
                self.bump(1);
                Ok(Tok::Combinator(Combinator::Child))
            }
            b'+' => {
                self.bump(1);
                Ok(Tok::Combinator(Combinator::AdjacentSibling))
            }
            b'~' => {
                self.bump(1);
                Ok(Tok::Combinator(Combinator::GeneralSibling))
            }
            b',' => {
                self.bump(1);
                Ok(Tok::Comma)
            }
            byte if is_ident_byte(byte) => {
                Ok(Tok::Fragment(FragmentKind::Element, self.consume_ident()))
            }
            _ => Err(syntax(start, "unexpected character")),
        };
        Some(token)
    }

    /// Consume a run of name bytes.
    #[inline]
    fn consume_ident(&mut self) -> &'src str {
        let start = self.index;
        while self.peek_at(0).is_some_and(is_ident_byte) {
            self.bump(1);
        }
        self.slice_from(start)
    }

    /// Skip `prefix_len` punctuation bytes and read the name that follows.
    fn consume_prefixed(
        &mut self,
        kind: FragmentKind,
        prefix_len: usize,
    ) -> Result<Tok<'src>, SelectorError> {
        let start = self.index;
        self.bump(prefix_len);
        let name = self.consume_ident();
        if name.is_empty() {
            return Err(syntax(start, "expected a name after the prefix"));
        }
        Ok(Tok::Fragment(kind, name))
    }

    /// Parse `:name` or `:name(argument)`; the argument is kept verbatim.
    fn consume_pseudo_class(&mut self) -> Result<Tok<'src>, SelectorError> {
        let start = self.index;
        // skip ':'
        self.bump(1);
        let value_start = self.index;
        if self.consume_ident().is_empty() {
            return Err(syntax(start, "expected a name after the prefix"));
        }
        if self.peek_at(0) == Some(b'(') {
            self.consume_parenthesized()?;
        }
        Ok(Tok::Fragment(FragmentKind::PseudoClass, self.slice_from(value_start)))
    }

    /// Consume a balanced `( ... )` group, skipping over quoted strings.
    fn consume_parenthesized(&mut self) -> Result<(), SelectorError> {
        let open = self.index;
        let mut depth = 0usize;
        while let Some(byte) = self.peek_at(0) {
            match byte {
                b'"' | b'\'' => {
                    self.skip_quoted()?;
                    continue;
                }
                b'(' => depth = depth.saturating_add(1),
                b')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump(1);
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.bump(1);
        }
        Err(syntax(open, "unterminated parenthesis"))
    }

    /// Parse `[ ... ]` and return the raw text between the brackets.
    fn consume_attr(&mut self) -> Result<Tok<'src>, SelectorError> {
        let open = self.index;
        // skip '['
        self.bump(1);
        let start = self.index;
        loop {
            match self.peek_at(0) {
                None => return Err(syntax(open, "unterminated attribute selector")),
                Some(b'"' | b'\'') => self.skip_quoted()?,
                Some(b']') => break,
                Some(_) => self.bump(1),
            }
        }
        let spec = self.slice_from(start);
        // skip ']'
        self.bump(1);
        if spec.trim().is_empty() {
            return Err(syntax(open, "empty attribute selector"));
        }
        Ok(Tok::Fragment(FragmentKind::Attribute, spec))
    }

    /// Skip a quoted string starting at the cursor, honoring backslash escapes.
    fn skip_quoted(&mut self) -> Result<(), SelectorError> {
        let open = self.index;
        let quote = self.peek_at(0);
        self.bump(1);
        while let Some(byte) = self.peek_at(0) {
            if byte == b'\\' {
                self.bump(2);
                continue;
            }
            self.bump(1);
            if Some(byte) == quote {
                return Ok(());
            }
        }
        Err(syntax(open, "unterminated string"))
    }
}

impl<'src> Iterator for SelectorTokenizer<'src> {
    type Item = Result<Tok<'src>, SelectorError>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// One complex selector being assembled from tokens.
#[derive(Default)]
struct ComplexState {
    /// Everything left of `current`, with the combinator that joins it to `current`.
    chain: Option<(Selector, Combinator)>,
    /// The compound currently receiving fragments.
    current: Selector,
    /// Combinator seen since the last fragment.
    pending: Option<Combinator>,
}

impl ComplexState {
    #[inline]
    fn is_empty(&self) -> bool {
        self.chain.is_none() && self.current.is_empty()
    }

    fn push_fragment(&mut self, kind: FragmentKind, value: &str) -> Result<(), SelectorError> {
        if let Some(comb) = self.pending.take() {
            let finished = take(&mut self.current);
            let joined = match self.chain.take() {
                None => finished,
                Some((left, join)) => SelectorBuilder::combine(&left, join, &finished),
            };
            self.chain = Some((joined, comb));
        }
        self.current = self.current.append(kind, value)?;
        Ok(())
    }

    #[inline]
    fn push_whitespace(&mut self) {
        // Whitespace only separates compounds once one has started.
        if !self.current.is_empty() && self.pending.is_none() {
            self.pending = Some(Combinator::Descendant);
        }
    }

    fn push_combinator(&mut self, comb: Combinator, position: usize) -> Result<(), SelectorError> {
        if self.current.is_empty() {
            return Err(syntax(position, "combinator without a selector before it"));
        }
        if self
            .pending
            .is_some_and(|prev| prev != Combinator::Descendant)
        {
            return Err(syntax(position, "two combinators in a row"));
        }
        self.pending = Some(comb);
        Ok(())
    }

    fn finish(self, position: usize) -> Result<Selector, SelectorError> {
        if self
            .pending
            .is_some_and(|prev| prev != Combinator::Descendant)
        {
            return Err(syntax(position, "combinator without a selector after it"));
        }
        Ok(match self.chain {
            None => self.current,
            Some((left, join)) => SelectorBuilder::combine(&left, join, &self.current),
        })
    }
}

/// Shared driver; commas are only accepted when `allow_list` is set.
fn parse_groups(input: &str, allow_list: bool) -> Result<Vec<Selector>, SelectorError> {
    let mut tokens = SelectorTokenizer::new(input);
    let mut selectors = Vec::new();
    let mut state = ComplexState::default();

    loop {
        let start = tokens.index;
        let Some(token) = tokens.next() else {
            break;
        };
        match token? {
            Tok::Fragment(kind, value) => state.push_fragment(kind, value)?,
            Tok::DescendantWS => state.push_whitespace(),
            Tok::Combinator(comb) => state.push_combinator(comb, start)?,
            Tok::Comma => {
                if !allow_list {
                    return Err(syntax(start, "unexpected ',' in a single selector"));
                }
                if state.is_empty() {
                    return Err(syntax(start, "empty selector in list"));
                }
                selectors.push(take(&mut state).finish(start)?);
            }
        }
    }

    if state.is_empty() {
        if !selectors.is_empty() {
            return Err(syntax(input.len(), "empty selector in list"));
        }
        if !allow_list {
            selectors.push(Selector::new());
        }
    } else {
        selectors.push(state.finish(input.len())?);
    }
    Ok(selectors)
}

/// Parse one complex selector, e.g. `nav > a.active:hover`.
///
/// Compounds are joined left to right with [`SelectorBuilder::combine`]; whitespace
/// becomes the descendant combinator `" "`. Empty input yields the empty selector.
/// Spec: Section 5–8 — simple selectors; Section 11 — Combinators
///
/// # Errors
/// Returns [`SelectorError::Syntax`] for text that cannot be tokenized, and the
/// builder's [`SelectorError::Order`] or [`SelectorError::DuplicateFragment`] when a
/// compound breaks the fragment rules.
pub fn parse_selector(input: &str) -> Result<Selector, SelectorError> {
    let parsed = parse_groups(input, false)
        .inspect_err(|err| debug!("Failed to parse selector {input:?}: {err}"))?;
    let selector = parsed.into_iter().next().unwrap_or_default();
    trace!("Parsed selector {input:?} as {:?}", selector.as_str());
    Ok(selector)
}

/// Parse a comma separated selector list.
/// Spec: Section 4 — Groups of selectors
///
/// # Errors
/// As [`parse_selector`], plus [`SelectorError::Syntax`] for empty list entries.
pub fn parse_selector_list(input: &str) -> Result<Vec<Selector>, SelectorError> {
    let parsed = parse_groups(input, true)
        .inspect_err(|err| debug!("Failed to parse selector list {input:?}: {err}"))?;
    trace!("Parsed {} selectors from {input:?}", parsed.len());
    Ok(parsed)
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_selector(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// # Panics
    /// Panics if a compound does not parse to the same value the builder produces.
    fn compound_matches_builder() -> Result<(), SelectorError> {
        let parsed = parse_selector(r#"a[href$=".png"]:focus"#)?;
        let built = SelectorBuilder::create()
            .element("a")?
            .attr(r#"href$=".png""#)?
            .pseudo_class("focus")?;
        assert_eq!(parsed, built);
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if explicit combinators are not joined through `combine`.
    fn explicit_combinators() -> Result<(), SelectorError> {
        let parsed = parse_selector("ul>li.item + li ~ li")?;
        assert_eq!(parsed.as_str(), "ul > li.item + li ~ li");
        let spaced = parse_selector("ul  >  li")?;
        assert_eq!(spaced.as_str(), "ul > li");
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if whitespace is not treated as the descendant combinator.
    fn whitespace_is_descendant() -> Result<(), SelectorError> {
        let parsed = parse_selector("  nav a  ")?;
        let nav = SelectorBuilder::create().element("nav")?;
        let link = SelectorBuilder::create().element("a")?;
        assert_eq!(
            parsed,
            SelectorBuilder::combine(&nav, Combinator::Descendant, &link)
        );
        assert_eq!(parsed.as_str(), "nav   a");
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if pseudo-class arguments or bracketed quotes are cut short.
    fn nested_arguments_and_quotes() -> Result<(), SelectorError> {
        let parsed = parse_selector(r#"li:nth-child(2n+1):not([data-x="a)b"])::marker"#)?;
        assert_eq!(
            parsed.as_str(),
            r#"li:nth-child(2n+1):not([data-x="a)b"])::marker"#
        );
        let attr = parse_selector(r#"[title="a]b"]"#)?;
        assert_eq!(attr.as_str(), r#"[title="a]b"]"#);
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if parsed fragments bypass the builder's rules.
    fn builder_rules_apply() {
        assert_eq!(
            parse_selector(".note#main"),
            Err(SelectorError::Order {
                previous: FragmentKind::Class,
                attempted: FragmentKind::Id,
            })
        );
        assert_eq!(
            parse_selector("p::before::after"),
            Err(SelectorError::DuplicateFragment {
                kind: FragmentKind::PseudoElement
            })
        );
        assert_eq!(
            parse_selector("div*"),
            Err(SelectorError::DuplicateFragment {
                kind: FragmentKind::Element
            })
        );
    }

    #[test]
    /// # Panics
    /// Panics if malformed text is accepted or reported at the wrong offset.
    fn syntax_errors() {
        assert_eq!(
            parse_selector("> a"),
            Err(syntax(0, "combinator without a selector before it"))
        );
        assert_eq!(
            parse_selector("a >"),
            Err(syntax(3, "combinator without a selector after it"))
        );
        assert_eq!(
            parse_selector("a > + b"),
            Err(syntax(4, "two combinators in a row"))
        );
        assert_eq!(
            parse_selector("a[href"),
            Err(syntax(1, "unterminated attribute selector"))
        );
        assert_eq!(parse_selector("a[ ]"), Err(syntax(1, "empty attribute selector")));
        assert_eq!(
            parse_selector("div."),
            Err(syntax(3, "expected a name after the prefix"))
        );
        assert_eq!(
            parse_selector("a:not(b"),
            Err(syntax(5, "unterminated parenthesis"))
        );
        assert_eq!(
            parse_selector(r#"a[title="x]"#),
            Err(syntax(8, "unterminated string"))
        );
        assert_eq!(
            parse_selector(r#"a:not([x="\"#),
            Err(syntax(9, "unterminated string"))
        );
        assert_eq!(parse_selector("a!"), Err(syntax(1, "unexpected character")));
        assert_eq!(
            parse_selector("a, b"),
            Err(syntax(1, "unexpected ',' in a single selector"))
        );
    }

    #[test]
    /// # Panics
    /// Panics if list entries are not parsed independently.
    fn selector_lists() -> Result<(), SelectorError> {
        let list = parse_selector_list("h1, h2.title ,#main > p")?;
        let texts: Vec<&str> = list.iter().map(Selector::as_str).collect();
        assert_eq!(texts, vec!["h1", "h2.title", "#main > p"]);
        assert_eq!(parse_selector_list("  ")?, Vec::new());
        assert_eq!(
            parse_selector_list("a,,b"),
            Err(syntax(2, "empty selector in list"))
        );
        assert_eq!(
            parse_selector_list("a,"),
            Err(syntax(2, "empty selector in list"))
        );
        Ok(())
    }

    #[test]
    /// # Panics
    /// Panics if empty input does not give the empty selector.
    fn empty_input() -> Result<(), SelectorError> {
        assert_eq!(parse_selector("")?, Selector::new());
        assert_eq!("   ".parse::<Selector>()?, Selector::new());
        Ok(())
    }
}
