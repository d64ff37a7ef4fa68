//! Declarative widget markup
//!
//! A small XML subset describing widget trees:
//!
//! ```text
//! <?xml version="1.0"?>
//! <!-- settings panel -->
//! <Toggle label="Enabled" value="true"/>
//! <RadioButtonGroup label="Shape">
//!     <RadioButton text="Circle"/>
//!     <RadioButton text="Square"/>
//! </RadioButtonGroup>
//! ```
//!
//! Supported: elements with attributes (double or single quoted), self-closing
//! tags, nested children, comments, an optional `<?...?>` prolog, and the
//! entities `&amp; &lt; &gt; &quot; &apos;` plus numeric `&#NN;`/`&#xNN;`.
//! Text content is not supported. Attribute order is preserved.

use std::fmt;

use indexmap::IndexMap;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_until, take_while},
    character::complete::{char, multispace1, satisfy},
    combinator::{all_consuming, cut, opt, recognize, value, verify},
    error::{context, VerboseError, VerboseErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    Finish, IResult,
};
use tessel_core::{Result, TesselError};

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// One markup element
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkupElement {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<MarkupElement>,
}

impl MarkupElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: MarkupElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Pretty-printed markup, four spaces per level
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, 0);
        out
    }

    fn write(&self, out: &mut String, depth: usize) {
        let indent = "    ".repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>\n");
            return;
        }
        out.push_str(">\n");
        for child in &self.children {
            child.write(out, depth + 1);
        }
        out.push_str(&indent);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push_str(">\n");
    }
}

impl fmt::Display for MarkupElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

/// Serialize several top-level elements
pub fn write_markup(elements: &[MarkupElement]) -> String {
    elements.iter().map(MarkupElement::to_markup).collect()
}

// ============================================================================
// Escaping
// ============================================================================

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace entity references; unknown entities are kept as written
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let Some(end) = after.find(';') else {
            out.push_str(after);
            return out;
        };
        let entity = &after[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                .and_then(|code| code.ok())
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&after[..=end]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

// ============================================================================
// Parsers
// ============================================================================

/// Calculate line and column of `fragment` inside `original`
fn calculate_position(original: &str, fragment: &str) -> (usize, usize) {
    let offset = original.len().saturating_sub(fragment.len());
    let consumed = &original[..offset];
    let line = consumed.matches('\n').count() + 1;
    let column = consumed
        .rfind('\n')
        .map(|pos| offset - pos)
        .unwrap_or(offset + 1);
    (line, column)
}

fn comment(input: &str) -> ParseResult<&str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(input)
}

/// Whitespace and comments
fn ws(input: &str) -> ParseResult<()> {
    value((), many0(alt((value((), multispace1), value((), comment)))))(input)
}

fn prolog(input: &str) -> ParseResult<&str> {
    delimited(tag("<?"), take_until("?>"), tag("?>"))(input)
}

fn name(input: &str) -> ParseResult<&str> {
    context(
        "name",
        recognize(pair(
            satisfy(|c| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')),
        )),
    )(input)
}

fn quoted(input: &str) -> ParseResult<&str> {
    context(
        "quoted value",
        alt((
            delimited(char('"'), take_till(|c| c == '"'), char('"')),
            delimited(char('\''), take_till(|c| c == '\''), char('\'')),
        )),
    )(input)
}

fn attribute(input: &str) -> ParseResult<(String, String)> {
    let (input, key) = name(input)?;
    let (input, _) = cut(delimited(ws, char('='), ws))(input)?;
    let (input, raw) = cut(quoted)(input)?;
    Ok((input, (key.to_string(), unescape(raw))))
}

fn element(input: &str) -> ParseResult<MarkupElement> {
    let (input, _) = char('<')(input)?;
    let (input, tag_name) = name(input)?;
    context("element", move |input| {
        let mut node = MarkupElement::new(tag_name);
        let (input, attributes) = many0(preceded(multispace1, attribute))(input)?;
        node.attributes.extend(attributes);
        let (input, _) = ws(input)?;

        if let Ok((input, _)) = tag::<_, _, VerboseError<&str>>("/>")(input) {
            return Ok((input, node));
        }
        let (input, _) = cut(char('>'))(input)?;
        let (input, children) = many0(preceded(ws, element))(input)?;
        node.children = children;
        let (input, _) = ws(input)?;
        let (input, _) = cut(context("closing tag", tag("</")))(input)?;
        let (input, _) = cut(context(
            "matching closing tag",
            verify(name, |n: &str| n == tag_name),
        ))(input)?;
        let (input, _) = ws(input)?;
        let (input, _) = cut(char('>'))(input)?;
        Ok((input, node))
    })(input)
}

fn document(input: &str) -> ParseResult<Vec<MarkupElement>> {
    all_consuming(delimited(
        pair(ws, opt(terminated(prolog, ws))),
        many0(terminated(element, ws)),
        ws,
    ))(input)
}

fn describe(err: &VerboseError<&str>) -> String {
    let contexts: Vec<&str> = err
        .errors
        .iter()
        .filter_map(|(_, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some(*ctx),
            _ => None,
        })
        .collect();
    match err.errors.first() {
        Some((_, VerboseErrorKind::Char(c))) if contexts.is_empty() => format!("expected '{c}'"),
        Some((_, VerboseErrorKind::Char(c))) => format!("expected '{c}' in {}", contexts.join(" < ")),
        _ if !contexts.is_empty() => format!("invalid {}", contexts.join(" < ")),
        Some((fragment, VerboseErrorKind::Nom(_))) if fragment.trim_start().is_empty() => {
            "unexpected end of input".to_string()
        }
        _ => "unexpected content".to_string(),
    }
}

/// Parse a markup document into its top-level elements
pub fn parse_markup(text: &str) -> Result<Vec<MarkupElement>> {
    match document(text).finish() {
        Ok((_, elements)) => {
            tracing::debug!(elements = elements.len(), "markup parsed");
            Ok(elements)
        }
        Err(err) => {
            let (line, column) = err
                .errors
                .first()
                .map(|(fragment, _)| calculate_position(text, fragment))
                .unwrap_or((1, 1));
            let message = describe(&err);
            tracing::warn!(line, column, %message, "markup rejected");
            Err(TesselError::MarkupSyntax {
                line,
                column,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let text = r#"<?xml version="1.0"?>
<!-- panel -->
<RadioButtonGroup label="Shape" value='1'>
    <RadioButton text="Circle"/>
    <!-- second -->
    <RadioButton text="Square" />
</RadioButtonGroup>
<Toggle label="On"/>
"#;
        let elements = parse_markup(text).unwrap();
        assert_eq!(elements.len(), 2);
        let group = &elements[0];
        assert_eq!(group.tag, "RadioButtonGroup");
        assert_eq!(group.attribute("value"), Some("1"));
        assert_eq!(group.children.len(), 2);
        assert_eq!(group.children[1].attribute("text"), Some("Square"));
        assert_eq!(elements[1].tag, "Toggle");
    }

    #[test]
    fn test_attribute_order_and_entities() {
        let elements = parse_markup(r#"<A z="1" a="&lt;b&gt; &amp; &#65;&#x42;" m="&bogus;"/>"#).unwrap();
        let keys: Vec<&str> = elements[0].attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(elements[0].attribute("a"), Some("<b> & AB"));
        assert_eq!(elements[0].attribute("m"), Some("&bogus;"));
    }

    #[test]
    fn test_writer_round_trip() {
        let element = MarkupElement::new("Group")
            .with_attribute("label", "Say \"hi\" & <go>")
            .with_child(MarkupElement::new("Item").with_attribute("text", "a"));
        let text = element.to_markup();
        assert_eq!(
            text,
            "<Group label=\"Say &quot;hi&quot; &amp; &lt;go&gt;\">\n    <Item text=\"a\"/>\n</Group>\n"
        );
        assert_eq!(parse_markup(&text).unwrap(), vec![element]);
    }

    #[test]
    fn test_mismatched_closing_tag_reports_position() {
        let err = parse_markup("<A>\n  <B></C>\n</A>").unwrap_err();
        match err {
            TesselError::MarkupSyntax { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 8);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_rejects_text_and_unterminated_input() {
        assert!(parse_markup("<A>hello</A>").is_err());
        assert!(parse_markup("<A label=\"x\"").is_err());
        assert!(parse_markup("<A label=x/>").is_err());
        assert!(parse_markup("  <!-- only a comment -->  ").unwrap().is_empty());
    }
}
