//! Token-level combinators for MBUI XML.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};
use std::borrow::Cow;

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

/// Parse an element or attribute name.
pub fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_name_start), take_while(is_name_char)))(input)
}

/// Parse a single- or double-quoted attribute value, without the quotes.
pub fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
    ))(input)
}

/// Parse ` name="value"`, including the leading whitespace.
pub fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        multispace1,
        separated_pair(name, tuple((multispace0, char('='), multispace0)), quoted),
    )(input)
}

/// A parsed start tag.
#[derive(Debug, Clone, PartialEq)]
pub struct StartTag<'a> {
    pub name: &'a str,
    /// Raw (still escaped) attribute values in source order.
    pub attributes: Vec<(&'a str, &'a str)>,
    pub self_closing: bool,
}

/// Parse `<name attr="..">` or `<name attr=".."/>`.
pub fn start_tag(input: &str) -> IResult<&str, StartTag<'_>> {
    map(
        tuple((
            char('<'),
            name,
            many0(attribute),
            multispace0,
            alt((value(true, tag("/>")), value(false, char('>')))),
        )),
        |(_, name, attributes, _, self_closing)| StartTag {
            name,
            attributes,
            self_closing,
        },
    )(input)
}

/// Parse `</name>` and return the name.
pub fn end_tag(input: &str) -> IResult<&str, &str> {
    delimited(tag("</"), terminated(name, multispace0), char('>'))(input)
}

pub fn comment(input: &str) -> IResult<&str, ()> {
    value((), tuple((tag("<!--"), take_until("-->"), tag("-->"))))(input)
}

/// XML declaration or processing instruction.
pub fn processing_instruction(input: &str) -> IResult<&str, ()> {
    value((), tuple((tag("<?"), take_until("?>"), tag("?>"))))(input)
}

pub fn doctype(input: &str) -> IResult<&str, ()> {
    value((), tuple((tag("<!DOCTYPE"), take_until(">"), char('>'))))(input)
}

/// Parse a CDATA section and return its content.
pub fn cdata(input: &str) -> IResult<&str, &str> {
    delimited(tag("<![CDATA["), take_until("]]>"), tag("]]>"))(input)
}

/// Raw character data up to the next markup.
pub fn char_data(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != '<')(input)
}

/// Skip whitespace, comments, processing instructions and doctypes.
pub fn misc(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            comment,
            processing_instruction,
            doctype,
        ))),
    )(input)
}

/// Replace entity and character references.
///
/// On failure returns the byte offset of the offending `&` and the entity name.
pub fn unescape(raw: &str) -> Result<Cow<'_, str>, (usize, String)> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let offset = raw.len() - rest.len() + amp;
        let after = &rest[amp + 1..];
        let Some(semi) = after.find(';') else {
            return Err((offset, after.chars().take(8).collect()));
        };
        let entity = &after[..semi];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => character_reference(entity),
        };
        match decoded {
            Some(c) => out.push(c),
            None => return Err((offset, entity.to_string())),
        }
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

/// Decode `#65` or `#x41`. Only plain digits are accepted, no sign.
fn character_reference(entity: &str) -> Option<char> {
    let (digits, radix) = match entity.strip_prefix("#x") {
        Some(hex) => (hex, 16),
        None => (entity.strip_prefix('#')?, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_with_hyphen() {
        assert_eq!(name("sub-item id"), Ok((" id", "sub-item")));
        assert!(name("-item").is_err());
    }

    #[test]
    fn test_start_tag_with_attributes() {
        let (rest, tag) = start_tag(r#"<table id="t1" form-ref='f1'>rest"#).unwrap();
        assert_eq!(rest, "rest");
        assert_eq!(tag.name, "table");
        assert_eq!(tag.attributes, vec![("id", "t1"), ("form-ref", "f1")]);
        assert!(!tag.self_closing);
    }

    #[test]
    fn test_self_closing_tag() {
        let (rest, tag) = start_tag(r#"<column name="jndi-name" />"#).unwrap();
        assert!(rest.is_empty());
        assert!(tag.self_closing);
        assert_eq!(tag.attributes, vec![("name", "jndi-name")]);
    }

    #[test]
    fn test_end_tag() {
        assert_eq!(end_tag("</item >x"), Ok(("x", "item")));
    }

    #[test]
    fn test_misc_skips_prolog_and_comments() {
        let input = "<?xml version=\"1.0\"?>\n<!-- view -->\n<view/>";
        assert_eq!(misc(input), Ok(("<view/>", ())));
    }

    #[test]
    fn test_cdata() {
        assert_eq!(cdata("<![CDATA[a < b]]>tail"), Ok(("tail", "a < b")));
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape("plain").unwrap(), "plain");
        assert_eq!(unescape("a &lt; b &amp;&amp; c").unwrap(), "a < b && c");
        assert_eq!(unescape("&#65;&#x42;").unwrap(), "AB");
    }

    #[test]
    fn test_unescape_unknown_entity() {
        assert_eq!(unescape("x &nbsp; y"), Err((2, "nbsp".to_string())));
    }

    #[test]
    fn test_signed_character_references_are_rejected() {
        assert_eq!(unescape("a&#+65;"), Err((1, "#+65".to_string())));
        assert_eq!(unescape("&#x+41;"), Err((0, "#x+41".to_string())));
        assert_eq!(unescape("&#-1;"), Err((0, "#-1".to_string())));
        assert_eq!(unescape("&#;"), Err((0, "#".to_string())));
        assert_eq!(unescape("&#x1F600;").unwrap(), "\u{1F600}");
    }
}
