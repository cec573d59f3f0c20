//! Parser for MBUI view descriptors.
//!
//! This crate turns MBUI XML into a [`DescriptorTree`]. It understands the
//! subset of XML the descriptors use: elements, quoted attributes, character
//! data with entity references, CDATA sections, comments and processing
//! instructions. Built on `nom` combinators.

mod grammar;
mod lexer;

pub use grammar::{parse, MAX_DEPTH};

use mbui_core::{DescriptorTree, ParseError};

/// Parse an MBUI document from source text.
///
/// # Example
///
/// ```ignore
/// use mbui_parser::parse_document;
///
/// let source = r#"
/// <view>
///   <metadata address="/subsystem=datasources/data-source=*">
///     <table id="datasource-table"/>
///   </metadata>
/// </view>
/// "#;
///
/// let tree = parse_document(source)?;
/// ```
pub fn parse_document(source: &str) -> Result<DescriptorTree, ParseError> {
    parse(source)
}
