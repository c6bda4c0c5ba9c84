//! Front-matter and markdown structure scanning
//!
//! Line-oriented readers for the pieces of a markdown document that rule
//! extraction and validation care about. Nothing here renders markdown.

pub mod error;
pub mod frontmatter;
pub mod markdown;

pub use error::{Error, Result};
pub use frontmatter::{
    Fence, FrontmatterBlock, Split, parse_mapping, read_frontmatter, split, split_strict,
};
pub use markdown::{Bullet, CodeBlock, Heading, Outline, Table};
