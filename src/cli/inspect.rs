//! `inspect` command: print what the resolver infers.

use anyhow::Result;
use std::path::Path;

use super::read_input;
use crate::image::svg::{VectorDocument, resolve_dimensions};

pub fn inspect(input: &Path) -> Result<()> {
    let text = read_input(input)?;
    let document = VectorDocument::parse(text.trim())?;
    let (resolved, size) = resolve_dimensions(&document)?;

    println!("size:   {size}");
    println!("ratio:  {}", resolved.aspect_ratio());
    println!("source: {}", resolved.source.as_str());
    Ok(())
}
