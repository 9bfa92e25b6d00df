//! Group positioned fragments into visual lines

use super::geometry::{BoundingBox, TextFragment};
use std::collections::BTreeMap;

/// A line assembled from fragments, before text normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub bbox: BoundingBox,
    pub text: String,
}

/// Group fragments sharing the exact same `top` into lines.
///
/// Lines come out ordered by ascending `top`; fragments within a line by
/// ascending `left`. Tops that differ by a single unit are separate lines.
/// The box spans from the leftmost fragment to the right edge of the last
/// one, and takes its height from the first fragment of the group.
pub fn reconstruct(fragments: Vec<TextFragment>) -> Vec<RawLine> {
    let mut groups: BTreeMap<i32, Vec<TextFragment>> = BTreeMap::new();
    for fragment in fragments {
        groups.entry(fragment.bbox.top).or_default().push(fragment);
    }

    groups
        .into_iter()
        .filter_map(|(top, mut group)| {
            // Stable, so fragments with equal `left` keep extraction order
            group.sort_by_key(|f| f.bbox.left);

            let first = group.first()?;
            let last = group.last()?;
            let left = first.bbox.left;
            let right = last.bbox.right();
            let bottom = top + first.bbox.height;

            let text = group
                .iter()
                .map(|f| f.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            Some(RawLine {
                bbox: BoundingBox::new(top, left, right - left, bottom - top),
                text,
            })
        })
        .collect()
}
