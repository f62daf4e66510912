// Write a fragment sequence back into document text.
//
// Other fragments and untouched headings come out byte-for-byte as they went
// in; headings with a generated id get `id='…'` right after the tag name.

use crate::toc::extract::{Fragment, HeadingFragment};

pub fn reassemble(fragments: &[Fragment]) -> String {
    let mut out = String::with_capacity(estimated_len(fragments));
    for fragment in fragments {
        match fragment {
            Fragment::Other(text) => out.push_str(text),
            Fragment::Heading(heading) => write_heading(&mut out, heading),
        }
    }
    out
}

fn write_heading(out: &mut String, heading: &HeadingFragment) {
    out.push('<');
    out.push_str(&heading.tag);
    if let Some(id) = heading.id.as_deref().filter(|_| heading.has_generated_id()) {
        out.push_str(" id='");
        out.push_str(id);
        out.push('\'');
    }
    out.push_str(&heading.attributes);
    out.push('>');
    out.push_str(&heading.title);
    out.push_str("</");
    out.push_str(&heading.close_tag);
    out.push('>');
}

fn estimated_len(fragments: &[Fragment]) -> usize {
    fragments
        .iter()
        .map(|fragment| match fragment {
            Fragment::Other(text) => text.len(),
            Fragment::Heading(heading) => {
                heading.tag.len() * 2
                    + heading.attributes.len()
                    + heading.title.len()
                    + heading.id.as_ref().map_or(0, |id| id.len() + 6)
                    + 5
            }
        })
        .sum()
}
