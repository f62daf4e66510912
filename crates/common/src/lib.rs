// doctoc-common: heading ids and table-of-contents trees for HTML content

pub mod options;
pub mod pipeline;
pub mod toc;
pub mod types;
