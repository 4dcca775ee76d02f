pub(crate) mod analysis;
pub(crate) mod deepseek;
pub(crate) mod extraction;
pub(crate) mod generation;
pub(crate) mod judge;
pub(crate) mod summarizer;
