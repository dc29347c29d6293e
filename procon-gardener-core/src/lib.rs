#![doc = "procon-gardener-core: archival pipeline for procon-gardener."]

//! Everything between "which contests, which user, which directory" and
//! "source files committed to the archive tree" lives here: discovery of
//! accepted submissions, deduplication against the archive, fetching,
//! archiving and committing. The CLI crate only loads configuration and
//! calls [`synchronise::synchronise`].

pub mod archive;
pub mod atcoder;
pub mod commit;
pub mod config;
pub mod contract;
pub mod dedup;
pub mod discovery;
pub mod fetch;
pub mod index;
pub mod language;
pub mod submission;
pub mod synchronise;
