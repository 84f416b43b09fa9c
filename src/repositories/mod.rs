mod short_link;

#[cfg(test)]
pub mod memory;

pub use short_link::{PgShortLinkRepository, ShortLinkRepositoryTrait};
