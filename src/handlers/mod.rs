mod short_link;

pub use short_link::{generate_handler, redirect_handler, shorten_handler, stats_handler};
