pub mod click_recorder;
pub mod code_generator;
pub mod context;
mod short_link;

pub use click_recorder::{ClickDispatcher, ClickRecorder};
pub use code_generator::CodeGenerator;
pub use context::{CancelHandle, RequestContext};
pub use short_link::{ShortLinkService, ShortLinkServiceTrait};
