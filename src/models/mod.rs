mod short_link;

pub use short_link::{
    GenerateResponseDto, NewShortLink, ShortLink, ShortenRequestDto, ShortenResponseDto,
};
