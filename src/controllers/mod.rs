pub mod banner;
pub mod carousel;
pub mod equalizer;
pub mod nav;
pub mod search;

pub use banner::BannerController;
pub use carousel::{CarouselInput, Carousels};
pub use equalizer::Equalizer;
pub use nav::NavController;
