pub mod config;
pub mod logging;

pub mod completion;
pub mod manifest;
pub mod net;
pub mod prefetch;
pub mod resource;
pub mod retry;
pub mod scheduler;
pub mod view;
pub mod viewport;

pub use view::ReaderView;
