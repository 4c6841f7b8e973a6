pub mod background;
pub mod clients;
pub mod cursor;
pub mod fetcher;
pub mod presenter;
pub mod scheduler;
pub mod surface;
