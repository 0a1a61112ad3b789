pub mod kol;

pub use kol::{FetchRequest, KolConnector, KolSource, StaticKolSource, MAX_ITEM_LIMIT};
