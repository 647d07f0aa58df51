pub mod price_ws;

pub use price_ws::{
    feed_url, spawn_price_watcher, PageLocation, PriceRouter, PriceUpdateHandler, FEED_PATH,
};
