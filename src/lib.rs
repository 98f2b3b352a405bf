pub mod bbox;
pub mod bootstrap;
pub mod codec;
pub mod controller;
pub mod display;
pub mod export;
pub mod gcp;
pub mod geojson;
pub mod input;
pub mod mercator;
pub mod pipeline;
pub mod repl;
pub mod session;
pub mod store;
pub mod terminal;
pub mod translate;
