pub mod cad;
pub mod images;
pub mod model;
pub mod neows;
pub mod server;
