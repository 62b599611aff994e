pub mod brands;
pub mod colors;
pub mod products;
pub mod purchase_requests;
pub mod sequences;
pub mod series;
