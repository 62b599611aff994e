pub mod catalog;
pub mod purchasing;
pub mod sequence;

pub use catalog::{
    Brand, Color, CreateBrand, CreateColor, CreateProduct, CreateSeries, Product, CatalogFilter,
    Series, StatusFilter, UpdateBrand, UpdateColor, UpdateProduct, UpdateSeries,
};
pub use purchasing::{
    BulkStatusChange, CreatePurchaseRequest, PurchaseRequest, PurchaseRequestFilter,
    StatusChange,
};
pub use sequence::{SequenceCounter, SequenceCounterView};
