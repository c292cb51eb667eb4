pub mod record_sale;

pub use record_sale::RecordSale;
