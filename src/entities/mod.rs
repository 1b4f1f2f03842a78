pub mod alert;
pub mod document;
pub mod envelope;
pub mod keywords;
