pub mod combiner;
pub mod combiner_rule;
pub mod dms;
pub mod drawing;
pub mod error;
pub mod navdata;
pub mod procedure;
pub mod resolver;
pub mod runway;
pub mod settings;
pub mod sorting;
pub mod store;
pub mod table;
