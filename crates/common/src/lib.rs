// wordassist-common: shared domain and wire types for the Word Assistant panel.

pub mod protocol;
pub mod types;
