//! Row loading for delimited rule files.

pub mod table_reader;
