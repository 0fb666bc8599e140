//! Configuration-driven rule tables.
//!
//! A rule file is read into rows, partitioned into a tree of row ranges by a
//! component grammar, and then built into typed rule objects. The pieces here
//! know nothing about payment instruments; the rule families in
//! [`crate::rules`] plug into them through [`builder::RuleFamily`].

pub mod builder;
pub mod constants;
pub mod dimension;
pub mod grammar;
pub mod narrow;
pub mod parser;

pub use builder::{FromComponent, RuleFamily, RuleSource};
pub use dimension::Dimension;
pub use grammar::{ColumnSet, ComponentRule, SetOperation};
pub use narrow::{NarrowingPass, narrow};
pub use parser::{ParsedComponent, RowRange};
