// northwind/src/commands/mod.rs

pub mod inspect;
pub mod report;
pub mod run;
