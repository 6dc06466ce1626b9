// Question banks: the uploaded spreadsheet model and its parser.

pub mod handlers;
pub mod models;
pub mod parser;
