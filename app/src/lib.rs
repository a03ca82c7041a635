pub mod api;
pub mod cnpj;
pub mod config;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod row;
pub mod ui;
pub mod utils;
