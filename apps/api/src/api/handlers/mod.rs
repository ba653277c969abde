// HTTP request handlers

pub mod health;
pub mod orchestrate;
pub mod tasks;
