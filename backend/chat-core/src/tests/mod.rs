mod command;
mod config;
