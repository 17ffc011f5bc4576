pub mod bootstrap;
pub mod cli;
pub mod commands;
pub mod id;
pub mod logging;
pub mod model;
pub mod planner;
pub mod render;
pub mod storage;
pub mod ui;
pub mod view;
