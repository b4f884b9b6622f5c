pub mod actions;
pub mod component_context;
pub mod components;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod events;
pub mod hydration;
pub mod keybindings;
pub mod layout;
pub mod panel;
pub mod persistence;
pub mod runner;
pub mod shell;
pub mod state;
pub mod tracing_sub;
pub mod ui;
