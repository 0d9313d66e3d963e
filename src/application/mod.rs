// Application layer - Loader, scheduling and the traits the page is reached through
pub mod collaborators;
pub mod directives;
pub mod document;
pub mod loader;
pub mod notifications;
pub mod registry;
pub mod renderer;
pub mod scheduler;
pub mod transport;

#[cfg(test)]
pub mod testing;
