// Domain layer - regions, requests, directives, notices and markup
pub mod directives;
pub mod markup;
pub mod notice;
pub mod region;
pub mod request;
pub mod urls;
