pub mod customization;
pub mod profile;
pub mod template;
