pub mod announcements;
pub mod changes;
