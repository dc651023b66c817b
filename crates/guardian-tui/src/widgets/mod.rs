//! Small rendering helpers shared by the app shell and screens.

pub mod popup;
pub mod toast;
