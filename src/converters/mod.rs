//! Output formats. Only HTML is produced today.

pub mod html;
