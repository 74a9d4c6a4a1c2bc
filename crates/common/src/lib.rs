pub mod check;
pub mod codes;
pub mod object;
pub mod pattern;
pub mod severity;
pub mod time;
