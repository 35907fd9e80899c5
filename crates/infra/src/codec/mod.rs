//! iCalendar parsing primitives (RFC 5545).
//!
//! - Lexer: content line parsing with unfolding and folding
//! - Values: DATE, DATE-TIME, DURATION, PERIOD and TEXT values
//! - Codec: VEVENT decoding and encoding behind the core codec port

mod ical;
mod lexer;
mod values;

pub use ical::ICalendarCodec;
pub use lexer::{fold, parse_content_line, split_lines, unfold, ContentLine};
pub use values::{escape_text, parse_duration, parse_period, parse_time_value, unescape_text};
