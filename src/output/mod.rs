pub mod formatter;

pub use formatter::{
    format_bar, format_breakdown, format_inr, format_json, format_probability, format_quote,
    format_report, format_score_line, format_score_result, should_use_colors,
};
