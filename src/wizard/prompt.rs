use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Prompt user with a message and return their trimmed input.
pub fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
pub fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
pub fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    Ok(parse_yes_no(&input, default_yes))
}

/// Prompt until the answer parses as a number accepted by `check`.
pub fn prompt_number<F>(message: &str, default: f64, check: F) -> Result<f64>
where
    F: Fn(f64) -> Result<(), String>,
{
    loop {
        let input = prompt_with_default(message, &format_default(default))?;
        match input.parse::<f64>() {
            Ok(v) if v.is_finite() => match check(v) {
                Ok(()) => return Ok(v),
                Err(e) => println!("  Invalid: {}. Try again.", e),
            },
            _ => println!("  Invalid: must be a number. Try again."),
        }
    }
}

/// Print text with a typewriter effect, one character at a time.
pub fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(12));
    }
    println!();
}

fn parse_yes_no(input: &str, default_yes: bool) -> bool {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        default_yes
    } else {
        input == "y" || input == "yes"
    }
}

/// Render a default without a trailing ".0" for whole numbers.
pub fn format_default(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yes_no() {
        assert!(parse_yes_no("", true));
        assert!(!parse_yes_no("", false));
        assert!(parse_yes_no("Y", false));
        assert!(parse_yes_no("yes", false));
        assert!(!parse_yes_no("nope", true));
    }

    #[test]
    fn test_format_default() {
        assert_eq!(format_default(120.0), "120");
        assert_eq!(format_default(1.015), "1.015");
        assert_eq!(format_default(0.0), "0");
    }
}
