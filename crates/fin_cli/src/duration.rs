use std::str::FromStr;
use std::time::Duration;

/// A duration written as `30s`, `5m`, `1h15m30s` or bare seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_number = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if c.is_whitespace() {
                continue;
            } else {
                let num = current_number
                    .parse::<u64>()
                    .map_err(|_| format!("Expected a number before '{}'", c))?;
                let multiplier = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(multiplier)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_number = true;
            }
        }

        // A trailing number without a unit counts as seconds
        if !current_number.is_empty() {
            let secs = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(secs)
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_number = true;
        }

        if !has_number {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}
