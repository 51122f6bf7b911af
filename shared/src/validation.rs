//! Input validation rules
//!
//! Pure validation functions shared by the backend services and the
//! catalog seeder. Each returns the exact message the API surfaces to
//! clients, so services can wrap them without rewording.

/// Usernames that can never be registered (compared case-insensitively)
pub const RESERVED_USERNAMES: &[&str] = &["me", "admin", "administrator", "moderator"];

/// Validate a username: non-empty, at most 150 characters, not reserved
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.chars().count() > 150 {
        return Err("Username cannot be longer than 150 characters".to_string());
    }
    let lowered = username.to_lowercase();
    if RESERVED_USERNAMES.contains(&lowered.as_str()) {
        return Err("You can't use a name like that.".to_string());
    }
    Ok(())
}

/// Validate a recipe name: between 3 and 200 characters
pub fn validate_recipe_name(name: &str) -> Result<(), String> {
    if name.chars().count() < 3 {
        return Err("The name of the recipe cannot be less than 3 characters.".to_string());
    }
    if name.chars().count() > 200 {
        return Err("The name of the recipe cannot be longer than 200 characters.".to_string());
    }
    Ok(())
}

/// Validate a recipe description: between 10 and 9999 characters
pub fn validate_recipe_text(text: &str) -> Result<(), String> {
    if text.chars().count() < 10 {
        return Err("Recipe is less than 10 characters.".to_string());
    }
    if text.chars().count() > 9999 {
        return Err("Maximum length of text".to_string());
    }
    Ok(())
}

/// Validate a cooking time in minutes: 1 to 240 inclusive
pub fn validate_cooking_time(minutes: i32) -> Result<(), String> {
    if minutes < 1 {
        return Err("Minimum cooking time".to_string());
    }
    if minutes > 240 {
        return Err("Maximum cooking time".to_string());
    }
    Ok(())
}

/// Uppercase the first character, leaving the rest untouched
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Extract an ingredient amount from raw JSON
///
/// Accepts integer numbers and strings that parse as integers, matching
/// what clients actually send. Returns None for anything non-numeric.
pub fn parse_amount(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Validate a tag color: `#RGB` or `#RRGGBB`
pub fn validate_hex_color(color: &str) -> Result<(), String> {
    let color_regex = regex_lite::Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").unwrap();
    if color_regex.is_match(color) {
        Ok(())
    } else {
        Err("The value entered is not a color in hex-format".to_string())
    }
}
