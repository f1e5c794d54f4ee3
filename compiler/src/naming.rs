/// Initialisms rendered as a single upper-case token when converting a
/// snake-case name back to a Go identifier (`user_id` → `UserID`).
pub const ACRONYMS: [&str; 40] = [
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP",
    "HTTPS", "ID", "IP", "JSON", "JWT", "LHS", "OS", "QPS", "RAM", "RHS",
    "RPC", "SKU", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL", "UDP",
    "UI", "UID", "URI", "URL", "UTF8", "UUID", "VM", "XML", "XSRF", "XSS",
];

/// Converts a Go identifier to snake_case.
/// Runs of upper-case letters stay together, so that acronyms remain intact
/// (e.g. "sessionID" becomes "session_id", "HTTPServer" becomes "http_server").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                // Insert an underscore if the previous character is not uppercase,
                // or if the next character exists and is lowercase.
                let boundary = !prev.is_uppercase()
                    || (i + 1 < chars.len() && chars[i + 1].is_lowercase());
                if boundary && prev != '_' {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// The inverse of [`to_snake_case`]: capitalizes each word, upper-casing
/// whole words found in [`ACRONYMS`].
pub fn to_go_name(snake: &str) -> String {
    snake
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let upper = word.to_uppercase();
            if ACRONYMS.contains(&upper.as_str()) {
                return upper;
            }
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect::<String>()
}

/// The canonical exported Go name for an arbitrary identifier (`pageToken` → `PageToken`).
/// Folding the result to snake case and back always reproduces it.
pub fn exported_name(s: &str) -> String {
    to_go_name(&to_snake_case(s))
}

/// Best-effort English plural of a lower-case noun.
pub fn pluralize(noun: &str) -> String {
    const SIBILANT_ENDINGS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

    let mut chars = noun.chars().rev();
    if let (Some('y'), Some(before)) = (chars.next(), chars.next()) {
        if !"aeiou".contains(before) {
            return format!("{}ies", &noun[..noun.len() - 1]);
        }
    }
    if SIBILANT_ENDINGS.iter().any(|ending| noun.ends_with(ending)) {
        return format!("{}es", noun);
    }
    format!("{}s", noun)
}
