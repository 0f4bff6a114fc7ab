use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) survive, while <script>,
/// <iframe> and event-handler attributes (like onclick) are stripped.
/// <script> loses its content too, so a body made only of a script
/// cleans down to an empty string.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Sanitizes and trims a user-supplied post body.
pub fn clean_body(input: &str) -> String {
    clean_html(input).trim().to_string()
}
