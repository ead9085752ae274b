/// Extracts the status code from the first line of a raw HTTP response.
pub fn parse_http_status_code(raw_response: &str) -> Option<u16> {
    let status_line = raw_response.lines().next()?.trim();
    let mut parts = status_line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    let code = parts.next()?;
    if code.len() != 3 {
        return None;
    }
    code.parse::<u16>().ok()
}

pub fn is_success_status(code: u16) -> bool {
    (200..300).contains(&code)
}
