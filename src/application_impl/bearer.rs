use crate::application_port::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the raw token out of an `Authorization: Bearer <token>` header value.
/// The scheme is matched case-sensitively with exactly one space; surrounding
/// spaces around the token itself are tolerated.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AuthError::MissingCredential),
    };
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedCredential)?
        .trim_matches(' ');
    if token.is_empty() {
        return Err(AuthError::MalformedCredential);
    }
    Ok(token)
}
