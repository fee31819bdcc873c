//! Endpoint URL builders for the supported upstream APIs.

/// Path of the chat-completions endpoint.
pub const CHAT_COMPLETIONS: &str = "/chat/completions";

/// Default Gemini API version used when the base URL carries none.
pub const DEFAULT_GEMINI_API_VERSION: &str = "v1beta";

/// Builds the chat-completions URL for an OpenAI-compatible base URL.
///
/// Bases that already end in a version segment (`/v1`, `/v1beta`, ...) or in
/// `/openai` get `/chat/completions` appended; bare hosts get
/// `/v1/chat/completions`. A base that already names the endpoint is kept.
///
/// ```
/// use integrations_translation::transport::endpoints;
///
/// assert_eq!(
///     endpoints::chat_completions("https://api.openai.com/v1/"),
///     "https://api.openai.com/v1/chat/completions"
/// );
/// assert_eq!(
///     endpoints::chat_completions("http://localhost:11434"),
///     "http://localhost:11434/v1/chat/completions"
/// );
/// ```
pub fn chat_completions(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');

    if base.ends_with(CHAT_COMPLETIONS) {
        return base.to_string();
    }

    let last_segment = base.rsplit('/').next().unwrap_or_default();
    if is_version_segment(last_segment) || last_segment == "openai" {
        format!("{}{}", base, CHAT_COMPLETIONS)
    } else {
        format!("{}/v1{}", base, CHAT_COMPLETIONS)
    }
}

/// Builds the chat-completions URL of Gemini's OpenAI-compatible surface.
///
/// A base without an `/openai` segment gets the versioned `/openai` root
/// appended, so the bare Google host works.
///
/// ```
/// use integrations_translation::transport::endpoints;
///
/// assert_eq!(
///     endpoints::gemini_openai_chat_completions("https://generativelanguage.googleapis.com"),
///     "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
/// );
/// ```
pub fn gemini_openai_chat_completions(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with(CHAT_COMPLETIONS) || base.split('/').any(|segment| segment == "openai") {
        return chat_completions(base);
    }

    format!("{}/openai{}", gemini_versioned_root(base), CHAT_COMPLETIONS)
}

/// Builds the native Gemini `generateContent` URL.
pub fn gemini_generate_content(base_url: &str, model: &str) -> String {
    format!("{}/models/{}:generateContent", gemini_versioned_root(base_url), bare_model(model))
}

/// Builds the native Gemini `streamGenerateContent` URL.
///
/// ```
/// use integrations_translation::transport::endpoints;
///
/// assert_eq!(
///     endpoints::gemini_stream_generate_content(
///         "https://generativelanguage.googleapis.com/v1beta/openai",
///         "models/gemini-2.0-flash",
///     ),
///     "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:streamGenerateContent"
/// );
/// ```
pub fn gemini_stream_generate_content(base_url: &str, model: &str) -> String {
    format!("{}/models/{}:streamGenerateContent", gemini_versioned_root(base_url), bare_model(model))
}

/// Returns the base URL with exactly one API version segment and no `/openai` suffix.
fn gemini_versioned_root(base_url: &str) -> String {
    let mut base = base_url.trim_end_matches('/');
    base = base.strip_suffix("/openai").unwrap_or(base);

    let last_segment = base.rsplit('/').next().unwrap_or_default();
    if is_version_segment(last_segment) {
        base.to_string()
    } else {
        format!("{}/{}", base, DEFAULT_GEMINI_API_VERSION)
    }
}

fn bare_model(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

/// `v1`, `v1beta`, `v2alpha`, ...
fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}
