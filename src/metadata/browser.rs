use crate::models::Browser;

/// Derive the browser family from a user agent string.
///
/// Chromium-based browsers all advertise `Chrome`, so the order of the
/// checks matters: Edge is only reported when `Chrome` is absent and Opera
/// only for the legacy `Opera` token.
pub fn detect_browser(user_agent: &str) -> Browser {
    let ua = user_agent;

    if ua.contains("Chrome") && !ua.contains("Edg") {
        Browser::Chrome
    } else if ua.contains("Firefox") {
        Browser::Firefox
    } else if ua.contains("Safari") && !ua.contains("Chrome") {
        Browser::Safari
    } else if ua.contains("Edg") {
        Browser::Edge
    } else if ua.contains("Opera") {
        Browser::Opera
    } else {
        Browser::Unknown
    }
}
