//! Form parsing, URL validation and redirect building

use std::collections::HashMap;

use shared::Locale;

/// Raw urlencoded form body
pub type FormData = HashMap<String, String>;

/// Trimmed field value, `None` when absent or blank
pub fn get_str(form: &FormData, key: &str) -> Option<String> {
    form.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Finite number or `None`
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Loose checkbox parsing: `1`, `true`, `on`, `yes` (any case)
pub fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        )
    })
}

/// Image sort order: integers pass, fractions truncate, anything else is 0
pub fn parse_sort_order(value: Option<&str>) -> i32 {
    parse_number(value)
        .map(|n| n.trunc().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
        .unwrap_or(0)
}

/// Minimum rental days: defaults to 1 when absent, non-positive or unparseable
pub fn parse_min_days(value: Option<&str>) -> i32 {
    match parse_number(value) {
        Some(n) if n >= 1.0 => n.trunc().min(i32::MAX as f64) as i32,
        _ => 1,
    }
}

/// Normalized absolute http(s) URL, or `None`
pub fn safe_http_url(input: &str) -> Option<String> {
    let parsed = url::Url::parse(input.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Some(parsed.to_string()),
        _ => None,
    }
}

/// Default landing page after sign-in and profile saves
pub fn portal_home(locale: Locale) -> String {
    format!("/{locale}/supplier")
}

/// Keep a caller-supplied return path inside the locale's own routes
///
/// Anything that is not a same-origin path under `/{locale}/` falls back to
/// the supplier portal.
pub fn safe_next(locale: Locale, next: Option<&str>) -> String {
    let Some(next) = next.map(str::trim).filter(|n| !n.is_empty()) else {
        return portal_home(locale);
    };
    let prefix = format!("/{locale}/");
    let exact = format!("/{locale}");
    let inside = next == exact || next.starts_with(&prefix);
    if next.starts_with("//") || next.contains('\\') || !inside {
        return portal_home(locale);
    }
    next.to_string()
}

/// Build `path?k=v&...#anchor`, appending to any query already on `path`
pub fn redirect_url(path: &str, params: &[(&str, &str)], anchor: Option<&str>) -> String {
    let mut out = path.to_string();
    if !params.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        out.push(if path.contains('?') { '&' } else { '?' });
        out.push_str(&query);
    }
    if let Some(anchor) = anchor {
        out.push('#');
        out.push_str(anchor);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_get_str_trims_and_drops_blank() {
        let f = form(&[("a", "  x "), ("b", "   ")]);
        assert_eq!(get_str(&f, "a").as_deref(), Some("x"));
        assert_eq!(get_str(&f, "b"), None);
        assert_eq!(get_str(&f, "c"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some("100")), Some(100.0));
        assert_eq!(parse_number(Some(" 12.5 ")), Some(12.5));
        assert_eq!(parse_number(Some("abc")), None);
        assert_eq!(parse_number(Some("inf")), None);
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_parse_flag() {
        for yes in ["1", "true", "TRUE", "on", "Yes"] {
            assert!(parse_flag(Some(yes)), "{yes}");
        }
        for no in ["0", "false", "off", "", "y"] {
            assert!(!parse_flag(Some(no)), "{no}");
        }
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_parse_sort_order() {
        assert_eq!(parse_sort_order(Some("3")), 3);
        assert_eq!(parse_sort_order(Some("-2")), -2);
        assert_eq!(parse_sort_order(Some("2.9")), 2);
        assert_eq!(parse_sort_order(Some("Infinity")), 0);
        assert_eq!(parse_sort_order(Some("x")), 0);
        assert_eq!(parse_sort_order(None), 0);
    }

    #[test]
    fn test_parse_min_days() {
        assert_eq!(parse_min_days(None), 1);
        assert_eq!(parse_min_days(Some("0")), 1);
        assert_eq!(parse_min_days(Some("-3")), 1);
        assert_eq!(parse_min_days(Some("7")), 7);
    }

    #[test]
    fn test_safe_http_url() {
        assert_eq!(
            safe_http_url("https://x.test/a.jpg").as_deref(),
            Some("https://x.test/a.jpg")
        );
        assert_eq!(safe_http_url("HTTP://X.test").as_deref(), Some("http://x.test/"));
        assert_eq!(safe_http_url("ftp://x.test/a.jpg"), None);
        assert_eq!(safe_http_url("javascript:alert(1)"), None);
        assert_eq!(safe_http_url("/relative/a.jpg"), None);
        assert_eq!(safe_http_url(""), None);
    }

    #[test]
    fn test_safe_next() {
        let en = Locale::En;
        assert_eq!(safe_next(en, Some("/en/supplier/listings")), "/en/supplier/listings");
        assert_eq!(safe_next(en, Some("/en")), "/en");
        assert_eq!(safe_next(en, None), "/en/supplier");
        assert_eq!(safe_next(en, Some("//evil.test/en/")), "/en/supplier");
        assert_eq!(safe_next(en, Some("https://evil.test")), "/en/supplier");
        assert_eq!(safe_next(en, Some("/ar/supplier")), "/en/supplier");
        assert_eq!(safe_next(en, Some("/english")), "/en/supplier");
        assert_eq!(safe_next(Locale::Ar, Some("/ar/listings")), "/ar/listings");
    }

    #[test]
    fn test_redirect_url() {
        assert_eq!(
            redirect_url("/en/supplier/listings/1", &[("err", "missing_image")], Some("images")),
            "/en/supplier/listings/1?err=missing_image#images"
        );
        assert_eq!(
            redirect_url("/en/sign-in?next=/en", &[("error", "bad password")], None),
            "/en/sign-in?next=/en&error=bad+password"
        );
        assert_eq!(redirect_url("/en", &[], None), "/en");
    }
}
