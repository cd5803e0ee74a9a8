//! 表单校验工具

use once_cell::sync::Lazy;
use regex::Regex;

pub static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// 中国大陆手机号
pub static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1[3-9]\d{9}$").unwrap());

pub static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://.+").unwrap());

pub static IPV4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
    .unwrap()
});

/// 角色编码：大写蛇形
pub static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

/// 权限编码：module:resource[:action]
pub static PERMISSION_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9-]*(:[a-z][a-z0-9-]*)+$").unwrap());

static SPECIAL_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap());

pub fn is_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

pub fn is_phone(s: &str) -> bool {
    PHONE_RE.is_match(s)
}

pub fn is_url(s: &str) -> bool {
    URL_RE.is_match(s)
}

pub fn is_ipv4(s: &str) -> bool {
    IPV4_RE.is_match(s)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthLevel {
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordStrength {
    /// 0..=5
    pub score: u8,
    pub level: StrengthLevel,
    pub suggestions: Vec<&'static str>,
}

/// 密码强度评估
pub fn password_strength(password: &str) -> PasswordStrength {
    let checks: [(bool, &'static str); 5] = [
        (password.chars().count() >= 8, "use at least 8 characters"),
        (password.chars().any(|c| c.is_ascii_lowercase()), "add a lowercase letter"),
        (password.chars().any(|c| c.is_ascii_uppercase()), "add an uppercase letter"),
        (password.chars().any(|c| c.is_ascii_digit()), "add a digit"),
        (SPECIAL_CHAR_RE.is_match(password), "add a special character"),
    ];

    let score = checks.iter().filter(|(ok, _)| *ok).count() as u8;
    let suggestions = checks
        .iter()
        .filter(|(ok, _)| !*ok)
        .map(|(_, hint)| *hint)
        .collect();

    let level = match score {
        0..=2 => StrengthLevel::Weak,
        3 => StrengthLevel::Medium,
        _ => StrengthLevel::Strong,
    };

    PasswordStrength {
        score,
        level,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_and_phone() {
        assert!(is_email("ops@example.com"));
        assert!(!is_email("ops@example"));
        assert!(is_phone("13800138000"));
        assert!(!is_phone("12800138000"));
        assert!(!is_phone("1380013800"));
    }

    #[test]
    fn test_url_and_ip() {
        assert!(is_url("https://example.com"));
        assert!(!is_url("ftp://example.com"));
        assert!(is_ipv4("192.168.1.254"));
        assert!(!is_ipv4("256.1.1.1"));
    }

    #[test]
    fn test_permission_code_format() {
        assert!(PERMISSION_CODE_RE.is_match("system:user:list"));
        assert!(PERMISSION_CODE_RE.is_match("system:monitor"));
        assert!(!PERMISSION_CODE_RE.is_match("system"));
        assert!(!PERMISSION_CODE_RE.is_match("System:User"));
    }

    #[test]
    fn test_password_strength_levels() {
        let weak = password_strength("abc");
        assert_eq!(weak.level, StrengthLevel::Weak);
        assert_eq!(weak.score, 1);
        assert_eq!(weak.suggestions.len(), 4);

        let medium = password_strength("abcdefg1");
        assert_eq!(medium.score, 3);
        assert_eq!(medium.level, StrengthLevel::Medium);

        let strong = password_strength("Abcdef1!");
        assert_eq!(strong.score, 5);
        assert_eq!(strong.level, StrengthLevel::Strong);
        assert!(strong.suggestions.is_empty());
    }
}
