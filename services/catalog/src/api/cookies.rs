//! 会话 Cookie

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use shiroha_ports::TokenSet;
use time::Duration;

pub const ACCESS_TOKEN_COOKIE: &str = "csrf_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const SESSION_COOKIE: &str = "session";
pub const UID_COOKIE: &str = "uid";

/// 会话 Cookie 的公共属性
#[derive(Debug, Clone, Default)]
pub struct SessionCookies {
    pub domain: String,
    pub secure: bool,
}

impl SessionCookies {
    pub fn new(domain: impl Into<String>, secure: bool) -> Self {
        Self {
            domain: domain.into(),
            secure,
        }
    }

    fn build(&self, name: &'static str, value: String, http_only: bool) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path("/")
            .http_only(http_only)
            .secure(self.secure)
            .same_site(SameSite::Lax);
        if !self.domain.is_empty() {
            builder = builder.domain(self.domain.clone());
        }
        builder.build()
    }

    /// 写入令牌 Cookie，`uid` 为空时不写 uid
    pub fn issue(&self, jar: CookieJar, tokens: &TokenSet, uid: Option<&str>) -> CookieJar {
        let mut access = self.build(ACCESS_TOKEN_COOKIE, tokens.access_token.clone(), true);
        access.set_max_age(Duration::seconds(tokens.expires_in));

        let mut refresh = self.build(REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone(), true);
        refresh.set_max_age(Duration::seconds(tokens.refresh_expires_in));

        let mut session = self.build(
            SESSION_COOKIE,
            tokens.session_state.clone().unwrap_or_default(),
            true,
        );
        session.set_max_age(Duration::seconds(tokens.expires_in));

        let mut jar = jar.add(access).add(refresh).add(session);

        if let Some(uid) = uid {
            let mut uid_cookie = self.build(UID_COOKIE, uid.to_string(), false);
            uid_cookie.set_max_age(Duration::seconds(tokens.expires_in));
            jar = jar.add(uid_cookie);
        }
        jar
    }

    /// 清除全部会话 Cookie
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        [
            (ACCESS_TOKEN_COOKIE, true),
            (REFRESH_TOKEN_COOKIE, true),
            (SESSION_COOKIE, true),
            (UID_COOKIE, false),
        ]
        .into_iter()
        .fold(jar, |jar, (name, http_only)| {
            let mut cookie = self.build(name, String::new(), http_only);
            cookie.make_removal();
            jar.add(cookie)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use axum::http::header::SET_COOKIE;

    fn tokens() -> TokenSet {
        TokenSet {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in: 300,
            refresh_expires_in: 1800,
            session_state: Some("state".to_string()),
            token_type: "Bearer".to_string(),
        }
    }

    fn set_cookies(jar: CookieJar) -> Vec<String> {
        let response = (jar, "ok").into_response();
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_issue_sets_four_cookies() {
        let cookies = SessionCookies::new("example.com", true);
        let headers = set_cookies(cookies.issue(CookieJar::new(), &tokens(), Some("u-1")));

        assert_eq!(headers.len(), 4);

        let access = headers.iter().find(|h| h.starts_with("csrf_token=")).unwrap();
        assert!(access.contains("HttpOnly"));
        assert!(access.contains("Secure"));
        assert!(access.contains("Max-Age=300"));
        assert!(access.contains("Domain=example.com"));
        assert!(access.contains("Path=/"));

        let refresh = headers.iter().find(|h| h.starts_with("refresh_token=")).unwrap();
        assert!(refresh.contains("Max-Age=1800"));

        let uid = headers.iter().find(|h| h.starts_with("uid=u-1")).unwrap();
        assert!(!uid.contains("HttpOnly"));
    }

    #[test]
    fn test_issue_without_uid() {
        let cookies = SessionCookies::default();
        let headers = set_cookies(cookies.issue(CookieJar::new(), &tokens(), None));

        assert_eq!(headers.len(), 3);
        assert!(headers.iter().all(|h| !h.contains("Domain=")));
    }

    #[test]
    fn test_clear_expires_every_cookie() {
        let cookies = SessionCookies::new("example.com", false);
        let headers = set_cookies(cookies.clear(CookieJar::new()));

        assert_eq!(headers.len(), 4);
        for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, SESSION_COOKIE, UID_COOKIE] {
            let header = headers
                .iter()
                .find(|h| h.starts_with(&format!("{}=", name)))
                .unwrap();
            assert!(header.contains("Max-Age=0"));
        }
    }
}
